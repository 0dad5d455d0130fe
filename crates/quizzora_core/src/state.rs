use crate::effect::ExportKind;
use crate::input::UploadInput;
use crate::outcome::Rejection;
use crate::progress::ProgressTracker;
use crate::quiz::{QuizPayload, Score};
use crate::view_model::{AppViewModel, ProgressView, QuizView, SelectionView};

/// Identifies one submission attempt. Engine events carry it back so late
/// arrivals from an abandoned attempt can be recognised and dropped.
pub type AttemptId = u64;
/// Identifies one quiz request; same staleness rule as [`AttemptId`].
pub type QuizRequestId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AttemptPhase {
    #[default]
    Idle,
    Validating,
    Submitting,
    Polling,
    Finalizing,
}

impl AttemptPhase {
    /// True while a submission is in flight and a new one must be refused.
    pub fn is_busy(self) -> bool {
        !matches!(self, AttemptPhase::Idle)
    }

    pub fn is_cancellable(self) -> bool {
        matches!(self, AttemptPhase::Submitting | AttemptPhase::Polling)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryDoc {
    pub text: String,
    pub source: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizSession {
    pub payload: QuizPayload,
    pub selected: Vec<Option<usize>>,
    pub checked: bool,
}

impl QuizSession {
    fn new(payload: QuizPayload) -> Self {
        let selected = vec![None; payload.mcq_count()];
        Self {
            payload,
            selected,
            checked: false,
        }
    }

    pub fn score(&self) -> Option<Score> {
        match &self.payload {
            QuizPayload::Structured { mcq, .. } if self.checked => {
                Some(Score::compute(mcq, &self.selected))
            }
            _ => None,
        }
    }
}

/// Result of the most recent export. `Ok` carries the written path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportRecord {
    pub kind: ExportKind,
    pub result: Result<String, String>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct AppState {
    phase: AttemptPhase,
    attempt: AttemptId,
    selection: Option<UploadInput>,
    pending_source: Option<String>,
    progress: ProgressTracker,
    task_id: Option<String>,
    pending_summary: Option<String>,
    summary: Option<SummaryDoc>,
    topic: String,
    quiz_request: Option<QuizRequestId>,
    next_quiz_request: QuizRequestId,
    quiz: Option<QuizSession>,
    error: Option<Rejection>,
    quiz_error: Option<Rejection>,
    last_export: Option<ExportRecord>,
    dirty: bool,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> AttemptPhase {
        self.phase
    }

    pub fn attempt(&self) -> AttemptId {
        self.attempt
    }

    pub fn selection(&self) -> Option<&UploadInput> {
        self.selection.as_ref()
    }

    pub fn progress(&self) -> &ProgressTracker {
        &self.progress
    }

    pub fn task_id(&self) -> Option<&str> {
        self.task_id.as_deref()
    }

    pub fn summary(&self) -> Option<&SummaryDoc> {
        self.summary.as_ref()
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn quiz(&self) -> Option<&QuizSession> {
        self.quiz.as_ref()
    }

    pub fn quiz_in_flight(&self) -> Option<QuizRequestId> {
        self.quiz_request
    }

    pub fn error(&self) -> Option<&Rejection> {
        self.error.as_ref()
    }

    pub fn quiz_error(&self) -> Option<&Rejection> {
        self.quiz_error.as_ref()
    }

    pub fn last_export(&self) -> Option<&ExportRecord> {
        self.last_export.as_ref()
    }

    pub fn view(&self) -> AppViewModel {
        let selection = self.selection.as_ref().map(|input| match input {
            UploadInput::Link { url } => SelectionView::Link { url: url.clone() },
            UploadInput::File(file) => SelectionView::File {
                name: file.name.clone(),
                size_bytes: file.size_bytes,
            },
        });
        let progress = self.progress.state().map(|state| ProgressView {
            percent: self.progress.percent().unwrap_or_default(),
            phase: state.phase,
        });
        AppViewModel {
            phase: self.phase,
            attempt: self.attempt,
            busy: self.phase.is_busy(),
            can_submit: !self.phase.is_busy() && self.selection.is_some(),
            selection,
            progress,
            error: self.error.clone(),
            summary: self.summary.clone(),
            topic: self.topic.clone(),
            quiz_pending: self.quiz_request.is_some(),
            quiz_error: self.quiz_error.clone(),
            quiz: self.quiz.as_ref().map(QuizView::from_session),
            last_export: self.last_export.clone(),
            dirty: self.dirty,
        }
    }

    /// Returns whether anything changed since the last call and clears the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub(crate) fn set_phase(&mut self, phase: AttemptPhase) {
        self.phase = phase;
        self.mark_dirty();
    }

    pub(crate) fn set_error(&mut self, error: Option<Rejection>) {
        self.error = error;
        self.mark_dirty();
    }

    pub(crate) fn set_selection(&mut self, selection: Option<UploadInput>) {
        self.selection = selection;
        self.mark_dirty();
    }

    /// Opens a new attempt: bumps the id, resets progress and remembers where
    /// the summary will come from.
    pub(crate) fn begin_attempt(&mut self, source: String) -> AttemptId {
        self.attempt += 1;
        self.error = None;
        self.task_id = None;
        self.pending_summary = None;
        self.pending_source = Some(source);
        self.progress.start();
        self.phase = AttemptPhase::Submitting;
        self.mark_dirty();
        self.attempt
    }

    pub(crate) fn begin_polling(&mut self, task_id: String) {
        self.task_id = Some(task_id);
        self.phase = AttemptPhase::Polling;
        self.mark_dirty();
    }

    pub(crate) fn simulated_tick(&mut self, sample: f64) {
        if self.progress.simulated_tick(sample) {
            self.mark_dirty();
        }
    }

    pub(crate) fn report_progress(&mut self, fraction: f64) {
        if self.progress.report(fraction) {
            self.mark_dirty();
        }
    }

    pub(crate) fn begin_finalizing(&mut self, summary: String) {
        self.pending_summary = Some(summary);
        self.progress.finalize();
        self.phase = AttemptPhase::Finalizing;
        self.mark_dirty();
    }

    /// Publishes the held summary and returns to idle. A new summary replaces
    /// any quiz built on the previous one.
    pub(crate) fn complete_attempt(&mut self) {
        let text = self.pending_summary.take().unwrap_or_default();
        let source = self.pending_source.take().unwrap_or_default();
        self.summary = Some(SummaryDoc { text, source });
        self.quiz = None;
        self.quiz_request = None;
        self.quiz_error = None;
        self.end_attempt();
    }

    pub(crate) fn fail_attempt(&mut self, error: Rejection) {
        self.end_attempt();
        self.error = Some(error);
    }

    /// Drops all per-attempt state. Input selection is kept.
    pub(crate) fn end_attempt(&mut self) {
        self.progress.discard();
        self.task_id = None;
        self.pending_summary = None;
        self.pending_source = None;
        self.phase = AttemptPhase::Idle;
        self.mark_dirty();
    }

    pub(crate) fn set_topic(&mut self, topic: String) {
        self.topic = topic;
        self.mark_dirty();
    }

    pub(crate) fn begin_quiz_request(&mut self) -> QuizRequestId {
        self.next_quiz_request += 1;
        self.quiz_request = Some(self.next_quiz_request);
        self.quiz_error = None;
        self.mark_dirty();
        self.next_quiz_request
    }

    pub(crate) fn set_quiz_error(&mut self, error: Option<Rejection>) {
        self.quiz_error = error;
        self.mark_dirty();
    }

    pub(crate) fn finish_quiz_request(&mut self) {
        self.quiz_request = None;
        self.mark_dirty();
    }

    pub(crate) fn set_quiz(&mut self, payload: QuizPayload) {
        self.quiz = Some(QuizSession::new(payload));
        self.mark_dirty();
    }

    pub(crate) fn quiz_mut(&mut self) -> Option<&mut QuizSession> {
        self.quiz.as_mut()
    }

    pub(crate) fn set_last_export(&mut self, record: ExportRecord) {
        self.last_export = Some(record);
        self.mark_dirty();
    }

    /// Back to a blank page. Id counters keep increasing so nothing issued
    /// before the reset can match afterwards.
    pub(crate) fn reset(&mut self) {
        let attempt = self.attempt;
        let next_quiz_request = self.next_quiz_request;
        *self = Self {
            attempt,
            next_quiz_request,
            ..Self::default()
        };
        self.mark_dirty();
    }
}
