use crate::outcome::Rejection;
use crate::progress::ProgressPhase;
use crate::quiz::{option_letter, QuizPayload, Score, ShortAnswerItem};
use crate::state::{AttemptId, AttemptPhase, ExportRecord, QuizSession, SummaryDoc};

pub const NO_MCQ_NOTICE: &str = "No multiple choice questions available.";
pub const NO_SHORT_ANSWER_NOTICE: &str = "No short answer questions available.";

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppViewModel {
    pub phase: AttemptPhase,
    pub attempt: AttemptId,
    pub busy: bool,
    pub can_submit: bool,
    pub selection: Option<SelectionView>,
    pub progress: Option<ProgressView>,
    pub error: Option<Rejection>,
    pub summary: Option<SummaryDoc>,
    pub topic: String,
    pub quiz_pending: bool,
    pub quiz_error: Option<Rejection>,
    pub quiz: Option<QuizView>,
    pub last_export: Option<ExportRecord>,
    pub dirty: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionView {
    Link { url: String },
    File { name: String, size_bytes: u64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressView {
    pub percent: u8,
    pub phase: ProgressPhase,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct McqRowView {
    pub question: String,
    /// Options prefixed with their letter, e.g. `a) Paris`.
    pub options: Vec<String>,
    pub selected: Option<usize>,
    /// Set once answers are checked.
    pub correct: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuizView {
    Structured {
        mcq: Vec<McqRowView>,
        short_answer: Vec<ShortAnswerItem>,
        /// Shown in place of an empty list.
        mcq_notice: Option<&'static str>,
        short_answer_notice: Option<&'static str>,
        score: Option<Score>,
    },
    Raw {
        text: String,
    },
}

impl QuizView {
    pub(crate) fn from_session(session: &QuizSession) -> Self {
        match &session.payload {
            QuizPayload::Raw { text } => QuizView::Raw { text: text.clone() },
            QuizPayload::Structured { mcq, short_answer } => {
                let rows = mcq
                    .iter()
                    .enumerate()
                    .map(|(idx, item)| McqRowView {
                        question: item.question().to_string(),
                        options: item
                            .options()
                            .iter()
                            .enumerate()
                            .map(|(opt, text)| format!("{}) {}", option_letter(opt), text))
                            .collect(),
                        selected: session.selected.get(idx).copied().flatten(),
                        correct: session.checked.then_some(item.correct_index()),
                    })
                    .collect();
                QuizView::Structured {
                    mcq: rows,
                    short_answer: short_answer.clone(),
                    mcq_notice: mcq.is_empty().then_some(NO_MCQ_NOTICE),
                    short_answer_notice: short_answer.is_empty().then_some(NO_SHORT_ANSWER_NOTICE),
                    score: session.score(),
                }
            }
        }
    }
}
