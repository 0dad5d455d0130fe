use crate::input::{validate, validate_selection, UploadInput};
use crate::outcome::{ErrorKind, QuizOutcome, Rejection, SubmissionOutcome, TaskStatus};
use crate::quiz::QuizPayload;
use crate::state::{AppState, AttemptId, AttemptPhase};
use crate::{Effect, ExportRecord, Msg};

/// Pure update function: applies a message to state and returns any effects.
///
/// Every message that carries an attempt or request id is checked against the
/// current one first; anything from an abandoned attempt is dropped without
/// touching state.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::LinkEdited(raw) => {
            if state.phase().is_busy() {
                return (state, Vec::new());
            }
            if raw.trim().is_empty() {
                if matches!(state.selection(), Some(UploadInput::Link { .. })) {
                    state.set_selection(None);
                }
            } else {
                state.set_selection(Some(UploadInput::link(raw)));
                state.set_error(None);
            }
            Vec::new()
        }
        Msg::FileSelected(file) => {
            if state.phase().is_busy() {
                return (state, Vec::new());
            }
            let input = UploadInput::File(file);
            match validate(&input) {
                Ok(()) => {
                    state.set_selection(Some(input));
                    state.set_error(None);
                }
                Err(reason) => state.set_error(Some(reason.into())),
            }
            Vec::new()
        }
        Msg::ClearInput => {
            if !state.phase().is_busy() && state.selection().is_some() {
                state.set_selection(None);
            }
            Vec::new()
        }
        Msg::GenerateSummaryClicked => {
            if state.phase() != AttemptPhase::Idle {
                return (state, Vec::new());
            }
            state.set_phase(AttemptPhase::Validating);
            match validate_selection(state.selection()) {
                Err(reason) => {
                    // A rejected file leaves nothing selected; keep its reason.
                    let rejected_file = state.selection().is_none()
                        && state
                            .error()
                            .is_some_and(|error| error.kind == ErrorKind::Validation);
                    if !rejected_file {
                        state.set_error(Some(reason.into()));
                    }
                    state.set_phase(AttemptPhase::Idle);
                    Vec::new()
                }
                Ok(()) => match state.selection().cloned() {
                    Some(input) => {
                        let attempt = state.begin_attempt(input.source_label());
                        vec![
                            Effect::Submit { attempt, input },
                            Effect::StartProgressTimer { attempt },
                        ]
                    }
                    None => {
                        state.set_phase(AttemptPhase::Idle);
                        Vec::new()
                    }
                },
            }
        }
        Msg::CancelClicked => {
            if !state.phase().is_cancellable() {
                return (state, Vec::new());
            }
            let attempt = state.attempt();
            state.end_attempt();
            vec![Effect::CancelAttempt { attempt }]
        }
        Msg::DismissError => {
            if state.error().is_some() {
                state.set_error(None);
            }
            if state.quiz_error().is_some() {
                state.set_quiz_error(None);
            }
            Vec::new()
        }
        Msg::ProgressTick { attempt, sample } => {
            if is_current(&state, attempt)
                && matches!(state.phase(), AttemptPhase::Submitting | AttemptPhase::Polling)
            {
                state.simulated_tick(sample);
            }
            Vec::new()
        }
        Msg::SubmissionResolved { attempt, outcome } => {
            if !is_current(&state, attempt) || state.phase() != AttemptPhase::Submitting {
                return (state, Vec::new());
            }
            match outcome {
                SubmissionOutcome::CachedSummary { text } => {
                    state.begin_finalizing(text);
                    vec![Effect::Finalize { attempt }]
                }
                SubmissionOutcome::TaskAccepted { task_id } => {
                    state.begin_polling(task_id.clone());
                    vec![Effect::StartPolling { attempt, task_id }]
                }
                SubmissionOutcome::Rejected(error) => fail(&mut state, attempt, error),
            }
        }
        Msg::StatusPolled { attempt, status } => {
            if !is_current(&state, attempt) || state.phase() != AttemptPhase::Polling {
                return (state, Vec::new());
            }
            match status {
                TaskStatus::InProgress { fraction } => {
                    if let Some(fraction) = fraction {
                        state.report_progress(fraction);
                    }
                    Vec::new()
                }
                TaskStatus::Completed { summary } => {
                    state.begin_finalizing(summary);
                    vec![Effect::Finalize { attempt }]
                }
                TaskStatus::Failed(error) => fail(&mut state, attempt, error),
            }
        }
        Msg::FinalizeElapsed { attempt } => {
            if is_current(&state, attempt) && state.phase() == AttemptPhase::Finalizing {
                state.complete_attempt();
                vec![Effect::CancelAttempt { attempt }]
            } else {
                Vec::new()
            }
        }
        Msg::TopicEdited(topic) => {
            state.set_topic(topic);
            Vec::new()
        }
        Msg::GenerateQuizClicked => {
            if state.quiz_in_flight().is_some() {
                return (state, Vec::new());
            }
            let Some(summary) = state.summary().map(|doc| doc.text.clone()) else {
                return (state, Vec::new());
            };
            let topic = state.topic().trim().to_string();
            if topic.is_empty() {
                state.set_quiz_error(Some(Rejection::topic_required()));
                return (state, Vec::new());
            }
            let request = state.begin_quiz_request();
            vec![Effect::RequestQuiz {
                request,
                summary,
                topic,
            }]
        }
        Msg::QuizResolved { request, outcome } => {
            if state.quiz_in_flight() != Some(request) {
                return (state, Vec::new());
            }
            state.finish_quiz_request();
            match outcome {
                QuizOutcome::Ready(payload) => state.set_quiz(payload),
                QuizOutcome::Rejected(error) => state.set_quiz_error(Some(error)),
            }
            Vec::new()
        }
        Msg::AnswerSelected { question, option } => {
            let changed = state.quiz_mut().is_some_and(|session| {
                if session.checked {
                    return false;
                }
                let in_range = match &session.payload {
                    QuizPayload::Structured { mcq, .. } => mcq
                        .get(question)
                        .is_some_and(|item| option < item.options().len()),
                    QuizPayload::Raw { .. } => false,
                };
                if !in_range || session.selected[question] == Some(option) {
                    return false;
                }
                session.selected[question] = Some(option);
                true
            });
            if changed {
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::CheckAnswersClicked => {
            let changed = state.quiz_mut().is_some_and(|session| {
                let structured = matches!(session.payload, QuizPayload::Structured { .. });
                let changed = structured && !session.checked;
                session.checked |= structured;
                changed
            });
            if changed {
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::SaveSummaryClicked => match state.summary() {
            Some(doc) => vec![Effect::SaveSummary {
                summary: doc.text.clone(),
            }],
            None => Vec::new(),
        },
        Msg::SaveQuizClicked => match (state.quiz(), state.summary()) {
            (Some(session), Some(doc)) => vec![Effect::SaveQuiz {
                payload: session.payload.clone(),
                source: doc.source.clone(),
            }],
            _ => Vec::new(),
        },
        Msg::ExportFinished { kind, result } => {
            state.set_last_export(ExportRecord { kind, result });
            Vec::new()
        }
        Msg::StartOver => {
            if state.phase() == AttemptPhase::Idle {
                state.reset();
            }
            Vec::new()
        }
        Msg::Tick => Vec::new(),
    };

    (state, effects)
}

fn is_current(state: &AppState, attempt: AttemptId) -> bool {
    state.attempt() == attempt
}

fn fail(state: &mut AppState, attempt: AttemptId, error: Rejection) -> Vec<Effect> {
    state.fail_attempt(error);
    vec![Effect::CancelAttempt { attempt }]
}
