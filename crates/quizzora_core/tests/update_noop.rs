use quizzora_core::{update, AppState, Msg, SubmissionOutcome, TaskStatus};

#[test]
fn tick_does_not_touch_state() {
    let state = AppState::new();
    let (next, effects) = update(state.clone(), Msg::Tick);

    assert_eq!(state, next);
    assert!(effects.is_empty());
}

#[test]
fn engine_events_without_an_attempt_are_ignored() {
    let state = AppState::new();
    let msgs = [
        Msg::ProgressTick {
            attempt: 0,
            sample: 0.5,
        },
        Msg::SubmissionResolved {
            attempt: 0,
            outcome: SubmissionOutcome::TaskAccepted {
                task_id: "t1".to_string(),
            },
        },
        Msg::StatusPolled {
            attempt: 0,
            status: TaskStatus::InProgress {
                fraction: Some(0.5),
            },
        },
        Msg::FinalizeElapsed { attempt: 0 },
        Msg::CancelClicked,
        Msg::GenerateQuizClicked,
        Msg::SaveSummaryClicked,
        Msg::SaveQuizClicked,
        Msg::CheckAnswersClicked,
    ];
    for msg in msgs {
        let (next, effects) = update(state.clone(), msg);
        assert_eq!(state, next);
        assert!(effects.is_empty());
    }
}
