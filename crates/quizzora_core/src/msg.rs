use crate::effect::ExportKind;
use crate::input::FileInput;
use crate::outcome::{QuizOutcome, SubmissionOutcome, TaskStatus};
use crate::state::{AttemptId, QuizRequestId};

#[derive(Debug, Clone, PartialEq)]
pub enum Msg {
    /// User edited the link box. A blank value clears a link selection.
    LinkEdited(String),
    /// User picked a file.
    FileSelected(FileInput),
    /// User removed the current link or file.
    ClearInput,
    /// User asked for a summary of the current input.
    GenerateSummaryClicked,
    /// User abandoned the in-flight attempt.
    CancelClicked,
    /// User closed the inline error.
    DismissError,
    /// Simulated progress timer fired; `sample` is in `0.0..1.0`.
    ProgressTick { attempt: AttemptId, sample: f64 },
    /// First backend response for an attempt.
    SubmissionResolved {
        attempt: AttemptId,
        outcome: SubmissionOutcome,
    },
    /// One status poll finished.
    StatusPolled { attempt: AttemptId, status: TaskStatus },
    /// The hold at 100% is over.
    FinalizeElapsed { attempt: AttemptId },
    /// User edited the quiz topic.
    TopicEdited(String),
    /// User asked for a quiz on the current summary.
    GenerateQuizClicked,
    /// Quiz request finished.
    QuizResolved {
        request: QuizRequestId,
        outcome: QuizOutcome,
    },
    /// User picked an option for a multiple-choice question.
    AnswerSelected { question: usize, option: usize },
    CheckAnswersClicked,
    SaveSummaryClicked,
    SaveQuizClicked,
    /// An export finished; `Ok` carries the written path.
    ExportFinished {
        kind: ExportKind,
        result: Result<String, String>,
    },
    /// Clear summary and quiz and start from a blank input.
    StartOver,
    /// UI/render tick to coalesce rendering.
    Tick,
}
