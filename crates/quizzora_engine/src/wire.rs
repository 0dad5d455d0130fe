//! Decoding of backend JSON bodies into core outcomes.
//!
//! Every shape the backend may produce is decided here, once. Anything outside
//! the known shapes becomes a malformed-response rejection; nothing is
//! guessed into a success.

use engine_logging::engine_debug;
use quizzora_core::{
    McqItem, QuizOutcome, QuizPayload, Rejection, ShortAnswerItem, SubmissionOutcome, TaskStatus,
};
use serde_json::Value;

const PROCESSING_FAILED: &str = "Processing failed";

/// Interprets the response to `POST /api/upload` or `POST /api/youtube`.
pub fn decode_submission(body: &Value) -> SubmissionOutcome {
    if let Some(message) = error_text(body) {
        return SubmissionOutcome::Rejected(Rejection::backend(message));
    }
    if body.get("fromCache").and_then(Value::as_bool) == Some(true) {
        if let Some(text) = body.get("summary").and_then(Value::as_str) {
            return SubmissionOutcome::CachedSummary {
                text: text.to_string(),
            };
        }
    }
    if let Some(task_id) = task_id(body) {
        return SubmissionOutcome::TaskAccepted { task_id };
    }
    SubmissionOutcome::Rejected(Rejection::malformed())
}

/// Interprets the response to `GET /api/status/{taskId}`.
pub fn decode_status(body: &Value) -> TaskStatus {
    if let Some(message) = error_text(body) {
        return TaskStatus::Failed(Rejection::backend(message));
    }
    match body.get("status").and_then(Value::as_str) {
        Some("error") => TaskStatus::Failed(Rejection::backend(PROCESSING_FAILED)),
        Some("completed") => match body.get("summary").and_then(Value::as_str) {
            Some(summary) => TaskStatus::Completed {
                summary: summary.to_string(),
            },
            None => TaskStatus::Failed(Rejection::malformed()),
        },
        Some(_) => TaskStatus::InProgress {
            fraction: body.get("progress").and_then(Value::as_f64),
        },
        None => TaskStatus::Failed(Rejection::malformed()),
    }
}

/// Interprets the response to `POST /api/generate_quiz`.
pub fn decode_quiz(body: &Value) -> QuizOutcome {
    if let Some(message) = error_text(body) {
        if let Some(details) = body.get("details").and_then(Value::as_str) {
            engine_debug!("Quiz generation failed: {details}");
        }
        return QuizOutcome::Rejected(Rejection::backend(message));
    }

    let mcq = body.get("quiz");
    let short = body.get("shortAnswers");
    if mcq.is_some() || short.is_some() {
        let payload = structured(mcq, short).unwrap_or_else(|| {
            engine_debug!("Quiz body has unusable structure; showing it as raw text");
            QuizPayload::Raw {
                text: serde_json::to_string_pretty(body).unwrap_or_else(|_| body.to_string()),
            }
        });
        return QuizOutcome::Ready(payload);
    }

    match body.get("raw_response") {
        Some(Value::String(text)) => QuizOutcome::Ready(QuizPayload::Raw { text: text.clone() }),
        Some(Value::Null) | None => QuizOutcome::Rejected(Rejection::malformed()),
        Some(other) => QuizOutcome::Ready(QuizPayload::Raw {
            text: other.to_string(),
        }),
    }
}

fn error_text(body: &Value) -> Option<String> {
    match body.get("error")? {
        Value::Null => None,
        Value::String(text) => Some(text.clone()),
        other => Some(other.to_string()),
    }
}

fn task_id(body: &Value) -> Option<String> {
    match body.get("taskId")? {
        Value::String(id) if !id.trim().is_empty() => Some(id.clone()),
        Value::Number(id) => Some(id.to_string()),
        _ => None,
    }
}

/// Builds a structured payload; `None` when any item breaks the contract.
/// A missing list counts as empty.
fn structured(mcq: Option<&Value>, short: Option<&Value>) -> Option<QuizPayload> {
    let mcq = match mcq {
        None | Some(Value::Null) => Vec::new(),
        Some(value) => value
            .as_array()?
            .iter()
            .map(mcq_item)
            .collect::<Option<Vec<_>>>()?,
    };
    let short_answer = match short {
        None | Some(Value::Null) => Vec::new(),
        Some(value) => value
            .as_array()?
            .iter()
            .map(short_answer_item)
            .collect::<Option<Vec<_>>>()?,
    };
    Some(QuizPayload::Structured { mcq, short_answer })
}

fn mcq_item(value: &Value) -> Option<McqItem> {
    let question = value.get("question")?.as_str()?;
    let options = value
        .get("options")?
        .as_array()?
        .iter()
        .map(|option| option.as_str().map(str::to_string))
        .collect::<Option<Vec<_>>>()?;
    let correct_index = answer_index(value.get("answer")?)?;
    McqItem::new(question, options, correct_index)
}

fn short_answer_item(value: &Value) -> Option<ShortAnswerItem> {
    let question = value.get("question")?.as_str()?;
    let sample_answer = value
        .get("sampleAnswer")
        .or_else(|| value.get("answer"))?
        .as_str()?;
    Some(ShortAnswerItem {
        question: question.to_string(),
        sample_answer: sample_answer.to_string(),
    })
}

/// Accepts `1`, `"1"`, `"b"` or `"B"` (all meaning the second option).
fn answer_index(value: &Value) -> Option<usize> {
    match value {
        Value::Number(number) => number.as_u64().and_then(|n| usize::try_from(n).ok()),
        Value::String(text) => {
            let text = text.trim();
            if let Ok(index) = text.parse::<usize>() {
                return Some(index);
            }
            let mut chars = text.chars();
            match (chars.next(), chars.next()) {
                (Some(letter), None) if letter.is_ascii_alphabetic() => {
                    Some(usize::from(letter.to_ascii_lowercase() as u8 - b'a'))
                }
                _ => None,
            }
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::{answer_index, decode_status, error_text};
    use quizzora_core::{ErrorKind, TaskStatus};
    use serde_json::json;

    #[test]
    fn answer_index_accepts_numbers_and_letters() {
        assert_eq!(answer_index(&json!(2)), Some(2));
        assert_eq!(answer_index(&json!("3")), Some(3));
        assert_eq!(answer_index(&json!("c")), Some(2));
        assert_eq!(answer_index(&json!(" B ")), Some(1));
        assert_eq!(answer_index(&json!(-1)), None);
        assert_eq!(answer_index(&json!("b) Paris")), None);
        assert_eq!(answer_index(&json!(null)), None);
    }

    #[test]
    fn null_error_field_is_not_an_error() {
        assert_eq!(error_text(&json!({"error": null})), None);
        assert_eq!(
            error_text(&json!({"error": {"code": 1}})).as_deref(),
            Some("{\"code\":1}")
        );
    }

    #[test]
    fn status_without_progress_is_still_in_progress() {
        assert_eq!(
            decode_status(&json!({"status": "processing"})),
            TaskStatus::InProgress { fraction: None }
        );
        match decode_status(&json!({"status": "completed"})) {
            TaskStatus::Failed(rejection) => {
                assert_eq!(rejection.kind, ErrorKind::MalformedResponse)
            }
            other => panic!("unexpected status {other:?}"),
        }
    }
}
