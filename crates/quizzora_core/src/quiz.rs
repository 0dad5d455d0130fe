use std::fmt;
use std::fmt::Write as _;

/// One multiple-choice question. Always has at least two options and a
/// correct index inside them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct McqItem {
    question: String,
    options: Vec<String>,
    correct_index: usize,
}

impl McqItem {
    /// Returns `None` when fewer than two options are given or the correct
    /// index falls outside them.
    pub fn new(question: impl Into<String>, options: Vec<String>, correct_index: usize) -> Option<Self> {
        if options.len() < 2 || correct_index >= options.len() {
            return None;
        }
        Some(Self {
            question: question.into(),
            options,
            correct_index,
        })
    }

    pub fn question(&self) -> &str {
        &self.question
    }

    pub fn options(&self) -> &[String] {
        &self.options
    }

    pub fn correct_index(&self) -> usize {
        self.correct_index
    }

    pub fn correct_option(&self) -> &str {
        &self.options[self.correct_index]
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShortAnswerItem {
    pub question: String,
    pub sample_answer: String,
}

/// Generated quiz content. `Raw` carries text the backend produced without
/// a usable structure; it is displayed verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuizPayload {
    Structured {
        mcq: Vec<McqItem>,
        short_answer: Vec<ShortAnswerItem>,
    },
    Raw {
        text: String,
    },
}

impl QuizPayload {
    pub fn mcq_count(&self) -> usize {
        match self {
            QuizPayload::Structured { mcq, .. } => mcq.len(),
            QuizPayload::Raw { .. } => 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Score {
    pub correct: usize,
    pub total: usize,
}

impl Score {
    /// Scores `selected` against `mcq`. Unanswered questions count as wrong.
    pub fn compute(mcq: &[McqItem], selected: &[Option<usize>]) -> Self {
        let correct = mcq
            .iter()
            .enumerate()
            .filter(|(idx, item)| selected.get(*idx).copied().flatten() == Some(item.correct_index))
            .count();
        Self {
            correct,
            total: mcq.len(),
        }
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.correct, self.total)
    }
}

/// Letter label for an option index: 0 -> 'a', 1 -> 'b', ...
pub fn option_letter(index: usize) -> char {
    u8::try_from(index)
        .ok()
        .and_then(|idx| b'a'.checked_add(idx))
        .filter(u8::is_ascii_lowercase)
        .map(char::from)
        .unwrap_or('?')
}

/// Plain-text rendering of a quiz, as written by the quiz export.
pub fn quiz_transcript(payload: &QuizPayload, source: &str, date: &str) -> String {
    let mut out = String::new();
    out.push_str("QUIZZORA GENERATED QUIZ\n");
    let _ = writeln!(out, "Source: {source}");
    let _ = writeln!(out, "Date: {date}");
    out.push('\n');

    match payload {
        QuizPayload::Raw { text } => {
            out.push_str(text);
            if !text.ends_with('\n') {
                out.push('\n');
            }
        }
        QuizPayload::Structured { mcq, short_answer } => {
            out.push_str("MULTIPLE CHOICE QUESTIONS\n");
            for (idx, item) in mcq.iter().enumerate() {
                let _ = writeln!(out, "{}. {}", idx + 1, item.question());
                for (opt_idx, option) in item.options().iter().enumerate() {
                    let _ = writeln!(out, "   {}) {}", option_letter(opt_idx), option);
                }
                let _ = writeln!(
                    out,
                    "   Correct answer: {}) {}",
                    option_letter(item.correct_index()),
                    item.correct_option()
                );
                out.push('\n');
            }

            out.push_str("SHORT ANSWER QUESTIONS\n");
            for (idx, item) in short_answer.iter().enumerate() {
                let _ = writeln!(out, "{}. {}", idx + 1, item.question);
                let _ = writeln!(out, "   Sample answer: {}", item.sample_answer);
                out.push('\n');
            }
        }
    }
    out
}
