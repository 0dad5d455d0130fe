use std::fmt::Write as _;

use indicatif::{ProgressBar, ProgressStyle};
use quizzora_core::{AppViewModel, ProgressPhase, QuizView, SummaryDoc};

const BAR_TEMPLATE: &str = "{spinner:.green} [{bar:30.cyan/blue}] {pos:>3}% {wide_msg}";

/// Terminal renderer: an `indicatif` bar while an attempt is running, plain
/// text for everything else.
#[derive(Default)]
pub struct Renderer {
    bar: Option<ProgressBar>,
}

impl Renderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn render(&mut self, view: &AppViewModel) {
        match view.progress {
            Some(progress) => {
                let bar = self.bar.get_or_insert_with(new_bar);
                bar.set_position(u64::from(progress.percent));
                bar.set_message(phase_label(progress.phase));
            }
            None => {
                if let Some(bar) = self.bar.take() {
                    bar.finish_and_clear();
                }
            }
        }
    }
}

fn new_bar() -> ProgressBar {
    let bar = ProgressBar::new(100);
    let style = ProgressStyle::with_template(BAR_TEMPLATE)
        .map(|style| style.progress_chars("█▓░"))
        .unwrap_or_else(|_| ProgressStyle::default_bar());
    bar.set_style(style);
    bar.enable_steady_tick(std::time::Duration::from_millis(120));
    bar
}

pub fn phase_label(phase: ProgressPhase) -> &'static str {
    match phase {
        ProgressPhase::Simulated => "Processing...",
        ProgressPhase::Reported => "Summarizing...",
        ProgressPhase::Finalizing => "Done",
    }
}

pub fn summary_text(summary: &SummaryDoc) -> String {
    format!("SUMMARY\nSource: {}\n\n{}\n", summary.source, summary.text)
}

/// Plain-text quiz for the terminal. Options are lettered; once answers are
/// checked each question shows the pick and the correct letter.
pub fn quiz_text(quiz: &QuizView) -> String {
    let mut out = String::new();
    match quiz {
        QuizView::Raw { text } => {
            out.push_str(text);
            out.push('\n');
        }
        QuizView::Structured {
            mcq,
            short_answer,
            mcq_notice,
            short_answer_notice,
            score,
        } => {
            out.push_str("MULTIPLE CHOICE QUESTIONS\n");
            if let Some(notice) = mcq_notice {
                let _ = writeln!(out, "{notice}");
            }
            for (idx, row) in mcq.iter().enumerate() {
                let _ = writeln!(out, "{}. {}", idx + 1, row.question);
                for (opt, option) in row.options.iter().enumerate() {
                    let marker = match (row.selected == Some(opt), row.correct) {
                        (true, Some(correct)) if correct == opt => "[x] ",
                        (true, Some(_)) => "[!] ",
                        (true, None) => "[*] ",
                        (false, Some(correct)) if correct == opt => "[ ] <- ",
                        _ => "",
                    };
                    let _ = writeln!(out, "   {marker}{option}");
                }
                out.push('\n');
            }

            out.push_str("SHORT ANSWER QUESTIONS\n");
            if let Some(notice) = short_answer_notice {
                let _ = writeln!(out, "{notice}");
            }
            for (idx, item) in short_answer.iter().enumerate() {
                let _ = writeln!(out, "{}. {}", idx + 1, item.question);
                let _ = writeln!(out, "   Sample answer: {}", item.sample_answer);
                out.push('\n');
            }

            if let Some(score) = score {
                let _ = writeln!(out, "Your score: {score}");
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::quiz_text;
    use quizzora_core::{McqRowView, QuizView, Score, NO_SHORT_ANSWER_NOTICE};

    #[test]
    fn checked_quiz_marks_picks_and_score() {
        let view = QuizView::Structured {
            mcq: vec![McqRowView {
                question: "2 + 2?".into(),
                options: vec!["a) 3".into(), "b) 4".into()],
                selected: Some(0),
                correct: Some(1),
            }],
            short_answer: Vec::new(),
            mcq_notice: None,
            short_answer_notice: Some(NO_SHORT_ANSWER_NOTICE),
            score: Some(Score {
                correct: 0,
                total: 1,
            }),
        };
        let text = quiz_text(&view);
        assert!(text.contains("   [!] a) 3\n"));
        assert!(text.contains("   [ ] <- b) 4\n"));
        assert!(text.contains(NO_SHORT_ANSWER_NOTICE));
        assert!(text.ends_with("Your score: 0/1\n"));
    }

    #[test]
    fn raw_quiz_is_printed_verbatim() {
        let text = quiz_text(&QuizView::Raw {
            text: "free text".into(),
        });
        assert_eq!(text, "free text\n");
    }
}
