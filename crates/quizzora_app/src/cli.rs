use std::path::PathBuf;

use clap::{ArgGroup, Parser};

use crate::platform::logging::LogDestination;

#[derive(Debug, Parser)]
#[command(name = "quizzora")]
#[command(about = "Summarize a video link or document and quiz yourself on it")]
#[command(version)]
#[command(group(ArgGroup::new("source").required(true).args(["link", "file"])))]
pub struct Cli {
    /// Settings file (RON). Defaults to ./quizzora.ron when present.
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Backend base URL (overrides the settings file)
    #[arg(long, env = "QUIZZORA_BACKEND")]
    pub backend: Option<String>,

    /// Directory for saved summaries and quizzes
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Where log output goes (overrides the settings file)
    #[arg(long, value_enum)]
    pub log: Option<LogDestination>,

    /// YouTube link to summarize
    #[arg(short, long)]
    pub link: Option<String>,

    /// PDF, audio or video file to summarize
    #[arg(short, long)]
    pub file: Option<PathBuf>,

    /// Generate a quiz on this topic once the summary is ready
    #[arg(short, long)]
    pub topic: Option<String>,

    /// Answers to the multiple-choice questions, one letter each (`-` skips),
    /// e.g. `bca-d`
    #[arg(short, long, requires = "topic")]
    pub answers: Option<String>,

    /// Save the summary as quizzora-summary-YYYY-MM-DD.txt
    #[arg(long)]
    pub save_summary: bool,

    /// Save the quiz as quizzora-quiz-YYYY-MM-DD.txt
    #[arg(long, requires = "topic")]
    pub save_quiz: bool,
}

/// Parses an answer string into one choice per question. Letters select an
/// option, `-` leaves the question unanswered; commas and whitespace are
/// ignored.
pub fn parse_answers(raw: &str) -> Result<Vec<Option<usize>>, String> {
    raw.chars()
        .filter(|c| !c.is_whitespace() && *c != ',')
        .map(|c| match c {
            '-' => Ok(None),
            'a'..='z' | 'A'..='Z' => Ok(Some(usize::from(c.to_ascii_lowercase() as u8 - b'a'))),
            other => Err(format!("invalid answer {other:?}; use option letters or '-'")),
        })
        .collect()
}
