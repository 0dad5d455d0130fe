use std::collections::VecDeque;
use std::fs;
use std::path::Path;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::{bail, Context};
use engine_logging::{engine_info, engine_warn};
use quizzora_core::{update, AppState, ExportKind, FileInput, Msg, MAX_UPLOAD_BYTES};
use quizzora_engine::EngineHandle;

use super::effects::EffectRunner;
use super::logging;
use super::render::{quiz_text, summary_text, Renderer};
use super::settings::AppSettings;
use crate::cli::{parse_answers, Cli};

/// How long to wait for an engine event before dispatching a `Tick`.
const TICK: Duration = Duration::from_millis(75);

pub fn run_app(cli: Cli) -> anyhow::Result<ExitCode> {
    let mut settings = AppSettings::load(cli.config.as_deref()).context("loading settings")?;
    if let Some(backend) = cli.backend.clone() {
        settings.backend_url = backend;
    }
    if let Some(dir) = cli.output_dir.clone() {
        settings.output_dir = dir;
    }
    if let Some(log) = cli.log {
        settings.log = log;
    }
    logging::initialize(settings.log);
    engine_info!("Using backend {}", settings.backend_url);

    let answers = cli
        .answers
        .as_deref()
        .map(parse_answers)
        .transpose()
        .map_err(anyhow::Error::msg)?;
    let input_msg = match (&cli.link, &cli.file) {
        (Some(link), _) => Msg::LinkEdited(link.clone()),
        (None, Some(path)) => Msg::FileSelected(read_file_input(path)?),
        (None, None) => bail!("either --link or --file is required"),
    };

    let engine = EngineHandle::new(settings.engine_settings()).context("starting engine")?;
    let mut app = App::new(EffectRunner::new(engine, settings.output_dir.clone()));

    app.dispatch(input_msg);
    if let Some(error) = app.state.error() {
        eprintln!("Error: {error}");
        return Ok(ExitCode::FAILURE);
    }
    app.dispatch(Msg::GenerateSummaryClicked);
    app.pump_until(|state| !state.phase().is_busy())?;

    if let Some(error) = app.state.error() {
        eprintln!("Error: {error}");
        return Ok(ExitCode::FAILURE);
    }
    let Some(summary) = app.state.summary().cloned() else {
        bail!("attempt ended without a summary");
    };
    println!("{}", summary_text(&summary));

    let mut ok = true;
    if cli.save_summary {
        app.dispatch(Msg::SaveSummaryClicked);
        ok &= app.report_export(ExportKind::Summary);
    }

    if let Some(topic) = cli.topic.clone() {
        app.dispatch(Msg::TopicEdited(topic));
        app.dispatch(Msg::GenerateQuizClicked);
        app.pump_until(|state| state.quiz_in_flight().is_none())?;

        if let Some(error) = app.state.quiz_error() {
            eprintln!("Quiz error: {error}");
            return Ok(ExitCode::FAILURE);
        }

        if let Some(answers) = answers {
            for (question, option) in answers.into_iter().enumerate() {
                if let Some(option) = option {
                    app.dispatch(Msg::AnswerSelected { question, option });
                }
            }
            app.dispatch(Msg::CheckAnswersClicked);
        }
        if let Some(quiz) = app.state.view().quiz {
            println!("{}", quiz_text(&quiz));
        }

        if cli.save_quiz {
            app.dispatch(Msg::SaveQuizClicked);
            ok &= app.report_export(ExportKind::Quiz);
        }
    }

    Ok(if ok {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

/// Reads the file to upload. Files over the upload limit are not read; only
/// their size is kept so validation can reject them.
fn read_file_input(path: &Path) -> anyhow::Result<FileInput> {
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    let mime = mime_guess::from_path(path)
        .first_raw()
        .unwrap_or_default()
        .to_string();
    let size = fs::metadata(path)
        .with_context(|| format!("inspecting {}", path.display()))?
        .len();
    if size > MAX_UPLOAD_BYTES {
        engine_warn!("{} is {size} bytes; not reading it", path.display());
        return Ok(FileInput::unread(name, mime, size));
    }
    let bytes = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    Ok(FileInput::new(name, mime, bytes))
}

struct App {
    state: AppState,
    runner: EffectRunner,
    renderer: Renderer,
    inbox: VecDeque<Msg>,
}

impl App {
    fn new(runner: EffectRunner) -> Self {
        Self {
            state: AppState::new(),
            runner,
            renderer: Renderer::new(),
            inbox: VecDeque::new(),
        }
    }

    fn dispatch(&mut self, msg: Msg) {
        self.inbox.push_back(msg);
        while let Some(msg) = self.inbox.pop_front() {
            let state = std::mem::take(&mut self.state);
            let (mut state, effects) = update(state, msg);
            if state.consume_dirty() {
                self.renderer.render(&state.view());
            }
            self.state = state;
            self.inbox.extend(self.runner.run(effects));
        }
    }

    /// Feeds engine events into `update` until `done` holds. Fails if the
    /// engine stops first.
    fn pump_until(&mut self, done: impl Fn(&AppState) -> bool) -> anyhow::Result<()> {
        while !done(&self.state) {
            let msg = self
                .runner
                .next_msg(TICK)
                .context("waiting for the engine")?
                .unwrap_or(Msg::Tick);
            self.dispatch(msg);
        }
        Ok(())
    }

    fn report_export(&self, kind: ExportKind) -> bool {
        match self.state.last_export() {
            Some(record) if record.kind == kind => match &record.result {
                Ok(path) => {
                    println!("Saved {path}");
                    true
                }
                Err(err) => {
                    eprintln!("Save failed: {err}");
                    false
                }
            },
            _ => {
                engine_warn!("No export result recorded for {kind:?}");
                false
            }
        }
    }
}
