//! Terminal front end: settings, logging, effect execution and rendering.
mod app;
mod effects;
pub(crate) mod logging;
mod render;
mod settings;

pub use app::run_app;
