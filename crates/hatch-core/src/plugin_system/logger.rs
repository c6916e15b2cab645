use std::fmt;
use std::sync::Arc;

use log::Level;

/// Target used when resolver events go to the `log` facade
pub const LOG_TARGET: &str = "hatch_core::resolver";

/// Callback receiving resolver events
pub type LogFn = dyn Fn(Level, &str) + Send + Sync;

/// Where resolver events are reported.
///
/// With no callback installed, events go to the `log` facade.
#[derive(Clone, Default)]
pub struct Logger {
    sink: Option<Arc<LogFn>>,
}

impl Logger {
    /// Report through the `log` facade
    pub fn facade() -> Self {
        Self { sink: None }
    }

    /// Report to a caller-supplied callback
    pub fn from_fn<F>(callback: F) -> Self
    where
        F: Fn(Level, &str) + Send + Sync + 'static,
    {
        Self {
            sink: Some(Arc::new(callback)),
        }
    }

    pub fn log(&self, level: Level, message: &str) {
        match &self.sink {
            Some(sink) => sink(level, message),
            None => log::log!(target: LOG_TARGET, level, "{}", message),
        }
    }

    pub fn debug(&self, message: &str) {
        self.log(Level::Debug, message);
    }

    pub fn warn(&self, message: &str) {
        self.log(Level::Warn, message);
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sink = if self.sink.is_some() { "callback" } else { "log" };
        f.debug_struct("Logger").field("sink", &sink).finish()
    }
}
