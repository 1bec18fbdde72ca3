//! Asynchronous leveled logging into a size-rotated ring of files.
//!
//! Producers format records on their own thread and push them into a small
//! bounded queue; a single dispatcher thread appends them to
//! `<base>/logs/server.log.1` and rotates the ring when the file grows past
//! the configured limit.
//!
//! ```no_run
//! let signal = ring_logger::ShutdownSignal::new();
//! let config = ring_logger::LoggerConfig::default().with_base_dir("/tmp/x").with_level("info");
//! assert!(ring_logger::init(config, &signal));
//! ring_logger::log!("svc", "INFO", "user %s logged in", "bob");
//! signal.trigger();
//! ring_logger::completion().unwrap().wait();
//! ```

mod config;
mod error;
mod level;
mod logger;
mod logger_macro;
pub mod msg_fmt;
mod queue;
mod redirect;
mod rotation;
mod shutdown;
mod targets;
mod writer;

pub use config::*;
pub use error::Error;
pub use level::{AdmissionPolicy, Level, COLOR_RESET};
pub use logger::Logger;
pub use msg_fmt::CallSite;
pub use queue::{LogRecord, MessageQueue, Submission};
pub use redirect::redirect_std_streams;
pub use rotation::{RotatingFileTarget, RotationState};
pub use shutdown::{Completion, ShutdownSignal};
pub use targets::{ConsoleLogTarget, LogTarget};
pub use writer::DispatcherState;

use std::fmt::Display;
use std::io::Write;
use std::sync::{Mutex, OnceLock, PoisonError};

static LOGGER: OnceLock<Logger> = OnceLock::new();
static INIT_LOCK: Mutex<()> = Mutex::new(());

/// Starts the process-wide logger. Returns `true` on success, and also when
/// the logger is already running (the second call changes nothing). Any
/// setup failure is printed and reported as `false`.
pub fn init(config: LoggerConfig, signal: &ShutdownSignal) -> bool {
    let _guard = INIT_LOCK.lock().unwrap_or_else(PoisonError::into_inner);
    if LOGGER.get().is_some() {
        return true;
    }
    match Logger::start(config, signal) {
        Ok(logger) => LOGGER.set(logger).is_ok(),
        Err(err) => {
            eprintln!("ring_logger: {}", err);
            false
        }
    }
}

pub fn is_initialized() -> bool {
    LOGGER.get().is_some()
}

/// Entry point behind [`log!`]. Before [`init`] the rendered line is echoed
/// to stdout in the level's color.
pub fn emit(
    component: &str,
    level: &str,
    template: &str,
    args: &[&dyn Display],
    call_site: CallSite,
) {
    match LOGGER.get() {
        Some(logger) => logger.log(component, level, template, args, call_site),
        None => echo(component, level, template, args, call_site),
    }
}

fn echo(component: &str, level: &str, template: &str, args: &[&dyn Display], call_site: CallSite) {
    let Some(level) = Level::resolve(level) else {
        return;
    };
    let rendered = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        msg_fmt::render(
            &msg_fmt::Entry {
                component,
                level,
                template,
                args,
                call_site,
            },
            true,
        )
    }));
    if let Ok(text) = rendered {
        let _ = std::io::stdout().write_all(text.as_bytes());
    }
}

pub fn threshold() -> Option<Level> {
    LOGGER.get().map(Logger::threshold)
}

pub fn completion() -> Option<Completion> {
    LOGGER.get().map(Logger::completion)
}

pub fn dispatcher_state() -> Option<DispatcherState> {
    LOGGER.get().map(Logger::state)
}
