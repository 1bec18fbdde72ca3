use std::any::Any;
use std::fmt::Display;
use std::fs;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::atomic::AtomicU8;
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::JoinHandle;

use crate::config::{LoggerConfig, LOG_DIR_NAME};
use crate::error::Error;
use crate::level::{AdmissionPolicy, Level};
use crate::msg_fmt::{self, CallSite, Entry};
use crate::queue::{LogRecord, MessageQueue, Submission};
use crate::rotation::RotatingFileTarget;
use crate::shutdown::{Completion, ShutdownSignal};
use crate::targets::{ConsoleLogTarget, LogTarget};
use crate::writer::{Dispatcher, DispatcherState};

/// One running log pipeline: admission, formatting, the queue and the
/// dispatcher thread that owns the sink.
pub struct Logger {
    threshold: Level,
    admission: AdmissionPolicy,
    file_backed: bool,
    queue: Arc<MessageQueue>,
    stop: ShutdownSignal,
    completion: Completion,
    state: Arc<AtomicU8>,
    handle: Mutex<Option<JoinHandle<()>>>,
}

fn resolve_base_dir(base_dir: Option<&Path>) -> Result<PathBuf, Error> {
    match base_dir {
        Some(dir) if !dir.as_os_str().is_empty() => Ok(dir.to_path_buf()),
        _ => {
            let exe = std::env::current_exe().map_err(Error::BaseDirectory)?;
            let dir = exe.parent().ok_or_else(|| {
                Error::BaseDirectory(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    "executable has no parent directory",
                ))
            })?;
            Ok(dir.to_path_buf())
        }
    }
}

fn panic_message(cause: &(dyn Any + Send)) -> &str {
    if let Some(message) = cause.downcast_ref::<&str>() {
        message
    } else if let Some(message) = cause.downcast_ref::<String>() {
        message
    } else {
        "unknown panic"
    }
}

impl Logger {
    /// Validates `config`, prepares the sink and starts the dispatcher.
    /// Shutdown happens when `signal` is triggered or the logger is dropped.
    /// Dropping stops only this logger and leaves `signal` untouched.
    pub fn start(config: LoggerConfig, signal: &ShutdownSignal) -> Result<Logger, Error> {
        let threshold = Level::from_config(&config.level)?;
        config.validate()?;

        let target: Box<dyn LogTarget + Send> = if config.file_backed {
            let base_dir = resolve_base_dir(config.base_dir.as_deref())?;
            let log_dir = base_dir.join(LOG_DIR_NAME);
            fs::create_dir_all(&log_dir).map_err(|source| Error::CreateDirectory {
                path: log_dir.clone(),
                source,
            })?;
            Box::new(RotatingFileTarget::open(
                &log_dir,
                config.max_files,
                config.file_size_limit,
                config.redirect_std_streams,
            )?)
        } else {
            Box::new(ConsoleLogTarget)
        };

        Logger::with_target(
            threshold,
            config.admission,
            config.queue_capacity,
            target,
            config.file_backed,
            signal,
        )
    }

    /// Starts a pipeline around any target. `file_backed == false` renders
    /// records with terminal colors.
    pub fn with_target(
        threshold: Level,
        admission: AdmissionPolicy,
        queue_capacity: usize,
        target: Box<dyn LogTarget + Send>,
        file_backed: bool,
        signal: &ShutdownSignal,
    ) -> Result<Logger, Error> {
        let (queue, records) = MessageQueue::with_capacity(queue_capacity.max(1));
        let queue = Arc::new(queue);
        let (done, completion) = Completion::channel();
        let state = Arc::new(AtomicU8::new(DispatcherState::Running as u8));
        let stop = ShutdownSignal::new();

        let dispatcher = Dispatcher {
            records,
            shutdown: signal.receiver(),
            stop: stop.receiver(),
            queue: queue.clone(),
            target,
            state: state.clone(),
            done,
        };
        let handle = dispatcher.spawn().map_err(Error::SpawnDispatcher)?;

        Ok(Logger {
            threshold,
            admission,
            file_backed,
            queue,
            stop,
            completion,
            state,
            handle: Mutex::new(Some(handle)),
        })
    }

    /// Formats and enqueues one message. Unknown levels and levels below
    /// the threshold are dropped silently; a fault while formatting is
    /// reported on stderr and never reaches the caller.
    pub fn log(
        &self,
        component: &str,
        level: &str,
        template: &str,
        args: &[&dyn Display],
        call_site: CallSite,
    ) {
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            self.try_log(component, level, template, args, call_site)
        }));
        if let Err(cause) = outcome {
            eprintln!(
                "[WARNING]:: log(): recovered from fault in [{}] {:?} at {} +{}: {}",
                component,
                template,
                call_site.file,
                call_site.line,
                panic_message(cause.as_ref()),
            );
        }
    }

    fn try_log(
        &self,
        component: &str,
        level: &str,
        template: &str,
        args: &[&dyn Display],
        call_site: CallSite,
    ) -> Submission {
        let Some(level) = Level::resolve(level) else {
            return Submission::Dropped;
        };
        if !self.admission.admits(self.threshold, level) {
            return Submission::Dropped;
        }
        let entry = Entry {
            component,
            level,
            template,
            args,
            call_site,
        };
        let text = msg_fmt::render(&entry, !self.file_backed);
        self.queue.submit(LogRecord::new(component, text))
    }

    pub fn threshold(&self) -> Level {
        self.threshold
    }

    pub fn is_file_backed(&self) -> bool {
        self.file_backed
    }

    pub fn state(&self) -> DispatcherState {
        DispatcherState::load(&self.state)
    }

    pub fn queued(&self) -> usize {
        self.queue.len()
    }

    pub fn completion(&self) -> Completion {
        self.completion.clone()
    }

    /// Stops this logger's dispatcher, waits for the drain and joins the
    /// thread. The caller's `ShutdownSignal` is not triggered. Safe to call
    /// repeatedly.
    pub fn shutdown(&self) {
        self.stop.trigger();
        self.completion.wait();
        let handle = self
            .handle
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(handle) = handle {
            if handle.join().is_err() {
                eprintln!("ring_logger: dispatcher thread panicked");
            }
        }
    }
}

impl Drop for Logger {
    fn drop(&mut self) {
        self.shutdown();
    }
}
