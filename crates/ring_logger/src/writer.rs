use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crossbeam_channel::{select, Receiver, Sender};

use crate::queue::{LogRecord, MessageQueue};
use crate::targets::LogTarget;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum DispatcherState {
    Running = 0,
    Draining = 1,
    Stopped = 2,
}

impl DispatcherState {
    pub(crate) fn load(cell: &AtomicU8) -> DispatcherState {
        match cell.load(Ordering::Acquire) {
            0 => DispatcherState::Running,
            1 => DispatcherState::Draining,
            _ => DispatcherState::Stopped,
        }
    }
}

enum Event {
    Record(LogRecord),
    QueueClosed,
    Shutdown,
}

/// The single consumer: the only code that touches the log target.
pub(crate) struct Dispatcher {
    pub(crate) records: Receiver<LogRecord>,
    pub(crate) shutdown: Receiver<()>,
    /// Stops only this dispatcher; `shutdown` may be shared with other loggers.
    pub(crate) stop: Receiver<()>,
    pub(crate) queue: Arc<MessageQueue>,
    pub(crate) target: Box<dyn LogTarget + Send>,
    pub(crate) state: Arc<AtomicU8>,
    pub(crate) done: Sender<()>,
}

impl Dispatcher {
    pub(crate) fn spawn(self) -> std::io::Result<JoinHandle<()>> {
        thread::Builder::new()
            .name("ring-logger-dispatcher".into())
            .spawn(move || self.run())
    }

    fn set_state(&self, state: DispatcherState) {
        self.state.store(state as u8, Ordering::Release);
    }

    fn run(mut self) {
        self.set_state(DispatcherState::Running);
        loop {
            let event = select! {
                recv(self.records) -> record => match record {
                    Ok(record) => Event::Record(record),
                    Err(_) => Event::QueueClosed,
                },
                recv(self.shutdown) -> _ => Event::Shutdown,
                recv(self.stop) -> _ => Event::Shutdown,
            };
            match event {
                Event::Record(record) => self.target.log(&record.text),
                Event::QueueClosed => break,
                Event::Shutdown => {
                    self.drain();
                    break;
                }
            }
        }
        self.set_state(DispatcherState::Stopped);
        // Dropping the last completion sender wakes every waiter.
        drop(self.done);
    }

    fn drain(&mut self) {
        self.set_state(DispatcherState::Draining);
        let pending = self.queue.close();
        self.target.log(&format!(
            "[WARNING]:: received logger termination. logger exiting ({}).\n",
            pending
        ));
        self.target.log(
            "[WARNING]:: breaking out on closed log message-queue. starting to flush all the blocked logs.\n",
        );
        for record in self.records.iter() {
            self.target.log(&record.text);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shutdown::{Completion, ShutdownSignal};
    use crossbeam_channel::unbounded;

    struct ChannelTarget(Sender<String>);

    impl LogTarget for ChannelTarget {
        fn log(&mut self, message: &str) {
            let _ = self.0.send(message.to_string());
        }
    }

    #[test]
    fn drains_queued_records_before_completing() {
        let (queue, records) = MessageQueue::with_capacity(10);
        let queue = Arc::new(queue);
        for n in 0..5 {
            queue.submit(LogRecord::new("t", format!("record {n}\n")));
        }
        let (sink, written) = unbounded();
        let signal = ShutdownSignal::new();
        signal.trigger();
        let stop = ShutdownSignal::new();
        let (done, completion) = Completion::channel();
        let state = Arc::new(AtomicU8::new(DispatcherState::Running as u8));

        let dispatcher = Dispatcher {
            records,
            shutdown: signal.receiver(),
            stop: stop.receiver(),
            queue: queue.clone(),
            target: Box::new(ChannelTarget(sink)),
            state: state.clone(),
            done,
        };
        let handle = dispatcher.spawn().unwrap();
        completion.wait();
        handle.join().unwrap();

        let lines: Vec<String> = written.try_iter().collect();
        let records: Vec<&String> = lines.iter().filter(|l| l.starts_with("record")).collect();
        assert_eq!(records.len(), 5);
        for (n, line) in records.iter().enumerate() {
            assert_eq!(**line, format!("record {n}\n"));
        }
        assert!(lines.iter().any(|l| l.contains("logger exiting")));
        assert!(queue.is_closed());
        assert_eq!(DispatcherState::load(&state), DispatcherState::Stopped);
    }
}
