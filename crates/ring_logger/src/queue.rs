use std::sync::{PoisonError, RwLock};
use std::time::Duration;

use crossbeam_channel::{bounded, Receiver, SendTimeoutError, Sender};

// A producer blocked on a full queue re-checks the shutdown latch this often.
const BACKPRESSURE_RECHECK: Duration = Duration::from_millis(25);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRecord {
    pub component: String,
    pub text: String,
}

impl LogRecord {
    pub fn new(component: impl Into<String>, text: impl Into<String>) -> Self {
        LogRecord {
            component: component.into(),
            text: text.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Submission {
    Queued,
    Dropped,
}

/// Bounded FIFO between log producers and the dispatcher.
///
/// The sending half lives behind a lock so that closing the queue and
/// latching "no more submissions" are one step: once [`MessageQueue::close`]
/// has taken the sender, every later submit is a silent drop.
pub struct MessageQueue {
    sender: RwLock<Option<Sender<LogRecord>>>,
    capacity: usize,
}

impl MessageQueue {
    pub fn with_capacity(capacity: usize) -> (MessageQueue, Receiver<LogRecord>) {
        let (sender, receiver) = bounded(capacity);
        let queue = MessageQueue {
            sender: RwLock::new(Some(sender)),
            capacity,
        };
        (queue, receiver)
    }

    /// Enqueues `record`, blocking while the queue is full.
    pub fn submit(&self, record: LogRecord) -> Submission {
        let mut record = record;
        loop {
            let guard = self.sender.read().unwrap_or_else(PoisonError::into_inner);
            let Some(sender) = guard.as_ref() else {
                return Submission::Dropped;
            };
            match sender.send_timeout(record, BACKPRESSURE_RECHECK) {
                Ok(()) => return Submission::Queued,
                Err(SendTimeoutError::Timeout(returned)) => record = returned,
                Err(SendTimeoutError::Disconnected(_)) => return Submission::Dropped,
            }
        }
    }

    /// Latches the queue shut and returns how many records are still waiting
    /// to be received. The receiver keeps yielding those, then disconnects.
    pub fn close(&self) -> usize {
        let mut guard = self.sender.write().unwrap_or_else(PoisonError::into_inner);
        guard.take().map_or(0, |sender| sender.len())
    }

    pub fn is_closed(&self) -> bool {
        self.sender
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_none()
    }

    pub fn len(&self) -> usize {
        self.sender
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map_or(0, |sender| sender.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use std::thread;

    fn record(n: usize) -> LogRecord {
        LogRecord::new("test", format!("line {n}\n"))
    }

    #[test]
    fn records_come_out_in_submission_order() {
        let (queue, receiver) = MessageQueue::with_capacity(10);
        for n in 0..10 {
            assert_eq!(queue.submit(record(n)), Submission::Queued);
        }
        assert_eq!(queue.len(), 10);
        let texts: Vec<String> = receiver.try_iter().map(|r| r.text).collect();
        let expected: Vec<String> = (0..10).map(|n| format!("line {n}\n")).collect();
        assert_eq!(texts, expected);
    }

    #[test]
    fn full_queue_blocks_the_producer_until_space_frees() {
        let (queue, receiver) = MessageQueue::with_capacity(10);
        let queue = Arc::new(queue);
        for n in 0..10 {
            queue.submit(record(n));
        }

        let finished = Arc::new(AtomicBool::new(false));
        let producer = {
            let queue = queue.clone();
            let finished = finished.clone();
            thread::spawn(move || {
                let outcome = queue.submit(record(10));
                finished.store(true, Ordering::SeqCst);
                outcome
            })
        };

        thread::sleep(Duration::from_millis(150));
        assert!(!finished.load(Ordering::SeqCst), "producer should be blocked");

        assert_eq!(receiver.recv().unwrap().text, "line 0\n");
        assert_eq!(producer.join().unwrap(), Submission::Queued);
        assert_eq!(queue.len(), 10);
    }

    #[test]
    fn submit_after_close_is_a_silent_drop() {
        let (queue, receiver) = MessageQueue::with_capacity(10);
        queue.submit(record(0));
        queue.submit(record(1));

        assert_eq!(queue.close(), 2);
        assert!(queue.is_closed());
        assert_eq!(queue.submit(record(2)), Submission::Dropped);
        assert_eq!(queue.close(), 0);

        let drained: Vec<LogRecord> = receiver.iter().collect();
        assert_eq!(drained, vec![record(0), record(1)]);
    }

    #[test]
    fn close_releases_a_blocked_producer() {
        let (queue, _receiver) = MessageQueue::with_capacity(1);
        let queue = Arc::new(queue);
        queue.submit(record(0));

        let producer = {
            let queue = queue.clone();
            thread::spawn(move || queue.submit(record(1)))
        };
        thread::sleep(Duration::from_millis(60));
        assert_eq!(queue.close(), 1);
        assert_eq!(producer.join().unwrap(), Submission::Dropped);
    }
}
