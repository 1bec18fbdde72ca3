use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, Sender, TryRecvError};

/// Cancellation signal observed by the dispatcher.
///
/// Triggering drops the only sender, which the dispatcher sees as a
/// disconnect; triggering again is a no-op. Clones share the same signal.
#[derive(Clone)]
pub struct ShutdownSignal {
    sender: Arc<Mutex<Option<Sender<()>>>>,
    receiver: Receiver<()>,
}

impl Default for ShutdownSignal {
    fn default() -> Self {
        ShutdownSignal::new()
    }
}

impl ShutdownSignal {
    pub fn new() -> Self {
        let (sender, receiver) = bounded(0);
        ShutdownSignal {
            sender: Arc::new(Mutex::new(Some(sender))),
            receiver,
        }
    }

    pub fn trigger(&self) {
        self.sender
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
    }

    pub fn is_triggered(&self) -> bool {
        self.sender
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_none()
    }

    pub(crate) fn receiver(&self) -> Receiver<()> {
        self.receiver.clone()
    }
}

/// Completion acknowledgment: resolves once the dispatcher has drained the
/// queue and stopped.
#[derive(Clone)]
pub struct Completion {
    receiver: Receiver<()>,
}

impl Completion {
    pub(crate) fn channel() -> (Sender<()>, Completion) {
        let (sender, receiver) = bounded(1);
        (sender, Completion { receiver })
    }

    pub fn wait(&self) {
        // The dispatcher never sends; dropping its sender is the signal.
        let _ = self.receiver.recv();
    }

    /// Returns `true` if the dispatcher stopped within `timeout`.
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        !matches!(
            self.receiver.recv_timeout(timeout),
            Err(RecvTimeoutError::Timeout)
        )
    }

    pub fn is_complete(&self) -> bool {
        !matches!(self.receiver.try_recv(), Err(TryRecvError::Empty))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trigger_is_idempotent_and_shared_by_clones() {
        let signal = ShutdownSignal::new();
        let clone = signal.clone();
        assert!(!clone.is_triggered());

        signal.trigger();
        signal.trigger();
        assert!(clone.is_triggered());
        assert!(clone.receiver().recv().is_err());
    }

    #[test]
    fn completion_resolves_when_sender_drops() {
        let (sender, completion) = Completion::channel();
        assert!(!completion.is_complete());
        assert!(!completion.wait_timeout(Duration::from_millis(10)));

        drop(sender);
        completion.wait();
        assert!(completion.is_complete());
        assert!(completion.wait_timeout(Duration::from_millis(10)));
    }
}
