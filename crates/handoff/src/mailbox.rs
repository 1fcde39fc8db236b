//! Mailbox built on a bounded tokio mpsc channel

use crate::{HandoffError, HandoffReceiver, HandoffSender};
use tokio::sync::mpsc::{self, error::TryRecvError};
use tracing::debug;

/// Slots in the mailbox (one, like the inter-core FIFO it replaces)
pub const DEFAULT_CAPACITY: usize = 1;

/// Create a mailbox with room for `capacity` samples in flight.
///
/// # Panics
/// Panics if `capacity` is zero.
pub fn mailbox<T>(capacity: usize) -> (MailboxSender<T>, MailboxReceiver<T>) {
    debug!("Creating handoff mailbox with {} slot(s)", capacity);
    let (tx, rx) = mpsc::channel(capacity);
    (MailboxSender { tx }, MailboxReceiver { rx })
}

/// Producer half of the mailbox
pub struct MailboxSender<T> {
    tx: mpsc::Sender<T>,
}

impl<T> HandoffSender<T> for MailboxSender<T> {
    fn has_room(&self) -> bool {
        self.tx.capacity() > 0
    }

    fn send(&self, sample: T) -> Result<(), HandoffError> {
        // Must not be called from inside an async runtime; both loops run on OS threads.
        self.tx.blocking_send(sample).map_err(|_| HandoffError::Closed)
    }
}

/// Consumer half of the mailbox
pub struct MailboxReceiver<T> {
    rx: mpsc::Receiver<T>,
}

impl<T> HandoffReceiver<T> for MailboxReceiver<T> {
    fn has_data(&self) -> bool {
        !self.rx.is_empty()
    }

    fn receive(&mut self) -> Result<T, HandoffError> {
        self.rx.blocking_recv().ok_or(HandoffError::Closed)
    }

    fn try_receive(&mut self) -> Result<Option<T>, HandoffError> {
        match self.rx.try_recv() {
            Ok(sample) => Ok(Some(sample)),
            Err(TryRecvError::Empty) => Ok(None),
            Err(TryRecvError::Disconnected) => Err(HandoffError::Closed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_single_slot_readiness() {
        let (tx, mut rx) = mailbox::<u32>(1);
        assert!(tx.has_room());
        assert!(!rx.has_data());

        tx.send(1).unwrap();
        assert!(!tx.has_room());
        assert!(rx.has_data());

        assert_eq!(rx.receive(), Ok(1));
        assert!(tx.has_room());
        assert!(!rx.has_data());
    }

    #[test]
    fn test_try_receive() {
        let (tx, mut rx) = mailbox::<u32>(2);
        assert_eq!(rx.try_receive(), Ok(None));
        tx.send(5).unwrap();
        assert_eq!(rx.try_receive(), Ok(Some(5)));

        drop(tx);
        assert_eq!(rx.try_receive(), Err(HandoffError::Closed));
    }

    #[test]
    fn test_closed_sides() {
        let (tx, rx) = mailbox::<u32>(1);
        drop(rx);
        assert_eq!(tx.send(1), Err(HandoffError::Closed));

        let (tx, mut rx) = mailbox::<u32>(1);
        tx.send(9).unwrap();
        drop(tx);
        // Queued samples are still delivered before the close is reported
        assert_eq!(rx.receive(), Ok(9));
        assert_eq!(rx.receive(), Err(HandoffError::Closed));
    }

    #[test]
    fn test_fifo_across_threads() {
        let (tx, mut rx) = mailbox::<u32>(1);

        let producer = thread::spawn(move || {
            for i in 0..1000 {
                tx.send(i).unwrap();
            }
        });

        let received: Vec<u32> = std::iter::from_fn(|| rx.receive().ok()).collect();
        producer.join().unwrap();

        assert_eq!(received, (0..1000).collect::<Vec<_>>());
    }
}
