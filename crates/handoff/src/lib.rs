//! Handoff Channel
//!
//! A bounded mailbox that carries samples from the capture context to the
//! render context. The producer only sends after `has_room()` confirmed
//! space, so it never blocks; the consumer blocks in `receive()`.

mod mailbox;
mod shutdown;

pub use mailbox::{mailbox, MailboxReceiver, MailboxSender, DEFAULT_CAPACITY};
pub use shutdown::Shutdown;

use thiserror::Error;

/// Handoff errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum HandoffError {
    /// The other side of the channel has been dropped
    #[error("Handoff channel closed")]
    Closed,
}

/// Producer side of a handoff channel
pub trait HandoffSender<T> {
    /// Whether a send would complete without blocking
    fn has_room(&self) -> bool;

    /// Enqueue a sample, blocking until capacity is available
    fn send(&self, sample: T) -> Result<(), HandoffError>;
}

/// Consumer side of a handoff channel
pub trait HandoffReceiver<T> {
    /// Whether a sample is waiting
    fn has_data(&self) -> bool;

    /// Block until a sample arrives and return it
    fn receive(&mut self) -> Result<T, HandoffError>;

    /// Take a sample if one is waiting
    fn try_receive(&mut self) -> Result<Option<T>, HandoffError>;
}
