//! Error types for the status layer.

/// Errors raised when reporting connectivity changes.
#[derive(Debug, thiserror::Error)]
pub enum StatusError {
    /// The consumer task has stopped, so the event can't be applied.
    #[error("status consumer is no longer running")]
    ConsumerClosed,

    /// The event queue is full. Only returned by the non-blocking
    /// [`StatusSender::try_send`](crate::StatusSender::try_send).
    #[error("status event queue is full")]
    QueueFull,
}
