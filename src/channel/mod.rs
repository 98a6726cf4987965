#[cfg(feature = "emitter")]
mod emitter;
mod log;

#[cfg(feature = "emitter")]
pub use emitter::EmitterChannel;
pub use log::LogChannel;

use std::error::Error;
use std::fmt;

use crate::event::Notification;

/// Error type for notification delivery.
#[derive(Debug)]
pub enum ChannelError {
    /// Connection to the downstream transport failed
    ConnectionFailed(String),
    /// The transport rejected the notification
    Rejected(String),
    /// Timeout waiting for acknowledgment
    Timeout,
    /// Other error
    Other(Box<dyn Error + Send + Sync>),
}

impl fmt::Display for ChannelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChannelError::ConnectionFailed(msg) => write!(f, "Connection failed: {}", msg),
            ChannelError::Rejected(msg) => write!(f, "Notification rejected: {}", msg),
            ChannelError::Timeout => write!(f, "Delivery timeout"),
            ChannelError::Other(e) => write!(f, "Delivery error: {}", e),
        }
    }
}

impl Error for ChannelError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ChannelError::Other(e) => Some(e.as_ref()),
            _ => None,
        }
    }
}

/// Downstream delivery seam.
///
/// The pipeline only needs a binary outcome per call; how delivery
/// actually happens (real-time push, queued fan-out, email digests) is
/// the implementation's business. Implementations must tolerate duplicate
/// sends: delivery upstream is at-least-once.
pub trait NotificationChannel: Send + Sync {
    /// Deliver one notification to the given user.
    fn send(&self, user_id: &str, notification: &Notification) -> Result<(), ChannelError>;
}
