use std::sync::Mutex;

use event_emitter_rs::EventEmitter;

use crate::event::Notification;

use super::{ChannelError, NotificationChannel};

/// A channel that emits notifications to in-process subscribers via an
/// `EventEmitter`, one topic per user.
///
/// This is the single-process stand-in for a real-time push transport:
/// subscribers register on `"{prefix}:{user_id}"` and receive the
/// serialized `Notification`.
pub struct EmitterChannel {
    emitter: Mutex<EventEmitter>,
    topic_prefix: String,
}

impl EmitterChannel {
    pub fn new(emitter: EventEmitter) -> Self {
        EmitterChannel {
            emitter: Mutex::new(emitter),
            topic_prefix: "notifications".to_string(),
        }
    }

    pub fn with_topic_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.topic_prefix = prefix.into();
        self
    }

    /// The topic a given user's notifications are emitted on.
    pub fn topic(&self, user_id: &str) -> String {
        format!("{}:{}", self.topic_prefix, user_id)
    }
}

impl NotificationChannel for EmitterChannel {
    fn send(&self, user_id: &str, notification: &Notification) -> Result<(), ChannelError> {
        let topic = self.topic(user_id);
        let mut emitter = self
            .emitter
            .lock()
            .map_err(|_| ChannelError::ConnectionFailed("emitter lock poisoned".to_string()))?;
        emitter.emit(&topic, notification.clone());
        Ok(())
    }
}
