use std::sync::{Arc, Mutex};

use crate::event::Notification;

use super::{ChannelError, NotificationChannel};

/// A simple channel that logs notifications to stdout or a buffer.
pub struct LogChannel {
    buffer: Option<Arc<Mutex<Vec<String>>>>,
}

impl Default for LogChannel {
    fn default() -> Self {
        Self::new()
    }
}

impl LogChannel {
    pub fn new() -> Self {
        LogChannel { buffer: None }
    }

    pub fn with_buffer(buffer: Arc<Mutex<Vec<String>>>) -> Self {
        LogChannel {
            buffer: Some(buffer),
        }
    }
}

impl NotificationChannel for LogChannel {
    fn send(&self, user_id: &str, notification: &Notification) -> Result<(), ChannelError> {
        let line = match &notification.event_type {
            Some(event_type) => {
                format!("[NOTIFY] {} {} {}", user_id, event_type, notification.message)
            }
            None => format!("[NOTIFY] {} {}", user_id, notification.message),
        };

        if let Some(buffer) = &self.buffer {
            let mut buffer = buffer
                .lock()
                .map_err(|_| ChannelError::Rejected("log channel buffer poisoned".to_string()))?;
            buffer.push(line);
        } else {
            println!("{}", line);
        }
        Ok(())
    }
}
