use std::time::SystemTime;

use serde::{Deserialize, Serialize};

/// Durable record of a business-state change awaiting delivery to its
/// owning user.
///
/// Rows are created inside the same transaction as the mutation they
/// describe and become visible to the publisher only once that
/// transaction commits. `is_published` flips `false → true` exactly once;
/// `published_at` is set atomically with it. Rows are never deleted by
/// the publishing path.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DomainEvent {
    /// Monotonically increasing id assigned by the store at commit time.
    /// Doubles as the delivery-attempt ordering key.
    pub id: u64,
    /// Rendered notification text.
    pub message: String,
    /// The single user this event is addressed to. String-only coupling;
    /// no foreign keys into business tables.
    pub user_id: String,
    /// Optional typed-event discriminator (e.g. "ReportGenerated").
    pub event_type: Option<String>,
    /// Optional structured payload, JSON text.
    pub event_data: Option<String>,
    /// Set when the event was recorded, immutable afterwards.
    pub occurred_at: SystemTime,
    pub is_published: bool,
    /// Non-`None` iff `is_published`.
    pub published_at: Option<SystemTime>,
    /// Delivery attempts so far (diagnostics; no automatic cutoff).
    pub attempts: u32,
    pub last_error: Option<String>,
}

impl DomainEvent {
    /// The channel-facing projection of this event.
    pub fn notification(&self) -> Notification {
        Notification {
            message: self.message.clone(),
            event_type: self.event_type.clone(),
            event_data: self.event_data.clone(),
            occurred_at: self.occurred_at,
        }
    }
}

/// A not-yet-committed event, staged inside a transaction.
///
/// `occurred_at` is stamped at creation; the id is assigned by the store
/// when the owning transaction commits.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NewEvent {
    pub message: String,
    pub user_id: String,
    pub event_type: Option<String>,
    pub event_data: Option<String>,
    pub occurred_at: SystemTime,
}

impl NewEvent {
    /// Create a plain notification event.
    pub fn create(message: impl Into<String>, user_id: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            user_id: user_id.into(),
            event_type: None,
            event_data: None,
            occurred_at: SystemTime::now(),
        }
    }

    /// Create a typed event carrying a JSON-serialized payload alongside
    /// the rendered message.
    pub fn typed<T: Serialize>(
        message: impl Into<String>,
        user_id: impl Into<String>,
        event_type: impl Into<String>,
        data: &T,
    ) -> Result<Self, serde_json::Error> {
        let event_data = serde_json::to_string(data)?;
        Ok(Self {
            message: message.into(),
            user_id: user_id.into(),
            event_type: Some(event_type.into()),
            event_data: Some(event_data),
            occurred_at: SystemTime::now(),
        })
    }
}

/// What the notification channel receives for one event.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub message: String,
    pub event_type: Option<String>,
    pub event_data: Option<String>,
    pub occurred_at: SystemTime,
}

impl Notification {
    /// Decode the structured payload of a typed event.
    pub fn decode<T: serde::de::DeserializeOwned>(&self) -> Result<Option<T>, serde_json::Error> {
        match &self.event_data {
            Some(data) => serde_json::from_str(data).map(Some),
            None => Ok(None),
        }
    }
}
