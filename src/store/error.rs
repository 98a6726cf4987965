use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    LockPoisoned(&'static str),
    UnknownEvent(u64),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::LockPoisoned(operation) => {
                write!(f, "event store lock poisoned during {}", operation)
            }
            StoreError::UnknownEvent(id) => write!(f, "no event with id {}", id),
        }
    }
}

impl std::error::Error for StoreError {}
