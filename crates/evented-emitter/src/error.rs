use thiserror::Error;

/// Error returned by a subscriber callback.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Coarse error taxonomy shared by the emitter and container crates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// A value or callback does not have the shape the receiver declares.
    Type,
    /// An index or path is outside the valid range.
    Index,
    /// An emitter name is not declared on a group.
    Attribute,
    /// A request conflicts with the current state (duplicate name, unknown id).
    Value,
    /// A subscriber failed while handling an event.
    Subscriber,
}

#[derive(Debug, Error)]
pub enum EventError {
    #[error("no emitter named `{0}` in this group")]
    UnknownEmitter(String),
    #[error("emitter `{0}` is already declared")]
    DuplicateEmitter(String),
    #[error("callback requires field `{field}` which emitter `{emitter}` does not provide")]
    IncompatibleCallback { emitter: String, field: String },
    #[error("connection {id} is not attached to emitter `{emitter}`")]
    NotConnected { emitter: String, id: u64 },
    #[error("subscriber of `{emitter}` failed: {source}")]
    Subscriber {
        emitter: String,
        #[source]
        source: BoxError,
    },
}

impl EventError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            EventError::UnknownEmitter(_) => ErrorKind::Attribute,
            EventError::DuplicateEmitter(_) | EventError::NotConnected { .. } => ErrorKind::Value,
            EventError::IncompatibleCallback { .. } => ErrorKind::Type,
            EventError::Subscriber { .. } => ErrorKind::Subscriber,
        }
    }
}
