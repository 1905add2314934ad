use evented_emitter::{ErrorKind, EventError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ContainerError {
    #[error("index {index} out of range for length {len}")]
    IndexOutOfRange { index: isize, len: usize },
    #[error("cannot add {found} to a sequence of {expected}")]
    TypeMismatch { expected: String, found: String },
    #[error("path {path:?} reaches a leaf at depth {depth} and cannot descend further")]
    NotAGroup { path: Vec<isize>, depth: usize },
    #[error("path must not be empty")]
    EmptyPath,
    #[error("value is not in the sequence")]
    ValueNotFound,
    #[error("invalid order: {0}")]
    InvalidOrder(String),
    #[error(transparent)]
    Event(#[from] EventError),
}

impl ContainerError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ContainerError::IndexOutOfRange { .. } | ContainerError::EmptyPath => ErrorKind::Index,
            ContainerError::TypeMismatch { .. } | ContainerError::NotAGroup { .. } => ErrorKind::Type,
            ContainerError::ValueNotFound | ContainerError::InvalidOrder(_) => ErrorKind::Value,
            ContainerError::Event(e) => e.kind(),
        }
    }
}
