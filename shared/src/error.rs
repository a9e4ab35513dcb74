use thiserror::Error;

use crate::water::BodyId;

#[derive(Debug, Error)]
pub enum WaterError {
    #[error("no water registered for body {0}")]
    NotFound(BodyId),
    #[error("unknown capability '{0}'")]
    UnknownOperation(String),
    #[error("bad arguments for '{operation}': expected {expected}")]
    BadArguments {
        operation: &'static str,
        expected: String,
    },
    #[error("payload codec error: {0}")]
    Codec(#[from] bincode::Error),
    #[error("payload compression error: {0}")]
    Compression(#[from] std::io::Error),
    #[error("payload of {0} bytes exceeds the allowed size")]
    PayloadTooLarge(usize),
    #[error("snapshot record is missing required field {tag}")]
    MissingField { tag: u16 },
    #[error("invalid water body {body_id}: {reason}")]
    InvalidBody { body_id: BodyId, reason: String },
}

pub type WaterResult<T> = Result<T, WaterError>;
