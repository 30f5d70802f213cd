use thiserror::Error;

#[derive(Error, Debug)]
pub enum EntityError {
    #[error("invalid {kind} ordinal: {value}")]
    InvalidOrdinal { kind: &'static str, value: i64 },
}

pub type Result<T> = std::result::Result<T, EntityError>;
