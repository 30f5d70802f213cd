use thiserror::Error;

#[derive(Error, Debug)]
pub enum AuthzError {
    #[error("Policy parse error: {0}")]
    PolicyParse(String),

    #[error("Entity creation error: {0}")]
    EntityCreation(String),

    #[error("Evaluation error: {0}")]
    EvaluationError(String),
}

pub type Result<T> = std::result::Result<T, AuthzError>;
