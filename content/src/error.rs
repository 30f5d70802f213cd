use thiserror::Error;

#[derive(Error, Debug)]
pub enum ContentError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("The {0} name has existed")]
    NameTaken(&'static str),
}

pub type Result<T> = std::result::Result<T, ContentError>;
