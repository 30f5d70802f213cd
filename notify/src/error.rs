use thiserror::Error;

#[derive(Error, Debug)]
pub enum NotifyError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Attachment error: {0}")]
    Attachment(String),

    #[error("Send error: {0}")]
    Send(String),
}

pub type Result<T> = std::result::Result<T, NotifyError>;
