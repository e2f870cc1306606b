use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModLoggerError {
    #[error("Slack API error: {0}")]
    SlackApi(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Control error: {0}")]
    Control(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, ModLoggerError>;
