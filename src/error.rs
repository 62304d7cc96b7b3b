use thiserror::Error;

/// Errors produced by the server library.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid address pattern: {0}")]
    Pattern(String),

    #[error("Unknown key '{0}'")]
    UnknownKey(String),

    #[error("Key injection error: {0}")]
    Inject(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
