use thiserror::Error;

#[derive(Debug, Error)]
pub enum MiError {
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),
    #[error("gdb binary '{0}' not found. Install gdb or pass --gdb <path>")]
    GdbNotFound(String),
    #[error("failed to launch gdb '{bin}': {source}")]
    Launch {
        bin: String,
        #[source]
        source: std::io::Error,
    },
    #[error("gdb transport error: {0}")]
    Io(#[from] std::io::Error),
    #[error("gdb exited unexpectedly")]
    GdbExited,
    #[error("`{command}` failed: {message}")]
    Command { command: String, message: String },
    #[error("no {0} found in gdb output")]
    MissingField(&'static str),
    #[error("{0}")]
    NotFound(String),
}

pub type Result<T> = std::result::Result<T, MiError>;
