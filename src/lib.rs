pub mod config;
pub mod error;
pub mod interactive;
pub mod logger;
pub mod mi;
pub mod query;

pub use config::SessionConfig;
pub use error::{MiError, Result};
pub use mi::{ConsoleCapture, MiSession, ScriptedTransport, Transport};
