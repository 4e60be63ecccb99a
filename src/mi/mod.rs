pub mod models;
pub(crate) mod parser;
pub mod session;
pub mod transport;

pub use models::{
    BreakpointInfo, ConsoleCapture, Disposition, FrameInfo, MiResponse, MiStatus, StoppedLocation,
};
pub use session::MiSession;
pub use transport::{GdbProcess, ScriptedTransport, Transport};
