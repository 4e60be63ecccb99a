#[derive(Debug, Clone)]
pub struct MiResponse {
    pub status: MiStatus,
    pub result: String,
    /// Out-of-band records (`=`, `*`, `&`, `@`) in arrival order, verbatim.
    pub oob: Vec<String>,
    /// Unescaped console stream text (`~"..."`) produced by this command.
    pub console: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MiStatus {
    Done,
    Running,
    Error(String),
    Other(String),
}

/// Console output harvested for one `-interpreter-exec console` command.
///
/// Built fresh for every dispatch and handed back to the caller, so no capture state outlives
/// the command that produced it.
#[derive(Debug, Clone, Default)]
pub struct ConsoleCapture {
    pub command: String,
    pub text: String,
    pub records: Vec<String>,
    /// The command's own result record, token stripped (`^done,...`).
    pub result: String,
}

impl ConsoleCapture {
    pub fn new(command: &str) -> Self {
        Self {
            command: command.to_string(),
            text: String::new(),
            records: Vec::new(),
            result: String::new(),
        }
    }

    /// Drop everything gathered so far; used when the stream turns out to belong to an
    /// earlier command.
    pub(crate) fn reset(&mut self) {
        self.text.clear();
        self.records.clear();
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Disposition {
    #[default]
    Keep,
    /// Deleted after the next hit (`tbreak`, `tcatch`).
    Delete,
    Disable,
}

#[derive(Debug, Clone, Default)]
pub struct BreakpointInfo {
    pub number: u32,
    pub kind: Option<String>,
    pub file: Option<String>,
    pub line: Option<u32>,
    pub func: Option<String>,
    pub enabled: bool,
    pub times: u32,
    pub condition: Option<String>,
    pub disposition: Disposition,
}

#[derive(Debug, Clone)]
pub struct StoppedLocation {
    pub func: Option<String>,
    pub file: Option<String>,
    pub line: Option<u32>,
    pub reason: Option<String>,
}

#[derive(Debug, Clone)]
pub struct FrameInfo {
    pub func: Option<String>,
    pub file: Option<String>,
    pub fullname: Option<String>,
    pub line: Option<u32>,
    pub addr: Option<u64>,
}
