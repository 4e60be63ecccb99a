use std::path::PathBuf;

/// How to launch gdb and where to send diagnostics.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub gdb_bin: String,
    pub target: String,
    pub target_args: Vec<String>,
    /// Echo MI traffic to the log at debug level.
    pub verbose: bool,
    pub log_file: Option<PathBuf>,
}

impl SessionConfig {
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            gdb_bin: "gdb".to_string(),
            target: target.into(),
            target_args: Vec::new(),
            verbose: false,
            log_file: None,
        }
    }

    /// Arguments passed to gdb itself: quiet banner, MI interpreter, target and its args.
    pub fn gdb_args(&self) -> Vec<String> {
        let mut args = vec![
            "-q".to_string(),
            "-i=mi".to_string(),
            "--args".to_string(),
            self.target.clone(),
        ];
        args.extend(self.target_args.iter().cloned());
        args
    }
}
