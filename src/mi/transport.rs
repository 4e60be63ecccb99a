use crate::config::SessionConfig;
use crate::error::{MiError, Result};
use std::collections::VecDeque;
use std::io::{BufRead, BufReader, Write};
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};

/// Line-oriented channel to a gdb MI interpreter.
pub trait Transport {
    /// Write one command line (the newline is added here).
    fn send_line(&mut self, line: &str) -> Result<()>;

    /// Next raw output line without its line terminator, or `None` once the stream is closed.
    fn read_line(&mut self) -> Result<Option<String>>;

    /// Release the underlying channel.
    fn close(&mut self) {}
}

/// A gdb child process speaking MI over its stdio.
#[derive(Debug)]
pub struct GdbProcess {
    child: Child,
    stdin: ChildStdin,
    stdout: BufReader<ChildStdout>,
}

impl GdbProcess {
    pub fn spawn(config: &SessionConfig) -> Result<Self> {
        let mut child = Command::new(&config.gdb_bin)
            .args(config.gdb_args())
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    MiError::GdbNotFound(config.gdb_bin.clone())
                } else {
                    MiError::Launch {
                        bin: config.gdb_bin.clone(),
                        source: e,
                    }
                }
            })?;

        let stdin = child.stdin.take().ok_or(MiError::GdbExited)?;
        let stdout = child.stdout.take().ok_or(MiError::GdbExited)?;
        Ok(Self {
            child,
            stdin,
            stdout: BufReader::new(stdout),
        })
    }
}

impl Transport for GdbProcess {
    fn send_line(&mut self, line: &str) -> Result<()> {
        self.stdin.write_all(line.as_bytes())?;
        self.stdin.write_all(b"\n")?;
        self.stdin.flush()?;
        Ok(())
    }

    fn read_line(&mut self) -> Result<Option<String>> {
        let mut line = String::new();
        if self.stdout.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(&['\r', '\n'][..]).to_string()))
    }

    fn close(&mut self) {
        let _ = self.child.wait();
    }
}

/// In-memory transport replaying canned gdb output.
///
/// Each queued reply is released when the next command is sent; `{token}` inside a reply
/// is replaced by the token that command carried. Lines pushed with [`push_raw`] are
/// delivered first, before any reply, which is how stale output from an earlier command
/// is simulated.
///
/// [`push_raw`]: ScriptedTransport::push_raw
#[derive(Debug, Default)]
pub struct ScriptedTransport {
    pub sent: Vec<String>,
    replies: VecDeque<Vec<String>>,
    pending: VecDeque<String>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue the output for the next command sent.
    pub fn reply<I, S>(&mut self, lines: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.replies
            .push_back(lines.into_iter().map(Into::into).collect());
        self
    }

    /// Queue a console-only reply: every text line becomes a `~"..."` record, followed by
    /// `^done` and the prompt.
    pub fn reply_console(&mut self, text: &str) -> &mut Self {
        let mut lines: Vec<String> = text
            .split_inclusive('\n')
            .map(|chunk| format!("~{}", super::parser::mi_escape(chunk)))
            .collect();
        lines.push("{token}^done".to_string());
        lines.push("(gdb)".to_string());
        self.reply(lines)
    }

    /// Deliver `line` before anything else, regardless of commands sent.
    pub fn push_raw(&mut self, line: impl Into<String>) -> &mut Self {
        self.pending.push_back(line.into());
        self
    }
}

impl Transport for ScriptedTransport {
    fn send_line(&mut self, line: &str) -> Result<()> {
        self.sent.push(line.to_string());
        let token: String = line.chars().take_while(|c| c.is_ascii_digit()).collect();
        if let Some(reply) = self.replies.pop_front() {
            self.pending
                .extend(reply.into_iter().map(|l| l.replace("{token}", &token)));
        }
        Ok(())
    }

    fn read_line(&mut self) -> Result<Option<String>> {
        Ok(self.pending.pop_front())
    }
}
