use crate::config::SessionConfig;
use crate::error::{MiError, Result};
use crate::mi::models::{
    BreakpointInfo, ConsoleCapture, FrameInfo, MiResponse, MiStatus, StoppedLocation,
};
use crate::mi::parser::{
    bkpt_tuples, console_text, mi_escape, parse_breakpoint, parse_breakpoint_list, parse_frame,
    parse_status, parse_stopped, split_token,
};
use crate::mi::transport::{GdbProcess, Transport};
use tracing::{debug, warn};

/// One gdb/MI conversation.
///
/// Every command carries a fresh numeric token and a response is only accepted when its
/// result record echoes that token. Methods take `&mut self`, so commands on one session
/// are serialized; share a session across threads behind a `Mutex` held for the whole
/// command-and-parse sequence.
#[derive(Debug)]
pub struct MiSession<T: Transport = GdbProcess> {
    transport: T,
    next_token: u64,
}

impl MiSession<GdbProcess> {
    /// Spawn gdb in MI mode for `config.target` and wait for its first prompt.
    pub fn start(config: &SessionConfig) -> Result<Self> {
        let transport = GdbProcess::spawn(config)?;
        let mut session = Self::new(transport);
        session.drain_initial_output()?;
        Ok(session)
    }
}

impl<T: Transport> MiSession<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            next_token: 1,
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Drain the gdb banner until the initial prompt.
    pub fn drain_initial_output(&mut self) -> Result<()> {
        loop {
            let line = self.transport.read_line()?.ok_or(MiError::GdbExited)?;
            let trimmed = line.trim();
            debug!(target: "mi", "[mi<-] {}", trimmed);
            if trimmed == "(gdb)" {
                return Ok(());
            }
        }
    }

    /// Send an MI command under a fresh token and collect its response up to the prompt.
    pub fn exec_command(&mut self, cmd: &str) -> Result<MiResponse> {
        let token = self.next_token;
        self.next_token += 1;
        self.send_line(&format!("{}{}", token, cmd))?;

        let mut capture = ConsoleCapture::new(cmd);
        let result = self.read_response(token, &mut capture)?;
        Ok(MiResponse {
            status: parse_status(&result),
            result,
            oob: capture.records,
            console: capture.text,
        })
    }

    /// Like [`exec_command`](Self::exec_command) but turns `^error` into an error.
    pub fn exec_checked(&mut self, cmd: &str) -> Result<MiResponse> {
        let resp = self.exec_command(cmd)?;
        if let MiStatus::Error(message) = resp.status {
            return Err(MiError::Command {
                command: cmd.to_string(),
                message,
            });
        }
        Ok(resp)
    }

    /// Run a CLI command through `-interpreter-exec console` and return the console text it
    /// produced.
    ///
    /// The text belongs to this command only: output that precedes a result record for a
    /// different token is discarded. If the stream ends before the command's own result
    /// record arrives, nothing is returned.
    pub fn capture_console(&mut self, command: &str) -> Result<ConsoleCapture> {
        if command.trim().is_empty() {
            return Err(MiError::InvalidArgument("empty console command"));
        }
        let cmd = format!("-interpreter-exec console {}", mi_escape(command));
        let resp = self.exec_command(&cmd)?;
        if let MiStatus::Error(message) = resp.status {
            return Err(MiError::Command {
                command: command.to_string(),
                message,
            });
        }
        Ok(ConsoleCapture {
            command: command.to_string(),
            text: resp.console,
            records: resp.oob,
            result: resp.result,
        })
    }

    /// Insert a breakpoint at the given location string.
    pub fn break_insert(&mut self, location: &str) -> Result<BreakpointInfo> {
        if location.trim().is_empty() {
            return Err(MiError::InvalidArgument("empty breakpoint location"));
        }
        let resp = self.exec_checked(&format!("-break-insert {}", location))?;
        bkpt_tuples(&resp.result)
            .into_iter()
            .find_map(parse_breakpoint)
            .ok_or(MiError::MissingField("breakpoint"))
    }

    pub fn break_delete(&mut self, number: u32) -> Result<()> {
        self.exec_checked(&format!("-break-delete {}", number))?;
        Ok(())
    }

    pub fn break_set_enabled(&mut self, number: u32, enabled: bool) -> Result<()> {
        let verb = if enabled { "enable" } else { "disable" };
        self.exec_checked(&format!("-break-{} {}", verb, number))?;
        Ok(())
    }

    pub fn break_condition(&mut self, number: u32, condition: &str) -> Result<()> {
        if condition.trim().is_empty() {
            return Err(MiError::InvalidArgument("empty condition"));
        }
        self.exec_checked(&format!("-break-condition {} {}", number, condition))?;
        Ok(())
    }

    /// All breakpoints and catchpoints known to gdb.
    pub fn break_list(&mut self) -> Result<Vec<BreakpointInfo>> {
        let resp = self.exec_checked("-break-list")?;
        Ok(parse_breakpoint_list(&resp.result))
    }

    /// Selected frame of the stopped inferior.
    pub fn stack_info_frame(&mut self) -> Result<FrameInfo> {
        let resp = self.exec_checked("-stack-info-frame")?;
        Ok(parse_frame(&resp.result))
    }

    /// Insert breakpoint at main, run, and wait until it stops. Returns the stop location.
    pub fn run_to_main(&mut self) -> Result<StoppedLocation> {
        self.break_insert("main")?;
        self.resume("-exec-run")
    }

    pub fn exec_continue(&mut self) -> Result<StoppedLocation> {
        self.resume("-exec-continue")
    }

    /// Step over.
    pub fn exec_next(&mut self) -> Result<StoppedLocation> {
        self.resume("-exec-next")
    }

    /// Step into.
    pub fn exec_step(&mut self) -> Result<StoppedLocation> {
        self.resume("-exec-step")
    }

    /// Attempt to shut down gdb cleanly.
    pub fn shutdown(&mut self) {
        let _ = self.send_line("-gdb-exit");
        self.transport.close();
    }

    fn resume(&mut self, cmd: &str) -> Result<StoppedLocation> {
        let resp = self.exec_checked(cmd)?;
        if let Some(line) = resp.oob.iter().find(|l| l.starts_with("*stopped")) {
            return Ok(parse_stopped(line));
        }
        self.wait_for_stop()
    }

    /// Wait for a `*stopped` event followed by the prompt.
    fn wait_for_stop(&mut self) -> Result<StoppedLocation> {
        let mut stop: Option<StoppedLocation> = None;
        loop {
            let line = self.transport.read_line()?.ok_or(MiError::GdbExited)?;
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            debug!(target: "mi", "[mi<-] {}", trimmed);
            if trimmed == "(gdb)" {
                match stop.take() {
                    Some(loc) => return Ok(loc),
                    None => continue,
                }
            }
            let (_, record) = split_token(trimmed);
            if record.starts_with("*stopped") {
                stop = Some(parse_stopped(record));
            } else if let MiStatus::Error(message) = parse_status(record) {
                return Err(MiError::Command {
                    command: "wait for stop".to_string(),
                    message,
                });
            }
        }
    }

    fn send_line(&mut self, line: &str) -> Result<()> {
        debug!(target: "mi", "[mi->] {}", line);
        self.transport.send_line(line)
    }

    /// Collect output until the result record for `token` and the following prompt.
    ///
    /// Console text and out-of-band records accumulate into `capture`. A result record with
    /// another (or no) token closes an earlier command; whatever was gathered before it
    /// belongs to that command and is dropped.
    fn read_response(&mut self, token: u64, capture: &mut ConsoleCapture) -> Result<String> {
        let mut result_line: Option<String> = None;
        loop {
            let Some(line) = self.transport.read_line()? else {
                // A closed stream after our result record still completes the command.
                return result_line.ok_or(MiError::GdbExited);
            };
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            debug!(target: "mi", "[mi<-] {}", trimmed);
            if trimmed == "(gdb)" {
                match result_line.take() {
                    Some(res) => return Ok(res),
                    None => continue,
                }
            }
            if let Some(text) = console_text(trimmed) {
                capture.text.push_str(&text);
                continue;
            }
            let (line_token, record) = split_token(trimmed);
            if record.starts_with('^') {
                if line_token == Some(token) {
                    result_line = Some(record.to_string());
                } else {
                    warn!(
                        target: "mi",
                        expected = token,
                        got = ?line_token,
                        dropped_bytes = capture.text.len(),
                        "discarding output of an earlier command"
                    );
                    capture.reset();
                }
                continue;
            }
            capture.records.push(trimmed.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mi::transport::ScriptedTransport;

    fn session() -> MiSession<ScriptedTransport> {
        MiSession::new(ScriptedTransport::new())
    }

    #[test]
    fn capture_console_wraps_command_and_collects_text() {
        let mut s = session();
        s.transport_mut().reply_console("type = int\n");
        let cap = s.capture_console("ptype counter").unwrap();
        assert_eq!(cap.text, "type = int\n");
        assert_eq!(cap.command, "ptype counter");
        assert_eq!(
            s.transport().sent,
            vec![r#"1-interpreter-exec console "ptype counter""#]
        );
    }

    #[test]
    fn tokens_increase_per_command() {
        let mut s = session();
        s.transport_mut()
            .reply(["{token}^done", "(gdb)"])
            .reply(["{token}^done", "(gdb)"]);
        s.exec_command("-break-delete 1").unwrap();
        s.exec_command("-break-delete 2").unwrap();
        assert_eq!(s.transport().sent, vec!["1-break-delete 1", "2-break-delete 2"]);
    }

    #[test]
    fn empty_command_is_rejected_before_sending() {
        let mut s = session();
        assert!(matches!(
            s.capture_console("  "),
            Err(MiError::InvalidArgument(_))
        ));
        assert!(s.transport().sent.is_empty());
    }

    #[test]
    fn error_result_becomes_command_error() {
        let mut s = session();
        s.transport_mut().reply([
            r#"&"ptype nosuch\n""#,
            r#"{token}^error,msg="No symbol \"nosuch\" in current context.""#,
            "(gdb)",
        ]);
        match s.capture_console("ptype nosuch") {
            Err(MiError::Command { command, message }) => {
                assert_eq!(command, "ptype nosuch");
                assert_eq!(message, "No symbol \"nosuch\" in current context.");
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn missing_terminal_response_yields_no_text() {
        let mut s = session();
        s.transport_mut()
            .reply([r#"~"partial output\n""#, r#"~"more\n""#]);
        assert!(matches!(
            s.capture_console("info functions"),
            Err(MiError::GdbExited)
        ));
    }

    #[test]
    fn stale_result_discards_earlier_text() {
        let mut s = session();
        s.transport_mut()
            .push_raw(r#"~"Symbol \"old\" is at 0x1000\n""#)
            .push_raw("^done")
            .push_raw("(gdb)")
            .reply_console("fresh\n");
        let cap = s.capture_console("info address fresh").unwrap();
        assert_eq!(cap.text, "fresh\n");
    }

    #[test]
    fn break_management_commands() {
        let mut s = session();
        for _ in 0..3 {
            s.transport_mut().reply(["{token}^done", "(gdb)"]);
        }
        s.break_set_enabled(4, false).unwrap();
        s.break_condition(4, "i == 3").unwrap();
        s.break_delete(4).unwrap();
        assert_eq!(
            s.transport().sent,
            vec!["1-break-disable 4", "2-break-condition 4 i == 3", "3-break-delete 4"]
        );
    }

    #[test]
    fn run_to_main_waits_for_stop() {
        let mut s = session();
        s.transport_mut()
            .reply([
                r#"{token}^done,bkpt={number="1",type="breakpoint",disp="keep",enabled="y",func="main",file="main.c",line="5",times="0"}"#,
                "(gdb)",
            ])
            .reply([
                "=thread-group-started,id=\"i1\",pid=\"42\"",
                "{token}^running",
                "*running,thread-id=\"all\"",
                "(gdb)",
                r#"*stopped,reason="breakpoint-hit",disp="keep",bkptno="1",frame={func="main",file="main.c",line="5"}"#,
                "(gdb)",
            ]);
        let stop = s.run_to_main().unwrap();
        assert_eq!(stop.func.as_deref(), Some("main"));
        assert_eq!(stop.line, Some(5));
        assert_eq!(stop.reason.as_deref(), Some("breakpoint-hit"));
    }
}
