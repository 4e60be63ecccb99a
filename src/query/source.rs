use crate::error::{MiError, Result};
use crate::mi::models::BreakpointInfo;
use crate::mi::session::MiSession;
use crate::mi::transport::Transport;
use crate::query::extract::source_lines_from_listing;
use crate::query::records::SourceLine;
use std::path::Path;

/// Build the `list` command for a file/start/count request.
///
/// `file` with `start > 0` lists from `start` (`count` lines when non-zero); `file` alone
/// lists from its first line; no file lists `count` lines around `$pc`, or continues the
/// previous listing when `count` is zero.
pub fn source_list_command(file: Option<&str>, start: u32, count: u32) -> String {
    let file = file.map(str::trim).filter(|f| !f.is_empty());
    match file {
        Some(f) if start > 0 && count > 0 => {
            format!("list {}:{},{}", f, start, start.saturating_add(count - 1))
        }
        Some(f) if start > 0 => format!("list {}:{}", f, start),
        Some(f) => format!("list {}:1", f),
        None if count > 0 => format!("list *$pc,{}", count),
        None => "list".to_string(),
    }
}

/// Mark every listed line that carries a breakpoint of `file`.
///
/// Breakpoints match on the exact file string or on its base name, since gdb reports
/// the short name while listings may have been requested by full path.
pub fn annotate_breakpoints(lines: &mut [SourceLine], file: &str, breakpoints: &[BreakpointInfo]) {
    let base = Path::new(file).file_name().and_then(|n| n.to_str());
    for bp in breakpoints {
        let (Some(bp_file), Some(bp_line)) = (bp.file.as_deref(), bp.line) else {
            continue;
        };
        let same_file = bp_file == file
            || Path::new(bp_file).file_name().and_then(|n| n.to_str()) == base;
        if !same_file {
            continue;
        }
        for line in lines.iter_mut().filter(|l| l.line == bp_line) {
            line.has_breakpoint = true;
        }
    }
}

impl<T: Transport> MiSession<T> {
    pub fn source_list(&mut self, file: Option<&str>, start: u32, count: u32) -> Result<Vec<SourceLine>> {
        let capture = self.capture_console(&source_list_command(file, start, count))?;
        Ok(source_lines_from_listing(&capture.text))
    }

    /// Lines around the start of `function`.
    pub fn source_list_function(&mut self, function: &str) -> Result<Vec<SourceLine>> {
        let function = function.trim();
        if function.is_empty() {
            return Err(MiError::InvalidArgument("empty function name"));
        }
        let capture = self.capture_console(&format!("list {}", function))?;
        Ok(source_lines_from_listing(&capture.text))
    }

    /// Lines around the source line holding `address`.
    pub fn source_list_address(&mut self, address: u64) -> Result<Vec<SourceLine>> {
        let capture = self.capture_console(&format!("list *{:#x}", address))?;
        Ok(source_lines_from_listing(&capture.text))
    }

    /// The line the selected frame is stopped at, flagged as current.
    pub fn source_current_line(&mut self) -> Result<Vec<SourceLine>> {
        let frame = self.stack_info_frame()?;
        let file = frame
            .file
            .or(frame.fullname)
            .ok_or(MiError::MissingField("frame file"))?;
        let line = frame.line.ok_or(MiError::MissingField("frame line"))?;
        let mut lines = self.source_list(Some(&file), line, 1)?;
        for l in lines.iter_mut().filter(|l| l.line == line) {
            l.is_current = true;
        }
        Ok(lines)
    }

    pub fn list_breakpoints(&mut self) -> Result<Vec<BreakpointInfo>> {
        self.break_list()
    }
}
