use crate::error::{MiError, Result};
use crate::mi::models::{ConsoleCapture, Disposition};
use crate::mi::parser::{bkpt_tuples, parse_breakpoint, parse_field};
use crate::mi::session::MiSession;
use crate::mi::transport::Transport;
use crate::query::records::{CatchKind, Catchpoint};
use regex::Regex;
use tracing::warn;

/// Build the console command for a catchpoint request.
pub fn catch_command(kind: CatchKind, filter: Option<&str>, temporary: bool) -> Result<String> {
    let prefix = if temporary { "t" } else { "" };
    let filter = filter.map(str::trim).filter(|f| !f.is_empty());
    match filter {
        Some(f) if kind.takes_filter() => Ok(format!("{}catch {} {}", prefix, kind.event(), f)),
        Some(_) => Err(MiError::InvalidArgument("this catch event takes no filter")),
        None => Ok(format!("{}catch {}", prefix, kind.event())),
    }
}

/// Turn the reply to a `catch` command into a record.
///
/// gdb reports catchpoints as breakpoint tuples. `kind` and `event` come from the request;
/// gdb's `catch-type` is only compared against `kind`.
pub fn catchpoint_from_capture(
    capture: &ConsoleCapture,
    kind: CatchKind,
    filter: Option<&str>,
    temporary: bool,
) -> Result<Catchpoint> {
    let tuple = std::iter::once(capture.result.as_str())
        .chain(capture.records.iter().map(String::as_str))
        .flat_map(bkpt_tuples)
        .find_map(|t| parse_breakpoint(t).map(|bp| (t, bp)));

    let mut cp = match tuple {
        Some((raw, bp)) => {
            if let Some(reported) = parse_field(raw, "catch-type") {
                if reported != kind.event() {
                    warn!(
                        requested = kind.event(),
                        reported = %reported,
                        "gdb reports a different catch type"
                    );
                }
            }
            Catchpoint {
                number: bp.number,
                enabled: bp.enabled,
                condition: bp.condition,
                hit_count: bp.times,
                temporary: bp.disposition == Disposition::Delete,
                ..Catchpoint::default()
            }
        }
        None => catchpoint_from_banner(&capture.text, temporary)?,
    };
    cp.kind = kind;
    cp.event = filter
        .map(str::trim)
        .filter(|f| !f.is_empty())
        .map(str::to_string);
    Ok(cp)
}

/// Fallback for replies that only carry the console banner: `Catchpoint 3 (throw)`.
fn catchpoint_from_banner(text: &str, temporary: bool) -> Result<Catchpoint> {
    let re = Regex::new(r"(Temporary catchpoint|Catchpoint) ([0-9]+)")
        .map_err(|_| MiError::MissingField("catchpoint number"))?;
    let Some(caps) = re.captures(text) else {
        warn!(output = %text.trim_end(), "catch reply carries no catchpoint number");
        return Err(MiError::MissingField("catchpoint number"));
    };
    let number = caps[2]
        .parse::<u32>()
        .map_err(|_| MiError::MissingField("catchpoint number"))?;
    Ok(Catchpoint {
        number,
        enabled: true,
        temporary: temporary || &caps[1] == "Temporary catchpoint",
        ..Catchpoint::default()
    })
}

impl<T: Transport> MiSession<T> {
    /// Set a catchpoint of any kind. `filter` is only accepted by load, unload, syscall and
    /// signal.
    pub fn catch(
        &mut self,
        kind: CatchKind,
        filter: Option<&str>,
        temporary: bool,
    ) -> Result<Catchpoint> {
        let command = catch_command(kind, filter, temporary)?;
        let capture = self.capture_console(&command)?;
        catchpoint_from_capture(&capture, kind, filter, temporary)
    }

    /// C++ exception throw (`is_throw`) or catch.
    pub fn catch_exception(&mut self, is_throw: bool, temporary: bool) -> Result<Catchpoint> {
        let kind = if is_throw {
            CatchKind::Throw
        } else {
            CatchKind::Catch
        };
        self.catch(kind, None, temporary)
    }

    pub fn catch_exec(&mut self, temporary: bool) -> Result<Catchpoint> {
        self.catch(CatchKind::Exec, None, temporary)
    }

    pub fn catch_fork(&mut self, is_vfork: bool, temporary: bool) -> Result<Catchpoint> {
        let kind = if is_vfork {
            CatchKind::Vfork
        } else {
            CatchKind::Fork
        };
        self.catch(kind, None, temporary)
    }

    /// Shared library load, optionally restricted by a regexp on the library name.
    pub fn catch_load(&mut self, regexp: Option<&str>, temporary: bool) -> Result<Catchpoint> {
        self.catch(CatchKind::Load, regexp, temporary)
    }

    pub fn catch_unload(&mut self, regexp: Option<&str>, temporary: bool) -> Result<Catchpoint> {
        self.catch(CatchKind::Unload, regexp, temporary)
    }

    /// System call by name or number; `None` catches every syscall.
    pub fn catch_syscall(&mut self, name: Option<&str>, temporary: bool) -> Result<Catchpoint> {
        self.catch(CatchKind::Syscall, name, temporary)
    }

    pub fn catch_signal(&mut self, name: Option<&str>, temporary: bool) -> Result<Catchpoint> {
        self.catch(CatchKind::Signal, name, temporary)
    }

    pub fn catch_assert(&mut self, temporary: bool) -> Result<Catchpoint> {
        self.catch(CatchKind::Assert, None, temporary)
    }

    /// Catchpoints share the breakpoint numbering space.
    pub fn catch_delete(&mut self, number: u32) -> Result<()> {
        self.break_delete(number)
    }

    pub fn catch_set_enabled(&mut self, number: u32, enabled: bool) -> Result<()> {
        self.break_set_enabled(number, enabled)
    }

    pub fn catch_set_condition(&mut self, number: u32, condition: &str) -> Result<()> {
        self.break_condition(number, condition)
    }
}
