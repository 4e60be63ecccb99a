use crate::mi::models::{BreakpointInfo, Disposition, FrameInfo, MiStatus, StoppedLocation};
use crate::query::lex::parse_hex_address;
use regex::Regex;

pub(crate) fn parse_status(line: &str) -> MiStatus {
    if line.starts_with("^done") {
        MiStatus::Done
    } else if line.starts_with("^running") {
        MiStatus::Running
    } else if line.starts_with("^error") {
        let msg = parse_msg_field(line).unwrap_or_else(|| line.to_string());
        MiStatus::Error(msg)
    } else {
        MiStatus::Other(line.to_string())
    }
}

pub(crate) fn parse_msg_field(s: &str) -> Option<String> {
    parse_field(s, "msg")
}

/// Extract `key="value"` from an MI result, unescaping the value.
///
/// The key must start a field (beginning of input, after `,`, `{` or whitespace) so that
/// `name` does not match inside `fullname`.
pub(crate) fn parse_field(s: &str, key: &str) -> Option<String> {
    let pattern = format!(r#"(?:^|[,{{\s]){}="((?:\\.|[^"\\])*)""#, regex::escape(key));
    Regex::new(&pattern)
        .ok()
        .and_then(|re| re.captures(s).map(|c| unescape_value(&c[1])))
}

fn parse_u32_field(s: &str, key: &str) -> Option<u32> {
    parse_field(s, key).and_then(|v| v.trim().parse::<u32>().ok())
}

/// Split an optional numeric token off a result/async record: `12^done` -> `(Some(12), "^done")`.
pub(crate) fn split_token(line: &str) -> (Option<u64>, &str) {
    let digits = line.bytes().take_while(|b| b.is_ascii_digit()).count();
    if digits == 0 {
        return (None, line);
    }
    let token = line[..digits].parse::<u64>().ok();
    (token, &line[digits..])
}

/// Decode a console stream record (`~"text\n"`) into its text.
pub(crate) fn console_text(line: &str) -> Option<String> {
    let inner = line.strip_prefix("~\"")?.strip_suffix('"')?;
    Some(unescape_value(inner))
}

pub(crate) fn unescape_value(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(next) = chars.peek() {
                let decoded = match *next {
                    '\\' => Some('\\'),
                    '"' => Some('"'),
                    'n' => Some('\n'),
                    't' => Some('\t'),
                    'r' => Some('\r'),
                    _ => None,
                };
                if let Some(d) = decoded {
                    out.push(d);
                    chars.next();
                    continue;
                }
            }
        }
        out.push(c);
    }
    out
}

pub(crate) fn mi_escape(expr: &str) -> String {
    // Wrap a console command in MI-friendly quotes, escaping characters gdb/MI would treat
    // specially.
    let mut out = String::with_capacity(expr.len() + 2);
    out.push('"');
    for ch in expr.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            _ => out.push(ch),
        }
    }
    out.push('"');
    out
}

/// Return every `bkpt={...}` tuple body in `s`, honouring nested braces and quoted strings.
pub(crate) fn bkpt_tuples(s: &str) -> Vec<&str> {
    const MARKER: &str = "bkpt={";
    let mut out = Vec::new();
    let mut search_from = 0;
    while let Some(rel) = s[search_from..].find(MARKER) {
        let body_start = search_from + rel + MARKER.len();
        let mut depth = 1usize;
        let mut in_str = false;
        let mut escaped = false;
        let mut end = None;
        for (i, b) in s[body_start..].bytes().enumerate() {
            if in_str {
                match b {
                    _ if escaped => escaped = false,
                    b'\\' => escaped = true,
                    b'"' => in_str = false,
                    _ => {}
                }
                continue;
            }
            match b {
                b'"' => in_str = true,
                b'{' => depth += 1,
                b'}' => {
                    depth -= 1;
                    if depth == 0 {
                        end = Some(body_start + i);
                        break;
                    }
                }
                _ => {}
            }
        }
        let Some(end) = end else {
            break;
        };
        out.push(&s[body_start..end]);
        search_from = end + 1;
    }
    out
}

/// Parse one breakpoint tuple. Returns `None` when the tuple carries no usable number.
pub(crate) fn parse_breakpoint(tuple: &str) -> Option<BreakpointInfo> {
    // Sub-locations are numbered "1.2"; the owning breakpoint is the integer part.
    let number = parse_field(tuple, "number")
        .and_then(|n| n.split('.').next().and_then(|p| p.parse::<u32>().ok()))?;
    let disposition = match parse_field(tuple, "disp").as_deref() {
        Some("del") => Disposition::Delete,
        Some("dis") => Disposition::Disable,
        _ => Disposition::Keep,
    };
    Some(BreakpointInfo {
        number,
        kind: parse_field(tuple, "type"),
        file: parse_field(tuple, "file"),
        line: parse_u32_field(tuple, "line"),
        func: parse_field(tuple, "func"),
        enabled: parse_field(tuple, "enabled").as_deref() == Some("y"),
        times: parse_u32_field(tuple, "times").unwrap_or(0),
        condition: parse_field(tuple, "cond"),
        disposition,
    })
}

/// Parse every breakpoint in a `-break-list` result (or any text holding `bkpt` tuples).
pub(crate) fn parse_breakpoint_list(s: &str) -> Vec<BreakpointInfo> {
    bkpt_tuples(s)
        .into_iter()
        .filter_map(parse_breakpoint)
        .collect()
}

pub(crate) fn parse_stopped(line: &str) -> StoppedLocation {
    StoppedLocation {
        func: parse_field(line, "func"),
        file: parse_field(line, "file"),
        line: parse_u32_field(line, "line"),
        reason: parse_field(line, "reason"),
    }
}

pub(crate) fn parse_frame(res: &str) -> FrameInfo {
    FrameInfo {
        func: parse_field(res, "func"),
        file: parse_field(res, "file"),
        fullname: parse_field(res, "fullname"),
        line: parse_u32_field(res, "line"),
        addr: parse_field(res, "addr").and_then(|a| parse_hex_address(&a)),
    }
}

/// Parse the `lines=[{pc="0x..",line="N"},..]` table of `-symbol-list-lines`.
pub(crate) fn parse_line_table(res: &str) -> Vec<(u64, u32)> {
    let Ok(re) = Regex::new(r#"\{pc="(0x[0-9a-fA-F]+)",line="([0-9]+)"\}"#) else {
        return Vec::new();
    };
    re.captures_iter(res)
        .filter_map(|c| {
            let pc = parse_hex_address(&c[1])?;
            let line = c[2].parse::<u32>().ok()?;
            Some((pc, line))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unescape_value_handles_common_sequences() {
        assert_eq!(unescape_value("foo\\nbar"), "foo\nbar");
        assert_eq!(unescape_value("foo\\\"bar"), "foo\"bar");
        assert_eq!(unescape_value("foo\\\\bar"), "foo\\bar");
        assert_eq!(unescape_value("42\\tint x;"), "42\tint x;");
    }

    #[test]
    fn mi_escape_quotes_console_commands() {
        assert_eq!(mi_escape("info line main.c:10"), "\"info line main.c:10\"");
        assert_eq!(mi_escape(r#"list "a b.c":1"#), r#""list \"a b.c\":1""#);
    }

    #[test]
    fn split_token_reads_numeric_prefix() {
        assert_eq!(split_token("12^done"), (Some(12), "^done"));
        assert_eq!(split_token("^done"), (None, "^done"));
        assert_eq!(split_token("7*stopped,reason=\"x\""), (Some(7), "*stopped,reason=\"x\""));
    }

    #[test]
    fn console_text_decodes_record() {
        assert_eq!(
            console_text(r#"~"Line 42 of \"main.c\"\n""#).as_deref(),
            Some("Line 42 of \"main.c\"\n")
        );
        assert!(console_text("=thread-group-added,id=\"i1\"").is_none());
    }

    #[test]
    fn parse_field_respects_key_boundaries() {
        let s = r#"frame={func="main",fullname="/src/main.c",file="main.c",line="7"}"#;
        assert_eq!(parse_field(s, "file").as_deref(), Some("main.c"));
        assert_eq!(parse_field(s, "fullname").as_deref(), Some("/src/main.c"));
        assert!(parse_field(s, "name").is_none());
    }

    #[test]
    fn parse_status_error_message_is_unescaped() {
        let status = parse_status(r#"^error,msg="No symbol \"foo\" in current context.""#);
        assert_eq!(
            status,
            MiStatus::Error("No symbol \"foo\" in current context.".into())
        );
    }

    #[test]
    fn parse_breakpoint_reads_catchpoint_tuple() {
        let res = r#"=breakpoint-created,bkpt={number="3",type="catchpoint",disp="del",enabled="y",what="exception throw",catch-type="throw",thread-groups=["i1"],cond="x > 1",times="2"}"#;
        let tuples = bkpt_tuples(res);
        assert_eq!(tuples.len(), 1);
        let bp = parse_breakpoint(tuples[0]).unwrap();
        assert_eq!(bp.number, 3);
        assert_eq!(bp.kind.as_deref(), Some("catchpoint"));
        assert_eq!(bp.disposition, Disposition::Delete);
        assert!(bp.enabled);
        assert_eq!(bp.times, 2);
        assert_eq!(bp.condition.as_deref(), Some("x > 1"));
    }

    #[test]
    fn parse_breakpoint_list_handles_nested_locations() {
        let res = r#"^done,BreakpointTable={nr_rows="2",body=[bkpt={number="1",type="breakpoint",disp="keep",enabled="n",func="main",file="main.c",line="5",times="0",locations=[{number="1.1",enabled="y"}]},bkpt={number="2",type="breakpoint",disp="keep",enabled="y",file="util.c",line="9",times="1"}]}"#;
        let bps = parse_breakpoint_list(res);
        assert_eq!(bps.len(), 2);
        assert_eq!(bps[0].number, 1);
        assert!(!bps[0].enabled);
        assert_eq!(bps[1].file.as_deref(), Some("util.c"));
        assert_eq!(bps[1].line, Some(9));
    }

    #[test]
    fn parse_frame_and_line_table() {
        let frame = parse_frame(
            r#"^done,frame={level="0",addr="0x0000000000401136",func="main",file="main.c",fullname="/tmp/main.c",line="10"}"#,
        );
        assert_eq!(frame.addr, Some(0x401136));
        assert_eq!(frame.line, Some(10));
        assert_eq!(frame.fullname.as_deref(), Some("/tmp/main.c"));

        let table =
            parse_line_table(r#"^done,lines=[{pc="0x401126",line="3"},{pc="0x40112e",line="4"}]"#);
        assert_eq!(table, vec![(0x401126, 3), (0x40112e, 4)]);
    }
}
