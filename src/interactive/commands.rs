use super::printers::{
    print_breakpoint, print_breakpoints, print_catchpoint, print_functions, print_line_info,
    print_line_table, print_source_files, print_source_lines, print_stopped, print_symbol,
    print_type, print_types, print_variables,
};
use crate::mi::{MiSession, Transport};
use crate::query::lex::{parse_hex_address, parse_leading_int};
use crate::query::{annotate_breakpoints, CatchKind, SourceLine};

pub enum CommandOutcome {
    Continue,
    Quit,
}

fn parse_number(s: &str) -> Option<u32> {
    s.trim().parse::<u32>().ok()
}

/// `0x`-prefixed hex or plain decimal.
fn parse_address(s: &str) -> Option<u64> {
    let s = s.trim();
    parse_hex_address(s).or_else(|| s.parse::<u64>().ok())
}

fn parse_byte(s: &str) -> Option<u8> {
    parse_address(s).and_then(|v| u8::try_from(v).ok())
}

fn optional(rest: &str) -> Option<&str> {
    (!rest.is_empty()).then_some(rest)
}

pub fn execute_command<T: Transport>(
    input: &str,
    cmd: &str,
    rest: &str,
    session: &mut MiSession<T>,
) -> CommandOutcome {
    match cmd {
        "quit" | "q" => return CommandOutcome::Quit,
        "help" => print_help(),
        "catch" | "tcatch" => handle_catch(cmd == "tcatch", rest, session),
        "delete" | "d" => match parse_number(rest) {
            Some(n) => {
                if let Err(e) = session.catch_delete(n) {
                    eprintln!("delete error: {}", e);
                }
            }
            None => println!("usage: delete <number>"),
        },
        "enable" | "disable" => match parse_number(rest) {
            Some(n) => {
                if let Err(e) = session.catch_set_enabled(n, cmd == "enable") {
                    eprintln!("{} error: {}", cmd, e);
                }
            }
            None => println!("usage: {} <number>", cmd),
        },
        "cond" => {
            let (num, expr) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
            match parse_number(num) {
                Some(n) if !expr.trim().is_empty() => {
                    if let Err(e) = session.catch_set_condition(n, expr.trim()) {
                        eprintln!("cond error: {}", e);
                    }
                }
                _ => println!("usage: cond <number> <expr>"),
            }
        }
        "address" => match session.info_address(rest) {
            Ok(sym) => print_symbol(&sym),
            Err(e) => eprintln!("address error: {}", e),
        },
        "symbol" => match parse_address(rest) {
            Some(addr) => match session.info_symbol(addr) {
                Ok(sym) => print_symbol(&sym),
                Err(e) => eprintln!("symbol error: {}", e),
            },
            None => println!("usage: symbol <address>"),
        },
        "line" => handle_line(rest, session),
        "funcs" => match session.list_functions(optional(rest)) {
            Ok(funcs) => print_functions(&funcs),
            Err(e) => eprintln!("funcs error: {}", e),
        },
        "func" => match session.info_function(rest) {
            Ok(f) => print_functions(std::slice::from_ref(&f)),
            Err(e) => eprintln!("func error: {}", e),
        },
        "vars" => match session.list_variables(optional(rest)) {
            Ok(vars) => print_variables(&vars),
            Err(e) => eprintln!("vars error: {}", e),
        },
        "types" => match session.list_types(optional(rest)) {
            Ok(types) => print_types(&types),
            Err(e) => eprintln!("types error: {}", e),
        },
        "ptype" => match session.ptype(rest) {
            Ok(ty) => print_type(&ty),
            Err(e) => eprintln!("ptype error: {}", e),
        },
        "whatis" => match session.whatis(rest) {
            Ok(ty) => print_type(&ty),
            Err(e) => eprintln!("whatis error: {}", e),
        },
        "sources" => match session.list_source_files() {
            Ok(files) => print_source_files(&files),
            Err(e) => eprintln!("sources error: {}", e),
        },
        "lines" => match session.list_lines(rest) {
            Ok(lines) => print_line_table(&lines),
            Err(e) => eprintln!("lines error: {}", e),
        },
        "list" | "l" => handle_list(rest, session),
        "where" => match session.source_current_line() {
            Ok(mut lines) => {
                if let Ok(frame) = session.stack_info_frame() {
                    if let Some(file) = frame.file {
                        mark_breakpoints(&mut lines, &file, session);
                    }
                }
                print_source_lines(&lines);
            }
            Err(e) => eprintln!("where error: {}", e),
        },
        "breaks" => match session.list_breakpoints() {
            Ok(bps) => print_breakpoints(&bps),
            Err(e) => eprintln!("breaks error: {}", e),
        },
        "break" | "b" => {
            if rest.is_empty() {
                println!("usage: break <location>");
            } else {
                match session.break_insert(rest) {
                    Ok(info) => print_breakpoint(&info),
                    Err(e) => eprintln!("break error: {}", e),
                }
            }
        }
        "run" | "r" => match session.run_to_main() {
            Ok(loc) => print_stopped(&loc),
            Err(e) => eprintln!("run error: {}", e),
        },
        "next" | "n" => match session.exec_next() {
            Ok(loc) => print_stopped(&loc),
            Err(e) => eprintln!("next error: {}", e),
        },
        "step" | "s" => match session.exec_step() {
            Ok(loc) => print_stopped(&loc),
            Err(e) => eprintln!("step error: {}", e),
        },
        "continue" | "c" => match session.exec_continue() {
            Ok(loc) => print_stopped(&loc),
            Err(e) => eprintln!("continue error: {}", e),
        },
        "poke" => handle_poke(rest, session),
        "pokel" => {
            let mut parts = rest.split_whitespace();
            let addr = parts.next().and_then(parse_address);
            let value = parts.next().and_then(parse_leading_int);
            match (addr, value) {
                (Some(a), Some(v)) => {
                    if let Err(e) = session.write_value(a, v) {
                        eprintln!("pokel error: {}", e);
                    }
                }
                _ => println!("usage: pokel <address> <value>"),
            }
        }
        _ => {
            println!("unknown command: '{}'", input);
        }
    }
    CommandOutcome::Continue
}

fn handle_catch<T: Transport>(temporary: bool, rest: &str, session: &mut MiSession<T>) {
    let (event, filter) = match rest.split_once(char::is_whitespace) {
        Some((event, filter)) => (event, optional(filter.trim())),
        None => (rest, None),
    };
    let kind = match event.parse::<CatchKind>() {
        Ok(kind) => kind,
        Err(e) => {
            println!("{}", e);
            println!(
                "usage: catch <throw|catch|exec|fork|vfork|load|unload|syscall|signal|assert> [filter]"
            );
            return;
        }
    };
    match session.catch(kind, filter, temporary) {
        Ok(cp) => print_catchpoint(&cp),
        Err(e) => eprintln!("catch error: {}", e),
    }
}

fn handle_line<T: Transport>(rest: &str, session: &mut MiSession<T>) {
    if let Some(addr) = rest.strip_prefix('*') {
        match parse_address(addr) {
            Some(a) => match session.info_line_at_address(a) {
                Ok(info) => print_line_info(&info),
                Err(e) => eprintln!("line error: {}", e),
            },
            None => println!("usage: line *<address>"),
        }
        return;
    }
    match rest.rsplit_once(':') {
        Some((file, line)) => match parse_number(line) {
            Some(l) => match session.info_line(file, l) {
                Ok(info) => print_line_info(&info),
                Err(e) => eprintln!("line error: {}", e),
            },
            None => println!("usage: line <file>:<line> | line *<address>"),
        },
        None => println!("usage: line <file>:<line> | line *<address>"),
    }
}

/// `list`, `list *ADDR`, `list FILE[:START] [COUNT]` or `list FUNCTION`.
fn handle_list<T: Transport>(rest: &str, session: &mut MiSession<T>) {
    let mut parts = rest.split_whitespace();
    let Some(target) = parts.next() else {
        match session.source_list(None, 0, 0) {
            Ok(lines) => print_source_lines(&lines),
            Err(e) => eprintln!("list error: {}", e),
        }
        return;
    };
    let count = parts.next().and_then(parse_number).unwrap_or(10);

    if let Some(addr) = target.strip_prefix('*') {
        match parse_address(addr) {
            Some(a) => match session.source_list_address(a) {
                Ok(lines) => print_source_lines(&lines),
                Err(e) => eprintln!("list error: {}", e),
            },
            None => println!("usage: list *<address>"),
        }
        return;
    }

    let (file, start) = match target.rsplit_once(':') {
        Some((file, start)) => (file, parse_number(start).unwrap_or(1)),
        None if target.contains('.') => (target, 1),
        None => {
            match session.source_list_function(target) {
                Ok(lines) => print_source_lines(&lines),
                Err(e) => eprintln!("list error: {}", e),
            }
            return;
        }
    };
    match session.source_list(Some(file), start, count) {
        Ok(mut lines) => {
            mark_breakpoints(&mut lines, file, session);
            print_source_lines(&lines);
        }
        Err(e) => eprintln!("list error: {}", e),
    }
}

fn mark_breakpoints<T: Transport>(lines: &mut [SourceLine], file: &str, session: &mut MiSession<T>) {
    match session.list_breakpoints() {
        Ok(bps) => annotate_breakpoints(lines, file, &bps),
        Err(e) => eprintln!("breakpoint lookup failed: {}", e),
    }
}

fn handle_poke<T: Transport>(rest: &str, session: &mut MiSession<T>) {
    let mut parts = rest.split_whitespace();
    let Some(addr) = parts.next().and_then(parse_address) else {
        println!("usage: poke <address> <byte> [byte ...]");
        return;
    };
    let bytes: Option<Vec<u8>> = parts.map(parse_byte).collect();
    match bytes {
        Some(bytes) => {
            if let Err(e) = session.write_memory(addr, &bytes) {
                eprintln!("poke error: {}", e);
            }
        }
        None => println!("poke: bytes must be 0..=255"),
    }
}

fn print_help() {
    println!("Commands:");
    println!("  catch <event> [filter]  - set a catchpoint (throw, catch, exec, fork, vfork,");
    println!("                            load, unload, syscall, signal, assert)");
    println!("  tcatch <event> [filter] - set a temporary catchpoint");
    println!("  delete | d <n>          - delete a catchpoint or breakpoint");
    println!("  enable <n> / disable <n>");
    println!("  cond <n> <expr>         - attach a condition");
    println!("  breaks                  - list breakpoints and catchpoints");
    println!("  address <symbol>        - where a symbol lives");
    println!("  symbol <address>        - which symbol covers an address");
    println!("  line <file>:<n>         - code range of a source line ('line *<addr>' for reverse)");
    println!("  funcs [regexp]          - list functions");
    println!("  func <name>             - look up a single function");
    println!("  vars [regexp]           - list global and static variables");
    println!("  types [regexp]          - list types");
    println!("  ptype <type> / whatis <expr>");
    println!("  sources                 - list source files");
    println!("  lines <file>            - line table of a source file");
    println!("  list [file[:n] [count] | *addr | function]");
    println!("  where                   - current source line");
    println!("  break <loc> | b         - set breakpoint (e.g. 'break main', 'b file.c:42')");
    println!("  run | r                 - break at main and run");
    println!("  next | n / step | s / continue | c");
    println!("  poke <addr> <byte>...   - write bytes to memory");
    println!("  pokel <addr> <value>    - write a long to memory");
    println!("  help                    - show this message");
    println!("  quit | q                - exit");
}
