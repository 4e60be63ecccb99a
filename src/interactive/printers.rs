use crate::mi::{BreakpointInfo, StoppedLocation};
use crate::query::{Catchpoint, Function, LineInfo, SourceLine, Symbol, SymbolKind, TypeInfo, Variable};

fn addr_str(addr: Option<u64>) -> String {
    addr.map(|a| format!("{:#x}", a))
        .unwrap_or_else(|| "<unknown>".to_string())
}

fn location_str(file: Option<&str>, line: Option<u32>) -> Option<String> {
    match (file, line) {
        (Some(f), Some(l)) => Some(format!("{}:{}", f, l)),
        (Some(f), None) => Some(f.to_string()),
        _ => None,
    }
}

pub fn print_catchpoint(cp: &Catchpoint) {
    let label = if cp.temporary {
        "temporary catchpoint"
    } else {
        "catchpoint"
    };
    let mut out = format!("{} {} ({}", label, cp.number, cp.kind);
    if let Some(event) = &cp.event {
        out.push(' ');
        out.push_str(event);
    }
    out.push(')');
    if !cp.enabled {
        out.push_str(" [disabled]");
    }
    if let Some(cond) = &cp.condition {
        out.push_str(&format!(" if {}", cond));
    }
    println!("{}", out);
}

pub fn print_breakpoint(bp: &BreakpointInfo) {
    let loc = match (&bp.file, &bp.line, &bp.func) {
        (Some(f), Some(l), _) => format!("{}:{}", f, l),
        (_, _, Some(func)) => func.clone(),
        _ => "<unknown>".to_string(),
    };
    println!("breakpoint {} at {}", bp.number, loc);
}

pub fn print_breakpoints(bps: &[BreakpointInfo]) {
    if bps.is_empty() {
        println!("no breakpoints");
        return;
    }
    println!("  num  type        enb  hits  where");
    for bp in bps {
        let loc = location_str(bp.file.as_deref(), bp.line)
            .or_else(|| bp.func.clone())
            .unwrap_or_default();
        println!(
            "  {:<4} {:<11} {:<4} {:<5} {}",
            bp.number,
            bp.kind.as_deref().unwrap_or("?"),
            if bp.enabled { "y" } else { "n" },
            bp.times,
            loc
        );
    }
}

pub fn print_stopped(loc: &StoppedLocation) {
    let where_str = match (&loc.file, &loc.line, &loc.func) {
        (Some(f), Some(l), Some(func)) => format!("stopped at {}:{} ({})", f, l, func),
        (Some(f), Some(l), None) => format!("stopped at {}:{}", f, l),
        _ => "stopped (location unknown)".to_string(),
    };
    if let Some(reason) = &loc.reason {
        println!("{} | reason: {}", where_str, reason);
    } else {
        println!("{}", where_str);
    }
}

pub fn print_symbol(sym: &Symbol) {
    let kind = match sym.kind {
        Some(SymbolKind::Function) => "function",
        Some(SymbolKind::Variable) => "variable",
        Some(SymbolKind::Static) => "static",
        None => "symbol",
    };
    println!("{} {} @ {}", kind, sym.name, addr_str(sym.address));
}

pub fn print_line_info(info: &LineInfo) {
    println!(
        "{}:{} [{} .. {})",
        info.file,
        info.line,
        addr_str(info.start_address),
        addr_str(info.end_address)
    );
}

pub fn print_line_table(lines: &[LineInfo]) {
    if lines.is_empty() {
        println!("no line table");
        return;
    }
    for l in lines {
        println!("  {:>5}  {}", l.line, addr_str(l.start_address));
    }
}

pub fn print_functions(funcs: &[Function]) {
    if funcs.is_empty() {
        println!("no functions");
        return;
    }
    for f in funcs {
        let name = f.signature.as_deref().or(f.name.as_deref()).unwrap_or("?");
        let loc = location_str(f.file.as_deref(), f.line).unwrap_or_default();
        println!("  {:<18} {}  {}", addr_str(f.address), name, loc);
    }
}

pub fn print_variables(vars: &[Variable]) {
    if vars.is_empty() {
        println!("no variables");
        return;
    }
    for v in vars {
        let loc = location_str(v.file.as_deref(), v.line).unwrap_or_default();
        println!("  {} {}  {}", v.type_name, v.name, loc);
    }
}

pub fn print_types(types: &[TypeInfo]) {
    if types.is_empty() {
        println!("no types");
        return;
    }
    for t in types {
        let loc = location_str(t.file.as_deref(), t.line).unwrap_or_default();
        println!("  {:<8} {}  {}", t.kind, t.name, loc);
    }
}

pub fn print_type(ty: &TypeInfo) {
    println!("{} ({})", ty.name, ty.kind);
    print!("{}", ty.members);
    if !ty.members.ends_with('\n') {
        println!();
    }
}

pub fn print_source_lines(lines: &[SourceLine]) {
    if lines.is_empty() {
        println!("no source lines");
        return;
    }
    for l in lines {
        let marker = match (l.is_current, l.has_breakpoint) {
            (true, true) => "B>",
            (true, false) => " >",
            (false, true) => "B ",
            (false, false) => "  ",
        };
        println!("{} {:>5}  {}", marker, l.line, l.text.as_deref().unwrap_or(""));
    }
}

pub fn print_source_files(files: &[String]) {
    if files.is_empty() {
        println!("no source files");
        return;
    }
    for f in files {
        println!("  {}", f);
    }
}
