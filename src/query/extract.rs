// Extractors scan line by line and skip what they do not recognise; an unmatched line is
// never an error.

use crate::error::{MiError, Result};
use crate::query::lex::{
    find_hex_address, hex_after, next_token, parse_hex_address, parse_leading_int,
    parse_line_number, split_line_prefix, strip_line_number, take_until,
};
use crate::query::records::{
    Function, LineInfo, SourceLine, Symbol, SymbolKind, TypeInfo, TypeKind, Variable,
};
use regex::Regex;

/// Scanner state for `info functions` / `info variables` / `info types` listings.
#[derive(Debug, Clone, PartialEq, Eq)]
enum ListingState {
    SeekingEntry,
    InFile(String),
}

/// One candidate entry of a listing plus the file block it appeared in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ListingEntry<'a> {
    pub text: &'a str,
    pub file: Option<String>,
}

/// Walks a grouped listing.
///
/// Transitions: `File X:` enters `InFile(X)` (text up to the first colon);
/// `Non-debugging symbols:` returns to `SeekingEntry`; blank lines and banners ending in
/// `:` are skipped. Every other line is yielded with the current file attached.
pub(crate) struct ListingScanner<'a> {
    lines: std::str::Lines<'a>,
    state: ListingState,
}

impl<'a> ListingScanner<'a> {
    pub fn new(text: &'a str) -> Self {
        Self {
            lines: text.lines(),
            state: ListingState::SeekingEntry,
        }
    }
}

impl<'a> Iterator for ListingScanner<'a> {
    type Item = ListingEntry<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        for raw in self.lines.by_ref() {
            let line = raw.trim_start_matches(&[' ', '\t'][..]).trim_end();
            if line.is_empty() {
                continue;
            }
            if let Some(rest) = line.strip_prefix("File ") {
                if let Some((file, _)) = rest.split_once(':') {
                    self.state = ListingState::InFile(file.to_string());
                }
                continue;
            }
            if line.starts_with("Non-debugging symbols") {
                self.state = ListingState::SeekingEntry;
                continue;
            }
            if line.starts_with("All ") && line.ends_with(':') {
                continue;
            }
            let file = match &self.state {
                ListingState::InFile(f) => Some(f.clone()),
                ListingState::SeekingEntry => None,
            };
            return Some(ListingEntry { text: line, file });
        }
        None
    }
}

/// `info address <symbol>`: name echoes the request, address is the first hex token.
pub fn symbol_from_info_address(symbol: &str, output: &str) -> Symbol {
    let kind = if output.contains("is a function") {
        Some(SymbolKind::Function)
    } else if output.contains("is a variable") {
        Some(SymbolKind::Variable)
    } else if output.contains("is static") {
        Some(SymbolKind::Static)
    } else {
        None
    };
    Symbol {
        name: symbol.to_string(),
        kind,
        address: find_hex_address(output),
        ..Symbol::default()
    }
}

/// `info symbol <addr>`: `foo + 16 in section .text of /path/bin`.
pub fn symbol_from_info_symbol(address: u64, output: &str) -> Result<Symbol> {
    let trimmed = output.trim_start();
    if trimmed.starts_with("No symbol matches") {
        return Err(MiError::NotFound(trimmed.trim_end().to_string()));
    }
    let (name, _) = next_token(trimmed).ok_or(MiError::MissingField("symbol name"))?;
    Ok(Symbol {
        name: name.to_string(),
        address: Some(address),
        ..Symbol::default()
    })
}

/// `info line <file>:<line>`: both addresses are optional.
pub fn line_info_from_output(file: &str, line: u32, output: &str) -> LineInfo {
    LineInfo {
        file: file.to_string(),
        line,
        start_address: hex_after(output, "starts at address "),
        end_address: hex_after(output, "ends at "),
    }
}

/// `info line *<addr>`: file and line come from the `Line N of "file"` preamble.
pub fn line_info_from_address_output(output: &str) -> Result<LineInfo> {
    let re = Regex::new(r#"Line ([0-9]+) of "([^"]+)""#).map_err(|_| MiError::MissingField("line"))?;
    let caps = re.captures(output).ok_or(MiError::MissingField("line"))?;
    let line = caps[1]
        .parse::<u32>()
        .map_err(|_| MiError::MissingField("line"))?;
    Ok(LineInfo {
        file: caps[2].to_string(),
        line,
        start_address: hex_after(output, "starts at address ")
            .or_else(|| hex_after(output, "is at address ")),
        end_address: hex_after(output, "ends at "),
    })
}

/// `info functions`: only address-prefixed entries become records.
pub fn functions_from_listing(output: &str) -> Vec<Function> {
    ListingScanner::new(output)
        .filter_map(|entry| parse_function_entry(&entry))
        .collect()
}

fn parse_function_entry(entry: &ListingEntry<'_>) -> Option<Function> {
    if !entry.text.starts_with("0x") {
        return None;
    }
    let (addr_token, rest) = next_token(entry.text)?;
    let decl = rest.trim_start();

    let is_static = decl.starts_with("static ");
    let name = take_until(decl.trim_start_matches("static "), &['(', ' ', '\t']);
    let (signature, location) = match decl.find(" at ") {
        Some(idx) => (&decl[..idx], Some(&decl[idx + 4..])),
        None => (decl, None),
    };

    let mut func = Function {
        name: (!name.is_empty()).then(|| name.to_string()),
        address: parse_hex_address(addr_token),
        signature: (!signature.trim().is_empty()).then(|| signature.trim().to_string()),
        is_static,
        ..Function::default()
    };
    match location.and_then(|loc| loc.split_once(':')) {
        Some((file, line)) => {
            func.file = Some(file.trim().to_string());
            func.line = parse_leading_int(line).and_then(|n| u32::try_from(n).ok());
        }
        None => func.file = entry.file.clone(),
    }
    Some(func)
}

/// Debug-info entries of `info functions`: `3:\tint main(void);` under a `File X:` header.
///
/// The name is the last word before `(`; file and line come from the header and the
/// `N:` prefix. Address-prefixed entries are left to [`functions_from_listing`].
pub fn function_decls_from_listing(output: &str) -> Vec<Function> {
    ListingScanner::new(output)
        .filter_map(|entry| parse_function_decl(&entry))
        .collect()
}

fn parse_function_decl(entry: &ListingEntry<'_>) -> Option<Function> {
    let (line, decl) = split_line_prefix(entry.text);
    let line = line?;
    let decl = decl.trim_end_matches(';').trim_end();
    let paren = decl.find('(')?;
    let before = decl[..paren].trim_end();
    let name_start = before
        .rfind(|c: char| c.is_whitespace() || c == '*' || c == '&')
        .map(|i| i + 1)
        .unwrap_or(0);
    let name = &before[name_start..];
    if name.is_empty() {
        return None;
    }
    Some(Function {
        name: Some(name.to_string()),
        file: entry.file.clone(),
        line: Some(line),
        address: None,
        signature: Some(decl.to_string()),
        is_static: decl.starts_with("static "),
    })
}

/// `info variables`: declarations terminated by `;`.
pub fn variables_from_listing(output: &str) -> Vec<Variable> {
    ListingScanner::new(output)
        .filter_map(|entry| parse_variable_entry(&entry))
        .collect()
}

fn parse_variable_entry(entry: &ListingEntry<'_>) -> Option<Variable> {
    let (line, decl) = split_line_prefix(entry.text);
    let semi = decl.find(';')?;
    let before = &decl[..semi];
    let name_start = before
        .rfind(|c: char| c.is_whitespace() || c == '*')
        .map(|i| i + 1)
        .unwrap_or(0);
    let name = &before[name_start..];
    if name.is_empty() {
        return None;
    }
    Some(Variable {
        name: name.to_string(),
        type_name: before[..name_start].trim_end().to_string(),
        file: entry.file.clone(),
        line,
        is_static: decl.contains("static"),
    })
}

/// `info types`: one entry per declaration inside a file block.
pub fn types_from_listing(output: &str) -> Vec<TypeInfo> {
    ListingScanner::new(output)
        .filter_map(|entry| {
            let file = entry.file.clone()?;
            let (line, decl) = split_line_prefix(entry.text);
            let decl = decl.trim_end_matches(';').trim();
            if decl.is_empty() {
                return None;
            }
            let keyword = decl.split_whitespace().next().unwrap_or("");
            let kind = match keyword {
                "struct" => TypeKind::Struct,
                "union" => TypeKind::Union,
                "enum" => TypeKind::Enum,
                "class" => TypeKind::Class,
                "typedef" => TypeKind::Typedef,
                _ => TypeKind::Other,
            };
            let name = match kind {
                TypeKind::Typedef => decl.split_whitespace().last().unwrap_or(decl),
                _ => decl,
            };
            Some(TypeInfo {
                name: name.to_string(),
                kind,
                members: String::new(),
                file: Some(file),
                line,
            })
        })
        .collect()
}

/// Classify `ptype` / `whatis` output by the first matching `type = <kind>` phrase.
pub fn classify_type(output: &str) -> TypeKind {
    const KINDS: [(&str, TypeKind); 4] = [
        ("type = struct", TypeKind::Struct),
        ("type = union", TypeKind::Union),
        ("type = enum", TypeKind::Enum),
        ("type = class", TypeKind::Class),
    ];
    KINDS
        .iter()
        .find(|(phrase, _)| output.contains(phrase))
        .map(|(_, kind)| *kind)
        .unwrap_or(TypeKind::Other)
}

/// Build a type record; the captured body moves into `members`.
pub fn type_info_from_output(name: &str, output: String) -> TypeInfo {
    TypeInfo {
        name: name.to_string(),
        kind: classify_type(&output),
        members: output,
        file: None,
        line: None,
    }
}

/// `list ...`: keep lines that start with a line number, in listing order.
pub fn source_lines_from_listing(output: &str) -> Vec<SourceLine> {
    output
        .lines()
        .filter_map(|raw| {
            let number = parse_line_number(raw)?;
            let text = strip_line_number(raw).trim_end_matches('\r');
            Some(SourceLine {
                line: number,
                text: (!text.is_empty()).then(|| text.to_string()),
                ..SourceLine::default()
            })
        })
        .collect()
}

/// `info sources`: comma separated paths under per-objfile or per-state headers.
pub fn source_files_from_listing(output: &str) -> Vec<String> {
    let mut files: Vec<String> = Vec::new();
    for line in output.lines() {
        let line = line.trim();
        if line.is_empty() || line.ends_with(':') || line.starts_with('(') {
            continue;
        }
        for part in line.split(',') {
            let path = part.trim();
            if !path.is_empty() && !files.iter().any(|f| f == path) {
                files.push(path.to_string());
            }
        }
    }
    files
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn info_address_collects_address_and_kind() {
        let sym = symbol_from_info_address(
            "foo",
            "Symbol \"foo\" is at 0x4011a0 in a file compiled without debugging.\n",
        );
        assert_eq!(sym.name, "foo");
        assert_eq!(sym.address, Some(0x4011a0));
        assert_eq!(sym.kind, None);

        let sym = symbol_from_info_address("main", "Symbol \"main\" is a function at address 0x401136.\n");
        assert_eq!(sym.kind, Some(SymbolKind::Function));
        assert_eq!(sym.address, Some(0x401136));

        let sym = symbol_from_info_address(
            "x",
            "Symbol \"x\" is a variable at frame base reg $rbp offset 16+-20.\n",
        );
        assert_eq!(sym.kind, Some(SymbolKind::Variable));
        assert_eq!(sym.address, None);
    }

    #[test]
    fn info_symbol_takes_first_token() {
        let sym = symbol_from_info_symbol(0x401146, "foo + 16 in section .text of /path/to/binary\n")
            .unwrap();
        assert_eq!(sym.name, "foo");
        assert_eq!(sym.address, Some(0x401146));

        assert!(matches!(
            symbol_from_info_symbol(0x10, "No symbol matches 0x10.\n"),
            Err(MiError::NotFound(_))
        ));
        assert!(matches!(
            symbol_from_info_symbol(0x10, ""),
            Err(MiError::MissingField(_))
        ));
    }

    #[test]
    fn line_info_fields_are_independent() {
        let full = line_info_from_output(
            "main.c",
            42,
            "Line 42 of \"main.c\" starts at address 0x401136 <main+10> and ends at 0x401141 <main+21>.\n",
        );
        assert_eq!(full.start_address, Some(0x401136));
        assert_eq!(full.end_address, Some(0x401141));

        let partial = line_info_from_output(
            "main.c",
            42,
            "Line 42 of \"main.c\" starts at address 0x401136 <main+10>.\n",
        );
        assert_eq!(partial.file, "main.c");
        assert_eq!(partial.line, 42);
        assert_eq!(partial.start_address, Some(0x401136));
        assert_eq!(partial.end_address, None);
    }

    #[test]
    fn line_info_by_address_reads_file_and_line() {
        let info = line_info_from_address_output(
            "Line 10 of \"main.c\" starts at address 0x401136 <main+4> and ends at 0x40113d <main+11>.\n",
        )
        .unwrap();
        assert_eq!(info.file, "main.c");
        assert_eq!(info.line, 10);
        assert_eq!(info.end_address, Some(0x40113d));
        assert!(line_info_from_address_output("No line number information available").is_err());
    }

    #[test]
    fn function_entry_with_inline_location() {
        let funcs = functions_from_listing("0x0000000000401136 main(int, char**) at main.c:10\n");
        assert_eq!(funcs.len(), 1);
        let f = &funcs[0];
        assert_eq!(f.name.as_deref(), Some("main"));
        assert_eq!(f.address, Some(0x401136));
        assert_eq!(f.file.as_deref(), Some("main.c"));
        assert_eq!(f.line, Some(10));
        assert_eq!(f.signature.as_deref(), Some("main(int, char**)"));
    }

    #[test]
    fn function_entry_inherits_file_header() {
        let text = "All functions matching regular expression \"h\":\n\nFile foo.c:\n0x0000000000401126  helper\nint unrelated(void);\n---\n";
        let funcs = functions_from_listing(text);
        assert_eq!(funcs.len(), 1);
        assert_eq!(funcs[0].name.as_deref(), Some("helper"));
        assert_eq!(funcs[0].file.as_deref(), Some("foo.c"));
        assert_eq!(funcs[0].line, None);
    }

    #[test]
    fn non_debugging_section_leaves_file_context() {
        let text = "File foo.c:\n0x401126 helper(void)\n\nNon-debugging symbols:\n0x0000000000401000  _init\n";
        let funcs = functions_from_listing(text);
        assert_eq!(funcs.len(), 2);
        assert_eq!(funcs[1].name.as_deref(), Some("_init"));
        assert_eq!(funcs[1].file, None);
    }

    #[test]
    fn debug_info_function_declarations() {
        let text = "All functions matching regular expression \"^main$\":\n\nFile main.c:\n3:\tint main(void);\n7:\tstatic char *helper(int, char **);\n\nNon-debugging symbols:\n0x0000000000401000  _init\n";
        let decls = function_decls_from_listing(text);
        assert_eq!(decls.len(), 2);
        assert_eq!(decls[0].name.as_deref(), Some("main"));
        assert_eq!(decls[0].file.as_deref(), Some("main.c"));
        assert_eq!(decls[0].line, Some(3));
        assert_eq!(decls[0].address, None);
        assert_eq!(decls[0].signature.as_deref(), Some("int main(void)"));
        assert_eq!(decls[1].name.as_deref(), Some("helper"));
        assert!(decls[1].is_static);
        assert!(functions_from_listing("File main.c:\n3:\tint main(void);\n").is_empty());
    }

    #[test]
    fn signed_numbers_are_not_source_lines() {
        let lines = source_lines_from_listing("+5\tint x;\n-2\tfoo\n6\tint y;\n");
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].line, 6);
        assert_eq!(lines[0].text.as_deref(), Some("int y;"));
    }

    #[test]
    fn static_function_name_skips_storage_class() {
        let funcs = functions_from_listing("0x0000000000401160 static helper(void) at util.c:22\n");
        assert_eq!(funcs[0].name.as_deref(), Some("helper"));
        assert!(funcs[0].is_static);
        assert_eq!(funcs[0].signature.as_deref(), Some("static helper(void)"));
    }

    #[test]
    fn variables_keep_declarations_only() {
        let text = "All defined variables:\n\nFile vars.c:\n13:\tint count;\n\tstatic char *name;\nchar buf[16];\nnot a declaration\n\nNon-debugging symbols:\n0x0000000000404028  completed.0\n";
        let vars = variables_from_listing(text);
        assert_eq!(vars.len(), 3);

        assert_eq!(vars[0].name, "count");
        assert_eq!(vars[0].type_name, "int");
        assert_eq!(vars[0].line, Some(13));
        assert_eq!(vars[0].file.as_deref(), Some("vars.c"));
        assert!(!vars[0].is_static);

        assert_eq!(vars[1].name, "name");
        assert_eq!(vars[1].type_name, "static char *");
        assert!(vars[1].is_static);

        assert_eq!(vars[2].name, "buf[16]");
        assert_eq!(vars[2].type_name, "char");
    }

    #[test]
    fn static_pointer_declaration() {
        let vars = variables_from_listing("static char *name;");
        assert_eq!(vars.len(), 1);
        assert!(vars[0].is_static);
        assert!(vars[0].type_name.starts_with("static char *"));
        assert_eq!(vars[0].name, "name");
        assert_eq!(vars[0].file, None);
    }

    #[test]
    fn ptype_classification_and_ownership() {
        let body = String::from("type = struct { int x; int y; }\n");
        let ptr = body.as_ptr();
        let info = type_info_from_output("point", body);
        assert_eq!(info.kind, TypeKind::Struct);
        assert_eq!(info.members.as_ptr(), ptr);
        assert_eq!(classify_type("type = union u {\n}"), TypeKind::Union);
        assert_eq!(classify_type("type = enum color {RED}"), TypeKind::Enum);
        assert_eq!(classify_type("type = class Foo {"), TypeKind::Class);
        assert_eq!(classify_type("type = int"), TypeKind::Other);
    }

    #[test]
    fn types_listing_groups_by_file() {
        let text = "All defined types:\n\nFile shapes.h:\n3:      struct point;\n        typedef int myint;\n        char\n";
        let types = types_from_listing(text);
        assert_eq!(types.len(), 3);
        assert_eq!(types[0].kind, TypeKind::Struct);
        assert_eq!(types[0].name, "struct point");
        assert_eq!(types[0].line, Some(3));
        assert_eq!(types[1].kind, TypeKind::Typedef);
        assert_eq!(types[1].name, "myint");
        assert_eq!(types[2].kind, TypeKind::Other);
        assert_eq!(types[2].file.as_deref(), Some("shapes.h"));
    }

    #[test]
    fn source_listing_skips_unnumbered_lines() {
        let lines = source_lines_from_listing("42\tint x = 10;\n---\n43\t  return x;\n44\t\n");
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0].line, 42);
        assert_eq!(lines[0].text.as_deref(), Some("int x = 10;"));
        assert_eq!(lines[1].line, 43);
        assert_eq!(lines[1].text.as_deref(), Some("return x;"));
        assert_eq!(lines[2].line, 44);
        assert_eq!(lines[2].text, None);
        assert!(lines.iter().all(|l| !l.is_current && !l.has_breakpoint));
    }

    #[test]
    fn source_files_are_deduplicated() {
        let text = "/tmp/a.out:\n\n/tmp/main.c, /usr/include/stdio.h, /tmp/main.c\n\nSource files for which symbols will be read in on demand:\n\n/tmp/util.c\n";
        assert_eq!(
            source_files_from_listing(text),
            vec!["/tmp/main.c", "/usr/include/stdio.h", "/tmp/util.c"]
        );
    }
}
