use crate::error::{MiError, Result};
use crate::mi::parser::parse_line_table;
use crate::mi::session::MiSession;
use crate::mi::transport::Transport;
use crate::query::extract::{
    function_decls_from_listing, functions_from_listing, line_info_from_address_output,
    line_info_from_output, source_files_from_listing, symbol_from_info_address,
    symbol_from_info_symbol, type_info_from_output, types_from_listing, variables_from_listing,
};
use crate::query::records::{Function, LineInfo, Symbol, TypeInfo, Variable};

/// `info functions`, `info variables`, ... with an optional regexp argument.
fn listing_command(base: &str, regexp: Option<&str>) -> String {
    match regexp.map(str::trim).filter(|r| !r.is_empty()) {
        Some(re) => format!("{} {}", base, re),
        None => base.to_string(),
    }
}

fn require<'a>(value: &'a str, what: &'static str) -> Result<&'a str> {
    let value = value.trim();
    if value.is_empty() {
        return Err(MiError::InvalidArgument(what));
    }
    Ok(value)
}

impl<T: Transport> MiSession<T> {
    /// Resolve a symbol name to its address and storage class.
    pub fn info_address(&mut self, symbol: &str) -> Result<Symbol> {
        let symbol = require(symbol, "empty symbol name")?;
        let capture = self.capture_console(&format!("info address {}", symbol))?;
        Ok(symbol_from_info_address(symbol, &capture.text))
    }

    /// Name the symbol that covers `address`.
    pub fn info_symbol(&mut self, address: u64) -> Result<Symbol> {
        let capture = self.capture_console(&format!("info symbol {:#x}", address))?;
        symbol_from_info_symbol(address, &capture.text)
    }

    /// Code range generated for `file:line`.
    pub fn info_line(&mut self, file: &str, line: u32) -> Result<LineInfo> {
        let file = require(file, "empty file name")?;
        if line == 0 {
            return Err(MiError::InvalidArgument("line numbers start at 1"));
        }
        let capture = self.capture_console(&format!("info line {}:{}", file, line))?;
        Ok(line_info_from_output(file, line, &capture.text))
    }

    /// Source line containing `address`.
    pub fn info_line_at_address(&mut self, address: u64) -> Result<LineInfo> {
        let capture = self.capture_console(&format!("info line *{:#x}", address))?;
        line_info_from_address_output(&capture.text)
    }

    pub fn list_functions(&mut self, regexp: Option<&str>) -> Result<Vec<Function>> {
        let capture = self.capture_console(&listing_command("info functions", regexp))?;
        Ok(functions_from_listing(&capture.text))
    }

    /// The function named exactly `name`.
    pub fn info_function(&mut self, name: &str) -> Result<Function> {
        let name = require(name, "empty function name")?;
        let capture = self.capture_console(&format!("info functions ^{}$", name))?;
        // Debug builds list `N:\t<decl>;` entries, stripped ones `0x.. name`.
        functions_from_listing(&capture.text)
            .into_iter()
            .chain(function_decls_from_listing(&capture.text))
            .find(|f| f.name.as_deref() == Some(name))
            .ok_or_else(|| MiError::NotFound(format!("no function named '{}'", name)))
    }

    pub fn ptype(&mut self, type_name: &str) -> Result<TypeInfo> {
        let type_name = require(type_name, "empty type name")?;
        let capture = self.capture_console(&format!("ptype {}", type_name))?;
        Ok(type_info_from_output(type_name, capture.text))
    }

    /// Like [`ptype`](Self::ptype) but one level deep: typedefs are not expanded.
    pub fn whatis(&mut self, expr: &str) -> Result<TypeInfo> {
        let expr = require(expr, "empty expression")?;
        let capture = self.capture_console(&format!("whatis {}", expr))?;
        Ok(type_info_from_output(expr, capture.text))
    }

    pub fn list_types(&mut self, regexp: Option<&str>) -> Result<Vec<TypeInfo>> {
        let capture = self.capture_console(&listing_command("info types", regexp))?;
        Ok(types_from_listing(&capture.text))
    }

    pub fn list_variables(&mut self, regexp: Option<&str>) -> Result<Vec<Variable>> {
        let capture = self.capture_console(&listing_command("info variables", regexp))?;
        Ok(variables_from_listing(&capture.text))
    }

    /// Source files gdb has read symbols for, in listing order without duplicates.
    pub fn list_source_files(&mut self) -> Result<Vec<String>> {
        let capture = self.capture_console("info sources")?;
        Ok(source_files_from_listing(&capture.text))
    }

    /// Line table of `file`: one entry per `{pc, line}` pair, in gdb's order.
    pub fn list_lines(&mut self, file: &str) -> Result<Vec<LineInfo>> {
        let file = require(file, "empty file name")?;
        let resp = self.exec_checked(&format!("-symbol-list-lines {}", file))?;
        Ok(parse_line_table(&resp.result)
            .into_iter()
            .map(|(pc, line)| LineInfo {
                file: file.to_string(),
                line,
                start_address: Some(pc),
                end_address: None,
            })
            .collect())
    }
}
