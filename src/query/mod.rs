pub mod catchpoint;
pub mod data;
pub(crate) mod extract;
pub mod lex;
pub mod records;
pub mod source;
pub mod symbols;

pub use catchpoint::{catch_command, catchpoint_from_capture};
pub use data::{write_memory_command, MAX_WRITE_BYTES};
pub use records::{
    CatchKind, Catchpoint, Function, LineInfo, SourceLine, Symbol, SymbolKind, TypeInfo,
    TypeKind, Variable,
};
pub use source::{annotate_breakpoints, source_list_command};
