use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CatchKind {
    #[default]
    Throw,
    Catch,
    Exec,
    Fork,
    Vfork,
    Load,
    Unload,
    Syscall,
    Signal,
    Assert,
}

impl CatchKind {
    pub const ALL: [CatchKind; 10] = [
        CatchKind::Throw,
        CatchKind::Catch,
        CatchKind::Exec,
        CatchKind::Fork,
        CatchKind::Vfork,
        CatchKind::Load,
        CatchKind::Unload,
        CatchKind::Syscall,
        CatchKind::Signal,
        CatchKind::Assert,
    ];

    /// Event word used on the `catch` command line.
    pub fn event(self) -> &'static str {
        match self {
            CatchKind::Throw => "throw",
            CatchKind::Catch => "catch",
            CatchKind::Exec => "exec",
            CatchKind::Fork => "fork",
            CatchKind::Vfork => "vfork",
            CatchKind::Load => "load",
            CatchKind::Unload => "unload",
            CatchKind::Syscall => "syscall",
            CatchKind::Signal => "signal",
            CatchKind::Assert => "assert",
        }
    }

    /// Whether the command accepts a trailing regexp / syscall / signal argument.
    pub fn takes_filter(self) -> bool {
        matches!(
            self,
            CatchKind::Load | CatchKind::Unload | CatchKind::Syscall | CatchKind::Signal
        )
    }
}

impl fmt::Display for CatchKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.event())
    }
}

impl FromStr for CatchKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CatchKind::ALL
            .into_iter()
            .find(|k| k.event() == s)
            .ok_or_else(|| format!("unknown catch event '{}'", s))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catchpoint {
    pub number: u32,
    /// Taken from the request that created the catchpoint.
    pub kind: CatchKind,
    pub enabled: bool,
    pub condition: Option<String>,
    pub hit_count: u32,
    /// Filter passed on the command line (library regexp, syscall or signal name).
    pub event: Option<String>,
    pub temporary: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolKind {
    Function,
    Variable,
    Static,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Symbol {
    pub name: String,
    pub kind: Option<SymbolKind>,
    pub address: Option<u64>,
    pub file: Option<String>,
    pub line: Option<u32>,
    pub linkage_name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineInfo {
    pub file: String,
    pub line: u32,
    pub start_address: Option<u64>,
    pub end_address: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Function {
    pub name: Option<String>,
    pub file: Option<String>,
    pub line: Option<u32>,
    pub address: Option<u64>,
    /// Declaration text after the address, e.g. `main(int, char**)`.
    pub signature: Option<String>,
    pub is_static: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TypeKind {
    Struct,
    Union,
    Enum,
    Class,
    Typedef,
    #[default]
    Other,
}

impl TypeKind {
    pub fn as_str(self) -> &'static str {
        match self {
            TypeKind::Struct => "struct",
            TypeKind::Union => "union",
            TypeKind::Enum => "enum",
            TypeKind::Class => "class",
            TypeKind::Typedef => "typedef",
            TypeKind::Other => "other",
        }
    }
}

impl fmt::Display for TypeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TypeInfo {
    pub name: String,
    pub kind: TypeKind,
    /// Full definition text as printed by gdb.
    pub members: String,
    pub file: Option<String>,
    pub line: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Variable {
    pub name: String,
    pub type_name: String,
    pub file: Option<String>,
    pub line: Option<u32>,
    pub is_static: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceLine {
    pub line: u32,
    pub text: Option<String>,
    pub is_current: bool,
    pub has_breakpoint: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_records_are_zero_valued() {
        let f = Function::default();
        assert!(f.name.is_none() && f.address.is_none() && !f.is_static);
        let c = Catchpoint::default();
        assert_eq!(c.number, 0);
        assert_eq!(c.kind, CatchKind::Throw);
        assert!(!c.enabled && !c.temporary);
        let s = SourceLine::default();
        assert_eq!(s.line, 0);
        assert!(s.text.is_none());
    }

    #[test]
    fn catch_kind_round_trips_through_event_word() {
        for kind in CatchKind::ALL {
            assert_eq!(kind.event().parse::<CatchKind>(), Ok(kind));
        }
        assert!("watch".parse::<CatchKind>().is_err());
        assert!(CatchKind::Syscall.takes_filter());
        assert!(!CatchKind::Assert.takes_filter());
    }
}
