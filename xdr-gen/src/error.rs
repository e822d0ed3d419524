//! The generator's own failure modes (spec-distinct from the runtime errors
//! the *emitted* C code can return, which live only as doc comments in
//! [`crate::runtime`]).

use std::fmt;
use xdr_ast::{ParseError, SymbolError};

/// Every way the compiler itself can fail, one variant per kind in the
/// failure-modes table: Io, Lex/Syntax (folded together, since the lexer
/// and parser share one line-tagged error shape), Symbol, Reference, Cycle.
#[derive(Debug)]
pub enum CompileError {
    Io(std::io::Error),
    Syntax(ParseError),
    Symbol(SymbolError),
    Reference(ReferenceError),
    Cycle(CycleError),
}

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompileError::Io(e) => write!(f, "{e}"),
            CompileError::Syntax(e) => write!(f, "{e}"),
            CompileError::Symbol(e) => write!(f, "{e}"),
            CompileError::Reference(e) => write!(f, "{e}"),
            CompileError::Cycle(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for CompileError {}

impl From<std::io::Error> for CompileError {
    fn from(e: std::io::Error) -> Self {
        CompileError::Io(e)
    }
}

impl From<ParseError> for CompileError {
    fn from(e: ParseError) -> Self {
        CompileError::Syntax(e)
    }
}

impl From<SymbolError> for CompileError {
    fn from(e: SymbolError) -> Self {
        CompileError::Symbol(e)
    }
}

impl From<ReferenceError> for CompileError {
    fn from(e: ReferenceError) -> Self {
        CompileError::Reference(e)
    }
}

impl From<CycleError> for CompileError {
    fn from(e: CycleError) -> Self {
        CompileError::Cycle(e)
    }
}

/// An identifier used as a type that does not resolve to any symbol-table
/// entry. Carries the referencing declaration's name so the diagnostic can
/// show the offending path, per spec.md §4.3 "prints the offending
/// identifier path".
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReferenceError {
    pub referrer: String,
    pub unknown: String,
}

impl ReferenceError {
    pub fn new(referrer: impl Into<String>, unknown: impl Into<String>) -> Self {
        let referrer = referrer.into();
        let unknown = unknown.into();
        tracing::debug!(%referrer, %unknown, "unresolved reference");
        Self { referrer, unknown }
    }
}

impl fmt::Display for ReferenceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "'{}' references unknown type '{}'", self.referrer, self.unknown)
    }
}

impl std::error::Error for ReferenceError {}

/// A real, non-self dependency cycle found by the header emitter's
/// fixpoint loop (spec.md §4.5: "if the last pass marked none and
/// unemitted remain, there is a real cycle"). The source tool spins
/// forever here; this is the diagnosed replacement spec.md §9 asks for.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CycleError {
    pub unemitted: Vec<String>,
}

impl CycleError {
    pub fn new(unemitted: Vec<String>) -> Self {
        tracing::debug!(?unemitted, "dependency cycle stalled emission");
        Self { unemitted }
    }
}

impl fmt::Display for CycleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "dependency cycle among non-self-referential aggregates: {}",
            self.unemitted.join(", ")
        )
    }
}

impl std::error::Error for CycleError {}
