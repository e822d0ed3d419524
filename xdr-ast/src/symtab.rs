//! Identifier to declaration mapping, with duplicate detection.

#[cfg(test)]
mod tests;

use crate::ast::IdlFile;
use std::collections::HashMap;
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SymbolKind {
    Const,
    Enum,
    Typedef,
    Struct,
    Union,
}

/// A non-owning reference into one of `IdlFile`'s ordered vectors. The AST
/// itself owns every string and node; the symbol table only ever stores an
/// index back into it, the same role the teacher's `TypeIndex` plays for
/// out-of-line type records.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SymbolRef {
    pub kind: SymbolKind,
    pub index: usize,
}

pub struct Symbol {
    pub node: SymbolRef,
}

/// Maps every constant, enum, typedef, struct and union name to its
/// declaration. Lookup is a single `HashMap` probe; insertion of a name
/// that is already present is a fatal error.
#[derive(Default)]
pub struct SymbolTable {
    symbols: HashMap<String, Symbol>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a symbol table from a parsed file, failing on the first
    /// duplicate identifier encountered (constants, then enums, typedefs,
    /// structs, unions — the declaration order within each list, and the
    /// list order itself, only matters for which duplicate gets reported
    /// first).
    pub fn build(idl: &IdlFile) -> Result<Self, SymbolError> {
        let mut table = Self::new();
        for (i, c) in idl.consts.iter().enumerate() {
            table.insert(&c.name, SymbolKind::Const, i)?;
        }
        for (i, e) in idl.enums.iter().enumerate() {
            table.insert(&e.name, SymbolKind::Enum, i)?;
        }
        for (i, t) in idl.typedefs.iter().enumerate() {
            table.insert(&t.name, SymbolKind::Typedef, i)?;
        }
        for (i, s) in idl.structs.iter().enumerate() {
            table.insert(&s.name, SymbolKind::Struct, i)?;
        }
        for (i, u) in idl.unions.iter().enumerate() {
            table.insert(&u.name, SymbolKind::Union, i)?;
        }
        Ok(table)
    }

    pub fn insert(&mut self, name: &str, kind: SymbolKind, index: usize) -> Result<(), SymbolError> {
        if self.symbols.contains_key(name) {
            return Err(SymbolError::Duplicate(name.to_string()));
        }
        self.symbols.insert(name.to_string(), Symbol { node: SymbolRef { kind, index } });
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Symbol> {
        self.symbols.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.symbols.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SymbolError {
    Duplicate(String),
}

impl fmt::Display for SymbolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SymbolError::Duplicate(name) => write!(f, "duplicate symbol '{name}'"),
        }
    }
}

impl std::error::Error for SymbolError {}
