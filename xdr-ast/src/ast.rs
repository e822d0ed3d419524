//! The raw abstract syntax tree produced by the parser.
//!
//! Every owned string (identifiers, value expressions, case labels) lives
//! directly in these nodes. There is no separate arena: a batch, single-pass
//! tool that parses once and exits does not need one, and `String`/`Vec`
//! already give the "allocate once, free at shutdown" lifecycle the spec
//! describes for the C tool's bump arena.

use bitflags::bitflags;

bitflags! {
    /// The five independent boolean facets a type reference can carry.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct TypeFlags: u8 {
        const ENUMERATION = 1 << 0;
        const LINKEDLIST  = 1 << 1;
        const OPAQUE      = 1 << 2;
        const ZEROCOPY    = 1 << 3;
        const OPTIONAL    = 1 << 4;
    }
}

/// One resolved-or-unresolved type reference: a member's type, a union
/// pivot's type, a typedef's target, or a function's call/reply type.
#[derive(Clone, Debug, PartialEq)]
pub struct TypeDescriptor {
    pub name: String,
    pub builtin: bool,
    pub flags: TypeFlags,
    pub vector: bool,
    pub vector_bound: Option<String>,
    pub array: bool,
    pub array_size: Option<String>,
}

impl TypeDescriptor {
    pub fn scalar(name: impl Into<String>, builtin: bool) -> Self {
        Self {
            name: name.into(),
            builtin,
            flags: TypeFlags::empty(),
            vector: false,
            vector_bound: None,
            array: false,
            array_size: None,
        }
    }

    pub fn is_enumeration(&self) -> bool {
        self.flags.contains(TypeFlags::ENUMERATION)
    }

    pub fn is_linkedlist(&self) -> bool {
        self.flags.contains(TypeFlags::LINKEDLIST)
    }

    pub fn is_opaque(&self) -> bool {
        self.flags.contains(TypeFlags::OPAQUE)
    }

    pub fn is_zerocopy(&self) -> bool {
        self.flags.contains(TypeFlags::ZEROCOPY)
    }

    pub fn is_optional(&self) -> bool {
        self.flags.contains(TypeFlags::OPTIONAL)
    }
}

/// A builtin type name the lexer/parser can produce directly, either by
/// desugaring a keyword (`string`, `opaque`, `unsigned hyper`, ...) or by
/// recognizing a reserved identifier (`xdr_iovec`).
pub const BUILTINS: &[&str] = &[
    "void",
    "bool",
    "int32",
    "uint32",
    "int64",
    "uint64",
    "float32",
    "float64",
    "xdr_string",
    "xdr_opaque",
    "xdr_iovec",
];

pub fn is_builtin_name(name: &str) -> bool {
    BUILTINS.contains(&name)
}

#[derive(Clone, Debug, PartialEq)]
pub struct Member {
    pub ty: TypeDescriptor,
    pub name: String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct StructDecl {
    pub name: String,
    pub linkedlist: bool,
    pub members: Vec<Member>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct UnionCase {
    pub label: String,
    pub body: Option<Member>,
    pub voided: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct UnionDecl {
    pub name: String,
    pub opaque: bool,
    pub pivot: Member,
    pub cases: Vec<UnionCase>,
    pub default_case: Option<UnionCase>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct EnumEntry {
    pub name: String,
    pub value: String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct EnumDecl {
    pub name: String,
    pub entries: Vec<EnumEntry>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct TypedefDecl {
    pub name: String,
    pub ty: TypeDescriptor,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ConstDecl {
    pub name: String,
    pub value: String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Function {
    pub id: String,
    pub name: String,
    pub call_type: TypeDescriptor,
    pub reply_type: TypeDescriptor,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Version {
    pub id: String,
    pub name: String,
    pub functions: Vec<Function>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Program {
    pub id: String,
    pub name: String,
    pub versions: Vec<Version>,
}

/// The complete parse of one IDL file: the five global ordered sequences,
/// plus the optional program tree.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct IdlFile {
    pub consts: Vec<ConstDecl>,
    pub enums: Vec<EnumDecl>,
    pub typedefs: Vec<TypedefDecl>,
    pub structs: Vec<StructDecl>,
    pub unions: Vec<UnionDecl>,
    pub programs: Vec<Program>,
}

impl IdlFile {
    pub fn find_struct(&self, name: &str) -> Option<&StructDecl> {
        self.structs.iter().find(|s| s.name == name)
    }

    pub fn find_union(&self, name: &str) -> Option<&UnionDecl> {
        self.unions.iter().find(|u| u.name == name)
    }

    pub fn find_enum(&self, name: &str) -> Option<&EnumDecl> {
        self.enums.iter().find(|e| e.name == name)
    }

    pub fn find_typedef(&self, name: &str) -> Option<&TypedefDecl> {
        self.typedefs.iter().find(|t| t.name == name)
    }
}
