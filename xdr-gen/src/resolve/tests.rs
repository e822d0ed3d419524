use super::*;
use xdr_ast::parser::Parser;

fn resolved(src: &str) -> IdlFile {
    let idl = Parser::parse_str(src).unwrap();
    let symtab = SymbolTable::build(&idl).unwrap();
    resolve(&idl, &symtab).unwrap()
}

#[test]
fn struct_member_referencing_enum_is_tagged() {
    let idl = resolved(
        "enum color { RED = 0, BLUE = 1 };
         struct widget { color c; };",
    );
    assert!(idl.structs[0].members[0].ty.is_enumeration());
}

#[test]
fn struct_member_referencing_linkedlist_struct_is_tagged() {
    let idl = resolved(
        "linkedlist struct node { uint32 v; node *next; };
         struct holder { node *head; };",
    );
    assert!(idl.structs[1].members[0].ty.is_linkedlist());
    // self-reference inside the linked-list struct itself is tagged too.
    assert!(idl.structs[0].members[1].ty.is_linkedlist());
}

#[test]
fn typedef_chain_collapses_to_terminal_type() {
    let idl = resolved(
        "typedef uint32 inner;
         typedef inner outer;
         struct s { outer v; };",
    );
    assert_eq!(idl.typedefs[1].ty.name, "uint32");
    assert_eq!(idl.structs[0].members[0].ty.name, "uint32");
    assert!(idl.structs[0].members[0].ty.builtin);
}

#[test]
fn typedef_of_fixed_array_carries_its_shape_to_a_bare_use_site() {
    let idl = resolved("typedef opaque bytes16[16]; struct s { bytes16 tag; };");
    let m = &idl.structs[0].members[0];
    assert!(m.ty.array);
    assert_eq!(m.ty.array_size.as_deref(), Some("16"));
    assert!(m.ty.is_opaque());
}

#[test]
fn use_site_vector_shape_overrides_typedef_scalar_shape() {
    let idl = resolved("typedef uint32 id_t; struct s { id_t ids<8>; };");
    let m = &idl.structs[0].members[0];
    assert!(m.ty.vector);
    assert_eq!(m.ty.vector_bound.as_deref(), Some("8"));
}

#[test]
fn unknown_type_reference_is_an_error() {
    let idl = Parser::parse_str("struct s { nope v; };").unwrap();
    let symtab = SymbolTable::build(&idl).unwrap();
    let err = resolve(&idl, &symtab).unwrap_err();
    assert_eq!(err.unknown, "nope");
}

#[test]
fn union_pivot_must_be_integral_or_enum() {
    let idl = Parser::parse_str(
        "struct payload { uint32 v; };
         union u switch (payload p) { default: void; };",
    )
    .unwrap();
    let symtab = SymbolTable::build(&idl).unwrap();
    assert!(resolve(&idl, &symtab).is_err());
}

#[test]
fn union_pivot_rejects_a_non_integer_builtin() {
    let idl = Parser::parse_str("union u switch (xdr_string s) { default: void; };").unwrap();
    let symtab = SymbolTable::build(&idl).unwrap();
    assert!(resolve(&idl, &symtab).is_err());
}

#[test]
fn union_pivot_accepts_every_integer_builtin() {
    for decl in ["bool b", "int32 i", "uint32 u", "int64 l", "uint64 ul"] {
        let src = format!("union u switch ({decl}) {{ default: void; }};");
        let idl = Parser::parse_str(&src).unwrap();
        let symtab = SymbolTable::build(&idl).unwrap();
        assert!(resolve(&idl, &symtab).is_ok(), "{decl} should be accepted");
    }
}

#[test]
fn union_pivot_enum_is_accepted_and_tagged() {
    let idl = resolved(
        "enum color { RED = 0, BLUE = 1 };
         union u switch (color c) { case 0: void; };",
    );
    assert!(idl.unions[0].pivot.ty.is_enumeration());
}

#[test]
fn cyclic_typedef_chain_is_an_error() {
    let idl = Parser::parse_str("typedef b a; typedef a b;").unwrap();
    let symtab = SymbolTable::build(&idl).unwrap();
    assert!(resolve(&idl, &symtab).is_err());
}
