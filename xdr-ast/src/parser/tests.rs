use super::*;

#[test]
fn parses_a_const_decl() {
    let idl = Parser::parse_str("const MAXLEN = 256;").unwrap();
    assert_eq!(idl.consts.len(), 1);
    assert_eq!(idl.consts[0].name, "MAXLEN");
    assert_eq!(idl.consts[0].value, "256");
}

#[test]
fn parses_an_enum_decl() {
    let idl = Parser::parse_str("enum color { RED = 0, GREEN = 1, BLUE = 2 };").unwrap();
    let e = &idl.enums[0];
    assert_eq!(e.name, "color");
    assert_eq!(e.entries.len(), 3);
    assert_eq!(e.entries[1].name, "GREEN");
    assert_eq!(e.entries[1].value, "1");
}

#[test]
fn parses_a_struct_with_every_declarator_shape() {
    let idl = Parser::parse_str(
        "struct widget {
            uint32 id;
            opaque tag[16];
            xdr_string name<64>;
            widget *next;
        };",
    )
    .unwrap();
    let s = &idl.structs[0];
    assert_eq!(s.name, "widget");
    assert!(!s.linkedlist);
    assert_eq!(s.members.len(), 4);

    assert_eq!(s.members[0].name, "id");
    assert_eq!(s.members[0].ty.name, "uint32");

    assert!(s.members[1].ty.array);
    assert_eq!(s.members[1].ty.array_size.as_deref(), Some("16"));
    assert!(s.members[1].ty.is_opaque());

    assert!(s.members[2].ty.vector);
    assert_eq!(s.members[2].ty.vector_bound.as_deref(), Some("64"));

    assert!(s.members[3].ty.is_optional());
    assert_eq!(s.members[3].ty.name, "widget");
    assert!(!s.members[3].ty.builtin);
}

#[test]
fn parses_an_unbounded_vector() {
    let idl = Parser::parse_str("struct blob { opaque data<>; };").unwrap();
    let m = &idl.structs[0].members[0];
    assert!(m.ty.vector);
    assert_eq!(m.ty.vector_bound, None);
}

#[test]
fn linkedlist_struct_sets_the_flag() {
    let idl = Parser::parse_str("linkedlist struct node { uint32 value; node *next; };").unwrap();
    assert!(idl.structs[0].linkedlist);
}

#[test]
fn parses_a_discriminated_union() {
    let idl = Parser::parse_str(
        "union result switch (int32 status) {
            case 0: uint32 value;
            default: void;
        };",
    )
    .unwrap();
    let u = &idl.unions[0];
    assert_eq!(u.name, "result");
    assert!(!u.opaque);
    assert_eq!(u.pivot.name, "status");
    assert_eq!(u.cases.len(), 1);
    assert_eq!(u.cases[0].label, "0");
    assert!(!u.cases[0].voided);
    assert!(u.default_case.as_ref().unwrap().voided);
}

#[test]
fn opaque_union_sets_the_flag() {
    let idl = Parser::parse_str(
        "opaque union blob switch (uint32 kind) {
            case 1: opaque small[4];
        };",
    )
    .unwrap();
    assert!(idl.unions[0].opaque);
}

#[test]
fn parses_a_typedef() {
    let idl = Parser::parse_str("typedef opaque bytes16[16];").unwrap();
    let t = &idl.typedefs[0];
    assert_eq!(t.name, "bytes16");
    assert!(t.ty.array);
    assert_eq!(t.ty.array_size.as_deref(), Some("16"));
}

#[test]
fn zerocopy_is_only_valid_on_opaque() {
    let err = Parser::parse_str("struct s { zerocopy uint32 n; };").unwrap_err();
    assert!(err.message.contains("zerocopy"));
}

#[test]
fn zerocopy_opaque_field_parses() {
    let idl = Parser::parse_str("struct s { zerocopy opaque buf<4096>; };").unwrap();
    assert!(idl.structs[0].members[0].ty.is_zerocopy());
    assert!(idl.structs[0].members[0].ty.is_opaque());
}

#[test]
fn parses_a_program_with_versions_and_functions() {
    let idl = Parser::parse_str(
        "program FILESVC {
            version FILESVC_V1 {
                void READ(uint32) = 1;
                uint32 WRITE(xdr_opaque) = 2;
            } = 1;
        } = 100000;",
    )
    .unwrap();
    let p = &idl.programs[0];
    assert_eq!(p.name, "FILESVC");
    assert_eq!(p.id, "100000");
    assert_eq!(p.versions.len(), 1);
    let v = &p.versions[0];
    assert_eq!(v.name, "FILESVC_V1");
    assert_eq!(v.id, "1");
    assert_eq!(v.functions.len(), 2);
    assert_eq!(v.functions[0].name, "READ");
    assert_eq!(v.functions[0].reply_type.name, "void");
    assert_eq!(v.functions[1].id, "2");
}

#[test]
fn unsigned_hyper_desugars_to_uint64() {
    let idl = Parser::parse_str("typedef unsigned hyper big;").unwrap();
    assert_eq!(idl.typedefs[0].ty.name, "uint64");
}

#[test]
fn unexpected_top_level_token_is_an_error() {
    let err = Parser::parse_str("123").unwrap_err();
    assert_eq!(err.line, 1);
}

#[test]
fn missing_semicolon_is_an_error() {
    let err = Parser::parse_str("const A = 1").unwrap_err();
    assert!(err.message.contains(';') || err.message.to_lowercase().contains("semi"));
}
