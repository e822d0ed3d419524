use super::*;
use xdr_ast::parser::Parser;
use xdr_ast::symtab::SymbolTable;

fn resolved(src: &str) -> IdlFile {
    let idl = Parser::parse_str(src).unwrap();
    let symtab = SymbolTable::build(&idl).unwrap();
    resolve::resolve(&idl, &symtab).unwrap()
}

#[test]
fn dependency_order_puts_members_before_their_containers() {
    let idl = resolved(
        "struct inner { uint32 v; };
         struct outer { inner i; };",
    );
    let order = dependency_order(&idl).unwrap();
    let pos = |n: &str| order.iter().position(|a| a.name == n).unwrap();
    assert!(pos("inner") < pos("outer"));
}

#[test]
fn self_reference_does_not_block_emission() {
    let idl = resolved("linkedlist struct node { uint32 v; node *next; };");
    let order = dependency_order(&idl).unwrap();
    assert_eq!(order.len(), 1);
    assert_eq!(order[0].name, "node");
}

#[test]
fn true_cycle_is_reported() {
    let idl = resolved(
        "struct a { b *next; };
         struct b { a *next; };",
    );
    let err = dependency_order(&idl).unwrap_err();
    assert_eq!(err.unemitted.len(), 2);
}

#[test]
fn rewrite_enum_members_turns_enum_refs_into_uint32() {
    let mut idl = resolved(
        "enum color { RED = 0, BLUE = 1 };
         struct widget { color c; };",
    );
    assert!(idl.structs[0].members[0].ty.is_enumeration());
    rewrite_enum_members(&mut idl);
    let ty = &idl.structs[0].members[0].ty;
    assert_eq!(ty.name, "uint32");
    assert!(ty.builtin);
    assert!(!ty.is_enumeration());
}

#[test]
fn member_decl_lines_cover_every_shape() {
    let scalar = Member {
        ty: TypeDescriptor::scalar("uint32", true),
        name: "n".into(),
    };
    assert_eq!(member_decl_lines(&scalar), vec!["uint32_t n;"]);

    let mut fixed_opaque = scalar.clone();
    fixed_opaque.name = "tag".into();
    fixed_opaque.ty.flags |= TypeFlags::OPAQUE;
    fixed_opaque.ty.array = true;
    fixed_opaque.ty.array_size = Some("16".into());
    assert_eq!(member_decl_lines(&fixed_opaque), vec!["uint8_t tag[16];"]);

    let mut zerocopy = scalar.clone();
    zerocopy.name = "buf".into();
    zerocopy.ty.flags |= TypeFlags::OPAQUE | TypeFlags::ZEROCOPY;
    assert_eq!(member_decl_lines(&zerocopy), vec!["xdr_iovec buf;"]);

    let mut var_opaque = scalar.clone();
    var_opaque.name = "blob".into();
    var_opaque.ty.flags |= TypeFlags::OPAQUE;
    assert_eq!(
        member_decl_lines(&var_opaque),
        vec!["uint32_t blob_len;".to_string(), "uint8_t *blob;".to_string()]
    );

    let string_member = Member {
        ty: TypeDescriptor::scalar("xdr_string", true),
        name: "label".into(),
    };
    assert_eq!(
        member_decl_lines(&string_member),
        vec!["uint32_t label_len;".to_string(), "char *label;".to_string()]
    );

    let mut vector_member = scalar.clone();
    vector_member.name = "items".into();
    vector_member.ty.vector = true;
    assert_eq!(
        member_decl_lines(&vector_member),
        vec!["uint32_t num_items;".to_string(), "uint32_t *items;".to_string()]
    );

    let mut optional_member = scalar.clone();
    optional_member.name = "next".into();
    optional_member.ty.flags |= TypeFlags::OPTIONAL;
    assert_eq!(member_decl_lines(&optional_member), vec!["uint32_t *next;"]);

    let mut array_member = scalar.clone();
    array_member.name = "fixed".into();
    array_member.ty.array = true;
    array_member.ty.array_size = Some("4".into());
    assert_eq!(member_decl_lines(&array_member), vec!["uint32_t fixed[4];"]);
}
