use super::*;
use crate::resolve::resolve;
use xdr_ast::parser::Parser;
use xdr_ast::symtab::SymbolTable;

fn resolved(src: &str) -> IdlFile {
    let idl = Parser::parse_str(src).unwrap();
    let symtab = SymbolTable::build(&idl).unwrap();
    resolve(&idl, &symtab).unwrap()
}

#[test]
fn linkedlist_struct_is_directly_recursive() {
    let idl = resolved("linkedlist struct node { uint32 v; node *next; };");
    assert!(is_directly_recursive("node", &idl));
}

#[test]
fn non_recursive_struct_is_not_flagged() {
    let idl = resolved("struct leaf { uint32 v; };");
    assert!(!is_directly_recursive("leaf", &idl));
}

#[test]
fn struct_naming_another_struct_is_not_recursive() {
    let idl = resolved(
        "struct inner { uint32 v; };
         struct outer { inner i; };",
    );
    assert!(!is_directly_recursive("outer", &idl));
}

#[test]
fn union_case_self_reference_is_recursive() {
    let idl = resolved(
        "union expr switch (int32 tag) {
            case 0: int32 literal;
            case 1: expr *nested;
        };",
    );
    assert!(is_directly_recursive("expr", &idl));
}

#[test]
fn unknown_name_is_not_recursive() {
    let idl = resolved("struct leaf { uint32 v; };");
    assert!(!is_directly_recursive("nope", &idl));
}
