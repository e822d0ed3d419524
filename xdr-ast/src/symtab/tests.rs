use super::*;
use crate::ast::*;

fn simple_file() -> IdlFile {
    IdlFile {
        consts: vec![ConstDecl {
            name: "MAXLEN".into(),
            value: "256".into(),
        }],
        enums: vec![EnumDecl {
            name: "color".into(),
            entries: vec![EnumEntry {
                name: "RED".into(),
                value: "0".into(),
            }],
        }],
        ..Default::default()
    }
}

#[test]
fn build_indexes_every_name() {
    let idl = simple_file();
    let table = SymbolTable::build(&idl).unwrap();
    assert_eq!(table.len(), 2);
    assert!(table.contains("MAXLEN"));
    assert!(table.contains("color"));
    assert!(!table.contains("nope"));
}

#[test]
fn duplicate_name_across_lists_is_fatal() {
    let mut idl = simple_file();
    idl.typedefs.push(TypedefDecl {
        name: "color".into(),
        ty: TypeDescriptor::scalar("uint32", true),
    });
    let err = SymbolTable::build(&idl).unwrap_err();
    assert_eq!(err, SymbolError::Duplicate("color".into()));
}
