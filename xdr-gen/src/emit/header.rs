//! Header emission (spec.md §4.5).

use std::fmt::Write as _;

use xdr_ast::ast::{IdlFile, StructDecl, UnionDecl};

use super::{member_decl_lines, AggKind, AggRef};
use crate::emit::rpc;
use crate::runtime;

/// Emits the full header: include guard, embedded runtime declarations,
/// constants, enums, aggregates in dependency order, then wrapper
/// prototypes and (when requested) RPC program prototypes.
pub fn emit(idl: &IdlFile, order: &[AggRef], guard: &str, emit_rpc: bool) -> String {
    let mut out = String::new();

    writeln!(out, "#ifndef {guard}").unwrap();
    writeln!(out, "#define {guard}").unwrap();
    out.push('\n');
    out.push_str(runtime::RUNTIME_HEADER);
    out.push('\n');

    if !idl.consts.is_empty() {
        for c in &idl.consts {
            writeln!(out, "#define {} {}", c.name, c.value).unwrap();
        }
        out.push('\n');
    }

    for e in &idl.enums {
        writeln!(out, "typedef enum {{").unwrap();
        for (i, entry) in e.entries.iter().enumerate() {
            let comma = if i + 1 == e.entries.len() { "" } else { "," };
            writeln!(out, "    {} = {}{}", entry.name, entry.value, comma).unwrap();
        }
        writeln!(out, "}} {};", e.name).unwrap();
        out.push('\n');
    }

    for agg in order {
        match agg.kind {
            AggKind::Struct => emit_struct_decl(&mut out, idl.find_struct(&agg.name).unwrap()),
            AggKind::Union => emit_union_decl(&mut out, idl.find_union(&agg.name).unwrap()),
        }
    }

    for agg in order {
        let linkedlist = agg.kind == AggKind::Struct
            && idl.find_struct(&agg.name).map(|s| s.linkedlist).unwrap_or(false);
        emit_wrapper_prototypes(&mut out, &agg.name, linkedlist);
    }

    if emit_rpc {
        for p in &idl.programs {
            rpc::emit_program_prototypes(&mut out, p);
        }
    }

    writeln!(out, "#endif /* {guard} */").unwrap();
    out
}

fn emit_struct_decl(out: &mut String, s: &StructDecl) {
    writeln!(out, "typedef struct {} {{", s.name).unwrap();
    for m in &s.members {
        for line in member_decl_lines(m) {
            writeln!(out, "    {line}").unwrap();
        }
    }
    writeln!(out, "}} {};", s.name).unwrap();
    out.push('\n');
}

fn emit_union_decl(out: &mut String, u: &UnionDecl) {
    writeln!(out, "typedef struct {} {{", u.name).unwrap();
    for line in member_decl_lines(&u.pivot) {
        writeln!(out, "    {line}").unwrap();
    }
    writeln!(out, "    union {{").unwrap();
    for c in u.cases.iter().chain(u.default_case.iter()) {
        if let Some(body) = &c.body {
            for line in member_decl_lines(body) {
                writeln!(out, "        {line}").unwrap();
            }
        }
    }
    writeln!(out, "    }} u;").unwrap();
    writeln!(out, "}} {};", u.name).unwrap();
    out.push('\n');
}

/// `linkedlist` structs decode through a `{name} **out` head-pointer
/// out-param rather than the single-pointer signature every other
/// aggregate uses; see `source::emit_wrapper_bodies`.
fn emit_wrapper_prototypes(out: &mut String, name: &str, linkedlist: bool) {
    let ptr = if linkedlist { format!("{name} **out") } else { format!("{name} *out") };
    writeln!(out, "int marshall_{name}(xdr_write_cursor *cur, const {name} *v);").unwrap();
    writeln!(out, "int32_t marshall_length_{name}(const {name} *v);").unwrap();
    writeln!(out, "int unmarshall_{name}(xdr_read_cursor *cur, xdr_arena *arena, {ptr});").unwrap();
    writeln!(out, "int unmarshall_{name}_contig(const uint8_t *buf, uint32_t len, {ptr});").unwrap();
    writeln!(out, "void dump_{name}(const {name} *v, int indent);").unwrap();
    out.push('\n');
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emit::dependency_order;
    use crate::resolve::resolve;
    use xdr_ast::parser::Parser;
    use xdr_ast::symtab::SymbolTable;

    fn resolved(src: &str) -> IdlFile {
        let idl = Parser::parse_str(src).unwrap();
        let symtab = SymbolTable::build(&idl).unwrap();
        resolve(&idl, &symtab).unwrap()
    }

    #[test]
    fn emits_include_guard_and_runtime() {
        let idl = resolved("struct s { uint32 v; };");
        let order = dependency_order(&idl).unwrap();
        let text = emit(&idl, &order, "WIDGET_H", false);
        assert!(text.starts_with("#ifndef WIDGET_H\n#define WIDGET_H\n"));
        assert!(text.contains("xdr_write_cursor"));
        assert!(text.trim_end().ends_with("#endif /* WIDGET_H */"));
    }

    #[test]
    fn emits_constant_as_define() {
        let idl = resolved("const MAXLEN = 256;\nstruct s { uint32 v; };");
        let order = dependency_order(&idl).unwrap();
        let text = emit(&idl, &order, "G", false);
        assert!(text.contains("#define MAXLEN 256"));
    }

    #[test]
    fn emits_struct_fields_and_wrapper_prototypes() {
        let idl = resolved("struct point { uint32 x; uint32 y; };");
        let order = dependency_order(&idl).unwrap();
        let text = emit(&idl, &order, "G", false);
        assert!(text.contains("typedef struct point {"));
        assert!(text.contains("uint32_t x;"));
        assert!(text.contains("int marshall_point(xdr_write_cursor *cur, const point *v);"));
        assert!(text.contains("void dump_point(const point *v, int indent);"));
    }

    #[test]
    fn linkedlist_struct_gets_a_double_pointer_unmarshall_prototype() {
        let idl = resolved("linkedlist struct node { uint32 v; node *next; };");
        let order = dependency_order(&idl).unwrap();
        let text = emit(&idl, &order, "G", false);
        assert!(text.contains("int unmarshall_node(xdr_read_cursor *cur, xdr_arena *arena, node **out);"));
        assert!(text.contains("int unmarshall_node_contig(const uint8_t *buf, uint32_t len, node **out);"));
    }

    #[test]
    fn emits_union_as_tagged_struct() {
        let idl = resolved(
            "union result switch (int32 status) {
                case 0: uint32 value;
                default: void;
            };",
        );
        let order = dependency_order(&idl).unwrap();
        let text = emit(&idl, &order, "G", false);
        assert!(text.contains("typedef struct result {"));
        assert!(text.contains("int32_t status;"));
        assert!(text.contains("uint32_t value;"));
        assert!(text.contains("} u;"));
    }
}
