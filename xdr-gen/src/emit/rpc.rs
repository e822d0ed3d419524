//! RPC program emission (spec.md §4.7), gated behind the CLI's optional
//! `--rpc` flag.

use std::fmt::Write as _;

use xdr_ast::ast::{Program, TypeDescriptor};

use super::c_scalar_type;

/// Builtin scalars (spec.md §4.7: "Builtin scalar arguments are passed to
/// callbacks by value") are the only call/reply types that cross by
/// value; everything else crosses by reference. `parse_base_type_only`
/// never produces a vector/array/optional call type, so those checks are
/// defensive rather than reachable today.
fn is_plain_scalar(ty: &TypeDescriptor) -> bool {
    ty.builtin && !ty.vector && !ty.array && !ty.is_optional() && !ty.is_opaque() && ty.name != "xdr_string"
}

/// A builtin scalar argument/reply is passed by value; anything else
/// (user aggregate, string, opaque, vector) by const reference. `void`
/// omits the parameter entirely.
fn param_for(ty: &TypeDescriptor, name: &str) -> Option<String> {
    if ty.name == "void" {
        return None;
    }
    if is_plain_scalar(ty) {
        Some(format!("{} {name}", c_scalar_type(&ty.name)))
    } else {
        Some(format!("const {} *{name}", c_scalar_type(&ty.name)))
    }
}

fn put_expr(ty: &TypeDescriptor) -> &'static str {
    match ty.name.as_str() {
        "uint32" | "int32" | "bool" => "xdr_put_u32",
        "uint64" | "int64" => "xdr_put_u64",
        "float32" => "xdr_put_f32",
        "float64" => "xdr_put_f64",
        _ => "marshall",
    }
}

/// Decodes a builtin scalar straight off the cursor into a local, with the
/// same signed-value cast `source::emit_unmarshall_value` uses for
/// members — duplicated rather than shared since this one never has a
/// struct field or an `arena` to hand it.
fn emit_scalar_decode(out: &mut String, ty: &TypeDescriptor, var: &str) {
    match ty.name.as_str() {
        "uint32" | "bool" => {
            writeln!(out, "        if ((rc = xdr_get_u32(cur, &{var})) < 0) return rc;").unwrap()
        }
        "int32" => writeln!(
            out,
            "        {{ uint32_t __t; if ((rc = xdr_get_u32(cur, &__t)) < 0) return rc; {var} = (int32_t)__t; }}"
        )
        .unwrap(),
        "uint64" => {
            writeln!(out, "        if ((rc = xdr_get_u64(cur, &{var})) < 0) return rc;").unwrap()
        }
        "int64" => writeln!(
            out,
            "        {{ uint64_t __t; if ((rc = xdr_get_u64(cur, &__t)) < 0) return rc; {var} = (int64_t)__t; }}"
        )
        .unwrap(),
        "float32" => writeln!(out, "        if ((rc = xdr_get_f32(cur, &{var})) < 0) return rc;").unwrap(),
        "float64" => writeln!(out, "        if ((rc = xdr_get_f64(cur, &{var})) < 0) return rc;").unwrap(),
        other => unreachable!("{other} is not a builtin scalar"),
    }
}

/// Every version gets its own concrete descriptor type: the proc-name
/// table plus the two dispatch entry points, wired up by `{version}_init`.
/// This lives in the generator's own emission (spec.md §4.7's "a
/// program-init routine that wires the above into a descriptor table"),
/// not the embedded runtime, which has no program-shaped state of its own.
fn emit_descriptor_decl(out: &mut String, v: &xdr_ast::ast::Version) {
    writeln!(out, "typedef struct {}_descriptor {{", v.name).unwrap();
    writeln!(out, "    const char **proc_names;").unwrap();
    writeln!(
        out,
        "    int (*dispatch_call)(uint32_t proc, xdr_read_cursor *cur, xdr_arena *arena, void *ctx);"
    )
    .unwrap();
    writeln!(
        out,
        "    int (*dispatch_reply)(uint32_t proc, xdr_read_cursor *cur, xdr_arena *arena, void *ctx);"
    )
    .unwrap();
    writeln!(out, "}} {}_descriptor;", v.name).unwrap();
    out.push('\n');
}

pub fn emit_program_prototypes(out: &mut String, p: &Program) {
    writeln!(out, "/* RPC program {} (id {}) */", p.name, p.id).unwrap();
    for v in &p.versions {
        emit_descriptor_decl(out, v);
        writeln!(out, "extern const char *{}_proc_names[];", v.name).unwrap();
        writeln!(
            out,
            "int {}_dispatch_call(uint32_t proc, xdr_read_cursor *cur, xdr_arena *arena, void *ctx);",
            v.name
        )
        .unwrap();
        writeln!(
            out,
            "int {}_dispatch_reply(uint32_t proc, xdr_read_cursor *cur, xdr_arena *arena, void *ctx);",
            v.name
        )
        .unwrap();
        for f in &v.functions {
            let call_sig = match param_for(&f.call_type, "arg") {
                Some(p) => format!("xdr_write_cursor *cur, {p}"),
                None => "xdr_write_cursor *cur".to_string(),
            };
            let reply_sig = match param_for(&f.reply_type, "reply") {
                Some(p) => format!("xdr_write_cursor *cur, {p}"),
                None => "xdr_write_cursor *cur".to_string(),
            };
            writeln!(out, "int {}_send_call_{}({call_sig});", v.name, f.name).unwrap();
            writeln!(out, "int {}_send_reply_{}({reply_sig});", v.name, f.name).unwrap();
        }
        writeln!(out, "void {}_init({}_descriptor *desc);", v.name, v.name).unwrap();
        out.push('\n');
    }
}

pub fn emit_program_definitions(out: &mut String, p: &Program) {
    writeln!(out, "/* --- RPC program {} --- */", p.name).unwrap();
    for v in &p.versions {
        emit_proc_name_table(out, v);
        emit_dispatch(out, v, "call", "recv");
        emit_dispatch(out, v, "reply", "recv_reply");
        for f in &v.functions {
            emit_send(out, &v.name, f, "send_call", &f.call_type, "arg");
            emit_send(out, &v.name, f, "send_reply", &f.reply_type, "reply");
        }
        emit_init(out, v);
        out.push('\n');
    }
}

fn emit_proc_name_table(out: &mut String, v: &xdr_ast::ast::Version) {
    writeln!(out, "const char *{}_proc_names[] = {{", v.name).unwrap();
    for f in &v.functions {
        writeln!(out, "    [{}] = \"{}\",", f.id, f.name).unwrap();
    }
    writeln!(out, "}};").unwrap();
    out.push('\n');
}

fn emit_dispatch(out: &mut String, v: &xdr_ast::ast::Version, kind: &str, callback_prefix: &str) {
    writeln!(
        out,
        "int {}_dispatch_{kind}(uint32_t proc, xdr_read_cursor *cur, xdr_arena *arena, void *ctx) {{",
        v.name
    )
    .unwrap();
    writeln!(out, "    switch (proc) {{").unwrap();
    for f in &v.functions {
        let ty = if kind == "call" { &f.call_type } else { &f.reply_type };
        writeln!(out, "    case {}: {{", f.id).unwrap();
        if ty.name == "void" {
            writeln!(out, "        return {}_{callback_prefix}_{}(ctx);", v.name, f.name).unwrap();
        } else if is_plain_scalar(ty) {
            let c_ty = c_scalar_type(&ty.name);
            writeln!(out, "        {c_ty} msg;").unwrap();
            writeln!(out, "        int rc;").unwrap();
            emit_scalar_decode(out, ty, "msg");
            writeln!(out, "        return {}_{callback_prefix}_{}(ctx, msg);", v.name, f.name).unwrap();
        } else {
            let c_ty = c_scalar_type(&ty.name);
            writeln!(
                out,
                "        {c_ty} *msg = ({c_ty} *)xdr_arena_alloc(arena, sizeof(*msg));"
            )
            .unwrap();
            writeln!(out, "        int rc = unmarshall_{}(cur, arena, msg);", ty.name).unwrap();
            writeln!(out, "        if (rc < 0) return rc;").unwrap();
            writeln!(out, "        return {}_{callback_prefix}_{}(ctx, msg);", v.name, f.name).unwrap();
        }
        writeln!(out, "    }}").unwrap();
    }
    writeln!(out, "    default: return -1;").unwrap();
    writeln!(out, "    }}").unwrap();
    writeln!(out, "}}").unwrap();
    out.push('\n');
}

fn emit_send(
    out: &mut String,
    version_name: &str,
    f: &xdr_ast::ast::Function,
    op: &str,
    ty: &TypeDescriptor,
    param_name: &str,
) {
    let sig = match param_for(ty, param_name) {
        Some(p) => format!("xdr_write_cursor *cur, {p}"),
        None => "xdr_write_cursor *cur".to_string(),
    };
    writeln!(out, "int {version_name}_{op}_{}({sig}) {{", f.name).unwrap();
    if ty.name != "void" {
        let fn_name = put_expr(ty);
        if fn_name == "marshall" {
            writeln!(out, "    return marshall_{}(cur, {param_name});", ty.name).unwrap();
        } else {
            writeln!(out, "    return {fn_name}(cur, *{param_name});").unwrap();
        }
    } else {
        writeln!(out, "    (void)cur;").unwrap();
        writeln!(out, "    return 0;").unwrap();
    }
    writeln!(out, "}}").unwrap();
    out.push('\n');
}

fn emit_init(out: &mut String, v: &xdr_ast::ast::Version) {
    writeln!(out, "void {}_init({}_descriptor *desc) {{", v.name, v.name).unwrap();
    writeln!(out, "    desc->proc_names = {}_proc_names;", v.name).unwrap();
    writeln!(out, "    desc->dispatch_call = {}_dispatch_call;", v.name).unwrap();
    writeln!(out, "    desc->dispatch_reply = {}_dispatch_reply;", v.name).unwrap();
    writeln!(out, "}}").unwrap();
}

#[cfg(test)]
mod tests {
    use super::*;
    use xdr_ast::ast::{Function, Version};

    fn sample_program() -> Program {
        Program {
            id: "100000".into(),
            name: "FILESVC".into(),
            versions: vec![Version {
                id: "1".into(),
                name: "FILESVC_V1".into(),
                functions: vec![
                    Function {
                        id: "1".into(),
                        name: "READ".into(),
                        call_type: TypeDescriptor::scalar("uint32", true),
                        reply_type: TypeDescriptor::scalar("void", true),
                    },
                    Function {
                        id: "2".into(),
                        name: "WRITE".into(),
                        call_type: {
                            let mut t = TypeDescriptor::scalar("xdr_opaque", true);
                            t.flags |= xdr_ast::ast::TypeFlags::OPAQUE;
                            t
                        },
                        reply_type: TypeDescriptor::scalar("uint32", true),
                    },
                ],
            }],
        }
    }

    #[test]
    fn prototypes_name_every_function() {
        let mut out = String::new();
        emit_program_prototypes(&mut out, &sample_program());
        assert!(out.contains("FILESVC_V1_send_call_READ(xdr_write_cursor *cur, uint32_t arg);"));
        assert!(out.contains("FILESVC_V1_send_reply_READ(xdr_write_cursor *cur);"));
        assert!(out.contains("FILESVC_V1_dispatch_call"));
        assert!(out.contains("typedef struct FILESVC_V1_descriptor {"));
        assert!(out.contains("void FILESVC_V1_init(FILESVC_V1_descriptor *desc);"));
    }

    #[test]
    fn init_wires_the_proc_table_and_dispatch_functions_into_the_descriptor() {
        let mut out = String::new();
        emit_program_definitions(&mut out, &sample_program());
        assert!(out.contains("void FILESVC_V1_init(FILESVC_V1_descriptor *desc) {"));
        assert!(out.contains("desc->proc_names = FILESVC_V1_proc_names;"));
        assert!(out.contains("desc->dispatch_call = FILESVC_V1_dispatch_call;"));
        assert!(out.contains("desc->dispatch_reply = FILESVC_V1_dispatch_reply;"));
    }

    #[test]
    fn definitions_build_a_proc_name_table_and_switch() {
        let mut out = String::new();
        emit_program_definitions(&mut out, &sample_program());
        assert!(out.contains("[1] = \"READ\","));
        assert!(out.contains("case 1: {"));
        assert!(out.contains("FILESVC_V1_recv_READ"));
    }
}
