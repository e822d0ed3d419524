//! Shared emission helpers: C type naming, member declaration shapes, and
//! the dependency-ordering fixpoint loop that both `header` and `source`
//! walk in lockstep (spec.md §4.5).

pub mod header;
pub mod rpc;
pub mod source;

#[cfg(test)]
mod tests;

use std::collections::HashSet;

use xdr_ast::ast::{IdlFile, Member, TypeDescriptor, TypeFlags};

use crate::error::{CompileError, CycleError};
use crate::recursion;
use crate::resolve;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AggKind {
    Struct,
    Union,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AggRef {
    pub kind: AggKind,
    pub name: String,
}

/// The two generated files, plus the resolved AST they were generated
/// from (useful to callers like `dump-ast`/`check` that want to inspect
/// the fully-resolved tree after the fact).
pub struct Generated {
    pub header: String,
    pub source: String,
}

/// Runs the whole back half of the pipeline: resolve, rewrite enum
/// member types, compute dependency order, then emit both files. This is
/// the single entry point `xdrgen generate` calls.
pub fn generate(
    idl: &IdlFile,
    symtab: &xdr_ast::symtab::SymbolTable,
    guard: &str,
    emit_rpc: bool,
) -> Result<Generated, CompileError> {
    let mut idl = resolve::resolve(idl, symtab)?;
    rewrite_enum_members(&mut idl);
    let order = dependency_order(&idl)?;
    let header = header::emit(&idl, &order, guard, emit_rpc);
    let source = source::emit(&idl, &order, emit_rpc);
    Ok(Generated { header, source })
}

/// spec.md §4.5, last paragraph: once emitted, an enum-typed reference is
/// rewritten in place to the 32-bit-unsigned builtin so every downstream
/// phase treats it as a plain integer.
pub fn rewrite_enum_members(idl: &mut IdlFile) {
    for s in idl.structs.iter_mut() {
        for m in s.members.iter_mut() {
            rewrite_if_enum(&mut m.ty);
        }
    }
    for u in idl.unions.iter_mut() {
        rewrite_if_enum(&mut u.pivot.ty);
        for c in u.cases.iter_mut().chain(u.default_case.iter_mut()) {
            if let Some(b) = c.body.as_mut() {
                rewrite_if_enum(&mut b.ty);
            }
        }
    }
}

fn rewrite_if_enum(ty: &mut TypeDescriptor) {
    if ty.is_enumeration() {
        ty.name = "uint32".to_string();
        ty.builtin = true;
        ty.flags.remove(TypeFlags::ENUMERATION);
    }
}

/// spec.md §4.5: repeatedly scan the struct/union lists; an aggregate is
/// emittable once every non-builtin member/case type it names (other
/// than itself) has already been emitted. A pass that emits nothing with
/// aggregates still unemitted is a real, non-self-referential cycle.
pub fn dependency_order(idl: &IdlFile) -> Result<Vec<AggRef>, CycleError> {
    let mut emitted: HashSet<String> = HashSet::new();
    let mut order = Vec::new();
    let mut remaining: Vec<AggRef> = idl
        .structs
        .iter()
        .map(|s| AggRef {
            kind: AggKind::Struct,
            name: s.name.clone(),
        })
        .chain(idl.unions.iter().map(|u| AggRef {
            kind: AggKind::Union,
            name: u.name.clone(),
        }))
        .collect();

    loop {
        if remaining.is_empty() {
            return Ok(order);
        }
        let mut next_remaining = Vec::new();
        let mut progressed = false;
        for agg in remaining {
            let deps = direct_aggregate_deps(idl, &agg);
            if deps.iter().all(|d| *d == agg.name || emitted.contains(d)) {
                emitted.insert(agg.name.clone());
                order.push(agg);
                progressed = true;
            } else {
                next_remaining.push(agg);
            }
        }
        remaining = next_remaining;
        if !progressed && !remaining.is_empty() {
            return Err(CycleError::new(remaining.into_iter().map(|a| a.name).collect()));
        }
    }
}

fn direct_aggregate_deps(idl: &IdlFile, agg: &AggRef) -> Vec<String> {
    let mut deps = Vec::new();
    match agg.kind {
        AggKind::Struct => {
            let s = idl.find_struct(&agg.name).expect("in dependency_order's own list");
            for m in &s.members {
                if !m.ty.builtin {
                    deps.push(m.ty.name.clone());
                }
            }
        }
        AggKind::Union => {
            let u = idl.find_union(&agg.name).expect("in dependency_order's own list");
            if !u.pivot.ty.builtin {
                deps.push(u.pivot.ty.name.clone());
            }
            for c in u.cases.iter().chain(u.default_case.iter()) {
                if let Some(b) = &c.body {
                    if !b.ty.builtin {
                        deps.push(b.ty.name.clone());
                    }
                }
            }
        }
    }
    deps
}

/// Maps a builtin identifier to its C spelling. Non-builtin names (user
/// structs/unions/enums) pass through unchanged — by the time anything
/// calls this, the header emitter has already declared a type of exactly
/// that name.
pub fn c_scalar_type(name: &str) -> String {
    match name {
        "void" => "void",
        "bool" => "uint32_t",
        "int32" => "int32_t",
        "uint32" => "uint32_t",
        "int64" => "int64_t",
        "uint64" => "uint64_t",
        "float32" => "float",
        "float64" => "double",
        "xdr_iovec" => "xdr_iovec",
        other => return other.to_string(),
    }
    .to_string()
}

/// Emits one member's C field declaration(s), per the table in spec.md
/// §4.5. Most shapes are one line; opaque-variable, `xdr_string` and
/// vector members are a length/count field plus a pointer field.
pub fn member_decl_lines(m: &Member) -> Vec<String> {
    let ty = &m.ty;

    if ty.is_opaque() && ty.array {
        let n = ty.array_size.as_deref().unwrap_or("0");
        return vec![format!("uint8_t {}[{}];", m.name, n)];
    }
    if ty.is_opaque() && ty.is_zerocopy() {
        return vec![format!("xdr_iovec {};", m.name)];
    }
    if ty.is_opaque() {
        return vec![format!("uint32_t {}_len;", m.name), format!("uint8_t *{};", m.name)];
    }
    if ty.name == "xdr_string" {
        return vec![format!("uint32_t {}_len;", m.name), format!("char *{};", m.name)];
    }
    if ty.vector {
        let base = c_scalar_type(&ty.name);
        return vec![format!("uint32_t num_{};", m.name), format!("{base} *{};", m.name)];
    }
    if ty.is_optional() {
        let base = c_scalar_type(&ty.name);
        return vec![format!("{base} *{};", m.name)];
    }
    if ty.array {
        let base = c_scalar_type(&ty.name);
        let n = ty.array_size.as_deref().unwrap_or("0");
        return vec![format!("{base} {}[{}];", m.name, n)];
    }
    let base = c_scalar_type(&ty.name);
    vec![format!("{base} {};", m.name)]
}

pub fn force_inline(name: &str, idl: &IdlFile) -> &'static str {
    if recursion::is_directly_recursive(name, idl) {
        ""
    } else {
        "inline "
    }
}
