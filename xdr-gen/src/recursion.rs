//! Recursion analysis (spec.md §4.4).
//!
//! A one-level reachability query over the *resolved* AST: since
//! [`crate::resolve`] has already collapsed every typedef to its
//! terminal target, a member's type name is already the real struct,
//! union, or builtin name, so this only has to look at direct members —
//! the "one level of typedef indirection" the spec describes has already
//! been paid for by resolution. Grounded on the same rank-style walk as
//! `mspdb::tpi::find_type_refs`, narrowed to a single hop since the
//! emitter only ever needs a yes/no answer for an `inline` annotation
//! (spec.md §4.4: "has no effect on behavior, only on emitted
//! annotations").

#[cfg(test)]
mod tests;

use xdr_ast::ast::IdlFile;

/// True if `name`'s own declaration directly names itself somewhere: a
/// struct member, a union pivot, or a union case body. Emitters use this
/// to skip a `force_inline` annotation on self-referential types (linked
/// lists, and any hand-written equivalent via a raw struct member).
pub fn is_directly_recursive(name: &str, idl: &IdlFile) -> bool {
    if let Some(s) = idl.find_struct(name) {
        return s.members.iter().any(|m| m.ty.name == name);
    }
    if let Some(u) = idl.find_union(name) {
        if u.pivot.ty.name == name {
            return true;
        }
        return u
            .cases
            .iter()
            .chain(u.default_case.iter())
            .filter_map(|c| c.body.as_ref())
            .any(|body| body.ty.name == name);
    }
    false
}
