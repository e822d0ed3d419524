//! Typedef collapsing and reference resolution (spec.md §4.3).
//!
//! Grounded on `mspdb::tpi::find_type_refs` and `mspdb::tpi::check`: both
//! walk a graph of type references built from the same records the rest
//! of the crate already parsed, accumulating a small amount of derived
//! state per node (there: forward-ref bits; here: the `enumeration` and
//! `linkedlist` descriptor flags) rather than producing a separate
//! parallel structure.

#[cfg(test)]
mod tests;

use std::collections::{HashMap, HashSet};

use xdr_ast::ast::{IdlFile, TypeDescriptor, TypeFlags};
use xdr_ast::symtab::{SymbolKind, SymbolTable};

use crate::error::ReferenceError;

/// Walks every symbol-table entry once, collapsing typedef chains to
/// their terminal target and tagging `enumeration`/`linkedlist` on every
/// type descriptor that names an enum or a linked-list struct. Returns a
/// fully resolved clone of the input; the caller discards the
/// pre-resolution copy.
pub fn resolve(idl: &IdlFile, symtab: &SymbolTable) -> Result<IdlFile, ReferenceError> {
    let mut collapsed: HashMap<String, TypeDescriptor> = HashMap::new();
    let mut visiting: HashSet<String> = HashSet::new();
    for t in &idl.typedefs {
        collapse_typedef(&t.name, idl, symtab, &mut collapsed, &mut visiting)?;
    }

    let mut out = idl.clone();

    for t in out.typedefs.iter_mut() {
        t.ty = collapsed
            .get(&t.name)
            .expect("every typedef was collapsed above")
            .clone();
    }

    for s in out.structs.iter_mut() {
        let owner = s.name.clone();
        for m in s.members.iter_mut() {
            resolve_use_site(&mut m.ty, &owner, idl, symtab, &collapsed)?;
        }
    }

    for u in out.unions.iter_mut() {
        let owner = u.name.clone();
        resolve_use_site(&mut u.pivot.ty, &owner, idl, symtab, &collapsed)?;
        if !pivot_is_integral(&u.pivot.ty) {
            return Err(ReferenceError::new(
                owner.clone(),
                format!("{} (union pivot must be an integer or enum)", u.pivot.ty.name),
            ));
        }
        for c in u.cases.iter_mut() {
            if let Some(body) = &mut c.body {
                resolve_use_site(&mut body.ty, &owner, idl, symtab, &collapsed)?;
            }
        }
        if let Some(d) = &mut u.default_case {
            if let Some(body) = &mut d.body {
                resolve_use_site(&mut body.ty, &owner, idl, symtab, &collapsed)?;
            }
        }
    }

    for p in &out.programs {
        for v in &p.versions {
            for f in &v.functions {
                check_function_type(&f.call_type, &f.name, idl, symtab)?;
                check_function_type(&f.reply_type, &f.name, idl, symtab)?;
            }
        }
    }

    Ok(out)
}

/// Function call/reply types are not stored back (`IdlFile::programs` is
/// not visited for mutation above, matching spec.md §4.7's treatment of
/// them as emission-time lookups rather than resolved descriptors) but
/// still need their name checked against the symbol table.
fn check_function_type(
    ty: &TypeDescriptor,
    referrer: &str,
    idl: &IdlFile,
    symtab: &SymbolTable,
) -> Result<(), ReferenceError> {
    if ty.builtin {
        return Ok(());
    }
    let _ = idl;
    symtab
        .get(&ty.name)
        .ok_or_else(|| ReferenceError::new(referrer, ty.name.clone()))?;
    Ok(())
}

/// A union pivot must resolve to an integral discriminant: an enum, or one
/// of the builtin integer types. `xdr_string`/`xdr_opaque`/`float32`/
/// `float64`/`void` are builtins but not integral and must be rejected too.
fn pivot_is_integral(ty: &TypeDescriptor) -> bool {
    ty.is_enumeration()
        || (ty.builtin && matches!(ty.name.as_str(), "bool" | "int32" | "uint32" | "int64" | "uint64"))
}

/// Resolves one member/pivot/case-body type reference in place: enum and
/// linked-list-struct references get their flag set; a typedef reference
/// is replaced wholesale by its already-collapsed target.
fn resolve_use_site(
    ty: &mut TypeDescriptor,
    referrer: &str,
    idl: &IdlFile,
    symtab: &SymbolTable,
    collapsed: &HashMap<String, TypeDescriptor>,
) -> Result<(), ReferenceError> {
    if ty.builtin {
        return Ok(());
    }
    let sym = symtab
        .get(&ty.name)
        .ok_or_else(|| ReferenceError::new(referrer, ty.name.clone()))?;
    match sym.node.kind {
        SymbolKind::Enum => ty.flags |= TypeFlags::ENUMERATION,
        SymbolKind::Struct => {
            if idl.structs[sym.node.index].linkedlist {
                ty.flags |= TypeFlags::LINKEDLIST;
            }
        }
        SymbolKind::Union => {}
        SymbolKind::Const => {
            return Err(ReferenceError::new(referrer, format!("{} (a constant, not a type)", ty.name)))
        }
        SymbolKind::Typedef => {
            let target = collapsed
                .get(&ty.name)
                .expect("typedefs are fully collapsed before member resolution");
            *ty = apply_typedef_target(ty, target);
        }
    }
    Ok(())
}

/// Combines a use site's own declarator (shape, `optional`, `zerocopy`)
/// with a typedef's resolved target (identity, `enumeration`,
/// `linkedlist`, `opaque`). A use site with no shape of its own inherits
/// the typedef's shape too, so a plain reference to e.g. `typedef opaque
/// bytes16[16];` still comes out as a 16-byte array.
fn apply_typedef_target(use_site: &TypeDescriptor, target: &TypeDescriptor) -> TypeDescriptor {
    let has_own_shape = use_site.vector || use_site.array;
    TypeDescriptor {
        name: target.name.clone(),
        builtin: target.builtin,
        flags: (use_site.flags & (TypeFlags::ZEROCOPY | TypeFlags::OPTIONAL))
            | (target.flags & (TypeFlags::ENUMERATION | TypeFlags::LINKEDLIST | TypeFlags::OPAQUE)),
        vector: if has_own_shape { use_site.vector } else { target.vector },
        vector_bound: if has_own_shape {
            use_site.vector_bound.clone()
        } else {
            target.vector_bound.clone()
        },
        array: if has_own_shape { use_site.array } else { target.array },
        array_size: if has_own_shape {
            use_site.array_size.clone()
        } else {
            target.array_size.clone()
        },
    }
}

fn collapse_typedef(
    name: &str,
    idl: &IdlFile,
    symtab: &SymbolTable,
    collapsed: &mut HashMap<String, TypeDescriptor>,
    visiting: &mut HashSet<String>,
) -> Result<TypeDescriptor, ReferenceError> {
    if let Some(ty) = collapsed.get(name) {
        return Ok(ty.clone());
    }
    if !visiting.insert(name.to_string()) {
        return Err(ReferenceError::new(name, format!("{name} (cyclic typedef chain)")));
    }

    let decl = idl.find_typedef(name).expect("symbol table stays in sync with the AST");
    let mut ty = decl.ty.clone();

    if !ty.builtin {
        let sym = symtab
            .get(&ty.name)
            .ok_or_else(|| ReferenceError::new(name, ty.name.clone()))?;
        ty = match sym.node.kind {
            SymbolKind::Enum => {
                ty.flags |= TypeFlags::ENUMERATION;
                ty
            }
            SymbolKind::Struct => {
                if idl.structs[sym.node.index].linkedlist {
                    ty.flags |= TypeFlags::LINKEDLIST;
                }
                ty
            }
            SymbolKind::Union => ty,
            SymbolKind::Const => {
                return Err(ReferenceError::new(name, format!("{} (a constant, not a type)", ty.name)))
            }
            SymbolKind::Typedef => {
                let target = collapse_typedef(&ty.name, idl, symtab, collapsed, visiting)?;
                apply_typedef_target(&ty, &target)
            }
        };
    }

    visiting.remove(name);
    collapsed.insert(name.to_string(), ty.clone());
    Ok(ty)
}
