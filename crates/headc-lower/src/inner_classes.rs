//! `InnerClasses` closure: every class `C` mentions in this ledger is either
//! one of `C`'s own (possibly deeply) nested member types, or a foreign
//! nested class reached through a field/parameter/return/thrown/supertype/
//! annotation/bound reference, closed transitively over the *enclosing*
//! relation so every intermediate outer level also gets an entry.
//!
//! Ordering: own member types first, in declaration order (depth-first,
//! matching `BoundClass::member_types`'s own order); everything else after,
//! sorted by binary name for a stable tiebreak.

use headc_ast::Modifiers;
use headc_binder::{BoundClass, BoundProgram, ClassKind};
use headc_classfile::{
    InnerClassInfo, ACC_ABSTRACT, ACC_ANNOTATION, ACC_ENUM, ACC_FINAL, ACC_INTERFACE, ACC_PRIVATE, ACC_PROTECTED,
    ACC_PUBLIC, ACC_STATIC,
};
use headc_core::Interner;
use headc_symbols::{AnnotationUse, ClassSymbol, Type};
use rustc_hash::FxHashSet;

fn collect_class_refs(ty: &Type, out: &mut Vec<ClassSymbol>) {
    match ty {
        Type::Prim(_) | Type::Void | Type::TyVar(..) => {}
        Type::Class(segments) => {
            for seg in segments {
                out.push(seg.class);
                for arg in &seg.type_args {
                    collect_class_refs(arg, out);
                }
            }
        }
        Type::Array(element, _) => collect_class_refs(element, out),
        Type::Wild(kind, _) => match kind {
            headc_symbols::WildKind::Unbounded => {}
            headc_symbols::WildKind::Extends(inner) | headc_symbols::WildKind::Super(inner) => {
                collect_class_refs(inner, out)
            }
        },
    }
}

fn collect_annotation_refs(uses: &[AnnotationUse], out: &mut Vec<ClassSymbol>) {
    for u in uses {
        out.push(u.annotation_class);
    }
}

fn own_members_depth_first(bound: &BoundClass, program: &BoundProgram, out: &mut Vec<ClassSymbol>) {
    for &member in &bound.member_types {
        out.push(member);
        if let Some(member_class) = program.get(member) {
            own_members_depth_first(member_class, program, out);
        }
    }
}

/// Walks `sym`'s outer chain, adding every nested ancestor (never the
/// top-level class itself) so a reference three levels deep still pulls in
/// its intermediate enclosing classes.
fn add_with_enclosing_chain(
    sym: ClassSymbol,
    interner: &mut Interner,
    out: &mut Vec<ClassSymbol>,
    seen: &mut FxHashSet<ClassSymbol>,
) {
    if sym.is_error_sentinel(interner) {
        return;
    }
    let mut cur = sym;
    while let Some(outer) = cur.outer(interner) {
        if !seen.insert(cur) {
            return;
        }
        out.push(cur);
        cur = outer;
    }
}

pub fn compute(bound: &BoundClass, program: &BoundProgram, interner: &mut Interner) -> Vec<InnerClassInfo> {
    let mut own_order = Vec::new();
    own_members_depth_first(bound, program, &mut own_order);

    let mut raw_refs = Vec::new();
    if let Some(super_ty) = &bound.super_class_type {
        collect_class_refs(super_ty, &mut raw_refs);
    }
    for iface in &bound.interface_types {
        collect_class_refs(iface, &mut raw_refs);
    }
    for tpb in &bound.type_param_bounds {
        if let Some(b) = &tpb.class_bound {
            collect_class_refs(b, &mut raw_refs);
        }
        for b in &tpb.interface_bounds {
            collect_class_refs(b, &mut raw_refs);
        }
    }
    for field in &bound.fields {
        collect_class_refs(&field.ty, &mut raw_refs);
        collect_annotation_refs(&field.annotations, &mut raw_refs);
    }
    for method in &bound.methods {
        collect_class_refs(&method.return_type, &mut raw_refs);
        for p in &method.params {
            collect_class_refs(&p.ty, &mut raw_refs);
        }
        for t in &method.thrown {
            collect_class_refs(t, &mut raw_refs);
        }
        collect_annotation_refs(&method.annotations, &mut raw_refs);
    }
    collect_annotation_refs(&bound.annotations, &mut raw_refs);

    let mut seen: FxHashSet<ClassSymbol> = FxHashSet::default();
    let mut ordered = Vec::new();
    for &member in &own_order {
        if seen.insert(member) {
            ordered.push(member);
        }
    }

    let mut foreign = Vec::new();
    for sym in raw_refs {
        if sym.outer(interner).is_some() && !seen.contains(&sym) {
            add_with_enclosing_chain(sym, interner, &mut foreign, &mut seen);
        }
    }
    foreign.sort_by(|a, b| a.binary_name(interner).cmp(b.binary_name(interner)));
    ordered.extend(foreign);

    ordered
        .into_iter()
        .map(|sym| build_entry(sym, program, interner))
        .collect()
}

fn build_entry(sym: ClassSymbol, program: &BoundProgram, interner: &mut Interner) -> InnerClassInfo {
    let inner_class = sym.binary_name(interner).to_string();
    let outer_class = sym.outer(interner).map(|o| o.binary_name(interner).to_string());
    let simple_name = sym.simple_name(interner).to_string();
    let is_anonymous = !simple_name.is_empty() && simple_name.chars().all(|c| c.is_ascii_digit());
    let inner_name = if is_anonymous { None } else { Some(simple_name) };
    let access_flags = program.get(sym).map(inner_class_access_flags).unwrap_or(ACC_PUBLIC | ACC_STATIC);

    InnerClassInfo {
        inner_class,
        outer_class,
        inner_name,
        access_flags,
    }
}

/// The access flags recorded in an `InnerClasses` entry, unlike the nested
/// class's own `ClassDef.access_flags`: this one keeps `private`/
/// `protected`/`static`, which a class's own access-flags field never
/// carries (see `class::compute_access_flags`).
fn inner_class_access_flags(bound: &BoundClass) -> u16 {
    let m = bound.access;
    let mut flags = 0u16;
    if m.contains(Modifiers::PUBLIC) {
        flags |= ACC_PUBLIC;
    }
    if m.contains(Modifiers::PRIVATE) {
        flags |= ACC_PRIVATE;
    }
    if m.contains(Modifiers::PROTECTED) {
        flags |= ACC_PROTECTED;
    }
    if m.contains(Modifiers::STATIC) || bound.kind == ClassKind::Interface || bound.kind == ClassKind::Annotation {
        flags |= ACC_STATIC;
    }
    if m.contains(Modifiers::FINAL) || bound.kind == ClassKind::Enum {
        flags |= ACC_FINAL;
    }
    match bound.kind {
        ClassKind::Interface => flags |= ACC_INTERFACE | ACC_ABSTRACT,
        ClassKind::Annotation => flags |= ACC_INTERFACE | ACC_ANNOTATION | ACC_ABSTRACT,
        ClassKind::Enum => flags |= ACC_ENUM,
        ClassKind::Class => {
            if m.contains(Modifiers::ABSTRACT) {
                flags |= ACC_ABSTRACT;
            }
        }
    }
    flags
}
