//! Phase V — constant evaluation.
//!
//! Evaluates `final` field initializers of constant-eligible type (primitive
//! or `java/lang/String`) to a `ConstantValue`-ready [`headc_symbols::Const`],
//! then every annotation use's raw arguments and every annotation element's
//! default value, none of which can reference a field still being computed.
//!
//! Field initializers are driven to a fixpoint: a field whose initializer
//! references another not-yet-computed constant field is requeued until a
//! full pass over the worklist makes no further progress, at which point
//! every field still unresolved is genuinely cyclic. Annotation arguments and
//! defaults run afterward, once, since nothing here feeds them back into a
//! field's own value.

use std::cell::RefCell;

use headc_ast::{CompilationUnit, Expr, Modifiers, TypeRefNode};
use headc_const::{ConstRef, ConstScope, EvalOutcome, FieldConstStatus};
use headc_core::{Diagnostic, DiagnosticKind};
use headc_symbols::{ClassSymbol, Const, FieldSymbol, PackageSymbol, PrimKind, Type, TyVarSymbol};
use rustc_hash::FxHashMap;

use crate::bound::{BoundClass, Owner};
use crate::ctx::BinderCtx;
use crate::hierarchy::{find_member_type, resolve_fully_qualified};
use crate::imports::{resolve_simple_type_name, ImportMap, TypeNameResolution};
use crate::namer::Header;
use crate::typeres::{resolve_type, tyvar_scope_for_class};

/// A field initializer still waiting on another field's value, queued for
/// retry on the next worklist pass.
struct PendingField {
    class: ClassSymbol,
    field_index: usize,
    expr: Expr,
}

pub fn evaluate_constants(
    ctx: &mut BinderCtx,
    headers: &FxHashMap<ClassSymbol, Header>,
    top_level_by_package: &FxHashMap<PackageSymbol, Vec<ClassSymbol>>,
    compilation_units: &[CompilationUnit],
    import_maps: &[ImportMap],
    classes: &mut FxHashMap<ClassSymbol, BoundClass>,
) {
    let mut worklist = Vec::new();
    for (&symbol, class) in classes.iter() {
        for (i, field) in class.fields.iter().enumerate() {
            if !field.access.contains(Modifiers::FINAL) {
                continue;
            }
            if !is_constant_eligible_type(&field.ty, ctx) {
                continue;
            }
            let Some(initializer) = &field.initializer else { continue };
            worklist.push(PendingField { class: symbol, field_index: i, expr: initializer.clone() });
        }
    }

    loop {
        let mut next = Vec::new();
        let mut progress = false;
        for pending in worklist {
            let header = &headers[&pending.class];
            let cu = &compilation_units[header.cu_index];
            let current_package = cu.package.clone().unwrap_or_default();
            let import_map = &import_maps[header.cu_index];
            let tyvar_scope = tyvar_scope_for_class(headers, pending.class);

            let outcome = {
                let scope = Scope {
                    ctx: RefCell::new(&mut *ctx),
                    classes,
                    headers,
                    top_level_by_package,
                    import_map,
                    current_package: &current_package,
                    current_class: pending.class,
                    tyvar_scope: &tyvar_scope,
                };
                headc_const::evaluate(&pending.expr, &scope)
            };

            match outcome {
                EvalOutcome::Value(value) => {
                    progress = true;
                    let class = classes.get_mut(&pending.class).unwrap();
                    let field = &mut class.fields[pending.field_index];
                    let narrowed = match &field.ty {
                        Type::Prim(prim) => headc_const::narrow_to(&value, *prim).unwrap_or(value),
                        _ => value,
                    };
                    field.constant_value = Some(narrowed);
                }
                EvalOutcome::Unresolved(_) => next.push(pending),
                EvalOutcome::NotAConstant(_) => {}
            }
        }
        let done = !progress || next.is_empty();
        worklist = next;
        if done {
            break;
        }
    }

    for pending in worklist {
        let class = &classes[&pending.class];
        let field_name = class.fields[pending.field_index].symbol.name(ctx.interner).to_string();
        ctx.diagnostics.report(Diagnostic::error(DiagnosticKind::CyclicConstant { field: field_name }, None));
    }

    evaluate_annotations(ctx, headers, top_level_by_package, compilation_units, import_maps, classes);
}

fn is_constant_eligible_type(ty: &Type, ctx: &BinderCtx) -> bool {
    match ty {
        Type::Prim(_) => true,
        Type::Class(segments) => {
            segments.len() == 1
                && segments[0].type_args.is_empty()
                && segments[0].class.binary_name(ctx.interner) == "java/lang/String"
        }
        _ => false,
    }
}

fn evaluate_annotations(
    ctx: &mut BinderCtx,
    headers: &FxHashMap<ClassSymbol, Header>,
    top_level_by_package: &FxHashMap<PackageSymbol, Vec<ClassSymbol>>,
    compilation_units: &[CompilationUnit],
    import_maps: &[ImportMap],
    classes: &mut FxHashMap<ClassSymbol, BoundClass>,
) {
    let symbols = classes.keys().copied().collect::<Vec<_>>();
    for symbol in symbols {
        let Some(header) = headers.get(&symbol) else { continue };
        let cu = &compilation_units[header.cu_index];
        let current_package = cu.package.clone().unwrap_or_default();
        let import_map = &import_maps[header.cu_index];
        let tyvar_scope = tyvar_scope_for_class(headers, symbol);

        let class_annotation_count = classes[&symbol].annotations.len();
        for i in 0..class_annotation_count {
            let (raw_args, annotation_class) = {
                let au = &classes[&symbol].annotations[i];
                (au.raw_args.clone(), au.annotation_class)
            };
            let resolved = resolve_annotation_args(
                ctx,
                headers,
                top_level_by_package,
                import_map,
                &current_package,
                symbol,
                &tyvar_scope,
                classes,
                annotation_class,
                &raw_args,
            );
            classes.get_mut(&symbol).unwrap().annotations[i].resolved = resolved;
        }

        let field_count = classes[&symbol].fields.len();
        for fi in 0..field_count {
            let annotation_count = classes[&symbol].fields[fi].annotations.len();
            for ai in 0..annotation_count {
                let (raw_args, annotation_class) = {
                    let au = &classes[&symbol].fields[fi].annotations[ai];
                    (au.raw_args.clone(), au.annotation_class)
                };
                let resolved = resolve_annotation_args(
                    ctx,
                    headers,
                    top_level_by_package,
                    import_map,
                    &current_package,
                    symbol,
                    &tyvar_scope,
                    classes,
                    annotation_class,
                    &raw_args,
                );
                classes.get_mut(&symbol).unwrap().fields[fi].annotations[ai].resolved = resolved;
            }
        }

        let method_count = classes[&symbol].methods.len();
        for mi in 0..method_count {
            let annotation_count = classes[&symbol].methods[mi].annotations.len();
            for ai in 0..annotation_count {
                let (raw_args, annotation_class) = {
                    let au = &classes[&symbol].methods[mi].annotations[ai];
                    (au.raw_args.clone(), au.annotation_class)
                };
                let resolved = resolve_annotation_args(
                    ctx,
                    headers,
                    top_level_by_package,
                    import_map,
                    &current_package,
                    symbol,
                    &tyvar_scope,
                    classes,
                    annotation_class,
                    &raw_args,
                );
                classes.get_mut(&symbol).unwrap().methods[mi].annotations[ai].resolved = resolved;
            }

            let default = classes[&symbol].methods[mi].default_value_raw.clone();
            if let Some(expr) = default {
                let element_return = classes[&symbol].methods[mi].return_type.clone();
                let outcome = {
                    let scope = Scope {
                        ctx: RefCell::new(&mut *ctx),
                        classes,
                        headers,
                        top_level_by_package,
                        import_map,
                        current_package: &current_package,
                        current_class: symbol,
                        tyvar_scope: &tyvar_scope,
                    };
                    headc_const::evaluate(&expr, &scope)
                };
                let method_name = classes[&symbol].methods[mi].symbol.name(ctx.interner).to_string();
                let class_name = symbol.binary_name(ctx.interner).to_string();
                match outcome {
                    EvalOutcome::Value(v) => {
                        if const_matches_return(&v, &element_return) {
                            classes.get_mut(&symbol).unwrap().methods[mi].default_value = Some(v);
                        } else {
                            ctx.diagnostics.report(Diagnostic::error(
                                DiagnosticKind::BadAnnotationValue { annotation: class_name, element: method_name },
                                None,
                            ));
                        }
                    }
                    EvalOutcome::Unresolved(_) | EvalOutcome::NotAConstant(_) => {
                        ctx.diagnostics.report(Diagnostic::error(
                            DiagnosticKind::NotAConstant {
                                expr_description: format!("default value of {class_name}.{method_name}()"),
                            },
                            None,
                        ));
                    }
                }
            }
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn resolve_annotation_args(
    ctx: &mut BinderCtx,
    headers: &FxHashMap<ClassSymbol, Header>,
    top_level_by_package: &FxHashMap<PackageSymbol, Vec<ClassSymbol>>,
    import_map: &ImportMap,
    current_package: &str,
    current_class: ClassSymbol,
    tyvar_scope: &FxHashMap<String, TyVarSymbol>,
    classes: &FxHashMap<ClassSymbol, BoundClass>,
    annotation_class: ClassSymbol,
    raw_args: &[(Option<String>, Expr)],
) -> FxHashMap<String, Const> {
    let mut resolved = FxHashMap::default();
    for (name, expr) in raw_args {
        let element_name = name.clone().unwrap_or_else(|| "value".to_string());
        let outcome = {
            let scope = Scope {
                ctx: RefCell::new(&mut *ctx),
                classes,
                headers,
                top_level_by_package,
                import_map,
                current_package,
                current_class,
                tyvar_scope,
            };
            headc_const::evaluate(expr, &scope)
        };
        match outcome {
            EvalOutcome::Value(v) => {
                resolved.insert(element_name, v);
            }
            EvalOutcome::Unresolved(_) | EvalOutcome::NotAConstant(_) => {
                let annotation_name = annotation_class.binary_name(ctx.interner).to_string();
                ctx.diagnostics.report(Diagnostic::error(
                    DiagnosticKind::NotAConstant { expr_description: format!("@{annotation_name}.{element_name}") },
                    None,
                ));
            }
        }
    }
    resolved
}

/// Loose check that an evaluated constant's runtime kind matches the
/// annotation element's declared return type; does not attempt to validate
/// nested array/annotation element shapes against their own declared types.
fn const_matches_return(value: &Const, ty: &Type) -> bool {
    match (value, ty) {
        (Const::Boolean(_), Type::Prim(PrimKind::Boolean)) => true,
        (Const::Byte(_), Type::Prim(PrimKind::Byte)) => true,
        (Const::Short(_), Type::Prim(PrimKind::Short)) => true,
        (Const::Char(_), Type::Prim(PrimKind::Char)) => true,
        (Const::Int(_), Type::Prim(PrimKind::Int)) => true,
        (Const::Long(_), Type::Prim(PrimKind::Long)) => true,
        (Const::Float(_), Type::Prim(PrimKind::Float)) => true,
        (Const::Double(_), Type::Prim(PrimKind::Double)) => true,
        (Const::String(_), Type::Class(_)) => true,
        (Const::EnumRef(..), Type::Class(_)) => true,
        (Const::ClassLiteral(_), Type::Class(_)) => true,
        (Const::Annotation(_), Type::Class(_)) => true,
        (Const::Array(_), Type::Array(..)) => true,
        _ => false,
    }
}

/// The [`ConstScope`] the worklist hands to `headc_const::evaluate`. Wraps
/// the already-unique `&mut BinderCtx` in a `RefCell` since `ConstScope`'s
/// methods take `&self` but resolving a class literal's type, or walking a
/// classpath ancestor chain, needs the interner and class-path lookup mutably.
struct Scope<'b, 'c> {
    ctx: RefCell<&'b mut BinderCtx<'c>>,
    classes: &'b FxHashMap<ClassSymbol, BoundClass>,
    headers: &'b FxHashMap<ClassSymbol, Header>,
    top_level_by_package: &'b FxHashMap<PackageSymbol, Vec<ClassSymbol>>,
    import_map: &'b ImportMap,
    current_package: &'b str,
    current_class: ClassSymbol,
    tyvar_scope: &'b FxHashMap<String, TyVarSymbol>,
}

impl<'b, 'c> Scope<'b, 'c> {
    fn field_in_class_chain(&self, start: ClassSymbol, name: &str) -> Option<FieldSymbol> {
        let mut current = Some(start);
        let mut visited = rustc_hash::FxHashSet::default();
        while let Some(symbol) = current {
            if !visited.insert(symbol) {
                break;
            }
            if let Some(field) = self.field_in_class(symbol, name) {
                return Some(field);
            }
            current = self.super_of(symbol);
        }
        None
    }

    fn super_of(&self, symbol: ClassSymbol) -> Option<ClassSymbol> {
        if let Some(class) = self.classes.get(&symbol) {
            return class.super_class;
        }
        let mut guard = self.ctx.borrow_mut();
        let ctx: &mut BinderCtx = &mut **guard;
        // Extract the one field needed (an owned Copy value) so this borrow
        // of `ctx` ends here rather than staying tied to `bound` afterward.
        ctx.ensure_classpath_class(symbol).and_then(|bound| bound.super_class)
    }
}

impl<'b, 'c> ConstScope for Scope<'b, 'c> {
    fn resolve_name(&self, name: &str) -> Option<ConstRef> {
        let mut class = Some(self.current_class);
        while let Some(symbol) = class {
            if let Some(field) = self.field_in_class_chain(symbol, name) {
                return Some(ConstRef::Field(field));
            }
            class = match self.headers.get(&symbol) {
                Some(header) => match header.owner {
                    Owner::Class(outer) => Some(outer),
                    Owner::Package => None,
                },
                None => None,
            };
        }
        None
    }

    fn resolve_type_name(&self, dotted: &str) -> Option<ClassSymbol> {
        let first_dot = dotted.find('.');
        let head = match first_dot {
            Some(idx) => &dotted[..idx],
            None => dotted,
        };
        let mut guard = self.ctx.borrow_mut();
        let ctx: &mut BinderCtx = &mut **guard;
        let first = resolve_simple_type_name(
            ctx.interner,
            self.headers,
            self.top_level_by_package,
            self.import_map,
            self.current_package,
            Some(self.current_class),
            ctx.classpath,
            head,
        );
        if let TypeNameResolution::Resolved(mut sym) = first {
            if let Some(idx) = first_dot {
                for seg in dotted[idx + 1..].split('.') {
                    sym = find_member_type(ctx, self.headers, sym, seg)?;
                }
            }
            return Some(sym);
        }
        resolve_fully_qualified(ctx, self.headers, dotted)
    }

    fn field_in_class(&self, class: ClassSymbol, name: &str) -> Option<FieldSymbol> {
        if let Some(bound) = self.classes.get(&class) {
            let guard = self.ctx.borrow();
            let interner = &*guard.interner;
            return bound.fields.iter().find(|f| f.symbol.name(interner) == name).map(|f| f.symbol);
        }
        let mut guard = self.ctx.borrow_mut();
        let ctx: &mut BinderCtx = &mut **guard;
        // Collect owned symbols first so the borrow `ensure_classpath_class`
        // ties to the whole context ends before reborrowing `ctx.interner`.
        let field_symbols: Vec<FieldSymbol> = ctx.ensure_classpath_class(class)?.fields.iter().map(|f| f.symbol).collect();
        let interner = &*ctx.interner;
        field_symbols.into_iter().find(|f| f.name(interner) == name)
    }

    fn enum_constant_exists(&self, class: ClassSymbol, name: &str) -> bool {
        // Classpath-origin classes never carry enum constant names (C3
        // decodes field/method stubs only); cross-classpath enum constant
        // references in constant expressions cannot be resolved here.
        self.classes.get(&class).map(|bound| bound.declares_enum_constant(name)).unwrap_or(false)
    }

    fn field_status(&self, field: FieldSymbol) -> FieldConstStatus {
        let Some(bound) = self.classes.get(&field.owner) else {
            return FieldConstStatus::NotConstant;
        };
        let Some(bound_field) = bound.fields.iter().find(|f| f.symbol == field) else {
            return FieldConstStatus::NotConstant;
        };
        if bound_field.constant_value.is_some() {
            return FieldConstStatus::Ready;
        }
        let guard = self.ctx.borrow();
        let eligible =
            bound_field.access.contains(Modifiers::FINAL) && is_constant_eligible_type(&bound_field.ty, &**guard);
        if eligible && bound_field.initializer.is_some() {
            FieldConstStatus::Pending
        } else {
            FieldConstStatus::NotConstant
        }
    }

    fn field_value(&self, field: FieldSymbol) -> Option<Const> {
        self.classes.get(&field.owner)?.fields.iter().find(|f| f.symbol == field)?.constant_value.clone()
    }

    fn resolve_type(&self, ty: &TypeRefNode) -> Type {
        let mut guard = self.ctx.borrow_mut();
        let ctx: &mut BinderCtx = &mut **guard;
        resolve_type(
            ctx,
            self.headers,
            self.top_level_by_package,
            self.import_map,
            self.current_package,
            self.current_class,
            self.tyvar_scope,
            ty,
        )
    }
}
