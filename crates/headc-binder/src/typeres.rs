//! Phase IV — type resolution.
//!
//! Resolves type-parameter bounds, field and method signatures, supertype
//! type arguments, and annotation uses to `headc_symbols::Type` /
//! `AnnotationUse`. Runs in Phase III's topological order so an enclosing
//! class's type parameters are already known before anything that might
//! reference them.
//!
//! Method type parameters are identified by a descriptor computed from a
//! preliminary resolution pass (`raw_descriptor`) that does not consult the
//! type-variable scope at all: a bare name that isn't a visible class or
//! interface is simply assumed to be a type variable and erases to
//! `java/lang/Object`. That matches JVMS erasure for an unbounded type
//! variable but not for one with an explicit class bound used directly as a
//! parameter type (`<T extends Number> void m(T t)` erases to
//! `(Ljava/lang/Object;)V` here rather than `(Ljava/lang/Number;)V`); fixing
//! that would need a full first-bound pass ordered ahead of signature
//! resolution, which headc does not attempt.

use headc_ast::{
    AnnotationUseNode, CompilationUnit, Expr, FieldDecl, MemberDecl, MethodDecl, PrimitiveKind, TypeArgNode,
    TypeParamNode, TypeRefNode, WildcardBoundNode,
};
use headc_symbols::{
    AnnotationUse, ClassSymbol, ClassTySegment, FieldSymbol, MethodSymbol, PackageSymbol, PrimKind, Type,
    TyVarOwner, TyVarSymbol, WildKind,
};
use rustc_hash::FxHashMap;

use crate::bound::{BoundClass, BoundField, BoundMethod, BoundParam, ClassKind, Origin, Owner, Retention, TypeParamBound};
use crate::ctx::BinderCtx;
use crate::hierarchy::{find_member_type, resolve_class_ref, resolve_fully_qualified, HierarchyInfo};
use crate::imports::{resolve_simple_type_name, ImportMap, TypeNameResolution};
use crate::namer::Header;

pub fn resolve_types(
    ctx: &mut BinderCtx,
    headers: &FxHashMap<ClassSymbol, Header>,
    top_level_by_package: &FxHashMap<PackageSymbol, Vec<ClassSymbol>>,
    compilation_units: &[CompilationUnit],
    import_maps: &[ImportMap],
    hierarchy: &FxHashMap<ClassSymbol, HierarchyInfo>,
    order: &[ClassSymbol],
) -> FxHashMap<ClassSymbol, BoundClass> {
    let mut classes = FxHashMap::default();
    for &symbol in order {
        let header = &headers[&symbol];
        let cu = &compilation_units[header.cu_index];
        let import_map = &import_maps[header.cu_index];
        let bound = resolve_one_class(ctx, headers, top_level_by_package, cu, import_map, hierarchy, header);
        classes.insert(symbol, bound);
    }
    classes
}

pub(crate) fn tyvar_scope_for_class(headers: &FxHashMap<ClassSymbol, Header>, symbol: ClassSymbol) -> FxHashMap<String, TyVarSymbol> {
    let mut chain = Vec::new();
    let mut cur = Some(symbol);
    while let Some(s) = cur {
        let Some(h) = headers.get(&s) else { break };
        chain.push(h);
        cur = match h.owner {
            Owner::Class(outer) => Some(outer),
            Owner::Package => None,
        };
    }
    let mut scope = FxHashMap::default();
    for h in chain.into_iter().rev() {
        for (i, tp) in h.decl.type_params.iter().enumerate() {
            scope.insert(tp.name.clone(), h.type_params[i]);
        }
    }
    scope
}

fn map_prim(p: PrimitiveKind) -> PrimKind {
    match p {
        PrimitiveKind::Boolean => PrimKind::Boolean,
        PrimitiveKind::Byte => PrimKind::Byte,
        PrimitiveKind::Char => PrimKind::Char,
        PrimitiveKind::Short => PrimKind::Short,
        PrimitiveKind::Int => PrimKind::Int,
        PrimitiveKind::Long => PrimKind::Long,
        PrimitiveKind::Float => PrimKind::Float,
        PrimitiveKind::Double => PrimKind::Double,
    }
}

#[allow(clippy::too_many_arguments)]
pub(crate) fn resolve_type(
    ctx: &mut BinderCtx,
    headers: &FxHashMap<ClassSymbol, Header>,
    top_level_by_package: &FxHashMap<PackageSymbol, Vec<ClassSymbol>>,
    import_map: &ImportMap,
    current_package: &str,
    current_class: ClassSymbol,
    tyvar_scope: &FxHashMap<String, TyVarSymbol>,
    ty: &TypeRefNode,
) -> Type {
    match ty {
        TypeRefNode::Primitive(p, _) => Type::Prim(map_prim(*p)),
        TypeRefNode::Void(_) => Type::Void,
        TypeRefNode::Array { element, .. } => Type::array_of(resolve_type(
            ctx,
            headers,
            top_level_by_package,
            import_map,
            current_package,
            current_class,
            tyvar_scope,
            element,
        )),
        TypeRefNode::Class { segments, .. } => {
            if segments.len() == 1 && segments[0].type_args.is_empty() {
                if let Some(tv) = tyvar_scope.get(&segments[0].name) {
                    return Type::TyVar(*tv, Vec::new());
                }
            }

            let first = resolve_simple_type_name(
                ctx.interner,
                headers,
                top_level_by_package,
                import_map,
                current_package,
                Some(current_class),
                ctx.classpath,
                &segments[0].name,
            );
            if let TypeNameResolution::Resolved(first_sym) = first {
                let mut syms = vec![first_sym];
                let mut ok = true;
                for seg in &segments[1..] {
                    match find_member_type(ctx, headers, *syms.last().unwrap(), &seg.name) {
                        Some(s) => syms.push(s),
                        None => {
                            ok = false;
                            break;
                        }
                    }
                }
                if ok {
                    let mut class_segments = Vec::with_capacity(syms.len());
                    for (sym, seg) in syms.iter().zip(segments.iter()) {
                        let type_args = resolve_type_args(
                            ctx,
                            headers,
                            top_level_by_package,
                            import_map,
                            current_package,
                            current_class,
                            tyvar_scope,
                            &seg.type_args,
                        );
                        class_segments.push(ClassTySegment { class: *sym, type_args, annotations: Vec::new() });
                    }
                    return Type::as_class_ty(class_segments);
                }
            }

            let dotted = segments.iter().map(|s| s.name.as_str()).collect::<Vec<_>>().join(".");
            match resolve_fully_qualified(ctx, headers, &dotted) {
                Some(sym) => {
                    let type_args = resolve_type_args(
                        ctx,
                        headers,
                        top_level_by_package,
                        import_map,
                        current_package,
                        current_class,
                        tyvar_scope,
                        &segments.last().unwrap().type_args,
                    );
                    Type::Class(vec![ClassTySegment { class: sym, type_args, annotations: Vec::new() }])
                }
                None => Type::as_non_parameterized_class_ty(ClassSymbol::error_sentinel(ctx.interner)),
            }
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn resolve_type_args(
    ctx: &mut BinderCtx,
    headers: &FxHashMap<ClassSymbol, Header>,
    top_level_by_package: &FxHashMap<PackageSymbol, Vec<ClassSymbol>>,
    import_map: &ImportMap,
    current_package: &str,
    current_class: ClassSymbol,
    tyvar_scope: &FxHashMap<String, TyVarSymbol>,
    args: &[TypeArgNode],
) -> Vec<Type> {
    let mut out = Vec::with_capacity(args.len());
    for arg in args {
        out.push(match arg {
            TypeArgNode::Type(ty) => resolve_type(
                ctx,
                headers,
                top_level_by_package,
                import_map,
                current_package,
                current_class,
                tyvar_scope,
                ty,
            ),
            TypeArgNode::Wildcard { bound: None, .. } => Type::Wild(WildKind::Unbounded, Vec::new()),
            TypeArgNode::Wildcard { bound: Some(WildcardBoundNode::Extends(ty)), .. } => Type::Wild(
                WildKind::Extends(Box::new(resolve_type(
                    ctx,
                    headers,
                    top_level_by_package,
                    import_map,
                    current_package,
                    current_class,
                    tyvar_scope,
                    ty,
                ))),
                Vec::new(),
            ),
            TypeArgNode::Wildcard { bound: Some(WildcardBoundNode::Super(ty)), .. } => Type::Wild(
                WildKind::Super(Box::new(resolve_type(
                    ctx,
                    headers,
                    top_level_by_package,
                    import_map,
                    current_package,
                    current_class,
                    tyvar_scope,
                    ty,
                ))),
                Vec::new(),
            ),
        });
    }
    out
}

#[allow(clippy::too_many_arguments)]
fn raw_descriptor(
    ctx: &mut BinderCtx,
    headers: &FxHashMap<ClassSymbol, Header>,
    top_level_by_package: &FxHashMap<PackageSymbol, Vec<ClassSymbol>>,
    import_map: &ImportMap,
    current_package: &str,
    current_class: ClassSymbol,
    ty: &TypeRefNode,
) -> String {
    match ty {
        TypeRefNode::Primitive(p, _) => raw_prim_letter(*p).to_string(),
        TypeRefNode::Void(_) => "V".to_string(),
        TypeRefNode::Array { element, .. } => format!(
            "[{}",
            raw_descriptor(ctx, headers, top_level_by_package, import_map, current_package, current_class, element)
        ),
        TypeRefNode::Class { .. } => {
            match resolve_class_ref(ctx, headers, top_level_by_package, import_map, current_package, current_class, ty) {
                Some(sym) => format!("L{};", sym.binary_name(ctx.interner)),
                None => "Ljava/lang/Object;".to_string(),
            }
        }
    }
}

fn raw_prim_letter(p: PrimitiveKind) -> char {
    match p {
        PrimitiveKind::Boolean => 'Z',
        PrimitiveKind::Byte => 'B',
        PrimitiveKind::Char => 'C',
        PrimitiveKind::Short => 'S',
        PrimitiveKind::Int => 'I',
        PrimitiveKind::Long => 'J',
        PrimitiveKind::Float => 'F',
        PrimitiveKind::Double => 'D',
    }
}

#[allow(clippy::too_many_arguments)]
fn method_raw_descriptor(
    ctx: &mut BinderCtx,
    headers: &FxHashMap<ClassSymbol, Header>,
    top_level_by_package: &FxHashMap<PackageSymbol, Vec<ClassSymbol>>,
    import_map: &ImportMap,
    current_package: &str,
    current_class: ClassSymbol,
    decl: &MethodDecl,
) -> String {
    let mut params = String::new();
    for p in &decl.params {
        params.push_str(&raw_descriptor(
            ctx,
            headers,
            top_level_by_package,
            import_map,
            current_package,
            current_class,
            &p.ty,
        ));
    }
    let ret = match &decl.return_type {
        Some(t) => raw_descriptor(ctx, headers, top_level_by_package, import_map, current_package, current_class, t),
        None => "V".to_string(),
    };
    format!("({params}){ret}")
}

fn class_kind_of(ctx: &mut BinderCtx, headers: &FxHashMap<ClassSymbol, Header>, symbol: ClassSymbol) -> Option<ClassKind> {
    if let Some(h) = headers.get(&symbol) {
        return Some(h.kind);
    }
    ctx.ensure_classpath_class(symbol).map(|b| b.kind)
}

#[allow(clippy::too_many_arguments)]
fn resolve_type_param_bounds(
    ctx: &mut BinderCtx,
    headers: &FxHashMap<ClassSymbol, Header>,
    top_level_by_package: &FxHashMap<PackageSymbol, Vec<ClassSymbol>>,
    import_map: &ImportMap,
    current_package: &str,
    current_class: ClassSymbol,
    tyvar_scope: &FxHashMap<String, TyVarSymbol>,
    type_params: &[TypeParamNode],
    symbols: &[TyVarSymbol],
) -> Vec<TypeParamBound> {
    let mut out = Vec::with_capacity(type_params.len());
    for (tp, sym) in type_params.iter().zip(symbols.iter()) {
        if tp.bounds.is_empty() {
            out.push(TypeParamBound { symbol: *sym, class_bound: None, interface_bounds: Vec::new() });
            continue;
        }
        let mut resolved_bounds = Vec::with_capacity(tp.bounds.len());
        for b in &tp.bounds {
            resolved_bounds.push(resolve_type(
                ctx,
                headers,
                top_level_by_package,
                import_map,
                current_package,
                current_class,
                tyvar_scope,
                b,
            ));
        }
        let first = resolved_bounds.remove(0);
        let first_is_interface =
            first.class_symbol().and_then(|s| class_kind_of(ctx, headers, s)) == Some(ClassKind::Interface);
        let (class_bound, mut interface_bounds) =
            if first_is_interface { (None, vec![first]) } else { (Some(first), Vec::new()) };
        interface_bounds.extend(resolved_bounds);
        out.push(TypeParamBound { symbol: *sym, class_bound, interface_bounds });
    }
    out
}

#[allow(clippy::too_many_arguments)]
fn resolve_annotation_use(
    ctx: &mut BinderCtx,
    headers: &FxHashMap<ClassSymbol, Header>,
    top_level_by_package: &FxHashMap<PackageSymbol, Vec<ClassSymbol>>,
    import_map: &ImportMap,
    current_package: &str,
    current_class: ClassSymbol,
    tyvar_scope: &FxHashMap<String, TyVarSymbol>,
    node: &AnnotationUseNode,
) -> AnnotationUse {
    let ty = resolve_type(
        ctx,
        headers,
        top_level_by_package,
        import_map,
        current_package,
        current_class,
        tyvar_scope,
        &node.type_ref,
    );
    let class = ty.class_symbol().unwrap_or_else(|| ClassSymbol::error_sentinel(ctx.interner));
    AnnotationUse::unresolved(class, node.args.clone())
}

#[allow(clippy::too_many_arguments)]
fn resolve_field(
    ctx: &mut BinderCtx,
    headers: &FxHashMap<ClassSymbol, Header>,
    top_level_by_package: &FxHashMap<PackageSymbol, Vec<ClassSymbol>>,
    import_map: &ImportMap,
    current_package: &str,
    current_class: ClassSymbol,
    tyvar_scope: &FxHashMap<String, TyVarSymbol>,
    owner: ClassSymbol,
    decl: &FieldDecl,
) -> BoundField {
    let ty = resolve_type(
        ctx,
        headers,
        top_level_by_package,
        import_map,
        current_package,
        current_class,
        tyvar_scope,
        &decl.ty,
    );
    let mut annotations = Vec::with_capacity(decl.annotations.len());
    for a in &decl.annotations {
        annotations.push(resolve_annotation_use(
            ctx,
            headers,
            top_level_by_package,
            import_map,
            current_package,
            current_class,
            tyvar_scope,
            a,
        ));
    }
    BoundField {
        symbol: FieldSymbol::new(ctx.interner, owner, &decl.name),
        ty,
        access: decl.modifiers,
        annotations,
        declaration_span: decl.span,
        initializer: decl.initializer.clone(),
        constant_value: None,
    }
}

#[allow(clippy::too_many_arguments)]
fn resolve_method(
    ctx: &mut BinderCtx,
    headers: &FxHashMap<ClassSymbol, Header>,
    top_level_by_package: &FxHashMap<PackageSymbol, Vec<ClassSymbol>>,
    import_map: &ImportMap,
    current_package: &str,
    current_class: ClassSymbol,
    class_tyvar_scope: &FxHashMap<String, TyVarSymbol>,
    owner: ClassSymbol,
    decl: &MethodDecl,
) -> BoundMethod {
    let is_ctor = decl.return_type.is_none();
    let method_name = if is_ctor { "<init>".to_string() } else { decl.name.clone() };
    let descriptor = method_raw_descriptor(
        ctx,
        headers,
        top_level_by_package,
        import_map,
        current_package,
        current_class,
        decl,
    );
    let method_symbol = MethodSymbol::new(ctx.interner, owner, &method_name, &descriptor);

    let method_tyvar_symbols: Vec<TyVarSymbol> = decl
        .type_params
        .iter()
        .map(|tp| TyVarSymbol::new(ctx.interner, TyVarOwner::Method(method_symbol), &tp.name))
        .collect();
    let mut scope = class_tyvar_scope.clone();
    for (tp, sym) in decl.type_params.iter().zip(method_tyvar_symbols.iter()) {
        scope.insert(tp.name.clone(), *sym);
    }

    let type_params = resolve_type_param_bounds(
        ctx,
        headers,
        top_level_by_package,
        import_map,
        current_package,
        current_class,
        &scope,
        &decl.type_params,
        &method_tyvar_symbols,
    );

    let mut params = Vec::with_capacity(decl.params.len());
    for p in &decl.params {
        let ty = resolve_type(
            ctx,
            headers,
            top_level_by_package,
            import_map,
            current_package,
            current_class,
            &scope,
            &p.ty,
        );
        let mut annotations = Vec::with_capacity(p.annotations.len());
        for a in &p.annotations {
            annotations.push(resolve_annotation_use(
                ctx,
                headers,
                top_level_by_package,
                import_map,
                current_package,
                current_class,
                &scope,
                a,
            ));
        }
        params.push(BoundParam { ty, name: p.name.clone(), annotations, is_synthetic: false });
    }

    let return_type = match &decl.return_type {
        Some(t) => resolve_type(ctx, headers, top_level_by_package, import_map, current_package, current_class, &scope, t),
        None => Type::Void,
    };

    let mut thrown = Vec::with_capacity(decl.thrown.len());
    for t in &decl.thrown {
        thrown.push(resolve_type(ctx, headers, top_level_by_package, import_map, current_package, current_class, &scope, t));
    }

    let mut annotations = Vec::with_capacity(decl.annotations.len());
    for a in &decl.annotations {
        annotations.push(resolve_annotation_use(
            ctx,
            headers,
            top_level_by_package,
            import_map,
            current_package,
            current_class,
            &scope,
            a,
        ));
    }

    BoundMethod {
        symbol: method_symbol,
        type_params,
        return_type,
        params,
        thrown,
        access: decl.modifiers,
        annotations,
        declaration_span: decl.span,
        default_value_raw: decl.default_value.clone(),
        default_value: None,
        is_synthetic: false,
    }
}

fn retention_policy_name(expr: &Expr) -> Option<String> {
    match expr {
        Expr::FieldAccess { name, .. } => Some(name.clone()),
        Expr::Name(name, _) => Some(name.clone()),
        Expr::Paren(inner, _) => retention_policy_name(inner),
        _ => None,
    }
}

fn extract_retention(interner: &headc_core::Interner, annotations: &[AnnotationUse]) -> Option<Retention> {
    for a in annotations {
        if a.annotation_class.binary_name(interner) != "java/lang/annotation/Retention" {
            continue;
        }
        if let Some((_, expr)) = a.raw_args.first() {
            if let Some(policy) = retention_policy_name(expr) {
                return Some(match policy.as_str() {
                    "RUNTIME" => Retention::Runtime,
                    "CLASS" => Retention::Class,
                    _ => Retention::Source,
                });
            }
        }
    }
    None
}

fn resolve_one_class(
    ctx: &mut BinderCtx,
    headers: &FxHashMap<ClassSymbol, Header>,
    top_level_by_package: &FxHashMap<PackageSymbol, Vec<ClassSymbol>>,
    cu: &CompilationUnit,
    import_map: &ImportMap,
    hierarchy: &FxHashMap<ClassSymbol, HierarchyInfo>,
    header: &Header,
) -> BoundClass {
    let symbol = header.symbol;
    let current_package = cu.package.clone().unwrap_or_default();
    let tyvar_scope = tyvar_scope_for_class(headers, symbol);
    let hinfo = hierarchy.get(&symbol).cloned().unwrap_or_default();

    let type_param_bounds = resolve_type_param_bounds(
        ctx,
        headers,
        top_level_by_package,
        import_map,
        &current_package,
        symbol,
        &tyvar_scope,
        &header.decl.type_params,
        &header.type_params,
    );

    let super_class_type = match &header.decl.superclass {
        Some(ty) => Some(resolve_type(
            ctx,
            headers,
            top_level_by_package,
            import_map,
            &current_package,
            symbol,
            &tyvar_scope,
            ty,
        )),
        None => hinfo.super_class.map(Type::as_non_parameterized_class_ty),
    };

    let mut interface_types: Vec<Type> = Vec::with_capacity(header.decl.interfaces.len());
    for ty in &header.decl.interfaces {
        interface_types.push(resolve_type(
            ctx,
            headers,
            top_level_by_package,
            import_map,
            &current_package,
            symbol,
            &tyvar_scope,
            ty,
        ));
    }
    if header.kind == ClassKind::Annotation {
        if let Some(&extra) = hinfo.interfaces.last() {
            interface_types.push(Type::as_non_parameterized_class_ty(extra));
        }
    }

    let mut fields = Vec::new();
    let mut methods = Vec::new();
    let mut enum_constants = Vec::new();
    for member in &header.decl.members {
        match member {
            MemberDecl::Field(f) => fields.push(resolve_field(
                ctx,
                headers,
                top_level_by_package,
                import_map,
                &current_package,
                symbol,
                &tyvar_scope,
                symbol,
                f,
            )),
            MemberDecl::Method(m) => methods.push(resolve_method(
                ctx,
                headers,
                top_level_by_package,
                import_map,
                &current_package,
                symbol,
                &tyvar_scope,
                symbol,
                m,
            )),
            MemberDecl::NestedType(_) => {}
            MemberDecl::EnumConstant(ec) => enum_constants.push(ec.name.clone()),
        }
    }

    let mut annotations = Vec::with_capacity(header.decl.annotations.len());
    for a in &header.decl.annotations {
        annotations.push(resolve_annotation_use(
            ctx,
            headers,
            top_level_by_package,
            import_map,
            &current_package,
            symbol,
            &tyvar_scope,
            a,
        ));
    }

    let retention = if header.kind == ClassKind::Annotation {
        Some(extract_retention(ctx.interner, &annotations).unwrap_or(Retention::Class))
    } else {
        None
    };

    BoundClass {
        symbol,
        kind: header.kind,
        access: header.access,
        owner: header.owner,
        simple_name: header.simple_name.clone(),
        member_types: header.member_types.clone(),
        type_params: header.type_params.clone(),
        origin: Origin::Source,
        declaration_span: header.span,
        super_class: hinfo.super_class,
        interfaces: hinfo.interfaces.clone(),
        type_param_bounds,
        super_class_type,
        interface_types,
        fields,
        methods,
        annotations,
        retention,
        enum_constants,
    }
}
