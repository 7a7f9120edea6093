//! Phase III — hierarchy.
//!
//! Resolves every class's declared superclass and interface *names* (type
//! arguments are not resolved yet; that's Phase IV) to [`ClassSymbol`]s,
//! detects cycles, and topologically orders source classes so every
//! superclass/interface precedes its subtype. That order governs Phase IV
//! and Phase V.

use headc_ast::{CompilationUnit, TypeDeclKind, TypeRefNode, TypeRefSegment};
use headc_core::{Diagnostic, DiagnosticKind, SourceLocation, Span};
use headc_symbols::{ClassSymbol, PackageSymbol};
use rustc_hash::FxHashMap;

use crate::bound::ClassKind;
use crate::ctx::BinderCtx;
use crate::imports::{resolve_simple_type_name, ImportMap, TypeNameResolution};
use crate::namer::Header;

#[derive(Clone, Debug, Default)]
pub struct HierarchyInfo {
    pub super_class: Option<ClassSymbol>,
    pub interfaces: Vec<ClassSymbol>,
}

pub struct HierarchyOutput {
    pub info: FxHashMap<ClassSymbol, HierarchyInfo>,
    pub order: Vec<ClassSymbol>,
}

pub fn resolve_hierarchy(
    ctx: &mut BinderCtx,
    headers: &FxHashMap<ClassSymbol, Header>,
    top_level_by_package: &FxHashMap<PackageSymbol, Vec<ClassSymbol>>,
    compilation_units: &[CompilationUnit],
    import_maps: &[ImportMap],
) -> HierarchyOutput {
    let mut info: FxHashMap<ClassSymbol, HierarchyInfo> = FxHashMap::default();
    let symbols = headers.keys().copied().collect::<Vec<_>>();

    for symbol in symbols {
        let header = &headers[&symbol];
        let cu = &compilation_units[header.cu_index];
        let current_package = cu.package.clone().unwrap_or_default();
        let import_map = &import_maps[header.cu_index];

        let mut interfaces = Vec::new();
        let super_class = match header.kind {
            ClassKind::Interface | ClassKind::Annotation => None,
            ClassKind::Enum => Some(well_known(ctx.interner, "java/lang/Enum")),
            ClassKind::Class => match &header.decl.superclass {
                Some(ty) => {
                    let resolved = resolve_class_ref(
                        ctx,
                        headers,
                        top_level_by_package,
                        import_map,
                        &current_package,
                        symbol,
                        ty,
                    );
                    if resolved.is_none() {
                        report_symbol_not_found(ctx, cu, ty.span(), type_ref_name(ty));
                    }
                    resolved
                }
                None => {
                    if symbol.binary_name(ctx.interner) == "java/lang/Object" {
                        None
                    } else {
                        Some(well_known(ctx.interner, "java/lang/Object"))
                    }
                }
            },
        };

        for ty in &header.decl.interfaces {
            let resolved = resolve_class_ref(
                ctx,
                headers,
                top_level_by_package,
                import_map,
                &current_package,
                symbol,
                ty,
            );
            match resolved {
                Some(sym) => interfaces.push(sym),
                None => report_symbol_not_found(ctx, cu, ty.span(), type_ref_name(ty)),
            }
        }
        if header.kind == ClassKind::Annotation {
            interfaces.push(well_known(ctx.interner, "java/lang/annotation/Annotation"));
        }

        info.insert(symbol, HierarchyInfo { super_class, interfaces });
    }

    break_cycles(ctx, headers, &mut info);
    let order = topo_order(headers, &info);

    HierarchyOutput { info, order }
}

fn well_known(interner: &mut headc_core::Interner, binary_name: &str) -> ClassSymbol {
    ClassSymbol::new(interner, binary_name)
}

fn type_ref_name(ty: &TypeRefNode) -> String {
    match ty {
        TypeRefNode::Class { segments, .. } => {
            segments.iter().map(|s| s.name.as_str()).collect::<Vec<_>>().join(".")
        }
        TypeRefNode::Primitive(..) => "<primitive>".to_string(),
        TypeRefNode::Void(_) => "void".to_string(),
        TypeRefNode::Array { .. } => "<array>".to_string(),
    }
}

fn report_symbol_not_found(ctx: &mut BinderCtx, cu: &CompilationUnit, span: Span, name: String) {
    ctx.diagnostics.report(Diagnostic::error(
        DiagnosticKind::SymbolNotFound { name },
        Some(SourceLocation {
            file: cu.source_path.clone().into(),
            line: 0,
            column: span.start,
        }),
    ));
}

/// Resolves a (possibly qualified or nested) class-type reference to a
/// symbol, per Phase II scope rules for the leading segment and member-type
/// lookup for the rest, falling back to treating the whole dotted chain as
/// a fully-qualified name if the leading segment isn't independently
/// visible (the common case for `import`-free fully qualified references).
pub fn resolve_class_ref(
    ctx: &mut BinderCtx,
    headers: &FxHashMap<ClassSymbol, Header>,
    top_level_by_package: &FxHashMap<PackageSymbol, Vec<ClassSymbol>>,
    import_map: &ImportMap,
    current_package: &str,
    current_class: ClassSymbol,
    ty: &TypeRefNode,
) -> Option<ClassSymbol> {
    let segments = match ty {
        TypeRefNode::Class { segments, .. } => segments,
        _ => return None,
    };
    resolve_segments(ctx, headers, top_level_by_package, import_map, current_package, current_class, segments)
}

fn resolve_segments(
    ctx: &mut BinderCtx,
    headers: &FxHashMap<ClassSymbol, Header>,
    top_level_by_package: &FxHashMap<PackageSymbol, Vec<ClassSymbol>>,
    import_map: &ImportMap,
    current_package: &str,
    current_class: ClassSymbol,
    segments: &[TypeRefSegment],
) -> Option<ClassSymbol> {
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
    if let TypeNameResolution::Resolved(mut sym) = first {
        for seg in &segments[1..] {
            sym = find_member_type(ctx, headers, sym, &seg.name)?;
        }
        return Some(sym);
    }

    let dotted = segments.iter().map(|s| s.name.as_str()).collect::<Vec<_>>().join(".");
    resolve_fully_qualified(ctx, headers, &dotted)
}

pub(crate) fn find_member_type(
    ctx: &mut BinderCtx,
    headers: &FxHashMap<ClassSymbol, Header>,
    owner: ClassSymbol,
    name: &str,
) -> Option<ClassSymbol> {
    if let Some(header) = headers.get(&owner) {
        return header
            .member_types
            .iter()
            .copied()
            .find(|m| headers.get(m).map(|h| h.simple_name.as_str()) == Some(name));
    }
    let bound = ctx.ensure_classpath_class(owner)?;
    bound
        .member_types
        .iter()
        .copied()
        .find(|m| m.simple_name(ctx.interner) == name)
}

pub(crate) fn resolve_fully_qualified(
    ctx: &mut BinderCtx,
    headers: &FxHashMap<ClassSymbol, Header>,
    dotted: &str,
) -> Option<ClassSymbol> {
    let as_top_level = dotted.replace('.', "/");
    let direct = ClassSymbol::new(ctx.interner, &as_top_level);
    if headers.contains_key(&direct) || ctx.classpath.lookup(&as_top_level).is_some() {
        return Some(direct);
    }
    let (prefix, last) = dotted.rsplit_once('.')?;
    let owner = resolve_fully_qualified(ctx, headers, prefix)?;
    find_member_type(ctx, headers, owner, last)
}

/// Detects cycles by DFS over source-class `super_class`/`interfaces` edges
/// and reports [`DiagnosticKind::CyclicHierarchy`] for every class on a
/// cycle, then breaks it by dropping the cyclic super/interface edges so
/// Phase IV can still terminate.
fn break_cycles(ctx: &mut BinderCtx, headers: &FxHashMap<ClassSymbol, Header>, info: &mut FxHashMap<ClassSymbol, HierarchyInfo>) {
    #[derive(Copy, Clone, PartialEq, Eq)]
    enum Color {
        White,
        Gray,
        Black,
    }
    let mut color: FxHashMap<ClassSymbol, Color> = headers.keys().map(|&s| (s, Color::White)).collect();
    let mut stack: Vec<ClassSymbol> = Vec::new();
    let mut cyclic: rustc_hash::FxHashSet<ClassSymbol> = rustc_hash::FxHashSet::default();

    let symbols = headers.keys().copied().collect::<Vec<_>>();
    for start in symbols {
        if color[&start] != Color::White {
            continue;
        }
        visit(start, headers, info, &mut color, &mut stack, &mut cyclic);
    }

    for symbol in &cyclic {
        ctx.diagnostics.report(Diagnostic::error(
            DiagnosticKind::CyclicHierarchy { class: symbol.binary_name(ctx.interner).to_string() },
            None,
        ));
        if let Some(hinfo) = info.get_mut(symbol) {
            if hinfo.super_class.map(|s| headers.contains_key(&s) && cyclic.contains(&s)) == Some(true) {
                hinfo.super_class = None;
            }
            hinfo.interfaces.retain(|i| !(headers.contains_key(i) && cyclic.contains(i)));
        }
    }

    fn visit(
        node: ClassSymbol,
        headers: &FxHashMap<ClassSymbol, Header>,
        info: &FxHashMap<ClassSymbol, HierarchyInfo>,
        color: &mut FxHashMap<ClassSymbol, Color>,
        stack: &mut Vec<ClassSymbol>,
        cyclic: &mut rustc_hash::FxHashSet<ClassSymbol>,
    ) {
        color.insert(node, Color::Gray);
        stack.push(node);
        if let Some(hinfo) = info.get(&node) {
            let mut edges = hinfo.interfaces.clone();
            edges.extend(hinfo.super_class);
            for edge in edges {
                if !headers.contains_key(&edge) {
                    continue;
                }
                match color.get(&edge).copied().unwrap_or(Color::White) {
                    Color::White => visit(edge, headers, info, color, stack, cyclic),
                    Color::Gray => {
                        if let Some(pos) = stack.iter().position(|s| *s == edge) {
                            for member in &stack[pos..] {
                                cyclic.insert(*member);
                            }
                        }
                    }
                    Color::Black => {}
                }
            }
        }
        stack.pop();
        color.insert(node, Color::Black);
    }
}

fn topo_order(headers: &FxHashMap<ClassSymbol, Header>, info: &FxHashMap<ClassSymbol, HierarchyInfo>) -> Vec<ClassSymbol> {
    let mut visited: rustc_hash::FxHashSet<ClassSymbol> = rustc_hash::FxHashSet::default();
    let mut order = Vec::with_capacity(headers.len());

    fn visit(
        node: ClassSymbol,
        headers: &FxHashMap<ClassSymbol, Header>,
        info: &FxHashMap<ClassSymbol, HierarchyInfo>,
        visited: &mut rustc_hash::FxHashSet<ClassSymbol>,
        order: &mut Vec<ClassSymbol>,
    ) {
        if !visited.insert(node) {
            return;
        }
        if let Some(hinfo) = info.get(&node) {
            if let Some(sup) = hinfo.super_class {
                if headers.contains_key(&sup) {
                    visit(sup, headers, info, visited, order);
                }
            }
            for iface in &hinfo.interfaces {
                if headers.contains_key(iface) {
                    visit(*iface, headers, info, visited, order);
                }
            }
        }
        order.push(node);
    }

    // Deterministic source order: iterate declaration order via cu_index
    // then the map's natural header order for classes within one CU isn't
    // guaranteed, so fall back to sorting by binary name is avoided (it
    // would require the interner); the namer inserts headers CU-by-CU,
    // member-then-enclosing, which already gives a stable enough seed order
    // for everything the topo sort doesn't otherwise constrain.
    let mut seeds = headers.keys().copied().collect::<Vec<_>>();
    seeds.sort_by_key(|s| headers[s].cu_index);
    for seed in seeds {
        visit(seed, headers, info, &mut visited, &mut order);
    }

    order
}

#[allow(unused)]
fn unused_decl_kind_guard(_: TypeDeclKind) {}
