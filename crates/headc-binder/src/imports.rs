//! Phase II — imports and package scope.
//!
//! Builds the per-compilation-unit import tables and implements the lookup
//! order a type or static member name is resolved through: enclosing type
//! chain, single-type imports, same package, on-demand imports, the
//! implicit `java.lang` root. Two on-demand imports contributing the same
//! simple name is only an [`DiagnosticKind::AmbiguousName`] if the name is
//! actually looked up, matching the worklist-free, demand-driven nature of
//! every other phase.

use headc_ast::ImportDecl;
use headc_core::{Diagnostic, DiagnosticKind, DiagnosticSink, Interner, SourceLocation};
use headc_symbols::{ClassSymbol, PackageSymbol};
use rustc_hash::FxHashMap;

use crate::classpath::ClassPathLookup;
use crate::namer::Header;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Import {
    TypeSingle { path: String },
    TypeStar { package: String },
    StaticSingle { ty: String, member: String },
    StaticStar { ty: String },
}

/// One compilation unit's import declarations, already classified.
#[derive(Default, Clone, Debug)]
pub struct ImportMap {
    pub imports: Vec<Import>,
    /// Simple name -> distinct fully-qualified dotted paths. More than one
    /// entry for the same name is reported eagerly (unlike on-demand
    /// ambiguity, a single-type import is always referenced by construction).
    type_singles: FxHashMap<String, Vec<String>>,
    static_singles: FxHashMap<String, Vec<String>>,
}

impl ImportMap {
    pub fn from_compilation_unit(
        cu: &headc_ast::CompilationUnit,
        diagnostics: &mut DiagnosticSink,
    ) -> Self {
        let mut map = ImportMap::default();
        for import in &cu.imports {
            map.add(import, cu, diagnostics);
        }
        map
    }

    fn add(&mut self, decl: &ImportDecl, cu: &headc_ast::CompilationUnit, diagnostics: &mut DiagnosticSink) {
        match (decl.is_static, decl.is_on_demand) {
            (false, false) => {
                let simple = simple_name(&decl.path);
                let entry = self.type_singles.entry(simple.to_string()).or_default();
                if !entry.contains(&decl.path) {
                    entry.push(decl.path.clone());
                }
                if entry.len() > 1 {
                    diagnostics.report(Diagnostic::error(
                        DiagnosticKind::AmbiguousName { name: simple.to_string() },
                        Some(loc(cu, decl.span)),
                    ));
                }
                self.imports.push(Import::TypeSingle { path: decl.path.clone() });
            }
            (false, true) => {
                self.imports.push(Import::TypeStar { package: decl.path.clone() });
            }
            (true, false) => {
                let (ty, member) = split_last(&decl.path);
                let entry = self.static_singles.entry(member.to_string()).or_default();
                if !entry.contains(&ty) {
                    entry.push(ty.clone());
                }
                if entry.len() > 1 {
                    diagnostics.report(Diagnostic::error(
                        DiagnosticKind::AmbiguousName { name: member.to_string() },
                        Some(loc(cu, decl.span)),
                    ));
                }
                self.imports.push(Import::StaticSingle { ty, member });
            }
            (true, true) => {
                self.imports.push(Import::StaticStar { ty: decl.path.clone() });
            }
        }
    }

    pub fn single_type_path(&self, simple_name: &str) -> Option<&str> {
        self.type_singles.get(simple_name).and_then(|v| v.first()).map(String::as_str)
    }

    pub fn type_stars(&self) -> impl Iterator<Item = &str> {
        self.imports.iter().filter_map(|i| match i {
            Import::TypeStar { package } => Some(package.as_str()),
            _ => None,
        })
    }

    pub fn static_single_owner(&self, member_name: &str) -> Option<&str> {
        self.static_singles.get(member_name).and_then(|v| v.first()).map(String::as_str)
    }

    pub fn static_stars(&self) -> impl Iterator<Item = &str> {
        self.imports.iter().filter_map(|i| match i {
            Import::StaticStar { ty } => Some(ty.as_str()),
            _ => None,
        })
    }
}

fn simple_name(dotted: &str) -> &str {
    dotted.rsplit('.').next().unwrap_or(dotted)
}

fn split_last(dotted: &str) -> (String, String) {
    match dotted.rsplit_once('.') {
        Some((ty, member)) => (ty.to_string(), member.to_string()),
        None => (String::new(), dotted.to_string()),
    }
}

fn loc(cu: &headc_ast::CompilationUnit, span: headc_core::Span) -> SourceLocation {
    SourceLocation {
        file: cu.source_path.clone().into(),
        line: 0,
        column: span.start,
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum TypeNameResolution {
    Resolved(ClassSymbol),
    Ambiguous,
    NotFound,
}

/// `java.lang`'s binary-name form, appended implicitly to on-demand import
/// resolution with the lowest priority.
const JAVA_LANG: &str = "java/lang";

/// Resolves a simple type name seen while binding `current_class` (or a
/// top-level name with no enclosing class) using the Phase II lookup order.
#[allow(clippy::too_many_arguments)]
pub fn resolve_simple_type_name(
    interner: &mut Interner,
    headers: &FxHashMap<ClassSymbol, Header>,
    top_level_by_package: &FxHashMap<PackageSymbol, Vec<ClassSymbol>>,
    import_map: &ImportMap,
    current_package: &str,
    current_class: Option<ClassSymbol>,
    classpath: &mut dyn ClassPathLookup,
    name: &str,
) -> TypeNameResolution {
    if let Some(found) = lookup_enclosing_chain(headers, current_class, name) {
        return TypeNameResolution::Resolved(found);
    }

    if let Some(path) = import_map.single_type_path(name) {
        if let Some(sym) = resolve_dotted_to_symbol(interner, headers, classpath, path) {
            return TypeNameResolution::Resolved(sym);
        }
    }

    let package_symbol = PackageSymbol::new(interner, current_package);
    if let Some(siblings) = top_level_by_package.get(&package_symbol) {
        if let Some(found) = siblings
            .iter()
            .copied()
            .find(|sym| sym.simple_name(interner) == name)
        {
            return TypeNameResolution::Resolved(found);
        }
    }

    let package_binary = current_package.replace('.', "/");
    let mut on_demand_hits: Vec<ClassSymbol> = Vec::new();
    for package in import_map.type_stars() {
        let package_binary = package.replace('.', "/");
        if let Some(sym) = probe_package_member(interner, headers, classpath, &package_binary, name) {
            if !on_demand_hits.contains(&sym) {
                on_demand_hits.push(sym);
            }
        }
    }
    // The compilation unit's own package is itself an implicit on-demand
    // import source for classpath-only siblings (ones no source file in
    // this run declares).
    if let Some(sym) = probe_package_member(interner, headers, classpath, &package_binary, name) {
        if !on_demand_hits.contains(&sym) {
            on_demand_hits.push(sym);
        }
    }

    match on_demand_hits.len() {
        1 => return TypeNameResolution::Resolved(on_demand_hits[0]),
        n if n > 1 => return TypeNameResolution::Ambiguous,
        _ => {}
    }

    if let Some(sym) = probe_package_member(interner, headers, classpath, JAVA_LANG, name) {
        return TypeNameResolution::Resolved(sym);
    }

    TypeNameResolution::NotFound
}

fn lookup_enclosing_chain(
    headers: &FxHashMap<ClassSymbol, Header>,
    current_class: Option<ClassSymbol>,
    name: &str,
) -> Option<ClassSymbol> {
    let mut cursor = current_class;
    while let Some(class) = cursor {
        let header = headers.get(&class)?;
        if let Some(found) = header
            .member_types
            .iter()
            .copied()
            .find(|m| headers.get(m).map(|h| h.simple_name.as_str()) == Some(name))
        {
            return Some(found);
        }
        cursor = match header.owner {
            crate::bound::Owner::Class(outer) => Some(outer),
            crate::bound::Owner::Package => None,
        };
    }
    None
}

fn probe_package_member(
    interner: &mut Interner,
    headers: &FxHashMap<ClassSymbol, Header>,
    classpath: &mut dyn ClassPathLookup,
    package_binary: &str,
    name: &str,
) -> Option<ClassSymbol> {
    let binary_name = if package_binary.is_empty() {
        name.to_string()
    } else {
        format!("{package_binary}/{name}")
    };
    let sym = ClassSymbol::new(interner, &binary_name);
    if headers.contains_key(&sym) || classpath.lookup(&binary_name).is_some() {
        Some(sym)
    } else {
        None
    }
}

/// Converts a dotted single-type-import path to a `ClassSymbol`, trying the
/// common case (the whole path names a top-level class) before falling back
/// to treating the final segment as a member type of the preceding class,
/// for direct imports of a nested type (`import a.b.Outer.Inner;`).
fn resolve_dotted_to_symbol(
    interner: &mut Interner,
    headers: &FxHashMap<ClassSymbol, Header>,
    classpath: &mut dyn ClassPathLookup,
    dotted: &str,
) -> Option<ClassSymbol> {
    let as_top_level = dotted.replace('.', "/");
    let direct = ClassSymbol::new(interner, &as_top_level);
    if headers.contains_key(&direct) || classpath.lookup(&as_top_level).is_some() {
        return Some(direct);
    }

    if let Some((prefix, last)) = dotted.rsplit_once('.') {
        let owner = resolve_dotted_to_symbol(interner, headers, classpath, prefix)?;
        let owner_binary = owner.binary_name(interner).to_string();
        let nested_binary = format!("{owner_binary}${last}");
        let nested = ClassSymbol::new(interner, &nested_binary);
        if headers.contains_key(&nested) || classpath.lookup(&nested_binary).is_some() {
            return Some(nested);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classpath::EmptyClassPath;
    use headc_ast::CompilationUnit;
    use headc_core::Span;

    fn cu(imports: Vec<ImportDecl>) -> CompilationUnit {
        CompilationUnit {
            source_path: "A.java".into(),
            package: Some("p".into()),
            imports,
            types: Vec::new(),
        }
    }

    fn import(path: &str, is_static: bool, is_on_demand: bool) -> ImportDecl {
        ImportDecl {
            path: path.to_string(),
            is_static,
            is_on_demand,
            span: Span::new(0, 1),
        }
    }

    #[test]
    fn classifies_all_four_import_shapes() {
        let mut diagnostics = DiagnosticSink::new();
        let unit = cu(vec![
            import("java.util.List", false, false),
            import("java.util", false, true),
            import("java.lang.Math.max", true, false),
            import("java.lang.Math", true, true),
        ]);
        let map = ImportMap::from_compilation_unit(&unit, &mut diagnostics);
        assert!(diagnostics.is_empty());
        assert!(map.imports.contains(&Import::TypeSingle { path: "java.util.List".into() }));
        assert!(map.imports.contains(&Import::TypeStar { package: "java.util".into() }));
        assert!(map.imports.contains(&Import::StaticSingle {
            ty: "java.lang.Math".into(),
            member: "max".into()
        }));
        assert!(map.imports.contains(&Import::StaticStar { ty: "java.lang.Math".into() }));
    }

    #[test]
    fn duplicate_identical_single_import_is_not_ambiguous() {
        let mut diagnostics = DiagnosticSink::new();
        let unit = cu(vec![import("java.util.List", false, false), import("java.util.List", false, false)]);
        ImportMap::from_compilation_unit(&unit, &mut diagnostics);
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn distinct_single_imports_of_same_name_are_ambiguous() {
        let mut diagnostics = DiagnosticSink::new();
        let unit = cu(vec![import("a.Foo", false, false), import("b.Foo", false, false)]);
        ImportMap::from_compilation_unit(&unit, &mut diagnostics);
        assert_eq!(diagnostics.len(), 1);
    }

    #[test]
    fn enclosing_chain_beats_everything_else() {
        let mut interner = Interner::new();
        let mut diagnostics = DiagnosticSink::new();
        let mut headers = FxHashMap::default();
        let outer = ClassSymbol::new(&mut interner, "p/Outer");
        let inner = ClassSymbol::new(&mut interner, "p/Outer$Inner");
        headers.insert(
            outer,
            Header {
                symbol: outer,
                kind: crate::bound::ClassKind::Class,
                access: headc_ast::Modifiers::empty(),
                owner: crate::bound::Owner::Package,
                simple_name: "Outer".into(),
                member_types: vec![inner],
                type_params: vec![],
                decl: std::rc::Rc::new(dummy_decl("Outer")),
                cu_index: 0,
                span: Span::new(0, 1),
                enum_constant_owner: None,
            },
        );
        headers.insert(
            inner,
            Header {
                symbol: inner,
                kind: crate::bound::ClassKind::Class,
                access: headc_ast::Modifiers::empty(),
                owner: crate::bound::Owner::Class(outer),
                simple_name: "Inner".into(),
                member_types: vec![],
                type_params: vec![],
                decl: std::rc::Rc::new(dummy_decl("Inner")),
                cu_index: 0,
                span: Span::new(0, 1),
                enum_constant_owner: None,
            },
        );
        let top_level_by_package = FxHashMap::default();
        let import_map = ImportMap::default();
        let mut classpath = EmptyClassPath;
        let resolved = resolve_simple_type_name(
            &mut interner,
            &headers,
            &top_level_by_package,
            &import_map,
            "p",
            Some(outer),
            &mut classpath,
            "Inner",
        );
        assert_eq!(resolved, TypeNameResolution::Resolved(inner));
        assert!(diagnostics.is_empty());
    }

    fn dummy_decl(name: &str) -> headc_ast::TypeDecl {
        headc_ast::TypeDecl {
            kind: headc_ast::TypeDeclKind::Class,
            modifiers: headc_ast::Modifiers::empty(),
            annotations: vec![],
            name: name.to_string(),
            type_params: vec![],
            superclass: None,
            interfaces: vec![],
            members: vec![],
            span: Span::new(0, 1),
        }
    }
}
