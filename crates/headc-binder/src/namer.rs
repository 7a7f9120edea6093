//! Phase I — canonical naming.
//!
//! Assigns a [`ClassSymbol`] to every type declaration in every compilation
//! unit, including member types and the anonymous bodies enum constants may
//! carry. Enforces uniqueness of top-level names per package and of member
//! names per enclosing class, reporting [`DiagnosticKind::DuplicateType`] on
//! collision. Does not look at superclass/interface names or member
//! signatures at all; that is Phase III/IV's job.

use headc_ast::{CompilationUnit, EnumConstantDecl, MemberDecl, TypeDecl, TypeDeclKind};
use headc_core::{Diagnostic, DiagnosticKind, DiagnosticSink, Interner};
use headc_symbols::{ClassSymbol, PackageSymbol, TyVarOwner, TyVarSymbol};
use rustc_hash::{FxHashMap, FxHashSet};
use std::rc::Rc;

use crate::bound::{ClassKind, Owner};

/// Phase I's record for one type declaration. Immutable afterwards; later
/// phases read `decl` to resolve the rest.
pub struct Header {
    pub symbol: ClassSymbol,
    pub kind: ClassKind,
    pub access: headc_ast::Modifiers,
    pub owner: Owner,
    pub simple_name: String,
    pub member_types: Vec<ClassSymbol>,
    pub type_params: Vec<TyVarSymbol>,
    pub decl: Rc<TypeDecl>,
    pub cu_index: usize,
    pub span: headc_core::Span,
    /// `None` for an ordinary declared type; `Some` for a synthesized
    /// anonymous class body attached to an enum constant.
    pub enum_constant_owner: Option<ClassSymbol>,
}

pub struct NamerOutput {
    pub headers: FxHashMap<ClassSymbol, Header>,
    pub top_level_by_package: FxHashMap<PackageSymbol, Vec<ClassSymbol>>,
    pub compilation_units: Vec<CompilationUnit>,
}

pub fn name_compilation_units(
    interner: &mut Interner,
    units: Vec<CompilationUnit>,
    diagnostics: &mut DiagnosticSink,
) -> NamerOutput {
    let mut headers = FxHashMap::default();
    let mut top_level_by_package: FxHashMap<PackageSymbol, Vec<ClassSymbol>> = FxHashMap::default();
    let mut top_level_names: FxHashMap<String, FxHashSet<String>> = FxHashMap::default();

    for (cu_index, cu) in units.iter().enumerate() {
        let package_dotted = cu.package.clone().unwrap_or_default();
        let package_binary = package_dotted.replace('.', "/");
        let package_symbol = PackageSymbol::new(interner, &package_dotted);
        let seen = top_level_names.entry(package_dotted.clone()).or_default();

        for decl in &cu.types {
            if !seen.insert(decl.name.clone()) {
                diagnostics.report(Diagnostic::error(
                    DiagnosticKind::DuplicateType { name: decl.name.clone() },
                    Some(location(cu, decl.span)),
                ));
                continue;
            }
            let symbol = name_type_decl(
                interner,
                cu_index,
                cu,
                Owner::Package,
                &package_binary,
                decl,
                None,
                &mut headers,
                diagnostics,
            );
            top_level_by_package.entry(package_symbol).or_default().push(symbol);
        }
    }

    NamerOutput {
        headers,
        top_level_by_package,
        compilation_units: units,
    }
}

fn location(cu: &CompilationUnit, span: headc_core::Span) -> headc_core::SourceLocation {
    // The binder has no source text at hand (an external parser owns it), so
    // only the file path and raw span start are reported; a caller that
    // keeps the original `SourceFile` around can re-derive line/column.
    headc_core::SourceLocation {
        file: cu.source_path.clone().into(),
        line: 0,
        column: span.start,
    }
}

#[allow(clippy::too_many_arguments)]
fn name_type_decl(
    interner: &mut Interner,
    cu_index: usize,
    cu: &CompilationUnit,
    owner: Owner,
    owner_binary_name: &str,
    decl: &TypeDecl,
    enum_constant_owner: Option<ClassSymbol>,
    headers: &mut FxHashMap<ClassSymbol, Header>,
    diagnostics: &mut DiagnosticSink,
) -> ClassSymbol {
    let binary_name = if owner_binary_name.is_empty() {
        decl.name.clone()
    } else {
        format!("{owner_binary_name}${}", decl.name)
    };
    let symbol = ClassSymbol::new(interner, &binary_name);

    let type_params = decl
        .type_params
        .iter()
        .map(|tp| TyVarSymbol::new(interner, TyVarOwner::Class(symbol), &tp.name))
        .collect::<Vec<_>>();

    let mut member_names: FxHashSet<String> = FxHashSet::default();
    let mut member_types = Vec::new();

    for member in &decl.members {
        if let MemberDecl::NestedType(nested) = member {
            if !member_names.insert(nested.name.clone()) {
                diagnostics.report(Diagnostic::error(
                    DiagnosticKind::DuplicateType { name: nested.name.clone() },
                    Some(location(cu, nested.span)),
                ));
                continue;
            }
            let nested_symbol = name_type_decl(
                interner,
                cu_index,
                cu,
                Owner::Class(symbol),
                &binary_name,
                nested,
                None,
                headers,
                diagnostics,
            );
            member_types.push(nested_symbol);
        }
    }

    // Anonymous bodies attached to enum constants get a javac-style `$1`,
    // `$2`, ... name, scoped to this enclosing declaration; they can never
    // collide with a user-declared member since Java identifiers can't start
    // with a digit.
    if decl.kind == TypeDeclKind::Enum {
        let mut ordinal = 0u32;
        for member in &decl.members {
            if let MemberDecl::EnumConstant(EnumConstantDecl { class_body: Some(body), .. }) = member {
                ordinal += 1;
                let anon_symbol = name_type_decl(
                    interner,
                    cu_index,
                    cu,
                    Owner::Class(symbol),
                    &binary_name,
                    body,
                    Some(symbol),
                    headers,
                    diagnostics,
                );
                member_types.push(anon_symbol);
            }
        }
    }

    let kind = match decl.kind {
        TypeDeclKind::Class => ClassKind::Class,
        TypeDeclKind::Interface => ClassKind::Interface,
        TypeDeclKind::Enum => ClassKind::Enum,
        TypeDeclKind::Annotation => ClassKind::Annotation,
    };

    headers.insert(
        symbol,
        Header {
            symbol,
            kind,
            access: decl.modifiers,
            owner,
            simple_name: decl.name.clone(),
            member_types,
            type_params,
            decl: Rc::new(decl.clone()),
            cu_index,
            span: decl.span,
            enum_constant_owner,
        },
    );

    symbol
}

#[cfg(test)]
mod tests {
    use super::*;
    use headc_ast::{Modifiers, TypeDeclKind};
    use headc_core::Span;

    fn empty_decl(name: &str, kind: TypeDeclKind, members: Vec<MemberDecl>) -> TypeDecl {
        TypeDecl {
            kind,
            modifiers: Modifiers::PUBLIC,
            annotations: Vec::new(),
            name: name.to_string(),
            type_params: Vec::new(),
            superclass: None,
            interfaces: Vec::new(),
            members,
            span: Span::new(0, 1),
        }
    }

    #[test]
    fn assigns_nested_binary_names() {
        let mut interner = Interner::new();
        let mut diagnostics = DiagnosticSink::new();
        let inner = empty_decl("Inner", TypeDeclKind::Class, vec![]);
        let outer = empty_decl(
            "Outer",
            TypeDeclKind::Class,
            vec![MemberDecl::NestedType(Box::new(inner))],
        );
        let cu = CompilationUnit {
            source_path: "A.java".into(),
            package: Some("p".into()),
            imports: vec![],
            types: vec![outer],
        };
        let out = name_compilation_units(&mut interner, vec![cu], &mut diagnostics);
        assert!(diagnostics.is_empty());
        let outer_sym = ClassSymbol::new(&mut interner, "p/Outer");
        let inner_sym = ClassSymbol::new(&mut interner, "p/Outer$Inner");
        assert!(out.headers.contains_key(&outer_sym));
        let outer_header = &out.headers[&outer_sym];
        assert_eq!(outer_header.member_types, vec![inner_sym]);
    }

    #[test]
    fn duplicate_top_level_name_is_reported() {
        let mut interner = Interner::new();
        let mut diagnostics = DiagnosticSink::new();
        let a = empty_decl("A", TypeDeclKind::Class, vec![]);
        let a2 = empty_decl("A", TypeDeclKind::Class, vec![]);
        let cu = CompilationUnit {
            source_path: "A.java".into(),
            package: None,
            imports: vec![],
            types: vec![a, a2],
        };
        name_compilation_units(&mut interner, vec![cu], &mut diagnostics);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(
            diagnostics.iter().next().unwrap().kind,
            DiagnosticKind::DuplicateType { name: "A".to_string() }
        );
    }
}
