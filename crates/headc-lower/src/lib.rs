//! Translates a bound program into class-file records.
//!
//! `headc_binder` resolves names, hierarchy, types, and constants; this
//! crate turns the result into [`headc_classfile::ClassDef`]s ready for
//! [`headc_classfile::write_class_file`]. Every method body, regardless of
//! what the source actually wrote, lowers to the same fixed
//! `throw new AssertionError()` sequence — headc never compiles expressions
//! or statements, only declarations.

mod annotations;
mod class;
mod inner_classes;
mod members;
mod sig;

use headc_binder::BoundProgram;
use headc_classfile::{ClassDef, DEFAULT_MAJOR_VERSION};
use headc_core::Interner;

/// Lowers every source-origin class in `program`, in the same topological
/// order `headc_binder` produced them (`BoundProgram::order` already
/// excludes classpath classes).
pub fn lower_program(program: &BoundProgram, interner: &mut Interner) -> Vec<ClassDef> {
    lower_program_with_version(program, interner, DEFAULT_MAJOR_VERSION)
}

pub fn lower_program_with_version(program: &BoundProgram, interner: &mut Interner, major_version: u16) -> Vec<ClassDef> {
    program
        .order
        .iter()
        .map(|&symbol| {
            let bound = program.get(symbol).expect("every symbol in `order` has a bound class");
            class::lower_class(bound, program, interner, major_version)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use headc_ast::Modifiers;
    use headc_binder::{BoundClass, ClassKind, Origin, Owner};
    use headc_core::Span;
    use rustc_hash::FxHashMap;

    fn empty_class(interner: &mut Interner, name: &str, kind: ClassKind, access: Modifiers) -> BoundClass {
        let symbol = headc_symbols::ClassSymbol::new(interner, name);
        BoundClass {
            symbol,
            kind,
            access,
            owner: Owner::Package,
            simple_name: symbol.simple_name(interner).to_string(),
            member_types: Vec::new(),
            type_params: Vec::new(),
            origin: Origin::Source,
            declaration_span: Span::default(),
            super_class: Some(headc_symbols::ClassSymbol::new(interner, "java/lang/Object")),
            interfaces: Vec::new(),
            type_param_bounds: Vec::new(),
            super_class_type: None,
            interface_types: Vec::new(),
            fields: Vec::new(),
            methods: Vec::new(),
            annotations: Vec::new(),
            retention: None,
            enum_constants: Vec::new(),
        }
    }

    #[test]
    fn lowers_a_trivial_public_class_with_default_constructor() {
        let mut interner = Interner::new();
        let bound = empty_class(&mut interner, "p/Simple", ClassKind::Class, Modifiers::PUBLIC);
        let symbol = bound.symbol;

        let mut classes = FxHashMap::default();
        classes.insert(symbol, bound);
        let program = BoundProgram { classes, order: vec![symbol] };

        let defs = lower_program(&program, &mut interner);
        assert_eq!(defs.len(), 1);
        let def = &defs[0];
        assert_eq!(def.this_class, "p/Simple");
        assert_eq!(def.super_class.as_deref(), Some("java/lang/Object"));
        assert_eq!(def.methods.len(), 1);
        assert_eq!(def.methods[0].name, "<init>");
        assert_eq!(def.methods[0].descriptor, "()V");
    }

    #[test]
    fn interface_gets_object_super_and_abstract_methods() {
        let mut interner = Interner::new();
        let mut bound = empty_class(&mut interner, "p/Iface", ClassKind::Interface, Modifiers::PUBLIC);
        bound.super_class = None;
        let symbol = bound.symbol;

        let method_symbol = headc_symbols::MethodSymbol::new(&mut interner, symbol, "run", "()V");
        bound.methods.push(headc_binder::BoundMethod {
            symbol: method_symbol,
            type_params: Vec::new(),
            return_type: headc_symbols::Type::Void,
            params: Vec::new(),
            thrown: Vec::new(),
            access: Modifiers::empty(),
            annotations: Vec::new(),
            declaration_span: Span::default(),
            default_value_raw: None,
            default_value: None,
            is_synthetic: false,
        });

        let mut classes = FxHashMap::default();
        classes.insert(symbol, bound);
        let program = BoundProgram { classes, order: vec![symbol] };

        let defs = lower_program(&program, &mut interner);
        let def = &defs[0];
        assert_eq!(def.super_class.as_deref(), Some("java/lang/Object"));
        assert_eq!(def.methods.len(), 1);
        let m = &def.methods[0];
        assert_eq!(m.access_flags & headc_classfile::ACC_PUBLIC, headc_classfile::ACC_PUBLIC);
        assert_eq!(m.access_flags & headc_classfile::ACC_ABSTRACT, headc_classfile::ACC_ABSTRACT);
        assert!(m.code.is_none());
    }
}
