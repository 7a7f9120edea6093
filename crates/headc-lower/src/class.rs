//! Lowers one `BoundClass` into a `headc_classfile::writer::ClassDef`.

use headc_ast::Modifiers;
use headc_binder::{BoundClass, BoundProgram, ClassKind};
use headc_classfile::{
    AttributeSet, ClassDef, ACC_ABSTRACT, ACC_ANNOTATION, ACC_ENUM, ACC_FINAL, ACC_INTERFACE, ACC_PUBLIC, ACC_SUPER,
};
use headc_core::Interner;
use headc_symbols::{ClassTySegment, Type};

use crate::{annotations, inner_classes, members, sig};

const JAVA_LANG_OBJECT: &str = "java/lang/Object";

/// Object's `ClassSymbol`, minted fresh (cheap: flyweight interning) rather
/// than threaded through every call site — every lowering path needs it
/// sooner or later (interface super, enum implicit bound fallback, ...).
fn object_symbol(interner: &mut Interner) -> headc_symbols::ClassSymbol {
    headc_symbols::ClassSymbol::new(interner, JAVA_LANG_OBJECT)
}

/// `ClassDef.access_flags` never carries `private`/`protected`/`static`
/// (those live only in the `InnerClasses` entry for a nested class, see
/// `inner_classes::inner_class_access_flags`); this computes the subset
/// that is legal on the class's own access-flags field.
fn class_access_flags(bound: &BoundClass) -> u16 {
    let m = bound.access;
    let mut flags = 0u16;
    if m.contains(Modifiers::PUBLIC) {
        flags |= ACC_PUBLIC;
    }

    match bound.kind {
        ClassKind::Class => {
            flags |= ACC_SUPER;
            if m.contains(Modifiers::FINAL) {
                flags |= ACC_FINAL;
            }
            if m.contains(Modifiers::ABSTRACT) {
                flags |= ACC_ABSTRACT;
            }
        }
        ClassKind::Interface => {
            flags |= ACC_INTERFACE | ACC_ABSTRACT;
        }
        ClassKind::Annotation => {
            flags |= ACC_INTERFACE | ACC_ANNOTATION | ACC_ABSTRACT;
        }
        ClassKind::Enum => {
            // A constant-specific class body would need the enclosing enum
            // to stay non-final (its constants subclass it); headc's bound
            // model does not distinguish those bodies from ordinary member
            // types (see DESIGN.md), so every enum is lowered as final.
            flags |= ACC_SUPER | ACC_FINAL | ACC_ENUM;
        }
    }

    flags
}

/// The signature-level supertype to use for `Signature` emission, which for
/// an enum differs from `BoundClass.super_class_type`: Phase IV's fallback
/// resolves an implicit superclass to a *raw* `java/lang/Enum` reference
/// (no type argument), since it doesn't special-case the enum hierarchy.
/// The `extends java/lang/Enum<Self>` parameterization is a lowering-time
/// concern instead.
fn signature_super_type(bound: &BoundClass, interner: &mut Interner) -> Type {
    match bound.kind {
        ClassKind::Enum => {
            let enum_class = bound.super_class.expect("an enum class always has java/lang/Enum as its superclass");
            Type::as_class_ty(vec![ClassTySegment {
                class: enum_class,
                type_args: vec![Type::as_non_parameterized_class_ty(bound.symbol)],
                annotations: vec![],
            }])
        }
        ClassKind::Interface | ClassKind::Annotation => Type::as_non_parameterized_class_ty(object_symbol(interner)),
        ClassKind::Class => bound
            .super_class_type
            .clone()
            .unwrap_or_else(|| Type::as_non_parameterized_class_ty(object_symbol(interner))),
    }
}

pub fn lower_class(bound: &BoundClass, program: &BoundProgram, interner: &mut Interner, major_version: u16) -> ClassDef {
    let this_class = bound.symbol.binary_name(interner).to_string();

    let super_class = match bound.kind {
        // JVMS requires every class file but `java/lang/Object` itself to
        // carry a `super_class` index; source-level interfaces have none in
        // the bound model (they don't extend anything in the type system),
        // but the class-file format still points them at `Object`.
        ClassKind::Interface | ClassKind::Annotation => Some(JAVA_LANG_OBJECT.to_string()),
        ClassKind::Enum | ClassKind::Class => bound.super_class.map(|s| s.binary_name(interner).to_string()),
    };

    let interfaces = bound.interfaces.iter().map(|i| i.binary_name(interner).to_string()).collect::<Vec<_>>();

    let super_ty = signature_super_type(bound, interner);
    let signature =
        sig::class_signature(&bound.type_param_bounds, &bound.type_params, &super_ty, &bound.interface_types, interner);

    let (visible_annotations, invisible_annotations) = annotations::partition(&bound.annotations, program, interner);
    let deprecated = annotations::is_deprecated(&bound.annotations, interner);

    let mut fields = bound.fields.iter().map(|f| members::lower_field(f, program, interner)).collect::<Vec<_>>();
    let mut methods =
        bound.methods.iter().map(|m| members::lower_method(bound, m, program, interner)).collect::<Vec<_>>();

    if bound.kind == ClassKind::Enum {
        members::append_enum_synthetics(bound, &mut fields, &mut methods, interner);
    } else if !bound.methods.iter().any(|m| m.symbol.is_constructor(interner)) && bound.kind == ClassKind::Class {
        methods.push(members::default_constructor(bound, interner));
    }

    let inner_classes = inner_classes::compute(bound, program, interner);

    ClassDef {
        access_flags: class_access_flags(bound),
        this_class,
        super_class,
        interfaces,
        fields,
        methods,
        inner_classes,
        attributes: AttributeSet {
            signature,
            visible_annotations,
            invisible_annotations,
            visible_type_annotations: Vec::new(),
            invisible_type_annotations: Vec::new(),
            deprecated,
        },
        major_version,
    }
}
