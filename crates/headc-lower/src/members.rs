//! Lowers fields and methods, including the declarations that don't exist
//! yet on the bound model and must be synthesized here: the implicit
//! no-arg constructor, and an enum's `values()`/`valueOf`/constant fields/
//! `$VALUES` array.

use headc_ast::Modifiers;
use headc_binder::{BoundClass, BoundField, BoundMethod, BoundProgram, ClassKind};
use headc_classfile::{
    assertion_error_code, encode_field_descriptor, encode_method_descriptor, AttributeSet, ConstValueAttr, FieldDef,
    MethodDef, PoolBuilder, ACC_ABSTRACT, ACC_ENUM, ACC_FINAL, ACC_NATIVE, ACC_PRIVATE, ACC_PROTECTED, ACC_PUBLIC,
    ACC_STATIC, ACC_STRICT, ACC_SYNCHRONIZED, ACC_SYNTHETIC, ACC_TRANSIENT, ACC_VARARGS, ACC_VOLATILE,
};
use headc_core::Interner;
use headc_symbols::{ClassSymbol, Const, Type};

use crate::{annotations, sig};

fn const_value_attr(value: &Const) -> Option<ConstValueAttr> {
    match value {
        Const::Boolean(b) => Some(ConstValueAttr::Int(*b as i32)),
        Const::Byte(b) => Some(ConstValueAttr::Int(*b as i32)),
        Const::Short(s) => Some(ConstValueAttr::Int(*s as i32)),
        Const::Char(c) => Some(ConstValueAttr::Int(*c as i32)),
        Const::Int(i) => Some(ConstValueAttr::Int(*i)),
        Const::Long(l) => Some(ConstValueAttr::Long(*l)),
        Const::Float(f) => Some(ConstValueAttr::Float(*f)),
        Const::Double(d) => Some(ConstValueAttr::Double(*d)),
        Const::String(s) => Some(ConstValueAttr::String(s.clone())),
        Const::EnumRef(..) | Const::ClassLiteral(_) | Const::Annotation(_) | Const::Array(_) => None,
    }
}

fn base_access_flags(m: Modifiers) -> u16 {
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
    if m.contains(Modifiers::STATIC) {
        flags |= ACC_STATIC;
    }
    if m.contains(Modifiers::FINAL) {
        flags |= ACC_FINAL;
    }
    flags
}

fn field_access_flags(bound_class: &BoundClass, field: &BoundField) -> u16 {
    let mut flags = base_access_flags(field.access);
    if matches!(bound_class.kind, ClassKind::Interface | ClassKind::Annotation) {
        flags |= ACC_PUBLIC | ACC_STATIC | ACC_FINAL;
    }
    if field.access.contains(Modifiers::VOLATILE) {
        flags |= ACC_VOLATILE;
    }
    if field.access.contains(Modifiers::TRANSIENT) {
        flags |= ACC_TRANSIENT;
    }
    flags
}

pub fn lower_field(field: &BoundField, program: &BoundProgram, interner: &mut Interner) -> FieldDef {
    let bound_class =
        program.get(field.symbol.owner).expect("a field's owner is always present in the bound program");

    let access_flags = field_access_flags(bound_class, field);
    let name = field.symbol.name(interner).to_string();
    let descriptor = encode_field_descriptor(&field.ty, interner);
    let signature = sig::field_signature(&field.ty, interner);

    let constant_value_eligible = access_flags & ACC_STATIC != 0 && access_flags & ACC_FINAL != 0;
    let constant_value = if constant_value_eligible {
        field.constant_value.as_ref().filter(|c| c.is_constant_value_eligible()).and_then(const_value_attr)
    } else {
        None
    };

    let (visible_annotations, invisible_annotations) = annotations::partition(&field.annotations, program, interner);
    let deprecated = annotations::is_deprecated(&field.annotations, interner);

    FieldDef {
        access_flags,
        name,
        descriptor,
        constant_value,
        attributes: AttributeSet {
            signature,
            visible_annotations,
            invisible_annotations,
            visible_type_annotations: Vec::new(),
            invisible_type_annotations: Vec::new(),
            deprecated,
        },
    }
}

fn method_access_flags(method: &BoundMethod) -> u16 {
    let mut flags = base_access_flags(method.access);
    if method.access.contains(Modifiers::SYNCHRONIZED) {
        flags |= ACC_SYNCHRONIZED;
    }
    if method.access.contains(Modifiers::NATIVE) {
        flags |= ACC_NATIVE;
    }
    if method.access.contains(Modifiers::ABSTRACT) {
        flags |= ACC_ABSTRACT;
    }
    if method.access.contains(Modifiers::STRICTFP) {
        flags |= ACC_STRICT;
    }
    if method.access.contains(Modifiers::VARARGS) {
        flags |= ACC_VARARGS;
    }
    flags
}

/// Interfaces and annotations never declare a method `private`/`abstract`
/// implicitly the way the source reads: every method is `public`, and
/// (absent `static`, `default`, or an explicit `private`) also `abstract` —
/// a rule the binder itself doesn't apply (`BoundMethod.access` is a verbatim
/// copy of the declaration's own modifiers).
fn apply_interface_method_defaults(bound_class: &BoundClass, method: &BoundMethod, flags: u16) -> u16 {
    if !matches!(bound_class.kind, ClassKind::Interface | ClassKind::Annotation) {
        return flags;
    }
    let mut flags = flags | ACC_PUBLIC;
    let is_static = flags & ACC_STATIC != 0;
    let is_private = flags & ACC_PRIVATE != 0;
    let is_default = method.access.contains(Modifiers::DEFAULT);
    if !is_static && !is_private && !is_default {
        flags |= ACC_ABSTRACT;
    }
    flags
}

fn class_symbol_of(ty: &Type) -> Option<ClassSymbol> {
    match ty {
        Type::Class(segments) => segments.last().map(|s| s.class),
        _ => None,
    }
}

pub fn lower_method(
    bound_class: &BoundClass,
    method: &BoundMethod,
    program: &BoundProgram,
    interner: &mut Interner,
) -> MethodDef {
    let mut access_flags = method_access_flags(method);
    access_flags = apply_interface_method_defaults(bound_class, method, access_flags);

    let name = method.symbol.name(interner).to_string();
    let param_types = method.params.iter().map(|p| p.ty.clone()).collect::<Vec<_>>();
    let descriptor = encode_method_descriptor(&param_types, &method.return_type, interner);
    let signature =
        sig::method_signature(&method.type_params, &param_types, &method.return_type, &method.thrown, interner);
    let exceptions =
        method.thrown.iter().filter_map(class_symbol_of).map(|c| c.binary_name(interner).to_string()).collect();

    let (visible_annotations, invisible_annotations) = annotations::partition(&method.annotations, program, interner);
    let deprecated = annotations::is_deprecated(&method.annotations, interner);
    let annotation_default = method.default_value.as_ref().map(|c| annotations::element_value_of(c, interner));

    let is_concrete = access_flags & ACC_ABSTRACT == 0 && access_flags & ACC_NATIVE == 0;
    let code = if is_concrete {
        let max_locals = 1 + method.params.len() as u16;
        Some(scratch_assertion_code(max_locals))
    } else {
        None
    };

    MethodDef {
        access_flags,
        name,
        descriptor,
        exceptions,
        annotation_default,
        code,
        attributes: AttributeSet {
            signature,
            visible_annotations,
            invisible_annotations,
            visible_type_annotations: Vec::new(),
            invisible_type_annotations: Vec::new(),
            deprecated,
        },
    }
}

/// Every concrete method body is the fixed `throw new AssertionError()`
/// sequence, built against its own throwaway pool: since it is never
/// executed or verified, the constant-pool indices it bakes in don't need to
/// resolve against the class's real pool (see the writer's own tests).
fn scratch_assertion_code(max_locals: u16) -> headc_classfile::CodeDef {
    let mut scratch_pool = PoolBuilder::new();
    assertion_error_code(&mut scratch_pool, max_locals).expect("the fixed assertion-error sequence always encodes")
}

fn synthetic_method(name: &str, descriptor: &str, access_flags: u16, max_locals: u16) -> MethodDef {
    MethodDef {
        access_flags,
        name: name.to_string(),
        descriptor: descriptor.to_string(),
        exceptions: Vec::new(),
        annotation_default: None,
        code: Some(scratch_assertion_code(max_locals)),
        attributes: AttributeSet::default(),
    }
}

/// The implicit no-arg constructor javac inserts when a class declares no
/// constructor of its own, matching the class's own declared access.
pub fn default_constructor(bound: &BoundClass, _interner: &mut Interner) -> MethodDef {
    let mut access_flags = 0u16;
    if bound.access.contains(Modifiers::PUBLIC) {
        access_flags |= ACC_PUBLIC;
    } else if bound.access.contains(Modifiers::PROTECTED) {
        access_flags |= ACC_PROTECTED;
    } else if bound.access.contains(Modifiers::PRIVATE) {
        access_flags |= ACC_PRIVATE;
    }
    synthetic_method("<init>", "()V", access_flags, 1)
}

/// Appends the members javac generates for every enum: one
/// `public static final` field per constant (typed as the enum class
/// itself), a `private static final` `$VALUES` array, `values()`,
/// `valueOf(String)`, and a private `(String, int)` constructor — none of
/// which appear on `BoundClass` directly, since the binder only records
/// constant names (`BoundClass::enum_constants`).
pub fn append_enum_synthetics(
    bound: &BoundClass,
    fields: &mut Vec<FieldDef>,
    methods: &mut Vec<MethodDef>,
    interner: &mut Interner,
) {
    let self_ty = Type::as_non_parameterized_class_ty(bound.symbol);
    let self_descriptor = encode_field_descriptor(&self_ty, interner);
    let array_descriptor = format!("[{self_descriptor}");

    for constant in &bound.enum_constants {
        fields.push(FieldDef {
            access_flags: ACC_PUBLIC | ACC_STATIC | ACC_FINAL | ACC_ENUM,
            name: constant.clone(),
            descriptor: self_descriptor.clone(),
            constant_value: None,
            attributes: AttributeSet::default(),
        });
    }

    fields.push(FieldDef {
        access_flags: ACC_PRIVATE | ACC_STATIC | ACC_FINAL | ACC_SYNTHETIC,
        name: "$VALUES".to_string(),
        descriptor: array_descriptor.clone(),
        constant_value: None,
        attributes: AttributeSet::default(),
    });

    methods.push(synthetic_method("values", &format!("(){array_descriptor}"), ACC_PUBLIC | ACC_STATIC, 0));
    methods.push(synthetic_method(
        "valueOf",
        &format!("(Ljava/lang/String;){self_descriptor}"),
        ACC_PUBLIC | ACC_STATIC,
        1,
    ));
    methods.push(synthetic_method("<init>", "(Ljava/lang/String;I)V", ACC_PRIVATE, 3));
}
