//! Converts bound `AnnotationUse`s into the writer's `Annotation`/`ElementValue`
//! records and partitions them into runtime-visible, runtime-invisible, and
//! dropped (source-retention), per the retention carried on the *annotation
//! type's own* `BoundClass`.

use headc_binder::{BoundProgram, Retention};
use headc_classfile::{Annotation, ConstValue, ElementValue};
use headc_core::Interner;
use headc_symbols::{AnnotationUse, Const};

const DEPRECATED_BINARY_NAME: &str = "java/lang/Deprecated";

/// The annotation-use's retention, read off the *annotation type's own*
/// `BoundClass`. Unresolved or non-annotation symbols (malformed input, or a
/// use whose class the binder couldn't find) default to `Class`, matching
/// the platform's own default when no `@Retention` is present.
fn retention_of(program: &BoundProgram, use_: &AnnotationUse) -> Retention {
    program.get(use_.annotation_class).and_then(|c| c.retention).unwrap_or(Retention::Class)
}

fn const_to_element_value(value: &Const, interner: &Interner) -> ElementValue {
    match value {
        Const::Boolean(b) => ElementValue::Const(ConstValue::Boolean(*b)),
        Const::Byte(b) => ElementValue::Const(ConstValue::Byte(*b)),
        Const::Short(s) => ElementValue::Const(ConstValue::Short(*s)),
        Const::Char(c) => ElementValue::Const(ConstValue::Char(*c)),
        Const::Int(i) => ElementValue::Const(ConstValue::Int(*i)),
        Const::Long(l) => ElementValue::Const(ConstValue::Long(*l)),
        Const::Float(f) => ElementValue::Const(ConstValue::Float(*f)),
        Const::Double(d) => ElementValue::Const(ConstValue::Double(*d)),
        Const::String(s) => ElementValue::Const(ConstValue::String(s.clone())),
        Const::EnumRef(class, name) => ElementValue::Enum {
            type_descriptor: format!("L{};", class.binary_name(interner)),
            const_name: name.clone(),
        },
        Const::ClassLiteral(ty) => ElementValue::Class(class_literal_descriptor(ty, interner)),
        Const::Annotation(use_) => ElementValue::Annotation(Box::new(build_annotation(use_, interner))),
        Const::Array(values) => {
            ElementValue::Array(values.iter().map(|v| const_to_element_value(v, interner)).collect())
        }
    }
}

fn class_literal_descriptor(ty: &headc_symbols::Type, interner: &Interner) -> String {
    if matches!(ty, headc_symbols::Type::Void) {
        "V".to_string()
    } else {
        headc_classfile::encode_field_descriptor(ty, interner)
    }
}

fn build_annotation(use_: &AnnotationUse, interner: &Interner) -> Annotation {
    let mut elements = use_.resolved.iter().map(|(name, value)| (name.clone(), const_to_element_value(value, interner))).collect::<Vec<_>>();
    elements.sort_by(|a, b| a.0.cmp(&b.0));
    let internal_name = use_.annotation_class.binary_name(interner).to_string();
    Annotation {
        type_descriptor: format!("L{internal_name};"),
        type_internal_name: Some(internal_name),
        elements,
    }
}

/// Splits a declaration's annotation uses into runtime-visible and
/// runtime-invisible lists; source-retention uses are dropped entirely.
pub fn partition(
    uses: &[AnnotationUse],
    program: &BoundProgram,
    interner: &Interner,
) -> (Vec<Annotation>, Vec<Annotation>) {
    let mut visible = Vec::new();
    let mut invisible = Vec::new();
    for use_ in uses {
        match retention_of(program, use_) {
            Retention::Source => continue,
            Retention::Class => invisible.push(build_annotation(use_, interner)),
            Retention::Runtime => visible.push(build_annotation(use_, interner)),
        }
    }
    (visible, invisible)
}

pub fn is_deprecated(uses: &[AnnotationUse], interner: &Interner) -> bool {
    uses.iter().any(|u| u.annotation_class.binary_name(interner) == DEPRECATED_BINARY_NAME)
}

/// Converts a resolved annotation-element constant (e.g. an element's
/// default value) to the writer's `ElementValue`, for call sites outside
/// this module that don't have a whole `AnnotationUse` to partition.
pub fn element_value_of(value: &Const, interner: &Interner) -> ElementValue {
    const_to_element_value(value, interner)
}
