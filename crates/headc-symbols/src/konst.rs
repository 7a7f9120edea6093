//! The compile-time constant value model.
//!
//! `Const` is a closed sum, matched exhaustively everywhere it is consumed
//! (the evaluator in `headc_const`, the `ConstantValue` attribute writer and
//! the annotation element-value encoder in `headc_classfile`). The evaluator
//! itself — folding, widening, the Phase V worklist — lives in `headc_const`;
//! this crate only owns the value shape, since `AnnotationUse` needs it and
//! `Type` needs `AnnotationUse` for type annotations.

use crate::symbol::ClassSymbol;
use crate::ty::Type;
use headc_ast::Expr;
use rustc_hash::FxHashMap;

#[derive(Clone, Debug, PartialEq)]
pub enum Const {
    Boolean(bool),
    Byte(i8),
    Short(i16),
    Char(char),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    String(String),
    EnumRef(ClassSymbol, String),
    ClassLiteral(Type),
    Annotation(AnnotationUse),
    Array(Vec<Const>),
}

impl Const {
    /// A short tag used in diagnostics and in deciding `ConstantValue`
    /// eligibility (only primitives and `String` may carry one).
    pub fn is_constant_value_eligible(&self) -> bool {
        !matches!(
            self,
            Const::EnumRef(..) | Const::ClassLiteral(_) | Const::Annotation(_) | Const::Array(_)
        )
    }
}

/// A resolved use of an annotation, attached to a declaration or embedded in
/// a type. The raw argument expressions are kept alongside the resolved
/// values because an argument may reference a constant from another
/// compilation unit that was not yet available the first time this use was
/// evaluated; Phase V re-drives evaluation from `raw_args` as dependencies
/// become available.
#[derive(Clone, Debug, PartialEq)]
pub struct AnnotationUse {
    pub annotation_class: ClassSymbol,
    pub raw_args: Vec<(Option<String>, Expr)>,
    pub resolved: FxHashMap<String, Const>,
}

impl AnnotationUse {
    pub fn unresolved(annotation_class: ClassSymbol, raw_args: Vec<(Option<String>, Expr)>) -> Self {
        Self {
            annotation_class,
            raw_args,
            resolved: FxHashMap::default(),
        }
    }

    pub fn is_fully_resolved(&self) -> bool {
        self.raw_args
            .iter()
            .all(|(name, _)| self.resolved.contains_key(name.as_deref().unwrap_or("value")))
    }
}
