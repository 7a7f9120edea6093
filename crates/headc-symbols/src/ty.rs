//! The resolved type model.
//!
//! Unlike `headc_ast::TypeRefNode`, every `ClassSymbol` here has already been
//! resolved to a concrete declaration (or the error sentinel); there is no
//! remaining name lookup left to do. `Type` is a closed sum, not an open
//! hierarchy, so every consumer matches exhaustively rather than downcasting.

use crate::symbol::{ClassSymbol, TyVarSymbol};
use crate::konst::AnnotationUse;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum PrimKind {
    Boolean,
    Byte,
    Char,
    Short,
    Int,
    Long,
    Float,
    Double,
}

impl PrimKind {
    /// Width in bits, used by the constant evaluator for wrap-around and
    /// narrowing rules.
    pub fn width(self) -> u32 {
        match self {
            PrimKind::Boolean | PrimKind::Byte => 8,
            PrimKind::Char | PrimKind::Short => 16,
            PrimKind::Int | PrimKind::Float => 32,
            PrimKind::Long | PrimKind::Double => 64,
        }
    }

    pub fn is_integral(self) -> bool {
        matches!(
            self,
            PrimKind::Byte | PrimKind::Short | PrimKind::Char | PrimKind::Int | PrimKind::Long
        )
    }

    pub fn is_floating(self) -> bool {
        matches!(self, PrimKind::Float | PrimKind::Double)
    }
}

/// One level of a possibly-nested parameterized class reference, outer to
/// inner, e.g. `Outer<String>.Inner<Integer>` is two segments.
#[derive(Clone, Debug, PartialEq)]
pub struct ClassTySegment {
    pub class: ClassSymbol,
    pub type_args: Vec<Type>,
    pub annotations: Vec<AnnotationUse>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum WildKind {
    Unbounded,
    Extends(Box<Type>),
    Super(Box<Type>),
}

/// The closed sum of types a declaration can mention.
#[derive(Clone, Debug, PartialEq)]
pub enum Type {
    Prim(PrimKind),
    /// Outer-to-inner segment list; a raw use has an empty type-argument
    /// list on every segment.
    Class(Vec<ClassTySegment>),
    Array(Box<Type>, Vec<AnnotationUse>),
    TyVar(TyVarSymbol, Vec<AnnotationUse>),
    /// Valid only as a type argument, never as a field/return/parameter type.
    Wild(WildKind, Vec<AnnotationUse>),
    Void,
}

impl Type {
    pub fn as_non_parameterized_class_ty(class: ClassSymbol) -> Type {
        Type::Class(vec![ClassTySegment {
            class,
            type_args: Vec::new(),
            annotations: Vec::new(),
        }])
    }

    pub fn as_class_ty(segments: Vec<ClassTySegment>) -> Type {
        debug_assert!(!segments.is_empty(), "a ClassTy must have at least one segment");
        Type::Class(segments)
    }

    pub fn array_of(element: Type) -> Type {
        debug_assert!(element != Type::Void, "arrays of void are not well-formed");
        Type::Array(Box::new(element), Vec::new())
    }

    /// The innermost segment's class symbol, for a (possibly parameterized,
    /// possibly nested) class type. `None` for every other `Type` variant.
    pub fn class_symbol(&self) -> Option<ClassSymbol> {
        match self {
            Type::Class(segments) => segments.last().map(|seg| seg.class),
            _ => None,
        }
    }

    pub fn is_reference(&self) -> bool {
        matches!(self, Type::Class(_) | Type::Array(..) | Type::TyVar(..))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use headc_core::Interner;

    #[test]
    fn nested_parameterized_class_keeps_segments_distinct() {
        let mut interner = Interner::new();
        let outer = ClassSymbol::new(&mut interner, "p/Outer");
        let inner = ClassSymbol::new(&mut interner, "p/Outer$Inner");
        let string_ty = Type::as_non_parameterized_class_ty(ClassSymbol::new(
            &mut interner,
            "java/lang/String",
        ));
        let ty = Type::as_class_ty(vec![
            ClassTySegment {
                class: outer,
                type_args: vec![string_ty],
                annotations: vec![],
            },
            ClassTySegment {
                class: inner,
                type_args: vec![],
                annotations: vec![],
            },
        ]);
        match ty {
            Type::Class(segments) => assert_eq!(segments.len(), 2),
            _ => panic!("expected ClassTy"),
        }
    }
}
