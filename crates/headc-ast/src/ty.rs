//! Unresolved, source-level type syntax.
//!
//! These nodes carry exactly what the parser could see: a dotted/nested
//! chain of names with optional type arguments. Phase III/IV of the binder
//! (`headc_binder`) resolve each `Class` segment's name to a `ClassSymbol` or
//! `TyVarSymbol` and produce a `headc_symbols::Type`.

use headc_core::Span;
use serde::{Deserialize, Serialize};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PrimitiveKind {
    Boolean,
    Byte,
    Char,
    Short,
    Int,
    Long,
    Float,
    Double,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum TypeRefNode {
    Primitive(PrimitiveKind, Span),
    Void(Span),
    /// A possibly-qualified, possibly-nested class reference, e.g.
    /// `java.util.Map<String, Outer.Inner<T>>`. Each element of `segments` is
    /// one `.`-separated level; the binder decides where the package prefix
    /// ends and the first type segment begins.
    Class {
        segments: Vec<TypeRefSegment>,
        span: Span,
    },
    Array {
        element: Box<TypeRefNode>,
        span: Span,
    },
}

impl TypeRefNode {
    pub fn span(&self) -> Span {
        match self {
            TypeRefNode::Primitive(_, span) => *span,
            TypeRefNode::Void(span) => *span,
            TypeRefNode::Class { span, .. } => *span,
            TypeRefNode::Array { span, .. } => *span,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TypeRefSegment {
    pub name: String,
    pub type_args: Vec<TypeArgNode>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum TypeArgNode {
    Type(TypeRefNode),
    Wildcard {
        bound: Option<WildcardBoundNode>,
        span: Span,
    },
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum WildcardBoundNode {
    Extends(Box<TypeRefNode>),
    Super(Box<TypeRefNode>),
}
