//! The abstract syntax tree headc binds.
//!
//! headc's core is the binder and the class-file emitter; the lexer and
//! parser that turn source text into this tree are an external collaborator
//! (see the crate root docs for why). This crate only defines the shape of
//! the tree those components are expected to hand over: compilation units,
//! type declarations, member signatures, and the expression subset the
//! constant evaluator needs.
//!
//! Every node carries a [`Span`](headc_core::Span) so the binder can attach
//! a source location to diagnostics; nodes synthesized later in the
//! pipeline (default constructors, enum synthetics) use
//! [`Span::synthetic`](headc_core::Span::synthetic) instead.

pub mod decl;
pub mod expr;
pub mod modifiers;
pub mod ty;

pub use decl::{
    CompilationUnit, EnumConstantDecl, FieldDecl, ImportDecl, MemberDecl, MethodDecl, ParamDecl,
    TypeDecl, TypeDeclKind, TypeParamNode,
};
pub use expr::{AnnotationUseNode, BinaryOp, Expr, LiteralNode, UnaryOp};
pub use modifiers::Modifiers;
pub use ty::{PrimitiveKind, TypeArgNode, TypeRefNode, TypeRefSegment, WildcardBoundNode};
