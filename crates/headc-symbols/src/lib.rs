//! Symbols and the resolved type/constant model (`C1`/`C2` model half).
//!
//! Symbols ([`ClassSymbol`], [`FieldSymbol`], [`MethodSymbol`],
//! [`TyVarSymbol`], [`PackageSymbol`]) are flyweight identifiers: value-equal
//! by contents, `Copy`, and owning no data beyond an interned name. [`Type`]
//! is the resolved, tagged-sum type representation signatures are built
//! from. [`Const`] is the compile-time constant value sum; the evaluator
//! that produces one from a `headc_ast::Expr` lives in `headc_const`.

pub mod konst;
pub mod symbol;
pub mod ty;

pub use konst::{AnnotationUse, Const};
pub use symbol::{ClassSymbol, FieldSymbol, MethodSymbol, PackageSymbol, TyVarOwner, TyVarSymbol};
pub use ty::{ClassTySegment, PrimKind, Type, WildKind};
