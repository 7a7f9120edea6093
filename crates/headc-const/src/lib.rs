//! Compile-time constant expression folding.
//!
//! This crate is pure: it has no notion of scopes, packages, or inheritance
//! of its own. [`ConstScope`] is the seam `headc_binder` implements to supply
//! name resolution; everything else here — numeric promotion, narrowing,
//! string conversion, and the recursive [`evaluate`] fold — is a function of
//! an expression and that trait object alone.

mod convert;
mod eval;
mod scope;
mod strconv;

pub use convert::{const_prim_kind, narrow_to, promote, unary_promote, widen_to};
pub use eval::evaluate;
pub use scope::{ConstRef, ConstScope, EvalOutcome, FieldConstStatus};
pub use strconv::concat_operand_to_string;
