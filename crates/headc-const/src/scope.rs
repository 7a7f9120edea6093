//! The environment the evaluator consults to resolve names.
//!
//! `headc_const` never walks scopes itself — that is Phase IV/V's job in
//! `headc_binder`, which already knows every field's declared type,
//! inheritance order, and which classes are visible. The binder implements
//! [`ConstScope`]; this crate only folds expressions once names are in hand.

use headc_ast::TypeRefNode;
use headc_symbols::{ClassSymbol, Const, FieldSymbol, Type};

/// What an unqualified or qualified name resolves to, for constant
/// evaluation purposes. Anything else (a local variable, a method call) is
/// not a constant expression and is reported directly by the caller.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ConstRef {
    Field(FieldSymbol),
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum FieldConstStatus {
    /// The field's constant value has already been computed.
    Ready,
    /// The field is `final` of a constant-eligible type but its initializer
    /// has not been evaluated yet; the worklist should retry once it is.
    Pending,
    /// The field is not `final`, not of a constant-eligible type, or has no
    /// initializer — referencing it can never fold to a constant.
    NotConstant,
}

pub trait ConstScope {
    /// Resolve a bare or already-dotted identifier appearing in expression
    /// position to the field or enum constant it names, per the lookup order
    /// already computed for this declaration (Phase IV member scope:
    /// enclosing type chain, inherited members, imports).
    fn resolve_name(&self, name: &str) -> Option<ConstRef>;

    /// Resolve a dotted prefix (`"com.example.C"`, or an inherited/enclosing
    /// simple name) that appears to the left of a `.` in a qualified field
    /// access, to the class it names.
    fn resolve_type_name(&self, dotted: &str) -> Option<ClassSymbol>;

    /// Look up a field (including inherited ones) declared on `class`.
    fn field_in_class(&self, class: ClassSymbol, name: &str) -> Option<FieldSymbol>;

    /// Whether `class` declares an enum constant named `name`.
    fn enum_constant_exists(&self, class: ClassSymbol, name: &str) -> bool;

    fn field_status(&self, field: FieldSymbol) -> FieldConstStatus;

    /// Already-computed constant value for a field in `Ready` status.
    fn field_value(&self, field: FieldSymbol) -> Option<Const>;

    /// Resolve a source-level type reference (used by class literals and
    /// casts) to the bound `Type`. Always available: type resolution
    /// (Phase IV) always precedes constant evaluation (Phase V).
    fn resolve_type(&self, ty: &TypeRefNode) -> Type;
}

/// The outcome of folding one expression.
#[derive(Clone, Debug, PartialEq)]
pub enum EvalOutcome {
    Value(Const),
    /// Evaluation depends on `field`, whose value is not available yet.
    Unresolved(FieldSymbol),
    /// The expression can never be a constant, with a human-readable reason.
    NotAConstant(String),
}
