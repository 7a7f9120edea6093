//! The constant expression folder.
//!
//! `evaluate` is a pure function of an expression and a [`ConstScope`]: given
//! the same scope it always returns the same [`EvalOutcome`]. The Phase V
//! worklist in `headc_binder` is the only thing that retries a call whose
//! result was `Unresolved`.

use crate::convert::{const_prim_kind, promote, unary_promote, widen_to};
use crate::scope::{ConstRef, ConstScope, EvalOutcome, FieldConstStatus};
use crate::strconv::concat_operand_to_string;
use headc_ast::{AnnotationUseNode, BinaryOp, Expr, LiteralNode, UnaryOp};
use headc_symbols::{AnnotationUse, Const};
use rustc_hash::FxHashMap;

macro_rules! propagate {
    ($outcome:expr) => {
        match $outcome {
            EvalOutcome::Value(v) => v,
            other => return other,
        }
    };
}

pub fn evaluate(expr: &Expr, scope: &dyn ConstScope) -> EvalOutcome {
    match expr {
        Expr::Literal(lit, _) => literal_to_outcome(lit),
        Expr::Paren(inner, _) => evaluate(inner, scope),
        Expr::Name(name, _) => evaluate_name(name, scope),
        Expr::FieldAccess { target, name, .. } => evaluate_field_access(target, name, scope),
        Expr::Unary { op, operand, .. } => evaluate_unary(*op, operand, scope),
        Expr::Binary { op, left, right, .. } => evaluate_binary(*op, left, right, scope),
        Expr::Ternary {
            cond,
            then_branch,
            else_branch,
            ..
        } => evaluate_ternary(cond, then_branch, else_branch, scope),
        Expr::ClassLiteral { ty, .. } => EvalOutcome::Value(Const::ClassLiteral(scope.resolve_type(ty))),
        Expr::Cast { ty, operand, .. } => evaluate_cast(ty, operand, scope),
        Expr::ArrayInit { elements, .. } => evaluate_array(elements, scope),
        Expr::Annotation(node) => evaluate_annotation(node, scope),
    }
}

fn literal_to_outcome(lit: &LiteralNode) -> EvalOutcome {
    match lit {
        LiteralNode::Boolean(b) => EvalOutcome::Value(Const::Boolean(*b)),
        LiteralNode::Char(c) => EvalOutcome::Value(Const::Char(*c)),
        LiteralNode::Int(v) => EvalOutcome::Value(Const::Int(*v)),
        LiteralNode::Long(v) => EvalOutcome::Value(Const::Long(*v)),
        LiteralNode::Float(v) => EvalOutcome::Value(Const::Float(*v)),
        LiteralNode::Double(v) => EvalOutcome::Value(Const::Double(*v)),
        LiteralNode::String(s) => EvalOutcome::Value(Const::String(s.clone())),
        LiteralNode::Null => {
            EvalOutcome::NotAConstant("null is not a compile-time constant".to_string())
        }
    }
}

fn evaluate_name(name: &str, scope: &dyn ConstScope) -> EvalOutcome {
    match scope.resolve_name(name) {
        Some(ConstRef::Field(field)) => resolve_field_ref(field, scope),
        None => EvalOutcome::NotAConstant(format!("cannot resolve `{name}` as a constant")),
    }
}

fn resolve_field_ref(field: headc_symbols::FieldSymbol, scope: &dyn ConstScope) -> EvalOutcome {
    match scope.field_status(field) {
        FieldConstStatus::Ready => match scope.field_value(field) {
            Some(v) => EvalOutcome::Value(v),
            None => EvalOutcome::NotAConstant("field has no constant value".to_string()),
        },
        FieldConstStatus::Pending => EvalOutcome::Unresolved(field),
        FieldConstStatus::NotConstant => {
            EvalOutcome::NotAConstant("field is not a compile-time constant".to_string())
        }
    }
}

/// Flattens a chain of `Name`/`FieldAccess` nodes made entirely of plain
/// identifiers into a dotted string, e.g. `a.b.c` -> `Some("a.b.c")`. Any
/// other expression shape (a method call, an array access) returns `None`.
fn flatten_qualified_name(expr: &Expr) -> Option<String> {
    match expr {
        Expr::Name(name, _) => Some(name.clone()),
        Expr::FieldAccess { target, name, .. } => {
            let prefix = flatten_qualified_name(target)?;
            Some(format!("{prefix}.{name}"))
        }
        Expr::Paren(inner, _) => flatten_qualified_name(inner),
        _ => None,
    }
}

fn evaluate_field_access(target: &Expr, name: &str, scope: &dyn ConstScope) -> EvalOutcome {
    if let Some(qualified) = flatten_qualified_name(target) {
        if let Some(class) = scope.resolve_type_name(&qualified) {
            if scope.enum_constant_exists(class, name) {
                return EvalOutcome::Value(Const::EnumRef(class, name.to_string()));
            }
            return match scope.field_in_class(class, name) {
                Some(field) => resolve_field_ref(field, scope),
                None => EvalOutcome::NotAConstant(format!(
                    "{qualified} has no constant field named {name}"
                )),
            };
        }
    }
    EvalOutcome::NotAConstant(format!(
        "qualifier of `.{name}` does not resolve to a type"
    ))
}

fn evaluate_unary(op: UnaryOp, operand: &Expr, scope: &dyn ConstScope) -> EvalOutcome {
    let value = propagate!(evaluate(operand, scope));
    match op {
        UnaryOp::LogicalNot => match value {
            Const::Boolean(b) => EvalOutcome::Value(Const::Boolean(!b)),
            _ => EvalOutcome::NotAConstant("`!` requires a boolean operand".to_string()),
        },
        UnaryOp::Plus | UnaryOp::Minus | UnaryOp::BitNot => {
            let Some(kind) = const_prim_kind(&value) else {
                return EvalOutcome::NotAConstant("unary operator requires a numeric operand".to_string());
            };
            if kind == headc_symbols::PrimKind::Boolean {
                return EvalOutcome::NotAConstant("unary operator requires a numeric operand".to_string());
            }
            let promoted = unary_promote(kind);
            let widened = widen_to(&value, promoted);
            EvalOutcome::Value(apply_unary_numeric(op, &widened))
        }
    }
}

fn apply_unary_numeric(op: UnaryOp, v: &Const) -> Const {
    match (op, v) {
        (UnaryOp::Plus, other) => other.clone(),
        (UnaryOp::Minus, Const::Int(i)) => Const::Int(i.wrapping_neg()),
        (UnaryOp::Minus, Const::Long(l)) => Const::Long(l.wrapping_neg()),
        (UnaryOp::Minus, Const::Float(f)) => Const::Float(-f),
        (UnaryOp::Minus, Const::Double(d)) => Const::Double(-d),
        (UnaryOp::BitNot, Const::Int(i)) => Const::Int(!i),
        (UnaryOp::BitNot, Const::Long(l)) => Const::Long(!l),
        _ => unreachable!("non-numeric unary operand should have been rejected earlier"),
    }
}

fn evaluate_binary(op: BinaryOp, left: &Expr, right: &Expr, scope: &dyn ConstScope) -> EvalOutcome {
    if op == BinaryOp::Add {
        // String concatenation is checked before numeric promotion: either
        // operand being a `String` makes the whole expression a `String`.
        let lhs = propagate!(evaluate(left, scope));
        let rhs = propagate!(evaluate(right, scope));
        if matches!(lhs, Const::String(_)) || matches!(rhs, Const::String(_)) {
            let mut s = concat_operand_to_string(&lhs);
            s.push_str(&concat_operand_to_string(&rhs));
            return EvalOutcome::Value(Const::String(s));
        }
        return evaluate_numeric_binary(op, lhs, rhs);
    }

    if matches!(op, BinaryOp::LogicalAnd | BinaryOp::LogicalOr) {
        let lhs = propagate!(evaluate(left, scope));
        let rhs = propagate!(evaluate(right, scope));
        return match (lhs, rhs) {
            (Const::Boolean(a), Const::Boolean(b)) => EvalOutcome::Value(Const::Boolean(match op {
                BinaryOp::LogicalAnd => a && b,
                BinaryOp::LogicalOr => a || b,
                _ => unreachable!(),
            })),
            _ => EvalOutcome::NotAConstant("logical operator requires boolean operands".to_string()),
        };
    }

    if matches!(op, BinaryOp::Eq | BinaryOp::Ne) {
        let lhs = propagate!(evaluate(left, scope));
        let rhs = propagate!(evaluate(right, scope));
        return evaluate_equality(op, lhs, rhs);
    }

    let lhs = propagate!(evaluate(left, scope));
    let rhs = propagate!(evaluate(right, scope));
    evaluate_numeric_binary(op, lhs, rhs)
}

fn evaluate_equality(op: BinaryOp, lhs: Const, rhs: Const) -> EvalOutcome {
    let equal = match (&lhs, &rhs) {
        (Const::Boolean(a), Const::Boolean(b)) => a == b,
        (Const::String(a), Const::String(b)) => a == b,
        (a, b) if const_prim_kind(a).is_some() && const_prim_kind(b).is_some() => {
            let promoted = promote(const_prim_kind(a).unwrap(), const_prim_kind(b).unwrap());
            let a = widen_to(a, promoted);
            let b = widen_to(b, promoted);
            a == b
        }
        _ => return EvalOutcome::NotAConstant("incomparable operand types".to_string()),
    };
    EvalOutcome::Value(Const::Boolean(if op == BinaryOp::Eq { equal } else { !equal }))
}

fn evaluate_numeric_binary(op: BinaryOp, lhs: Const, rhs: Const) -> EvalOutcome {
    let (Some(lk), Some(rk)) = (const_prim_kind(&lhs), const_prim_kind(&rhs)) else {
        return EvalOutcome::NotAConstant("operator requires numeric operands".to_string());
    };
    if lk == headc_symbols::PrimKind::Boolean || rk == headc_symbols::PrimKind::Boolean {
        return EvalOutcome::NotAConstant("operator requires numeric operands".to_string());
    }

    if matches!(op, BinaryOp::Shl | BinaryOp::Shr | BinaryOp::UShr) {
        // Shifts promote only the left operand; the right operand is masked,
        // never widened with it.
        let left_kind = unary_promote(lk);
        let left = widen_to(&lhs, left_kind);
        let shift_amount = match widen_to(&rhs, unary_promote(rk)) {
            Const::Int(v) => v as u32,
            Const::Long(v) => v as u32,
            _ => unreachable!(),
        };
        return EvalOutcome::Value(apply_shift(op, &left, shift_amount));
    }

    let promoted = promote(unary_promote(lk), unary_promote(rk));
    let left = widen_to(&lhs, promoted);
    let right = widen_to(&rhs, promoted);

    if matches!(
        op,
        BinaryOp::Lt | BinaryOp::Gt | BinaryOp::Le | BinaryOp::Ge
    ) {
        return EvalOutcome::Value(Const::Boolean(apply_comparison(op, &left, &right)));
    }

    match apply_arithmetic(op, &left, &right) {
        Some(v) => EvalOutcome::Value(v),
        None => EvalOutcome::NotAConstant("division or modulo by zero".to_string()),
    }
}

fn apply_shift(op: BinaryOp, left: &Const, shift_amount: u32) -> Const {
    match left {
        Const::Int(v) => {
            let amount = shift_amount & 31;
            Const::Int(match op {
                BinaryOp::Shl => v.wrapping_shl(amount),
                BinaryOp::Shr => v.wrapping_shr(amount),
                BinaryOp::UShr => ((*v as u32).wrapping_shr(amount)) as i32,
                _ => unreachable!(),
            })
        }
        Const::Long(v) => {
            let amount = shift_amount & 63;
            Const::Long(match op {
                BinaryOp::Shl => v.wrapping_shl(amount),
                BinaryOp::Shr => v.wrapping_shr(amount),
                BinaryOp::UShr => ((*v as u64).wrapping_shr(amount)) as i64,
                _ => unreachable!(),
            })
        }
        _ => unreachable!("shift left operand must be promoted to int or long"),
    }
}

fn apply_comparison(op: BinaryOp, left: &Const, right: &Const) -> bool {
    macro_rules! cmp {
        ($a:expr, $b:expr) => {
            match op {
                BinaryOp::Lt => $a < $b,
                BinaryOp::Gt => $a > $b,
                BinaryOp::Le => $a <= $b,
                BinaryOp::Ge => $a >= $b,
                _ => unreachable!(),
            }
        };
    }
    match (left, right) {
        (Const::Int(a), Const::Int(b)) => cmp!(a, b),
        (Const::Long(a), Const::Long(b)) => cmp!(a, b),
        (Const::Float(a), Const::Float(b)) => cmp!(a, b),
        (Const::Double(a), Const::Double(b)) => cmp!(a, b),
        _ => unreachable!("operands should already share a promoted numeric kind"),
    }
}

fn apply_arithmetic(op: BinaryOp, left: &Const, right: &Const) -> Option<Const> {
    Some(match (left, right) {
        (Const::Int(a), Const::Int(b)) => Const::Int(match op {
            BinaryOp::Add => a.wrapping_add(*b),
            BinaryOp::Sub => a.wrapping_sub(*b),
            BinaryOp::Mul => a.wrapping_mul(*b),
            BinaryOp::Div => a.checked_div(*b)?,
            BinaryOp::Rem => a.checked_rem(*b)?,
            BinaryOp::BitAnd => a & b,
            BinaryOp::BitOr => a | b,
            BinaryOp::BitXor => a ^ b,
            _ => unreachable!(),
        }),
        (Const::Long(a), Const::Long(b)) => Const::Long(match op {
            BinaryOp::Add => a.wrapping_add(*b),
            BinaryOp::Sub => a.wrapping_sub(*b),
            BinaryOp::Mul => a.wrapping_mul(*b),
            BinaryOp::Div => a.checked_div(*b)?,
            BinaryOp::Rem => a.checked_rem(*b)?,
            BinaryOp::BitAnd => a & b,
            BinaryOp::BitOr => a | b,
            BinaryOp::BitXor => a ^ b,
            _ => unreachable!(),
        }),
        (Const::Float(a), Const::Float(b)) => Const::Float(match op {
            BinaryOp::Add => a + b,
            BinaryOp::Sub => a - b,
            BinaryOp::Mul => a * b,
            BinaryOp::Div => a / b,
            BinaryOp::Rem => a % b,
            _ => unreachable!("bitwise operator on floating point"),
        }),
        (Const::Double(a), Const::Double(b)) => Const::Double(match op {
            BinaryOp::Add => a + b,
            BinaryOp::Sub => a - b,
            BinaryOp::Mul => a * b,
            BinaryOp::Div => a / b,
            BinaryOp::Rem => a % b,
            _ => unreachable!("bitwise operator on floating point"),
        }),
        _ => unreachable!("operands should already share a promoted numeric kind"),
    })
}

fn evaluate_ternary(cond: &Expr, then_branch: &Expr, else_branch: &Expr, scope: &dyn ConstScope) -> EvalOutcome {
    let cond = propagate!(evaluate(cond, scope));
    match cond {
        Const::Boolean(true) => evaluate(then_branch, scope),
        Const::Boolean(false) => evaluate(else_branch, scope),
        _ => EvalOutcome::NotAConstant("ternary condition must be boolean".to_string()),
    }
}

fn evaluate_cast(ty: &headc_ast::TypeRefNode, operand: &Expr, scope: &dyn ConstScope) -> EvalOutcome {
    let value = propagate!(evaluate(operand, scope));
    match ty {
        headc_ast::TypeRefNode::Primitive(prim, _) => {
            let target = map_prim_kind(*prim);
            match crate::convert::narrow_to(&value, target) {
                Some(v) => EvalOutcome::Value(v),
                None => EvalOutcome::NotAConstant(format!("value does not fit in {target:?}")),
            }
        }
        _ => EvalOutcome::Value(value),
    }
}

fn map_prim_kind(p: headc_ast::PrimitiveKind) -> headc_symbols::PrimKind {
    use headc_ast::PrimitiveKind as P;
    use headc_symbols::PrimKind as K;
    match p {
        P::Boolean => K::Boolean,
        P::Byte => K::Byte,
        P::Char => K::Char,
        P::Short => K::Short,
        P::Int => K::Int,
        P::Long => K::Long,
        P::Float => K::Float,
        P::Double => K::Double,
    }
}

fn evaluate_array(elements: &[Expr], scope: &dyn ConstScope) -> EvalOutcome {
    let mut values = Vec::with_capacity(elements.len());
    for element in elements {
        values.push(propagate!(evaluate(element, scope)));
    }
    EvalOutcome::Value(Const::Array(values))
}

fn evaluate_annotation(node: &AnnotationUseNode, scope: &dyn ConstScope) -> EvalOutcome {
    let annotation_ty = scope.resolve_type(&node.type_ref);
    let Some(class) = annotation_ty.class_symbol() else {
        return EvalOutcome::NotAConstant("annotation type did not resolve to a class".to_string());
    };

    let mut resolved = FxHashMap::default();
    for (name, expr) in &node.args {
        let value = propagate!(evaluate(expr, scope));
        let key = name.clone().unwrap_or_else(|| "value".to_string());
        resolved.insert(key, value);
    }

    EvalOutcome::Value(Const::Annotation(AnnotationUse {
        annotation_class: class,
        raw_args: node.args.clone(),
        resolved,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use headc_ast::{Expr as E, LiteralNode as L, Span};
    use headc_symbols::{ClassSymbol, FieldSymbol};

    struct EmptyScope;
    impl ConstScope for EmptyScope {
        fn resolve_name(&self, _: &str) -> Option<ConstRef> {
            None
        }
        fn resolve_type_name(&self, _: &str) -> Option<headc_symbols::ClassSymbol> {
            None
        }
        fn field_in_class(&self, _: ClassSymbol, _: &str) -> Option<FieldSymbol> {
            None
        }
        fn enum_constant_exists(&self, _: ClassSymbol, _: &str) -> bool {
            false
        }
        fn field_status(&self, _: FieldSymbol) -> FieldConstStatus {
            FieldConstStatus::NotConstant
        }
        fn field_value(&self, _: FieldSymbol) -> Option<Const> {
            None
        }
        fn resolve_type(&self, _: &headc_ast::TypeRefNode) -> headc_symbols::Type {
            headc_symbols::Type::Void
        }
    }

    fn lit_int(v: i32) -> Expr {
        E::Literal(L::Int(v), Span::at(0))
    }

    #[test]
    fn folds_arithmetic_with_precedence_already_resolved_by_parser() {
        // 1 + 2 * 3
        let expr = E::Binary {
            op: BinaryOp::Add,
            left: Box::new(lit_int(1)),
            right: Box::new(E::Binary {
                op: BinaryOp::Mul,
                left: Box::new(lit_int(2)),
                right: Box::new(lit_int(3)),
                span: Span::at(0),
            }),
            span: Span::at(0),
        };
        assert_eq!(evaluate(&expr, &EmptyScope), EvalOutcome::Value(Const::Int(7)));
    }

    #[test]
    fn int_arithmetic_wraps() {
        let expr = E::Binary {
            op: BinaryOp::Add,
            left: Box::new(lit_int(i32::MAX)),
            right: Box::new(lit_int(1)),
            span: Span::at(0),
        };
        assert_eq!(
            evaluate(&expr, &EmptyScope),
            EvalOutcome::Value(Const::Int(i32::MIN))
        );
    }

    #[test]
    fn division_by_zero_is_not_a_constant() {
        let expr = E::Binary {
            op: BinaryOp::Div,
            left: Box::new(lit_int(1)),
            right: Box::new(lit_int(0)),
            span: Span::at(0),
        };
        assert!(matches!(evaluate(&expr, &EmptyScope), EvalOutcome::NotAConstant(_)));
    }

    #[test]
    fn string_concatenation_stringifies_numbers() {
        let expr = E::Binary {
            op: BinaryOp::Add,
            left: Box::new(E::Literal(L::String("n=".to_string()), Span::at(0))),
            right: Box::new(lit_int(7)),
            span: Span::at(0),
        };
        assert_eq!(
            evaluate(&expr, &EmptyScope),
            EvalOutcome::Value(Const::String("n=7".to_string()))
        );
    }

    #[test]
    fn shift_amount_is_masked() {
        // 1 << 33 == 1 << 1 for int (masked by 31, so 33 & 31 == 1)
        let expr = E::Binary {
            op: BinaryOp::Shl,
            left: Box::new(lit_int(1)),
            right: Box::new(lit_int(33)),
            span: Span::at(0),
        };
        assert_eq!(evaluate(&expr, &EmptyScope), EvalOutcome::Value(Const::Int(2)));
    }

    #[test]
    fn null_literal_is_not_a_constant() {
        let expr = E::Literal(L::Null, Span::at(0));
        assert!(matches!(evaluate(&expr, &EmptyScope), EvalOutcome::NotAConstant(_)));
    }
}
