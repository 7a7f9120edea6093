//! Primitive widening/narrowing conversions and binary numeric promotion.
//!
//! These follow the platform's promotion rules exactly: integral types
//! narrower than `int` always promote to `int` before arithmetic; if either
//! operand is `double`/`float`/`long`, both operands promote to that type in
//! that priority order. Narrowing (e.g. assigning an `int` constant to a
//! `byte` field) is only attempted when the binder assigns an evaluated
//! constant to a declared field type.

use headc_symbols::{Const, PrimKind};

/// The promoted numeric kind two operands share for a binary operator.
pub fn promote(a: PrimKind, b: PrimKind) -> PrimKind {
    use PrimKind::*;
    if a == Double || b == Double {
        Double
    } else if a == Float || b == Float {
        Float
    } else if a == Long || b == Long {
        Long
    } else {
        Int
    }
}

/// Unary numeric promotion: everything narrower than `int` becomes `int`.
pub fn unary_promote(k: PrimKind) -> PrimKind {
    use PrimKind::*;
    match k {
        Boolean => Boolean,
        Byte | Short | Char => Int,
        other => other,
    }
}

pub fn const_prim_kind(c: &Const) -> Option<PrimKind> {
    match c {
        Const::Boolean(_) => Some(PrimKind::Boolean),
        Const::Byte(_) => Some(PrimKind::Byte),
        Const::Short(_) => Some(PrimKind::Short),
        Const::Char(_) => Some(PrimKind::Char),
        Const::Int(_) => Some(PrimKind::Int),
        Const::Long(_) => Some(PrimKind::Long),
        Const::Float(_) => Some(PrimKind::Float),
        Const::Double(_) => Some(PrimKind::Double),
        _ => None,
    }
}

fn as_i64(c: &Const) -> i64 {
    match c {
        Const::Byte(v) => *v as i64,
        Const::Short(v) => *v as i64,
        Const::Char(v) => *v as i64,
        Const::Int(v) => *v as i64,
        Const::Long(v) => *v,
        Const::Boolean(v) => *v as i64,
        _ => unreachable!("as_i64 called on non-integral const"),
    }
}

fn as_f64(c: &Const) -> f64 {
    match c {
        Const::Float(v) => *v as f64,
        Const::Double(v) => *v,
        other => as_i64(other) as f64,
    }
}

/// Widen `c` (already unary-promoted) to the given promoted kind, used to
/// align both operands of a binary operator before evaluating it.
pub fn widen_to(c: &Const, target: PrimKind) -> Const {
    match target {
        PrimKind::Int => Const::Int(as_i64(c) as i32),
        PrimKind::Long => Const::Long(as_i64(c)),
        PrimKind::Float => Const::Float(as_f64(c) as f32),
        PrimKind::Double => Const::Double(as_f64(c)),
        PrimKind::Boolean => c.clone(),
        other => unreachable!("cannot widen to sub-int kind {other:?}"),
    }
}

/// Narrowing/widening conversion applied when a constant of an evaluated
/// type is assigned to a field declared with a different (but compatible)
/// primitive type, e.g. `byte B = 1;`. Returns `None` when the value does
/// not fit, which is a `NotAConstant` at the call site (it would be a
/// `lossy conversion` diagnostic in a full compiler; headc's core only
/// reports the closed error set in section 7, so out-of-range assignment is
/// folded into `NotAConstant`).
pub fn narrow_to(c: &Const, target: PrimKind) -> Option<Const> {
    match (c, target) {
        (Const::Boolean(b), PrimKind::Boolean) => Some(Const::Boolean(*b)),
        (_, PrimKind::Boolean) | (Const::Boolean(_), _) => None,
        (_, PrimKind::Char) => {
            let v = as_i64(c);
            char::from_u32(v as u32).filter(|_| (0..=0xFFFF).contains(&v)).map(Const::Char)
        }
        (_, PrimKind::Byte) => {
            let v = as_i64(c);
            i8::try_from(v).ok().map(Const::Byte)
        }
        (_, PrimKind::Short) => {
            let v = as_i64(c);
            i16::try_from(v).ok().map(Const::Short)
        }
        (_, PrimKind::Int) => Some(Const::Int(as_i64(c) as i32)),
        (_, PrimKind::Long) => Some(Const::Long(as_i64(c))),
        (_, PrimKind::Float) => Some(Const::Float(as_f64(c) as f32)),
        (_, PrimKind::Double) => Some(Const::Double(as_f64(c))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn promotion_prefers_double_over_everything() {
        assert_eq!(promote(PrimKind::Int, PrimKind::Double), PrimKind::Double);
        assert_eq!(promote(PrimKind::Long, PrimKind::Float), PrimKind::Float);
        assert_eq!(promote(PrimKind::Byte, PrimKind::Short), PrimKind::Int);
    }

    #[test]
    fn narrowing_rejects_out_of_range() {
        assert_eq!(narrow_to(&Const::Int(200), PrimKind::Byte), None);
        assert_eq!(narrow_to(&Const::Int(100), PrimKind::Byte), Some(Const::Byte(100)));
    }
}
