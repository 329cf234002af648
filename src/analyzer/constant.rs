use thiserror::Error;

use crate::ir::{BinaryOp, ConstValue, Expr, ExprKind, PrefixOp, VarId};
use crate::types::{ScalarKind, Type, BOOL};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FoldError {
    #[error("division by zero")]
    DivisionByZero,
}

/// Applies `op` to two constants of the same family. `Ok(None)` means the
/// operator does not fold for these operands.
pub fn apply_binary(
    left: ConstValue,
    op: BinaryOp,
    right: ConstValue,
) -> Result<Option<ConstValue>, FoldError> {
    use ConstValue::{Bool, Float, Int};

    let value = match (left, right) {
        (Bool(l), Bool(r)) => match op {
            BinaryOp::LogicalAnd => Bool(l && r),
            BinaryOp::LogicalOr => Bool(l || r),
            BinaryOp::LogicalXor => Bool(l ^ r),
            BinaryOp::Equal => Bool(l == r),
            BinaryOp::NotEqual => Bool(l != r),
            _ => return Ok(None),
        },
        (Int(l), Int(r)) => match op {
            BinaryOp::Add => Int(l.wrapping_add(r)),
            BinaryOp::Subtract => Int(l.wrapping_sub(r)),
            BinaryOp::Multiply => Int(l.wrapping_mul(r)),
            BinaryOp::Divide | BinaryOp::Modulo if r == 0 => {
                return Err(FoldError::DivisionByZero)
            }
            BinaryOp::Divide => Int(l.wrapping_div(r)),
            BinaryOp::Modulo => Int(l.wrapping_rem(r)),
            BinaryOp::ShiftLeft => Int(l.wrapping_shl(r as u32)),
            BinaryOp::ShiftRight => Int(l.wrapping_shr(r as u32)),
            BinaryOp::BitAnd => Int(l & r),
            BinaryOp::BitOr => Int(l | r),
            BinaryOp::BitXor => Int(l ^ r),
            BinaryOp::Equal => Bool(l == r),
            BinaryOp::NotEqual => Bool(l != r),
            BinaryOp::Less => Bool(l < r),
            BinaryOp::LessEqual => Bool(l <= r),
            BinaryOp::Greater => Bool(l > r),
            BinaryOp::GreaterEqual => Bool(l >= r),
            _ => return Ok(None),
        },
        (Float(l), Float(r)) => match op {
            BinaryOp::Add => Float(l + r),
            BinaryOp::Subtract => Float(l - r),
            BinaryOp::Multiply => Float(l * r),
            BinaryOp::Divide if r == 0.0 => return Err(FoldError::DivisionByZero),
            BinaryOp::Divide => Float(l / r),
            BinaryOp::Equal => Bool(l == r),
            BinaryOp::NotEqual => Bool(l != r),
            BinaryOp::Less => Bool(l < r),
            BinaryOp::LessEqual => Bool(l <= r),
            BinaryOp::Greater => Bool(l > r),
            BinaryOp::GreaterEqual => Bool(l >= r),
            _ => return Ok(None),
        },
        _ => return Ok(None),
    };
    Ok(Some(value))
}

pub fn apply_prefix(op: PrefixOp, value: ConstValue) -> Option<ConstValue> {
    match (op, value) {
        (PrefixOp::Plus, v) => Some(v),
        (PrefixOp::Minus, ConstValue::Int(i)) => Some(ConstValue::Int(i.wrapping_neg())),
        (PrefixOp::Minus, ConstValue::Float(f)) => Some(ConstValue::Float(-f)),
        (PrefixOp::Not, ConstValue::Bool(b)) => Some(ConstValue::Bool(!b)),
        (PrefixOp::BitNot, ConstValue::Int(i)) => Some(ConstValue::Int(!i)),
        _ => None,
    }
}

/// Converts a scalar constant the way a scalar constructor of `target` would.
pub fn convert(value: ConstValue, target: ScalarKind) -> Option<ConstValue> {
    let converted = match (value, target) {
        (v, ScalarKind::Bool) => match v {
            ConstValue::Bool(b) => ConstValue::Bool(b),
            _ => return None,
        },
        (ConstValue::Bool(b), t) if t.is_float() => ConstValue::Float(if b { 1.0 } else { 0.0 }),
        (ConstValue::Bool(b), _) => ConstValue::Int(i64::from(b)),
        (ConstValue::Int(i), t) if t.is_float() => ConstValue::Float(i as f64),
        (ConstValue::Float(f), t) if t.is_integer() => ConstValue::Int(f as i64),
        (v, _) => v,
    };
    Some(converted)
}

pub fn literal(value: ConstValue, ty: Type, line: usize) -> Expr {
    match value {
        ConstValue::Bool(b) => Expr::bool_literal(b, line),
        ConstValue::Int(i) => Expr::int_literal(i, ty, line),
        ConstValue::Float(f) => Expr::float_literal(f, ty, line),
    }
}

/// Folds a binary expression whose operands have already been converted to
/// their common type. Returns `Ok(None)` when nothing folds.
pub fn fold_binary(
    left: &Expr,
    op: BinaryOp,
    right: &Expr,
    result_ty: &Type,
) -> Result<Option<Expr>, FoldError> {
    // true && x, false || x, and their short-circuiting twins.
    if let ExprKind::Bool(l) = left.kind {
        match (op, l) {
            (BinaryOp::LogicalAnd, true) | (BinaryOp::LogicalOr, false) => {
                return Ok(Some(right.clone()))
            }
            (BinaryOp::LogicalAnd, false) | (BinaryOp::LogicalOr, true) => {
                return Ok(Some(Expr::bool_literal(l, left.line)))
            }
            _ => {}
        }
    }

    let (Some(l), Some(r)) = (left.constant_value(), right.constant_value()) else {
        return Ok(None);
    };
    let folded = apply_binary(l, op, r)?.map(|value| {
        let ty = if matches!(value, ConstValue::Bool(_)) {
            BOOL
        } else {
            result_ty.clone()
        };
        literal(value, ty, left.line)
    });
    Ok(folded)
}

/// Whether a divisor is known to be zero.
pub fn is_zero(value: Option<ConstValue>) -> bool {
    match value {
        Some(ConstValue::Int(value)) => value == 0,
        Some(ConstValue::Float(value)) => value == 0.0,
        _ => false,
    }
}

pub fn fold_prefix(op: PrefixOp, operand: &Expr) -> Option<Expr> {
    let value = apply_prefix(op, operand.constant_value()?)?;
    Some(literal(value, operand.ty.clone(), operand.line))
}

/// Evaluates `expr` at compile time. `lookup` supplies the values of
/// variables known to be constant at this point.
pub fn eval(expr: &Expr, lookup: &impl Fn(VarId) -> Option<ConstValue>) -> Option<ConstValue> {
    match &expr.kind {
        ExprKind::Bool(_) | ExprKind::Int(_) | ExprKind::Float(_) => expr.constant_value(),
        ExprKind::Variable { var, .. } => lookup(*var),
        ExprKind::Binary { left, op, right } => {
            let l = eval(left, lookup)?;
            match (op, l) {
                (BinaryOp::LogicalAnd, ConstValue::Bool(false)) => return Some(l),
                (BinaryOp::LogicalOr, ConstValue::Bool(true)) => return Some(l),
                _ => {}
            }
            let r = eval(right, lookup)?;
            let (l, r) = unify(l, r);
            apply_binary(l, *op, r).ok().flatten()
        }
        ExprKind::Prefix { op, operand } => apply_prefix(*op, eval(operand, lookup)?),
        ExprKind::Constructor { args } if args.len() == 1 && expr.ty.is_scalar() => {
            convert(eval(&args[0], lookup)?, expr.ty.component()?)
        }
        ExprKind::Ternary {
            test,
            if_true,
            if_false,
        } => match eval(test, lookup)? {
            ConstValue::Bool(true) => eval(if_true, lookup),
            ConstValue::Bool(false) => eval(if_false, lookup),
            _ => None,
        },
        _ => None,
    }
}

/// Promotes an int/float pair to float so mixed operands compare.
fn unify(l: ConstValue, r: ConstValue) -> (ConstValue, ConstValue) {
    match (l, r) {
        (ConstValue::Int(i), ConstValue::Float(_)) => (ConstValue::Float(i as f64), r),
        (ConstValue::Float(_), ConstValue::Int(i)) => (l, ConstValue::Float(i as f64)),
        _ => (l, r),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{FLOAT_LITERAL, INT_LITERAL};

    #[test]
    fn integer_division_by_zero_is_reported() {
        assert_eq!(
            apply_binary(ConstValue::Int(1), BinaryOp::Divide, ConstValue::Int(0)),
            Err(FoldError::DivisionByZero)
        );
        assert_eq!(
            apply_binary(ConstValue::Float(1.0), BinaryOp::Divide, ConstValue::Float(0.0)),
            Err(FoldError::DivisionByZero)
        );
    }

    #[test]
    fn integer_overflow_wraps() {
        assert_eq!(
            apply_binary(ConstValue::Int(i64::MAX), BinaryOp::Add, ConstValue::Int(1)),
            Ok(Some(ConstValue::Int(i64::MIN)))
        );
    }

    #[test]
    fn short_circuit_keeps_right_operand() {
        let left = Expr::bool_literal(true, 1);
        let right = Expr::int_literal(3, INT_LITERAL, 1);
        let folded = fold_binary(&left, BinaryOp::LogicalAnd, &right, &BOOL)
            .expect("no error")
            .expect("folds");
        assert_eq!(folded, right);
    }

    #[test]
    fn comparison_folds_to_bool() {
        let left = Expr::float_literal(1.0, FLOAT_LITERAL, 1);
        let right = Expr::float_literal(2.0, FLOAT_LITERAL, 1);
        let folded = fold_binary(&left, BinaryOp::Less, &right, &BOOL)
            .expect("no error")
            .expect("folds");
        assert_eq!(folded.kind, ExprKind::Bool(true));
    }
}
