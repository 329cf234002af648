use smallvec::SmallVec;

use crate::ir::{Expr, ExprKind};
use crate::types::{ScalarKind, Type, BOOL};

use super::Analyzer;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SwizzlePart {
    Component(u8),
    Zero,
    One,
}

impl Analyzer<'_> {
    pub(super) fn convert_constructor(
        &mut self,
        ty: Type,
        args: Vec<Expr>,
        line: usize,
    ) -> Option<Expr> {
        if let [arg] = args.as_slice() {
            if arg.ty == ty {
                return args.into_iter().next();
            }
        }

        match &ty {
            Type::Scalar(scalar) if scalar.is_number() => {
                let scalar = *scalar;
                self.scalar_constructor(ty, scalar, args, line)
            }
            Type::Vector(..) | Type::Matrix(..) => self.compound_constructor(ty, args, line),
            _ => {
                self.error(line, format!("cannot construct '{}'", ty));
                None
            }
        }
    }

    fn scalar_constructor(
        &mut self,
        ty: Type,
        scalar: ScalarKind,
        args: Vec<Expr>,
        line: usize,
    ) -> Option<Expr> {
        if args.len() != 1 {
            self.error(
                line,
                format!(
                    "invalid arguments to '{}' constructor, (expected exactly 1 argument, but found {})",
                    ty,
                    args.len()
                ),
            );
            return None;
        }
        let arg = args.into_iter().next()?;

        match arg.kind {
            ExprKind::Int(value) if scalar.is_float() => {
                return Some(Expr::float_literal(value as f64, ty, line))
            }
            ExprKind::Int(value) if scalar.is_integer() => {
                return Some(Expr::int_literal(value, ty, line))
            }
            ExprKind::Float(value) if scalar.is_float() => {
                return Some(Expr::float_literal(value, ty, line))
            }
            _ => {}
        }

        if arg.ty == BOOL {
            let literal = |value: u8| {
                if scalar.is_float() {
                    Expr::float_literal(f64::from(value), ty.clone(), line)
                } else {
                    Expr::int_literal(i64::from(value), ty.clone(), line)
                }
            };
            if let ExprKind::Bool(value) = arg.kind {
                return Some(literal(u8::from(value)));
            }
            return Some(Expr::new(
                ExprKind::Ternary {
                    test: Box::new(arg),
                    if_true: Box::new(literal(1)),
                    if_false: Box::new(literal(0)),
                },
                ty.clone(),
                line,
            ));
        }

        if !(arg.ty.is_scalar() && arg.ty.is_number()) {
            self.error(
                line,
                format!(
                    "invalid argument to '{}' constructor (expected a number or bool, but found '{}')",
                    ty, arg.ty
                ),
            );
            return None;
        }
        Some(Expr::new(ExprKind::Constructor { args: vec![arg] }, ty, line))
    }

    fn compound_constructor(&mut self, ty: Type, args: Vec<Expr>, line: usize) -> Option<Expr> {
        let component = Type::Scalar(ty.component()?);

        // Matrix resize: any matrix converts to any other.
        if let [arg] = args.as_slice() {
            if ty.is_matrix() && arg.ty.is_matrix() {
                return Some(Expr::new(ExprKind::Constructor { args }, ty, line));
            }
        }

        let single = args.len() == 1;
        let mut converted = Vec::with_capacity(args.len());
        let mut slots = 0u32;
        for arg in args {
            if arg.ty.is_scalar() {
                converted.push(self.coerce(arg, &component)?);
                slots += 1;
            } else if arg.ty.is_vector() && arg.ty.is_number() == ty.is_number() {
                slots += u32::from(arg.ty.columns());
                converted.push(arg);
            } else {
                self.error(
                    line,
                    format!("'{}' is not a valid parameter to '{}' constructor", arg.ty, ty),
                );
                return None;
            }
        }

        let broadcast = single && slots == 1;
        if !broadcast && slots != ty.slot_count() {
            self.error(
                line,
                format!(
                    "invalid arguments to '{}' constructor (expected {} scalars, but found {})",
                    ty,
                    ty.slot_count(),
                    slots
                ),
            );
            return None;
        }
        Some(Expr::new(
            ExprKind::Constructor { args: converted },
            ty,
            line,
        ))
    }

    /// Resolves a swizzle mask against `base`. Masks mixing components with
    /// the constants `0` and `1` lower to a constructor.
    pub(super) fn convert_swizzle(&mut self, base: Expr, mask: &str, line: usize) -> Option<Expr> {
        let Some(scalar) = base.ty.component().filter(|_| !base.ty.is_matrix()) else {
            self.error(line, format!("cannot swizzle value of type '{}'", base.ty));
            return None;
        };
        if mask.chars().count() > 4 {
            self.error(line, format!("too many components in swizzle mask '{}'", mask));
            return None;
        }

        let width = base.ty.columns();
        let mut parts: SmallVec<[SwizzlePart; 4]> = SmallVec::new();
        for c in mask.chars() {
            let part = match c {
                'x' | 'r' | 's' => SwizzlePart::Component(0),
                'y' | 'g' | 't' => SwizzlePart::Component(1),
                'z' | 'b' | 'p' => SwizzlePart::Component(2),
                'w' | 'a' | 'q' => SwizzlePart::Component(3),
                '0' => SwizzlePart::Zero,
                '1' => SwizzlePart::One,
                _ => SwizzlePart::Component(u8::MAX),
            };
            if matches!(part, SwizzlePart::Component(index) if index >= width) {
                self.error(line, format!("invalid swizzle component '{}'", c));
                return None;
            }
            parts.push(part);
        }

        let components: SmallVec<[u8; 4]> = parts
            .iter()
            .filter_map(|part| match part {
                SwizzlePart::Component(index) => Some(*index),
                _ => None,
            })
            .collect();
        if components.is_empty() {
            self.error(line, "swizzle must refer to base expression");
            return None;
        }
        if components.len() == parts.len() {
            return Some(Expr::swizzle(base, &components, line));
        }

        let constant = |one: bool| match scalar {
            ScalarKind::Bool => Expr::bool_literal(one, line),
            s if s.is_float() => {
                Expr::float_literal(f64::from(u8::from(one)), Type::Scalar(s), line)
            }
            s => Expr::int_literal(i64::from(one), Type::Scalar(s), line),
        };
        let mut args = Vec::new();
        let mut run: SmallVec<[u8; 4]> = SmallVec::new();
        for part in &parts {
            match part {
                SwizzlePart::Component(index) => run.push(*index),
                SwizzlePart::Zero | SwizzlePart::One => {
                    if !run.is_empty() {
                        args.push(Expr::swizzle(base.clone(), &run, line));
                        run.clear();
                    }
                    args.push(constant(*part == SwizzlePart::One));
                }
            }
        }
        if !run.is_empty() {
            args.push(Expr::swizzle(base, &run, line));
        }
        Some(Expr::new(
            ExprKind::Constructor { args },
            Type::compound(scalar, parts.len() as u8, 1),
            line,
        ))
    }
}
