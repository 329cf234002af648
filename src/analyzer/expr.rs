use crate::ir::{BinaryOp, Expr, ExprKind, FnId, PostfixOp, PrefixOp, RefKind};
use crate::modifiers::ModifierFlags;
use crate::parser::ast;
use crate::symbols::Symbol;
use crate::types::{ScalarKind, Type, BOOL, FLOAT_LITERAL, INT, INT_LITERAL};

use super::{constant, Analyzer};

impl Analyzer<'_> {
    pub(super) fn convert_expr(&mut self, expr: &ast::Expr) -> Option<Expr> {
        let line = expr.line;
        match &expr.kind {
            ast::ExprKind::Bool(value) => Some(Expr::bool_literal(*value, line)),
            ast::ExprKind::Int(value) => Some(Expr::int_literal(*value, INT_LITERAL, line)),
            ast::ExprKind::UInt(value) => Some(Expr::int_literal(
                *value,
                Type::Scalar(ScalarKind::UInt),
                line,
            )),
            ast::ExprKind::Float(value) => Some(Expr::float_literal(*value, FLOAT_LITERAL, line)),
            ast::ExprKind::Identifier(name) => self.convert_identifier(name, line),
            ast::ExprKind::Binary { left, op, right } => self.convert_binary(left, *op, right),
            ast::ExprKind::Prefix { op, operand } => self.convert_prefix(*op, operand, line),
            ast::ExprKind::Postfix { op, operand } => self.convert_postfix(*op, operand, line),
            ast::ExprKind::Call { callee, args } => match &callee.kind {
                ast::ExprKind::Identifier(name) => self.call_named(name, args, line),
                _ => {
                    self.convert_expr(callee)?;
                    self.error(line, "not a function");
                    None
                }
            },
            ast::ExprKind::Constructor { type_name, args } => {
                let ty = match self.symbols.lookup(type_name).cloned() {
                    Some(Symbol::Type(ty)) => ty,
                    Some(_) => return self.call_named(type_name, args, line),
                    None => match Type::from_name(type_name) {
                        Some(ty) => ty,
                        None => {
                            self.error(line, format!("unknown type '{}'", type_name));
                            return None;
                        }
                    },
                };
                let args = self.convert_args(args)?;
                self.convert_constructor(ty, args, line)
            }
            ast::ExprKind::Index { base, index } => self.convert_index(base, index, line),
            ast::ExprKind::Field { base, name } => self.convert_field(base, name, line),
            ast::ExprKind::Swizzle { base, mask } => {
                let base = self.convert_expr(base)?;
                self.convert_swizzle(base, mask, line)
            }
            ast::ExprKind::Ternary {
                test,
                if_true,
                if_false,
            } => self.convert_ternary(test, if_true, if_false, line),
        }
    }

    /// Converts every argument, reporting all failures before giving up.
    fn convert_args(&mut self, args: &[ast::Expr]) -> Option<Vec<Expr>> {
        let converted: Vec<Option<Expr>> = args.iter().map(|arg| self.convert_expr(arg)).collect();
        converted.into_iter().collect()
    }

    /// Implicitly converts `expr` to `target`, reporting a mismatch.
    pub(super) fn coerce(&mut self, expr: Expr, target: &Type) -> Option<Expr> {
        if expr.ty == *target {
            return Some(expr);
        }
        if !expr.ty.can_coerce_to(target) {
            self.error(
                expr.line,
                format!("expected '{}', but found '{}'", target, expr.ty),
            );
            return None;
        }
        Some(retype(expr, target))
    }

    fn convert_identifier(&mut self, name: &str, line: usize) -> Option<Expr> {
        match self.symbols.lookup(name).cloned() {
            Some(Symbol::Variable(var)) => {
                let ty = self.program.variables[var].ty.clone();
                Some(Expr::variable(var, ty, RefKind::Read, line))
            }
            Some(Symbol::EnumValue(value)) => Some(Expr::int_literal(value, INT_LITERAL, line)),
            Some(Symbol::Functions(_)) => {
                self.error(line, "expected '(' to begin function call");
                None
            }
            Some(Symbol::Type(_)) => {
                self.error(line, "expected '(' to begin constructor invocation");
                None
            }
            None if Type::from_name(name).is_some() => {
                self.error(line, "expected '(' to begin constructor invocation");
                None
            }
            None => {
                self.error(line, format!("unknown identifier '{}'", name));
                None
            }
        }
    }

    fn call_named(&mut self, name: &str, args: &[ast::Expr], line: usize) -> Option<Expr> {
        match self.symbols.lookup(name).cloned() {
            Some(Symbol::Functions(_)) => {
                let overloads = self.symbols.overloads(name);
                let args = self.convert_args(args)?;
                let function = self.resolve_overload(name, &overloads, &args, line)?;
                self.call(function, args, line)
            }
            Some(Symbol::Type(ty)) => {
                let args = self.convert_args(args)?;
                self.convert_constructor(ty, args, line)
            }
            Some(Symbol::Variable(_)) | Some(Symbol::EnumValue(_)) => {
                self.error(line, "not a function");
                None
            }
            None => match Type::from_name(name) {
                Some(ty) => {
                    let args = self.convert_args(args)?;
                    self.convert_constructor(ty, args, line)
                }
                None => {
                    self.error(line, format!("unknown identifier '{}'", name));
                    None
                }
            },
        }
    }

    /// Picks the overload with the cheapest total argument conversion.
    fn resolve_overload(
        &mut self,
        name: &str,
        overloads: &[FnId],
        args: &[Expr],
        line: usize,
    ) -> Option<FnId> {
        if let [only] = overloads {
            let expected = self.program.functions[*only].params.len();
            if expected != args.len() {
                self.error(
                    line,
                    format!(
                        "call to '{}' expected {} argument{}, but found {}",
                        name,
                        expected,
                        if expected == 1 { "" } else { "s" },
                        args.len()
                    ),
                );
                return None;
            }
            return Some(*only);
        }

        let mut best: Option<(u32, FnId)> = None;
        let mut ambiguous = false;
        for &candidate in overloads {
            let Some(cost) = self.call_cost(candidate, args) else {
                continue;
            };
            match best {
                Some((best_cost, _)) if cost > best_cost => {}
                Some((best_cost, _)) if cost == best_cost => ambiguous = true,
                _ => {
                    best = Some((cost, candidate));
                    ambiguous = false;
                }
            }
        }

        let described = || {
            let types: Vec<String> = args.iter().map(|arg| arg.ty.to_string()).collect();
            format!("{}({})", name, types.join(", "))
        };
        match best {
            None => {
                self.error(line, format!("no match for {}", described()));
                None
            }
            Some(_) if ambiguous => {
                self.error(line, format!("ambiguous call to {}", described()));
                None
            }
            Some((_, function)) => Some(function),
        }
    }

    fn call_cost(&self, function: FnId, args: &[Expr]) -> Option<u32> {
        let params = &self.program.functions[function].params;
        if params.len() != args.len() {
            return None;
        }
        params.iter().zip(args).try_fold(0, |total, (param, arg)| {
            Some(total + arg.ty.coercion_cost(&self.program.variables[*param].ty)?)
        })
    }

    fn call(&mut self, function: FnId, args: Vec<Expr>, line: usize) -> Option<Expr> {
        let params = self.program.functions[function].params.clone();
        let return_type = self.program.functions[function].return_type.clone();

        let mut converted = Vec::with_capacity(args.len());
        let mut ok = true;
        for (arg, param) in args.into_iter().zip(params) {
            let ty = self.program.variables[param].ty.clone();
            let flags = self.program.variables[param].modifiers.flags;
            let Some(mut arg) = self.coerce(arg, &ty) else {
                ok = false;
                continue;
            };
            if flags.contains(ModifierFlags::OUT) {
                let access = if flags.contains(ModifierFlags::IN) {
                    RefKind::ReadWrite
                } else {
                    RefKind::Write
                };
                ok &= self.mark_lvalue(&mut arg, access);
            }
            converted.push(arg);
        }
        ok.then(|| Expr::call(function, converted, return_type, line))
    }

    fn convert_binary(
        &mut self,
        left: &ast::Expr,
        op: BinaryOp,
        right: &ast::Expr,
    ) -> Option<Expr> {
        let line = left.line;
        let left = self.convert_expr(left)?;
        let right = self.convert_expr(right)?;

        let Some((left_ty, right_ty, result_ty)) = binary_types(op, &left.ty, &right.ty) else {
            self.error(
                line,
                format!(
                    "type mismatch: '{}' cannot operate on '{}', '{}'",
                    op.symbol(),
                    left.ty,
                    right.ty
                ),
            );
            return None;
        };

        let mut left = retype(left, &left_ty);
        if op.is_assignment() {
            let access = if op == BinaryOp::Assign {
                RefKind::Write
            } else {
                RefKind::ReadWrite
            };
            if !self.mark_lvalue(&mut left, access) {
                return None;
            }
        }
        let right = retype(right, &right_ty);

        let divides = matches!(
            op,
            BinaryOp::Divide | BinaryOp::Modulo | BinaryOp::DivideAssign | BinaryOp::ModuloAssign
        );
        if divides && constant::is_zero(self.const_eval(&right)) {
            self.error(line, constant::FoldError::DivisionByZero.to_string());
            return None;
        }

        if !op.is_assignment() && op != BinaryOp::Comma {
            match constant::fold_binary(&left, op, &right, &result_ty) {
                Ok(Some(folded)) => return Some(folded),
                Ok(None) => {}
                Err(err) => {
                    self.error(line, err.to_string());
                    return None;
                }
            }
        }
        Some(Expr::binary(left, op, right, result_ty))
    }

    fn convert_prefix(&mut self, op: PrefixOp, operand: &ast::Expr, line: usize) -> Option<Expr> {
        let mut operand = self.convert_expr(operand)?;
        let ty = operand.ty.clone();
        let valid = match op {
            PrefixOp::Plus | PrefixOp::Minus => ty.is_number(),
            PrefixOp::Not => ty == BOOL,
            PrefixOp::BitNot => !ty.is_matrix() && is_integer(&ty),
            PrefixOp::Increment | PrefixOp::Decrement => ty.is_scalar() && ty.is_number(),
        };
        if !valid {
            self.error(line, format!("'{}' cannot operate on '{}'", op.symbol(), ty));
            return None;
        }

        if matches!(op, PrefixOp::Increment | PrefixOp::Decrement) {
            if !self.mark_lvalue(&mut operand, RefKind::ReadWrite) {
                return None;
            }
        } else if let Some(folded) = constant::fold_prefix(op, &operand) {
            return Some(Expr { line, ..folded });
        }
        Some(Expr::new(
            ExprKind::Prefix {
                op,
                operand: Box::new(operand),
            },
            ty,
            line,
        ))
    }

    fn convert_postfix(&mut self, op: PostfixOp, operand: &ast::Expr, line: usize) -> Option<Expr> {
        let mut operand = self.convert_expr(operand)?;
        let ty = operand.ty.clone();
        if !(ty.is_scalar() && ty.is_number()) {
            self.error(line, format!("'{}' cannot operate on '{}'", op.symbol(), ty));
            return None;
        }
        if !self.mark_lvalue(&mut operand, RefKind::ReadWrite) {
            return None;
        }
        Some(Expr::new(
            ExprKind::Postfix {
                op,
                operand: Box::new(operand),
            },
            ty,
            line,
        ))
    }

    fn convert_index(&mut self, base: &ast::Expr, index: &ast::Expr, line: usize) -> Option<Expr> {
        let base = self.convert_expr(base)?;
        let element = match &base.ty {
            Type::Array(element, _) => (**element).clone(),
            Type::Vector(scalar, _) => Type::Scalar(*scalar),
            Type::Matrix(scalar, _, rows) => Type::Vector(*scalar, *rows),
            other => {
                self.error(line, format!("expected array, but found '{}'", other));
                return None;
            }
        };

        let index = self.convert_expr(index)?;
        let index = if index.ty.is_scalar() && is_integer(&index.ty) && !index.ty.is_literal() {
            index
        } else {
            self.coerce(index, &INT)?
        };
        Some(Expr::new(
            ExprKind::Index {
                base: Box::new(base),
                index: Box::new(index),
            },
            element,
            line,
        ))
    }

    fn convert_field(&mut self, base: &ast::Expr, name: &str, line: usize) -> Option<Expr> {
        if let ast::ExprKind::Identifier(base_name) = &base.kind {
            if base_name == "sk_Caps" && self.symbols.lookup(base_name).is_none() {
                return match self.caps.flag(name) {
                    Some(value) => Some(Expr::bool_literal(value, line)),
                    None => {
                        self.error(line, format!("unknown capability flag '{}'", name));
                        None
                    }
                };
            }
        }

        let base = self.convert_expr(base)?;
        match &base.ty {
            Type::Struct(ty) => match ty.field_index(name) {
                Some(index) => {
                    let field_ty = ty.fields[index].ty.clone();
                    Some(Expr::new(
                        ExprKind::Field {
                            base: Box::new(base),
                            index,
                        },
                        field_ty,
                        line,
                    ))
                }
                None => {
                    let message =
                        format!("type '{}' does not have a field named '{}'", ty.name, name);
                    self.error(line, message);
                    None
                }
            },
            Type::Scalar(_) | Type::Vector(..) | Type::Matrix(..) => {
                self.convert_swizzle(base, name, line)
            }
            other => {
                let message = format!("type '{}' does not have a field named '{}'", other, name);
                self.error(line, message);
                None
            }
        }
    }

    fn convert_ternary(
        &mut self,
        test: &ast::Expr,
        if_true: &ast::Expr,
        if_false: &ast::Expr,
        line: usize,
    ) -> Option<Expr> {
        let test = self
            .convert_expr(test)
            .and_then(|test| self.coerce(test, &BOOL));
        let if_true = self.convert_expr(if_true);
        let if_false = self.convert_expr(if_false);
        let (test, if_true, if_false) = (test?, if_true?, if_false?);

        let result = binary_types(BinaryOp::Equal, &if_true.ty, &if_false.ty)
            .filter(|(true_ty, false_ty, _)| true_ty == false_ty);
        let Some((ty, _, _)) = result else {
            self.error(
                line,
                format!(
                    "ternary operator result mismatch: '{}', '{}'",
                    if_true.ty, if_false.ty
                ),
            );
            return None;
        };

        let if_true = retype(if_true, &ty);
        let if_false = retype(if_false, &ty);
        if let ExprKind::Bool(value) = test.kind {
            return Some(if value { if_true } else { if_false });
        }
        Some(Expr::new(
            ExprKind::Ternary {
                test: Box::new(test),
                if_true: Box::new(if_true),
                if_false: Box::new(if_false),
            },
            ty,
            line,
        ))
    }

    /// Marks `expr` as written through `access`, rejecting expressions that
    /// cannot be assigned.
    pub(super) fn mark_lvalue(&mut self, expr: &mut Expr, access: RefKind) -> bool {
        let line = expr.line;
        match &mut expr.kind {
            ExprKind::Variable {
                var,
                access: current,
            } => {
                let variable = &self.program.variables[*var];
                if variable.is_immutable() {
                    let message = format!("cannot modify immutable variable '{}'", variable.name);
                    self.error(line, message);
                    return false;
                }
                *current = access;
                true
            }
            ExprKind::Field { base, .. } | ExprKind::Index { base, .. } => {
                self.mark_lvalue(base, access)
            }
            ExprKind::Swizzle { base, components } => {
                let mut seen = [false; 4];
                for component in components.iter() {
                    let slot = &mut seen[usize::from(*component & 3)];
                    if *slot {
                        self.error(line, "cannot write to the same swizzle field more than once");
                        return false;
                    }
                    *slot = true;
                }
                self.mark_lvalue(base, access)
            }
            _ => {
                self.error(line, "cannot assign to this expression");
                false
            }
        }
    }
}

fn is_integer(ty: &Type) -> bool {
    ty.component().is_some_and(ScalarKind::is_integer)
}

/// Converts an expression already known to coerce to `target`. Literals are
/// retyped in place; anything else is wrapped in a constructor.
pub(super) fn retype(expr: Expr, target: &Type) -> Expr {
    if expr.ty == *target {
        return expr;
    }
    let line = expr.line;
    match (&expr.kind, target) {
        (ExprKind::Int(value), Type::Scalar(scalar)) if scalar.is_float() => {
            Expr::float_literal(*value as f64, target.clone(), line)
        }
        (ExprKind::Int(value), Type::Scalar(scalar)) if scalar.is_integer() => {
            Expr::int_literal(*value, target.clone(), line)
        }
        (ExprKind::Float(value), Type::Scalar(scalar)) if scalar.is_float() => {
            Expr::float_literal(*value, target.clone(), line)
        }
        _ => Expr::new(
            ExprKind::Constructor { args: vec![expr] },
            target.clone(),
            line,
        ),
    }
}

/// The type each operand converts to, and the result type, for `left op
/// right`. `None` means the operator does not apply.
pub(super) fn binary_types(op: BinaryOp, left: &Type, right: &Type) -> Option<(Type, Type, Type)> {
    if let Some(base) = op.compound_base() {
        let (left_ty, right_ty, result) = binary_types(base, left, right)?;
        return (left_ty == *left && result == *left).then(|| (left_ty, right_ty, result));
    }

    match op {
        BinaryOp::Assign => right
            .can_coerce_to(left)
            .then(|| (left.clone(), left.clone(), left.clone())),
        BinaryOp::Comma => Some((left.clone(), right.clone(), right.clone())),
        _ if op.is_logical() => (left.can_coerce_to(&BOOL) && right.can_coerce_to(&BOOL))
            .then_some((BOOL, BOOL, BOOL)),
        _ if op.is_equality() => {
            let common = common_type(left, right)?;
            Some((common.clone(), common, BOOL))
        }
        _ if op.is_relational() => {
            if !(left.is_scalar() && right.is_scalar() && left.is_number() && right.is_number()) {
                return None;
            }
            let common = common_type(left, right)?;
            Some((common.clone(), common, BOOL))
        }
        BinaryOp::Multiply if is_matrix_multiply(left, right) => matrix_multiply(left, right),
        _ => arithmetic(op, left, right),
    }
}

/// The cheaper direction of implicit conversion between two types.
fn common_type(a: &Type, b: &Type) -> Option<Type> {
    if a == b {
        return Some(a.clone());
    }
    match (a.coercion_cost(b), b.coercion_cost(a)) {
        (Some(to_b), Some(to_a)) if to_a < to_b => Some(a.clone()),
        (Some(_), _) => Some(b.clone()),
        (None, Some(_)) => Some(a.clone()),
        (None, None) => None,
    }
}

fn is_matrix_multiply(left: &Type, right: &Type) -> bool {
    let numbers = left.is_number() && right.is_number();
    numbers
        && ((left.is_matrix() && (right.is_matrix() || right.is_vector()))
            || (left.is_vector() && right.is_matrix()))
}

fn matrix_multiply(left: &Type, right: &Type) -> Option<(Type, Type, Type)> {
    let component = common_type(
        &Type::Scalar(left.component()?),
        &Type::Scalar(right.component()?),
    )?
    .component()?;

    let (left_columns, left_rows) = (left.columns(), left.rows());
    // A vector on the right is a column vector.
    let (right_columns, right_rows) = if right.is_vector() {
        (right.rows(), right.columns())
    } else {
        (right.columns(), right.rows())
    };
    if left_columns != right_rows {
        return None;
    }

    let result = if right_columns > 1 {
        Type::compound(component, right_columns, left_rows)
    } else {
        Type::compound(component, left_rows, 1)
    };
    Some((
        left.with_component(component),
        right.with_component(component),
        result,
    ))
}

fn arithmetic(op: BinaryOp, left: &Type, right: &Type) -> Option<(Type, Type, Type)> {
    if !(left.is_number() && right.is_number()) {
        return None;
    }

    let types = if let Some(common) = common_type(left, right) {
        (common.clone(), common.clone(), common)
    } else if right.is_scalar() && !left.is_scalar() {
        let scalar = common_type(&Type::Scalar(left.component()?), right)?;
        let compound = left.with_component(scalar.component()?);
        (compound.clone(), scalar, compound)
    } else if left.is_scalar() && !right.is_scalar() {
        let scalar = common_type(left, &Type::Scalar(right.component()?))?;
        let compound = right.with_component(scalar.component()?);
        (scalar, compound.clone(), compound)
    } else {
        return None;
    };

    if op.is_integer_only() && !is_integer(&types.2) {
        return None;
    }
    Some(types)
}
