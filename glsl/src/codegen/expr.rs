//! Expression rendering.

use sksl::caps::{DerivativeSupport, FragCoordStrategy};
use sksl::ir::{BinaryOp, Builtin, Expr, ExprKind, FnId, VarId};
use sksl::types::Type;
use sksl::ProgramKind;

use super::types::type_name;
use super::GlslWriter;
use crate::CompileError;

/// Operator binding strength; lower binds tighter. A child is parenthesised
/// when its precedence is not lower than its parent's.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[allow(missing_docs)]
pub enum Precedence {
    Parentheses = 1,
    Postfix,
    Prefix,
    Multiplicative,
    Additive,
    Shift,
    Relational,
    Equality,
    BitwiseAnd,
    BitwiseXor,
    BitwiseOr,
    LogicalAnd,
    LogicalXor,
    LogicalOr,
    Ternary,
    Assignment,
    Sequence,
}

impl Precedence {
    /// Context of a full expression: statement, condition or initializer.
    pub const TOP_LEVEL: Precedence = Precedence::Sequence;

    /// Precedence of a binary operator.
    pub fn of(op: BinaryOp) -> Self {
        match op {
            BinaryOp::Multiply | BinaryOp::Divide | BinaryOp::Modulo => Self::Multiplicative,
            BinaryOp::Add | BinaryOp::Subtract => Self::Additive,
            BinaryOp::ShiftLeft | BinaryOp::ShiftRight => Self::Shift,
            BinaryOp::Less | BinaryOp::LessEqual | BinaryOp::Greater | BinaryOp::GreaterEqual => {
                Self::Relational
            }
            BinaryOp::Equal | BinaryOp::NotEqual => Self::Equality,
            BinaryOp::BitAnd => Self::BitwiseAnd,
            BinaryOp::BitXor => Self::BitwiseXor,
            BinaryOp::BitOr => Self::BitwiseOr,
            BinaryOp::LogicalAnd => Self::LogicalAnd,
            BinaryOp::LogicalXor => Self::LogicalXor,
            BinaryOp::LogicalOr => Self::LogicalOr,
            BinaryOp::Comma => Self::Sequence,
            _ => Self::Assignment,
        }
    }
}

impl GlslWriter<'_> {
    pub(super) fn write_expr(
        &mut self,
        expr: &Expr,
        parent: Precedence,
    ) -> Result<(), CompileError> {
        match &expr.kind {
            ExprKind::Bool(value) => self.write(if *value { "true" } else { "false" }),
            ExprKind::Int(value) => {
                self.write(&value.to_string());
                if expr.ty.component().is_some_and(|s| s.is_unsigned()) {
                    self.write("u");
                }
            }
            ExprKind::Float(value) => self.write(&float_literal(*value)),
            ExprKind::Variable { var, .. } => self.write_variable(*var),
            ExprKind::Binary { left, op, right } => self.write_binary(left, *op, right, parent)?,
            ExprKind::Prefix { op, operand } => {
                self.open(Precedence::Prefix, parent);
                self.write(op.symbol());
                self.write_expr(operand, Precedence::Prefix)?;
                self.close(Precedence::Prefix, parent);
            }
            ExprKind::Postfix { op, operand } => {
                self.open(Precedence::Postfix, parent);
                self.write_expr(operand, Precedence::Postfix)?;
                self.write(op.symbol());
                self.close(Precedence::Postfix, parent);
            }
            ExprKind::Call { function, args } => self.write_call(*function, args, parent)?,
            ExprKind::Constructor { args } => self.write_constructor(&expr.ty, args, parent)?,
            ExprKind::Field { base, index } => {
                self.write_expr(base, Precedence::Postfix)?;
                self.write(".");
                let name = field_name(&base.ty, *index).ok_or_else(|| {
                    CompileError::InvalidIr(format!("no field {} in '{}'", index, base.ty))
                })?;
                self.write(&name);
            }
            ExprKind::Index { base, index } => {
                self.write_expr(base, Precedence::Postfix)?;
                self.write("[");
                self.write_expr(index, Precedence::TOP_LEVEL)?;
                self.write("]");
            }
            ExprKind::Swizzle { base, components } => {
                self.write_expr(base, Precedence::Postfix)?;
                self.write(".");
                for &component in components {
                    let letter = ["x", "y", "z", "w"]
                        .get(usize::from(component))
                        .ok_or_else(|| {
                            CompileError::InvalidIr(format!("swizzle component {}", component))
                        })?;
                    self.write(letter);
                }
            }
            ExprKind::Ternary {
                test,
                if_true,
                if_false,
            } => {
                self.open(Precedence::Ternary, parent);
                self.write_expr(test, Precedence::Ternary)?;
                self.write(" ? ");
                self.write_expr(if_true, Precedence::Ternary)?;
                self.write(" : ");
                self.write_expr(if_false, Precedence::Ternary)?;
                self.close(Precedence::Ternary, parent);
            }
        }
        Ok(())
    }

    fn open(&mut self, precedence: Precedence, parent: Precedence) {
        if precedence >= parent {
            self.write("(");
        }
    }

    fn close(&mut self, precedence: Precedence, parent: Precedence) {
        if precedence >= parent {
            self.write(")");
        }
    }

    fn write_binary(
        &mut self,
        left: &Expr,
        op: BinaryOp,
        right: &Expr,
        parent: Precedence,
    ) -> Result<(), CompileError> {
        let precedence = Precedence::of(op);
        // Vertex programs on targets without a usable gl_FragCoord forward
        // every position they write, except the final RT normalization.
        let forward_position = self.program.kind == ProgramKind::Vertex
            && self.caps.frag_coord == FragCoordStrategy::Workaround
            && op.is_assignment()
            && self.is_builtin(left, Builtin::Position)
            && !self
                .program
                .find_global("sk_RTAdjust")
                .is_some_and(|adjust| right.references(adjust));

        self.open(precedence, parent);
        if forward_position {
            self.write("sk_FragCoord_Workaround = (");
        }
        self.write_expr(left, precedence)?;
        self.write(" ");
        self.write(op.symbol());
        self.write(" ");
        self.write_expr(right, precedence)?;
        if forward_position {
            self.write(")");
        }
        self.close(precedence, parent);
        Ok(())
    }

    fn is_builtin(&self, expr: &Expr, builtin: Builtin) -> bool {
        matches!(expr.kind, ExprKind::Variable { var, .. }
            if self.program.variables[var].builtin == Some(builtin))
    }

    fn write_variable(&mut self, var: VarId) {
        let program = self.program;
        let variable = &program.variables[var];
        let name = match variable.builtin {
            None => &variable.name,
            Some(Builtin::FragColor) => {
                self.uses_frag_color = true;
                if self.caps.supports_in_out() {
                    "sk_FragColor"
                } else {
                    "gl_FragColor"
                }
            }
            Some(Builtin::FragCoord) => return self.write_frag_coord(),
            Some(Builtin::Clockwise) if self.caps.flip_y => "(!gl_FrontFacing)",
            Some(Builtin::Clockwise) => "gl_FrontFacing",
            Some(Builtin::Position) => "gl_Position",
            Some(Builtin::PointSize) => "gl_PointSize",
            Some(Builtin::VertexId) => "gl_VertexID",
            Some(Builtin::InstanceId) => "gl_InstanceID",
            Some(Builtin::InvocationId) => "gl_InvocationID",
            Some(Builtin::PerVertexIn) => "gl_in",
        };
        self.write(name);
    }

    fn write_frag_coord(&mut self) {
        let highp = self.highp();
        if self.caps.frag_coord == FragCoordStrategy::Workaround {
            if !self.frag_coord_local_written {
                self.frag_coord_local_written = true;
                self.function_header.push_str(&format!(
                    "    {highp}float sk_FragCoord_InvW = 1. / sk_FragCoord_Workaround.w;\n\
                     \x20   {highp}vec4 sk_FragCoord_Resolved = vec4(sk_FragCoord_Workaround.xyz * sk_FragCoord_InvW, sk_FragCoord_InvW);\n\
                     \x20   sk_FragCoord_Resolved.xy = floor(sk_FragCoord_Resolved.xy) + vec2(.5);\n"
                ));
            }
            self.write("sk_FragCoord_Resolved");
            return;
        }
        if !self.caps.flip_y {
            self.write("gl_FragCoord");
            return;
        }

        let caps = self.caps;
        match &caps.frag_coord {
            FragCoordStrategy::NativeNew | FragCoordStrategy::NativeOld(_) => {
                if !self.frag_coord_global_written {
                    self.frag_coord_global_written = true;
                    if let FragCoordStrategy::NativeOld(extension) = &caps.frag_coord {
                        self.add_extension(extension);
                    }
                    self.globals
                        .push_str("layout(origin_upper_left) in vec4 gl_FragCoord;\n");
                }
                self.write("gl_FragCoord");
            }
            FragCoordStrategy::HeightUniform | FragCoordStrategy::Workaround => {
                self.inputs.rt_height = true;
                if !self.frag_coord_global_written {
                    self.frag_coord_global_written = true;
                    self.globals
                        .push_str(&format!("uniform {highp}float u_skRTHeight;\n"));
                }
                if !self.frag_coord_local_written {
                    self.frag_coord_local_written = true;
                    self.function_header.push_str(&format!(
                        "    {highp}vec4 sk_FragCoord = vec4(gl_FragCoord.x, u_skRTHeight - gl_FragCoord.y, gl_FragCoord.z, gl_FragCoord.w);\n"
                    ));
                }
                self.write("sk_FragCoord");
            }
        }
    }

    fn write_call(
        &mut self,
        function: FnId,
        args: &[Expr],
        parent: Precedence,
    ) -> Result<(), CompileError> {
        let program = self.program;
        let caps = self.caps;
        let decl = &program.functions[function];
        let mut name = decl.name.as_str();
        let mut negate = false;
        if decl.builtin {
            match name {
                "dFdx" | "dFdy" | "fwidth" => {
                    if let DerivativeSupport::Extension(extension) = &caps.derivatives {
                        self.add_extension(extension);
                    }
                    negate = name == "dFdy" && caps.flip_y;
                }
                "saturate" => {
                    let [arg] = args else {
                        return Err(CompileError::InvalidIr(
                            "saturate takes one argument".to_string(),
                        ));
                    };
                    self.write("clamp(");
                    self.write_expr(arg, Precedence::Sequence)?;
                    self.write(", 0.0, 1.0)");
                    return Ok(());
                }
                "sample" if caps.supports_in_out() => name = "texture",
                "sample" => name = "texture2D",
                _ => {}
            }
        }

        if negate {
            self.open(Precedence::Prefix, parent);
            self.write("-");
        }
        self.write(name);
        self.write_args(args)?;
        if negate {
            self.close(Precedence::Prefix, parent);
        }
        Ok(())
    }

    fn write_args(&mut self, args: &[Expr]) -> Result<(), CompileError> {
        self.write("(");
        for (i, arg) in args.iter().enumerate() {
            if i > 0 {
                self.write(", ");
            }
            self.write_expr(arg, Precedence::Sequence)?;
        }
        self.write(")");
        Ok(())
    }

    fn write_constructor(
        &mut self,
        ty: &Type,
        args: &[Expr],
        parent: Precedence,
    ) -> Result<(), CompileError> {
        let name = type_name(ty);
        if let [arg] = args {
            // Conversions between types GLSL spells the same are no-ops.
            if !matches!(arg.ty, Type::Array(..)) && type_name(&arg.ty) == name {
                return self.write_expr(arg, parent);
            }
        }
        self.write(&name);
        self.write_args(args)
    }
}

/// Renders a float so GLSL reads it as a float: `1.0`, `-0.5`.
fn float_literal(value: f64) -> String {
    let text = value.to_string();
    if value.is_finite() && !text.contains(['.', 'e']) {
        format!("{}.0", text)
    } else {
        text
    }
}

fn field_name(base: &Type, index: usize) -> Option<String> {
    let Type::Struct(ty) = base else {
        return None;
    };
    let name = &ty.fields.get(index)?.name;
    // The per-vertex block is GLSL's own `gl_PerVertex`.
    if ty.name == "sk_PerVertex" {
        if let Some(rest) = name.strip_prefix("sk_") {
            return Some(format!("gl_{}", rest));
        }
    }
    Some(name.clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn floats_always_carry_a_decimal_point() {
        assert_eq!(float_literal(1.0), "1.0");
        assert_eq!(float_literal(-0.5), "-0.5");
        assert_eq!(float_literal(0.25), "0.25");
        assert_eq!(float_literal(100.0), "100.0");
    }

    #[test]
    fn precedence_follows_c() {
        assert!(Precedence::of(BinaryOp::Multiply) < Precedence::of(BinaryOp::Add));
        assert!(Precedence::of(BinaryOp::Add) < Precedence::of(BinaryOp::Less));
        assert!(Precedence::of(BinaryOp::LogicalAnd) < Precedence::of(BinaryOp::LogicalOr));
        assert_eq!(Precedence::of(BinaryOp::AddAssign), Precedence::Assignment);
        assert_eq!(Precedence::of(BinaryOp::Comma), Precedence::TOP_LEVEL);
    }
}
