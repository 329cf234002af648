//! Render-target normalization of `sk_Position`.
//!
//! Programs declaring `uniform float4 sk_RTAdjust` expect every position
//! they produce to be mapped into normalized device coordinates:
//!
//! ```text
//! sk_Position = float4(sk_Position.xy * sk_RTAdjust.xz
//!                      + sk_Position.ww * sk_RTAdjust.yw, 0, sk_Position.w);
//! ```
//!
//! Vertex programs get the assignment at the end of `main`; geometry
//! programs get it in front of every `EmitVertex()`.

use sksl::ir::{BinaryOp, Builtin, Expr, ExprKind, FnId, Program, RefKind, Stmt, StmtKind, VarId};
use sksl::types::{ScalarKind, Type, FLOAT};
use sksl::ProgramKind;

use super::Pass;
use crate::CompileError;

/// Appends the `sk_RTAdjust` normalization where positions are emitted.
pub struct NormalizePosition;

impl Pass for NormalizePosition {
    fn run(&self, program: &mut Program) -> Result<(), CompileError> {
        let Some(adjust) = program.find_global("sk_RTAdjust") else {
            return Ok(());
        };
        let position = program
            .variables
            .iter()
            .find(|(_, var)| var.builtin == Some(Builtin::Position))
            .map(|(id, _)| id)
            .ok_or_else(|| CompileError::InvalidIr("sk_Position is not declared".to_string()))?;

        match program.kind {
            ProgramKind::Vertex => {
                let Some(main) = program.main().map(|def| def.decl) else {
                    return Ok(());
                };
                let main = program
                    .function_definitions_mut()
                    .find(|def| def.decl == main)
                    .ok_or_else(|| CompileError::InvalidIr("main vanished".to_string()))?;
                let StmtKind::Block { stmts, .. } = &mut main.body.kind else {
                    return Err(CompileError::InvalidIr("main has no body block".to_string()));
                };
                let line = stmts.last().map_or(main.line, |stmt| stmt.line);
                stmts.push(normalization(position, adjust, line));
            }
            ProgramKind::Geometry => {
                let Some(emit) = program.find_function("EmitVertex") else {
                    return Ok(());
                };
                for def in program.function_definitions_mut() {
                    def.body.rewrite_post_order(&mut |stmt| {
                        if !emits_vertex(stmt, emit) {
                            return;
                        }
                        let line = stmt.line;
                        let emit = std::mem::replace(stmt, Stmt::nop(line));
                        *stmt = Stmt::block(
                            vec![normalization(position, adjust, line), emit],
                            true,
                            line,
                        );
                    });
                }
            }
            ProgramKind::Fragment => {}
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "normalize-position"
    }
}

fn emits_vertex(stmt: &Stmt, emit: FnId) -> bool {
    matches!(&stmt.kind, StmtKind::Expr(Expr { kind: ExprKind::Call { function, .. }, .. })
        if *function == emit)
}

fn normalization(position: VarId, adjust: VarId, line: usize) -> Stmt {
    let float4 = Type::Vector(ScalarKind::Float, 4);
    let float2 = Type::Vector(ScalarKind::Float, 2);
    let pos = || Expr::variable(position, float4.clone(), RefKind::Read, line);
    let adj = || Expr::variable(adjust, float4.clone(), RefKind::Read, line);

    let scaled = Expr::binary(
        Expr::swizzle(pos(), &[0, 1], line),
        BinaryOp::Multiply,
        Expr::swizzle(adj(), &[0, 2], line),
        float2.clone(),
    );
    let offset = Expr::binary(
        Expr::swizzle(pos(), &[3, 3], line),
        BinaryOp::Multiply,
        Expr::swizzle(adj(), &[1, 3], line),
        float2.clone(),
    );
    let xy = Expr::binary(scaled, BinaryOp::Add, offset, float2);
    let value = Expr::new(
        ExprKind::Constructor {
            args: vec![
                xy,
                Expr::float_literal(0.0, FLOAT, line),
                Expr::swizzle(pos(), &[3], line),
            ],
        },
        float4.clone(),
        line,
    );
    let target = Expr::variable(position, float4.clone(), RefKind::Write, line);
    Stmt::expr(Expr::binary(target, BinaryOp::Assign, value, float4))
}
