//! Emulation of geometry shader invocations.
//!
//! Targets that cannot honour `layout(invocations = N) in` run the shader
//! body `N` times in a loop instead. `main` becomes `_invoke`, the builtin
//! invocation id becomes a global counter, and the output vertex budget is
//! scaled to cover all iterations.

use sksl::ir::{
    BinaryOp, Builtin, Element, Expr, ExprKind, FnId, FunctionDecl, FunctionDef, PostfixOp,
    Program, RefKind, Stmt, StmtKind, Storage, VarDecl, VarId, Variable,
};
use sksl::modifiers::{ModifierFlags, Modifiers};
use sksl::types::{Type, BOOL, INT};

use super::Pass;
use crate::CompileError;

/// Loops `main` over the declared invocation count.
pub struct EmulateInvocations;

impl Pass for EmulateInvocations {
    fn run(&self, program: &mut Program) -> Result<(), CompileError> {
        let Some(count) = take_invocations(program) else {
            return Ok(());
        };
        let Some(main) = program.main().map(|def| def.decl) else {
            return Ok(());
        };
        let end_primitive = program
            .find_function("EndPrimitive")
            .ok_or_else(|| CompileError::InvalidIr("EndPrimitive is not declared".to_string()))?;
        log::debug!("emulating {} geometry shader invocations", count);

        for element in &mut program.elements {
            if let Element::Modifiers { modifiers, .. } = element {
                if let Some(max) = modifiers.layout.max_vertices.as_mut() {
                    *max *= count;
                }
            }
        }

        let counter = program.variables.alloc(Variable::new(
            "sk_InvocationID",
            INT,
            Modifiers::default(),
            Storage::Global,
            0,
        ));
        redirect_invocation_id(program, counter);
        program
            .elements
            .insert(0, Element::GlobalVar(VarDecl { var: counter, init: None }));

        program.functions[main].name = "_invoke".to_string();
        let mut new_main = FunctionDecl::new("main", Type::Void, 0);
        new_main.defined = true;
        let new_main = program.functions.alloc(new_main);
        program.elements.push(Element::Function(FunctionDef {
            decl: new_main,
            body: Stmt::block(vec![invocation_loop(main, end_primitive, counter, count)], true, 0),
            line: 0,
        }));
        Ok(())
    }

    fn name(&self) -> &'static str {
        "emulate-invocations"
    }
}

/// Removes the `invocations` qualifier from the input layout and returns
/// its value. Layout declarations left empty are dropped.
fn take_invocations(program: &mut Program) -> Option<i32> {
    let mut count = None;
    for element in &mut program.elements {
        if let Element::Modifiers { modifiers, .. } = element {
            if let Some(invocations) = modifiers.layout.invocations.take() {
                count.get_or_insert(invocations);
            }
        }
    }
    count?;
    program.elements.retain(|element| match element {
        Element::Modifiers { modifiers, .. } => {
            !(modifiers.layout.is_empty() && modifiers.flags == ModifierFlags::IN)
        }
        _ => true,
    });
    count
}

fn redirect_invocation_id(program: &mut Program, counter: VarId) {
    let builtin = program
        .variables
        .iter()
        .find(|(_, var)| var.builtin == Some(Builtin::InvocationId))
        .map(|(id, _)| id);
    let Some(builtin) = builtin else {
        return;
    };
    for def in program.function_definitions_mut() {
        def.body.for_each_expr_mut(&mut |expr| {
            expr.for_each_mut(&mut |expr| {
                if let ExprKind::Variable { var, .. } = &mut expr.kind {
                    if *var == builtin {
                        *var = counter;
                    }
                }
            });
        });
    }
}

/// `for (sk_InvocationID = 0; sk_InvocationID < N; sk_InvocationID++)
/// { _invoke(); EndPrimitive(); }`
fn invocation_loop(
    invoke: FnId,
    end_primitive: FnId,
    counter: VarId,
    count: i32,
) -> Stmt {
    let var = |access| Expr::variable(counter, INT, access, 0);
    let int = |value: i32| Expr::int_literal(i64::from(value), INT, 0);

    let init = Stmt::expr(Expr::binary(var(RefKind::Write), BinaryOp::Assign, int(0), INT));
    let test = Expr::binary(var(RefKind::Read), BinaryOp::Less, int(count), BOOL);
    let next = Expr::new(
        ExprKind::Postfix {
            op: PostfixOp::Increment,
            operand: Box::new(var(RefKind::ReadWrite)),
        },
        INT,
        0,
    );
    let body = Stmt::block(
        vec![
            Stmt::expr(Expr::call(invoke, Vec::new(), Type::Void, 0)),
            Stmt::expr(Expr::call(end_primitive, Vec::new(), Type::Void, 0)),
        ],
        true,
        0,
    );
    Stmt::new(
        StmtKind::For {
            init: Some(Box::new(init)),
            test: Some(test),
            next: Some(next),
            body: Box::new(body),
        },
        0,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use sksl::caps::ShaderCapsFactory;
    use sksl::ProgramKind;

    const SOURCE: &str = "layout(points) in;
        layout(invocations = 2) in;
        layout(line_strip, max_vertices = 2) out;
        void main() {
            sk_Position = float4(sk_InvocationID);
            EmitVertex();
        }";

    fn emulated() -> Program {
        let mut program = sksl::compile_to_ir(
            SOURCE,
            ProgramKind::Geometry,
            &ShaderCapsFactory::no_gs_invocations_support(),
        )
        .expect("valid program");
        EmulateInvocations.run(&mut program).expect("pass runs");
        program
    }

    #[test]
    fn invocation_layout_is_consumed() {
        let program = emulated();
        let layouts: Vec<String> = program
            .elements
            .iter()
            .filter_map(|element| match element {
                Element::Modifiers { modifiers, .. } => Some(modifiers.layout.to_string()),
                _ => None,
            })
            .collect();
        assert_eq!(layouts, ["layout (points)", "layout (line_strip, max_vertices = 4)"]);
    }

    #[test]
    fn main_becomes_a_loop_over_invoke() {
        let program = emulated();
        let names: Vec<&str> = program
            .function_definitions()
            .map(|def| program.functions[def.decl].name.as_str())
            .collect();
        assert_eq!(names, ["_invoke", "main"]);
        assert!(matches!(program.elements[0], Element::GlobalVar(_)));

        let counter = program.find_global("sk_InvocationID").expect("counter");
        let invoke = program.function_definitions().next().expect("_invoke");
        let mut redirected = false;
        invoke.body.for_each_expr(&mut |expr| redirected |= expr.references(counter));
        assert!(redirected);
    }

    #[test]
    fn programs_without_invocations_are_untouched() {
        let mut program = sksl::compile_to_ir(
            "layout(points) in; layout(points, max_vertices = 1) out; void main() { EmitVertex(); }",
            ProgramKind::Geometry,
            &ShaderCapsFactory::no_gs_invocations_support(),
        )
        .expect("valid program");
        let before = program.clone();
        EmulateInvocations.run(&mut program).expect("pass runs");
        assert_eq!(program, before);
    }
}
