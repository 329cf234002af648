//! Rewrites `do`-`while` loops for drivers that miscompile them.
//!
//! ```text
//! do { body } while (test);
//! ```
//!
//! becomes
//!
//! ```text
//! bool _tmpLoopSeenOnceN = false;
//! while (true) {
//!     if (_tmpLoopSeenOnceN) {
//!         if (!(test)) {
//!             break;
//!         }
//!     }
//!     _tmpLoopSeenOnceN = true;
//!     { body }
//! }
//! ```
//!
//! `continue` in the body still re-evaluates the test, because the check
//! sits at the top of the next iteration.

use sksl::ir::{
    BinaryOp, Element, Expr, ExprKind, PrefixOp, Program, RefKind, Stmt, StmtKind, VarDecl,
    Variable,
};
use sksl::types::BOOL;

use super::Pass;
use crate::CompileError;

/// Replaces every `do`-`while` loop with an equivalent `while (true)` loop.
pub struct RewriteDoWhile;

impl Pass for RewriteDoWhile {
    fn run(&self, program: &mut Program) -> Result<(), CompileError> {
        let Program {
            elements,
            variables,
            ..
        } = program;
        let mut counter = 0;
        for element in elements.iter_mut() {
            let Element::Function(def) = element else {
                continue;
            };
            def.body.rewrite_pre_order(&mut |stmt| {
                if !matches!(stmt.kind, StmtKind::Do { .. }) {
                    return;
                }
                let line = stmt.line;
                let StmtKind::Do { body, test } =
                    std::mem::replace(&mut stmt.kind, StmtKind::Nop)
                else {
                    return;
                };

                let name = format!("_tmpLoopSeenOnce{}", counter);
                counter += 1;
                let seen = variables.alloc(Variable::local(name, BOOL, line));
                let flag = |access| Expr::variable(seen, BOOL, access, line);

                let declare = Stmt::new(
                    StmtKind::VarDecl(VarDecl {
                        var: seen,
                        init: Some(Expr::bool_literal(false, line)),
                    }),
                    line,
                );
                let exit = Stmt::new(
                    StmtKind::If {
                        is_static: false,
                        test: Expr::new(
                            ExprKind::Prefix {
                                op: PrefixOp::Not,
                                operand: Box::new(test),
                            },
                            BOOL,
                            line,
                        ),
                        if_true: Box::new(Stmt::block(
                            vec![Stmt::new(StmtKind::Break, line)],
                            true,
                            line,
                        )),
                        if_false: None,
                    },
                    line,
                );
                let check = Stmt::new(
                    StmtKind::If {
                        is_static: false,
                        test: flag(RefKind::Read),
                        if_true: Box::new(Stmt::block(vec![exit], true, line)),
                        if_false: None,
                    },
                    line,
                );
                let mark = Stmt::expr(Expr::binary(
                    flag(RefKind::Write),
                    BinaryOp::Assign,
                    Expr::bool_literal(true, line),
                    BOOL,
                ));
                let body = Stmt::block(vec![check, mark, *body], true, line);
                let rewritten = Stmt::new(
                    StmtKind::While {
                        test: Expr::bool_literal(true, line),
                        body: Box::new(body),
                    },
                    line,
                );
                *stmt = Stmt::block(vec![declare, rewritten], false, line);
            });
        }
        if counter > 0 {
            log::debug!("rewrote {} do-while loops", counter);
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "rewrite-do-while"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sksl::caps::ShaderCapsFactory;
    use sksl::ProgramKind;

    fn rewritten(source: &str) -> Program {
        let mut program = sksl::compile_to_ir(
            source,
            ProgramKind::Fragment,
            &ShaderCapsFactory::rewrite_do_while_loops(),
        )
        .expect("valid program");
        RewriteDoWhile.run(&mut program).expect("pass runs");
        program
    }

    fn count_do_loops(program: &Program) -> usize {
        let mut count = 0;
        for def in program.function_definitions() {
            let mut body = def.body.clone();
            body.rewrite_pre_order(&mut |stmt| {
                if matches!(stmt.kind, StmtKind::Do { .. }) {
                    count += 1;
                }
            });
        }
        count
    }

    #[test]
    fn nested_loops_are_all_rewritten_outermost_first() {
        let program = rewritten(
            "void main() {
                int i = 0;
                do { ++i; do { i++; } while (true); } while (i < 10);
                sk_FragColor = half4(i);
            }",
        );
        assert_eq!(count_do_loops(&program), 0);
        let flags: Vec<&str> = program
            .variables
            .iter()
            .map(|(_, var)| var.name.as_str())
            .filter(|name| name.starts_with("_tmpLoopSeenOnce"))
            .collect();
        assert_eq!(flags, ["_tmpLoopSeenOnce0", "_tmpLoopSeenOnce1"]);
    }

    #[test]
    fn other_loops_are_left_alone() {
        let mut program = sksl::compile_to_ir(
            "void main() { for (int i = 0; i < 2; i++) { sk_FragColor = half4(i); } }",
            ProgramKind::Fragment,
            &ShaderCapsFactory::rewrite_do_while_loops(),
        )
        .expect("valid program");
        let before = program.clone();
        RewriteDoWhile.run(&mut program).expect("pass runs");
        assert_eq!(program, before);
    }
}
