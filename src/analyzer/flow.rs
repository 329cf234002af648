//! Per-function flow analysis over the finished IR.
//!
//! A single forward walk tracks, for each program point, whether it is
//! reachable, which locals may still be unassigned and which locals hold a
//! known constant. The constants drive `@if`/`@switch` resolution, which
//! rewrites those statements in place.

use std::collections::{HashMap, HashSet};

use la_arena::Arena;

use crate::errors::Diagnostics;
use crate::ir::{
    BinaryOp, ConstValue, Expr, ExprKind, FunctionDecl, Program, RefKind, Stmt, StmtKind, VarId,
    Variable,
};

use super::constant;

#[derive(Debug, Clone, Default)]
struct Facts {
    unassigned: HashSet<VarId>,
    constants: HashMap<VarId, ConstValue>,
}

impl Facts {
    fn join(mut self, other: Facts) -> Facts {
        self.unassigned.extend(other.unassigned);
        self.constants
            .retain(|var, value| other.constants.get(var) == Some(value));
        self
    }
}

#[derive(Debug, Clone)]
enum Reach {
    Live(Facts),
    /// `reported` is set once an unreachable statement has been flagged.
    Dead { reported: bool },
}

impl Reach {
    fn join(self, other: Reach) -> Reach {
        match (self, other) {
            (Reach::Live(a), Reach::Live(b)) => Reach::Live(a.join(b)),
            (Reach::Live(facts), Reach::Dead { .. }) | (Reach::Dead { .. }, Reach::Live(facts)) => {
                Reach::Live(facts)
            }
            (Reach::Dead { reported: a }, Reach::Dead { reported: b }) => Reach::Dead {
                reported: a && b,
            },
        }
    }

    fn is_live(&self) -> bool {
        matches!(self, Reach::Live(_))
    }
}

pub(super) fn check_program(program: &mut Program, diagnostics: &mut Diagnostics) {
    let Program {
        elements,
        variables,
        functions,
        ..
    } = program;
    for element in elements.iter_mut() {
        let crate::ir::Element::Function(def) = element else {
            continue;
        };
        let mut flow = Flow {
            variables: &*variables,
            diagnostics: &mut *diagnostics,
            breaks: Vec::new(),
        };
        let end = flow.stmt(&mut def.body, Reach::Live(Facts::default()));
        let decl: &FunctionDecl = &functions[def.decl];
        if end.is_live() && !decl.return_type.is_void() {
            diagnostics.error(
                def.line,
                format!("function '{}' can exit without returning a value", decl.name),
            );
        }
    }
}

struct Flow<'a> {
    variables: &'a Arena<Variable>,
    diagnostics: &'a mut Diagnostics,
    /// States flowing out of `break`s, one frame per enclosing loop/switch.
    breaks: Vec<Vec<Facts>>,
}

impl Flow<'_> {
    fn stmt(&mut self, stmt: &mut Stmt, state: Reach) -> Reach {
        let mut facts = match state {
            Reach::Live(facts) => facts,
            Reach::Dead { reported } => {
                if reported || stmt.is_nop() {
                    return Reach::Dead { reported };
                }
                self.diagnostics.error(stmt.line, "unreachable");
                return Reach::Dead { reported: true };
            }
        };

        match stmt.kind {
            StmtKind::If { is_static: true, .. } => return self.static_if(stmt, facts),
            StmtKind::Switch { is_static: true, .. } => return self.static_switch(stmt, facts),
            _ => {}
        }

        match &mut stmt.kind {
            StmtKind::Block { stmts, .. } => {
                let mut state = Reach::Live(facts);
                for stmt in stmts {
                    state = self.stmt(stmt, state);
                }
                state
            }
            StmtKind::Expr(expr) => {
                self.expr(expr, &mut facts);
                Reach::Live(facts)
            }
            StmtKind::VarDecl(decl) => {
                match &decl.init {
                    Some(init) => {
                        self.expr(init, &mut facts);
                        facts.unassigned.remove(&decl.var);
                        self.record_constant(decl.var, init, &mut facts);
                    }
                    None => {
                        facts.unassigned.insert(decl.var);
                        facts.constants.remove(&decl.var);
                    }
                }
                Reach::Live(facts)
            }
            StmtKind::If {
                test,
                if_true,
                if_false,
                ..
            } => {
                self.expr(test, &mut facts);
                let taken = self.stmt(if_true, Reach::Live(facts.clone()));
                let skipped = match if_false {
                    Some(if_false) => self.stmt(if_false, Reach::Live(facts)),
                    None => Reach::Live(facts),
                };
                taken.join(skipped)
            }
            StmtKind::For {
                init,
                test,
                next,
                body,
            } => {
                if let Some(init) = init {
                    match self.stmt(init, Reach::Live(facts)) {
                        Reach::Live(after) => facts = after,
                        dead => return dead,
                    }
                }
                forget_written(&mut facts, test.iter().chain(next.iter()), body);
                if let Some(test) = test {
                    self.expr(test, &mut facts);
                }
                let infinite = test.as_ref().map_or(true, is_true);
                self.breaks.push(Vec::new());
                if let Reach::Live(mut end) = self.stmt(body, Reach::Live(facts.clone())) {
                    if let Some(next) = next {
                        self.expr(next, &mut end);
                    }
                }
                self.loop_exit(facts, infinite)
            }
            StmtKind::While { test, body } => {
                forget_written(&mut facts, std::iter::once(&*test), body);
                self.expr(test, &mut facts);
                let infinite = is_true(test);
                self.breaks.push(Vec::new());
                self.stmt(body, Reach::Live(facts.clone()));
                self.loop_exit(facts, infinite)
            }
            StmtKind::Do { body, test } => {
                forget_written(&mut facts, std::iter::once(&*test), body);
                let infinite = is_true(test);
                self.breaks.push(Vec::new());
                let end = match self.stmt(body, Reach::Live(facts)) {
                    Reach::Live(mut end) => {
                        self.expr(test, &mut end);
                        Reach::Live(end)
                    }
                    dead => dead,
                };
                let exit = self.loop_exit(Facts::default(), true);
                if infinite {
                    exit
                } else {
                    exit.join(end)
                }
            }
            StmtKind::Switch { value, cases, .. } => {
                self.expr(value, &mut facts);
                let has_default = cases.iter().any(|case| case.value.is_none());
                self.breaks.push(Vec::new());
                let mut fallthrough = Reach::Dead { reported: true };
                for case in cases {
                    let mut state = Reach::Live(facts.clone()).join(fallthrough);
                    for stmt in &mut case.stmts {
                        state = self.stmt(stmt, state);
                    }
                    fallthrough = state;
                }
                let mut exit = self.collect_breaks().join(fallthrough);
                if !has_default {
                    exit = exit.join(Reach::Live(facts));
                }
                exit
            }
            StmtKind::Return(value) => {
                if let Some(value) = value {
                    self.expr(value, &mut facts);
                }
                Reach::Dead { reported: false }
            }
            StmtKind::Break => {
                if let Some(frame) = self.breaks.last_mut() {
                    frame.push(facts);
                }
                Reach::Dead { reported: false }
            }
            StmtKind::Continue | StmtKind::Discard => Reach::Dead { reported: false },
            StmtKind::Nop => Reach::Live(facts),
        }
    }

    /// Joins the `break` states of the innermost loop with the state leaving
    /// through its condition (none for infinite loops).
    fn loop_exit(&mut self, at_test: Facts, infinite: bool) -> Reach {
        let breaks = self.collect_breaks();
        if infinite {
            breaks
        } else {
            breaks.join(Reach::Live(at_test))
        }
    }

    fn collect_breaks(&mut self) -> Reach {
        self.breaks
            .pop()
            .unwrap_or_default()
            .into_iter()
            .fold(Reach::Dead { reported: true }, |state, facts| {
                state.join(Reach::Live(facts))
            })
    }

    fn static_if(&mut self, stmt: &mut Stmt, facts: Facts) -> Reach {
        let StmtKind::If {
            is_static,
            test,
            if_true,
            if_false,
        } = &mut stmt.kind
        else {
            return Reach::Live(facts);
        };
        match self.eval(test, &facts) {
            Some(ConstValue::Bool(taken)) => {
                let line = stmt.line;
                let chosen = if taken {
                    Some(std::mem::replace(&mut **if_true, Stmt::nop(line)))
                } else {
                    if_false.take().map(|stmt| *stmt)
                };
                *stmt = chosen.unwrap_or_else(|| Stmt::nop(line));
            }
            _ => {
                self.diagnostics
                    .error(stmt.line, "static if has non-static test");
                *is_static = false;
            }
        }
        self.stmt(stmt, Reach::Live(facts))
    }

    fn static_switch(&mut self, stmt: &mut Stmt, facts: Facts) -> Reach {
        let StmtKind::Switch {
            is_static,
            value,
            cases,
        } = &mut stmt.kind
        else {
            return Reach::Live(facts);
        };
        let line = stmt.line;
        let Some(ConstValue::Int(selected)) = self.eval(value, &facts) else {
            self.diagnostics
                .error(line, "static switch has non-static test");
            *is_static = false;
            return self.stmt(stmt, Reach::Live(facts));
        };

        let start = cases
            .iter()
            .position(|case| case.value == Some(selected))
            .or_else(|| cases.iter().position(|case| case.value.is_none()));
        let mut chosen = Vec::new();
        if let Some(start) = start {
            'cases: for case in &mut cases[start..] {
                for stmt in case.stmts.drain(..) {
                    if matches!(stmt.kind, StmtKind::Break) {
                        break 'cases;
                    }
                    if contains_conditional_break(&stmt) {
                        self.diagnostics
                            .error(line, "static switch contains non-static conditional break");
                        return Reach::Live(facts);
                    }
                    chosen.push(stmt);
                }
            }
        }
        *stmt = Stmt::block(chosen, true, line);
        self.stmt(stmt, Reach::Live(facts))
    }

    fn eval(&self, expr: &Expr, facts: &Facts) -> Option<ConstValue> {
        constant::eval(expr, &|var| {
            facts
                .constants
                .get(&var)
                .copied()
                .or(self.variables[var].constant)
        })
    }

    fn record_constant(&self, var: VarId, value: &Expr, facts: &mut Facts) {
        match self.eval(value, facts) {
            Some(constant) => facts.constants.insert(var, constant),
            None => facts.constants.remove(&var),
        };
    }

    fn read(&mut self, var: VarId, line: usize, facts: &mut Facts) {
        if facts.unassigned.remove(&var) {
            let name = &self.variables[var].name;
            self.diagnostics
                .error(line, format!("'{}' has not been assigned", name));
        }
    }

    fn write(&mut self, var: VarId, facts: &mut Facts) {
        facts.unassigned.remove(&var);
        facts.constants.remove(&var);
    }

    fn expr(&mut self, expr: &Expr, facts: &mut Facts) {
        match &expr.kind {
            ExprKind::Bool(_) | ExprKind::Int(_) | ExprKind::Float(_) => {}
            ExprKind::Variable { var, access } => {
                if *access != RefKind::Write {
                    self.read(*var, expr.line, facts);
                }
                if *access != RefKind::Read {
                    self.write(*var, facts);
                }
            }
            ExprKind::Binary { left, op, right } if op.is_assignment() => {
                self.lvalue_operands(left, facts);
                self.expr(right, facts);
                let Some(target) = assigned_variable(left) else {
                    return;
                };
                if *op != BinaryOp::Assign {
                    self.read(target, left.line, facts);
                }
                self.write(target, facts);
                if *op == BinaryOp::Assign && matches!(left.kind, ExprKind::Variable { .. }) {
                    self.record_constant(target, right, facts);
                }
            }
            ExprKind::Binary { left, op, right }
                if matches!(op, BinaryOp::LogicalAnd | BinaryOp::LogicalOr) =>
            {
                self.expr(left, facts);
                let mut branch = facts.clone();
                self.expr(right, &mut branch);
                *facts = std::mem::take(facts).join(branch);
            }
            ExprKind::Binary { left, right, .. } | ExprKind::Index { base: left, index: right } => {
                self.expr(left, facts);
                self.expr(right, facts);
            }
            ExprKind::Prefix { operand, .. } | ExprKind::Postfix { operand, .. } => {
                self.expr(operand, facts)
            }
            ExprKind::Call { args, .. } | ExprKind::Constructor { args } => {
                for arg in args {
                    self.expr(arg, facts);
                }
            }
            ExprKind::Field { base, .. } | ExprKind::Swizzle { base, .. } => self.expr(base, facts),
            ExprKind::Ternary {
                test,
                if_true,
                if_false,
            } => {
                self.expr(test, facts);
                let mut other = facts.clone();
                self.expr(if_true, facts);
                self.expr(if_false, &mut other);
                *facts = std::mem::take(facts).join(other);
            }
        }
    }

    /// Visits the parts of an assignment target that are evaluated as reads,
    /// such as array indices, without touching the target variable itself.
    fn lvalue_operands(&mut self, target: &Expr, facts: &mut Facts) {
        match &target.kind {
            ExprKind::Index { base, index } => {
                self.lvalue_operands(base, facts);
                self.expr(index, facts);
            }
            ExprKind::Field { base, .. } | ExprKind::Swizzle { base, .. } => {
                self.lvalue_operands(base, facts)
            }
            _ => {}
        }
    }
}

fn assigned_variable(target: &Expr) -> Option<VarId> {
    match &target.kind {
        ExprKind::Variable { var, .. } => Some(*var),
        ExprKind::Index { base, .. }
        | ExprKind::Field { base, .. }
        | ExprKind::Swizzle { base, .. } => assigned_variable(base),
        _ => None,
    }
}

fn is_true(expr: &Expr) -> bool {
    matches!(expr.kind, ExprKind::Bool(true))
}

/// Drops the known values of every variable a loop may write.
fn forget_written<'e>(facts: &mut Facts, exprs: impl Iterator<Item = &'e Expr>, body: &Stmt) {
    let mut written = HashSet::new();
    for expr in exprs {
        collect_writes(expr, &mut written);
    }
    body.for_each_expr(&mut |expr| collect_writes(expr, &mut written));
    facts.constants.retain(|var, _| !written.contains(var));
}

fn collect_writes(expr: &Expr, written: &mut HashSet<VarId>) {
    expr.any(&mut |expr| {
        if let ExprKind::Variable { var, access } = expr.kind {
            if access != RefKind::Read {
                written.insert(var);
            }
        }
        false
    });
}

/// Whether `stmt` contains a `break` that leaves the enclosing switch from
/// inside a nested statement.
fn contains_conditional_break(stmt: &Stmt) -> bool {
    match &stmt.kind {
        StmtKind::Break => true,
        StmtKind::Block { stmts, .. } => stmts.iter().any(contains_conditional_break),
        StmtKind::If {
            if_true, if_false, ..
        } => {
            contains_conditional_break(if_true)
                || if_false
                    .as_deref()
                    .is_some_and(contains_conditional_break)
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use crate::analyzer::analyze;
    use crate::caps::ShaderCapsFactory;
    use crate::ir::{ProgramKind, StmtKind};
    use crate::lexer::tokenize;
    use crate::parser::parse;

    fn errors(source: &str) -> Vec<String> {
        let (program, parse_errors) = parse(tokenize(source));
        assert!(parse_errors.is_empty(), "parse errors: {}", parse_errors);
        let (_, diagnostics) = analyze(
            &program,
            ProgramKind::Fragment,
            &ShaderCapsFactory::default_caps(),
        );
        diagnostics
            .messages()
            .into_iter()
            .map(str::to_string)
            .collect()
    }

    #[test]
    fn unassigned_read_is_reported_once() {
        assert_eq!(
            errors("void main() { int x; int y = x; int z = x; }"),
            vec!["'x' has not been assigned"]
        );
    }

    #[test]
    fn both_branches_assigning_counts_as_assigned() {
        let source = "void main() { int x; if (sk_Clockwise) x = 1; else x = 2; x++; }";
        assert!(errors(source).is_empty());
    }

    #[test]
    fn break_out_of_infinite_loop_reaches_the_end() {
        assert_eq!(
            errors("int f() { for (;;) { break; } } void main() {}"),
            vec!["function 'f' can exit without returning a value"]
        );
        assert!(errors("int f() { for (;;) {} } void main() {}").is_empty());
    }

    #[test]
    fn loop_writes_invalidate_constants() {
        assert_eq!(
            errors(
                "void main() { int x = 1; for (int i = 0; i < 2; i++) { x = 2; } \
                 @if (x == 1) { sk_FragColor = half4(1); } }"
            ),
            vec!["static if has non-static test"]
        );
    }

    #[test]
    fn static_if_is_replaced_by_the_taken_branch() {
        let (program, _) = parse(tokenize(
            "void main() { const bool b = false; @if (b) { discard; } else { sk_FragColor = half4(1); } }",
        ));
        let (ir, diagnostics) = analyze(
            &program,
            ProgramKind::Fragment,
            &ShaderCapsFactory::default_caps(),
        );
        assert!(diagnostics.is_empty(), "unexpected errors: {}", diagnostics);
        let main = ir.main().expect("main defined");
        let StmtKind::Block { stmts, .. } = &main.body.kind else {
            panic!("expected block body");
        };
        assert!(
            !stmts.iter().any(|stmt| matches!(stmt.kind, StmtKind::If { .. })),
            "static if should have been resolved, got: {:?}",
            stmts
        );
    }
}
