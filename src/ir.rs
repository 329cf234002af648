//! Typed intermediate representation produced by the analyzer.
//!
//! Every expression carries its resolved [`Type`]. Variables and functions
//! live in arenas owned by the [`Program`] and are referred to by index, so
//! the IR can be cloned and rewritten freely by back-end passes.

use std::fmt;
use std::sync::Arc;

use la_arena::{Arena, Idx};
use smallvec::SmallVec;

use crate::modifiers::{ModifierFlags, Modifiers};
pub use crate::parser::ast::{BinaryOp, PostfixOp, PrefixOp};
use crate::types::{StructType, Type};

pub type VarId = Idx<Variable>;
pub type FnId = Idx<FunctionDecl>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProgramKind {
    Fragment,
    Vertex,
    Geometry,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConstValue {
    Bool(bool),
    Int(i64),
    Float(f64),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Storage {
    Global,
    Local,
    Parameter,
}

/// Variables the compiler provides rather than the program declaring them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Builtin {
    FragColor,
    FragCoord,
    Clockwise,
    Position,
    PointSize,
    VertexId,
    InstanceId,
    InvocationId,
    PerVertexIn,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Variable {
    pub name: String,
    pub ty: Type,
    pub modifiers: Modifiers,
    pub storage: Storage,
    pub line: usize,
    pub builtin: Option<Builtin>,
    /// Value of a `const` variable whose initializer folded to a literal.
    pub constant: Option<ConstValue>,
}

impl Variable {
    pub fn new(
        name: impl Into<String>,
        ty: Type,
        modifiers: Modifiers,
        storage: Storage,
        line: usize,
    ) -> Self {
        Self {
            name: name.into(),
            ty,
            modifiers,
            storage,
            line,
            builtin: None,
            constant: None,
        }
    }

    pub fn local(name: impl Into<String>, ty: Type, line: usize) -> Self {
        Self::new(name, ty, Modifiers::default(), Storage::Local, line)
    }

    /// Whether assignments to the variable are rejected.
    pub fn is_immutable(&self) -> bool {
        let flags = self.modifiers.flags;
        flags.intersects(ModifierFlags::CONST | ModifierFlags::UNIFORM)
            || (self.storage == Storage::Global
                && flags.contains(ModifierFlags::IN)
                && !flags.contains(ModifierFlags::OUT))
            || flags.contains(ModifierFlags::READONLY)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDecl {
    pub name: String,
    pub params: Vec<VarId>,
    pub return_type: Type,
    pub modifiers: Modifiers,
    pub line: usize,
    /// Part of the intrinsic library or the builtin environment.
    pub builtin: bool,
    pub defined: bool,
}

impl FunctionDecl {
    pub fn new(name: impl Into<String>, return_type: Type, line: usize) -> Self {
        Self {
            name: name.into(),
            params: Vec::new(),
            return_type,
            modifiers: Modifiers::default(),
            line,
            builtin: false,
            defined: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    pub kind: ProgramKind,
    pub elements: Vec<Element>,
    pub variables: Arena<Variable>,
    pub functions: Arena<FunctionDecl>,
}

impl Program {
    pub fn new(kind: ProgramKind) -> Self {
        Self {
            kind,
            elements: Vec::new(),
            variables: Arena::new(),
            functions: Arena::new(),
        }
    }

    /// Signature in the form used by redeclaration diagnostics:
    /// `float f(int x, out half2 y)`.
    pub fn describe_function(&self, function: FnId) -> String {
        let decl = &self.functions[function];
        let params: Vec<String> = decl
            .params
            .iter()
            .map(|param| {
                let var = &self.variables[*param];
                let flags = var.modifiers.flags;
                let prefix = if flags.contains(ModifierFlags::IN | ModifierFlags::OUT) {
                    "inout "
                } else if flags.contains(ModifierFlags::OUT) {
                    "out "
                } else {
                    ""
                };
                format!("{}{} {}", prefix, var.ty, var.name)
            })
            .collect();
        format!("{} {}({})", decl.return_type, decl.name, params.join(", "))
    }

    pub fn function_definitions(&self) -> impl Iterator<Item = &FunctionDef> {
        self.elements.iter().filter_map(|element| match element {
            Element::Function(def) => Some(def),
            _ => None,
        })
    }

    pub fn function_definitions_mut(&mut self) -> impl Iterator<Item = &mut FunctionDef> {
        self.elements.iter_mut().filter_map(|element| match element {
            Element::Function(def) => Some(def),
            _ => None,
        })
    }

    /// The definition of `main`, if the program has one.
    pub fn main(&self) -> Option<&FunctionDef> {
        self.function_definitions()
            .find(|def| self.functions[def.decl].name == "main")
    }

    pub fn find_global(&self, name: &str) -> Option<VarId> {
        self.elements.iter().find_map(|element| match element {
            Element::GlobalVar(decl) if self.variables[decl.var].name == name => Some(decl.var),
            _ => None,
        })
    }

    pub fn find_function(&self, name: &str) -> Option<FnId> {
        self.functions
            .iter()
            .find(|(_, decl)| decl.name == name)
            .map(|(id, _)| id)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Element {
    GlobalVar(VarDecl),
    InterfaceBlock(InterfaceBlock),
    Struct(Arc<StructType>),
    Modifiers { modifiers: Modifiers, line: usize },
    Function(FunctionDef),
    Prototype(FnId),
}

#[derive(Debug, Clone, PartialEq)]
pub struct VarDecl {
    pub var: VarId,
    pub init: Option<Expr>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InterfaceBlock {
    pub modifiers: Modifiers,
    pub ty: Arc<StructType>,
    /// The instance variable; `None` when the fields are declared globally.
    pub instance: Option<VarId>,
    pub line: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDef {
    pub decl: FnId,
    pub body: Stmt,
    pub line: usize,
}

/// How an expression touches the variable it names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefKind {
    Read,
    Write,
    ReadWrite,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    pub kind: ExprKind,
    pub ty: Type,
    pub line: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    Bool(bool),
    Int(i64),
    Float(f64),
    Variable {
        var: VarId,
        access: RefKind,
    },
    Binary {
        left: Box<Expr>,
        op: BinaryOp,
        right: Box<Expr>,
    },
    Prefix {
        op: PrefixOp,
        operand: Box<Expr>,
    },
    Postfix {
        op: PostfixOp,
        operand: Box<Expr>,
    },
    Call {
        function: FnId,
        args: Vec<Expr>,
    },
    Constructor {
        args: Vec<Expr>,
    },
    Field {
        base: Box<Expr>,
        index: usize,
    },
    Index {
        base: Box<Expr>,
        index: Box<Expr>,
    },
    /// Component indices 0-3 into the base.
    Swizzle {
        base: Box<Expr>,
        components: SmallVec<[u8; 4]>,
    },
    Ternary {
        test: Box<Expr>,
        if_true: Box<Expr>,
        if_false: Box<Expr>,
    },
}

impl Expr {
    pub fn new(kind: ExprKind, ty: Type, line: usize) -> Self {
        Self { kind, ty, line }
    }

    pub fn bool_literal(value: bool, line: usize) -> Self {
        Self::new(ExprKind::Bool(value), crate::types::BOOL, line)
    }

    pub fn int_literal(value: i64, ty: Type, line: usize) -> Self {
        Self::new(ExprKind::Int(value), ty, line)
    }

    pub fn float_literal(value: f64, ty: Type, line: usize) -> Self {
        Self::new(ExprKind::Float(value), ty, line)
    }

    pub fn variable(var: VarId, ty: Type, access: RefKind, line: usize) -> Self {
        Self::new(ExprKind::Variable { var, access }, ty, line)
    }

    pub fn binary(left: Expr, op: BinaryOp, right: Expr, ty: Type) -> Self {
        let line = left.line;
        Self::new(
            ExprKind::Binary {
                left: Box::new(left),
                op,
                right: Box::new(right),
            },
            ty,
            line,
        )
    }

    pub fn call(function: FnId, args: Vec<Expr>, ty: Type, line: usize) -> Self {
        Self::new(ExprKind::Call { function, args }, ty, line)
    }

    pub fn swizzle(base: Expr, components: &[u8], line: usize) -> Self {
        let scalar = base.ty.component().unwrap_or(crate::types::ScalarKind::Float);
        let ty = Type::compound(scalar, components.len() as u8, 1);
        Self::new(
            ExprKind::Swizzle {
                base: Box::new(base),
                components: components.iter().copied().collect(),
            },
            ty,
            line,
        )
    }

    pub fn constant_value(&self) -> Option<ConstValue> {
        match self.kind {
            ExprKind::Bool(b) => Some(ConstValue::Bool(b)),
            ExprKind::Int(i) => Some(ConstValue::Int(i)),
            ExprKind::Float(f) => Some(ConstValue::Float(f)),
            _ => None,
        }
    }

    pub fn is_literal(&self) -> bool {
        self.constant_value().is_some()
    }

    /// Whether any subexpression satisfies `predicate`.
    pub fn any(&self, predicate: &mut impl FnMut(&Expr) -> bool) -> bool {
        if predicate(self) {
            return true;
        }
        match &self.kind {
            ExprKind::Bool(_)
            | ExprKind::Int(_)
            | ExprKind::Float(_)
            | ExprKind::Variable { .. } => false,
            ExprKind::Binary { left, right, .. } => left.any(predicate) || right.any(predicate),
            ExprKind::Prefix { operand, .. } | ExprKind::Postfix { operand, .. } => {
                operand.any(predicate)
            }
            ExprKind::Call { args, .. } | ExprKind::Constructor { args } => {
                args.iter().any(|arg| arg.any(predicate))
            }
            ExprKind::Field { base, .. } | ExprKind::Swizzle { base, .. } => base.any(predicate),
            ExprKind::Index { base, index } => base.any(predicate) || index.any(predicate),
            ExprKind::Ternary {
                test,
                if_true,
                if_false,
            } => test.any(predicate) || if_true.any(predicate) || if_false.any(predicate),
        }
    }

    pub fn references(&self, var: VarId) -> bool {
        self.any(&mut |expr| matches!(expr.kind, ExprKind::Variable { var: v, .. } if v == var))
    }

    /// Visits every subexpression mutably, children before parents.
    pub fn for_each_mut(&mut self, visit: &mut impl FnMut(&mut Expr)) {
        match &mut self.kind {
            ExprKind::Bool(_)
            | ExprKind::Int(_)
            | ExprKind::Float(_)
            | ExprKind::Variable { .. } => {}
            ExprKind::Binary { left, right, .. } | ExprKind::Index { base: left, index: right } => {
                left.for_each_mut(visit);
                right.for_each_mut(visit);
            }
            ExprKind::Prefix { operand, .. } | ExprKind::Postfix { operand, .. } => {
                operand.for_each_mut(visit)
            }
            ExprKind::Call { args, .. } | ExprKind::Constructor { args } => {
                for arg in args {
                    arg.for_each_mut(visit);
                }
            }
            ExprKind::Field { base, .. } | ExprKind::Swizzle { base, .. } => {
                base.for_each_mut(visit)
            }
            ExprKind::Ternary {
                test,
                if_true,
                if_false,
            } => {
                test.for_each_mut(visit);
                if_true.for_each_mut(visit);
                if_false.for_each_mut(visit);
            }
        }
        visit(self);
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Stmt {
    pub kind: StmtKind,
    pub line: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub enum StmtKind {
    /// An unscoped block groups statements without opening a scope, e.g.
    /// several declarations from one source line.
    Block {
        stmts: Vec<Stmt>,
        scoped: bool,
    },
    Expr(Expr),
    VarDecl(VarDecl),
    If {
        is_static: bool,
        test: Expr,
        if_true: Box<Stmt>,
        if_false: Option<Box<Stmt>>,
    },
    For {
        init: Option<Box<Stmt>>,
        test: Option<Expr>,
        next: Option<Expr>,
        body: Box<Stmt>,
    },
    While {
        test: Expr,
        body: Box<Stmt>,
    },
    Do {
        body: Box<Stmt>,
        test: Expr,
    },
    Switch {
        is_static: bool,
        value: Expr,
        cases: Vec<SwitchCase>,
    },
    Return(Option<Expr>),
    Break,
    Continue,
    Discard,
    Nop,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SwitchCase {
    /// `None` for `default:`.
    pub value: Option<i64>,
    pub stmts: Vec<Stmt>,
    pub line: usize,
}

impl Stmt {
    pub fn new(kind: StmtKind, line: usize) -> Self {
        Self { kind, line }
    }

    pub fn block(stmts: Vec<Stmt>, scoped: bool, line: usize) -> Self {
        Self::new(StmtKind::Block { stmts, scoped }, line)
    }

    pub fn expr(expr: Expr) -> Self {
        let line = expr.line;
        Self::new(StmtKind::Expr(expr), line)
    }

    pub fn nop(line: usize) -> Self {
        Self::new(StmtKind::Nop, line)
    }

    pub fn is_nop(&self) -> bool {
        matches!(self.kind, StmtKind::Nop)
    }

    /// Calls `visit` with each top-level expression of this statement and of
    /// every nested statement.
    pub fn for_each_expr(&self, visit: &mut impl FnMut(&Expr)) {
        match &self.kind {
            StmtKind::Block { stmts, .. } => {
                for stmt in stmts {
                    stmt.for_each_expr(visit);
                }
            }
            StmtKind::Expr(expr) | StmtKind::Return(Some(expr)) => visit(expr),
            StmtKind::VarDecl(decl) => {
                if let Some(init) = &decl.init {
                    visit(init);
                }
            }
            StmtKind::If {
                test,
                if_true,
                if_false,
                ..
            } => {
                visit(test);
                if_true.for_each_expr(visit);
                if let Some(if_false) = if_false {
                    if_false.for_each_expr(visit);
                }
            }
            StmtKind::For {
                init,
                test,
                next,
                body,
            } => {
                if let Some(init) = init {
                    init.for_each_expr(visit);
                }
                if let Some(test) = test {
                    visit(test);
                }
                if let Some(next) = next {
                    visit(next);
                }
                body.for_each_expr(visit);
            }
            StmtKind::While { test, body } | StmtKind::Do { body, test } => {
                visit(test);
                body.for_each_expr(visit);
            }
            StmtKind::Switch { value, cases, .. } => {
                visit(value);
                for case in cases {
                    for stmt in &case.stmts {
                        stmt.for_each_expr(visit);
                    }
                }
            }
            StmtKind::Return(None)
            | StmtKind::Break
            | StmtKind::Continue
            | StmtKind::Discard
            | StmtKind::Nop => {}
        }
    }

    /// Mutable twin of [`Stmt::for_each_expr`].
    pub fn for_each_expr_mut(&mut self, visit: &mut impl FnMut(&mut Expr)) {
        match &mut self.kind {
            StmtKind::Block { stmts, .. } => {
                for stmt in stmts {
                    stmt.for_each_expr_mut(visit);
                }
            }
            StmtKind::Expr(expr) | StmtKind::Return(Some(expr)) => visit(expr),
            StmtKind::VarDecl(decl) => {
                if let Some(init) = &mut decl.init {
                    visit(init);
                }
            }
            StmtKind::If {
                test,
                if_true,
                if_false,
                ..
            } => {
                visit(test);
                if_true.for_each_expr_mut(visit);
                if let Some(if_false) = if_false {
                    if_false.for_each_expr_mut(visit);
                }
            }
            StmtKind::For {
                init,
                test,
                next,
                body,
            } => {
                if let Some(init) = init {
                    init.for_each_expr_mut(visit);
                }
                if let Some(test) = test {
                    visit(test);
                }
                if let Some(next) = next {
                    visit(next);
                }
                body.for_each_expr_mut(visit);
            }
            StmtKind::While { test, body } | StmtKind::Do { body, test } => {
                visit(test);
                body.for_each_expr_mut(visit);
            }
            StmtKind::Switch { value, cases, .. } => {
                visit(value);
                for case in cases {
                    for stmt in &mut case.stmts {
                        stmt.for_each_expr_mut(visit);
                    }
                }
            }
            StmtKind::Return(None)
            | StmtKind::Break
            | StmtKind::Continue
            | StmtKind::Discard
            | StmtKind::Nop => {}
        }
    }

    /// Applies `rewrite` to this statement and then to every nested
    /// statement of the result, outermost first.
    pub fn rewrite_pre_order(&mut self, rewrite: &mut impl FnMut(&mut Stmt)) {
        rewrite(self);
        self.rewrite_children(&mut |stmt| stmt.rewrite_pre_order(&mut *rewrite));
    }

    /// Applies `rewrite` to every nested statement, innermost first, and
    /// then to this statement. Statements produced by `rewrite` are not
    /// revisited.
    pub fn rewrite_post_order(&mut self, rewrite: &mut impl FnMut(&mut Stmt)) {
        self.rewrite_children(&mut |stmt| stmt.rewrite_post_order(&mut *rewrite));
        rewrite(self);
    }

    fn rewrite_children(&mut self, rewrite: &mut impl FnMut(&mut Stmt)) {
        match &mut self.kind {
            StmtKind::Block { stmts, .. } => {
                for stmt in stmts {
                    rewrite(stmt);
                }
            }
            StmtKind::If {
                if_true, if_false, ..
            } => {
                rewrite(&mut **if_true);
                if let Some(if_false) = if_false {
                    rewrite(&mut **if_false);
                }
            }
            StmtKind::For { init, body, .. } => {
                if let Some(init) = init {
                    rewrite(&mut **init);
                }
                rewrite(&mut **body);
            }
            StmtKind::While { body, .. } | StmtKind::Do { body, .. } => {
                rewrite(&mut **body);
            }
            StmtKind::Switch { cases, .. } => {
                for case in cases {
                    for stmt in &mut case.stmts {
                        rewrite(stmt);
                    }
                }
            }
            StmtKind::Expr(_)
            | StmtKind::VarDecl(_)
            | StmtKind::Return(_)
            | StmtKind::Break
            | StmtKind::Continue
            | StmtKind::Discard
            | StmtKind::Nop => {}
        }
    }
}

impl fmt::Display for ProgramKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ProgramKind::Fragment => "fragment",
            ProgramKind::Vertex => "vertex",
            ProgramKind::Geometry => "geometry",
        };
        write!(f, "{}", name)
    }
}
