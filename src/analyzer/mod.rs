//! Semantic analysis.
//!
//! [`analyze`] walks the AST once, resolving every name against the
//! [`SymbolTable`] and every expression against the type system, and builds
//! the typed [`ir::Program`]. Problems are reported to a [`Diagnostics`]
//! collector rather than aborting, so one run reports as many independent
//! errors as it can. Conversion helpers return `None` after reporting, and
//! callers drop the construct silently so one mistake yields one message.
//!
//! When conversion succeeds without errors, [`flow`] checks definite
//! assignment and reachability and resolves `@if`/`@switch`.

mod builtins;
pub mod constant;
mod constructor;
mod expr;
mod flow;

use std::collections::HashSet;
use std::sync::Arc;

use crate::caps::ShaderCaps;
use crate::errors::Diagnostics;
use crate::ir::{
    self, ConstValue, Element, FnId, FunctionDef, ProgramKind, Stmt, StmtKind, Storage, SwitchCase,
    VarDecl, Variable,
};
use crate::modifiers::{ModifierFlags, Modifiers};
use crate::parser::ast;
use crate::symbols::{Overloads, Symbol, SymbolTable};
use crate::types::{Field, ScalarKind, StructType, Type, BOOL, INT};

/// Converts a parsed program into IR for the given program kind.
///
/// The returned program is only meaningful when the diagnostics are empty.
pub fn analyze(
    program: &ast::Program,
    kind: ProgramKind,
    caps: &ShaderCaps,
) -> (ir::Program, Diagnostics) {
    let mut diagnostics = Diagnostics::new();
    let mut ir = Analyzer::new(kind, caps, &mut diagnostics).run(program);
    if diagnostics.is_empty() {
        flow::check_program(&mut ir, &mut diagnostics);
    }
    log::debug!(
        "analyzed {} program: {} elements, {} errors",
        kind,
        ir.elements.len(),
        diagnostics.len()
    );
    (ir, diagnostics)
}

pub(crate) struct Analyzer<'a> {
    kind: ProgramKind,
    caps: &'a ShaderCaps,
    diagnostics: &'a mut Diagnostics,
    program: ir::Program,
    symbols: SymbolTable,
    current_function: Option<FnId>,
    loop_level: usize,
    switch_level: usize,
}

impl<'a> Analyzer<'a> {
    fn new(kind: ProgramKind, caps: &'a ShaderCaps, diagnostics: &'a mut Diagnostics) -> Self {
        Self {
            kind,
            caps,
            diagnostics,
            program: ir::Program::new(kind),
            symbols: SymbolTable::new(),
            current_function: None,
            loop_level: 0,
            switch_level: 0,
        }
    }

    fn run(mut self, program: &ast::Program) -> ir::Program {
        self.declare_builtins();
        // Program globals live one level below the builtins so they may
        // shadow intrinsic names.
        self.symbols.push_scope();
        for declaration in &program.declarations {
            self.convert_declaration(declaration);
        }
        self.program
    }

    fn error(&mut self, line: usize, message: impl Into<String>) {
        self.diagnostics.error(line, message);
    }

    fn declare(&mut self, name: &str, symbol: Symbol, line: usize) {
        if let Err(err) = self.symbols.declare(name, symbol) {
            self.error(line, err.to_string());
        }
    }

    /// Value of `expr` if it is a compile-time constant, following `const`
    /// variables with folded initializers.
    fn const_eval(&self, expr: &ir::Expr) -> Option<ConstValue> {
        let variables = &self.program.variables;
        constant::eval(expr, &|var| variables[var].constant)
    }

    // ---- declarations ----

    fn convert_declaration(&mut self, declaration: &ast::Declaration) {
        match declaration {
            ast::Declaration::Variables(decls) => {
                self.check_global_modifiers(&decls.modifiers, decls.line);
                self.check_fragment_output(&decls.modifiers, decls.line);
                for decl in self.convert_var_declarations(decls, Storage::Global) {
                    self.program.elements.push(Element::GlobalVar(decl));
                }
            }
            ast::Declaration::Function(function) => self.convert_function(function),
            ast::Declaration::InterfaceBlock(block) => self.convert_interface_block(block),
            ast::Declaration::Struct(decl) => {
                if let Some(ty) = self.convert_struct(decl) {
                    self.program.elements.push(Element::Struct(ty));
                }
            }
            ast::Declaration::Enum(decl) => self.convert_enum(decl),
            ast::Declaration::Modifiers { modifiers, line } => {
                self.program.elements.push(Element::Modifiers {
                    modifiers: modifiers.clone(),
                    line: *line,
                });
            }
        }
    }

    fn check_modifiers(&mut self, modifiers: &Modifiers, permitted: ModifierFlags, line: usize) {
        for name in modifiers.flags.disallowed(permitted) {
            self.error(line, format!("'{}' is not permitted here", name));
        }
    }

    fn check_global_modifiers(&mut self, modifiers: &Modifiers, line: usize) {
        let flags = modifiers.flags;
        if flags.contains(ModifierFlags::IN | ModifierFlags::UNIFORM) {
            self.error(
                line,
                "'in uniform' variables only permitted within fragment processors",
            );
        }
        if flags.contains(ModifierFlags::VARYING) {
            self.error(line, "'varying' is only permitted in runtime effects");
        }
        self.check_modifiers(
            modifiers,
            ModifierFlags::all() - ModifierFlags::HAS_SIDE_EFFECTS,
            line,
        );
    }

    fn check_fragment_output(&mut self, modifiers: &Modifiers, line: usize) {
        if self.kind == ProgramKind::Fragment
            && modifiers.contains(ModifierFlags::OUT)
            && modifiers.layout.location == Some(0)
            && modifiers.layout.index == Some(0)
        {
            self.error(line, "out location=0, index=0 is reserved for sk_FragColor");
        }
    }

    /// Resolves a type name: user types first, then the built-in types.
    fn resolve_type(&mut self, name: &str, line: usize) -> Option<Type> {
        if let Some(Symbol::Type(ty)) = self.symbols.lookup(name) {
            return Some(ty.clone());
        }
        if let Some(ty) = Type::from_name(name) {
            return Some(ty);
        }
        self.error(line, format!("unknown type '{}'", name));
        None
    }

    /// Wraps `base` in one array layer per size, outermost first.
    fn array_type(
        &mut self,
        base: Type,
        sizes: &[Option<ast::Expr>],
        allow_unsized: bool,
        line: usize,
    ) -> Option<Type> {
        let mut dimensions = Vec::with_capacity(sizes.len());
        for size in sizes {
            match size {
                Some(expr) => dimensions.push(Some(self.array_size(expr)?)),
                None if allow_unsized => dimensions.push(None),
                None => {
                    self.error(line, "unsized arrays are only permitted in interface blocks");
                    return None;
                }
            }
        }
        Some(
            dimensions
                .into_iter()
                .rev()
                .fold(base, |ty, size| Type::Array(Box::new(ty), size)),
        )
    }

    fn array_size(&mut self, expr: &ast::Expr) -> Option<u32> {
        let size = self.convert_expr(expr)?;
        let is_integer = size.ty.component().is_some_and(ScalarKind::is_integer);
        match self.const_eval(&size) {
            Some(ConstValue::Int(n)) if is_integer && n > 0 => {
                if let Ok(n) = u32::try_from(n) {
                    return Some(n);
                }
            }
            _ => {}
        }
        self.error(expr.line, "array size must be a positive constant integer");
        None
    }

    fn convert_var_declarations(
        &mut self,
        decls: &ast::VarDeclarations,
        storage: Storage,
    ) -> Vec<VarDecl> {
        let Some(base) = self.resolve_type(&decls.type_name, decls.line) else {
            return Vec::new();
        };
        if base.is_void() {
            self.error(decls.line, "variables of type 'void' are not allowed");
            return Vec::new();
        }

        let mut converted = Vec::with_capacity(decls.vars.len());
        for declarator in &decls.vars {
            let Some(ty) = self.array_type(base.clone(), &declarator.sizes, false, declarator.line)
            else {
                continue;
            };
            let init = match &declarator.init {
                Some(init) => self
                    .convert_expr(init)
                    .and_then(|value| self.coerce(value, &ty)),
                None => None,
            };

            let mut variable = Variable::new(
                &declarator.name,
                ty,
                decls.modifiers.clone(),
                storage,
                declarator.line,
            );
            if decls.modifiers.contains(ModifierFlags::CONST) {
                variable.constant = init.as_ref().and_then(|init| self.const_eval(init));
            }
            let var = self.program.variables.alloc(variable);
            self.declare(&declarator.name, Symbol::Variable(var), declarator.line);
            converted.push(VarDecl { var, init });
        }
        converted
    }

    fn convert_function(&mut self, function: &ast::FunctionDecl) {
        self.check_modifiers(
            &function.modifiers,
            ModifierFlags::HAS_SIDE_EFFECTS,
            function.line,
        );
        let Some(return_type) = self.resolve_type(&function.return_type, function.line) else {
            return;
        };

        let mut params = Vec::with_capacity(function.params.len());
        for param in &function.params {
            self.check_modifiers(
                &param.modifiers,
                ModifierFlags::IN | ModifierFlags::OUT,
                param.line,
            );
            let ty = self
                .resolve_type(&param.type_name, param.line)
                .and_then(|base| self.array_type(base, &param.sizes, false, param.line));
            let Some(ty) = ty else { return };
            params.push(self.program.variables.alloc(Variable::new(
                &param.name,
                ty,
                param.modifiers.clone(),
                Storage::Parameter,
                param.line,
            )));
        }

        let mut decl = ir::FunctionDecl::new(&function.name, return_type, function.line);
        decl.params = params.clone();
        decl.modifiers = function.modifiers.clone();
        let new_id = self.program.functions.alloc(decl);

        let prior: Option<Overloads> = match self.symbols.lookup(&function.name) {
            None => Some(Overloads::new()),
            Some(Symbol::Functions(_)) => Some(self.symbols.overloads(&function.name)),
            Some(_) => None,
        };
        let Some(prior) = prior else {
            self.error(
                function.line,
                format!("symbol '{}' was already defined", function.name),
            );
            return;
        };

        let existing = prior
            .iter()
            .copied()
            .find(|&other| self.same_parameter_types(other, new_id));
        let id = match existing {
            Some(other) => {
                if !self.compatible_redeclaration(other, new_id, function) {
                    return;
                }
                if function.body.is_some() {
                    self.program.functions[other].params = params.clone();
                }
                other
            }
            None => {
                if let Err(err) = self.symbols.declare_function(&function.name, new_id) {
                    self.error(function.line, err.to_string());
                    return;
                }
                new_id
            }
        };

        let Some(body) = &function.body else {
            self.program.elements.push(Element::Prototype(id));
            return;
        };
        self.program.functions[id].defined = true;

        self.symbols.push_scope();
        for (param, ast_param) in params.iter().zip(&function.params) {
            self.declare(&ast_param.name, Symbol::Variable(*param), ast_param.line);
        }
        self.current_function = Some(id);
        let body = self.convert_statement(body);
        self.current_function = None;
        self.symbols.pop_scope();

        if let Some(body) = body {
            self.program.elements.push(Element::Function(FunctionDef {
                decl: id,
                body,
                line: function.line,
            }));
        }
    }

    fn same_parameter_types(&self, a: FnId, b: FnId) -> bool {
        let functions = &self.program.functions;
        let variables = &self.program.variables;
        let (a, b) = (&functions[a].params, &functions[b].params);
        a.len() == b.len()
            && a
                .iter()
                .zip(b)
                .all(|(x, y)| variables[*x].ty == variables[*y].ty)
    }

    /// Checks a declaration against an earlier one with the same parameter
    /// types, reporting the first incompatibility.
    fn compatible_redeclaration(
        &mut self,
        earlier: FnId,
        new: FnId,
        function: &ast::FunctionDecl,
    ) -> bool {
        let line = function.line;
        if self.program.functions[earlier].return_type != self.program.functions[new].return_type {
            let message = format!(
                "functions '{}' and '{}' differ only in return type",
                self.program.describe_function(new),
                self.program.describe_function(earlier)
            );
            self.error(line, message);
            return false;
        }

        let earlier_params = self.program.functions[earlier].params.clone();
        let new_params = self.program.functions[new].params.clone();
        for (i, (a, b)) in earlier_params.iter().zip(&new_params).enumerate() {
            let direction = ModifierFlags::IN | ModifierFlags::OUT;
            let a = self.program.variables[*a].modifiers.flags & direction;
            let b = self.program.variables[*b].modifiers.flags & direction;
            // `in` is the default, so `f(in x)` matches `f(x)`.
            let normalize = |flags: ModifierFlags| {
                if flags == ModifierFlags::IN {
                    ModifierFlags::empty()
                } else {
                    flags
                }
            };
            if normalize(a) != normalize(b) {
                self.error(
                    line,
                    format!(
                        "modifiers on parameter {} differ between declaration and definition",
                        i + 1
                    ),
                );
                return false;
            }
        }

        if function.body.is_some() && self.program.functions[earlier].defined {
            let message = format!(
                "duplicate definition of {}",
                self.program.describe_function(new)
            );
            self.error(line, message);
            return false;
        }
        true
    }

    fn convert_struct(&mut self, decl: &ast::StructDecl) -> Option<Arc<StructType>> {
        let mut fields = Vec::new();
        let mut names = HashSet::new();
        for field_decls in &decl.fields {
            self.check_modifiers(&field_decls.modifiers, ModifierFlags::empty(), field_decls.line);
            let Some(base) = self.resolve_type(&field_decls.type_name, field_decls.line) else {
                continue;
            };
            for declarator in &field_decls.vars {
                let Some(ty) =
                    self.array_type(base.clone(), &declarator.sizes, false, declarator.line)
                else {
                    continue;
                };
                if !names.insert(declarator.name.clone()) {
                    self.error(
                        declarator.line,
                        format!("field '{}' was already defined", declarator.name),
                    );
                    continue;
                }
                fields.push(Field {
                    modifiers: field_decls.modifiers.clone(),
                    name: declarator.name.clone(),
                    ty,
                });
            }
        }

        let ty = Arc::new(StructType {
            name: decl.name.clone(),
            fields,
            is_interface_block: false,
        });
        self.declare(&decl.name, Symbol::Type(Type::Struct(ty.clone())), decl.line);
        Some(ty)
    }

    fn convert_interface_block(&mut self, block: &ast::InterfaceBlock) {
        self.check_modifiers(
            &block.modifiers,
            ModifierFlags::all() - ModifierFlags::HAS_SIDE_EFFECTS,
            block.line,
        );

        let mut fields = Vec::new();
        for field_decls in &block.fields {
            self.check_modifiers(&field_decls.modifiers, ModifierFlags::empty(), field_decls.line);
            let Some(base) = self.resolve_type(&field_decls.type_name, field_decls.line) else {
                return;
            };
            for declarator in &field_decls.vars {
                let Some(ty) =
                    self.array_type(base.clone(), &declarator.sizes, true, declarator.line)
                else {
                    return;
                };
                fields.push(Field {
                    modifiers: field_decls.modifiers.clone(),
                    name: declarator.name.clone(),
                    ty,
                });
            }
        }
        if let Some((_, leading)) = fields.split_last() {
            if leading
                .iter()
                .any(|field| matches!(field.ty, Type::Array(_, None)))
            {
                self.error(
                    block.line,
                    "only the last entry in an interface block may be a runtime-sized array",
                );
                return;
            }
        }

        let ty = Arc::new(StructType {
            name: block.type_name.clone(),
            fields,
            is_interface_block: true,
        });
        // Instance sizes are evaluated before any field name is visible.
        let Some(instance_ty) = self.array_type(
            Type::Struct(ty.clone()),
            &block.sizes,
            true,
            block.line,
        ) else {
            return;
        };

        let instance = match &block.instance {
            Some(name) => {
                let var = self.program.variables.alloc(Variable::new(
                    name,
                    instance_ty,
                    block.modifiers.clone(),
                    Storage::Global,
                    block.line,
                ));
                self.declare(name, Symbol::Variable(var), block.line);
                Some(var)
            }
            None => {
                for field in &ty.fields {
                    let modifiers =
                        Modifiers::new(field.modifiers.layout.clone(), block.modifiers.flags);
                    let var = self.program.variables.alloc(Variable::new(
                        &field.name,
                        field.ty.clone(),
                        modifiers,
                        Storage::Global,
                        block.line,
                    ));
                    self.declare(&field.name, Symbol::Variable(var), block.line);
                }
                None
            }
        };

        self.program.elements.push(Element::InterfaceBlock(ir::InterfaceBlock {
            modifiers: block.modifiers.clone(),
            ty,
            instance,
            line: block.line,
        }));
    }

    fn convert_enum(&mut self, decl: &ast::EnumDecl) {
        self.declare(&decl.name, Symbol::Type(INT), decl.line);

        let mut next = 0i64;
        for value in &decl.values {
            if let Some(expr) = &value.value {
                let Some(converted) = self.convert_expr(expr) else {
                    continue;
                };
                let is_integer = converted.ty.is_scalar()
                    && converted.ty.component().is_some_and(ScalarKind::is_integer);
                match self.const_eval(&converted) {
                    Some(ConstValue::Int(n)) if is_integer => next = n,
                    _ => {
                        self.error(expr.line, "enum value must be a constant integer");
                        continue;
                    }
                }
            }

            let name = if decl.is_class {
                format!("{}::{}", decl.name, value.name)
            } else {
                value.name.clone()
            };
            self.declare(&name, Symbol::EnumValue(next), value.line);
            next = next.wrapping_add(1);
        }
    }

    // ---- statements ----

    fn convert_statement(&mut self, stmt: &ast::Stmt) -> Option<Stmt> {
        let line = stmt.line;
        let kind = match &stmt.kind {
            ast::StmtKind::Block(stmts) => {
                self.symbols.push_scope();
                let stmts = stmts
                    .iter()
                    .filter_map(|stmt| self.convert_statement(stmt))
                    .collect();
                self.symbols.pop_scope();
                StmtKind::Block {
                    stmts,
                    scoped: true,
                }
            }
            ast::StmtKind::VarDeclarations(decls) => {
                self.check_modifiers(&decls.modifiers, ModifierFlags::CONST, decls.line);
                let mut converted: Vec<Stmt> = self
                    .convert_var_declarations(decls, Storage::Local)
                    .into_iter()
                    .map(|decl| Stmt::new(StmtKind::VarDecl(decl), line))
                    .collect();
                if converted.len() == 1 {
                    return converted.pop();
                }
                StmtKind::Block {
                    stmts: converted,
                    scoped: false,
                }
            }
            ast::StmtKind::Expression(expr) => StmtKind::Expr(self.convert_expr(expr)?),
            ast::StmtKind::If {
                is_static,
                test,
                if_true,
                if_false,
            } => {
                let test = self.convert_condition(test);
                let if_true = self.convert_statement(if_true);
                let if_false = match if_false {
                    Some(stmt) => Some(self.convert_statement(stmt)?),
                    None => None,
                };
                StmtKind::If {
                    is_static: *is_static,
                    test: test?,
                    if_true: Box::new(if_true?),
                    if_false: if_false.map(Box::new),
                }
            }
            ast::StmtKind::For {
                init,
                test,
                next,
                body,
            } => {
                self.symbols.push_scope();
                let converted =
                    self.convert_for(init.as_deref(), test.as_ref(), next.as_ref(), body);
                self.symbols.pop_scope();
                converted?
            }
            ast::StmtKind::While { test, body } => {
                let test = self.convert_condition(test);
                let body = self.convert_loop_body(body);
                StmtKind::While {
                    test: test?,
                    body: Box::new(body?),
                }
            }
            ast::StmtKind::Do { body, test } => {
                let body = self.convert_loop_body(body);
                let test = self.convert_condition(test);
                StmtKind::Do {
                    body: Box::new(body?),
                    test: test?,
                }
            }
            ast::StmtKind::Switch {
                is_static,
                value,
                cases,
            } => {
                self.switch_level += 1;
                self.symbols.push_scope();
                let converted = self.convert_switch(*is_static, value, cases);
                self.symbols.pop_scope();
                self.switch_level -= 1;
                converted?
            }
            ast::StmtKind::Return(value) => self.convert_return(value.as_ref(), line)?,
            ast::StmtKind::Break => {
                if self.loop_level + self.switch_level == 0 {
                    self.error(line, "break statement must be inside a loop or switch");
                    return None;
                }
                StmtKind::Break
            }
            ast::StmtKind::Continue => {
                if self.loop_level == 0 {
                    self.error(line, "continue statement must be inside a loop");
                    return None;
                }
                StmtKind::Continue
            }
            ast::StmtKind::Discard => {
                if self.kind != ProgramKind::Fragment {
                    self.error(line, "discard statement is only permitted in fragment shaders");
                    return None;
                }
                StmtKind::Discard
            }
            ast::StmtKind::Empty => StmtKind::Nop,
        };
        Some(Stmt::new(kind, line))
    }

    fn convert_condition(&mut self, test: &ast::Expr) -> Option<ir::Expr> {
        let test = self.convert_expr(test)?;
        self.coerce(test, &BOOL)
    }

    fn convert_loop_body(&mut self, body: &ast::Stmt) -> Option<Stmt> {
        self.loop_level += 1;
        let body = self.convert_statement(body);
        self.loop_level -= 1;
        body
    }

    fn convert_for(
        &mut self,
        init: Option<&ast::Stmt>,
        test: Option<&ast::Expr>,
        next: Option<&ast::Expr>,
        body: &ast::Stmt,
    ) -> Option<StmtKind> {
        let init = match init {
            Some(init) => Some(Box::new(self.convert_statement(init)?)),
            None => None,
        };
        let test = match test {
            Some(test) => Some(self.convert_condition(test)?),
            None => None,
        };
        let next = match next {
            Some(next) => Some(self.convert_expr(next)?),
            None => None,
        };
        let body = self.convert_loop_body(body)?;
        Some(StmtKind::For {
            init,
            test,
            next,
            body: Box::new(body),
        })
    }

    fn convert_switch(
        &mut self,
        is_static: bool,
        value: &ast::Expr,
        cases: &[ast::SwitchCase],
    ) -> Option<StmtKind> {
        let value = self
            .convert_expr(value)
            .and_then(|value| self.coerce(value, &INT));

        let mut seen = HashSet::new();
        let mut converted = Vec::with_capacity(cases.len());
        let mut failed = false;
        for case in cases {
            let label = match &case.value {
                Some(expr) => match self.case_value(expr) {
                    Some(label) => {
                        if !seen.insert(label) {
                            self.error(case.line, "duplicate case value");
                            failed = true;
                        }
                        Some(label)
                    }
                    None => {
                        failed = true;
                        None
                    }
                },
                None => None,
            };
            let stmts = case
                .stmts
                .iter()
                .filter_map(|stmt| self.convert_statement(stmt))
                .collect();
            converted.push(SwitchCase {
                value: label,
                stmts,
                line: case.line,
            });
        }

        if failed {
            return None;
        }
        Some(StmtKind::Switch {
            is_static,
            value: value?,
            cases: converted,
        })
    }

    fn case_value(&mut self, expr: &ast::Expr) -> Option<i64> {
        let value = self.convert_expr(expr)?;
        let value = self.coerce(value, &INT)?;
        match self.const_eval(&value) {
            Some(ConstValue::Int(n)) => Some(n),
            _ => {
                self.error(expr.line, "case value must be a constant integer");
                None
            }
        }
    }

    fn convert_return(&mut self, value: Option<&ast::Expr>, line: usize) -> Option<StmtKind> {
        let return_type = match self.current_function {
            Some(id) => self.program.functions[id].return_type.clone(),
            None => Type::Void,
        };
        match value {
            Some(value) => {
                if return_type.is_void() {
                    self.error(line, "may not return a value from a void function");
                    return None;
                }
                let value = self.convert_expr(value)?;
                Some(StmtKind::Return(Some(self.coerce(value, &return_type)?)))
            }
            None => {
                if !return_type.is_void() {
                    self.error(
                        line,
                        format!("expected function to return '{}'", return_type),
                    );
                    return None;
                }
                Some(StmtKind::Return(None))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::caps::ShaderCapsFactory;
    use crate::lexer::tokenize;
    use crate::parser::parse;

    fn analyze_source(source: &str) -> (ir::Program, Diagnostics) {
        let (program, errors) = parse(tokenize(source));
        assert!(errors.is_empty(), "unexpected parse errors: {}", errors);
        analyze(&program, ProgramKind::Fragment, &ShaderCapsFactory::default_caps())
    }

    #[test]
    fn globals_and_functions_become_elements() {
        let (program, errors) =
            analyze_source("uniform half4 color; void main() { sk_FragColor = color; }");
        assert!(errors.is_empty(), "expected no errors, got: {}", errors);
        assert_eq!(program.elements.len(), 2);
        assert!(program.main().is_some());
        let color = program.find_global("color").expect("global declared");
        assert_eq!(program.variables[color].ty, Type::Vector(ScalarKind::Half, 4));
    }

    #[test]
    fn prototype_then_definition_share_a_declaration() {
        let (program, errors) = analyze_source("void f(); void f() {} void main() { f(); }");
        assert!(errors.is_empty(), "expected no errors, got: {}", errors);
        let prototypes = program
            .elements
            .iter()
            .filter(|element| matches!(element, Element::Prototype(_)))
            .count();
        assert_eq!(prototypes, 1);
        let f = program.find_function("f").expect("f declared");
        assert!(program.functions[f].defined);
    }

    #[test]
    fn enum_values_count_up_from_the_previous_value() {
        let (_, errors) = analyze_source(
            "enum E { a, b = 5, c }; void main() { switch (1) { case a: case b: case c: case 6: break; } }",
        );
        assert_eq!(errors.messages(), vec!["duplicate case value"]);
    }

    #[test]
    fn const_locals_are_usable_as_case_values() {
        let (_, errors) =
            analyze_source("void main() { const int x = 2; switch (1) { case x: break; } }");
        assert!(errors.is_empty(), "expected no errors, got: {}", errors);
    }

    #[test]
    fn anonymous_interface_block_fields_become_globals() {
        let (program, errors) =
            analyze_source("uniform block { float4 a; float b; }; void main() { float c = b; }");
        assert!(errors.is_empty(), "expected no errors, got: {}", errors);
        let a = program
            .variables
            .iter()
            .find(|(_, var)| var.name == "a")
            .map(|(_, var)| var.ty.clone());
        assert_eq!(a, Some(Type::Vector(ScalarKind::Float, 4)));
    }

    #[test]
    fn discard_outside_fragment_programs_is_rejected() {
        let (program, _) = parse(tokenize("void main() { discard; }"));
        let (_, errors) = analyze(
            &program,
            ProgramKind::Vertex,
            &ShaderCapsFactory::default_caps(),
        );
        assert_eq!(
            errors.messages(),
            vec!["discard statement is only permitted in fragment shaders"]
        );
    }
}
