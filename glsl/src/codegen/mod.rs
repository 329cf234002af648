//! GLSL text generation
//!
//! The writer renders program elements into a body buffer first. While it
//! does, builtin references register the extensions, globals and
//! per-function header lines they need; those are assembled in front of the
//! body once every element has been written.

mod expr;
pub(crate) mod types;

use sksl::caps::{FragCoordStrategy, GeometryShaderSupport, InvocationSupport, ShaderCaps};
use sksl::ir::{Element, FnId, FunctionDef, InterfaceBlock, Program, Stmt, StmtKind, VarDecl};
use sksl::modifiers::{ModifierFlags, Modifiers};
use sksl::types::{ScalarKind, StructType, Type};
use sksl::ProgramKind;

use crate::{CompileError, GlslProgram, ProgramInputs, Uniform};
pub use expr::Precedence;
use types::{array_suffix, precision, type_name};

const INDENT: &str = "    ";

/// Renders one program for one target.
pub struct GlslWriter<'a> {
    program: &'a Program,
    caps: &'a ShaderCaps,
    out: String,
    indent: usize,
    at_line_start: bool,
    extensions: Vec<String>,
    globals: String,
    /// Lines inserted at the top of the function being written.
    function_header: String,
    frag_coord_global_written: bool,
    frag_coord_local_written: bool,
    uses_frag_color: bool,
    inputs: ProgramInputs,
}

impl<'a> GlslWriter<'a> {
    /// Create a writer for `program` on the target described by `caps`.
    pub fn new(program: &'a Program, caps: &'a ShaderCaps) -> Self {
        Self {
            program,
            caps,
            out: String::new(),
            indent: 0,
            at_line_start: true,
            extensions: Vec::new(),
            globals: String::new(),
            function_header: String::new(),
            frag_coord_global_written: false,
            frag_coord_local_written: false,
            uses_frag_color: false,
            inputs: ProgramInputs::default(),
        }
    }

    /// Render the whole program.
    pub fn write_program(mut self) -> Result<GlslProgram, CompileError> {
        let program = self.program;
        for element in &program.elements {
            self.write_element(element)?;
        }
        let body = std::mem::take(&mut self.out);

        let caps = self.caps;
        let mut source = String::new();
        source.push_str(&caps.version_decl);
        source.push('\n');
        if program.kind == ProgramKind::Geometry {
            if let GeometryShaderSupport::Extension(extension) = &caps.geometry_shaders {
                source.push_str(&extension_line(extension));
            }
            if let InvocationSupport::Extension(extension) = &caps.gs_invocations {
                if declares_invocations(program) {
                    source.push_str(&extension_line(extension));
                }
            }
        }
        for extension in &self.extensions {
            source.push_str(&extension_line(extension));
        }
        source.push_str(&self.globals);
        if caps.frag_coord == FragCoordStrategy::Workaround {
            let storage = match program.kind {
                ProgramKind::Vertex => Some("out"),
                ProgramKind::Fragment => Some("in"),
                ProgramKind::Geometry => None,
            };
            if let Some(storage) = storage {
                source.push_str(&format!(
                    "{} {}vec4 sk_FragCoord_Workaround;\n",
                    storage,
                    self.highp()
                ));
            }
        }
        if caps.uses_precision_modifiers {
            source.push_str("precision mediump float;\n");
            source.push_str("precision mediump sampler2D;\n");
        }
        if program.kind == ProgramKind::Fragment && self.uses_frag_color && caps.supports_in_out()
        {
            let half4 = Type::Vector(ScalarKind::Half, 4);
            source.push_str(&format!(
                "out {}vec4 sk_FragColor;\n",
                precision(&half4, caps)
            ));
        }
        source.push_str(&body);

        Ok(GlslProgram {
            source,
            inputs: self.inputs,
        })
    }

    // ---- output primitives ----

    fn write(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        if self.at_line_start {
            for _ in 0..self.indent {
                self.out.push_str(INDENT);
            }
            self.at_line_start = false;
        }
        self.out.push_str(text);
    }

    fn newline(&mut self) {
        self.out.push('\n');
        self.at_line_start = true;
    }

    fn write_line(&mut self, text: &str) {
        self.write(text);
        self.newline();
    }

    fn add_extension(&mut self, extension: &str) {
        if !self.extensions.iter().any(|e| e == extension) {
            self.extensions.push(extension.to_string());
        }
    }

    fn highp(&self) -> &'static str {
        if self.caps.uses_precision_modifiers {
            "highp "
        } else {
            ""
        }
    }

    // ---- declarations ----

    fn write_element(&mut self, element: &Element) -> Result<(), CompileError> {
        match element {
            Element::GlobalVar(decl) => {
                self.reflect_uniform(decl);
                self.write_var_decl(decl, true)?;
                self.newline();
            }
            Element::InterfaceBlock(block) => self.write_interface_block(block),
            Element::Struct(ty) => self.write_struct(ty),
            Element::Modifiers { modifiers, .. } => {
                self.write_modifiers(modifiers, true);
                self.write_line(";");
            }
            Element::Function(def) => self.write_function(def)?,
            Element::Prototype(function) => {
                self.write_signature(*function);
                self.write_line(";");
            }
        }
        Ok(())
    }

    fn reflect_uniform(&mut self, decl: &VarDecl) {
        let var = &self.program.variables[decl.var];
        if var.modifiers.contains(ModifierFlags::UNIFORM) {
            self.inputs.uniforms.push(Uniform {
                name: var.name.clone(),
                ty: format!("{}{}", type_name(&var.ty), array_suffix(&var.ty)),
            });
        }
    }

    fn write_modifiers(&mut self, modifiers: &Modifiers, global: bool) {
        let flags = modifiers.flags;
        if flags.contains(ModifierFlags::FLAT) {
            self.write("flat ");
        }
        if flags.contains(ModifierFlags::NOPERSPECTIVE) {
            self.write("noperspective ");
        }
        let layout = modifiers.layout.to_string();
        if !layout.is_empty() {
            self.write(&layout);
            self.write(" ");
        }
        for (flag, name) in [
            (ModifierFlags::READONLY, "readonly "),
            (ModifierFlags::WRITEONLY, "writeonly "),
            (ModifierFlags::COHERENT, "coherent "),
            (ModifierFlags::VOLATILE, "volatile "),
            (ModifierFlags::RESTRICT, "restrict "),
        ] {
            if flags.contains(flag) {
                self.write(name);
            }
        }

        let legacy = global && !self.caps.supports_in_out();
        if flags.contains(ModifierFlags::IN | ModifierFlags::OUT) {
            self.write("inout ");
        } else if flags.contains(ModifierFlags::IN) {
            if legacy {
                let qualifier = match self.program.kind {
                    ProgramKind::Vertex => "attribute ",
                    _ => "varying ",
                };
                self.write(qualifier);
            } else {
                self.write("in ");
            }
        } else if flags.contains(ModifierFlags::OUT) {
            self.write(if legacy { "varying " } else { "out " });
        }

        for (flag, name) in [
            (ModifierFlags::UNIFORM, "uniform "),
            (ModifierFlags::BUFFER, "buffer "),
            (ModifierFlags::CONST, "const "),
        ] {
            if flags.contains(flag) {
                self.write(name);
            }
        }
    }

    /// `highp vec2 name[2]`, without modifiers.
    fn write_typed_name(&mut self, ty: &Type, name: &str) {
        self.write(precision(ty, self.caps));
        self.write(&type_name(ty));
        self.write(" ");
        self.write(name);
        self.write(&array_suffix(ty));
    }

    fn write_var_decl(&mut self, decl: &VarDecl, global: bool) -> Result<(), CompileError> {
        let program = self.program;
        let var = &program.variables[decl.var];
        self.write_modifiers(&var.modifiers, global);
        self.write_typed_name(&var.ty, &var.name);
        if let Some(init) = &decl.init {
            self.write(" = ");
            self.write_expr(init, Precedence::TOP_LEVEL)?;
        }
        self.write(";");
        Ok(())
    }

    fn write_struct(&mut self, ty: &StructType) {
        self.write("struct ");
        self.write(&ty.name);
        self.write_line(" {");
        self.write_fields(ty);
        self.write_line("};");
    }

    fn write_fields(&mut self, ty: &StructType) {
        self.indent += 1;
        for field in &ty.fields {
            self.write_modifiers(&field.modifiers, false);
            self.write_typed_name(&field.ty, &field.name);
            self.write_line(";");
        }
        self.indent -= 1;
    }

    fn write_interface_block(&mut self, block: &InterfaceBlock) {
        self.write_modifiers(&block.modifiers, true);
        self.write(&block.ty.name);
        self.write_line(" {");
        self.write_fields(&block.ty);
        self.write("}");
        if let Some(instance) = block.instance {
            let program = self.program;
            let var = &program.variables[instance];
            self.write(" ");
            self.write(&var.name);
            self.write(&array_suffix(&var.ty));
        }
        self.write_line(";");
    }

    fn write_signature(&mut self, function: FnId) {
        let program = self.program;
        let decl = &program.functions[function];
        self.write(precision(&decl.return_type, self.caps));
        self.write(&type_name(&decl.return_type));
        self.write(" ");
        self.write(&decl.name);
        self.write("(");
        for (i, param) in decl.params.iter().enumerate() {
            if i > 0 {
                self.write(", ");
            }
            let var = &program.variables[*param];
            self.write_modifiers(&var.modifiers, false);
            self.write_typed_name(&var.ty, &var.name);
        }
        self.write(")");
    }

    fn write_function(&mut self, def: &FunctionDef) -> Result<(), CompileError> {
        self.write_signature(def.decl);
        self.write_line(" {");
        self.function_header.clear();
        self.frag_coord_local_written = false;
        let body_start = self.out.len();

        self.indent += 1;
        match &def.body.kind {
            StmtKind::Block { stmts, .. } => {
                for stmt in stmts {
                    self.write_stmt_line(stmt)?;
                }
            }
            _ => self.write_stmt_line(&def.body)?,
        }
        self.indent -= 1;

        let header = std::mem::take(&mut self.function_header);
        self.out.insert_str(body_start, &header);
        self.write_line("}");
        Ok(())
    }

    // ---- statements ----

    /// Writes `stmt` followed by a line break. Unscoped blocks are flattened
    /// into their parent and no-ops are dropped.
    fn write_stmt_line(&mut self, stmt: &Stmt) -> Result<(), CompileError> {
        match &stmt.kind {
            StmtKind::Nop => {}
            StmtKind::Block {
                stmts,
                scoped: false,
            } => {
                for stmt in stmts {
                    self.write_stmt_line(stmt)?;
                }
            }
            _ => {
                self.write_stmt(stmt)?;
                self.newline();
            }
        }
        Ok(())
    }

    fn write_stmt(&mut self, stmt: &Stmt) -> Result<(), CompileError> {
        match &stmt.kind {
            StmtKind::Block { stmts, .. } => {
                self.write_line("{");
                self.indent += 1;
                for stmt in stmts {
                    self.write_stmt_line(stmt)?;
                }
                self.indent -= 1;
                self.write("}");
            }
            StmtKind::Expr(expr) => {
                self.write_expr(expr, Precedence::TOP_LEVEL)?;
                self.write(";");
            }
            StmtKind::VarDecl(decl) => self.write_var_decl(decl, false)?,
            StmtKind::If {
                test,
                if_true,
                if_false,
                ..
            } => {
                self.write("if (");
                self.write_expr(test, Precedence::TOP_LEVEL)?;
                self.write(") ");
                self.write_stmt(if_true)?;
                if let Some(if_false) = if_false {
                    self.write(" else ");
                    self.write_stmt(if_false)?;
                }
            }
            StmtKind::For {
                init,
                test,
                next,
                body,
            } => {
                self.write("for (");
                match init.as_deref() {
                    Some(init) if !init.is_nop() => self.write_for_init(init)?,
                    _ => self.write("; "),
                }
                if let Some(test) = test {
                    self.write_expr(test, Precedence::TOP_LEVEL)?;
                }
                self.write("; ");
                if let Some(next) = next {
                    self.write_expr(next, Precedence::TOP_LEVEL)?;
                }
                self.write(") ");
                self.write_stmt(body)?;
            }
            StmtKind::While { test, body } => {
                self.write("while (");
                self.write_expr(test, Precedence::TOP_LEVEL)?;
                self.write(") ");
                self.write_stmt(body)?;
            }
            StmtKind::Do { body, test } => {
                self.write("do ");
                self.write_stmt(body)?;
                self.write(" while (");
                self.write_expr(test, Precedence::TOP_LEVEL)?;
                self.write(");");
            }
            StmtKind::Switch { value, cases, .. } => {
                self.write("switch (");
                self.write_expr(value, Precedence::TOP_LEVEL)?;
                self.write_line(") {");
                self.indent += 1;
                for case in cases {
                    match case.value {
                        Some(value) => self.write_line(&format!("case {}:", value)),
                        None => self.write_line("default:"),
                    }
                    self.indent += 1;
                    for stmt in &case.stmts {
                        self.write_stmt_line(stmt)?;
                    }
                    self.indent -= 1;
                }
                self.indent -= 1;
                self.write("}");
            }
            StmtKind::Return(value) => {
                self.write("return");
                if let Some(value) = value {
                    self.write(" ");
                    self.write_expr(value, Precedence::TOP_LEVEL)?;
                }
                self.write(";");
            }
            StmtKind::Break => self.write("break;"),
            StmtKind::Continue => self.write("continue;"),
            StmtKind::Discard => self.write("discard;"),
            StmtKind::Nop => self.write(";"),
        }
        Ok(())
    }

    /// A `for` initializer declaring several variables renders as one
    /// declaration: `int i = 0, j = 1;`.
    fn write_for_init(&mut self, init: &Stmt) -> Result<(), CompileError> {
        let StmtKind::Block { stmts, .. } = &init.kind else {
            return self.write_stmt(init);
        };
        let mut decls = stmts.iter().map(|stmt| match &stmt.kind {
            StmtKind::VarDecl(decl) => Ok(decl),
            _ => Err(CompileError::InvalidIr(
                "for-loop initializer block holds a non-declaration".to_string(),
            )),
        });
        let Some(first) = decls.next().transpose()? else {
            self.write("; ");
            return Ok(());
        };
        self.write_var_decl(first, false)?;
        let program = self.program;
        for decl in decls {
            let decl = decl?;
            // Replace the terminating `;` with a separator.
            self.out.pop();
            let var = &program.variables[decl.var];
            self.write(", ");
            self.write(&var.name);
            self.write(&array_suffix(&var.ty));
            if let Some(init) = &decl.init {
                self.write(" = ");
                self.write_expr(init, Precedence::Sequence)?;
            }
            self.write(";");
        }
        Ok(())
    }
}

fn extension_line(extension: &str) -> String {
    format!("#extension {} : require\n", extension)
}

fn declares_invocations(program: &Program) -> bool {
    program.elements.iter().any(|element| {
        matches!(
            element,
            Element::Modifiers { modifiers, .. } if modifiers.layout.invocations.is_some()
        )
    })
}
