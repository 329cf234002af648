//! GLSL back end for the `sksl` front end.
//!
//! A [`Compiler`] runs the front end, applies the rewriting passes the
//! target's [`ShaderCaps`] call for, and renders the result as GLSL source
//! text together with the [`ProgramInputs`] the host needs to bind.
//!
//! ```
//! use sksl::caps::ShaderCapsFactory;
//! use sksl::ProgramKind;
//! use sksl_glsl::Compiler;
//!
//! let compiler = Compiler::new(ShaderCapsFactory::default_caps());
//! let program = compiler
//!     .compile(ProgramKind::Fragment, "void main() { sk_FragColor = half4(1); }")
//!     .expect("valid program");
//! assert!(program.source.starts_with("#version 400\n"));
//! ```

#![warn(missing_docs)]

pub mod backend;
pub mod codegen;
pub mod optimize;

use sksl::caps::ShaderCaps;
use sksl::errors::Diagnostics;
use sksl::ir::Program;
use sksl::ProgramKind;
use thiserror::Error;

use backend::{Backend, GlslBackend};
use optimize::PassManager;

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Compiles source text for one target.
///
/// The compiler only holds the capability descriptor, so one instance can
/// serve any number of compilations, from several threads at once.
#[derive(Debug, Clone)]
pub struct Compiler {
    caps: ShaderCaps,
}

impl Compiler {
    /// Creates a compiler for the target described by `caps`.
    pub fn new(caps: ShaderCaps) -> Self {
        Self { caps }
    }

    /// The target this compiler generates code for.
    pub fn caps(&self) -> &ShaderCaps {
        &self.caps
    }

    /// Compiles `source` as a program of the given kind.
    pub fn compile(&self, kind: ProgramKind, source: &str) -> Result<GlslProgram, CompileError> {
        let program =
            sksl::compile_to_ir(source, kind, &self.caps).map_err(CompileError::Source)?;
        self.compile_program(&program)
    }

    /// Generates GLSL for a program that already passed analysis.
    pub fn compile_program(&self, program: &Program) -> Result<GlslProgram, CompileError> {
        generate(program, &self.caps)
    }
}

/// Rewrites a copy of `program` for `caps` and renders it.
pub fn generate(program: &Program, caps: &ShaderCaps) -> Result<GlslProgram, CompileError> {
    let mut program = program.clone();
    PassManager::for_target(program.kind, caps).run(&mut program)?;
    let output = GlslBackend::new(caps).generate(&program)?;
    log::debug!(
        "generated {} bytes of GLSL for a {} program",
        output.source.len(),
        program.kind
    );
    Ok(output)
}

/// Generated shader text and the reflected facts about it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlslProgram {
    /// Complete GLSL source, starting with the version line.
    pub source: String,
    /// Inputs the host has to provide.
    pub inputs: ProgramInputs,
}

/// Inputs a generated program expects from the host.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProgramInputs {
    /// The program reads `u_skRTHeight` to flip fragment coordinates.
    pub rt_height: bool,
    /// Uniform globals in declaration order.
    pub uniforms: Vec<Uniform>,
}

/// A reflected uniform declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Uniform {
    /// Name as it appears in the generated source.
    pub name: String,
    /// GLSL type name, with array sizes appended.
    pub ty: String,
}

/// Compilation errors
#[derive(Debug, Error)]
pub enum CompileError {
    /// The source has errors; carries the full diagnostic report.
    #[error("{0}")]
    Source(Diagnostics),
    /// A rewriting pass or the code generator found IR it cannot handle.
    #[error("invalid IR: {0}")]
    InvalidIr(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use sksl::caps::ShaderCapsFactory;

    #[test]
    fn source_errors_carry_the_report() {
        let compiler = Compiler::new(ShaderCapsFactory::default_caps());
        let err = compiler
            .compile(ProgramKind::Fragment, "void main() { x = 1; }")
            .expect_err("unknown identifier");
        assert_eq!(
            err.to_string(),
            "error: 1: unknown identifier 'x'\n1 error\n"
        );
        assert!(matches!(err, CompileError::Source(_)));
    }

    #[test]
    fn compiler_is_shareable_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Compiler>();
    }
}
