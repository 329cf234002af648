//! Code generation backends
//!
//! A backend turns a fully rewritten program into target text. GLSL is the
//! only target; the trait is the seam where others would plug in.

use sksl::caps::ShaderCaps;
use sksl::ir::Program;

use crate::codegen::GlslWriter;
use crate::{CompileError, GlslProgram};

/// Code generation backend trait
pub trait Backend {
    /// Render `program` as target source.
    fn generate(&self, program: &Program) -> Result<GlslProgram, CompileError>;

    /// Get backend name
    fn name(&self) -> &'static str;
}

/// Renders GLSL for the target described by a [`ShaderCaps`].
pub struct GlslBackend<'a> {
    caps: &'a ShaderCaps,
}

impl<'a> GlslBackend<'a> {
    /// Create a backend for `caps`.
    pub fn new(caps: &'a ShaderCaps) -> Self {
        Self { caps }
    }
}

impl Backend for GlslBackend<'_> {
    fn generate(&self, program: &Program) -> Result<GlslProgram, CompileError> {
        log::trace!("{}: rendering {} elements", self.name(), program.elements.len());
        GlslWriter::new(program, self.caps).write_program()
    }

    fn name(&self) -> &'static str {
        "glsl"
    }
}
