//! Front end for a GLSL-flavoured shading language.
//!
//! Source text goes through [`lexer::tokenize`], [`parser::parse`] and
//! [`analyzer::analyze`] to become a typed [`ir::Program`]. Every stage
//! appends to a [`errors::Diagnostics`] collector instead of failing fast, so
//! one run reports as many problems as it can find.
//!
//! ```
//! use sksl::caps::ShaderCapsFactory;
//! use sksl::ProgramKind;
//!
//! let caps = ShaderCapsFactory::default_caps();
//! let program = sksl::compile_to_ir("void main() {}", ProgramKind::Fragment, &caps)
//!     .expect("valid program");
//! assert!(program.main().is_some());
//! ```

pub mod analyzer;
pub mod caps;
pub mod errors;
pub mod ir;
pub mod lexer;
pub mod modifiers;
pub mod parser;
pub mod symbols;
pub mod types;

pub use ir::ProgramKind;

use caps::ShaderCaps;
use errors::Diagnostics;

/// Runs the whole front end. Parse errors stop the pipeline before
/// analysis; any diagnostic at all makes the result an error.
pub fn compile_to_ir(
    source: &str,
    kind: ProgramKind,
    caps: &ShaderCaps,
) -> Result<ir::Program, Diagnostics> {
    let tokens = lexer::tokenize(source);
    let (ast, diagnostics) = parser::parse(tokens);
    if !diagnostics.is_empty() {
        return Err(diagnostics);
    }
    let (program, diagnostics) = analyzer::analyze(&ast, kind, caps);
    if diagnostics.is_empty() {
        Ok(program)
    } else {
        Err(diagnostics)
    }
}
