//! IR rewriting passes
//!
//! Passes adapt an analyzed program to what the target can express before
//! code generation. Which passes run depends on the program kind and on the
//! target's capabilities; see [`PassManager::for_target`].

mod do_while;
mod invocations;
mod rt_adjust;

use sksl::caps::{InvocationSupport, ShaderCaps};
use sksl::ir::Program;
use sksl::ProgramKind;

use crate::CompileError;

pub use do_while::RewriteDoWhile;
pub use invocations::EmulateInvocations;
pub use rt_adjust::NormalizePosition;

/// Rewriting pass trait
pub trait Pass {
    /// Run the pass on a program
    fn run(&self, program: &mut Program) -> Result<(), CompileError>;

    /// Get pass name
    fn name(&self) -> &'static str;
}

/// Pass manager - runs passes in order
pub struct PassManager {
    passes: Vec<Box<dyn Pass>>,
}

impl PassManager {
    /// Create an empty pass manager
    pub fn new() -> Self {
        Self { passes: Vec::new() }
    }

    /// The passes a program of `kind` needs on the target described by
    /// `caps`, in the order they have to run.
    pub fn for_target(kind: ProgramKind, caps: &ShaderCaps) -> Self {
        let mut manager = Self::new();
        if matches!(kind, ProgramKind::Vertex | ProgramKind::Geometry) {
            manager.add_pass(Box::new(NormalizePosition));
        }
        if kind == ProgramKind::Geometry && caps.gs_invocations == InvocationSupport::Emulated {
            manager.add_pass(Box::new(EmulateInvocations));
        }
        if caps.rewrite_do_while_loops {
            manager.add_pass(Box::new(RewriteDoWhile));
        }
        manager
    }

    /// Add a pass
    pub fn add_pass(&mut self, pass: Box<dyn Pass>) {
        self.passes.push(pass);
    }

    /// Run all passes on a program
    pub fn run(&self, program: &mut Program) -> Result<(), CompileError> {
        for pass in &self.passes {
            log::trace!("running pass {}", pass.name());
            pass.run(program)?;
        }
        Ok(())
    }

    /// Names of the scheduled passes, in order.
    pub fn pass_names(&self) -> Vec<&'static str> {
        self.passes.iter().map(|pass| pass.name()).collect()
    }
}

impl Default for PassManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sksl::caps::ShaderCapsFactory;

    #[test]
    fn fragment_programs_need_no_rewriting_by_default() {
        let caps = ShaderCapsFactory::default_caps();
        let manager = PassManager::for_target(ProgramKind::Fragment, &caps);
        assert!(manager.pass_names().is_empty());
    }

    #[test]
    fn passes_follow_the_target() {
        let manager = PassManager::for_target(
            ProgramKind::Geometry,
            &ShaderCapsFactory::no_gs_invocations_support(),
        );
        assert_eq!(manager.pass_names(), ["normalize-position", "emulate-invocations"]);

        let manager = PassManager::for_target(
            ProgramKind::Fragment,
            &ShaderCapsFactory::rewrite_do_while_loops(),
        );
        assert_eq!(manager.pass_names(), ["rewrite-do-while"]);
    }
}
