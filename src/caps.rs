//! Target capability descriptor.
//!
//! A [`ShaderCaps`] value describes one GLSL target: the version header, which
//! optional features are native, behind an extension or missing, and which
//! workarounds the generated code needs. It is immutable once built and is
//! shared by reference between concurrent compilations.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// How `dFdx`, `dFdy` and `fwidth` are made available.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum DerivativeSupport {
    Native,
    Extension(String),
    Unsupported,
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum GeometryShaderSupport {
    Native,
    Extension(String),
}

/// How the `invocations` layout qualifier of geometry shaders is honoured.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum InvocationSupport {
    Native,
    Extension(String),
    /// The shader body is wrapped in a loop over the invocation count.
    Emulated,
}

/// How `sk_FragCoord` is produced in fragment programs.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum FragCoordStrategy {
    /// `layout(origin_upper_left)` is understood by the compiler.
    NativeNew,
    /// `layout(origin_upper_left)` needs the named extension.
    NativeOld(String),
    /// The vertex stage forwards its position in a varying.
    Workaround,
    /// The y coordinate is flipped with a render-target height uniform.
    HeightUniform,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ShaderCaps {
    pub version_decl: String,
    pub generation: u32,
    pub derivatives: DerivativeSupport,
    pub geometry_shaders: GeometryShaderSupport,
    pub gs_invocations: InvocationSupport,
    pub frag_coord: FragCoordStrategy,
    pub uses_precision_modifiers: bool,
    pub incomplete_short_int_precision: bool,
    pub rewrite_do_while_loops: bool,
    /// Render target origin is bottom-left; flip y-dependent builtins.
    pub flip_y: bool,
    pub integer_support: bool,
    pub flat_interpolation_support: bool,
    pub noperspective_interpolation_support: bool,
    pub external_texture_support: bool,
    pub fb_fetch_support: bool,
    pub can_use_any_function_in_shader: bool,
    pub float_is_32_bits: bool,
    pub builtin_fma_support: bool,
    pub builtin_determinant_support: bool,
    pub must_do_op_between_floor_and_abs: bool,
    pub must_declare_fragment_shader_output: bool,
}

impl Default for ShaderCaps {
    fn default() -> Self {
        Self {
            version_decl: "#version 400".to_string(),
            generation: 400,
            derivatives: DerivativeSupport::Native,
            geometry_shaders: GeometryShaderSupport::Native,
            gs_invocations: InvocationSupport::Native,
            frag_coord: FragCoordStrategy::HeightUniform,
            uses_precision_modifiers: false,
            incomplete_short_int_precision: false,
            rewrite_do_while_loops: false,
            flip_y: false,
            integer_support: true,
            flat_interpolation_support: true,
            noperspective_interpolation_support: true,
            external_texture_support: false,
            fb_fetch_support: false,
            can_use_any_function_in_shader: true,
            float_is_32_bits: true,
            builtin_fma_support: true,
            builtin_determinant_support: true,
            must_do_op_between_floor_and_abs: false,
            must_declare_fragment_shader_output: false,
        }
    }
}

impl ShaderCaps {
    /// Looks up a feature flag by the name used in `sk_Caps.<name>`.
    pub fn flag(&self, name: &str) -> Option<bool> {
        let value = match name {
            "integerSupport" => self.integer_support,
            "flatInterpolationSupport" => self.flat_interpolation_support,
            "noperspectiveInterpolationSupport" => self.noperspective_interpolation_support,
            "externalTextureSupport" => self.external_texture_support,
            "fbFetchSupport" => self.fb_fetch_support,
            "canUseAnyFunctionInShader" => self.can_use_any_function_in_shader,
            "floatIs32Bits" => self.float_is_32_bits,
            "builtinFMASupport" => self.builtin_fma_support,
            "builtinDeterminantSupport" => self.builtin_determinant_support,
            "mustDoOpBetweenFloorAndAbs" => self.must_do_op_between_floor_and_abs,
            "mustDeclareFragmentShaderOutput" => self.must_declare_fragment_shader_output,
            _ => return None,
        };
        Some(value)
    }

    pub fn with_version(mut self, decl: &str, generation: u32) -> Self {
        self.version_decl = decl.to_string();
        self.generation = generation;
        self
    }

    pub fn with_flip_y(mut self, flip_y: bool) -> Self {
        self.flip_y = flip_y;
        self
    }

    pub fn with_derivatives(mut self, derivatives: DerivativeSupport) -> Self {
        self.derivatives = derivatives;
        self
    }

    pub fn with_frag_coord(mut self, strategy: FragCoordStrategy) -> Self {
        self.frag_coord = strategy;
        self
    }

    pub fn with_gs_invocations(mut self, support: InvocationSupport) -> Self {
        self.gs_invocations = support;
        self
    }

    pub fn with_precision_modifiers(mut self, enabled: bool) -> Self {
        self.uses_precision_modifiers = enabled;
        self
    }

    /// GLSL 1.30 renamed `attribute`/`varying` to `in`/`out` and introduced
    /// user-declared fragment outputs.
    pub fn supports_in_out(&self) -> bool {
        self.generation >= 130
    }
}

/// Named descriptor presets covering the targets the GLSL back end
/// distinguishes.
pub struct ShaderCapsFactory;

impl ShaderCapsFactory {
    pub fn default_caps() -> ShaderCaps {
        ShaderCaps::default()
    }

    pub fn version_110() -> ShaderCaps {
        ShaderCaps::default().with_version("#version 110", 110)
    }

    pub fn shader_derivative_extension_string() -> ShaderCaps {
        ShaderCaps {
            derivatives: DerivativeSupport::Extension("GL_OES_standard_derivatives".to_string()),
            uses_precision_modifiers: true,
            ..ShaderCaps::default()
        }
    }

    pub fn frag_coords_old() -> ShaderCaps {
        ShaderCaps::default()
            .with_version("#version 110", 110)
            .with_frag_coord(FragCoordStrategy::NativeOld(
                "GL_ARB_fragment_coord_conventions".to_string(),
            ))
    }

    pub fn frag_coords_new() -> ShaderCaps {
        ShaderCaps::default().with_frag_coord(FragCoordStrategy::NativeNew)
    }

    pub fn cannot_use_frag_coord() -> ShaderCaps {
        ShaderCaps::default().with_frag_coord(FragCoordStrategy::Workaround)
    }

    pub fn geometry_shader_support() -> ShaderCaps {
        ShaderCaps::default()
    }

    pub fn no_gs_invocations_support() -> ShaderCaps {
        ShaderCaps::default().with_gs_invocations(InvocationSupport::Emulated)
    }

    pub fn geometry_shader_extension_string() -> ShaderCaps {
        ShaderCaps {
            geometry_shaders: GeometryShaderSupport::Extension(
                "GL_EXT_geometry_shader".to_string(),
            ),
            ..ShaderCaps::default().with_version("#version 310es", 310)
        }
    }

    pub fn gs_invocations_extension_string() -> ShaderCaps {
        ShaderCaps::default().with_gs_invocations(InvocationSupport::Extension(
            "GL_ARB_gpu_shader5".to_string(),
        ))
    }

    pub fn uses_precision_modifiers() -> ShaderCaps {
        ShaderCaps::default().with_precision_modifiers(true)
    }

    pub fn incomplete_short_int_precision() -> ShaderCaps {
        ShaderCaps {
            incomplete_short_int_precision: true,
            ..ShaderCaps::default()
                .with_version("#version 310es", 310)
                .with_precision_modifiers(true)
        }
    }

    pub fn rewrite_do_while_loops() -> ShaderCaps {
        ShaderCaps {
            rewrite_do_while_loops: true,
            ..ShaderCaps::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_resolve_by_sksl_name() {
        let caps = ShaderCaps::default();
        assert_eq!(caps.flag("integerSupport"), Some(true));
        assert_eq!(caps.flag("fbFetchSupport"), Some(false));
        assert_eq!(caps.flag("nonsense"), None);
    }

    #[test]
    fn presets_adjust_only_their_concern() {
        let caps = ShaderCapsFactory::frag_coords_old();
        assert_eq!(caps.version_decl, "#version 110");
        assert!(!caps.supports_in_out());
        assert_eq!(
            ShaderCapsFactory::no_gs_invocations_support().gs_invocations,
            InvocationSupport::Emulated
        );
    }
}
