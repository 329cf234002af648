//! GLSL spellings of types and their precision qualifiers.

use sksl::caps::ShaderCaps;
use sksl::types::{ScalarKind, Type};

/// The GLSL name of `ty`. Arrays render as their element type; the sizes
/// follow the declared name, see [`array_suffix`].
pub(crate) fn type_name(ty: &Type) -> String {
    match ty {
        Type::Void => "void".to_string(),
        Type::Scalar(scalar) => scalar_name(*scalar).to_string(),
        Type::Vector(scalar, n) => format!("{}vec{}", vector_prefix(*scalar), n),
        Type::Matrix(_, columns, rows) if columns == rows => format!("mat{}", columns),
        Type::Matrix(_, columns, rows) => format!("mat{}x{}", columns, rows),
        Type::Array(element, _) => type_name(element),
        Type::Struct(s) => s.name.clone(),
        Type::Sampler2D => "sampler2D".to_string(),
    }
}

/// `[2][3]` for `float[2][3]`, empty for non-arrays.
pub(crate) fn array_suffix(ty: &Type) -> String {
    let mut suffix = String::new();
    let mut current = ty;
    while let Type::Array(element, size) = current {
        match size {
            Some(size) => suffix.push_str(&format!("[{}]", size)),
            None => suffix.push_str("[]"),
        }
        current = element;
    }
    suffix
}

fn scalar_name(scalar: ScalarKind) -> &'static str {
    match scalar {
        ScalarKind::Float | ScalarKind::Half | ScalarKind::FloatLiteral => "float",
        ScalarKind::Int | ScalarKind::Short | ScalarKind::IntLiteral => "int",
        ScalarKind::UInt | ScalarKind::UShort => "uint",
        ScalarKind::Bool => "bool",
    }
}

fn vector_prefix(scalar: ScalarKind) -> &'static str {
    match scalar {
        ScalarKind::Float | ScalarKind::Half | ScalarKind::FloatLiteral => "",
        ScalarKind::Int | ScalarKind::Short | ScalarKind::IntLiteral => "i",
        ScalarKind::UInt | ScalarKind::UShort => "u",
        ScalarKind::Bool => "b",
    }
}

/// The precision qualifier, with a trailing space, that declarations of
/// `ty` carry on targets using precision modifiers.
pub(crate) fn precision(ty: &Type, caps: &ShaderCaps) -> &'static str {
    if !caps.uses_precision_modifiers {
        return "";
    }
    let scalar = match ty {
        Type::Array(element, _) => return precision(element, caps),
        Type::Scalar(s) | Type::Vector(s, _) | Type::Matrix(s, _, _) => *s,
        _ => return "",
    };
    match scalar {
        ScalarKind::Half => "mediump ",
        ScalarKind::Short | ScalarKind::UShort if caps.incomplete_short_int_precision => "highp ",
        ScalarKind::Short | ScalarKind::UShort => "mediump ",
        ScalarKind::Bool => "",
        _ => "highp ",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sksl::caps::ShaderCapsFactory;

    #[test]
    fn half_and_short_families_share_glsl_names() {
        assert_eq!(type_name(&Type::Vector(ScalarKind::Half, 4)), "vec4");
        assert_eq!(type_name(&Type::Vector(ScalarKind::Short, 2)), "ivec2");
        assert_eq!(type_name(&Type::Vector(ScalarKind::UShort, 3)), "uvec3");
        assert_eq!(type_name(&Type::Matrix(ScalarKind::Half, 3, 3)), "mat3");
        assert_eq!(type_name(&Type::Matrix(ScalarKind::Float, 2, 4)), "mat2x4");
    }

    #[test]
    fn array_sizes_render_outermost_first() {
        let ty = Type::Array(
            Box::new(Type::Array(Box::new(Type::Scalar(ScalarKind::Float)), Some(3))),
            Some(2),
        );
        assert_eq!(type_name(&ty), "float");
        assert_eq!(array_suffix(&ty), "[2][3]");
        assert_eq!(
            array_suffix(&Type::Array(Box::new(Type::Sampler2D), None)),
            "[]"
        );
    }

    #[test]
    fn short_precision_depends_on_the_target() {
        let short = Type::Scalar(ScalarKind::Short);
        assert_eq!(precision(&short, &ShaderCapsFactory::default_caps()), "");
        assert_eq!(
            precision(&short, &ShaderCapsFactory::uses_precision_modifiers()),
            "mediump "
        );
        assert_eq!(
            precision(&short, &ShaderCapsFactory::incomplete_short_int_precision()),
            "highp "
        );
        assert_eq!(
            precision(&Type::Sampler2D, &ShaderCapsFactory::uses_precision_modifiers()),
            ""
        );
    }
}
