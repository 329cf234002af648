use std::fmt;
use std::sync::Arc;

use crate::modifiers::Modifiers;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarKind {
    Float,
    Half,
    Int,
    Short,
    UInt,
    UShort,
    Bool,
    /// Type of an integer literal before it meets a concrete type.
    IntLiteral,
    /// Type of a float literal before it meets a concrete type.
    FloatLiteral,
}

impl ScalarKind {
    pub fn name(self) -> &'static str {
        match self {
            ScalarKind::Float | ScalarKind::FloatLiteral => "float",
            ScalarKind::Half => "half",
            ScalarKind::Int | ScalarKind::IntLiteral => "int",
            ScalarKind::Short => "short",
            ScalarKind::UInt => "uint",
            ScalarKind::UShort => "ushort",
            ScalarKind::Bool => "bool",
        }
    }

    /// Position in the conversion lattice; conversions only go upward.
    pub fn priority(self) -> Option<u32> {
        match self {
            ScalarKind::IntLiteral => Some(1),
            ScalarKind::FloatLiteral => Some(3),
            ScalarKind::UShort => Some(3),
            ScalarKind::Short => Some(4),
            ScalarKind::UInt => Some(6),
            ScalarKind::Int => Some(7),
            ScalarKind::Half => Some(9),
            ScalarKind::Float => Some(10),
            ScalarKind::Bool => None,
        }
    }

    pub fn is_float(self) -> bool {
        matches!(
            self,
            ScalarKind::Float | ScalarKind::Half | ScalarKind::FloatLiteral
        )
    }

    pub fn is_integer(self) -> bool {
        matches!(
            self,
            ScalarKind::Int
                | ScalarKind::Short
                | ScalarKind::UInt
                | ScalarKind::UShort
                | ScalarKind::IntLiteral
        )
    }

    pub fn is_unsigned(self) -> bool {
        matches!(self, ScalarKind::UInt | ScalarKind::UShort)
    }

    pub fn is_number(self) -> bool {
        self.is_float() || self.is_integer()
    }

    pub fn is_literal(self) -> bool {
        matches!(self, ScalarKind::IntLiteral | ScalarKind::FloatLiteral)
    }

    pub fn coercion_cost(self, to: ScalarKind) -> Option<u32> {
        if self == to {
            return Some(0);
        }
        let (from_priority, to_priority) = (self.priority()?, to.priority()?);
        if self.is_float() && to.is_integer() {
            return None;
        }
        (to_priority > from_priority).then(|| to_priority - from_priority)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub modifiers: Modifiers,
    pub name: String,
    pub ty: Type,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StructType {
    pub name: String,
    pub fields: Vec<Field>,
    pub is_interface_block: bool,
}

impl StructType {
    pub fn field_index(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|field| field.name == name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Type {
    Void,
    Scalar(ScalarKind),
    Vector(ScalarKind, u8),
    /// Component type, columns, rows.
    Matrix(ScalarKind, u8, u8),
    /// `None` is a runtime-sized array.
    Array(Box<Type>, Option<u32>),
    Struct(Arc<StructType>),
    Sampler2D,
}

pub const FLOAT: Type = Type::Scalar(ScalarKind::Float);
pub const HALF: Type = Type::Scalar(ScalarKind::Half);
pub const INT: Type = Type::Scalar(ScalarKind::Int);
pub const BOOL: Type = Type::Scalar(ScalarKind::Bool);
pub const INT_LITERAL: Type = Type::Scalar(ScalarKind::IntLiteral);
pub const FLOAT_LITERAL: Type = Type::Scalar(ScalarKind::FloatLiteral);

impl Type {
    /// Resolves the name of a built-in type (`float3`, `half2x4`, ...).
    pub fn from_name(name: &str) -> Option<Type> {
        match name {
            "void" => return Some(Type::Void),
            "sampler2D" => return Some(Type::Sampler2D),
            _ => {}
        }

        let prefixes = [
            ("float", ScalarKind::Float),
            ("half", ScalarKind::Half),
            ("int", ScalarKind::Int),
            ("short", ScalarKind::Short),
            ("uint", ScalarKind::UInt),
            ("ushort", ScalarKind::UShort),
            ("bool", ScalarKind::Bool),
        ];
        // `uint` must not be read as `u` + `int`, so match the longest prefix.
        let (prefix, scalar) = prefixes
            .iter()
            .filter(|(prefix, _)| name.starts_with(prefix))
            .max_by_key(|(prefix, _)| prefix.len())?;
        let rest = &name[prefix.len()..];
        let digit = |c: u8| (b'2'..=b'4').contains(&c).then(|| c - b'0');
        match rest.as_bytes() {
            [] => Some(Type::Scalar(*scalar)),
            [n] => Some(Type::Vector(*scalar, digit(*n)?)),
            [c, b'x', r] if scalar.is_float() => {
                Some(Type::Matrix(*scalar, digit(*c)?, digit(*r)?))
            }
            _ => None,
        }
    }

    /// Builds a scalar, vector or matrix of the given shape. `rows == 1` is a
    /// vector (or scalar when there is also one column).
    pub fn compound(scalar: ScalarKind, columns: u8, rows: u8) -> Type {
        match (columns, rows) {
            (1, 1) => Type::Scalar(scalar),
            (n, 1) => Type::Vector(scalar, n),
            (c, r) => Type::Matrix(scalar, c, r),
        }
    }

    pub fn component(&self) -> Option<ScalarKind> {
        match self {
            Type::Scalar(s) | Type::Vector(s, _) | Type::Matrix(s, _, _) => Some(*s),
            _ => None,
        }
    }

    /// Vectors have one column per component; scalars have one.
    pub fn columns(&self) -> u8 {
        match self {
            Type::Vector(_, n) => *n,
            Type::Matrix(_, c, _) => *c,
            _ => 1,
        }
    }

    pub fn rows(&self) -> u8 {
        match self {
            Type::Matrix(_, _, r) => *r,
            _ => 1,
        }
    }

    pub fn slot_count(&self) -> u32 {
        u32::from(self.columns()) * u32::from(self.rows())
    }

    pub fn is_scalar(&self) -> bool {
        matches!(self, Type::Scalar(_))
    }

    pub fn is_vector(&self) -> bool {
        matches!(self, Type::Vector(..))
    }

    pub fn is_matrix(&self) -> bool {
        matches!(self, Type::Matrix(..))
    }

    pub fn is_number(&self) -> bool {
        self.component().is_some_and(ScalarKind::is_number)
    }

    pub fn is_bool(&self) -> bool {
        self.component() == Some(ScalarKind::Bool)
    }

    pub fn is_literal(&self) -> bool {
        matches!(self, Type::Scalar(s) if s.is_literal())
    }

    pub fn is_void(&self) -> bool {
        matches!(self, Type::Void)
    }

    pub fn with_component(&self, scalar: ScalarKind) -> Type {
        Type::compound(scalar, self.columns(), self.rows())
    }

    /// Cost of implicitly converting `self` to `to`, or `None` when no
    /// implicit conversion exists.
    pub fn coercion_cost(&self, to: &Type) -> Option<u32> {
        if self == to {
            return Some(0);
        }
        match (self, to) {
            (Type::Scalar(a), Type::Scalar(b)) => a.coercion_cost(*b),
            (Type::Vector(a, n), Type::Vector(b, m)) if n == m => a.coercion_cost(*b),
            (Type::Matrix(a, c1, r1), Type::Matrix(b, c2, r2)) if c1 == c2 && r1 == r2 => {
                a.coercion_cost(*b)
            }
            _ => None,
        }
    }

    pub fn can_coerce_to(&self, to: &Type) -> bool {
        self.coercion_cost(to).is_some()
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Void => write!(f, "void"),
            Type::Scalar(s) => write!(f, "{}", s.name()),
            Type::Vector(s, n) => write!(f, "{}{}", s.name(), n),
            Type::Matrix(s, c, r) => write!(f, "{}{}x{}", s.name(), c, r),
            Type::Array(element, Some(n)) => write!(f, "{}[{}]", element, n),
            Type::Array(element, None) => write!(f, "{}[]", element),
            Type::Struct(s) => write!(f, "{}", s.name),
            Type::Sampler2D => write!(f, "sampler2D"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_builtin_names() {
        assert_eq!(Type::from_name("float"), Some(FLOAT));
        assert_eq!(Type::from_name("uint3"), Some(Type::Vector(ScalarKind::UInt, 3)));
        assert_eq!(
            Type::from_name("half2x3"),
            Some(Type::Matrix(ScalarKind::Half, 2, 3))
        );
        assert_eq!(Type::from_name("int2x2"), None);
        assert_eq!(Type::from_name("float5"), None);
        assert_eq!(Type::from_name("floaty"), None);
    }

    #[test]
    fn literal_types_print_as_their_concrete_family() {
        assert_eq!(INT_LITERAL.to_string(), "int");
        assert_eq!(FLOAT_LITERAL.to_string(), "float");
        assert_eq!(Type::Matrix(ScalarKind::Float, 4, 4).to_string(), "float4x4");
    }
}
