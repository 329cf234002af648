use std::fmt;

use bitflags::bitflags;

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ModifierFlags: u32 {
        const CONST = 1 << 0;
        const IN = 1 << 1;
        const OUT = 1 << 2;
        const UNIFORM = 1 << 3;
        const FLAT = 1 << 4;
        const NOPERSPECTIVE = 1 << 5;
        const READONLY = 1 << 6;
        const WRITEONLY = 1 << 7;
        const COHERENT = 1 << 8;
        const VOLATILE = 1 << 9;
        const RESTRICT = 1 << 10;
        const BUFFER = 1 << 11;
        const HAS_SIDE_EFFECTS = 1 << 12;
        const PLS = 1 << 13;
        const PLS_IN = 1 << 14;
        const PLS_OUT = 1 << 15;
        const VARYING = 1 << 16;
        const HIGHP = 1 << 17;
        const MEDIUMP = 1 << 18;
        const LOWP = 1 << 19;
    }
}

impl ModifierFlags {
    /// Every storage modifier with its source spelling, in the order
    /// permission checks report them. Precision qualifiers are not listed;
    /// they are accepted everywhere.
    pub const CHECK_ORDER: [(ModifierFlags, &'static str); 17] = [
        (ModifierFlags::CONST, "const"),
        (ModifierFlags::IN, "in"),
        (ModifierFlags::OUT, "out"),
        (ModifierFlags::UNIFORM, "uniform"),
        (ModifierFlags::FLAT, "flat"),
        (ModifierFlags::NOPERSPECTIVE, "noperspective"),
        (ModifierFlags::READONLY, "readonly"),
        (ModifierFlags::WRITEONLY, "writeonly"),
        (ModifierFlags::COHERENT, "coherent"),
        (ModifierFlags::VOLATILE, "volatile"),
        (ModifierFlags::RESTRICT, "restrict"),
        (ModifierFlags::BUFFER, "buffer"),
        (ModifierFlags::HAS_SIDE_EFFECTS, "sk_has_side_effects"),
        (ModifierFlags::PLS, "__pixel_localEXT"),
        (ModifierFlags::PLS_IN, "__pixel_local_inEXT"),
        (ModifierFlags::PLS_OUT, "__pixel_local_outEXT"),
        (ModifierFlags::VARYING, "varying"),
    ];

    /// Names of the set modifiers outside `permitted`, in check order.
    pub fn disallowed(self, permitted: ModifierFlags) -> Vec<&'static str> {
        Self::CHECK_ORDER
            .iter()
            .filter(|(flag, _)| self.contains(*flag) && !permitted.contains(*flag))
            .map(|(_, name)| *name)
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Primitive {
    Points,
    Lines,
    LinesAdjacency,
    Triangles,
    TrianglesAdjacency,
    LineStrip,
    TriangleStrip,
}

impl Primitive {
    pub fn from_name(name: &str) -> Option<Self> {
        let primitive = match name {
            "points" => Self::Points,
            "lines" => Self::Lines,
            "lines_adjacency" => Self::LinesAdjacency,
            "triangles" => Self::Triangles,
            "triangles_adjacency" => Self::TrianglesAdjacency,
            "line_strip" => Self::LineStrip,
            "triangle_strip" => Self::TriangleStrip,
            _ => return None,
        };
        Some(primitive)
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Points => "points",
            Self::Lines => "lines",
            Self::LinesAdjacency => "lines_adjacency",
            Self::Triangles => "triangles",
            Self::TrianglesAdjacency => "triangles_adjacency",
            Self::LineStrip => "line_strip",
            Self::TriangleStrip => "triangle_strip",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Layout {
    pub location: Option<i32>,
    pub offset: Option<i32>,
    pub binding: Option<i32>,
    pub index: Option<i32>,
    pub set: Option<i32>,
    pub builtin: Option<i32>,
    pub input_attachment_index: Option<i32>,
    pub origin_upper_left: bool,
    pub override_coverage: bool,
    pub blend_support_all_equations: bool,
    pub push_constant: bool,
    pub primitive: Option<Primitive>,
    pub max_vertices: Option<i32>,
    pub invocations: Option<i32>,
}

impl Layout {
    pub fn is_empty(&self) -> bool {
        *self == Layout::default()
    }
}

/// Renders as `layout (points, max_vertices = 2)`, or nothing when empty.
impl fmt::Display for Layout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts: Vec<String> = Vec::new();
        let valued = [
            ("location", self.location),
            ("offset", self.offset),
            ("binding", self.binding),
            ("index", self.index),
            ("set", self.set),
            ("builtin", self.builtin),
            ("input_attachment_index", self.input_attachment_index),
        ];
        for (key, value) in valued {
            if let Some(value) = value {
                parts.push(format!("{} = {}", key, value));
            }
        }
        let switches = [
            ("origin_upper_left", self.origin_upper_left),
            ("override_coverage", self.override_coverage),
            ("blend_support_all_equations", self.blend_support_all_equations),
            ("push_constant", self.push_constant),
        ];
        for (key, on) in switches {
            if on {
                parts.push(key.to_string());
            }
        }
        if let Some(primitive) = self.primitive {
            parts.push(primitive.name().to_string());
        }
        if let Some(max_vertices) = self.max_vertices {
            parts.push(format!("max_vertices = {}", max_vertices));
        }
        if let Some(invocations) = self.invocations {
            parts.push(format!("invocations = {}", invocations));
        }

        if parts.is_empty() {
            return Ok(());
        }
        write!(f, "layout ({})", parts.join(", "))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub layout: Layout,
    pub flags: ModifierFlags,
}

impl Modifiers {
    pub fn new(layout: Layout, flags: ModifierFlags) -> Self {
        Self { layout, flags }
    }

    pub fn with_flags(flags: ModifierFlags) -> Self {
        Self {
            layout: Layout::default(),
            flags,
        }
    }

    pub fn contains(&self, flags: ModifierFlags) -> bool {
        self.flags.contains(flags)
    }
}
