#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    LeftParen,
    RightParen,
    LeftBrace,
    RightBrace,
    LeftBracket,
    RightBracket,
    Comma,
    Dot,
    Colon,
    ColonColon,
    Question,
    Semicolon,
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Shl,
    Shr,
    Ampersand,
    Pipe,
    Caret,
    Tilde,
    AmpAmp,
    PipePipe,
    CaretCaret,
    Bang,
    PlusPlus,
    MinusMinus,
    Equal,
    PlusEqual,
    MinusEqual,
    StarEqual,
    SlashEqual,
    PercentEqual,
    ShlEqual,
    ShrEqual,
    AmpersandEqual,
    PipeEqual,
    CaretEqual,
    EqualEqual,
    BangEqual,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
    Identifier(String),
    Int(i64),
    UInt(i64),
    Float(f64),
    True,
    False,
    If,
    Else,
    For,
    While,
    Do,
    Switch,
    Case,
    Default,
    Break,
    Continue,
    Discard,
    Return,
    Struct,
    Enum,
    Class,
    Layout,
    StaticIf,
    StaticSwitch,
    Modifier(ModifierKeyword),
    Invalid,
    Eof,
}

/// Storage, interpolation and precision keywords that may prefix a declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModifierKeyword {
    Const,
    In,
    Out,
    InOut,
    Uniform,
    Flat,
    NoPerspective,
    ReadOnly,
    WriteOnly,
    Coherent,
    Volatile,
    Restrict,
    Buffer,
    HasSideEffects,
    PixelLocal,
    PixelLocalIn,
    PixelLocalOut,
    Varying,
    HighP,
    MediumP,
    LowP,
}

impl ModifierKeyword {
    pub fn from_word(word: &str) -> Option<Self> {
        let keyword = match word {
            "const" => Self::Const,
            "in" => Self::In,
            "out" => Self::Out,
            "inout" => Self::InOut,
            "uniform" => Self::Uniform,
            "flat" => Self::Flat,
            "noperspective" => Self::NoPerspective,
            "readonly" => Self::ReadOnly,
            "writeonly" => Self::WriteOnly,
            "coherent" => Self::Coherent,
            "volatile" => Self::Volatile,
            "restrict" => Self::Restrict,
            "buffer" => Self::Buffer,
            "sk_has_side_effects" => Self::HasSideEffects,
            "__pixel_localEXT" => Self::PixelLocal,
            "__pixel_local_inEXT" => Self::PixelLocalIn,
            "__pixel_local_outEXT" => Self::PixelLocalOut,
            "varying" => Self::Varying,
            "highp" => Self::HighP,
            "mediump" => Self::MediumP,
            "lowp" => Self::LowP,
            _ => return None,
        };
        Some(keyword)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub lexeme: String,
    pub line: usize,
}

impl Token {
    pub fn new(kind: TokenKind, lexeme: String, line: usize) -> Self {
        Self { kind, lexeme, line }
    }
}
