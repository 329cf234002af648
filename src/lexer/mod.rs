pub mod token;

use token::{ModifierKeyword, Token, TokenKind};

/// Splits `source` into tokens. The returned vector always ends with exactly
/// one [`TokenKind::Eof`].
pub fn tokenize(source: &str) -> Vec<Token> {
    let tokens = Lexer::new(source).lex();
    log::trace!("lexed {} tokens", tokens.len());
    tokens
}

struct Lexer {
    chars: Vec<char>,
    current: usize,
    start: usize,
    line: usize,
    token_line: usize,
    tokens: Vec<Token>,
}

impl Lexer {
    fn new(source: &str) -> Self {
        Self {
            chars: source.chars().collect(),
            current: 0,
            start: 0,
            line: 1,
            token_line: 1,
            tokens: Vec::new(),
        }
    }

    fn lex(mut self) -> Vec<Token> {
        while !self.is_at_end() {
            self.start_token();
            self.scan_token();
        }

        self.tokens
            .push(Token::new(TokenKind::Eof, String::new(), self.line));
        self.tokens
    }

    fn scan_token(&mut self) {
        let c = self.advance();
        match c {
            '(' => self.add_token(TokenKind::LeftParen),
            ')' => self.add_token(TokenKind::RightParen),
            '{' => self.add_token(TokenKind::LeftBrace),
            '}' => self.add_token(TokenKind::RightBrace),
            '[' => self.add_token(TokenKind::LeftBracket),
            ']' => self.add_token(TokenKind::RightBracket),
            ',' => self.add_token(TokenKind::Comma),
            '?' => self.add_token(TokenKind::Question),
            ';' => self.add_token(TokenKind::Semicolon),
            '~' => self.add_token(TokenKind::Tilde),
            '.' => {
                if self.peek().is_ascii_digit() {
                    self.number();
                } else {
                    self.add_token(TokenKind::Dot);
                }
            }
            ':' => {
                if self.matches(':') {
                    self.add_token(TokenKind::ColonColon);
                } else {
                    self.add_token(TokenKind::Colon);
                }
            }
            '+' => {
                let kind = if self.matches('+') {
                    TokenKind::PlusPlus
                } else if self.matches('=') {
                    TokenKind::PlusEqual
                } else {
                    TokenKind::Plus
                };
                self.add_token(kind);
            }
            '-' => {
                let kind = if self.matches('-') {
                    TokenKind::MinusMinus
                } else if self.matches('=') {
                    TokenKind::MinusEqual
                } else {
                    TokenKind::Minus
                };
                self.add_token(kind);
            }
            '*' => self.one_or_assign(TokenKind::Star, TokenKind::StarEqual),
            '%' => self.one_or_assign(TokenKind::Percent, TokenKind::PercentEqual),
            '!' => self.one_or_assign(TokenKind::Bang, TokenKind::BangEqual),
            '=' => self.one_or_assign(TokenKind::Equal, TokenKind::EqualEqual),
            '&' => {
                let kind = if self.matches('&') {
                    TokenKind::AmpAmp
                } else if self.matches('=') {
                    TokenKind::AmpersandEqual
                } else {
                    TokenKind::Ampersand
                };
                self.add_token(kind);
            }
            '|' => {
                let kind = if self.matches('|') {
                    TokenKind::PipePipe
                } else if self.matches('=') {
                    TokenKind::PipeEqual
                } else {
                    TokenKind::Pipe
                };
                self.add_token(kind);
            }
            '^' => {
                let kind = if self.matches('^') {
                    TokenKind::CaretCaret
                } else if self.matches('=') {
                    TokenKind::CaretEqual
                } else {
                    TokenKind::Caret
                };
                self.add_token(kind);
            }
            '<' => {
                let kind = if self.matches('<') {
                    if self.matches('=') {
                        TokenKind::ShlEqual
                    } else {
                        TokenKind::Shl
                    }
                } else if self.matches('=') {
                    TokenKind::LessEqual
                } else {
                    TokenKind::Less
                };
                self.add_token(kind);
            }
            '>' => {
                let kind = if self.matches('>') {
                    if self.matches('=') {
                        TokenKind::ShrEqual
                    } else {
                        TokenKind::Shr
                    }
                } else if self.matches('=') {
                    TokenKind::GreaterEqual
                } else {
                    TokenKind::Greater
                };
                self.add_token(kind);
            }
            '/' => {
                if self.matches('/') {
                    self.skip_line_comment();
                } else if self.matches('*') {
                    self.skip_block_comment();
                } else {
                    self.one_or_assign(TokenKind::Slash, TokenKind::SlashEqual);
                }
            }
            '@' => self.static_keyword(),
            ' ' | '\r' | '\t' | '\n' => {}
            d if d.is_ascii_digit() => self.number(),
            a if is_ident_start(a) => self.identifier(),
            _ => self.add_token(TokenKind::Invalid),
        }
    }

    fn one_or_assign(&mut self, single: TokenKind, with_equal: TokenKind) {
        if self.matches('=') {
            self.add_token(with_equal);
        } else {
            self.add_token(single);
        }
    }

    fn static_keyword(&mut self) {
        while is_ident_continue(self.peek()) {
            self.advance();
        }
        let kind = match self.current_lexeme().as_str() {
            "@if" => TokenKind::StaticIf,
            "@switch" => TokenKind::StaticSwitch,
            _ => TokenKind::Invalid,
        };
        self.add_token(kind);
    }

    fn number(&mut self) {
        let leading_dot = self.chars[self.start] == '.';
        if !leading_dot
            && self.chars[self.start] == '0'
            && matches!(self.peek(), 'x' | 'X')
            && self.peek_next().is_ascii_hexdigit()
        {
            self.advance();
            while self.peek().is_ascii_hexdigit() {
                self.advance();
            }
            let digits: String = self.chars[self.start + 2..self.current].iter().collect();
            let value = i64::from_str_radix(&digits, 16).ok();
            self.integer_suffix(value);
            return;
        }

        while self.peek().is_ascii_digit() {
            self.advance();
        }

        let mut is_float = leading_dot;
        if !leading_dot && self.peek() == '.' {
            is_float = true;
            self.advance();
            while self.peek().is_ascii_digit() {
                self.advance();
            }
        }

        if matches!(self.peek(), 'e' | 'E') {
            let signed = matches!(self.peek_next(), '+' | '-');
            let digit_at = if signed { 2 } else { 1 };
            if self
                .chars
                .get(self.current + digit_at)
                .is_some_and(|c| c.is_ascii_digit())
            {
                is_float = true;
                for _ in 0..digit_at {
                    self.advance();
                }
                while self.peek().is_ascii_digit() {
                    self.advance();
                }
            }
        }

        let lexeme = self.current_lexeme();
        if is_float {
            match lexeme.parse::<f64>() {
                Ok(value) => self.add_token(TokenKind::Float(value)),
                Err(_) => self.add_token(TokenKind::Invalid),
            }
        } else {
            self.integer_suffix(lexeme.parse::<i64>().ok());
        }
    }

    fn integer_suffix(&mut self, value: Option<i64>) {
        let unsigned = self.matches('u') || self.matches('U');
        match value {
            Some(value) if unsigned => self.add_token(TokenKind::UInt(value)),
            Some(value) => self.add_token(TokenKind::Int(value)),
            None => self.add_token(TokenKind::Invalid),
        }
    }

    fn identifier(&mut self) {
        while is_ident_continue(self.peek()) {
            self.advance();
        }

        let lexeme = self.current_lexeme();
        let kind = match lexeme.as_str() {
            "true" => TokenKind::True,
            "false" => TokenKind::False,
            "if" => TokenKind::If,
            "else" => TokenKind::Else,
            "for" => TokenKind::For,
            "while" => TokenKind::While,
            "do" => TokenKind::Do,
            "switch" => TokenKind::Switch,
            "case" => TokenKind::Case,
            "default" => TokenKind::Default,
            "break" => TokenKind::Break,
            "continue" => TokenKind::Continue,
            "discard" => TokenKind::Discard,
            "return" => TokenKind::Return,
            "struct" => TokenKind::Struct,
            "enum" => TokenKind::Enum,
            "class" => TokenKind::Class,
            "layout" => TokenKind::Layout,
            word => match ModifierKeyword::from_word(word) {
                Some(modifier) => TokenKind::Modifier(modifier),
                None => TokenKind::Identifier(lexeme.clone()),
            },
        };

        self.add_token(kind);
    }

    fn skip_line_comment(&mut self) {
        while !self.is_at_end() && self.peek() != '\n' {
            self.advance();
        }
    }

    // An unterminated comment swallows the rest of the input.
    fn skip_block_comment(&mut self) {
        while !self.is_at_end() {
            if self.peek() == '*' && self.peek_next() == '/' {
                self.advance();
                self.advance();
                return;
            }
            self.advance();
        }
    }

    fn add_token(&mut self, kind: TokenKind) {
        let lexeme = self.current_lexeme();
        self.tokens.push(Token::new(kind, lexeme, self.token_line));
    }

    fn start_token(&mut self) {
        self.start = self.current;
        self.token_line = self.line;
    }

    fn current_lexeme(&self) -> String {
        self.chars[self.start..self.current].iter().collect()
    }

    fn matches(&mut self, expected: char) -> bool {
        if self.is_at_end() || self.peek() != expected {
            return false;
        }
        self.advance();
        true
    }

    fn peek(&self) -> char {
        self.chars.get(self.current).copied().unwrap_or('\0')
    }

    fn peek_next(&self) -> char {
        self.chars.get(self.current + 1).copied().unwrap_or('\0')
    }

    fn advance(&mut self) -> char {
        let c = self.chars[self.current];
        self.current += 1;
        if c == '\n' {
            self.line += 1;
        }
        c
    }

    fn is_at_end(&self) -> bool {
        self.current >= self.chars.len()
    }
}

fn is_ident_start(c: char) -> bool {
    c == '_' || c.is_ascii_alphabetic()
}

fn is_ident_continue(c: char) -> bool {
    c == '_' || c.is_ascii_alphanumeric()
}
