pub mod ast;
mod expr;

use std::collections::HashSet;
use std::mem;

use crate::errors::Diagnostics;
use crate::lexer::token::{ModifierKeyword, Token, TokenKind};
use crate::modifiers::{Layout, ModifierFlags, Modifiers, Primitive};
use crate::types::Type;
use ast::{
    Declaration, EnumDecl, EnumValue, Expr, FunctionDecl, InterfaceBlock, Parameter, Program,
    Stmt, StmtKind, StructDecl, SwitchCase, VarDeclarations, VarDeclarator,
};

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ParseError {
    pub message: String,
    pub line: usize,
}

impl ParseError {
    fn new(message: impl Into<String>, token: &Token) -> Self {
        Self {
            message: message.into(),
            line: token.line,
        }
    }
}

/// Nesting limit for statements and subexpressions; deeper input is a
/// syntax error rather than a stack overflow.
const MAX_PARSE_DEPTH: usize = 50;

/// Parses a token stream into an AST. Syntax errors are collected, and
/// parsing resumes at the next statement boundary.
pub fn parse(tokens: Vec<Token>) -> (Program, Diagnostics) {
    let mut parser = Parser::new(tokens);
    let program = parser.parse_program();
    log::debug!(
        "parsed {} declarations with {} syntax errors",
        program.declarations.len(),
        parser.errors.len()
    );
    (program, parser.errors)
}

pub struct Parser {
    tokens: Vec<Token>,
    current: usize,
    /// Struct and enum names declared so far; a type name followed by `(`
    /// starts a constructor call.
    type_names: HashSet<String>,
    depth: usize,
    errors: Diagnostics,
}

impl Parser {
    pub fn new(mut tokens: Vec<Token>) -> Self {
        if !matches!(tokens.last().map(|t| &t.kind), Some(TokenKind::Eof)) {
            let line = tokens.last().map_or(1, |t| t.line);
            tokens.push(Token::new(TokenKind::Eof, String::new(), line));
        }
        Self {
            tokens,
            current: 0,
            type_names: HashSet::new(),
            depth: 0,
            errors: Diagnostics::new(),
        }
    }

    pub fn parse_program(&mut self) -> Program {
        let mut declarations = Vec::new();

        while !self.is_at_end() {
            if self.matches_symbol(TokenKind::Semicolon) {
                continue;
            }
            let start = self.current;
            match self.declaration() {
                Ok(mut decls) => declarations.append(&mut decls),
                Err(err) => {
                    self.report(err);
                    self.synchronize();
                    if self.current == start || self.check_kind(&TokenKind::RightBrace) {
                        self.advance();
                    }
                }
            }
        }

        Program { declarations }
    }

    pub fn into_errors(self) -> Diagnostics {
        self.errors
    }

    fn declaration(&mut self) -> Result<Vec<Declaration>, ParseError> {
        match self.peek_kind() {
            TokenKind::Struct => return self.struct_declaration(),
            TokenKind::Enum => return Ok(vec![self.enum_declaration()?]),
            _ => {}
        }

        let line = self.peek().line;
        let modifiers = self.modifiers()?;

        if self.matches_symbol(TokenKind::Semicolon) {
            return Ok(vec![Declaration::Modifiers { modifiers, line }]);
        }

        if matches!(self.peek_kind(), TokenKind::Identifier(_))
            && matches!(self.peek_kind_at(1), Some(TokenKind::LeftBrace))
        {
            return Ok(vec![Declaration::InterfaceBlock(
                self.interface_block(modifiers, line)?,
            )]);
        }

        let type_name = self.consume_identifier("a type")?;
        let name = self.consume_identifier("an identifier")?;
        if self.check_kind(&TokenKind::LeftParen) {
            return Ok(vec![Declaration::Function(
                self.function_rest(modifiers, type_name, name, line)?,
            )]);
        }

        let decls = self.var_declarations_rest(modifiers, type_name, name, line)?;
        Ok(vec![Declaration::Variables(decls)])
    }

    fn struct_declaration(&mut self) -> Result<Vec<Declaration>, ParseError> {
        let line = self.peek().line;
        self.consume_symbol(TokenKind::Struct, "'struct'")?;
        let name = self.consume_identifier("an identifier")?;
        self.type_names.insert(name.clone());

        self.consume_symbol(TokenKind::LeftBrace, "'{'")?;
        let mut fields = Vec::new();
        while !self.check_kind(&TokenKind::RightBrace) && !self.is_at_end() {
            fields.push(self.field_declarations()?);
        }
        self.consume_symbol(TokenKind::RightBrace, "'}'")?;

        let mut declarations = vec![Declaration::Struct(StructDecl {
            name: name.clone(),
            fields,
            line,
        })];
        if let TokenKind::Identifier(var_name) = self.peek_kind().clone() {
            let var_line = self.advance().line;
            let vars =
                self.var_declarations_rest(Modifiers::default(), name, var_name, var_line)?;
            declarations.push(Declaration::Variables(vars));
        } else {
            self.consume_symbol(TokenKind::Semicolon, "';'")?;
        }
        Ok(declarations)
    }

    fn enum_declaration(&mut self) -> Result<Declaration, ParseError> {
        let line = self.peek().line;
        self.consume_symbol(TokenKind::Enum, "'enum'")?;
        let is_class = self.matches_symbol(TokenKind::Class);
        let name = self.consume_identifier("an identifier")?;
        self.type_names.insert(name.clone());

        self.consume_symbol(TokenKind::LeftBrace, "'{'")?;
        let mut values = Vec::new();
        while !self.check_kind(&TokenKind::RightBrace) {
            let value_line = self.peek().line;
            let value_name = self.consume_identifier("an identifier")?;
            let value = if self.matches_symbol(TokenKind::Equal) {
                Some(self.assignment_expression()?)
            } else {
                None
            };
            values.push(EnumValue {
                name: value_name,
                value,
                line: value_line,
            });
            if !self.matches_symbol(TokenKind::Comma) {
                break;
            }
        }
        self.consume_symbol(TokenKind::RightBrace, "'}'")?;
        self.consume_symbol(TokenKind::Semicolon, "';'")?;

        Ok(Declaration::Enum(EnumDecl {
            name,
            is_class,
            values,
            line,
        }))
    }

    fn interface_block(
        &mut self,
        modifiers: Modifiers,
        line: usize,
    ) -> Result<InterfaceBlock, ParseError> {
        let type_name = self.consume_identifier("an identifier")?;
        self.consume_symbol(TokenKind::LeftBrace, "'{'")?;
        let mut fields = Vec::new();
        while !self.check_kind(&TokenKind::RightBrace) && !self.is_at_end() {
            fields.push(self.field_declarations()?);
        }
        self.consume_symbol(TokenKind::RightBrace, "'}'")?;

        let mut instance = None;
        let mut sizes = Vec::new();
        if let TokenKind::Identifier(name) = self.peek_kind().clone() {
            self.advance();
            instance = Some(name);
            sizes = self.array_sizes()?;
        }
        self.consume_symbol(TokenKind::Semicolon, "';'")?;

        Ok(InterfaceBlock {
            modifiers,
            type_name,
            fields,
            instance,
            sizes,
            line,
        })
    }

    fn field_declarations(&mut self) -> Result<VarDeclarations, ParseError> {
        let line = self.peek().line;
        let modifiers = self.modifiers()?;
        let type_name = self.consume_identifier("a type")?;
        let name = self.consume_identifier("an identifier")?;
        self.var_declarations_rest(modifiers, type_name, name, line)
    }

    fn function_rest(
        &mut self,
        modifiers: Modifiers,
        return_type: String,
        name: String,
        line: usize,
    ) -> Result<FunctionDecl, ParseError> {
        self.consume_symbol(TokenKind::LeftParen, "'('")?;
        let mut params = Vec::new();
        if !self.check_kind(&TokenKind::RightParen) {
            loop {
                params.push(self.parameter()?);
                if !self.matches_symbol(TokenKind::Comma) {
                    break;
                }
            }
        }
        self.consume_symbol(TokenKind::RightParen, "')'")?;

        let body = if self.matches_symbol(TokenKind::Semicolon) {
            None
        } else {
            Some(self.block()?)
        };

        Ok(FunctionDecl {
            modifiers,
            return_type,
            name,
            params,
            body,
            line,
        })
    }

    fn parameter(&mut self) -> Result<Parameter, ParseError> {
        let line = self.peek().line;
        let modifiers = self.modifiers()?;
        let type_name = self.consume_identifier("a type")?;
        let name = self.consume_identifier("an identifier")?;
        let sizes = self.array_sizes()?;
        Ok(Parameter {
            modifiers,
            type_name,
            name,
            sizes,
            line,
        })
    }

    /// Parses the declarators after `Type name`, through the closing `;`.
    fn var_declarations_rest(
        &mut self,
        modifiers: Modifiers,
        type_name: String,
        first_name: String,
        line: usize,
    ) -> Result<VarDeclarations, ParseError> {
        let mut vars = Vec::new();
        let mut name = first_name;
        let mut var_line = line;
        loop {
            let sizes = self.array_sizes()?;
            let init = if self.matches_symbol(TokenKind::Equal) {
                Some(self.assignment_expression()?)
            } else {
                None
            };
            vars.push(VarDeclarator {
                name,
                sizes,
                init,
                line: var_line,
            });
            if !self.matches_symbol(TokenKind::Comma) {
                break;
            }
            var_line = self.peek().line;
            name = self.consume_identifier("an identifier")?;
        }
        self.consume_symbol(TokenKind::Semicolon, "';'")?;

        Ok(VarDeclarations {
            modifiers,
            type_name,
            vars,
            line,
        })
    }

    fn array_sizes(&mut self) -> Result<Vec<Option<Expr>>, ParseError> {
        let mut sizes = Vec::new();
        while self.matches_symbol(TokenKind::LeftBracket) {
            if self.matches_symbol(TokenKind::RightBracket) {
                sizes.push(None);
                continue;
            }
            sizes.push(Some(self.expression()?));
            self.consume_symbol(TokenKind::RightBracket, "']'")?;
        }
        Ok(sizes)
    }

    fn modifiers(&mut self) -> Result<Modifiers, ParseError> {
        let mut layout = Layout::default();
        let mut flags = ModifierFlags::empty();
        loop {
            match self.peek_kind().clone() {
                TokenKind::Layout => {
                    self.advance();
                    layout = self.layout()?;
                }
                TokenKind::Modifier(keyword) => {
                    self.advance();
                    flags |= modifier_flags(keyword);
                }
                _ => break,
            }
        }
        Ok(Modifiers::new(layout, flags))
    }

    fn layout(&mut self) -> Result<Layout, ParseError> {
        let mut layout = Layout::default();
        self.consume_symbol(TokenKind::LeftParen, "'('")?;
        loop {
            let token = self.peek().clone();
            let key = self.consume_identifier("a layout qualifier")?;
            match key.as_str() {
                "location" => layout.location = Some(self.layout_int()?),
                "offset" => layout.offset = Some(self.layout_int()?),
                "binding" => layout.binding = Some(self.layout_int()?),
                "index" => layout.index = Some(self.layout_int()?),
                "set" => layout.set = Some(self.layout_int()?),
                "builtin" => layout.builtin = Some(self.layout_int()?),
                "input_attachment_index" => {
                    layout.input_attachment_index = Some(self.layout_int()?)
                }
                "origin_upper_left" => layout.origin_upper_left = true,
                "override_coverage" => layout.override_coverage = true,
                "blend_support_all_equations" => layout.blend_support_all_equations = true,
                "push_constant" => layout.push_constant = true,
                "max_vertices" => layout.max_vertices = Some(self.layout_int()?),
                "invocations" => layout.invocations = Some(self.layout_int()?),
                other => match Primitive::from_name(other) {
                    Some(primitive) => layout.primitive = Some(primitive),
                    None => self.report(ParseError::new(
                        format!("'{}' is not a valid layout qualifier", other),
                        &token,
                    )),
                },
            }
            if !self.matches_symbol(TokenKind::Comma) {
                break;
            }
        }
        self.consume_symbol(TokenKind::RightParen, "')'")?;
        Ok(layout)
    }

    fn layout_int(&mut self) -> Result<i32, ParseError> {
        self.consume_symbol(TokenKind::Equal, "'='")?;
        match self.peek_kind() {
            TokenKind::Int(value) | TokenKind::UInt(value) => {
                let value = i32::try_from(*value)
                    .map_err(|_| ParseError::new("layout value out of range", self.peek()))?;
                self.advance();
                Ok(value)
            }
            _ => Err(self.expected("an integer")),
        }
    }

    fn block(&mut self) -> Result<Stmt, ParseError> {
        let line = self.peek().line;
        self.consume_symbol(TokenKind::LeftBrace, "'{'")?;
        let mut stmts = Vec::new();
        while !self.check_kind(&TokenKind::RightBrace) && !self.is_at_end() {
            let start = self.current;
            match self.statement() {
                Ok(stmt) => stmts.push(stmt),
                Err(err) => {
                    self.report(err);
                    self.synchronize();
                    if self.current == start {
                        self.advance();
                    }
                }
            }
        }
        self.consume_symbol(TokenKind::RightBrace, "'}'")?;
        Ok(Stmt::new(StmtKind::Block(stmts), line))
    }

    fn statement(&mut self) -> Result<Stmt, ParseError> {
        self.nested(Self::unnested_statement)
    }

    fn unnested_statement(&mut self) -> Result<Stmt, ParseError> {
        let line = self.peek().line;
        match self.peek_kind() {
            TokenKind::LeftBrace => self.block(),
            TokenKind::Semicolon => {
                self.advance();
                Ok(Stmt::new(StmtKind::Empty, line))
            }
            TokenKind::If | TokenKind::StaticIf => self.if_statement(),
            TokenKind::For => self.for_statement(),
            TokenKind::While => self.while_statement(),
            TokenKind::Do => self.do_statement(),
            TokenKind::Switch | TokenKind::StaticSwitch => self.switch_statement(),
            TokenKind::Return => {
                self.advance();
                let value = if self.check_kind(&TokenKind::Semicolon) {
                    None
                } else {
                    Some(self.expression()?)
                };
                self.consume_symbol(TokenKind::Semicolon, "';'")?;
                Ok(Stmt::new(StmtKind::Return(value), line))
            }
            TokenKind::Break => self.jump(StmtKind::Break),
            TokenKind::Continue => self.jump(StmtKind::Continue),
            TokenKind::Discard => self.jump(StmtKind::Discard),
            _ if self.looks_like_declaration() => {
                let modifiers = self.modifiers()?;
                let type_name = self.consume_identifier("a type")?;
                let name = self.consume_identifier("an identifier")?;
                let decls = self.var_declarations_rest(modifiers, type_name, name, line)?;
                Ok(Stmt::new(StmtKind::VarDeclarations(decls), line))
            }
            _ => {
                let expr = self.expression()?;
                self.consume_symbol(TokenKind::Semicolon, "';'")?;
                Ok(Stmt::new(StmtKind::Expression(expr), line))
            }
        }
    }

    fn jump(&mut self, kind: StmtKind) -> Result<Stmt, ParseError> {
        let line = self.advance().line;
        self.consume_symbol(TokenKind::Semicolon, "';'")?;
        Ok(Stmt::new(kind, line))
    }

    fn if_statement(&mut self) -> Result<Stmt, ParseError> {
        let token = self.advance();
        let (line, is_static) = (token.line, token.kind == TokenKind::StaticIf);
        self.consume_symbol(TokenKind::LeftParen, "'('")?;
        let test = self.expression()?;
        self.consume_symbol(TokenKind::RightParen, "')'")?;
        let if_true = Box::new(self.statement()?);
        let if_false = if self.matches_symbol(TokenKind::Else) {
            Some(Box::new(self.statement()?))
        } else {
            None
        };
        Ok(Stmt::new(
            StmtKind::If {
                is_static,
                test,
                if_true,
                if_false,
            },
            line,
        ))
    }

    fn for_statement(&mut self) -> Result<Stmt, ParseError> {
        let line = self.advance().line;
        self.consume_symbol(TokenKind::LeftParen, "'('")?;
        let init = if self.matches_symbol(TokenKind::Semicolon) {
            None
        } else {
            Some(Box::new(self.statement()?))
        };
        let test = if self.check_kind(&TokenKind::Semicolon) {
            None
        } else {
            Some(self.expression()?)
        };
        self.consume_symbol(TokenKind::Semicolon, "';'")?;
        let next = if self.check_kind(&TokenKind::RightParen) {
            None
        } else {
            Some(self.expression()?)
        };
        self.consume_symbol(TokenKind::RightParen, "')'")?;
        let body = Box::new(self.statement()?);
        Ok(Stmt::new(
            StmtKind::For {
                init,
                test,
                next,
                body,
            },
            line,
        ))
    }

    fn while_statement(&mut self) -> Result<Stmt, ParseError> {
        let line = self.advance().line;
        self.consume_symbol(TokenKind::LeftParen, "'('")?;
        let test = self.expression()?;
        self.consume_symbol(TokenKind::RightParen, "')'")?;
        let body = Box::new(self.statement()?);
        Ok(Stmt::new(StmtKind::While { test, body }, line))
    }

    fn do_statement(&mut self) -> Result<Stmt, ParseError> {
        let line = self.advance().line;
        let body = Box::new(self.statement()?);
        self.consume_symbol(TokenKind::While, "'while'")?;
        self.consume_symbol(TokenKind::LeftParen, "'('")?;
        let test = self.expression()?;
        self.consume_symbol(TokenKind::RightParen, "')'")?;
        self.consume_symbol(TokenKind::Semicolon, "';'")?;
        Ok(Stmt::new(StmtKind::Do { body, test }, line))
    }

    fn switch_statement(&mut self) -> Result<Stmt, ParseError> {
        let token = self.advance();
        let (line, is_static) = (token.line, token.kind == TokenKind::StaticSwitch);
        self.consume_symbol(TokenKind::LeftParen, "'('")?;
        let value = self.expression()?;
        self.consume_symbol(TokenKind::RightParen, "')'")?;
        self.consume_symbol(TokenKind::LeftBrace, "'{'")?;

        let mut cases = Vec::new();
        while !self.check_kind(&TokenKind::RightBrace) {
            let case_line = self.peek().line;
            let case_value = if self.matches_symbol(TokenKind::Default) {
                None
            } else {
                self.consume_symbol(TokenKind::Case, "'case'")?;
                Some(self.expression()?)
            };
            self.consume_symbol(TokenKind::Colon, "':'")?;

            let mut stmts = Vec::new();
            while !matches!(
                self.peek_kind(),
                TokenKind::Case | TokenKind::Default | TokenKind::RightBrace | TokenKind::Eof
            ) {
                stmts.push(self.statement()?);
            }
            cases.push(SwitchCase {
                value: case_value,
                stmts,
                line: case_line,
            });
        }
        self.consume_symbol(TokenKind::RightBrace, "'}'")?;

        Ok(Stmt::new(
            StmtKind::Switch {
                is_static,
                value,
                cases,
            },
            line,
        ))
    }

    /// A statement led by modifiers, by two identifiers, or by a known type
    /// name that does not start a constructor call or an enum value.
    fn looks_like_declaration(&self) -> bool {
        match self.peek_kind() {
            TokenKind::Modifier(_) | TokenKind::Layout => true,
            TokenKind::Identifier(name) => match self.peek_kind_at(1) {
                Some(TokenKind::Identifier(_)) => true,
                Some(TokenKind::LeftParen | TokenKind::ColonColon) => false,
                _ => self.is_type_name(name),
            },
            _ => false,
        }
    }

    /// Runs `parse` one nesting level deeper.
    pub(crate) fn nested<T>(
        &mut self,
        parse: impl FnOnce(&mut Self) -> Result<T, ParseError>,
    ) -> Result<T, ParseError> {
        self.chained(|parser| {
            parser.deepen()?;
            parse(parser)
        })
    }

    /// Runs `parse`, then restores the nesting depth. Loops that grow a
    /// tree one link at a time call [`Parser::deepen`] per link inside it.
    pub(crate) fn chained<T>(
        &mut self,
        parse: impl FnOnce(&mut Self) -> Result<T, ParseError>,
    ) -> Result<T, ParseError> {
        let depth = self.depth;
        let result = parse(self);
        self.depth = depth;
        result
    }

    pub(crate) fn deepen(&mut self) -> Result<(), ParseError> {
        if self.depth >= MAX_PARSE_DEPTH {
            return Err(ParseError::new("exceeded max parse depth", self.peek()));
        }
        self.depth += 1;
        Ok(())
    }

    pub(crate) fn is_type_name(&self, name: &str) -> bool {
        self.type_names.contains(name) || Type::from_name(name).is_some()
    }

    /// Skips to just past the next `;`, or to the `}` that closes the
    /// current nesting level, whichever comes first.
    fn synchronize(&mut self) {
        let mut depth = 0usize;
        while !self.is_at_end() {
            match self.peek_kind() {
                TokenKind::Semicolon if depth == 0 => {
                    self.advance();
                    return;
                }
                TokenKind::LeftBrace => depth += 1,
                TokenKind::RightBrace => {
                    if depth == 0 {
                        return;
                    }
                    depth -= 1;
                    if depth == 0 {
                        self.advance();
                        return;
                    }
                }
                _ => {}
            }
            self.advance();
        }
    }

    fn report(&mut self, err: ParseError) {
        self.errors.error(err.line, err.message);
    }

    pub(crate) fn expected(&self, what: &str) -> ParseError {
        ParseError::new(
            format!("expected {}, but found '{}'", what, self.peek().lexeme),
            self.peek(),
        )
    }

    pub(crate) fn matches_symbol(&mut self, kind: TokenKind) -> bool {
        if self.check_kind(&kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    pub(crate) fn consume_symbol(&mut self, kind: TokenKind, what: &str) -> Result<(), ParseError> {
        if self.check_kind(&kind) {
            self.advance();
            Ok(())
        } else {
            Err(self.expected(what))
        }
    }

    pub(crate) fn consume_identifier(&mut self, what: &str) -> Result<String, ParseError> {
        match self.peek_kind() {
            TokenKind::Identifier(name) => {
                let value = name.clone();
                self.advance();
                Ok(value)
            }
            _ => Err(self.expected(what)),
        }
    }

    pub(crate) fn check_kind(&self, kind: &TokenKind) -> bool {
        mem::discriminant(self.peek_kind()) == mem::discriminant(kind)
    }

    pub(crate) fn advance(&mut self) -> &Token {
        if !self.is_at_end() {
            self.current += 1;
        }
        self.previous()
    }

    pub(crate) fn is_at_end(&self) -> bool {
        matches!(self.peek_kind(), TokenKind::Eof)
    }

    pub(crate) fn peek(&self) -> &Token {
        &self.tokens[self.current]
    }

    pub(crate) fn peek_kind(&self) -> &TokenKind {
        &self.peek().kind
    }

    pub(crate) fn peek_kind_at(&self, offset: usize) -> Option<&TokenKind> {
        self.tokens.get(self.current + offset).map(|token| &token.kind)
    }

    pub(crate) fn previous(&self) -> &Token {
        &self.tokens[self.current.saturating_sub(1)]
    }
}

fn modifier_flags(keyword: ModifierKeyword) -> ModifierFlags {
    match keyword {
        ModifierKeyword::Const => ModifierFlags::CONST,
        ModifierKeyword::In => ModifierFlags::IN,
        ModifierKeyword::Out => ModifierFlags::OUT,
        ModifierKeyword::InOut => ModifierFlags::IN | ModifierFlags::OUT,
        ModifierKeyword::Uniform => ModifierFlags::UNIFORM,
        ModifierKeyword::Flat => ModifierFlags::FLAT,
        ModifierKeyword::NoPerspective => ModifierFlags::NOPERSPECTIVE,
        ModifierKeyword::ReadOnly => ModifierFlags::READONLY,
        ModifierKeyword::WriteOnly => ModifierFlags::WRITEONLY,
        ModifierKeyword::Coherent => ModifierFlags::COHERENT,
        ModifierKeyword::Volatile => ModifierFlags::VOLATILE,
        ModifierKeyword::Restrict => ModifierFlags::RESTRICT,
        ModifierKeyword::Buffer => ModifierFlags::BUFFER,
        ModifierKeyword::HasSideEffects => ModifierFlags::HAS_SIDE_EFFECTS,
        ModifierKeyword::PixelLocal => ModifierFlags::PLS,
        ModifierKeyword::PixelLocalIn => ModifierFlags::PLS_IN,
        ModifierKeyword::PixelLocalOut => ModifierFlags::PLS_OUT,
        ModifierKeyword::Varying => ModifierFlags::VARYING,
        ModifierKeyword::HighP => ModifierFlags::HIGHP,
        ModifierKeyword::MediumP => ModifierFlags::MEDIUMP,
        ModifierKeyword::LowP => ModifierFlags::LOWP,
    }
}
