use crate::lexer::token::TokenKind;

use super::ast::{BinaryOp, Expr, ExprKind, PostfixOp, PrefixOp};
use super::{ParseError, Parser};

impl Parser {
    /// Full expression, including the comma operator.
    pub(crate) fn expression(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.assignment_expression()?;
        self.chained(|parser| {
            while parser.matches_symbol(TokenKind::Comma) {
                parser.deepen()?;
                let right = parser.assignment_expression()?;
                expr = binary(expr, BinaryOp::Comma, right);
            }
            Ok(expr)
        })
    }

    /// Every nested subexpression (parentheses, arguments, indices, ternary
    /// arms, assigned values) comes through here, so this is where the
    /// nesting depth is counted.
    pub(crate) fn assignment_expression(&mut self) -> Result<Expr, ParseError> {
        self.nested(Self::unnested_assignment)
    }

    fn unnested_assignment(&mut self) -> Result<Expr, ParseError> {
        let expr = self.ternary()?;

        let op = match self.peek_kind() {
            TokenKind::Equal => BinaryOp::Assign,
            TokenKind::PlusEqual => BinaryOp::AddAssign,
            TokenKind::MinusEqual => BinaryOp::SubtractAssign,
            TokenKind::StarEqual => BinaryOp::MultiplyAssign,
            TokenKind::SlashEqual => BinaryOp::DivideAssign,
            TokenKind::PercentEqual => BinaryOp::ModuloAssign,
            TokenKind::ShlEqual => BinaryOp::ShiftLeftAssign,
            TokenKind::ShrEqual => BinaryOp::ShiftRightAssign,
            TokenKind::AmpersandEqual => BinaryOp::BitAndAssign,
            TokenKind::PipeEqual => BinaryOp::BitOrAssign,
            TokenKind::CaretEqual => BinaryOp::BitXorAssign,
            _ => return Ok(expr),
        };
        self.advance();
        let value = self.assignment_expression()?;
        Ok(binary(expr, op, value))
    }

    fn ternary(&mut self) -> Result<Expr, ParseError> {
        let test = self.logical_or()?;
        if !self.matches_symbol(TokenKind::Question) {
            return Ok(test);
        }

        let if_true = self.expression()?;
        self.consume_symbol(TokenKind::Colon, "':'")?;
        let if_false = self.assignment_expression()?;
        let line = test.line;
        Ok(Expr::new(
            ExprKind::Ternary {
                test: Box::new(test),
                if_true: Box::new(if_true),
                if_false: Box::new(if_false),
            },
            line,
        ))
    }

    fn logical_or(&mut self) -> Result<Expr, ParseError> {
        self.binary_level(Self::logical_xor, &[(TokenKind::PipePipe, BinaryOp::LogicalOr)])
    }

    fn logical_xor(&mut self) -> Result<Expr, ParseError> {
        self.binary_level(
            Self::logical_and,
            &[(TokenKind::CaretCaret, BinaryOp::LogicalXor)],
        )
    }

    fn logical_and(&mut self) -> Result<Expr, ParseError> {
        self.binary_level(Self::bit_or, &[(TokenKind::AmpAmp, BinaryOp::LogicalAnd)])
    }

    fn bit_or(&mut self) -> Result<Expr, ParseError> {
        self.binary_level(Self::bit_xor, &[(TokenKind::Pipe, BinaryOp::BitOr)])
    }

    fn bit_xor(&mut self) -> Result<Expr, ParseError> {
        self.binary_level(Self::bit_and, &[(TokenKind::Caret, BinaryOp::BitXor)])
    }

    fn bit_and(&mut self) -> Result<Expr, ParseError> {
        self.binary_level(Self::equality, &[(TokenKind::Ampersand, BinaryOp::BitAnd)])
    }

    fn equality(&mut self) -> Result<Expr, ParseError> {
        self.binary_level(
            Self::relational,
            &[
                (TokenKind::EqualEqual, BinaryOp::Equal),
                (TokenKind::BangEqual, BinaryOp::NotEqual),
            ],
        )
    }

    fn relational(&mut self) -> Result<Expr, ParseError> {
        self.binary_level(
            Self::shift,
            &[
                (TokenKind::Less, BinaryOp::Less),
                (TokenKind::LessEqual, BinaryOp::LessEqual),
                (TokenKind::Greater, BinaryOp::Greater),
                (TokenKind::GreaterEqual, BinaryOp::GreaterEqual),
            ],
        )
    }

    fn shift(&mut self) -> Result<Expr, ParseError> {
        self.binary_level(
            Self::additive,
            &[
                (TokenKind::Shl, BinaryOp::ShiftLeft),
                (TokenKind::Shr, BinaryOp::ShiftRight),
            ],
        )
    }

    fn additive(&mut self) -> Result<Expr, ParseError> {
        self.binary_level(
            Self::multiplicative,
            &[
                (TokenKind::Plus, BinaryOp::Add),
                (TokenKind::Minus, BinaryOp::Subtract),
            ],
        )
    }

    fn multiplicative(&mut self) -> Result<Expr, ParseError> {
        self.binary_level(
            Self::prefix,
            &[
                (TokenKind::Star, BinaryOp::Multiply),
                (TokenKind::Slash, BinaryOp::Divide),
                (TokenKind::Percent, BinaryOp::Modulo),
            ],
        )
    }

    /// One left-associative precedence level.
    fn binary_level(
        &mut self,
        operand: fn(&mut Self) -> Result<Expr, ParseError>,
        ops: &[(TokenKind, BinaryOp)],
    ) -> Result<Expr, ParseError> {
        let mut expr = operand(self)?;

        self.chained(|parser| {
            loop {
                let op = ops
                    .iter()
                    .find(|(kind, _)| parser.check_kind(kind))
                    .map(|(_, op)| *op);

                let Some(op) = op else { break };
                parser.deepen()?;
                parser.advance();
                let right = operand(parser)?;
                expr = binary(expr, op, right);
            }

            Ok(expr)
        })
    }

    fn prefix(&mut self) -> Result<Expr, ParseError> {
        let op = match self.peek_kind() {
            TokenKind::Plus => PrefixOp::Plus,
            TokenKind::Minus => PrefixOp::Minus,
            TokenKind::Bang => PrefixOp::Not,
            TokenKind::Tilde => PrefixOp::BitNot,
            TokenKind::PlusPlus => PrefixOp::Increment,
            TokenKind::MinusMinus => PrefixOp::Decrement,
            _ => return self.postfix(),
        };
        let line = self.advance().line;
        let operand = self.nested(Self::prefix)?;
        Ok(Expr::new(
            ExprKind::Prefix {
                op,
                operand: Box::new(operand),
            },
            line,
        ))
    }

    fn postfix(&mut self) -> Result<Expr, ParseError> {
        let expr = self.primary()?;
        self.chained(|parser| parser.postfix_chain(expr))
    }

    /// Indexing, calls, field accesses and `++`/`--` applied to `expr`.
    fn postfix_chain(&mut self, mut expr: Expr) -> Result<Expr, ParseError> {
        loop {
            let line = expr.line;
            let continues = match self.peek_kind() {
                TokenKind::LeftBracket
                | TokenKind::LeftParen
                | TokenKind::Dot
                | TokenKind::PlusPlus
                | TokenKind::MinusMinus => true,
                TokenKind::Float(_) => self.peek().lexeme.starts_with('.'),
                _ => false,
            };
            if continues {
                self.deepen()?;
            }
            match self.peek_kind().clone() {
                TokenKind::LeftBracket => {
                    self.advance();
                    let index = self.expression()?;
                    self.consume_symbol(TokenKind::RightBracket, "']'")?;
                    expr = Expr::new(
                        ExprKind::Index {
                            base: Box::new(expr),
                            index: Box::new(index),
                        },
                        line,
                    );
                }
                TokenKind::LeftParen => {
                    self.advance();
                    let args = self.arguments()?;
                    expr = Expr::new(
                        ExprKind::Call {
                            callee: Box::new(expr),
                            args,
                        },
                        line,
                    );
                }
                TokenKind::Dot => {
                    self.advance();
                    let name = self.consume_identifier("an identifier")?;
                    expr = Expr::new(
                        ExprKind::Field {
                            base: Box::new(expr),
                            name,
                        },
                        line,
                    );
                }
                // `v.0` lexes as a float literal `.0`; it is a numeric swizzle.
                TokenKind::Float(_) if self.peek().lexeme.starts_with('.') => {
                    let mask = self.advance().lexeme[1..].to_string();
                    expr = Expr::new(
                        ExprKind::Swizzle {
                            base: Box::new(expr),
                            mask,
                        },
                        line,
                    );
                }
                TokenKind::PlusPlus | TokenKind::MinusMinus => {
                    let op = if self.advance().kind == TokenKind::PlusPlus {
                        PostfixOp::Increment
                    } else {
                        PostfixOp::Decrement
                    };
                    expr = Expr::new(
                        ExprKind::Postfix {
                            op,
                            operand: Box::new(expr),
                        },
                        line,
                    );
                }
                _ => break,
            }
        }

        Ok(expr)
    }

    /// Arguments after an opening `(`, through the closing `)`.
    fn arguments(&mut self) -> Result<Vec<Expr>, ParseError> {
        let mut args = Vec::new();
        if !self.check_kind(&TokenKind::RightParen) {
            loop {
                args.push(self.assignment_expression()?);
                if !self.matches_symbol(TokenKind::Comma) {
                    break;
                }
            }
        }
        self.consume_symbol(TokenKind::RightParen, "')'")?;
        Ok(args)
    }

    fn primary(&mut self) -> Result<Expr, ParseError> {
        let line = self.peek().line;
        let kind = match self.peek_kind().clone() {
            TokenKind::Int(value) => ExprKind::Int(value),
            TokenKind::UInt(value) => ExprKind::UInt(value),
            TokenKind::Float(value) => ExprKind::Float(value),
            TokenKind::True => ExprKind::Bool(true),
            TokenKind::False => ExprKind::Bool(false),
            TokenKind::LeftParen => {
                self.advance();
                let expr = self.expression()?;
                self.consume_symbol(TokenKind::RightParen, "')'")?;
                return Ok(expr);
            }
            TokenKind::Identifier(name) => {
                self.advance();
                if self.check_kind(&TokenKind::ColonColon) {
                    self.advance();
                    let member = self.consume_identifier("an identifier")?;
                    return Ok(Expr::new(
                        ExprKind::Identifier(format!("{}::{}", name, member)),
                        line,
                    ));
                }
                if self.is_type_name(&name) && self.matches_symbol(TokenKind::LeftParen) {
                    let args = self.arguments()?;
                    return Ok(Expr::new(
                        ExprKind::Constructor {
                            type_name: name,
                            args,
                        },
                        line,
                    ));
                }
                return Ok(Expr::new(ExprKind::Identifier(name), line));
            }
            _ => return Err(self.expected("expression")),
        };
        self.advance();
        Ok(Expr::new(kind, line))
    }
}

fn binary(left: Expr, op: BinaryOp, right: Expr) -> Expr {
    let line = left.line;
    Expr::new(
        ExprKind::Binary {
            left: Box::new(left),
            op,
            right: Box::new(right),
        },
        line,
    )
}
