use proptest::prelude::*;
use sksl::lexer::token::{ModifierKeyword, TokenKind};

fn kinds(source: &str) -> Vec<TokenKind> {
    sksl::lexer::tokenize(source)
        .into_iter()
        .map(|token| token.kind)
        .collect()
}

#[test]
fn lexes_declaration() {
    assert_eq!(
        kinds("uniform float4 color = float4(1);"),
        vec![
            TokenKind::Modifier(ModifierKeyword::Uniform),
            TokenKind::Identifier("float4".to_string()),
            TokenKind::Identifier("color".to_string()),
            TokenKind::Equal,
            TokenKind::Identifier("float4".to_string()),
            TokenKind::LeftParen,
            TokenKind::Int(1),
            TokenKind::RightParen,
            TokenKind::Semicolon,
            TokenKind::Eof,
        ]
    );
}

#[test]
fn lexes_number_forms() {
    assert_eq!(
        kinds("1 1u 0x1F 2.5 .5 1. 1e3 1.5e-2"),
        vec![
            TokenKind::Int(1),
            TokenKind::UInt(1),
            TokenKind::Int(31),
            TokenKind::Float(2.5),
            TokenKind::Float(0.5),
            TokenKind::Float(1.0),
            TokenKind::Float(1000.0),
            TokenKind::Float(0.015),
            TokenKind::Eof,
        ]
    );
}

#[test]
fn lexes_longest_operator_first() {
    assert_eq!(
        kinds("<<= >>= ^^ && || ++ -- :: != =="),
        vec![
            TokenKind::ShlEqual,
            TokenKind::ShrEqual,
            TokenKind::CaretCaret,
            TokenKind::AmpAmp,
            TokenKind::PipePipe,
            TokenKind::PlusPlus,
            TokenKind::MinusMinus,
            TokenKind::ColonColon,
            TokenKind::BangEqual,
            TokenKind::EqualEqual,
            TokenKind::Eof,
        ]
    );
}

#[test]
fn lexes_static_keywords() {
    assert_eq!(
        kinds("@if @switch @nope"),
        vec![
            TokenKind::StaticIf,
            TokenKind::StaticSwitch,
            TokenKind::Invalid,
            TokenKind::Eof,
        ]
    );
}

#[test]
fn comments_are_skipped_and_lines_counted() {
    let tokens = sksl::lexer::tokenize("a // one\n/* two\nthree */ b\nc");
    let lines: Vec<(String, usize)> = tokens
        .iter()
        .filter(|token| token.kind != TokenKind::Eof)
        .map(|token| (token.lexeme.clone(), token.line))
        .collect();
    assert_eq!(
        lines,
        vec![
            ("a".to_string(), 1),
            ("b".to_string(), 3),
            ("c".to_string(), 4)
        ]
    );
}

#[test]
fn stray_characters_become_invalid_tokens() {
    assert_eq!(
        kinds("a $ b"),
        vec![
            TokenKind::Identifier("a".to_string()),
            TokenKind::Invalid,
            TokenKind::Identifier("b".to_string()),
            TokenKind::Eof,
        ]
    );
}

proptest! {
    #[test]
    fn any_input_ends_with_a_single_eof(source in "\\PC{0,64}") {
        let tokens = sksl::lexer::tokenize(&source);
        prop_assert_eq!(tokens.last().map(|t| &t.kind), Some(&TokenKind::Eof));
        prop_assert_eq!(
            tokens.iter().filter(|t| t.kind == TokenKind::Eof).count(),
            1
        );
    }

    #[test]
    fn integers_lex_to_their_value(value in 0i64..1_000_000) {
        prop_assert_eq!(
            kinds(&value.to_string()),
            vec![TokenKind::Int(value), TokenKind::Eof]
        );
    }

    #[test]
    fn line_numbers_never_decrease(source in "[a-z0-9 \n;{}()]{0,80}") {
        let tokens = sksl::lexer::tokenize(&source);
        for pair in tokens.windows(2) {
            prop_assert!(pair[0].line <= pair[1].line);
        }
    }
}
