// tests/lexer_tests.rs

use indoc::indoc;
use pretty_assertions::assert_eq;
use py_query::ast::Token;
use py_query::lexer::{LexError, Lexer, Position};

fn tokens(source: &str) -> Vec<Token> {
    Lexer::new(source)
        .tokenize()
        .unwrap()
        .into_iter()
        .map(|spanned| spanned.token)
        .collect()
}

fn name(text: &str) -> Token {
    Token::Name(text.to_string())
}

// ============================================================================
// Operators and Delimiters
// ============================================================================

#[test]
fn test_operator_tokens() {
    let test_cases = vec![
        ("+", Token::Plus),
        ("**", Token::DoubleStar),
        ("//", Token::DoubleSlash),
        ("**=", Token::DoubleStarEqual),
        ("->", Token::Arrow),
        (":=", Token::ColonEqual),
        ("!=", Token::NotEqual),
        ("<<=", Token::LeftShiftEqual),
        ("...", Token::Ellipsis),
        ("@", Token::At),
    ];

    for (input, expected) in test_cases {
        let mut lexer = Lexer::new(input);
        assert_eq!(lexer.next_token().unwrap().token, expected, "Failed for input: {input}");
        assert_eq!(lexer.next_token().unwrap().token, Token::Newline);
        assert_eq!(lexer.next_token().unwrap().token, Token::Eof);
    }
}

#[test]
fn test_longest_operator_wins() {
    assert_eq!(
        tokens("a<<=b"),
        vec![name("a"), Token::LeftShiftEqual, name("b"), Token::Newline, Token::Eof]
    );
}

// ============================================================================
// Names and Keywords
// ============================================================================

#[test]
fn test_keywords_are_distinct_tokens() {
    assert_eq!(
        tokens("not x in y"),
        vec![Token::Not, name("x"), Token::In, name("y"), Token::Newline, Token::Eof]
    );
}

#[test]
fn test_soft_keywords_are_names() {
    assert_eq!(
        tokens("match case _"),
        vec![name("match"), name("case"), name("_"), Token::Newline, Token::Eof]
    );
}

#[test]
fn test_unicode_identifiers() {
    assert_eq!(tokens("größe"), vec![name("größe"), Token::Newline, Token::Eof]);
}

// ============================================================================
// Numbers
// ============================================================================

#[test]
fn test_number_literals() {
    let test_cases = vec![
        ("42", Token::Int(42)),
        ("1_000", Token::Int(1000)),
        ("0xff", Token::Int(255)),
        ("0o17", Token::Int(15)),
        ("0b101", Token::Int(5)),
        ("3.25", Token::Float(3.25)),
        (".5", Token::Float(0.5)),
        ("5.", Token::Float(5.0)),
        ("1e3", Token::Float(1000.0)),
        ("2.5E-2", Token::Float(0.025)),
        ("4j", Token::Imaginary(4.0)),
        ("1.5j", Token::Imaginary(1.5)),
    ];

    for (input, expected) in test_cases {
        let mut lexer = Lexer::new(input);
        assert_eq!(lexer.next_token().unwrap().token, expected, "Failed for input: {input}");
    }
}

#[test]
fn test_invalid_numbers() {
    for input in ["1_", "0x", "08", "1e"] {
        let result = Lexer::new(input).tokenize();
        assert!(
            matches!(result, Err(LexError::InvalidNumber { .. })),
            "Expected an invalid number for {input}, got {result:?}"
        );
    }
}

// ============================================================================
// Strings
// ============================================================================

#[test]
fn test_string_escapes() {
    assert_eq!(tokens(r"'a\nb'")[0], Token::Str("a\nb".to_string()));
    assert_eq!(tokens(r#""q\"uote""#)[0], Token::Str("q\"uote".to_string()));
    assert_eq!(tokens(r"'\x41\u00e9'")[0], Token::Str("Aé".to_string()));
    assert_eq!(tokens(r"'\d'")[0], Token::Str("\\d".to_string()));
}

#[test]
fn test_string_prefixes() {
    assert_eq!(tokens(r"r'a\nb'")[0], Token::Str("a\\nb".to_string()));
    assert_eq!(tokens(r"b'\x00z'")[0], Token::Bytes(vec![0, b'z']));
    assert_eq!(tokens(r"Rb'\n'")[0], Token::Bytes(vec![b'\\', b'n']));
    assert_eq!(
        tokens("f'{x!r}'")[0],
        Token::FString {
            body: "{x!r}".to_string(),
            raw: false
        }
    );
}

#[test]
fn test_triple_quoted_string() {
    let source = "s = \"\"\"one\n'two'\"\"\"";
    assert_eq!(
        tokens(source),
        vec![
            name("s"),
            Token::Equal,
            Token::Str("one\n'two'".to_string()),
            Token::Newline,
            Token::Eof
        ]
    );
}

#[test]
fn test_unterminated_string() {
    assert!(matches!(
        Lexer::new("x = 'abc").tokenize(),
        Err(LexError::UnterminatedString { .. })
    ));
    assert!(matches!(
        Lexer::new("x = 'abc\ny'").tokenize(),
        Err(LexError::UnterminatedString { .. })
    ));
}

#[test]
fn test_non_ascii_bytes() {
    assert!(matches!(
        Lexer::new("b'é'").tokenize(),
        Err(LexError::NonAsciiBytes { .. })
    ));
}

// ============================================================================
// Layout
// ============================================================================

#[test]
fn test_indent_and_dedent() {
    let source = indoc! {"
        if x:
            y
        z
    "};
    assert_eq!(
        tokens(source),
        vec![
            Token::If,
            name("x"),
            Token::Colon,
            Token::Newline,
            Token::Indent,
            name("y"),
            Token::Newline,
            Token::Dedent,
            name("z"),
            Token::Newline,
            Token::Eof,
        ]
    );
}

#[test]
fn test_dedents_close_at_end_of_input() {
    let source = "def f():\n    if x:\n        pass";
    let tokens = tokens(source);
    let tail = &tokens[tokens.len() - 4..];
    assert_eq!(tail, &[Token::Newline, Token::Dedent, Token::Dedent, Token::Eof]);
}

#[test]
fn test_blank_and_comment_lines_are_skipped() {
    let source = "a\n\n    # indented comment\nb  # trailing\n";
    assert_eq!(
        tokens(source),
        vec![name("a"), Token::Newline, name("b"), Token::Newline, Token::Eof]
    );
}

#[test]
fn test_brackets_join_lines() {
    let source = "f(a,\n      b)\n";
    assert_eq!(
        tokens(source),
        vec![
            name("f"),
            Token::LParen,
            name("a"),
            Token::Comma,
            name("b"),
            Token::RParen,
            Token::Newline,
            Token::Eof
        ]
    );
}

#[test]
fn test_backslash_continuation() {
    assert_eq!(
        tokens("x = 1 + \\\n    2"),
        vec![
            name("x"),
            Token::Equal,
            Token::Int(1),
            Token::Plus,
            Token::Int(2),
            Token::Newline,
            Token::Eof
        ]
    );
}

#[test]
fn test_inconsistent_dedent() {
    let source = "if x:\n    a\n  b\n";
    assert!(matches!(
        Lexer::new(source).tokenize(),
        Err(LexError::InconsistentDedent { .. })
    ));
}

#[test]
fn test_bracket_errors() {
    assert!(matches!(
        Lexer::new("(a").tokenize(),
        Err(LexError::UnclosedBracket { character: '(', .. })
    ));
    assert!(matches!(
        Lexer::new("a)").tokenize(),
        Err(LexError::UnmatchedBracket { character: ')', .. })
    ));
    assert!(matches!(
        Lexer::new("[a)").tokenize(),
        Err(LexError::UnmatchedBracket { .. })
    ));
}

#[test]
fn test_unexpected_character() {
    assert_eq!(
        Lexer::new("a $ b").tokenize(),
        Err(LexError::UnexpectedCharacter {
            character: '$',
            position: Position { line: 1, column: 2 },
        })
    );
}

// ============================================================================
// Positions
// ============================================================================

#[test]
fn test_token_positions() {
    let spanned = Lexer::new("a\nbc = 1").tokenize().unwrap();
    assert_eq!(spanned[0].position, Position { line: 1, column: 0 });
    assert_eq!(spanned[2].token, name("bc"));
    assert_eq!(spanned[2].position, Position { line: 2, column: 0 });
    assert_eq!(spanned[3].position, Position { line: 2, column: 3 });
}
