use std::collections::VecDeque;
use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

use crate::ast::Token;

static DECIMAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:0(?:_?0)*|[1-9](?:_?[0-9])*)$").expect("valid regex"));

static RADIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^0(?:[xX](?:_?[0-9a-fA-F])+|[oO](?:_?[0-7])+|[bB](?:_?[01])+)$")
        .expect("valid regex")
});

static FLOAT: LazyLock<Regex> = LazyLock::new(|| {
    let digits = r"[0-9](?:_?[0-9])*";
    let exponent = format!(r"[eE][+-]?{digits}");
    Regex::new(&format!(
        r"^(?:(?:{digits})?\.{digits}(?:{exponent})?|{digits}\.(?:{exponent})?|{digits}{exponent})$"
    ))
    .expect("valid regex")
});

static DIGITS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9](?:_?[0-9])*$").expect("valid regex"));

/// Where a token starts: 1-based line, 0-based column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SpannedToken {
    pub token: Token,
    pub position: Position,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LexError {
    #[error("unexpected character {character:?} at {position}")]
    UnexpectedCharacter { character: char, position: Position },

    #[error("unterminated string literal starting at {position}")]
    UnterminatedString { position: Position },

    #[error("invalid escape sequence at {position}")]
    InvalidEscape { position: Position },

    #[error("bytes can only contain ASCII literal characters at {position}")]
    NonAsciiBytes { position: Position },

    #[error("invalid numeric literal {literal:?} at {position}")]
    InvalidNumber { literal: String, position: Position },

    #[error("unindent does not match any outer indentation level at {position}")]
    InconsistentDedent { position: Position },

    #[error("unmatched {character:?} at {position}")]
    UnmatchedBracket { character: char, position: Position },

    #[error("{character:?} opened at {position} was never closed")]
    UnclosedBracket { character: char, position: Position },

    #[error("unexpected end of input after line continuation at {position}")]
    ContinuationAtEof { position: Position },
}

/// Python tokenizer.
///
/// Produces `Newline` at the end of every logical line and `Indent` /
/// `Dedent` when the indentation of a logical line changes. Blank and
/// comment-only lines produce nothing, and line breaks inside brackets or
/// after a backslash do not end the logical line.
pub struct Lexer {
    input: Vec<char>,
    position: usize,
    line: usize,
    column: usize,
    indents: Vec<usize>,
    brackets: Vec<(char, Position)>,
    pending: VecDeque<SpannedToken>,
    at_line_start: bool,
    line_has_tokens: bool,
    finished: bool,
}

impl Lexer {
    pub fn new(input: &str) -> Self {
        let normalized = input.replace("\r\n", "\n").replace('\r', "\n");
        Lexer {
            input: normalized.chars().collect(),
            position: 0,
            line: 1,
            column: 0,
            indents: vec![0],
            brackets: Vec::new(),
            pending: VecDeque::new(),
            at_line_start: true,
            line_has_tokens: false,
            finished: false,
        }
    }

    fn current_char(&self) -> Option<char> {
        self.input.get(self.position).copied()
    }

    fn peek_char(&self, offset: usize) -> Option<char> {
        self.input.get(self.position + offset).copied()
    }

    fn advance(&mut self) {
        if let Some(ch) = self.current_char() {
            self.position += 1;
            if ch == '\n' {
                self.line += 1;
                self.column = 0;
            } else {
                self.column += 1;
            }
        }
    }

    fn here(&self) -> Position {
        Position {
            line: self.line,
            column: self.column,
        }
    }

    fn push_pending(&mut self, token: Token, position: Position) {
        self.pending.push_back(SpannedToken { token, position });
    }

    /// Collects every token up to and including `Eof`.
    pub fn tokenize(mut self) -> Result<Vec<SpannedToken>, LexError> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token()?;
            let done = token.token == Token::Eof;
            tokens.push(token);
            if done {
                return Ok(tokens);
            }
        }
    }

    pub fn next_token(&mut self) -> Result<SpannedToken, LexError> {
        loop {
            if let Some(token) = self.pending.pop_front() {
                return Ok(token);
            }
            if self.finished {
                return Ok(SpannedToken {
                    token: Token::Eof,
                    position: self.here(),
                });
            }
            if self.at_line_start && self.brackets.is_empty() {
                self.at_line_start = false;
                self.read_indentation()?;
                continue;
            }

            self.skip_inline_whitespace();
            let start = self.here();
            let Some(ch) = self.current_char() else {
                self.finish(start)?;
                continue;
            };

            match ch {
                '#' => {
                    self.skip_comment();
                    continue;
                }
                '\\' => {
                    match self.peek_char(1) {
                        Some('\n') => {
                            self.advance();
                            self.advance();
                        }
                        None => return Err(LexError::ContinuationAtEof { position: start }),
                        Some(_) => {
                            return Err(LexError::UnexpectedCharacter {
                                character: ch,
                                position: start,
                            });
                        }
                    }
                    continue;
                }
                '\n' => {
                    self.advance();
                    if !self.brackets.is_empty() {
                        continue;
                    }
                    self.at_line_start = true;
                    if !self.line_has_tokens {
                        continue;
                    }
                    self.line_has_tokens = false;
                    return Ok(SpannedToken {
                        token: Token::Newline,
                        position: start,
                    });
                }
                _ => {}
            }

            let token = self.read_token(ch, start)?;
            self.line_has_tokens = true;
            return Ok(SpannedToken {
                token,
                position: start,
            });
        }
    }

    /// Measures the leading whitespace of a line and queues `Indent` or
    /// `Dedent` tokens. Blank and comment-only lines are consumed whole.
    fn read_indentation(&mut self) -> Result<(), LexError> {
        let mut width = 0;
        while let Some(ch) = self.current_char() {
            match ch {
                ' ' => width += 1,
                '\t' => width = (width / 8 + 1) * 8,
                '\x0c' => width = 0,
                _ => break,
            }
            self.advance();
        }

        match self.current_char() {
            None => return Ok(()),
            Some('#') | Some('\n') => {
                self.skip_comment();
                if self.current_char() == Some('\n') {
                    self.advance();
                    self.at_line_start = true;
                }
                return Ok(());
            }
            Some(_) => {}
        }

        let position = self.here();
        let current = self.indents.last().copied().unwrap_or(0);
        if width > current {
            self.indents.push(width);
            self.push_pending(Token::Indent, position);
        } else if width < current {
            while self.indents.last().is_some_and(|&level| level > width) {
                self.indents.pop();
                self.push_pending(Token::Dedent, position);
            }
            if self.indents.last().copied().unwrap_or(0) != width {
                return Err(LexError::InconsistentDedent { position });
            }
        }
        Ok(())
    }

    fn finish(&mut self, position: Position) -> Result<(), LexError> {
        if let Some(&(character, opened)) = self.brackets.last() {
            return Err(LexError::UnclosedBracket {
                character,
                position: opened,
            });
        }
        if self.line_has_tokens {
            self.line_has_tokens = false;
            self.push_pending(Token::Newline, position);
        }
        while self.indents.len() > 1 {
            self.indents.pop();
            self.push_pending(Token::Dedent, position);
        }
        self.finished = true;
        Ok(())
    }

    fn skip_inline_whitespace(&mut self) {
        while let Some(' ' | '\t' | '\x0c') = self.current_char() {
            self.advance();
        }
    }

    /// Skips to (not past) the end of the line.
    fn skip_comment(&mut self) {
        while let Some(ch) = self.current_char() {
            if ch == '\n' {
                break;
            }
            self.advance();
        }
    }

    fn read_token(&mut self, ch: char, start: Position) -> Result<Token, LexError> {
        if ch.is_alphabetic() || ch == '_' {
            if let Some(prefix_len) = self.string_prefix_len() {
                let prefix: String = self.input[self.position..self.position + prefix_len]
                    .iter()
                    .collect();
                for _ in 0..prefix_len {
                    self.advance();
                }
                return self.read_string(&prefix, start);
            }
            let identifier = self.read_identifier();
            return Ok(Token::keyword(&identifier).unwrap_or(Token::Name(identifier)));
        }
        if ch == '\'' || ch == '"' {
            return self.read_string("", start);
        }
        if ch.is_ascii_digit() || (ch == '.' && self.peek_char(1).is_some_and(|c| c.is_ascii_digit()))
        {
            return self.read_number(start);
        }
        self.read_operator(ch, start)
    }

    fn read_identifier(&mut self) -> String {
        let mut result = String::new();
        while let Some(ch) = self.current_char() {
            if ch.is_alphanumeric() || ch == '_' {
                result.push(ch);
                self.advance();
            } else {
                break;
            }
        }
        result
    }

    /// Length of a string prefix (`r`, `b`, `f`, `u`, `rb`, `fr`, ...) that
    /// starts at the current position and is directly followed by a quote.
    fn string_prefix_len(&self) -> Option<usize> {
        let is_quote = |c: Option<char>| matches!(c, Some('\'' | '"'));
        let first = self.current_char()?.to_ascii_lowercase();
        if matches!(first, 'r' | 'b' | 'u' | 'f') && is_quote(self.peek_char(1)) {
            return Some(1);
        }
        let second = self.peek_char(1)?.to_ascii_lowercase();
        let pair = [first, second];
        let valid = matches!(
            pair,
            ['r', 'b'] | ['b', 'r'] | ['r', 'f'] | ['f', 'r']
        );
        (valid && is_quote(self.peek_char(2))).then_some(2)
    }

    fn read_string(&mut self, prefix: &str, start: Position) -> Result<Token, LexError> {
        let prefix = prefix.to_ascii_lowercase();
        let raw = prefix.contains('r');
        let bytes = prefix.contains('b');
        let formatted = prefix.contains('f');

        let Some(quote) = self.current_char() else {
            return Err(LexError::UnterminatedString { position: start });
        };
        self.advance();
        let triple = self.current_char() == Some(quote) && self.peek_char(1) == Some(quote);
        if triple {
            self.advance();
            self.advance();
        }

        let mut text = String::new();
        loop {
            let Some(ch) = self.current_char() else {
                return Err(LexError::UnterminatedString { position: start });
            };
            if ch == quote {
                if !triple {
                    self.advance();
                    break;
                }
                if self.peek_char(1) == Some(quote) && self.peek_char(2) == Some(quote) {
                    for _ in 0..3 {
                        self.advance();
                    }
                    break;
                }
            }
            if ch == '\n' && !triple {
                return Err(LexError::UnterminatedString { position: start });
            }
            if bytes && !ch.is_ascii() {
                return Err(LexError::NonAsciiBytes { position: self.here() });
            }
            if ch == '\\' {
                let Some(next) = self.peek_char(1) else {
                    return Err(LexError::UnterminatedString { position: start });
                };
                if raw || formatted {
                    text.push('\\');
                    text.push(next);
                    self.advance();
                    self.advance();
                } else {
                    self.advance();
                    self.read_escape(&mut text, bytes)?;
                }
                continue;
            }
            text.push(ch);
            self.advance();
        }

        Ok(if formatted {
            Token::FString { body: text, raw }
        } else if bytes {
            Token::Bytes(text.chars().map(|c| c as u32 as u8).collect())
        } else {
            Token::Str(text)
        })
    }

    /// Decodes the escape sequence after a backslash into `text`.
    ///
    /// Unknown escapes keep their backslash, as Python does.
    fn read_escape(&mut self, text: &mut String, bytes: bool) -> Result<(), LexError> {
        let position = self.here();
        let Some(ch) = self.current_char() else {
            return Err(LexError::InvalidEscape { position });
        };
        self.advance();
        let simple = match ch {
            '\n' => return Ok(()),
            '\\' | '\'' | '"' => Some(ch),
            'a' => Some('\x07'),
            'b' => Some('\x08'),
            'f' => Some('\x0c'),
            'n' => Some('\n'),
            'r' => Some('\r'),
            't' => Some('\t'),
            'v' => Some('\x0b'),
            _ => None,
        };
        if let Some(decoded) = simple {
            text.push(decoded);
            return Ok(());
        }

        let code = match ch {
            '0'..='7' => {
                let mut digits = String::from(ch);
                while digits.len() < 3 {
                    match self.current_char() {
                        Some(d @ '0'..='7') => {
                            digits.push(d);
                            self.advance();
                        }
                        _ => break,
                    }
                }
                u32::from_str_radix(&digits, 8).ok()
            }
            'x' => self.read_hex_escape(2),
            'u' if !bytes => self.read_hex_escape(4),
            'U' if !bytes => self.read_hex_escape(8),
            _ => {
                text.push('\\');
                text.push(ch);
                return Ok(());
            }
        };

        let limit = if bytes { 0xff } else { u32::MAX };
        match code.filter(|&c| c <= limit).and_then(char::from_u32) {
            Some(decoded) => {
                text.push(decoded);
                Ok(())
            }
            None => Err(LexError::InvalidEscape { position }),
        }
    }

    /// Decodes the escapes in literal f-string text, which the lexer keeps
    /// verbatim until the parser has split off the replacement fields.
    pub(crate) fn decode_escapes(text: &str) -> Result<String, LexError> {
        let mut lexer = Lexer::new(text);
        let mut decoded = String::with_capacity(text.len());
        while let Some(ch) = lexer.current_char() {
            lexer.advance();
            if ch == '\\' {
                lexer.read_escape(&mut decoded, false)?;
            } else {
                decoded.push(ch);
            }
        }
        Ok(decoded)
    }

    fn read_hex_escape(&mut self, width: usize) -> Option<u32> {
        let mut digits = String::new();
        for _ in 0..width {
            let ch = self.current_char().filter(char::is_ascii_hexdigit)?;
            digits.push(ch);
            self.advance();
        }
        u32::from_str_radix(&digits, 16).ok()
    }

    fn read_number(&mut self, start: Position) -> Result<Token, LexError> {
        let mut literal = String::new();
        while let Some(ch) = self.current_char() {
            let exponent_sign = matches!(ch, '+' | '-')
                && literal.ends_with(['e', 'E'])
                && !RADIX.is_match(&literal);
            if ch.is_ascii_alphanumeric() || ch == '_' || ch == '.' || exponent_sign {
                literal.push(ch);
                self.advance();
            } else {
                break;
            }
        }
        parse_number(&literal).ok_or(LexError::InvalidNumber {
            literal,
            position: start,
        })
    }

    fn read_operator(&mut self, ch: char, start: Position) -> Result<Token, LexError> {
        for width in (1..=3).rev() {
            let Some(candidate) = self.input.get(self.position..self.position + width) else {
                continue;
            };
            let candidate: String = candidate.iter().collect();
            let Some(token) = Token::operator(&candidate) else {
                continue;
            };
            for _ in 0..width {
                self.advance();
            }
            self.track_bracket(&token, ch, start)?;
            return Ok(token);
        }
        Err(LexError::UnexpectedCharacter {
            character: ch,
            position: start,
        })
    }

    fn track_bracket(&mut self, token: &Token, ch: char, start: Position) -> Result<(), LexError> {
        let opener = match token {
            Token::LParen | Token::LBracket | Token::LBrace => {
                self.brackets.push((ch, start));
                return Ok(());
            }
            Token::RParen => '(',
            Token::RBracket => '[',
            Token::RBrace => '{',
            _ => return Ok(()),
        };
        match self.brackets.pop() {
            Some((open, _)) if open == opener => Ok(()),
            _ => Err(LexError::UnmatchedBracket {
                character: ch,
                position: start,
            }),
        }
    }
}

/// Interprets a complete numeric literal, underscores and all.
fn parse_number(literal: &str) -> Option<Token> {
    let clean = literal.replace('_', "");
    if DECIMAL.is_match(literal) {
        return match clean.parse::<i128>() {
            Ok(value) => Some(Token::Int(value)),
            Err(_) => big_decimal(&clean, 10).map(Token::BigInt),
        };
    }
    if RADIX.is_match(literal) {
        let radix = match clean.as_bytes().get(1)?.to_ascii_lowercase() {
            b'x' => 16,
            b'o' => 8,
            _ => 2,
        };
        return match i128::from_str_radix(&clean[2..], radix) {
            Ok(value) => Some(Token::Int(value)),
            Err(_) => big_decimal(&clean[2..], radix).map(Token::BigInt),
        };
    }
    if FLOAT.is_match(literal) {
        return clean.parse::<f64>().ok().map(Token::Float);
    }
    let coefficient = literal.strip_suffix(['j', 'J'])?;
    if FLOAT.is_match(coefficient) || DIGITS.is_match(coefficient) {
        return clean[..clean.len() - 1].parse::<f64>().ok().map(Token::Imaginary);
    }
    None
}

/// Decimal spelling of an arbitrarily long integer given in `radix`.
fn big_decimal(digits: &str, radix: u32) -> Option<String> {
    const BASE: u64 = 1_000_000_000;

    // Little-endian limbs, each below BASE.
    let mut limbs: Vec<u64> = vec![0];
    for ch in digits.chars() {
        let mut carry = u64::from(ch.to_digit(radix)?);
        for limb in &mut limbs {
            let value = *limb * u64::from(radix) + carry;
            *limb = value % BASE;
            carry = value / BASE;
        }
        while carry > 0 {
            limbs.push(carry % BASE);
            carry /= BASE;
        }
    }

    let mut text = limbs.last()?.to_string();
    for limb in limbs.iter().rev().skip(1) {
        text.push_str(&format!("{limb:09}"));
    }
    Some(text)
}

#[test]
fn test_keywords_and_soft_keywords() {
    let mut lexer = Lexer::new("if match");
    assert_eq!(lexer.next_token().unwrap().token, Token::If);
    assert_eq!(
        lexer.next_token().unwrap().token,
        Token::Name("match".to_string())
    );
}

#[test]
fn test_number_forms() {
    assert_eq!(parse_number("0x_ff"), Some(Token::Int(255)));
    assert_eq!(parse_number("1_000"), Some(Token::Int(1000)));
    assert_eq!(parse_number("1e-5"), Some(Token::Float(1e-5)));
    assert_eq!(parse_number("2j"), Some(Token::Imaginary(2.0)));
    assert_eq!(parse_number("0777"), None);
    assert_eq!(
        parse_number("340282366920938463463374607431768211456"),
        Some(Token::BigInt("340282366920938463463374607431768211456".to_string()))
    );
    assert_eq!(
        parse_number("0x1_0000_0000_0000_0000_0000_0000_0000_0000"),
        Some(Token::BigInt("340282366920938463463374607431768211456".to_string()))
    );
}
