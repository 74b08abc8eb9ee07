//! Replacement fields inside f-strings.
//!
//! The lexer hands an f-string over as the source text between its quotes.
//! Here that text is split into literal runs and `{...}` fields, and each
//! field's expression goes through a parser of its own, so `f'{x+1}'` and
//! `f'{x + 1}'` end up as the same tree.

use super::{ParseError, Parser};
use crate::{
    ast::{Expr, FStringPart},
    lexer::{Lexer, Position},
};

/// A format spec may hold fields, and their specs fields again, but no
/// deeper.
const MAX_SPEC_NESTING: usize = 2;

impl Parser {
    pub(super) fn parse_fstring(
        &self,
        body: &str,
        raw: bool,
        position: Position,
    ) -> Result<Vec<FStringPart>, ParseError> {
        let mut reader = FieldReader {
            chars: body.chars().collect(),
            index: 0,
            raw,
            depth: self.depth,
            position,
        };
        reader.parts(0)
    }
}

/// Appends `part`, merging it into a preceding literal and dropping empty
/// text.
pub(super) fn push_part(parts: &mut Vec<FStringPart>, part: FStringPart) {
    if let FStringPart::Literal(text) = &part {
        if text.is_empty() {
            return;
        }
        if let Some(FStringPart::Literal(last)) = parts.last_mut() {
            last.push_str(text);
            return;
        }
    }
    parts.push(part);
}

struct FieldReader {
    chars: Vec<char>,
    index: usize,
    raw: bool,
    depth: usize,
    position: Position,
}

impl FieldReader {
    fn current(&self) -> Option<char> {
        self.chars.get(self.index).copied()
    }

    fn peek(&self, offset: usize) -> Option<char> {
        self.chars.get(self.index + offset).copied()
    }

    fn text(&self, start: usize) -> String {
        self.chars[start..self.index].iter().collect()
    }

    fn error(&self, message: &str) -> ParseError {
        ParseError::Invalid {
            message: format!("f-string: {message}"),
            position: self.position,
        }
    }

    /// Literal text and fields up to the end of the body, or up to the `}`
    /// that closes a format spec when `spec_level` is above zero.
    fn parts(&mut self, spec_level: usize) -> Result<Vec<FStringPart>, ParseError> {
        let mut parts = Vec::new();
        let mut text = String::new();
        while let Some(ch) = self.current() {
            let doubled = spec_level == 0 && self.peek(1) == Some(ch);
            match ch {
                '{' | '}' if doubled => {
                    text.push(ch);
                    self.index += 2;
                }
                '{' => {
                    if spec_level == MAX_SPEC_NESTING {
                        return Err(self.error("expressions nested too deeply"));
                    }
                    self.flush(&mut text, &mut parts)?;
                    self.index += 1;
                    for part in self.field(spec_level)? {
                        push_part(&mut parts, part);
                    }
                }
                '}' if spec_level > 0 => break,
                '}' => return Err(self.error("single '}' is not allowed")),
                '\\' if !self.raw => self.escape(&mut text),
                _ => {
                    text.push(ch);
                    self.index += 1;
                }
            }
        }
        self.flush(&mut text, &mut parts)?;
        Ok(parts)
    }

    /// Copies an escape sequence whole, so that `\\{` still opens a field
    /// and the braces of `\N{...}` never do.
    fn escape(&mut self, text: &mut String) {
        text.push('\\');
        self.index += 1;
        let Some(next) = self.current().filter(|&c| !matches!(c, '{' | '}')) else {
            return;
        };
        text.push(next);
        self.index += 1;
        if next == 'N' && self.current() == Some('{') {
            while let Some(ch) = self.current() {
                text.push(ch);
                self.index += 1;
                if ch == '}' {
                    break;
                }
            }
        }
    }

    fn flush(&self, text: &mut String, parts: &mut Vec<FStringPart>) -> Result<(), ParseError> {
        if text.is_empty() {
            return Ok(());
        }
        let literal = if self.raw {
            std::mem::take(text)
        } else {
            let decoded =
                Lexer::decode_escapes(text).map_err(|_| self.error("invalid escape sequence"))?;
            text.clear();
            decoded
        };
        push_part(parts, FStringPart::Literal(literal));
        Ok(())
    }

    /// One replacement field, after its opening brace.
    fn field(&mut self, spec_level: usize) -> Result<Vec<FStringPart>, ParseError> {
        let start = self.index;
        self.skip_expression()?;
        let source = self.text(start);
        if source.trim().is_empty() {
            return Err(self.error("empty expression not allowed"));
        }
        let value = self.expression(&source)?;

        let mut parts = Vec::new();
        let debug = self.current() == Some('=');
        if debug {
            self.index += 1;
            while self.current().is_some_and(char::is_whitespace) {
                self.index += 1;
            }
            parts.push(FStringPart::Literal(self.text(start)));
        }

        let mut conversion = None;
        if self.current() == Some('!') {
            match self.peek(1) {
                Some(c @ ('r' | 's' | 'a')) => {
                    conversion = Some(c);
                    self.index += 2;
                }
                _ => {
                    return Err(
                        self.error("invalid conversion character: expected 's', 'r', or 'a'")
                    );
                }
            }
        }

        let mut format_spec = None;
        if self.current() == Some(':') {
            self.index += 1;
            format_spec = Some(self.parts(spec_level + 1)?);
        }
        if self.current() != Some('}') {
            return Err(self.error("expecting '}'"));
        }
        self.index += 1;

        if debug && conversion.is_none() && format_spec.is_none() {
            conversion = Some('r');
        }
        parts.push(FStringPart::Value {
            value: Box::new(value),
            conversion,
            format_spec,
        });
        Ok(parts)
    }

    /// Stops on whatever ends the field's expression: `}`, a conversion
    /// `!`, a spec `:` or a debug `=`, outside brackets and nested strings.
    fn skip_expression(&mut self) -> Result<(), ParseError> {
        let mut brackets = 0usize;
        let mut quote = None;
        while let Some(ch) = self.current() {
            if let Some(open) = quote {
                if ch == '\\' {
                    self.index += 1;
                } else if ch == open {
                    quote = None;
                }
                self.index += 1;
                continue;
            }
            match ch {
                '\'' | '"' => quote = Some(ch),
                '(' | '[' | '{' => brackets += 1,
                ')' | ']' | '}' if brackets > 0 => brackets -= 1,
                '}' => return Ok(()),
                '!' if brackets == 0 && self.peek(1) != Some('=') => return Ok(()),
                ':' if brackets == 0 => return Ok(()),
                '=' if brackets == 0 && self.at_debug_marker() => return Ok(()),
                '#' => return Err(self.error("expression part cannot include '#'")),
                _ => {}
            }
            self.index += 1;
        }
        Err(self.error("expecting '}'"))
    }

    /// An `=` that is not part of an operator and is followed only by
    /// whitespace before the field's `}`, `!` or `:`.
    fn at_debug_marker(&self) -> bool {
        let after_operator = self
            .index
            .checked_sub(1)
            .and_then(|before| self.chars.get(before))
            .is_some_and(|&c| matches!(c, '=' | '!' | '<' | '>'));
        if after_operator || self.peek(1) == Some('=') {
            return false;
        }
        self.chars[self.index + 1..]
            .iter()
            .find(|c| !c.is_whitespace())
            .is_some_and(|&c| matches!(c, '}' | '!' | ':'))
    }

    /// Parses a field's expression, parenthesized so that tuples, `yield`
    /// and line breaks read the way they do between brackets.
    fn expression(&self, source: &str) -> Result<Expr, ParseError> {
        let wrapped = format!("({source})");
        let mut parser = Parser::new(Lexer::new(&wrapped)).map_err(|error| self.relocate(error))?;
        parser.depth = self.depth;
        let expr = parser
            .parse_expression()
            .map_err(|error| self.relocate(error))?;
        parser.expect_end().map_err(|error| self.relocate(error))?;
        Ok(expr)
    }

    /// Positions from a field's own parser point into the field text, so
    /// errors are reported at the string instead.
    fn relocate(&self, error: ParseError) -> ParseError {
        match error {
            ParseError::Invalid { message, .. } => ParseError::Invalid {
                message,
                position: self.position,
            },
            ParseError::Unexpected {
                expected, found, ..
            } => ParseError::Unexpected {
                expected,
                found,
                position: self.position,
            },
            ParseError::Lex(_) => self.error("invalid expression"),
        }
    }
}
