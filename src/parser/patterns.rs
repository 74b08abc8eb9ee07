use super::{ParseError, Parser};
use crate::{
    ast::{Expr, MatchCase, Operator, Pattern, Stmt, Token, UnaryOp},
    value::Value,
};

impl Parser {
    /// Tries to read a `match` statement at the soft keyword `match`.
    ///
    /// Returns `Ok(None)` with the position restored when the line turns
    /// out to use `match` as an ordinary name. Once `match <subject>:`
    /// followed by an indented `case` has been seen, errors are reported.
    pub(super) fn try_parse_match(&mut self) -> Result<Option<Stmt>, ParseError> {
        let start = self.position;
        self.advance();
        let Ok(subject) = self.parse_match_subject() else {
            self.position = start;
            return Ok(None);
        };
        let opens_block = matches!(
            (self.current(), self.peek(1), self.peek(2), self.peek(3)),
            (Token::Colon, Token::Newline, Token::Indent, Token::Name(word)) if word == "case"
        );
        if !opens_block {
            self.position = start;
            return Ok(None);
        }
        for _ in 0..3 {
            self.advance();
        }

        let mut cases = Vec::new();
        while self.check_soft_keyword("case") {
            cases.push(self.parse_case_block()?);
            self.skip_newlines();
        }
        self.expect(Token::Dedent)?;
        tracing::trace!(cases = cases.len(), "parsed match statement");
        Ok(Some(Stmt::Match { subject, cases }))
    }

    fn parse_match_subject(&mut self) -> Result<Expr, ParseError> {
        let first = self.parse_star_named_expression()?;
        if !self.check(&Token::Comma) {
            return Ok(first);
        }
        let mut elements = vec![first];
        while self.eat(&Token::Comma) {
            if self.check(&Token::Colon) {
                break;
            }
            elements.push(self.parse_star_named_expression()?);
        }
        Ok(Expr::Tuple(elements))
    }

    pub(super) fn parse_case_block(&mut self) -> Result<MatchCase, ParseError> {
        if !self.check_soft_keyword("case") {
            return Err(self.unexpected("'case'"));
        }
        self.advance();
        let pattern = self.parse_case_patterns()?;
        let guard = if self.eat(&Token::If) {
            Some(self.parse_named_expression()?)
        } else {
            None
        };
        self.expect(Token::Colon)?;
        let body = self.parse_block()?;
        Ok(MatchCase {
            pattern,
            guard,
            body,
        })
    }

    /// The pattern of a `case`, where a bare comma list is a sequence.
    pub(super) fn parse_case_patterns(&mut self) -> Result<Pattern, ParseError> {
        let first = self.parse_maybe_star_pattern()?;
        if !self.check(&Token::Comma) {
            if matches!(first, Pattern::MatchStar(_)) {
                return Err(self.invalid("star pattern outside a sequence"));
            }
            return Ok(first);
        }
        let mut items = vec![first];
        while self.eat(&Token::Comma) {
            if matches!(self.current(), Token::Colon | Token::If | Token::Newline | Token::Eof) {
                break;
            }
            items.push(self.parse_maybe_star_pattern()?);
        }
        Ok(Pattern::MatchSequence(items))
    }

    fn parse_maybe_star_pattern(&mut self) -> Result<Pattern, ParseError> {
        if !self.eat(&Token::Star) {
            return self.parse_pattern();
        }
        let name = self.expect_name()?;
        Ok(Pattern::MatchStar((name != "_").then_some(name)))
    }

    fn parse_pattern(&mut self) -> Result<Pattern, ParseError> {
        let pattern = self.nested(Parser::parse_or_pattern)?;
        if !self.eat(&Token::As) {
            return Ok(pattern);
        }
        let name = self.expect_name()?;
        if name == "_" {
            return Err(self.invalid("cannot use '_' as a capture target"));
        }
        Ok(Pattern::MatchAs {
            pattern: Some(Box::new(pattern)),
            name: Some(name),
        })
    }

    fn parse_or_pattern(&mut self) -> Result<Pattern, ParseError> {
        let first = self.parse_closed_pattern()?;
        if !self.check(&Token::VBar) {
            return Ok(first);
        }
        let mut alternatives = vec![first];
        while self.eat(&Token::VBar) {
            alternatives.push(self.parse_closed_pattern()?);
        }
        Ok(Pattern::MatchOr(alternatives))
    }

    fn parse_closed_pattern(&mut self) -> Result<Pattern, ParseError> {
        let singleton = match self.current() {
            Token::Minus | Token::Int(_) | Token::BigInt(_) | Token::Float(_) | Token::Imaginary(_) => {
                return Ok(Pattern::MatchValue(self.parse_signed_number()?));
            }
            Token::Str(_) | Token::Bytes(_) | Token::FString { .. } => {
                return Ok(Pattern::MatchValue(self.parse_strings()?));
            }
            Token::Name(_) => return self.parse_name_pattern(),
            Token::LParen => return self.parse_group_pattern(),
            Token::LBracket => {
                self.advance();
                let items = self.parse_pattern_items(&Token::RBracket)?;
                return Ok(Pattern::MatchSequence(items));
            }
            Token::LBrace => return self.parse_mapping_pattern(),
            Token::None => Value::None,
            Token::True => Value::Bool(true),
            Token::False => Value::Bool(false),
            _ => return Err(self.unexpected("a pattern")),
        };
        self.advance();
        Ok(Pattern::MatchSingleton(singleton))
    }

    /// A number literal, optionally negated, optionally plus or minus an
    /// imaginary part: `-1`, `2.5`, `1 + 2j`.
    fn parse_signed_number(&mut self) -> Result<Expr, ParseError> {
        let negative = self.eat(&Token::Minus);
        let number = match self.current() {
            Token::Int(n) => Value::Int(*n),
            Token::BigInt(digits) => Value::BigInt(digits.clone()),
            Token::Float(n) => Value::Float(*n),
            Token::Imaginary(n) => Value::Complex(*n),
            _ => return Err(self.unexpected("a number")),
        };
        self.advance();

        let mut expr = Expr::Constant(number);
        if negative {
            expr = Expr::UnaryOp {
                op: UnaryOp::USub,
                operand: Box::new(expr),
            };
        }
        let op = match (self.current(), self.peek(1)) {
            (Token::Plus, Token::Imaginary(_)) => Operator::Add,
            (Token::Minus, Token::Imaginary(_)) => Operator::Sub,
            _ => return Ok(expr),
        };
        self.advance();
        let Token::Imaginary(imaginary) = self.advance() else {
            return Err(self.unexpected("an imaginary number"));
        };
        Ok(Expr::BinOp {
            left: Box::new(expr),
            op,
            right: Box::new(Expr::Constant(Value::Complex(imaginary))),
        })
    }

    /// Capture, wildcard, dotted value or class pattern.
    fn parse_name_pattern(&mut self) -> Result<Pattern, ParseError> {
        let first = self.expect_name()?;
        let mut value = Expr::Name(first.clone());
        let mut dotted = false;
        while self.eat(&Token::Dot) {
            let attr = self.expect_name()?;
            value = Expr::Attribute {
                value: Box::new(value),
                attr,
            };
            dotted = true;
        }
        if self.eat(&Token::LParen) {
            return self.parse_class_pattern(value);
        }
        if dotted {
            return Ok(Pattern::MatchValue(value));
        }
        Ok(Pattern::MatchAs {
            pattern: None,
            name: (first != "_").then_some(first),
        })
    }

    fn parse_class_pattern(&mut self, cls: Expr) -> Result<Pattern, ParseError> {
        let mut patterns = Vec::new();
        let mut kwd_attrs = Vec::new();
        let mut kwd_patterns = Vec::new();
        while !self.check(&Token::RParen) {
            if matches!((self.current(), self.peek(1)), (Token::Name(_), Token::Equal)) {
                kwd_attrs.push(self.expect_name()?);
                self.advance();
                kwd_patterns.push(self.parse_pattern()?);
            } else {
                if !kwd_attrs.is_empty() {
                    return Err(self.invalid("positional patterns follow keyword patterns"));
                }
                patterns.push(self.parse_pattern()?);
            }
            if !self.eat(&Token::Comma) {
                break;
            }
        }
        self.expect(Token::RParen)?;
        Ok(Pattern::MatchClass {
            cls,
            patterns,
            kwd_attrs,
            kwd_patterns,
        })
    }

    /// `(pattern)` is a group; `()` and `(pattern,)` are sequences.
    fn parse_group_pattern(&mut self) -> Result<Pattern, ParseError> {
        self.expect(Token::LParen)?;
        if self.eat(&Token::RParen) {
            return Ok(Pattern::MatchSequence(Vec::new()));
        }
        let first = self.parse_maybe_star_pattern()?;
        if self.eat(&Token::RParen) {
            if matches!(first, Pattern::MatchStar(_)) {
                return Err(self.invalid("star pattern outside a sequence"));
            }
            return Ok(first);
        }
        self.expect(Token::Comma)?;
        let mut items = vec![first];
        items.extend(self.parse_pattern_items(&Token::RParen)?);
        Ok(Pattern::MatchSequence(items))
    }

    /// Comma-separated patterns up to and including `closing`.
    fn parse_pattern_items(&mut self, closing: &Token) -> Result<Vec<Pattern>, ParseError> {
        let mut items = Vec::new();
        while !self.check(closing) {
            items.push(self.parse_maybe_star_pattern()?);
            if !self.eat(&Token::Comma) {
                break;
            }
        }
        self.expect(closing.clone())?;
        Ok(items)
    }

    fn parse_mapping_pattern(&mut self) -> Result<Pattern, ParseError> {
        self.expect(Token::LBrace)?;
        let mut keys = Vec::new();
        let mut patterns = Vec::new();
        let mut rest = None;
        while !self.check(&Token::RBrace) {
            if rest.is_some() {
                return Err(self.invalid("'**' must be the last entry of a mapping pattern"));
            }
            if self.eat(&Token::DoubleStar) {
                rest = Some(self.expect_name()?);
            } else {
                keys.push(self.parse_mapping_key()?);
                self.expect(Token::Colon)?;
                patterns.push(self.parse_pattern()?);
            }
            if !self.eat(&Token::Comma) {
                break;
            }
        }
        self.expect(Token::RBrace)?;
        Ok(Pattern::MatchMapping {
            keys,
            patterns,
            rest,
        })
    }

    fn parse_mapping_key(&mut self) -> Result<Expr, ParseError> {
        let constant = match self.current() {
            Token::Minus | Token::Int(_) | Token::BigInt(_) | Token::Float(_) | Token::Imaginary(_) => {
                return self.parse_signed_number();
            }
            Token::Str(_) | Token::Bytes(_) | Token::FString { .. } => {
                return self.parse_strings();
            }
            Token::Name(_) => {
                let mut value = Expr::Name(self.expect_name()?);
                if !self.check(&Token::Dot) {
                    return Err(self.invalid("mapping pattern keys must be literals or dotted names"));
                }
                while self.eat(&Token::Dot) {
                    let attr = self.expect_name()?;
                    value = Expr::Attribute {
                        value: Box::new(value),
                        attr,
                    };
                }
                return Ok(value);
            }
            Token::None => Value::None,
            Token::True => Value::Bool(true),
            Token::False => Value::Bool(false),
            _ => return Err(self.unexpected("a mapping key")),
        };
        self.advance();
        Ok(Expr::Constant(constant))
    }
}
