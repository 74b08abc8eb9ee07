use super::{ParseError, Parser, fstrings::push_part};
use crate::{
    ast::{
        Arg, Arguments, BoolOp, CmpOp, Comprehension, Expr, FStringPart, Keyword, Operator, Token,
        UnaryOp,
    },
    value::Value,
};

/// One literal of an implicitly concatenated string.
enum StringPart {
    Str(String),
    Bytes(Vec<u8>),
    Formatted(Vec<FStringPart>),
}

impl Parser {
    /// Can the current token begin an expression?
    pub(super) fn starts_expression(&self) -> bool {
        matches!(
            self.current(),
            Token::Name(_)
                | Token::Int(_)
                | Token::BigInt(_)
                | Token::Float(_)
                | Token::Imaginary(_)
                | Token::Str(_)
                | Token::Bytes(_)
                | Token::FString { .. }
                | Token::LParen
                | Token::LBracket
                | Token::LBrace
                | Token::Minus
                | Token::Plus
                | Token::Tilde
                | Token::Star
                | Token::Not
                | Token::Lambda
                | Token::Await
                | Token::None
                | Token::True
                | Token::False
                | Token::Ellipsis
        )
    }

    /// Comma-separated expressions; more than one (or a trailing comma)
    /// makes an unparenthesized tuple.
    pub(super) fn parse_star_expressions(&mut self) -> Result<Expr, ParseError> {
        let first = self.parse_star_expression()?;
        if !self.check(&Token::Comma) {
            return Ok(first);
        }
        let mut elements = vec![first];
        while self.eat(&Token::Comma) {
            if !self.starts_expression() {
                break;
            }
            elements.push(self.parse_star_expression()?);
        }
        Ok(Expr::Tuple(elements))
    }

    fn parse_star_expression(&mut self) -> Result<Expr, ParseError> {
        if self.eat(&Token::Star) {
            return Ok(Expr::Starred(Box::new(self.parse_bitwise_or()?)));
        }
        self.parse_expression()
    }

    pub(super) fn parse_star_named_expression(&mut self) -> Result<Expr, ParseError> {
        if self.eat(&Token::Star) {
            return Ok(Expr::Starred(Box::new(self.parse_bitwise_or()?)));
        }
        self.parse_named_expression()
    }

    pub(super) fn parse_named_expression(&mut self) -> Result<Expr, ParseError> {
        if matches!(
            (self.current(), self.peek(1)),
            (Token::Name(_), Token::ColonEqual)
        ) {
            let target = Expr::Name(self.expect_name()?);
            self.advance();
            let value = self.parse_expression()?;
            return Ok(Expr::NamedExpr {
                target: Box::new(target),
                value: Box::new(value),
            });
        }
        self.parse_expression()
    }

    pub(super) fn parse_expression(&mut self) -> Result<Expr, ParseError> {
        if self.check(&Token::Lambda) {
            return self.parse_lambda();
        }
        let body = self.parse_disjunction()?;
        if !self.eat(&Token::If) {
            return Ok(body);
        }
        let test = self.parse_disjunction()?;
        self.expect(Token::Else)?;
        let orelse = self.nested(Parser::parse_expression)?;
        Ok(Expr::IfExp {
            test: Box::new(test),
            body: Box::new(body),
            orelse: Box::new(orelse),
        })
    }

    fn parse_lambda(&mut self) -> Result<Expr, ParseError> {
        self.expect(Token::Lambda)?;
        let args = self.parse_parameters(&Token::Colon, false)?;
        self.expect(Token::Colon)?;
        let body = self.nested(Parser::parse_expression)?;
        Ok(Expr::Lambda {
            args: Box::new(args),
            body: Box::new(body),
        })
    }

    pub(super) fn parse_yield_expression(&mut self) -> Result<Expr, ParseError> {
        self.expect(Token::Yield)?;
        if self.eat(&Token::From) {
            return Ok(Expr::YieldFrom(Box::new(self.parse_expression()?)));
        }
        if !self.starts_expression() {
            return Ok(Expr::Yield(None));
        }
        Ok(Expr::Yield(Some(Box::new(self.parse_star_expressions()?))))
    }

    pub(super) fn parse_disjunction(&mut self) -> Result<Expr, ParseError> {
        let first = self.parse_conjunction()?;
        if !self.check(&Token::Or) {
            return Ok(first);
        }
        let mut values = vec![first];
        while self.eat(&Token::Or) {
            values.push(self.parse_conjunction()?);
        }
        Ok(Expr::BoolOp {
            op: BoolOp::Or,
            values,
        })
    }

    fn parse_conjunction(&mut self) -> Result<Expr, ParseError> {
        let first = self.parse_inversion()?;
        if !self.check(&Token::And) {
            return Ok(first);
        }
        let mut values = vec![first];
        while self.eat(&Token::And) {
            values.push(self.parse_inversion()?);
        }
        Ok(Expr::BoolOp {
            op: BoolOp::And,
            values,
        })
    }

    fn parse_inversion(&mut self) -> Result<Expr, ParseError> {
        if self.eat(&Token::Not) {
            let operand = self.nested(Parser::parse_inversion)?;
            return Ok(Expr::UnaryOp {
                op: UnaryOp::Not,
                operand: Box::new(operand),
            });
        }
        self.parse_comparison()
    }

    fn parse_comparison(&mut self) -> Result<Expr, ParseError> {
        let left = self.parse_bitwise_or()?;
        let mut ops = Vec::new();
        let mut comparators = Vec::new();
        loop {
            let (op, width) = match (self.current(), self.peek(1)) {
                (Token::EqEqual, _) => (CmpOp::Eq, 1),
                (Token::NotEqual, _) => (CmpOp::NotEq, 1),
                (Token::Less, _) => (CmpOp::Lt, 1),
                (Token::LessEqual, _) => (CmpOp::LtE, 1),
                (Token::Greater, _) => (CmpOp::Gt, 1),
                (Token::GreaterEqual, _) => (CmpOp::GtE, 1),
                (Token::In, _) => (CmpOp::In, 1),
                (Token::Not, Token::In) => (CmpOp::NotIn, 2),
                (Token::Is, Token::Not) => (CmpOp::IsNot, 2),
                (Token::Is, _) => (CmpOp::Is, 1),
                _ => break,
            };
            for _ in 0..width {
                self.advance();
            }
            ops.push(op);
            comparators.push(self.parse_bitwise_or()?);
        }
        if ops.is_empty() {
            return Ok(left);
        }
        Ok(Expr::Compare {
            left: Box::new(left),
            ops,
            comparators,
        })
    }

    /// One left-associative binary precedence level.
    fn parse_binary_level(
        &mut self,
        operand: fn(&mut Parser) -> Result<Expr, ParseError>,
        operator: fn(&Token) -> Option<Operator>,
    ) -> Result<Expr, ParseError> {
        let mut left = operand(self)?;
        while let Some(op) = operator(self.current()) {
            self.advance();
            let right = operand(self)?;
            left = Expr::BinOp {
                left: Box::new(left),
                op,
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    pub(super) fn parse_bitwise_or(&mut self) -> Result<Expr, ParseError> {
        self.parse_binary_level(Parser::parse_bitwise_xor, |token| {
            matches!(token, Token::VBar).then_some(Operator::BitOr)
        })
    }

    fn parse_bitwise_xor(&mut self) -> Result<Expr, ParseError> {
        self.parse_binary_level(Parser::parse_bitwise_and, |token| {
            matches!(token, Token::Circumflex).then_some(Operator::BitXor)
        })
    }

    fn parse_bitwise_and(&mut self) -> Result<Expr, ParseError> {
        self.parse_binary_level(Parser::parse_shift, |token| {
            matches!(token, Token::Amper).then_some(Operator::BitAnd)
        })
    }

    fn parse_shift(&mut self) -> Result<Expr, ParseError> {
        self.parse_binary_level(Parser::parse_sum, |token| match token {
            Token::LeftShift => Some(Operator::LShift),
            Token::RightShift => Some(Operator::RShift),
            _ => None,
        })
    }

    fn parse_sum(&mut self) -> Result<Expr, ParseError> {
        self.parse_binary_level(Parser::parse_term, |token| match token {
            Token::Plus => Some(Operator::Add),
            Token::Minus => Some(Operator::Sub),
            _ => None,
        })
    }

    fn parse_term(&mut self) -> Result<Expr, ParseError> {
        self.parse_binary_level(Parser::parse_factor, |token| match token {
            Token::Star => Some(Operator::Mult),
            Token::Slash => Some(Operator::Div),
            Token::DoubleSlash => Some(Operator::FloorDiv),
            Token::Percent => Some(Operator::Mod),
            Token::At => Some(Operator::MatMult),
            _ => None,
        })
    }

    /// Every bracketed operand and every unary operator passes through
    /// here, so this is where expression nesting is counted.
    fn parse_factor(&mut self) -> Result<Expr, ParseError> {
        self.nested(|parser| {
            let op = match parser.current() {
                Token::Plus => UnaryOp::UAdd,
                Token::Minus => UnaryOp::USub,
                Token::Tilde => UnaryOp::Invert,
                _ => return parser.parse_power(),
            };
            parser.advance();
            let operand = parser.parse_factor()?;
            Ok(Expr::UnaryOp {
                op,
                operand: Box::new(operand),
            })
        })
    }

    /// `**` binds tighter than unary minus on its left, looser on its right.
    fn parse_power(&mut self) -> Result<Expr, ParseError> {
        let base = if self.eat(&Token::Await) {
            Expr::Await(Box::new(self.parse_primary()?))
        } else {
            self.parse_primary()?
        };
        if !self.eat(&Token::DoubleStar) {
            return Ok(base);
        }
        let exponent = self.parse_factor()?;
        Ok(Expr::BinOp {
            left: Box::new(base),
            op: Operator::Pow,
            right: Box::new(exponent),
        })
    }

    fn parse_primary(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.parse_atom()?;
        loop {
            match self.current() {
                Token::Dot => {
                    self.advance();
                    let attr = self.expect_name()?;
                    expr = Expr::Attribute {
                        value: Box::new(expr),
                        attr,
                    };
                }
                Token::LParen => {
                    self.advance();
                    let (args, keywords) = self.parse_call_arguments()?;
                    expr = Expr::Call {
                        func: Box::new(expr),
                        args,
                        keywords,
                    };
                }
                Token::LBracket => {
                    self.advance();
                    let slice = self.parse_slices()?;
                    self.expect(Token::RBracket)?;
                    expr = Expr::Subscript {
                        value: Box::new(expr),
                        slice: Box::new(slice),
                    };
                }
                _ => return Ok(expr),
            }
        }
    }

    /// Arguments of a call, after its `(`. Consumes the closing `)`.
    pub(super) fn parse_call_arguments(
        &mut self,
    ) -> Result<(Vec<Expr>, Vec<Keyword>), ParseError> {
        let mut args = Vec::new();
        let mut keywords = Vec::new();
        while !self.check(&Token::RParen) {
            match (self.current(), self.peek(1)) {
                (Token::Star, _) => {
                    self.advance();
                    args.push(Expr::Starred(Box::new(self.parse_expression()?)));
                }
                (Token::DoubleStar, _) => {
                    self.advance();
                    keywords.push(Keyword {
                        arg: None,
                        value: self.parse_expression()?,
                    });
                }
                (Token::Name(_), Token::Equal) => {
                    let arg = self.expect_name()?;
                    self.advance();
                    keywords.push(Keyword {
                        arg: Some(arg),
                        value: self.parse_expression()?,
                    });
                }
                _ => {
                    let value = self.parse_named_expression()?;
                    if matches!(self.current(), Token::For | Token::Async) {
                        let generators = self.parse_comprehension_clauses()?;
                        args.push(Expr::GeneratorExp {
                            elt: Box::new(value),
                            generators,
                        });
                    } else {
                        args.push(value);
                    }
                }
            }
            if !self.eat(&Token::Comma) {
                break;
            }
        }
        self.expect(Token::RParen)?;
        Ok((args, keywords))
    }

    fn parse_slices(&mut self) -> Result<Expr, ParseError> {
        let first = self.parse_slice()?;
        if !self.check(&Token::Comma) {
            return Ok(first);
        }
        let mut elements = vec![first];
        while self.eat(&Token::Comma) {
            if self.check(&Token::RBracket) {
                break;
            }
            elements.push(self.parse_slice()?);
        }
        Ok(Expr::Tuple(elements))
    }

    fn at_slice_end(&self) -> bool {
        matches!(
            self.current(),
            Token::Colon | Token::Comma | Token::RBracket
        )
    }

    fn parse_slice(&mut self) -> Result<Expr, ParseError> {
        let lower = if self.check(&Token::Colon) {
            None
        } else {
            let expr = self.parse_star_named_expression()?;
            if !self.check(&Token::Colon) {
                return Ok(expr);
            }
            Some(Box::new(expr))
        };
        self.expect(Token::Colon)?;
        let upper = if self.at_slice_end() {
            None
        } else {
            Some(Box::new(self.parse_expression()?))
        };
        let step = if self.eat(&Token::Colon) && !self.at_slice_end() {
            Some(Box::new(self.parse_expression()?))
        } else {
            None
        };
        Ok(Expr::Slice { lower, upper, step })
    }

    fn parse_atom(&mut self) -> Result<Expr, ParseError> {
        let constant = match self.current() {
            Token::Name(_) => return Ok(Expr::Name(self.expect_name()?)),
            Token::Str(_) | Token::Bytes(_) | Token::FString { .. } => {
                return self.parse_strings();
            }
            Token::LParen => return self.parse_parenthesized(),
            Token::LBracket => return self.parse_list_display(),
            Token::LBrace => return self.parse_brace_display(),
            Token::True => Value::Bool(true),
            Token::False => Value::Bool(false),
            Token::None => Value::None,
            Token::Ellipsis => Value::Ellipsis,
            Token::Int(n) => Value::Int(*n),
            Token::BigInt(digits) => Value::BigInt(digits.clone()),
            Token::Float(n) => Value::Float(*n),
            Token::Imaginary(n) => Value::Complex(*n),
            _ => return Err(self.unexpected("an expression")),
        };
        self.advance();
        Ok(Expr::Constant(constant))
    }

    /// Adjacent string literals, joined into one constant or f-string.
    pub(super) fn parse_strings(&mut self) -> Result<Expr, ParseError> {
        let position = self.here();
        let mut parts = Vec::new();
        loop {
            let part = match self.current() {
                Token::Str(text) => StringPart::Str(text.clone()),
                Token::Bytes(bytes) => StringPart::Bytes(bytes.clone()),
                Token::FString { body, raw } => {
                    StringPart::Formatted(self.parse_fstring(body, *raw, self.here())?)
                }
                _ => break,
            };
            self.advance();
            parts.push(part);
        }
        concatenate(parts).ok_or(ParseError::Invalid {
            message: "cannot mix bytes and nonbytes literals".to_string(),
            position,
        })
    }

    fn parse_parenthesized(&mut self) -> Result<Expr, ParseError> {
        self.expect(Token::LParen)?;
        if self.eat(&Token::RParen) {
            return Ok(Expr::Tuple(Vec::new()));
        }
        if self.check(&Token::Yield) {
            let expr = self.parse_yield_expression()?;
            self.expect(Token::RParen)?;
            return Ok(expr);
        }
        let first = self.parse_star_named_expression()?;
        if matches!(self.current(), Token::For | Token::Async) {
            let generators = self.parse_comprehension_clauses()?;
            self.expect(Token::RParen)?;
            return Ok(Expr::GeneratorExp {
                elt: Box::new(first),
                generators,
            });
        }
        if self.eat(&Token::RParen) {
            return Ok(first);
        }
        let elements = self.parse_display_rest(first, &Token::RParen)?;
        Ok(Expr::Tuple(elements))
    }

    fn parse_list_display(&mut self) -> Result<Expr, ParseError> {
        self.expect(Token::LBracket)?;
        if self.eat(&Token::RBracket) {
            return Ok(Expr::List(Vec::new()));
        }
        let first = self.parse_star_named_expression()?;
        if matches!(self.current(), Token::For | Token::Async) {
            let generators = self.parse_comprehension_clauses()?;
            self.expect(Token::RBracket)?;
            return Ok(Expr::ListComp {
                elt: Box::new(first),
                generators,
            });
        }
        let elements = self.parse_display_rest(first, &Token::RBracket)?;
        Ok(Expr::List(elements))
    }

    fn parse_brace_display(&mut self) -> Result<Expr, ParseError> {
        self.expect(Token::LBrace)?;
        if self.eat(&Token::RBrace) {
            return Ok(Expr::Dict {
                keys: Vec::new(),
                values: Vec::new(),
            });
        }
        if self.eat(&Token::DoubleStar) {
            let value = self.parse_bitwise_or()?;
            return self.parse_dict_rest(vec![None], vec![value]);
        }

        let first = self.parse_star_named_expression()?;
        if self.eat(&Token::Colon) {
            let value = self.parse_expression()?;
            if matches!(self.current(), Token::For | Token::Async) {
                let generators = self.parse_comprehension_clauses()?;
                self.expect(Token::RBrace)?;
                return Ok(Expr::DictComp {
                    key: Box::new(first),
                    value: Box::new(value),
                    generators,
                });
            }
            return self.parse_dict_rest(vec![Some(first)], vec![value]);
        }

        if matches!(self.current(), Token::For | Token::Async) {
            let generators = self.parse_comprehension_clauses()?;
            self.expect(Token::RBrace)?;
            return Ok(Expr::SetComp {
                elt: Box::new(first),
                generators,
            });
        }
        let elements = self.parse_display_rest(first, &Token::RBrace)?;
        Ok(Expr::Set(elements))
    }

    /// Remaining elements of a tuple, list or set display after the first.
    /// Consumes the closing delimiter.
    fn parse_display_rest(&mut self, first: Expr, closing: &Token) -> Result<Vec<Expr>, ParseError> {
        let mut elements = vec![first];
        while self.eat(&Token::Comma) {
            if self.check(closing) {
                break;
            }
            elements.push(self.parse_star_named_expression()?);
        }
        self.expect(closing.clone())?;
        Ok(elements)
    }

    fn parse_dict_rest(
        &mut self,
        mut keys: Vec<Option<Expr>>,
        mut values: Vec<Expr>,
    ) -> Result<Expr, ParseError> {
        while self.eat(&Token::Comma) {
            if self.check(&Token::RBrace) {
                break;
            }
            if self.eat(&Token::DoubleStar) {
                keys.push(None);
                values.push(self.parse_bitwise_or()?);
                continue;
            }
            keys.push(Some(self.parse_expression()?));
            self.expect(Token::Colon)?;
            values.push(self.parse_expression()?);
        }
        self.expect(Token::RBrace)?;
        Ok(Expr::Dict { keys, values })
    }

    pub(super) fn parse_comprehension_clauses(&mut self) -> Result<Vec<Comprehension>, ParseError> {
        let mut generators = Vec::new();
        while matches!(self.current(), Token::For | Token::Async) {
            let is_async = self.eat(&Token::Async);
            self.expect(Token::For)?;
            let target = self.parse_target_list()?;
            self.expect(Token::In)?;
            let iter = self.parse_disjunction()?;
            let mut ifs = Vec::new();
            while self.eat(&Token::If) {
                ifs.push(self.parse_disjunction()?);
            }
            generators.push(Comprehension {
                target,
                iter,
                ifs,
                is_async,
            });
        }
        Ok(generators)
    }

    /// Assignment targets of `for` loops and comprehensions.
    pub(super) fn parse_target_list(&mut self) -> Result<Expr, ParseError> {
        let first = self.parse_target()?;
        if !self.check(&Token::Comma) {
            return Ok(first);
        }
        let mut elements = vec![first];
        while self.eat(&Token::Comma) {
            if !self.starts_expression() {
                break;
            }
            elements.push(self.parse_target()?);
        }
        Ok(Expr::Tuple(elements))
    }

    pub(super) fn parse_target(&mut self) -> Result<Expr, ParseError> {
        if self.eat(&Token::Star) {
            return Ok(Expr::Starred(Box::new(self.parse_bitwise_or()?)));
        }
        self.parse_bitwise_or()
    }

    /// Parameters of a `def` (with annotations) or `lambda` (without), up
    /// to but not including `closing`.
    pub(super) fn parse_parameters(
        &mut self,
        closing: &Token,
        annotations: bool,
    ) -> Result<Arguments, ParseError> {
        let mut arguments = Arguments::default();
        let mut keyword_only = false;
        while !self.check(closing) {
            match self.current() {
                Token::Slash => {
                    if keyword_only || !arguments.posonlyargs.is_empty() || arguments.args.is_empty() {
                        return Err(self.invalid("'/' must follow at least one parameter"));
                    }
                    self.advance();
                    arguments.posonlyargs = std::mem::take(&mut arguments.args);
                }
                Token::Star => {
                    if keyword_only {
                        return Err(self.invalid("'*' may appear only once"));
                    }
                    self.advance();
                    keyword_only = true;
                    if matches!(self.current(), Token::Name(_)) {
                        arguments.vararg = Some(self.parse_parameter(annotations)?);
                    }
                }
                Token::DoubleStar => {
                    self.advance();
                    arguments.kwarg = Some(self.parse_parameter(annotations)?);
                    self.eat(&Token::Comma);
                    break;
                }
                _ => {
                    let arg = self.parse_parameter(annotations)?;
                    let default = if self.eat(&Token::Equal) {
                        Some(self.parse_expression()?)
                    } else {
                        None
                    };
                    if keyword_only {
                        arguments.kwonlyargs.push(arg);
                        arguments.kw_defaults.push(default);
                    } else {
                        match default {
                            Some(default) => arguments.defaults.push(default),
                            None if !arguments.defaults.is_empty() => {
                                return Err(self.invalid(
                                    "parameter without a default follows parameter with a default",
                                ));
                            }
                            None => {}
                        }
                        arguments.args.push(arg);
                    }
                }
            }
            if !self.eat(&Token::Comma) {
                break;
            }
        }
        Ok(arguments)
    }

    fn parse_parameter(&mut self, annotations: bool) -> Result<Arg, ParseError> {
        let name = self.expect_name()?;
        let annotation = if annotations && self.eat(&Token::Colon) {
            Some(self.parse_expression()?)
        } else {
            None
        };
        Ok(Arg { name, annotation })
    }
}

fn concatenate(parts: Vec<StringPart>) -> Option<Expr> {
    let bytes = parts
        .iter()
        .filter(|part| matches!(part, StringPart::Bytes(_)))
        .count();
    if bytes == parts.len() {
        let joined = parts
            .into_iter()
            .flat_map(|part| match part {
                StringPart::Bytes(bytes) => bytes,
                _ => Vec::new(),
            })
            .collect();
        return Some(Expr::Constant(Value::Bytes(joined)));
    }
    if bytes > 0 {
        return None;
    }

    if !parts
        .iter()
        .any(|part| matches!(part, StringPart::Formatted(_)))
    {
        let mut joined = String::new();
        for part in &parts {
            if let StringPart::Str(text) = part {
                joined.push_str(text);
            }
        }
        return Some(Expr::Constant(Value::Str(joined)));
    }

    let mut joined = Vec::new();
    for part in parts {
        match part {
            StringPart::Str(text) => push_part(&mut joined, FStringPart::Literal(text)),
            StringPart::Formatted(pieces) => {
                for piece in pieces {
                    push_part(&mut joined, piece);
                }
            }
            StringPart::Bytes(_) => {}
        }
    }
    Some(Expr::FormattedString(joined))
}
