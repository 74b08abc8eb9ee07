//! Recursive-descent parser for Python source.
//!
//! The input is tokenized up front, so the parser can look ahead freely
//! and back out of a speculative parse. The soft keyword `match` relies on
//! this: `match x:` opens a statement, while `match = 3` or `match(x)` do not.

mod expressions;
mod fstrings;
mod patterns;

use thiserror::Error;

use crate::{
    ast::{
        Alias, ClassDef, ExceptHandler, Expr, FunctionDef, MatchCase, Module, Operator, Pattern, Stmt,
        Token, TypeParam, WithItem,
    },
    lexer::{LexError, Lexer, Position, SpannedToken},
};

static EOF: Token = Token::Eof;

/// Deepest combined nesting of brackets, operators and blocks the parser
/// accepts. Each level costs several recursive calls, so this keeps the
/// parser well inside a 2 MiB thread stack.
const MAX_NESTING: usize = 40;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error(transparent)]
    Lex(#[from] LexError),

    #[error("expected {expected}, got {found} at {position}")]
    Unexpected {
        expected: String,
        found: String,
        position: Position,
    },

    #[error("{message} at {position}")]
    Invalid { message: String, position: Position },
}

pub struct Parser {
    tokens: Vec<SpannedToken>,
    position: usize,
    depth: usize,
}

impl Parser {
    pub fn new(lexer: Lexer) -> Result<Self, ParseError> {
        let tokens = lexer.tokenize()?;
        Ok(Parser {
            tokens,
            position: 0,
            depth: 0,
        })
    }

    fn peek(&self, offset: usize) -> &Token {
        self.tokens
            .get(self.position + offset)
            .map_or(&EOF, |spanned| &spanned.token)
    }

    fn current(&self) -> &Token {
        self.peek(0)
    }

    fn here(&self) -> Position {
        self.tokens
            .get(self.position)
            .map(|spanned| spanned.position)
            .unwrap_or_default()
    }

    /// Moves past the current token and returns it. Stays put at `Eof`.
    fn advance(&mut self) -> Token {
        let token = self.current().clone();
        if self.position + 1 < self.tokens.len() {
            self.position += 1;
        }
        token
    }

    fn check(&self, token: &Token) -> bool {
        std::mem::discriminant(self.current()) == std::mem::discriminant(token)
    }

    fn eat(&mut self, token: &Token) -> bool {
        if self.check(token) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, expected: Token) -> Result<(), ParseError> {
        if self.check(&expected) {
            self.advance();
            Ok(())
        } else {
            Err(self.unexpected(expected.to_string()))
        }
    }

    fn expect_name(&mut self) -> Result<String, ParseError> {
        match self.current() {
            Token::Name(name) => {
                let name = name.clone();
                self.advance();
                Ok(name)
            }
            _ => Err(self.unexpected("a name")),
        }
    }

    fn check_soft_keyword(&self, word: &str) -> bool {
        matches!(self.current(), Token::Name(name) if name == word)
    }

    fn unexpected(&self, expected: impl Into<String>) -> ParseError {
        ParseError::Unexpected {
            expected: expected.into(),
            found: self.current().to_string(),
            position: self.here(),
        }
    }

    fn invalid(&self, message: impl Into<String>) -> ParseError {
        ParseError::Invalid {
            message: message.into(),
            position: self.here(),
        }
    }

    /// Runs `parse` one nesting level deeper, failing once the input nests
    /// past `MAX_NESTING`.
    fn nested<T>(
        &mut self,
        parse: impl FnOnce(&mut Self) -> Result<T, ParseError>,
    ) -> Result<T, ParseError> {
        if self.depth >= MAX_NESTING {
            return Err(self.invalid("too many nested levels"));
        }
        self.depth += 1;
        let result = parse(self);
        self.depth -= 1;
        result
    }

    fn skip_newlines(&mut self) {
        while self.eat(&Token::Newline) {}
    }

    fn expect_end(&mut self) -> Result<(), ParseError> {
        self.skip_newlines();
        if self.check(&Token::Eof) {
            Ok(())
        } else {
            Err(self.unexpected("end of input"))
        }
    }

    fn at_statement_end(&self) -> bool {
        matches!(self.current(), Token::Newline | Token::Semicolon | Token::Eof)
    }

    pub fn parse_module(&mut self) -> Result<Module, ParseError> {
        let mut body = Vec::new();
        self.skip_newlines();
        while !self.check(&Token::Eof) {
            body.extend(self.parse_statement()?);
            self.skip_newlines();
        }
        Ok(Module { body })
    }

    /// Parses one line's worth of statements: a compound statement, or
    /// simple statements separated by `;`.
    fn parse_statement(&mut self) -> Result<Vec<Stmt>, ParseError> {
        if self.check_soft_keyword("match") {
            if let Some(stmt) = self.try_parse_match()? {
                return Ok(vec![stmt]);
            }
            return self.parse_simple_statements();
        }
        let stmt = match self.current() {
            Token::Def => self.parse_function_def(Vec::new(), false)?,
            Token::Class => self.parse_class_def(Vec::new())?,
            Token::At => self.parse_decorated()?,
            Token::If => self.parse_if()?,
            Token::While => self.parse_while()?,
            Token::For => self.parse_for(false)?,
            Token::Try => self.parse_try()?,
            Token::With => self.parse_with(false)?,
            Token::Async => self.parse_async(Vec::new())?,
            Token::Indent => return Err(self.invalid("unexpected indent")),
            _ => return self.parse_simple_statements(),
        };
        Ok(vec![stmt])
    }

    /// Parses the block after a compound statement header's `:`.
    fn parse_block(&mut self) -> Result<Vec<Stmt>, ParseError> {
        self.nested(|parser| {
            if !parser.eat(&Token::Newline) {
                return parser.parse_simple_statements();
            }
            parser.skip_newlines();
            if !parser.eat(&Token::Indent) {
                return Err(parser.invalid("expected an indented block"));
            }
            let mut body = Vec::new();
            while !parser.check(&Token::Dedent) && !parser.check(&Token::Eof) {
                body.extend(parser.parse_statement()?);
                parser.skip_newlines();
            }
            parser.expect(Token::Dedent)?;
            Ok(body)
        })
    }

    fn parse_decorated(&mut self) -> Result<Stmt, ParseError> {
        let mut decorators = Vec::new();
        while self.eat(&Token::At) {
            decorators.push(self.parse_named_expression()?);
            self.expect(Token::Newline)?;
        }
        match self.current() {
            Token::Def => self.parse_function_def(decorators, false),
            Token::Class => self.parse_class_def(decorators),
            Token::Async => self.parse_async(decorators),
            _ => Err(self.unexpected("'def' or 'class' after decorators")),
        }
    }

    fn parse_async(&mut self, decorators: Vec<Expr>) -> Result<Stmt, ParseError> {
        self.expect(Token::Async)?;
        match self.current() {
            Token::Def => self.parse_function_def(decorators, true),
            Token::For if decorators.is_empty() => self.parse_for(true),
            Token::With if decorators.is_empty() => self.parse_with(true),
            _ => Err(self.unexpected("'def', 'for' or 'with' after 'async'")),
        }
    }

    fn parse_function_def(
        &mut self,
        decorator_list: Vec<Expr>,
        is_async: bool,
    ) -> Result<Stmt, ParseError> {
        self.expect(Token::Def)?;
        let name = self.expect_name()?;
        let type_params = self.parse_type_params()?;
        self.expect(Token::LParen)?;
        let args = self.parse_parameters(&Token::RParen, true)?;
        self.expect(Token::RParen)?;
        let returns = if self.eat(&Token::Arrow) {
            Some(self.parse_expression()?)
        } else {
            None
        };
        self.expect(Token::Colon)?;
        let body = self.parse_block()?;
        Ok(Stmt::FunctionDef(FunctionDef {
            name,
            type_params,
            args,
            body,
            decorator_list,
            returns,
            is_async,
        }))
    }

    fn parse_class_def(&mut self, decorator_list: Vec<Expr>) -> Result<Stmt, ParseError> {
        self.expect(Token::Class)?;
        let name = self.expect_name()?;
        let type_params = self.parse_type_params()?;
        let (bases, keywords) = if self.eat(&Token::LParen) {
            self.parse_call_arguments()?
        } else {
            (Vec::new(), Vec::new())
        };
        self.expect(Token::Colon)?;
        let body = self.parse_block()?;
        Ok(Stmt::ClassDef(ClassDef {
            name,
            type_params,
            bases,
            keywords,
            body,
            decorator_list,
        }))
    }

    /// `if` and `elif` share this: an `elif` becomes a lone nested `If`
    /// in the `orelse` of the branch before it.
    fn parse_if(&mut self) -> Result<Stmt, ParseError> {
        self.advance();
        let test = self.parse_named_expression()?;
        self.expect(Token::Colon)?;
        let body = self.parse_block()?;
        let orelse = match self.current() {
            Token::Elif => vec![self.parse_if()?],
            Token::Else => self.parse_else()?,
            _ => Vec::new(),
        };
        Ok(Stmt::If { test, body, orelse })
    }

    fn parse_else(&mut self) -> Result<Vec<Stmt>, ParseError> {
        if !self.eat(&Token::Else) {
            return Ok(Vec::new());
        }
        self.expect(Token::Colon)?;
        self.parse_block()
    }

    fn parse_while(&mut self) -> Result<Stmt, ParseError> {
        self.expect(Token::While)?;
        let test = self.parse_named_expression()?;
        self.expect(Token::Colon)?;
        let body = self.parse_block()?;
        let orelse = self.parse_else()?;
        Ok(Stmt::While { test, body, orelse })
    }

    fn parse_for(&mut self, is_async: bool) -> Result<Stmt, ParseError> {
        self.expect(Token::For)?;
        let target = self.parse_target_list()?;
        self.expect(Token::In)?;
        let iter = self.parse_star_expressions()?;
        self.expect(Token::Colon)?;
        let body = self.parse_block()?;
        let orelse = self.parse_else()?;
        Ok(Stmt::For {
            target,
            iter,
            body,
            orelse,
            is_async,
        })
    }

    fn parse_try(&mut self) -> Result<Stmt, ParseError> {
        self.expect(Token::Try)?;
        self.expect(Token::Colon)?;
        let body = self.parse_block()?;

        let mut handlers = Vec::new();
        let mut is_star = false;
        while self.eat(&Token::Except) {
            let star = self.eat(&Token::Star);
            if !handlers.is_empty() && star != is_star {
                return Err(self.invalid("cannot mix 'except' and 'except*'"));
            }
            is_star = star;
            let exc_type = if self.check(&Token::Colon) {
                if star {
                    return Err(self.invalid("expected an exception type after 'except*'"));
                }
                None
            } else {
                Some(self.parse_expression()?)
            };
            let name = if self.eat(&Token::As) {
                Some(self.expect_name()?)
            } else {
                None
            };
            self.expect(Token::Colon)?;
            let body = self.parse_block()?;
            handlers.push(ExceptHandler {
                exc_type,
                name,
                body,
            });
        }

        let orelse = self.parse_else()?;
        let finalbody = if self.eat(&Token::Finally) {
            self.expect(Token::Colon)?;
            self.parse_block()?
        } else {
            Vec::new()
        };
        if handlers.is_empty() && finalbody.is_empty() {
            return Err(self.unexpected("'except' or 'finally'"));
        }
        Ok(Stmt::Try {
            body,
            handlers,
            orelse,
            finalbody,
            is_star,
        })
    }

    /// Optional `[T, *Ts, **P]` after a function, class or alias name.
    fn parse_type_params(&mut self) -> Result<Vec<TypeParam>, ParseError> {
        let mut params = Vec::new();
        if !self.eat(&Token::LBracket) {
            return Ok(params);
        }
        while !self.check(&Token::RBracket) {
            let param = if self.eat(&Token::Star) {
                TypeParam::TypeVarTuple(self.expect_name()?)
            } else if self.eat(&Token::DoubleStar) {
                TypeParam::ParamSpec(self.expect_name()?)
            } else {
                let name = self.expect_name()?;
                let bound = if self.eat(&Token::Colon) {
                    Some(self.parse_expression()?)
                } else {
                    None
                };
                TypeParam::TypeVar { name, bound }
            };
            params.push(param);
            if !self.eat(&Token::Comma) {
                break;
            }
        }
        self.expect(Token::RBracket)?;
        if params.is_empty() {
            return Err(self.invalid("expected at least one type parameter"));
        }
        Ok(params)
    }

    fn parse_with(&mut self, is_async: bool) -> Result<Stmt, ParseError> {
        self.expect(Token::With)?;
        let items = self.parse_with_items()?;
        self.expect(Token::Colon)?;
        let body = self.parse_block()?;
        Ok(Stmt::With {
            items,
            body,
            is_async,
        })
    }

    fn parse_with_items(&mut self) -> Result<Vec<WithItem>, ParseError> {
        if self.check(&Token::LParen) {
            let start = self.position;
            if let Ok(items) = self.parse_parenthesized_with_items() {
                if self.check(&Token::Colon) {
                    return Ok(items);
                }
            }
            self.position = start;
        }
        let mut items = vec![self.parse_with_item()?];
        while self.eat(&Token::Comma) {
            items.push(self.parse_with_item()?);
        }
        Ok(items)
    }

    fn parse_parenthesized_with_items(&mut self) -> Result<Vec<WithItem>, ParseError> {
        self.expect(Token::LParen)?;
        let mut items = Vec::new();
        while !self.check(&Token::RParen) {
            items.push(self.parse_with_item()?);
            if !self.eat(&Token::Comma) {
                break;
            }
        }
        self.expect(Token::RParen)?;
        Ok(items)
    }

    fn parse_with_item(&mut self) -> Result<WithItem, ParseError> {
        let context_expr = self.parse_expression()?;
        let optional_vars = if self.eat(&Token::As) {
            Some(self.parse_target()?)
        } else {
            None
        };
        Ok(WithItem {
            context_expr,
            optional_vars,
        })
    }

    fn parse_simple_statements(&mut self) -> Result<Vec<Stmt>, ParseError> {
        let mut statements = vec![self.parse_small_statement()?];
        while self.eat(&Token::Semicolon) {
            if matches!(self.current(), Token::Newline | Token::Eof) {
                break;
            }
            statements.push(self.parse_small_statement()?);
        }
        if !self.eat(&Token::Newline) && !self.check(&Token::Eof) {
            return Err(self.unexpected("end of statement"));
        }
        Ok(statements)
    }

    fn parse_small_statement(&mut self) -> Result<Stmt, ParseError> {
        match self.current() {
            Token::Pass => {
                self.advance();
                Ok(Stmt::Pass)
            }
            Token::Break => {
                self.advance();
                Ok(Stmt::Break)
            }
            Token::Continue => {
                self.advance();
                Ok(Stmt::Continue)
            }
            Token::Return => {
                self.advance();
                let value = if self.at_statement_end() {
                    None
                } else {
                    Some(self.parse_star_expressions()?)
                };
                Ok(Stmt::Return(value))
            }
            Token::Raise => {
                self.advance();
                if self.at_statement_end() {
                    return Ok(Stmt::Raise {
                        exc: None,
                        cause: None,
                    });
                }
                let exc = Some(self.parse_expression()?);
                let cause = if self.eat(&Token::From) {
                    Some(self.parse_expression()?)
                } else {
                    None
                };
                Ok(Stmt::Raise { exc, cause })
            }
            Token::Global => {
                self.advance();
                Ok(Stmt::Global(self.parse_name_list()?))
            }
            Token::Nonlocal => {
                self.advance();
                Ok(Stmt::Nonlocal(self.parse_name_list()?))
            }
            Token::Del => {
                self.advance();
                let mut targets = vec![self.parse_target()?];
                while self.eat(&Token::Comma) {
                    if self.at_statement_end() {
                        break;
                    }
                    targets.push(self.parse_target()?);
                }
                Ok(Stmt::Delete(targets))
            }
            Token::Assert => {
                self.advance();
                let test = self.parse_expression()?;
                let msg = if self.eat(&Token::Comma) {
                    Some(self.parse_expression()?)
                } else {
                    None
                };
                Ok(Stmt::Assert { test, msg })
            }
            Token::Import => self.parse_import(),
            Token::From => self.parse_from_import(),
            Token::Name(word)
                if word == "type"
                    && matches!(self.peek(1), Token::Name(_))
                    && matches!(self.peek(2), Token::Equal | Token::LBracket) =>
            {
                self.parse_type_alias()
            }
            _ => self.parse_expression_statement(),
        }
    }

    /// `type Name[params] = value`, where `type` is a soft keyword.
    fn parse_type_alias(&mut self) -> Result<Stmt, ParseError> {
        self.advance();
        let name = self.expect_name()?;
        let type_params = self.parse_type_params()?;
        self.expect(Token::Equal)?;
        let value = self.parse_expression()?;
        Ok(Stmt::TypeAlias {
            name,
            type_params,
            value,
        })
    }

    fn parse_name_list(&mut self) -> Result<Vec<String>, ParseError> {
        let mut names = vec![self.expect_name()?];
        while self.eat(&Token::Comma) {
            names.push(self.expect_name()?);
        }
        Ok(names)
    }

    fn parse_dotted_name(&mut self) -> Result<String, ParseError> {
        let mut name = self.expect_name()?;
        while self.eat(&Token::Dot) {
            name.push('.');
            name.push_str(&self.expect_name()?);
        }
        Ok(name)
    }

    fn parse_alias(&mut self, dotted: bool) -> Result<Alias, ParseError> {
        let name = if dotted {
            self.parse_dotted_name()?
        } else {
            self.expect_name()?
        };
        let asname = if self.eat(&Token::As) {
            Some(self.expect_name()?)
        } else {
            None
        };
        Ok(Alias { name, asname })
    }

    fn parse_import(&mut self) -> Result<Stmt, ParseError> {
        self.expect(Token::Import)?;
        let mut names = vec![self.parse_alias(true)?];
        while self.eat(&Token::Comma) {
            names.push(self.parse_alias(true)?);
        }
        Ok(Stmt::Import(names))
    }

    fn parse_from_import(&mut self) -> Result<Stmt, ParseError> {
        self.expect(Token::From)?;
        let mut level = 0;
        loop {
            match self.current() {
                Token::Dot => level += 1,
                Token::Ellipsis => level += 3,
                _ => break,
            }
            self.advance();
        }
        let module = if self.check(&Token::Import) {
            None
        } else {
            Some(self.parse_dotted_name()?)
        };
        if module.is_none() && level == 0 {
            return Err(self.unexpected("a module name"));
        }
        self.expect(Token::Import)?;

        let mut names = Vec::new();
        if self.eat(&Token::Star) {
            names.push(Alias {
                name: "*".to_string(),
                asname: None,
            });
        } else if self.eat(&Token::LParen) {
            while !self.check(&Token::RParen) {
                names.push(self.parse_alias(false)?);
                if !self.eat(&Token::Comma) {
                    break;
                }
            }
            self.expect(Token::RParen)?;
        } else {
            names.push(self.parse_alias(false)?);
            while self.eat(&Token::Comma) {
                names.push(self.parse_alias(false)?);
            }
        }
        if names.is_empty() {
            return Err(self.unexpected("a name to import"));
        }
        Ok(Stmt::ImportFrom {
            module,
            names,
            level,
        })
    }

    /// Expression statements and the three assignment forms.
    fn parse_expression_statement(&mut self) -> Result<Stmt, ParseError> {
        let first = self.parse_assignment_value()?;

        if self.eat(&Token::Colon) {
            let annotation = self.parse_expression()?;
            let value = if self.eat(&Token::Equal) {
                Some(self.parse_assignment_value()?)
            } else {
                None
            };
            return Ok(Stmt::AnnAssign {
                target: first,
                annotation,
                value,
            });
        }

        if self.check(&Token::Equal) {
            let mut targets = vec![first];
            while self.eat(&Token::Equal) {
                targets.push(self.parse_assignment_value()?);
            }
            let value = targets
                .pop()
                .ok_or_else(|| self.invalid("assignment without a value"))?;
            return Ok(Stmt::Assign { targets, value });
        }

        if let Some(op) = Operator::from_augmented(self.current()) {
            self.advance();
            let value = self.parse_assignment_value()?;
            return Ok(Stmt::AugAssign {
                target: first,
                op,
                value,
            });
        }

        Ok(Stmt::Expr(first))
    }

    fn parse_assignment_value(&mut self) -> Result<Expr, ParseError> {
        if self.check(&Token::Yield) {
            self.parse_yield_expression()
        } else {
            self.parse_star_expressions()
        }
    }
}

/// Parses a complete Python source file.
///
/// # Example
///
/// ```
/// use py_query::parse;
///
/// let module = parse("x = 1\nprint(x)\n").unwrap();
/// assert_eq!(module.body.len(), 2);
/// ```
pub fn parse(source: &str) -> Result<Module, ParseError> {
    let module = Parser::new(Lexer::new(source))?.parse_module()?;
    tracing::trace!(statements = module.body.len(), "parsed module");
    Ok(module)
}

/// Parses the pattern of a `case` clause on its own, e.g. `[x, *rest]`.
pub fn parse_pattern(source: &str) -> Result<Pattern, ParseError> {
    let mut parser = Parser::new(Lexer::new(source.trim()))?;
    let pattern = parser.parse_case_patterns()?;
    parser.expect_end()?;
    Ok(pattern)
}

/// Parses a single `case` clause with its block.
pub fn parse_case(source: &str) -> Result<MatchCase, ParseError> {
    let mut parser = Parser::new(Lexer::new(source.trim_start()))?;
    let case = parser.parse_case_block()?;
    parser.expect_end()?;
    Ok(case)
}
