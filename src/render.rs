//! Canonical source rendering for Python syntax trees.
//!
//! Rendering throws away everything the tree does not record: comments,
//! blank lines, redundant parentheses, quote style and spacing. Two
//! fragments written differently but parsing to the same tree render to the
//! same text, and parsing rendered text reproduces the tree.
//!
//! # Features
//!
//! - **Minimal parentheses** - an operand is wrapped only when its
//!   precedence requires it
//! - **Python literal spelling** - strings, bytes and floats follow `repr`
//! - **Stable layout** - four-space indentation, one statement per line,
//!   `elif` for an `if` nested alone in an `else`
//!
//! # Examples
//!
//! ```
//! use py_query::{parse, unparse};
//!
//! let module = parse("x  =  ( 1 +2 )*3   # comment").unwrap();
//! assert_eq!(unparse(&module), "x = (1 + 2) * 3");
//! ```

use crate::{
    ast::{
        Arg, Arguments, BoolOp, CmpOp, Comprehension, Expr, FStringPart, Keyword, MatchCase, Module,
        Operator, Pattern, Stmt, TypeParam, UnaryOp, WithItem,
    },
    value::Value,
};

/// Binding strength of an expression position, weakest first.
///
/// An expression renders bare when its own precedence is at least that of
/// the position it appears in, and parenthesized otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Precedence {
    Tuple,
    Yield,
    Test,
    Or,
    And,
    Not,
    Cmp,
    BitOr,
    BitXor,
    BitAnd,
    Shift,
    Arith,
    Term,
    Factor,
    Power,
    Await,
    Atom,
}

impl Precedence {
    fn next(self) -> Self {
        use Precedence::*;
        match self {
            Tuple => Yield,
            Yield => Test,
            Test => Or,
            Or => And,
            And => Not,
            Not => Cmp,
            Cmp => BitOr,
            BitOr => BitXor,
            BitXor => BitAnd,
            BitAnd => Shift,
            Shift => Arith,
            Arith => Term,
            Term => Factor,
            Factor => Power,
            Power => Await,
            Await | Atom => Atom,
        }
    }

    fn of_operator(op: Operator) -> Self {
        match op {
            Operator::BitOr => Precedence::BitOr,
            Operator::BitXor => Precedence::BitXor,
            Operator::BitAnd => Precedence::BitAnd,
            Operator::LShift | Operator::RShift => Precedence::Shift,
            Operator::Add | Operator::Sub => Precedence::Arith,
            Operator::Mult
            | Operator::MatMult
            | Operator::Div
            | Operator::Mod
            | Operator::FloorDiv => Precedence::Term,
            Operator::Pow => Precedence::Power,
        }
    }
}

fn wrap(text: String, own: Precedence, context: Precedence) -> String {
    if own < context {
        format!("({text})")
    } else {
        text
    }
}

pub struct Renderer {
    indent_width: usize,
}

impl Default for Renderer {
    fn default() -> Self {
        Renderer { indent_width: 4 }
    }
}

impl Renderer {
    pub fn new(indent_width: usize) -> Self {
        Renderer { indent_width }
    }

    pub fn module(&self, module: &Module) -> String {
        let mut lines = Vec::new();
        self.print_block(&module.body, 0, &mut lines);
        lines.join("\n")
    }

    pub fn statement(&self, stmt: &Stmt) -> String {
        let mut lines = Vec::new();
        self.print_stmt(stmt, 0, &mut lines);
        lines.join("\n")
    }

    pub fn expression(&self, expr: &Expr) -> String {
        self.print_expr(expr, Precedence::Tuple)
    }

    pub fn pattern(&self, pattern: &Pattern) -> String {
        self.print_pattern(pattern)
    }

    pub fn case(&self, case: &MatchCase) -> String {
        let mut lines = Vec::new();
        self.print_case(case, 0, &mut lines);
        lines.join("\n")
    }

    fn indent(&self, level: usize) -> String {
        " ".repeat(self.indent_width * level)
    }

    fn line(&self, level: usize, text: impl AsRef<str>, lines: &mut Vec<String>) {
        lines.push(format!("{}{}", self.indent(level), text.as_ref()));
    }

    fn print_block(&self, body: &[Stmt], level: usize, lines: &mut Vec<String>) {
        for stmt in body {
            self.print_stmt(stmt, level, lines);
        }
    }

    /// Header line followed by its indented block.
    fn print_clause(&self, header: String, body: &[Stmt], level: usize, lines: &mut Vec<String>) {
        self.line(level, header, lines);
        self.print_block(body, level + 1, lines);
    }

    fn print_else(&self, orelse: &[Stmt], level: usize, lines: &mut Vec<String>) {
        if !orelse.is_empty() {
            self.print_clause("else:".to_string(), orelse, level, lines);
        }
    }

    fn print_stmt(&self, stmt: &Stmt, level: usize, lines: &mut Vec<String>) {
        match stmt {
            Stmt::FunctionDef(def) => {
                for decorator in &def.decorator_list {
                    self.line(level, format!("@{}", self.print_expr(decorator, Precedence::Test)), lines);
                }
                let keyword = if def.is_async { "async def" } else { "def" };
                let returns = def
                    .returns
                    .as_ref()
                    .map(|returns| format!(" -> {}", self.print_expr(returns, Precedence::Test)))
                    .unwrap_or_default();
                let header = format!(
                    "{keyword} {}{}({}){returns}:",
                    def.name,
                    self.print_type_params(&def.type_params),
                    self.print_arguments(&def.args, true)
                );
                self.print_clause(header, &def.body, level, lines);
            }
            Stmt::ClassDef(class) => {
                for decorator in &class.decorator_list {
                    self.line(level, format!("@{}", self.print_expr(decorator, Precedence::Test)), lines);
                }
                let arguments = self.print_call_arguments(&class.bases, &class.keywords);
                let params = self.print_type_params(&class.type_params);
                let header = if arguments.is_empty() {
                    format!("class {}{params}:", class.name)
                } else {
                    format!("class {}{params}({arguments}):", class.name)
                };
                self.print_clause(header, &class.body, level, lines);
            }
            Stmt::For {
                target,
                iter,
                body,
                orelse,
                is_async,
            } => {
                let keyword = if *is_async { "async for" } else { "for" };
                let header = format!(
                    "{keyword} {} in {}:",
                    self.print_expr(target, Precedence::Tuple),
                    self.print_expr(iter, Precedence::Tuple)
                );
                self.print_clause(header, body, level, lines);
                self.print_else(orelse, level, lines);
            }
            Stmt::While { test, body, orelse } => {
                let header = format!("while {}:", self.print_expr(test, Precedence::Test));
                self.print_clause(header, body, level, lines);
                self.print_else(orelse, level, lines);
            }
            Stmt::If { test, body, orelse } => {
                let header = format!("if {}:", self.print_expr(test, Precedence::Test));
                self.print_clause(header, body, level, lines);
                let mut orelse = orelse;
                while let [Stmt::If { test, body, orelse: next }] = orelse.as_slice() {
                    let header = format!("elif {}:", self.print_expr(test, Precedence::Test));
                    self.print_clause(header, body, level, lines);
                    orelse = next;
                }
                self.print_else(orelse, level, lines);
            }
            Stmt::With {
                items,
                body,
                is_async,
            } => {
                let keyword = if *is_async { "async with" } else { "with" };
                let items: Vec<String> = items.iter().map(|item| self.print_with_item(item)).collect();
                let header = format!("{keyword} {}:", items.join(", "));
                self.print_clause(header, body, level, lines);
            }
            Stmt::Match { subject, cases } => {
                self.line(
                    level,
                    format!("match {}:", self.print_expr(subject, Precedence::Tuple)),
                    lines,
                );
                for case in cases {
                    self.print_case(case, level + 1, lines);
                }
            }
            Stmt::Try {
                body,
                handlers,
                orelse,
                finalbody,
                is_star,
            } => {
                self.print_clause("try:".to_string(), body, level, lines);
                for handler in handlers {
                    let mut header = if *is_star { "except*" } else { "except" }.to_string();
                    if let Some(exc_type) = &handler.exc_type {
                        header.push(' ');
                        header.push_str(&self.print_expr(exc_type, Precedence::Test));
                    }
                    if let Some(name) = &handler.name {
                        header.push_str(" as ");
                        header.push_str(name);
                    }
                    header.push(':');
                    self.print_clause(header, &handler.body, level, lines);
                }
                self.print_else(orelse, level, lines);
                if !finalbody.is_empty() {
                    self.print_clause("finally:".to_string(), finalbody, level, lines);
                }
            }
            simple => self.line(level, self.print_simple_stmt(simple), lines),
        }
    }

    fn print_simple_stmt(&self, stmt: &Stmt) -> String {
        match stmt {
            Stmt::Return(None) => "return".to_string(),
            Stmt::Return(Some(value)) => format!("return {}", self.print_expr(value, Precedence::Test)),
            Stmt::Delete(targets) => format!("del {}", self.print_list(targets, Precedence::Test)),
            Stmt::Assign { targets, value } => {
                let mut text = String::new();
                for target in targets {
                    text.push_str(&self.print_expr(target, Precedence::Tuple));
                    text.push_str(" = ");
                }
                text.push_str(&self.print_expr(value, Precedence::Yield));
                text
            }
            Stmt::AugAssign { target, op, value } => format!(
                "{} {}= {}",
                self.print_expr(target, Precedence::Test),
                op.symbol(),
                self.print_expr(value, Precedence::Yield)
            ),
            Stmt::AnnAssign {
                target,
                annotation,
                value,
            } => {
                let mut text = format!(
                    "{}: {}",
                    self.print_expr(target, Precedence::Test),
                    self.print_expr(annotation, Precedence::Test)
                );
                if let Some(value) = value {
                    text.push_str(" = ");
                    text.push_str(&self.print_expr(value, Precedence::Yield));
                }
                text
            }
            Stmt::Raise { exc, cause } => {
                let mut text = "raise".to_string();
                if let Some(exc) = exc {
                    text.push(' ');
                    text.push_str(&self.print_expr(exc, Precedence::Test));
                }
                if let Some(cause) = cause {
                    text.push_str(" from ");
                    text.push_str(&self.print_expr(cause, Precedence::Test));
                }
                text
            }
            Stmt::Assert { test, msg } => match msg {
                Some(msg) => format!(
                    "assert {}, {}",
                    self.print_expr(test, Precedence::Test),
                    self.print_expr(msg, Precedence::Test)
                ),
                None => format!("assert {}", self.print_expr(test, Precedence::Test)),
            },
            Stmt::Import(names) => {
                let names: Vec<String> = names.iter().map(print_alias).collect();
                format!("import {}", names.join(", "))
            }
            Stmt::ImportFrom {
                module,
                names,
                level,
            } => {
                let names: Vec<String> = names.iter().map(print_alias).collect();
                format!(
                    "from {}{} import {}",
                    ".".repeat(*level),
                    module.as_deref().unwrap_or_default(),
                    names.join(", ")
                )
            }
            Stmt::Global(names) => format!("global {}", names.join(", ")),
            Stmt::Nonlocal(names) => format!("nonlocal {}", names.join(", ")),
            Stmt::TypeAlias {
                name,
                type_params,
                value,
            } => format!(
                "type {name}{} = {}",
                self.print_type_params(type_params),
                self.print_expr(value, Precedence::Test)
            ),
            Stmt::Expr(value) => self.print_expr(value, Precedence::Yield),
            Stmt::Pass => "pass".to_string(),
            Stmt::Break => "break".to_string(),
            Stmt::Continue => "continue".to_string(),
            compound => self.statement(compound),
        }
    }

    fn print_case(&self, case: &MatchCase, level: usize, lines: &mut Vec<String>) {
        let mut header = format!("case {}", self.print_pattern(&case.pattern));
        if let Some(guard) = &case.guard {
            header.push_str(" if ");
            header.push_str(&self.print_expr(guard, Precedence::Test));
        }
        header.push(':');
        self.print_clause(header, &case.body, level, lines);
    }

    fn print_with_item(&self, item: &WithItem) -> String {
        let context = self.print_expr(&item.context_expr, Precedence::Test);
        match &item.optional_vars {
            Some(vars) => format!("{context} as {}", self.print_expr(vars, Precedence::Test)),
            None => context,
        }
    }

    fn print_arguments(&self, args: &Arguments, annotations: bool) -> String {
        let mut parts = Vec::new();
        let positional: Vec<&Arg> = args.posonlyargs.iter().chain(&args.args).collect();
        let first_default = positional.len().saturating_sub(args.defaults.len());
        for (index, arg) in positional.iter().enumerate() {
            let default = index
                .checked_sub(first_default)
                .and_then(|offset| args.defaults.get(offset));
            parts.push(self.print_parameter(arg, default, annotations));
            if index + 1 == args.posonlyargs.len() {
                parts.push("/".to_string());
            }
        }
        if let Some(vararg) = &args.vararg {
            parts.push(format!("*{}", self.print_parameter(vararg, None, annotations)));
        } else if !args.kwonlyargs.is_empty() {
            parts.push("*".to_string());
        }
        for (index, arg) in args.kwonlyargs.iter().enumerate() {
            let default = args.kw_defaults.get(index).and_then(Option::as_ref);
            parts.push(self.print_parameter(arg, default, annotations));
        }
        if let Some(kwarg) = &args.kwarg {
            parts.push(format!("**{}", self.print_parameter(kwarg, None, annotations)));
        }
        parts.join(", ")
    }

    fn print_parameter(&self, arg: &Arg, default: Option<&Expr>, annotations: bool) -> String {
        let mut text = arg.name.clone();
        let annotation = arg.annotation.as_ref().filter(|_| annotations);
        if let Some(annotation) = annotation {
            text.push_str(": ");
            text.push_str(&self.print_expr(annotation, Precedence::Test));
        }
        if let Some(default) = default {
            text.push_str(if annotation.is_some() { " = " } else { "=" });
            text.push_str(&self.print_expr(default, Precedence::Test));
        }
        text
    }

    fn print_type_params(&self, params: &[TypeParam]) -> String {
        if params.is_empty() {
            return String::new();
        }
        let params: Vec<String> = params
            .iter()
            .map(|param| match param {
                TypeParam::TypeVar { name, bound: None } => name.clone(),
                TypeParam::TypeVar {
                    name,
                    bound: Some(bound),
                } => format!("{name}: {}", self.print_expr(bound, Precedence::Test)),
                TypeParam::TypeVarTuple(name) => format!("*{name}"),
                TypeParam::ParamSpec(name) => format!("**{name}"),
            })
            .collect();
        format!("[{}]", params.join(", "))
    }

    fn print_call_arguments(&self, args: &[Expr], keywords: &[Keyword]) -> String {
        let mut parts: Vec<String> = args
            .iter()
            .map(|arg| self.print_expr(arg, Precedence::Test))
            .collect();
        for keyword in keywords {
            parts.push(match &keyword.arg {
                Some(name) => format!("{name}={}", self.print_expr(&keyword.value, Precedence::Test)),
                None => format!("**{}", self.print_expr(&keyword.value, Precedence::BitOr)),
            });
        }
        parts.join(", ")
    }

    fn print_list(&self, items: &[Expr], context: Precedence) -> String {
        items
            .iter()
            .map(|item| self.print_expr(item, context))
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn print_generators(&self, generators: &[Comprehension]) -> String {
        let mut text = String::new();
        for generator in generators {
            text.push_str(if generator.is_async { " async for " } else { " for " });
            text.push_str(&self.print_expr(&generator.target, Precedence::Tuple));
            text.push_str(" in ");
            text.push_str(&self.print_expr(&generator.iter, Precedence::Test.next()));
            for condition in &generator.ifs {
                text.push_str(" if ");
                text.push_str(&self.print_expr(condition, Precedence::Test.next()));
            }
        }
        text
    }

    /// Picks the first quote that no field expression uses, since field
    /// text cannot be escaped.
    fn print_fstring(&self, parts: &[FStringPart]) -> String {
        let mut fields = Vec::new();
        self.field_texts(parts, &mut fields);
        let quote = ["'", "\"", "'''", "\"\"\""]
            .into_iter()
            .find(|quote| fields.iter().all(|text| !text.contains(quote)))
            .unwrap_or("'");
        let body = self.print_fstring_parts(parts, quote.starts_with('"'));
        format!("f{quote}{body}{quote}")
    }

    fn field_texts(&self, parts: &[FStringPart], texts: &mut Vec<String>) {
        for part in parts {
            if let FStringPart::Value {
                value, format_spec, ..
            } = part
            {
                texts.push(self.print_field_expr(value));
                if let Some(spec) = format_spec {
                    self.field_texts(spec, texts);
                }
            }
        }
    }

    fn print_fstring_parts(&self, parts: &[FStringPart], double_quoted: bool) -> String {
        let quote = if double_quoted { '"' } else { '\'' };
        let mut text = String::new();
        for part in parts {
            match part {
                FStringPart::Literal(literal) => {
                    for ch in literal.chars() {
                        match ch {
                            '{' => text.push_str("{{"),
                            '}' => text.push_str("}}"),
                            ch => push_escaped(&mut text, ch, quote),
                        }
                    }
                }
                FStringPart::Value {
                    value,
                    conversion,
                    format_spec,
                } => {
                    let expr = self.print_field_expr(value);
                    text.push('{');
                    if expr.starts_with('{') {
                        text.push(' ');
                    }
                    text.push_str(&expr);
                    if let Some(conversion) = conversion {
                        text.push('!');
                        text.push(*conversion);
                    }
                    if let Some(spec) = format_spec {
                        text.push(':');
                        text.push_str(&self.print_fstring_parts(spec, double_quoted));
                    }
                    text.push('}');
                }
            }
        }
        text
    }

    /// A lambda's `:` would start a format spec, so it keeps parentheses.
    fn print_field_expr(&self, value: &Expr) -> String {
        let context = if matches!(value, Expr::Lambda { .. }) {
            Precedence::Or
        } else {
            Precedence::Test
        };
        self.print_expr(value, context)
    }

    fn print_expr(&self, expr: &Expr, context: Precedence) -> String {
        match expr {
            Expr::BoolOp { op, values } => {
                let (own, separator) = match op {
                    BoolOp::Or => (Precedence::Or, " or "),
                    BoolOp::And => (Precedence::And, " and "),
                };
                let text = values
                    .iter()
                    .map(|value| self.print_expr(value, own.next()))
                    .collect::<Vec<_>>()
                    .join(separator);
                wrap(text, own, context)
            }
            Expr::NamedExpr { target, value } => format!(
                "({} := {})",
                self.print_expr(target, Precedence::Atom),
                self.print_expr(value, Precedence::Test)
            ),
            Expr::BinOp { left, op, right } => {
                let own = Precedence::of_operator(*op);
                let (left_context, right_context) = if *op == Operator::Pow {
                    (own.next(), own)
                } else {
                    (own, own.next())
                };
                let text = format!(
                    "{} {} {}",
                    self.print_expr(left, left_context),
                    op.symbol(),
                    self.print_expr(right, right_context)
                );
                wrap(text, own, context)
            }
            Expr::UnaryOp { op, operand } => {
                let (own, symbol) = match op {
                    UnaryOp::Not => (Precedence::Not, "not "),
                    UnaryOp::Invert => (Precedence::Factor, "~"),
                    UnaryOp::UAdd => (Precedence::Factor, "+"),
                    UnaryOp::USub => (Precedence::Factor, "-"),
                };
                wrap(format!("{symbol}{}", self.print_expr(operand, own)), own, context)
            }
            Expr::Lambda { args, body } => {
                let params = self.print_arguments(args, false);
                let head = if params.is_empty() {
                    "lambda".to_string()
                } else {
                    format!("lambda {params}")
                };
                let text = format!("{head}: {}", self.print_expr(body, Precedence::Test));
                wrap(text, Precedence::Test, context)
            }
            Expr::IfExp { test, body, orelse } => {
                let text = format!(
                    "{} if {} else {}",
                    self.print_expr(body, Precedence::Test.next()),
                    self.print_expr(test, Precedence::Test.next()),
                    self.print_expr(orelse, Precedence::Test)
                );
                wrap(text, Precedence::Test, context)
            }
            Expr::Dict { keys, values } => {
                let items: Vec<String> = keys
                    .iter()
                    .zip(values)
                    .map(|(key, value)| match key {
                        Some(key) => format!(
                            "{}: {}",
                            self.print_expr(key, Precedence::Test),
                            self.print_expr(value, Precedence::Test)
                        ),
                        None => format!("**{}", self.print_expr(value, Precedence::BitOr)),
                    })
                    .collect();
                format!("{{{}}}", items.join(", "))
            }
            Expr::Set(elements) if elements.is_empty() => "{*()}".to_string(),
            Expr::Set(elements) => format!("{{{}}}", self.print_list(elements, Precedence::Test)),
            Expr::ListComp { elt, generators } => format!(
                "[{}{}]",
                self.print_expr(elt, Precedence::Test),
                self.print_generators(generators)
            ),
            Expr::SetComp { elt, generators } => format!(
                "{{{}{}}}",
                self.print_expr(elt, Precedence::Test),
                self.print_generators(generators)
            ),
            Expr::DictComp {
                key,
                value,
                generators,
            } => format!(
                "{{{}: {}{}}}",
                self.print_expr(key, Precedence::Test),
                self.print_expr(value, Precedence::Test),
                self.print_generators(generators)
            ),
            Expr::GeneratorExp { elt, generators } => format!(
                "({}{})",
                self.print_expr(elt, Precedence::Test),
                self.print_generators(generators)
            ),
            Expr::Await(value) => wrap(
                format!("await {}", self.print_expr(value, Precedence::Atom)),
                Precedence::Await,
                context,
            ),
            Expr::Yield(value) => {
                let text = match value {
                    Some(value) => format!("yield {}", self.print_expr(value, Precedence::Tuple)),
                    None => "yield".to_string(),
                };
                wrap(text, Precedence::Yield, context)
            }
            Expr::YieldFrom(value) => wrap(
                format!("yield from {}", self.print_expr(value, Precedence::Test)),
                Precedence::Yield,
                context,
            ),
            Expr::Compare {
                left,
                ops,
                comparators,
            } => {
                let mut text = self.print_expr(left, Precedence::Cmp.next());
                for (op, comparator) in ops.iter().zip(comparators) {
                    text.push(' ');
                    text.push_str(CmpOp::symbol(*op));
                    text.push(' ');
                    text.push_str(&self.print_expr(comparator, Precedence::Cmp.next()));
                }
                wrap(text, Precedence::Cmp, context)
            }
            Expr::Call {
                func,
                args,
                keywords,
            } => format!(
                "{}({})",
                self.print_expr(func, Precedence::Atom),
                self.print_call_arguments(args, keywords)
            ),
            Expr::FormattedString(parts) => self.print_fstring(parts),
            Expr::Constant(value) => literal(value),
            Expr::Attribute { value, attr } => {
                let owner = self.print_expr(value, Precedence::Atom);
                let numeric = matches!(
                    value.as_ref(),
                    Expr::Constant(
                        Value::Int(_) | Value::BigInt(_) | Value::Float(_) | Value::Complex(_)
                    )
                );
                let owner = if numeric { format!("({owner})") } else { owner };
                format!("{owner}.{attr}")
            }
            Expr::Subscript { value, slice } => {
                let index = match slice.as_ref() {
                    Expr::Tuple(elements) if !elements.is_empty() => {
                        let mut text = self.print_list(elements, Precedence::Test);
                        if elements.len() == 1 {
                            text.push(',');
                        }
                        text
                    }
                    other => self.print_expr(other, Precedence::Test),
                };
                format!("{}[{index}]", self.print_expr(value, Precedence::Atom))
            }
            Expr::Starred(value) => format!("*{}", self.print_expr(value, Precedence::BitOr)),
            Expr::Name(id) => id.clone(),
            Expr::List(elements) => format!("[{}]", self.print_list(elements, Precedence::Test)),
            Expr::Tuple(elements) => {
                let mut text = self.print_list(elements, Precedence::Test);
                if elements.len() == 1 {
                    text.push(',');
                }
                if elements.is_empty() || context > Precedence::Tuple {
                    format!("({text})")
                } else {
                    text
                }
            }
            Expr::Slice { lower, upper, step } => {
                let part = |bound: &Option<Box<Expr>>| {
                    bound
                        .as_ref()
                        .map(|bound| self.print_expr(bound, Precedence::Test))
                        .unwrap_or_default()
                };
                let mut text = format!("{}:{}", part(lower), part(upper));
                if step.is_some() {
                    text.push(':');
                    text.push_str(&part(step));
                }
                text
            }
        }
    }

    fn print_pattern(&self, pattern: &Pattern) -> String {
        match pattern {
            Pattern::MatchValue(value) => self.print_expr(value, Precedence::Arith),
            Pattern::MatchSingleton(value) => literal(value),
            Pattern::MatchSequence(items) => {
                let items: Vec<String> = items.iter().map(|item| self.print_pattern(item)).collect();
                format!("[{}]", items.join(", "))
            }
            Pattern::MatchMapping {
                keys,
                patterns,
                rest,
            } => {
                let mut items: Vec<String> = keys
                    .iter()
                    .zip(patterns)
                    .map(|(key, pattern)| {
                        format!(
                            "{}: {}",
                            self.print_expr(key, Precedence::Arith),
                            self.print_pattern(pattern)
                        )
                    })
                    .collect();
                if let Some(rest) = rest {
                    items.push(format!("**{rest}"));
                }
                format!("{{{}}}", items.join(", "))
            }
            Pattern::MatchClass {
                cls,
                patterns,
                kwd_attrs,
                kwd_patterns,
            } => {
                let mut items: Vec<String> = patterns.iter().map(|item| self.print_pattern(item)).collect();
                for (attr, pattern) in kwd_attrs.iter().zip(kwd_patterns) {
                    items.push(format!("{attr}={}", self.print_pattern(pattern)));
                }
                format!("{}({})", self.print_expr(cls, Precedence::Atom), items.join(", "))
            }
            Pattern::MatchStar(name) => format!("*{}", name.as_deref().unwrap_or("_")),
            Pattern::MatchAs { pattern, name } => match (pattern, name) {
                (None, None) => "_".to_string(),
                (None, Some(name)) => name.clone(),
                (Some(pattern), Some(name)) => {
                    format!("{} as {name}", self.print_grouped_pattern(pattern))
                }
                (Some(pattern), None) => self.print_pattern(pattern),
            },
            Pattern::MatchOr(alternatives) => alternatives
                .iter()
                .map(|alternative| self.print_grouped_pattern(alternative))
                .collect::<Vec<_>>()
                .join(" | "),
        }
    }

    /// An `as` pattern needs parentheses when nested in `|` or another `as`.
    fn print_grouped_pattern(&self, pattern: &Pattern) -> String {
        match pattern {
            Pattern::MatchAs {
                pattern: Some(_), ..
            } => format!("({})", self.print_pattern(pattern)),
            _ => self.print_pattern(pattern),
        }
    }
}

fn print_alias(alias: &crate::ast::Alias) -> String {
    match &alias.asname {
        Some(asname) => format!("{} as {asname}", alias.name),
        None => alias.name.clone(),
    }
}

/// Spells a constant the way Python's `repr` does.
pub fn literal(value: &Value) -> String {
    match value {
        Value::None => "None".to_string(),
        Value::Bool(true) => "True".to_string(),
        Value::Bool(false) => "False".to_string(),
        Value::Int(n) => n.to_string(),
        Value::BigInt(digits) => digits.clone(),
        Value::Float(n) => float_repr(*n),
        Value::Complex(n) => {
            let coefficient = float_repr(*n);
            let coefficient = coefficient.strip_suffix(".0").unwrap_or(&coefficient);
            format!("{coefficient}j")
        }
        Value::Str(s) => quote_str(s),
        Value::Bytes(bytes) => quote_bytes(bytes),
        Value::Ellipsis => "...".to_string(),
    }
}

/// Shortest round-tripping float text, with Python's choice between
/// positional and scientific notation. Infinity has no literal, so it is
/// spelled as an overflowing one.
fn float_repr(value: f64) -> String {
    if value.is_nan() {
        return "(1e309 - 1e309)".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "1e309" } else { "-1e309" }.to_string();
    }

    let scientific = format!("{value:e}");
    let (mantissa, exponent) = scientific.split_once('e').unwrap_or((&scientific, "0"));
    let exponent: i32 = exponent.parse().unwrap_or(0);
    let sign = if mantissa.starts_with('-') { "-" } else { "" };
    let digits: String = mantissa.chars().filter(char::is_ascii_digit).collect();

    if (-4..16).contains(&exponent) {
        let point = exponent + 1;
        let text = if point <= 0 {
            format!("0.{}{digits}", "0".repeat(point.unsigned_abs() as usize))
        } else {
            let point = point as usize;
            if point >= digits.len() {
                format!("{digits}{}.0", "0".repeat(point - digits.len()))
            } else {
                format!("{}.{}", &digits[..point], &digits[point..])
            }
        };
        return format!("{sign}{text}");
    }

    let (first, rest) = digits.split_at(1.min(digits.len()));
    let mantissa = if rest.is_empty() {
        first.to_string()
    } else {
        format!("{first}.{rest}")
    };
    let exponent_sign = if exponent < 0 { '-' } else { '+' };
    format!("{sign}{mantissa}e{exponent_sign}{:02}", exponent.unsigned_abs())
}

/// Python prefers single quotes unless the text has a single quote and no
/// double quote.
fn choose_quote(has_single: bool, has_double: bool) -> char {
    if has_single && !has_double { '"' } else { '\'' }
}

fn quote_str(s: &str) -> String {
    let quote = choose_quote(s.contains('\''), s.contains('"'));
    let mut text = String::with_capacity(s.len() + 2);
    text.push(quote);
    for ch in s.chars() {
        push_escaped(&mut text, ch, quote);
    }
    text.push(quote);
    text
}

/// Spells one string character the way `repr` does inside `quote`.
fn push_escaped(text: &mut String, ch: char, quote: char) {
    match ch {
        '\\' => text.push_str("\\\\"),
        '\n' => text.push_str("\\n"),
        '\r' => text.push_str("\\r"),
        '\t' => text.push_str("\\t"),
        c if c == quote => {
            text.push('\\');
            text.push(c);
        }
        c if c.is_control() => {
            let code = c as u32;
            if code <= 0xff {
                text.push_str(&format!("\\x{code:02x}"));
            } else if code <= 0xffff {
                text.push_str(&format!("\\u{code:04x}"));
            } else {
                text.push_str(&format!("\\U{code:08x}"));
            }
        }
        c => text.push(c),
    }
}

fn quote_bytes(bytes: &[u8]) -> String {
    let quote = choose_quote(bytes.contains(&b'\''), bytes.contains(&b'"'));
    let mut text = String::with_capacity(bytes.len() + 3);
    text.push('b');
    text.push(quote);
    for &byte in bytes {
        match byte {
            b'\\' => text.push_str("\\\\"),
            b'\n' => text.push_str("\\n"),
            b'\r' => text.push_str("\\r"),
            b'\t' => text.push_str("\\t"),
            b if b as char == quote => {
                text.push('\\');
                text.push(quote);
            }
            0x20..=0x7e => text.push(byte as char),
            _ => text.push_str(&format!("\\x{byte:02x}")),
        }
    }
    text.push(quote);
    text
}

// Convenience functions

/// Renders a module with the default four-space indentation.
pub fn unparse(module: &Module) -> String {
    Renderer::default().module(module)
}

pub fn unparse_stmt(stmt: &Stmt) -> String {
    Renderer::default().statement(stmt)
}

pub fn unparse_expr(expr: &Expr) -> String {
    Renderer::default().expression(expr)
}

pub fn unparse_pattern(pattern: &Pattern) -> String {
    Renderer::default().pattern(pattern)
}

pub fn unparse_case(case: &MatchCase) -> String {
    Renderer::default().case(case)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn float_repr_matches_python() {
        assert_eq!(float_repr(0.0), "0.0");
        assert_eq!(float_repr(1.5), "1.5");
        assert_eq!(float_repr(100.0), "100.0");
        assert_eq!(float_repr(0.0001), "0.0001");
        assert_eq!(float_repr(1e-5), "1e-05");
        assert_eq!(float_repr(1e16), "1e+16");
        assert_eq!(float_repr(1.5e300), "1.5e+300");
        assert_eq!(float_repr(f64::INFINITY), "1e309");
    }

    #[test]
    fn string_quotes_follow_repr() {
        assert_eq!(quote_str("abc"), "'abc'");
        assert_eq!(quote_str("it's"), "\"it's\"");
        assert_eq!(quote_str("both ' and \""), "'both \\' and \"'");
        assert_eq!(quote_str("a\nb"), "'a\\nb'");
        assert_eq!(quote_bytes(b"\x00ok"), "b'\\x00ok'");
    }
}
