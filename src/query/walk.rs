//! Traversal helpers.
//!
//! Statement heads are the expressions a statement holds directly, outside
//! any nested block: the test of an `if`, the target and iterable of a
//! `for`, both sides of an assignment, a function's decorators.

use crate::ast::{Arguments, Comprehension, Expr, FStringPart, Stmt};

/// Visits `expr` and every expression below it, parents first.
pub(super) fn walk_expr<'a>(expr: &'a Expr, visit: &mut impl FnMut(&'a Expr)) {
    visit(expr);
    match expr {
        Expr::BoolOp { values, .. } => walk_all(values, visit),
        Expr::NamedExpr { target, value } => {
            walk_expr(target, visit);
            walk_expr(value, visit);
        }
        Expr::BinOp { left, right, .. } => {
            walk_expr(left, visit);
            walk_expr(right, visit);
        }
        Expr::UnaryOp { operand, .. } => walk_expr(operand, visit),
        Expr::Lambda { args, body } => {
            walk_arguments(args, visit);
            walk_expr(body, visit);
        }
        Expr::IfExp { test, body, orelse } => {
            walk_expr(test, visit);
            walk_expr(body, visit);
            walk_expr(orelse, visit);
        }
        Expr::Dict { keys, values } => {
            for (key, value) in keys.iter().zip(values) {
                if let Some(key) = key {
                    walk_expr(key, visit);
                }
                walk_expr(value, visit);
            }
        }
        Expr::Set(elements) | Expr::List(elements) | Expr::Tuple(elements) => {
            walk_all(elements, visit)
        }
        Expr::ListComp { elt, generators }
        | Expr::SetComp { elt, generators }
        | Expr::GeneratorExp { elt, generators } => {
            walk_expr(elt, visit);
            walk_generators(generators, visit);
        }
        Expr::DictComp {
            key,
            value,
            generators,
        } => {
            walk_expr(key, visit);
            walk_expr(value, visit);
            walk_generators(generators, visit);
        }
        Expr::Await(value) | Expr::YieldFrom(value) | Expr::Starred(value) => walk_expr(value, visit),
        Expr::Yield(value) => {
            if let Some(value) = value {
                walk_expr(value, visit);
            }
        }
        Expr::Compare {
            left, comparators, ..
        } => {
            walk_expr(left, visit);
            walk_all(comparators, visit);
        }
        Expr::Call {
            func,
            args,
            keywords,
        } => {
            walk_expr(func, visit);
            walk_all(args, visit);
            for keyword in keywords {
                walk_expr(&keyword.value, visit);
            }
        }
        Expr::Attribute { value, .. } => walk_expr(value, visit),
        Expr::Subscript { value, slice } => {
            walk_expr(value, visit);
            walk_expr(slice, visit);
        }
        Expr::Slice { lower, upper, step } => {
            for bound in [lower, upper, step].into_iter().flatten() {
                walk_expr(bound, visit);
            }
        }
        Expr::FormattedString(parts) => walk_fstring(parts, visit),
        Expr::Constant(_) | Expr::Name(_) => {}
    }
}

fn walk_fstring<'a>(parts: &'a [FStringPart], visit: &mut impl FnMut(&'a Expr)) {
    for part in parts {
        if let FStringPart::Value {
            value, format_spec, ..
        } = part
        {
            walk_expr(value, visit);
            if let Some(spec) = format_spec {
                walk_fstring(spec, visit);
            }
        }
    }
}

fn walk_all<'a>(exprs: &'a [Expr], visit: &mut impl FnMut(&'a Expr)) {
    for expr in exprs {
        walk_expr(expr, visit);
    }
}

fn walk_generators<'a>(generators: &'a [Comprehension], visit: &mut impl FnMut(&'a Expr)) {
    for generator in generators {
        walk_expr(&generator.target, visit);
        walk_expr(&generator.iter, visit);
        walk_all(&generator.ifs, visit);
    }
}

fn walk_arguments<'a>(args: &'a Arguments, visit: &mut impl FnMut(&'a Expr)) {
    walk_all(&args.defaults, visit);
    for default in args.kw_defaults.iter().flatten() {
        walk_expr(default, visit);
    }
}

/// Expressions held directly by `stmt`, in source order.
pub(super) fn statement_heads(stmt: &Stmt) -> Vec<&Expr> {
    match stmt {
        Stmt::FunctionDef(def) => {
            let mut heads: Vec<&Expr> = def.decorator_list.iter().collect();
            let params = def
                .args
                .posonlyargs
                .iter()
                .chain(&def.args.args)
                .chain(&def.args.vararg)
                .chain(&def.args.kwonlyargs)
                .chain(&def.args.kwarg);
            heads.extend(params.filter_map(|arg| arg.annotation.as_ref()));
            heads.extend(&def.args.defaults);
            heads.extend(def.args.kw_defaults.iter().flatten());
            heads.extend(&def.returns);
            heads
        }
        Stmt::ClassDef(class) => class
            .decorator_list
            .iter()
            .chain(&class.bases)
            .chain(class.keywords.iter().map(|keyword| &keyword.value))
            .collect(),
        Stmt::Return(value) => value.iter().collect(),
        Stmt::Delete(targets) => targets.iter().collect(),
        Stmt::Assign { targets, value } => targets.iter().chain([value]).collect(),
        Stmt::AugAssign { target, value, .. } => vec![target, value],
        Stmt::AnnAssign {
            target,
            annotation,
            value,
        } => [target, annotation].into_iter().chain(value).collect(),
        Stmt::For { target, iter, .. } => vec![target, iter],
        Stmt::While { test, .. } | Stmt::If { test, .. } => vec![test],
        Stmt::With { items, .. } => items
            .iter()
            .flat_map(|item| [Some(&item.context_expr), item.optional_vars.as_ref()])
            .flatten()
            .collect(),
        Stmt::Match { subject, .. } => vec![subject],
        Stmt::Raise { exc, cause } => exc.iter().chain(cause).collect(),
        Stmt::Assert { test, msg } => [test].into_iter().chain(msg).collect(),
        Stmt::Expr(value) => vec![value],
        Stmt::TypeAlias { value, .. } => vec![value],
        Stmt::Try { .. }
        | Stmt::Import(_)
        | Stmt::ImportFrom { .. }
        | Stmt::Global(_)
        | Stmt::Nonlocal(_)
        | Stmt::Pass
        | Stmt::Break
        | Stmt::Continue => Vec::new(),
    }
}

/// Visits every expression in `stmt`, nested blocks included.
pub(super) fn walk_stmt_deep<'a>(stmt: &'a Stmt, visit: &mut impl FnMut(&'a Expr)) {
    for head in statement_heads(stmt) {
        walk_expr(head, visit);
    }
    match stmt {
        Stmt::Try { handlers, .. } => {
            for exc_type in handlers.iter().filter_map(|handler| handler.exc_type.as_ref()) {
                walk_expr(exc_type, visit);
            }
        }
        Stmt::Match { cases, .. } => {
            for guard in cases.iter().filter_map(|case| case.guard.as_ref()) {
                walk_expr(guard, visit);
            }
        }
        _ => {}
    }
    for block in stmt.blocks() {
        for nested in block {
            walk_stmt_deep(nested, visit);
        }
    }
}
