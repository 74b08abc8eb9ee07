// tests/render_tests.rs

use indoc::indoc;
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use py_query::render::{Renderer, unparse_expr, unparse_pattern};
use py_query::{parse, parse_pattern, unparse};

fn canonical(source: &str) -> String {
    unparse(&parse(source).unwrap())
}

// ============================================================================
// Layout
// ============================================================================

#[test]
fn test_spacing_and_comments_are_normalized() {
    let test_cases = vec![
        ("x  =  ( 1 +2 )*3   # note", "x = (1 + 2) * 3"),
        ("print( 'hi' , end = \"\" )", "print('hi', end='')"),
        ("a=b=c", "a = b = c"),
        ("x+=1", "x += 1"),
        ("x:int=5", "x: int = 5"),
        ("f(* args, ** kwargs)", "f(*args, **kwargs)"),
        ("import os.path as p,sys", "import os.path as p, sys"),
        ("from . import x", "from . import x"),
        ("from ..a.b import (c, d as e,)", "from ..a.b import c, d as e"),
        ("global a,b", "global a, b"),
        ("del a[0],b", "del a[0], b"),
        ("assert x,'msg'", "assert x, 'msg'"),
        ("raise E(1) from err", "raise E(1) from err"),
    ];

    for (input, expected) in test_cases {
        assert_eq!(canonical(input), expected, "Failed for input: {input}");
    }
}

#[test]
fn test_blank_lines_and_indentation() {
    let source = indoc! {"
        def f(x):

          # comment
          if x:
                return 1

          return 2
    "};
    let expected = indoc! {"
        def f(x):
            if x:
                return 1
            return 2"};
    assert_eq!(canonical(source), expected);
}

#[test]
fn test_custom_indent_width() {
    let module = parse("while x:\n    x -= 1\n").unwrap();
    assert_eq!(Renderer::new(2).module(&module), "while x:\n  x -= 1");
}

#[test]
fn test_elif_chain_layout() {
    let source = "if a:\n  pass\nelif b:\n  pass\nelse:\n  pass";
    let expected = indoc! {"
        if a:
            pass
        elif b:
            pass
        else:
            pass"};
    assert_eq!(canonical(source), expected);
}

#[test]
fn test_else_containing_if_renders_as_elif() {
    let nested = indoc! {"
        if a:
            x()
        else:
            if b:
                y()
    "};
    assert_eq!(canonical(nested), "if a:\n    x()\nelif b:\n    y()");
}

#[test]
fn test_compound_statements() {
    let test_cases = vec![
        indoc! {"
            @dec
            class A(B, metaclass=M):
                pass"},
        indoc! {"
            def f(a, /, b: int = 1, *, c) -> bool:
                return a"},
        indoc! {"
            for i, j in enumerate(xs):
                continue
            else:
                done()"},
        indoc! {"
            while x:
                x -= 1
            else:
                done()"},
        indoc! {"
            try:
                x()
            except (A, B) as e:
                raise
            except:
                pass
            finally:
                y()"},
        indoc! {"
            try:
                x()
            except* (A, B) as group:
                pass"},
        indoc! {"
            def first[T: int, *Ts, **P](x: T) -> T:
                return x"},
        indoc! {"
            class Box[T](Base):
                pass"},
        "type Pair[T] = tuple[T, T]",
        indoc! {"
            async def f():
                await g()
                async for x in y:
                    pass
                async with a as b, c:
                    pass"},
        indoc! {"
            def g():
                x = yield 1
                yield from h()"},
        indoc! {"
            match cmd:
                case ['go', d] | ['move', d]:
                    pass
                case {'k': v, **rest}:
                    pass
                case Point(x=0) as p if p:
                    pass
                case _:
                    pass"},
    ];

    for source in test_cases {
        assert_eq!(canonical(source), source, "Failed for input:\n{source}");
    }
}

// ============================================================================
// Parentheses
// ============================================================================

#[test]
fn test_minimal_parentheses() {
    let test_cases = vec![
        ("w = (a - b) - c", "w = a - b - c"),
        ("w = a - (b - c)", "w = a - (b - c)"),
        ("w = (a * b) + c", "w = a * b + c"),
        ("w = (a + b) * c", "w = (a + b) * c"),
        ("y = 2 ** -1", "y = 2 ** (-1)"),
        ("y = (-2) ** 2", "y = (-2) ** 2"),
        ("y = (a ** b) ** c", "y = (a ** b) ** c"),
        ("y = a ** (b ** c)", "y = a ** b ** c"),
        ("z = not (a and b)", "z = not (a and b)"),
        ("z = (not a) and b", "z = not a and b"),
        ("z = (a or b) and c", "z = (a or b) and c"),
        ("z = (a < b) == c", "z = (a < b) == c"),
        ("v = (a if b else c) if d else e", "v = (a if b else c) if d else e"),
        ("v = a if b else (c if d else e)", "v = a if b else c if d else e"),
        ("f = (lambda: 1)()", "f = (lambda: 1)()"),
        ("t = (1, 2)", "t = (1, 2)"),
        ("t = 1, 2", "t = (1, 2)"),
        ("t = (1,)", "t = (1,)"),
        ("t = ()", "t = ()"),
        ("a, b = b, a", "a, b = (b, a)"),
        ("(x := 10)", "(x := 10)"),
        ("print(x for x in y)", "print((x for x in y))"),
        ("n = (1).real", "n = (1).real"),
        ("n = (-1).real", "n = (-1).real"),
        ("s = a[1:2, ::3]", "s = a[1:2, ::3]"),
        ("s = a[(1, 2)]", "s = a[1, 2]"),
        ("r = await (yield)", "r = await (yield)"),
    ];

    for (input, expected) in test_cases {
        assert_eq!(canonical(input), expected, "Failed for input: {input}");
    }
}

// ============================================================================
// Literals
// ============================================================================

#[test]
fn test_literal_spelling() {
    let test_cases = vec![
        ("a = \"it's\"", "a = \"it's\""),
        ("a = \"plain\"", "a = 'plain'"),
        ("a = 'both \\' \"'", "a = 'both \\' \"'"),
        ("a = 'tab\\t'", "a = 'tab\\t'"),
        ("s = 'a' \"b\"", "s = 'ab'"),
        ("b = b'\\x00a'", "b = b'\\x00a'"),
        ("f = f\"{x!r}\"", "f = f'{x!r}'"),
        ("f = f'{ x+1 }'", "f = f'{x + 1}'"),
        ("f = f'{x=}'", "f = f'x={x!r}'"),
        ("f = f'{x = :>4}'", "f = f'x = {x:>4}'"),
        ("f = f'{{a}} {b:{w}.{p}f}'", "f = f'{{a}} {b:{w}.{p}f}'"),
        ("f = f'{d[\"k\"]}'", "f = f\"{d['k']}\""),
        ("f = f'{ {1, 2} }'", "f = f'{ {1, 2}}'"),
        ("f = f'{a, b}'", "f = f'{(a, b)}'"),
        ("f = f'{(lambda: 1)}'", "f = f'{(lambda: 1)}'"),
        ("f = f'{(y := 2)}'", "f = f'{(y := 2)}'"),
        ("f = rf'\\d{n}'", "f = f'\\\\d{n}'"),
        ("f = f'a' 'b{c}'", "f = f'ab{{c}}'"),
        ("f = f'''it's\n{x}'''", "f = f'it\\'s\\n{x}'"),
        (
            "x = 340282366920938463463374607431768211456",
            "x = 340282366920938463463374607431768211456",
        ),
        (
            "x = 0x1_0000_0000_0000_0000_0000_0000_0000_0000",
            "x = 340282366920938463463374607431768211456",
        ),
        ("x = 1_000_000", "x = 1000000"),
        ("x = 0x10", "x = 16"),
        ("x = .5", "x = 0.5"),
        ("x = 1.0", "x = 1.0"),
        ("x = 1e20", "x = 1e+20"),
        ("x = 1.5e-7", "x = 1.5e-07"),
        ("x = 3j", "x = 3j"),
        ("x = 2.5j", "x = 2.5j"),
        ("x = ...", "x = ..."),
        ("x = {}", "x = {}"),
        ("x = {1: 2, **b}", "x = {1: 2, **b}"),
    ];

    for (input, expected) in test_cases {
        assert_eq!(canonical(input), expected, "Failed for input: {input}");
    }
}

#[test]
fn test_standalone_fragments() {
    assert_eq!(unparse_pattern(&parse_pattern("[a,*rest]").unwrap()), "[a, *rest]");
    assert_eq!(unparse_pattern(&parse_pattern("(1|2) as n").unwrap()), "1 | 2 as n");

    let module = parse("x = [i  for  i in xs]").unwrap();
    let py_query::Stmt::Assign { value, .. } = &module.body[0] else {
        panic!("Expected an assignment");
    };
    assert_eq!(unparse_expr(value), "[i for i in xs]");
}

// ============================================================================
// Round Trips
// ============================================================================

fn expression() -> impl Strategy<Value = String> {
    let leaf = prop_oneof![
        "[a-e]",
        (0u32..100).prop_map(|n| n.to_string()),
        Just("None".to_string()),
        Just("'s'".to_string()),
    ];
    leaf.prop_recursive(4, 32, 3, |inner| {
        let ops = prop::sample::select(vec![
            "+", "-", "*", "/", "//", "%", "**", "<<", "&", "|", "^", "and", "or", "==", "<",
            "is not", "not in",
        ]);
        prop_oneof![
            (inner.clone(), ops, inner.clone()).prop_map(|(l, op, r)| format!("({l} {op} {r})")),
            inner.clone().prop_map(|e| format!("-({e})")),
            inner.clone().prop_map(|e| format!("not ({e})")),
            (inner.clone(), inner.clone()).prop_map(|(f, a)| format!("f({f}, {a})")),
            (inner.clone(), inner.clone(), inner.clone())
                .prop_map(|(a, b, c)| format!("({a} if {b} else {c})")),
            (inner.clone(), inner.clone()).prop_map(|(a, b)| format!("[{a}, {b}]")),
            inner.clone().prop_map(|e| format!("({e}).attr")),
            (inner.clone(), inner).prop_map(|(a, b)| format!("{a}[{b}]")),
        ]
    })
}

proptest! {
    #[test]
    fn test_rendering_reproduces_the_tree(src in expression()) {
        let tree = parse(&format!("x = {src}")).unwrap();
        let text = unparse(&tree);
        prop_assert_eq!(parse(&text).unwrap(), tree);
    }

    #[test]
    fn test_rendering_is_idempotent(src in expression()) {
        let once = canonical(&format!("x = {src}"));
        prop_assert_eq!(canonical(&once), once.clone());
    }
}
