// tests/equivalence_tests.rs

use indoc::indoc;
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use py_query::{QueryError, QueryNode};

fn node(source: &str) -> QueryNode {
    QueryNode::parse(source).unwrap()
}

fn equivalent(source: &str, target: &str) -> bool {
    node(source).is_equivalent(target).unwrap()
}

// ============================================================================
// Formatting Insensitivity
// ============================================================================

#[test]
fn test_layout_differences_are_ignored() {
    let test_cases = vec![
        ("x = 1", "x=1"),
        ("x = 1", "x = (1)"),
        ("x = 1", "x = 1  # one"),
        ("x = 'a'", "x = \"a\""),
        ("x = 16", "x = 0x10"),
        ("x = 1.0", "x = 1."),
        ("total = price * 2", "total = (price*2)"),
        ("print(a, b)", "print(\n    a,\n    b,\n)"),
        ("a = 1\nb = 2", "a = 1; b = 2"),
        ("if x:\n    pass", "if (x):\n  pass\n\n"),
        ("s = 'ab'", "s = 'a' 'b'"),
        ("y = (a + b) + c", "y = a + b + c"),
    ];

    for (source, target) in test_cases {
        assert!(
            equivalent(source, target),
            "Expected {source:?} to be equivalent to {target:?}"
        );
    }
}

#[test]
fn test_code_differences_are_detected() {
    let test_cases = vec![
        ("x = 1", "x = 2"),
        ("x = 1", "y = 1"),
        ("a + b", "b + a"),
        ("a - (b - c)", "a - b - c"),
        ("x = 1", "x = 1.0"),
        ("x = 'a'", "x = b'a'"),
        ("f(a)", "f(a, b)"),
        ("a = 1\nb = 2", "b = 2\na = 1"),
        ("a = 1\nb = 2", "a = 1"),
        ("if x:\n    pass", "while x:\n    pass"),
    ];

    for (source, target) in test_cases {
        assert!(
            !equivalent(source, target),
            "Expected {source:?} not to be equivalent to {target:?}"
        );
    }
}

// ============================================================================
// f-strings
// ============================================================================

#[test]
fn test_fstring_fields_ignore_layout() {
    let test_cases = vec![
        ("print(f'{x+1}')", "print(f'{x + 1}')"),
        ("s = f'{x}'", "s = f'{ x }'"),
        ("s = f'{x}'", "s = f\"{(x)}\""),
        ("s = f'a{x}b'", "s = 'a' f'{x}' \"b\""),
        ("s = f'{x!r:>10}'", "s = f'{ x !r:>10}'"),
        ("s = f'{x=}'", "s = f'x={x!r}'"),
        ("s = rf'\\d{n}'", "s = f'\\\\d{n}'"),
        ("s = f'{a}{{b}}'", "s = f\"{a}{{\" 'b}'"),
        ("s = f'{x:{w}.{p}f}'", "s = f'{x:{ w }.{p}f}'"),
        ("s = f'{d[\"k\"]}'", "s = f\"{d['k']}\""),
    ];

    for (source, target) in test_cases {
        assert!(
            equivalent(source, target),
            "Expected {source:?} to be equivalent to {target:?}"
        );
    }
}

#[test]
fn test_fstring_field_differences_are_detected() {
    let test_cases = vec![
        ("print(f'{x+1}')", "print(f'{x+2}')"),
        ("s = f'{x}'", "s = f'{x!r}'"),
        ("s = f'{x}'", "s = '{x}'"),
        ("s = f'{x:>4}'", "s = f'{x:<4}'"),
        ("s = f'{a}{b}'", "s = f'{b}{a}'"),
        ("s = f'{x=}'", "s = f'{x = }'"),
    ];

    for (source, target) in test_cases {
        assert!(
            !equivalent(source, target),
            "Expected {source:?} not to be equivalent to {target:?}"
        );
    }
}

#[test]
fn test_fstring_field_calls_are_found() {
    let code = node("print(f'{total(xs):.2f} of {limit}')");
    assert!(code.has_call("total").unwrap());
    assert!(code.block_has_call("total"));
}

// ============================================================================
// Wrapping Insensitivity
// ============================================================================

#[test]
fn test_statement_and_program_compare_equal() {
    let program = node("print('hi')");
    let statement = program.get(0).unwrap();

    assert!(statement.is_equivalent("print('hi')").unwrap());
    assert!(program.is_equivalent(&statement).unwrap());
    assert!(statement.is_equivalent(&program).unwrap());
}

#[test]
fn test_expression_node_matches_expression_text() {
    let code = node("print('hi', end='')");
    let call = code.find_calls("print").remove(0);
    assert!(call.is_equivalent("print(\"hi\", end=\"\")").unwrap());

    let argument = call.find_call_args().remove(0);
    assert!(argument.is_equivalent("'hi'").unwrap());
    assert!(argument.is_equivalent("\"hi\"").unwrap());
    assert!(!argument.is_equivalent("'ho'").unwrap());
}

#[test]
fn test_block_matches_multi_statement_text() {
    let source = indoc! {"
        def f(x):
            y = x + 1
            return y
    "};
    let body = node(source).find_function("f").find_body();
    assert!(body.is_equivalent("y = x+1\nreturn y").unwrap());
    assert!(!body.is_equivalent("y = x + 1").unwrap());
}

#[test]
fn test_sequence_matches_statements_in_order() {
    let code = node("a = 1\nb = 2\nc = 3");
    let sequence = QueryNode::from(vec![code.get(0).unwrap(), code.get(1).unwrap()]);

    assert!(sequence.is_equivalent("a = 1\nb = 2").unwrap());
    assert!(!sequence.is_equivalent("a = 1").unwrap());
    assert!(!sequence.is_equivalent("b = 2\na = 1").unwrap());
    assert_eq!(sequence.len(), 2);
    assert_eq!(sequence.to_string(), "a = 1\nb = 2");
}

#[test]
fn test_sequence_with_absent_member_matches_nothing() {
    let sequence = QueryNode::from(vec![node("a = 1"), QueryNode::empty()]);
    assert!(!sequence.is_equivalent("a = 1").unwrap());
    assert!(!node("a = 1").is_equivalent(&sequence).unwrap());
}

#[test]
fn test_patterns_and_cases_use_their_own_grammar() {
    let source = indoc! {"
        match point:
            case [x, *rest] if x > 0:
                print(x)
    "};
    let case = node(source).find_matches()[0].find_match_cases().remove(0);

    assert!(case.find_case_pattern().is_equivalent("[x,*rest]").unwrap());
    assert!(case.find_case_pattern().is_equivalent("(x, *rest)").unwrap());
    assert!(case.is_equivalent("case [x, *rest] if (x > 0): print(x)").unwrap());
    assert!(!case.is_equivalent("case [x, *rest]: print(x)").unwrap());
}

// ============================================================================
// Absence
// ============================================================================

#[test]
fn test_empty_node_is_never_equivalent() {
    let empty = QueryNode::empty();
    for target in ["", "x", "pass", "\n\n"] {
        assert!(!empty.is_equivalent(target).unwrap(), "Failed for target: {target:?}");
    }
    assert!(!empty.is_equivalent(&QueryNode::empty()).unwrap());
    assert!(!empty.is_equivalent(&node("")).unwrap());
    assert!(!node("x = 1").is_equivalent(&empty).unwrap());
}

#[test]
fn test_empty_program_is_not_an_empty_node() {
    let program = node("# nothing here\n");
    assert!(!program.is_empty());
    assert_eq!(program.len(), 0);
    assert!(program.is_equivalent("").unwrap());
}

#[test]
fn test_empty_nodes_compare_equal() {
    assert_eq!(QueryNode::empty(), QueryNode::default());
    assert_eq!(QueryNode::empty().to_string(), "");
    assert_eq!(node("x = (1)"), node("x  =  1"));
    assert_ne!(node("x = 1"), QueryNode::empty());
}

// ============================================================================
// Indexing and Errors
// ============================================================================

#[test]
fn test_length_and_indexing() {
    let code = node("a = 1\nif a:\n    b = 2\n    c = 3\n");
    assert_eq!(code.len(), 2);
    assert_eq!(code.get(1).unwrap().len(), 2);
    assert!(code.get(1).unwrap().get(1).unwrap().is_equivalent("c = 3").unwrap());
    assert_eq!(code.find_ifs()[0].find_conditions()[0].len(), 1);
    assert_eq!(QueryNode::empty().len(), 0);
}

#[test]
fn test_out_of_bounds_index() {
    let code = node("a = 1\nb = 2");
    assert_eq!(
        code.get(2),
        Err(QueryError::IndexOutOfBounds { index: 2, len: 2 })
    );
    assert_eq!(
        QueryNode::empty().get(0),
        Err(QueryError::IndexOutOfBounds { index: 0, len: 0 })
    );
}

#[test]
fn test_syntax_errors_propagate() {
    assert!(matches!(QueryNode::parse("def f(:"), Err(QueryError::Syntax(_))));
    assert!(matches!(
        node("x = 1").is_equivalent("x = "),
        Err(QueryError::Syntax(_))
    ));
}

// ============================================================================
// Properties
// ============================================================================

fn expression() -> impl Strategy<Value = String> {
    let leaf = prop_oneof![
        "[a-e]",
        (0u32..50).prop_map(|n| n.to_string()),
        Just("'s'".to_string()),
        Just("None".to_string()),
    ];
    leaf.prop_recursive(3, 16, 3, |inner| {
        let ops = prop::sample::select(vec!["+", "-", "*", "**", "and", "or", "==", "<", "in"]);
        prop_oneof![
            (inner.clone(), ops, inner.clone()).prop_map(|(l, op, r)| format!("({l} {op} {r})")),
            inner.clone().prop_map(|e| format!("-({e})")),
            (inner.clone(), inner.clone()).prop_map(|(f, a)| format!("g({f}, {a})")),
            (inner.clone(), inner).prop_map(|(a, b)| format!("[{a}, {b}]")),
        ]
    })
}

proptest! {
    #[test]
    fn test_equivalence_is_reflexive(src in expression()) {
        let program = format!("x = {src}");
        let code = node(&program);
        prop_assert!(code.is_equivalent(&code).unwrap());
        prop_assert!(code.is_equivalent(program.as_str()).unwrap());
    }

    #[test]
    fn test_equivalence_is_symmetric(left in expression(), right in expression()) {
        let left = node(&format!("x = {left}"));
        let right = node(&format!("x = {right}"));
        prop_assert_eq!(
            left.is_equivalent(&right).unwrap(),
            right.is_equivalent(&left).unwrap()
        );
    }

    #[test]
    fn test_equivalence_ignores_wrapping(src in expression()) {
        let code = node(&format!("x = {src}"));
        let statement = code.get(0).unwrap();
        let wrapped = format!("x  =  ( {src} )  # comment\n");
        prop_assert!(code.is_equivalent(wrapped.as_str()).unwrap());
        prop_assert!(statement.is_equivalent(wrapped.as_str()).unwrap());
        prop_assert!(statement.is_equivalent(&code).unwrap());
        prop_assert!(code.is_equivalent(&statement).unwrap());
    }
}
