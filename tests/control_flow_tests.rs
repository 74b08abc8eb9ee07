// tests/control_flow_tests.rs

use indoc::indoc;
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use py_query::QueryNode;

fn node(source: &str) -> QueryNode {
    QueryNode::parse(source).unwrap()
}

fn assert_all_equivalent(nodes: &[QueryNode], expected: &[Option<&str>]) {
    assert_eq!(nodes.len(), expected.len(), "Length mismatch for {nodes:?}");
    for (index, (found, expected)) in nodes.iter().zip(expected).enumerate() {
        match expected {
            Some(text) => assert!(
                found.is_equivalent(*text).unwrap(),
                "Entry {index}: expected {text:?}, found {found}"
            ),
            None => assert!(found.is_empty(), "Entry {index}: expected an empty node, found {found}"),
        }
    }
}

// ============================================================================
// Conditional Chains
// ============================================================================

#[test]
fn test_if_else_chain() {
    let code = node("x = 1\nif x == 1:\n  x = 2\nelse:\n  x = 3");
    let branch = code.find_ifs().remove(0);
    assert_all_equivalent(&branch.find_conditions(), &[Some("x == 1"), None]);
    assert_all_equivalent(&branch.find_bodies(), &[Some("x = 2"), Some("x = 3")]);
}

#[test]
fn test_if_elif_else_chain() {
    let source = indoc! {"
        if score >= 90:
            grade = 'A'
        elif score >= 80:
            grade = 'B'
        elif score >= 70:
            grade = 'C'
        else:
            grade = 'F'
    "};
    let branch = node(source).find_ifs().remove(0);
    assert_all_equivalent(
        &branch.find_conditions(),
        &[Some("score >= 90"), Some("score >= 80"), Some("score >= 70"), None],
    );
    assert_all_equivalent(
        &branch.find_bodies(),
        &[
            Some("grade = 'A'"),
            Some("grade = 'B'"),
            Some("grade = 'C'"),
            Some("grade = 'F'"),
        ],
    );
}

#[test]
fn test_single_if() {
    let branch = node("if ok:\n    go()\n").find_ifs().remove(0);
    assert_all_equivalent(&branch.find_conditions(), &[Some("ok")]);
    assert_all_equivalent(&branch.find_bodies(), &[Some("go()")]);
}

#[test]
fn test_else_with_several_statements_is_not_an_elif() {
    let source = indoc! {"
        if a:
            x()
        else:
            if b:
                y()
            z()
    "};
    let branch = node(source).find_ifs().remove(0);
    assert_all_equivalent(&branch.find_conditions(), &[Some("a"), None]);
    assert_all_equivalent(
        &branch.find_bodies(),
        &[Some("x()"), Some("if b:\n    y()\nz()")],
    );
}

#[test]
fn test_nested_else_if_reads_as_elif() {
    let nested = node("if a:\n    x()\nelse:\n    if b:\n        y()\n");
    let flat = node("if a:\n    x()\nelif b:\n    y()\n");
    assert_eq!(nested, flat);
    assert_all_equivalent(&nested.find_ifs()[0].find_conditions(), &[Some("a"), Some("b")]);
}

#[test]
fn test_find_if_by_condition() {
    let source = indoc! {"
        if x > 0:
            pass
        if (y < 0):
            y = 0
    "};
    let code = node(source);
    assert_eq!(code.find_ifs().len(), 2);
    let found = code.find_if("y<0").unwrap();
    assert!(found.find_bodies()[0].is_equivalent("y = 0").unwrap());
    assert!(code.find_if("z").unwrap().is_empty());
}

#[test]
fn test_chains_on_other_nodes_are_empty() {
    let code = node("x = 1");
    assert!(code.find_conditions().is_empty());
    assert!(code.find_bodies().is_empty());
    assert!(QueryNode::empty().find_conditions().is_empty());
}

// ============================================================================
// Loops
// ============================================================================

#[test]
fn test_for_loop_parts() {
    let code = node("for i in range(4):\n  pass");
    let loop_ = code.find_for_loops().remove(0);
    assert!(loop_.find_for_vars().is_equivalent("i").unwrap());
    assert!(loop_.find_for_iter().is_equivalent("range(4)").unwrap());
    assert!(code.find_for_vars().is_equivalent("i").unwrap());
}

#[test]
fn test_find_for_matches_target_and_iterable() {
    let source = indoc! {"
        for key, value in pairs.items():
            print(key)
        for item in items:
            total += item
    "};
    let code = node(source);
    assert_eq!(code.find_for_loops().len(), 2);
    let found = code.find_for("(key, value)", "pairs.items()").unwrap();
    assert!(found.find_body().is_equivalent("print(key)").unwrap());
    assert!(code.find_for("item", "items").unwrap().find_body().has_stmt("total += item").unwrap());
    assert!(code.find_for("item", "pairs").unwrap().is_empty());
    assert!(code.find_for("x", "items").unwrap().is_empty());
}

#[test]
fn test_for_else_bodies() {
    let source = indoc! {"
        for n in numbers:
            if n < 0:
                break
        else:
            print('all positive')
    "};
    let loop_ = node(source).find_for_loops().remove(0);
    let bodies = loop_.find_bodies();
    assert_eq!(bodies.len(), 2);
    assert!(bodies[0].find_ifs()[0].find_bodies()[0].is_equivalent("break").unwrap());
    assert!(bodies[1].is_equivalent("print('all positive')").unwrap());
    assert!(loop_.find_conditions().is_empty());
}

#[test]
fn test_while_loops() {
    let source = indoc! {"
        while n > 0:
            n -= 1
        else:
            done()
        while True:
            break
    "};
    let code = node(source);
    assert_eq!(code.find_whiles().len(), 2);
    let countdown = code.find_while("n>0").unwrap();
    assert_all_equivalent(&countdown.find_conditions(), &[Some("n > 0"), None]);
    assert_all_equivalent(&countdown.find_bodies(), &[Some("n -= 1"), Some("done()")]);

    let forever = code.find_while("True").unwrap();
    assert_all_equivalent(&forever.find_conditions(), &[Some("True")]);
    assert!(code.find_while("False").unwrap().is_empty());
}

// ============================================================================
// Pattern Matching
// ============================================================================

const COMMANDS: &str = indoc! {"
    match command.split():
        case ['go', direction] if direction in EXITS:
            move(direction)
        case ['look']:
            describe()
        case Point(x=0) | Point(y=0):
            pass
        case _:
            print('unknown')
"};

#[test]
fn test_match_subject_and_cases() {
    let code = node(COMMANDS);
    let matches = code.find_matches();
    assert_eq!(matches.len(), 1);
    assert!(matches[0].find_match_subject().is_equivalent("command.split()").unwrap());
    assert_eq!(matches[0].find_match_cases().len(), 4);
}

#[test]
fn test_case_parts() {
    let cases = node(COMMANDS).find_matches()[0].find_match_cases();

    assert!(cases[0].find_case_pattern().is_equivalent("['go', direction]").unwrap());
    assert!(cases[0].find_case_guard().is_equivalent("direction in EXITS").unwrap());
    assert!(cases[0].find_case_body().is_equivalent("move(direction)").unwrap());

    assert!(cases[1].find_case_guard().is_empty());
    assert!(cases[2].find_case_pattern().is_equivalent("Point(x=0)|Point(y=0)").unwrap());
    assert!(cases[2].find_case_body().has_pass());
    assert!(cases[3].find_case_pattern().is_equivalent("_").unwrap());
    assert!(cases[3].find_case_body().has_call("print").unwrap());
}

#[test]
fn test_match_queries_on_other_nodes() {
    let code = node("match = 1");
    assert!(code.find_matches().is_empty());
    assert!(code.find_match_subject().is_empty());
    assert!(code.find_match_cases().is_empty());
    assert!(code.find_case_pattern().is_empty());
    assert!(code.find_case_body().is_empty());
}

// ============================================================================
// Properties
// ============================================================================

fn if_chain(elifs: usize, has_else: bool) -> String {
    let mut source = String::from("if c0:\n    b0()\n");
    for index in 1..=elifs {
        source.push_str(&format!("elif c{index}:\n    b{index}()\n"));
    }
    if has_else {
        source.push_str("else:\n    fallback()\n");
    }
    source
}

proptest! {
    #[test]
    fn test_condition_chain_length(elifs in 0usize..6, has_else in any::<bool>()) {
        let code = node(&if_chain(elifs, has_else));
        let branch = code.find_ifs().remove(0);
        let conditions = branch.find_conditions();
        let bodies = branch.find_bodies();

        let expected = elifs + 1 + usize::from(has_else);
        prop_assert_eq!(conditions.len(), expected);
        prop_assert_eq!(bodies.len(), expected);
        prop_assert_eq!(conditions.iter().filter(|found| found.is_empty()).count(), usize::from(has_else));
        if has_else {
            prop_assert!(conditions[expected - 1].is_empty());
        }
        for index in 0..=elifs {
            let condition = format!("c{index}");
            let body = format!("b{index}()");
            prop_assert!(conditions[index].is_equivalent(condition.as_str()).unwrap());
            prop_assert!(bodies[index].is_equivalent(body.as_str()).unwrap());
        }
    }
}
