// tests/navigation_tests.rs

use indoc::indoc;
use pretty_assertions::assert_eq;
use py_query::{QueryNode, Value};

fn node(source: &str) -> QueryNode {
    QueryNode::parse(source).unwrap()
}

const SHOP: &str = indoc! {"
    import math
    from collections import Counter as C

    TAX = 0.2
    count: int

    class Cart(Base, mixins.Saved):
        def __init__(self):
            self.items = []
            self.total = 0

        @property
        def size(self):
            return len(self.items)

        @size.setter
        def size(self, value):
            pass

    def price(amount, rate=TAX):
        total = amount * (1 + rate)
        total += 1
        print('price', total)
        if total > 100:
            log.warning('large')
        return round(total, 2)

    async def fetch(url):
        data = await client.get(url)
        return data

    count = 0
    limit = -3
    name = input('name? ')
    ratio = 1.5
"};

// ============================================================================
// Functions and Classes
// ============================================================================

#[test]
fn test_find_function() {
    let code = node(SHOP);
    let price = code.find_function("price");
    assert!(!price.is_empty());
    assert!(price.has_return("round(total, 2)").unwrap());
    assert!(code.has_function("fetch"));
    assert!(!code.has_function("missing"));
    assert!(code.find_function("missing").is_empty());
}

#[test]
fn test_functions_are_scope_local() {
    let code = node(SHOP);
    assert!(!code.has_function("__init__"));
    assert!(code.find_class("Cart").has_function("__init__"));
}

#[test]
fn test_find_async_function() {
    let code = node(SHOP);
    assert!(!code.find_async_function("fetch").is_empty());
    assert!(code.find_async_function("price").is_empty());
    assert!(code.find_function("fetch").find_return().is_equivalent("return data").unwrap());
}

#[test]
fn test_find_functions_returns_every_definition() {
    let cart = node(SHOP).find_class("Cart");
    let sizes = cart.find_functions("size");
    assert_eq!(sizes.len(), 2);
    assert!(sizes[0].has_decorators(&["property"]));
    assert!(sizes[1].has_decorators(&["size.setter"]));
    assert!(sizes[1].has_pass());
}

#[test]
fn test_find_class() {
    let code = node(SHOP);
    assert!(code.has_class("Cart"));
    assert!(!code.has_class("Order"));
    assert!(code.find_class("price").is_empty());
}

// ============================================================================
// Variables
// ============================================================================

#[test]
fn test_find_variable() {
    let code = node(SHOP);
    assert!(code.find_variable("TAX").is_equivalent("TAX = 0.2").unwrap());
    assert!(code.has_variable("ratio"));
    assert!(!code.has_variable("total"));

    let price = code.find_function("price");
    assert!(price.find_variable("total").is_equivalent("total = amount * (1 + rate)").unwrap());
}

#[test]
fn test_find_variable_with_dotted_name() {
    let init = node(SHOP).find_class("Cart").find_function("__init__");
    assert!(init.find_variable("self.total").is_equivalent("self.total = 0").unwrap());
    assert!(init.find_variable("total").is_empty());
}

#[test]
fn test_find_variable_in_unpacking() {
    let code = node("a, (b, c) = pair\n[d, *e] = items\n");
    assert!(code.has_variable("c"));
    assert!(code.has_variable("e"));
    assert!(code.find_variable("c").is_equivalent("a, (b, c) = pair").unwrap());
}

#[test]
fn test_find_variables_includes_declarations() {
    let code = node(SHOP);
    let counts = code.find_variables("count");
    assert_eq!(counts.len(), 2);
    assert!(counts[0].is_equivalent("count: int").unwrap());
    assert!(counts[1].is_equivalent("count = 0").unwrap());
}

#[test]
fn test_find_aug_variable() {
    let price = node(SHOP).find_function("price");
    assert!(price.find_aug_variable("total").is_equivalent("total += 1").unwrap());
    assert!(price.find_aug_variable("amount").is_empty());
}

#[test]
fn test_get_variable() {
    let code = node(SHOP);
    let test_cases = vec![
        ("TAX", Some(Value::Float(0.2))),
        ("limit", Some(Value::Int(-3))),
        ("count", None),
        ("ratio", Some(Value::Float(1.5))),
        ("name", None),
        ("missing", None),
    ];

    for (name, expected) in test_cases {
        assert_eq!(code.get_variable(name), expected, "Failed for variable: {name}");
    }
}

#[test]
fn test_is_integer_and_value_is_call() {
    let code = node(SHOP);
    assert!(code.find_variables("count")[1].is_integer());
    assert!(code.find_variable("limit").is_integer());
    assert!(!code.find_variable("count").is_integer());
    assert!(!code.find_variable("ratio").is_integer());
    assert!(code.find_variable("name").value_is_call("input"));
    assert!(!code.find_variable("name").value_is_call("print"));
    assert!(!code.find_variable("ratio").value_is_call("input"));
}

#[test]
fn test_integers_beyond_i128() {
    let code = node(indoc! {"
        big = 340282366920938463463374607431768211456
        small = -0x1_0000_0000_0000_0000_0000_0000_0000_0000
    "});
    let digits = "340282366920938463463374607431768211456";
    assert_eq!(code.get_variable("big"), Some(Value::BigInt(digits.to_string())));
    assert_eq!(code.get_variable("small"), Some(Value::BigInt(format!("-{digits}"))));
    assert!(code.find_variable("big").is_integer());
    assert!(code.find_variable("small").is_integer());
    assert!(code.find_variable("big").is_equivalent(&format!("big = {digits}")).unwrap());
}

#[test]
fn test_variable_lookup_on_bodiless_node() {
    let assignment = node(SHOP).find_variable("TAX");
    assert!(assignment.find_variable("x").is_empty());
    assert!(assignment.find_variable("x").find_variable("x").is_empty());
    assert!(QueryNode::empty().find_variable("x").find_function("f").is_empty());
}

// ============================================================================
// Bodies
// ============================================================================

#[test]
fn test_find_body() {
    let fetch = node(SHOP).find_function("fetch");
    let body = fetch.find_body();
    assert_eq!(body.len(), 2);
    assert!(body.is_equivalent("data = await client.get(url)\nreturn data").unwrap());
    assert!(body.find_variable("data").find_body().is_empty());
}

#[test]
fn test_has_pass() {
    let code = node(indoc! {"
        def todo():
            pass

        if ready:
            pass
    "});
    assert!(code.find_function("todo").has_pass());
    assert!(!code.find_ifs()[0].has_pass());
    assert!(code.find_ifs()[0].find_bodies()[0].has_pass());
    assert!(!code.has_pass());
}

#[test]
fn test_has_return() {
    let price = node(SHOP).find_function("price");
    assert!(price.has_return("round(total, 2)").unwrap());
    assert!(!price.has_return("total").unwrap());
    assert!(!node("def f():\n    return\n").find_function("f").has_return("None").unwrap());
}

// ============================================================================
// Imports
// ============================================================================

#[test]
fn test_imports() {
    let code = node(SHOP);
    assert_eq!(code.find_imports().len(), 2);
    assert!(code.has_import("import math").unwrap());
    assert!(code.has_import("from collections import Counter as C").unwrap());
    assert!(!code.has_import("from collections import Counter").unwrap());
    assert!(!code.has_import("import os").unwrap());
}

// ============================================================================
// Calls
// ============================================================================

#[test]
fn test_find_calls_by_name() {
    let price = node(SHOP).find_function("price");
    assert_eq!(price.find_calls("print").len(), 1);
    assert_eq!(price.find_calls("round").len(), 1);
    assert!(price.find_calls("warning").is_empty());
}

#[test]
fn test_find_calls_matches_methods_and_paths() {
    let code = node("os.path.join(a, b)\nlogger.info('x')\n");
    assert_eq!(code.find_calls("join").len(), 1);
    assert_eq!(code.find_calls("os.path.join").len(), 1);
    assert_eq!(code.find_calls("info").len(), 1);
    assert!(code.find_calls("path").is_empty());
}

#[test]
fn test_has_call() {
    let price = node(SHOP).find_function("price");
    assert!(price.has_call("print").unwrap());
    assert!(price.has_call("print(\"price\", total)").unwrap());
    assert!(!price.has_call("print(total)").unwrap());
    assert!(!price.has_call("log.warning").unwrap());
}

#[test]
fn test_block_has_call_searches_nested_blocks() {
    let code = node(SHOP);
    let price = code.find_function("price");
    assert!(price.block_has_call("warning"));
    assert!(price.block_has_call("log.warning"));
    assert!(code.block_has_call("len"));
    assert!(!code.block_has_call("open"));
}

#[test]
fn test_calls_in_statement_heads() {
    let code = node("if check(x):\n    pass\nfor i in range(3):\n    pass\n");
    assert!(code.has_call("check").unwrap());
    assert!(code.has_call("range(3)").unwrap());
}

#[test]
fn test_find_call_args() {
    let price = node(SHOP).find_function("price");
    let args = price.find_calls("round")[0].find_call_args();
    assert_eq!(args.len(), 2);
    assert!(args[0].is_equivalent("total").unwrap());
    assert!(args[1].is_equivalent("2").unwrap());

    let statement = node("print(a, b)");
    assert_eq!(statement.find_call_args().len(), 2);
    assert!(node("x = 1").find_call_args().is_empty());
}
