//! Black-box tests against the public embedding API (`mistql::query`/`parse`/`evaluate`), one
//! per built-in family, exercised the way an embedder actually calls this crate.

use mistql::{evaluate, parse, query, Kind};
use serde_json::json;

fn run(q: &str, data: serde_json::Value) -> serde_json::Value {
    query(q, &data).unwrap_or_else(|e| panic!("query {q:?} failed: {e}"))
}

fn run_err(q: &str, data: serde_json::Value) -> Kind {
    query(q, &data).unwrap_err().kind
}

#[test]
fn root_and_dollar_references() {
    assert_eq!(run("@", json!(42)), json!(42));
    assert_eq!(run("$.a", json!({"a": 1})), json!(1));
}

#[test]
fn field_access_and_implicit_shadowing() {
    let doc = json!({"name": "Ada", "age": 37});
    assert_eq!(run("name", doc.clone()), json!("Ada"));
    assert_eq!(run("@.name", doc), json!("Ada"));
}

#[test]
fn arithmetic_and_string_concatenation() {
    assert_eq!(run("1 + 2 * 3", json!(null)), json!(7));
    assert_eq!(run(r#""a" + "b""#, json!(null)), json!("ab"));
    assert_eq!(run("[1] + [2]", json!(null)), json!([1, 2]));
}

#[test]
fn binary_subtraction() {
    assert_eq!(run("5 - 3", json!(null)), json!(2));
    let doc = json!({"a": 10, "b": 4});
    assert_eq!(run("@.a - @.b", doc), json!(6));
}

#[test]
fn comparisons_and_boolean_operators() {
    assert_eq!(run("1 < 2 && 2 < 3", json!(null)), json!(true));
    assert_eq!(run("false || 5", json!(null)), json!(5));
    assert_eq!(run("!false", json!(null)), json!(true));
}

#[test]
fn if_only_evaluates_the_taken_branch() {
    // `if cond then else` is a plain 3-ary juxtaposition call, no "then"/"else" keywords.
    // Dividing by zero in the untaken branch must not raise.
    assert_eq!(run("if true 1 (1 / 0)", json!(null)), json!(1));
}

#[test]
fn pipe_threads_focus_and_trailing_argument() {
    let doc = json!([{"name": "A", "age": 20}, {"name": "B", "age": 10}, {"name": "C", "age": 30}]);
    let result = run("@ | filter (@.age > 18) | map @.name", doc);
    assert_eq!(result, json!(["A", "C"]));
}

#[test]
fn groupby_preserves_first_occurrence_order() {
    let doc = json!([{"k": "x", "v": 1}, {"k": "y", "v": 2}, {"k": "x", "v": 3}]);
    let result = run("@ | groupby @.k", doc);
    assert_eq!(
        result,
        json!({"x": [{"k": "x", "v": 1}, {"k": "x", "v": 3}], "y": [{"k": "y", "v": 2}]})
    );
}

#[test]
fn slicing_supports_negative_bounds() {
    assert_eq!(run("@[1:-1]", json!([0, 1, 2, 3, 4])), json!([1, 2, 3]));
}

#[test]
fn split_on_whitespace() {
    assert_eq!(run(r#""hello world" | split " ""#, json!(null)), json!(["hello", "world"]));
}

#[test]
fn summarize_reports_all_five_statistics() {
    let result = run("summarize @", json!([1, 2, 3, 4, 5]));
    assert_eq!(
        result,
        json!({"max": 5, "min": 1, "mean": 3, "median": 3, "variance": 2.5, "stddev": 1.5811388300841898})
    );
}

#[test]
fn regex_global_replace_vs_first_match() {
    assert_eq!(run(r#"replace (regex "o" "g") "0" @"#, json!("foo boo")), json!("f00 b00"));
    assert_eq!(run(r#"replace (regex "o") "0" @"#, json!("foo boo")), json!("f0o boo"));
}

#[test]
fn sort_and_sortby_are_ascending() {
    assert_eq!(run("sort @", json!([3, 1, 2])), json!([1, 2, 3]));
    let doc = json!([{"k": 3}, {"k": 1}, {"k": 2}]);
    let result = run("sortby @.k @", doc);
    assert_eq!(result, json!([{"k": 1}, {"k": 2}, {"k": 3}]));
}

#[test]
fn reduce_folds_left_to_right() {
    assert_eq!(run("reduce (@[0] + @[1]) 0 @", json!([1, 2, 3, 4])), json!(10));
}

#[test]
fn entries_and_fromentries_round_trip() {
    let doc = json!({"a": 1, "b": 2});
    let entries = run("entries @", doc.clone());
    assert_eq!(entries, json!([["a", 1], ["b", 2]]));
    assert_eq!(run("entries @ | fromentries", doc), json!({"a": 1, "b": 2}));
}

#[test]
fn sequence_finds_increasing_index_tuples() {
    let doc = json!([1, 2, 1, 2, 1]);
    let result = run("sequence (@ == 1) (@ == 2) @", doc);
    assert_eq!(result, json!([[1, 2], [1, 2], [1, 2]]));
}

#[test]
fn undefined_reference_is_a_reference_error() {
    assert_eq!(run_err("nonexistent_name_entirely", json!(null)), Kind::Reference);
}

#[test]
fn calling_a_non_function_is_a_type_error() {
    assert_eq!(run_err("(1) 2", json!(null)), Kind::Type);
}

#[test]
fn malformed_query_is_a_syntax_error() {
    assert_eq!(run_err("@ |", json!(null)), Kind::Syntax);
}

#[test]
fn non_integral_index_is_a_runtime_error() {
    assert_eq!(run_err("@[1.5]", json!([1, 2, 3])), Kind::Runtime);
}

#[test]
fn parse_and_evaluate_can_be_used_separately_from_query() {
    let ast = parse("@ * 2").unwrap();
    let input = mistql::Value::Number(21.0);
    assert_eq!(evaluate(&ast, input).unwrap(), mistql::Value::Number(42.0));
}

#[test]
fn extras_are_reachable_as_absolute_references() {
    use mistql::Instance;

    let double = mistql::extras::wrap_host_fn("double", 1, false, |args| {
        Ok(json!(args[0].as_f64().unwrap_or(0.0) * 2.0))
    })
    .unwrap();

    let mut instance = Instance::new();
    instance.register_extra("double", double);
    let result = instance.query("double @", mistql::Value::Number(21.0)).unwrap();
    assert_eq!(result, mistql::Value::Number(42.0));
}
