//! String and regular-expression operations: `regex`, `match`/`=~`, `replace`, `split`,
//! `stringjoin`.

use std::rc::Rc;

use regex::Regex;

use crate::ast::Ast;
use crate::evaluator::{EvalError, Exec};
use crate::stack::{Frame, Stack};
use crate::value::{RegexValue, Value};

use super::{check_arity, def, BuiltinResult};

fn regex_builtin(args: &[Ast], stack: &Stack, exec: Exec) -> BuiltinResult {
    check_arity("regex", args, 1, Some(2))?;
    let Value::String(pattern) = exec(&args[0], stack)? else {
        return Err(EvalError::Type("regex expects a string pattern".to_string()));
    };
    let flags = if args.len() == 2 {
        match exec(&args[1], stack)? {
            Value::String(f) => f.to_string(),
            other => return Err(EvalError::Type(format!("regex flags must be a string, found {}", other.type_name()))),
        }
    } else {
        String::new()
    };

    let mut global = false;
    let mut inline = String::new();
    for ch in flags.chars() {
        match ch {
            'g' => global = true,
            'i' | 'm' | 's' => inline.push(ch),
            other => return Err(EvalError::Runtime(format!("unknown regex flag '{other}'"))),
        }
    }
    let source = pattern.to_string();
    let compiled_source = if inline.is_empty() { source.clone() } else { format!("(?{inline}){source}") };
    let compiled = Regex::new(&compiled_source).map_err(|e| EvalError::Runtime(format!("invalid regex: {e}")))?;
    Ok(Value::Regex(Rc::new(RegexValue { source, flags, global, compiled })))
}

fn match_against(pattern: &Value, value: &Value) -> BuiltinResult {
    let Value::String(text) = value else {
        return Err(EvalError::Type(format!("cannot match a {}", value.type_name())));
    };
    match pattern {
        Value::Regex(r) => Ok(Value::Boolean(r.compiled.is_match(text))),
        Value::String(p) => Ok(Value::Boolean(text.contains(p.as_ref()))),
        other => Err(EvalError::Type(format!("cannot match against a {}", other.type_name()))),
    }
}

/// `match pattern value`.
fn match_builtin(args: &[Ast], stack: &Stack, exec: Exec) -> BuiltinResult {
    check_arity("match", args, 2, Some(2))?;
    let pattern = exec(&args[0], stack)?;
    let value = exec(&args[1], stack)?;
    match_against(&pattern, &value)
}

/// `value =~ pattern` — same semantics as `match`, operands reversed.
fn match_operator(args: &[Ast], stack: &Stack, exec: Exec) -> BuiltinResult {
    check_arity("=~", args, 2, Some(2))?;
    let value = exec(&args[0], stack)?;
    let pattern = exec(&args[1], stack)?;
    match_against(&pattern, &value)
}

/// `replace pattern replacement value` — a Regex with the `g` modifier replaces every match;
/// otherwise only the first match (regex or literal substring) is replaced.
fn replace(args: &[Ast], stack: &Stack, exec: Exec) -> BuiltinResult {
    check_arity("replace", args, 3, Some(3))?;
    let pattern = exec(&args[0], stack)?;
    let replacement = exec(&args[1], stack)?.to_display_string();
    let Value::String(text) = exec(&args[2], stack)? else {
        return Err(EvalError::Type("replace expects a string to operate on".to_string()));
    };
    match pattern {
        Value::Regex(r) => {
            let result = if r.global {
                r.compiled.replace_all(&text, replacement.as_str()).into_owned()
            } else {
                r.compiled.replace(&text, replacement.as_str()).into_owned()
            };
            Ok(Value::string(result))
        }
        Value::String(p) => Ok(Value::string(text.replacen(p.as_ref(), &replacement, 1))),
        other => Err(EvalError::Type(format!("cannot replace using a {}", other.type_name()))),
    }
}

/// `split delimiter value` — an empty string delimiter explodes into individual characters.
fn split(args: &[Ast], stack: &Stack, exec: Exec) -> BuiltinResult {
    check_arity("split", args, 2, Some(2))?;
    let delimiter = exec(&args[0], stack)?;
    let Value::String(text) = exec(&args[1], stack)? else {
        return Err(EvalError::Type("split expects a string to operate on".to_string()));
    };
    match delimiter {
        Value::String(d) if d.is_empty() => {
            Ok(Value::array(text.chars().map(|c| Value::string(c.to_string())).collect()))
        }
        Value::String(d) => Ok(Value::array(text.split(d.as_ref()).map(Value::string).collect())),
        Value::Regex(r) => Ok(Value::array(r.compiled.split(&text).map(Value::string).collect())),
        other => Err(EvalError::Type(format!("cannot split using a {}", other.type_name()))),
    }
}

fn stringjoin(args: &[Ast], stack: &Stack, exec: Exec) -> BuiltinResult {
    check_arity("stringjoin", args, 2, Some(2))?;
    let delimiter = exec(&args[0], stack)?.to_display_string();
    let Value::Array(arr) = exec(&args[1], stack)? else {
        return Err(EvalError::Type("stringjoin expects an array".to_string()));
    };
    let joined =
        arr.materialize().iter().map(Value::to_display_string).collect::<Vec<_>>().join(&delimiter);
    Ok(Value::string(joined))
}

pub(super) fn register(frame: &mut Frame) {
    def(frame, "regex", regex_builtin);
    def(frame, "match", match_builtin);
    def(frame, "=~", match_operator);
    def(frame, "replace", replace);
    def(frame, "split", split);
    def(frame, "stringjoin", stringjoin);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluator::eval;

    fn eval_query(query: &str, input: Value) -> Value {
        let ast = crate::parser::Parser::parse(query).map(crate::lowering::lower).unwrap();
        let stack = Stack::build_initial(input, super::super::build_root_frame());
        eval(&ast, &stack).unwrap()
    }

    #[test]
    fn literal_string_match_is_substring_search() {
        let result = eval_query(r#"match "ell" @"#, Value::string("hello"));
        assert_eq!(result, Value::Boolean(true));
    }

    #[test]
    fn global_replace_affects_every_match() {
        let result = eval_query(r#"replace (regex "l" "g") "L" @"#, Value::string("hello"));
        assert_eq!(result, Value::string("heLLo"));
    }

    #[test]
    fn non_global_replace_only_affects_the_first_match() {
        let result = eval_query(r#"replace (regex "l") "L" @"#, Value::string("hello"));
        assert_eq!(result, Value::string("heLlo"));
    }

    #[test]
    fn splitting_on_empty_string_explodes_to_characters() {
        let result = eval_query(r#"split "" @"#, Value::string("ab"));
        assert_eq!(result, Value::array(vec![Value::string("a"), Value::string("b")]));
    }
}
