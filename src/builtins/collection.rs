//! Sequence and mapping operations: `map`, `filter`, `reduce`, the `*keys`/`*values` family,
//! `sort`/`sortby`, `groupby`, `withindices`, `flatten`, `sequence`, `reverse`, and the `string`
//! / `float` coercions.

use indexmap::IndexMap;

use crate::ast::Ast;
use crate::evaluator::{EvalError, Exec};
use crate::stack::{Frame, Stack};
use crate::value::Value;

use super::{apply_with_focus, check_arity, def, BuiltinResult};

/// Like every builtin whose conventional call form takes a single collection argument, `count`
/// reads its operand from the *last* argument rather than insisting on exactly one: a pipe stage
/// written as `count @` (redundant but legal — `@` is already the piped-in value) supplies the
/// operand twice, and the second copy, appended by the pipe desugaring, is the one that counts.
fn count(args: &[Ast], stack: &Stack, exec: Exec) -> BuiltinResult {
    check_arity("count", args, 1, Some(2))?;
    let value = exec(args.last().unwrap(), stack)?;
    match value {
        Value::Array(a) => Ok(Value::Number(a.len() as f64)),
        Value::Object(o) => Ok(Value::Number(o.len() as f64)),
        Value::String(s) => Ok(Value::Number(s.chars().count() as f64)),
        other => Err(EvalError::Type(format!("cannot count a {}", other.type_name()))),
    }
}

fn keys(args: &[Ast], stack: &Stack, exec: Exec) -> BuiltinResult {
    check_arity("keys", args, 1, Some(2))?;
    match exec(args.last().unwrap(), stack)? {
        Value::Object(o) => Ok(Value::array(o.keys().into_iter().map(Value::string).collect())),
        other => Err(EvalError::Type(format!("cannot take keys of a {}", other.type_name()))),
    }
}

fn values(args: &[Ast], stack: &Stack, exec: Exec) -> BuiltinResult {
    check_arity("values", args, 1, Some(2))?;
    match exec(args.last().unwrap(), stack)? {
        Value::Object(o) => Ok(Value::array(o.materialize().into_values().collect())),
        other => Err(EvalError::Type(format!("cannot take values of a {}", other.type_name()))),
    }
}

fn entries(args: &[Ast], stack: &Stack, exec: Exec) -> BuiltinResult {
    check_arity("entries", args, 1, Some(2))?;
    match exec(args.last().unwrap(), stack)? {
        Value::Object(o) => {
            let pairs =
                o.materialize().into_iter().map(|(k, v)| Value::array(vec![Value::string(k), v])).collect();
            Ok(Value::array(pairs))
        }
        other => Err(EvalError::Type(format!("cannot take entries of a {}", other.type_name()))),
    }
}

fn fromentries(args: &[Ast], stack: &Stack, exec: Exec) -> BuiltinResult {
    check_arity("fromentries", args, 1, Some(2))?;
    let Value::Array(arr) = exec(args.last().unwrap(), stack)? else {
        return Err(EvalError::Type("fromentries expects an array of pairs".to_string()));
    };
    let mut out = IndexMap::new();
    for entry in arr.materialize() {
        let Value::Array(pair) = entry else {
            return Err(EvalError::Type("fromentries expects an array of [key, value] pairs".to_string()));
        };
        let pair = pair.materialize();
        let key = pair.first().cloned().unwrap_or(Value::Null);
        let value = pair.get(1).cloned().unwrap_or(Value::Null);
        out.insert(key.to_display_string(), value);
    }
    Ok(Value::object(out))
}

fn map_builtin(args: &[Ast], stack: &Stack, exec: Exec) -> BuiltinResult {
    check_arity("map", args, 2, Some(2))?;
    let Value::Array(arr) = exec(&args[1], stack)? else {
        return Err(EvalError::Type("map expects an array".to_string()));
    };
    let mapped = arr
        .materialize()
        .into_iter()
        .map(|item| apply_with_focus(&args[0], item, stack, exec))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Value::array(mapped))
}

fn filter_builtin(args: &[Ast], stack: &Stack, exec: Exec) -> BuiltinResult {
    check_arity("filter", args, 2, Some(2))?;
    let Value::Array(arr) = exec(&args[1], stack)? else {
        return Err(EvalError::Type("filter expects an array".to_string()));
    };
    let mut kept = Vec::new();
    for item in arr.materialize() {
        if apply_with_focus(&args[0], item.clone(), stack, exec)?.truthy() {
            kept.push(item);
        }
    }
    Ok(Value::array(kept))
}

/// `reduce fn initial array` folds over the array starting from the explicit seed. The callback
/// sees `@` bound to a two-element `[accumulator, item]` array, matching the established
/// focus-passing convention for lambdas.
fn reduce(args: &[Ast], stack: &Stack, exec: Exec) -> BuiltinResult {
    check_arity("reduce", args, 3, Some(3))?;
    let Value::Array(arr) = exec(&args[2], stack)? else {
        return Err(EvalError::Type("reduce expects an array".to_string()));
    };
    let mut acc = exec(&args[1], stack)?;
    for item in arr.materialize() {
        let pair = Value::array(vec![acc, item]);
        acc = apply_with_focus(&args[0], pair, stack, exec)?;
    }
    Ok(acc)
}

fn find(args: &[Ast], stack: &Stack, exec: Exec) -> BuiltinResult {
    check_arity("find", args, 2, Some(2))?;
    let Value::Array(arr) = exec(&args[1], stack)? else {
        return Err(EvalError::Type("find expects an array".to_string()));
    };
    for item in arr.materialize() {
        if apply_with_focus(&args[0], item.clone(), stack, exec)?.truthy() {
            return Ok(item);
        }
    }
    Ok(Value::Null)
}

fn apply(args: &[Ast], stack: &Stack, exec: Exec) -> BuiltinResult {
    check_arity("apply", args, 2, Some(2))?;
    let value = exec(&args[1], stack)?;
    apply_with_focus(&args[0], value, stack, exec)
}

fn mapvalues(args: &[Ast], stack: &Stack, exec: Exec) -> BuiltinResult {
    check_arity("mapvalues", args, 2, Some(2))?;
    let Value::Object(obj) = exec(&args[1], stack)? else {
        return Err(EvalError::Type("mapvalues expects an object".to_string()));
    };
    let mut out = IndexMap::new();
    for (k, v) in obj.materialize() {
        out.insert(k, apply_with_focus(&args[0], v, stack, exec)?);
    }
    Ok(Value::object(out))
}

fn mapkeys(args: &[Ast], stack: &Stack, exec: Exec) -> BuiltinResult {
    check_arity("mapkeys", args, 2, Some(2))?;
    let Value::Object(obj) = exec(&args[1], stack)? else {
        return Err(EvalError::Type("mapkeys expects an object".to_string()));
    };
    let mut out = IndexMap::new();
    for (k, v) in obj.materialize() {
        let new_key = apply_with_focus(&args[0], Value::string(k), stack, exec)?.to_display_string();
        out.insert(new_key, v);
    }
    Ok(Value::object(out))
}

fn filtervalues(args: &[Ast], stack: &Stack, exec: Exec) -> BuiltinResult {
    check_arity("filtervalues", args, 2, Some(2))?;
    let Value::Object(obj) = exec(&args[1], stack)? else {
        return Err(EvalError::Type("filtervalues expects an object".to_string()));
    };
    let mut out = IndexMap::new();
    for (k, v) in obj.materialize() {
        if apply_with_focus(&args[0], v.clone(), stack, exec)?.truthy() {
            out.insert(k, v);
        }
    }
    Ok(Value::object(out))
}

fn filterkeys(args: &[Ast], stack: &Stack, exec: Exec) -> BuiltinResult {
    check_arity("filterkeys", args, 2, Some(2))?;
    let Value::Object(obj) = exec(&args[1], stack)? else {
        return Err(EvalError::Type("filterkeys expects an object".to_string()));
    };
    let mut out = IndexMap::new();
    for (k, v) in obj.materialize() {
        if apply_with_focus(&args[0], Value::string(k.clone()), stack, exec)?.truthy() {
            out.insert(k, v);
        }
    }
    Ok(Value::object(out))
}

fn require_uniform_comparable(items: &[Value], who: &str) -> Result<(), EvalError> {
    for item in items {
        if !item.is_comparable() {
            return Err(EvalError::Type(format!("{who}: {} is not comparable", item.type_name())));
        }
    }
    if let Some(first) = items.first() {
        let kind = first.type_name();
        if items.iter().any(|i| i.type_name() != kind) {
            return Err(EvalError::Type(format!("{who}: cannot compare mixed types")));
        }
    }
    Ok(())
}

fn sort(args: &[Ast], stack: &Stack, exec: Exec) -> BuiltinResult {
    check_arity("sort", args, 1, Some(2))?;
    let Value::Array(arr) = exec(args.last().unwrap(), stack)? else {
        return Err(EvalError::Type("sort expects an array".to_string()));
    };
    let mut items = arr.materialize();
    require_uniform_comparable(&items, "sort")?;
    items.sort_by(|a, b| a.compare(b).unwrap_or(std::cmp::Ordering::Equal));
    Ok(Value::array(items))
}

fn sortby(args: &[Ast], stack: &Stack, exec: Exec) -> BuiltinResult {
    check_arity("sortby", args, 2, Some(2))?;
    let Value::Array(arr) = exec(&args[1], stack)? else {
        return Err(EvalError::Type("sortby expects an array".to_string()));
    };
    let items = arr.materialize();
    let keys = items
        .iter()
        .map(|item| apply_with_focus(&args[0], item.clone(), stack, exec))
        .collect::<Result<Vec<_>, _>>()?;
    require_uniform_comparable(&keys, "sortby")?;
    let mut paired: Vec<(Value, Value)> = keys.into_iter().zip(items).collect();
    paired.sort_by(|a, b| a.0.compare(&b.0).unwrap_or(std::cmp::Ordering::Equal));
    Ok(Value::array(paired.into_iter().map(|(_, item)| item).collect()))
}

fn groupby(args: &[Ast], stack: &Stack, exec: Exec) -> BuiltinResult {
    check_arity("groupby", args, 2, Some(2))?;
    let Value::Array(arr) = exec(&args[1], stack)? else {
        return Err(EvalError::Type("groupby expects an array".to_string()));
    };
    let mut groups: IndexMap<String, Vec<Value>> = IndexMap::new();
    for item in arr.materialize() {
        let key = apply_with_focus(&args[0], item.clone(), stack, exec)?.to_display_string();
        groups.entry(key).or_default().push(item);
    }
    let object = groups.into_iter().map(|(k, items)| (k, Value::array(items))).collect();
    Ok(Value::object(object))
}

fn withindices(args: &[Ast], stack: &Stack, exec: Exec) -> BuiltinResult {
    check_arity("withindices", args, 1, Some(2))?;
    let Value::Array(arr) = exec(args.last().unwrap(), stack)? else {
        return Err(EvalError::Type("withindices expects an array".to_string()));
    };
    let paired = arr
        .materialize()
        .into_iter()
        .enumerate()
        .map(|(i, v)| Value::array(vec![Value::Number(i as f64), v]))
        .collect();
    Ok(Value::array(paired))
}

fn flatten(args: &[Ast], stack: &Stack, exec: Exec) -> BuiltinResult {
    check_arity("flatten", args, 1, Some(2))?;
    let Value::Array(arr) = exec(args.last().unwrap(), stack)? else {
        return Err(EvalError::Type("flatten expects an array".to_string()));
    };
    let mut out = Vec::new();
    for item in arr.materialize() {
        match item {
            Value::Array(inner) => out.extend(inner.materialize()),
            other => return Err(EvalError::Type(format!("flatten expects an array of arrays, found {}", other.type_name()))),
        }
    }
    Ok(Value::array(out))
}

/// Every strictly-increasing tuple of indices into the target array where each predicate, in
/// order, is truthy at the corresponding position.
fn sequence_helper(
    preds: &[Ast],
    items: &[Value],
    start: usize,
    acc: &mut Vec<Value>,
    stack: &Stack,
    exec: Exec,
    results: &mut Vec<Vec<Value>>,
) -> Result<(), EvalError> {
    let Some((first, rest)) = preds.split_first() else {
        results.push(acc.clone());
        return Ok(());
    };
    for i in start..items.len() {
        if apply_with_focus(first, items[i].clone(), stack, exec)?.truthy() {
            acc.push(items[i].clone());
            sequence_helper(rest, items, i + 1, acc, stack, exec, results)?;
            acc.pop();
        }
    }
    Ok(())
}

fn sequence(args: &[Ast], stack: &Stack, exec: Exec) -> BuiltinResult {
    check_arity("sequence", args, 2, None)?;
    let (preds, target_ast) = args.split_at(args.len() - 1);
    let Value::Array(arr) = exec(&target_ast[0], stack)? else {
        return Err(EvalError::Type("sequence expects its last argument to be an array".to_string()));
    };
    let items = arr.materialize();
    let mut results = Vec::new();
    sequence_helper(preds, &items, 0, &mut Vec::new(), stack, exec, &mut results)?;
    Ok(Value::array(results.into_iter().map(Value::array).collect()))
}

fn reverse(args: &[Ast], stack: &Stack, exec: Exec) -> BuiltinResult {
    check_arity("reverse", args, 1, Some(2))?;
    match exec(args.last().unwrap(), stack)? {
        Value::Array(arr) => {
            let mut items = arr.materialize();
            items.reverse();
            Ok(Value::array(items))
        }
        Value::String(s) => Ok(Value::string(s.chars().rev().collect::<String>())),
        other => Err(EvalError::Type(format!("cannot reverse a {}", other.type_name()))),
    }
}

fn string(args: &[Ast], stack: &Stack, exec: Exec) -> BuiltinResult {
    check_arity("string", args, 1, Some(2))?;
    Ok(Value::string(exec(args.last().unwrap(), stack)?.to_display_string()))
}

fn float(args: &[Ast], stack: &Stack, exec: Exec) -> BuiltinResult {
    check_arity("float", args, 1, Some(2))?;
    Ok(Value::Number(exec(args.last().unwrap(), stack)?.to_float()?))
}

pub(super) fn register(frame: &mut Frame) {
    def(frame, "count", count);
    def(frame, "keys", keys);
    def(frame, "values", values);
    def(frame, "entries", entries);
    def(frame, "fromentries", fromentries);
    def(frame, "map", map_builtin);
    def(frame, "filter", filter_builtin);
    def(frame, "reduce", reduce);
    def(frame, "find", find);
    def(frame, "apply", apply);
    def(frame, "mapvalues", mapvalues);
    def(frame, "mapkeys", mapkeys);
    def(frame, "filtervalues", filtervalues);
    def(frame, "filterkeys", filterkeys);
    def(frame, "sort", sort);
    def(frame, "sortby", sortby);
    def(frame, "groupby", groupby);
    def(frame, "withindices", withindices);
    def(frame, "flatten", flatten);
    def(frame, "sequence", sequence);
    def(frame, "reverse", reverse);
    def(frame, "string", string);
    def(frame, "float", float);
}
