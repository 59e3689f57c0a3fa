//! Numeric aggregation: `sum` and `summarize`.

use indexmap::IndexMap;

use crate::ast::Ast;
use crate::evaluator::{EvalError, Exec};
use crate::stack::{Frame, Stack};
use crate::value::Value;

use super::{check_arity, def, BuiltinResult};

fn numbers_of(value: Value, who: &str) -> Result<Vec<f64>, EvalError> {
    let Value::Array(arr) = value else {
        return Err(EvalError::Type(format!("{who} expects an array")));
    };
    arr.materialize()
        .into_iter()
        .map(|item| match item {
            Value::Number(n) => Ok(n),
            other => Err(EvalError::Type(format!("{who} expects an array of numbers, found {}", other.type_name()))),
        })
        .collect()
}

/// Reads its operand from the last argument, like `count` and the rest of the single-collection
/// builtins: a pipe stage written as `sum @` supplies the operand twice (once explicitly, once
/// via the pipe's implicit trailing argument) and the last one wins.
fn sum(args: &[Ast], stack: &Stack, exec: Exec) -> BuiltinResult {
    check_arity("sum", args, 1, Some(2))?;
    let numbers = numbers_of(exec(args.last().unwrap(), stack)?, "sum")?;
    Ok(Value::Number(numbers.into_iter().sum()))
}

/// `{max, min, mean, median, variance, stddev}` — variance and standard deviation use the
/// sample (n-1) divisor, matching the statistics-module semantics this built-in is modeled on.
fn summarize(args: &[Ast], stack: &Stack, exec: Exec) -> BuiltinResult {
    check_arity("summarize", args, 1, Some(2))?;
    let numbers = numbers_of(exec(args.last().unwrap(), stack)?, "summarize")?;
    if numbers.is_empty() {
        return Err(EvalError::Runtime("summarize of an empty array".to_string()));
    }
    let n = numbers.len() as f64;
    let max = numbers.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let min = numbers.iter().cloned().fold(f64::INFINITY, f64::min);
    let mean = numbers.iter().sum::<f64>() / n;

    let mut sorted = numbers.clone();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let mid = sorted.len() / 2;
    let median =
        if sorted.len() % 2 == 1 { sorted[mid] } else { (sorted[mid - 1] + sorted[mid]) / 2.0 };

    let variance = if numbers.len() > 1 {
        numbers.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (n - 1.0)
    } else {
        0.0
    };
    let stddev = variance.sqrt();

    let mut out = IndexMap::new();
    out.insert("max".to_string(), Value::Number(max));
    out.insert("min".to_string(), Value::Number(min));
    out.insert("mean".to_string(), Value::Number(mean));
    out.insert("median".to_string(), Value::Number(median));
    out.insert("variance".to_string(), Value::Number(variance));
    out.insert("stddev".to_string(), Value::Number(stddev));
    Ok(Value::object(out))
}

pub(super) fn register(frame: &mut Frame) {
    def(frame, "sum", sum);
    def(frame, "summarize", summarize);
}
