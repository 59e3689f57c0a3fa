//! Boundary-wrapped host callables: the `extras` half of the embedding API (`spec.md` §6).
//!
//! A host function is registered with its declared minimum arity and whether it is variadic —
//! Rust closures carry no argspec to introspect the way
//! `examples/original_source/py/mistql/runtime_value.py`'s `from_py_func` inspects a Python
//! function, so the caller states the arity instead (`DESIGN.md`, Open Question 6). Wrapping
//! produces a regular `Value::Function`: arguments are evaluated in the caller's stack,
//! converted across the garden wall to JSON, handed to the host closure, and the JSON result is
//! converted back.

use std::rc::Rc;

use crate::evaluator::EvalError;
use crate::gardenwall::{from_json, to_json};
use crate::value::{Function, Value};

/// Errors raised at *registration* time, before any query ever runs — these are programmer
/// errors in how an extra was declared, not query-time failures.
#[derive(Debug, Clone, PartialEq)]
pub enum ExtraError {
    /// "The language has no zero-argument call form" (`spec.md` §6): a host callable that
    /// takes no arguments can never be invoked from a query, so it is rejected up front.
    ZeroArity,
}

impl std::fmt::Display for ExtraError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExtraError::ZeroArity => {
                write!(f, "cannot register a host callable with no arguments")
            }
        }
    }
}

impl std::error::Error for ExtraError {}

/// Wrap a host closure as a MistQL `Value::Function`, under the arity the caller declares for
/// it. `min_arity` is the fewest positional arguments the closure requires; `variadic` means
/// it accepts any number at or above `min_arity` (no declared maximum).
///
/// Keyword-only parameters have no Rust equivalent to reject at wrap time (there is no
/// reflection over an arbitrary `Fn`'s signature) — the caller is responsible for only
/// registering closures that take a flat, positional `&[serde_json::Value]` slice.
pub fn wrap_host_fn(
    name: impl Into<String>,
    min_arity: usize,
    variadic: bool,
    f: impl Fn(&[serde_json::Value]) -> Result<serde_json::Value, String> + 'static,
) -> Result<Value, ExtraError> {
    if min_arity == 0 && !variadic {
        return Err(ExtraError::ZeroArity);
    }
    let name = name.into();
    let max_arity = if variadic { None } else { Some(min_arity) };
    let display_name = name.clone();

    let native = move |args: &[crate::ast::Ast], stack: &crate::stack::Stack, exec: crate::evaluator::Exec| {
        if args.len() < min_arity {
            return Err(EvalError::Type(format!(
                "{display_name} takes no fewer than {min_arity} argument(s) but {} were provided",
                args.len()
            )));
        }
        if let Some(max) = max_arity {
            if args.len() > max {
                return Err(EvalError::Type(format!(
                    "{display_name} takes no more than {max} argument(s) but {} were provided",
                    args.len()
                )));
            }
        }
        let host_args = args
            .iter()
            .map(|a| {
                let value = exec(a, stack)?;
                to_json(&value).map_err(|e| EvalError::Runtime(e.to_string()))
            })
            .collect::<Result<Vec<_>, EvalError>>()?;
        let result = f(&host_args).map_err(EvalError::Runtime)?;
        Ok(from_json(&result))
    };

    Ok(Value::Function(Rc::new(Function { name, f: Rc::new(native) })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_arity_host_functions_are_rejected_at_wrap_time() {
        let result = wrap_host_fn("noop", 0, false, |_args| Ok(serde_json::json!(null)));
        assert_eq!(result, Err(ExtraError::ZeroArity));
    }

    #[test]
    fn wrapped_host_function_round_trips_through_the_garden_wall() {
        let double = wrap_host_fn("double", 1, false, |args| {
            let n = args[0].as_f64().ok_or("expected a number")?;
            Ok(serde_json::json!(n * 2.0))
        })
        .unwrap();

        let mut instance = crate::instance::Instance::new();
        instance.register_extra("double", double);
        let result = instance.query("double @", Value::Number(21.0)).unwrap();
        assert_eq!(result, Value::Number(42.0));
    }

    #[test]
    fn arity_violations_surface_as_a_type_error() {
        let double = wrap_host_fn("double", 1, false, |args| {
            let n = args[0].as_f64().ok_or("expected a number")?;
            Ok(serde_json::json!(n * 2.0))
        })
        .unwrap();

        let mut instance = crate::instance::Instance::new();
        instance.register_extra("double", double);
        let err = instance.query("double @ @", Value::Number(1.0)).unwrap_err();
        assert_eq!(err.kind, crate::error::Kind::Type);
    }

    #[test]
    fn variadic_host_functions_accept_any_count_at_or_above_the_minimum() {
        let sum_all = wrap_host_fn("sumall", 1, true, |args| {
            let total: f64 = args.iter().filter_map(|v| v.as_f64()).sum();
            Ok(serde_json::json!(total))
        })
        .unwrap();

        let mut instance = crate::instance::Instance::new();
        instance.register_extra("sumall", sum_all);
        let result = instance.query("sumall 1 2 3", Value::Null).unwrap();
        assert_eq!(result, Value::Number(6.0));
    }
}
