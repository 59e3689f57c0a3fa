//! Field/element access: the `.` accessor and the `index` built-in behind both `[e]` and
//! `[a:b]` postfix syntax.

use crate::ast::Ast;
use crate::evaluator::{EvalError, Exec};
use crate::stack::{Frame, Stack};
use crate::value::Value;

use super::{check_arity, def, BuiltinResult};

/// `left.name` — the right-hand side is the literal field name from the parse tree, not
/// something to look up in scope, so it is read directly off the AST rather than evaluated.
///
/// Unlike `index`, `.` never raises a type error for a non-Object target: `x.name` is `Null`
/// whenever `x` isn't an Object, the same way `x.name` is `Null` when `x` is `Null`.
fn dot(args: &[Ast], stack: &Stack, exec: Exec) -> BuiltinResult {
    check_arity(".", args, 2, Some(2))?;
    let target = exec(&args[0], stack)?;
    let name = match &args[1] {
        Ast::Ref(r) => r.name.clone(),
        other => return Err(EvalError::Internal(format!("dot right-hand side is not a field name: {other:?}"))),
    };
    match &target {
        Value::Object(_) => index_single(&Value::string(name), &target),
        _ => Ok(Value::Null),
    }
}

/// Dispatches to a single-index lookup (2 args: key, target) or a two-sided slice (3 args:
/// low, high, target) depending on how many slots the postfix form provided.
fn index(args: &[Ast], stack: &Stack, exec: Exec) -> BuiltinResult {
    match args.len() {
        2 => {
            let key = exec(&args[0], stack)?;
            let target = exec(&args[1], stack)?;
            index_single(&key, &target)
        }
        3 => {
            let lo = exec(&args[0], stack)?;
            let hi = exec(&args[1], stack)?;
            let target = exec(&args[2], stack)?;
            index_double(&lo, &hi, &target)
        }
        n => Err(EvalError::Runtime(format!("index expects 2 or 3 arguments, got {n} (only a:b slices are supported)"))),
    }
}

fn index_single(key: &Value, target: &Value) -> BuiltinResult {
    match (target, key) {
        (Value::Null, Value::Number(_)) | (Value::Null, Value::String(_)) => Ok(Value::Null),
        (Value::Array(arr), Value::Number(n)) => {
            let Some(idx) = normalize_index(*n, arr.len() as i64)? else { return Ok(Value::Null) };
            Ok(arr.get(idx as usize).unwrap_or(Value::Null))
        }
        (Value::String(s), Value::Number(n)) => {
            let chars: Vec<char> = s.chars().collect();
            let Some(idx) = normalize_index(*n, chars.len() as i64)? else { return Ok(Value::Null) };
            Ok(chars.get(idx as usize).map(|c| Value::string(c.to_string())).unwrap_or(Value::Null))
        }
        (Value::Object(obj), Value::String(k)) => Ok(obj.get(k).unwrap_or(Value::Null)),
        _ => Err(EvalError::Type(format!("cannot index a {} with a {}", target.type_name(), key.type_name()))),
    }
}

fn index_double(lo: &Value, hi: &Value, target: &Value) -> BuiltinResult {
    match target {
        Value::Array(arr) => {
            let len = arr.len() as i64;
            let (from, to) = slice_bounds(lo, hi, len)?;
            let items = arr.materialize();
            let slice = if from < to { items[from as usize..to as usize].to_vec() } else { Vec::new() };
            Ok(Value::array(slice))
        }
        Value::String(s) => {
            let chars: Vec<char> = s.chars().collect();
            let len = chars.len() as i64;
            let (from, to) = slice_bounds(lo, hi, len)?;
            let slice: String = if from < to { chars[from as usize..to as usize].iter().collect() } else { String::new() };
            Ok(Value::string(slice))
        }
        _ => Err(EvalError::Type(format!("cannot slice a {}", target.type_name()))),
    }
}

fn slice_bounds(lo: &Value, hi: &Value, len: i64) -> Result<(i64, i64), EvalError> {
    let from = resolve_slice_bound(lo, 0, len)?.clamp(0, len);
    let to = resolve_slice_bound(hi, len, len)?.clamp(0, len);
    Ok((from, to))
}

fn resolve_slice_bound(v: &Value, default: i64, len: i64) -> Result<i64, EvalError> {
    match v {
        Value::Null => Ok(default),
        Value::Number(n) => {
            if n.fract() != 0.0 {
                return Err(EvalError::Runtime("slice index must be an integer".to_string()));
            }
            let mut i = *n as i64;
            if i < 0 {
                i += len;
            }
            Ok(i)
        }
        other => Err(EvalError::Type(format!("slice index must be a number, got {}", other.type_name()))),
    }
}

/// `Err` only for a non-integral index; `Ok(None)` means "in range after wraparound" failed and
/// the caller should return `Null`, matching the value model's "out of range → Null" rule (the
/// fractional case is the only one that's a genuine runtime error).
fn normalize_index(n: f64, len: i64) -> Result<Option<i64>, EvalError> {
    if n.fract() != 0.0 {
        return Err(EvalError::Runtime("index must be an integer".to_string()));
    }
    let mut i = n as i64;
    if i < 0 {
        i += len;
    }
    if i < 0 || i >= len {
        return Ok(None);
    }
    Ok(Some(i))
}

pub(super) fn register(frame: &mut Frame) {
    def(frame, ".", dot);
    def(frame, "index", index);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn target_frame() -> Frame {
        let mut frame = Frame::new();
        register(&mut frame);
        frame
    }

    #[test]
    fn negative_array_index_wraps_from_the_end() {
        let frame = target_frame();
        let stack = Stack::build_initial(Value::Null, frame);
        let arr = Ast::Value(Value::array(vec![Value::Number(1.0), Value::Number(2.0), Value::Number(3.0)]));
        let ast = Ast::absolute_call("index", vec![Ast::Value(Value::Number(-1.0)), arr]);
        assert_eq!(crate::evaluator::eval(&ast, &stack).unwrap(), Value::Number(3.0));
    }

    #[test]
    fn dot_on_a_non_object_target_is_null_not_an_error() {
        let frame = target_frame();
        let stack = Stack::build_initial(Value::Null, frame);
        let arr = Ast::Value(Value::array(vec![Value::Number(1.0), Value::Number(2.0)]));
        let ast = Ast::absolute_call(".", vec![arr, Ast::Ref(crate::ast::Ref::relative("name"))]);
        assert_eq!(crate::evaluator::eval(&ast, &stack).unwrap(), Value::Null);
    }

    #[test]
    fn missing_object_key_is_null_not_an_error() {
        let frame = target_frame();
        let stack = Stack::build_initial(Value::Null, frame);
        let obj = Ast::Value(Value::object(indexmap::IndexMap::new()));
        let ast = Ast::absolute_call("index", vec![Ast::Value(Value::string("missing")), obj]);
        assert_eq!(crate::evaluator::eval(&ast, &stack).unwrap(), Value::Null);
    }

    #[test]
    fn out_of_range_index_is_null_not_an_error() {
        let frame = target_frame();
        let stack = Stack::build_initial(Value::Null, frame);
        let arr = Ast::Value(Value::array(vec![Value::Number(1.0)]));
        let ast = Ast::absolute_call("index", vec![Ast::Value(Value::Number(5.0)), arr]);
        assert_eq!(crate::evaluator::eval(&ast, &stack).unwrap(), Value::Null);
    }

    #[test]
    fn fractional_index_is_a_runtime_error() {
        let frame = target_frame();
        let stack = Stack::build_initial(Value::Null, frame);
        let arr = Ast::Value(Value::array(vec![Value::Number(1.0)]));
        let ast = Ast::absolute_call("index", vec![Ast::Value(Value::Number(0.5)), arr]);
        assert!(matches!(crate::evaluator::eval(&ast, &stack), Err(EvalError::Runtime(_))));
    }

    #[test]
    fn a_to_b_slice_clamps_to_bounds() {
        let frame = target_frame();
        let stack = Stack::build_initial(Value::Null, frame);
        let arr = Ast::Value(Value::array(vec![Value::Number(1.0), Value::Number(2.0), Value::Number(3.0)]));
        let ast =
            Ast::absolute_call("index", vec![Ast::Value(Value::Number(1.0)), Ast::Value(Value::Null), arr]);
        let result = crate::evaluator::eval(&ast, &stack).unwrap();
        assert_eq!(result, Value::array(vec![Value::Number(2.0), Value::Number(3.0)]));
    }
}
