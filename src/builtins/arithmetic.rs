//! Arithmetic, comparison, boolean, and control-flow operators.

use crate::ast::Ast;
use crate::evaluator::{EvalError, Exec};
use crate::stack::{Frame, Stack};
use crate::value::Value;

use super::{check_arity, def, BuiltinResult};

fn plus(args: &[Ast], stack: &Stack, exec: Exec) -> BuiltinResult {
    check_arity("+", args, 2, Some(2))?;
    let lhs = exec(&args[0], stack)?;
    let rhs = exec(&args[1], stack)?;
    match (&lhs, &rhs) {
        (Value::Number(a), Value::Number(b)) => Ok(Value::Number(a + b)),
        (Value::String(a), Value::String(b)) => Ok(Value::string(format!("{a}{b}"))),
        (Value::Array(a), Value::Array(b)) => {
            let mut items = a.materialize();
            items.extend(b.materialize());
            Ok(Value::array(items))
        }
        _ => Err(EvalError::Type(format!("cannot add {} and {}", lhs.type_name(), rhs.type_name()))),
    }
}

/// Pulls a `Number` out of a value, or a type error naming the operator and the offending type —
/// numeric ops require both operands to already be Numbers, with no String/Boolean coercion.
fn require_number(name: &'static str, v: Value) -> Result<f64, EvalError> {
    match v {
        Value::Number(n) => Ok(n),
        other => Err(EvalError::Type(format!("{name} expects a Number, got {}", other.type_name()))),
    }
}

fn minus(args: &[Ast], stack: &Stack, exec: Exec) -> BuiltinResult {
    check_arity("-", args, 2, Some(2))?;
    let a = require_number("-", exec(&args[0], stack)?)?;
    let b = require_number("-", exec(&args[1], stack)?)?;
    Ok(Value::Number(a - b))
}

fn multiply(args: &[Ast], stack: &Stack, exec: Exec) -> BuiltinResult {
    check_arity("*", args, 2, Some(2))?;
    let a = require_number("*", exec(&args[0], stack)?)?;
    let b = require_number("*", exec(&args[1], stack)?)?;
    Ok(Value::Number(a * b))
}

/// Division by zero is not rejected here: it produces `inf`/`-inf`/`NaN` per host IEEE-754
/// semantics, same as any other arithmetic. Non-finite values only become an error if a caller
/// tries to cross the garden wall with one (`gardenwall::to_json`) — see design note (iii).
fn divide(args: &[Ast], stack: &Stack, exec: Exec) -> BuiltinResult {
    check_arity("/", args, 2, Some(2))?;
    let a = require_number("/", exec(&args[0], stack)?)?;
    let b = require_number("/", exec(&args[1], stack)?)?;
    Ok(Value::Number(a / b))
}

fn modulo(args: &[Ast], stack: &Stack, exec: Exec) -> BuiltinResult {
    check_arity("%", args, 2, Some(2))?;
    let a = require_number("%", exec(&args[0], stack)?)?;
    let b = require_number("%", exec(&args[1], stack)?)?;
    Ok(Value::Number(a % b))
}

fn negate(args: &[Ast], stack: &Stack, exec: Exec) -> BuiltinResult {
    check_arity("-/unary", args, 1, Some(1))?;
    let v = require_number("-/unary", exec(&args[0], stack)?)?;
    Ok(Value::Number(-v))
}

fn not(args: &[Ast], stack: &Stack, exec: Exec) -> BuiltinResult {
    check_arity("!/unary", args, 1, Some(1))?;
    let v = exec(&args[0], stack)?;
    Ok(Value::Boolean(!v.truthy()))
}

fn eq(args: &[Ast], stack: &Stack, exec: Exec) -> BuiltinResult {
    check_arity("==", args, 2, Some(2))?;
    let a = exec(&args[0], stack)?;
    let b = exec(&args[1], stack)?;
    Ok(Value::Boolean(a.deep_eq(&b)))
}

fn neq(args: &[Ast], stack: &Stack, exec: Exec) -> BuiltinResult {
    check_arity("!=", args, 2, Some(2))?;
    let a = exec(&args[0], stack)?;
    let b = exec(&args[1], stack)?;
    Ok(Value::Boolean(!a.deep_eq(&b)))
}

fn comparison(
    name: &'static str,
    pass: fn(std::cmp::Ordering) -> bool,
) -> impl Fn(&[Ast], &Stack, Exec) -> BuiltinResult {
    move |args: &[Ast], stack: &Stack, exec: Exec| {
        check_arity(name, args, 2, Some(2))?;
        let a = exec(&args[0], stack)?;
        let b = exec(&args[1], stack)?;
        if !a.is_comparable() || !b.is_comparable() {
            return Err(EvalError::Type(format!("cannot compare {} and {}", a.type_name(), b.type_name())));
        }
        Ok(Value::Boolean(pass(a.compare(&b)?)))
    }
}

/// `&&` short-circuits: the right side is only evaluated if the left side is truthy, and the
/// result is whichever operand was returned, not a coerced boolean.
fn and(args: &[Ast], stack: &Stack, exec: Exec) -> BuiltinResult {
    check_arity("&&", args, 2, Some(2))?;
    let lhs = exec(&args[0], stack)?;
    if !lhs.truthy() {
        Ok(lhs)
    } else {
        exec(&args[1], stack)
    }
}

/// `||` short-circuits: the right side is only evaluated if the left side is falsy.
fn or(args: &[Ast], stack: &Stack, exec: Exec) -> BuiltinResult {
    check_arity("||", args, 2, Some(2))?;
    let lhs = exec(&args[0], stack)?;
    if lhs.truthy() {
        Ok(lhs)
    } else {
        exec(&args[1], stack)
    }
}

/// `if cond then else` — only the selected branch is evaluated.
fn if_builtin(args: &[Ast], stack: &Stack, exec: Exec) -> BuiltinResult {
    check_arity("if", args, 3, Some(3))?;
    let cond = exec(&args[0], stack)?;
    if cond.truthy() {
        exec(&args[1], stack)
    } else {
        exec(&args[2], stack)
    }
}

pub(super) fn register(frame: &mut Frame) {
    def(frame, "+", plus);
    def(frame, "-", minus);
    def(frame, "*", multiply);
    def(frame, "/", divide);
    def(frame, "%", modulo);
    def(frame, "-/unary", negate);
    def(frame, "!/unary", not);
    def(frame, "==", eq);
    def(frame, "!=", neq);
    def(frame, "<", comparison("<", |o| o == std::cmp::Ordering::Less));
    def(frame, "<=", comparison("<=", |o| o != std::cmp::Ordering::Greater));
    def(frame, ">", comparison(">", |o| o == std::cmp::Ordering::Greater));
    def(frame, ">=", comparison(">=", |o| o != std::cmp::Ordering::Less));
    def(frame, "&&", and);
    def(frame, "||", or);
    def(frame, "if", if_builtin);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluator::eval;

    fn call(name: &str, args: Vec<Value>) -> BuiltinResult {
        let mut frame = Frame::new();
        register(&mut frame);
        let stack = Stack::build_initial(Value::Null, frame);
        let asts: Vec<Ast> = args.into_iter().map(Ast::Value).collect();
        let ast = Ast::absolute_call(name, asts);
        eval(&ast, &stack)
    }

    #[test]
    fn short_circuit_and_skips_the_right_side_error() {
        let mut frame = Frame::new();
        register(&mut frame);
        let stack = Stack::build_initial(Value::Null, frame);
        let ast = Ast::absolute_call(
            "&&",
            vec![Ast::Value(Value::Boolean(false)), Ast::absolute_call("/", vec![Ast::Value(Value::Number(1.0)), Ast::Value(Value::Number(0.0))])],
        );
        assert_eq!(eval(&ast, &stack).unwrap(), Value::Boolean(false));
    }

    #[test]
    fn string_concatenation() {
        let result = call("+", vec![Value::string("a"), Value::string("b")]).unwrap();
        assert_eq!(result, Value::string("ab"));
    }

    #[test]
    fn mismatched_plus_operands_are_a_type_error() {
        assert!(matches!(call("+", vec![Value::Number(1.0), Value::string("a")]), Err(EvalError::Type(_))));
    }

    #[test]
    fn division_by_zero_produces_infinity_not_an_error() {
        let result = call("/", vec![Value::Number(1.0), Value::Number(0.0)]).unwrap();
        assert!(matches!(result, Value::Number(n) if n.is_infinite() && n.is_sign_positive()));
    }

    #[test]
    fn boolean_comparison_preserves_false_before_true() {
        let result = call("<", vec![Value::Boolean(false), Value::Boolean(true)]).unwrap();
        assert_eq!(result, Value::Boolean(true));
    }

    #[test]
    fn minus_rejects_non_number_operands() {
        assert!(matches!(call("-", vec![Value::Boolean(true), Value::Number(1.0)]), Err(EvalError::Type(_))));
        assert!(matches!(call("*", vec![Value::string("5"), Value::Number(2.0)]), Err(EvalError::Type(_))));
        assert!(matches!(call("-/unary", vec![Value::string("3")]), Err(EvalError::Type(_))));
    }
}
