//! The built-in function table: every name an absolute `Ref` can resolve to in the root frame.
//!
//! Each built-in is a plain closure matching `value::NativeFn` — `(args, stack, exec)` — where
//! `args` are still-unevaluated AST nodes and `exec` is the recursive evaluator. This is what
//! lets `if`/`&&`/`||`/`filter` defer or skip evaluating arguments instead of always evaluating
//! eagerly.

mod aggregate;
mod arithmetic;
mod collection;
mod index;
mod string_regex;

use std::rc::Rc;

use crate::ast::Ast;
use crate::evaluator::{EvalError, Exec};
use crate::stack::{Frame, Stack};
use crate::value::{Function, Value};

pub(crate) type BuiltinResult = Result<Value, EvalError>;

/// Register a native function under `name` into `frame`.
pub(crate) fn def(
    frame: &mut Frame,
    name: &str,
    f: impl Fn(&[Ast], &Stack, Exec) -> BuiltinResult + 'static,
) {
    frame.insert(name.to_string(), Value::Function(Rc::new(Function { name: name.to_string(), f: Rc::new(f) })));
}

/// Evaluate every argument eagerly, left to right — the common case for built-ins that don't
/// need to defer or skip any of their arguments.
pub(crate) fn eval_all(args: &[Ast], stack: &Stack, exec: Exec) -> Result<Vec<Value>, EvalError> {
    args.iter().map(|a| exec(a, stack)).collect()
}

/// Evaluate `expr` with `value` pushed as the new focus — how `map`/`filter`/`sortby` and
/// friends invoke the still-unevaluated expression argument they were handed.
pub(crate) fn apply_with_focus(expr: &Ast, value: Value, stack: &Stack, exec: Exec) -> Result<Value, EvalError> {
    let pushed = stack.push_focus(value);
    exec(expr, &pushed)
}

pub(crate) fn arity_error(name: &str, min: usize, max: Option<usize>, got: usize) -> EvalError {
    let expected = match max {
        Some(max) if max == min => format!("exactly {min}"),
        Some(max) => format!("between {min} and {max}"),
        None => format!("at least {min}"),
    };
    EvalError::Runtime(format!("{name} expects {expected} argument(s), got {got}"))
}

pub(crate) fn check_arity(name: &str, args: &[Ast], min: usize, max: Option<usize>) -> Result<(), EvalError> {
    let got = args.len();
    let ok = got >= min && max.map_or(true, |max| got <= max);
    if ok {
        Ok(())
    } else {
        Err(arity_error(name, min, max, got))
    }
}

/// Reads its operand from the last argument, like `count` and the other single-collection
/// built-ins (`src/builtins/collection.rs`), so `x | log @` — redundant but legal, `@` already
/// names the piped-in value — still resolves to a single operand rather than an arity error.
fn log_builtin(args: &[Ast], stack: &Stack, exec: Exec) -> BuiltinResult {
    check_arity("log", args, 1, Some(2))?;
    let value = exec(args.last().unwrap(), stack)?;
    log::debug!("{}", value.to_display_string());
    Ok(value)
}

/// Build the root frame: every operator and built-in function, plus the supplemental `log`
/// trace built-in, bound by absolute name.
pub fn build_root_frame() -> Frame {
    let mut frame = Frame::new();
    arithmetic::register(&mut frame);
    collection::register(&mut frame);
    index::register(&mut frame);
    string_regex::register(&mut frame);
    aggregate::register(&mut frame);
    def(&mut frame, "log", log_builtin);
    frame
}
