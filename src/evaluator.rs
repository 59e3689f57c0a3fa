//! Evaluates the lowered AST against a value and a scope stack.
//!
//! There is no `Evaluator` struct holding mutable state — evaluation is a pure recursive
//! function of `(ast, stack)`, and built-ins are handed a reference to that same function (as
//! `Exec`) so they can recursively evaluate their own sub-expressions, deferring or skipping
//! arguments as their semantics require.

use crate::ast::Ast;
use crate::stack::Stack;
use crate::value::Value;

/// Errors that can occur while evaluating a query, independent of parsing.
#[derive(Debug, Clone, PartialEq)]
pub enum EvalError {
    /// A name could not be found in any visible scope frame.
    Reference(String),
    /// An operation was applied to a value of the wrong type.
    Type(String),
    /// A well-typed operation failed at runtime (bad arity, out-of-range argument, etc).
    Runtime(String),
    /// An invariant the evaluator itself is responsible for was violated.
    Internal(String),
}

impl std::fmt::Display for EvalError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EvalError::Reference(msg) => write!(f, "reference error: {msg}"),
            EvalError::Type(msg) => write!(f, "type error: {msg}"),
            EvalError::Runtime(msg) => write!(f, "runtime error: {msg}"),
            EvalError::Internal(msg) => write!(f, "internal error: {msg}"),
        }
    }
}

impl std::error::Error for EvalError {}

/// The callback builtins use to evaluate one of their own argument expressions against a
/// (possibly refocused) stack — this is how `if`/`filter`/`&&` defer or skip evaluation.
pub type Exec<'a> = &'a dyn Fn(&Ast, &Stack) -> Result<Value, EvalError>;

/// Evaluate `ast` against `stack`.
pub fn eval(ast: &Ast, stack: &Stack) -> Result<Value, EvalError> {
    match ast {
        Ast::Value(value) => Ok(value.clone()),
        Ast::Ref(r) => stack.lookup(&r.name, r.absolute),
        Ast::Array(items) => {
            let values = items.iter().map(|item| eval(item, stack)).collect::<Result<Vec<_>, _>>()?;
            Ok(Value::array(values))
        }
        Ast::Object(entries) => {
            let mut out = indexmap::IndexMap::new();
            for (key, expr) in entries {
                out.insert(key.clone(), eval(expr, stack)?);
            }
            Ok(Value::object(out))
        }
        Ast::Fncall { head, args } => {
            let callee = eval(head, stack)?;
            invoke(&callee, args, stack)
        }
        Ast::Pipe(stages) => eval_pipe(stages, stack),
    }
}

fn invoke(callee: &Value, args: &[Ast], stack: &Stack) -> Result<Value, EvalError> {
    match callee {
        Value::Function(f) => (f.f)(args, stack, &eval),
        other => Err(EvalError::Type(format!("{} is not callable", other.type_name()))),
    }
}

/// `v[i] = evaluate(Fncall(h, A ++ [Value(v[i-1])]), push_focus(v[i-1], stack))` — each stage
/// after the first must itself be a function call, which receives the previous stage's value
/// as an implicit trailing argument and the previous stage's value as the new focus. A bare
/// (non-Fncall) stage, e.g. the `count` in `xs | count`, is treated as a zero-arg call — it
/// still has to evaluate to a Function for the append-and-invoke step to make sense.
fn eval_pipe(stages: &[Ast], stack: &Stack) -> Result<Value, EvalError> {
    let mut stages = stages.iter();
    let first = stages.next().ok_or_else(|| EvalError::Internal("pipe with no stages".to_string()))?;
    let mut value = eval(first, stack)?;

    for stage in stages {
        let (head, args): (&Ast, &[Ast]) = match stage {
            Ast::Fncall { head, args } => (head, args),
            other => (other, &[]),
        };
        let focused = stack.push_focus(value.clone());
        let callee = eval(head, &focused)?;
        let mut full_args = args.to_vec();
        full_args.push(Ast::Value(value));
        value = invoke(&callee, &full_args, &focused)?;
    }

    Ok(value)
}
