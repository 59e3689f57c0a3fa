//! The runtime value model: a tagged union of the eight kinds of value a MistQL expression can
//! produce, plus the coercion, comparison, and equality laws the built-in library is defined in
//! terms of.

use std::cmp::Ordering;
use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;
use regex::Regex;

use crate::ast::Ast;
use crate::evaluator::{EvalError, Exec};
use crate::lazy::{LazyArray, LazyObject};
use crate::stack::Stack;

/// A value produced or consumed by a MistQL expression.
///
/// `String`, `Array`, `Object`, `Function`, and `Regex` are all reference-counted: cloning a
/// `Value` is always O(1), and the runtime value graph these form is a DAG by construction —
/// nothing in this crate builds a cycle, so plain `Rc` (no `Weak`) is sufficient.
#[derive(Clone)]
pub enum Value {
    Null,
    Boolean(bool),
    Number(f64),
    String(Rc<str>),
    Array(Rc<LazyArray>),
    Object(Rc<LazyObject>),
    Function(Rc<Function>),
    Regex(Rc<RegexValue>),
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "Null"),
            Value::Boolean(b) => write!(f, "Boolean({b})"),
            Value::Number(n) => write!(f, "Number({n})"),
            Value::String(s) => write!(f, "String({s:?})"),
            Value::Array(a) => write!(f, "Array(len={})", a.len()),
            Value::Object(o) => write!(f, "Object(len={})", o.len()),
            Value::Function(fun) => write!(f, "{fun:?}"),
            Value::Regex(r) => write!(f, "{r:?}"),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.deep_eq(other)
    }
}

/// A compiled regular expression plus the side-band state MistQL attaches to it.
///
/// Equality between two Regex values compares `source`/`flags`/`global`, not the compiled
/// automaton — this matches matching-by-configuration rather than matching-by-identity.
pub struct RegexValue {
    pub source: String,
    pub flags: String,
    pub global: bool,
    pub compiled: Regex,
}

impl fmt::Debug for RegexValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RegexValue({:?}, flags={:?}, global={})", self.source, self.flags, self.global)
    }
}

impl PartialEq for RegexValue {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source && self.flags == other.flags && self.global == other.global
    }
}

pub type NativeFn = dyn Fn(&[Ast], &Stack, Exec) -> Result<Value, EvalError>;

/// A callable value: a built-in operator/function, or a host closure registered as an "extra".
///
/// Two Functions compare equal only when they share the same underlying closure allocation
/// (`Rc::ptr_eq`) — this is "compared by referential identity" from the value model.
pub struct Function {
    pub name: String,
    pub f: Rc<NativeFn>,
}

impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Function({})", self.name)
    }
}

impl PartialEq for Function {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.f, &other.f)
    }
}

/// Breakpoint above which an integral magnitude is rendered via standard (possibly
/// scientific) encoding rather than plain digits.
const UPPER_NUM_FORMATTING_BREAKPOINT: f64 = 1e21;
/// Breakpoint below which a nonzero magnitude is rendered in scientific form.
const LOWER_NUM_FORMATTING_BREAKPOINT: f64 = 1e-7;

impl Value {
    pub fn string(s: impl Into<String>) -> Value {
        Value::String(Rc::from(s.into().as_str()))
    }

    pub fn array(items: Vec<Value>) -> Value {
        Value::Array(Rc::new(LazyArray::eager(items)))
    }

    pub fn object(entries: IndexMap<String, Value>) -> Value {
        Value::Object(Rc::new(LazyObject::eager(entries)))
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Boolean(_) => "boolean",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
            Value::Function(_) => "function",
            Value::Regex(_) => "regex",
        }
    }

    /// Truthiness per the value model: Null is false; Boolean is itself; Number is nonzero;
    /// String/Array/Object are nonempty; Function/Regex are always true.
    pub fn truthy(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Boolean(b) => *b,
            Value::Number(n) => *n != 0.0,
            Value::String(s) => !s.is_empty(),
            Value::Array(a) => a.len() != 0,
            Value::Object(o) => o.len() != 0,
            Value::Function(_) | Value::Regex(_) => true,
        }
    }

    /// Only Boolean, Number, and String participate in ordering.
    pub fn is_comparable(&self) -> bool {
        matches!(self, Value::Boolean(_) | Value::Number(_) | Value::String(_))
    }

    /// Ordering between two comparable values. Booleans compare via `int(a) - int(b)`,
    /// preserving `false < true` — this is load-bearing for `sort`/`sortby` test fixtures that
    /// rely on that exact ordering, not just "false is falsy".
    pub fn compare(&self, other: &Value) -> Result<Ordering, EvalError> {
        match (self, other) {
            (Value::Boolean(a), Value::Boolean(b)) => Ok((*a as i64).cmp(&(*b as i64))),
            (Value::Number(a), Value::Number(b)) => {
                a.partial_cmp(b).ok_or_else(|| EvalError::Runtime("cannot compare NaN".into()))
            }
            (Value::String(a), Value::String(b)) => Ok(a.cmp(b)),
            _ => Err(EvalError::Type(format!(
                "cannot compare {} and {}",
                self.type_name(),
                other.type_name()
            ))),
        }
    }

    /// Convert to a displayable string: Strings pass through, Numbers use `format_number`,
    /// everything else is rendered as its JSON form.
    pub fn to_display_string(&self) -> String {
        match self {
            Value::String(s) => s.to_string(),
            Value::Number(n) => format_number(*n),
            _ => crate::gardenwall::to_json(self).map(|j| j.to_string()).unwrap_or_else(|_| "null".to_string()),
        }
    }

    /// The `float` built-in's coercion: Number passes through, String parses (fails on bad
    /// input), Boolean becomes 0.0/1.0, Null becomes 0.0; Array/Object/Function/Regex fail.
    pub fn to_float(&self) -> Result<f64, EvalError> {
        match self {
            Value::Number(n) => Ok(*n),
            Value::String(s) => {
                s.trim().parse::<f64>().map_err(|_| EvalError::Runtime(format!("cannot convert {s:?} to a number")))
            }
            Value::Boolean(b) => Ok(if *b { 1.0 } else { 0.0 }),
            Value::Null => Ok(0.0),
            other => Err(EvalError::Type(format!("cannot convert {} to a number", other.type_name()))),
        }
    }

    /// Deep structural equality. Array/Object comparison forces full materialization of both
    /// sides (a lazy value must be indistinguishable from its eager counterpart here).
    pub fn deep_eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => {
                let (a, b) = (a.materialize(), b.materialize());
                a.len() == b.len() && a.iter().zip(b.iter()).all(|(x, y)| x.deep_eq(y))
            }
            (Value::Object(a), Value::Object(b)) => {
                let (a, b) = (a.materialize(), b.materialize());
                a.len() == b.len() && a.iter().all(|(k, v)| b.get(k).is_some_and(|w| v.deep_eq(w)))
            }
            (Value::Function(a), Value::Function(b)) => a == b,
            (Value::Regex(a), Value::Regex(b)) => a == b,
            _ => false,
        }
    }
}

/// `to_string` numeric formatting: integral magnitudes below 1e21 print without a decimal
/// point; magnitudes at or below 1e-7 print in scientific form with collapsed exponent zeros;
/// other magnitudes below 1 print fixed-point with trailing zeros stripped; everything else
/// uses standard JSON number encoding.
pub fn format_number(value: f64) -> String {
    if value == 0.0 {
        return "0".to_string();
    }
    let sign = if value.is_sign_negative() { "-" } else { "" };
    let abs = value.abs();

    if abs < UPPER_NUM_FORMATTING_BREAKPOINT && abs.fract() == 0.0 {
        return format!("{sign}{}", format_integral(abs));
    }
    if abs <= LOWER_NUM_FORMATTING_BREAKPOINT {
        return format_scientific(value);
    }
    if abs < 1.0 {
        let fixed = format!("{abs:.16}");
        let trimmed = fixed.trim_end_matches('0').trim_end_matches('.');
        return format!("{sign}{trimmed}");
    }
    serde_json::Number::from_f64(value).map(|n| n.to_string()).unwrap_or_else(|| value.to_string())
}

fn format_integral(abs: f64) -> String {
    format!("{abs:.0}")
}

fn format_scientific(value: f64) -> String {
    let rendered = format!("{value:e}");
    let (mantissa, exponent) = match rendered.split_once('e') {
        Some(parts) => parts,
        None => return rendered,
    };
    let mantissa = if mantissa.contains('.') {
        mantissa.trim_end_matches('0').trim_end_matches('.')
    } else {
        mantissa
    };
    let exp: i64 = exponent.parse().unwrap_or(0);
    if exp < 0 {
        format!("{mantissa}e-{}", exp.abs())
    } else {
        format!("{mantissa}e{exp}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truthiness_matches_the_value_model() {
        assert!(!Value::Null.truthy());
        assert!(!Value::Number(0.0).truthy());
        assert!(Value::Number(-1.0).truthy());
        assert!(!Value::string("").truthy());
        assert!(!Value::array(vec![]).truthy());
    }

    #[test]
    fn boolean_ordering_is_false_before_true() {
        assert_eq!(Value::Boolean(false).compare(&Value::Boolean(true)).unwrap(), Ordering::Less);
    }

    #[test]
    fn format_number_matches_spec_breakpoints() {
        assert_eq!(format_number(3.0), "3");
        assert_eq!(format_number(1.5811388300841898), "1.5811388300841898".trim_end_matches('0').trim_end_matches('.'));
        assert_eq!(format_number(0.00000001), "1e-8");
        assert_eq!(format_number(0.0001), "0.0001");
    }

    #[test]
    fn deep_eq_treats_lazy_and_eager_arrays_alike() {
        let eager = Value::array(vec![Value::Number(1.0), Value::Number(2.0)]);
        let json = serde_json::json!([1.0, 2.0]);
        let lazy = crate::gardenwall::from_json_lazy(&json);
        assert!(eager.deep_eq(&lazy));
    }
}
