//! The lexically-scoped "stack": ordered frames mapping names to values.

use indexmap::IndexMap;

use crate::evaluator::EvalError;
use crate::value::Value;

pub type Frame = IndexMap<String, Value>;

/// An ordered list of frames. Lookup walks innermost-to-outermost unless the Ref is absolute,
/// in which case only the root (outermost) frame is consulted. Frames are cheap to share:
/// `push_focus` clones the `Vec` of already-`Rc`-backed values, not the values themselves.
#[derive(Clone)]
pub struct Stack {
    frames: Vec<Frame>,
}

impl Stack {
    pub fn new(frames: Vec<Frame>) -> Self {
        Stack { frames }
    }

    /// Build a frame entry for `value`: `@` always names it, and if it's an Object, each of
    /// its own keys is exposed in the same frame (so `filter (age > 18)` can bind `age`).
    fn frame_for_focus(value: &Value) -> Frame {
        let mut frame = Frame::new();
        if let Value::Object(obj) = value {
            for key in obj.keys() {
                if let Some(v) = obj.get(&key) {
                    frame.insert(key, v);
                }
            }
        }
        frame.insert("@".to_string(), value.clone());
        frame
    }

    /// Push a new frame focused on `value`, returning a new Stack (the old one is left
    /// untouched — frames are immutable once pushed).
    pub fn push_focus(&self, value: Value) -> Stack {
        let mut frames = self.frames.clone();
        frames.push(Self::frame_for_focus(&value));
        Stack { frames }
    }

    pub fn lookup(&self, name: &str, absolute: bool) -> Result<Value, EvalError> {
        if absolute {
            return self
                .frames
                .first()
                .and_then(|f| f.get(name))
                .cloned()
                .ok_or_else(|| EvalError::Reference(format!("undefined built-in: {name}")));
        }
        for frame in self.frames.iter().rev() {
            if let Some(v) = frame.get(name) {
                return Ok(v.clone());
            }
        }
        Err(EvalError::Reference(format!("{name} is not defined")))
    }

    /// Three-frame initial stack: (1) root frame of built-ins and extras, (2) a frame binding
    /// `$` to a synthetic Object exposing `@` plus every named callable, (3) the focus frame
    /// derived from `input`.
    pub fn build_initial(input: Value, root_frame: Frame) -> Stack {
        let mut dollar_contents = root_frame.clone();
        dollar_contents.insert("@".to_string(), input.clone());
        let dollar_value = Value::object(dollar_contents.into_iter().collect());

        let mut dollar_frame = Frame::new();
        dollar_frame.insert("$".to_string(), dollar_value);

        let focus_frame = Self::frame_for_focus(&input);

        Stack { frames: vec![root_frame, dollar_frame, focus_frame] }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn string_value(s: &str) -> Value {
        Value::string(s)
    }

    #[test]
    fn object_focus_shadows_its_own_keys() {
        let mut obj = IndexMap::new();
        obj.insert("name".to_string(), string_value("ok"));
        let stack = Stack::build_initial(Value::object(obj), Frame::new());
        assert_eq!(stack.lookup("name", false).unwrap().to_display_string(), "ok");
    }

    #[test]
    fn absolute_lookup_ignores_inner_frames() {
        let mut root = Frame::new();
        root.insert("count".to_string(), Value::Number(1.0));
        let stack = Stack::build_initial(Value::Null, root);
        let pushed = stack.push_focus(Value::Number(2.0));
        assert!(matches!(pushed.lookup("count", true).unwrap(), Value::Number(n) if n == 1.0));
    }

    #[test]
    fn relative_lookup_is_innermost_first() {
        let mut root = Frame::new();
        root.insert("x".to_string(), Value::Number(1.0));
        let stack = Stack::build_initial(Value::Null, root);
        let mut inner = Frame::new();
        inner.insert("x".to_string(), Value::Number(2.0));
        let mut frames = stack.frames.clone();
        frames.push(inner);
        let shadowed = Stack { frames };
        assert!(matches!(shadowed.lookup("x", false).unwrap(), Value::Number(n) if n == 2.0));
    }
}
