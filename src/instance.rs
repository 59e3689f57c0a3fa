//! An `Instance` bundles a fixed small parse cache with a set of host-registered "extras" —
//! the embedding API's equivalent of the reference implementation's `mistql.Instance`.

use std::cell::RefCell;
use std::collections::VecDeque;

use crate::ast::Ast;
use crate::builtins;
use crate::error::QueryError;
use crate::evaluator::eval;
use crate::lowering::lower;
use crate::parser::Parser;
use crate::stack::{Frame, Stack};
use crate::value::Value;

/// Mirrors the reference implementation's `lru_cache(maxsize=4)` around `parse`: a small,
/// fixed-capacity cache keyed by the exact query string, evicting least-recently-used.
const CACHE_CAPACITY: usize = 4;

pub struct Instance {
    extras: Frame,
    cache: RefCell<VecDeque<(String, Ast)>>,
}

impl Instance {
    pub fn new() -> Self {
        Instance { extras: Frame::new(), cache: RefCell::new(VecDeque::new()) }
    }

    /// Register a host-callable value (a `Value::Function`, or any other value) under `name`,
    /// visible to every query this instance runs as an absolute reference.
    pub fn register_extra(&mut self, name: impl Into<String>, value: Value) {
        self.extras.insert(name.into(), value);
    }

    pub fn parse(&self, query: &str) -> Result<Ast, QueryError> {
        {
            let mut cache = self.cache.borrow_mut();
            if let Some(pos) = cache.iter().position(|(key, _)| key == query) {
                let (key, ast) = cache.remove(pos).expect("position just found");
                cache.push_back((key, ast.clone()));
                return Ok(ast);
            }
        }
        let raw = Parser::parse(query)?;
        let ast = lower(raw);
        let mut cache = self.cache.borrow_mut();
        if cache.len() >= CACHE_CAPACITY {
            cache.pop_front();
        }
        cache.push_back((query.to_string(), ast.clone()));
        Ok(ast)
    }

    pub fn evaluate(&self, ast: &Ast, data: Value) -> Result<Value, QueryError> {
        let mut root = builtins::build_root_frame();
        for (name, value) in &self.extras {
            root.insert(name.clone(), value.clone());
        }
        let stack = Stack::build_initial(data, root);
        Ok(eval(ast, &stack)?)
    }

    pub fn query(&self, query: &str, data: Value) -> Result<Value, QueryError> {
        let ast = self.parse(query)?;
        self.evaluate(&ast, data)
    }
}

impl Default for Instance {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_runs_end_to_end() {
        let instance = Instance::new();
        let input = Value::object(indexmap::IndexMap::from([
            ("prizes".to_string(), Value::array(vec![Value::Number(1.0), Value::Number(2.0), Value::Number(3.0)])),
        ]));
        let result = instance.query("@.prizes | count @", input).unwrap();
        assert_eq!(result, Value::Number(3.0));
    }

    #[test]
    fn repeated_parses_reuse_the_cache() {
        let instance = Instance::new();
        let first = instance.parse("@ | count").unwrap();
        let second = instance.parse("@ | count").unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn cache_evicts_the_least_recently_used_entry() {
        let instance = Instance::new();
        for i in 0..5 {
            instance.parse(&format!("{i}")).unwrap();
        }
        let cache = instance.cache.borrow();
        assert_eq!(cache.len(), CACHE_CAPACITY);
        assert!(!cache.iter().any(|(k, _)| k == "0"));
    }

    #[test]
    fn extras_are_visible_as_absolute_references() {
        use std::rc::Rc;
        let mut instance = Instance::new();
        instance.register_extra(
            "triple",
            Value::Function(Rc::new(crate::value::Function {
                name: "triple".to_string(),
                f: Rc::new(|args, stack, exec| {
                    let v = exec(&args[0], stack)?.to_float()?;
                    Ok(Value::Number(v * 3.0))
                }),
            })),
        );
        let result = instance.query("triple @", Value::Number(2.0)).unwrap();
        assert_eq!(result, Value::Number(6.0));
    }
}
