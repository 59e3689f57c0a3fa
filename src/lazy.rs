//! Optional lazy materialization of Array/Object values.
//!
//! A lazily-constructed collection holds onto the host `serde_json::Value` it was built from
//! instead of eagerly converting every element. `len`/`keys` read the host value directly
//! without materializing anything; `get`/`index` materialize and cache exactly the requested
//! child (recursively lazy — a materialized child that is itself an array/object is *also*
//! lazy); any whole-collection observation (equality, iteration, crossing the garden wall back
//! out) materializes everything once and the representation flips to `Eager` for good. A lazy
//! value is required to be indistinguishable from its eager counterpart under equality and
//! serialization.

use std::cell::RefCell;
use std::rc::Rc;

use indexmap::IndexMap;

use crate::value::Value;

enum ArrayRepr {
    Eager(Vec<Value>),
    Lazy { source: Rc<[serde_json::Value]>, cache: Vec<Option<Value>> },
}

pub struct LazyArray {
    inner: RefCell<ArrayRepr>,
}

impl LazyArray {
    pub fn eager(items: Vec<Value>) -> Self {
        LazyArray { inner: RefCell::new(ArrayRepr::Eager(items)) }
    }

    pub fn lazy(source: Rc<[serde_json::Value]>) -> Self {
        let len = source.len();
        LazyArray { inner: RefCell::new(ArrayRepr::Lazy { source, cache: vec![None; len] }) }
    }

    pub fn len(&self) -> usize {
        match &*self.inner.borrow() {
            ArrayRepr::Eager(v) => v.len(),
            ArrayRepr::Lazy { source, .. } => source.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Materialize and cache a single element without forcing the whole collection.
    pub fn get(&self, index: usize) -> Option<Value> {
        let mut repr = self.inner.borrow_mut();
        match &mut *repr {
            ArrayRepr::Eager(v) => v.get(index).cloned(),
            ArrayRepr::Lazy { source, cache } => {
                if index >= source.len() {
                    return None;
                }
                if let Some(v) = &cache[index] {
                    return Some(v.clone());
                }
                let v = crate::gardenwall::from_json_lazy(&source[index]);
                cache[index] = Some(v.clone());
                Some(v)
            }
        }
    }

    /// Force full materialization (e.g. for equality, iteration, or garden-wall export) and
    /// return an owned copy of the resulting Vec. Flips the representation to `Eager`.
    pub fn materialize(&self) -> Vec<Value> {
        let mut repr = self.inner.borrow_mut();
        if let ArrayRepr::Eager(v) = &*repr {
            return v.clone();
        }
        let materialized = match &*repr {
            ArrayRepr::Lazy { source, cache } => (0..source.len())
                .map(|i| cache[i].clone().unwrap_or_else(|| crate::gardenwall::from_json_lazy(&source[i])))
                .collect::<Vec<_>>(),
            ArrayRepr::Eager(_) => unreachable!(),
        };
        *repr = ArrayRepr::Eager(materialized.clone());
        materialized
    }
}

enum ObjectRepr {
    Eager(IndexMap<String, Value>),
    Lazy { source: Rc<serde_json::Map<String, serde_json::Value>>, cache: IndexMap<String, Value> },
}

pub struct LazyObject {
    inner: RefCell<ObjectRepr>,
}

impl LazyObject {
    pub fn eager(entries: IndexMap<String, Value>) -> Self {
        LazyObject { inner: RefCell::new(ObjectRepr::Eager(entries)) }
    }

    pub fn lazy(source: Rc<serde_json::Map<String, serde_json::Value>>) -> Self {
        LazyObject { inner: RefCell::new(ObjectRepr::Lazy { source, cache: IndexMap::new() }) }
    }

    pub fn len(&self) -> usize {
        match &*self.inner.borrow() {
            ObjectRepr::Eager(m) => m.len(),
            ObjectRepr::Lazy { source, .. } => source.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Keys in insertion order, read without materializing any values.
    pub fn keys(&self) -> Vec<String> {
        match &*self.inner.borrow() {
            ObjectRepr::Eager(m) => m.keys().cloned().collect(),
            ObjectRepr::Lazy { source, .. } => source.keys().cloned().collect(),
        }
    }

    pub fn get(&self, key: &str) -> Option<Value> {
        let mut repr = self.inner.borrow_mut();
        match &mut *repr {
            ObjectRepr::Eager(m) => m.get(key).cloned(),
            ObjectRepr::Lazy { source, cache } => {
                if let Some(v) = cache.get(key) {
                    return Some(v.clone());
                }
                let raw = source.get(key)?;
                let v = crate::gardenwall::from_json_lazy(raw);
                cache.insert(key.to_string(), v.clone());
                Some(v)
            }
        }
    }

    pub fn materialize(&self) -> IndexMap<String, Value> {
        let mut repr = self.inner.borrow_mut();
        if let ObjectRepr::Eager(m) = &*repr {
            return m.clone();
        }
        let materialized = match &*repr {
            ObjectRepr::Lazy { source, cache } => source
                .iter()
                .map(|(k, v)| {
                    let value = cache.get(k).cloned().unwrap_or_else(|| crate::gardenwall::from_json_lazy(v));
                    (k.clone(), value)
                })
                .collect::<IndexMap<_, _>>(),
            ObjectRepr::Eager(_) => unreachable!(),
        };
        *repr = ObjectRepr::Eager(materialized.clone());
        materialized
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lazy_array_len_does_not_materialize() {
        let source: Rc<[serde_json::Value]> = Rc::from(vec![serde_json::json!(1), serde_json::json!(2)]);
        let arr = LazyArray::lazy(source);
        assert_eq!(arr.len(), 2);
        assert!(matches!(*arr.inner.borrow(), ArrayRepr::Lazy { .. }));
    }

    #[test]
    fn single_element_access_caches_only_that_element() {
        let source: Rc<[serde_json::Value]> = Rc::from(vec![serde_json::json!(1), serde_json::json!(2)]);
        let arr = LazyArray::lazy(source);
        let first = arr.get(0).unwrap();
        assert!(matches!(first, Value::Number(n) if n == 1.0));
        assert!(matches!(*arr.inner.borrow(), ArrayRepr::Lazy { .. }));
    }

    #[test]
    fn materialize_flips_to_eager() {
        let source: Rc<[serde_json::Value]> = Rc::from(vec![serde_json::json!(1)]);
        let arr = LazyArray::lazy(source);
        let _ = arr.materialize();
        assert!(matches!(*arr.inner.borrow(), ArrayRepr::Eager(_)));
    }
}
