//! Abstract syntax tree for MistQL.
//!
//! The parser does not build this tree directly: it first builds a [`raw`] parse tree that
//! mirrors the shape of the grammar (operators, dot access, slices, juxtaposition calls as
//! distinct node kinds), and a separate lowering pass (`crate::lowering`) normalizes that into
//! the uniform, call-centric tree defined here. Every operator, the dot accessor, and indexing
//! all become plain `Fncall` nodes with an absolute `Ref` head; evaluation only ever needs to
//! understand six node kinds.

pub mod raw;

use crate::value::Value;
use indexmap::IndexMap;

/// A name lookup. `absolute` Refs only ever resolve against the root frame — this is how
/// lowering keeps a user-bound variable from shadowing an operator or built-in.
#[derive(Debug, Clone, PartialEq)]
pub struct Ref {
    pub name: String,
    pub absolute: bool,
}

impl Ref {
    pub fn relative(name: impl Into<String>) -> Self {
        Ref { name: name.into(), absolute: false }
    }

    pub fn absolute(name: impl Into<String>) -> Self {
        Ref { name: name.into(), absolute: true }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Ast {
    Value(Value),
    Ref(Ref),
    Array(Vec<Ast>),
    Object(IndexMap<String, Ast>),
    Fncall { head: Box<Ast>, args: Vec<Ast> },
    Pipe(Vec<Ast>),
}

impl Ast {
    pub fn fncall(head: Ast, args: Vec<Ast>) -> Ast {
        Ast::Fncall { head: Box::new(head), args }
    }

    pub fn absolute_call(name: &str, args: Vec<Ast>) -> Ast {
        Ast::fncall(Ast::Ref(Ref::absolute(name)), args)
    }
}
