//! Normalizes the raw parse tree into the uniform, call-centric AST.
//!
//! Every operator, the dot accessor, and indexing/slicing all become `Fncall`s whose head is
//! an absolute `Ref` to the operator's canonical name — this is the one place that table is
//! defined. Object keys are resolved to plain strings here, with duplicate keys keeping the
//! last value but the first occurrence's position (the same behavior a Python dict gives you
//! for free, which is why the original implementation didn't need to special-case it either).

use indexmap::IndexMap;

use crate::ast::raw::{IndexForm, RawKey, RawNode};
use crate::ast::{Ast, Ref};
use crate::value::Value;

pub fn lower(node: RawNode) -> Ast {
    match node {
        RawNode::Literal(v) => Ast::Value(v),
        RawNode::Ref(name) => Ast::Ref(Ref::relative(name)),
        RawNode::Array(items) => Ast::Array(items.into_iter().map(lower).collect()),
        RawNode::Object(entries) => {
            let mut map: IndexMap<String, Ast> = IndexMap::new();
            for (key, value) in entries {
                map.insert(key_to_string(key), lower(value));
            }
            Ast::Object(map)
        }
        RawNode::Pipe(stages) => Ast::Pipe(stages.into_iter().map(lower).collect()),
        RawNode::Fncall(head, args) => Ast::fncall(lower(*head), args.into_iter().map(lower).collect()),
        RawNode::BinOp(op, lhs, rhs) => {
            Ast::absolute_call(op.canonical_name(), vec![lower(*lhs), lower(*rhs)])
        }
        RawNode::UnaryOp(op, operand) => Ast::absolute_call(op.canonical_name(), vec![lower(*operand)]),
        RawNode::Dot(target, name) => {
            Ast::absolute_call(".", vec![lower(*target), Ast::Ref(Ref::relative(name))])
        }
        RawNode::Index(target, form) => match form {
            IndexForm::Single(index) => Ast::absolute_call("index", vec![lower(*index), lower(*target)]),
            IndexForm::Slice(slots) => {
                let mut args: Vec<Ast> = slots
                    .into_iter()
                    .map(|slot| slot.map(lower).unwrap_or(Ast::Value(Value::Null)))
                    .collect();
                args.push(lower(*target));
                Ast::absolute_call("index", args)
            }
        },
    }
}

fn key_to_string(key: RawKey) -> String {
    key.into_string()
}
