//! MistQL: an embeddable query language for filtering, transforming, and validating JSON
//! documents.
//!
//! ```
//! use mistql::query;
//! use serde_json::json;
//!
//! let result = query("@.prizes | count @", &json!({"prizes": [1, 2, 3]})).unwrap();
//! assert_eq!(result, json!(3));
//! ```

pub mod ast;
pub mod builtins;
pub mod cli;
pub mod error;
pub mod evaluator;
pub mod extras;
pub mod gardenwall;
pub mod instance;
pub mod lazy;
pub mod lexer;
pub mod lowering;
pub mod parser;
pub mod stack;
pub mod value;

pub use error::{Kind, QueryError};
pub use instance::Instance;
pub use value::Value;

/// Parse a query string into an AST, without evaluating it against any data.
pub fn parse(query: &str) -> Result<ast::Ast, QueryError> {
    let raw = parser::Parser::parse(query)?;
    Ok(lowering::lower(raw))
}

/// Evaluate an already-parsed AST against a runtime value.
pub fn evaluate(ast: &ast::Ast, data: Value) -> Result<Value, QueryError> {
    let stack = stack::Stack::build_initial(data, builtins::build_root_frame());
    Ok(evaluator::eval(ast, &stack)?)
}

/// Parse and evaluate a query against a host JSON document in one step, the common case for
/// one-off queries with no extras and no need to reuse a parsed AST.
pub fn query(query_str: &str, data: &serde_json::Value) -> Result<serde_json::Value, QueryError> {
    let ast = parse(query_str)?;
    let input = gardenwall::from_json(data);
    let result = evaluate(&ast, input)?;
    Ok(gardenwall::to_json(&result)?)
}
