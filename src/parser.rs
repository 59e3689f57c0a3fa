//! Recursive-descent parser: tokens to the raw parse tree.
//!
//! Precedence, low to high: pipe, `||`, `&&`, `== != =~`, `< <= > >=`, `+ -`, `* / %`, unary
//! prefix (`! -`), juxtaposition function call, postfix (`.name`, `[…]`), primary.  Unlike the
//! teacher's parser this one never panics — every failure path returns a `ParseError` so a
//! malformed query surfaces as a typed syntax error rather than aborting the process.

use crate::ast::raw::{BinOpKind, IndexForm, RawKey, RawNode, UnaryOpKind};
use crate::lexer::{LexError, Lexer, Position, Token};
use crate::value::Value;

#[derive(Debug, Clone, PartialEq)]
pub enum ParseError {
    Lex(LexError),
    UnexpectedToken { found: String, expected: String, position: Position },
    UnexpectedEof { expected: String },
    EmptyIndexSlot { position: Position },
    TrailingInput { found: String, position: Position },
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParseError::Lex(e) => write!(f, "{e}"),
            ParseError::UnexpectedToken { found, expected, position } => {
                write!(f, "expected {expected}, found {found} at {position}")
            }
            ParseError::UnexpectedEof { expected } => write!(f, "unexpected end of query, expected {expected}"),
            ParseError::EmptyIndexSlot { position } => {
                write!(f, "index expression cannot be empty at {position}")
            }
            ParseError::TrailingInput { found, position } => {
                write!(f, "unexpected trailing input {found} at {position}")
            }
        }
    }
}

impl std::error::Error for ParseError {}

impl From<LexError> for ParseError {
    fn from(e: LexError) -> Self {
        ParseError::Lex(e)
    }
}

pub struct Parser {
    lexer: Lexer,
    current: Token,
    position: Position,
}

impl Parser {
    pub fn new(input: &str) -> Result<Self, ParseError> {
        let mut lexer = Lexer::new(input);
        let current = lexer.next_token()?;
        let position = lexer.position();
        Ok(Parser { lexer, current, position })
    }

    fn advance(&mut self) -> Result<(), ParseError> {
        self.current = self.lexer.next_token()?;
        self.position = self.lexer.position();
        Ok(())
    }

    fn check(&self, token: &Token) -> bool {
        &self.current == token
    }

    fn expect(&mut self, token: Token, expected: &str) -> Result<(), ParseError> {
        if self.current == token {
            self.advance()
        } else {
            Err(ParseError::UnexpectedToken {
                found: format!("{:?}", self.current),
                expected: expected.to_string(),
                position: self.position,
            })
        }
    }

    /// Parse a complete query, failing if any input remains afterwards.
    pub fn parse(input: &str) -> Result<RawNode, ParseError> {
        let mut parser = Parser::new(input)?;
        let node = parser.parse_pipe()?;
        if parser.current != Token::Eof {
            return Err(ParseError::TrailingInput {
                found: format!("{:?}", parser.current),
                position: parser.position,
            });
        }
        Ok(node)
    }

    fn parse_pipe(&mut self) -> Result<RawNode, ParseError> {
        let mut stages = vec![self.parse_or()?];
        while self.check(&Token::Pipe) {
            self.advance()?;
            stages.push(self.parse_or()?);
        }
        if stages.len() == 1 {
            Ok(stages.into_iter().next().unwrap())
        } else {
            Ok(RawNode::Pipe(stages))
        }
    }

    fn parse_or(&mut self) -> Result<RawNode, ParseError> {
        let mut node = self.parse_and()?;
        while self.check(&Token::Or) {
            self.advance()?;
            let rhs = self.parse_and()?;
            node = RawNode::BinOp(BinOpKind::Or, Box::new(node), Box::new(rhs));
        }
        Ok(node)
    }

    fn parse_and(&mut self) -> Result<RawNode, ParseError> {
        let mut node = self.parse_equality()?;
        while self.check(&Token::And) {
            self.advance()?;
            let rhs = self.parse_equality()?;
            node = RawNode::BinOp(BinOpKind::And, Box::new(node), Box::new(rhs));
        }
        Ok(node)
    }

    fn parse_equality(&mut self) -> Result<RawNode, ParseError> {
        let mut node = self.parse_comparison()?;
        loop {
            let op = match self.current {
                Token::EqEq => BinOpKind::Eq,
                Token::NotEq => BinOpKind::Neq,
                Token::Match => BinOpKind::Match,
                _ => break,
            };
            self.advance()?;
            let rhs = self.parse_comparison()?;
            node = RawNode::BinOp(op, Box::new(node), Box::new(rhs));
        }
        Ok(node)
    }

    fn parse_comparison(&mut self) -> Result<RawNode, ParseError> {
        let mut node = self.parse_additive()?;
        loop {
            let op = match self.current {
                Token::Lt => BinOpKind::Lt,
                Token::Lte => BinOpKind::Lte,
                Token::Gt => BinOpKind::Gt,
                Token::Gte => BinOpKind::Gte,
                _ => break,
            };
            self.advance()?;
            let rhs = self.parse_additive()?;
            node = RawNode::BinOp(op, Box::new(node), Box::new(rhs));
        }
        Ok(node)
    }

    fn parse_additive(&mut self) -> Result<RawNode, ParseError> {
        let mut node = self.parse_multiplicative()?;
        loop {
            let op = match self.current {
                Token::Plus => BinOpKind::Plus,
                Token::Minus => BinOpKind::Minus,
                _ => break,
            };
            self.advance()?;
            let rhs = self.parse_multiplicative()?;
            node = RawNode::BinOp(op, Box::new(node), Box::new(rhs));
        }
        Ok(node)
    }

    fn parse_multiplicative(&mut self) -> Result<RawNode, ParseError> {
        let mut node = self.parse_unary()?;
        loop {
            let op = match self.current {
                Token::Star => BinOpKind::Mul,
                Token::Slash => BinOpKind::Div,
                Token::Percent => BinOpKind::Mod,
                _ => break,
            };
            self.advance()?;
            let rhs = self.parse_unary()?;
            node = RawNode::BinOp(op, Box::new(node), Box::new(rhs));
        }
        Ok(node)
    }

    fn parse_unary(&mut self) -> Result<RawNode, ParseError> {
        match self.current {
            Token::Bang => {
                self.advance()?;
                let operand = self.parse_unary()?;
                Ok(RawNode::UnaryOp(UnaryOpKind::Not, Box::new(operand)))
            }
            Token::Minus => {
                self.advance()?;
                let operand = self.parse_unary()?;
                Ok(RawNode::UnaryOp(UnaryOpKind::Neg, Box::new(operand)))
            }
            _ => self.parse_fncall(),
        }
    }

    /// Juxtaposition call: one-or-more call-atom-level expressions in a row. The first is the
    /// head; any further ones are arguments. A lone atom is returned unwrapped, not as a
    /// zero-arg call.
    fn parse_fncall(&mut self) -> Result<RawNode, ParseError> {
        let head = self.parse_call_atom()?;
        let mut args = Vec::new();
        while self.starts_atom() {
            args.push(self.parse_call_atom()?);
        }
        if args.is_empty() {
            Ok(head)
        } else {
            Ok(RawNode::Fncall(Box::new(head), args))
        }
    }

    /// A head or argument slot of a juxtaposition call: an optionally-unary-prefixed postfix
    /// atom. This stops short of `parse_fncall` itself, so `f -1 2` parses as a two-argument
    /// call rather than `-1` swallowing `2` into a nested call.
    fn parse_call_atom(&mut self) -> Result<RawNode, ParseError> {
        match self.current {
            Token::Bang => {
                self.advance()?;
                let operand = self.parse_call_atom()?;
                Ok(RawNode::UnaryOp(UnaryOpKind::Not, Box::new(operand)))
            }
            Token::Minus => {
                self.advance()?;
                let operand = self.parse_call_atom()?;
                Ok(RawNode::UnaryOp(UnaryOpKind::Neg, Box::new(operand)))
            }
            _ => self.parse_postfix(),
        }
    }

    /// Whether the current token can begin a new postfix-level atom — used to decide whether
    /// juxtaposition continues or the call is complete.
    ///
    /// A `Minus` is ambiguous: `f -1 2` wants it to start a negated argument, but `5 - 3` wants
    /// it left alone for `parse_additive` to pick up as binary subtraction. The lexer tracks
    /// whether the `-` had whitespace right after it; only a tight `-` (no space before its
    /// operand, as in `-1`) is treated as the start of a new juxtaposition argument.
    fn starts_atom(&self) -> bool {
        match self.current {
            Token::Minus => self.lexer.last_minus_is_tight(),
            _ => matches!(
                self.current,
                Token::Number(_)
                    | Token::String(_)
                    | Token::True
                    | Token::False
                    | Token::Null
                    | Token::Ident(_)
                    | Token::At
                    | Token::Dollar
                    | Token::LParen
                    | Token::LBracket
                    | Token::LBrace
                    | Token::Bang
            ),
        }
    }

    fn parse_postfix(&mut self) -> Result<RawNode, ParseError> {
        let mut node = self.parse_primary()?;
        loop {
            match self.current {
                Token::Dot => {
                    self.advance()?;
                    let name = self.expect_ident()?;
                    node = RawNode::Dot(Box::new(node), name);
                }
                Token::LBracket => {
                    self.advance()?;
                    let form = self.parse_index_form()?;
                    node = RawNode::Index(Box::new(node), form);
                }
                _ => break,
            }
        }
        Ok(node)
    }

    fn parse_index_form(&mut self) -> Result<IndexForm, ParseError> {
        let mut parts = vec![self.parse_slice_slot()?];
        let mut is_slice = false;
        while self.check(&Token::Colon) {
            is_slice = true;
            self.advance()?;
            parts.push(self.parse_slice_slot()?);
        }
        let pos = self.position;
        self.expect(Token::RBracket, "']'")?;
        if is_slice {
            Ok(IndexForm::Slice(parts))
        } else {
            match parts.into_iter().next().unwrap() {
                Some(node) => Ok(IndexForm::Single(Box::new(node))),
                None => Err(ParseError::EmptyIndexSlot { position: pos }),
            }
        }
    }

    fn parse_slice_slot(&mut self) -> Result<Option<RawNode>, ParseError> {
        if self.check(&Token::Colon) || self.check(&Token::RBracket) {
            Ok(None)
        } else {
            Ok(Some(self.parse_pipe_free_expr()?))
        }
    }

    /// Inside brackets, array/object literals, and call arguments, pipes are not allowed
    /// without explicit parentheses — parse at the `or` level, one below pipe.
    fn parse_pipe_free_expr(&mut self) -> Result<RawNode, ParseError> {
        self.parse_or()
    }

    fn expect_ident(&mut self) -> Result<String, ParseError> {
        match self.current.clone() {
            Token::Ident(name) => {
                self.advance()?;
                Ok(name)
            }
            other => Err(ParseError::UnexpectedToken {
                found: format!("{other:?}"),
                expected: "identifier".to_string(),
                position: self.position,
            }),
        }
    }

    fn parse_primary(&mut self) -> Result<RawNode, ParseError> {
        match self.current.clone() {
            Token::Number(n) => {
                self.advance()?;
                Ok(RawNode::Literal(Value::Number(n)))
            }
            Token::String(s) => {
                self.advance()?;
                Ok(RawNode::Literal(Value::string(s)))
            }
            Token::True => {
                self.advance()?;
                Ok(RawNode::Literal(Value::Boolean(true)))
            }
            Token::False => {
                self.advance()?;
                Ok(RawNode::Literal(Value::Boolean(false)))
            }
            Token::Null => {
                self.advance()?;
                Ok(RawNode::Literal(Value::Null))
            }
            Token::At => {
                self.advance()?;
                Ok(RawNode::Ref("@".to_string()))
            }
            Token::Dollar => {
                self.advance()?;
                Ok(RawNode::Ref("$".to_string()))
            }
            Token::Ident(name) => {
                self.advance()?;
                Ok(RawNode::Ref(name))
            }
            Token::LParen => {
                self.advance()?;
                let inner = self.parse_pipe()?;
                self.expect(Token::RParen, "')'")?;
                Ok(inner)
            }
            Token::LBracket => self.parse_array(),
            Token::LBrace => self.parse_object(),
            Token::Eof => Err(ParseError::UnexpectedEof { expected: "an expression".to_string() }),
            other => Err(ParseError::UnexpectedToken {
                found: format!("{other:?}"),
                expected: "an expression".to_string(),
                position: self.position,
            }),
        }
    }

    fn parse_array(&mut self) -> Result<RawNode, ParseError> {
        self.expect(Token::LBracket, "'['")?;
        let mut items = Vec::new();
        if !self.check(&Token::RBracket) {
            items.push(self.parse_pipe_free_expr()?);
            while self.check(&Token::Comma) {
                self.advance()?;
                if self.check(&Token::RBracket) {
                    break;
                }
                items.push(self.parse_pipe_free_expr()?);
            }
        }
        self.expect(Token::RBracket, "']'")?;
        Ok(RawNode::Array(items))
    }

    fn parse_object(&mut self) -> Result<RawNode, ParseError> {
        self.expect(Token::LBrace, "'{'")?;
        let mut entries = Vec::new();
        if !self.check(&Token::RBrace) {
            entries.push(self.parse_object_entry()?);
            while self.check(&Token::Comma) {
                self.advance()?;
                if self.check(&Token::RBrace) {
                    break;
                }
                entries.push(self.parse_object_entry()?);
            }
        }
        self.expect(Token::RBrace, "'}'")?;
        Ok(RawNode::Object(entries))
    }

    fn parse_object_entry(&mut self) -> Result<(RawKey, RawNode), ParseError> {
        let key = match self.current.clone() {
            Token::Ident(name) => {
                self.advance()?;
                RawKey::Ident(name)
            }
            Token::String(s) => {
                self.advance()?;
                RawKey::String(s)
            }
            other => {
                return Err(ParseError::UnexpectedToken {
                    found: format!("{other:?}"),
                    expected: "an object key".to_string(),
                    position: self.position,
                });
            }
        };
        self.expect(Token::Colon, "':'")?;
        let value = self.parse_pipe_free_expr()?;
        Ok((key, value))
    }
}
