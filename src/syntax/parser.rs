//! Recursive-descent parser for the block/attribute grammar.

use crate::error::ConfigError;

use super::ast::{Attribute, Block, Body, Item, Value};
use super::lexer::{self, Spanned, Token};

/// Parses a full document into a [`Body`].
pub fn parse(source: &str) -> Result<Body, ConfigError> {
    let tokens = lexer::tokenize(source)?;
    let mut parser = Parser {
        tokens,
        position: 0,
    };
    parser.parse_body(false)
}

struct Parser {
    tokens: Vec<Spanned>,
    position: usize,
}

impl Parser {
    /// Parses items until EOF, or until the closing `}` when `in_block`.
    fn parse_body(&mut self, in_block: bool) -> Result<Body, ConfigError> {
        let mut items = Vec::new();
        loop {
            match self.peek_token() {
                Token::Eof => {
                    if in_block {
                        return Err(self.error("expected '}'"));
                    }
                    return Ok(Body { items });
                }
                Token::RightBrace if in_block => {
                    self.advance();
                    return Ok(Body { items });
                }
                Token::Ident(_) => items.push(self.parse_item()?),
                _ => return Err(self.error("expected identifier")),
            }
        }
    }

    /// An item is either `name = value` or `name ("label")* { body }`.
    fn parse_item(&mut self) -> Result<Item, ConfigError> {
        let name = self.expect_ident()?;
        match self.peek_token() {
            Token::Equals => {
                self.advance();
                let value = self.parse_value()?;
                Ok(Item::Attribute(Attribute { name, value }))
            }
            Token::StringLit(_) | Token::LeftBrace => {
                let mut labels = Vec::new();
                loop {
                    let label = match self.peek_token() {
                        Token::StringLit(label) => label.clone(),
                        _ => break,
                    };
                    self.advance();
                    labels.push(label);
                }
                self.expect(Token::LeftBrace, "'{'")?;
                let body = self.parse_body(true)?;
                Ok(Item::Block(Block {
                    ident: name,
                    labels,
                    body,
                }))
            }
            _ => Err(self.error("expected '=' or '{' after identifier")),
        }
    }

    fn parse_value(&mut self) -> Result<Value, ConfigError> {
        let value = match self.peek_token().clone() {
            Token::StringLit(s) => {
                self.advance();
                Value::String(s)
            }
            Token::IntLit(n) => {
                self.advance();
                Value::Int(n)
            }
            Token::FloatLit(n) => {
                self.advance();
                Value::Float(n)
            }
            Token::BoolLit(b) => {
                self.advance();
                Value::Bool(b)
            }
            Token::LeftBracket => self.parse_list()?,
            Token::LeftBrace => self.parse_object()?,
            _ => return Err(self.error("expected a value")),
        };
        Ok(value)
    }

    fn parse_list(&mut self) -> Result<Value, ConfigError> {
        self.advance(); // '['
        let mut items = Vec::new();
        loop {
            if matches!(self.peek_token(), Token::RightBracket) {
                self.advance();
                return Ok(Value::List(items));
            }
            items.push(self.parse_value()?);
            if matches!(self.peek_token(), Token::Comma) {
                self.advance();
            } else if !matches!(self.peek_token(), Token::RightBracket) {
                return Err(self.error("expected ',' or ']' in list"));
            }
        }
    }

    /// Object entries are `key = value`, separated by commas or newlines.
    fn parse_object(&mut self) -> Result<Value, ConfigError> {
        self.advance(); // '{'
        let mut entries = Vec::new();
        loop {
            match self.peek_token().clone() {
                Token::RightBrace => {
                    self.advance();
                    return Ok(Value::Object(entries));
                }
                Token::Ident(key) => {
                    self.advance();
                    self.expect(Token::Equals, "'='")?;
                    let value = self.parse_value()?;
                    entries.push((key, value));
                    if matches!(self.peek_token(), Token::Comma) {
                        self.advance();
                    }
                }
                _ => return Err(self.error("expected identifier or '}' in object")),
            }
        }
    }

    fn peek(&self) -> &Spanned {
        &self.tokens[self.position]
    }

    fn peek_token(&self) -> &Token {
        &self.tokens[self.position].token
    }

    /// EOF is always the last token, so the cursor never runs past it.
    fn advance(&mut self) {
        if self.position + 1 < self.tokens.len() {
            self.position += 1;
        }
    }

    fn expect(&mut self, expected: Token, describe: &str) -> Result<(), ConfigError> {
        if *self.peek_token() == expected {
            self.advance();
            Ok(())
        } else {
            Err(self.error(&format!("expected {describe}")))
        }
    }

    fn expect_ident(&mut self) -> Result<String, ConfigError> {
        match self.peek_token().clone() {
            Token::Ident(name) => {
                self.advance();
                Ok(name)
            }
            _ => Err(self.error("expected identifier")),
        }
    }

    fn error(&self, message: &str) -> ConfigError {
        let spanned = self.peek();
        ConfigError::Parse {
            line: spanned.line,
            column: spanned.column,
            message: format!("{message}, found {}", describe_token(&spanned.token)),
        }
    }
}

fn describe_token(token: &Token) -> String {
    match token {
        Token::Ident(name) => format!("identifier \"{name}\""),
        Token::StringLit(_) => "string literal".to_string(),
        Token::IntLit(_) | Token::FloatLit(_) => "number literal".to_string(),
        Token::BoolLit(_) => "boolean literal".to_string(),
        Token::Equals => "'='".to_string(),
        Token::LeftBrace => "'{'".to_string(),
        Token::RightBrace => "'}'".to_string(),
        Token::LeftBracket => "'['".to_string(),
        Token::RightBracket => "']'".to_string(),
        Token::Comma => "','".to_string(),
        Token::Eof => "end of input".to_string(),
    }
}
