mod ast;
mod lexer;
mod parser;

pub use ast::{Attribute, Block, Body, Item, Value};
pub use parser::parse;
