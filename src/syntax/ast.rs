/// Generic syntax tree for the block/attribute grammar.
///
/// The tree is untyped: `backend "gcs" { ... }` and `provider "google" { ... }`
/// both come out as a [`Block`]. Meaning is assigned later, during validation.
#[derive(Debug, Clone, PartialEq)]
pub struct Body {
    pub items: Vec<Item>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Item {
    Attribute(Attribute),
    Block(Block),
}

/// A `name = value` pair.
#[derive(Debug, Clone, PartialEq)]
pub struct Attribute {
    pub name: String,
    pub value: Value,
}

/// A labeled block, e.g. `backend "gcs" { ... }`.
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub ident: String,
    pub labels: Vec<String>,
    pub body: Body,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    String(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    List(Vec<Value>),
    /// Entries keep declaration order so a document round-trips unchanged.
    Object(Vec<(String, Value)>),
}
