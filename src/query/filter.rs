//! # Search and Filtering Primitives
//!
//! This module provides the building blocks for constructing document queries that
//! can be evaluated by any [`crate::store::Store`] backend.
//!
//! The filtering logic is built hierarchically using four core concepts:
//!
//! -   _Value_: the unit of data.
//!     A wrapper ([`Value`]) that allows heterogeneous types (Integers, Floats, Strings,
//!     Booleans, ObjectIds, null) to be treated uniformly within dynamic containers.
//!
//! -   _Operation_ ([`Op`]): the logical predicate.
//!     An [`Op`] defines *how* to compare data: equality (`Eq`) or set membership (`In`).
//!     A `Null` operand also matches documents where the field is missing.
//!
//! -   _Expression_ ([`Expr`]): the single constraint.
//!     An expression is formed by binding a document field name to an [`Op`].
//!     It asserts a rule for that specific field (e.g., *"name == Mary"*).
//!     On sequence fields an expression holds when any element satisfies it, so
//!     `Eq` reads as *contains*.
//!
//! -   _Filter_: the composite query.
//!     A [`Filter`] is a conjunction of expressions. A document matches when every
//!     expression holds; an empty filter matches everything.

use mongodb::bson::{Bson, oid::ObjectId};

/// Floating point value type alias
pub type Float = f64;
/// Integer value type alias
pub type Integer = i64;
/// Literal type alias
pub type Text = String;

/// A wrapper enum to allow heterogeneous values to coexist in filters and updates.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Integer(Integer),
    Float(Float),
    Text(Text),
    Boolean(bool),
    ObjectId(ObjectId),
    Null,
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_owned())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Float(n)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Integer(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Integer(n.into())
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<ObjectId> for Value {
    fn from(id: ObjectId) -> Self {
        Value::ObjectId(id)
    }
}

/// Integers that fit in 32 bits are stored as `Int32`, the same way
/// document drivers encode integral numbers.
impl From<Value> for Bson {
    fn from(value: Value) -> Self {
        match value {
            Value::Integer(n) => i32::try_from(n).map(Bson::Int32).unwrap_or(Bson::Int64(n)),
            Value::Float(n) => Bson::Double(n),
            Value::Text(s) => Bson::String(s),
            Value::Boolean(b) => Bson::Boolean(b),
            Value::ObjectId(id) => Bson::ObjectId(id),
            Value::Null => Bson::Null,
        }
    }
}

/// Represents the logical operator to apply to a field for filtering.
#[derive(Debug, Clone, PartialEq)]
pub enum Op<T> {
    /// Equal (contains, on sequence fields)
    Eq(T),
    /// Found in a set
    In(Vec<T>),
}

/// A single constraint, binding a document field name to an [`Op`].
#[derive(Debug, Clone, PartialEq)]
pub struct Expr(String, Op<Value>);

impl Expr {
    pub fn field(&self) -> &str {
        &self.0
    }

    pub fn op(&self) -> &Op<Value> {
        &self.1
    }

    pub fn into_parts(self) -> (String, Op<Value>) {
        (self.0, self.1)
    }
}

impl<S: Into<String>> From<(S, Op<Value>)> for Expr {
    fn from(value: (S, Op<Value>)) -> Self {
        Self(value.0.into(), value.1)
    }
}

/// The document field holding the store-assigned identifier.
pub const ID_FIELD: &str = "_id";

/// A conjunction of [`Expr`]essions.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    exprs: Vec<Expr>,
}

impl Filter {
    /// Creates a filter matching every document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a filter matching the document with the given identifier.
    pub fn by_id(id: ObjectId) -> Self {
        Self::new().eq(ID_FIELD, id)
    }

    /// Adds an arbitrary expression on `field`.
    pub fn with(mut self, field: impl Into<String>, op: Op<Value>) -> Self {
        self.exprs.push((field, op).into());
        self
    }

    /// Adds an equality expression on `field` (containment on sequence fields).
    pub fn eq(self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.with(field, Op::Eq(value.into()))
    }

    /// Returns true if there are no expressions applied
    pub fn is_empty(&self) -> bool {
        self.exprs.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Expr> {
        self.exprs.iter()
    }
}

impl<'a> IntoIterator for &'a Filter {
    type Item = &'a Expr;
    type IntoIter = std::slice::Iter<'a, Expr>;

    fn into_iter(self) -> Self::IntoIter {
        self.exprs.iter()
    }
}

impl IntoIterator for Filter {
    type Item = Expr;
    type IntoIter = std::vec::IntoIter<Expr>;

    fn into_iter(self) -> Self::IntoIter {
        self.exprs.into_iter()
    }
}
