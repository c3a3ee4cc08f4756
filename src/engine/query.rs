//! The in-memory representation of a query document.
//!
//! A [Query] is built once by the parser and then only read by the compiler. Every mapping is a
//! `BTreeMap`, so walking the tree always visits siblings in key order.
use serde_json::{Number, Value};
use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};

pub const SELECT: &str = "select";
pub const WHERE: &str = "where";
pub const ORDER: &str = "order";
pub const LIMIT: &str = "limit";
pub const JOIN: &str = "join";

/// Keys that configure a table query. Every other key of a table query is a relation.
pub const RESERVED_KEYS: [&str; 5] = [SELECT, WHERE, ORDER, LIMIT, JOIN];

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    pub tables: BTreeMap<TableName, TableQuery>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TableQuery {
    /// Empty means all columns.
    pub select: Vec<ColumnName>,
    pub filter: Filter,
    pub order: Option<Order>,
    pub limit: Option<u64>,
    /// Overrides the `<parent>_id = id` join convention.
    pub join: Option<JoinKeys>,
    pub relations: BTreeMap<TableName, TableQuery>,
}

/// The WHERE clause of a table query.
///
/// Direct conditions, the `and` group and the `or` group are all combined with AND.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    pub conditions: ConditionSet,
    pub and: Vec<ConditionSet>,
    pub or: Vec<ConditionSet>,
}

pub type ConditionSet = BTreeMap<ColumnName, Condition>;

#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    Equals(Literal),
    Compare(Comparison, Literal),
    In(Vec<Literal>),
    /// Shapes we don't know how to compile. These are kept, but never rendered.
    Unsupported,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    Equals,
    GreaterThan,
    GreaterOrEqual,
    LesserThan,
    LesserOrEqual,
}

/// A scalar taken verbatim from the query document.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    String(String),
    Number(Number),
    Bool(bool),
    Null,
    /// Arrays and objects that ended up where a scalar was expected.
    Other(Value),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Order {
    Single(SortKey),
    List(Vec<SortKey>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortKey {
    pub column: ColumnName,
    pub direction: OrderDirection,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderDirection {
    Ascending,
    Descending,
}

/// Explicit join keys, written as `child_column:parent_column`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinKeys {
    pub child: ColumnName,
    pub parent: ColumnName,
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ColumnName(pub String);

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TableName(pub String);

impl Query {
    pub fn iter(&self) -> impl Iterator<Item = (&TableName, &TableQuery)> {
        self.tables.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

impl Filter {
    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty() && self.and.is_empty() && self.or.is_empty()
    }
}

impl Order {
    pub fn keys(&self) -> &[SortKey] {
        match self {
            Order::Single(key) => std::slice::from_ref(key),
            Order::List(keys) => keys.as_slice(),
        }
    }
}

impl SortKey {
    /// A leading `-` means descending.
    pub fn parse(token: &str) -> Self {
        match token.strip_prefix('-') {
            Some(column) => SortKey {
                column: column.into(),
                direction: OrderDirection::Descending,
            },
            None => SortKey {
                column: token.into(),
                direction: OrderDirection::Ascending,
            },
        }
    }
}

impl JoinKeys {
    /// Returns `None` unless the input splits into exactly two parts.
    pub fn parse(input: &str) -> Option<Self> {
        let mut parts = input.split(':');

        match (parts.next(), parts.next(), parts.next()) {
            (Some(child), Some(parent), None) => Some(JoinKeys {
                child: child.into(),
                parent: parent.into(),
            }),
            _ => None,
        }
    }
}

impl Comparison {
    /// Maps operator keys like `">="` to comparisons. `in` is not a comparison.
    pub fn from_operator(operator: &str) -> Option<Self> {
        match operator {
            ">" => Some(Comparison::GreaterThan),
            ">=" => Some(Comparison::GreaterOrEqual),
            "<" => Some(Comparison::LesserThan),
            "<=" => Some(Comparison::LesserOrEqual),
            _ => None,
        }
    }
}

impl From<Value> for Literal {
    fn from(value: Value) -> Self {
        match value {
            Value::String(string) => Literal::String(string),
            Value::Number(number) => Literal::Number(number),
            Value::Bool(boolean) => Literal::Bool(boolean),
            Value::Null => Literal::Null,
            other => Literal::Other(other),
        }
    }
}

impl<T> From<T> for ColumnName
where
    T: AsRef<str>,
{
    fn from(value: T) -> Self {
        ColumnName(value.as_ref().to_string())
    }
}

impl<T> From<T> for TableName
where
    T: AsRef<str>,
{
    fn from(value: T) -> Self {
        TableName(value.as_ref().to_string())
    }
}

impl Display for ColumnName {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Display for TableName {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
