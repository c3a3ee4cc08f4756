use crate::engine::query::{ColumnName, OrderDirection, TableName};

/// A single SELECT statement, ready to be rendered.
///
/// Conditions are stored already rendered, because rendering literals is the job of the
/// [ValueFormatter](crate::engine::formatting::ValueFormatter) the compiler was built with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statement {
    pub select: Vec<SelectedColumn>,
    pub from: TableName,
    pub joins: Vec<Join>,
    pub filters: Vec<FilterClause>,
    pub orders: Vec<Ordering>,
    pub limit: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectedColumn {
    Column(QualifiedColumn),
    /// `table.*`
    AllOf(TableName),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QualifiedColumn {
    pub table: TableName,
    pub column: ColumnName,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Join {
    /// The table to join to.
    pub target: TableName,
    pub condition: JoinCondition,
}

/// `child.column = parent.column`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinCondition {
    pub child: QualifiedColumn,
    pub parent: QualifiedColumn,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterClause {
    Predicate(String),
    /// Rendered in parentheses, with the ligature between each predicate.
    Group(Ligature, Vec<String>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ligature {
    And,
    Or,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ordering {
    pub column: QualifiedColumn,
    pub direction: OrderDirection,
}

impl Statement {
    pub fn new(from: TableName) -> Self {
        Statement {
            select: vec![],
            from,
            joins: vec![],
            filters: vec![],
            orders: vec![],
            limit: None,
        }
    }
}

impl QualifiedColumn {
    pub fn new<T, C>(table: T, column: C) -> Self
    where
        T: Into<TableName>,
        C: Into<ColumnName>,
    {
        QualifiedColumn {
            table: table.into(),
            column: column.into(),
        }
    }
}
