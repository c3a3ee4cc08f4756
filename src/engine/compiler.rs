//! Compiles a [Query] into SQL statements.
//!
//! There are two ways of doing this and they produce differently shaped output, so a deployment
//! has to pick one and stick to it:
//! - [Strategy::PerRelation] emits one statement for every table query, at any depth. Relations
//!   are joined to their direct parent only and are keyed by their path, like `users_posts`.
//! - [Strategy::Combined] emits one statement per root table. Every relation below it becomes a
//!   JOIN and contributes its columns to the SELECT list. Only the root's WHERE, ORDER BY and
//!   LIMIT are rendered.
use crate::engine::formatting::{InlineLiterals, ValueFormatter};
use crate::engine::grow_stack;
use crate::engine::query::{
    Condition, ConditionSet, Filter, JoinKeys, Query, TableName, TableQuery,
};
use crate::engine::statement::{
    FilterClause, Join, JoinCondition, Ligature, Ordering, QualifiedColumn, SelectedColumn,
    Statement,
};
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::{Debug, Formatter};
use std::str::FromStr;

/// Output name to SQL text.
pub type Statements = BTreeMap<String, String>;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Strategy {
    #[default]
    PerRelation,
    Combined,
}

pub struct Compiler {
    strategy: Strategy,
    formatter: Box<dyn ValueFormatter + Send + Sync>,
}

impl Compiler {
    pub fn new(strategy: Strategy) -> Self {
        Self::with_formatter(strategy, Box::new(InlineLiterals))
    }

    pub fn with_formatter(
        strategy: Strategy,
        formatter: Box<dyn ValueFormatter + Send + Sync>,
    ) -> Self {
        Compiler {
            strategy,
            formatter,
        }
    }

    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    pub fn compile(&self, query: &Query) -> Statements {
        let mut statements = Statements::new();

        for (table, table_query) in query.iter() {
            debug!("Compiling {table} using {:?}", self.strategy);

            match self.strategy {
                Strategy::PerRelation => self.compile_per_relation(
                    &mut statements,
                    table.0.clone(),
                    table,
                    table_query,
                    None,
                ),
                Strategy::Combined => {
                    let statement = self.combined_statement(table, table_query);
                    statements.insert(table.0.clone(), statement.to_string());
                }
            }
        }

        statements
    }

    fn compile_per_relation(
        &self,
        statements: &mut Statements,
        output_name: String,
        table: &TableName,
        table_query: &TableQuery,
        parent: Option<&TableName>,
    ) {
        let statement = self.standalone_statement(table, table_query, parent);
        statements.insert(output_name.clone(), statement.to_string());

        for (relation, relation_query) in &table_query.relations {
            grow_stack(|| {
                self.compile_per_relation(
                    statements,
                    format!("{output_name}_{relation}"),
                    relation,
                    relation_query,
                    Some(table),
                )
            });
        }
    }

    fn standalone_statement(
        &self,
        table: &TableName,
        table_query: &TableQuery,
        parent: Option<&TableName>,
    ) -> Statement {
        let mut statement = self.root_statement(table, table_query);

        if let Some(parent) = parent {
            statement.joins.push(Join {
                target: parent.clone(),
                condition: join_condition(table, table_query.join.as_ref(), parent),
            });
        }

        statement
    }

    fn combined_statement(&self, table: &TableName, table_query: &TableQuery) -> Statement {
        let mut statement = self.root_statement(table, table_query);

        fold_relations(&mut statement, table, table_query);

        statement
    }

    /// Everything a table query renders about itself: columns, filters, ordering and limit.
    fn root_statement(&self, table: &TableName, table_query: &TableQuery) -> Statement {
        let mut statement = Statement::new(table.clone());

        statement.select = select_list(table, table_query);
        statement.filters = self.filter_clauses(table, &table_query.filter);
        statement.orders = order_list(table, table_query);
        statement.limit = table_query.limit;

        statement
    }

    fn filter_clauses(&self, table: &TableName, filter: &Filter) -> Vec<FilterClause> {
        if filter.is_empty() {
            return vec![];
        }

        let mut clauses: Vec<FilterClause> = self
            .predicates(table, &filter.conditions)
            .into_iter()
            .map(FilterClause::Predicate)
            .collect();

        for (ligature, group) in [(Ligature::And, &filter.and), (Ligature::Or, &filter.or)] {
            let predicates: Vec<String> = group
                .iter()
                .flat_map(|conditions| self.predicates(table, conditions))
                .collect();

            if !predicates.is_empty() {
                clauses.push(FilterClause::Group(ligature, predicates));
            }
        }

        clauses
    }

    fn predicates(&self, table: &TableName, conditions: &ConditionSet) -> Vec<String> {
        conditions
            .iter()
            .filter_map(|(column, condition)| {
                let column = QualifiedColumn::new(table.clone(), column.clone());

                self.predicate(&column, condition)
            })
            .collect()
    }

    fn predicate(&self, column: &QualifiedColumn, condition: &Condition) -> Option<String> {
        match condition {
            Condition::Equals(value) => Some(self.formatter.equality(column, value)),
            Condition::Compare(comparison, value) => {
                Some(self.formatter.comparison(column, *comparison, value))
            }
            Condition::In(values) => Some(self.formatter.in_list(column, values)),
            Condition::Unsupported => None,
        }
    }
}

/// Appends every relation below `parent` to the statement, depth first.
fn fold_relations(statement: &mut Statement, parent: &TableName, parent_query: &TableQuery) {
    for (relation, relation_query) in &parent_query.relations {
        statement.select.extend(select_list(relation, relation_query));
        statement.joins.push(Join {
            target: relation.clone(),
            condition: join_condition(relation, relation_query.join.as_ref(), parent),
        });

        grow_stack(|| fold_relations(statement, relation, relation_query));
    }
}

/// Uses the explicit keys when there are any, `child.<parent>_id = parent.id` otherwise.
pub fn join_condition(
    child: &TableName,
    keys: Option<&JoinKeys>,
    parent: &TableName,
) -> JoinCondition {
    match keys {
        Some(JoinKeys {
            child: child_column,
            parent: parent_column,
        }) => JoinCondition {
            child: QualifiedColumn::new(child.clone(), child_column.clone()),
            parent: QualifiedColumn::new(parent.clone(), parent_column.clone()),
        },
        None => JoinCondition {
            child: QualifiedColumn::new(child.clone(), format!("{parent}_id")),
            parent: QualifiedColumn::new(parent.clone(), "id"),
        },
    }
}

fn select_list(table: &TableName, table_query: &TableQuery) -> Vec<SelectedColumn> {
    if table_query.select.is_empty() {
        return vec![SelectedColumn::AllOf(table.clone())];
    }

    table_query
        .select
        .iter()
        .map(|column| SelectedColumn::Column(QualifiedColumn::new(table.clone(), column.clone())))
        .collect()
}

fn order_list(table: &TableName, table_query: &TableQuery) -> Vec<Ordering> {
    let Some(order) = &table_query.order else {
        return vec![];
    };

    order
        .keys()
        .iter()
        .map(|key| Ordering {
            column: QualifiedColumn::new(table.clone(), key.column.clone()),
            direction: key.direction,
        })
        .collect()
}

impl Debug for Compiler {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Compiler")
            .field("strategy", &self.strategy)
            .finish_non_exhaustive()
    }
}

impl FromStr for Strategy {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "per-relation" => Ok(Strategy::PerRelation),
            "combined" => Ok(Strategy::Combined),
            other => Err(other.to_string()),
        }
    }
}
