//! Turns a JSON document into a [Query].
//!
//! Reserved keys are pulled out of each table object first; whatever is left over is a relation.
//! Clause shapes we can't make sense of (`order`, `join`, operator objects) are dropped instead of
//! failing the whole document. Only structural mismatches are errors.
use crate::engine::query::{
    ColumnName, Comparison, Condition, ConditionSet, Filter, JoinKeys, Literal, Order, Query,
    SortKey, TableQuery, LIMIT, RESERVED_KEYS, SELECT, WHERE,
};
use crate::engine::grow_stack;
use log::debug;
use serde::Deserialize;
use serde_json::{Map, Value};
use thiserror::Error;

const AND: &str = "and";
const OR: &str = "or";
const IN: &str = "in";

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("Invalid JSON: {0}")]
    Syntax(#[from] serde_json::Error),
    #[error("A query must be a JSON object mapping table names to table queries, found {0}")]
    NotAQuery(&'static str),
    #[error("`{path}` must be a JSON object, found {found}")]
    NotAnObject { path: String, found: &'static str },
    #[error("`{path}.{clause}` must be {expected}, found {found}")]
    InvalidClause {
        path: String,
        clause: &'static str,
        expected: &'static str,
        found: &'static str,
    },
}

/// Relations can nest arbitrarily deep, so the decoder runs without its recursion limit and grows
/// the stack as it goes instead.
pub fn parse(input: &str) -> Result<Query, ParseError> {
    let mut deserializer = serde_json::Deserializer::from_str(input);
    deserializer.disable_recursion_limit();

    let document = Value::deserialize(serde_stacker::Deserializer::new(&mut deserializer))?;
    deserializer.end()?;

    parse_document(document)
}

pub fn parse_document(document: Value) -> Result<Query, ParseError> {
    let tables = match document {
        Value::Object(tables) => tables,
        other => return Err(ParseError::NotAQuery(kind_of(&other))),
    };

    let mut query = Query::default();
    for (table, value) in tables {
        debug!("Parsing table query for {table}");

        let table_query = parse_table_query(&table, value)?;
        query.tables.insert(table.into(), table_query);
    }

    Ok(query)
}

fn parse_table_query(path: &str, value: Value) -> Result<TableQuery, ParseError> {
    grow_stack(|| parse_table_object(path, value))
}

fn parse_table_object(path: &str, value: Value) -> Result<TableQuery, ParseError> {
    let mut object = match value {
        Value::Object(object) => object,
        other => {
            return Err(ParseError::NotAnObject {
                path: path.to_string(),
                found: kind_of(&other),
            })
        }
    };

    let clauses = ReservedClauses::extract(&mut object);

    let mut table_query = TableQuery {
        select: parse_select(path, clauses.select)?,
        filter: parse_filter(path, clauses.filter)?,
        order: parse_order(clauses.order),
        limit: parse_limit(path, clauses.limit)?,
        join: parse_join(clauses.join),
        relations: Default::default(),
    };

    // Only relations are left in the object at this point.
    for (relation, value) in object {
        let relation_path = format!("{path}.{relation}");
        let relation_query = parse_table_query(&relation_path, value)?;

        table_query.relations.insert(relation.into(), relation_query);
    }

    Ok(table_query)
}

/// The raw values of the reserved keys of a single table object.
struct ReservedClauses {
    select: Option<Value>,
    filter: Option<Value>,
    order: Option<Value>,
    limit: Option<Value>,
    join: Option<Value>,
}

impl ReservedClauses {
    fn extract(object: &mut Map<String, Value>) -> Self {
        let [select, filter, order, limit, join] = RESERVED_KEYS.map(|key| object.remove(key));

        ReservedClauses {
            select,
            filter,
            order,
            limit,
            join,
        }
    }
}

fn parse_select(path: &str, value: Option<Value>) -> Result<Vec<ColumnName>, ParseError> {
    let items = match value {
        None | Some(Value::Null) => return Ok(vec![]),
        Some(Value::Array(items)) => items,
        Some(other) => return Err(invalid_clause(path, SELECT, "an array of strings", &other)),
    };

    items
        .into_iter()
        .map(|item| match item {
            Value::String(column) => Ok(column.into()),
            other => Err(invalid_clause(path, SELECT, "an array of strings", &other)),
        })
        .collect()
}

fn parse_filter(path: &str, value: Option<Value>) -> Result<Filter, ParseError> {
    let object = match value {
        None | Some(Value::Null) => return Ok(Filter::default()),
        Some(Value::Object(object)) => object,
        Some(other) => return Err(invalid_clause(path, WHERE, "an object", &other)),
    };

    let mut filter = Filter::default();

    for (key, value) in object {
        match key.as_str() {
            AND => filter.and = parse_group(path, "where.and", value)?,
            OR => filter.or = parse_group(path, "where.or", value)?,
            _ => {
                filter.conditions.insert(key.into(), parse_condition(value));
            }
        }
    }

    Ok(filter)
}

fn parse_group(
    path: &str,
    clause: &'static str,
    value: Value,
) -> Result<Vec<ConditionSet>, ParseError> {
    let expected = "an array of objects";

    let items = match value {
        Value::Null => return Ok(vec![]),
        Value::Array(items) => items,
        other => return Err(invalid_clause(path, clause, expected, &other)),
    };

    items
        .into_iter()
        .map(|item| match item {
            Value::Object(conditions) => Ok(conditions
                .into_iter()
                .map(|(column, value)| (column.into(), parse_condition(value)))
                .collect()),
            other => Err(invalid_clause(path, clause, expected, &other)),
        })
        .collect()
}

/// Bare scalars mean equality, objects hold an operator. Everything else is unsupported.
fn parse_condition(value: Value) -> Condition {
    match value {
        Value::String(_) | Value::Number(_) | Value::Bool(_) => Condition::Equals(value.into()),
        Value::Object(operators) => parse_operator(operators),
        Value::Null | Value::Array(_) => Condition::Unsupported,
    }
}

/// The first operator we recognize wins; unknown operators are skipped.
fn parse_operator(operators: Map<String, Value>) -> Condition {
    for (operator, operand) in operators {
        if let Some(comparison) = Comparison::from_operator(&operator) {
            return Condition::Compare(comparison, operand.into());
        }

        if operator == IN {
            return match operand {
                Value::Array(values) => Condition::In(values.into_iter().map(Literal::from).collect()),
                _ => Condition::Unsupported,
            };
        }

        debug!("Ignoring unsupported operator {operator}");
    }

    Condition::Unsupported
}

fn parse_order(value: Option<Value>) -> Option<Order> {
    match value? {
        Value::String(token) => Some(Order::Single(SortKey::parse(&token))),
        Value::Array(items) => Some(Order::List(
            items
                .iter()
                .filter_map(Value::as_str)
                .map(SortKey::parse)
                .collect(),
        )),
        _ => None,
    }
}

fn parse_limit(path: &str, value: Option<Value>) -> Result<Option<u64>, ParseError> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(value) => match value.as_u64() {
            Some(limit) => Ok(Some(limit)),
            None => Err(invalid_clause(path, LIMIT, "a non-negative integer", &value)),
        },
    }
}

fn parse_join(value: Option<Value>) -> Option<JoinKeys> {
    match value? {
        Value::String(keys) => JoinKeys::parse(&keys),
        _ => None,
    }
}

fn invalid_clause(
    path: &str,
    clause: &'static str,
    expected: &'static str,
    found: &Value,
) -> ParseError {
    ParseError::InvalidClause {
        path: path.to_string(),
        clause,
        expected,
        found: kind_of(found),
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::engine::query::{OrderDirection, TableName};

    fn table<'a>(query: &'a Query, name: &str) -> &'a TableQuery {
        query.tables.get(&TableName::from(name)).expect("table is missing")
    }

    fn relation<'a>(table_query: &'a TableQuery, name: &str) -> &'a TableQuery {
        table_query
            .relations
            .get(&TableName::from(name))
            .expect("relation is missing")
    }

    fn condition<'a>(conditions: &'a ConditionSet, column: &str) -> &'a Condition {
        conditions.get(&ColumnName::from(column)).expect("condition is missing")
    }

    #[test]
    fn an_empty_table_query_has_no_clauses() {
        let query = parse(r#"{"users": {}}"#).unwrap();

        assert_eq!(table(&query, "users"), &TableQuery::default());
    }

    #[test]
    fn reserved_keys_are_clauses_and_everything_else_is_a_relation() {
        let query = parse(
            r#"{
                "users": {
                    "select": ["id", "name"],
                    "limit": 10,
                    "posts": {
                        "select": ["id", "title"],
                        "comments": { "select": ["id", "content"] }
                    }
                }
            }"#,
        )
        .unwrap();

        let users = table(&query, "users");
        assert_eq!(users.select, vec![ColumnName::from("id"), ColumnName::from("name")]);
        assert_eq!(users.limit, Some(10));
        assert_eq!(users.relations.len(), 1);

        let posts = relation(users, "posts");
        assert_eq!(posts.select, vec![ColumnName::from("id"), ColumnName::from("title")]);

        let comments = relation(posts, "comments");
        assert_eq!(comments.select, vec![ColumnName::from("id"), ColumnName::from("content")]);
        assert!(comments.relations.is_empty());
    }

    #[test]
    fn direct_conditions_keep_their_scalar_values() {
        let query = parse(r#"{"users": {"where": {"status": "active", "age": 25}}}"#).unwrap();
        let filter = &table(&query, "users").filter;

        assert_eq!(filter.conditions.len(), 2);
        assert_eq!(
            condition(&filter.conditions, "status"),
            &Condition::Equals(Literal::String("active".to_string()))
        );
        assert_eq!(
            condition(&filter.conditions, "age"),
            &Condition::Equals(Literal::Number(25.into()))
        );
    }

    #[test]
    fn and_and_or_keys_become_groups() {
        let query = parse(
            r#"{"users": {"where": {
                "and": [{"status": "active"}, {"created_at": {">=": "2023-01-01"}}],
                "or": [{"age": {">=": 18}}, {"role": {"in": ["admin", "editor"]}}]
            }}}"#,
        )
        .unwrap();
        let filter = &table(&query, "users").filter;

        assert!(filter.conditions.is_empty());
        assert_eq!(filter.and.len(), 2);
        assert_eq!(filter.or.len(), 2);
        assert_eq!(
            condition(&filter.and[1], "created_at"),
            &Condition::Compare(
                Comparison::GreaterOrEqual,
                Literal::String("2023-01-01".to_string())
            )
        );
        assert_eq!(
            condition(&filter.or[1], "role"),
            &Condition::In(vec![
                Literal::String("admin".to_string()),
                Literal::String("editor".to_string())
            ])
        );
    }

    #[test]
    fn odd_condition_shapes_are_unsupported_instead_of_errors() {
        let query = parse(
            r#"{"users": {"where": {
                "a": {"like": "%x%"},
                "b": {"in": 5},
                "c": null,
                "d": [1, 2],
                "e": {}
            }}}"#,
        )
        .unwrap();
        let conditions = &table(&query, "users").filter.conditions;

        for column in ["a", "b", "c", "d", "e"] {
            assert_eq!(condition(conditions, column), &Condition::Unsupported, "{column}");
        }
    }

    #[test]
    fn unknown_operators_are_skipped_in_favour_of_known_ones() {
        let query = parse(r#"{"users": {"where": {"age": {"!=": 3, ">": 2}}}}"#).unwrap();

        assert_eq!(
            condition(&table(&query, "users").filter.conditions, "age"),
            &Condition::Compare(Comparison::GreaterThan, Literal::Number(2.into()))
        );
    }

    #[test]
    fn order_accepts_strings_and_arrays_of_strings() {
        let query = parse(
            r#"{
                "a": {"order": "-created_at"},
                "b": {"order": ["name", 5, "-age"]},
                "c": {"order": 12},
                "d": {"order": null}
            }"#,
        )
        .unwrap();

        assert_eq!(
            table(&query, "a").order,
            Some(Order::Single(SortKey {
                column: "created_at".into(),
                direction: OrderDirection::Descending,
            }))
        );
        assert_eq!(
            table(&query, "b").order,
            Some(Order::List(vec![SortKey::parse("name"), SortKey::parse("-age")]))
        );
        assert_eq!(table(&query, "c").order, None);
        assert_eq!(table(&query, "d").order, None);
    }

    #[test]
    fn join_falls_back_to_the_convention_when_malformed() {
        let query = parse(
            r#"{"users": {
                "posts": {"join": "post_id:user_id"},
                "likes": {"join": "user_id"},
                "tags": {"join": 3}
            }}"#,
        )
        .unwrap();
        let users = table(&query, "users");

        assert_eq!(
            relation(users, "posts").join,
            Some(JoinKeys {
                child: "post_id".into(),
                parent: "user_id".into(),
            })
        );
        assert_eq!(relation(users, "likes").join, None);
        assert_eq!(relation(users, "tags").join, None);
    }

    #[test]
    fn null_clauses_are_absent() {
        let query = parse(
            r#"{"users": {"select": null, "where": null, "limit": null, "join": null}}"#,
        )
        .unwrap();

        assert_eq!(table(&query, "users"), &TableQuery::default());
    }

    #[test]
    fn malformed_json_is_a_syntax_error() {
        let error = parse("{ this is not valid JSON }").unwrap_err();

        assert!(matches!(error, ParseError::Syntax(_)));
        assert!(error.to_string().contains("line 1"));
    }

    #[test]
    fn trailing_characters_are_a_syntax_error() {
        let error = parse(r#"{"users": {}} {"#).unwrap_err();

        assert!(matches!(error, ParseError::Syntax(_)));
    }

    #[test]
    fn reserved_keys_never_become_relations() {
        let query = parse(
            r#"{"users": {"select": [], "where": {}, "order": [], "limit": 1, "join": "a:b"}}"#,
        )
        .unwrap();

        assert!(table(&query, "users").relations.is_empty());
    }

    #[test]
    fn the_document_must_be_an_object() {
        let error = parse("[1, 2]").unwrap_err();

        assert!(matches!(error, ParseError::NotAQuery("an array")));
    }

    #[test]
    fn relations_must_be_objects() {
        let error = parse(r#"{"users": {"posts": 5}}"#).unwrap_err();

        assert_eq!(error.to_string(), "`users.posts` must be a JSON object, found a number");
    }

    #[test]
    fn invalid_select_and_limit_are_reported_with_their_path() {
        let select = parse(r#"{"users": {"posts": {"select": "id"}}}"#).unwrap_err();
        let limit = parse(r#"{"users": {"limit": -1}}"#).unwrap_err();
        let group = parse(r#"{"users": {"where": {"or": {"a": 1}}}}"#).unwrap_err();

        assert_eq!(
            select.to_string(),
            "`users.posts.select` must be an array of strings, found a string"
        );
        assert_eq!(
            limit.to_string(),
            "`users.limit` must be a non-negative integer, found a number"
        );
        assert_eq!(
            group.to_string(),
            "`users.where.or` must be an array of objects, found an object"
        );
    }
}
