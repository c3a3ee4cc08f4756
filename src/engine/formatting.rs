//! Rendering of literal values into SQL text.
//!
//! Literals are embedded straight into the generated SQL, nothing here binds parameters.
//! [InlineLiterals] copies strings verbatim, which is what existing callers get by default.
//! [EscapedLiterals] doubles single quotes inside strings.
use crate::engine::query::{Comparison, Literal};
use crate::engine::statement::QualifiedColumn;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

pub trait ValueFormatter {
    fn literal(&self, value: &Literal) -> String;

    fn comparison(
        &self,
        column: &QualifiedColumn,
        comparison: Comparison,
        value: &Literal,
    ) -> String {
        format!("{column} {comparison} {}", self.literal(value))
    }

    fn equality(&self, column: &QualifiedColumn, value: &Literal) -> String {
        self.comparison(column, Comparison::Equals, value)
    }

    /// An empty list can never match, but `IN ()` is not valid SQL, so we render a FALSE instead.
    fn in_list(&self, column: &QualifiedColumn, values: &[Literal]) -> String {
        if values.is_empty() {
            return format!("FALSE /* empty IN clause for {column} */");
        }

        let values: Vec<String> = values.iter().map(|value| self.literal(value)).collect();

        format!("{column} IN ({})", values.join(", "))
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct InlineLiterals;

#[derive(Debug, Clone, Copy, Default)]
pub struct EscapedLiterals;

impl ValueFormatter for InlineLiterals {
    fn literal(&self, value: &Literal) -> String {
        match value {
            Literal::String(string) => format!("'{string}'"),
            Literal::Bool(true) => "TRUE".to_string(),
            Literal::Bool(false) => "FALSE".to_string(),
            Literal::Number(number) => number.to_string(),
            Literal::Null => "NULL".to_string(),
            Literal::Other(value) => value.to_string(),
        }
    }
}

impl ValueFormatter for EscapedLiterals {
    fn literal(&self, value: &Literal) -> String {
        match value {
            Literal::String(string) => format!("'{}'", string.replace('\'', "''")),
            other => InlineLiterals.literal(other),
        }
    }
}

/// Picks a [ValueFormatter] by name, so it can come from configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LiteralStyle {
    #[default]
    Inline,
    Escaped,
}

impl LiteralStyle {
    pub fn formatter(self) -> Box<dyn ValueFormatter + Send + Sync> {
        match self {
            LiteralStyle::Inline => Box::new(InlineLiterals),
            LiteralStyle::Escaped => Box::new(EscapedLiterals),
        }
    }
}

impl FromStr for LiteralStyle {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "inline" => Ok(LiteralStyle::Inline),
            "escaped" => Ok(LiteralStyle::Escaped),
            other => Err(other.to_string()),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use serde_json::json;

    fn column() -> QualifiedColumn {
        QualifiedColumn::new("users", "status")
    }

    #[test]
    fn scalars_are_rendered_as_sql_literals() {
        let formatter = InlineLiterals;

        assert_eq!(formatter.literal(&Literal::String("active".to_string())), "'active'");
        assert_eq!(formatter.literal(&Literal::Bool(true)), "TRUE");
        assert_eq!(formatter.literal(&Literal::Bool(false)), "FALSE");
        assert_eq!(formatter.literal(&Literal::from(json!(18))), "18");
        assert_eq!(formatter.literal(&Literal::from(json!(2.5))), "2.5");
        assert_eq!(formatter.literal(&Literal::from(json!(-3))), "-3");
        assert_eq!(formatter.literal(&Literal::Null), "NULL");
        assert_eq!(formatter.literal(&Literal::from(json!(["a"]))), r#"["a"]"#);
    }

    #[test]
    fn floats_keep_their_fractional_part() {
        let parse = |number: &str| {
            Literal::from(serde_json::from_str::<serde_json::Value>(number).unwrap())
        };

        assert_eq!(InlineLiterals.literal(&parse("10.0")), "10.0");
        assert_eq!(InlineLiterals.literal(&parse("1e3")), "1000.0");
        assert_eq!(InlineLiterals.literal(&parse("10")), "10");
    }

    #[test]
    fn inline_strings_are_not_escaped() {
        let literal = Literal::String("O'Brien".to_string());

        assert_eq!(InlineLiterals.literal(&literal), "'O'Brien'");
        assert_eq!(EscapedLiterals.literal(&literal), "'O''Brien'");
    }

    #[test]
    fn equality_and_comparisons_qualify_the_column() {
        let formatter = InlineLiterals;
        let active = Literal::String("active".to_string());

        assert_eq!(formatter.equality(&column(), &active), "users.status = 'active'");
        assert_eq!(
            formatter.comparison(&column(), Comparison::LesserOrEqual, &Literal::from(json!(3))),
            "users.status <= 3"
        );
    }

    #[test]
    fn in_lists_format_each_value() {
        let values = vec![Literal::from(json!("x")), Literal::from(json!(1)), Literal::Bool(true)];

        assert_eq!(
            InlineLiterals.in_list(&column(), &values),
            "users.status IN ('x', 1, TRUE)"
        );
    }

    #[test]
    fn empty_in_lists_never_match() {
        assert_eq!(
            InlineLiterals.in_list(&column(), &[]),
            "FALSE /* empty IN clause for users.status */"
        );
    }

    #[test]
    fn literal_styles_are_parsed_by_name() {
        assert_eq!("escaped".parse::<LiteralStyle>(), Ok(LiteralStyle::Escaped));
        assert_eq!("inline".parse::<LiteralStyle>(), Ok(LiteralStyle::Inline));
        assert!("quoted".parse::<LiteralStyle>().is_err());
    }
}
