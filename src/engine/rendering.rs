use crate::engine::query::{Comparison, OrderDirection};
use crate::engine::statement::{
    FilterClause, Join, JoinCondition, Ligature, Ordering, QualifiedColumn, SelectedColumn,
    Statement,
};
use std::fmt::{Display, Formatter};

struct OptionalClause<'a, T> {
    intro: &'a str,
    ligature: &'a str,
    items: &'a [T],
}

impl<'a, T> OptionalClause<'a, T> {
    fn order_by(items: &'a [T]) -> Self {
        OptionalClause {
            intro: "ORDER BY",
            ligature: ",",
            items,
        }
    }

    fn filter(items: &'a [T]) -> Self {
        OptionalClause {
            intro: "WHERE",
            ligature: " AND",
            items,
        }
    }
}

/// Displays things like "WHERE x AND Y AND Z" and "ORDER BY 1, 2, 3" on their own line.
/// Nothing at all is written when there are no items.
impl<'a, T> Display for OptionalClause<'a, T>
where
    T: Display,
{
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let Self {
            intro,
            ligature,
            items,
        } = self;

        if let Some((first, rest)) = items.split_first() {
            write!(f, "\n{intro} {first}")?;

            for item in rest {
                write!(f, "{ligature} {item}")?;
            }
        }

        Ok(())
    }
}

impl Display for Statement {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "SELECT {}", RenderableSelect(self.select.as_slice()))?;
        write!(f, "\nFROM {}", self.from)?;

        for join in &self.joins {
            write!(f, "\n{join}")?;
        }

        write!(f, "{}", OptionalClause::filter(self.filters.as_slice()))?;
        write!(f, "{}", OptionalClause::order_by(self.orders.as_slice()))?;

        if let Some(limit) = self.limit {
            write!(f, "\nLIMIT {limit}")?;
        }

        Ok(())
    }
}

struct RenderableSelect<'a>(&'a [SelectedColumn]);

impl Display for RenderableSelect<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if let Some((last, first)) = self.0.split_last() {
            for select in first {
                write!(f, "{}, ", select)?;
            }

            write!(f, "{}", last)?;
        }

        Ok(())
    }
}

impl Display for SelectedColumn {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            SelectedColumn::Column(column) => write!(f, "{column}"),
            SelectedColumn::AllOf(table) => write!(f, "{table}.*"),
        }
    }
}

impl Display for QualifiedColumn {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.table, self.column)
    }
}

impl Display for Join {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "INNER JOIN {} ON {}", self.target, self.condition)
    }
}

impl Display for JoinCondition {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} = {}", self.child, self.parent)
    }
}

impl Display for FilterClause {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            FilterClause::Predicate(predicate) => write!(f, "{predicate}"),
            FilterClause::Group(ligature, predicates) => {
                write!(f, "(")?;

                let mut predicates = predicates.iter();
                if let Some(predicate) = predicates.next() {
                    write!(f, "{predicate}")?;
                }

                for predicate in predicates {
                    write!(f, "{ligature}{predicate}")?;
                }

                write!(f, ")")
            }
        }
    }
}

impl Display for Ligature {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Ligature::And => write!(f, " AND "),
            Ligature::Or => write!(f, " OR "),
        }
    }
}

impl Display for Ordering {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.column, self.direction)
    }
}

impl Display for OrderDirection {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderDirection::Ascending => write!(f, "ASC"),
            OrderDirection::Descending => write!(f, "DESC"),
        }
    }
}

impl Display for Comparison {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let symbol = match self {
            Comparison::Equals => "=",
            Comparison::GreaterThan => ">",
            Comparison::GreaterOrEqual => ">=",
            Comparison::LesserThan => "<",
            Comparison::LesserOrEqual => "<=",
        };

        write!(f, "{symbol}")
    }
}
