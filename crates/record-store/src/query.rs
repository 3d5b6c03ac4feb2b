//! # Query Vocabulary
//!
//! Records are loosely typed JSON objects (one per table row). A [`Query`] names a
//! table, a conjunction of [`Predicate`]s, an optional [`OrderBy`] and an optional
//! row limit. The same predicates are used to select rows for deletion.
//!
//! ```rust
//! use record_store::{Predicate, Query};
//!
//! let query = Query::table("properties")
//!     .filter(Predicate::eq("status", "available"))
//!     .filter(Predicate::ilike("city", "pune"))
//!     .order_desc("created_at")
//!     .limit(6);
//!
//! assert_eq!(query.predicates.len(), 2);
//! ```

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::cmp::Ordering;

/// A single table row.
pub type Record = Map<String, Value>;

/// One condition a row must satisfy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Predicate {
    /// Column equals the value. Numbers compare by numeric value.
    Eq { column: String, value: Value },
    /// Case-insensitive substring match on a text column.
    ILike { column: String, needle: String },
    /// Numeric column is greater than or equal to the bound.
    Gte { column: String, bound: f64 },
    /// Numeric column is less than or equal to the bound.
    Lte { column: String, bound: f64 },
    /// Column value is one of the listed values.
    In { column: String, values: Vec<Value> },
    /// At least one of the inner predicates holds.
    AnyOf(Vec<Predicate>),
}

impl Predicate {
    pub fn eq(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Predicate::Eq {
            column: column.into(),
            value: value.into(),
        }
    }

    pub fn ilike(column: impl Into<String>, needle: impl Into<String>) -> Self {
        Predicate::ILike {
            column: column.into(),
            needle: needle.into(),
        }
    }

    pub fn gte(column: impl Into<String>, bound: f64) -> Self {
        Predicate::Gte {
            column: column.into(),
            bound,
        }
    }

    pub fn lte(column: impl Into<String>, bound: f64) -> Self {
        Predicate::Lte {
            column: column.into(),
            bound,
        }
    }

    pub fn one_of<V: Into<Value>>(
        column: impl Into<String>,
        values: impl IntoIterator<Item = V>,
    ) -> Self {
        Predicate::In {
            column: column.into(),
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    pub fn any_of(predicates: impl IntoIterator<Item = Predicate>) -> Self {
        Predicate::AnyOf(predicates.into_iter().collect())
    }

    /// Evaluates the predicate against a row. Missing columns never match.
    pub fn matches(&self, record: &Record) -> bool {
        match self {
            Predicate::Eq { column, value } => record
                .get(column)
                .is_some_and(|actual| values_equal(actual, value)),
            Predicate::ILike { column, needle } => record
                .get(column)
                .and_then(Value::as_str)
                .is_some_and(|text| text.to_lowercase().contains(&needle.to_lowercase())),
            Predicate::Gte { column, bound } => record
                .get(column)
                .and_then(Value::as_f64)
                .is_some_and(|n| n >= *bound),
            Predicate::Lte { column, bound } => record
                .get(column)
                .and_then(Value::as_f64)
                .is_some_and(|n| n <= *bound),
            Predicate::In { column, values } => record
                .get(column)
                .is_some_and(|actual| values.iter().any(|v| values_equal(actual, v))),
            Predicate::AnyOf(inner) => inner.iter().any(|p| p.matches(record)),
        }
    }
}

fn values_equal(a: &Value, b: &Value) -> bool {
    match (a.as_f64(), b.as_f64()) {
        (Some(x), Some(y)) => x == y,
        _ => a == b,
    }
}

/// Sort order for query results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderBy {
    pub column: String,
    pub descending: bool,
}

impl OrderBy {
    pub fn desc(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            descending: true,
        }
    }

    pub fn asc(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            descending: false,
        }
    }

    /// Compares two rows on the order column. Rows missing the column sort last.
    pub fn compare(&self, a: &Record, b: &Record) -> Ordering {
        let ordering = match (a.get(&self.column), b.get(&self.column)) {
            (Some(x), Some(y)) => compare_values(x, y),
            (Some(_), None) => return Ordering::Less,
            (None, Some(_)) => return Ordering::Greater,
            (None, None) => Ordering::Equal,
        };
        if self.descending {
            ordering.reverse()
        } else {
            ordering
        }
    }
}

fn compare_values(a: &Value, b: &Value) -> Ordering {
    if let (Some(x), Some(y)) = (a.as_f64(), b.as_f64()) {
        return x.partial_cmp(&y).unwrap_or(Ordering::Equal);
    }
    match (a.as_str(), b.as_str()) {
        // RFC 3339 strings with differing fractional precision do not sort lexically.
        (Some(x), Some(y)) => match (parse_timestamp(x), parse_timestamp(y)) {
            (Some(tx), Some(ty)) => tx.cmp(&ty),
            _ => x.cmp(y),
        },
        _ => Ordering::Equal,
    }
}

fn parse_timestamp(text: &str) -> Option<DateTime<FixedOffset>> {
    DateTime::parse_from_rfc3339(text).ok()
}

/// A read request against one table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Query {
    pub table: String,
    pub predicates: Vec<Predicate>,
    pub order: Option<OrderBy>,
    pub limit: Option<usize>,
}

impl Query {
    pub fn table(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            predicates: Vec::new(),
            order: None,
            limit: None,
        }
    }

    pub fn filter(mut self, predicate: Predicate) -> Self {
        self.predicates.push(predicate);
        self
    }

    pub fn filters(mut self, predicates: impl IntoIterator<Item = Predicate>) -> Self {
        self.predicates.extend(predicates);
        self
    }

    pub fn order(mut self, order: Option<OrderBy>) -> Self {
        self.order = order;
        self
    }

    pub fn order_desc(self, column: impl Into<String>) -> Self {
        self.order(Some(OrderBy::desc(column)))
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// True when every predicate holds for the row.
    pub fn matches(&self, record: &Record) -> bool {
        self.predicates.iter().all(|p| p.matches(record))
    }
}
