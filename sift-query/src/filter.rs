//! Criteria types for the where facet of a specification.
//!
//! A [`Filter`] is a data-source-neutral predicate over named columns. Data
//! sources translate it into their own query language; in-process sources can
//! evaluate it directly with [`Filter::matches`].

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::entity::Entity;

/// A filter value that can be used in comparisons.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterValue {
    /// Null value.
    Null,
    /// Boolean value.
    Bool(bool),
    /// Integer value.
    Int(i64),
    /// Float value.
    Float(f64),
    /// String value.
    String(String),
    /// JSON value.
    Json(serde_json::Value),
    /// List of values.
    List(Vec<FilterValue>),
}

impl FilterValue {
    /// Check if this is a null value.
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Compare two values of compatible kinds.
    ///
    /// Integers and floats compare numerically. Null sorts before every other
    /// value. Values of unrelated kinds are incomparable.
    pub fn compare(&self, other: &FilterValue) -> Option<Ordering> {
        match (self, other) {
            (Self::Null, Self::Null) => Some(Ordering::Equal),
            (Self::Null, _) => Some(Ordering::Less),
            (_, Self::Null) => Some(Ordering::Greater),
            (Self::Bool(a), Self::Bool(b)) => Some(a.cmp(b)),
            (Self::Int(a), Self::Int(b)) => Some(a.cmp(b)),
            (Self::Float(a), Self::Float(b)) => a.partial_cmp(b),
            (Self::Int(a), Self::Float(b)) => (*a as f64).partial_cmp(b),
            (Self::Float(a), Self::Int(b)) => a.partial_cmp(&(*b as f64)),
            (Self::String(a), Self::String(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }

    /// Total order over all values, used for sorting.
    ///
    /// Agrees with [`FilterValue::compare`] where that is defined. Floats use
    /// [`f64::total_cmp`], so NaN sorts after every number. Values of
    /// unrelated kinds order by kind: null, bool, number, string, JSON, list.
    pub fn total_cmp(&self, other: &FilterValue) -> Ordering {
        match (self, other) {
            (Self::Bool(a), Self::Bool(b)) => a.cmp(b),
            (Self::Int(a), Self::Int(b)) => a.cmp(b),
            (Self::Float(a), Self::Float(b)) => a.total_cmp(b),
            (Self::Int(a), Self::Float(b)) => (*a as f64).total_cmp(b),
            (Self::Float(a), Self::Int(b)) => a.total_cmp(&(*b as f64)),
            (Self::String(a), Self::String(b)) => a.cmp(b),
            (Self::Json(a), Self::Json(b)) => a.to_string().cmp(&b.to_string()),
            (Self::List(a), Self::List(b)) => a
                .iter()
                .zip(b)
                .map(|(x, y)| x.total_cmp(y))
                .find(|o| o.is_ne())
                .unwrap_or_else(|| a.len().cmp(&b.len())),
            _ => self.rank().cmp(&other.rank()),
        }
    }

    fn rank(&self) -> u8 {
        match self {
            Self::Null => 0,
            Self::Bool(_) => 1,
            Self::Int(_) | Self::Float(_) => 2,
            Self::String(_) => 3,
            Self::Json(_) => 4,
            Self::List(_) => 5,
        }
    }

    fn loosely_equals(&self, other: &FilterValue) -> bool {
        match (self, other) {
            (Self::Int(_), Self::Float(_)) | (Self::Float(_), Self::Int(_)) => {
                self.compare(other) == Some(Ordering::Equal)
            }
            _ => self == other,
        }
    }

    fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }
}

impl From<bool> for FilterValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i32> for FilterValue {
    fn from(v: i32) -> Self {
        Self::Int(v as i64)
    }
}

impl From<i64> for FilterValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<u32> for FilterValue {
    fn from(v: u32) -> Self {
        Self::Int(v as i64)
    }
}

impl From<f64> for FilterValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<String> for FilterValue {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

impl From<&str> for FilterValue {
    fn from(v: &str) -> Self {
        Self::String(v.to_string())
    }
}

impl<T: Into<FilterValue>> From<Vec<T>> for FilterValue {
    fn from(v: Vec<T>) -> Self {
        Self::List(v.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<FilterValue>> From<Option<T>> for FilterValue {
    fn from(v: Option<T>) -> Self {
        match v {
            Some(v) => v.into(),
            None => Self::Null,
        }
    }
}

/// A complete criteria expression.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Filter {
    /// No filter (always true).
    #[default]
    None,

    /// Equals comparison.
    Equals(String, FilterValue),
    /// Not equals comparison.
    NotEquals(String, FilterValue),

    /// Less than comparison.
    Lt(String, FilterValue),
    /// Less than or equal comparison.
    Lte(String, FilterValue),
    /// Greater than comparison.
    Gt(String, FilterValue),
    /// Greater than or equal comparison.
    Gte(String, FilterValue),

    /// In a list of values.
    In(String, Vec<FilterValue>),
    /// Not in a list of values.
    NotIn(String, Vec<FilterValue>),

    /// Substring match.
    Contains(String, FilterValue),
    /// Prefix match.
    StartsWith(String, FilterValue),
    /// Suffix match.
    EndsWith(String, FilterValue),

    /// Is null check.
    IsNull(String),
    /// Is not null check.
    IsNotNull(String),

    /// Logical AND of multiple filters.
    And(Vec<Filter>),
    /// Logical OR of multiple filters.
    Or(Vec<Filter>),
    /// Logical NOT of a filter.
    Not(Box<Filter>),
}

impl Filter {
    /// Create an empty filter (matches everything).
    pub fn none() -> Self {
        Self::None
    }

    /// Check if this filter is empty.
    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }

    /// Create an equality filter.
    pub fn eq(column: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        Self::Equals(column.into(), value.into())
    }

    /// Create an AND filter.
    pub fn and(filters: impl IntoIterator<Item = Filter>) -> Self {
        let mut filters: Vec<_> = filters.into_iter().filter(|f| !f.is_none()).collect();
        match filters.len() {
            0 => Self::None,
            1 => filters.remove(0),
            _ => Self::And(filters),
        }
    }

    /// Create an OR filter.
    pub fn or(filters: impl IntoIterator<Item = Filter>) -> Self {
        let mut filters: Vec<_> = filters.into_iter().filter(|f| !f.is_none()).collect();
        match filters.len() {
            0 => Self::None,
            1 => filters.remove(0),
            _ => Self::Or(filters),
        }
    }

    /// Create a NOT filter.
    pub fn not(filter: Filter) -> Self {
        if filter.is_none() {
            return Self::None;
        }
        Self::Not(Box::new(filter))
    }

    /// Combine with another filter using AND.
    pub fn and_then(self, other: Filter) -> Self {
        if self.is_none() {
            return other;
        }
        if other.is_none() {
            return self;
        }
        match self {
            Self::And(mut filters) => {
                filters.push(other);
                Self::And(filters)
            }
            _ => Self::And(vec![self, other]),
        }
    }

    /// Combine with another filter using OR.
    pub fn or_else(self, other: Filter) -> Self {
        if self.is_none() {
            return other;
        }
        if other.is_none() {
            return self;
        }
        match self {
            Self::Or(mut filters) => {
                filters.push(other);
                Self::Or(filters)
            }
            _ => Self::Or(vec![self, other]),
        }
    }

    /// Evaluate this filter against a record in process.
    pub fn matches<E: Entity>(&self, entity: &E) -> bool {
        let value = |column: &str| entity.field(column).unwrap_or(FilterValue::Null);

        match self {
            Self::None => true,

            Self::Equals(col, expected) => value(col).loosely_equals(expected),
            Self::NotEquals(col, expected) => !value(col).loosely_equals(expected),

            Self::Lt(col, bound) => non_null_cmp(&value(col), bound) == Some(Ordering::Less),
            Self::Lte(col, bound) => matches!(
                non_null_cmp(&value(col), bound),
                Some(Ordering::Less | Ordering::Equal)
            ),
            Self::Gt(col, bound) => non_null_cmp(&value(col), bound) == Some(Ordering::Greater),
            Self::Gte(col, bound) => matches!(
                non_null_cmp(&value(col), bound),
                Some(Ordering::Greater | Ordering::Equal)
            ),

            Self::In(col, values) => {
                let actual = value(col);
                values.iter().any(|v| actual.loosely_equals(v))
            }
            Self::NotIn(col, values) => {
                let actual = value(col);
                !values.iter().any(|v| actual.loosely_equals(v))
            }

            Self::Contains(col, needle) => text_match(&value(col), needle, |h, n| h.contains(n)),
            Self::StartsWith(col, needle) => {
                text_match(&value(col), needle, |h, n| h.starts_with(n))
            }
            Self::EndsWith(col, needle) => text_match(&value(col), needle, |h, n| h.ends_with(n)),

            Self::IsNull(col) => value(col).is_null(),
            Self::IsNotNull(col) => !value(col).is_null(),

            Self::And(filters) => filters.iter().all(|f| f.matches(entity)),
            Self::Or(filters) => filters.iter().any(|f| f.matches(entity)),
            Self::Not(filter) => !filter.matches(entity),
        }
    }
}

// SQL semantics: comparisons against null are never true.
fn non_null_cmp(actual: &FilterValue, bound: &FilterValue) -> Option<Ordering> {
    if actual.is_null() || bound.is_null() {
        return None;
    }
    actual.compare(bound)
}

fn text_match(actual: &FilterValue, needle: &FilterValue, op: impl Fn(&str, &str) -> bool) -> bool {
    match (actual.as_str(), needle.as_str()) {
        (Some(haystack), Some(needle)) => op(haystack, needle),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone)]
    struct Row {
        name: &'static str,
        age: i64,
        email: Option<&'static str>,
    }

    impl Entity for Row {
        const NAME: &'static str = "Row";

        fn field(&self, name: &str) -> Option<FilterValue> {
            match name {
                "name" => Some(self.name.into()),
                "age" => Some(self.age.into()),
                "email" => Some(self.email.into()),
                _ => None,
            }
        }
    }

    fn alice() -> Row {
        Row { name: "Alice", age: 30, email: Some("alice@example.com") }
    }

    #[test]
    fn test_filter_value_from() {
        assert_eq!(FilterValue::from(42i32), FilterValue::Int(42));
        assert_eq!(FilterValue::from("hello"), FilterValue::String("hello".to_string()));
        assert_eq!(FilterValue::from(None::<i64>), FilterValue::Null);
    }

    #[test]
    fn test_total_cmp_orders_nan_and_mixed_kinds() {
        let mut values = vec![
            FilterValue::Float(f64::NAN),
            FilterValue::String("a".into()),
            FilterValue::Int(3),
            FilterValue::Null,
            FilterValue::Float(-1.5),
            FilterValue::Bool(true),
            FilterValue::Float(f64::NAN),
            FilterValue::Int(-7),
        ];
        values.sort_by(FilterValue::total_cmp);

        assert_eq!(values[0], FilterValue::Null);
        assert_eq!(values[1], FilterValue::Bool(true));
        assert_eq!(values[2], FilterValue::Int(-7));
        assert_eq!(values[3], FilterValue::Float(-1.5));
        assert_eq!(values[4], FilterValue::Int(3));
        assert!(matches!(values[5], FilterValue::Float(f) if f.is_nan()));
        assert!(matches!(values[6], FilterValue::Float(f) if f.is_nan()));
        assert_eq!(values[7], FilterValue::String("a".into()));
    }

    #[test]
    fn test_total_cmp_agrees_with_compare() {
        let pairs = [
            (FilterValue::Int(1), FilterValue::Float(1.5)),
            (FilterValue::Null, FilterValue::Int(0)),
            (FilterValue::String("b".into()), FilterValue::String("a".into())),
        ];
        for (a, b) in pairs {
            assert_eq!(Some(a.total_cmp(&b)), a.compare(&b));
        }
    }

    #[test]
    fn test_and_collapses_empty_filters() {
        assert!(Filter::and([Filter::None, Filter::None]).is_none());
        let single = Filter::and([Filter::None, Filter::eq("name", "Alice")]);
        assert_eq!(single, Filter::eq("name", "Alice"));
    }

    #[test]
    fn test_and_then_accumulates() {
        let filter = Filter::eq("name", "Alice")
            .and_then(Filter::Gt("age".into(), 18.into()))
            .and_then(Filter::IsNotNull("email".into()));
        match &filter {
            Filter::And(parts) => assert_eq!(parts.len(), 3),
            other => panic!("expected AND, got {other:?}"),
        }
        assert!(filter.matches(&alice()));
    }

    #[test]
    fn test_matches_comparisons() {
        let row = alice();
        assert!(Filter::Lt("age".into(), 31.into()).matches(&row));
        assert!(!Filter::Lt("age".into(), 30.into()).matches(&row));
        assert!(Filter::Lte("age".into(), 30.into()).matches(&row));
        assert!(Filter::Gt("age".into(), FilterValue::Float(29.5)).matches(&row));
        assert!(Filter::Equals("age".into(), FilterValue::Float(30.0)).matches(&row));
    }

    #[test]
    fn test_matches_strings_and_lists() {
        let row = alice();
        assert!(Filter::Contains("email".into(), "@example".into()).matches(&row));
        assert!(Filter::StartsWith("name".into(), "Al".into()).matches(&row));
        assert!(!Filter::EndsWith("name".into(), "x".into()).matches(&row));
        assert!(Filter::In("name".into(), vec!["Bob".into(), "Alice".into()]).matches(&row));
        assert!(Filter::NotIn("name".into(), vec!["Bob".into()]).matches(&row));
    }

    #[test]
    fn test_matches_nulls() {
        let row = Row { email: None, ..alice() };
        assert!(Filter::IsNull("email".into()).matches(&row));
        assert!(Filter::IsNull("unknown".into()).matches(&row));
        assert!(!Filter::Gt("email".into(), "a".into()).matches(&row));
        assert!(!Filter::Contains("email".into(), "a".into()).matches(&row));
    }

    #[test]
    fn test_matches_logical() {
        let row = alice();
        let either = Filter::or([Filter::eq("name", "Bob"), Filter::eq("name", "Alice")]);
        assert!(either.matches(&row));
        assert!(!Filter::not(either).matches(&row));
        assert!(Filter::None.matches(&row));
    }

    #[test]
    fn test_compare_mixed_numbers() {
        assert_eq!(FilterValue::Int(2).compare(&FilterValue::Float(2.5)), Some(Ordering::Less));
        assert_eq!(FilterValue::Null.compare(&FilterValue::Int(0)), Some(Ordering::Less));
        assert_eq!(FilterValue::Bool(true).compare(&FilterValue::Int(1)), None);
    }
}
