//! Ordering types used by the order facet of a specification.

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::cmp::Ordering;
use std::fmt;

use crate::entity::Entity;
use crate::filter::FilterValue;

/// Sort order for query results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SortOrder {
    /// Ascending order (A-Z, 0-9, oldest first).
    #[default]
    Asc,
    /// Descending order (Z-A, 9-0, newest first).
    Desc,
}

impl SortOrder {
    /// Get the keyword for this sort order.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Null handling in sorting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NullsOrder {
    /// Nulls appear first in the results.
    First,
    /// Nulls appear last in the results.
    Last,
}

/// Order by specification for a single field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderByField {
    /// The column name to order by.
    pub column: Cow<'static, str>,
    /// The sort order.
    pub order: SortOrder,
    /// Null handling (optional).
    pub nulls: Option<NullsOrder>,
}

impl OrderByField {
    /// Create a new order by field.
    pub fn new(column: impl Into<Cow<'static, str>>, order: SortOrder) -> Self {
        Self {
            column: column.into(),
            order,
            nulls: None,
        }
    }

    /// Set null handling.
    pub fn nulls(mut self, nulls: NullsOrder) -> Self {
        self.nulls = Some(nulls);
        self
    }

    /// Create an ascending order.
    pub fn asc(column: impl Into<Cow<'static, str>>) -> Self {
        Self::new(column, SortOrder::Asc)
    }

    /// Create a descending order.
    pub fn desc(column: impl Into<Cow<'static, str>>) -> Self {
        Self::new(column, SortOrder::Desc)
    }

    /// Compare two records on this field.
    ///
    /// Without explicit null handling nulls sort first ascending and last
    /// descending. Values follow [`FilterValue::total_cmp`].
    pub fn compare<E: Entity>(&self, a: &E, b: &E) -> Ordering {
        let left = a.field(&self.column).unwrap_or(FilterValue::Null);
        let right = b.field(&self.column).unwrap_or(FilterValue::Null);

        if let Some(nulls) = self.nulls {
            match (left.is_null(), right.is_null()) {
                (true, true) => return Ordering::Equal,
                (true, false) => {
                    return if nulls == NullsOrder::First { Ordering::Less } else { Ordering::Greater };
                }
                (false, true) => {
                    return if nulls == NullsOrder::First { Ordering::Greater } else { Ordering::Less };
                }
                (false, false) => {}
            }
        }

        let ordering = left.total_cmp(&right);
        match self.order {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        }
    }
}

/// Order by specification that can be a single field or multiple fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrderBy {
    /// Order by a single field.
    Field(OrderByField),
    /// Order by multiple fields, most significant first.
    Fields(Box<[OrderByField]>),
}

impl OrderBy {
    /// Create an empty order by (no ordering).
    pub fn none() -> Self {
        Self::Fields(Box::new([]))
    }

    /// Check if the order by is empty.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Field(_) => false,
            Self::Fields(fields) => fields.is_empty(),
        }
    }

    /// Add a less significant field.
    pub fn then(self, field: OrderByField) -> Self {
        match self {
            Self::Field(existing) => Self::Fields(vec![existing, field].into_boxed_slice()),
            Self::Fields(existing) => {
                let mut fields: Vec<_> = existing.into_vec();
                fields.push(field);
                Self::from(fields)
            }
        }
    }

    /// Create an OrderBy from multiple fields.
    pub fn from_fields(fields: impl IntoIterator<Item = OrderByField>) -> Self {
        Self::from(fields.into_iter().collect::<Vec<_>>())
    }

    /// The fields in significance order.
    pub fn fields(&self) -> &[OrderByField] {
        match self {
            Self::Field(field) => std::slice::from_ref(field),
            Self::Fields(fields) => fields,
        }
    }

    /// Get the number of fields in this OrderBy.
    #[inline]
    pub fn field_count(&self) -> usize {
        self.fields().len()
    }

    /// Compare two records on every field in turn.
    pub fn compare<E: Entity>(&self, a: &E, b: &E) -> Ordering {
        self.fields()
            .iter()
            .map(|field| field.compare(a, b))
            .find(|ordering| ordering.is_ne())
            .unwrap_or(Ordering::Equal)
    }
}

impl Default for OrderBy {
    fn default() -> Self {
        Self::none()
    }
}

impl From<OrderByField> for OrderBy {
    fn from(field: OrderByField) -> Self {
        Self::Field(field)
    }
}

impl From<Vec<OrderByField>> for OrderBy {
    fn from(mut fields: Vec<OrderByField>) -> Self {
        match fields.len() {
            1 => Self::Field(fields.remove(0)),
            _ => Self::Fields(fields.into_boxed_slice()),
        }
    }
}
