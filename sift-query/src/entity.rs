//! Entity model and runtime type identity.
//!
//! An [`Entity`] is a record type that can be queried. Besides column access
//! it declares its navigation properties through [`Entity::navigations`],
//! which is how the include translation registry discovers which
//! `(source, property)` pairs the application can eager-load.
//!
//! ```rust
//! use sift_query::entity::{Entity, NavigationVisitor};
//! use sift_query::FilterValue;
//!
//! #[derive(Clone)]
//! struct Customer { id: i64 }
//!
//! #[derive(Clone)]
//! struct Order { id: i64, customer_id: i64 }
//!
//! impl Entity for Customer {
//!     const NAME: &'static str = "Customer";
//!     fn field(&self, name: &str) -> Option<FilterValue> {
//!         (name == "id").then(|| self.id.into())
//!     }
//! }
//!
//! impl Entity for Order {
//!     const NAME: &'static str = "Order";
//!     fn field(&self, name: &str) -> Option<FilterValue> {
//!         match name {
//!             "id" => Some(self.id.into()),
//!             "customer_id" => Some(self.customer_id.into()),
//!             _ => None,
//!         }
//!     }
//!     fn navigations<V: NavigationVisitor<Self>>(visitor: &mut V) {
//!         visitor.visit::<Customer>("customer");
//!     }
//! }
//! ```

use std::any::TypeId;
use std::fmt;
use std::hash::{Hash, Hasher};

use crate::filter::FilterValue;

/// A queryable record type.
pub trait Entity: Clone + Send + Sync + 'static {
    /// Entity name used in logs and errors.
    const NAME: &'static str;

    /// Primary key column.
    const PRIMARY_KEY: &'static str = "id";

    /// Read a column value by name.
    ///
    /// Used for in-process criteria evaluation, ordering and key lookups.
    /// Unknown columns return `None` and compare as null.
    fn field(&self, name: &str) -> Option<FilterValue>;

    /// Declare the navigation properties reachable from this entity.
    fn navigations<V: NavigationVisitor<Self>>(_visitor: &mut V) {}

    /// The primary key value of this record.
    fn primary_key(&self) -> FilterValue {
        self.field(Self::PRIMARY_KEY).unwrap_or(FilterValue::Null)
    }
}

/// Receives the navigation properties an entity declares.
pub trait NavigationVisitor<S: Entity> {
    /// Called once per navigation from `S` to `P`.
    fn visit<P: Entity>(&mut self, name: &'static str);
}

/// Runtime identity of a type.
///
/// Equality and hashing use the [`TypeId`] only; the name is for display.
#[derive(Clone, Copy)]
pub struct TypeInfo {
    id: TypeId,
    full_name: &'static str,
}

impl TypeInfo {
    /// Identity of `T`.
    #[inline]
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            full_name: std::any::type_name::<T>(),
        }
    }

    /// The underlying type id.
    #[inline]
    pub fn id(&self) -> TypeId {
        self.id
    }

    /// The type name without its module path.
    pub fn name(&self) -> &'static str {
        let head = self.full_name.find('<').unwrap_or(self.full_name.len());
        let start = self.full_name[..head].rfind("::").map_or(0, |i| i + 2);
        &self.full_name[start..]
    }

    /// The fully qualified type name.
    #[inline]
    pub fn full_name(&self) -> &'static str {
        self.full_name
    }

    /// Whether this is the identity of `T`.
    #[inline]
    pub fn is<T: ?Sized + 'static>(&self) -> bool {
        self.id == TypeId::of::<T>()
    }
}

impl PartialEq for TypeInfo {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeInfo {}

impl Hash for TypeInfo {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for TypeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeInfo({})", self.name())
    }
}

impl fmt::Display for TypeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    struct Plain;
    #[allow(dead_code)]
    struct Wrapper<T>(T);

    #[test]
    fn test_short_name() {
        assert_eq!(TypeInfo::of::<Plain>().name(), "Plain");
        assert_eq!(TypeInfo::of::<u64>().name(), "u64");
        assert!(TypeInfo::of::<Wrapper<Plain>>().name().starts_with("Wrapper<"));
    }

    #[test]
    fn test_identity_ignores_name() {
        let a = TypeInfo::of::<Plain>();
        let b = TypeInfo::of::<Plain>();
        assert_eq!(a, b);
        assert!(a.is::<Plain>());
        assert!(!a.is::<u64>());

        let set: HashSet<_> = [a, b, TypeInfo::of::<u64>()].into_iter().collect();
        assert_eq!(set.len(), 2);
    }
}
