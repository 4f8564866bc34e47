//! Shared fixtures for unit tests: a small entity graph and a recording query.

use std::marker::PhantomData;

use crate::entity::{Entity, NavigationVisitor, TypeInfo};
use crate::error::{QueryError, QueryResult};
use crate::filter::{Filter, FilterValue};
use crate::relations::Selector;
use crate::traits::Queryable;
use crate::types::OrderBy;

#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    pub id: i64,
    pub total: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Customer {
    pub id: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Address {
    pub id: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Product {
    pub id: i64,
}

impl Entity for Order {
    const NAME: &'static str = "Order";

    fn field(&self, name: &str) -> Option<FilterValue> {
        match name {
            "id" => Some(self.id.into()),
            "total" => Some(self.total.into()),
            _ => None,
        }
    }

    fn navigations<V: NavigationVisitor<Self>>(visitor: &mut V) {
        visitor.visit::<Customer>("customer");
        visitor.visit::<Product>("products");
    }
}

impl Entity for Customer {
    const NAME: &'static str = "Customer";

    fn field(&self, name: &str) -> Option<FilterValue> {
        (name == "id").then(|| self.id.into())
    }

    fn navigations<V: NavigationVisitor<Self>>(visitor: &mut V) {
        visitor.visit::<Address>("address");
        visitor.visit::<Order>("orders");
    }
}

impl Entity for Address {
    const NAME: &'static str = "Address";

    fn field(&self, name: &str) -> Option<FilterValue> {
        (name == "id").then(|| self.id.into())
    }
}

impl Entity for Product {
    const NAME: &'static str = "Product";

    fn field(&self, name: &str) -> Option<FilterValue> {
        (name == "id").then(|| self.id.into())
    }
}

pub const CUSTOMER: Selector<Order, Customer> = Selector::new("customer");
pub const PRODUCTS: Selector<Order, Product> = Selector::new("products");
pub const ADDRESS: Selector<Customer, Address> = Selector::new("address");

/// One recorded query operation.
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    Filter(Filter),
    OrderBy(OrderBy),
    Skip(u64),
    Take(u64),
    Include {
        source: TypeInfo,
        property: TypeInfo,
        path: String,
    },
}

/// A query that records every operation applied to it.
///
/// Includes follow the usual chain rule: the source must be the root entity
/// or the property of the previous include.
#[derive(Debug)]
pub struct MockQuery<T> {
    pub steps: Vec<Step>,
    tip: Option<TypeInfo>,
    _marker: PhantomData<fn() -> T>,
}

impl<T> MockQuery<T> {
    pub fn new() -> Self {
        Self {
            steps: Vec::new(),
            tip: None,
            _marker: PhantomData,
        }
    }

    fn push(mut self, step: Step) -> Self {
        self.steps.push(step);
        self
    }
}

impl<T: Entity> Queryable for MockQuery<T> {
    type Entity = T;

    fn filter(self, filter: Filter) -> Self {
        self.push(Step::Filter(filter))
    }

    fn order_by(self, order: OrderBy) -> Self {
        self.push(Step::OrderBy(order))
    }

    fn skip(self, n: u64) -> Self {
        self.push(Step::Skip(n))
    }

    fn take(self, n: u64) -> Self {
        self.push(Step::Take(n))
    }

    fn include<S: Entity, P: Entity>(mut self, selector: &Selector<S, P>) -> QueryResult<Self> {
        let source = TypeInfo::of::<S>();
        if !source.is::<T>() && self.tip != Some(source) {
            return Err(QueryError::invalid_include(
                S::NAME,
                selector.path(),
                "not reachable from the current include chain",
            ));
        }
        self.tip = Some(TypeInfo::of::<P>());
        Ok(self.push(Step::Include {
            source,
            property: TypeInfo::of::<P>(),
            path: selector.path().to_string(),
        }))
    }
}
