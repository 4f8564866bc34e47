//! Shared domain for the integration tests.

#![allow(dead_code)]

use sift::query::{Entity, FilterValue, NavigationVisitor, Selector};
use sift_memory::MemoryStore;

#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    pub id: i64,
    pub customer_id: i64,
    pub total: i64,
    pub status: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Customer {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Address {
    pub id: i64,
    pub city: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LineItem {
    pub id: i64,
    pub order_id: i64,
    pub sku: String,
}

impl Entity for Order {
    const NAME: &'static str = "Order";

    fn field(&self, name: &str) -> Option<FilterValue> {
        match name {
            "id" => Some(self.id.into()),
            "customer_id" => Some(self.customer_id.into()),
            "total" => Some(self.total.into()),
            "status" => Some(self.status.as_str().into()),
            _ => None,
        }
    }

    fn navigations<V: NavigationVisitor<Self>>(visitor: &mut V) {
        visitor.visit::<Customer>("customer");
        visitor.visit::<LineItem>("lines");
    }
}

impl Entity for Customer {
    const NAME: &'static str = "Customer";

    fn field(&self, name: &str) -> Option<FilterValue> {
        match name {
            "id" => Some(self.id.into()),
            "name" => Some(self.name.as_str().into()),
            _ => None,
        }
    }

    fn navigations<V: NavigationVisitor<Self>>(visitor: &mut V) {
        visitor.visit::<Address>("address");
        visitor.visit::<Order>("orders");
    }
}

impl Entity for Address {
    const NAME: &'static str = "Address";

    fn field(&self, name: &str) -> Option<FilterValue> {
        match name {
            "id" => Some(self.id.into()),
            "city" => Some(self.city.as_str().into()),
            _ => None,
        }
    }
}

impl Entity for LineItem {
    const NAME: &'static str = "LineItem";

    fn field(&self, name: &str) -> Option<FilterValue> {
        match name {
            "id" => Some(self.id.into()),
            "order_id" => Some(self.order_id.into()),
            "sku" => Some(self.sku.as_str().into()),
            _ => None,
        }
    }
}

pub const CUSTOMER: Selector<Order, Customer> = Selector::new("customer");
pub const LINES: Selector<Order, LineItem> = Selector::new("lines");
pub const ADDRESS: Selector<Customer, Address> = Selector::new("address");
pub const ORDERS: Selector<Customer, Order> = Selector::new("orders");

pub fn order(id: i64, customer_id: i64, total: i64, status: &str) -> Order {
    Order {
        id,
        customer_id,
        total,
        status: status.to_string(),
    }
}

/// Six orders over two customers.
///
/// | id | customer | total | status   |
/// |----|----------|-------|----------|
/// | 1  | 1        | 120   | shipped  |
/// | 2  | 1        | 40    | pending  |
/// | 3  | 2        | 300   | shipped  |
/// | 4  | 2        | 75    | pending  |
/// | 5  | 1        | 210   | shipped  |
/// | 6  | 2        | 15    | canceled |
pub fn orders() -> Vec<Order> {
    vec![
        order(1, 1, 120, "shipped"),
        order(2, 1, 40, "pending"),
        order(3, 2, 300, "shipped"),
        order(4, 2, 75, "pending"),
        order(5, 1, 210, "shipped"),
        order(6, 2, 15, "canceled"),
    ]
}

pub fn seeded_store() -> MemoryStore {
    let store = MemoryStore::new();
    store.seed(orders()).expect("seed orders");
    store
        .seed([
            Customer { id: 1, name: "Ada".to_string() },
            Customer { id: 2, name: "Grace".to_string() },
        ])
        .expect("seed customers");
    store
}

pub fn ids(rows: &[Order]) -> Vec<i64> {
    rows.iter().map(|o| o.id).collect()
}
