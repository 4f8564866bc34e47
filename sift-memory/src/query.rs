//! Lazy queries over the in-memory store.

use std::fmt;
use std::marker::PhantomData;

use sift_query::{
    BoxFuture, Entity, Executable, Filter, OrderBy, QueryError, QueryResult, Queryable, Selector,
    TypeInfo,
};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::store::MemoryStore;

/// One navigation of an include path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncludeStep {
    /// Entity the navigation starts from.
    pub source: TypeInfo,
    /// Entity the navigation leads to.
    pub property: TypeInfo,
    /// Navigation name.
    pub navigation: String,
}

/// A chain of navigations starting at the root entity.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IncludePath {
    steps: Vec<IncludeStep>,
}

impl IncludePath {
    /// The navigations, root first.
    pub fn steps(&self) -> &[IncludeStep] {
        &self.steps
    }

    /// The entity at the end of the path.
    pub fn tip(&self) -> Option<TypeInfo> {
        self.steps.last().map(|step| step.property)
    }
}

impl fmt::Display for IncludePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, step) in self.steps.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            f.write_str(&step.navigation)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
enum Op {
    Filter(Filter),
    Order(OrderBy),
    Skip(u64),
    Take(u64),
}

/// A composed, not yet executed query over the rows of `T`.
///
/// Operations run in the order they were applied when the query executes.
/// Includes are recorded as an include plan; rows carry no navigation data
/// of their own, so the plan is what a caller can observe.
pub struct MemoryQuery<T> {
    store: MemoryStore,
    ops: Vec<Op>,
    includes: Vec<IncludePath>,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Entity> MemoryQuery<T> {
    /// A query over every committed row of `T` in `store`.
    pub fn new(store: MemoryStore) -> Self {
        Self {
            store,
            ops: Vec::new(),
            includes: Vec::new(),
            _marker: PhantomData,
        }
    }

    /// The include paths recorded so far.
    pub fn include_plan(&self) -> &[IncludePath] {
        &self.includes
    }

    fn push(mut self, op: Op) -> Self {
        self.ops.push(op);
        self
    }

    fn run(&self) -> Vec<T> {
        let mut rows = self.store.rows::<T>();
        for op in &self.ops {
            match op {
                Op::Filter(filter) => rows.retain(|row| filter.matches(row)),
                Op::Order(order) => rows.sort_by(|a, b| order.compare(a, b)),
                Op::Skip(n) => {
                    let n = usize::try_from(*n).unwrap_or(usize::MAX).min(rows.len());
                    rows.drain(..n);
                }
                Op::Take(n) => rows.truncate(usize::try_from(*n).unwrap_or(usize::MAX)),
            }
        }
        debug!(entity = T::NAME, rows = rows.len(), includes = self.includes.len(), "memory query executed");
        rows
    }
}

impl<T: Entity> Queryable for MemoryQuery<T> {
    type Entity = T;

    fn filter(self, filter: Filter) -> Self {
        self.push(Op::Filter(filter))
    }

    fn order_by(self, order: OrderBy) -> Self {
        self.push(Op::Order(order))
    }

    fn skip(self, n: u64) -> Self {
        self.push(Op::Skip(n))
    }

    fn take(self, n: u64) -> Self {
        self.push(Op::Take(n))
    }

    fn include<S: Entity, P: Entity>(mut self, selector: &Selector<S, P>) -> QueryResult<Self> {
        let step = IncludeStep {
            source: TypeInfo::of::<S>(),
            property: TypeInfo::of::<P>(),
            navigation: selector.path().to_string(),
        };

        if step.source.is::<T>() {
            self.includes.push(IncludePath { steps: vec![step] });
            return Ok(self);
        }

        match self.includes.last_mut() {
            Some(path) if path.tip() == Some(step.source) => {
                path.steps.push(step);
                Ok(self)
            }
            _ => Err(QueryError::invalid_include(
                S::NAME,
                selector.path(),
                format!(
                    "{} is neither the root entity {} nor the end of the current include path",
                    S::NAME,
                    T::NAME
                ),
            )),
        }
    }
}

impl<T: Entity> Executable for MemoryQuery<T> {
    fn to_list(self, cancel: CancellationToken) -> BoxFuture<'static, QueryResult<Vec<T>>> {
        Box::pin(async move {
            if cancel.is_cancelled() {
                return Err(QueryError::cancelled("to_list").with_entity(T::NAME));
            }
            Ok(self.run())
        })
    }

    fn count(self, cancel: CancellationToken) -> BoxFuture<'static, QueryResult<u64>> {
        Box::pin(async move {
            if cancel.is_cancelled() {
                return Err(QueryError::cancelled("count").with_entity(T::NAME));
            }
            Ok(self.run().len() as u64)
        })
    }
}

impl<T> Clone for MemoryQuery<T> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            ops: self.ops.clone(),
            includes: self.includes.clone(),
            _marker: PhantomData,
        }
    }
}

impl<T: Entity> fmt::Debug for MemoryQuery<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryQuery")
            .field("entity", &T::NAME)
            .field("ops", &self.ops)
            .field("includes", &self.includes)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::TryStreamExt;
    use pretty_assertions::assert_eq;
    use sift_query::{ErrorCode, FilterValue, NavigationVisitor, OrderByField};

    #[derive(Debug, Clone, PartialEq)]
    struct Order {
        id: i64,
        total: i64,
    }

    #[derive(Debug, Clone, PartialEq)]
    struct Customer {
        id: i64,
    }

    #[derive(Debug, Clone, PartialEq)]
    struct Address {
        id: i64,
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
        }
    }

    impl Entity for Customer {
        const NAME: &'static str = "Customer";

        fn field(&self, name: &str) -> Option<FilterValue> {
            (name == "id").then(|| self.id.into())
        }
    }

    impl Entity for Address {
        const NAME: &'static str = "Address";

        fn field(&self, name: &str) -> Option<FilterValue> {
            (name == "id").then(|| self.id.into())
        }
    }

    const CUSTOMER: Selector<Order, Customer> = Selector::new("customer");
    const ADDRESS: Selector<Customer, Address> = Selector::new("address");

    fn store() -> MemoryStore {
        let store = MemoryStore::new();
        store
            .seed((1..=5).map(|id| Order { id, total: (id % 3) * 10 }))
            .unwrap();
        store
    }

    fn ids(rows: Vec<Order>) -> Vec<i64> {
        rows.into_iter().map(|o| o.id).collect()
    }

    #[tokio::test]
    async fn test_filter_order_page() {
        let query = MemoryQuery::<Order>::new(store())
            .filter(Filter::Gt("total".into(), 0.into()))
            .order_by(OrderBy::from(OrderByField::desc("total")).then(OrderByField::asc("id")))
            .skip(1)
            .take(2);
        let rows = query.to_list(CancellationToken::new()).await.unwrap();
        // totals: 1 -> 10, 2 -> 20, 4 -> 10, 5 -> 20
        assert_eq!(ids(rows), vec![5, 1]);
    }

    #[tokio::test]
    async fn test_operations_apply_in_order() {
        let take_then_filter = MemoryQuery::<Order>::new(store())
            .take(2)
            .filter(Filter::eq("id", 3))
            .count(CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(take_then_filter, 0);
    }

    #[tokio::test]
    async fn test_default_materializers() {
        let cancel = CancellationToken::new();
        let query = MemoryQuery::<Order>::new(store());

        let first = query.clone().first_or_default(cancel.clone()).await.unwrap();
        assert_eq!(first.map(|o| o.id), Some(1));
        assert!(query.clone().any(cancel.clone()).await.unwrap());

        let err = query.clone().single_or_default(cancel.clone()).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NotUnique);

        let single = query
            .clone()
            .filter(Filter::eq("id", 4))
            .single_or_default(cancel.clone())
            .await
            .unwrap();
        assert_eq!(single.map(|o| o.id), Some(4));

        let streamed: Vec<Order> = query.into_stream(cancel).try_collect().await.unwrap();
        assert_eq!(streamed.len(), 5);
    }

    #[tokio::test]
    async fn test_cancelled_execution() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        let err = MemoryQuery::<Order>::new(store())
            .to_list(cancel.clone())
            .await
            .unwrap_err();
        assert!(err.is_cancelled());

        let err = MemoryQuery::<Order>::new(store()).any(cancel).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::Cancelled);
    }

    #[test]
    fn test_paging_beyond_row_count() {
        let cancel = CancellationToken::new();
        let all = MemoryQuery::<Order>::new(store())
            .take(u64::MAX)
            .to_list_blocking(cancel.clone())
            .unwrap();
        assert_eq!(ids(all), vec![1, 2, 3, 4, 5]);

        let none = MemoryQuery::<Order>::new(store())
            .skip(u64::MAX)
            .count_blocking(cancel.clone())
            .unwrap();
        assert_eq!(none, 0);

        let tail = MemoryQuery::<Order>::new(store())
            .skip(3)
            .take(u64::MAX)
            .to_list_blocking(cancel)
            .unwrap();
        assert_eq!(ids(tail), vec![4, 5]);
    }

    #[derive(Debug, Clone, PartialEq)]
    struct Reading {
        id: i64,
        value: f64,
    }

    impl Entity for Reading {
        const NAME: &'static str = "Reading";

        fn field(&self, name: &str) -> Option<FilterValue> {
            match name {
                "id" => Some(self.id.into()),
                "value" => Some(self.value.into()),
                _ => None,
            }
        }
    }

    #[test]
    fn test_order_by_column_with_nan() {
        let store = MemoryStore::new();
        store
            .seed((0..2000i64).map(|id| Reading {
                id,
                value: if id % 5 == 0 { f64::NAN } else { ((id * 7919) % 1009) as f64 },
            }))
            .unwrap();

        let rows = MemoryQuery::<Reading>::new(store)
            .order_by(OrderByField::asc("value").into())
            .to_list_blocking(CancellationToken::new())
            .unwrap();

        assert_eq!(rows.len(), 2000);
        let (numbers, nans) = rows.split_at(1600);
        assert!(numbers.windows(2).all(|w| w[0].value <= w[1].value));
        assert!(nans.iter().all(|r| r.value.is_nan()));
    }

    #[test]
    fn test_blocking_materializers() {
        let cancel = CancellationToken::new();
        let query = MemoryQuery::<Order>::new(store()).filter(Filter::Gt("total".into(), 10.into()));

        assert_eq!(ids(query.clone().to_list_blocking(cancel.clone()).unwrap()), vec![2, 5]);
        assert_eq!(query.clone().count_blocking(cancel.clone()).unwrap(), 2);
        assert!(query.clone().any_blocking(cancel.clone()).unwrap());
        assert_eq!(
            query.clone().first_or_default_blocking(cancel.clone()).unwrap().map(|o| o.id),
            Some(2)
        );
        let err = query.single_or_default_blocking(cancel).unwrap_err();
        assert_eq!(err.code, ErrorCode::NotUnique);
    }

    #[test]
    fn test_include_plan() {
        let query = MemoryQuery::<Order>::new(MemoryStore::new())
            .include(&CUSTOMER)
            .and_then(|q| q.include(&ADDRESS))
            .and_then(|q| q.include(&CUSTOMER))
            .unwrap();

        let plan: Vec<_> = query.include_plan().iter().map(|p| p.to_string()).collect();
        assert_eq!(plan, vec!["customer.address", "customer"]);
        assert_eq!(query.include_plan()[0].tip(), Some(TypeInfo::of::<Address>()));
    }

    #[test]
    fn test_include_out_of_chain() {
        let err = MemoryQuery::<Order>::new(MemoryStore::new())
            .include(&ADDRESS)
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidInclude);
        assert_eq!(err.context.navigation.as_deref(), Some("address"));
    }
}
