//! Specifications: declarative descriptions of a query.
//!
//! A [`Specification`] collects criteria, ordering, paging, eager-loads and an
//! optional post-processing step. It is built once and then handed, by
//! reference, to a [`SpecificationEvaluator`](crate::SpecificationEvaluator).
//!
//! ```rust
//! use sift_query::entity::{Entity, NavigationVisitor};
//! use sift_query::{Filter, FilterValue, OrderByField, Selector, Specification};
//!
//! #[derive(Clone)]
//! struct Customer { id: i64 }
//! #[derive(Clone)]
//! struct Order { id: i64, total: i64 }
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
//!             "total" => Some(self.total.into()),
//!             _ => None,
//!         }
//!     }
//!     fn navigations<V: NavigationVisitor<Self>>(visitor: &mut V) {
//!         visitor.visit::<Customer>("customer");
//!     }
//! }
//!
//! const CUSTOMER: Selector<Order, Customer> = Selector::new("customer");
//!
//! let spec = Specification::<Order>::builder()
//!     .r#where(Filter::Gt("total".into(), FilterValue::Int(100)))
//!     .include(&CUSTOMER)
//!     .order_by(OrderByField::desc("total"))
//!     .take(10)
//!     .build();
//!
//! assert_eq!(spec.includes().len(), 1);
//! assert_eq!(spec.pagination().take, Some(10));
//! ```

use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use crate::entity::Entity;
use crate::filter::Filter;
use crate::pagination::Pagination;
use crate::relations::{IncludeDescriptor, Selector};
use crate::types::{OrderBy, OrderByField};

/// Post-processing applied to a materialized result list.
pub type PostProcess<T> = Arc<dyn Fn(Vec<T>) -> Vec<T> + Send + Sync>;

/// Projection from an entity to a result row.
pub type Projection<T, R> = Arc<dyn Fn(T) -> R + Send + Sync>;

/// A declarative query over `T`.
pub struct Specification<T> {
    filters: Vec<Filter>,
    order: OrderBy,
    pagination: Pagination,
    includes: Vec<IncludeDescriptor>,
    include_strings: Vec<String>,
    post_process: Option<PostProcess<T>>,
}

impl<T> Specification<T> {
    /// An empty specification matching every row.
    pub fn new() -> Self {
        Self {
            filters: Vec::new(),
            order: OrderBy::none(),
            pagination: Pagination::new(),
            includes: Vec::new(),
            include_strings: Vec::new(),
            post_process: None,
        }
    }

    /// Start building a specification.
    pub fn builder() -> SpecificationBuilder<T> {
        SpecificationBuilder { spec: Self::new() }
    }

    /// Where-filters, applied in order.
    #[inline]
    pub fn filters(&self) -> &[Filter] {
        &self.filters
    }

    /// All where-filters combined into one.
    pub fn criteria(&self) -> Filter {
        Filter::and(self.filters.iter().cloned())
    }

    /// The ordering.
    #[inline]
    pub fn order(&self) -> &OrderBy {
        &self.order
    }

    /// The paging window.
    #[inline]
    pub fn pagination(&self) -> Pagination {
        self.pagination
    }

    /// Include descriptors, in application order.
    #[inline]
    pub fn includes(&self) -> &[IncludeDescriptor] {
        &self.includes
    }

    /// Include paths given as strings.
    #[inline]
    pub fn include_strings(&self) -> &[String] {
        &self.include_strings
    }

    /// The post-processing step, if any.
    #[inline]
    pub fn post_process(&self) -> Option<&PostProcess<T>> {
        self.post_process.as_ref()
    }

    /// Run the post-processing step over `rows`, or return them unchanged.
    pub fn apply_post_process(&self, rows: Vec<T>) -> Vec<T> {
        match &self.post_process {
            Some(post_process) => post_process(rows),
            None => rows,
        }
    }
}

impl<T> Default for Specification<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for Specification<T> {
    fn clone(&self) -> Self {
        Self {
            filters: self.filters.clone(),
            order: self.order.clone(),
            pagination: self.pagination,
            includes: self.includes.clone(),
            include_strings: self.include_strings.clone(),
            post_process: self.post_process.clone(),
        }
    }
}

impl<T> fmt::Debug for Specification<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Specification")
            .field("filters", &self.filters)
            .field("order", &self.order)
            .field("pagination", &self.pagination)
            .field("includes", &self.includes)
            .field("include_strings", &self.include_strings)
            .field("post_process", &self.post_process.is_some())
            .finish()
    }
}

/// Builder for [`Specification`].
pub struct SpecificationBuilder<T> {
    spec: Specification<T>,
}

impl<T: Entity> SpecificationBuilder<T> {
    /// Add a where-filter. Filters combine with AND.
    pub fn r#where(mut self, filter: Filter) -> Self {
        if !filter.is_none() {
            self.spec.filters.push(filter);
        }
        self
    }

    /// Replace the ordering with `field`.
    pub fn order_by(mut self, field: OrderByField) -> Self {
        self.spec.order = OrderBy::Field(field);
        self
    }

    /// Add a less significant ordering field.
    pub fn then_by(mut self, field: OrderByField) -> Self {
        let order = std::mem::take(&mut self.spec.order);
        self.spec.order = order.then(field);
        self
    }

    /// Skip the first `n` rows.
    pub fn skip(mut self, n: u64) -> Self {
        self.spec.pagination = self.spec.pagination.skip(n);
        self
    }

    /// Keep at most `n` rows.
    pub fn take(mut self, n: u64) -> Self {
        self.spec.pagination = self.spec.pagination.take(n);
        self
    }

    /// Eager-load a navigation of the root entity.
    pub fn include<P: Entity>(mut self, selector: &Selector<T, P>) -> IncludableBuilder<T, P> {
        self.spec.includes.push(IncludeDescriptor::include(selector));
        IncludableBuilder {
            builder: self,
            _marker: PhantomData,
        }
    }

    /// Eager-load by navigation path string.
    ///
    /// String paths are kept on the specification for data sources that read
    /// them; the evaluators do not translate them.
    pub fn include_path(mut self, path: impl Into<String>) -> Self {
        self.spec.include_strings.push(path.into());
        self
    }

    /// Post-process the materialized list.
    pub fn post_process<F>(mut self, f: F) -> Self
    where
        F: Fn(Vec<T>) -> Vec<T> + Send + Sync + 'static,
    {
        self.spec.post_process = Some(Arc::new(f));
        self
    }

    /// Finish the specification.
    pub fn build(self) -> Specification<T> {
        self.spec
    }

    /// Finish the specification with a projection to `R`.
    pub fn select<R, F>(self, f: F) -> ProjectedSpecification<T, R>
    where
        F: Fn(T) -> R + Send + Sync + 'static,
    {
        ProjectedSpecification {
            spec: self.spec,
            selector: Arc::new(f),
            post_process: None,
        }
    }
}

/// Builder state right after an include of `P`, allowing `then_include`.
pub struct IncludableBuilder<T, P> {
    builder: SpecificationBuilder<T>,
    _marker: PhantomData<fn() -> P>,
}

impl<T: Entity, P: Entity> IncludableBuilder<T, P> {
    /// Continue the navigation chain from `P`.
    pub fn then_include<N: Entity>(mut self, selector: &Selector<P, N>) -> IncludableBuilder<T, N> {
        self.builder
            .spec
            .includes
            .push(IncludeDescriptor::then_include(selector));
        IncludableBuilder {
            builder: self.builder,
            _marker: PhantomData,
        }
    }

    /// Start a new navigation chain from the root entity.
    pub fn include<Q: Entity>(self, selector: &Selector<T, Q>) -> IncludableBuilder<T, Q> {
        self.builder.include(selector)
    }

    /// See [`SpecificationBuilder::r#where`].
    pub fn r#where(self, filter: Filter) -> SpecificationBuilder<T> {
        self.builder.r#where(filter)
    }

    /// See [`SpecificationBuilder::order_by`].
    pub fn order_by(self, field: OrderByField) -> SpecificationBuilder<T> {
        self.builder.order_by(field)
    }

    /// See [`SpecificationBuilder::then_by`].
    pub fn then_by(self, field: OrderByField) -> SpecificationBuilder<T> {
        self.builder.then_by(field)
    }

    /// See [`SpecificationBuilder::skip`].
    pub fn skip(self, n: u64) -> SpecificationBuilder<T> {
        self.builder.skip(n)
    }

    /// See [`SpecificationBuilder::take`].
    pub fn take(self, n: u64) -> SpecificationBuilder<T> {
        self.builder.take(n)
    }

    /// See [`SpecificationBuilder::include_path`].
    pub fn include_path(self, path: impl Into<String>) -> SpecificationBuilder<T> {
        self.builder.include_path(path)
    }

    /// See [`SpecificationBuilder::post_process`].
    pub fn post_process<F>(self, f: F) -> SpecificationBuilder<T>
    where
        F: Fn(Vec<T>) -> Vec<T> + Send + Sync + 'static,
    {
        self.builder.post_process(f)
    }

    /// See [`SpecificationBuilder::build`].
    pub fn build(self) -> Specification<T> {
        self.builder.build()
    }

    /// See [`SpecificationBuilder::select`].
    pub fn select<R, F>(self, f: F) -> ProjectedSpecification<T, R>
    where
        F: Fn(T) -> R + Send + Sync + 'static,
    {
        self.builder.select(f)
    }
}

/// A specification whose rows are projected to `R`.
pub struct ProjectedSpecification<T, R> {
    spec: Specification<T>,
    selector: Projection<T, R>,
    post_process: Option<PostProcess<R>>,
}

impl<T, R> ProjectedSpecification<T, R> {
    /// Post-process the projected list.
    pub fn post_process<F>(mut self, f: F) -> Self
    where
        F: Fn(Vec<R>) -> Vec<R> + Send + Sync + 'static,
    {
        self.post_process = Some(Arc::new(f));
        self
    }

    /// The underlying specification.
    #[inline]
    pub fn specification(&self) -> &Specification<T> {
        &self.spec
    }

    /// The projection.
    #[inline]
    pub fn selector(&self) -> &Projection<T, R> {
        &self.selector
    }

    /// Run the projected post-processing step over `rows`.
    pub fn apply_post_process(&self, rows: Vec<R>) -> Vec<R> {
        match &self.post_process {
            Some(post_process) => post_process(rows),
            None => rows,
        }
    }
}

impl<T, R> Clone for ProjectedSpecification<T, R> {
    fn clone(&self) -> Self {
        Self {
            spec: self.spec.clone(),
            selector: Arc::clone(&self.selector),
            post_process: self.post_process.clone(),
        }
    }
}

impl<T, R> fmt::Debug for ProjectedSpecification<T, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProjectedSpecification")
            .field("spec", &self.spec)
            .field("post_process", &self.post_process.is_some())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::TypeInfo;
    use crate::relations::IncludeKind;
    use crate::testing::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_empty_specification() {
        let spec = Specification::<Order>::new();
        assert!(spec.filters().is_empty());
        assert!(spec.order().is_empty());
        assert!(spec.pagination().is_empty());
        assert!(spec.includes().is_empty());
        assert!(spec.criteria().is_none());
    }

    #[test]
    fn test_include_chain_records_descriptors() {
        let spec = Specification::<Order>::builder()
            .include(&CUSTOMER)
            .then_include(&ADDRESS)
            .include(&PRODUCTS)
            .build();

        let kinds: Vec<_> = spec.includes().iter().map(|d| d.kind()).collect();
        assert_eq!(
            kinds,
            vec![IncludeKind::Include, IncludeKind::ThenInclude, IncludeKind::Include]
        );
        assert_eq!(spec.includes()[1].entity_type(), TypeInfo::of::<Customer>());
        assert_eq!(spec.includes()[1].previous_property_type(), Some(TypeInfo::of::<Customer>()));
        assert_eq!(spec.includes()[2].path(), "products");
    }

    #[test]
    fn test_builder_facets() {
        let spec = Specification::<Order>::builder()
            .r#where(Filter::eq("id", 1))
            .r#where(Filter::none())
            .r#where(Filter::Gt("total".into(), 5.into()))
            .order_by(OrderByField::asc("total"))
            .then_by(OrderByField::desc("id"))
            .skip(5)
            .take(10)
            .include_path("customer.address")
            .build();

        assert_eq!(spec.filters().len(), 2);
        assert_eq!(spec.order().field_count(), 2);
        assert_eq!(spec.pagination(), Pagination::new().skip(5).take(10));
        assert_eq!(spec.include_strings(), ["customer.address".to_string()]);
        assert!(matches!(spec.criteria(), Filter::And(ref filters) if filters.len() == 2));
    }

    #[test]
    fn test_post_process() {
        let spec = Specification::<Order>::builder()
            .post_process(|mut rows| {
                rows.reverse();
                rows
            })
            .build();
        let rows = vec![Order { id: 1, total: 0 }, Order { id: 2, total: 0 }];
        let ids: Vec<_> = spec.apply_post_process(rows).into_iter().map(|o| o.id).collect();
        assert_eq!(ids, vec![2, 1]);
    }

    #[test]
    fn test_select_projects() {
        let projected = Specification::<Order>::builder()
            .include(&CUSTOMER)
            .select(|order| order.total)
            .post_process(|mut totals| {
                totals.sort_unstable();
                totals
            });

        assert_eq!(projected.specification().includes().len(), 1);
        assert_eq!((projected.selector())(Order { id: 1, total: 42 }), 42);
        assert_eq!(projected.apply_post_process(vec![3, 1, 2]), vec![1, 2, 3]);
    }
}
