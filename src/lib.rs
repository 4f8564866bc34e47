//! # Sift
//!
//! Specification-pattern repositories for Rust.
//!
//! Sift separates *what* to load from *how* a data source loads it. A
//! [`Specification`](query::Specification) describes criteria, ordering,
//! paging, eager-loaded navigations and post-processing; a
//! [`SpecificationEvaluator`](query::SpecificationEvaluator) applies it to
//! any data source implementing [`Queryable`](query::Queryable); a
//! [`Repository`] wraps a [`DataContext`](query::DataContext) and exposes the
//! usual read and write operations on top.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use sift::prelude::*;
//! use sift_memory::MemoryContextFactory;
//!
//! const CUSTOMER: Selector<Order, Customer> = Selector::new("customer");
//!
//! let factory = ContextRepositoryFactory::new(MemoryContextFactory::default());
//! let orders = factory.repository::<Order>()?;
//!
//! let spec = Specification::builder()
//!     .r#where(Filter::Gt("total".into(), 100.into()))
//!     .order_by(OrderByField::desc("total"))
//!     .include(&CUSTOMER)
//!     .take(10)
//!     .build();
//!
//! let big_orders = orders.list(&spec, CancellationToken::new()).await?;
//! ```
//!
//! ## Include strategies
//!
//! Includes are stored as runtime-typed descriptors and translated back into
//! the data source's generic `include::<S, P>()` calls. The default `cached`
//! strategy builds one invoker per navigation shape and reuses it; `direct`
//! resolves every time. Pick one in `sift.toml`:
//!
//! ```toml
//! [evaluator]
//! include_strategy = "cached"
//! ```
//!
//! ## Crates
//!
//! - `sift-query`: specifications, evaluators, include translation, traits
//! - `sift-memory`: an in-memory data source for tests and prototyping

#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

mod factory;
mod repository;

pub use factory::{ContextRepositoryFactory, RepositoryFactory};
pub use repository::{ReadRepositoryBase, Repository, RepositoryBase};

/// Re-export of the specification and evaluation layer.
pub mod query {
    pub use sift_query::*;
}

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::factory::{ContextRepositoryFactory, RepositoryFactory};
    pub use crate::repository::{ReadRepositoryBase, Repository, RepositoryBase};
    pub use sift_query::prelude::*;
}
