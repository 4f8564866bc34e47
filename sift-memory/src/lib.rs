//! In-memory data source for Sift.
//!
//! This crate implements the `sift-query` data source traits over typed,
//! in-process tables. It backs tests and examples and serves as the
//! reference for how a data source plugs into specification evaluation.
//!
//! # Features
//!
//! - Lazy queries: filters, ordering and paging run in application order on
//!   execution
//! - Include plans: eager-load requests are validated against the current
//!   navigation chain and recorded
//! - Staged writes committed atomically per context
//! - Cancellation through `tokio_util::sync::CancellationToken`
//!
//! # Example
//!
//! ```rust
//! use sift_memory::{MemoryContext, MemoryStore};
//! use sift_query::{DataContext, Entity, Executable, FilterValue};
//! use tokio_util::sync::CancellationToken;
//!
//! #[derive(Clone)]
//! struct Tag { id: i64 }
//!
//! impl Entity for Tag {
//!     const NAME: &'static str = "Tag";
//!     fn field(&self, name: &str) -> Option<FilterValue> {
//!         (name == "id").then(|| self.id.into())
//!     }
//! }
//!
//! # futures::executor::block_on(async {
//! let store = MemoryStore::new();
//! store.seed([Tag { id: 1 }, Tag { id: 2 }]).unwrap();
//!
//! let context = MemoryContext::new(store);
//! let count = context.query::<Tag>().count(CancellationToken::new()).await.unwrap();
//! assert_eq!(count, 2);
//! # });
//! ```

pub mod context;
pub mod error;
pub mod query;
pub mod store;

pub use context::{MemoryContext, MemoryContextFactory};
pub use error::{MemoryError, MemoryResult};
pub use query::{IncludePath, IncludeStep, MemoryQuery};
pub use store::MemoryStore;
