//! # sift-query
//!
//! Specification evaluation for the Sift repository layer.
//!
//! This crate provides:
//! - Declarative [`Specification`]s with criteria, ordering, paging,
//!   eager-loading and post-processing
//! - The [`SpecificationEvaluator`], which applies a specification to any
//!   [`Queryable`] data source
//! - Include translation: turning runtime-typed include descriptors into the
//!   data source's generic `include::<S, P>()` calls, with an optional
//!   [`TranslationCache`]
//! - The [`Executable`] and [`DataContext`] traits data sources implement
//!
//! ## Filters
//!
//! ```rust
//! use sift_query::{Filter, FilterValue};
//!
//! let filter = Filter::and([
//!     Filter::Equals("active".into(), FilterValue::Bool(true)),
//!     Filter::Gt("age".into(), FilterValue::Int(18)),
//! ]);
//! assert!(matches!(filter, Filter::And(_)));
//! ```
//!
//! ## Sorting
//!
//! ```rust
//! use sift_query::{OrderBy, OrderByField, NullsOrder};
//!
//! let order = OrderBy::from(OrderByField::desc("created_at").nulls(NullsOrder::Last))
//!     .then(OrderByField::asc("id"));
//! assert_eq!(order.field_count(), 2);
//! ```
//!
//! ## Include strategies
//!
//! ```rust
//! use sift_query::{IncludeStrategy, SiftConfig};
//!
//! let config = SiftConfig::from_str("[evaluator]\ninclude_strategy = \"direct\"").unwrap();
//! assert_eq!(config.include_strategy(), IncludeStrategy::Direct);
//! ```
//!
//! ## Error Handling
//!
//! ```rust
//! use sift_query::{QueryError, ErrorCode};
//!
//! let err = QueryError::not_found("Order");
//! assert_eq!(err.code, ErrorCode::RecordNotFound);
//! ```

pub mod cache;
pub mod config;
pub mod entity;
pub mod error;
pub mod evaluator;
pub mod filter;
pub mod logging;
pub mod pagination;
pub mod projection;
pub mod relations;
pub mod specification;
pub mod traits;
pub mod translation;
pub mod types;

#[cfg(test)]
mod testing;

pub use cache::{CacheKey, CacheStats, TranslationCache};
pub use config::{EvaluatorConfig, LoggingConfig, SiftConfig};
pub use entity::{Entity, NavigationVisitor, TypeInfo};
pub use error::{ErrorCode, ErrorContext, QueryError, QueryResult, Suggestion};
pub use evaluator::{
    Evaluator, EvaluatorKind, IncludeEvaluator, IncludeStrategy, OrderEvaluator, PagingEvaluator,
    SpecificationEvaluator, WhereEvaluator,
};
pub use filter::{Filter, FilterValue};
pub use pagination::Pagination;
pub use projection::Projected;
pub use relations::{ErasedSelector, IncludeDescriptor, IncludeKind, Selector};
pub use specification::{
    IncludableBuilder, PostProcess, ProjectedSpecification, Projection, Specification,
    SpecificationBuilder,
};
pub use traits::{BoxFuture, ContextFactory, DataContext, Executable, Queryable};
pub use translation::{Invoker, Translation, TranslationOrigin, TranslationSet};
pub use types::{NullsOrder, OrderBy, OrderByField, SortOrder};

// Re-export logging utilities
pub use logging::{
    get_log_format, get_log_level, init as init_logging, init_from_config, init_with_level,
    is_debug_enabled,
};

// Re-export the cancellation token taken by every execution method
pub use tokio_util::sync::CancellationToken;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::entity::{Entity, NavigationVisitor};
    pub use crate::error::{QueryError, QueryResult};
    pub use crate::evaluator::{IncludeStrategy, SpecificationEvaluator};
    pub use crate::filter::{Filter, FilterValue};
    pub use crate::pagination::Pagination;
    pub use crate::relations::Selector;
    pub use crate::specification::{ProjectedSpecification, Specification};
    pub use crate::traits::{ContextFactory, DataContext, Executable, Queryable};
    pub use crate::types::{OrderBy, OrderByField, SortOrder};
    pub use tokio_util::sync::CancellationToken;
}
