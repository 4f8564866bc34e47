//! Projected queries.

use std::fmt;

use futures::stream::{BoxStream, StreamExt, TryStreamExt};
use tokio_util::sync::CancellationToken;

use crate::error::QueryResult;
use crate::specification::Projection;
use crate::traits::{BoxFuture, Executable, Queryable};

/// A composed query whose rows are mapped through a projection.
///
/// Materialization runs the underlying query and projects each row; row
/// counts are those of the underlying query.
pub struct Projected<Q: Queryable, R> {
    query: Q,
    selector: Projection<Q::Entity, R>,
}

impl<Q: Queryable, R> Projected<Q, R> {
    /// Wrap `query` with a projection.
    pub fn new(query: Q, selector: Projection<Q::Entity, R>) -> Self {
        Self { query, selector }
    }

    /// The underlying query.
    pub fn query(&self) -> &Q {
        &self.query
    }

    /// Split into the underlying query and the projection.
    pub fn into_parts(self) -> (Q, Projection<Q::Entity, R>) {
        (self.query, self.selector)
    }
}

impl<Q: Executable, R: Send + 'static> Projected<Q, R> {
    /// Execute and project every row.
    pub fn to_list(self, cancel: CancellationToken) -> BoxFuture<'static, QueryResult<Vec<R>>> {
        let rows = self.query.to_list(cancel);
        let selector = self.selector;
        Box::pin(async move { Ok(rows.await?.into_iter().map(|row| selector(row)).collect()) })
    }

    /// The first projected row, if any.
    pub fn first_or_default(self, cancel: CancellationToken) -> BoxFuture<'static, QueryResult<Option<R>>> {
        let row = self.query.first_or_default(cancel);
        let selector = self.selector;
        Box::pin(async move { Ok(row.await?.map(|row| selector(row))) })
    }

    /// The only projected row, if any; more than one row is an error.
    pub fn single_or_default(self, cancel: CancellationToken) -> BoxFuture<'static, QueryResult<Option<R>>> {
        let row = self.query.single_or_default(cancel);
        let selector = self.selector;
        Box::pin(async move { Ok(row.await?.map(|row| selector(row))) })
    }

    /// Count the underlying rows.
    pub fn count(self, cancel: CancellationToken) -> BoxFuture<'static, QueryResult<u64>> {
        self.query.count(cancel)
    }

    /// Whether any underlying row matches.
    pub fn any(self, cancel: CancellationToken) -> BoxFuture<'static, QueryResult<bool>> {
        self.query.any(cancel)
    }

    /// Execute and yield projected rows as a stream.
    pub fn into_stream(self, cancel: CancellationToken) -> BoxStream<'static, QueryResult<R>> {
        let selector = self.selector;
        self.query
            .into_stream(cancel)
            .map_ok(move |row| selector(row))
            .boxed()
    }
}

impl<Q: Queryable + fmt::Debug, R> fmt::Debug for Projected<Q, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Projected")
            .field("query", &self.query)
            .finish_non_exhaustive()
    }
}
