//! Traits a data source implements to be driven by specifications.
//!
//! - [`Queryable`]: a composable, not-yet-executed query over one entity.
//! - [`Executable`]: materialization of a composed query.
//! - [`DataContext`]: access to queryables and write passthroughs.
//! - [`ContextFactory`]: creation of data contexts.

use std::future::Future;
use std::pin::Pin;

use futures::executor;
use futures::stream::{self, BoxStream, StreamExt, TryStreamExt};
use tokio_util::sync::CancellationToken;

use crate::entity::Entity;
use crate::error::{QueryError, QueryResult};
use crate::filter::Filter;
use crate::relations::Selector;
use crate::types::OrderBy;

/// A boxed future for async data source operations.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// A composable query over `Self::Entity`.
///
/// Every operation consumes the query and returns the composed one; nothing
/// executes until an [`Executable`] method is awaited.
pub trait Queryable: Sized + Send + 'static {
    /// The root entity of the query.
    type Entity: Entity;

    /// Restrict the rows to those matching `filter`.
    fn filter(self, filter: Filter) -> Self;

    /// Order the rows.
    fn order_by(self, order: OrderBy) -> Self;

    /// Skip the first `n` rows.
    fn skip(self, n: u64) -> Self;

    /// Keep at most `n` rows.
    fn take(self, n: u64) -> Self;

    /// Eager-load the navigation `selector` from `S` to `P`.
    ///
    /// `S` is either the root entity, starting a new navigation chain, or the
    /// property type of the chain being continued. Sources reject navigations
    /// they cannot reach from the current chain.
    fn include<S: Entity, P: Entity>(self, selector: &Selector<S, P>) -> QueryResult<Self>;
}

/// Materialization of a composed query.
///
/// Only `to_list` and `count` are required; the rest have defaults built on
/// them that sources can override with cheaper native forms.
pub trait Executable: Queryable {
    /// Execute and collect every row.
    fn to_list(self, cancel: CancellationToken) -> BoxFuture<'static, QueryResult<Vec<Self::Entity>>>;

    /// Execute and count the rows.
    fn count(self, cancel: CancellationToken) -> BoxFuture<'static, QueryResult<u64>>;

    /// The first row, if any.
    fn first_or_default(
        self,
        cancel: CancellationToken,
    ) -> BoxFuture<'static, QueryResult<Option<Self::Entity>>> {
        let rows = self.take(1).to_list(cancel);
        Box::pin(async move { Ok(rows.await?.into_iter().next()) })
    }

    /// The only row, if any; more than one row is an error.
    fn single_or_default(
        self,
        cancel: CancellationToken,
    ) -> BoxFuture<'static, QueryResult<Option<Self::Entity>>> {
        let rows = self.take(2).to_list(cancel);
        Box::pin(async move {
            let mut rows = rows.await?;
            if rows.len() > 1 {
                return Err(QueryError::not_unique(Self::Entity::NAME)
                    .with_context("single_or_default"));
            }
            Ok(rows.pop())
        })
    }

    /// Whether any row matches.
    fn any(self, cancel: CancellationToken) -> BoxFuture<'static, QueryResult<bool>> {
        let count = self.take(1).count(cancel);
        Box::pin(async move { Ok(count.await? > 0) })
    }

    /// Execute and yield rows as a stream.
    fn into_stream(self, cancel: CancellationToken) -> BoxStream<'static, QueryResult<Self::Entity>> {
        stream::once(self.to_list(cancel))
            .map_ok(|rows| stream::iter(rows.into_iter().map(Ok::<_, QueryError>)))
            .try_flatten()
            .boxed()
    }

    /// Blocking form of [`Executable::to_list`].
    ///
    /// Drives the future on the current thread. Do not call from inside an
    /// async task whose source needs that task's runtime to make progress.
    fn to_list_blocking(self, cancel: CancellationToken) -> QueryResult<Vec<Self::Entity>> {
        executor::block_on(self.to_list(cancel))
    }

    /// Blocking form of [`Executable::count`].
    fn count_blocking(self, cancel: CancellationToken) -> QueryResult<u64> {
        executor::block_on(self.count(cancel))
    }

    /// Blocking form of [`Executable::first_or_default`].
    fn first_or_default_blocking(self, cancel: CancellationToken) -> QueryResult<Option<Self::Entity>> {
        executor::block_on(self.first_or_default(cancel))
    }

    /// Blocking form of [`Executable::single_or_default`].
    fn single_or_default_blocking(self, cancel: CancellationToken) -> QueryResult<Option<Self::Entity>> {
        executor::block_on(self.single_or_default(cancel))
    }

    /// Blocking form of [`Executable::any`].
    fn any_blocking(self, cancel: CancellationToken) -> QueryResult<bool> {
        executor::block_on(self.any(cancel))
    }
}

/// A unit of work against a data source.
pub trait DataContext: Send + Sync + 'static {
    /// The queryable this context hands out for entity `T`.
    type Query<T: Entity>: Executable<Entity = T>;

    /// A fresh query over every row of `T`.
    fn query<T: Entity>(&self) -> Self::Query<T>;

    /// Stage an insert.
    fn insert<T: Entity>(&self, entity: T, cancel: CancellationToken) -> BoxFuture<'_, QueryResult<T>>;

    /// Stage an update of the row with the same primary key.
    fn update<T: Entity>(&self, entity: T, cancel: CancellationToken) -> BoxFuture<'_, QueryResult<()>>;

    /// Stage a delete of the row with the same primary key.
    fn delete<T: Entity>(&self, entity: T, cancel: CancellationToken) -> BoxFuture<'_, QueryResult<()>>;

    /// Commit staged changes, returning how many were written.
    fn commit(&self, cancel: CancellationToken) -> BoxFuture<'_, QueryResult<u64>>;
}

/// Creates data contexts, one per unit of work.
pub trait ContextFactory: Send + Sync {
    /// The context type produced.
    type Context: DataContext;

    /// Create a new context.
    fn create_context(&self) -> QueryResult<Self::Context>;
}
