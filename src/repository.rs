//! Repositories: specification-driven reads and unit-of-work writes over a
//! [`DataContext`].

use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;
use futures::stream::BoxStream;
use sift_query::{
    CancellationToken, DataContext, Entity, Executable, Filter, FilterValue, IncludeStrategy,
    ProjectedSpecification, QueryResult, Queryable, SiftConfig, Specification,
    SpecificationEvaluator,
};
use tracing::debug;

/// Read operations of a repository over `T`.
#[async_trait]
pub trait ReadRepositoryBase<T: Entity>: Send + Sync {
    /// The row whose primary key equals `id`, if any.
    async fn get_by_id(&self, id: FilterValue, cancel: CancellationToken) -> QueryResult<Option<T>>;

    /// The first row matching `spec`, if any.
    async fn first_or_default(
        &self,
        spec: &Specification<T>,
        cancel: CancellationToken,
    ) -> QueryResult<Option<T>>;

    /// The first row matching `spec`, projected.
    async fn first_or_default_projected<R: Send + 'static>(
        &self,
        spec: &ProjectedSpecification<T, R>,
        cancel: CancellationToken,
    ) -> QueryResult<Option<R>>;

    /// The only row matching `spec`, if any. More than one is an error.
    async fn single_or_default(
        &self,
        spec: &Specification<T>,
        cancel: CancellationToken,
    ) -> QueryResult<Option<T>>;

    /// The only row matching `spec`, projected.
    async fn single_or_default_projected<R: Send + 'static>(
        &self,
        spec: &ProjectedSpecification<T, R>,
        cancel: CancellationToken,
    ) -> QueryResult<Option<R>>;

    /// Every row.
    async fn list_all(&self, cancel: CancellationToken) -> QueryResult<Vec<T>>;

    /// Every row matching `spec`, post-processed when `spec` has a
    /// post-processing action.
    async fn list(&self, spec: &Specification<T>, cancel: CancellationToken) -> QueryResult<Vec<T>>;

    /// Every row matching `spec`, projected and post-processed.
    async fn list_projected<R: Send + 'static>(
        &self,
        spec: &ProjectedSpecification<T, R>,
        cancel: CancellationToken,
    ) -> QueryResult<Vec<R>>;

    /// Number of rows matching the criteria of `spec`. Ordering, paging and
    /// includes are ignored.
    async fn count(&self, spec: &Specification<T>, cancel: CancellationToken) -> QueryResult<u64>;

    /// Number of rows.
    async fn count_all(&self, cancel: CancellationToken) -> QueryResult<u64>;

    /// Whether any row matches the criteria of `spec`.
    async fn any(&self, spec: &Specification<T>, cancel: CancellationToken) -> QueryResult<bool>;

    /// Whether there is any row.
    async fn any_all(&self, cancel: CancellationToken) -> QueryResult<bool>;

    /// Rows matching `spec` as a stream.
    ///
    /// Evaluation errors surface here; execution errors surface as stream
    /// items.
    fn stream(
        &self,
        spec: &Specification<T>,
        cancel: CancellationToken,
    ) -> QueryResult<BoxStream<'static, QueryResult<T>>>;
}

/// Read and write operations of a repository over `T`.
///
/// Every write commits the context before returning.
#[async_trait]
pub trait RepositoryBase<T: Entity>: ReadRepositoryBase<T> {
    /// Insert `entity` and commit.
    async fn add(&self, entity: T, cancel: CancellationToken) -> QueryResult<T>;

    /// Insert every entity and commit once.
    async fn add_range(&self, entities: Vec<T>, cancel: CancellationToken) -> QueryResult<Vec<T>>;

    /// Update `entity` and commit.
    async fn update(&self, entity: T, cancel: CancellationToken) -> QueryResult<()>;

    /// Update every entity and commit once.
    async fn update_range(&self, entities: Vec<T>, cancel: CancellationToken) -> QueryResult<()>;

    /// Delete `entity` and commit.
    async fn delete(&self, entity: T, cancel: CancellationToken) -> QueryResult<()>;

    /// Delete every entity and commit once.
    async fn delete_range(&self, entities: Vec<T>, cancel: CancellationToken) -> QueryResult<()>;

    /// Delete every row matching `spec` and commit, returning how many rows
    /// were deleted.
    async fn delete_by_spec(&self, spec: &Specification<T>, cancel: CancellationToken) -> QueryResult<u64>;

    /// Commit staged changes on the underlying context.
    async fn save_changes(&self, cancel: CancellationToken) -> QueryResult<u64>;
}

/// A repository over `T` backed by a [`DataContext`].
///
/// The context is shared: several repositories over one context form one
/// unit of work.
pub struct Repository<T: Entity, C: DataContext> {
    context: Arc<C>,
    evaluator: Arc<SpecificationEvaluator<C::Query<T>>>,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Entity, C: DataContext> Repository<T, C> {
    /// A repository with the default include strategy.
    pub fn new(context: Arc<C>) -> Self {
        Self::with_strategy(context, IncludeStrategy::default())
    }

    /// A repository using `strategy` for includes.
    pub fn with_strategy(context: Arc<C>, strategy: IncludeStrategy) -> Self {
        Self::with_evaluator(context, Arc::new(SpecificationEvaluator::new(strategy)))
    }

    /// A repository configured from `config`.
    pub fn from_config(context: Arc<C>, config: &SiftConfig) -> Self {
        Self::with_evaluator(context, Arc::new(SpecificationEvaluator::from_config(config)))
    }

    /// A repository with an existing evaluator, sharing its translation
    /// cache.
    pub fn with_evaluator(context: Arc<C>, evaluator: Arc<SpecificationEvaluator<C::Query<T>>>) -> Self {
        Self {
            context,
            evaluator,
            _marker: PhantomData,
        }
    }

    /// The underlying context.
    pub fn context(&self) -> &Arc<C> {
        &self.context
    }

    /// The evaluator applying specifications.
    pub fn evaluator(&self) -> &Arc<SpecificationEvaluator<C::Query<T>>> {
        &self.evaluator
    }

    fn apply(&self, spec: &Specification<T>, criteria_only: bool) -> QueryResult<C::Query<T>> {
        self.evaluator
            .get_query_with(self.context.query::<T>(), spec, criteria_only)
    }
}

#[async_trait]
impl<T: Entity, C: DataContext> ReadRepositoryBase<T> for Repository<T, C> {
    async fn get_by_id(&self, id: FilterValue, cancel: CancellationToken) -> QueryResult<Option<T>> {
        debug!(entity = T::NAME, key = T::PRIMARY_KEY, "get_by_id");
        self.context
            .query::<T>()
            .filter(Filter::eq(T::PRIMARY_KEY, id))
            .first_or_default(cancel)
            .await
    }

    async fn first_or_default(
        &self,
        spec: &Specification<T>,
        cancel: CancellationToken,
    ) -> QueryResult<Option<T>> {
        self.apply(spec, false)?.first_or_default(cancel).await
    }

    async fn first_or_default_projected<R: Send + 'static>(
        &self,
        spec: &ProjectedSpecification<T, R>,
        cancel: CancellationToken,
    ) -> QueryResult<Option<R>> {
        let projected = self
            .evaluator
            .get_projected_query(self.context.query::<T>(), spec)?;
        projected.first_or_default(cancel).await
    }

    async fn single_or_default(
        &self,
        spec: &Specification<T>,
        cancel: CancellationToken,
    ) -> QueryResult<Option<T>> {
        self.apply(spec, false)?.single_or_default(cancel).await
    }

    async fn single_or_default_projected<R: Send + 'static>(
        &self,
        spec: &ProjectedSpecification<T, R>,
        cancel: CancellationToken,
    ) -> QueryResult<Option<R>> {
        let projected = self
            .evaluator
            .get_projected_query(self.context.query::<T>(), spec)?;
        projected.single_or_default(cancel).await
    }

    async fn list_all(&self, cancel: CancellationToken) -> QueryResult<Vec<T>> {
        self.context.query::<T>().to_list(cancel).await
    }

    async fn list(&self, spec: &Specification<T>, cancel: CancellationToken) -> QueryResult<Vec<T>> {
        let rows = self.apply(spec, false)?.to_list(cancel).await?;
        debug!(entity = T::NAME, rows = rows.len(), "list");
        Ok(spec.apply_post_process(rows))
    }

    async fn list_projected<R: Send + 'static>(
        &self,
        spec: &ProjectedSpecification<T, R>,
        cancel: CancellationToken,
    ) -> QueryResult<Vec<R>> {
        let projected = self
            .evaluator
            .get_projected_query(self.context.query::<T>(), spec)?;
        let rows = projected.to_list(cancel).await?;
        debug!(entity = T::NAME, rows = rows.len(), "list_projected");
        Ok(spec.apply_post_process(rows))
    }

    async fn count(&self, spec: &Specification<T>, cancel: CancellationToken) -> QueryResult<u64> {
        self.apply(spec, true)?.count(cancel).await
    }

    async fn count_all(&self, cancel: CancellationToken) -> QueryResult<u64> {
        self.context.query::<T>().count(cancel).await
    }

    async fn any(&self, spec: &Specification<T>, cancel: CancellationToken) -> QueryResult<bool> {
        self.apply(spec, true)?.any(cancel).await
    }

    async fn any_all(&self, cancel: CancellationToken) -> QueryResult<bool> {
        self.context.query::<T>().any(cancel).await
    }

    fn stream(
        &self,
        spec: &Specification<T>,
        cancel: CancellationToken,
    ) -> QueryResult<BoxStream<'static, QueryResult<T>>> {
        Ok(self.apply(spec, false)?.into_stream(cancel))
    }
}

#[async_trait]
impl<T: Entity, C: DataContext> RepositoryBase<T> for Repository<T, C> {
    async fn add(&self, entity: T, cancel: CancellationToken) -> QueryResult<T> {
        let entity = self.context.insert(entity, cancel.clone()).await?;
        self.save_changes(cancel).await?;
        Ok(entity)
    }

    async fn add_range(&self, entities: Vec<T>, cancel: CancellationToken) -> QueryResult<Vec<T>> {
        let mut added = Vec::with_capacity(entities.len());
        for entity in entities {
            added.push(self.context.insert(entity, cancel.clone()).await?);
        }
        self.save_changes(cancel).await?;
        Ok(added)
    }

    async fn update(&self, entity: T, cancel: CancellationToken) -> QueryResult<()> {
        self.context.update(entity, cancel.clone()).await?;
        self.save_changes(cancel).await?;
        Ok(())
    }

    async fn update_range(&self, entities: Vec<T>, cancel: CancellationToken) -> QueryResult<()> {
        for entity in entities {
            self.context.update(entity, cancel.clone()).await?;
        }
        self.save_changes(cancel).await?;
        Ok(())
    }

    async fn delete(&self, entity: T, cancel: CancellationToken) -> QueryResult<()> {
        self.context.delete(entity, cancel.clone()).await?;
        self.save_changes(cancel).await?;
        Ok(())
    }

    async fn delete_range(&self, entities: Vec<T>, cancel: CancellationToken) -> QueryResult<()> {
        for entity in entities {
            self.context.delete(entity, cancel.clone()).await?;
        }
        self.save_changes(cancel).await?;
        Ok(())
    }

    async fn delete_by_spec(&self, spec: &Specification<T>, cancel: CancellationToken) -> QueryResult<u64> {
        let rows = self.apply(spec, false)?.to_list(cancel.clone()).await?;
        let deleted = rows.len() as u64;
        for row in rows {
            self.context.delete(row, cancel.clone()).await?;
        }
        self.save_changes(cancel).await?;
        debug!(entity = T::NAME, deleted, "delete_by_spec");
        Ok(deleted)
    }

    async fn save_changes(&self, cancel: CancellationToken) -> QueryResult<u64> {
        self.context.commit(cancel).await
    }
}

impl<T: Entity, C: DataContext> Clone for Repository<T, C> {
    fn clone(&self) -> Self {
        Self {
            context: Arc::clone(&self.context),
            evaluator: Arc::clone(&self.evaluator),
            _marker: PhantomData,
        }
    }
}

impl<T: Entity, C: DataContext> fmt::Debug for Repository<T, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Repository")
            .field("entity", &T::NAME)
            .field("evaluator", &self.evaluator)
            .finish_non_exhaustive()
    }
}
