//! Repository factories.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use sift_query::{
    ContextFactory, DataContext, Entity, IncludeStrategy, QueryResult, SiftConfig,
    SpecificationEvaluator,
};
use tracing::debug;

use crate::repository::{Repository, RepositoryBase};

/// Creates repositories over `T`.
pub trait RepositoryFactory<T: Entity>: Send + Sync {
    /// The repository type produced.
    type Repository: RepositoryBase<T>;

    /// Create a repository backed by a fresh unit of work.
    fn create_repository(&self) -> QueryResult<Self::Repository>;
}

type SharedEvaluator = Arc<dyn Any + Send + Sync>;

type QueryOf<F, T> = <<F as ContextFactory>::Context as DataContext>::Query<T>;

/// Creates [`Repository`]s, each over a fresh context from a
/// [`ContextFactory`].
///
/// Repositories over the same entity share one evaluator, and with it one
/// translation cache.
pub struct ContextRepositoryFactory<F: ContextFactory> {
    contexts: F,
    strategy: IncludeStrategy,
    evaluators: Mutex<HashMap<TypeId, SharedEvaluator>>,
}

impl<F: ContextFactory> ContextRepositoryFactory<F> {
    /// A factory over `contexts` with the default include strategy.
    pub fn new(contexts: F) -> Self {
        Self::with_strategy(contexts, IncludeStrategy::default())
    }

    /// A factory over `contexts` using `strategy` for includes.
    pub fn with_strategy(contexts: F, strategy: IncludeStrategy) -> Self {
        Self {
            contexts,
            strategy,
            evaluators: Mutex::new(HashMap::new()),
        }
    }

    /// A factory over `contexts` configured from `config`.
    pub fn from_config(contexts: F, config: &SiftConfig) -> Self {
        Self::with_strategy(contexts, config.include_strategy())
    }

    /// The include strategy of repositories created here.
    pub fn strategy(&self) -> IncludeStrategy {
        self.strategy
    }

    /// The underlying context factory.
    pub fn contexts(&self) -> &F {
        &self.contexts
    }

    /// A repository over `T` backed by a fresh context.
    pub fn repository<T: Entity>(&self) -> QueryResult<Repository<T, F::Context>> {
        let context = Arc::new(self.contexts.create_context()?);
        Ok(Repository::with_evaluator(context, self.evaluator::<T>()))
    }

    /// A repository over `T` joining the unit of work of `context`.
    pub fn repository_in<T: Entity>(&self, context: Arc<F::Context>) -> Repository<T, F::Context> {
        Repository::with_evaluator(context, self.evaluator::<T>())
    }

    fn evaluator<T: Entity>(&self) -> Arc<SpecificationEvaluator<QueryOf<F, T>>> {
        let shared = self
            .evaluators
            .lock()
            .entry(TypeId::of::<T>())
            .or_insert_with(|| {
                debug!(entity = T::NAME, strategy = %self.strategy, "creating evaluator");
                Arc::new(SpecificationEvaluator::<QueryOf<F, T>>::new(self.strategy)) as SharedEvaluator
            })
            .clone();

        // Entries are keyed by entity type, so the downcast only fails if
        // the map was populated with a foreign evaluator type.
        match shared.downcast::<SpecificationEvaluator<QueryOf<F, T>>>() {
            Ok(evaluator) => evaluator,
            Err(_) => Arc::new(SpecificationEvaluator::new(self.strategy)),
        }
    }
}

impl<T: Entity, F: ContextFactory> RepositoryFactory<T> for ContextRepositoryFactory<F> {
    type Repository = Repository<T, F::Context>;

    fn create_repository(&self) -> QueryResult<Self::Repository> {
        self.repository::<T>()
    }
}

impl<F: ContextFactory + Default> Default for ContextRepositoryFactory<F> {
    fn default() -> Self {
        Self::new(F::default())
    }
}

impl<F: ContextFactory + fmt::Debug> fmt::Debug for ContextRepositoryFactory<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContextRepositoryFactory")
            .field("contexts", &self.contexts)
            .field("strategy", &self.strategy)
            .field("evaluators", &self.evaluators.lock().len())
            .finish()
    }
}
