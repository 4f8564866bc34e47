//! Specification evaluation.
//!
//! A specification is applied to a query by a fixed, ordered list of facet
//! evaluators. The default list is:
//!
//! | Evaluator | Kind | Applies |
//! |-----------|------|---------|
//! | [`WhereEvaluator`] | criteria | every where-filter |
//! | [`IncludeEvaluator`] | full | include descriptors |
//! | [`OrderEvaluator`] | full | the ordering, when set |
//! | [`PagingEvaluator`] | full | skip, then take |
//!
//! Criteria-only evaluation runs the criteria evaluators alone; it is what
//! counting and existence checks use.

mod criteria;
mod include;
mod order;
mod paging;

pub use criteria::WhereEvaluator;
pub use include::{IncludeEvaluator, IncludeStrategy};
pub use order::OrderEvaluator;
pub use paging::PagingEvaluator;

use std::fmt;
use std::sync::Arc;

use tracing::{debug, trace};

use crate::config::SiftConfig;
use crate::error::QueryResult;
use crate::projection::Projected;
use crate::specification::{ProjectedSpecification, Specification};
use crate::traits::Queryable;

/// Whether an evaluator shapes the row set or only decorates the query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EvaluatorKind {
    /// Restricts which rows match; runs for criteria-only evaluation.
    Criteria,
    /// Runs for full evaluation only.
    Full,
}

/// One facet of specification evaluation.
pub trait Evaluator<Q: Queryable>: Send + Sync {
    /// Name used in logs.
    fn name(&self) -> &'static str;

    /// The evaluator's kind.
    fn kind(&self) -> EvaluatorKind;

    /// Apply this facet of `spec` to `query`.
    fn evaluate(&self, query: Q, spec: &Specification<Q::Entity>) -> QueryResult<Q>;
}

/// Applies specifications to queries through an ordered list of evaluators.
pub struct SpecificationEvaluator<Q> {
    evaluators: Vec<Arc<dyn Evaluator<Q>>>,
}

impl<Q: Queryable> SpecificationEvaluator<Q> {
    /// The default evaluators with the given include strategy.
    pub fn new(strategy: IncludeStrategy) -> Self {
        Self::with_include_evaluator(IncludeEvaluator::new(strategy))
    }

    /// The default evaluators, configured from `config`.
    pub fn from_config(config: &SiftConfig) -> Self {
        Self::new(config.include_strategy())
    }

    /// The default evaluators around a prepared include evaluator.
    ///
    /// Use this to share one translation cache between evaluators.
    pub fn with_include_evaluator(include: IncludeEvaluator<Q>) -> Self {
        debug!(strategy = %include.strategy(), "building specification evaluator");
        Self::with_evaluators(vec![
            Arc::new(WhereEvaluator),
            Arc::new(include),
            Arc::new(OrderEvaluator),
            Arc::new(PagingEvaluator),
        ])
    }

    /// A custom, ordered list of evaluators.
    pub fn with_evaluators(evaluators: Vec<Arc<dyn Evaluator<Q>>>) -> Self {
        Self { evaluators }
    }

    /// The registered evaluators, in application order.
    pub fn evaluators(&self) -> &[Arc<dyn Evaluator<Q>>] {
        &self.evaluators
    }

    /// Apply every facet of `spec` to `query`.
    pub fn get_query(&self, query: Q, spec: &Specification<Q::Entity>) -> QueryResult<Q> {
        self.get_query_with(query, spec, false)
    }

    /// Apply `spec` to `query`, optionally limited to the criteria facets.
    pub fn get_query_with(
        &self,
        query: Q,
        spec: &Specification<Q::Entity>,
        criteria_only: bool,
    ) -> QueryResult<Q> {
        self.evaluators
            .iter()
            .filter(|evaluator| !criteria_only || evaluator.kind() == EvaluatorKind::Criteria)
            .try_fold(query, |query, evaluator| {
                trace!(evaluator = evaluator.name(), criteria_only, "evaluating");
                evaluator.evaluate(query, spec)
            })
    }

    /// Apply every facet of `spec` to `query` and attach its projection.
    pub fn get_projected_query<R>(
        &self,
        query: Q,
        spec: &ProjectedSpecification<Q::Entity, R>,
    ) -> QueryResult<Projected<Q, R>> {
        let query = self.get_query(query, spec.specification())?;
        Ok(Projected::new(query, Arc::clone(spec.selector())))
    }
}

impl<Q: Queryable> Default for SpecificationEvaluator<Q> {
    fn default() -> Self {
        Self::new(IncludeStrategy::default())
    }
}

impl<Q: Queryable> fmt::Debug for SpecificationEvaluator<Q> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<_> = self.evaluators.iter().map(|e| e.name()).collect();
        f.debug_struct("SpecificationEvaluator")
            .field("evaluators", &names)
            .finish()
    }
}
