//! The where evaluator.

use tracing::trace;

use crate::error::QueryResult;
use crate::specification::Specification;
use crate::traits::Queryable;

use super::{Evaluator, EvaluatorKind};

/// Applies every where-filter of a specification, in order.
///
/// This is the only built-in criteria evaluator, so it is the only one that
/// runs for criteria-only evaluation.
#[derive(Debug, Clone, Copy, Default)]
pub struct WhereEvaluator;

impl<Q: Queryable> Evaluator<Q> for WhereEvaluator {
    fn name(&self) -> &'static str {
        "where"
    }

    fn kind(&self) -> EvaluatorKind {
        EvaluatorKind::Criteria
    }

    fn evaluate(&self, query: Q, spec: &Specification<Q::Entity>) -> QueryResult<Q> {
        trace!(filters = spec.filters().len(), "applying where filters");
        Ok(spec
            .filters()
            .iter()
            .cloned()
            .fold(query, |query, filter| query.filter(filter)))
    }
}
