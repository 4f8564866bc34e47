//! The paging evaluator.

use crate::error::QueryResult;
use crate::specification::Specification;
use crate::traits::Queryable;

use super::{Evaluator, EvaluatorKind};

/// Applies skip, then take.
#[derive(Debug, Clone, Copy, Default)]
pub struct PagingEvaluator;

impl<Q: Queryable> Evaluator<Q> for PagingEvaluator {
    fn name(&self) -> &'static str {
        "paging"
    }

    fn kind(&self) -> EvaluatorKind {
        EvaluatorKind::Full
    }

    fn evaluate(&self, mut query: Q, spec: &Specification<Q::Entity>) -> QueryResult<Q> {
        let pagination = spec.pagination();
        if let Some(skip) = pagination.skip {
            query = query.skip(skip);
        }
        if let Some(take) = pagination.take {
            query = query.take(take);
        }
        Ok(query)
    }
}
