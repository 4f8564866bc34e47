//! The order evaluator.

use crate::error::QueryResult;
use crate::specification::Specification;
use crate::traits::Queryable;

use super::{Evaluator, EvaluatorKind};

/// Applies the specification's ordering when one is set.
#[derive(Debug, Clone, Copy, Default)]
pub struct OrderEvaluator;

impl<Q: Queryable> Evaluator<Q> for OrderEvaluator {
    fn name(&self) -> &'static str {
        "order"
    }

    fn kind(&self) -> EvaluatorKind {
        EvaluatorKind::Full
    }

    fn evaluate(&self, query: Q, spec: &Specification<Q::Entity>) -> QueryResult<Q> {
        if spec.order().is_empty() {
            return Ok(query);
        }
        Ok(query.order_by(spec.order().clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::*;
    use crate::types::{OrderBy, OrderByField};

    #[test]
    fn test_empty_order_is_skipped() {
        let query = OrderEvaluator
            .evaluate(MockQuery::<Order>::new(), &Specification::<Order>::new())
            .unwrap();
        assert!(query.steps.is_empty());
    }

    #[test]
    fn test_applies_order() {
        let spec = Specification::<Order>::builder()
            .order_by(OrderByField::desc("total"))
            .build();
        let query = OrderEvaluator.evaluate(MockQuery::<Order>::new(), &spec).unwrap();
        assert_eq!(
            query.steps,
            vec![Step::OrderBy(OrderBy::Field(OrderByField::desc("total")))]
        );
    }
}
