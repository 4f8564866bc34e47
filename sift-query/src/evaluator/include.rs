//! The include evaluator: applies eager-load descriptors to a query.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::cache::{CacheKey, TranslationCache};
use crate::error::{QueryError, QueryResult};
use crate::relations::IncludeDescriptor;
use crate::specification::Specification;
use crate::traits::Queryable;
use crate::translation::{Invoker, TranslationSet};

use super::{Evaluator, EvaluatorKind};

/// How the include evaluator obtains invokers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IncludeStrategy {
    /// Resolve and specialize on every call.
    Direct,
    /// Resolve and specialize once per navigation shape.
    #[default]
    Cached,
}

impl IncludeStrategy {
    /// The configuration name of the strategy.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Direct => "direct",
            Self::Cached => "cached",
        }
    }
}

impl fmt::Display for IncludeStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IncludeStrategy {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "direct" => Ok(Self::Direct),
            "cached" => Ok(Self::Cached),
            other => Err(QueryError::configuration(format!(
                "unknown include strategy '{}', expected 'direct' or 'cached'",
                other
            ))),
        }
    }
}

enum Mode<Q> {
    Direct,
    Cached(Arc<TranslationCache<Q>>),
}

/// Applies a specification's include descriptors in order.
///
/// Each descriptor is validated, its navigation shape is resolved to a
/// translation, and the specialized invoker is called with the query built so
/// far. With [`IncludeStrategy::Cached`] the invoker comes from a shared
/// [`TranslationCache`]; both strategies produce the same query.
pub struct IncludeEvaluator<Q> {
    translations: Arc<TranslationSet<Q>>,
    mode: Mode<Q>,
}

impl<Q: Queryable> IncludeEvaluator<Q> {
    /// An evaluator over the root entity's navigations with a fresh cache.
    pub fn new(strategy: IncludeStrategy) -> Self {
        let translations = Arc::new(TranslationSet::for_root());
        match strategy {
            IncludeStrategy::Direct => Self::direct(translations),
            IncludeStrategy::Cached => Self::cached(translations, Arc::new(TranslationCache::new())),
        }
    }

    /// An evaluator that specializes on every call.
    pub fn direct(translations: Arc<TranslationSet<Q>>) -> Self {
        Self {
            translations,
            mode: Mode::Direct,
        }
    }

    /// An evaluator that memoizes invokers in `cache`.
    pub fn cached(translations: Arc<TranslationSet<Q>>, cache: Arc<TranslationCache<Q>>) -> Self {
        Self {
            translations,
            mode: Mode::Cached(cache),
        }
    }

    /// The strategy this evaluator was built with.
    pub fn strategy(&self) -> IncludeStrategy {
        match self.mode {
            Mode::Direct => IncludeStrategy::Direct,
            Mode::Cached(_) => IncludeStrategy::Cached,
        }
    }

    /// The translations available to this evaluator.
    pub fn translations(&self) -> &TranslationSet<Q> {
        &self.translations
    }

    /// The invoker cache, when cached.
    pub fn cache(&self) -> Option<&Arc<TranslationCache<Q>>> {
        match &self.mode {
            Mode::Direct => None,
            Mode::Cached(cache) => Some(cache),
        }
    }

    /// Apply `descriptors` to `query` in order.
    ///
    /// An empty list returns the query unchanged. The first failing step
    /// aborts the whole application.
    pub fn apply(&self, query: Q, descriptors: &[IncludeDescriptor]) -> QueryResult<Q> {
        descriptors.iter().try_fold(query, |query, descriptor| {
            descriptor.validate()?;
            let invoker = self.invoker(descriptor)?;
            trace!(%descriptor, "applying include");
            invoker(query, descriptor.selector())
        })
    }

    fn invoker(&self, descriptor: &IncludeDescriptor) -> QueryResult<Invoker<Q>> {
        let (entity, property) = (descriptor.entity_type(), descriptor.property_type());
        match &self.mode {
            Mode::Direct => Ok(self.translations.resolve(entity, property)?.specialize()),
            Mode::Cached(cache) => cache.get_or_create(CacheKey::new(entity, property), || {
                Ok(self.translations.resolve(entity, property)?.specialize())
            }),
        }
    }
}

impl<Q: Queryable> Evaluator<Q> for IncludeEvaluator<Q> {
    fn name(&self) -> &'static str {
        "include"
    }

    fn kind(&self) -> EvaluatorKind {
        EvaluatorKind::Full
    }

    fn evaluate(&self, query: Q, spec: &Specification<Q::Entity>) -> QueryResult<Q> {
        if !spec.include_strings().is_empty() {
            debug!(
                paths = ?spec.include_strings(),
                "string include paths are not translated"
            );
        }
        self.apply(query, spec.includes())
    }
}

impl<Q> fmt::Debug for IncludeEvaluator<Q> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("IncludeEvaluator");
        s.field("translations", &self.translations);
        match &self.mode {
            Mode::Direct => s.field("strategy", &IncludeStrategy::Direct),
            Mode::Cached(cache) => s.field("strategy", &IncludeStrategy::Cached).field("cache", cache),
        };
        s.finish()
    }
}
