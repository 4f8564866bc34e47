//! Include translation registry.
//!
//! A data source's include operation is a generic call, `include::<S, P>()`,
//! while an [`IncludeDescriptor`](crate::relations::IncludeDescriptor) only
//! carries the runtime identity of `S` and `P`. A [`TranslationSet`] bridges
//! the two: it holds one monomorphized call per `(source, property)` shape the
//! application can eager-load, found by walking the entities' declared
//! navigations. Resolving a shape picks the unique matching [`Translation`];
//! specializing it yields an [`Invoker`] that can be called repeatedly.
//!
//! ```rust,ignore
//! let translations = TranslationSet::<MyQuery<Order>>::for_root();
//! let invoker = translations
//!     .resolve(TypeInfo::of::<Order>(), TypeInfo::of::<Customer>())?
//!     .specialize();
//! let query = invoker(query, &CUSTOMER.erase())?;
//! ```

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use tracing::{debug, trace};

use crate::entity::{Entity, NavigationVisitor, TypeInfo};
use crate::error::{QueryError, QueryResult};
use crate::relations::{ErasedSelector, Selector};
use crate::traits::Queryable;

/// A specialized, type-erased include call.
pub type Invoker<Q> = Arc<dyn Fn(Q, &ErasedSelector) -> QueryResult<Q> + Send + Sync>;

/// The raw translation call. `None` means the selector is not of the
/// translation's types.
type TranslationCall<Q> = Arc<dyn Fn(Q, &ErasedSelector) -> Option<QueryResult<Q>> + Send + Sync>;

/// Where a translation came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TranslationOrigin {
    /// Forwards to [`Queryable::include`].
    Standard,
    /// Registered with [`TranslationSet::register_with`].
    Custom,
}

/// One include call for a fixed `(source, property)` shape.
pub struct Translation<Q> {
    source: TypeInfo,
    property: TypeInfo,
    origin: TranslationOrigin,
    call: TranslationCall<Q>,
}

impl<Q> Clone for Translation<Q> {
    fn clone(&self) -> Self {
        Self {
            source: self.source,
            property: self.property,
            origin: self.origin,
            call: Arc::clone(&self.call),
        }
    }
}

impl<Q> fmt::Debug for Translation<Q> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Translation")
            .field("source", &self.source)
            .field("property", &self.property)
            .field("origin", &self.origin)
            .finish()
    }
}

impl<Q: Queryable> Translation<Q> {
    /// The `(source, property)` shape this translation serves.
    #[inline]
    pub fn shape(&self) -> (TypeInfo, TypeInfo) {
        (self.source, self.property)
    }

    /// Where the translation came from.
    #[inline]
    pub fn origin(&self) -> TranslationOrigin {
        self.origin
    }

    /// Whether the translation serves the given shape.
    #[inline]
    pub fn matches(&self, entity: TypeInfo, property: TypeInfo) -> bool {
        self.source == entity && self.property == property
    }

    /// Bind the translation into a callable invoker.
    ///
    /// The invoker fails with `InvocationFailure` when the selector does not
    /// downcast to the translation's types, or when the data source rejects
    /// the include; the data source's error is kept as the source.
    pub fn specialize(&self) -> Invoker<Q> {
        debug!(source = %self.source, property = %self.property, "specializing include translation");
        let call = Arc::clone(&self.call);
        let (source, property) = self.shape();
        Arc::new(move |query: Q, selector: &ErasedSelector| match call(query, selector) {
            Some(Ok(query)) => Ok(query),
            Some(Err(err)) => {
                let message = err.to_string();
                Err(QueryError::invocation(selector.path(), message)
                    .with_entity(source.name())
                    .with_source(err))
            }
            None => Err(QueryError::invocation(
                selector.path(),
                format!(
                    "translation for {} -> {} produced no query for {:?}",
                    source, property, selector
                ),
            )
            .with_entity(source.name())),
        })
    }
}

fn include_translation<Q: Queryable, S: Entity, P: Entity>(
    query: Q,
    selector: &ErasedSelector,
) -> Option<QueryResult<Q>> {
    let typed = selector.downcast::<S, P>()?;
    Some(query.include(typed))
}

/// The include translations available to a queryable type.
pub struct TranslationSet<Q> {
    entries: Vec<Translation<Q>>,
}

impl<Q> Clone for TranslationSet<Q> {
    fn clone(&self) -> Self {
        Self {
            entries: self.entries.clone(),
        }
    }
}

impl<Q> Default for TranslationSet<Q> {
    fn default() -> Self {
        Self { entries: Vec::new() }
    }
}

impl<Q> fmt::Debug for TranslationSet<Q> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(&self.entries).finish()
    }
}

impl<Q: Queryable> TranslationSet<Q> {
    /// An empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// The navigations reachable from the query's root entity.
    pub fn for_root() -> Self {
        Self::new().with_entity::<Q::Entity>()
    }

    /// Add the navigations reachable from `E`, transitively.
    pub fn with_entity<E: Entity>(mut self) -> Self {
        let mut collector = Collector {
            set: &mut self,
            visited: HashSet::new(),
        };
        collector.visited.insert(TypeInfo::of::<E>());
        E::navigations(&mut collector);
        debug!(root = E::NAME, translations = self.entries.len(), "collected include translations");
        self
    }

    /// Add the standard translation for `S -> P`. Registering it twice is a
    /// no-op.
    pub fn register<S: Entity, P: Entity>(&mut self) -> &mut Self {
        let (source, property) = (TypeInfo::of::<S>(), TypeInfo::of::<P>());
        let exists = self
            .candidates(source, property)
            .any(|t| t.origin == TranslationOrigin::Standard);
        if !exists {
            trace!(%source, %property, "registering include translation");
            self.entries.push(Translation {
                source,
                property,
                origin: TranslationOrigin::Standard,
                call: Arc::new(include_translation::<Q, S, P>),
            });
        }
        self
    }

    /// Add a custom translation for `S -> P`.
    ///
    /// A custom translation does not replace the standard one; a shape with
    /// more than one translation fails to resolve.
    pub fn register_with<S, P, F>(&mut self, f: F) -> &mut Self
    where
        S: Entity,
        P: Entity,
        F: Fn(Q, &Selector<S, P>) -> QueryResult<Q> + Send + Sync + 'static,
    {
        let call = move |query: Q, selector: &ErasedSelector| {
            selector.downcast::<S, P>().map(|typed| f(query, typed))
        };
        self.entries.push(Translation {
            source: TypeInfo::of::<S>(),
            property: TypeInfo::of::<P>(),
            origin: TranslationOrigin::Custom,
            call: Arc::new(call),
        });
        self
    }

    /// Translations serving the given shape.
    pub fn candidates(
        &self,
        entity: TypeInfo,
        property: TypeInfo,
    ) -> impl Iterator<Item = &Translation<Q>> + '_ {
        self.entries.iter().filter(move |t| t.matches(entity, property))
    }

    /// The unique translation for the given shape.
    pub fn resolve(&self, entity: TypeInfo, property: TypeInfo) -> QueryResult<Translation<Q>> {
        let candidates: Vec<_> = self.candidates(entity, property).collect();
        match candidates.as_slice() {
            [translation] => {
                debug!(%entity, %property, "resolved include translation");
                Ok((*translation).clone())
            }
            [] => Err(QueryError::unresolved_translation(entity, property)),
            many => Err(QueryError::ambiguous_translation(entity, property, many.len())),
        }
    }

    /// All registered translations.
    pub fn iter(&self) -> impl Iterator<Item = &Translation<Q>> + '_ {
        self.entries.iter()
    }

    /// Number of registered translations.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no translation is registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

struct Collector<'a, Q> {
    set: &'a mut TranslationSet<Q>,
    visited: HashSet<TypeInfo>,
}

impl<Q: Queryable, S: Entity> NavigationVisitor<S> for Collector<'_, Q> {
    fn visit<P: Entity>(&mut self, name: &'static str) {
        trace!(source = S::NAME, property = P::NAME, navigation = name, "visiting navigation");
        self.set.register::<S, P>();
        if self.visited.insert(TypeInfo::of::<P>()) {
            P::navigations(self);
        }
    }
}
