//! Include descriptors: one eager-load step each.

use std::fmt;

use crate::entity::{Entity, TypeInfo};
use crate::error::{QueryError, QueryResult};

use super::selector::{ErasedSelector, Selector};

/// Whether an include step starts a navigation chain or continues one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IncludeKind {
    /// First-level navigation from the specification's root entity.
    Include,
    /// Continues the chain from the previous step's property.
    ThenInclude,
}

impl fmt::Display for IncludeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Include => f.write_str("include"),
            Self::ThenInclude => f.write_str("then_include"),
        }
    }
}

/// One eager-load step of a specification.
///
/// Immutable once built. For a [`IncludeKind::ThenInclude`] step the entity
/// type equals the property type of the step before it; that continuity is
/// not checked here and a broken chain fails in the data source's include
/// call instead.
#[derive(Debug, Clone)]
pub struct IncludeDescriptor {
    entity_type: TypeInfo,
    property_type: TypeInfo,
    previous_property_type: Option<TypeInfo>,
    selector: ErasedSelector,
    kind: IncludeKind,
}

impl IncludeDescriptor {
    /// A first-level include of `selector`.
    pub fn include<S: Entity, P: Entity>(selector: &Selector<S, P>) -> Self {
        Self {
            entity_type: TypeInfo::of::<S>(),
            property_type: TypeInfo::of::<P>(),
            previous_property_type: None,
            selector: selector.erase(),
            kind: IncludeKind::Include,
        }
    }

    /// A chained include continuing from a step whose property is `S`.
    pub fn then_include<S: Entity, P: Entity>(selector: &Selector<S, P>) -> Self {
        Self {
            entity_type: TypeInfo::of::<S>(),
            property_type: TypeInfo::of::<P>(),
            previous_property_type: Some(TypeInfo::of::<S>()),
            selector: selector.erase(),
            kind: IncludeKind::ThenInclude,
        }
    }

    /// Assemble a descriptor from runtime parts.
    ///
    /// Nothing is checked here; [`IncludeDescriptor::validate`] runs before
    /// the descriptor is translated.
    pub fn from_parts(
        entity_type: TypeInfo,
        property_type: TypeInfo,
        previous_property_type: Option<TypeInfo>,
        selector: ErasedSelector,
        kind: IncludeKind,
    ) -> Self {
        Self {
            entity_type,
            property_type,
            previous_property_type,
            selector,
            kind,
        }
    }

    /// The entity the navigation starts from.
    #[inline]
    pub fn entity_type(&self) -> TypeInfo {
        self.entity_type
    }

    /// The entity the navigation leads to.
    #[inline]
    pub fn property_type(&self) -> TypeInfo {
        self.property_type
    }

    /// The property type of the step this one continues, if chained.
    #[inline]
    pub fn previous_property_type(&self) -> Option<TypeInfo> {
        self.previous_property_type
    }

    /// The type-erased navigation selector.
    #[inline]
    pub fn selector(&self) -> &ErasedSelector {
        &self.selector
    }

    /// The include kind.
    #[inline]
    pub fn kind(&self) -> IncludeKind {
        self.kind
    }

    /// Navigation path of the selector.
    #[inline]
    pub fn path(&self) -> &str {
        self.selector.path()
    }

    /// Check that the selector's types agree with the declared types.
    pub fn validate(&self) -> QueryResult<()> {
        if self.selector.source() != self.entity_type {
            return Err(QueryError::invalid_descriptor(
                self.path(),
                format!(
                    "selector starts at {} but the descriptor declares {}",
                    self.selector.source(),
                    self.entity_type
                ),
            ));
        }
        if self.selector.property() != self.property_type {
            return Err(QueryError::invalid_descriptor(
                self.path(),
                format!(
                    "selector leads to {} but the descriptor declares {}",
                    self.selector.property(),
                    self.property_type
                ),
            ));
        }
        Ok(())
    }
}

impl fmt::Display for IncludeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}({} -> {}: {})",
            self.kind,
            self.entity_type,
            self.property_type,
            self.path()
        )
    }
}
