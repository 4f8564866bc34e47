//! Typed and type-erased navigation selectors.

use std::any::Any;
use std::borrow::Cow;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use crate::entity::{Entity, TypeInfo};

/// A navigation from `S` to `P`, identified by its member path.
pub struct Selector<S, P> {
    path: Cow<'static, str>,
    _marker: PhantomData<fn(&S) -> P>,
}

impl<S, P> Selector<S, P> {
    /// Create a selector for a statically named navigation.
    pub const fn new(path: &'static str) -> Self {
        Self {
            path: Cow::Borrowed(path),
            _marker: PhantomData,
        }
    }

    /// Create a selector from an owned path.
    pub fn owned(path: String) -> Self {
        Self {
            path: Cow::Owned(path),
            _marker: PhantomData,
        }
    }

    /// The member path of the navigation.
    #[inline]
    pub fn path(&self) -> &str {
        &self.path
    }
}

impl<S: Entity, P: Entity> Selector<S, P> {
    /// Erase the navigation's types into runtime type information.
    pub fn erase(&self) -> ErasedSelector {
        ErasedSelector {
            source: TypeInfo::of::<S>(),
            property: TypeInfo::of::<P>(),
            path: self.path.clone(),
            typed: Arc::new(self.clone()),
        }
    }
}

impl<S, P> Clone for Selector<S, P> {
    fn clone(&self) -> Self {
        Self {
            path: self.path.clone(),
            _marker: PhantomData,
        }
    }
}

impl<S: 'static, P: 'static> fmt::Debug for Selector<S, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Selector({} -> {}: {})",
            TypeInfo::of::<S>(),
            TypeInfo::of::<P>(),
            self.path
        )
    }
}

/// A navigation selector whose types are known only at runtime.
#[derive(Clone)]
pub struct ErasedSelector {
    source: TypeInfo,
    property: TypeInfo,
    path: Cow<'static, str>,
    typed: Arc<dyn Any + Send + Sync>,
}

impl ErasedSelector {
    /// The entity the navigation starts from.
    #[inline]
    pub fn source(&self) -> TypeInfo {
        self.source
    }

    /// The entity the navigation leads to.
    #[inline]
    pub fn property(&self) -> TypeInfo {
        self.property
    }

    /// The member path of the navigation.
    #[inline]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Recover the typed selector, if `S` and `P` are its actual types.
    pub fn downcast<S: 'static, P: 'static>(&self) -> Option<&Selector<S, P>> {
        self.typed.downcast_ref::<Selector<S, P>>()
    }
}

impl fmt::Debug for ErasedSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ErasedSelector({} -> {}: {})", self.source, self.property, self.path)
    }
}
