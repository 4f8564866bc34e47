//! Units of work against the in-memory store.

use std::fmt;

use parking_lot::Mutex;
use sift_query::{BoxFuture, ContextFactory, DataContext, Entity, QueryError, QueryResult};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::query::MemoryQuery;
use crate::store::{self, Change, MemoryStore, Tables};

/// A unit of work: queries read committed rows, writes are staged until
/// [`DataContext::commit`] applies them atomically.
pub struct MemoryContext {
    store: MemoryStore,
    pending: Mutex<Vec<Change>>,
}

impl MemoryContext {
    /// A context over `store`.
    pub fn new(store: MemoryStore) -> Self {
        Self {
            store,
            pending: Mutex::new(Vec::new()),
        }
    }

    /// The underlying store.
    pub fn store(&self) -> &MemoryStore {
        &self.store
    }

    /// Number of staged, uncommitted writes.
    pub fn pending(&self) -> usize {
        self.pending.lock().len()
    }

    /// Drop every staged write.
    pub fn rollback(&self) -> usize {
        let dropped = std::mem::take(&mut *self.pending.lock()).len();
        debug!(dropped, "memory context rolled back");
        dropped
    }

    fn stage(
        &self,
        operation: &'static str,
        entity: &'static str,
        change: Change,
        cancel: &CancellationToken,
    ) -> QueryResult<()> {
        if cancel.is_cancelled() {
            return Err(QueryError::cancelled(operation).with_entity(entity));
        }
        self.pending.lock().push(change);
        debug!(operation, entity, "memory write staged");
        Ok(())
    }
}

impl DataContext for MemoryContext {
    type Query<T: Entity> = MemoryQuery<T>;

    fn query<T: Entity>(&self) -> MemoryQuery<T> {
        MemoryQuery::new(self.store.clone())
    }

    fn insert<T: Entity>(&self, entity: T, cancel: CancellationToken) -> BoxFuture<'_, QueryResult<T>> {
        Box::pin(async move {
            let row = entity.clone();
            let change: Change = Box::new(move |tables: &mut Tables| store::insert_row(tables, row));
            self.stage("insert", T::NAME, change, &cancel)?;
            Ok(entity)
        })
    }

    fn update<T: Entity>(&self, entity: T, cancel: CancellationToken) -> BoxFuture<'_, QueryResult<()>> {
        Box::pin(async move {
            let change: Change = Box::new(move |tables: &mut Tables| store::update_row(tables, entity));
            self.stage("update", T::NAME, change, &cancel)
        })
    }

    fn delete<T: Entity>(&self, entity: T, cancel: CancellationToken) -> BoxFuture<'_, QueryResult<()>> {
        Box::pin(async move {
            let change: Change = Box::new(move |tables: &mut Tables| store::delete_row(tables, entity));
            self.stage("delete", T::NAME, change, &cancel)
        })
    }

    fn commit(&self, cancel: CancellationToken) -> BoxFuture<'_, QueryResult<u64>> {
        Box::pin(async move {
            if cancel.is_cancelled() {
                return Err(QueryError::cancelled("commit"));
            }
            let changes = std::mem::take(&mut *self.pending.lock());
            let written = self.store.apply(changes)?;
            info!(written, "memory context committed");
            Ok(written)
        })
    }
}

impl fmt::Debug for MemoryContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryContext")
            .field("store", &self.store)
            .field("pending", &self.pending())
            .finish()
    }
}

/// Creates [`MemoryContext`]s over one shared store.
#[derive(Debug, Clone, Default)]
pub struct MemoryContextFactory {
    store: MemoryStore,
}

impl MemoryContextFactory {
    /// A factory over `store`.
    pub fn new(store: MemoryStore) -> Self {
        Self { store }
    }

    /// The shared store.
    pub fn store(&self) -> &MemoryStore {
        &self.store
    }
}

impl ContextFactory for MemoryContextFactory {
    type Context = MemoryContext;

    fn create_context(&self) -> QueryResult<MemoryContext> {
        Ok(MemoryContext::new(self.store.clone()))
    }
}
