//! Shared typed tables.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use sift_query::{Entity, FilterValue};
use tracing::debug;

use crate::error::{MemoryError, MemoryResult};

pub(crate) trait AnyTable: Send + Sync {
    fn clone_table(&self) -> Box<dyn AnyTable>;
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

struct Table<T> {
    rows: Vec<T>,
}

impl<T: Entity> AnyTable for Table<T> {
    fn clone_table(&self) -> Box<dyn AnyTable> {
        Box::new(Table {
            rows: self.rows.clone(),
        })
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

pub(crate) type Tables = HashMap<TypeId, Box<dyn AnyTable>>;

/// A staged write, applied on commit.
pub(crate) type Change = Box<dyn FnOnce(&mut Tables) -> MemoryResult<()> + Send>;

fn rows<T: Entity>(tables: &Tables) -> &[T] {
    tables
        .get(&TypeId::of::<T>())
        .and_then(|table| table.as_any().downcast_ref::<Table<T>>())
        .map(|table| table.rows.as_slice())
        .unwrap_or(&[])
}

fn rows_mut<T: Entity>(tables: &mut Tables) -> &mut Vec<T> {
    let table = tables
        .entry(TypeId::of::<T>())
        .or_insert_with(|| Box::new(Table::<T> { rows: Vec::new() }));
    match table.as_any_mut().downcast_mut::<Table<T>>() {
        Some(table) => &mut table.rows,
        None => unreachable!("tables are keyed by their row type"),
    }
}

fn render_key(key: &FilterValue) -> String {
    match key {
        FilterValue::Int(i) => i.to_string(),
        FilterValue::String(s) => s.clone(),
        other => format!("{:?}", other),
    }
}

fn key_of<T: Entity>(row: &T) -> MemoryResult<FilterValue> {
    let key = row.primary_key();
    if key.is_null() {
        return Err(MemoryError::NullKey { entity: T::NAME });
    }
    Ok(key)
}

fn position<T: Entity>(rows: &[T], key: &FilterValue) -> Option<usize> {
    rows.iter().position(|row| &row.primary_key() == key)
}

pub(crate) fn insert_row<T: Entity>(tables: &mut Tables, row: T) -> MemoryResult<()> {
    let key = key_of(&row)?;
    let rows = rows_mut::<T>(tables);
    if position(rows, &key).is_some() {
        return Err(MemoryError::DuplicateKey {
            entity: T::NAME,
            key: render_key(&key),
        });
    }
    rows.push(row);
    Ok(())
}

pub(crate) fn update_row<T: Entity>(tables: &mut Tables, row: T) -> MemoryResult<()> {
    let key = key_of(&row)?;
    let rows = rows_mut::<T>(tables);
    match position(rows, &key) {
        Some(index) => {
            rows[index] = row;
            Ok(())
        }
        None => Err(MemoryError::MissingRow {
            entity: T::NAME,
            key: render_key(&key),
        }),
    }
}

pub(crate) fn delete_row<T: Entity>(tables: &mut Tables, row: T) -> MemoryResult<()> {
    let key = key_of(&row)?;
    let rows = rows_mut::<T>(tables);
    match position(rows, &key) {
        Some(index) => {
            rows.remove(index);
            Ok(())
        }
        None => Err(MemoryError::MissingRow {
            entity: T::NAME,
            key: render_key(&key),
        }),
    }
}

/// Committed rows, one table per entity type.
///
/// Cloning the store clones the handle; every clone sees the same tables.
#[derive(Clone, Default)]
pub struct MemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl MemoryStore {
    /// An empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert rows directly, bypassing any context.
    pub fn seed<T: Entity>(&self, rows: impl IntoIterator<Item = T>) -> MemoryResult<usize> {
        let changes: Vec<Change> = rows
            .into_iter()
            .map(|row| Box::new(move |tables: &mut Tables| insert_row(tables, row)) as Change)
            .collect();
        let count = self.apply(changes)?;
        Ok(count as usize)
    }

    /// A snapshot of the committed rows of `T`.
    pub fn rows<T: Entity>(&self) -> Vec<T> {
        rows::<T>(&self.tables.read()).to_vec()
    }

    /// Number of committed rows of `T`.
    pub fn len<T: Entity>(&self) -> usize {
        rows::<T>(&self.tables.read()).len()
    }

    /// Whether `T` has no committed rows.
    pub fn is_empty<T: Entity>(&self) -> bool {
        self.len::<T>() == 0
    }

    /// Apply `changes` atomically: either all succeed or none is visible.
    pub(crate) fn apply(&self, changes: Vec<Change>) -> MemoryResult<u64> {
        let mut tables = self.tables.write();
        let mut scratch: Tables = tables
            .iter()
            .map(|(id, table)| (*id, table.clone_table()))
            .collect();

        let count = changes.len() as u64;
        for change in changes {
            change(&mut scratch)?;
        }
        *tables = scratch;
        debug!(changes = count, "memory store committed");
        Ok(count)
    }
}

impl fmt::Debug for MemoryStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryStore")
            .field("tables", &self.tables.read().len())
            .finish()
    }
}
