use std::collections::HashMap;
use std::path::Path;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::info;

use super::record::{compare_values, matches_all, project};
use super::{Query, Record, RecordStore, StoreError, Update};

/// In-process store over JSON fixture tables, shaped like a json-server `db.json`:
/// `{ "accounts": [ {...}, ... ], "debt": [ ... ], ... }`.
///
/// Each call holds the table lock for its whole duration, so an update is applied
/// atomically with respect to concurrent selects.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<HashMap<String, Vec<Record>>>,
}

impl MemoryStore {
    pub fn new(tables: HashMap<String, Vec<Record>>) -> Self {
        Self { tables: RwLock::new(tables) }
    }

    pub fn from_json(document: Value) -> Result<Self, StoreError> {
        let Value::Object(root) = document else {
            return Err(StoreError::Fixture("fixture root must be an object of tables".to_string()));
        };

        let mut tables = HashMap::with_capacity(root.len());
        for (name, rows) in root {
            let Value::Array(rows) = rows else {
                return Err(StoreError::Fixture(format!("table '{}' must be an array", name)));
            };
            let records = rows
                .into_iter()
                .map(|row| match row {
                    Value::Object(record) => Ok(record),
                    other => Err(StoreError::Fixture(format!("table '{}' holds a non-object row: {}", name, other))),
                })
                .collect::<Result<Vec<_>, _>>()?;
            tables.insert(name, records);
        }
        Ok(Self::new(tables))
    }

    pub async fn load(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        let raw = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| StoreError::Fixture(format!("{}: {}", path.display(), e)))?;
        let document: Value = serde_json::from_str(&raw)
            .map_err(|e| StoreError::Fixture(format!("{}: {}", path.display(), e)))?;
        let store = Self::from_json(document)?;
        info!(path = %path.display(), tables = store.tables.read().await.len(), "Loaded fixture store");
        Ok(store)
    }

    /// Snapshot of a table, mainly for assertions in tests.
    pub async fn rows(&self, table: &str) -> Option<Vec<Record>> {
        self.tables.read().await.get(table).cloned()
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn select(&self, query: &Query) -> Result<Vec<Record>, StoreError> {
        let tables = self.tables.read().await;
        let rows = tables.get(&query.table).ok_or_else(|| StoreError::UnknownTable(query.table.clone()))?;

        let mut selected: Vec<&Record> = rows.iter().filter(|r| matches_all(r, &query.conditions)).collect();
        if !query.order.is_empty() {
            selected.sort_by(|a, b| {
                query
                    .order
                    .iter()
                    .map(|o| {
                        let left = a.get(&o.column).unwrap_or(&Value::Null);
                        let right = b.get(&o.column).unwrap_or(&Value::Null);
                        match o.direction {
                            super::SortDirection::Asc => compare_values(left, right),
                            super::SortDirection::Desc => compare_values(right, left),
                        }
                    })
                    .find(|ord| ord.is_ne())
                    .unwrap_or(std::cmp::Ordering::Equal)
            });
        }

        let (skip, take) = match query.range {
            Some(range) => (range.offset().max(0) as usize, range.limit() as usize),
            None => (0, usize::MAX),
        };

        Ok(selected
            .into_iter()
            .skip(skip)
            .take(take)
            .map(|r| project(r, &query.columns))
            .collect())
    }

    async fn count(&self, query: &Query) -> Result<i64, StoreError> {
        let tables = self.tables.read().await;
        let rows = tables.get(&query.table).ok_or_else(|| StoreError::UnknownTable(query.table.clone()))?;
        Ok(rows.iter().filter(|r| matches_all(r, &query.conditions)).count() as i64)
    }

    async fn update(&self, update: &Update) -> Result<Vec<Record>, StoreError> {
        let mut tables = self.tables.write().await;
        let rows = tables.get_mut(&update.table).ok_or_else(|| StoreError::UnknownTable(update.table.clone()))?;

        let mut returned = Vec::new();
        for row in rows.iter_mut().filter(|r| matches_all(r, &update.conditions)) {
            for (column, value) in &update.patch {
                row.insert(column.clone(), value.clone());
            }
            returned.push(project(row, &update.returning));
        }
        Ok(returned)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }

    fn kind(&self) -> &'static str {
        "fixture"
    }
}
