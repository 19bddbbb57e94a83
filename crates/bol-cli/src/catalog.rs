//! In-memory list of unread notifications with 1-based display indices.

use crate::error::{PortalError, PortalResult};
use crate::types::NotificationRecord;

/// Unread notifications in page order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NotificationCatalog {
    records: Vec<NotificationRecord>,
}

impl NotificationCatalog {
    /// Build a catalog, renumbering records `1..=N` in input order.
    pub fn load(records: Vec<NotificationRecord>) -> Self {
        let mut catalog = Self::default();
        catalog.reload(records);
        catalog
    }

    /// Replace the contents with a fresh list.
    pub fn reload(&mut self, records: Vec<NotificationRecord>) {
        self.records = records
            .into_iter()
            .enumerate()
            .map(|(i, mut r)| {
                r.index = i + 1;
                r
            })
            .collect();
    }

    /// Resolve raw operator input to a record.
    ///
    /// Surrounding whitespace is ignored. Anything that is not an integer in
    /// `1..=len` is a selection error.
    pub fn resolve(&self, input: &str) -> PortalResult<&NotificationRecord> {
        let trimmed = input.trim();
        let index: i64 = trimmed
            .parse()
            .map_err(|_| PortalError::Selection(trimmed.to_string()))?;
        self.resolve_index(index)
    }

    /// Resolve a 1-based display index to a record.
    pub fn resolve_index(&self, index: i64) -> PortalResult<&NotificationRecord> {
        if index < 1 {
            return Err(PortalError::Selection(index.to_string()));
        }
        usize::try_from(index - 1)
            .ok()
            .and_then(|i| self.records.get(i))
            .ok_or_else(|| PortalError::Selection(index.to_string()))
    }

    pub fn iter(&self) -> impl Iterator<Item = &NotificationRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
