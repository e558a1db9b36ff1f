//! Ordered, user-editable rows for the batch forms.
//!
//! Each row carries a stable [`RowId`] handed out by its list, so edits and
//! removals address a row directly instead of by position. A list never holds
//! fewer than one row. Turning rows into request payloads is done by the pure
//! reducers at the bottom of this module.

use std::collections::BTreeMap;

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct RowId(u64);

impl From<u64> for RowId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl std::fmt::Display for RowId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ListKind {
    KeyOnly,
    KeyValue,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FieldRow {
    KeyOnly { key: String },
    KeyValue { key: String, value: String },
}

impl FieldRow {
    pub fn blank(kind: ListKind) -> Self {
        match kind {
            ListKind::KeyOnly => Self::KeyOnly { key: String::new() },
            ListKind::KeyValue => Self::KeyValue {
                key: String::new(),
                value: String::new(),
            },
        }
    }

    pub fn key(&self) -> &str {
        match self {
            Self::KeyOnly { key } | Self::KeyValue { key, .. } => key,
        }
    }

    pub fn value(&self) -> Option<&str> {
        match self {
            Self::KeyOnly { .. } => None,
            Self::KeyValue { value, .. } => Some(value),
        }
    }

    pub fn is_blank(&self) -> bool {
        self.key().is_empty() && self.value().is_none_or(str::is_empty)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Row {
    pub id: RowId,
    pub field: FieldRow,
}

#[derive(Debug, Clone, Serialize)]
pub struct FieldList {
    kind: ListKind,
    #[serde(skip)]
    next_id: u64,
    rows: Vec<Row>,
}

impl FieldList {
    pub fn new(kind: ListKind) -> Self {
        let mut list = Self {
            kind,
            next_id: 0,
            rows: Vec::new(),
        };
        list.push_blank();
        list
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn push_blank(&mut self) -> RowId {
        let id = RowId(self.next_id);
        self.next_id += 1;
        self.rows.push(Row {
            id,
            field: FieldRow::blank(self.kind),
        });
        id
    }

    /// Appends one blank row at the end.
    pub fn add_row(&mut self) -> RowId {
        self.push_blank()
    }

    /// Removes the row unless it is the last one left. Returns whether a row
    /// was removed.
    pub fn remove_row(&mut self, id: RowId) -> bool {
        if self.rows.len() <= 1 {
            return false;
        }

        let before = self.rows.len();
        self.rows.retain(|row| row.id != id);
        self.rows.len() != before
    }

    pub fn set_key(&mut self, id: RowId, key: impl Into<String>) -> bool {
        match self.row_mut(id) {
            Some(FieldRow::KeyOnly { key: slot } | FieldRow::KeyValue { key: slot, .. }) => {
                *slot = key.into();
                true
            }
            None => false,
        }
    }

    /// Sets the value of a key/value row; key-only rows have no value to set.
    pub fn set_value(&mut self, id: RowId, value: impl Into<String>) -> bool {
        match self.row_mut(id) {
            Some(FieldRow::KeyValue { value: slot, .. }) => {
                *slot = value.into();
                true
            }
            _ => false,
        }
    }

    fn row_mut(&mut self, id: RowId) -> Option<&mut FieldRow> {
        self.rows
            .iter_mut()
            .find(|row| row.id == id)
            .map(|row| &mut row.field)
    }

    /// Current row contents in list order.
    pub fn collect(&self) -> Vec<FieldRow> {
        self.rows.iter().map(|row| row.field.clone()).collect()
    }

    /// Replaces every row with a single blank one. Row ids keep increasing.
    pub fn reset(&mut self) {
        self.rows.clear();
        self.push_blank();
    }
}

/// Key/value pairs of every row whose key and value are both non-empty.
/// A later row with the same key overwrites an earlier one.
pub fn reduce_entries(rows: &[FieldRow]) -> BTreeMap<String, String> {
    rows.iter()
        .filter_map(|row| match row {
            FieldRow::KeyValue { key, value } if !key.is_empty() && !value.is_empty() => {
                Some((key.clone(), value.clone()))
            }
            _ => None,
        })
        .collect()
}

/// Non-empty keys in first-seen order, without duplicates.
pub fn reduce_keys(rows: &[FieldRow]) -> Vec<String> {
    let mut keys: Vec<String> = Vec::new();
    for row in rows {
        let key = row.key();
        if !key.is_empty() && !keys.iter().any(|seen| seen == key) {
            keys.push(key.to_string());
        }
    }
    keys
}
