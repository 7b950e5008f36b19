//! Columnar record tables for trace event shaping
//!
//! A [`Records`] table is an ordered sequence of sparse rows plus an ordered,
//! deduplicated list of declared column names. It is the foundation every
//! higher layer builds on: handle-set filtering, hop qualification, and the
//! relational joins that stitch a multi-hop chain into one end-to-end table.
//!
//! Values are nullable nanosecond timestamps or opaque runtime handles, both
//! carried as `Option<u64>`. A column can be present-with-value,
//! present-with-null, or absent from a row; [`Record::get`] flattens the last
//! two cases to `None` so that null handles never satisfy a membership test.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// Errors for record table operations
#[derive(Error, Debug)]
pub enum RecordsError {
    #[error("no shared column to join on (left: {left:?}, right: {right:?})")]
    NoSharedColumn {
        left: Vec<String>,
        right: Vec<String>,
    },
}

pub type Result<T> = std::result::Result<T, RecordsError>;

/// One sparse row: column name to nullable integer value
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    data: HashMap<String, Option<u64>>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Value of `column`, with absent and explicit-null both reported as `None`
    pub fn get(&self, column: &str) -> Option<u64> {
        self.data.get(column).copied().flatten()
    }

    /// Whether `column` appears in this row at all (possibly as null)
    pub fn contains_column(&self, column: &str) -> bool {
        self.data.contains_key(column)
    }

    pub fn insert(&mut self, column: impl Into<String>, value: Option<u64>) {
        self.data.insert(column.into(), value);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<u64>)> {
        self.data.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Copy of this row with every column name passed through `rename`
    fn map_columns(&self, rename: impl Fn(&str) -> String) -> Record {
        let data = self
            .data
            .iter()
            .map(|(k, v)| (rename(k), *v))
            .collect();
        Record { data }
    }
}

impl<K: Into<String>> FromIterator<(K, Option<u64>)> for Record {
    fn from_iter<T: IntoIterator<Item = (K, Option<u64>)>>(iter: T) -> Self {
        let data = iter.into_iter().map(|(k, v)| (k.into(), v)).collect();
        Record { data }
    }
}

/// Ordered rows plus an ordered, deduplicated column declaration
///
/// Row order is significant and preserved by every non-reordering operation.
/// The declared columns are always a superset of the columns appearing in any
/// row; `new` restores that invariant by appending undeclared row columns in
/// first-appearance order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Records {
    data: Vec<Record>,
    columns: Vec<String>,
}

impl Records {
    pub fn new(data: Vec<Record>, columns: Vec<String>) -> Self {
        let mut records = Records {
            data: Vec::new(),
            columns: Vec::new(),
        };
        for column in columns {
            records.declare_column(&column);
        }
        for row in &data {
            for (column, _) in row.iter() {
                records.declare_column(column);
            }
        }
        records.data = data;
        records
    }

    pub fn empty() -> Self {
        Self::default()
    }

    fn declare_column(&mut self, column: &str) {
        if !self.columns.iter().any(|c| c == column) {
            self.columns.push(column.to_string());
        }
    }

    pub fn data(&self) -> &[Record] {
        &self.data
    }

    pub fn column_names(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Whether the table holds at least one row
    pub fn has_data(&self) -> bool {
        !self.data.is_empty()
    }

    /// New table keeping only rows satisfying `predicate`
    ///
    /// Column declaration and the relative order of surviving rows are
    /// preserved; the receiver is untouched.
    pub fn filter(&self, predicate: impl Fn(&Record) -> bool) -> Records {
        let data = self
            .data
            .iter()
            .filter(|row| predicate(*row))
            .cloned()
            .collect();
        Records {
            data,
            columns: self.columns.clone(),
        }
    }

    /// Append `other`'s rows after the receiver's own, unioning the column
    /// declarations
    pub fn concat(&mut self, other: &Records) {
        for column in &other.columns {
            self.declare_column(column);
        }
        self.data.extend(other.data.iter().cloned());
    }

    /// New table with every column name (declared and per-row) passed through
    /// `rename`
    pub fn map_columns(&self, rename: impl Fn(&str) -> String) -> Records {
        let columns = self.columns.iter().map(|c| rename(c)).collect();
        let data = self
            .data
            .iter()
            .map(|row| row.map_columns(&rename))
            .collect();
        Records::new(data, columns)
    }

    /// Inner equi-join on every column declared by both tables
    ///
    /// Rows match when their values agree on all shared columns; a null or
    /// absent value on a shared column never matches anything. Matching is
    /// many-to-many. The result declares the receiver's columns followed by
    /// the columns only `other` declares, and keeps the receiver's row order
    /// (with each left row's matches in `other`'s row order).
    ///
    /// Two tables with no shared declared column cannot be joined; that is a
    /// construction error in the caller, reported as
    /// [`RecordsError::NoSharedColumn`].
    pub fn join(&self, other: &Records) -> Result<Records> {
        let shared: Vec<&String> = self
            .columns
            .iter()
            .filter(|c| other.columns.contains(c))
            .collect();
        if shared.is_empty() {
            return Err(RecordsError::NoSharedColumn {
                left: self.columns.clone(),
                right: other.columns.clone(),
            });
        }

        let mut columns = self.columns.clone();
        columns.extend(
            other
                .columns
                .iter()
                .filter(|c| !self.columns.contains(c))
                .cloned(),
        );

        let mut index: HashMap<Vec<u64>, Vec<&Record>> = HashMap::new();
        for row in &other.data {
            if let Some(key) = join_key(row, &shared) {
                index.entry(key).or_default().push(row);
            }
        }

        let mut data = Vec::new();
        for left in &self.data {
            let Some(key) = join_key(left, &shared) else {
                continue;
            };
            let Some(matches) = index.get(&key) else {
                continue;
            };
            for right in matches {
                let mut merged = left.clone();
                for (column, value) in right.iter() {
                    merged.data.entry(column.to_string()).or_insert(value);
                }
                data.push(merged);
            }
        }

        Ok(Records { data, columns })
    }
}

/// Join key of a row over the shared columns; `None` when any shared column
/// is null or absent, which excludes the row from matching
fn join_key(row: &Record, shared: &[&String]) -> Option<Vec<u64>> {
    shared.iter().map(|column| row.get(column)).collect()
}
