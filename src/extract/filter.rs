//! Row filtering for the chunked extractor.

use std::collections::BTreeSet;

/// One predicate: a column name bound to a set of acceptable values.
///
/// A row passes when the column's trimmed value is in the set. Membership is
/// exact string comparison against the raw cell text, so temporal equality
/// (`season = 2025`) is just a one-element set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Predicate {
    column: String,
    accepted: BTreeSet<String>,
}

impl Predicate {
    /// Create a predicate on `column` accepting `values`.
    pub fn new<S: Into<String>>(
        column: impl Into<String>,
        values: impl IntoIterator<Item = S>,
    ) -> Self {
        Self {
            column: column.into(),
            accepted: values.into_iter().map(Into::into).collect(),
        }
    }

    /// Column this predicate is bound to.
    pub fn column(&self) -> &str {
        &self.column
    }

    /// Whether `value` is in the accepted set.
    pub fn accepts(&self, value: &str) -> bool {
        self.accepted.contains(value)
    }

    /// The accepted-value set.
    pub fn accepted(&self) -> &BTreeSet<String> {
        &self.accepted
    }
}

/// A conjunction of predicates. The empty filter accepts every row.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RowFilter {
    predicates: Vec<Predicate>,
}

impl RowFilter {
    /// An empty filter (accepts all rows).
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a predicate binding `column` to `values`.
    pub fn with_values<S: Into<String>>(
        mut self,
        column: impl Into<String>,
        values: impl IntoIterator<Item = S>,
    ) -> Self {
        self.predicates.push(Predicate::new(column, values));
        self
    }

    /// Whether the filter has no predicates.
    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }

    /// The predicates, in the order they were added.
    pub fn predicates(&self) -> &[Predicate] {
        &self.predicates
    }
}
