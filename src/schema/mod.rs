//! Schema probing and semantic column classification.
//!
//! [`probe`] reads a file's header and a bounded sample of rows to build a
//! [`crate::types::ColumnInventory`] (inferred primitive types, cardinality
//! estimates, default semantic roles) plus an approximate total row count.
//! [`classify`] is the pure name-to-role classifier the prober runs over each
//! header; callers can also use it directly when overriding roles.

pub mod classify;
pub mod probe;

pub use classify::{classify, resolve};
pub use probe::{preview, probe, FilePreview, SchemaReport, DEFAULT_SAMPLE_SIZE};
