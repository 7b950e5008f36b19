//! Restitch - end-to-end latency reconstruction for callback-driven runtimes
//!
//! This library rebuilds end-to-end latency tables for node paths through a
//! pub/sub callback graph from raw, timestamped trace events. Trace events
//! reference runtime entities only through reusable integer handles, so the
//! core resolves each logical entity to the set of handles that ever
//! represented it, filters raw per-category tables down to per-entity ones,
//! and stitches the per-hop tables of a node path into one table with
//! repeated equi-joins.
//!
//! Trace capture and parsing live behind the [`event_source::EventSource`]
//! trait; the static architecture model is carried as read-only value
//! objects. This crate computes correlation only: no statistics, no
//! visualization, no I/O.

pub mod chain;
pub mod clock;
pub mod column_names;
pub mod event_source;
pub mod handle_resolver;
pub mod record;
pub mod records_provider;
pub mod value_objects;

pub use event_source::{EventSource, StaticEventSource};
pub use record::{Record, Records};
pub use records_provider::RecordsProvider;
pub use value_objects::Handle;
