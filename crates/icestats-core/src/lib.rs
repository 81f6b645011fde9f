//! icestats-core: shared vocabulary for the icestats decoders.
//!
//! This crate holds everything both decoders agree on: the typed values and
//! records they produce, the element schema of stats documents, the field
//! normalizer, and the layered configuration.
//!
//! # Architecture
//!
//! ```text
//! feed bytes ──► lines ──► FeedDecoder ──┐
//!                                        ├──► normalizer ──► FeedEvent / EntityRecord
//! stats XML ──► tokens ──► StatsDecoder ─┘
//! ```
//!
//! The decoders themselves live in `icestats-feeds`.

pub mod config;
pub mod normalizer;
pub mod schema;
pub mod types;

pub use config::Config;
pub use normalizer::{normalize_data, normalize_name, parse_integer};
pub use types::{EntityKind, EntityRecord, FeedEvent, Integer, Scope, Value};
