//! icestats: streaming decoders for Icecast's administrative stats.
//!
//! Two wire formats, one vocabulary:
//!
//! ```text
//! STATS feed ──► FeedDecoder ──► FeedEvent { name, mount, data } ──► *, scope.*, name
//! stats XML  ──► StatsDecoder ─► EntityRecord (server / source / listener)
//! ```
//!
//! This crate re-exports `icestats-core` (values, records, normalizer,
//! configuration) and `icestats-feeds` (decoders and their drivers) so that
//! integration tests and downstream tools can depend on a single crate. The
//! `icestats` binary decodes captured feeds and documents offline.

pub use icestats_core::*;
pub use icestats_feeds::*;
