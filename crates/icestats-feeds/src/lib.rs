//! icestats-feeds: decoders for the two stats wire formats.
//!
//! - The line-oriented stats feed: [`FeedDecoder`] reassembles lines from
//!   arbitrary chunks and publishes every decoded line on three topics
//!   (`*`, `server.*` / `mount.*`, exact name). [`FeedReader`] drives it from
//!   any tokio `AsyncRead`.
//! - The stats XML document: [`StatsDecoder`] folds tokenizer events into
//!   server / source / listener records, emitting each as its element closes.
//!   [`StatsReader`] and [`AsyncStatsReader`] feed it from quick-xml;
//!   [`StatsSnapshot`] collects a whole document.
//!
//! Both decoders are plain single-owner state machines: no locks, no I/O of
//! their own, driven strictly in arrival order.

pub mod dispatch;
pub mod error;
pub mod feed;
pub mod lines;
pub mod reader;
pub mod snapshot;
pub mod stats;
pub mod xml;

pub use dispatch::{Dispatcher, Notification, Subscription, Topic};
pub use error::{FeedError, StatsError, StatsResult};
pub use feed::{classify, parse_line, FeedDecoder, RawEvent};
pub use lines::LineBuffer;
pub use reader::{FeedReader, FeedSummary};
pub use snapshot::{SnapshotBuilder, SourceStats, StatsSnapshot};
pub use stats::{StatsDecoder, StatsEvent, XmlToken};
pub use xml::{AsyncStatsReader, StatsReader};
