//! Materialised view of a whole stats document.
//!
//! The decoder emits entities one at a time and keeps no lists. Callers that
//! want the polled page as a structure fold the stream into a
//! [`StatsSnapshot`]: the server record plus every source with its listeners.
//! Listeners close before their source does, so they are buffered until the
//! owning source arrives.

use std::io::BufRead;
use std::str::FromStr;

use icestats_core::EntityRecord;
use serde::Serialize;
use tokio::io::AsyncBufRead;

use crate::error::StatsResult;
use crate::stats::StatsEvent;
use crate::xml::{AsyncStatsReader, StatsReader};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StatsSnapshot {
    pub server: Option<EntityRecord>,
    pub sources: Vec<SourceStats>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceStats {
    #[serde(rename = "source")]
    pub record: EntityRecord,
    pub listeners: Vec<EntityRecord>,
}

impl SourceStats {
    pub fn mount(&self) -> Option<&str> {
        self.record.mount()
    }
}

impl StatsSnapshot {
    pub fn from_reader<R: BufRead>(inner: R) -> StatsResult<Self> {
        let mut builder = SnapshotBuilder::default();
        for event in StatsReader::new(inner) {
            builder.push(event?);
        }
        Ok(builder.finish())
    }

    pub async fn from_async_reader<R: AsyncBufRead + Unpin>(inner: R) -> StatsResult<Self> {
        let mut builder = SnapshotBuilder::default();
        let mut reader = AsyncStatsReader::new(inner);
        while let Some(event) = reader.next().await {
            builder.push(event?);
        }
        Ok(builder.finish())
    }

    pub fn source(&self, mount: &str) -> Option<&SourceStats> {
        self.sources.iter().find(|s| s.mount() == Some(mount))
    }

    /// Every listener of every source, in document order.
    pub fn listeners(&self) -> impl Iterator<Item = &EntityRecord> {
        self.sources.iter().flat_map(|s| s.listeners.iter())
    }
}

impl FromStr for StatsSnapshot {
    type Err = crate::error::StatsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_reader(s.as_bytes())
    }
}

/// Folds a [`StatsEvent`] stream into a [`StatsSnapshot`].
#[derive(Debug, Default)]
pub struct SnapshotBuilder {
    snapshot: StatsSnapshot,
    listeners: Vec<EntityRecord>,
}

impl SnapshotBuilder {
    pub fn push(&mut self, event: StatsEvent) {
        match event {
            StatsEvent::Server(record) => self.snapshot.server = Some(record),
            StatsEvent::Source(record) => {
                let listeners = std::mem::take(&mut self.listeners);
                self.snapshot.sources.push(SourceStats { record, listeners });
            }
            StatsEvent::Listener(record) => self.listeners.push(record),
            StatsEvent::Finished => {}
        }
    }

    pub fn finish(self) -> StatsSnapshot {
        if !self.listeners.is_empty() {
            tracing::debug!(count = self.listeners.len(), "listeners without a closing source dropped");
        }
        self.snapshot
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
