//! Test builders and drivers: run inputs through the decoders and collect
//! what comes out.
//!
//! These are designed for readability in test assertions, not for production
//! use. They panic on decode errors rather than returning `Result`.

use icestats::{
    EntityKind, EntityRecord, FeedDecoder, Notification, StatsEvent, StatsReader, Subscription,
    Topic,
};

// ---------------------------------------------------------------------------
// Feed
// ---------------------------------------------------------------------------

/// A decoder with one subscriber on each tier for the topics of interest.
pub struct FeedTaps {
    pub decoder: FeedDecoder,
    pub all: Subscription,
    pub server: Subscription,
    pub mount: Subscription,
}

impl FeedTaps {
    pub fn new() -> Self {
        let mut decoder = FeedDecoder::new();
        let all = decoder.subscribe(Topic::All);
        let server = decoder.subscribe("server.*".parse().unwrap());
        let mount = decoder.subscribe("mount.*".parse().unwrap());
        Self {
            decoder,
            all,
            server,
            mount,
        }
    }

    /// Feed `bytes` in chunks split at the given offsets.
    pub fn feed_split(&mut self, bytes: &[u8], offsets: &[usize]) {
        let mut start = 0;
        for &offset in offsets {
            self.decoder.handle_chunk(&bytes[start..offset]);
            start = offset;
        }
        self.decoder.handle_chunk(&bytes[start..]);
    }
}

/// Everything currently queued on a subscription.
pub fn drain(subscription: &mut Subscription) -> Vec<Notification> {
    std::iter::from_fn(|| subscription.try_recv().ok()).collect()
}

/// Decode `bytes` in chunks of `size` and return `(name, mount)` of every
/// event seen on `*`.
pub fn decode_in_chunks(bytes: &[u8], size: usize) -> Vec<(String, Option<String>)> {
    let mut decoder = FeedDecoder::new();
    let mut all = decoder.subscribe(Topic::All);
    for chunk in bytes.chunks(size.max(1)) {
        decoder.handle_chunk(chunk);
    }
    drain(&mut all)
        .into_iter()
        .map(|n| (n.event.name.clone(), n.event.mount.clone()))
        .collect()
}

// ---------------------------------------------------------------------------
// Stats
// ---------------------------------------------------------------------------

/// Decode a whole document, panicking on error. Includes `Finished`.
pub fn decode_stats(xml: &str) -> Vec<StatsEvent> {
    StatsReader::new(xml.as_bytes())
        .collect::<Result<_, _>>()
        .expect("stats document must decode")
}

/// Records of one kind, in emission order.
pub fn records_of(events: &[StatsEvent], kind: EntityKind) -> Vec<EntityRecord> {
    events
        .iter()
        .filter(|e| e.kind() == Some(kind))
        .filter_map(|e| e.record().cloned())
        .collect()
}
