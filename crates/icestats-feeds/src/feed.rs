//! Feed line decoder.
//!
//! The stats feed is a persistent stream of space-separated lines:
//!
//! ```text
//! EVENT global server_id Icecast 2.4.0-kh1
//! NEW audio/mpeg /test.mp3
//! EVENT /test.mp3 bitrate 64
//! DELETE /test.mp3
//! INFO full list end
//! ```
//!
//! [`classify`] splits a line into a field name, an optional mount and raw
//! tokens; [`parse_line`] runs those through the normalizer. [`FeedDecoder`]
//! owns the per-connection state: chunk reassembly plus the subscriber list.
//!
//! Decoding never fails. A line whose first token is not a known keyword is
//! decoded as a server event named after that token, with the rest of the
//! line as text.

use icestats_core::normalizer::{normalize_data, normalize_name};
use icestats_core::FeedEvent;

use crate::dispatch::{Dispatcher, Notification, Subscription, Topic};
use crate::lines::LineBuffer;

/// Second token of an `EVENT` line for server-wide fields.
const GLOBAL: &str = "global";

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

/// A line split into its parts, before value normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawEvent<'a> {
    /// Canonical field name, without the `server.` / `mount.` prefix.
    pub field: String,
    pub mount: Option<&'a str>,
    pub params: Vec<&'a str>,
}

/// Split a trimmed feed line on single spaces and extract field, mount and
/// payload tokens according to its first token.
pub fn classify(line: &str) -> RawEvent<'_> {
    let tokens: Vec<&str> = line.split(' ').collect();
    let keyword = tokens[0];

    let (field, mount, params) = match keyword {
        "NEW" => match &tokens[1..] {
            [payload @ .., mount] => ("new".to_string(), Some(*mount), payload.to_vec()),
            [] => ("new".to_string(), None, Vec::new()),
        },
        "DELETE" | "FLUSH" => (keyword.to_lowercase(), tokens.get(1).copied(), Vec::new()),
        "EVENT" => {
            let mount = tokens.get(1).copied().filter(|target| *target != GLOBAL);
            let field = normalize_name(tokens.get(2).copied().unwrap_or(""));
            let params = tokens.get(3..).map(|rest| rest.to_vec()).unwrap_or_default();
            (field, mount, params)
        }
        _ => {
            if keyword != "INFO" {
                tracing::debug!(keyword, "unrecognised feed line, decoding as info-style event");
            }
            let rest = line.split_once(' ').map(|(_, rest)| rest).unwrap_or("");
            (keyword.to_lowercase(), None, vec![rest])
        }
    };

    RawEvent {
        field,
        mount: mount.filter(|m| !m.is_empty()),
        params,
    }
}

/// Decode one trimmed line into a normalized event.
pub fn parse_line(line: &str) -> FeedEvent {
    let raw = classify(line);
    let data = normalize_data(&raw.field, &raw.params);
    FeedEvent::new(&raw.field, raw.mount.map(str::to_string), data)
}

// ---------------------------------------------------------------------------
// Decoder
// ---------------------------------------------------------------------------

/// Stateful decoder for one feed connection.
///
/// Feed it chunks in arrival order with [`handle_chunk`](Self::handle_chunk);
/// every completed line is published to subscribers before the call returns.
/// An unterminated final line stays pending until more bytes arrive or
/// [`finish`](Self::finish) is called.
#[derive(Debug, Default)]
pub struct FeedDecoder {
    lines: LineBuffer,
    dispatcher: Dispatcher,
    decoded: u64,
}

impl FeedDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, topic: Topic) -> Subscription {
        self.dispatcher.subscribe(topic)
    }

    pub fn attach(&mut self, topic: Topic, tx: tokio::sync::mpsc::UnboundedSender<Notification>) {
        self.dispatcher.attach(topic, tx);
    }

    /// Decode every line completed by `chunk`. Returns the number of lines.
    pub fn handle_chunk(&mut self, chunk: &[u8]) -> usize {
        let lines = self.lines.push(chunk);
        for line in &lines {
            self.handle_line(line);
        }
        lines.len()
    }

    /// Decode and publish one complete, trimmed line.
    pub fn handle_line(&mut self, line: &str) {
        let event = parse_line(line);
        tracing::trace!(name = %event.name, mount = ?event.mount, "feed event");
        self.decoded += 1;
        self.dispatcher.publish(event);
    }

    /// Decode the pending unterminated line, if any. Returns the number of
    /// lines decoded (0 or 1).
    pub fn finish(&mut self) -> usize {
        match self.lines.flush() {
            Some(line) => {
                self.handle_line(&line);
                1
            }
            None => 0,
        }
    }

    /// Bytes of the unterminated line still waiting for a terminator.
    pub fn pending(&self) -> &[u8] {
        self.lines.pending()
    }

    /// Lines decoded since construction.
    pub fn decoded(&self) -> u64 {
        self.decoded
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
