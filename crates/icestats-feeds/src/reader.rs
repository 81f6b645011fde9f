//! Async driver pumping a byte source through a [`FeedDecoder`].
//!
//! The transport (an HTTP `STATS` request, a TCP socket, a captured file) is
//! anything implementing `AsyncRead`. [`FeedReader::run`] reads until EOF,
//! surfaces transport errors immediately, and reports what it saw. Closing
//! the source is the disconnect signal: the decoder, and with it every
//! subscriber's sender, is dropped when `run` returns.

use bytes::BytesMut;
use icestats_core::config::FeedConfig;
use serde::Serialize;
use tokio::io::{AsyncRead, AsyncReadExt};

use crate::dispatch::{Subscription, Topic};
use crate::error::FeedError;
use crate::feed::FeedDecoder;

/// Totals for one feed connection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FeedSummary {
    pub bytes: u64,
    pub chunks: u64,
    pub lines: u64,
    /// Length of the unterminated final line discarded at close.
    pub dropped_bytes: u64,
}

pub struct FeedReader<R> {
    source: R,
    decoder: FeedDecoder,
    buf: BytesMut,
    read_size: usize,
    flush_on_close: bool,
}

impl<R: AsyncRead + Unpin> FeedReader<R> {
    pub fn new(source: R) -> Self {
        Self::with_config(source, &FeedConfig::default())
    }

    pub fn with_config(source: R, config: &FeedConfig) -> Self {
        Self {
            source,
            decoder: FeedDecoder::new(),
            buf: BytesMut::with_capacity(config.read_buffer_size),
            read_size: config.read_buffer_size,
            flush_on_close: config.flush_on_close,
        }
    }

    pub fn subscribe(&mut self, topic: Topic) -> Subscription {
        self.decoder.subscribe(topic)
    }

    pub fn decoder_mut(&mut self) -> &mut FeedDecoder {
        &mut self.decoder
    }

    pub async fn run(mut self) -> Result<FeedSummary, FeedError> {
        let mut summary = FeedSummary::default();
        loop {
            self.buf.clear();
            self.buf.reserve(self.read_size);
            let n = self.source.read_buf(&mut self.buf).await?;
            if n == 0 {
                break;
            }
            summary.bytes += n as u64;
            summary.chunks += 1;
            summary.lines += self.decoder.handle_chunk(&self.buf) as u64;
        }

        let pending = self.decoder.pending().len();
        if pending > 0 {
            if self.flush_on_close {
                summary.lines += self.decoder.finish() as u64;
            } else {
                tracing::debug!(bytes = pending, "feed closed mid-line, dropping unterminated data");
                summary.dropped_bytes = pending as u64;
            }
        }
        tracing::debug!(?summary, "feed closed");
        Ok(summary)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
