//! quick-xml adapters feeding [`StatsDecoder`].
//!
//! [`StatsReader`] wraps any `BufRead` and is an `Iterator` of decoded
//! entities; [`AsyncStatsReader`] does the same over a tokio `AsyncBufRead`
//! (an HTTP body, a socket) with `next().await`. Both translate quick-xml
//! events into [`XmlToken`]s: self-closing elements become an open plus a
//! close, entity references are unescaped, CDATA is text, and declarations,
//! comments and processing instructions are skipped.
//!
//! Both readers stop after [`StatsEvent::Finished`] or the first error.

use std::collections::VecDeque;
use std::io::BufRead;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use tokio::io::AsyncBufRead;

use crate::error::{StatsError, StatsResult};
use crate::stats::{StatsDecoder, StatsEvent, XmlToken};

// ---------------------------------------------------------------------------
// Shared token pump
// ---------------------------------------------------------------------------

/// Decoder plus the tokens translated from the last quick-xml event.
#[derive(Debug, Default)]
struct Pump {
    decoder: StatsDecoder,
    queue: VecDeque<XmlToken>,
    done: bool,
}

impl Pump {
    fn enqueue(&mut self, event: Event<'_>) -> StatsResult<()> {
        match event {
            Event::Start(e) => self.queue.push_back(open_token(&e)?),
            Event::Empty(e) => {
                let open = open_token(&e)?;
                if let XmlToken::Open { name, .. } = &open {
                    let close = XmlToken::close(name.clone());
                    self.queue.push_back(open);
                    self.queue.push_back(close);
                }
            }
            Event::End(e) => {
                let name = std::str::from_utf8(e.name().as_ref())?.to_string();
                self.queue.push_back(XmlToken::Close { name });
            }
            Event::Text(e) => self.queue.push_back(XmlToken::Text(e.unescape()?.into_owned())),
            Event::CData(e) => {
                let text = std::str::from_utf8(&e)?.to_string();
                self.queue.push_back(XmlToken::Text(text));
            }
            Event::Eof => self.queue.push_back(XmlToken::End),
            Event::Decl(_) | Event::PI(_) | Event::Comment(_) | Event::DocType(_) => {}
        }
        Ok(())
    }

    /// Feed queued tokens until one completes an entity.
    fn drain(&mut self) -> Option<StatsResult<StatsEvent>> {
        while let Some(token) = self.queue.pop_front() {
            match self.decoder.feed(token) {
                Ok(Some(event)) => {
                    if event == StatsEvent::Finished {
                        self.done = true;
                    }
                    return Some(Ok(event));
                }
                Ok(None) => {}
                Err(err) => return Some(self.fail(err)),
            }
        }
        None
    }

    fn fail(&mut self, err: StatsError) -> StatsResult<StatsEvent> {
        tracing::warn!(error = %err, depth = self.decoder.depth(), "stats decode terminated");
        self.done = true;
        self.queue.clear();
        Err(err)
    }
}

fn open_token(e: &BytesStart<'_>) -> StatsResult<XmlToken> {
    let name = std::str::from_utf8(e.name().as_ref())?.to_string();
    let mut attributes = Vec::new();
    for attr in e.attributes() {
        let attr = attr?;
        let key = std::str::from_utf8(attr.key.as_ref())?.to_string();
        let value = attr.unescape_value()?.into_owned();
        attributes.push((key, value));
    }
    Ok(XmlToken::Open { name, attributes })
}

fn configure<R>(reader: &mut Reader<R>) {
    reader.config_mut().trim_text(false);
}

// ---------------------------------------------------------------------------
// Blocking reader
// ---------------------------------------------------------------------------

/// Decode a stats document from a blocking reader.
///
/// ```
/// use icestats_feeds::{StatsEvent, StatsReader};
///
/// let xml = r#"<icestats><source mount="/a"><bitrate>64</bitrate></source></icestats>"#;
/// let events: Vec<_> = StatsReader::new(xml.as_bytes()).collect::<Result<_, _>>().unwrap();
/// assert!(matches!(events[0], StatsEvent::Source(_)));
/// assert_eq!(events.last(), Some(&StatsEvent::Finished));
/// ```
pub struct StatsReader<R> {
    reader: Reader<R>,
    buf: Vec<u8>,
    pump: Pump,
}

impl<R: BufRead> StatsReader<R> {
    pub fn new(inner: R) -> Self {
        let mut reader = Reader::from_reader(inner);
        configure(&mut reader);
        Self {
            reader,
            buf: Vec::new(),
            pump: Pump::default(),
        }
    }
}

impl<R: BufRead> Iterator for StatsReader<R> {
    type Item = StatsResult<StatsEvent>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.pump.done {
            return None;
        }
        loop {
            if let Some(result) = self.pump.drain() {
                return Some(result);
            }
            if self.pump.done {
                return None;
            }
            self.buf.clear();
            let event = match self.reader.read_event_into(&mut self.buf) {
                Ok(event) => event,
                Err(err) => return Some(self.pump.fail(err.into())),
            };
            if let Err(err) = self.pump.enqueue(event) {
                return Some(self.pump.fail(err));
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Async reader
// ---------------------------------------------------------------------------

/// Decode a stats document incrementally from a tokio reader.
pub struct AsyncStatsReader<R> {
    reader: Reader<R>,
    buf: Vec<u8>,
    pump: Pump,
}

impl<R: AsyncBufRead + Unpin> AsyncStatsReader<R> {
    pub fn new(inner: R) -> Self {
        let mut reader = Reader::from_reader(inner);
        configure(&mut reader);
        Self {
            reader,
            buf: Vec::new(),
            pump: Pump::default(),
        }
    }

    /// The next completed entity, `Finished`, or an error. `None` once either
    /// of the last two has been returned.
    pub async fn next(&mut self) -> Option<StatsResult<StatsEvent>> {
        if self.pump.done {
            return None;
        }
        loop {
            if let Some(result) = self.pump.drain() {
                return Some(result);
            }
            if self.pump.done {
                return None;
            }
            self.buf.clear();
            let event = match self.reader.read_event_into_async(&mut self.buf).await {
                Ok(event) => event,
                Err(err) => return Some(self.pump.fail(err.into())),
            };
            if let Err(err) = self.pump.enqueue(event) {
                return Some(self.pump.fail(err));
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
