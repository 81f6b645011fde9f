//! Depth-indexed stats document decoder.
//!
//! A stats document is shallow and fixed-shape:
//!
//! ```text
//! depth 1  <icestats>
//! depth 2    <client_connections>…</client_connections>     server field
//! depth 2    <source mount="/test.mp3">                     source entity
//! depth 3      <bitrate>128</bitrate>                       source field
//! depth 3      <listener>                                   listener entity
//! depth 4        <IP>192.168.182.30</IP>                    listener field
//! ```
//!
//! [`StatsDecoder`] is driven by [`XmlToken`]s and emits one [`StatsEvent`]
//! per completed entity, as soon as its closing tag is seen. Record slots are
//! discarded on emission, so sibling sources and listeners each start from a
//! fresh all-null record. The tokenizer lives in [`crate::xml`]; nothing here
//! touches I/O.

use icestats_core::normalizer::{normalize_data, normalize_name};
use icestats_core::schema::{LISTENER_TAG, MOUNT_ATTRIBUTE, ROOT_TAG, SOURCE_TAG};
use icestats_core::{EntityKind, EntityRecord};
use serde::Serialize;

use crate::error::{StatsError, StatsResult};

// Depth of the root element, of the entity elements, and of each entity
// kind's field elements.
const ROOT_DEPTH: usize = 1;
const SOURCE_DEPTH: usize = 2;
const LISTENER_DEPTH: usize = 3;
const SERVER_FIELD_DEPTH: usize = 2;
const SOURCE_FIELD_DEPTH: usize = 3;
const LISTENER_FIELD_DEPTH: usize = 4;

// ---------------------------------------------------------------------------
// Input and output
// ---------------------------------------------------------------------------

/// A low-level token from an XML tokenizer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XmlToken {
    Open {
        name: String,
        attributes: Vec<(String, String)>,
    },
    Text(String),
    Close {
        name: String,
    },
    End,
}

impl XmlToken {
    pub fn open(name: impl Into<String>) -> Self {
        XmlToken::Open {
            name: name.into(),
            attributes: Vec::new(),
        }
    }

    pub fn close(name: impl Into<String>) -> Self {
        XmlToken::Close { name: name.into() }
    }
}

/// A completed entity, or the end of the document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", content = "record", rename_all = "lowercase")]
pub enum StatsEvent {
    Server(EntityRecord),
    Source(EntityRecord),
    Listener(EntityRecord),
    /// No further entities will arrive.
    Finished,
}

impl StatsEvent {
    pub fn record(&self) -> Option<&EntityRecord> {
        match self {
            StatsEvent::Server(r) | StatsEvent::Source(r) | StatsEvent::Listener(r) => Some(r),
            StatsEvent::Finished => None,
        }
    }

    pub fn kind(&self) -> Option<EntityKind> {
        self.record().map(EntityRecord::kind)
    }

    fn from_record(record: EntityRecord) -> Self {
        match record.kind() {
            EntityKind::Server => StatsEvent::Server(record),
            EntityKind::Source => StatsEvent::Source(record),
            EntityKind::Listener => StatsEvent::Listener(record),
        }
    }
}

// ---------------------------------------------------------------------------
// Decoder
// ---------------------------------------------------------------------------

/// Which entity the cursor is inside. The mount captured from the enclosing
/// `source` element travels with the state so listener records inherit it.
#[derive(Debug, Clone, PartialEq, Eq)]
enum State {
    Idle,
    InServer,
    InSource { mount: Option<String> },
    InListener { mount: Option<String> },
    /// Root element closed; only trailing whitespace may follow.
    Closed,
    Finished,
    Failed,
}

#[derive(Debug)]
pub struct StatsDecoder {
    state: State,
    depth: usize,
    /// Raw name of the field element awaiting text, if it is one we collect.
    current_tag: Option<String>,
    pending_text: Option<String>,
    server: Option<EntityRecord>,
    source: Option<EntityRecord>,
    listener: Option<EntityRecord>,
}

impl Default for StatsDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl StatsDecoder {
    pub fn new() -> Self {
        Self {
            state: State::Idle,
            depth: 0,
            current_tag: None,
            pending_text: None,
            server: None,
            source: None,
            listener: None,
        }
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Mount of the source currently being decoded.
    pub fn current_mount(&self) -> Option<&str> {
        match &self.state {
            State::InSource { mount } | State::InListener { mount } => mount.as_deref(),
            _ => None,
        }
    }

    pub fn is_terminated(&self) -> bool {
        matches!(self.state, State::Finished | State::Failed)
    }

    /// Apply one token. Any error is final: the decoder refuses further input.
    pub fn feed(&mut self, token: XmlToken) -> StatsResult<Option<StatsEvent>> {
        let result = match token {
            XmlToken::Open { name, attributes } => self.open_tag(&name, &attributes).map(|()| None),
            XmlToken::Text(text) => self.text(&text).map(|()| None),
            XmlToken::Close { name } => self.close_tag(&name),
            XmlToken::End => self.end().map(Some),
        };
        if result.is_err() && self.state != State::Failed {
            self.fail();
        }
        result
    }

    pub fn open_tag(&mut self, name: &str, attributes: &[(String, String)]) -> StatsResult<()> {
        match self.state {
            State::Finished | State::Failed => return Err(StatsError::Terminated),
            State::Closed => {
                self.fail();
                return Err(StatsError::TrailingElement { name: name.to_string() });
            }
            _ => {}
        }

        self.depth += 1;
        self.current_tag = None;
        self.pending_text = None;

        if self.depth == ROOT_DEPTH {
            if name != ROOT_TAG {
                tracing::debug!(root = name, expected = ROOT_TAG, "unexpected stats document root");
            }
            self.state = State::InServer;
            self.server = Some(EntityRecord::new(EntityKind::Server));
            return Ok(());
        }

        let entered = match (&self.state, self.depth, name) {
            (State::InServer, SOURCE_DEPTH, SOURCE_TAG) => Some(EntityKind::Source),
            (State::InSource { .. }, LISTENER_DEPTH, LISTENER_TAG) => Some(EntityKind::Listener),
            _ => None,
        };

        match entered {
            Some(EntityKind::Source) => {
                let mount = attributes
                    .iter()
                    .find(|(key, _)| key == MOUNT_ATTRIBUTE)
                    .map(|(_, value)| value.clone());
                self.source = Some(EntityRecord::with_mount(EntityKind::Source, mount.as_deref()));
                self.state = State::InSource { mount };
            }
            Some(EntityKind::Listener) => {
                let mount = self.current_mount().map(str::to_string);
                self.listener = Some(EntityRecord::with_mount(EntityKind::Listener, mount.as_deref()));
                self.state = State::InListener { mount };
            }
            _ => {
                if let Some(kind) = self.active_kind() {
                    if kind.tags().contains(&name) {
                        self.current_tag = Some(name.to_string());
                    }
                }
            }
        }
        Ok(())
    }

    /// Character data. Kept only inside a collected field element; otherwise
    /// discarded (indentation, unknown elements).
    pub fn text(&mut self, content: &str) -> StatsResult<()> {
        if self.is_terminated() {
            return Err(StatsError::Terminated);
        }
        if self.current_tag.is_some() && self.active_kind().is_some() {
            self.pending_text
                .get_or_insert_with(String::new)
                .push_str(content);
        }
        Ok(())
    }

    pub fn close_tag(&mut self, name: &str) -> StatsResult<Option<StatsEvent>> {
        if self.is_terminated() {
            return Err(StatsError::Terminated);
        }
        if self.depth == 0 {
            self.fail();
            return Err(StatsError::UnbalancedClose { name: name.to_string() });
        }

        if self.current_tag.as_deref() == Some(name) {
            self.commit_field(name);
        }
        let closed = match (&self.state, self.depth, name) {
            (State::InListener { .. }, LISTENER_DEPTH, LISTENER_TAG) => Some(EntityKind::Listener),
            (State::InSource { .. }, SOURCE_DEPTH, SOURCE_TAG) => Some(EntityKind::Source),
            (_, ROOT_DEPTH, _) => Some(EntityKind::Server),
            _ => None,
        };
        self.depth -= 1;
        self.current_tag = None;
        self.pending_text = None;

        let emitted = match closed {
            Some(EntityKind::Listener) => {
                let mount = self.current_mount().map(str::to_string);
                self.state = State::InSource { mount };
                self.listener.take()
            }
            Some(EntityKind::Source) => {
                self.state = State::InServer;
                self.listener = None;
                self.source.take()
            }
            Some(EntityKind::Server) => {
                self.state = State::Closed;
                self.server.take()
            }
            None => None,
        };

        Ok(emitted.map(|record| {
            tracing::trace!(kind = %record.kind(), mount = ?record.mount(), "stats entity");
            StatsEvent::from_record(record)
        }))
    }

    /// End of the token stream. Fails if elements are still open.
    pub fn end(&mut self) -> StatsResult<StatsEvent> {
        if self.is_terminated() {
            return Err(StatsError::Terminated);
        }
        if self.depth > 0 {
            let depth = self.depth;
            self.fail();
            return Err(StatsError::UnexpectedEof { depth });
        }
        self.state = State::Finished;
        Ok(StatsEvent::Finished)
    }

    /// Entity kind whose fields live at the current depth, if any.
    fn active_kind(&self) -> Option<EntityKind> {
        match (&self.state, self.depth) {
            (State::InServer, SERVER_FIELD_DEPTH) => Some(EntityKind::Server),
            (State::InSource { .. }, SOURCE_FIELD_DEPTH) => Some(EntityKind::Source),
            (State::InListener { .. }, LISTENER_FIELD_DEPTH) => Some(EntityKind::Listener),
            _ => None,
        }
    }

    fn commit_field(&mut self, tag: &str) {
        // Elements without text leave the field null.
        let Some(text) = self.pending_text.take() else {
            return;
        };
        let Some(kind) = self.active_kind() else {
            return;
        };
        let field = normalize_name(tag);
        let value = normalize_data(&field, &[text]);
        let slot = match kind {
            EntityKind::Server => &mut self.server,
            EntityKind::Source => &mut self.source,
            EntityKind::Listener => &mut self.listener,
        };
        if let Some(record) = slot {
            record.set(field, value);
        }
    }

    fn fail(&mut self) {
        self.state = State::Failed;
        self.current_tag = None;
        self.pending_text = None;
        self.server = None;
        self.source = None;
        self.listener = None;
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
