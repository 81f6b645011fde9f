//! Event dispatch: three-tier fan-out of decoded feed events.
//!
//! Every decoded line is published to three topics in a fixed order: `*`,
//! the scope wildcard (`server.*` or `mount.*`), then the exact event name.
//! Each subscriber owns an independent unbounded channel, so a subscriber
//! that went away is pruned without affecting delivery to anyone else.

use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use icestats_core::{FeedEvent, Scope};
use tokio::sync::mpsc;

// ---------------------------------------------------------------------------
// Topics
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Topic {
    /// `*`: every event.
    All,
    /// `server.*` / `mount.*`.
    Scope(Scope),
    /// An exact event name such as `mount.title`.
    Event(String),
}

impl Topic {
    /// The three topics `event` is published to, in publication order.
    pub fn tiers(event: &FeedEvent) -> [Topic; 3] {
        [
            Topic::All,
            Topic::Scope(event.scope()),
            Topic::Event(event.name.clone()),
        ]
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Topic::All => write!(f, "*"),
            Topic::Scope(scope) => write!(f, "{scope}.*"),
            Topic::Event(name) => write!(f, "{name}"),
        }
    }
}

impl FromStr for Topic {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "*" => Topic::All,
            "server.*" => Topic::Scope(Scope::Server),
            "mount.*" => Topic::Scope(Scope::Mount),
            name => Topic::Event(name.to_string()),
        })
    }
}

// ---------------------------------------------------------------------------
// Notifications
// ---------------------------------------------------------------------------

/// One delivery of an event on one topic. All three deliveries of a line
/// share the same event allocation.
#[derive(Debug, Clone)]
pub struct Notification {
    pub topic: Topic,
    pub event: Arc<FeedEvent>,
}

pub type Subscription = mpsc::UnboundedReceiver<Notification>;

// ---------------------------------------------------------------------------
// Dispatcher
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct Dispatcher {
    subscribers: Vec<(Topic, mpsc::UnboundedSender<Notification>)>,
}

impl Dispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe to `topic` on a fresh channel.
    pub fn subscribe(&mut self, topic: Topic) -> Subscription {
        let (tx, rx) = mpsc::unbounded_channel();
        self.attach(topic, tx);
        rx
    }

    /// Subscribe an existing sender. Attaching one sender to several topics
    /// makes the publication order observable on a single channel.
    pub fn attach(&mut self, topic: Topic, tx: mpsc::UnboundedSender<Notification>) {
        self.subscribers.push((topic, tx));
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    /// Publish `event` on all three tiers and return the number of deliveries.
    pub fn publish(&mut self, event: FeedEvent) -> usize {
        let event = Arc::new(event);
        Topic::tiers(&event)
            .into_iter()
            .map(|topic| self.deliver(topic, &event))
            .sum()
    }

    fn deliver(&mut self, topic: Topic, event: &Arc<FeedEvent>) -> usize {
        let mut delivered = 0;
        self.subscribers.retain(|(subscribed, tx)| {
            if *subscribed != topic {
                return true;
            }
            let notification = Notification {
                topic: topic.clone(),
                event: Arc::clone(event),
            };
            match tx.send(notification) {
                Ok(()) => {
                    delivered += 1;
                    true
                }
                Err(_) => {
                    tracing::debug!(%topic, "feed subscriber dropped, removing");
                    false
                }
            }
        });
        delivered
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
