//! Error types for the feed and stats decoders.
//!
//! Feed decoding is total: malformed lines still produce events, so the only
//! feed failure is the transport. Stats decoding fails on malformed XML and on
//! structure the decoder cannot attribute to an entity.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum FeedError {
    #[error("feed transport: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Error)]
pub enum StatsError {
    #[error("malformed stats XML: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("malformed attribute: {0}")]
    Attribute(#[from] quick_xml::events::attributes::AttrError),

    #[error("element or attribute name is not UTF-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    #[error("stats document ended with {depth} element(s) still open")]
    UnexpectedEof { depth: usize },

    #[error("closing tag </{name}> has no matching open element")]
    UnbalancedClose { name: String },

    #[error("element <{name}> after the end of the stats document")]
    TrailingElement { name: String },

    #[error("stats decoder already finished or failed")]
    Terminated,
}

pub type StatsResult<T> = Result<T, StatsError>;
