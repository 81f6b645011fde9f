//! Element names collected from stats documents, per entity kind.
//!
//! Names are the raw element names as the server writes them; records are
//! keyed by their [`normalize_name`](crate::normalizer::normalize_name) form.
//! Elements not listed here are skipped by the decoder.

/// Root element of every stats document.
pub const ROOT_TAG: &str = "icestats";

/// Element introducing a source; carries the mount in its `mount` attribute.
pub const SOURCE_TAG: &str = "source";

/// Element introducing a listener inside a source.
pub const LISTENER_TAG: &str = "listener";

/// Attribute of [`SOURCE_TAG`] naming the mount point.
pub const MOUNT_ATTRIBUTE: &str = "mount";

pub const SERVER_TAGS: &[&str] = &[
    "admin",
    "banned_IPs",
    "build",
    "client_connections",
    "clients",
    "connections",
    "file_connections",
    "host",
    "listener_connections",
    "listeners",
    "location",
    "outgoing_kbitrate",
    "server_id",
    "server_start",
    "source_client_connections",
    "source_relay_connections",
    "sources",
    "source_total_connections",
    "stats",
    "stats_connections",
    "stream_kbytes_read",
    "stream_kbytes_sent",
];

pub const SOURCE_TAGS: &[&str] = &[
    "audio_codecid",
    "audio_info",
    "authenticator",
    "bitrate",
    "connected",
    "genre",
    "incoming_bitrate",
    "listener_connections",
    "listener_peak",
    "listeners",
    "listenurl",
    "max_listeners",
    "metadata_updated",
    "mpeg_channels",
    "mpeg_samplerate",
    "outgoing_kbitrate",
    "public",
    "queue_size",
    "server_description",
    "server_name",
    "server_type",
    "server_url",
    "slow_listeners",
    "source_ip",
    "stream_start",
    "title",
    "total_bytes_read",
    "total_bytes_sent",
    "total_mbytes_sent",
    "yp_currently_playing",
];

pub const LISTENER_TAGS: &[&str] = &["ID", "IP", "UserAgent", "Referer", "lag", "Connected"];
