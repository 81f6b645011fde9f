//! Normalizer: maps raw field tokens to canonical names and typed values.
//!
//! Both decoders funnel every field through here: the feed decoder for the
//! third token of an `EVENT` line, the stats decoder for element names. The
//! functions are pure and hold no state.
//!
//! Typing is decided by the canonical name alone:
//!
//! | Canonical name           | Result                                  |
//! |--------------------------|-----------------------------------------|
//! | `audioInfo`              | [`Value::Mapping`] of `key=value` pairs |
//! | `delete`, `flush`        | no payload                              |
//! | one of [`INTEGER_FIELDS`]| [`Value::Integer`] of the first token   |
//! | anything else            | [`Value::String`], tokens joined by ` ` |

use std::collections::BTreeMap;

use crate::types::{Integer, Value};

// ---------------------------------------------------------------------------
// Tables
// ---------------------------------------------------------------------------

/// Raw names whose camel-cased form is wrong. Consulted before camel-casing.
pub static NAME_EXCEPTIONS: phf::Map<&'static str, &'static str> = phf::phf_map! {
    "audio_codecid" => "audioCodecId",
    "ID" => "id",
    "IP" => "ip",
    "listenurl" => "listenUrl",
    "mpeg_samplerate" => "mpegSampleRate",
    "outgoing_kbitrate" => "outgoingKBitrate",
    "total_mbytes_sent" => "totalMBytesSent",
    "stream_kbytes_read" => "streamKBytesRead",
    "stream_kbytes_sent" => "streamKBytesSent",
};

/// Canonical names whose value is parsed as a base-10 integer.
pub static INTEGER_FIELDS: phf::Set<&'static str> = phf::phf_set! {
    "audioCodecId",
    "bannedIPs",
    "bitrate",
    "build",
    "clientConnections",
    "clients",
    "connected",
    "connections",
    "fileConnections",
    "incomingBitrate",
    "listenerConnections",
    "listenerPeak",
    "listeners",
    "maxListeners",
    "mpegChannels",
    "mpegSampleRate",
    "outgoingKBitrate",
    "public",
    "queueSize",
    "slowListeners",
    "sourceClientConnections",
    "sourceRelayConnections",
    "sources",
    "sourceTotalConnections",
    "stats",
    "statsConnections",
    "streamKBytesRead",
    "streamKBytesSent",
    "totalBytesRead",
    "totalBytesSent",
    "totalMBytesSent",
};

/// Canonical names known to carry free text. Membership does not change the
/// result (unknown names are text too); it documents the vocabulary.
pub static STRING_FIELDS: phf::Set<&'static str> = phf::phf_set! {
    "admin",
    "authenticator",
    "genre",
    "host",
    "id",
    "info",
    "ip",
    "lag",
    "listenUrl",
    "location",
    "metadataUpdated",
    "mount",
    "new",
    "referer",
    "serverDescription",
    "serverId",
    "serverName",
    "serverStart",
    "serverType",
    "serverUrl",
    "sourceIp",
    "streamStart",
    "title",
    "userAgent",
    "ypCurrentlyPlaying",
};

/// Canonical name of the `key=value;...` audio parameter composite.
pub const AUDIO_INFO: &str = "audioInfo";

/// Canonical names of events that carry no payload.
pub const PAYLOADLESS: &[&str] = &["delete", "flush"];

// ---------------------------------------------------------------------------
// Field typing
// ---------------------------------------------------------------------------

/// How a canonical field's raw tokens are turned into a [`Value`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    AudioInfo,
    Empty,
    Integer,
    String,
}

pub fn field_type(name: &str) -> FieldType {
    if name == AUDIO_INFO {
        FieldType::AudioInfo
    } else if PAYLOADLESS.contains(&name) {
        FieldType::Empty
    } else if INTEGER_FIELDS.contains(name) {
        FieldType::Integer
    } else {
        FieldType::String
    }
}

/// Whether `name` belongs to the documented vocabulary.
pub fn is_known_field(name: &str) -> bool {
    name == AUDIO_INFO
        || PAYLOADLESS.contains(&name)
        || INTEGER_FIELDS.contains(name)
        || STRING_FIELDS.contains(name)
}

// ---------------------------------------------------------------------------
// Names
// ---------------------------------------------------------------------------

/// Canonical name for a raw field token.
///
/// Exceptions win outright; everything else is lower-camel-cased on space,
/// underscore and hyphen (`client_connections` → `clientConnections`,
/// `UserAgent` → `userAgent`, `banned_IPs` → `bannedIPs`).
pub fn normalize_name(raw: &str) -> String {
    if let Some(name) = NAME_EXCEPTIONS.get(raw) {
        return (*name).to_string();
    }
    camelize(raw)
}

fn is_delimiter(c: char) -> bool {
    c == '_' || c == '-' || c.is_whitespace()
}

fn camelize(raw: &str) -> String {
    let mut joined = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if !is_delimiter(c) {
            joined.push(c);
            continue;
        }
        // The character after a delimiter is upper-cased, unless it is a
        // delimiter itself, in which case both are dropped.
        if let Some(next) = chars.next() {
            if !is_delimiter(next) {
                joined.extend(next.to_uppercase());
            }
        }
    }

    let mut chars = joined.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => joined,
    }
}

// ---------------------------------------------------------------------------
// Data
// ---------------------------------------------------------------------------

/// Typed value for the canonical field `name` given its raw tokens.
///
/// Returns `None` only for payload-less fields. Integer and composite fields
/// read the first token; text fields re-join all tokens with single spaces,
/// preserving embedded spacing.
pub fn normalize_data<S: AsRef<str>>(name: &str, params: &[S]) -> Option<Value> {
    let first = params.first().map(AsRef::as_ref).unwrap_or("");
    match field_type(name) {
        FieldType::AudioInfo => Some(Value::Mapping(parse_audio_info(first))),
        FieldType::Empty => None,
        FieldType::Integer => Some(Value::Integer(parse_integer(first))),
        FieldType::String => {
            let tokens: Vec<&str> = params.iter().map(AsRef::as_ref).collect();
            Some(Value::String(tokens.join(" ")))
        }
    }
}

/// Lenient base-10 integer parse.
///
/// Leading whitespace is skipped, an optional sign is accepted, and the
/// longest run of ASCII digits is consumed; anything after it is ignored
/// (`"128kbps"` → 128). No digits at all, or a value outside `i64`, yields
/// [`Integer::NaN`].
pub fn parse_integer(text: &str) -> Integer {
    let text = text.trim_start();
    let (negative, digits) = match text.as_bytes().first() {
        Some(b'-') => (true, &text[1..]),
        Some(b'+') => (false, &text[1..]),
        _ => (false, text),
    };
    let end = digits
        .bytes()
        .position(|b| !b.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 {
        return Integer::NaN;
    }

    let mut value: i64 = 0;
    for b in digits[..end].bytes() {
        let digit = i64::from(b - b'0');
        let next = value.checked_mul(10).and_then(|v| {
            if negative {
                v.checked_sub(digit)
            } else {
                v.checked_add(digit)
            }
        });
        match next {
            Some(v) => value = v,
            None => return Integer::NaN,
        }
    }
    Integer::Finite(value)
}

/// Parse `channels=2;samplerate=44100;bitrate=64` into an integer mapping.
///
/// Empty segments are skipped; a segment without `=` maps its key to
/// [`Integer::NaN`].
pub fn parse_audio_info(text: &str) -> BTreeMap<String, Integer> {
    text.split(';')
        .filter(|item| !item.is_empty())
        .map(|item| {
            let (key, value) = item.split_once('=').unwrap_or((item, ""));
            (key.to_string(), parse_integer(value))
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{LISTENER_TAGS, SERVER_TAGS, SOURCE_TAGS};
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case::exception_codec("audio_codecid", "audioCodecId")]
    #[case::exception_listenurl("listenurl", "listenUrl")]
    #[case::exception_id("ID", "id")]
    #[case::exception_ip("IP", "ip")]
    #[case::exception_samplerate("mpeg_samplerate", "mpegSampleRate")]
    #[case::exception_kbitrate("outgoing_kbitrate", "outgoingKBitrate")]
    #[case::exception_mbytes("total_mbytes_sent", "totalMBytesSent")]
    #[case::exception_kbytes_read("stream_kbytes_read", "streamKBytesRead")]
    #[case::exception_kbytes_sent("stream_kbytes_sent", "streamKBytesSent")]
    #[case::underscore("client_connections", "clientConnections")]
    #[case::initialism_tail("banned_IPs", "bannedIPs")]
    #[case::pascal("UserAgent", "userAgent")]
    #[case::capitalised("Connected", "connected")]
    #[case::hyphen("yp-currently-playing", "ypCurrentlyPlaying")]
    #[case::space("server name", "serverName")]
    #[case::plain("bitrate", "bitrate")]
    #[case::doubled_delimiter("a__b", "ab")]
    #[case::trailing_delimiter("title_", "title")]
    #[case::empty("", "")]
    fn names(#[case] raw: &str, #[case] expected: &str) {
        assert_eq!(normalize_name(raw), expected);
    }

    #[test]
    fn exception_table_overrides_camel_casing() {
        // Generic camel-casing would give "audioCodecid" and "iD".
        assert_eq!(camelize("audio_codecid"), "audioCodecid");
        assert_eq!(camelize("ID"), "iD");
        assert_eq!(normalize_name("audio_codecid"), "audioCodecId");
        assert_eq!(normalize_name("ID"), "id");
    }

    #[rstest]
    #[case("64", Integer::Finite(64))]
    #[case("-1", Integer::Finite(-1))]
    #[case("+7", Integer::Finite(7))]
    #[case("  42", Integer::Finite(42))]
    #[case("20150616004931", Integer::Finite(20_150_616_004_931))]
    #[case("128kbps", Integer::Finite(128))]
    #[case("0", Integer::Finite(0))]
    #[case("unlimited", Integer::NaN)]
    #[case("", Integer::NaN)]
    #[case("-", Integer::NaN)]
    #[case("99999999999999999999", Integer::NaN)]
    #[case("-9223372036854775808", Integer::Finite(i64::MIN))]
    fn integers(#[case] text: &str, #[case] expected: Integer) {
        assert_eq!(parse_integer(text), expected);
    }

    #[test]
    fn audio_info_becomes_mapping() {
        let value = normalize_data(AUDIO_INFO, &["channels=2;samplerate=44100;bitrate=64"]).unwrap();
        let expected: BTreeMap<String, Integer> = [
            ("channels".to_string(), Integer::Finite(2)),
            ("samplerate".to_string(), Integer::Finite(44100)),
            ("bitrate".to_string(), Integer::Finite(64)),
        ]
        .into_iter()
        .collect();
        assert_eq!(value, Value::Mapping(expected));
    }

    #[test]
    fn audio_info_tolerates_odd_segments() {
        let map = parse_audio_info("channels=2;;quality;");
        assert_eq!(map.len(), 2);
        assert_eq!(map["channels"], Integer::Finite(2));
        assert_eq!(map["quality"], Integer::NaN);
    }

    #[test]
    fn payloadless_fields_have_no_data() {
        assert_eq!(normalize_data("delete", &["ignored"]), None);
        assert_eq!(normalize_data::<&str>("flush", &[]), None);
    }

    #[test]
    fn integer_fields_read_first_token_only() {
        assert_eq!(normalize_data("bitrate", &["64", "kbps"]), Some(Value::from(64)));
        assert_eq!(
            normalize_data::<&str>("listeners", &[]),
            Some(Value::Integer(Integer::NaN))
        );
    }

    #[test]
    fn text_fields_rejoin_tokens() {
        let tokens = ["Werkdiscs", "-", "Helena", "", "Hauff"];
        assert_eq!(
            normalize_data("title", &tokens),
            Some(Value::from("Werkdiscs - Helena  Hauff"))
        );
        // Unknown names fall through to text.
        assert_eq!(normalize_data("somethingNew", &["12"]), Some(Value::from("12")));
    }

    #[test]
    fn every_schema_tag_maps_into_the_vocabulary() {
        for tag in SERVER_TAGS.iter().chain(SOURCE_TAGS).chain(LISTENER_TAGS) {
            let name = normalize_name(tag);
            assert!(is_known_field(&name), "{tag} normalises to unknown field {name}");
        }
    }

    #[test]
    fn every_exception_target_is_typed() {
        for (raw, name) in NAME_EXCEPTIONS.entries() {
            assert!(is_known_field(name), "exception {raw} -> {name} is not in the vocabulary");
        }
    }

    #[test]
    fn integer_and_string_sets_are_disjoint() {
        for name in INTEGER_FIELDS.iter() {
            assert!(!STRING_FIELDS.contains(name), "{name} is in both sets");
            assert_eq!(field_type(name), FieldType::Integer);
        }
        for name in STRING_FIELDS.iter() {
            assert_eq!(field_type(name), FieldType::String);
        }
    }
}
