//! Domain-specific assertion macros for icestats harnesses.
//!
//! These wrap `pretty_assertions` and add context-rich failure messages that
//! make it clear which record field or which dispatch tier went wrong.

use icestats::{Notification, Scope};

// ---------------------------------------------------------------------------
// Record assertions
// ---------------------------------------------------------------------------

/// Assert that a record's field holds the expected value.
///
/// ```rust
/// assert_field!(source, "bitrate", 128);
/// assert_field!(source, "genre", "Misc");
/// ```
#[macro_export]
macro_rules! assert_field {
    ($record:expr, $key:expr, $value:expr) => {{
        let record: &icestats::EntityRecord = &$record;
        let key: &str = $key;
        let expected: icestats::Value = ::std::convert::Into::into($value);
        match record.get(key) {
            Some(actual) if *actual == expected => {}
            Some(actual) => panic!(
                "assert_field! failed:\n  {}[{:?}]\n  expected: {:?}\n  actual:   {:?}",
                record.kind(),
                key,
                expected,
                actual
            ),
            None if record.contains(key) => panic!(
                "assert_field! failed: {}[{:?}] is null, expected {:?}",
                record.kind(),
                key,
                expected
            ),
            None => panic!(
                "assert_field! failed: {:?} is not a {} field.\n  Available: {:?}",
                key,
                record.kind(),
                record.fields().map(|(k, _)| k).collect::<Vec<_>>()
            ),
        }
    }};
}

/// Assert that a field is part of the record's key set but holds no value.
#[macro_export]
macro_rules! assert_null_field {
    ($record:expr, $key:expr) => {{
        let record: &icestats::EntityRecord = &$record;
        let key: &str = $key;
        if !record.contains(key) {
            panic!("assert_null_field! failed: {:?} is not a {} field", key, record.kind());
        }
        if let Some(actual) = record.get(key) {
            panic!(
                "assert_null_field! failed: {}[{:?}] = {:?}, expected null",
                record.kind(),
                key,
                actual
            );
        }
    }};
}

// ---------------------------------------------------------------------------
// Dispatch assertions
// ---------------------------------------------------------------------------

/// Assert that the three tiers of one decoded line agree with each other and
/// with the expected event name.
pub fn assert_tiers(all: &Notification, scope: &Notification, exact: &Notification, name: &str) {
    pretty_assertions::assert_eq!(all.event.name, name, "`*` carried the wrong event");
    pretty_assertions::assert_eq!(scope.event.name, name, "scope wildcard carried the wrong event");
    pretty_assertions::assert_eq!(exact.event.name, name, "exact topic carried the wrong event");
    pretty_assertions::assert_eq!(all.event.data, exact.event.data);
    pretty_assertions::assert_eq!(scope.event.data, exact.event.data);

    let expected_scope = if exact.event.mount.is_some() {
        Scope::Mount
    } else {
        Scope::Server
    };
    pretty_assertions::assert_eq!(
        scope.topic,
        icestats::Topic::Scope(expected_scope),
        "event with mount {:?} went to the wrong scope wildcard",
        exact.event.mount
    );
}
