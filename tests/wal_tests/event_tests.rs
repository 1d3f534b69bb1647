//! Tests for the event line codec
//!
//! These tests verify:
//! - Exact line layout for puts and deletes
//! - Decoding of well-formed lines
//! - Rejection of malformed lines
//! - The tab/newline restriction on keys and values

use shardkv::wal::{Event, EventKind, Mutation};
use shardkv::KvError;

// =============================================================================
// Encoding Tests
// =============================================================================

#[test]
fn test_encode_put() {
    let event = Event::put(1, "hello", "world");
    assert_eq!(event.encode(), "1\t0\thello\tworld");
}

#[test]
fn test_encode_put_empty_value() {
    let event = Event::put(2, "hello", "");
    assert_eq!(event.encode(), "2\t0\thello\t");
}

#[test]
fn test_encode_delete() {
    let event = Event::delete(3, "key");
    assert_eq!(event.encode(), "3\t1\tkey\t");
}

#[test]
fn test_encode_delete_keeps_stray_value() {
    let event = Event {
        id: 4,
        kind: EventKind::Delete,
        key: "key".to_string(),
        value: "unusedValue".to_string(),
    };
    assert_eq!(event.encode(), "4\t1\tkey\tunusedValue");
}

#[test]
fn test_display_matches_encode() {
    let event = Event::put(9, "k", "v");
    assert_eq!(event.to_string(), event.encode());
}

#[test]
fn test_kind_codes() {
    assert_eq!(EventKind::Put.code(), 0);
    assert_eq!(EventKind::Delete.code(), 1);
    assert_eq!(EventKind::from_code(0), Some(EventKind::Put));
    assert_eq!(EventKind::from_code(1), Some(EventKind::Delete));
    assert_eq!(EventKind::from_code(2), None);
}

// =============================================================================
// Decoding Tests
// =============================================================================

#[test]
fn test_decode_put() {
    let event = Event::decode("7\t0\thello\tworld").unwrap();
    assert_eq!(event, Event::put(7, "hello", "world"));
}

#[test]
fn test_decode_delete() {
    let event = Event::decode("8\t1\tkey\t").unwrap();
    assert_eq!(event, Event::delete(8, "key"));
}

#[test]
fn test_decode_value_with_spaces() {
    let event = Event::decode("5\t0\tgreeting\thello, world!").unwrap();
    assert_eq!(event.value, "hello, world!");
}

#[test]
fn test_decode_empty_key() {
    let event = Event::decode("1\t0\t\thello, world!").unwrap();
    assert_eq!(event.key, "");
    assert_eq!(event.value, "hello, world!");
}

#[test]
fn test_round_trip_unicode() {
    let event = Event::put(u64::MAX, "ключ", "値 ✓");
    assert_eq!(Event::decode(&event.encode()).unwrap(), event);
}

// =============================================================================
// Malformed Input Tests
// =============================================================================

#[test]
fn test_decode_too_few_fields() {
    let result = Event::decode("1\t0\tkey");
    assert!(matches!(result, Err(KvError::MalformedRecord(_))));
}

#[test]
fn test_decode_too_many_fields() {
    let result = Event::decode("1\t0\tkey\tvalue\textra");
    assert!(matches!(result, Err(KvError::MalformedRecord(_))));
}

#[test]
fn test_decode_empty_line() {
    assert!(matches!(Event::decode(""), Err(KvError::MalformedRecord(_))));
}

#[test]
fn test_decode_non_numeric_id() {
    let result = Event::decode("abc\t0\tkey\tvalue");
    assert!(matches!(result, Err(KvError::MalformedRecord(_))));
}

#[test]
fn test_decode_negative_id() {
    let result = Event::decode("-1\t0\tkey\tvalue");
    assert!(matches!(result, Err(KvError::MalformedRecord(_))));
}

#[test]
fn test_decode_rejects_non_canonical_numbers() {
    // Each of these parses as an integer but would encode differently
    for line in [
        "+5\t0\tkey\tvalue",
        "5\t+0\tkey\tvalue",
        "007\t0\tkey\tvalue",
        "5\t01\tkey\tvalue",
        " 5\t0\tkey\tvalue",
    ] {
        assert!(
            matches!(Event::decode(line), Err(KvError::MalformedRecord(_))),
            "accepted {:?}",
            line
        );
    }

    // Zero itself is canonical
    assert_eq!(Event::decode("0\t0\tk\tv").unwrap(), Event::put(0, "k", "v"));
}

#[test]
fn test_decode_non_numeric_kind() {
    let result = Event::decode("1\tput\tkey\tvalue");
    assert!(matches!(result, Err(KvError::MalformedRecord(_))));
}

#[test]
fn test_decode_unknown_kind() {
    let result = Event::decode("1\t7\tkey\tvalue");
    assert!(matches!(result, Err(KvError::MalformedRecord(_))));
}

// =============================================================================
// Field Restriction Tests
// =============================================================================

#[test]
fn test_check_field_accepts_plain_text() {
    assert!(Event::check_field("key", "plain text, with spaces").is_ok());
    assert!(Event::check_field("value", "").is_ok());
}

#[test]
fn test_check_field_rejects_tab_and_newline() {
    assert!(matches!(
        Event::check_field("key", "a\tb"),
        Err(KvError::InvalidField { field: "key" })
    ));
    assert!(matches!(
        Event::check_field("value", "line\nbreak"),
        Err(KvError::InvalidField { field: "value" })
    ));
}

#[test]
fn test_embedded_tab_breaks_round_trip() {
    // Not escaped: a tab in the value produces a fifth field
    let event = Event::put(1, "key", "a\tb");
    assert!(Event::decode(&event.encode()).is_err());
}

// =============================================================================
// Mutation Tests
// =============================================================================

#[test]
fn test_mutation_into_event() {
    let put = Mutation::Put {
        key: "k".to_string(),
        value: "v".to_string(),
    };
    assert_eq!(put.into_event(3), Event::put(3, "k", "v"));

    let delete = Mutation::Delete { key: "k".to_string() };
    assert_eq!(delete.into_event(4), Event::delete(4, "k"));
}
