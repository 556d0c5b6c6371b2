use proptest::prelude::*;
use std::collections::HashSet;
use std::str::FromStr;
use tuneup_types::{ActivationKey, Error, Fingerprint, UNBOUND_SENTINEL};

// ── ActivationKey ─────────────────────────────────────────────────

#[test]
fn generated_keys_are_unique() {
    let keys: HashSet<ActivationKey> = (0..100).map(|_| ActivationKey::generate()).collect();
    assert_eq!(keys.len(), 100);
}

#[test]
fn generated_key_is_uuid() {
    let key = ActivationKey::generate();
    assert!(uuid::Uuid::parse_str(key.as_str()).is_ok());
}

#[test]
fn key_parse_trims_whitespace() {
    let key = ActivationKey::parse("  ABC-123\n").unwrap();
    assert_eq!(key.as_str(), "ABC-123");
}

#[test]
fn key_parse_rejects_empty() {
    assert!(matches!(ActivationKey::parse(""), Err(Error::EmptyKey)));
    assert!(matches!(ActivationKey::parse("   "), Err(Error::EmptyKey)));
}

#[test]
fn key_display_and_from_str() {
    let key = ActivationKey::from_str("ABC").unwrap();
    assert_eq!(key.to_string(), "ABC");
}

#[test]
fn key_serde_is_transparent() {
    let key = ActivationKey::parse("ABC").unwrap();
    assert_eq!(serde_json::to_string(&key).unwrap(), "\"ABC\"");
}

#[test]
fn wire_key_keeps_whitespace() {
    let key = ActivationKey::from_wire(" ABC").unwrap();
    assert_eq!(key.as_str(), " ABC");
    assert_ne!(key, ActivationKey::parse("ABC").unwrap());
    assert!(matches!(ActivationKey::from_wire(""), Err(Error::EmptyKey)));
}

#[test]
fn redacted_key_hides_most_of_it() {
    let key = ActivationKey::parse("1b4e28ba-2fa1-11d2-883f-0016d3cca427").unwrap();
    assert_eq!(key.redacted(), "1b4e28ba...");
    assert_eq!(ActivationKey::parse("ABC").unwrap().redacted(), "A...");
    assert_eq!(ActivationKey::parse("X").unwrap().redacted(), "...");
}

// ── Fingerprint ───────────────────────────────────────────────────

#[test]
fn fingerprint_parse_accepts_opaque_values() {
    let fp = Fingerprint::parse("h1").unwrap();
    assert_eq!(fp.as_str(), "h1");
}

#[test]
fn fingerprint_rejects_empty() {
    assert!(matches!(Fingerprint::parse(""), Err(Error::EmptyFingerprint)));
}

#[test]
fn fingerprint_rejects_unbound_marker() {
    assert!(matches!(
        Fingerprint::parse(UNBOUND_SENTINEL),
        Err(Error::ReservedFingerprint)
    ));
}

#[test]
fn wire_fingerprint_keeps_whitespace_but_not_marker() {
    assert_eq!(Fingerprint::from_wire(" h1").unwrap().as_str(), " h1");
    assert!(matches!(Fingerprint::from_wire(""), Err(Error::EmptyFingerprint)));
    assert!(matches!(
        Fingerprint::from_wire(UNBOUND_SENTINEL),
        Err(Error::ReservedFingerprint)
    ));
}

proptest! {
    #[test]
    fn non_blank_keys_survive_parse(s in "[A-Za-z0-9-]{1,64}") {
        let key = ActivationKey::parse(&s).unwrap();
        prop_assert_eq!(key.as_str(), s.as_str());
    }
}
