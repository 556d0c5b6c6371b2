use proptest::prelude::*;
use tuneup_license::is_valid_email;

#[test]
fn accepts_plain_addresses() {
    assert!(is_valid_email("user@example.com"));
    assert!(is_valid_email("a.b@c.io"));
    assert!(is_valid_email("first-last@mail.example.co.uk"));
    assert!(is_valid_email("under_score@x.org"));
}

#[test]
fn rejects_malformed_addresses() {
    assert!(!is_valid_email("not-an-email"));
    assert!(!is_valid_email("user@localhost"));
    assert!(!is_valid_email("@example.com"));
    assert!(!is_valid_email("user@.com"));
    assert!(!is_valid_email("user@example."));
    assert!(!is_valid_email("a@b@c.com"));
    assert!(!is_valid_email("user name@example.com"));
    assert!(!is_valid_email(""));
}

#[test]
fn non_ascii_word_characters_are_rejected() {
    assert!(!is_valid_email("jöhn@example.com"));
    assert!(!is_valid_email("user@exämple.com"));
    assert!(is_valid_email("john_doe@example.com"));
}

proptest! {
    #[test]
    fn well_formed_addresses_pass(
        local in "[a-z0-9_]{1,12}",
        domain in "[a-z0-9]{1,12}",
        tld in "[a-z]{2,6}",
    ) {
        let email = format!("{local}@{domain}.{tld}");
        prop_assert!(is_valid_email(&email));
    }

    #[test]
    fn dotless_domains_fail(local in "[a-z0-9]{1,12}", host in "[a-z0-9]{1,12}") {
        let email = format!("{local}@{host}");
        prop_assert!(!is_valid_email(&email));
    }
}
