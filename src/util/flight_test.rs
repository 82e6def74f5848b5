use super::*;

#[test]
fn accepts_common_formats() {
    for ok in ["SK1415", "dy4", "LH400", "  ba12  ", "ABC1234"] {
        assert!(is_valid_flight_number(ok), "{ok}");
    }
}

#[test]
fn rejects_malformed() {
    for bad in ["", "S1", "ABCD1", "SK", "SK12345", "SK 123", "1SK23", "SK12a", "ÅÄ12"] {
        assert!(!is_valid_flight_number(bad), "{bad}");
    }
}

#[test]
fn normalizes_case_and_whitespace() {
    assert_eq!(normalize_flight_number(" sk1415 ").as_deref(), Some("SK1415"));
    assert_eq!(normalize_flight_number("nope"), None);
}
