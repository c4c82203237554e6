//! Adversarial Property-Based Tests for Configuration Parsing
//!
//! # Attack Plan
//!
//! 1. **Timeout Attacks**: Negative numbers (as string), overflow, float,
//!    scientific notation, unicode digits.
//!
//! 2. **URL Abuse**: Missing scheme, other schemes, whitespace, repeated
//!    trailing slashes, very long hosts.
//!
//! 3. **Time Zone Names**: Unknown zones, path traversal, empty and
//!    whitespace-only values.
//!
//! 4. **Empty vs Missing Fields**: An empty value falls back to the default
//!    for URL and time zone, but is a parse error for the timeout.
//!
//! # Invariants
//!
//! - from_getter never panics on any input
//! - validate() never panics (may return Err)
//! - day_url() always ends in "/{Weekday}.json" and never contains "//{Weekday}"
//! - Invalid REFRESH_INTERVAL_SECS falls back to 0 (disabled)

use proptest::prelude::*;
use std::collections::HashMap;

use onair::config::{Config, DEFAULT_SCHEDULE_BASE_URL};
use onair::schedule::WEEKDAY_NAMES;

// ============================================================================
// ADVERSARIAL GENERATORS
// ============================================================================

/// Generate malformed second counts
fn malformed_seconds() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("-1".to_string()),
        Just("-0".to_string()),
        Just("18446744073709551616".to_string()), // u64::MAX + 1
        Just("10.5".to_string()),
        Just("1e3".to_string()),
        Just("".to_string()),
        Just("   ".to_string()),
        Just("ten".to_string()),
        Just("NaN".to_string()),
        Just("١٠".to_string()),  // Arabic-Indic digits for 10
        Just("１０".to_string()), // Fullwidth
        Just("10\x00".to_string()),
        Just("10\r\n".to_string()),
        Just(" 10".to_string()),
        Just("0x10".to_string()),
    ]
}

/// Generate questionable base URLs
fn dangerous_url() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("https://example.com/shows".to_string()),
        Just("http://127.0.0.1:8080".to_string()),
        Just("example.com/shows".to_string()),
        Just("ftp://example.com/shows".to_string()),
        Just("file:///etc/passwd".to_string()),
        Just("javascript:alert(1)".to_string()),
        Just("https://example.com/shows///".to_string()),
        Just("  https://example.com/shows  ".to_string()),
        Just("https://".to_string() + &"a".repeat(10000) + ".com"),
        Just("https://example.com/\u{200B}shows".to_string()),
        Just("https://example.com/shows?day=".to_string()),
    ]
}

/// Generate time zone names, mostly bogus
fn dangerous_timezone() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("America/New_York".to_string()),
        Just("UTC".to_string()),
        Just("Mars/Olympus_Mons".to_string()),
        Just("../../etc/localtime".to_string()),
        Just("EST5EDT".to_string()),
        Just("+05:00".to_string()),
        Just("America/New_York\x00".to_string()),
        Just("a".repeat(10000)),
    ]
}

// ============================================================================
// INVARIANT: from_getter NEVER PANICS
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(1000))]

    #[test]
    fn prop_from_getter_never_panics_with_arbitrary_timeout(timeout in malformed_seconds()) {
        let mut env: HashMap<&str, String> = HashMap::new();
        env.insert("FETCH_TIMEOUT_SECS", timeout);
        if let Ok(config) = Config::from_getter(|key| env.get(key).cloned()) {
            let _ = config.validate();
        }
    }

    #[test]
    fn prop_from_getter_never_panics_with_arbitrary_url(url in dangerous_url()) {
        let mut env: HashMap<&str, String> = HashMap::new();
        env.insert("SCHEDULE_BASE_URL", url);
        let config = Config::from_getter(|key| env.get(key).cloned()).unwrap();
        let _ = config.validate();
    }

    #[test]
    fn prop_from_getter_never_panics_with_arbitrary_timezone(tz in dangerous_timezone()) {
        let mut env: HashMap<&str, String> = HashMap::new();
        env.insert("SCHEDULE_TIMEZONE", tz);
        let _ = Config::from_getter(|key| env.get(key).cloned());
    }

    #[test]
    fn prop_refresh_interval_never_fails_parsing(refresh in malformed_seconds()) {
        let mut env: HashMap<&str, String> = HashMap::new();
        env.insert("REFRESH_INTERVAL_SECS", refresh);
        let config = Config::from_getter(|key| env.get(key).cloned()).unwrap();
        prop_assert_eq!(config.refresh_interval_secs, 0);
    }
}

// ============================================================================
// INVARIANT: DAY URLS ARE WELL FORMED
// ============================================================================

proptest! {
    #[test]
    fn prop_day_url_shape(path in "[a-z]{1,10}(/[a-z]{1,10}){0,3}", slashes in 0usize..4) {
        let url = format!("https://example.com/{}{}", path, "/".repeat(slashes));
        let mut env: HashMap<&str, String> = HashMap::new();
        env.insert("SCHEDULE_BASE_URL", url);
        let config = Config::from_getter(|key| env.get(key).cloned()).unwrap();

        for (idx, day) in WEEKDAY_NAMES.iter().enumerate() {
            let day_url = config.day_url(idx).unwrap();
            let suffix = format!("/{}.json", day);
            let doubled = format!("//{}", day);
            prop_assert!(day_url.ends_with(&suffix));
            prop_assert!(!day_url.contains(&doubled));
        }
        prop_assert_eq!(config.day_url(WEEKDAY_NAMES.len()), None);
    }
}

// ============================================================================
// NEGATIVE ASSERTIONS
// ============================================================================

#[test]
fn test_empty_string_vs_missing() {
    // Empty URL and time zone fall back to defaults
    let mut env: HashMap<&str, String> = HashMap::new();
    env.insert("SCHEDULE_BASE_URL", "".to_string());
    env.insert("SCHEDULE_TIMEZONE", "   ".to_string());
    let config = Config::from_getter(|key| env.get(key).cloned()).unwrap();
    assert_eq!(config.schedule_base_url, DEFAULT_SCHEDULE_BASE_URL);
    assert_eq!(config.timezone, chrono_tz::America::New_York);

    // An empty timeout is a parse error, a missing one is the default
    let mut env: HashMap<&str, String> = HashMap::new();
    env.insert("FETCH_TIMEOUT_SECS", "".to_string());
    assert!(Config::from_getter(|key| env.get(key).cloned()).is_err());
    assert!(Config::from_getter(|_| None).is_ok());
}

#[test]
fn test_timeout_invalid_values() {
    for timeout in ["-1", "abc", "", "10.5", "1e3", "18446744073709551616"] {
        let mut env: HashMap<&str, String> = HashMap::new();
        env.insert("FETCH_TIMEOUT_SECS", timeout.to_string());
        let result = Config::from_getter(|key| env.get(key).cloned());
        assert!(
            result.is_err(),
            "Timeout '{}' should fail parsing, got {:?}",
            timeout,
            result.as_ref().ok().map(|c| c.fetch_timeout_secs)
        );
    }
}

#[test]
fn test_timeout_boundary_values() {
    let test_cases = [
        ("0", false),
        ("1", true),
        ("10", true),
        ("120", true),
        ("121", false),
    ];

    for (input, valid) in test_cases {
        let mut env: HashMap<&str, String> = HashMap::new();
        env.insert("FETCH_TIMEOUT_SECS", input.to_string());
        let config = Config::from_getter(|key| env.get(key).cloned()).unwrap();
        assert_eq!(
            config.validate().is_ok(),
            valid,
            "Timeout '{}' validity should be {}",
            input,
            valid
        );
    }
}

#[test]
fn test_refresh_boundary_values() {
    let test_cases = [("0", true), ("1", false), ("59", false), ("60", true), ("86400", true)];

    for (input, valid) in test_cases {
        let mut env: HashMap<&str, String> = HashMap::new();
        env.insert("REFRESH_INTERVAL_SECS", input.to_string());
        let config = Config::from_getter(|key| env.get(key).cloned()).unwrap();
        assert_eq!(config.validate().is_ok(), valid, "REFRESH_INTERVAL_SECS={}", input);
    }
}

#[test]
fn test_scheme_validation() {
    for (url, valid) in [
        ("https://example.com/shows", true),
        ("http://localhost:8080", true),
        ("ftp://example.com", false),
        ("example.com", false),
        ("file:///tmp", false),
    ] {
        let mut env: HashMap<&str, String> = HashMap::new();
        env.insert("SCHEDULE_BASE_URL", url.to_string());
        let config = Config::from_getter(|key| env.get(key).cloned()).unwrap();
        assert_eq!(config.validate().is_ok(), valid, "{}", url);
    }
}
