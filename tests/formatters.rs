use chrono::{TimeZone, Utc};
use finwrap::format::*;

#[test]
fn test_format_price_rounding() {
    assert_eq!(format_price(1500.999), "1,501.00");
    assert_eq!(format_price(0.005), "0.01");
}

#[test]
fn test_format_price_normal_cases() {
    assert_eq!(format_price(1500.50), "1,500.50");
    assert_eq!(format_price(1500.0), "1,500.00");
    assert_eq!(format_price(1000.01), "1,000.01");
    assert_eq!(format_price(999.99), "999.99");
    assert_eq!(format_price(1_234_567.8), "1,234,567.80");
}

#[test]
fn test_format_price_negative() {
    assert_eq!(format_price(-42.5), "-42.50");
    assert_eq!(format_price(-0.001), "0.00");
}

// --- format_percent ---

#[test]
fn test_format_percent_positive() {
    assert_eq!(format_percent(0.0123), "+1.23%");
}

#[test]
fn test_format_percent_negative() {
    assert_eq!(format_percent(-0.1), "-10.00%");
}

#[test]
fn test_format_percent_zero() {
    assert_eq!(format_percent(0.0), "+0.00%");
}

// --- format_compact ---

#[test]
fn test_format_compact_trillions() {
    assert_eq!(format_compact(2_500_000_000_000.0), "2.50T");
}

#[test]
fn test_format_compact_billions() {
    assert_eq!(format_compact(1_230_000_000.0), "1.23B");
}

#[test]
fn test_format_compact_millions() {
    assert_eq!(format_compact(45_600_000.0), "45.60M");
}

#[test]
fn test_format_compact_thousands() {
    assert_eq!(format_compact(7_890.0), "7.89K");
}

#[test]
fn test_format_compact_small() {
    assert_eq!(format_compact(999.0), "999");
}

#[test]
fn test_format_compact_negative_uses_abs() {
    assert_eq!(format_compact(-5_000_000.0), "5.00M");
}

// --- format_volume ---

#[test]
fn test_format_volume_large() {
    assert_eq!(format_volume(123_456_789), "123.46M");
}

#[test]
fn test_format_volume_zero() {
    assert_eq!(format_volume(0), "0");
}

// --- timestamps ---

#[test]
fn test_format_timestamp_and_date() {
    let ts = Utc.with_ymd_and_hms(2024, 5, 29, 16, 26, 40).unwrap();
    assert_eq!(format_timestamp(&ts), "2024-05-29 16:26:40");
    assert_eq!(format_date(&ts), "2024-05-29");
}

// --- truncate_str ---

#[test]
fn test_truncate_short_string() {
    assert_eq!(truncate_str("Hello", 10), "Hello");
}

#[test]
fn test_truncate_exact_length() {
    assert_eq!(truncate_str("Hello", 5), "Hello");
}

#[test]
fn test_truncate_long_string() {
    assert_eq!(truncate_str("Hello World", 5), "Hello...");
}

#[test]
fn test_truncate_multibyte() {
    assert_eq!(truncate_str("héllo wörld", 7), "héllo w...");
}
