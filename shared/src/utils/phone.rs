//! Phone number utilities

use once_cell::sync::Lazy;
use regex::Regex;

// Mobile number written as international digits without `+`, e.g. 8613812345678
static DIGITS_ONLY_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9]+$").unwrap());

/// Check that a mobile number is exactly `length` ASCII digits
pub fn is_numeric_mobile(phone: &str, length: usize) -> bool {
    phone.len() == length && DIGITS_ONLY_REGEX.is_match(phone)
}

/// Mask a phone number for logs (e.g., 861****5678)
pub fn mask_phone_number(phone: &str) -> String {
    if phone.len() >= 7 && phone.is_ascii() {
        format!("{}****{}", &phone[0..3], &phone[phone.len() - 4..])
    } else {
        "****".to_string()
    }
}
