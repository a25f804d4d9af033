use zhconv::{Variant, zhconv};

/// Simplified to traditional Chinese.
pub fn to_traditional(s: &str) -> String {
    zhconv(s, Variant::ZhHant).to_string()
}

/// Traditional to simplified Chinese.
pub fn to_simplified(s: &str) -> String {
    zhconv(s, Variant::ZhHans).to_string()
}

/// Equality under simplified/traditional equivalence, for names that have
/// already been lowercased and trimmed. ASCII-only inputs skip conversion.
pub fn matches_any(name: &str, targets: &[String]) -> bool {
    if targets.iter().any(|t| t == name) {
        return true;
    }
    if name.is_ascii() {
        return false;
    }
    let simplified = to_simplified(name);
    targets.iter().any(|t| *t == simplified)
}

#[test]
fn traditional_round_trip() {
    assert_eq!(to_simplified(&to_traditional("车站")), "车站");
}

#[test]
fn ascii_passthrough() {
    assert_eq!(to_traditional("Central Station"), "Central Station");
}

#[test]
fn matches_simplified_target() {
    let targets = vec!["东门".to_string()];
    assert!(matches_any("東門", &targets));
}
