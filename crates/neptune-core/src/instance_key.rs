// crates/neptune-core/src/instance_key.rs
// ============================================================================
// Module: Instance Keys
// Description: Generation of the opaque per-instance correlation key.
// Purpose: Correlate an inserted row with its reselect and serve as relation join key.
// Dependencies: rand
// ============================================================================

//! ## Overview
//! Instance keys are 36-character random identifiers in the hyphenated
//! 8-4-4-4-12 hex layout.

use crate::schema::INSTANCE_KEY_LENGTH;

/// Generates a fresh random instance key.
#[must_use]
pub fn generate() -> String {
    let raw: u128 = rand::random();
    let hex = format!("{raw:032x}");
    let key = format!(
        "{}-{}-{}-{}-{}",
        &hex[0 .. 8],
        &hex[8 .. 12],
        &hex[12 .. 16],
        &hex[16 .. 20],
        &hex[20 .. 32]
    );
    debug_assert_eq!(key.len(), INSTANCE_KEY_LENGTH);
    key
}

/// Returns true when `key` has the length and alphabet of a generated key.
#[must_use]
pub fn is_well_formed(key: &str) -> bool {
    key.len() == INSTANCE_KEY_LENGTH
        && key.char_indices().all(|(index, ch)| match index {
            8 | 13 | 18 | 23 => ch == '-',
            _ => ch.is_ascii_hexdigit(),
        })
}

#[cfg(test)]
mod tests {
    use super::generate;
    use super::is_well_formed;

    #[test]
    fn generated_keys_are_well_formed_and_distinct() {
        let first = generate();
        let second = generate();
        assert!(is_well_formed(&first));
        assert!(is_well_formed(&second));
        assert_ne!(first, second);
    }

    #[test]
    fn malformed_keys_are_rejected() {
        assert!(!is_well_formed(""));
        assert!(!is_well_formed("0123456789abcdef0123456789abcdef0123"));
        assert!(!is_well_formed("0123456z-89ab-cdef-0123-456789abcdef"));
    }
}
