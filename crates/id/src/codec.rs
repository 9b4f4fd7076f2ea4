//! Base-32 codec between 128-bit values and identifier strings.

use crate::{IdError, IdResult};
use uuid::Uuid;

/// Symbols used for encoding, indexed by digit value.
pub const ALPHABET: &[u8; 32] = b"0123456789ABCDEFGHJKMNPQRSTVWXYZ";

/// Length of a canonical identifier.
pub const ID_LEN: usize = 26;

/// Number of leading characters that cover the 48-bit timestamp.
const TIMESTAMP_LEN: usize = 10;

/// Byte holding the UUID version nibble in the big-endian representation.
const VERSION_BYTE: usize = 6;

const UUID_VERSION: u8 = 7;

fn symbol_index(character: char) -> Option<u8> {
    if !character.is_ascii() {
        return None;
    }
    let byte = character as u8;
    ALPHABET
        .iter()
        .position(|&symbol| symbol == byte)
        .map(|index| index as u8)
}

/// Encodes `value` as exactly `length` base-32 digits, most significant first.
///
/// Small values are left-padded with `0`. When `length` is shorter than the value needs,
/// only the lowest `length` digits are kept.
pub fn encode(mut value: u128, length: usize) -> String {
    let mut digits = vec![ALPHABET[0]; length];
    for slot in digits.iter_mut().rev() {
        *slot = ALPHABET[(value % 32) as usize];
        value /= 32;
    }
    digits.into_iter().map(char::from).collect()
}

/// Decodes a base-32 string into its 128-bit value.
///
/// # Errors
///
/// - [`IdError::InvalidCharacter`] if a symbol is outside [`ALPHABET`].
/// - [`IdError::Overflow`] if the digits describe a value wider than 128 bits.
pub fn decode(s: &str) -> IdResult<u128> {
    let mut acc: u128 = 0;
    for (position, character) in s.chars().enumerate() {
        let index =
            symbol_index(character).ok_or(IdError::InvalidCharacter { character, position })?;
        if acc >> (128 - 5) != 0 {
            return Err(IdError::Overflow);
        }
        acc = (acc << 5) | u128::from(index);
    }
    Ok(acc)
}

/// Generates a fresh identifier from a version-7 UUID.
pub fn generate() -> String {
    encode(Uuid::now_v7().as_u128(), ID_LEN)
}

/// Returns true if `s` is a canonical identifier.
///
/// Never fails: wrong length, foreign symbols, overflow and a version nibble other than `7`
/// all yield `false`.
pub fn validate(s: &str) -> bool {
    if s.len() != ID_LEN {
        return false;
    }
    match decode(s) {
        Ok(value) => has_v7_marker(value),
        Err(_) => false,
    }
}

pub(crate) fn has_v7_marker(value: u128) -> bool {
    value.to_be_bytes()[VERSION_BYTE] >> 4 == UUID_VERSION
}

/// Returns the millisecond Unix timestamp embedded in the first 10 characters of `s`.
///
/// # Errors
///
/// Returns [`IdError::InvalidCharacter`] under the same conditions as [`decode`].
pub fn timestamp_of(s: &str) -> IdResult<i64> {
    let prefix = match s.char_indices().nth(TIMESTAMP_LEN) {
        Some((end, _)) => &s[..end],
        None => s,
    };
    let millis = decode(prefix)?;
    i64::try_from(millis).map_err(|_| IdError::Overflow)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const SAMPLE: &str = "01HF7YAT00FAY828T5CY4TQKFF";
    const SAMPLE_VALUE: u128 = 0x018b_cfe5_6800_7abc_8123_4567_89ab_cdef;
    const SAMPLE_MILLIS: i64 = 1_700_000_000_000;

    #[test]
    fn test_encode_known_value() {
        assert_eq!(encode(SAMPLE_VALUE, ID_LEN), SAMPLE);
    }

    #[test]
    fn test_encode_pads_small_values() {
        assert_eq!(encode(0, ID_LEN), "00000000000000000000000000");
        assert_eq!(encode(31, ID_LEN), "0000000000000000000000000Z");
        assert_eq!(encode(32, ID_LEN), "00000000000000000000000010");
    }

    #[test]
    fn test_encode_max_value() {
        assert_eq!(encode(u128::MAX, ID_LEN), "7ZZZZZZZZZZZZZZZZZZZZZZZZZ");
    }

    #[test]
    fn test_encode_short_length_keeps_low_digits() {
        assert_eq!(encode(1_234_567_890, 5), "SC0PJ");
        assert_eq!(encode(1_234_567_890, 0), "");
    }

    #[test]
    fn test_decode_known_value() {
        assert_eq!(decode(SAMPLE), Ok(SAMPLE_VALUE));
    }

    #[test]
    fn test_decode_rejects_lowercase() {
        let result = decode("01hf7yat00");
        assert_eq!(
            result,
            Err(IdError::InvalidCharacter {
                character: 'h',
                position: 2
            })
        );
    }

    #[test]
    fn test_decode_rejects_excluded_symbols() {
        for bad in ["I", "L", "O", "U", "-", "é"] {
            assert!(matches!(
                decode(bad),
                Err(IdError::InvalidCharacter { position: 0, .. })
            ));
        }
    }

    #[test]
    fn test_decode_overflow() {
        assert_eq!(decode("80000000000000000000000000"), Err(IdError::Overflow));
        assert_eq!(decode("ZZZZZZZZZZZZZZZZZZZZZZZZZZ"), Err(IdError::Overflow));
    }

    #[test]
    fn test_decode_empty_is_zero() {
        assert_eq!(decode(""), Ok(0));
    }

    #[test]
    fn test_generate_is_valid() {
        let id = generate();
        assert_eq!(id.len(), ID_LEN);
        assert!(validate(&id));
    }

    #[test]
    fn test_generate_is_time_ordered() {
        let first = generate();
        std::thread::sleep(std::time::Duration::from_millis(2));
        let second = generate();
        assert!(second > first);
    }

    #[test]
    fn test_validate_rejects_bad_input() {
        assert!(!validate("abc123"));
        assert!(!validate(""));
        assert!(!validate("01K9TJFCFENBC87GR7M7CFA8P1"));
        assert!(!validate("01HF7YAT00FAY828T5CY4TQKF"));
        assert!(!validate("01HF7YAT00FAY828T5CY4TQKFFF"));
        assert!(!validate("01hf7yat00fay828t5cy4tqkff"));
        assert!(!validate("ZZZZZZZZZZZZZZZZZZZZZZZZZZ"));
    }

    #[test]
    fn test_validate_accepts_v7_value() {
        assert!(validate(SAMPLE));
    }

    #[test]
    fn test_timestamp_of_known_value() {
        assert_eq!(timestamp_of(SAMPLE), Ok(SAMPLE_MILLIS));
    }

    #[test]
    fn test_timestamp_of_generated_is_now() {
        let now = chrono::Utc::now().timestamp_millis();
        let millis = timestamp_of(&generate()).unwrap();
        assert!((millis - now).abs() < 5_000);
    }

    #[test]
    fn test_timestamp_of_rejects_bad_prefix() {
        assert!(matches!(
            timestamp_of("01HF7YAT0U"),
            Err(IdError::InvalidCharacter { character: 'U', .. })
        ));
    }

    #[test]
    fn test_timestamp_of_ignores_suffix() {
        // Only the first 10 characters are read, so a bad symbol later is not an error.
        assert_eq!(timestamp_of("01HF7YAT00-not-decoded"), Ok(SAMPLE_MILLIS));
    }

    proptest! {
        #[test]
        fn prop_decode_inverts_encode(value in any::<u128>(), extra in 0usize..8) {
            prop_assert_eq!(decode(&encode(value, ID_LEN + extra)), Ok(value));
        }
    }
}
