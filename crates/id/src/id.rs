//! Validated identifier type.

use crate::codec::{self, has_v7_marker, ID_LEN};
use crate::{IdError, IdResult};
use chrono::{DateTime, Utc};
use std::{fmt, str::FromStr};
use uuid::Uuid;

/// A metadata identifier that is guaranteed to be canonical.
///
/// Once constructed, the inner value always carries the version-7 marker, so its string form
/// always passes [`codec::validate`]. Accept identifiers from outside the core (URL paths, CLI
/// arguments, storage keys) through [`MetadataId::parse`], which rejects anything that is not
/// already canonical. Lower-case input is not normalised.
///
/// Ordering follows the numeric value, which matches lexicographic ordering of the string form
/// and therefore creation order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MetadataId(u128);

impl Default for MetadataId {
    fn default() -> Self {
        Self::new()
    }
}

impl MetadataId {
    /// Generates a new identifier from the current time.
    pub fn new() -> Self {
        Self(Uuid::now_v7().as_u128())
    }

    /// Validates and parses a canonical identifier string.
    ///
    /// # Errors
    ///
    /// Returns [`IdError::InvalidInput`] if `input` does not pass [`codec::validate`].
    pub fn parse(input: &str) -> IdResult<Self> {
        if input.len() != ID_LEN {
            return Err(IdError::InvalidInput(format!(
                "identifier must be {ID_LEN} characters, got: '{input}'"
            )));
        }
        let value = codec::decode(input)
            .map_err(|e| IdError::InvalidInput(format!("identifier '{input}': {e}")))?;
        Self::from_u128(value)
    }

    /// Wraps a raw 128-bit value, requiring the version-7 marker.
    pub fn from_u128(value: u128) -> IdResult<Self> {
        if !has_v7_marker(value) {
            return Err(IdError::InvalidInput(format!(
                "value {value:#034x} is not a version-7 identifier"
            )));
        }
        Ok(Self(value))
    }

    /// Wraps an existing version-7 UUID.
    pub fn from_uuid(uuid: Uuid) -> IdResult<Self> {
        Self::from_u128(uuid.as_u128())
    }

    pub fn as_u128(&self) -> u128 {
        self.0
    }

    /// Returns the underlying UUID.
    pub fn uuid(&self) -> Uuid {
        Uuid::from_u128(self.0)
    }

    /// Millisecond Unix timestamp held in the top 48 bits.
    pub fn timestamp_millis(&self) -> i64 {
        (self.0 >> 80) as i64
    }

    /// Creation time as a UTC datetime.
    pub fn created_at(&self) -> IdResult<DateTime<Utc>> {
        let millis = self.timestamp_millis();
        DateTime::from_timestamp_millis(millis).ok_or(IdError::TimestampOutOfRange(millis))
    }

    /// Returns `YYYY/MM/DD` for the UTC day this identifier was created on.
    pub fn date_partition(&self) -> IdResult<String> {
        Ok(self.created_at()?.format("%Y/%m/%d").to_string())
    }
}

impl fmt::Display for MetadataId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&codec::encode(self.0, ID_LEN))
    }
}

impl FromStr for MetadataId {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MetadataId::parse(s)
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for MetadataId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for MetadataId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        MetadataId::parse(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "01HF7YAT00FAY828T5CY4TQKFF";

    #[test]
    fn test_new_generates_canonical_id() {
        let id = MetadataId::new();
        let s = id.to_string();

        assert_eq!(s.len(), ID_LEN);
        assert!(codec::validate(&s));
    }

    #[test]
    fn test_parse_valid_id() {
        let id = MetadataId::parse(SAMPLE).unwrap();
        assert_eq!(id.to_string(), SAMPLE);
    }

    #[test]
    fn test_parse_rejects_non_v7() {
        let result = MetadataId::parse("01K9TJFCFENBC87GR7M7CFA8P1");
        match result {
            Err(IdError::InvalidInput(msg)) => assert!(msg.contains("version-7")),
            other => panic!("Expected InvalidInput error, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_rejects_wrong_length() {
        assert!(matches!(
            MetadataId::parse("01HF7YAT00"),
            Err(IdError::InvalidInput(_))
        ));
        assert!(MetadataId::parse("").is_err());
    }

    #[test]
    fn test_parse_rejects_lowercase() {
        assert!(MetadataId::parse(&SAMPLE.to_lowercase()).is_err());
    }

    #[test]
    fn test_parse_rejects_path_traversal() {
        assert!(MetadataId::parse("../../../../etc/passwd0000").is_err());
    }

    #[test]
    fn test_timestamp_and_partition() {
        let id = MetadataId::parse(SAMPLE).unwrap();

        assert_eq!(id.timestamp_millis(), 1_700_000_000_000);
        assert_eq!(id.date_partition().unwrap(), "2023/11/14");
        assert_eq!(
            id.created_at().unwrap().to_rfc3339(),
            "2023-11-14T22:13:20+00:00"
        );
    }

    #[test]
    fn test_partition_at_day_boundary() {
        let last_ms = MetadataId::parse("01HK153WZZE008000000000000").unwrap();
        let next_day = MetadataId::parse("01HK153X00E008000000000000").unwrap();

        assert_eq!(last_ms.date_partition().unwrap(), "2023/12/31");
        assert_eq!(next_day.date_partition().unwrap(), "2024/01/01");
    }

    #[test]
    fn test_uuid_round_trip() {
        let id = MetadataId::new();
        let uuid = id.uuid();

        assert_eq!(uuid.get_version_num(), 7);
        assert_eq!(MetadataId::from_uuid(uuid).unwrap(), id);
    }

    #[test]
    fn test_from_uuid_rejects_v4() {
        assert!(MetadataId::from_uuid(Uuid::new_v4()).is_err());
    }

    #[test]
    fn test_ordering_matches_string_ordering() {
        let first = MetadataId::new();
        std::thread::sleep(std::time::Duration::from_millis(2));
        let second = MetadataId::new();

        assert!(first < second);
        assert!(first.to_string() < second.to_string());
    }

    #[test]
    fn test_from_str() {
        let parsed: MetadataId = SAMPLE.parse().unwrap();
        assert_eq!(parsed.to_string(), SAMPLE);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_serde_uses_string_form() {
        let id = MetadataId::parse(SAMPLE).unwrap();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{SAMPLE}\""));

        let back: MetadataId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);

        let bad: Result<MetadataId, _> = serde_json::from_str("\"abc123\"");
        assert!(bad.is_err());
    }
}
