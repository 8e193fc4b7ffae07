use std::fmt;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::TypeError;

/// Block creation time as an ISO-8601 (RFC 3339) string.
///
/// The original text is kept verbatim: the timestamp is part of the hash
/// input, so re-rendering a parsed value could silently change a digest.
/// New timestamps use millisecond precision and a `Z` suffix, e.g.
/// `2024-05-01T12:30:00.125Z`.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Timestamp(String);

impl Timestamp {
    /// The current wall-clock time in UTC.
    pub fn now() -> Self {
        Self::from_datetime(Utc::now())
    }

    /// Render a UTC instant in the canonical form.
    pub fn from_datetime(at: DateTime<Utc>) -> Self {
        Self(at.to_rfc3339_opts(SecondsFormat::Millis, true))
    }

    /// Validate and wrap an existing ISO-8601 string.
    pub fn parse(value: &str) -> Result<Self, TypeError> {
        DateTime::parse_from_rfc3339(value).map_err(|e| TypeError::InvalidTimestamp {
            value: value.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self(value.to_string()))
    }

    /// The exact string that is hashed and persisted.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The instant this timestamp denotes, normalised to UTC.
    pub fn to_datetime(&self) -> DateTime<Utc> {
        // Construction always validates, so parsing cannot fail here.
        DateTime::parse_from_rfc3339(&self.0)
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_default()
    }
}

impl fmt::Debug for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Timestamp({})", self.0)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Serialize for Timestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn now_is_millisecond_utc() {
        let ts = Timestamp::now();
        let s = ts.as_str();
        assert!(s.ends_with('Z'));
        // YYYY-MM-DDTHH:MM:SS.mmmZ
        assert_eq!(s.len(), 24);
        // Should be after 2020-01-01.
        assert!(ts.to_datetime().timestamp() > 1_577_836_800);
    }

    #[test]
    fn from_datetime_format() {
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 0).unwrap();
        assert_eq!(
            Timestamp::from_datetime(at).as_str(),
            "2024-05-01T12:30:00.000Z"
        );
    }

    #[test]
    fn parse_keeps_original_text() {
        let ts = Timestamp::parse("2024-05-01T14:30:00+02:00").unwrap();
        assert_eq!(ts.as_str(), "2024-05-01T14:30:00+02:00");
        assert_eq!(
            ts.to_datetime(),
            Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 0).unwrap()
        );
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!(matches!(
            Timestamp::parse("yesterday"),
            Err(TypeError::InvalidTimestamp { .. })
        ));
    }

    #[test]
    fn serde_roundtrip() {
        let ts = Timestamp::parse("2023-01-01T00:00:00.000Z").unwrap();
        let json = serde_json::to_string(&ts).unwrap();
        assert_eq!(json, "\"2023-01-01T00:00:00.000Z\"");
        let back: Timestamp = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ts);
    }

    #[test]
    fn deserialize_rejects_invalid() {
        assert!(serde_json::from_str::<Timestamp>("\"not a time\"").is_err());
    }

    proptest! {
        #[test]
        fn persisted_text_is_kept_verbatim(
            (y, mo, d) in (1970u32..2100, 1u32..=12, 1u32..=28),
            (h, mi, sec) in (0u32..24, 0u32..60, 0u32..60),
            millis in 0u32..1000,
            zone in prop_oneof![Just("Z".to_string()), "[+-](0[0-9]|1[0-3]):[0-5][0-9]"],
        ) {
            let text = format!("{y:04}-{mo:02}-{d:02}T{h:02}:{mi:02}:{sec:02}.{millis:03}{zone}");
            let ts = Timestamp::parse(&text).unwrap();
            prop_assert_eq!(ts.as_str(), text.as_str());

            let json = serde_json::to_string(&ts).unwrap();
            let back: Timestamp = serde_json::from_str(&json).unwrap();
            prop_assert_eq!(back.as_str(), text.as_str());
        }
    }
}
