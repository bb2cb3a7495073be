//! Tolerant date values.
//!
//! Hand-entered documents carry their dates as timestamp objects, ISO strings,
//! plain calendar dates or not at all. `DateValue` is the one place that
//! interprets those shapes; everything downstream asks for a `DateTime<Utc>`.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Recency fields in the order they are consulted.
pub const RECENCY_FIELDS: [&str; 3] = ["lastUpdated", "createdAt", "date"];

/// Seconds/nanoseconds pair as exported by document databases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimestampObject {
    #[serde(alias = "_seconds")]
    pub seconds: i64,
    #[serde(default, alias = "_nanoseconds")]
    pub nanoseconds: u32,
}

/// A date-bearing field value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DateValue {
    Timestamp(TimestampObject),
    Text(String),
}

impl DateValue {
    /// Interpret a raw JSON value; anything that is neither a timestamp object
    /// nor a string yields `None`.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Object(_) => serde_json::from_value(value.clone()).ok(),
            Value::String(s) => Some(DateValue::Text(s.clone())),
            _ => None,
        }
    }

    /// Resolve to a UTC instant. Strings are tried as RFC 3339, then as a
    /// naive `YYYY-MM-DDTHH:MM:SS` (taken as UTC), then as `YYYY-MM-DD`.
    pub fn to_datetime(&self) -> Option<DateTime<Utc>> {
        match self {
            DateValue::Timestamp(ts) => Utc.timestamp_opt(ts.seconds, ts.nanoseconds).single(),
            DateValue::Text(raw) => parse_date_text(raw.trim()),
        }
    }
}

fn parse_date_text(s: &str) -> Option<DateTime<Utc>> {
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.and_utc());
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Serde helper: read an optional date field without failing the whole
/// document when the stored value has an unexpected shape.
pub fn lenient<'de, D>(deserializer: D) -> Result<Option<DateValue>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(raw.as_ref().and_then(DateValue::from_value))
}

/// First interpretable date among `fields`, or the Unix epoch.
pub fn sort_date(data: &Map<String, Value>, fields: &[&str]) -> DateTime<Utc> {
    fields
        .iter()
        .filter_map(|field| data.get(*field))
        .filter_map(DateValue::from_value)
        .find_map(|value| value.to_datetime())
        .unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
}

/// Same priority rule over already-typed optional values.
pub fn first_date(candidates: &[Option<&DateValue>]) -> DateTime<Utc> {
    candidates
        .iter()
        .flatten()
        .find_map(|value| value.to_datetime())
        .unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn obj(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_timestamp_object_shapes() {
        let plain = DateValue::from_value(&json!({ "seconds": 86400, "nanoseconds": 5 })).unwrap();
        let underscored = DateValue::from_value(&json!({ "_seconds": 86400 })).unwrap();

        assert_eq!(
            plain.to_datetime().unwrap(),
            Utc.timestamp_opt(86400, 5).unwrap()
        );
        assert_eq!(
            underscored.to_datetime().unwrap(),
            Utc.timestamp_opt(86400, 0).unwrap()
        );
    }

    #[test]
    fn test_text_representations() {
        let rfc = DateValue::Text("2024-03-01T10:00:00+10:00".to_string());
        let naive = DateValue::Text("2024-03-01T00:00:00".to_string());
        let day = DateValue::Text("2024-03-01".to_string());

        assert_eq!(
            rfc.to_datetime().unwrap(),
            Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap()
        );
        assert_eq!(naive.to_datetime(), day.to_datetime());
        assert!(DateValue::Text("March 2024".to_string())
            .to_datetime()
            .is_none());
    }

    #[test]
    fn test_non_date_values_are_ignored() {
        assert!(DateValue::from_value(&json!(12345)).is_none());
        assert!(DateValue::from_value(&json!(true)).is_none());
        assert!(DateValue::from_value(&json!({ "when": "today" })).is_none());
    }

    #[test]
    fn test_sort_date_field_priority() {
        let doc = obj(json!({
            "lastUpdated": "2024-05-01T00:00:00Z",
            "createdAt": "2023-01-01T00:00:00Z",
            "date": "2020-01-01"
        }));
        assert_eq!(
            sort_date(&doc, &RECENCY_FIELDS),
            Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap()
        );

        let no_last_updated = obj(json!({
            "createdAt": { "seconds": 1_700_000_000 },
            "date": "2020-01-01"
        }));
        assert_eq!(
            sort_date(&no_last_updated, &RECENCY_FIELDS),
            Utc.timestamp_opt(1_700_000_000, 0).unwrap()
        );

        let only_date = obj(json!({ "date": "2020-01-01" }));
        assert_eq!(
            sort_date(&only_date, &RECENCY_FIELDS),
            Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_unparseable_field_falls_through() {
        let doc = obj(json!({ "lastUpdated": "soon", "createdAt": "2022-02-02" }));
        assert_eq!(
            sort_date(&doc, &RECENCY_FIELDS),
            Utc.with_ymd_and_hms(2022, 2, 2, 0, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_missing_everything_is_epoch() {
        let doc = obj(json!({ "title": "undated" }));
        assert_eq!(sort_date(&doc, &RECENCY_FIELDS), DateTime::<Utc>::UNIX_EPOCH);
        assert_eq!(first_date(&[None, None]), DateTime::<Utc>::UNIX_EPOCH);
    }

    #[test]
    fn test_lenient_field_deserialization() {
        #[derive(Deserialize)]
        struct Holder {
            #[serde(default, deserialize_with = "lenient")]
            date: Option<DateValue>,
        }

        let bad: Holder = serde_json::from_value(json!({ "date": 42 })).unwrap();
        assert!(bad.date.is_none());

        let missing: Holder = serde_json::from_value(json!({})).unwrap();
        assert!(missing.date.is_none());

        let good: Holder = serde_json::from_value(json!({ "date": "2024-01-01" })).unwrap();
        assert_eq!(good.date, Some(DateValue::Text("2024-01-01".to_string())));
    }
}
