//! Forgiving field parsers for records that come back from the spreadsheet script.
//!
//! Sheet cells can be blank, typed as numbers, or renamed between deployments.
//! These helpers turn such cells into usable values instead of failing the record.

use chrono::{DateTime, NaiveDate, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use tracing::warn;

use super::user::ModelChoice;

/// Any scalar becomes a string. Null, arrays and objects become empty.
pub fn string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => s,
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => String::new(),
    })
}

/// RFC 3339, a bare `YYYY-MM-DD` date, or epoch milliseconds.
/// Anything else is the Unix epoch.
pub fn datetime<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let parsed = match Value::deserialize(deserializer)? {
        Value::String(s) => parse_datetime(s.trim()),
        Value::Number(n) => n.as_i64().and_then(DateTime::from_timestamp_millis),
        _ => None,
    };
    Ok(parsed.unwrap_or_default())
}

fn parse_datetime(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|d| d.and_utc())
}

/// Blank or unknown model identifiers fall back to the default model.
pub fn model_choice<'de, D>(deserializer: D) -> Result<ModelChoice, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).unwrap_or_default())
}

/// Keeps the rows that parse and logs the rest. A non-array is no rows.
pub fn rows<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let Value::Array(items) = Value::deserialize(deserializer)? else {
        return Ok(Vec::new());
    };
    Ok(items
        .into_iter()
        .enumerate()
        .filter_map(|(index, item)| match serde_json::from_value(item) {
            Ok(row) => Some(row),
            Err(e) => {
                warn!("Skipping unreadable history row {index}: {e}");
                None
            }
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use serde::Deserialize;
    use serde_json::json;

    use super::*;

    #[derive(Debug, Deserialize)]
    struct Cells {
        #[serde(default, deserialize_with = "string")]
        text: String,
        #[serde(default, deserialize_with = "datetime")]
        at: DateTime<Utc>,
        #[serde(default, deserialize_with = "model_choice")]
        model: ModelChoice,
    }

    fn cells(value: serde_json::Value) -> Cells {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_numbers_and_nulls_become_strings() {
        assert_eq!(cells(json!({ "text": 5551234 })).text, "5551234");
        assert_eq!(cells(json!({ "text": null })).text, "");
        assert_eq!(cells(json!({})).text, "");
    }

    #[test]
    fn test_dates_accept_common_sheet_shapes() {
        let expected = Utc.with_ymd_and_hms(2025, 3, 1, 0, 0, 0).unwrap();
        assert_eq!(cells(json!({ "at": "2025-03-01T00:00:00Z" })).at, expected);
        assert_eq!(cells(json!({ "at": "2025-03-01" })).at, expected);
        assert_eq!(cells(json!({ "at": expected.timestamp_millis() })).at, expected);
    }

    #[test]
    fn test_blank_or_garbled_date_is_epoch() {
        assert_eq!(cells(json!({ "at": "" })).at, DateTime::<Utc>::default());
        assert_eq!(cells(json!({ "at": "last tuesday" })).at, DateTime::<Utc>::default());
    }

    #[test]
    fn test_unknown_model_is_default() {
        assert_eq!(cells(json!({ "model": "" })).model, ModelChoice::Flash);
        assert_eq!(cells(json!({ "model": "gpt-4" })).model, ModelChoice::Flash);
        assert_eq!(
            cells(json!({ "model": "gemini-3-pro-preview" })).model,
            ModelChoice::Pro
        );
    }
}
