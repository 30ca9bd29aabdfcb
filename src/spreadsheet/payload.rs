//! Upstream JSON shapes for tab catalogs and tab contents.
//!
//! The backend answers every request with JSON, and any request may come back
//! as an error envelope (`{"error": "..."}`) instead of the expected shape.

use crate::spreadsheet::SpreadsheetError;
use serde::Deserialize;
use serde_json::Value;

/// One data row as delivered by the backend.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct RawRow {
    /// Cell values, parallel to the header list
    #[serde(default)]
    pub v: Vec<Value>,
    /// Background colors per cell
    #[serde(default)]
    pub bg: Option<Vec<Value>>,
    /// Foreground colors per cell
    #[serde(default)]
    pub fc: Option<Vec<Value>>,
    /// Extra per-cell attributes
    #[serde(default)]
    pub att: Option<Vec<Value>>,
}

/// Contents of a single tab.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawPayload {
    #[serde(default)]
    pub headers: Vec<Value>,
    #[serde(default)]
    pub rows: Vec<RawRow>,
    /// ISO dates parallel to `headers`
    #[serde(default, rename = "headersISO")]
    pub headers_iso: Vec<Value>,
    /// Indexes of date-bearing columns
    #[serde(default)]
    pub date_cols: Vec<usize>,
    /// Number of frozen columns on the left
    #[serde(default)]
    pub frozen_left: usize,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: Value,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum SheetNamesResponse {
    List(Vec<Value>),
    Wrapped {
        #[serde(rename = "sheetNames", default)]
        sheet_names: Vec<Value>,
    },
}

/// Renders a JSON cell value the way it is displayed in the sheet.
pub fn value_to_string(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(value) => value.to_owned(),
        Value::Bool(value) => value.to_string(),
        Value::Number(value) => value.to_string(),
        other => other.to_string(),
    }
}

/// Returns the message of an error envelope, if the value is one.
pub fn error_message(value: &Value) -> Option<String> {
    let envelope = ErrorEnvelope::deserialize(value).ok()?;
    match envelope.error {
        Value::Null | Value::Bool(false) => None,
        Value::String(message) if message.is_empty() => None,
        error => Some(value_to_string(&error)),
    }
}

impl RawPayload {
    /// Decodes a tab payload, rejecting error envelopes.
    pub fn from_value(value: &Value) -> Result<Self, SpreadsheetError> {
        if let Some(message) = error_message(value) {
            Err(SpreadsheetError::UpstreamError(message))?
        }
        if !value.is_object() {
            Err(SpreadsheetError::MalformedPayload("tab payload is not an object".to_owned()))?
        }
        Ok(RawPayload::deserialize(value)?)
    }

    /// Header labels rendered as strings.
    pub fn header_strings(&self) -> Vec<String> {
        self.headers.iter().map(value_to_string).collect()
    }
}

/// Decodes a tab catalog, which is either a bare list or `{"sheetNames": [...]}`.
pub fn decode_sheet_names(value: &Value) -> Result<Vec<String>, SpreadsheetError> {
    if let Some(message) = error_message(value) {
        Err(SpreadsheetError::UpstreamError(message))?
    }
    let names = match SheetNamesResponse::deserialize(value)? {
        SheetNamesResponse::List(names) => names,
        SheetNamesResponse::Wrapped { sheet_names } => sheet_names,
    };
    Ok(names
        .iter()
        .map(value_to_string)
        .filter(|name| !name.trim().is_empty())
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_payload() {
        let payload = RawPayload::from_value(&json!({
            "headers": ["姓名", "3/1", null, 7],
            "rows": [{"v": ["王小明", "休", null, 8.5], "bg": ["#fff"]}],
            "headersISO": ["", "2026-03-01", "", ""],
            "dateCols": [1],
            "frozenLeft": 1
        }))
        .expect("payload");
        assert_eq!(payload.header_strings(), vec!["姓名", "3/1", "", "7"]);
        assert_eq!(payload.rows.len(), 1);
        assert_eq!(value_to_string(&payload.rows[0].v[3]), "8.5");
        assert_eq!(payload.rows[0].bg.as_ref().map(Vec::len), Some(1));
        assert!(payload.rows[0].fc.is_none());
        assert_eq!(payload.date_cols, vec![1]);
        assert_eq!(payload.frozen_left, 1);
    }

    #[test]
    fn test_decode_payload_rejects_error_envelope() {
        let error = RawPayload::from_value(&json!({"error": "找不到分頁"})).unwrap_err();
        assert!(matches!(error, SpreadsheetError::UpstreamError(message) if message == "找不到分頁"));
        assert!(RawPayload::from_value(&json!("<html>")).is_err());
        assert!(RawPayload::from_value(&json!({"headers": "oops"})).is_err());
    }

    #[test]
    fn test_decode_payload_tolerates_missing_fields() {
        let payload = RawPayload::from_value(&json!({"error": null, "rows": [{}]})).expect("payload");
        assert!(payload.headers.is_empty());
        assert!(payload.rows[0].v.is_empty());
    }

    #[test]
    fn test_decode_sheet_names() {
        assert_eq!(
            decode_sheet_names(&json!(["3月班表", "", "調假名單"])).expect("names"),
            vec!["3月班表", "調假名單"]
        );
        assert_eq!(
            decode_sheet_names(&json!({"sheetNames": ["出勤時數"]})).expect("names"),
            vec!["出勤時數"]
        );
        assert!(decode_sheet_names(&json!({"error": "倉庫未設定"})).is_err());
        assert!(decode_sheet_names(&json!(42)).is_err());
    }
}
