//! The remote spreadsheet backend as seen by a session.
//!
//! Transport (URLs, redirects, HTML unwrapping) belongs to the implementor;
//! every method hands back the decoded JSON document, which may still be an
//! error envelope.
use crate::session::SessionError;
use crate::spreadsheet::payload::error_message;
use crate::spreadsheet::payload::value_to_string;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

/// Message shown when a name and birthday do not identify anyone.
pub const LOGIN_REJECTED: &str = "姓名或生日不正確，請確認後重試";

/// Message shown when a name lookup finds nobody.
pub const EMPLOYEE_NOT_FOUND: &str = "找不到此人員，請確認姓名";

#[async_trait]
pub trait DataSource: Send + Sync {
    /// Tab catalog of a warehouse spreadsheet.
    async fn sheet_names(&self, warehouse: &str) -> anyhow::Result<Value>;

    /// Contents of one tab, pre-filtered by the backend for the employee.
    async fn sheet_data(&self, warehouse: &str, tab_name: &str, employee: &str, birthday: &str) -> anyhow::Result<Value>;

    /// Identity check by name and birthday.
    async fn verify_login(&self, name: &str, birthday: &str) -> anyhow::Result<Value>;

    /// Identity lookup by name only.
    async fn find_warehouse_by_name(&self, name: &str) -> anyhow::Result<Value>;

    /// Spreadsheet id of a warehouse.
    async fn spreadsheet_id(&self, warehouse: &str) -> anyhow::Result<Value>;
}

/// A person resolved by the backend.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Identity {
    pub name: String,
    /// Uppercased warehouse key, empty when the backend did not say
    pub warehouse: String,
    pub is_admin: bool,
    pub message: Option<String>,
}

#[derive(Default, Deserialize)]
#[serde(default)]
struct IdentityResponse {
    ok: Option<bool>,
    name: Option<Value>,
    warehouse: Option<Value>,
    #[serde(rename = "warehouseKey")]
    warehouse_key: Option<Value>,
    wh: Option<Value>,
    #[serde(rename = "whKey")]
    wh_key: Option<Value>,
    key: Option<Value>,
    #[serde(rename = "isAdmin")]
    is_admin: Option<bool>,
    msg: Option<Value>,
    error: Option<Value>,
}

#[derive(Default, Deserialize)]
#[serde(default)]
struct SpreadsheetIdResponse {
    ok: Option<bool>,
    #[serde(rename = "spreadsheetId")]
    spreadsheet_id: Option<Value>,
}

/// Non-blank text of an optional JSON value.
fn text(value: &Option<Value>) -> Option<String> {
    value
        .as_ref()
        .map(value_to_string)
        .map(|text| text.trim().to_owned())
        .filter(|text| !text.is_empty())
}

impl IdentityResponse {
    fn decode(value: &Value) -> Self {
        IdentityResponse::deserialize(value).unwrap_or_default()
    }

    fn warehouse(&self) -> String {
        [&self.warehouse, &self.warehouse_key, &self.wh, &self.wh_key, &self.key]
            .into_iter()
            .find_map(text)
            .map(|key| key.to_uppercase())
            .unwrap_or_default()
    }

    fn failure(&self, fallback: &str) -> SessionError {
        let message = text(&self.error).or_else(|| text(&self.msg)).unwrap_or_else(|| fallback.to_owned());
        SessionError::Authentication(message)
    }
}

/// Decodes a name + birthday verification. The backend signals success with
/// `ok: true` or by echoing a name, and failure with `ok: false`.
pub fn decode_login(value: &Value, requested_name: &str) -> Result<Identity, SessionError> {
    let response = IdentityResponse::decode(value);
    let name = text(&response.name);
    if response.ok == Some(false) || (name.is_none() && response.ok != Some(true)) {
        Err(response.failure(LOGIN_REJECTED))?
    }
    let warehouse = response.warehouse();
    let message = text(&response.msg).or_else(|| Some(format!("已在 {warehouse} 找到您的資料")));
    Ok(Identity {
        name: name.unwrap_or_else(|| requested_name.trim().to_owned()),
        warehouse,
        is_admin: response.is_admin.unwrap_or(false),
        message,
    })
}

/// Decodes a name-only lookup, which must name a warehouse to succeed.
pub fn decode_employee(value: &Value, requested_name: &str) -> Result<Identity, SessionError> {
    let response = IdentityResponse::decode(value);
    let warehouse = response.warehouse();
    if response.ok == Some(false) || warehouse.is_empty() {
        Err(response.failure(EMPLOYEE_NOT_FOUND))?
    }
    Ok(Identity {
        name: text(&response.name).unwrap_or_else(|| requested_name.trim().to_owned()),
        message: Some(format!("管理員查詢成功 ({warehouse})")),
        warehouse,
        is_admin: true,
    })
}

/// Decodes a spreadsheet id response.
pub fn decode_spreadsheet_id(value: &Value) -> Result<String, SessionError> {
    if let Some(message) = error_message(value) {
        Err(SessionError::Upstream(message))?
    }
    let response = SpreadsheetIdResponse::deserialize(value).unwrap_or_default();
    match text(&response.spreadsheet_id) {
        Some(id) if response.ok != Some(false) => Ok(id),
        _ => Err(SessionError::Upstream("取得試算表 ID 失敗".to_owned())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_login() {
        let identity = decode_login(&json!({"name": "王小明", "warehouseKey": " tao1 "}), "王小明").expect("identity");
        assert_eq!(identity.warehouse, "TAO1");
        assert!(!identity.is_admin);

        let identity = decode_login(&json!({"ok": true, "wh": "TAO3", "isAdmin": true, "msg": "ok"}), " 李大華 ").expect("identity");
        assert_eq!(identity.name, "李大華");
        assert_eq!(identity.warehouse, "TAO3");
        assert_eq!(identity.message.as_deref(), Some("ok"));
        assert!(identity.is_admin);
    }

    #[test]
    fn test_decode_login_prefers_first_warehouse_field() {
        let identity = decode_login(&json!({"ok": true, "name": "王小明", "warehouse": "TAO5", "warehouseKey": "TAO1"}), "王小明").expect("identity");
        assert_eq!(identity.warehouse, "TAO5");
    }

    #[test]
    fn test_decode_login_rejections() {
        let rejected = |value: Value| match decode_login(&value, "王小明") {
            Err(SessionError::Authentication(message)) => message,
            other => panic!("unexpected {other:?}"),
        };
        assert_eq!(rejected(json!({"ok": false, "name": "王小明", "error": "生日錯誤"})), "生日錯誤");
        assert_eq!(rejected(json!({"msg": "查無此人"})), "查無此人");
        assert_eq!(rejected(json!({})), LOGIN_REJECTED);
        assert_eq!(rejected(json!("<html>")), LOGIN_REJECTED);
    }

    #[test]
    fn test_decode_employee() {
        let identity = decode_employee(&json!({"key": "tao7"}), "王小明").expect("identity");
        assert_eq!(identity.name, "王小明");
        assert_eq!(identity.warehouse, "TAO7");
        assert!(identity.is_admin);
        assert!(decode_employee(&json!({"ok": true, "name": "王小明"}), "王小明").is_err());
    }

    #[test]
    fn test_decode_spreadsheet_id() {
        assert_eq!(decode_spreadsheet_id(&json!({"ok": true, "spreadsheetId": "abc"})).expect("id"), "abc");
        assert!(decode_spreadsheet_id(&json!({"ok": false, "spreadsheetId": "abc"})).is_err());
        assert!(decode_spreadsheet_id(&json!({"error": "倉庫未設定"})).is_err());
        assert!(decode_spreadsheet_id(&json!({})).is_err());
    }
}
