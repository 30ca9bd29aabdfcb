//! Short-lived caches in front of the data source.
use crate::config::Settings;
use crate::session::source::Identity;
use moka::sync::Cache;
use serde_json::Value;
use std::time::Duration;

/// Identity lookups kept at most.
const IDENTITY_CAPACITY: u64 = 1_024;

/// Tab payloads are keyed by warehouse, tab name and employee.
pub type SheetDataKey = (String, String, String);

#[derive(Clone)]
pub struct SheetCache {
    pub(crate) spreadsheet_ids: Cache<String, String>,
    pub(crate) sheet_names: Cache<String, Vec<String>>,
    pub(crate) sheet_data: Cache<SheetDataKey, Value>,
    /// Successful identity lookups keyed by (name, birthday); no expiry
    pub(crate) identities: Cache<(String, String), Identity>,
}

impl SheetCache {
    pub fn new(settings: &Settings) -> Self {
        SheetCache {
            spreadsheet_ids: Cache::builder()
                .max_capacity(256)
                .time_to_live(Duration::from_secs(settings.spreadsheet_id_ttl_secs))
                .build(),
            sheet_names: Cache::builder()
                .max_capacity(256)
                .time_to_live(Duration::from_secs(settings.sheet_names_ttl_secs))
                .build(),
            sheet_data: Cache::builder()
                .max_capacity(4_096)
                .time_to_live(Duration::from_secs(settings.sheet_data_ttl_secs))
                .build(),
            identities: Cache::builder().max_capacity(IDENTITY_CAPACITY).build(),
        }
    }

    pub fn sheet_data_key(warehouse: &str, tab_name: &str, employee: &str) -> SheetDataKey {
        (warehouse.to_owned(), tab_name.to_owned(), employee.trim().to_owned())
    }

    /// Drops every cached entry.
    pub fn clear_all(&self) {
        self.spreadsheet_ids.invalidate_all();
        self.sheet_names.invalidate_all();
        self.sheet_data.invalidate_all();
        self.identities.invalidate_all();
    }
}

impl Default for SheetCache {
    fn default() -> Self {
        Self::new(&Settings::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_clear_all() {
        let cache = SheetCache::default();
        cache.sheet_names.insert("TAO1".to_owned(), vec!["3月班表".to_owned()]);
        cache.sheet_data.insert(SheetCache::sheet_data_key("TAO1", "3月班表", " 王小明 "), json!({}));
        assert!(cache.sheet_data.contains_key(&SheetCache::sheet_data_key("TAO1", "3月班表", "王小明")));

        cache.clear_all();
        assert!(cache.sheet_names.get("TAO1").is_none());
        assert!(cache.sheet_data.get(&SheetCache::sheet_data_key("TAO1", "3月班表", "王小明")).is_none());
    }
}
