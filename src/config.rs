//! Session settings.
//!
//! Every field has a default, so an empty JSON object (or no configuration at
//! all) gives the stock behavior.
use crate::leave::LeavePolicy;
use crate::spreadsheet::criteria::Strategy;
use serde::Deserialize;
use std::time::Duration;

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Tabs fetched concurrently during a load
    pub batch_size: usize,
    /// Deadline of a single backend request
    pub fetch_timeout_ms: u64,
    pub sheet_data_ttl_secs: u64,
    pub sheet_names_ttl_secs: u64,
    pub spreadsheet_id_ttl_secs: u64,
    /// Warehouses whose leave statuses come from the records tab
    pub records_preferred_warehouses: Vec<String>,
    pub strategy: Strategy,
    pub leave: LeavePolicy,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            batch_size: 6,
            fetch_timeout_ms: 10_000,
            sheet_data_ttl_secs: 60,
            sheet_names_ttl_secs: 2 * 60,
            spreadsheet_id_ttl_secs: 10 * 60,
            records_preferred_warehouses: vec!["TAO1".to_owned(), "TA01".to_owned()],
            strategy: Strategy::default(),
            leave: LeavePolicy::default(),
        }
    }
}

impl Settings {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_millis(self.fetch_timeout_ms)
    }

    /// Batch size, never zero.
    pub fn concurrency(&self) -> usize {
        self.batch_size.max(1)
    }
}
