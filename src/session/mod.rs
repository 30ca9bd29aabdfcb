//! # Session
//!
//! Drives one signed-in user's view of a warehouse spreadsheet: identity
//! lookups, the tab catalog, concurrent tab loading and the per-month queries
//! on top of the loaded tabs.
//!
//! Loads are generation-tagged. Logout, refresh and newer loads make older
//! loads stale, and a stale load drops its results without touching session
//! state, whether it succeeded or failed.
use crate::config::Settings;
use crate::error::AttendanceError;
use crate::error::ResultMessage;
use crate::helpers::date::current_year;
use crate::helpers::date::year_from_iso_headers;
use crate::leave::status::monthly_leave_tally;
use crate::leave::status::LeaveSource;
use crate::leave::LeaveTally;
use crate::reconcile::reconcile;
use crate::reconcile::LoadedResults;
use crate::reconcile::LoadedSheet;
use crate::reconcile::Reconciliation;
use crate::session::cache::SheetCache;
use crate::session::source::decode_employee;
use crate::session::source::decode_login;
use crate::session::source::decode_spreadsheet_id;
use crate::session::source::DataSource;
use crate::session::token::LoadGeneration;
use crate::session::token::LoadToken;
use crate::spreadsheet::category::SheetCategory;
use crate::spreadsheet::criteria::Criteria;
use crate::spreadsheet::payload::decode_sheet_names;
use crate::spreadsheet::payload::RawPayload;
use crate::spreadsheet::table::NormalizedTable;
use futures::stream;
use futures::StreamExt;
use serde_json::Value;
use std::future::Future;
use std::sync::Mutex;
use std::sync::MutexGuard;
use std::sync::PoisonError;
use thiserror::Error;
use tokio::time::timeout;
use tracing::debug;
use tracing::info;
use tracing::warn;

pub mod cache;
pub mod source;
pub mod token;

#[derive(Error, Debug)]
pub enum SessionError {
    /// The backend did not recognise the person
    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Missing {0}")]
    MissingInput(&'static str),

    #[error("No user is logged in")]
    NotLoggedIn,

    #[error("No tabs have been loaded")]
    NotLoaded,

    #[error("Request '{0}' timed out")]
    Timeout(String),

    /// The backend answered with an error or an unusable document
    #[error("Upstream error: {0}")]
    Upstream(String),
}

/// The signed-in person.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct User {
    pub name: String,
    /// Warehouse key, uppercased
    pub warehouse: String,
    /// Empty for name-only lookups
    pub birthday: String,
    pub is_admin: bool,
    /// Greeting returned with the identity
    pub message: Option<String>,
}

/// Outcome of a load that was not superseded.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LoadReport {
    /// Tabs that loaded and parsed, in resolution order
    pub loaded: Vec<String>,
    /// Tabs left out after a failed fetch or decode
    pub skipped: Vec<String>,
}

#[derive(Default)]
struct SessionState {
    user: Option<User>,
    sheet_names: Vec<String>,
    loaded: Option<LoadedResults>,
    data_error: Option<String>,
}

/// What a finished load hands back to the session state.
struct LoadedTabs {
    sheet_names: Vec<String>,
    results: LoadedResults,
    report: LoadReport,
}

/// Warehouse codes are compared and cached in upper case.
fn warehouse_key(warehouse: &str) -> String {
    warehouse.trim().to_uppercase()
}

pub struct Session<S> {
    source: S,
    settings: Settings,
    cache: SheetCache,
    generation: LoadGeneration,
    state: Mutex<SessionState>,
}

impl<S: DataSource> Session<S> {
    pub fn new(source: S, settings: Settings) -> Self {
        Session {
            cache: SheetCache::new(&settings),
            source,
            settings,
            generation: LoadGeneration::default(),
            state: Mutex::new(SessionState::default()),
        }
    }

    fn state(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Runs a backend request under the fetch deadline.
    async fn request<F>(&self, what: &str, request: F) -> Result<Value, AttendanceError>
    where
        F: Future<Output = anyhow::Result<Value>>,
    {
        match timeout(self.settings.fetch_timeout(), request).await {
            Ok(response) => Ok(response?),
            Err(_) => Err(SessionError::Timeout(what.to_owned()).into()),
        }
    }

    /// Verifies a name and birthday and signs the person in.
    pub async fn login(&self, name: &str, birthday: &str) -> Result<User, AttendanceError> {
        let (name, birthday) = (name.trim(), birthday.trim());
        if name.is_empty() || birthday.is_empty() {
            Err(SessionError::MissingInput("name and birthday"))?
        }

        let key = (name.to_owned(), birthday.to_owned());
        let identity = match self.cache.identities.get(&key) {
            Some(identity) => identity,
            None => {
                let response = self.request("verifyLogin", self.source.verify_login(name, birthday)).await?;
                let identity = decode_login(&response, name)?;
                self.cache.identities.insert(key, identity.clone());
                identity
            }
        };

        info!(name = %identity.name, warehouse = %identity.warehouse, "logged in");
        let user = User {
            name: identity.name,
            warehouse: identity.warehouse,
            birthday: birthday.to_owned(),
            is_admin: identity.is_admin,
            message: identity.message,
        };
        self.reset(Some(user.clone()));
        Ok(user)
    }

    /// Looks a person up by name only and switches the session to them.
    /// Cached data of the previous person is dropped.
    pub async fn find_employee(&self, name: &str) -> Result<User, AttendanceError> {
        let name = name.trim();
        if name.is_empty() {
            Err(SessionError::MissingInput("name"))?
        }

        let response = self.request("findWarehouseByName", self.source.find_warehouse_by_name(name)).await?;
        let identity = decode_employee(&response, name)?;

        info!(name = %identity.name, warehouse = %identity.warehouse, "switched to employee");
        self.cache.clear_all();
        let user = User {
            name: identity.name,
            warehouse: identity.warehouse,
            birthday: String::new(),
            is_admin: true,
            message: identity.message,
        };
        self.reset(Some(user.clone()));
        Ok(user)
    }

    /// Spreadsheet id of a warehouse.
    pub async fn spreadsheet_id(&self, warehouse: &str) -> Result<String, AttendanceError> {
        let warehouse = warehouse_key(warehouse);
        let warehouse = warehouse.as_str();
        if let Some(id) = self.cache.spreadsheet_ids.get(warehouse) {
            return Ok(id);
        }
        let response = self.request("getWarehouseId", self.source.spreadsheet_id(warehouse)).await?;
        let id = decode_spreadsheet_id(&response)?;
        self.cache.spreadsheet_ids.insert(warehouse.to_owned(), id.clone());
        Ok(id)
    }

    /// Tab catalog of a warehouse.
    pub async fn sheet_names(&self, warehouse: &str) -> Result<Vec<String>, AttendanceError> {
        let warehouse = warehouse_key(warehouse);
        let warehouse = warehouse.as_str();
        if let Some(names) = self.cache.sheet_names.get(warehouse) {
            return Ok(names);
        }
        let response = self.request("getSheets", self.source.sheet_names(warehouse)).await?;
        let names = decode_sheet_names(&response)?;
        self.cache.sheet_names.insert(warehouse.to_owned(), names.clone());
        Ok(names)
    }

    /// Loads every classified tab of the warehouse for the employee.
    ///
    /// Returns `Ok(None)` when the load was superseded before it finished.
    pub async fn load(&self, warehouse: &str, employee: &str, birthday: &str) -> Result<Option<LoadReport>, AttendanceError> {
        let warehouse = warehouse_key(warehouse);
        let warehouse = warehouse.as_str();
        if warehouse.is_empty() {
            Err(SessionError::MissingInput("warehouse"))?
        }

        let token = self.generation.begin();
        self.state().data_error = None;
        info!(warehouse, employee, generation = token.generation(), "loading tabs");

        let outcome = self.load_tabs(&token, warehouse, employee, birthday).await;
        let mut state = self.state();
        if !token.is_current() {
            debug!(generation = token.generation(), "discarding stale load");
            return Ok(None);
        }
        match outcome {
            Ok(Some(tabs)) => {
                info!(loaded = tabs.report.loaded.len(), skipped = tabs.report.skipped.len(), "tabs loaded");
                state.sheet_names = tabs.sheet_names;
                state.loaded = Some(tabs.results);
                Ok(Some(tabs.report))
            }
            Ok(None) => Ok(None),
            Err(error) => {
                warn!(warehouse, %error, "load failed");
                state.data_error = Some(error.to_string());
                state.sheet_names.clear();
                state.loaded = None;
                Err(error)
            }
        }
    }

    /// Loads the signed-in user's tabs.
    pub async fn load_user(&self) -> Result<Option<LoadReport>, AttendanceError> {
        let user = self.user().ok_or(SessionError::NotLoggedIn)?;
        self.load(&user.warehouse, &user.name, &user.birthday).await
    }

    async fn load_tabs(&self, token: &LoadToken, warehouse: &str, employee: &str, birthday: &str) -> Result<Option<LoadedTabs>, AttendanceError> {
        let sheet_names = self.sheet_names(warehouse).await.with_prefix(warehouse)?;
        if !token.is_current() {
            return Ok(None);
        }

        let tabs: Vec<&String> = SheetCategory::RESOLVED
            .iter()
            .flat_map(|category| {
                sheet_names
                    .iter()
                    .filter(move |name| SheetCategory::classify(name) == *category)
            })
            .collect();
        debug!(catalog = sheet_names.len(), tabs = tabs.len(), "classified tabs");

        let mut fetched: Vec<(usize, Result<RawPayload, AttendanceError>)> = stream::iter(tabs.iter().enumerate())
            .map(|(index, tab)| async move {
                let payload = self.fetch_tab(warehouse, tab, employee, birthday).await.with_prefix(tab);
                (index, payload)
            })
            .buffer_unordered(self.settings.concurrency())
            .collect()
            .await;
        fetched.sort_by_key(|(index, _)| *index);

        let mut report = LoadReport::default();
        let mut sheets = Vec::with_capacity(fetched.len());
        for (index, payload) in fetched {
            let tab = tabs[index];
            match payload {
                Ok(payload) => {
                    let sheet = LoadedSheet::new(tab, NormalizedTable::parse(&payload), employee);
                    debug!(tab = %tab, rows = sheet.table.rows.len(), matched = sheet.matched.len(), "parsed tab");
                    sheets.push(sheet);
                    report.loaded.push(tab.to_owned());
                }
                Err(error) => {
                    warn!(%error, "skipping tab");
                    report.skipped.push(tab.to_owned());
                }
            }
        }

        Ok(Some(LoadedTabs {
            results: LoadedResults {
                warehouse: warehouse.to_owned(),
                employee: employee.trim().to_owned(),
                sheets,
            },
            sheet_names,
            report,
        }))
    }

    async fn fetch_tab(&self, warehouse: &str, tab_name: &str, employee: &str, birthday: &str) -> Result<RawPayload, AttendanceError> {
        let key = SheetCache::sheet_data_key(warehouse, tab_name, employee);
        if let Some(value) = self.cache.sheet_data.get(&key) {
            debug!(tab = tab_name, "tab served from cache");
            return Ok(RawPayload::from_value(&value)?);
        }
        let request = self.source.sheet_data(warehouse, tab_name, employee.trim(), birthday.trim());
        let value = self.request(tab_name, request).await?;
        let payload = RawPayload::from_value(&value)?;
        self.cache.sheet_data.insert(key, value);
        Ok(payload)
    }

    /// Reconciles the loaded tabs for a month.
    pub fn reconcile(&self, month: u32) -> Result<Reconciliation, AttendanceError> {
        let criteria = Criteria::with_strategy(month, self.settings.strategy)?;
        let state = self.state();
        let loaded = state.loaded.as_ref().ok_or(SessionError::NotLoaded)?;
        Ok(reconcile(loaded, &criteria))
    }

    /// Leave days of the loaded employee for a month.
    ///
    /// Without an explicit year, the year of the resolved schedule's ISO
    /// headers is used, then the records' ISO headers, then the current year.
    pub fn leave_tally(&self, month: u32, year: Option<i32>) -> Result<LeaveTally, AttendanceError> {
        let criteria = Criteria::with_strategy(month, self.settings.strategy)?;
        let state = self.state();
        let loaded = state.loaded.as_ref().ok_or(SessionError::NotLoaded)?;
        let reconciliation = reconcile(loaded, &criteria);
        let year = year
            .or_else(|| year_from_iso_headers(&reconciliation.tables.schedule.headers_iso))
            .or_else(|| year_from_iso_headers(&reconciliation.tables.records.headers_iso))
            .unwrap_or_else(current_year);
        let source = LeaveSource::for_warehouse(&loaded.warehouse, &self.settings.records_preferred_warehouses);
        Ok(monthly_leave_tally(&reconciliation.tables, &loaded.employee, year, month, source, &self.settings.leave))
    }

    /// Drops caches and loaded data, then loads the signed-in user again.
    pub async fn refresh(&self) -> Result<Option<LoadReport>, AttendanceError> {
        self.cache.clear_all();
        let user = self.user();
        self.reset(user);
        info!("refreshing");
        self.load_user().await
    }

    /// Signs out; loads still in flight are discarded.
    pub fn logout(&self) {
        self.reset(None);
        info!("logged out");
    }

    /// Supersedes running loads and clears loaded data.
    fn reset(&self, user: Option<User>) {
        self.generation.invalidate();
        *self.state() = SessionState {
            user,
            ..SessionState::default()
        };
    }

    pub fn user(&self) -> Option<User> {
        self.state().user.clone()
    }

    /// Message of the last failed load, cleared when a load starts.
    pub fn data_error(&self) -> Option<String> {
        self.state().data_error.clone()
    }

    /// Tab catalog of the last successful load.
    pub fn loaded_sheet_names(&self) -> Vec<String> {
        self.state().sheet_names.clone()
    }

    pub fn loaded_results(&self) -> Option<LoadedResults> {
        self.state().loaded.clone()
    }
}
