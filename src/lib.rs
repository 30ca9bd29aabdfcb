//! # Attendance Sheet Reconciliation
//!
//! Reconciles the human-authored tabs of a warehouse attendance spreadsheet
//! into one consistent view per employee and month.
//!
//! Warehouses keep schedules, attendance hours, punch records and shift-swap
//! lists as loosely named tabs (`3月班表`, `出勤時數(補登)`, `調假名單`). This
//! crate classifies tabs by name, normalizes their JSON payloads, picks the
//! right tab for a month using the dates found in headers and rows, merges
//! attendance split over several tabs and tallies leave days.
//!
//! ## Modules
//!
//! - `helpers`: text cleanup, name normalization and month extraction
//! - `spreadsheet`: tab classification, payload decoding and table normalization
//! - `reconcile`: per-month resolution of the loaded tabs
//! - `leave`: daily status lookups and the leave tally
//! - `session`: concurrent, cached, generation-tagged loading from a data source
//!
//! The transport to the spreadsheet backend is not part of the crate; plug one
//! in by implementing [`session::source::DataSource`].
pub mod config;
pub mod error;
pub mod helpers;
pub mod leave;
pub mod reconcile;
pub mod session;
pub mod spreadsheet;

pub use crate::config::Settings;
pub use crate::error::AttendanceError;
pub use crate::reconcile::reconcile;
pub use crate::reconcile::Reconciliation;
pub use crate::session::source::DataSource;
pub use crate::session::Session;
pub use crate::spreadsheet::category::SheetCategory;
pub use crate::spreadsheet::criteria::Criteria;
