//! # Monthly Reconciler
//!
//! Turns the parsed tabs of one warehouse into one table per category for a
//! selected month and employee.
//!
//! - Schedule and records: the first candidate, after month-token sorting, that
//!   has rows for the employee and month evidence in its headers (or, for
//!   records, in its row dates).
//! - Adjustment: the first parsed adjustment tab, whatever its content.
//! - Attendance: the union of in-month rows across every attendance tab.
//!
//! Reconciliation is pure: it never fetches and never mutates its inputs, so it
//! can be re-run whenever the selected month changes.
use crate::helpers::string::normalize_name;
use crate::reconcile::evidence::has_data_for_month;
use crate::reconcile::resolver::join_tab_names;
use crate::reconcile::resolver::sort_by_month_token;
use crate::spreadsheet::category::SheetCategory;
use crate::spreadsheet::criteria::AttendanceMerge;
use crate::spreadsheet::criteria::Criteria;
use crate::spreadsheet::table::NormalizedTable;
use crate::spreadsheet::table::Row;
use std::collections::HashSet;
use tracing::debug;

pub mod evidence;
pub mod resolver;

/// A tab that loaded and parsed, with the rows of the target employee.
#[derive(Clone, Debug)]
pub struct LoadedSheet {
    pub name: String,
    pub category: SheetCategory,
    pub table: NormalizedTable,
    /// Rows of `table` belonging to the target employee
    pub matched: Vec<Row>,
}

impl LoadedSheet {
    /// Classifies, and filters the table to the employee's rows.
    pub fn new(name: &str, table: NormalizedTable, employee: &str) -> Self {
        let matched = table.matching_rows(employee);
        LoadedSheet {
            name: name.to_owned(),
            category: SheetCategory::classify(name),
            table,
            matched,
        }
    }

    pub fn has_employee_rows(&self) -> bool {
        !self.matched.is_empty()
    }

    /// The table restricted to the employee's rows.
    fn matched_table(&self) -> NormalizedTable {
        self.table.with_rows(self.matched.to_owned())
    }
}

/// Every tab loaded for one warehouse and employee, in catalog order.
#[derive(Clone, Debug, Default)]
pub struct LoadedResults {
    pub warehouse: String,
    pub employee: String,
    pub sheets: Vec<LoadedSheet>,
}

impl LoadedResults {
    /// Loaded tabs of one category, in encounter order.
    pub fn of(&self, category: SheetCategory) -> impl Iterator<Item = &LoadedSheet> {
        self.sheets.iter().filter(move |sheet| sheet.category == category)
    }
}

/// Resolved tab name per category, for display attribution.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ResolvedSheets {
    pub schedule: String,
    /// Comma-separated names of every contributing attendance tab
    pub attendance: String,
    pub records: String,
    pub adjustment: String,
}

/// Resolved table per category.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CategoryTables {
    pub schedule: NormalizedTable,
    pub attendance: NormalizedTable,
    pub records: NormalizedTable,
    pub adjustment: NormalizedTable,
}

impl CategoryTables {
    pub fn get(&self, category: SheetCategory) -> Option<&NormalizedTable> {
        match category {
            SheetCategory::Schedule => Some(&self.schedule),
            SheetCategory::Attendance => Some(&self.attendance),
            SheetCategory::Records => Some(&self.records),
            SheetCategory::Adjustment => Some(&self.adjustment),
            SheetCategory::Unknown => None,
        }
    }
}

/// Result of reconciling one month.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Reconciliation {
    pub sheets: ResolvedSheets,
    pub tables: CategoryTables,
}

/// Reconciles loaded tabs for the month described by the criteria.
pub fn reconcile(results: &LoadedResults, criteria: &Criteria) -> Reconciliation {
    let mut reconciliation = Reconciliation::default();

    if let Some(sheet) = resolve_dated(results, SheetCategory::Schedule, criteria) {
        reconciliation.sheets.schedule = sheet.name.to_owned();
        reconciliation.tables.schedule = sheet.matched_table();
    }

    if let Some(sheet) = resolve_dated(results, SheetCategory::Records, criteria) {
        reconciliation.sheets.records = sheet.name.to_owned();
        reconciliation.tables.records = sheet.matched_table();
    }

    // Adjustment lists are not month partitioned and are kept even without rows.
    if let Some(sheet) = results.of(SheetCategory::Adjustment).next() {
        debug!(tab = %sheet.name, rows = sheet.matched.len(), "resolved adjustment tab");
        reconciliation.sheets.adjustment = sheet.name.to_owned();
        reconciliation.tables.adjustment = sheet.matched_table();
    }

    let (names, table) = merge_attendance(results, criteria);
    if !table.rows.is_empty() {
        reconciliation.sheets.attendance = join_tab_names(&names);
        reconciliation.tables.attendance = table;
    }

    reconciliation
}

/// Picks the schedule or records tab for the month.
fn resolve_dated<'a>(results: &'a LoadedResults, category: SheetCategory, criteria: &Criteria) -> Option<&'a LoadedSheet> {
    let mut candidates: Vec<&LoadedSheet> = results
        .of(category)
        .filter(|sheet| sheet.has_employee_rows())
        .filter(|sheet| {
            let accepted = has_data_for_month(&sheet.table, category, criteria.month);
            if !accepted {
                debug!(tab = %sheet.name, month = criteria.month, "no data for month, skipping");
            }
            accepted
        })
        .collect();
    sort_by_month_token(&mut candidates, criteria, |sheet| sheet.name.as_str());
    let resolved = candidates.into_iter().next();
    if let Some(sheet) = resolved {
        debug!(category = category.as_str(), tab = %sheet.name, month = criteria.month, "resolved tab");
    }
    resolved
}

/// Unions the employee's in-month attendance rows from every attendance tab.
/// Returns the contributing tab names and the combined table.
fn merge_attendance(results: &LoadedResults, criteria: &Criteria) -> (Vec<String>, NormalizedTable) {
    let mut headers: Vec<String> = Vec::new();
    let mut rows: Vec<Row> = Vec::new();
    let mut names: Vec<String> = Vec::new();
    let mut seen: HashSet<Vec<(String, String)>> = HashSet::new();

    for sheet in results.of(SheetCategory::Attendance) {
        if headers.is_empty() && !sheet.table.headers.is_empty() {
            headers = sheet.table.headers.to_owned();
        }
        for row in &sheet.matched {
            if !criteria.keeps_row_month(row.month()) {
                continue;
            }
            if criteria.strategy.attendance_merge == AttendanceMerge::DedupeRows && !seen.insert(row_fingerprint(row)) {
                continue;
            }
            rows.push(row.to_owned());
            if !names.contains(&sheet.name) {
                names.push(sheet.name.to_owned());
            }
        }
    }

    debug!(tabs = names.len(), rows = rows.len(), month = criteria.month, "merged attendance rows");
    let table = NormalizedTable {
        headers,
        rows,
        ..NormalizedTable::default()
    };
    (names, table)
}

/// Order-independent identity of a row's cell values, with names normalized.
fn row_fingerprint(row: &Row) -> Vec<(String, String)> {
    let mut values: Vec<(String, String)> = row
        .values
        .iter()
        .map(|(key, value)| (key.to_owned(), normalize_name(value)))
        .collect();
    values.sort();
    values
}
