//! Month evidence: does a tab actually hold data for the selected month?
//!
//! Spreadsheet authors put the month in the tab name, in the column headers or
//! only in cell values. Evidence is checked from the most to the least reliable
//! source: ISO header dates, then header labels, then (records only) row dates.

use crate::helpers::date::month_from_header;
use crate::helpers::date::month_from_iso;
use crate::spreadsheet::category::SheetCategory;
use crate::spreadsheet::table::NormalizedTable;

/// Header-based evidence for one month.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum HeaderEvidence {
    /// A header date points at the month
    Match,
    /// Header dates exist but none point at the month
    Mismatch,
    /// No header carries a date
    Absent,
}

/// Checks the header row for dates in the given month.
///
/// ISO dates are authoritative: as soon as any ISO header parses, the labels are
/// not consulted, even when none of the ISO dates fall in the month.
pub fn header_evidence(table: &NormalizedTable, month: u32) -> HeaderEvidence {
    let iso_months: Vec<u32> = table.headers_iso.iter().filter_map(|iso| month_from_iso(iso)).collect();
    if !iso_months.is_empty() {
        return if iso_months.contains(&month) {
            HeaderEvidence::Match
        } else {
            HeaderEvidence::Mismatch
        };
    }

    let label_months: Vec<u32> = table.headers.iter().filter_map(|header| month_from_header(header)).collect();
    if label_months.is_empty() {
        HeaderEvidence::Absent
    } else if label_months.contains(&month) {
        HeaderEvidence::Match
    } else {
        HeaderEvidence::Mismatch
    }
}

/// Decides whether a parsed tab has data for the month.
///
/// Schedules need header evidence. Records fall back to row date fields when
/// the headers do not match. Other categories are not month partitioned.
pub fn has_data_for_month(table: &NormalizedTable, category: SheetCategory, month: u32) -> bool {
    match category {
        SheetCategory::Schedule => header_evidence(table, month) == HeaderEvidence::Match,
        SheetCategory::Records => {
            header_evidence(table, month) == HeaderEvidence::Match
                || table.rows.iter().any(|row| row.month() == Some(month))
        }
        _ => true,
    }
}
