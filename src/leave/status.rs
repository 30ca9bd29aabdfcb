//! Per-day status lookups on resolved tables.
use crate::helpers::date::days_in_month;
use crate::helpers::date::iso_date;
use crate::helpers::date::month_day_from_header;
use crate::helpers::date::year_from_iso_headers;
use crate::helpers::string::normalize_name;
use crate::leave::LeavePolicy;
use crate::leave::LeaveTally;
use crate::leave::ON_DUTY;
use crate::reconcile::CategoryTables;
use crate::spreadsheet::table::NormalizedTable;
use crate::spreadsheet::table::Row;

/// Which table daily statuses are read from.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum LeaveSource {
    #[default]
    Schedule,
    /// Records first, the schedule when records say nothing
    RecordsThenSchedule,
}

impl LeaveSource {
    /// Picks the source for a warehouse key; the listed warehouses keep their
    /// authoritative statuses in the records tab.
    pub fn for_warehouse(warehouse: &str, records_preferred: &[String]) -> Self {
        let warehouse = warehouse.trim();
        if records_preferred.iter().any(|key| key.trim().eq_ignore_ascii_case(warehouse)) {
            LeaveSource::RecordsThenSchedule
        } else {
            LeaveSource::Schedule
        }
    }
}

/// Trimmed non-empty text of a row cell.
fn cell<'a>(row: &'a Row, header: &str) -> Option<&'a str> {
    row.get(header).map(str::trim).filter(|value| !value.is_empty())
}

/// Status of the employee on one day, or `上班` when the table says nothing.
///
/// The year comes from the table's ISO headers when it has any, otherwise
/// `year` is used. The column is found by its ISO date first, then among the
/// date columns by a label naming exactly the same month and day.
pub fn daily_status(table: &NormalizedTable, employee: &str, year: i32, month: u32, day: u32) -> String {
    if table.rows.is_empty() || table.headers.is_empty() {
        return ON_DUTY.to_owned();
    }
    let key = normalize_name(employee);
    let Some(row) = table.rows.iter().find(|row| row.belongs_to(&key)) else {
        return ON_DUTY.to_owned();
    };

    let year = year_from_iso_headers(&table.headers_iso).unwrap_or(year);
    let target = iso_date(year, month, day);

    let by_iso = table
        .headers_iso
        .iter()
        .position(|iso| *iso == target)
        .and_then(|column| table.header(column))
        .and_then(|header| cell(row, header));
    if let Some(value) = by_iso {
        return value.to_owned();
    }

    table
        .date_cols
        .iter()
        .filter_map(|column| {
            let header = table.header(*column)?;
            let same_iso = table.headers_iso.get(*column).is_some_and(|iso| *iso == target);
            let same_label = month_day_from_header(header) == Some((month, day));
            if same_iso || same_label {
                cell(row, header)
            } else {
                None
            }
        })
        .next()
        .unwrap_or(ON_DUTY)
        .to_owned()
}

/// Records status of the day, falling back to the schedule when records show
/// a working day.
pub fn daily_record(records: &NormalizedTable, schedule: &NormalizedTable, employee: &str, year: i32, month: u32, day: u32) -> String {
    let status = daily_status(records, employee, year, month, day);
    if status != ON_DUTY {
        return status;
    }
    daily_status(schedule, employee, year, month, day)
}

/// Leave days of the employee for a whole month.
pub fn monthly_leave_tally(
    tables: &CategoryTables,
    employee: &str,
    year: i32,
    month: u32,
    source: LeaveSource,
    policy: &LeavePolicy,
) -> LeaveTally {
    let days = days_in_month(year, month).unwrap_or(0);
    policy.tally(1..=days, |day| match source {
        LeaveSource::Schedule => daily_status(&tables.schedule, employee, year, month, day),
        LeaveSource::RecordsThenSchedule => daily_record(&tables.records, &tables.schedule, employee, year, month, day),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spreadsheet::payload::RawPayload;
    use serde_json::json;
    use serde_json::Value;

    fn table(value: Value) -> NormalizedTable {
        NormalizedTable::parse(&RawPayload::from_value(&value).expect("payload"))
    }

    fn schedule() -> NormalizedTable {
        table(json!({
            "headers": ["姓名", "3/1", "3/2", "3/3", "3/10"],
            "headersISO": ["", "2026-03-01", "2026-03-02", "2026-03-03", "2026-03-10"],
            "dateCols": [1, 2, 3, 4],
            "rows": [
                {"v": ["李大華", "病", "病", "", ""]},
                {"v": ["王小明", "休假", " 特休 ", "", "遲到"]}
            ]
        }))
    }

    #[test]
    fn test_daily_status_by_iso() {
        let table = schedule();
        assert_eq!(daily_status(&table, "王小明", 1999, 3, 1), "休假");
        assert_eq!(daily_status(&table, "王小明", 1999, 3, 2), "特休");
        assert_eq!(daily_status(&table, "王小明", 1999, 3, 3), ON_DUTY);
        assert_eq!(daily_status(&table, "王小明\u{200B}", 1999, 3, 10), "遲到");
        assert_eq!(daily_status(&table, "陳美美", 1999, 3, 1), ON_DUTY);
    }

    #[test]
    fn test_daily_status_by_label() {
        let table = table(json!({
            "headers": ["姓名", "3/1", "3/10"],
            "dateCols": [1, 2],
            "rows": [{"v": ["王小明", "", "事"]}]
        }));
        assert_eq!(daily_status(&table, "王小明", 2026, 3, 10), "事");
        // 3/1 must not pick up the 3/10 column.
        assert_eq!(daily_status(&table, "王小明", 2026, 3, 1), ON_DUTY);
    }

    #[test]
    fn test_daily_status_empty_table() {
        assert_eq!(daily_status(&NormalizedTable::default(), "王小明", 2026, 3, 1), ON_DUTY);
    }

    #[test]
    fn test_daily_record_falls_back_to_schedule() {
        let records = table(json!({
            "headers": ["姓名", "3/1", "3/2"],
            "headersISO": ["", "2026-03-01", "2026-03-02"],
            "rows": [{"v": ["王小明", "病", "上班"]}]
        }));
        assert_eq!(daily_record(&records, &schedule(), "王小明", 2026, 3, 1), "病");
        assert_eq!(daily_record(&records, &schedule(), "王小明", 2026, 3, 2), "特休");
        assert_eq!(daily_record(&NormalizedTable::default(), &schedule(), "王小明", 2026, 3, 1), "休假");
    }

    #[test]
    fn test_leave_source_for_warehouse() {
        let preferred = vec!["TAO1".to_owned(), "TA01".to_owned()];
        assert_eq!(LeaveSource::for_warehouse("tao1", &preferred), LeaveSource::RecordsThenSchedule);
        assert_eq!(LeaveSource::for_warehouse("TAO2", &preferred), LeaveSource::Schedule);
    }

    #[test]
    fn test_monthly_leave_tally() {
        let tables = CategoryTables {
            schedule: schedule(),
            ..CategoryTables::default()
        };
        let tally = monthly_leave_tally(&tables, "王小明", 2026, 3, LeaveSource::Schedule, &LeavePolicy::default());
        let names: Vec<&str> = tally.buckets().iter().map(|bucket| bucket.status.as_str()).collect();
        assert_eq!(names, vec!["特休", "遲到"]);
        assert_eq!(tally.get("遲到").map(|bucket| bucket.days.clone()), Some(vec![10]));

        let empty = monthly_leave_tally(&CategoryTables::default(), "王小明", 2026, 3, LeaveSource::RecordsThenSchedule, &LeavePolicy::default());
        assert!(empty.is_empty());
    }
}
