use crate::spreadsheet::SpreadsheetError;
use serde::Deserialize;

/// How attendance rows from several tabs are combined.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttendanceMerge {
    /// Keep every kept row of every contributing tab.
    #[default]
    ByTabOrigin,
    /// Drop rows whose cell values repeat a row already kept from an earlier tab.
    DedupeRows,
}

/// What to do with an attendance row whose date cannot be determined.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UndatedRows {
    /// Assume the row belongs to the selected month.
    #[default]
    Keep,
    /// Exclude the row.
    Drop,
}

/// Points where reconciliation behavior can differ between deployments.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Strategy {
    pub attendance_merge: AttendanceMerge,
    pub undated_rows: UndatedRows,
}

/// Criteria for resolving one month of data.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Criteria {
    /// Selected month (1-12)
    pub month: u32,
    pub strategy: Strategy,
}

impl Criteria {
    /// Creates criteria for the given month with the default strategy.
    pub fn new(month: u32) -> Result<Self, SpreadsheetError> {
        Self::with_strategy(month, Strategy::default())
    }

    pub fn with_strategy(month: u32, strategy: Strategy) -> Result<Self, SpreadsheetError> {
        if !(1..=12).contains(&month) {
            Err(SpreadsheetError::MonthError(month))?
        }
        Ok(Criteria { month, strategy })
    }

    /// Tab-name token marking a tab as belonging to the selected month (`3月`).
    pub fn month_token(&self) -> String {
        format!("{}月", self.month)
    }

    /// Checks if a tab name carries the selected month's token.
    pub fn accept(&self, tab_name: &str) -> bool {
        tab_name.contains(&self.month_token())
    }

    /// Decides whether an attendance row with the given extracted month is kept.
    pub fn keeps_row_month(&self, row_month: Option<u32>) -> bool {
        match row_month {
            Some(month) => month == self.month,
            None => self.strategy.undated_rows == UndatedRows::Keep,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_criteria_month_range() {
        assert!(Criteria::new(0).is_err());
        assert!(Criteria::new(13).is_err());
        assert_eq!(Criteria::new(12).map(|criteria| criteria.month).ok(), Some(12));
    }

    #[test]
    fn test_criteria_accept() {
        let criteria = Criteria::new(2).expect("criteria");
        assert!(criteria.accept("2月班表A"));
        assert!(!criteria.accept("班表B"));
        // The token is a plain substring, as tab authors write it.
        assert!(criteria.accept("12月班表"));
    }

    #[test]
    fn test_keeps_row_month() {
        let keep = Criteria::new(3).expect("criteria");
        assert!(keep.keeps_row_month(Some(3)));
        assert!(!keep.keeps_row_month(Some(4)));
        assert!(keep.keeps_row_month(None));

        let drop = Criteria::with_strategy(3, Strategy {
            undated_rows: UndatedRows::Drop,
            ..Strategy::default()
        })
        .expect("criteria");
        assert!(!drop.keeps_row_month(None));
    }

    #[test]
    fn test_strategy_deserialize() {
        let strategy: Strategy = serde_json::from_str(r#"{"attendance_merge": "dedupe_rows"}"#).expect("strategy");
        assert_eq!(strategy.attendance_merge, AttendanceMerge::DedupeRows);
        assert_eq!(strategy.undated_rows, UndatedRows::Keep);
    }
}
