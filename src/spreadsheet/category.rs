use crate::spreadsheet::SpreadsheetError;

/// Kind of data a tab holds, inferred from its human-authored name.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum SheetCategory {
    /// Planned shift/leave status per day
    Schedule,
    /// Recorded hours, possibly split across several tabs per month
    Attendance,
    /// Secondary daily status table
    Records,
    /// Shift-swap and correction entries, not partitioned by month
    Adjustment,
    /// No keyword matched
    Unknown,
}

/// Ordered keyword rules. The first rule whose keyword is a substring of the
/// tab name decides the category, so a tab named `調假名單(出勤時數)` is an
/// adjustment list.
const RULES: [(SheetCategory, &[&str]); 4] = [
    (SheetCategory::Adjustment, &["調假名單"]),
    (SheetCategory::Attendance, &["出勤時數", "出勤時間"]),
    (SheetCategory::Records, &["出勤記錄", "出勤紀律", "打卡記錄"]),
    (SheetCategory::Schedule, &["班表", "排班"]),
];

impl SheetCategory {
    /// Categories a tab can be resolved to, in resolution order.
    pub const RESOLVED: [SheetCategory; 4] = [
        SheetCategory::Schedule,
        SheetCategory::Records,
        SheetCategory::Attendance,
        SheetCategory::Adjustment,
    ];

    /// Classifies a raw tab name.
    pub fn classify(tab_name: &str) -> Self {
        RULES
            .iter()
            .find(|(_, keywords)| keywords.iter().any(|keyword| tab_name.contains(keyword)))
            .map(|(category, _)| *category)
            .unwrap_or(SheetCategory::Unknown)
    }

    /// Keywords that select this category, empty for `Unknown`.
    pub fn keywords(&self) -> &'static [&'static str] {
        RULES
            .iter()
            .find(|(category, _)| category == self)
            .map(|(_, keywords)| *keywords)
            .unwrap_or(&[])
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            SheetCategory::Schedule => "schedule",
            SheetCategory::Attendance => "attendance",
            SheetCategory::Records => "records",
            SheetCategory::Adjustment => "adjustment",
            SheetCategory::Unknown => "unknown",
        }
    }

    /// Parses a category from its name (case-insensitive).
    pub fn parse(name: &str) -> Result<Self, SpreadsheetError> {
        match name.trim().to_ascii_lowercase().as_str() {
            "schedule" => Ok(Self::Schedule),
            "attendance" => Ok(Self::Attendance),
            "records" => Ok(Self::Records),
            "adjustment" => Ok(Self::Adjustment),
            "unknown" => Ok(Self::Unknown),
            _ => Err(SpreadsheetError::CategoryError(name.to_owned())),
        }
    }
}
