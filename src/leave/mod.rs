//! # Leave Classifier
//!
//! Decides which daily status codes count as leave and groups the counted days
//! of a month by status. Schedules mix leave codes (`特休`, `病`, `事`) with
//! rest days, holidays and staffing notes (`休`, `國`, `調倉`), and only the
//! former are tallied.
use serde::Deserialize;

pub mod status;

/// Status written on a working day.
pub const ON_DUTY: &str = "上班";

/// Broad display group of a status code.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum LeaveCategory {
    /// `國`, or `國出` when worked
    NationalHoliday,
    /// `例` and its variants
    StatutoryLeave,
    /// `休` and its variants
    RestDay,
    /// `休加`
    RestDayOvertime,
    /// `未`
    NotYetOnboard,
    /// `調倉`, `調任`
    Transfer,
    Sick,
    /// Half-day absences (`上休(曠)`, `下休(曠)`)
    Absence,
    Annual,
    Personal,
    Menstrual,
    OnDuty,
    /// Anything else, displayed like personal leave
    Unclassified,
}

impl LeaveCategory {
    /// Maps a trimmed status code to its display group.
    pub fn from_status(status: &str) -> Self {
        match status {
            "國" | "國出" => LeaveCategory::NationalHoliday,
            "例" | "例休" | "例假" | "例假日" => LeaveCategory::StatutoryLeave,
            "休" | "休假" | "休假日" => LeaveCategory::RestDay,
            "休加" => LeaveCategory::RestDayOvertime,
            "未" => LeaveCategory::NotYetOnboard,
            "調倉" | "調任" => LeaveCategory::Transfer,
            "病" => LeaveCategory::Sick,
            "上休(曠)" | "下休(曠)" => LeaveCategory::Absence,
            "特休" => LeaveCategory::Annual,
            "事" => LeaveCategory::Personal,
            "生理" => LeaveCategory::Menstrual,
            ON_DUTY => LeaveCategory::OnDuty,
            _ => LeaveCategory::Unclassified,
        }
    }

    pub const fn label(&self) -> &'static str {
        match self {
            LeaveCategory::NationalHoliday => "國定假日",
            LeaveCategory::StatutoryLeave => "例假日",
            LeaveCategory::RestDay => "休息日",
            LeaveCategory::RestDayOvertime => "休息日加班",
            LeaveCategory::NotYetOnboard => "未到職",
            LeaveCategory::Transfer => "調動",
            LeaveCategory::Sick => "病假",
            LeaveCategory::Absence => "曠職",
            LeaveCategory::Annual => "特休",
            LeaveCategory::Personal => "事假",
            LeaveCategory::Menstrual => "生理假",
            LeaveCategory::OnDuty => "上班",
            LeaveCategory::Unclassified => "其他",
        }
    }

    /// Status code whose display style this group shares.
    pub const fn style_key(&self) -> &'static str {
        match self {
            LeaveCategory::NationalHoliday => "國",
            LeaveCategory::StatutoryLeave => "例",
            LeaveCategory::RestDay => "休",
            LeaveCategory::RestDayOvertime => "休加",
            LeaveCategory::NotYetOnboard => "未",
            LeaveCategory::Transfer => "調倉",
            LeaveCategory::Sick => "病",
            LeaveCategory::Absence => "上休(曠)",
            LeaveCategory::Annual => "特休",
            LeaveCategory::Personal | LeaveCategory::Unclassified => "事",
            LeaveCategory::Menstrual => "生理",
            LeaveCategory::OnDuty => ON_DUTY,
        }
    }
}

/// Why a status was left out of the tally.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ExclusionReason {
    Blank,
    OnDuty,
    /// Equal to a non-leave code
    Exact(String),
    /// Contains a staffing keyword
    Keyword(String),
}

/// Outcome of classifying one daily status.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LeaveDecision {
    Excluded(ExclusionReason),
    Counted { bucket: String, category: LeaveCategory },
}

/// Rules separating leave codes from everything else.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LeavePolicy {
    /// Status meaning a normal working day
    pub on_duty: String,
    /// Codes excluded when they are the whole status
    pub exact_exclusions: Vec<String>,
    /// Keywords excluding any status that contains them
    pub contains_exclusions: Vec<String>,
}

fn owned(codes: &[&str]) -> Vec<String> {
    codes.iter().map(|code| code.to_string()).collect()
}

impl Default for LeavePolicy {
    fn default() -> Self {
        LeavePolicy {
            on_duty: ON_DUTY.to_owned(),
            exact_exclusions: owned(&["國", "未", "休", "休假", "休假日", "例", "例假", "例假日", "例休", "休加"]),
            contains_exclusions: owned(&["調倉", "離", "轉正", "調任"]),
        }
    }
}

impl LeavePolicy {
    /// Classifies a raw status; the bucket of a counted status is its trimmed text.
    pub fn classify(&self, status: &str) -> LeaveDecision {
        let status = status.trim();
        if status.is_empty() {
            return LeaveDecision::Excluded(ExclusionReason::Blank);
        }
        if status == self.on_duty {
            return LeaveDecision::Excluded(ExclusionReason::OnDuty);
        }
        if let Some(code) = self.exact_exclusions.iter().find(|code| code.as_str() == status) {
            return LeaveDecision::Excluded(ExclusionReason::Exact(code.to_owned()));
        }
        if let Some(keyword) = self
            .contains_exclusions
            .iter()
            .find(|keyword| !keyword.is_empty() && status.contains(keyword.as_str()))
        {
            return LeaveDecision::Excluded(ExclusionReason::Keyword(keyword.to_owned()));
        }
        LeaveDecision::Counted {
            bucket: status.to_owned(),
            category: LeaveCategory::from_status(status),
        }
    }

    /// Tallies the counted statuses of the given days.
    pub fn tally<I, F>(&self, days: I, mut status_of: F) -> LeaveTally
    where
        I: IntoIterator<Item = u32>,
        F: FnMut(u32) -> String,
    {
        let mut tally = LeaveTally::default();
        for day in days {
            if let LeaveDecision::Counted { bucket, category } = self.classify(&status_of(day)) {
                tally.record(bucket, category, day);
            }
        }
        tally
    }
}

/// Days of one leave status.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LeaveBucket {
    pub status: String,
    pub category: LeaveCategory,
    /// Days in ascending order of recording
    pub days: Vec<u32>,
}

impl LeaveBucket {
    pub fn count(&self) -> usize {
        self.days.len()
    }
}

/// Leave days grouped by status, in first-seen order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LeaveTally {
    buckets: Vec<LeaveBucket>,
}

impl LeaveTally {
    pub fn record(&mut self, status: String, category: LeaveCategory, day: u32) {
        match self.buckets.iter_mut().find(|bucket| bucket.status == status) {
            Some(bucket) => bucket.days.push(day),
            None => self.buckets.push(LeaveBucket {
                status,
                category,
                days: vec![day],
            }),
        }
    }

    pub fn buckets(&self) -> &[LeaveBucket] {
        &self.buckets
    }

    pub fn get(&self, status: &str) -> Option<&LeaveBucket> {
        self.buckets.iter().find(|bucket| bucket.status == status)
    }

    /// Bucket the day was counted in, if any.
    pub fn bucket_of_day(&self, day: u32) -> Option<&LeaveBucket> {
        self.buckets.iter().find(|bucket| bucket.days.contains(&day))
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    pub fn total_days(&self) -> usize {
        self.buckets.iter().map(LeaveBucket::count).sum()
    }
}
