use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::models::department::DepartmentRef;
use crate::services::event_store::Record;
use crate::utils::time::{self, hm};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DayStatus {
    #[serde(rename = "Full Day Holiday", alias = "full_day_holiday", alias = "FullDayHoliday")]
    FullDayHoliday,
    #[serde(rename = "Half Day Holiday", alias = "half_day_holiday", alias = "HalfDayHoliday")]
    HalfDayHoliday,
    #[serde(rename = "Working Day", alias = "working_day", alias = "WorkingDay")]
    WorkingDay,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EventColors {
    pub background: &'static str,
    pub border: &'static str,
    pub text: &'static str,
}

impl DayStatus {
    pub const ALL: [DayStatus; 3] = [
        DayStatus::FullDayHoliday,
        DayStatus::HalfDayHoliday,
        DayStatus::WorkingDay,
    ];

    pub fn label(self) -> &'static str {
        match self {
            DayStatus::FullDayHoliday => "Full Day Holiday",
            DayStatus::HalfDayHoliday => "Half Day Holiday",
            DayStatus::WorkingDay => "Working Day",
        }
    }

    /// Start/end written into the form whenever this status is picked.
    pub fn default_time_range(self) -> (NaiveTime, NaiveTime) {
        match self {
            DayStatus::FullDayHoliday => (hm(0, 0), hm(23, 59)),
            DayStatus::HalfDayHoliday => (hm(9, 0), hm(13, 0)),
            DayStatus::WorkingDay => (hm(9, 0), hm(18, 0)),
        }
    }

    pub fn is_all_day(self) -> bool {
        matches!(self, DayStatus::FullDayHoliday)
    }

    pub fn colors(self) -> EventColors {
        match self {
            DayStatus::FullDayHoliday => EventColors {
                background: "#fee2e2",
                border: "#ef4444",
                text: "#991b1b",
            },
            DayStatus::HalfDayHoliday => EventColors {
                background: "#fef3c7",
                border: "#f59e0b",
                text: "#92400e",
            },
            DayStatus::WorkingDay => EventColors {
                background: "#d1fae5",
                border: "#10b981",
                text: "#065f46",
            },
        }
    }
}

impl fmt::Display for DayStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for DayStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .map(|c| c.to_ascii_lowercase())
            .collect();
        match normalized.as_str() {
            "fulldayholiday" | "fullday" => Ok(DayStatus::FullDayHoliday),
            "halfdayholiday" | "halfday" => Ok(DayStatus::HalfDayHoliday),
            "workingday" | "working" => Ok(DayStatus::WorkingDay),
            _ => Err(format!("unknown day status: {}", s)),
        }
    }
}

/// Holiday / attendance record as stored by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarEvent {
    #[serde(alias = "_id")]
    pub id: String,
    pub title: String,
    #[serde(default, alias = "notes")]
    pub description: Option<String>,
    #[serde(with = "crate::utils::time::day")]
    pub date: NaiveDate,
    #[serde(default)]
    pub departments: Vec<DepartmentRef>,
    pub status: DayStatus,
    #[serde(default, with = "crate::utils::time::opt_hm")]
    pub start_time: Option<NaiveTime>,
    #[serde(default, with = "crate::utils::time::opt_hm")]
    pub end_time: Option<NaiveTime>,
}

impl CalendarEvent {
    /// Stored times, falling back to the status defaults for records saved without them.
    pub fn time_range(&self) -> (NaiveTime, NaiveTime) {
        let (default_start, default_end) = self.status.default_time_range();
        (
            self.start_time.unwrap_or(default_start),
            self.end_time.unwrap_or(default_end),
        )
    }

    pub fn display_time(&self) -> String {
        if self.status.is_all_day() {
            return "All Day".to_string();
        }
        let (start, end) = self.time_range();
        format!("{} - {}", time::format_12h(start), time::format_12h(end))
    }

    pub fn colors(&self) -> EventColors {
        self.status.colors()
    }

    pub fn applies_to(&self, dept_id: &str) -> bool {
        self.departments.iter().any(|d| d.dept_id == dept_id)
    }
}

impl Record for CalendarEvent {
    fn record_id(&self) -> &str {
        &self.id
    }
}

/// Body sent to the backend when creating or updating an event.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarEventInput {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(with = "crate::utils::time::day")]
    pub date: NaiveDate,
    pub departments: Vec<DepartmentRef>,
    pub status: DayStatus,
    #[serde(with = "crate::utils::time::hm")]
    pub start_time: NaiveTime,
    #[serde(with = "crate::utils::time::hm")]
    pub end_time: NaiveTime,
}

impl CalendarEventInput {
    pub fn into_event(self, id: String) -> CalendarEvent {
        CalendarEvent {
            id,
            title: self.title,
            description: self.description,
            date: self.date,
            departments: self.departments,
            status: self.status,
            start_time: Some(self.start_time),
            end_time: Some(self.end_time),
        }
    }
}
