use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::models::calendar_event::{DayStatus, EventColors};
use crate::models::department::DepartmentRef;
use crate::services::calendar_adapter::{CalendarEntry, CalendarLayout};
use crate::services::event_form::{EventForm, FormMode};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CalendarQuery {
    pub layout: Option<CalendarLayout>,
    #[serde(default, with = "crate::utils::time::opt_day")]
    pub from: Option<NaiveDate>,
    #[serde(default, with = "crate::utils::time::opt_day")]
    pub to: Option<NaiveDate>,
    /// Department id; entries are limited to that department.
    #[serde(default)]
    pub department: Option<String>,
    #[serde(default)]
    pub refresh: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FormQuery {
    #[serde(with = "crate::utils::time::day")]
    pub date: NaiveDate,
}

/// Full form contents for one day. Departments are the complete selection, not a
/// delta; times override the status defaults when present.
#[derive(Debug, Clone, Deserialize)]
pub struct EventFormRequest {
    #[serde(with = "crate::utils::time::day")]
    pub date: NaiveDate,
    #[serde(default)]
    pub title: String,
    #[serde(default, alias = "notes")]
    pub description: Option<String>,
    #[serde(default)]
    pub departments: Vec<DepartmentRef>,
    #[serde(default)]
    pub status: Option<DayStatus>,
    #[serde(default, with = "crate::utils::time::opt_hm")]
    pub start_time: Option<NaiveTime>,
    #[serde(default, with = "crate::utils::time::opt_hm")]
    pub end_time: Option<NaiveTime>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CalendarEntryResponse {
    pub id: String,
    pub event_id: String,
    pub title: String,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub all_day: bool,
    pub display_time: String,
    pub colors: EventColors,
    pub status: DayStatus,
    pub description: Option<String>,
    pub department: Option<DepartmentRef>,
    pub departments: Vec<DepartmentRef>,
}

impl From<CalendarEntry> for CalendarEntryResponse {
    fn from(entry: CalendarEntry) -> Self {
        Self {
            id: entry.id,
            event_id: entry.event_id,
            title: entry.title,
            start: entry.start,
            end: entry.end,
            all_day: entry.all_day,
            display_time: entry.display_time,
            colors: entry.colors,
            status: entry.status,
            description: entry.description,
            department: entry.department,
            departments: entry.departments,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CalendarResponse {
    pub layout: CalendarLayout,
    pub total: usize,
    pub items: Vec<CalendarEntryResponse>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DepartmentListResponse {
    pub items: Vec<DepartmentRef>,
}

#[derive(Debug, Clone, Serialize)]
pub struct EventFormResponse {
    #[serde(with = "crate::utils::time::day")]
    pub date: NaiveDate,
    pub mode: FormMode,
    pub is_create: bool,
    pub title: String,
    pub description: Option<String>,
    pub departments: Vec<DepartmentRef>,
    pub status: Option<DayStatus>,
    #[serde(with = "crate::utils::time::opt_hm")]
    pub start_time: Option<NaiveTime>,
    #[serde(with = "crate::utils::time::opt_hm")]
    pub end_time: Option<NaiveTime>,
}

impl From<EventForm> for EventFormResponse {
    fn from(form: EventForm) -> Self {
        let draft = form.draft().clone();
        Self {
            date: form.date(),
            mode: form.mode().clone(),
            is_create: form.is_create(),
            title: draft.title,
            description: draft.description,
            departments: draft.departments,
            status: draft.status,
            start_time: draft.start_time,
            end_time: draft.end_time,
        }
    }
}
