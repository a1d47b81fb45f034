//! Turns backend holiday/attendance records into entries a calendar widget can draw,
//! and folds entries back into records.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::models::calendar_event::{CalendarEvent, DayStatus, EventColors};
use crate::models::department::DepartmentRef;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CalendarLayout {
    /// One entry per record, listing every department.
    #[default]
    Composite,
    /// One entry per (record, department) pair.
    PerDepartment,
}

impl FromStr for CalendarLayout {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "composite" => Ok(CalendarLayout::Composite),
            "per_department" | "department" => Ok(CalendarLayout::PerDepartment),
            other => Err(format!("unknown calendar layout: {}", other)),
        }
    }
}

impl fmt::Display for CalendarLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CalendarLayout::Composite => f.write_str("composite"),
            CalendarLayout::PerDepartment => f.write_str("per_department"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CalendarEntry {
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
    /// Set only in the per-department layout.
    pub department: Option<DepartmentRef>,
    pub departments: Vec<DepartmentRef>,
}

pub fn to_entries(event: &CalendarEvent, layout: CalendarLayout) -> Vec<CalendarEntry> {
    match layout {
        CalendarLayout::Composite => vec![build_entry(event, event.id.clone(), None)],
        CalendarLayout::PerDepartment => event
            .departments
            .iter()
            .map(|dept| {
                build_entry(
                    event,
                    format!("{}-{}", event.id, dept.dept_id),
                    Some(dept.clone()),
                )
            })
            .collect(),
    }
}

fn build_entry(event: &CalendarEvent, id: String, department: Option<DepartmentRef>) -> CalendarEntry {
    let (start, end) = event.time_range();
    let title = match &department {
        Some(dept) => format!("{} ({})", event.title, dept.name),
        None => event.title.clone(),
    };
    CalendarEntry {
        id,
        event_id: event.id.clone(),
        title,
        start: event.date.and_time(start),
        end: event.date.and_time(end),
        all_day: event.status.is_all_day(),
        display_time: event.display_time(),
        colors: event.colors(),
        status: event.status,
        description: event.description.clone(),
        department,
        departments: event.departments.clone(),
    }
}

/// Entries for every record dated inside `[from, to]` (either bound optional),
/// ordered by start.
pub fn build_calendar(
    events: &[CalendarEvent],
    layout: CalendarLayout,
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
) -> Vec<CalendarEntry> {
    let mut entries: Vec<CalendarEntry> = events
        .iter()
        .filter(|event| from.map_or(true, |from| event.date >= from))
        .filter(|event| to.map_or(true, |to| event.date <= to))
        .flat_map(|event| to_entries(event, layout))
        .collect();
    entries.sort_by(|a, b| a.start.cmp(&b.start).then_with(|| a.id.cmp(&b.id)));
    entries
}

/// Records that list `dept_id`, narrowed to that one department.
pub fn for_department(events: &[CalendarEvent], dept_id: &str) -> Vec<CalendarEvent> {
    let entries: Vec<CalendarEntry> = events
        .iter()
        .filter(|event| event.applies_to(dept_id))
        .flat_map(|event| to_entries(event, CalendarLayout::PerDepartment))
        .filter(|entry| entry.department.as_ref().is_some_and(|d| d.dept_id == dept_id))
        .collect();
    fold_entries(&entries)
}

/// Groups entries by `event_id` back into records. Per-department entries of one
/// record contribute their department; the title drops the department suffix.
pub fn fold_entries(entries: &[CalendarEntry]) -> Vec<CalendarEvent> {
    let mut grouped: BTreeMap<&str, CalendarEvent> = BTreeMap::new();
    for entry in entries {
        let record = grouped.entry(entry.event_id.as_str()).or_insert_with(|| {
            let title = match &entry.department {
                Some(dept) => entry
                    .title
                    .strip_suffix(&format!(" ({})", dept.name))
                    .unwrap_or(&entry.title)
                    .to_string(),
                None => entry.title.clone(),
            };
            CalendarEvent {
                id: entry.event_id.clone(),
                title,
                description: entry.description.clone(),
                date: entry.start.date(),
                departments: Vec::new(),
                status: entry.status,
                start_time: Some(entry.start.time()),
                end_time: Some(entry.end.time()),
            }
        });
        let contributed = match &entry.department {
            Some(dept) => std::slice::from_ref(dept),
            None => entry.departments.as_slice(),
        };
        for dept in contributed {
            if !record.departments.contains(dept) {
                record.departments.push(dept.clone());
            }
        }
    }
    grouped.into_values().collect()
}
