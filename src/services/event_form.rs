//! Create/edit state for the holiday calendar form.
//!
//! ```text
//! Empty ──submit──▶ Submitting ──ok──▶ Existing
//!   ▲                   │ err               │
//!   │                   ▼                   │
//!   └──── delete ── (previous state) ◀──────┘
//! ```

use chrono::{NaiveDate, NaiveTime};
use serde::Serialize;

use crate::error::{Error, Result};
use crate::models::calendar_event::{CalendarEvent, CalendarEventInput, DayStatus};
use crate::models::department::DepartmentRef;
use crate::utils::validation::field_error;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum FormMode {
    Empty,
    Existing { event_id: String },
    Submitting,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EventDraft {
    pub title: String,
    pub description: Option<String>,
    pub departments: Vec<DepartmentRef>,
    pub status: Option<DayStatus>,
    #[serde(with = "crate::utils::time::opt_hm")]
    pub start_time: Option<NaiveTime>,
    #[serde(with = "crate::utils::time::opt_hm")]
    pub end_time: Option<NaiveTime>,
}

impl From<&CalendarEvent> for EventDraft {
    fn from(event: &CalendarEvent) -> Self {
        let (start, end) = event.time_range();
        Self {
            title: event.title.clone(),
            description: event.description.clone(),
            departments: event.departments.clone(),
            status: Some(event.status),
            start_time: Some(start),
            end_time: Some(end),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SubmitAction {
    Create(CalendarEventInput),
    Update { id: String, input: CalendarEventInput },
}

#[derive(Debug, Clone, Serialize)]
pub struct EventForm {
    #[serde(with = "crate::utils::time::day")]
    date: NaiveDate,
    mode: FormMode,
    draft: EventDraft,
    #[serde(skip)]
    resume: Option<FormMode>,
}

impl EventForm {
    /// Opens the form for `date`: edit mode with the stored values when a record
    /// exists on that day, otherwise an empty create form.
    pub fn for_date(date: NaiveDate, events: &[CalendarEvent]) -> Self {
        match events.iter().find(|event| event.date == date) {
            Some(event) => Self {
                date,
                mode: FormMode::Existing {
                    event_id: event.id.clone(),
                },
                draft: EventDraft::from(event),
                resume: None,
            },
            None => Self {
                date,
                mode: FormMode::Empty,
                draft: EventDraft::default(),
                resume: None,
            },
        }
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn mode(&self) -> &FormMode {
        &self.mode
    }

    pub fn draft(&self) -> &EventDraft {
        &self.draft
    }

    pub fn is_create(&self) -> bool {
        matches!(self.mode, FormMode::Empty)
    }

    pub fn is_submitting(&self) -> bool {
        matches!(self.mode, FormMode::Submitting)
    }

    fn ensure_editable(&self) -> Result<()> {
        if self.is_submitting() {
            return Err(Error::Conflict(
                "A submission for this date is already in progress".to_string(),
            ));
        }
        Ok(())
    }

    pub fn set_title(&mut self, title: impl Into<String>) -> Result<()> {
        self.ensure_editable()?;
        self.draft.title = title.into();
        Ok(())
    }

    pub fn set_description(&mut self, description: Option<String>) -> Result<()> {
        self.ensure_editable()?;
        self.draft.description = description.filter(|d| !d.trim().is_empty());
        Ok(())
    }

    /// Picking a status always resets the time range to that status' defaults.
    pub fn select_status(&mut self, status: DayStatus) -> Result<()> {
        self.ensure_editable()?;
        let (start, end) = status.default_time_range();
        self.draft.status = Some(status);
        self.draft.start_time = Some(start);
        self.draft.end_time = Some(end);
        Ok(())
    }

    pub fn set_times(&mut self, start: Option<NaiveTime>, end: Option<NaiveTime>) -> Result<()> {
        self.ensure_editable()?;
        if let Some(start) = start {
            self.draft.start_time = Some(start);
        }
        if let Some(end) = end {
            self.draft.end_time = Some(end);
        }
        Ok(())
    }

    /// Adds the department when absent, removes it when present. Returns whether it
    /// ends up selected.
    pub fn toggle_department(&mut self, department: DepartmentRef) -> Result<bool> {
        self.ensure_editable()?;
        let selected = &mut self.draft.departments;
        if let Some(pos) = selected.iter().position(|d| d.dept_id == department.dept_id) {
            selected.remove(pos);
            Ok(false)
        } else {
            selected.push(department);
            Ok(true)
        }
    }

    pub fn validate(&self) -> Result<CalendarEventInput> {
        let title = self.draft.title.trim();
        if title.is_empty() {
            return Err(field_error("title", "required", "title is required").into());
        }
        if self.draft.departments.is_empty() {
            return Err(field_error(
                "departments",
                "required",
                "select at least one department",
            )
            .into());
        }
        let Some(status) = self.draft.status else {
            return Err(field_error("status", "required", "choose a day status").into());
        };
        let (default_start, default_end) = status.default_time_range();
        let start_time = self.draft.start_time.unwrap_or(default_start);
        let end_time = self.draft.end_time.unwrap_or(default_end);
        if start_time >= end_time {
            return Err(field_error("end_time", "range", "end time must be after start time").into());
        }

        Ok(CalendarEventInput {
            title: title.to_string(),
            description: self.draft.description.clone(),
            date: self.date,
            departments: self.draft.departments.clone(),
            status,
            start_time,
            end_time,
        })
    }

    /// Validates and locks the form. Nothing leaves the form when validation fails.
    pub fn begin_submit(&mut self) -> Result<SubmitAction> {
        self.ensure_editable()?;
        let input = self.validate()?;
        let action = match &self.mode {
            FormMode::Existing { event_id } => SubmitAction::Update {
                id: event_id.clone(),
                input,
            },
            _ => SubmitAction::Create(input),
        };
        self.resume = Some(std::mem::replace(&mut self.mode, FormMode::Submitting));
        Ok(action)
    }

    pub fn complete_submit(&mut self, saved: &CalendarEvent) {
        self.mode = FormMode::Existing {
            event_id: saved.id.clone(),
        };
        self.draft = EventDraft::from(saved);
        self.resume = None;
    }

    /// Unlocks the form after a failed mutation, keeping whatever the user typed.
    pub fn fail_submit(&mut self) {
        self.mode = self.resume.take().unwrap_or(FormMode::Empty);
    }

    pub fn begin_delete(&mut self) -> Result<String> {
        self.ensure_editable()?;
        let FormMode::Existing { event_id } = &self.mode else {
            return Err(Error::BadRequest(format!(
                "No event exists on {}",
                crate::utils::time::format_day(self.date)
            )));
        };
        let id = event_id.clone();
        self.resume = Some(std::mem::replace(&mut self.mode, FormMode::Submitting));
        Ok(id)
    }

    pub fn complete_delete(&mut self) {
        self.mode = FormMode::Empty;
        self.draft = EventDraft::default();
        self.resume = None;
    }
}
