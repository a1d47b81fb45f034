use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use chrono::NaiveDate;
use serde_json::Value as JsonValue;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::dto::calendar_dto::EventFormRequest;
use crate::error::{Error, Result};
use crate::models::calendar_event::CalendarEvent;
use crate::models::department::DepartmentRef;
use crate::services::backend_client::{endpoints, saved_record, BackendClient};
use crate::services::calendar_adapter::{
    build_calendar, for_department, CalendarEntry, CalendarLayout,
};
use crate::services::event_form::{EventForm, SubmitAction};
use crate::services::event_store::{EventStore, Mutation};

/// Marks a day as having a mutation in flight until dropped.
struct DayLock {
    days: Arc<Mutex<HashSet<NaiveDate>>>,
    date: NaiveDate,
}

impl DayLock {
    fn acquire(days: &Arc<Mutex<HashSet<NaiveDate>>>, date: NaiveDate) -> Result<Self> {
        let mut guard = days.lock().expect("calendar in-flight mutex poisoned");
        if !guard.insert(date) {
            return Err(Error::Conflict(format!(
                "A change for {} is already being saved",
                crate::utils::time::format_day(date)
            )));
        }
        Ok(Self {
            days: Arc::clone(days),
            date,
        })
    }
}

impl Drop for DayLock {
    fn drop(&mut self) {
        if let Ok(mut guard) = self.days.lock() {
            guard.remove(&self.date);
        }
    }
}

#[derive(Clone)]
pub struct CalendarService {
    client: BackendClient,
    events: EventStore<CalendarEvent>,
    departments: EventStore<DepartmentRef>,
    in_flight: Arc<Mutex<HashSet<NaiveDate>>>,
    default_layout: CalendarLayout,
}

impl CalendarService {
    pub fn new(client: BackendClient, default_layout: CalendarLayout) -> Self {
        Self {
            client,
            events: EventStore::new("calendar_events"),
            departments: EventStore::new("calendar_departments"),
            in_flight: Arc::new(Mutex::new(HashSet::new())),
            default_layout,
        }
    }

    pub fn default_layout(&self) -> CalendarLayout {
        self.default_layout
    }

    async fn fetch_events(&self) -> Result<Vec<CalendarEvent>> {
        self.client.get_list(endpoints::CALENDAR_EVENTS).await
    }

    pub async fn events(&self) -> Result<Vec<CalendarEvent>> {
        self.events.ensure_loaded(|| self.fetch_events()).await
    }

    #[instrument(skip(self))]
    pub async fn refresh(&self) -> Result<Vec<CalendarEvent>> {
        let events = self.events.refresh(|| self.fetch_events()).await?;
        info!(count = events.len(), "Calendar events refreshed");
        Ok(events)
    }

    pub async fn entries(
        &self,
        layout: Option<CalendarLayout>,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
        department: Option<&str>,
        refresh: bool,
    ) -> Result<Vec<CalendarEntry>> {
        let mut events = if refresh {
            self.refresh().await?
        } else {
            self.events().await?
        };
        if let Some(dept_id) = department {
            events = for_department(&events, dept_id);
        }
        Ok(build_calendar(
            &events,
            layout.unwrap_or(self.default_layout),
            from,
            to,
        ))
    }

    pub async fn departments(&self) -> Result<Vec<DepartmentRef>> {
        self.departments
            .ensure_loaded(|| self.client.get_list(endpoints::CALENDAR_DEPARTMENTS))
            .await
    }

    pub async fn form_for(&self, date: NaiveDate) -> Result<EventForm> {
        let events = self.events().await?;
        Ok(EventForm::for_date(date, &events))
    }

    /// Creates or updates the record for `request.date`, depending on whether the
    /// day already has one.
    #[instrument(skip(self, request), fields(date = %request.date))]
    pub async fn submit(&self, request: EventFormRequest) -> Result<EventForm> {
        let mut form = self.form_for(request.date).await?;
        apply_request(&mut form, &request)?;

        let _lock = DayLock::acquire(&self.in_flight, request.date)?;
        let action = form.begin_submit()?;

        let saved = match self.send(action).await {
            Ok(saved) => saved,
            Err(err) => {
                warn!(error = %err, "Calendar event was not saved");
                form.fail_submit();
                return Err(err);
            }
        };

        self.events
            .reconcile(Mutation::Upsert(saved.clone()), || self.fetch_events())
            .await;
        let stored = self.events.get(&saved.id).await.unwrap_or(saved);
        info!(event_id = %stored.id, status = %stored.status, "Calendar event saved");
        form.complete_submit(&stored);
        Ok(form)
    }

    async fn send(&self, action: SubmitAction) -> Result<CalendarEvent> {
        match action {
            SubmitAction::Create(input) => {
                let body: JsonValue = self.client.post(endpoints::CALENDAR_EVENTS, &input).await?;
                Ok(saved_record(body, |id| {
                    input.into_event(id.unwrap_or_else(|| format!("local-{}", Uuid::new_v4())))
                }))
            }
            SubmitAction::Update { id, input } => {
                let path = format!("{}/{}", endpoints::CALENDAR_EVENTS, id);
                let body: JsonValue = self.client.put(&path, &input).await?;
                Ok(saved_record(body, |echoed| input.into_event(echoed.unwrap_or(id))))
            }
        }
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: &str) -> Result<EventForm> {
        let events = self.events().await?;
        let event = events
            .iter()
            .find(|event| event.id == id)
            .ok_or_else(|| Error::NotFound(format!("Calendar event {} not found", id)))?;

        let mut form = EventForm::for_date(event.date, &events);
        let _lock = DayLock::acquire(&self.in_flight, event.date)?;
        let event_id = form.begin_delete()?;

        let path = format!("{}/{}", endpoints::CALENDAR_EVENTS, event_id);
        if let Err(err) = self.client.delete(&path).await {
            warn!(error = %err, "Calendar event was not deleted");
            form.fail_submit();
            return Err(err);
        }

        self.events
            .reconcile(Mutation::Remove(event_id.clone()), || self.fetch_events())
            .await;
        info!(%event_id, "Calendar event deleted");
        form.complete_delete();
        Ok(form)
    }
}

/// Replays the submitted values onto the form the way a user would: status first
/// (which resets times), then explicit times, then the department selection.
/// All-day statuses keep their fixed range.
fn apply_request(form: &mut EventForm, request: &EventFormRequest) -> Result<()> {
    form.set_title(request.title.clone())?;
    form.set_description(request.description.clone())?;

    if let Some(status) = request.status {
        if form.draft().status != Some(status) {
            form.select_status(status)?;
        }
    }
    if !form.draft().status.is_some_and(|status| status.is_all_day()) {
        form.set_times(request.start_time, request.end_time)?;
    }

    let current: Vec<DepartmentRef> = form.draft().departments.clone();
    for dept in current {
        if !request.departments.iter().any(|d| d.dept_id == dept.dept_id) {
            form.toggle_department(dept)?;
        }
    }
    for dept in &request.departments {
        if !form.draft().departments.iter().any(|d| d.dept_id == dept.dept_id) {
            form.toggle_department(dept.clone())?;
        }
    }
    Ok(())
}
