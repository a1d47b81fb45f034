use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::dto::meeting_dto::MeetingRequest;
use crate::error::{Error, Result};
use crate::models::meeting::{Meeting, MeetingInput, MeetingSchedule, StoredMeetingStatus};
use crate::services::backend_client::{endpoints, saved_record, BackendClient};
use crate::services::event_store::{EventStore, Mutation};
use crate::services::meeting_status::{
    find_conflicts, MeetingDisplayStatus, MeetingWindow, StatusResolver,
};
use crate::services::reminder_service::ReminderService;
use crate::utils::time;
use crate::utils::validation::field_error;

/// Which dashboard's meeting collection a call works on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MeetingScope {
    #[default]
    Hr,
    TeamLeader,
}

impl MeetingScope {
    pub fn path(self) -> &'static str {
        match self {
            MeetingScope::Hr => endpoints::HR_MEETINGS,
            MeetingScope::TeamLeader => endpoints::TEAM_LEADER_MEETINGS,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            MeetingScope::Hr => "hr",
            MeetingScope::TeamLeader => "team_leader",
        }
    }

    fn reminder_prefix(self) -> String {
        format!("{}:", self.as_str())
    }

    fn reminder_key(self, meeting_id: &str) -> String {
        format!("{}:{}", self.as_str(), meeting_id)
    }
}

impl fmt::Display for MeetingScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct ResolvedMeeting {
    pub meeting: Meeting,
    pub status: MeetingDisplayStatus,
}

#[derive(Debug, Clone)]
pub struct MeetingWrite {
    pub meeting: ResolvedMeeting,
    pub conflicts: Vec<Meeting>,
    pub reminder_at: Option<DateTime<Utc>>,
}

#[derive(Clone)]
pub struct MeetingService {
    client: BackendClient,
    hr: EventStore<Meeting>,
    team_leader: EventStore<Meeting>,
    resolver: StatusResolver,
    reminders: ReminderService,
}

impl MeetingService {
    pub fn new(client: BackendClient, resolver: StatusResolver, reminders: ReminderService) -> Self {
        Self {
            client,
            hr: EventStore::new("hr_meetings"),
            team_leader: EventStore::new("team_leader_meetings"),
            resolver,
            reminders,
        }
    }

    fn store(&self, scope: MeetingScope) -> &EventStore<Meeting> {
        match scope {
            MeetingScope::Hr => &self.hr,
            MeetingScope::TeamLeader => &self.team_leader,
        }
    }

    async fn fetch(&self, scope: MeetingScope) -> Result<Vec<Meeting>> {
        self.client.get_list(scope.path()).await
    }

    async fn load(&self, scope: MeetingScope, refresh: bool) -> Result<Vec<Meeting>> {
        let store = self.store(scope);
        let meetings = if refresh {
            store.refresh(|| self.fetch(scope)).await?
        } else {
            store.ensure_loaded(|| self.fetch(scope)).await?
        };
        self.sync_reminders(scope, &meetings, time::now());
        Ok(meetings)
    }

    pub fn resolve(&self, now: DateTime<Utc>, meeting: Meeting) -> ResolvedMeeting {
        let status = self.resolver.resolve_meeting(now, &meeting);
        ResolvedMeeting { meeting, status }
    }

    /// Meetings with their display status, soonest first. Unparseable schedules sort
    /// last.
    #[instrument(skip(self))]
    pub async fn list(&self, scope: MeetingScope, refresh: bool) -> Result<Vec<ResolvedMeeting>> {
        let now = time::now();
        let tz = self.resolver.timezone();
        let mut meetings = self.load(scope, refresh).await?;
        meetings.sort_by_key(|meeting| {
            MeetingWindow::of(meeting, tz).map_or(DateTime::<Utc>::MAX_UTC, |w| w.start)
        });
        Ok(meetings
            .into_iter()
            .map(|meeting| self.resolve(now, meeting))
            .collect())
    }

    pub async fn get(&self, scope: MeetingScope, id: &str) -> Result<Meeting> {
        self.load(scope, false).await?;
        self.store(scope)
            .get(id)
            .await
            .ok_or_else(|| Error::NotFound(format!("Meeting {} not found", id)))
    }

    #[instrument(skip(self, request), fields(title = %request.title))]
    pub async fn create(&self, scope: MeetingScope, request: MeetingRequest) -> Result<MeetingWrite> {
        let (input, window) = build_input(&request, self.resolver)?;
        let existing = self.load(scope, false).await?;
        let conflicts = self.overlapping(&existing, &window, input.room.as_deref(), None);

        let body: JsonValue = self.client.post(scope.path(), &input).await.map_err(|err| {
            warn!(error = %err, "Meeting was not created");
            err
        })?;
        let saved: Meeting = saved_record(body, |id| {
            input.into_meeting(id.unwrap_or_else(|| format!("local-{}", Uuid::new_v4())))
        });
        self.finish_write(scope, saved, conflicts).await
    }

    #[instrument(skip(self, request))]
    pub async fn update(
        &self,
        scope: MeetingScope,
        id: &str,
        request: MeetingRequest,
    ) -> Result<MeetingWrite> {
        let current = self.get(scope, id).await?;
        let (mut input, window) = build_input(&request, self.resolver)?;
        if request.status.is_none() {
            input.status = current.stored_status().unwrap_or(StoredMeetingStatus::Scheduled);
        }
        let existing = self.store(scope).snapshot().await;
        let conflicts = self.overlapping(&existing, &window, input.room.as_deref(), Some(id));

        let path = format!("{}/{}", scope.path(), id);
        let body: JsonValue = self.client.put(&path, &input).await.map_err(|err| {
            warn!(error = %err, meeting_id = id, "Meeting was not updated");
            err
        })?;
        let saved: Meeting = saved_record(body, |echoed| input.into_meeting(echoed.unwrap_or_else(|| id.to_string())));
        self.finish_write(scope, saved, conflicts).await
    }

    /// Marks a meeting cancelled on the backend, keeping every other field.
    #[instrument(skip(self))]
    pub async fn cancel(&self, scope: MeetingScope, id: &str) -> Result<ResolvedMeeting> {
        let current = self.get(scope, id).await?;
        if current.is_cancelled() {
            return Ok(self.resolve(time::now(), current));
        }
        let input = MeetingInput {
            title: current.title.clone(),
            description: current.description.clone(),
            meeting_link: current.meeting_link.clone(),
            schedule: current.schedule.clone(),
            platform: current.platform.clone(),
            room: current.room.clone(),
            invited_departments: current.invited_departments.clone(),
            organizer: current.organizer.clone(),
            status: StoredMeetingStatus::Cancelled,
        };

        let path = format!("{}/{}", scope.path(), id);
        let body: JsonValue = self.client.put(&path, &input).await?;
        let saved: Meeting = saved_record(body, |_| input.into_meeting(id.to_string()));
        let write = self.finish_write(scope, saved, Vec::new()).await?;
        Ok(write.meeting)
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, scope: MeetingScope, id: &str) -> Result<()> {
        let path = format!("{}/{}", scope.path(), id);
        self.client.delete(&path).await.map_err(|err| {
            warn!(error = %err, meeting_id = id, "Meeting was not deleted");
            err
        })?;
        self.reminders.cancel(&scope.reminder_key(id));
        self.store(scope)
            .reconcile(Mutation::Remove(id.to_string()), || self.fetch(scope))
            .await;
        info!(meeting_id = id, %scope, "Meeting deleted");
        Ok(())
    }

    pub async fn conflicts(
        &self,
        scope: MeetingScope,
        date: &str,
        start_time: &str,
        end_time: &str,
        room: Option<&str>,
        exclude_id: Option<&str>,
    ) -> Result<Vec<Meeting>> {
        let window = MeetingWindow::parse(date, start_time, end_time, self.resolver.timezone())
            .ok_or_else(|| Error::BadRequest("date, start_time and end_time must be valid".to_string()))?;
        let meetings = self.load(scope, false).await?;
        Ok(self.overlapping(&meetings, &window, room, exclude_id))
    }

    fn overlapping(
        &self,
        meetings: &[Meeting],
        window: &MeetingWindow,
        room: Option<&str>,
        exclude_id: Option<&str>,
    ) -> Vec<Meeting> {
        find_conflicts(meetings, window, room, exclude_id, self.resolver.timezone())
            .into_iter()
            .cloned()
            .collect()
    }

    async fn finish_write(
        &self,
        scope: MeetingScope,
        saved: Meeting,
        conflicts: Vec<Meeting>,
    ) -> Result<MeetingWrite> {
        let reminder_at = self.sync_reminder(scope, &saved, time::now());
        self.store(scope)
            .reconcile(Mutation::Upsert(saved.clone()), || self.fetch(scope))
            .await;
        let stored = self.store(scope).get(&saved.id).await.unwrap_or(saved);
        if !conflicts.is_empty() {
            warn!(meeting_id = %stored.id, conflicts = conflicts.len(), "Meeting overlaps existing bookings");
        }
        info!(meeting_id = %stored.id, %scope, "Meeting saved");
        Ok(MeetingWrite {
            meeting: self.resolve(time::now(), stored),
            conflicts,
            reminder_at,
        })
    }

    /// Keeps the reminder timer of one meeting in line with its schedule.
    fn sync_reminder(&self, scope: MeetingScope, meeting: &Meeting, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        let key = scope.reminder_key(&meeting.id);
        match self.reminder_start(meeting) {
            Some(starts_at) => self.reminders.ensure(&key, &meeting.title, starts_at, now),
            None => {
                self.reminders.cancel(&key);
                None
            }
        }
    }

    fn sync_reminders(&self, scope: MeetingScope, meetings: &[Meeting], now: DateTime<Utc>) {
        let mut keep = Vec::with_capacity(meetings.len());
        for meeting in meetings {
            self.sync_reminder(scope, meeting, now);
            keep.push(scope.reminder_key(&meeting.id));
        }
        self.reminders.retain_prefixed(&scope.reminder_prefix(), &keep);
    }

    fn reminder_start(&self, meeting: &Meeting) -> Option<DateTime<Utc>> {
        match meeting.stored_status() {
            Some(StoredMeetingStatus::Cancelled) | Some(StoredMeetingStatus::Completed) => None,
            _ => MeetingWindow::of(meeting, self.resolver.timezone()).map(|w| w.start),
        }
    }
}

/// Normalizes a request into the backend body. Times are stored as `HH:MM`, and the
/// end must be strictly after the start on the same day.
fn build_input(request: &MeetingRequest, resolver: StatusResolver) -> Result<(MeetingInput, MeetingWindow)> {
    crate::utils::validation::validate(request)?;

    let date = time::parse_day(&request.date)
        .map_err(|_| field_error("date", "invalid", "date must be YYYY-MM-DD"))?;
    let start = time::parse_time(&request.start_time)
        .map_err(|_| field_error("start_time", "invalid", "start_time must be HH:MM"))?;
    let end = time::parse_time(&request.end_time)
        .map_err(|_| field_error("end_time", "invalid", "end_time must be HH:MM"))?;
    if end <= start {
        return Err(field_error("end_time", "range", "end time must be after start time").into());
    }

    let input = MeetingInput {
        title: request.title.trim().to_string(),
        description: request.description.clone().filter(|d| !d.trim().is_empty()),
        meeting_link: request.meeting_link.clone().filter(|l| !l.trim().is_empty()),
        schedule: MeetingSchedule {
            date: time::format_day(date),
            start_time: time::format_hm(start),
            end_time: time::format_hm(end),
        },
        platform: request.platform.clone(),
        room: request.room.clone().filter(|r| !r.trim().is_empty()),
        invited_departments: request.invited_departments.clone(),
        organizer: request.organizer.clone(),
        status: request.status.unwrap_or(StoredMeetingStatus::Scheduled),
    };
    let window = MeetingWindow::resolve(date, start, end, resolver.timezone());
    Ok((input, window))
}
