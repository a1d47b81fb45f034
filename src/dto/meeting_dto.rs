use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::meeting::{InvitedDepartment, Meeting, StoredMeetingStatus};
use crate::services::meeting_service::{MeetingScope, MeetingWrite, ResolvedMeeting};
use crate::services::meeting_status::MeetingDisplayStatus;

#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct ScopeQuery {
    #[serde(default)]
    pub scope: MeetingScope,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MeetingListQuery {
    #[serde(default)]
    pub scope: MeetingScope,
    #[serde(default)]
    pub refresh: bool,
    /// `active` keeps only live and starting-soon meetings.
    pub filter: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct MeetingRequest {
    #[validate(length(min = 1), custom(function = "crate::utils::validation::non_blank"))]
    pub title: String,
    #[serde(default, alias = "notes")]
    pub description: Option<String>,
    #[serde(default, alias = "google_meet_link", alias = "link")]
    #[validate(url)]
    pub meeting_link: Option<String>,
    #[validate(length(min = 1))]
    pub date: String,
    #[validate(length(min = 1))]
    pub start_time: String,
    #[validate(length(min = 1))]
    pub end_time: String,
    #[serde(default)]
    pub platform: Option<String>,
    #[serde(default)]
    pub room: Option<String>,
    #[serde(default)]
    pub invited_departments: Vec<InvitedDepartment>,
    #[serde(default)]
    pub organizer: Option<String>,
    #[serde(default)]
    pub status: Option<StoredMeetingStatus>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ConflictQuery {
    #[serde(default)]
    pub scope: MeetingScope,
    pub date: String,
    pub start_time: String,
    pub end_time: String,
    pub room: Option<String>,
    pub exclude_id: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MeetingResponse {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub meeting_link: Option<String>,
    pub date: String,
    pub start_time: String,
    pub end_time: String,
    pub platform: Option<String>,
    pub room: Option<String>,
    pub invited_departments: Vec<InvitedDepartment>,
    pub organizer: Option<String>,
    pub stored_status: Option<String>,
    pub display_status: MeetingDisplayStatus,
    pub status_kind: &'static str,
    pub is_active: bool,
}

impl From<ResolvedMeeting> for MeetingResponse {
    fn from(resolved: ResolvedMeeting) -> Self {
        let ResolvedMeeting { meeting, status } = resolved;
        Self {
            id: meeting.id,
            title: meeting.title,
            description: meeting.description,
            meeting_link: meeting.meeting_link,
            date: meeting.schedule.date,
            start_time: meeting.schedule.start_time,
            end_time: meeting.schedule.end_time,
            platform: meeting.platform,
            room: meeting.room,
            invited_departments: meeting.invited_departments,
            organizer: meeting.organizer,
            stored_status: meeting.status,
            status_kind: status.kind(),
            is_active: status.is_active(),
            display_status: status,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MeetingListResponse {
    pub scope: MeetingScope,
    pub total: usize,
    pub items: Vec<MeetingResponse>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ConflictSummary {
    pub id: String,
    pub title: String,
    pub date: String,
    pub start_time: String,
    pub end_time: String,
    pub room: Option<String>,
}

impl From<Meeting> for ConflictSummary {
    fn from(meeting: Meeting) -> Self {
        Self {
            id: meeting.id,
            title: meeting.title,
            date: meeting.schedule.date,
            start_time: meeting.schedule.start_time,
            end_time: meeting.schedule.end_time,
            room: meeting.room,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ConflictListResponse {
    pub total: usize,
    pub items: Vec<ConflictSummary>,
}

/// Saved meeting plus whatever it overlaps. Overlaps are reported, never blocking.
#[derive(Debug, Clone, Serialize)]
pub struct MeetingWriteResponse {
    pub meeting: MeetingResponse,
    pub conflicts: Vec<ConflictSummary>,
    pub reminder_at: Option<chrono::DateTime<chrono::Utc>>,
}

impl From<MeetingWrite> for MeetingWriteResponse {
    fn from(write: MeetingWrite) -> Self {
        Self {
            meeting: write.meeting.into(),
            conflicts: write.conflicts.into_iter().map(ConflictSummary::from).collect(),
            reminder_at: write.reminder_at,
        }
    }
}
