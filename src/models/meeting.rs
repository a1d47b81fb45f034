use std::fmt;

use serde::{Deserialize, Serialize};

use crate::services::event_store::Record;

/// Status as written by the backend. Only `cancelled` and `completed` carry weight;
/// everything shown to users is recomputed from the schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoredMeetingStatus {
    Scheduled,
    Completed,
    Cancelled,
    Live,
}

impl StoredMeetingStatus {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "scheduled" | "upcoming" => Some(Self::Scheduled),
            "completed" | "done" | "ended" => Some(Self::Completed),
            "cancelled" | "canceled" => Some(Self::Cancelled),
            "live" | "ongoing" => Some(Self::Live),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Scheduled => "scheduled",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
            Self::Live => "live",
        }
    }
}

impl fmt::Display for StoredMeetingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeetingSchedule {
    pub date: String,
    pub start_time: String,
    pub end_time: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvitedDepartment {
    pub department: String,
    #[serde(default, alias = "invited_employees")]
    pub invited_employees: Vec<String>,
}

/// Meeting record as stored by the backend. Schedule fields stay raw strings: older
/// records hold values the status resolver has to report as `Unknown` rather than
/// fail the whole list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Meeting {
    #[serde(alias = "_id")]
    pub id: String,
    pub title: String,
    #[serde(default, alias = "notes")]
    pub description: Option<String>,
    #[serde(default, alias = "googleMeetLink", alias = "link")]
    pub meeting_link: Option<String>,
    pub schedule: MeetingSchedule,
    #[serde(default)]
    pub platform: Option<String>,
    #[serde(default)]
    pub room: Option<String>,
    #[serde(default)]
    pub invited_departments: Vec<InvitedDepartment>,
    #[serde(default)]
    pub organizer: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

impl Meeting {
    pub fn stored_status(&self) -> Option<StoredMeetingStatus> {
        self.status.as_deref().and_then(StoredMeetingStatus::parse)
    }

    pub fn is_cancelled(&self) -> bool {
        self.stored_status() == Some(StoredMeetingStatus::Cancelled)
    }
}

impl Record for Meeting {
    fn record_id(&self) -> &str {
        &self.id
    }
}

/// Body sent to the backend on create / update.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MeetingInput {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meeting_link: Option<String>,
    pub schedule: MeetingSchedule,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub platform: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub room: Option<String>,
    pub invited_departments: Vec<InvitedDepartment>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organizer: Option<String>,
    pub status: StoredMeetingStatus,
}

impl MeetingInput {
    pub fn into_meeting(self, id: String) -> Meeting {
        Meeting {
            id,
            title: self.title,
            description: self.description,
            meeting_link: self.meeting_link,
            schedule: self.schedule,
            platform: self.platform,
            room: self.room,
            invited_departments: self.invited_departments,
            organizer: self.organizer,
            status: Some(self.status.as_str().to_string()),
        }
    }
}
