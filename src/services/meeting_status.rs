//! Display status and overlap checks for meetings.

use std::fmt;

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use chrono_tz::Tz;
use serde::{Serialize, Serializer};

use crate::models::meeting::{Meeting, StoredMeetingStatus};
use crate::utils::time;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeetingDisplayStatus {
    LiveNow,
    StartingSoon,
    Today,
    Tomorrow,
    Upcoming(NaiveDate),
    Completed,
    Cancelled,
    Unknown,
}

impl MeetingDisplayStatus {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::LiveNow => "live",
            Self::StartingSoon => "starting_soon",
            Self::Today => "today",
            Self::Tomorrow => "tomorrow",
            Self::Upcoming(_) => "upcoming",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
            Self::Unknown => "unknown",
        }
    }

    /// Whether the meeting can still be joined or attended.
    pub fn is_active(&self) -> bool {
        !matches!(self, Self::Completed | Self::Cancelled | Self::Unknown)
    }
}

impl fmt::Display for MeetingDisplayStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LiveNow => f.write_str("Live Now"),
            Self::StartingSoon => f.write_str("Starting Soon"),
            Self::Today => f.write_str("Today"),
            Self::Tomorrow => f.write_str("Tomorrow"),
            Self::Upcoming(date) => f.write_str(&time::format_long_day(*date)),
            Self::Completed => f.write_str("Completed"),
            Self::Cancelled => f.write_str("Cancelled"),
            Self::Unknown => f.write_str("Unknown"),
        }
    }
}

impl Serialize for MeetingDisplayStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Start and end instants of a meeting slot. An end earlier than the start is taken
/// to cross midnight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MeetingWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl MeetingWindow {
    pub fn resolve(date: NaiveDate, start: NaiveTime, end: NaiveTime, tz: Tz) -> Self {
        let end_date = if end < start {
            date.succ_opt().unwrap_or(date)
        } else {
            date
        };
        Self {
            start: time::local_instant(date, start, tz),
            end: time::local_instant(end_date, end, tz),
        }
    }

    pub fn parse(date: &str, start: &str, end: &str, tz: Tz) -> Option<Self> {
        let date = time::parse_day(date).ok()?;
        let start = time::parse_time(start).ok()?;
        let end = time::parse_time(end).ok()?;
        Some(Self::resolve(date, start, end, tz))
    }

    pub fn of(meeting: &Meeting, tz: Tz) -> Option<Self> {
        Self::parse(
            &meeting.schedule.date,
            &meeting.schedule.start_time,
            &meeting.schedule.end_time,
            tz,
        )
    }

    /// Half-open overlap: back-to-back slots do not collide.
    pub fn overlaps(&self, other: &MeetingWindow) -> bool {
        self.start < other.end && other.start < self.end
    }
}

#[derive(Debug, Clone, Copy)]
pub struct StatusResolver {
    tz: Tz,
    starting_soon: Duration,
}

impl StatusResolver {
    pub fn new(tz: Tz, starting_soon_minutes: i64) -> Self {
        Self {
            tz,
            starting_soon: Duration::minutes(starting_soon_minutes.max(0)),
        }
    }

    pub fn timezone(&self) -> Tz {
        self.tz
    }

    pub fn resolve(
        &self,
        now: DateTime<Utc>,
        date: &str,
        start: &str,
        end: &str,
        stored: Option<&str>,
    ) -> MeetingDisplayStatus {
        match stored.and_then(StoredMeetingStatus::parse) {
            Some(StoredMeetingStatus::Cancelled) => return MeetingDisplayStatus::Cancelled,
            Some(StoredMeetingStatus::Completed) => return MeetingDisplayStatus::Completed,
            _ => {}
        }

        let Some(window) = MeetingWindow::parse(date, start, end, self.tz) else {
            return MeetingDisplayStatus::Unknown;
        };

        if window.start <= now && now <= window.end {
            return MeetingDisplayStatus::LiveNow;
        }
        if now > window.end {
            return MeetingDisplayStatus::Completed;
        }
        if window.start - now <= self.starting_soon {
            return MeetingDisplayStatus::StartingSoon;
        }

        let today = time::local_day(now, self.tz);
        let meeting_day = time::local_day(window.start, self.tz);
        if meeting_day == today {
            MeetingDisplayStatus::Today
        } else if Some(meeting_day) == today.succ_opt() {
            MeetingDisplayStatus::Tomorrow
        } else {
            MeetingDisplayStatus::Upcoming(meeting_day)
        }
    }

    pub fn resolve_meeting(&self, now: DateTime<Utc>, meeting: &Meeting) -> MeetingDisplayStatus {
        self.resolve(
            now,
            &meeting.schedule.date,
            &meeting.schedule.start_time,
            &meeting.schedule.end_time,
            meeting.status.as_deref(),
        )
    }
}

/// Meetings whose slot overlaps `window`. With a room, only meetings booked in the
/// same room count. Cancelled meetings and `exclude_id` never conflict.
pub fn find_conflicts<'a>(
    meetings: &'a [Meeting],
    window: &MeetingWindow,
    room: Option<&str>,
    exclude_id: Option<&str>,
    tz: Tz,
) -> Vec<&'a Meeting> {
    meetings
        .iter()
        .filter(|meeting| Some(meeting.id.as_str()) != exclude_id)
        .filter(|meeting| !meeting.is_cancelled())
        .filter(|meeting| match room {
            Some(room) => meeting
                .room
                .as_deref()
                .is_some_and(|booked| booked.trim().eq_ignore_ascii_case(room.trim())),
            None => true,
        })
        .filter(|meeting| {
            MeetingWindow::of(meeting, tz).is_some_and(|other| other.overlaps(window))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::meeting::MeetingSchedule;
    use chrono::TimeZone;

    fn resolver() -> StatusResolver {
        StatusResolver::new(chrono_tz::UTC, 15)
    }

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 10, h, m, 0).unwrap()
    }

    fn meeting(id: &str, date: &str, start: &str, end: &str, room: Option<&str>) -> Meeting {
        Meeting {
            id: id.into(),
            title: format!("Meeting {}", id),
            description: None,
            meeting_link: None,
            schedule: MeetingSchedule {
                date: date.into(),
                start_time: start.into(),
                end_time: end.into(),
            },
            platform: None,
            room: room.map(str::to_string),
            invited_departments: vec![],
            organizer: None,
            status: Some("scheduled".into()),
        }
    }

    #[test]
    fn strictly_inside_window_is_live() {
        let status = resolver().resolve(at(10, 30), "2025-01-10", "10:00", "11:00", Some("scheduled"));
        assert_eq!(status, MeetingDisplayStatus::LiveNow);
    }

    #[test]
    fn window_bounds_are_live() {
        let r = resolver();
        assert_eq!(r.resolve(at(10, 0), "2025-01-10", "10:00", "11:00", None), MeetingDisplayStatus::LiveNow);
        assert_eq!(r.resolve(at(11, 0), "2025-01-10", "10:00", "11:00", None), MeetingDisplayStatus::LiveNow);
        assert_eq!(r.resolve(at(11, 1), "2025-01-10", "10:00", "11:00", None), MeetingDisplayStatus::Completed);
    }

    #[test]
    fn stored_cancelled_and_completed_short_circuit() {
        let r = resolver();
        assert_eq!(
            r.resolve(at(10, 30), "2025-01-10", "10:00", "11:00", Some("cancelled")),
            MeetingDisplayStatus::Cancelled
        );
        assert_eq!(
            r.resolve(at(8, 0), "2025-01-10", "10:00", "11:00", Some("Completed")),
            MeetingDisplayStatus::Completed
        );
        assert_eq!(
            r.resolve(at(8, 0), "garbage", "10:00", "11:00", Some("canceled")),
            MeetingDisplayStatus::Cancelled
        );
    }

    #[test]
    fn upcoming_buckets() {
        let r = resolver();
        assert_eq!(r.resolve(at(9, 50), "2025-01-10", "10:00", "11:00", None), MeetingDisplayStatus::StartingSoon);
        assert_eq!(r.resolve(at(9, 45), "2025-01-10", "10:00", "11:00", None), MeetingDisplayStatus::StartingSoon);
        assert_eq!(r.resolve(at(9, 44), "2025-01-10", "10:00", "11:00", None), MeetingDisplayStatus::Today);
        assert_eq!(r.resolve(at(9, 0), "2025-01-11", "10:00", "11:00", None), MeetingDisplayStatus::Tomorrow);
        let later = r.resolve(at(9, 0), "2025-01-13", "10:00", "11:00", None);
        assert_eq!(later, MeetingDisplayStatus::Upcoming(NaiveDate::from_ymd_opt(2025, 1, 13).unwrap()));
        assert_eq!(later.to_string(), "Jan 13, 2025");
    }

    #[test]
    fn unparseable_schedule_is_unknown() {
        let r = resolver();
        assert_eq!(r.resolve(at(9, 0), "next week", "10:00", "11:00", None), MeetingDisplayStatus::Unknown);
        assert_eq!(r.resolve(at(9, 0), "2025-01-10", "", "11:00", None), MeetingDisplayStatus::Unknown);
    }

    #[test]
    fn overnight_slot_crosses_midnight() {
        let r = resolver();
        let late = Utc.with_ymd_and_hms(2025, 1, 11, 1, 0, 0).unwrap();
        assert_eq!(r.resolve(late, "2025-01-10", "23:00", "02:00", None), MeetingDisplayStatus::LiveNow);
    }

    #[test]
    fn timezone_shifts_today_and_tomorrow() {
        let kolkata: Tz = "Asia/Kolkata".parse().unwrap();
        let r = StatusResolver::new(kolkata, 15);
        // 20:00 UTC on the 10th is already 01:30 on the 11th in Kolkata.
        let now = Utc.with_ymd_and_hms(2025, 1, 10, 20, 0, 0).unwrap();
        assert_eq!(r.resolve(now, "2025-01-11", "10:00", "11:00", None), MeetingDisplayStatus::Today);
        assert_eq!(r.resolve(now, "2025-01-12", "10:00", "11:00", None), MeetingDisplayStatus::Tomorrow);
    }

    #[test]
    fn display_status_serializes_as_label() {
        assert_eq!(serde_json::to_value(MeetingDisplayStatus::LiveNow).unwrap(), "Live Now");
        assert_eq!(MeetingDisplayStatus::StartingSoon.kind(), "starting_soon");
    }

    #[test]
    fn conflicts_respect_room_and_cancellation() {
        let tz = chrono_tz::UTC;
        let mut cancelled = meeting("c", "2025-01-10", "10:00", "11:00", Some("Board Room"));
        cancelled.status = Some("cancelled".into());
        let meetings = vec![
            meeting("a", "2025-01-10", "10:00", "11:00", Some("Board Room")),
            meeting("b", "2025-01-10", "10:30", "11:30", Some("Studio")),
            meeting("d", "2025-01-10", "11:00", "12:00", Some("Board Room")),
            cancelled,
        ];
        let window = MeetingWindow::parse("2025-01-10", "10:15", "11:00", tz).unwrap();

        let any_room: Vec<&str> = find_conflicts(&meetings, &window, None, None, tz)
            .into_iter()
            .map(|m| m.id.as_str())
            .collect();
        assert_eq!(any_room, vec!["a", "b"]);

        let board: Vec<&str> = find_conflicts(&meetings, &window, Some("board room"), None, tz)
            .into_iter()
            .map(|m| m.id.as_str())
            .collect();
        assert_eq!(board, vec!["a"]);

        assert!(find_conflicts(&meetings, &window, Some("Board Room"), Some("a"), tz).is_empty());
    }
}
