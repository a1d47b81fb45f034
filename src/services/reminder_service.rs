use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use tokio::task::AbortHandle;
use tracing::{debug, info};
use uuid::Uuid;

const FEED_CAPACITY: usize = 200;

#[derive(Debug, Clone, Serialize)]
pub struct Reminder {
    pub id: Uuid,
    pub key: String,
    pub title: String,
    pub message: String,
    pub starts_at: DateTime<Utc>,
    pub fired_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PendingReminder {
    pub key: String,
    pub title: String,
    pub starts_at: DateTime<Utc>,
    pub fire_at: DateTime<Utc>,
}

struct Timer {
    token: u64,
    handle: AbortHandle,
    info: PendingReminder,
}

/// One timer per meeting key, firing `lead` before the meeting starts. Scheduling a
/// key again replaces its timer; cancelling aborts it.
#[derive(Clone)]
pub struct ReminderService {
    lead: Duration,
    next_token: Arc<AtomicU64>,
    timers: Arc<Mutex<HashMap<String, Timer>>>,
    /// Start of the meeting each key last fired for.
    fired: Arc<Mutex<HashMap<String, DateTime<Utc>>>>,
    feed: Arc<Mutex<VecDeque<Reminder>>>,
}

impl ReminderService {
    pub fn new(lead_minutes: i64) -> Self {
        Self {
            lead: Duration::minutes(lead_minutes.max(0)),
            next_token: Arc::new(AtomicU64::new(1)),
            timers: Arc::new(Mutex::new(HashMap::new())),
            fired: Arc::new(Mutex::new(HashMap::new())),
            feed: Arc::new(Mutex::new(VecDeque::new())),
        }
    }

    /// Returns when the reminder will fire, or `None` when the meeting already started.
    pub fn schedule(
        &self,
        key: &str,
        title: &str,
        starts_at: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Option<DateTime<Utc>> {
        self.cancel(key);
        if starts_at <= now {
            return None;
        }

        let fire_at = (starts_at - self.lead).max(now);
        let delay = (fire_at - now).to_std().unwrap_or_default();
        let token = self.next_token.fetch_add(1, Ordering::Relaxed);

        let info = PendingReminder {
            key: key.to_string(),
            title: title.to_string(),
            starts_at,
            fire_at,
        };

        // Held until the timer is registered so a zero delay cannot fire first.
        let mut timers = self.timers.lock().expect("reminder timers mutex poisoned");
        let service = self.clone();
        let task_key = key.to_string();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            service.fire(&task_key, token);
        });
        timers.insert(
            key.to_string(),
            Timer {
                token,
                handle: handle.abort_handle(),
                info,
            },
        );
        drop(timers);
        debug!(key, %fire_at, "Reminder scheduled");
        Some(fire_at)
    }

    /// Like [`schedule`](Self::schedule), but leaves an identical pending timer alone
    /// and returns `None` once the reminder for this start has already fired.
    pub fn ensure(
        &self,
        key: &str,
        title: &str,
        starts_at: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Option<DateTime<Utc>> {
        let existing = {
            let timers = self.timers.lock().expect("reminder timers mutex poisoned");
            if self.has_fired(key, starts_at) {
                return None;
            }
            timers
                .get(key)
                .filter(|timer| timer.info.starts_at == starts_at && timer.info.title == title)
                .map(|timer| timer.info.fire_at)
        };
        match existing {
            Some(fire_at) => Some(fire_at),
            None => self.schedule(key, title, starts_at, now),
        }
    }

    pub fn cancel(&self, key: &str) -> bool {
        self.fired
            .lock()
            .expect("reminder fired mutex poisoned")
            .remove(key);
        let removed = self
            .timers
            .lock()
            .expect("reminder timers mutex poisoned")
            .remove(key);
        match removed {
            Some(timer) => {
                timer.handle.abort();
                debug!(key, "Reminder cancelled");
                true
            }
            None => false,
        }
    }

    /// Cancels every timer under `prefix` whose key is not in `keep`.
    pub fn retain_prefixed(&self, prefix: &str, keep: &[String]) -> usize {
        let mut timers = self.timers.lock().expect("reminder timers mutex poisoned");
        let stale: Vec<String> = timers
            .keys()
            .filter(|key| key.starts_with(prefix) && !keep.contains(key))
            .cloned()
            .collect();
        for key in &stale {
            if let Some(timer) = timers.remove(key) {
                timer.handle.abort();
            }
        }
        self.fired
            .lock()
            .expect("reminder fired mutex poisoned")
            .retain(|key, _| !key.starts_with(prefix) || keep.contains(key));
        stale.len()
    }

    fn has_fired(&self, key: &str, starts_at: DateTime<Utc>) -> bool {
        self.fired
            .lock()
            .expect("reminder fired mutex poisoned")
            .get(key)
            .is_some_and(|fired_for| *fired_for == starts_at)
    }

    fn fire(&self, key: &str, token: u64) {
        let timer = {
            let mut timers = self.timers.lock().expect("reminder timers mutex poisoned");
            let timer = match timers.get(key) {
                Some(timer) if timer.token == token => timers.remove(key),
                _ => None,
            };
            if let Some(timer) = &timer {
                self.fired
                    .lock()
                    .expect("reminder fired mutex poisoned")
                    .insert(timer.info.key.clone(), timer.info.starts_at);
            }
            timer
        };
        let Some(timer) = timer else {
            return;
        };

        let minutes = (timer.info.starts_at - crate::utils::time::now())
            .num_minutes()
            .max(0);
        let reminder = Reminder {
            id: Uuid::new_v4(),
            key: timer.info.key,
            message: format!("{} starts in {} minutes", timer.info.title, minutes),
            title: timer.info.title,
            starts_at: timer.info.starts_at,
            fired_at: crate::utils::time::now(),
        };
        info!(key = %reminder.key, title = %reminder.title, "Meeting reminder fired");

        let mut feed = self.feed.lock().expect("reminder feed mutex poisoned");
        if feed.len() >= FEED_CAPACITY {
            feed.pop_front();
        }
        feed.push_back(reminder);
    }

    pub fn pending(&self) -> Vec<PendingReminder> {
        let mut pending: Vec<PendingReminder> = self
            .timers
            .lock()
            .expect("reminder timers mutex poisoned")
            .values()
            .map(|timer| timer.info.clone())
            .collect();
        pending.sort_by(|a, b| a.fire_at.cmp(&b.fire_at));
        pending
    }

    /// Hands out every fired reminder once.
    pub fn drain(&self) -> Vec<Reminder> {
        self.feed
            .lock()
            .expect("reminder feed mutex poisoned")
            .drain(..)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration as StdDuration;

    fn minutes(m: u64) -> StdDuration {
        StdDuration::from_secs(m * 60)
    }

    fn is_scheduled(service: &ReminderService, key: &str) -> bool {
        service.pending().iter().any(|pending| pending.key == key)
    }

    #[tokio::test(start_paused = true)]
    async fn fires_lead_minutes_before_start() {
        let service = ReminderService::new(10);
        let now = Utc::now();
        let fire_at = service
            .schedule("hr:m1", "Budget review", now + Duration::minutes(30), now)
            .unwrap();
        assert_eq!(fire_at, now + Duration::minutes(20));

        tokio::time::sleep(minutes(19)).await;
        assert!(service.drain().is_empty());

        tokio::time::sleep(minutes(2)).await;
        let fired = service.drain();
        assert_eq!(fired.len(), 1);
        assert_eq!(fired[0].key, "hr:m1");
        assert!(!is_scheduled(&service, "hr:m1"));
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled_reminder_never_fires() {
        let service = ReminderService::new(10);
        let now = Utc::now();
        service.schedule("hr:m1", "Standup", now + Duration::minutes(15), now);
        assert!(service.cancel("hr:m1"));
        tokio::time::sleep(minutes(30)).await;
        assert!(service.drain().is_empty());
        assert!(!service.cancel("hr:m1"));
    }

    #[tokio::test(start_paused = true)]
    async fn rescheduling_replaces_old_timer() {
        let service = ReminderService::new(10);
        let now = Utc::now();
        service.schedule("hr:m1", "Standup", now + Duration::minutes(30), now);
        service.schedule("hr:m1", "Standup", now + Duration::minutes(60), now);
        assert_eq!(service.pending().len(), 1);

        tokio::time::sleep(minutes(25)).await;
        assert!(service.drain().is_empty());
        tokio::time::sleep(minutes(30)).await;
        assert_eq!(service.drain().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn ensure_keeps_matching_timer() {
        let service = ReminderService::new(10);
        let now = Utc::now();
        let starts_at = now + Duration::minutes(40);
        let first = service.ensure("hr:m1", "Sync", starts_at, now);
        let later = now + Duration::minutes(5);
        let second = service.ensure("hr:m1", "Sync", starts_at, later);
        assert_eq!(first, second);

        let moved = service.ensure("hr:m1", "Sync", starts_at + Duration::hours(1), later);
        assert_eq!(moved, Some(starts_at + Duration::minutes(50)));
    }

    #[tokio::test(start_paused = true)]
    async fn started_meetings_are_not_scheduled() {
        let service = ReminderService::new(10);
        let now = Utc::now();
        assert!(service.schedule("hr:m1", "Past", now - Duration::minutes(1), now).is_none());
        assert!(service.pending().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn retain_prefixed_drops_missing_meetings() {
        let service = ReminderService::new(10);
        let now = Utc::now();
        service.schedule("hr:a", "A", now + Duration::hours(2), now);
        service.schedule("hr:b", "B", now + Duration::hours(2), now);
        service.schedule("team_leader:a", "TL", now + Duration::hours(2), now);

        let dropped = service.retain_prefixed("hr:", &["hr:a".to_string()]);
        assert_eq!(dropped, 1);
        assert!(is_scheduled(&service, "hr:a"));
        assert!(!is_scheduled(&service, "hr:b"));
        assert!(is_scheduled(&service, "team_leader:a"));
    }

    #[tokio::test(start_paused = true)]
    async fn ensure_inside_lead_window_fires_once() {
        let service = ReminderService::new(10);
        let now = Utc::now();
        let starts_at = now + Duration::minutes(5);

        assert_eq!(service.ensure("hr:m1", "Sync", starts_at, now), Some(now));
        tokio::time::sleep(minutes(1)).await;
        assert_eq!(service.drain().len(), 1);

        let later = now + Duration::minutes(1);
        assert!(service.ensure("hr:m1", "Sync", starts_at, later).is_none());
        assert!(service.ensure("hr:m1", "Renamed", starts_at, later).is_none());
        tokio::time::sleep(minutes(1)).await;
        assert!(service.drain().is_empty());
        assert!(!is_scheduled(&service, "hr:m1"));
    }

    #[tokio::test(start_paused = true)]
    async fn moved_meeting_is_reminded_again() {
        let service = ReminderService::new(10);
        let now = Utc::now();
        service.ensure("hr:m1", "Sync", now + Duration::minutes(5), now);
        tokio::time::sleep(minutes(1)).await;
        assert_eq!(service.drain().len(), 1);

        let later = now + Duration::minutes(1);
        let moved = service.ensure("hr:m1", "Sync", now + Duration::hours(1), later);
        assert_eq!(moved, Some(now + Duration::minutes(50)));
        assert!(!service.has_fired("hr:m1", now + Duration::minutes(5)));
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_a_key_forgets_that_it_fired() {
        let service = ReminderService::new(10);
        let now = Utc::now();
        let starts_at = now + Duration::minutes(5);
        service.ensure("hr:a", "A", starts_at, now);
        service.ensure("hr:b", "B", starts_at, now);
        tokio::time::sleep(minutes(1)).await;
        assert_eq!(service.drain().len(), 2);

        service.retain_prefixed("hr:", &["hr:a".to_string()]);
        assert!(service.has_fired("hr:a", starts_at));
        assert!(!service.has_fired("hr:b", starts_at));

        service.cancel("hr:a");
        assert!(!service.has_fired("hr:a", starts_at));
    }
}
