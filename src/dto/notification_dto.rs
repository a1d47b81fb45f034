use serde::Serialize;

use crate::services::reminder_service::{PendingReminder, Reminder};

#[derive(Debug, Clone, Serialize)]
pub struct NotificationPollResponse {
    pub items: Vec<Reminder>,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct PendingRemindersResponse {
    pub items: Vec<PendingReminder>,
    pub count: usize,
}
