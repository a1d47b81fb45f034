use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::models::hire::{BasicInfo, Compensation, PositionInfo};
use crate::models::job_posting::{parse_expiry, JobPosting, JobPostingInput};
use crate::services::hire_wizard::{HireWizard, WizardStep};
use crate::services::hiring_service::{JobList, JobStatusFilter};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct JobListQuery {
    pub status: Option<JobStatusFilter>,
    pub department: Option<String>,
    #[serde(default)]
    pub refresh: bool,
}

fn valid_expiry(value: &str) -> Result<(), ValidationError> {
    match parse_expiry(value) {
        Some(_) => Ok(()),
        None => Err(ValidationError::new("invalid_expiry_date")),
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct JobPostingRequest {
    #[validate(length(min = 1), custom(function = "crate::utils::validation::non_blank"))]
    pub title: String,
    #[validate(length(min = 1), custom(function = "crate::utils::validation::non_blank"))]
    pub department: String,
    #[validate(length(min = 1))]
    pub employment_type: String,
    #[validate(range(min = 1))]
    pub openings: u32,
    pub qualification: Option<String>,
    pub experience: Option<String>,
    pub location: Option<String>,
    pub salary: Option<String>,
    #[validate(custom(function = "valid_expiry"))]
    pub expiry_date: String,
    pub description: Option<String>,
}

impl From<JobPostingRequest> for JobPostingInput {
    fn from(request: JobPostingRequest) -> Self {
        Self {
            title: request.title.trim().to_string(),
            department: request.department.trim().to_string(),
            employment_type: request.employment_type,
            openings: request.openings,
            qualification: request.qualification,
            experience: request.experience,
            location: request.location,
            salary: request.salary,
            expiry_date: request.expiry_date.trim().to_string(),
            description: request.description,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct JobPostingResponse {
    pub id: String,
    pub title: String,
    pub department: Option<String>,
    pub employment_type: Option<String>,
    pub openings: Option<u32>,
    pub qualification: Option<String>,
    pub experience: Option<String>,
    pub location: Option<String>,
    pub salary: Option<String>,
    pub expiry_date: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
    pub description: Option<String>,
    pub expired: bool,
}

impl JobPostingResponse {
    pub fn new(posting: JobPosting, now: DateTime<Utc>) -> Self {
        Self {
            expired: posting.is_expired(now),
            expires_at: posting.expires_at(),
            id: posting.id,
            title: posting.title,
            department: posting.department,
            employment_type: posting.employment_type,
            openings: posting.openings,
            qualification: posting.qualification,
            experience: posting.experience,
            location: posting.location,
            salary: posting.salary,
            expiry_date: posting.expiry_date,
            description: posting.description,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct JobListResponse {
    pub items: Vec<JobPostingResponse>,
    pub total: usize,
    pub active: usize,
    pub expired: usize,
}

impl JobListResponse {
    pub fn new(list: JobList, now: DateTime<Utc>) -> Self {
        let items: Vec<JobPostingResponse> = list
            .items
            .into_iter()
            .map(|posting| JobPostingResponse::new(posting, now))
            .collect();
        Self {
            total: items.len(),
            items,
            active: list.active,
            expired: list.expired,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct WizardResponse {
    pub id: Uuid,
    pub step: WizardStep,
    pub completed_steps: Vec<WizardStep>,
    pub can_submit: bool,
    pub basic: Option<BasicInfo>,
    pub position: Option<PositionInfo>,
    pub compensation: Option<Compensation>,
    pub created_at: DateTime<Utc>,
}

impl From<HireWizard> for WizardResponse {
    fn from(wizard: HireWizard) -> Self {
        Self {
            id: wizard.id(),
            step: wizard.step(),
            completed_steps: wizard.completed_steps(),
            can_submit: wizard.can_submit(),
            created_at: wizard.created_at(),
            basic: wizard.basic().cloned(),
            position: wizard.position().cloned(),
            compensation: wizard.compensation().cloned(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct WizardSubmitResponse {
    pub submitted: bool,
    pub employee: serde_json::Value,
}
