use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::error::Result;
use crate::models::job_posting::{JobPosting, JobPostingInput};
use crate::services::backend_client::{endpoints, saved_record, BackendClient};
use crate::services::event_store::{EventStore, Mutation};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatusFilter {
    Active,
    Expired,
}

pub struct JobList {
    pub items: Vec<JobPosting>,
    pub active: usize,
    pub expired: usize,
}

impl JobList {
    /// Counts cover every posting; `items` holds only the ones passing the filters.
    pub fn build(
        postings: Vec<JobPosting>,
        status: Option<JobStatusFilter>,
        department: Option<&str>,
        now: DateTime<Utc>,
    ) -> Self {
        let expired = postings.iter().filter(|p| p.is_expired(now)).count();
        let active = postings.len() - expired;
        let items = postings
            .into_iter()
            .filter(|posting| match status {
                Some(JobStatusFilter::Active) => !posting.is_expired(now),
                Some(JobStatusFilter::Expired) => posting.is_expired(now),
                None => true,
            })
            .filter(|posting| match department {
                Some(dept) => posting
                    .department
                    .as_deref()
                    .is_some_and(|d| d.eq_ignore_ascii_case(dept.trim())),
                None => true,
            })
            .collect();
        Self {
            items,
            active,
            expired,
        }
    }
}

#[derive(Clone)]
pub struct HiringService {
    client: BackendClient,
    jobs: EventStore<JobPosting>,
}

impl HiringService {
    pub fn new(client: BackendClient) -> Self {
        Self {
            client,
            jobs: EventStore::new("job_postings"),
        }
    }

    async fn fetch(&self) -> Result<Vec<JobPosting>> {
        self.client.get_list(endpoints::HIRING_JOBS).await
    }

    fn job_path(id: &str) -> String {
        format!("{}/{}", endpoints::HIRING_JOBS, id)
    }

    pub async fn list(
        &self,
        status: Option<JobStatusFilter>,
        department: Option<&str>,
        refresh: bool,
        now: DateTime<Utc>,
    ) -> Result<JobList> {
        let postings = if refresh {
            self.jobs.refresh(|| self.fetch()).await?
        } else {
            self.jobs.ensure_loaded(|| self.fetch()).await?
        };
        Ok(JobList::build(postings, status, department, now))
    }

    /// Always asks the backend, then refreshes the cached copy of that posting.
    #[instrument(skip(self))]
    pub async fn get(&self, id: &str) -> Result<JobPosting> {
        let posting: JobPosting = self.client.get(&Self::job_path(id)).await?;
        if self.jobs.is_loaded().await {
            self.jobs.apply(Mutation::Upsert(posting.clone())).await;
        }
        Ok(posting)
    }

    #[instrument(skip(self, input), fields(title = %input.title))]
    pub async fn create(&self, input: JobPostingInput) -> Result<JobPosting> {
        let body: JsonValue = self.client.post(endpoints::HIRING_JOBS, &input).await?;
        let saved = saved_record(body, |id| {
            into_posting(input, id.unwrap_or_else(|| format!("local-{}", Uuid::new_v4())))
        });
        self.jobs
            .reconcile(Mutation::Upsert(saved.clone()), || self.fetch())
            .await;
        info!(job_id = %saved.id, "Job posting created");
        Ok(self.jobs.get(&saved.id).await.unwrap_or(saved))
    }

    #[instrument(skip(self, input))]
    pub async fn update(&self, id: &str, input: JobPostingInput) -> Result<JobPosting> {
        let body: JsonValue = self.client.put(&Self::job_path(id), &input).await?;
        let saved = saved_record(body, |echoed| {
            into_posting(input, echoed.unwrap_or_else(|| id.to_string()))
        });
        self.jobs
            .reconcile(Mutation::Upsert(saved.clone()), || self.fetch())
            .await;
        info!(job_id = %saved.id, "Job posting updated");
        Ok(self.jobs.get(&saved.id).await.unwrap_or(saved))
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: &str) -> Result<()> {
        self.client.delete(&Self::job_path(id)).await?;
        self.jobs
            .reconcile(Mutation::Remove(id.to_string()), || self.fetch())
            .await;
        info!(job_id = id, "Job posting deleted");
        Ok(())
    }
}

fn into_posting(input: JobPostingInput, id: String) -> JobPosting {
    JobPosting {
        id,
        title: input.title,
        department: Some(input.department),
        employment_type: Some(input.employment_type),
        openings: Some(input.openings),
        qualification: input.qualification,
        experience: input.experience,
        location: input.location,
        salary: input.salary,
        expiry_date: Some(input.expiry_date),
        description: input.description,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn posting(id: &str, department: &str, expiry: &str) -> JobPosting {
        JobPosting {
            id: id.into(),
            title: format!("Role {}", id),
            department: Some(department.into()),
            employment_type: None,
            openings: Some(1),
            qualification: None,
            experience: None,
            location: None,
            salary: None,
            expiry_date: Some(expiry.into()),
            description: None,
        }
    }

    fn sample() -> Vec<JobPosting> {
        vec![
            posting("a", "Sales", "2025-01-01"),
            posting("b", "Sales", "2025-03-01"),
            posting("c", "HR", "2025-03-01"),
            posting("d", "HR", "whenever"),
        ]
    }

    #[test]
    fn counts_cover_all_postings() {
        let now = Utc.with_ymd_and_hms(2025, 2, 1, 0, 0, 0).unwrap();
        let list = JobList::build(sample(), None, None, now);
        assert_eq!(list.items.len(), 4);
        assert_eq!(list.expired, 1);
        assert_eq!(list.active, 3);
    }

    #[test]
    fn filters_by_status_and_department() {
        let now = Utc.with_ymd_and_hms(2025, 2, 1, 0, 0, 0).unwrap();
        let expired = JobList::build(sample(), Some(JobStatusFilter::Expired), None, now);
        let ids: Vec<&str> = expired.items.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["a"]);

        let active_hr = JobList::build(sample(), Some(JobStatusFilter::Active), Some("hr"), now);
        let ids: Vec<&str> = active_hr.items.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["c", "d"]);
        assert_eq!(active_hr.expired, 1);
    }

    #[test]
    fn input_becomes_posting_with_given_id() {
        let input = JobPostingInput {
            title: "Agronomist".into(),
            department: "Field".into(),
            employment_type: "Full-time".into(),
            openings: 3,
            qualification: None,
            experience: None,
            location: Some("Dushanbe".into()),
            salary: None,
            expiry_date: "2025-06-30".into(),
            description: None,
        };
        let posting = into_posting(input, "job-7".into());
        assert_eq!(posting.id, "job-7");
        assert_eq!(posting.openings, Some(3));
        assert_eq!(posting.expiry_date.as_deref(), Some("2025-06-30"));
    }
}
