//! Three-step onboarding flow: basic info, position, compensation.
//!
//! Each step is validated when it is saved, and a step can only be saved once the
//! steps before it are. Stepping back moves the cursor but keeps every saved step.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value as JsonValue;
use tokio::time::Instant;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;
use validator::Validate;

use crate::error::{Error, Result};
use crate::models::hire::{BasicInfo, Compensation, HirePayload, PositionInfo};
use crate::services::backend_client::{endpoints, BackendClient};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WizardStep {
    Basic,
    Position,
    Compensation,
    Review,
}

impl WizardStep {
    fn next(self) -> Self {
        match self {
            WizardStep::Basic => WizardStep::Position,
            WizardStep::Position => WizardStep::Compensation,
            WizardStep::Compensation | WizardStep::Review => WizardStep::Review,
        }
    }

    fn previous(self) -> Option<Self> {
        match self {
            WizardStep::Basic => None,
            WizardStep::Position => Some(WizardStep::Basic),
            WizardStep::Compensation => Some(WizardStep::Position),
            WizardStep::Review => Some(WizardStep::Compensation),
        }
    }
}

#[derive(Debug, Clone)]
pub struct HireWizard {
    id: Uuid,
    step: WizardStep,
    basic: Option<BasicInfo>,
    position: Option<PositionInfo>,
    compensation: Option<Compensation>,
    submitting: bool,
    created_at: DateTime<Utc>,
    touched_at: Instant,
}

impl HireWizard {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            step: WizardStep::Basic,
            basic: None,
            position: None,
            compensation: None,
            submitting: false,
            created_at: crate::utils::time::now(),
            touched_at: Instant::now(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn step(&self) -> WizardStep {
        self.step
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn basic(&self) -> Option<&BasicInfo> {
        self.basic.as_ref()
    }

    pub fn position(&self) -> Option<&PositionInfo> {
        self.position.as_ref()
    }

    pub fn compensation(&self) -> Option<&Compensation> {
        self.compensation.as_ref()
    }

    pub fn completed_steps(&self) -> Vec<WizardStep> {
        let mut done = Vec::new();
        if self.basic.is_some() {
            done.push(WizardStep::Basic);
        }
        if self.position.is_some() {
            done.push(WizardStep::Position);
        }
        if self.compensation.is_some() {
            done.push(WizardStep::Compensation);
        }
        done
    }

    pub fn can_submit(&self) -> bool {
        self.basic.is_some() && self.position.is_some() && self.compensation.is_some()
    }

    fn ensure_idle(&self) -> Result<()> {
        if self.submitting {
            return Err(Error::Conflict("This hire is already being submitted".to_string()));
        }
        Ok(())
    }

    fn advance_from(&mut self, saved: WizardStep) {
        if self.step <= saved {
            self.step = saved.next();
        }
    }

    pub fn save_basic(&mut self, info: BasicInfo) -> Result<()> {
        self.ensure_idle()?;
        info.validate()?;
        self.basic = Some(info);
        self.advance_from(WizardStep::Basic);
        Ok(())
    }

    pub fn save_position(&mut self, info: PositionInfo) -> Result<()> {
        self.ensure_idle()?;
        if self.basic.is_none() {
            return Err(Error::Conflict("Complete the basic info step first".to_string()));
        }
        info.validate()?;
        self.position = Some(info);
        self.advance_from(WizardStep::Position);
        Ok(())
    }

    pub fn save_compensation(&mut self, info: Compensation) -> Result<()> {
        self.ensure_idle()?;
        if self.basic.is_none() || self.position.is_none() {
            return Err(Error::Conflict("Complete the position step first".to_string()));
        }
        info.validate()?;
        self.compensation = Some(info);
        self.advance_from(WizardStep::Compensation);
        Ok(())
    }

    pub fn back(&mut self) -> Result<WizardStep> {
        self.ensure_idle()?;
        let previous = self
            .step
            .previous()
            .ok_or_else(|| Error::BadRequest("Already at the first step".to_string()))?;
        self.step = previous;
        Ok(previous)
    }

    pub fn payload(&self) -> Result<HirePayload> {
        match (&self.basic, &self.position, &self.compensation) {
            (Some(basic), Some(position), Some(compensation)) => Ok(HirePayload {
                basic: basic.clone(),
                position: position.clone(),
                compensation: compensation.clone(),
            }),
            _ => Err(Error::Conflict(
                "All three steps must be completed before submitting".to_string(),
            )),
        }
    }
}

impl Default for HireWizard {
    fn default() -> Self {
        Self::new()
    }
}

/// Open wizard sessions, keyed by id. A session is dropped once its hire has been
/// accepted by the backend, or after sitting untouched for `idle_ttl`.
#[derive(Clone)]
pub struct WizardService {
    client: BackendClient,
    idle_ttl: Duration,
    sessions: Arc<Mutex<HashMap<Uuid, HireWizard>>>,
}

impl WizardService {
    pub fn new(client: BackendClient, idle_ttl: Duration) -> Self {
        Self {
            client,
            idle_ttl,
            sessions: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Locks the session map with idle sessions already gone.
    fn sessions(&self) -> MutexGuard<'_, HashMap<Uuid, HireWizard>> {
        let mut sessions = self.sessions.lock().expect("wizard sessions mutex poisoned");
        Self::drop_idle(&mut sessions, self.idle_ttl);
        sessions
    }

    fn drop_idle(sessions: &mut HashMap<Uuid, HireWizard>, idle_ttl: Duration) -> usize {
        let before = sessions.len();
        // A submit in flight owns its session until the backend answers.
        sessions.retain(|_, wizard| wizard.submitting || wizard.touched_at.elapsed() < idle_ttl);
        before - sessions.len()
    }

    /// Removes every session idle for longer than the TTL.
    pub fn evict_stale(&self) -> usize {
        let mut sessions = self.sessions.lock().expect("wizard sessions mutex poisoned");
        let evicted = Self::drop_idle(&mut sessions, self.idle_ttl);
        if evicted > 0 {
            debug!(evicted, open = sessions.len(), "Idle hire wizards evicted");
        }
        evicted
    }

    pub fn start(&self) -> HireWizard {
        let wizard = HireWizard::new();
        self.sessions().insert(wizard.id(), wizard.clone());
        info!(wizard_id = %wizard.id(), "Hire wizard started");
        wizard
    }

    pub fn get(&self, id: Uuid) -> Result<HireWizard> {
        self.update(id, |_| Ok(()))
    }

    fn update<F>(&self, id: Uuid, change: F) -> Result<HireWizard>
    where
        F: FnOnce(&mut HireWizard) -> Result<()>,
    {
        let mut sessions = self.sessions();
        let wizard = sessions
            .get_mut(&id)
            .ok_or_else(|| Error::NotFound(format!("Wizard session {} not found", id)))?;
        wizard.touched_at = Instant::now();
        change(wizard)?;
        Ok(wizard.clone())
    }

    pub fn save_basic(&self, id: Uuid, info: BasicInfo) -> Result<HireWizard> {
        self.update(id, |wizard| wizard.save_basic(info))
    }

    pub fn save_position(&self, id: Uuid, info: PositionInfo) -> Result<HireWizard> {
        self.update(id, |wizard| wizard.save_position(info))
    }

    pub fn save_compensation(&self, id: Uuid, info: Compensation) -> Result<HireWizard> {
        self.update(id, |wizard| wizard.save_compensation(info))
    }

    pub fn back(&self, id: Uuid) -> Result<HireWizard> {
        self.update(id, |wizard| wizard.back().map(|_| ()))
    }

    /// Posts the assembled hire once. A second submit while the first is in flight
    /// is a conflict; a failed post unlocks the session with its data intact.
    #[instrument(skip(self))]
    pub async fn submit(&self, id: Uuid) -> Result<JsonValue> {
        let payload = {
            let mut sessions = self.sessions();
            let wizard = sessions
                .get_mut(&id)
                .ok_or_else(|| Error::NotFound(format!("Wizard session {} not found", id)))?;
            wizard.ensure_idle()?;
            let payload = wizard.payload()?;
            wizard.submitting = true;
            payload
        };

        match self
            .client
            .post::<_, JsonValue>(endpoints::HIRING_ONBOARD, &payload)
            .await
        {
            Ok(created) => {
                self.sessions
                    .lock()
                    .expect("wizard sessions mutex poisoned")
                    .remove(&id);
                info!(wizard_id = %id, "Hire submitted");
                Ok(created)
            }
            Err(err) => {
                warn!(wizard_id = %id, error = %err, "Hire submission failed");
                if let Some(wizard) = self
                    .sessions
                    .lock()
                    .expect("wizard sessions mutex poisoned")
                    .get_mut(&id)
                {
                    wizard.submitting = false;
                    wizard.touched_at = Instant::now();
                }
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::hire::{EmploymentType, PayFrequency};
    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    fn basic() -> BasicInfo {
        BasicInfo {
            full_name: "Nodira Karimova".into(),
            email: "nodira@example.com".into(),
            phone: "+992900112233".into(),
            date_of_birth: None,
            address: None,
        }
    }

    fn position() -> PositionInfo {
        PositionInfo {
            department: "Sales".into(),
            designation: "Field Executive".into(),
            employment_type: EmploymentType::FullTime,
            start_date: NaiveDate::from_ymd_opt(2025, 2, 1).unwrap(),
            contract_end_date: None,
            reporting_manager: None,
        }
    }

    fn compensation() -> Compensation {
        Compensation {
            salary: Decimal::new(450000, 2),
            currency: "USD".into(),
            pay_frequency: PayFrequency::Monthly,
            bank_account: None,
        }
    }

    #[test]
    fn steps_are_gated_in_order() {
        let mut wizard = HireWizard::new();
        assert!(matches!(wizard.save_position(position()), Err(Error::Conflict(_))));
        assert!(matches!(wizard.save_compensation(compensation()), Err(Error::Conflict(_))));

        wizard.save_basic(basic()).unwrap();
        assert_eq!(wizard.step(), WizardStep::Position);
        wizard.save_position(position()).unwrap();
        wizard.save_compensation(compensation()).unwrap();
        assert_eq!(wizard.step(), WizardStep::Review);
        assert!(wizard.can_submit());
    }

    #[test]
    fn invalid_step_does_not_advance() {
        let mut wizard = HireWizard::new();
        let mut bad = basic();
        bad.email = "not-an-email".into();
        assert!(matches!(wizard.save_basic(bad), Err(Error::Validation(_))));
        assert_eq!(wizard.step(), WizardStep::Basic);
        assert!(wizard.basic().is_none());
    }

    #[test]
    fn back_keeps_entered_data() {
        let mut wizard = HireWizard::new();
        wizard.save_basic(basic()).unwrap();
        wizard.save_position(position()).unwrap();
        assert_eq!(wizard.back().unwrap(), WizardStep::Position);
        assert_eq!(wizard.back().unwrap(), WizardStep::Basic);
        assert!(wizard.back().is_err());
        assert_eq!(wizard.position(), Some(&position()));

        // Re-saving an earlier step moves forward by one, not past unsaved steps.
        wizard.save_basic(basic()).unwrap();
        assert_eq!(wizard.step(), WizardStep::Position);
        assert_eq!(wizard.completed_steps(), vec![WizardStep::Basic, WizardStep::Position]);
    }

    #[test]
    fn payload_requires_every_step() {
        let mut wizard = HireWizard::new();
        wizard.save_basic(basic()).unwrap();
        assert!(wizard.payload().is_err());
        wizard.save_position(position()).unwrap();
        wizard.save_compensation(compensation()).unwrap();
        let payload = wizard.payload().unwrap();
        assert_eq!(payload.basic.full_name, "Nodira Karimova");
        assert_eq!(payload.compensation.salary, Decimal::new(450000, 2));
    }

    fn service(idle_minutes: u64) -> WizardService {
        let config = crate::config::Config::for_backend("http://127.0.0.1:9").unwrap();
        WizardService::new(
            BackendClient::new(&config).unwrap(),
            Duration::from_secs(idle_minutes * 60),
        )
    }

    #[tokio::test(start_paused = true)]
    async fn idle_session_expires() {
        let service = service(60);
        let abandoned = service.start();
        let active = service.start();

        tokio::time::advance(Duration::from_secs(40 * 60)).await;
        service.save_basic(active.id(), basic()).unwrap();
        tokio::time::advance(Duration::from_secs(40 * 60)).await;

        assert!(matches!(service.get(abandoned.id()), Err(Error::NotFound(_))));
        assert_eq!(service.get(active.id()).unwrap().step(), WizardStep::Position);
    }

    #[tokio::test(start_paused = true)]
    async fn sweep_counts_evicted_sessions() {
        let service = service(60);
        service.start();
        service.start();
        assert_eq!(service.evict_stale(), 0);

        tokio::time::advance(Duration::from_secs(61 * 60)).await;
        assert_eq!(service.evict_stale(), 2);
        let fresh = service.start();
        assert!(service.get(fresh.id()).is_ok());
        assert_eq!(service.sessions.lock().unwrap().len(), 1);
    }

    #[test]
    fn submitting_locks_edits() {
        let mut wizard = HireWizard::new();
        wizard.save_basic(basic()).unwrap();
        wizard.submitting = true;
        assert!(matches!(wizard.save_basic(basic()), Err(Error::Conflict(_))));
        assert!(matches!(wizard.back(), Err(Error::Conflict(_))));
    }
}
