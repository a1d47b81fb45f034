use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::Value as JsonValue;
use tracing::instrument;

use crate::error::{Error, Result};
use crate::models::employee::Employee;
use crate::models::farmer::{Farmer, Payment};
use crate::models::team::Team;
use crate::services::backend_client::{endpoints, BackendClient};
use crate::services::event_store::EventStore;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PaymentSummary {
    pub total_paid: Decimal,
    pub total_pending: Decimal,
    pub payment_count: usize,
    #[serde(with = "crate::utils::time::opt_day")]
    pub last_payment_date: Option<NaiveDate>,
}

impl PaymentSummary {
    pub fn from_payments(payments: &[Payment]) -> Self {
        let mut summary = PaymentSummary {
            payment_count: payments.len(),
            ..Default::default()
        };
        for payment in payments {
            if payment.is_paid() {
                summary.total_paid += payment.amount;
            } else if payment.is_pending() {
                summary.total_pending += payment.amount;
            }
        }
        summary.last_payment_date = payments
            .iter()
            .filter(|p| p.is_paid())
            .filter_map(|p| p.date)
            .max();
        summary
    }
}

#[derive(Clone)]
pub struct DirectoryService {
    client: BackendClient,
    sales: EventStore<Employee>,
}

impl DirectoryService {
    pub fn new(client: BackendClient) -> Self {
        Self {
            client,
            sales: EventStore::new("sales_employees"),
        }
    }

    pub async fn sales_employees(
        &self,
        department: Option<&str>,
        search: Option<&str>,
        refresh: bool,
    ) -> Result<Vec<Employee>> {
        let fetch = || self.client.get_list::<Employee>(endpoints::SALES_EMPLOYEES);
        let employees = if refresh {
            self.sales.refresh(fetch).await?
        } else {
            self.sales.ensure_loaded(fetch).await?
        };
        Ok(employees
            .into_iter()
            .filter(|e| department.map_or(true, |dept| e.in_department(dept)))
            .filter(|e| search.map_or(true, |needle| e.matches(needle)))
            .collect())
    }

    #[instrument(skip(self))]
    pub async fn farmer(&self, id: &str) -> Result<(Farmer, PaymentSummary)> {
        let farmer: Farmer = self
            .client
            .get(&format!("{}/{}", endpoints::FARMERS, id))
            .await?;
        let summary = PaymentSummary::from_payments(&farmer.payments);
        Ok((farmer, summary))
    }

    /// Teams the employee belongs to. The backend answers with either one team or a
    /// list of them.
    #[instrument(skip(self))]
    pub async fn teams_for_employee(&self, id: &str) -> Result<Vec<Team>> {
        let body: JsonValue = self
            .client
            .get(&format!("{}/{}", endpoints::TEAMS_BY_EMPLOYEE, id))
            .await?;
        teams_from(body)
    }
}

fn teams_from(body: JsonValue) -> Result<Vec<Team>> {
    let parsed = match body {
        JsonValue::Null => Ok(Vec::new()),
        JsonValue::Array(_) => serde_json::from_value(body),
        other => serde_json::from_value(other).map(|team| vec![team]),
    };
    parsed.map_err(|e| Error::Internal(format!("Unexpected team payload: {}", e)))
}
