use serde::{Deserialize, Serialize};

use crate::models::employee::Employee;
use crate::models::farmer::Farmer;
use crate::models::team::Team;
use crate::services::directory_service::PaymentSummary;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EmployeeListQuery {
    pub department: Option<String>,
    pub search: Option<String>,
    #[serde(default)]
    pub refresh: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct EmployeeResponse {
    pub id: String,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub department: Option<String>,
    pub designation: Option<String>,
    pub emp_code: Option<String>,
}

impl From<Employee> for EmployeeResponse {
    fn from(employee: Employee) -> Self {
        Self {
            id: employee.id,
            name: employee.name,
            email: employee.email,
            phone: employee.phone,
            department: employee.department.or(employee.role),
            designation: employee.designation,
            emp_code: employee.emp_code,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct EmployeeListResponse {
    pub total: usize,
    pub items: Vec<EmployeeResponse>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PaymentResponse {
    pub id: String,
    pub amount: rust_decimal::Decimal,
    #[serde(with = "crate::utils::time::opt_day")]
    pub date: Option<chrono::NaiveDate>,
    pub status: Option<String>,
    pub method: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FarmerResponse {
    pub id: String,
    pub name: String,
    pub phone: Option<String>,
    pub village: Option<String>,
    pub crop: Option<String>,
    pub payments: Vec<PaymentResponse>,
    pub summary: PaymentSummary,
}

impl From<(Farmer, PaymentSummary)> for FarmerResponse {
    fn from((farmer, summary): (Farmer, PaymentSummary)) -> Self {
        Self {
            id: farmer.id,
            name: farmer.name,
            phone: farmer.phone,
            village: farmer.village,
            crop: farmer.crop,
            payments: farmer
                .payments
                .into_iter()
                .map(|p| PaymentResponse {
                    id: p.id,
                    amount: p.amount,
                    date: p.date,
                    status: p.status,
                    method: p.method,
                })
                .collect(),
            summary,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TeamResponse {
    pub id: String,
    pub name: String,
    pub leader: Option<EmployeeResponse>,
    pub members: Vec<EmployeeResponse>,
}

impl From<Team> for TeamResponse {
    fn from(team: Team) -> Self {
        Self {
            id: team.id,
            name: team.name,
            leader: team.leader.map(Into::into),
            members: team.members.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TeamListResponse {
    pub items: Vec<TeamResponse>,
}
