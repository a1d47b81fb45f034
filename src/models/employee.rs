use serde::{Deserialize, Serialize};

use crate::services::event_store::Record;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
    #[serde(alias = "_id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub department: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub designation: Option<String>,
    #[serde(default, alias = "employeeCode", alias = "emp_code")]
    pub emp_code: Option<String>,
}

impl Employee {
    /// Case-insensitive match against name, email and employee code.
    pub fn matches(&self, needle: &str) -> bool {
        let needle = needle.trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }
        [Some(&self.name), self.email.as_ref(), self.emp_code.as_ref()]
            .into_iter()
            .flatten()
            .any(|field| field.to_lowercase().contains(&needle))
    }

    pub fn in_department(&self, department: &str) -> bool {
        [self.department.as_deref(), self.role.as_deref()]
            .into_iter()
            .flatten()
            .any(|value| value.eq_ignore_ascii_case(department.trim()))
    }
}

impl Record for Employee {
    fn record_id(&self) -> &str {
        &self.id
    }
}
