use serde::{Deserialize, Serialize};

use crate::services::event_store::Record;

/// A department as it appears inside events, meetings and the department picker.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DepartmentRef {
    #[serde(alias = "_id", alias = "id", alias = "dept_id")]
    pub dept_id: String,
    pub name: String,
}

impl DepartmentRef {
    pub fn new(dept_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            dept_id: dept_id.into(),
            name: name.into(),
        }
    }
}

impl Record for DepartmentRef {
    fn record_id(&self) -> &str {
        &self.dept_id
    }
}
