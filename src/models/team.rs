use serde::{Deserialize, Serialize};

use crate::models::employee::Employee;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Team {
    #[serde(alias = "_id")]
    pub id: String,
    #[serde(alias = "teamName")]
    pub name: String,
    #[serde(default, alias = "teamLeader")]
    pub leader: Option<Employee>,
    #[serde(default)]
    pub members: Vec<Employee>,
}
