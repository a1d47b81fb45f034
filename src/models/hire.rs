use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EmploymentType {
    FullTime,
    PartTime,
    Contract,
    Intern,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PayFrequency {
    Monthly,
    BiWeekly,
    Weekly,
    Hourly,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct BasicInfo {
    #[validate(length(min = 1), custom(function = "crate::utils::validation::non_blank"))]
    #[serde(alias = "full_name")]
    pub full_name: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 7, max = 20))]
    pub phone: String,
    #[serde(default, alias = "date_of_birth", with = "crate::utils::time::opt_day")]
    pub date_of_birth: Option<NaiveDate>,
    #[serde(default)]
    pub address: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_contract_dates"))]
pub struct PositionInfo {
    #[validate(length(min = 1), custom(function = "crate::utils::validation::non_blank"))]
    pub department: String,
    #[validate(length(min = 1), custom(function = "crate::utils::validation::non_blank"))]
    pub designation: String,
    #[serde(alias = "employment_type")]
    pub employment_type: EmploymentType,
    #[serde(alias = "start_date", with = "crate::utils::time::day")]
    pub start_date: NaiveDate,
    #[serde(default, alias = "contract_end_date", with = "crate::utils::time::opt_day")]
    pub contract_end_date: Option<NaiveDate>,
    #[serde(default, alias = "reporting_manager")]
    pub reporting_manager: Option<String>,
}

fn validate_contract_dates(position: &PositionInfo) -> Result<(), ValidationError> {
    match (position.employment_type, position.contract_end_date) {
        (EmploymentType::Contract, None) => Err(ValidationError::new("contract_end_date_required")),
        (_, Some(end)) if end <= position.start_date => {
            Err(ValidationError::new("contract_end_before_start"))
        }
        _ => Ok(()),
    }
}

fn default_currency() -> String {
    "USD".to_string()
}

fn positive_amount(value: &Decimal) -> Result<(), ValidationError> {
    if value.is_sign_positive() && !value.is_zero() {
        Ok(())
    } else {
        Err(ValidationError::new("must_be_positive"))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Compensation {
    #[validate(custom(function = "positive_amount"))]
    pub salary: Decimal,
    #[serde(default = "default_currency")]
    #[validate(length(equal = 3))]
    pub currency: String,
    #[serde(alias = "pay_frequency")]
    pub pay_frequency: PayFrequency,
    #[serde(default, alias = "bank_account")]
    pub bank_account: Option<String>,
}

/// Flat onboarding record posted to the backend once all steps pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HirePayload {
    #[serde(flatten)]
    pub basic: BasicInfo,
    #[serde(flatten)]
    pub position: PositionInfo,
    #[serde(flatten)]
    pub compensation: Compensation,
}
