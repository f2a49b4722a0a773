use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};
use utoipa::ToSchema;

use crate::error::PayrollError;

#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
    ToSchema,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum EmployeeStatus {
    #[default]
    Active,
    Inactive,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[schema(
    example = json!({
        "employee_id": "EMP-001",
        "first_name": "John",
        "last_name": "Doe",
        "email": "john.doe@company.com",
        "phone": "+8801712345678",
        "department": "Engineering",
        "position": "Developer",
        "join_date": "2024-01-01",
        "salary": 3000.0,
        "status": "active"
    })
)]
pub struct Employee {
    #[schema(example = "EMP-001")]
    pub employee_id: String,

    #[schema(example = "John")]
    pub first_name: String,

    #[schema(example = "Doe")]
    pub last_name: String,

    #[schema(example = "john.doe@company.com")]
    pub email: String,

    #[schema(example = "+8801712345678", nullable = true)]
    pub phone: Option<String>,

    #[schema(example = "Engineering")]
    pub department: String,

    #[schema(example = "Developer")]
    pub position: String,

    #[schema(example = "2024-01-01", value_type = String, format = "date", nullable = true)]
    pub join_date: Option<NaiveDate>,

    /// Monthly basic salary.
    #[schema(example = 3000.0)]
    pub salary: f64,

    #[schema(example = "active")]
    pub status: EmployeeStatus,
}

impl Employee {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }

    pub fn is_active(&self) -> bool {
        self.status == EmployeeStatus::Active
    }

    pub fn validate(&self) -> Result<(), PayrollError> {
        if self.employee_id.trim().is_empty() {
            return Err(PayrollError::InvalidInput(
                "employee_id must not be empty".to_string(),
            ));
        }
        if !self.salary.is_finite() || self.salary < 0.0 {
            return Err(PayrollError::InvalidInput(format!(
                "salary must be a non-negative amount, got {}",
                self.salary
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct EmployeeFilter {
    pub status: Option<EmployeeStatus>,
    pub department: Option<String>,
}

impl EmployeeFilter {
    pub fn active() -> Self {
        Self {
            status: Some(EmployeeStatus::Active),
            ..Default::default()
        }
    }

    pub fn matches(&self, employee: &Employee) -> bool {
        self.status.is_none_or(|s| employee.status == s)
            && self
                .department
                .as_deref()
                .is_none_or(|d| employee.department == d)
    }
}
