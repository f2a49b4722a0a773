use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};
use utoipa::ToSchema;

use crate::{
    error::PayrollError,
    model::{employee::Employee, period::Period},
};

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
pub enum PayrollStatus {
    #[default]
    Pending,
    Paid,
}

impl PayrollStatus {
    /// The only transition is pending -> paid.
    pub fn can_transition_to(self, next: PayrollStatus) -> bool {
        matches!((self, next), (PayrollStatus::Pending, PayrollStatus::Paid))
    }
}

/// One employee's pay for one month. Amounts are a snapshot taken at
/// generation time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[schema(
    example = json!({
        "id": 1,
        "employee_id": "E1",
        "month": "03",
        "year": 2024,
        "basic_salary": 3000.0,
        "allowances": 600.0,
        "deductions": 300.0,
        "overtime_hours": 20.0,
        "overtime_pay": 562.5,
        "net_salary": 3862.5,
        "status": "pending",
        "payment_date": null,
        "created_at": "2024-04-01T00:00:00Z"
    })
)]
pub struct PayrollLineItem {
    pub id: u64,
    pub employee_id: String,
    #[schema(example = "03")]
    pub month: String,
    #[schema(example = 2024)]
    pub year: i32,
    pub basic_salary: f64,
    pub allowances: f64,
    pub deductions: f64,
    pub overtime_hours: f64,
    pub overtime_pay: f64,
    pub net_salary: f64,
    pub status: PayrollStatus,
    #[schema(value_type = String, format = "date", nullable = true)]
    pub payment_date: Option<NaiveDate>,
    #[schema(value_type = String, format = "date-time")]
    pub created_at: DateTime<Utc>,
}

impl PayrollLineItem {
    pub fn period(&self) -> Result<Period, PayrollError> {
        Period::parse(&self.month, self.year)
    }

    pub fn in_period(&self, period: Period) -> bool {
        self.year == period.year() && self.month == period.month_str()
    }
}

/// A line item joined with the employee it pays. The name fields are
/// empty when the employee record no longer exists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PayrollEntry {
    #[serde(flatten)]
    pub item: PayrollLineItem,
    #[schema(example = "Jane")]
    pub first_name: Option<String>,
    #[schema(example = "Doe")]
    pub last_name: Option<String>,
    #[schema(example = "Engineering")]
    pub department: Option<String>,
}

impl PayrollEntry {
    pub fn new(item: PayrollLineItem, employee: Option<&Employee>) -> Self {
        Self {
            item,
            first_name: employee.map(|e| e.first_name.clone()),
            last_name: employee.map(|e| e.last_name.clone()),
            department: employee.map(|e| e.department.clone()),
        }
    }
}

/// A computed line item that has not been stored yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewPayrollItem {
    pub employee_id: String,
    pub period: Period,
    pub basic_salary: f64,
    pub allowances: f64,
    pub deductions: f64,
    pub overtime_hours: f64,
    pub overtime_pay: f64,
    pub net_salary: f64,
}

impl NewPayrollItem {
    pub fn into_line_item(self, id: u64, created_at: DateTime<Utc>) -> PayrollLineItem {
        PayrollLineItem {
            id,
            month: self.period.month_str(),
            year: self.period.year(),
            employee_id: self.employee_id,
            basic_salary: self.basic_salary,
            allowances: self.allowances,
            deductions: self.deductions,
            overtime_hours: self.overtime_hours,
            overtime_pay: self.overtime_pay,
            net_salary: self.net_salary,
            status: PayrollStatus::Pending,
            payment_date: None,
            created_at,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PayrollFilter {
    pub period: Option<Period>,
    pub employee_id: Option<String>,
    pub status: Option<PayrollStatus>,
}

impl PayrollFilter {
    pub fn for_period(period: Period) -> Self {
        Self {
            period: Some(period),
            ..Default::default()
        }
    }

    pub fn matches(&self, item: &PayrollLineItem) -> bool {
        self.period.is_none_or(|p| item.in_period(p))
            && self
                .employee_id
                .as_deref()
                .is_none_or(|id| item.employee_id == id)
            && self.status.is_none_or(|s| item.status == s)
    }
}
