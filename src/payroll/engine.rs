use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

use crate::model::{attendance::Attendance, payroll::NewPayrollItem, period::Period};

/// Monthly baseline: 8 hours x 20 working days.
pub const STANDARD_HOURS: f64 = 160.0;
pub const OVERTIME_MULTIPLIER: f64 = 1.5;
pub const ALLOWANCE_RATE: f64 = 0.20;
pub const DEDUCTION_RATE: f64 = 0.10;

/// Where overtime comes from.
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
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum OvertimeMode {
    /// Hours logged beyond the standard month are paid at the overtime rate.
    #[default]
    Attendance,
    /// Attendance is never read and overtime is always zero.
    Disabled,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PayPolicy {
    pub standard_hours: f64,
    pub overtime_multiplier: f64,
    pub allowance_rate: f64,
    pub deduction_rate: f64,
    pub overtime: OvertimeMode,
}

impl Default for PayPolicy {
    fn default() -> Self {
        Self {
            standard_hours: STANDARD_HOURS,
            overtime_multiplier: OVERTIME_MULTIPLIER,
            allowance_rate: ALLOWANCE_RATE,
            deduction_rate: DEDUCTION_RATE,
            overtime: OvertimeMode::default(),
        }
    }
}

impl PayPolicy {
    pub fn with_overtime(overtime: OvertimeMode) -> Self {
        Self {
            overtime,
            ..Self::default()
        }
    }

    pub fn reads_attendance(&self) -> bool {
        self.overtime == OvertimeMode::Attendance
    }

    pub fn overtime_hours(&self, total_hours: f64) -> f64 {
        match self.overtime {
            OvertimeMode::Attendance => (finite_or_zero(total_hours) - self.standard_hours).max(0.0),
            OvertimeMode::Disabled => 0.0,
        }
    }

    pub fn hourly_rate(&self, basic_salary: f64) -> f64 {
        if self.standard_hours > 0.0 {
            basic_salary / self.standard_hours
        } else {
            0.0
        }
    }

    /// Builds the pending line item for one employee and period.
    pub fn compute(
        &self,
        employee_id: &str,
        basic_salary: f64,
        total_hours: f64,
        period: Period,
    ) -> NewPayrollItem {
        let basic_salary = finite_or_zero(basic_salary);

        let overtime_hours = self.overtime_hours(total_hours);
        let overtime_pay = if overtime_hours > 0.0 {
            overtime_hours * self.hourly_rate(basic_salary) * self.overtime_multiplier
        } else {
            0.0
        };
        let allowances = basic_salary * self.allowance_rate;
        let deductions = basic_salary * self.deduction_rate;
        let net_salary = basic_salary + allowances - deductions + overtime_pay;

        NewPayrollItem {
            employee_id: employee_id.to_string(),
            period,
            basic_salary,
            allowances,
            deductions,
            overtime_hours,
            overtime_pay,
            net_salary,
        }
    }
}

/// Hours logged across the given records.
pub fn total_hours(records: &[Attendance]) -> f64 {
    records
        .iter()
        .map(|r| finite_or_zero(r.hours_worked).max(0.0))
        .sum()
}

pub(crate) fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() { value } else { 0.0 }
}
