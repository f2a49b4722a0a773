use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{model::payroll::PayrollLineItem, payroll::engine::finite_or_zero};

/// Totals over a set of line items. Never stored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[schema(
    example = json!({
        "total_employees": 2,
        "total_basic": 5000.0,
        "total_allowances": 1000.0,
        "total_deductions": 500.0,
        "total_overtime": 562.5,
        "total_payout": 6062.5
    })
)]
pub struct PayrollSummary {
    pub total_employees: usize,
    pub total_basic: f64,
    pub total_allowances: f64,
    pub total_deductions: f64,
    pub total_overtime: f64,
    pub total_payout: f64,
}

impl PayrollSummary {
    pub fn from_items<'a, I>(items: I) -> Self
    where
        I: IntoIterator<Item = &'a PayrollLineItem>,
    {
        items.into_iter().fold(Self::default(), |mut acc, item| {
            acc.add(item);
            acc
        })
    }

    fn add(&mut self, item: &PayrollLineItem) {
        self.total_employees += 1;
        self.total_basic += finite_or_zero(item.basic_salary);
        self.total_allowances += finite_or_zero(item.allowances);
        self.total_deductions += finite_or_zero(item.deductions);
        self.total_overtime += finite_or_zero(item.overtime_pay);
        self.total_payout += finite_or_zero(item.net_salary);
    }
}
