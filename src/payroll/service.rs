use std::{
    collections::{HashMap, HashSet},
    sync::{Arc, Mutex, PoisonError},
};

use chrono::NaiveDate;
use futures::future::try_join_all;
use serde::Serialize;
use tokio::sync::Mutex as AsyncMutex;
use tracing::{debug, info, instrument, warn};
use utoipa::ToSchema;

use crate::{
    error::{PayrollError, StoreError},
    model::{
        employee::{Employee, EmployeeFilter},
        payroll::{NewPayrollItem, PayrollEntry, PayrollFilter, PayrollLineItem, PayrollStatus},
        period::Period,
    },
    payroll::{
        engine::{PayPolicy, total_hours},
        summary::PayrollSummary,
    },
    store::RecordStore,
};

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[schema(example = json!({ "period": { "month": "03", "year": 2024 }, "created": 2, "ids": [1, 2], "skipped": [] }))]
pub struct GenerationReport {
    #[schema(value_type = Object)]
    pub period: Period,
    pub created: usize,
    pub ids: Vec<u64>,
    /// Active employees that already had a line item for the period.
    pub skipped: Vec<String>,
}

/// Payroll operations over a record store.
pub struct PayrollService<S> {
    store: S,
    policy: PayPolicy,
    period_locks: Mutex<HashMap<Period, Arc<AsyncMutex<()>>>>,
}

impl<S: RecordStore> PayrollService<S> {
    pub fn new(store: S, policy: PayPolicy) -> Self {
        Self {
            store,
            policy,
            period_locks: Mutex::new(HashMap::new()),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn policy(&self) -> &PayPolicy {
        &self.policy
    }

    fn period_lock(&self, period: Period) -> Arc<AsyncMutex<()>> {
        let mut locks = self
            .period_locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        locks.entry(period).or_default().clone()
    }

    /// Drops the map entry once no other run holds or waits on it.
    fn release_period_lock(&self, period: Period, lock: Arc<AsyncMutex<()>>) {
        let mut locks = self
            .period_locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        drop(lock);
        if locks
            .get(&period)
            .is_some_and(|entry| Arc::strong_count(entry) == 1)
        {
            locks.remove(&period);
        }
    }

    /// Creates one pending line item per active employee for the period.
    ///
    /// Employees that already have a line item for the period are skipped
    /// and listed in the report. The run is rejected when every active
    /// employee is already covered, or when one has a negative salary.
    #[instrument(name = "payroll_generate", skip(self))]
    pub async fn generate_payroll(
        &self,
        month: &str,
        year: i32,
    ) -> Result<GenerationReport, PayrollError> {
        let period = Period::parse(month, year)?;

        let lock = self.period_lock(period);
        let result = {
            let _guard = lock.lock().await;
            self.generate_locked(period).await
        };
        self.release_period_lock(period, lock);

        result
    }

    async fn generate_locked(&self, period: Period) -> Result<GenerationReport, PayrollError> {
        let employees = self.store.list_employees(&EmployeeFilter::active()).await?;
        debug!(count = employees.len(), "Loaded active employees");

        if let Some(employee) = employees.iter().find(|e| e.salary < 0.0) {
            return Err(PayrollError::InvalidInput(format!(
                "employee {} has a negative salary",
                employee.employee_id
            )));
        }

        let existing = self
            .store
            .list_payroll(&PayrollFilter::for_period(period))
            .await?;
        let generated: HashSet<&str> = existing.iter().map(|i| i.employee_id.as_str()).collect();
        let (skipped, pending): (Vec<Employee>, Vec<Employee>) = employees
            .into_iter()
            .partition(|e| generated.contains(e.employee_id.as_str()));
        let skipped: Vec<String> = skipped.into_iter().map(|e| e.employee_id).collect();

        if pending.is_empty() && !skipped.is_empty() {
            warn!(%period, employees = ?skipped, "Payroll already generated");
            return Err(PayrollError::ConflictAlreadyGenerated {
                period,
                employee_ids: skipped,
            });
        }

        if !skipped.is_empty() {
            info!(%period, employees = ?skipped, "Skipping employees already paid for the period");
        }

        let hours = self.collect_hours(&pending, period).await?;

        let items: Vec<NewPayrollItem> = pending
            .iter()
            .zip(hours)
            .map(|(employee, hours)| {
                self.policy
                    .compute(&employee.employee_id, employee.salary, hours, period)
            })
            .collect();

        let ids = self
            .store
            .insert_payroll_batch(&items)
            .await
            .map_err(|e| match e {
                StoreError::Duplicate(what) => {
                    warn!(%period, duplicate = %what, "Concurrent payroll insert detected");
                    PayrollError::ConflictAlreadyGenerated {
                        period,
                        employee_ids: items.iter().map(|i| i.employee_id.clone()).collect(),
                    }
                }
                other => other.into(),
            })?;

        info!(%period, created = ids.len(), "Payroll generated");

        Ok(GenerationReport {
            period,
            created: ids.len(),
            ids,
            skipped,
        })
    }

    /// Total attendance hours per employee, in the same order as `employees`.
    async fn collect_hours(
        &self,
        employees: &[Employee],
        period: Period,
    ) -> Result<Vec<f64>, StoreError> {
        if !self.policy.reads_attendance() {
            return Ok(vec![0.0; employees.len()]);
        }

        let lookups = employees.iter().map(|employee| async move {
            let records = self
                .store
                .list_attendance(&employee.employee_id, period)
                .await?;
            Ok::<_, StoreError>(total_hours(&records))
        });

        try_join_all(lookups).await
    }

    pub async fn get_summary(&self, month: &str, year: i32) -> Result<PayrollSummary, PayrollError> {
        self.summarize(Period::parse(month, year)?).await
    }

    pub async fn summarize(&self, period: Period) -> Result<PayrollSummary, PayrollError> {
        let items = self
            .store
            .list_payroll(&PayrollFilter::for_period(period))
            .await?;

        Ok(PayrollSummary::from_items(
            items.iter().filter(|item| item.in_period(period)),
        ))
    }

    /// Summary over every stored line item.
    pub async fn get_summary_all(&self) -> Result<PayrollSummary, PayrollError> {
        let items = self.store.list_payroll(&PayrollFilter::default()).await?;
        Ok(PayrollSummary::from_items(&items))
    }

    /// Moves a pending line item to paid.
    #[instrument(name = "payroll_mark_paid", skip(self))]
    pub async fn mark_paid(
        &self,
        id: u64,
        payment_date: NaiveDate,
    ) -> Result<PayrollLineItem, PayrollError> {
        let item = self.get_payroll(id).await?;

        if !item.status.can_transition_to(PayrollStatus::Paid) {
            return Err(PayrollError::AlreadyPaid(id));
        }

        let updated = self
            .store
            .update_payroll_status(id, PayrollStatus::Paid, Some(payment_date))
            .await?;

        if !updated {
            // lost a race with another update or delete
            return match self.store.get_payroll(id).await? {
                Some(_) => Err(PayrollError::AlreadyPaid(id)),
                None => Err(not_found(id)),
            };
        }

        info!(id, %payment_date, "Payroll marked paid");

        Ok(PayrollLineItem {
            status: PayrollStatus::Paid,
            payment_date: Some(payment_date),
            ..item
        })
    }

    pub async fn get_payroll(&self, id: u64) -> Result<PayrollLineItem, PayrollError> {
        self.store
            .get_payroll(id)
            .await?
            .ok_or_else(|| not_found(id))
    }

    pub async fn list_payroll(
        &self,
        filter: &PayrollFilter,
    ) -> Result<Vec<PayrollLineItem>, PayrollError> {
        Ok(self.store.list_payroll(filter).await?)
    }

    /// Line items with the paid employee's name and department.
    pub async fn list_payroll_entries(
        &self,
        filter: &PayrollFilter,
    ) -> Result<Vec<PayrollEntry>, PayrollError> {
        Ok(self.store.list_payroll_entries(filter).await?)
    }
}

fn not_found(id: u64) -> PayrollError {
    PayrollError::NotFound(format!("payroll {id}"))
}
