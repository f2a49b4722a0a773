use std::{
    collections::HashSet,
    sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard},
};

use chrono::{NaiveDate, Utc};

use crate::{
    error::StoreError,
    model::{
        attendance::{Attendance, NewAttendance},
        employee::{Employee, EmployeeFilter},
        payroll::{NewPayrollItem, PayrollEntry, PayrollFilter, PayrollLineItem, PayrollStatus},
        period::Period,
        user::User,
    },
    store::RecordStore,
};

#[derive(Default)]
struct Tables {
    employees: Vec<Employee>,
    attendance: Vec<Attendance>,
    payroll: Vec<PayrollLineItem>,
    users: Vec<User>,
    next_attendance_id: u64,
    next_payroll_id: u64,
}

impl Tables {
    fn has_payroll(&self, employee_id: &str, period: Period) -> bool {
        self.payroll
            .iter()
            .any(|p| p.employee_id == employee_id && p.in_period(period))
    }

    fn push_payroll(&mut self, item: &NewPayrollItem) -> u64 {
        self.next_payroll_id += 1;
        let id = self.next_payroll_id;
        self.payroll
            .push(item.clone().into_line_item(id, Utc::now()));
        id
    }
}

/// Process-local store. Cloning shares the same tables.
#[derive(Clone, Default)]
pub struct MemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_user(self, user: User) -> Self {
        self.write().users.push(user);
        self
    }

    fn read(&self) -> RwLockReadGuard<'_, Tables> {
        self.tables.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Tables> {
        self.tables.write().unwrap_or_else(PoisonError::into_inner)
    }
}

fn duplicate_payroll(item: &NewPayrollItem) -> StoreError {
    StoreError::Duplicate(format!(
        "payroll for employee {} in {}",
        item.employee_id, item.period
    ))
}

impl RecordStore for MemoryStore {
    async fn list_employees(&self, filter: &EmployeeFilter) -> Result<Vec<Employee>, StoreError> {
        Ok(self
            .read()
            .employees
            .iter()
            .filter(|e| filter.matches(e))
            .cloned()
            .collect())
    }

    async fn get_employee(&self, employee_id: &str) -> Result<Option<Employee>, StoreError> {
        Ok(self
            .read()
            .employees
            .iter()
            .find(|e| e.employee_id == employee_id)
            .cloned())
    }

    async fn insert_employee(&self, employee: &Employee) -> Result<(), StoreError> {
        let mut tables = self.write();
        if tables
            .employees
            .iter()
            .any(|e| e.employee_id == employee.employee_id)
        {
            return Err(StoreError::Duplicate(format!(
                "employee {}",
                employee.employee_id
            )));
        }
        tables.employees.push(employee.clone());
        Ok(())
    }

    async fn update_employee(&self, employee: &Employee) -> Result<bool, StoreError> {
        let mut tables = self.write();
        match tables
            .employees
            .iter_mut()
            .find(|e| e.employee_id == employee.employee_id)
        {
            Some(stored) => {
                *stored = employee.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn list_attendance(
        &self,
        employee_id: &str,
        period: Period,
    ) -> Result<Vec<Attendance>, StoreError> {
        Ok(self
            .read()
            .attendance
            .iter()
            .filter(|a| a.employee_id == employee_id && period.contains(a.date))
            .cloned()
            .collect())
    }

    /// Newest first.
    async fn list_all_attendance(&self) -> Result<Vec<Attendance>, StoreError> {
        let mut records = self.read().attendance.clone();
        records.sort_by(|a, b| b.date.cmp(&a.date).then(b.id.cmp(&a.id)));
        Ok(records)
    }

    async fn insert_attendance(&self, record: &NewAttendance) -> Result<Attendance, StoreError> {
        let mut tables = self.write();
        tables.next_attendance_id += 1;
        let stored = record.clone().into_record(tables.next_attendance_id);
        tables.attendance.push(stored.clone());
        Ok(stored)
    }

    async fn insert_payroll(&self, item: &NewPayrollItem) -> Result<u64, StoreError> {
        let mut tables = self.write();
        if tables.has_payroll(&item.employee_id, item.period) {
            return Err(duplicate_payroll(item));
        }
        Ok(tables.push_payroll(item))
    }

    async fn insert_payroll_batch(&self, items: &[NewPayrollItem]) -> Result<Vec<u64>, StoreError> {
        let mut tables = self.write();

        let mut seen = HashSet::new();
        for item in items {
            if tables.has_payroll(&item.employee_id, item.period)
                || !seen.insert((item.employee_id.as_str(), item.period))
            {
                return Err(duplicate_payroll(item));
            }
        }

        Ok(items.iter().map(|item| tables.push_payroll(item)).collect())
    }

    async fn get_payroll(&self, id: u64) -> Result<Option<PayrollLineItem>, StoreError> {
        Ok(self.read().payroll.iter().find(|p| p.id == id).cloned())
    }

    async fn list_payroll(
        &self,
        filter: &PayrollFilter,
    ) -> Result<Vec<PayrollLineItem>, StoreError> {
        Ok(self
            .read()
            .payroll
            .iter()
            .filter(|p| filter.matches(p))
            .cloned()
            .collect())
    }

    async fn list_payroll_entries(
        &self,
        filter: &PayrollFilter,
    ) -> Result<Vec<PayrollEntry>, StoreError> {
        let tables = self.read();
        Ok(tables
            .payroll
            .iter()
            .filter(|p| filter.matches(p))
            .map(|p| {
                let employee = tables.employees.iter().find(|e| e.employee_id == p.employee_id);
                PayrollEntry::new(p.clone(), employee)
            })
            .collect())
    }

    async fn update_payroll_status(
        &self,
        id: u64,
        status: PayrollStatus,
        payment_date: Option<NaiveDate>,
    ) -> Result<bool, StoreError> {
        let mut tables = self.write();
        match tables
            .payroll
            .iter_mut()
            .find(|p| p.id == id && p.status != status)
        {
            Some(item) => {
                item.status = status;
                item.payment_date = payment_date;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn find_user(&self, username: &str) -> Result<Option<User>, StoreError> {
        Ok(self
            .read()
            .users
            .iter()
            .find(|u| u.username.eq_ignore_ascii_case(username))
            .cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{model::employee::EmployeeStatus, payroll::engine::PayPolicy};

    fn item(employee_id: &str, month: &str) -> NewPayrollItem {
        PayPolicy::default().compute(employee_id, 1000.0, 0.0, Period::parse(month, 2024).unwrap())
    }

    #[actix_web::test]
    async fn rejects_duplicate_period_for_same_employee() {
        let store = MemoryStore::new();

        assert_eq!(store.insert_payroll(&item("E1", "03")).await.unwrap(), 1);
        assert!(matches!(
            store.insert_payroll(&item("E1", "03")).await,
            Err(StoreError::Duplicate(_))
        ));
        assert_eq!(store.insert_payroll(&item("E1", "04")).await.unwrap(), 2);
        assert_eq!(store.insert_payroll(&item("E2", "03")).await.unwrap(), 3);
    }

    #[actix_web::test]
    async fn batch_insert_is_all_or_nothing() {
        let store = MemoryStore::new();
        store.insert_payroll(&item("E2", "03")).await.unwrap();

        let batch = [item("E1", "03"), item("E2", "03")];
        assert!(store.insert_payroll_batch(&batch).await.is_err());

        let all = store.list_payroll(&PayrollFilter::default()).await.unwrap();
        assert_eq!(all.len(), 1);

        let ids = store
            .insert_payroll_batch(&[item("E1", "05"), item("E2", "05")])
            .await
            .unwrap();
        assert_eq!(ids, vec![2, 3]);
    }

    fn employee(id: &str) -> Employee {
        Employee {
            employee_id: id.to_string(),
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            email: format!("{id}@example.com"),
            phone: None,
            department: "Research".to_string(),
            position: "Analyst".to_string(),
            join_date: None,
            salary: 1000.0,
            status: EmployeeStatus::Active,
        }
    }

    #[actix_web::test]
    async fn update_replaces_existing_employee_only() {
        let store = MemoryStore::new();
        store.insert_employee(&employee("E1")).await.unwrap();

        let mut changed = employee("E1");
        changed.status = EmployeeStatus::Inactive;
        changed.salary = 1500.0;
        assert!(store.update_employee(&changed).await.unwrap());
        assert_eq!(store.get_employee("E1").await.unwrap(), Some(changed));

        assert!(!store.update_employee(&employee("E9")).await.unwrap());
        assert_eq!(store.get_employee("E9").await.unwrap(), None);
    }

    #[actix_web::test]
    async fn payroll_entries_carry_employee_names() {
        let store = MemoryStore::new();
        store.insert_employee(&employee("E1")).await.unwrap();
        store.insert_payroll(&item("E1", "03")).await.unwrap();
        store.insert_payroll(&item("GONE", "03")).await.unwrap();

        let entries = store
            .list_payroll_entries(&PayrollFilter::default())
            .await
            .unwrap();

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].item.employee_id, "E1");
        assert_eq!(entries[0].first_name.as_deref(), Some("Ada"));
        assert_eq!(entries[0].last_name.as_deref(), Some("Lovelace"));
        assert_eq!(entries[0].department.as_deref(), Some("Research"));
        assert_eq!(entries[1].first_name, None);
    }

    #[actix_web::test]
    async fn status_update_skips_unknown_and_unchanged_rows() {
        let store = MemoryStore::new();
        let id = store.insert_payroll(&item("E1", "03")).await.unwrap();
        let date = NaiveDate::from_ymd_opt(2024, 4, 1);

        assert!(!store.update_payroll_status(99, PayrollStatus::Paid, date).await.unwrap());
        assert!(store.update_payroll_status(id, PayrollStatus::Paid, date).await.unwrap());
        assert!(!store.update_payroll_status(id, PayrollStatus::Paid, date).await.unwrap());

        let stored = store.get_payroll(id).await.unwrap().unwrap();
        assert_eq!(stored.status, PayrollStatus::Paid);
        assert_eq!(stored.payment_date, date);
    }
}
