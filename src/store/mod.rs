//! Persistence seam between the payroll engine and its backends.

use chrono::NaiveDate;

use crate::{
    error::StoreError,
    model::{
        attendance::{Attendance, NewAttendance},
        employee::{Employee, EmployeeFilter},
        payroll::{NewPayrollItem, PayrollEntry, PayrollFilter, PayrollLineItem, PayrollStatus},
        period::Period,
        user::User,
    },
};

pub mod memory;
pub mod mysql;

pub use memory::MemoryStore;
pub use mysql::MySqlStore;

/// Record storage for employees, attendance, payroll line items and users.
///
/// Implementations must reject a second payroll line item for the same
/// `(employee_id, month, year)` with [`StoreError::Duplicate`].
#[allow(async_fn_in_trait)]
pub trait RecordStore {
    async fn list_employees(&self, filter: &EmployeeFilter) -> Result<Vec<Employee>, StoreError>;

    async fn get_employee(&self, employee_id: &str) -> Result<Option<Employee>, StoreError>;

    async fn insert_employee(&self, employee: &Employee) -> Result<(), StoreError>;

    /// Replaces the record with the same `employee_id`. Returns false when
    /// there is no such employee.
    async fn update_employee(&self, employee: &Employee) -> Result<bool, StoreError>;

    /// Attendance of one employee whose date falls inside `period`.
    async fn list_attendance(
        &self,
        employee_id: &str,
        period: Period,
    ) -> Result<Vec<Attendance>, StoreError>;

    async fn list_all_attendance(&self) -> Result<Vec<Attendance>, StoreError>;

    async fn insert_attendance(&self, record: &NewAttendance) -> Result<Attendance, StoreError>;

    async fn insert_payroll(&self, item: &NewPayrollItem) -> Result<u64, StoreError>;

    /// Inserts all items or none of them.
    async fn insert_payroll_batch(&self, items: &[NewPayrollItem]) -> Result<Vec<u64>, StoreError>;

    async fn get_payroll(&self, id: u64) -> Result<Option<PayrollLineItem>, StoreError>;

    async fn list_payroll(&self, filter: &PayrollFilter)
    -> Result<Vec<PayrollLineItem>, StoreError>;

    /// Same rows as [`RecordStore::list_payroll`], joined with their employee.
    async fn list_payroll_entries(
        &self,
        filter: &PayrollFilter,
    ) -> Result<Vec<PayrollEntry>, StoreError>;

    /// Returns false when the id does not exist or is already in `status`.
    async fn update_payroll_status(
        &self,
        id: u64,
        status: PayrollStatus,
        payment_date: Option<NaiveDate>,
    ) -> Result<bool, StoreError>;

    async fn find_user(&self, username: &str) -> Result<Option<User>, StoreError>;
}

/// The backend selected at startup.
#[derive(Clone)]
pub enum Backend {
    MySql(MySqlStore),
    Memory(MemoryStore),
}

macro_rules! dispatch {
    ($self:ident, $store:ident => $call:expr) => {
        match $self {
            Backend::MySql($store) => $call,
            Backend::Memory($store) => $call,
        }
    };
}

impl RecordStore for Backend {
    async fn list_employees(&self, filter: &EmployeeFilter) -> Result<Vec<Employee>, StoreError> {
        dispatch!(self, s => s.list_employees(filter).await)
    }

    async fn get_employee(&self, employee_id: &str) -> Result<Option<Employee>, StoreError> {
        dispatch!(self, s => s.get_employee(employee_id).await)
    }

    async fn insert_employee(&self, employee: &Employee) -> Result<(), StoreError> {
        dispatch!(self, s => s.insert_employee(employee).await)
    }

    async fn update_employee(&self, employee: &Employee) -> Result<bool, StoreError> {
        dispatch!(self, s => s.update_employee(employee).await)
    }

    async fn list_attendance(
        &self,
        employee_id: &str,
        period: Period,
    ) -> Result<Vec<Attendance>, StoreError> {
        dispatch!(self, s => s.list_attendance(employee_id, period).await)
    }

    async fn list_all_attendance(&self) -> Result<Vec<Attendance>, StoreError> {
        dispatch!(self, s => s.list_all_attendance().await)
    }

    async fn insert_attendance(&self, record: &NewAttendance) -> Result<Attendance, StoreError> {
        dispatch!(self, s => s.insert_attendance(record).await)
    }

    async fn insert_payroll(&self, item: &NewPayrollItem) -> Result<u64, StoreError> {
        dispatch!(self, s => s.insert_payroll(item).await)
    }

    async fn insert_payroll_batch(&self, items: &[NewPayrollItem]) -> Result<Vec<u64>, StoreError> {
        dispatch!(self, s => s.insert_payroll_batch(items).await)
    }

    async fn get_payroll(&self, id: u64) -> Result<Option<PayrollLineItem>, StoreError> {
        dispatch!(self, s => s.get_payroll(id).await)
    }

    async fn list_payroll(
        &self,
        filter: &PayrollFilter,
    ) -> Result<Vec<PayrollLineItem>, StoreError> {
        dispatch!(self, s => s.list_payroll(filter).await)
    }

    async fn list_payroll_entries(
        &self,
        filter: &PayrollFilter,
    ) -> Result<Vec<PayrollEntry>, StoreError> {
        dispatch!(self, s => s.list_payroll_entries(filter).await)
    }

    async fn update_payroll_status(
        &self,
        id: u64,
        status: PayrollStatus,
        payment_date: Option<NaiveDate>,
    ) -> Result<bool, StoreError> {
        dispatch!(self, s => s.update_payroll_status(id, status, payment_date).await)
    }

    async fn find_user(&self, username: &str) -> Result<Option<User>, StoreError> {
        dispatch!(self, s => s.find_user(username).await)
    }
}
