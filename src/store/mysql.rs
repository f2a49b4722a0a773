use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use sqlx::{FromRow, MySqlPool};
use tracing::{debug, error};

use crate::{
    error::StoreError,
    model::{
        attendance::{Attendance, AttendanceStatus, NewAttendance},
        employee::{Employee, EmployeeFilter, EmployeeStatus},
        payroll::{NewPayrollItem, PayrollEntry, PayrollFilter, PayrollLineItem, PayrollStatus},
        period::Period,
        role::Role,
        user::User,
    },
    store::RecordStore,
};

const DUPLICATE_KEY: &str = "23000";

#[derive(Clone)]
pub struct MySqlStore {
    pool: MySqlPool,
}

impl MySqlStore {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[derive(FromRow)]
struct EmployeeRow {
    employee_id: String,
    first_name: String,
    last_name: String,
    email: String,
    phone: Option<String>,
    department: Option<String>,
    position: Option<String>,
    join_date: Option<NaiveDate>,
    salary: Option<f64>,
    status: String,
}

impl TryFrom<EmployeeRow> for Employee {
    type Error = StoreError;

    fn try_from(row: EmployeeRow) -> Result<Self, Self::Error> {
        let status = row.status.parse::<EmployeeStatus>().map_err(|_| {
            StoreError::Corrupt(format!(
                "employee {} has unknown status {:?}",
                row.employee_id, row.status
            ))
        })?;

        Ok(Employee {
            employee_id: row.employee_id,
            first_name: row.first_name,
            last_name: row.last_name,
            email: row.email,
            phone: row.phone,
            department: row.department.unwrap_or_default(),
            position: row.position.unwrap_or_default(),
            join_date: row.join_date,
            salary: row.salary.unwrap_or(0.0),
            status,
        })
    }
}

#[derive(FromRow)]
struct AttendanceRow {
    id: u64,
    employee_id: String,
    date: NaiveDate,
    check_in: Option<NaiveTime>,
    check_out: Option<NaiveTime>,
    hours_worked: Option<f64>,
    status: Option<String>,
}

impl From<AttendanceRow> for Attendance {
    fn from(row: AttendanceRow) -> Self {
        Attendance {
            id: row.id,
            employee_id: row.employee_id,
            date: row.date,
            check_in: row.check_in,
            check_out: row.check_out,
            hours_worked: row.hours_worked.unwrap_or(0.0),
            status: row
                .status
                .and_then(|s| s.parse::<AttendanceStatus>().ok())
                .unwrap_or_default(),
        }
    }
}

#[derive(FromRow)]
struct PayrollRow {
    id: u64,
    employee_id: String,
    month: String,
    year: i32,
    basic_salary: Option<f64>,
    allowances: Option<f64>,
    deductions: Option<f64>,
    overtime_hours: Option<f64>,
    overtime_pay: Option<f64>,
    net_salary: Option<f64>,
    status: String,
    payment_date: Option<NaiveDate>,
    created_at: DateTime<Utc>,
}

impl TryFrom<PayrollRow> for PayrollLineItem {
    type Error = StoreError;

    fn try_from(row: PayrollRow) -> Result<Self, Self::Error> {
        let status = row.status.parse::<PayrollStatus>().map_err(|_| {
            StoreError::Corrupt(format!(
                "payroll {} has unknown status {:?}",
                row.id, row.status
            ))
        })?;

        Ok(PayrollLineItem {
            id: row.id,
            employee_id: row.employee_id,
            month: row.month,
            year: row.year,
            basic_salary: row.basic_salary.unwrap_or(0.0),
            allowances: row.allowances.unwrap_or(0.0),
            deductions: row.deductions.unwrap_or(0.0),
            overtime_hours: row.overtime_hours.unwrap_or(0.0),
            overtime_pay: row.overtime_pay.unwrap_or(0.0),
            net_salary: row.net_salary.unwrap_or(0.0),
            status,
            payment_date: row.payment_date,
            created_at: row.created_at,
        })
    }
}

#[derive(FromRow)]
struct PayrollEntryRow {
    #[sqlx(flatten)]
    payroll: PayrollRow,
    first_name: Option<String>,
    last_name: Option<String>,
    department: Option<String>,
}

impl TryFrom<PayrollEntryRow> for PayrollEntry {
    type Error = StoreError;

    fn try_from(row: PayrollEntryRow) -> Result<Self, Self::Error> {
        Ok(PayrollEntry {
            item: PayrollLineItem::try_from(row.payroll)?,
            first_name: row.first_name,
            last_name: row.last_name,
            department: row.department,
        })
    }
}

#[derive(FromRow)]
struct UserRow {
    id: u64,
    username: String,
    password_hash: String,
    full_name: Option<String>,
    role: String,
}

impl TryFrom<UserRow> for User {
    type Error = StoreError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let role = row.role.parse::<Role>().map_err(|_| {
            StoreError::Corrupt(format!("user {} has unknown role {:?}", row.id, row.role))
        })?;

        Ok(User {
            id: row.id,
            username: row.username,
            password_hash: row.password_hash,
            full_name: row.full_name.unwrap_or_default(),
            role,
        })
    }
}

// Helper enum for typed SQLx binding
enum FilterValue {
    I32(i32),
    Str(String),
}

/// WHERE clause for a payroll filter. `table` qualifies the columns when the
/// query joins other tables.
fn payroll_where(filter: &PayrollFilter, table: &str) -> (String, Vec<FilterValue>) {
    let mut where_sql = String::from(" WHERE 1=1");
    let mut args: Vec<FilterValue> = Vec::new();

    if let Some(period) = filter.period {
        where_sql.push_str(&format!(" AND {table}month = ? AND {table}year = ?"));
        args.push(FilterValue::Str(period.month_str()));
        args.push(FilterValue::I32(period.year()));
    }

    if let Some(employee_id) = filter.employee_id.as_deref() {
        where_sql.push_str(&format!(" AND {table}employee_id = ?"));
        args.push(FilterValue::Str(employee_id.to_string()));
    }

    if let Some(status) = filter.status {
        where_sql.push_str(&format!(" AND {table}status = ?"));
        args.push(FilterValue::Str(status.to_string()));
    }

    (where_sql, args)
}

fn map_insert_error(e: sqlx::Error, what: impl FnOnce() -> String) -> StoreError {
    if let sqlx::Error::Database(db_err) = &e {
        if db_err.code().as_deref() == Some(DUPLICATE_KEY) {
            return StoreError::Duplicate(what());
        }
    }
    error!(error = %e, "Insert failed");
    StoreError::Database(e)
}

fn period_bounds(period: Period) -> Result<(NaiveDate, NaiveDate), StoreError> {
    match (period.first_day(), period.last_day()) {
        (Some(first), Some(last)) => Ok((first, last)),
        _ => Err(StoreError::Corrupt(format!("period {period} out of range"))),
    }
}

const EMPLOYEE_COLUMNS: &str = "employee_id, first_name, last_name, email, phone, department, position, join_date, salary, status";
const ATTENDANCE_COLUMNS: &str =
    "id, employee_id, date, check_in, check_out, hours_worked, status";
const PAYROLL_COLUMNS: &str = "id, employee_id, month, year, basic_salary, allowances, deductions, overtime_hours, overtime_pay, net_salary, status, payment_date, created_at";

const PAYROLL_ENTRY_SELECT: &str = r#"
    SELECT p.id, p.employee_id, p.month, p.year, p.basic_salary, p.allowances,
           p.deductions, p.overtime_hours, p.overtime_pay, p.net_salary, p.status,
           p.payment_date, p.created_at,
           e.first_name, e.last_name, e.department
    FROM payroll p
    LEFT JOIN employees e ON e.employee_id = p.employee_id
"#;

const INSERT_PAYROLL: &str = r#"
    INSERT INTO payroll
    (employee_id, month, year, basic_salary, allowances, deductions,
     overtime_hours, overtime_pay, net_salary, status)
    VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, 'pending')
"#;

fn insert_payroll_query(
    item: &NewPayrollItem,
) -> sqlx::query::Query<'_, sqlx::MySql, sqlx::mysql::MySqlArguments> {
    sqlx::query(INSERT_PAYROLL)
        .bind(&item.employee_id)
        .bind(item.period.month_str())
        .bind(item.period.year())
        .bind(item.basic_salary)
        .bind(item.allowances)
        .bind(item.deductions)
        .bind(item.overtime_hours)
        .bind(item.overtime_pay)
        .bind(item.net_salary)
}

fn duplicate_payroll(item: &NewPayrollItem) -> String {
    format!(
        "payroll for employee {} in {}",
        item.employee_id, item.period
    )
}

impl RecordStore for MySqlStore {
    async fn list_employees(&self, filter: &EmployeeFilter) -> Result<Vec<Employee>, StoreError> {
        let mut where_sql = String::from(" WHERE 1=1");
        let mut args: Vec<FilterValue> = Vec::new();

        if let Some(status) = filter.status {
            where_sql.push_str(" AND status = ?");
            args.push(FilterValue::Str(status.to_string()));
        }

        if let Some(department) = filter.department.as_deref() {
            where_sql.push_str(" AND department = ?");
            args.push(FilterValue::Str(department.to_string()));
        }

        let sql = format!("SELECT {EMPLOYEE_COLUMNS} FROM employees{where_sql} ORDER BY id");
        debug!(sql = %sql, "Fetching employees");

        let mut query = sqlx::query_as::<_, EmployeeRow>(&sql);
        for arg in args {
            query = match arg {
                FilterValue::I32(v) => query.bind(v),
                FilterValue::Str(s) => query.bind(s),
            };
        }

        query
            .fetch_all(&self.pool)
            .await?
            .into_iter()
            .map(Employee::try_from)
            .collect()
    }

    async fn get_employee(&self, employee_id: &str) -> Result<Option<Employee>, StoreError> {
        let sql = format!("SELECT {EMPLOYEE_COLUMNS} FROM employees WHERE employee_id = ?");

        sqlx::query_as::<_, EmployeeRow>(&sql)
            .bind(employee_id)
            .fetch_optional(&self.pool)
            .await?
            .map(Employee::try_from)
            .transpose()
    }

    async fn insert_employee(&self, employee: &Employee) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO employees
            (employee_id, first_name, last_name, email, phone, department, position, join_date, salary, status)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&employee.employee_id)
        .bind(&employee.first_name)
        .bind(&employee.last_name)
        .bind(&employee.email)
        .bind(&employee.phone)
        .bind(&employee.department)
        .bind(&employee.position)
        .bind(employee.join_date)
        .bind(employee.salary)
        .bind(employee.status.as_ref())
        .execute(&self.pool)
        .await
        .map_err(|e| map_insert_error(e, || format!("employee {}", employee.employee_id)))?;

        Ok(())
    }

    async fn update_employee(&self, employee: &Employee) -> Result<bool, StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE employees
            SET first_name = ?, last_name = ?, email = ?, phone = ?, department = ?,
                position = ?, join_date = ?, salary = ?, status = ?
            WHERE employee_id = ?
            "#,
        )
        .bind(&employee.first_name)
        .bind(&employee.last_name)
        .bind(&employee.email)
        .bind(&employee.phone)
        .bind(&employee.department)
        .bind(&employee.position)
        .bind(employee.join_date)
        .bind(employee.salary)
        .bind(employee.status.as_ref())
        .bind(&employee.employee_id)
        .execute(&self.pool)
        .await
        .map_err(|e| map_insert_error(e, || format!("email {}", employee.email)))?;

        if result.rows_affected() > 0 {
            return Ok(true);
        }

        // MySQL reports zero affected rows when nothing changed
        Ok(self.get_employee(&employee.employee_id).await?.is_some())
    }

    async fn list_attendance(
        &self,
        employee_id: &str,
        period: Period,
    ) -> Result<Vec<Attendance>, StoreError> {
        let (first, last) = period_bounds(period)?;
        let sql = format!(
            "SELECT {ATTENDANCE_COLUMNS} FROM attendance WHERE employee_id = ? AND date BETWEEN ? AND ? ORDER BY date"
        );

        let rows = sqlx::query_as::<_, AttendanceRow>(&sql)
            .bind(employee_id)
            .bind(first)
            .bind(last)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(Attendance::from).collect())
    }

    async fn list_all_attendance(&self) -> Result<Vec<Attendance>, StoreError> {
        let sql = format!("SELECT {ATTENDANCE_COLUMNS} FROM attendance ORDER BY date DESC, id DESC");

        let rows = sqlx::query_as::<_, AttendanceRow>(&sql)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(Attendance::from).collect())
    }

    async fn insert_attendance(&self, record: &NewAttendance) -> Result<Attendance, StoreError> {
        let result = sqlx::query(
            r#"
            INSERT INTO attendance (employee_id, date, check_in, check_out, hours_worked, status)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&record.employee_id)
        .bind(record.date)
        .bind(record.check_in)
        .bind(record.check_out)
        .bind(record.hours_worked())
        .bind(record.status.as_ref())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            map_insert_error(e, || {
                format!("attendance for {} on {}", record.employee_id, record.date)
            })
        })?;

        Ok(record.clone().into_record(result.last_insert_id()))
    }

    async fn insert_payroll(&self, item: &NewPayrollItem) -> Result<u64, StoreError> {
        let result = insert_payroll_query(item)
            .execute(&self.pool)
            .await
            .map_err(|e| map_insert_error(e, || duplicate_payroll(item)))?;

        Ok(result.last_insert_id())
    }

    async fn insert_payroll_batch(&self, items: &[NewPayrollItem]) -> Result<Vec<u64>, StoreError> {
        let mut tx = self.pool.begin().await?;
        let mut ids = Vec::with_capacity(items.len());

        for item in items {
            // dropping tx on error rolls the batch back
            let result = insert_payroll_query(item)
                .execute(&mut *tx)
                .await
                .map_err(|e| map_insert_error(e, || duplicate_payroll(item)))?;
            ids.push(result.last_insert_id());
        }

        tx.commit().await?;
        Ok(ids)
    }

    async fn get_payroll(&self, id: u64) -> Result<Option<PayrollLineItem>, StoreError> {
        let sql = format!("SELECT {PAYROLL_COLUMNS} FROM payroll WHERE id = ?");

        sqlx::query_as::<_, PayrollRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(PayrollLineItem::try_from)
            .transpose()
    }

    async fn list_payroll(
        &self,
        filter: &PayrollFilter,
    ) -> Result<Vec<PayrollLineItem>, StoreError> {
        let (where_sql, args) = payroll_where(filter, "");
        let sql = format!("SELECT {PAYROLL_COLUMNS} FROM payroll{where_sql} ORDER BY id");
        debug!(sql = %sql, "Fetching payroll");

        let mut query = sqlx::query_as::<_, PayrollRow>(&sql);
        for arg in args {
            query = match arg {
                FilterValue::I32(v) => query.bind(v),
                FilterValue::Str(s) => query.bind(s),
            };
        }

        query
            .fetch_all(&self.pool)
            .await?
            .into_iter()
            .map(PayrollLineItem::try_from)
            .collect()
    }

    async fn list_payroll_entries(
        &self,
        filter: &PayrollFilter,
    ) -> Result<Vec<PayrollEntry>, StoreError> {
        let (where_sql, args) = payroll_where(filter, "p.");
        let sql = format!("{PAYROLL_ENTRY_SELECT}{where_sql} ORDER BY p.id");
        debug!(sql = %sql, "Fetching payroll with employees");

        let mut query = sqlx::query_as::<_, PayrollEntryRow>(&sql);
        for arg in args {
            query = match arg {
                FilterValue::I32(v) => query.bind(v),
                FilterValue::Str(s) => query.bind(s),
            };
        }

        query
            .fetch_all(&self.pool)
            .await?
            .into_iter()
            .map(PayrollEntry::try_from)
            .collect()
    }

    async fn update_payroll_status(
        &self,
        id: u64,
        status: PayrollStatus,
        payment_date: Option<NaiveDate>,
    ) -> Result<bool, StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE payroll
            SET status = ?, payment_date = ?
            WHERE id = ?
            AND status <> ?
            "#,
        )
        .bind(status.as_ref())
        .bind(payment_date)
        .bind(id)
        .bind(status.as_ref())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn find_user(&self, username: &str) -> Result<Option<User>, StoreError> {
        sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, username, password_hash, full_name, role
            FROM users
            WHERE username = ?
            "#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?
        .map(User::try_from)
        .transpose()
    }
}
