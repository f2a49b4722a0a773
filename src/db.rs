use anyhow::{Context, Result};
use sqlx::MySqlPool;
use tracing::info;

const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS employees (
        id BIGINT UNSIGNED AUTO_INCREMENT PRIMARY KEY,
        employee_id VARCHAR(64) NOT NULL UNIQUE,
        first_name VARCHAR(100) NOT NULL,
        last_name VARCHAR(100) NOT NULL,
        email VARCHAR(255) NOT NULL UNIQUE,
        phone VARCHAR(32),
        department VARCHAR(100),
        position VARCHAR(100),
        join_date DATE,
        salary DOUBLE NOT NULL DEFAULT 0,
        status VARCHAR(16) NOT NULL DEFAULT 'active',
        created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS attendance (
        id BIGINT UNSIGNED AUTO_INCREMENT PRIMARY KEY,
        employee_id VARCHAR(64) NOT NULL,
        date DATE NOT NULL,
        check_in TIME,
        check_out TIME,
        hours_worked DOUBLE NOT NULL DEFAULT 0,
        status VARCHAR(16),
        created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
        INDEX idx_attendance_employee_date (employee_id, date)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS payroll (
        id BIGINT UNSIGNED AUTO_INCREMENT PRIMARY KEY,
        employee_id VARCHAR(64) NOT NULL,
        month CHAR(2) NOT NULL,
        year INT NOT NULL,
        basic_salary DOUBLE,
        allowances DOUBLE DEFAULT 0,
        deductions DOUBLE DEFAULT 0,
        overtime_hours DOUBLE DEFAULT 0,
        overtime_pay DOUBLE DEFAULT 0,
        net_salary DOUBLE,
        payment_date DATE,
        status VARCHAR(16) NOT NULL DEFAULT 'pending',
        created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
        UNIQUE KEY uq_payroll_period (employee_id, month, year)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS users (
        id BIGINT UNSIGNED AUTO_INCREMENT PRIMARY KEY,
        username VARCHAR(64) NOT NULL UNIQUE,
        password_hash VARCHAR(255) NOT NULL,
        full_name VARCHAR(255),
        role VARCHAR(16) NOT NULL DEFAULT 'employee',
        created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
    )
    "#,
];

pub async fn init_db(database_url: &str) -> Result<MySqlPool> {
    let pool = MySqlPool::connect(database_url)
        .await
        .context("Failed to connect to database")?;

    for statement in SCHEMA {
        sqlx::query(statement)
            .execute(&pool)
            .await
            .context("Failed to bootstrap schema")?;
    }
    info!(tables = SCHEMA.len(), "Database schema ready");

    Ok(pool)
}
