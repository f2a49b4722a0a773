#![allow(dead_code)]

use std::{net::SocketAddr, time::Duration};

use actix_web::{test::TestRequest, web::Data};
use chrono::{NaiveDate, NaiveTime};
use serde_json::json;

use payroll_admin::{
    AppService,
    auth::{password::hash_password, session::SessionStore},
    config::Config,
    model::{
        attendance::{AttendanceStatus, NewAttendance},
        employee::{Employee, EmployeeStatus},
        role::Role,
        user::User,
    },
    payroll::{engine::PayPolicy, service::PayrollService},
    routes::RateLimits,
    store::{Backend, MemoryStore, RecordStore},
};

pub const API: &str = "/api";
pub const ADMIN_PASSWORD: &str = "admin-pass";

/// Builds the full app the way `main` does, over the given test context.
macro_rules! init_app {
    ($ctx:expr) => {
        actix_web::test::init_service(
            actix_web::App::new()
                .app_data($ctx.service.clone())
                .app_data($ctx.sessions.clone())
                .configure(|cfg| {
                    payroll_admin::routes::configure(cfg, common::API, &$ctx.limits)
                }),
        )
        .await
    };
}

pub struct TestContext {
    pub store: MemoryStore,
    pub service: Data<AppService>,
    pub sessions: Data<SessionStore>,
    pub limits: RateLimits,
}

fn user(id: u64, username: &str, role: Role, password_hash: String) -> User {
    User {
        id,
        username: username.to_string(),
        password_hash,
        full_name: format!("Test {username}"),
        role,
    }
}

impl TestContext {
    pub fn new() -> Self {
        Self::with_policy(PayPolicy::default())
    }

    pub fn with_policy(policy: PayPolicy) -> Self {
        let hashed = hash_password(ADMIN_PASSWORD).unwrap();
        let store = MemoryStore::new()
            .with_user(user(1, "admin", Role::Admin, hashed))
            .with_user(user(2, "hr", Role::Hr, String::new()))
            .with_user(user(3, "staff", Role::Employee, String::new()));

        let service = Data::new(PayrollService::new(
            Backend::Memory(store.clone()),
            policy,
        ));

        Self {
            store,
            service,
            sessions: Data::new(SessionStore::new(Duration::from_secs(600))),
            limits: RateLimits::from_config(&test_config()).unwrap(),
        }
    }

    /// Opens a session directly, skipping the login endpoint.
    pub async fn token_for(&self, username: &str) -> String {
        let user = self.store.find_user(username).await.unwrap().unwrap();
        self.sessions.create(&user).await
    }

    pub async fn add_employee(&self, id: &str, salary: f64, status: EmployeeStatus) {
        self.store
            .insert_employee(&employee(id, salary, status))
            .await
            .unwrap();
    }

    /// Logs `days` shifts of `hours` each in March 2024.
    pub async fn log_march_shifts(&self, id: &str, days: u32, hours: u32) {
        for day in 1..=days {
            self.store
                .insert_attendance(&NewAttendance {
                    employee_id: id.to_string(),
                    date: NaiveDate::from_ymd_opt(2024, 3, day).unwrap(),
                    check_in: NaiveTime::from_hms_opt(8, 0, 0),
                    check_out: NaiveTime::from_hms_opt(8 + hours, 0, 0),
                    status: AttendanceStatus::Present,
                })
                .await
                .unwrap();
        }
    }
}

pub fn test_config() -> Config {
    Config {
        server_addr: "127.0.0.1:0".to_string(),
        store_backend: payroll_admin::config::StoreBackend::Memory,
        database_url: None,
        session_ttl: 600,
        overtime_mode: Default::default(),
        rate_login_per_min: 10_000,
        rate_protected_per_min: 10_000,
        api_prefix: API.to_string(),
        log_level: "debug".to_string(),
        admin_username: "admin".to_string(),
        admin_password: Some(ADMIN_PASSWORD.to_string()),
    }
}

pub fn employee(id: &str, salary: f64, status: EmployeeStatus) -> Employee {
    Employee {
        employee_id: id.to_string(),
        first_name: "Test".to_string(),
        last_name: id.to_string(),
        email: format!("{}@company.com", id.to_lowercase()),
        phone: None,
        department: "Engineering".to_string(),
        position: "Developer".to_string(),
        join_date: NaiveDate::from_ymd_opt(2023, 1, 1),
        salary,
        status,
    }
}

fn peer() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 40_000))
}

// The rate limiter keys on the peer address, so every request needs one.
pub fn get(uri: &str) -> TestRequest {
    TestRequest::get().uri(uri).peer_addr(peer())
}

pub fn post(uri: &str) -> TestRequest {
    TestRequest::post().uri(uri).peer_addr(peer())
}

pub fn put(uri: &str) -> TestRequest {
    TestRequest::put().uri(uri).peer_addr(peer())
}

pub fn bearer(token: &str) -> (&'static str, String) {
    ("Authorization", format!("Bearer {token}"))
}

pub fn march_2024() -> serde_json::Value {
    json!({ "month": "03", "year": 2024 })
}
