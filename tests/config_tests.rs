use pretty_assertions::assert_eq;

use payroll_admin::{
    config::{Config, StoreBackend},
    payroll::engine::OvertimeMode,
};

const KEYS: &[&str] = &[
    "SERVER_ADDR",
    "STORE_BACKEND",
    "DATABASE_URL",
    "SESSION_TTL",
    "OVERTIME_MODE",
    "RATE_LOGIN_PER_MIN",
    "RATE_PROTECTED_PER_MIN",
    "API_PREFIX",
    "LOG_LEVEL",
    "ADMIN_USERNAME",
    "ADMIN_PASSWORD",
];

fn clear_env() {
    for key in KEYS {
        // SAFETY: the only test in this binary touching the environment
        unsafe { std::env::remove_var(key) };
    }
}

fn set(key: &str, value: &str) {
    // SAFETY: see clear_env
    unsafe { std::env::set_var(key, value) };
}

// One test so the environment is never mutated concurrently.
#[test]
fn reads_environment_with_defaults_and_validation() {
    clear_env();

    // mysql is the default backend and needs a database url
    assert!(Config::from_env_only().is_err());

    set("STORE_BACKEND", "memory");
    let config = Config::from_env_only().unwrap();
    assert_eq!(config.store_backend, StoreBackend::Memory);
    assert_eq!(config.server_addr, "127.0.0.1:3000");
    assert_eq!(config.session_ttl, 28_800);
    assert_eq!(config.overtime_mode, OvertimeMode::Attendance);
    assert_eq!(config.rate_login_per_min, 60);
    assert_eq!(config.rate_protected_per_min, 1000);
    assert_eq!(config.api_prefix, "/api");
    assert_eq!(config.admin_username, "admin");
    assert_eq!(config.admin_password, None);

    set("OVERTIME_MODE", "disabled");
    set("SESSION_TTL", "60");
    set("ADMIN_PASSWORD", "s3cret");
    let config = Config::from_env_only().unwrap();
    assert_eq!(config.overtime_mode, OvertimeMode::Disabled);
    assert_eq!(config.session_ttl, 60);
    assert_eq!(config.admin_password.as_deref(), Some("s3cret"));

    set("OVERTIME_MODE", "always");
    assert!(Config::from_env_only().is_err());
    set("OVERTIME_MODE", "attendance");

    set("API_PREFIX", "api");
    assert!(Config::from_env_only().is_err());
    set("API_PREFIX", "/api");

    set("STORE_BACKEND", "mysql");
    set("DATABASE_URL", "mysql://root@localhost/payroll");
    let config = Config::from_env_only().unwrap();
    assert_eq!(config.store_backend, StoreBackend::MySql);
    assert_eq!(
        config.database_url.as_deref(),
        Some("mysql://root@localhost/payroll")
    );

    clear_env();
}
