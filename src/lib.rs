pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod docs;
pub mod error;
pub mod model;
pub mod payroll;
pub mod routes;
pub mod store;

/// The payroll service as wired into the HTTP layer.
pub type AppService = payroll::service::PayrollService<store::Backend>;
