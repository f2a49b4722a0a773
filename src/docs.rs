use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi, openapi};

use crate::api::attendance::{AttendanceListResponse, RecordAttendance};
use crate::api::employee::{
    DashboardStats, DepartmentCount, EmployeeListResponse, EmployeeQuery, EmployeeResponse,
};
use crate::api::payroll::{
    GeneratePayroll, PayrollListResponse, PayrollQuery, UpdatePayrollStatus,
};
use crate::auth::handlers::{LoginRequest, LoginResponse, SessionUser, VerifyResponse};
use crate::model::attendance::{Attendance, AttendanceStatus};
use crate::model::employee::{Employee, EmployeeStatus};
use crate::model::payroll::{PayrollEntry, PayrollLineItem, PayrollStatus};
use crate::payroll::{service::GenerationReport, summary::PayrollSummary};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Payroll Administration API",
        version = "1.0.0",
        description = r#"
## Payroll Administration

Employee records, daily attendance and monthly payroll.

### Payroll rules
- Allowances are 20% and deductions 10% of the basic salary
- Hours above 160 in a month are paid at 1.5x the hourly rate
- Each employee gets at most one line item per month; a rerun only pays
  employees added since, and is rejected with `409` when nobody is left
- Line items move from `pending` to `paid` and never back

### Security
Endpoints under `/api` need a session token from `POST /auth/login`,
sent as `Authorization: Bearer <token>`. Generating payroll, settling
line items and creating or updating employees need the **admin** or
**hr** role.
"#,
    ),
    paths(
        crate::auth::handlers::login,
        crate::auth::handlers::logout,
        crate::auth::handlers::verify,

        crate::api::payroll::generate_payroll,
        crate::api::payroll::list_payroll,
        crate::api::payroll::get_payroll,
        crate::api::payroll::update_payroll_status,
        crate::api::payroll::payroll_summary,
        crate::api::payroll::payroll_summary_all,

        crate::api::employee::create_employee,
        crate::api::employee::list_employees,
        crate::api::employee::get_employee,
        crate::api::employee::update_employee,
        crate::api::employee::dashboard_stats,

        crate::api::attendance::record_attendance,
        crate::api::attendance::list_attendance
    ),
    components(
        schemas(
            LoginRequest,
            LoginResponse,
            VerifyResponse,
            SessionUser,
            GeneratePayroll,
            GenerationReport,
            PayrollQuery,
            PayrollListResponse,
            PayrollLineItem,
            PayrollEntry,
            PayrollStatus,
            PayrollSummary,
            UpdatePayrollStatus,
            Employee,
            EmployeeStatus,
            EmployeeQuery,
            EmployeeListResponse,
            EmployeeResponse,
            DashboardStats,
            DepartmentCount,
            Attendance,
            AttendanceStatus,
            RecordAttendance,
            AttendanceListResponse
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Auth", description = "Session login and logout"),
        (name = "Payroll", description = "Payroll generation, settlement and summaries"),
        (name = "Employee", description = "Employee records"),
        (name = "Attendance", description = "Daily attendance"),
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(HttpBuilder::new().scheme(HttpAuthScheme::Bearer).build()),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn documents_every_route_group() {
        let doc = ApiDoc::openapi();
        let paths: Vec<&str> = doc.paths.paths.keys().map(String::as_str).collect();

        for expected in [
            "/auth/login",
            "/api/payroll/generate",
            "/api/payroll/{payroll_id}/status",
            "/api/payroll/summary/{month}/{year}",
            "/api/employees/{employee_id}",
            "/api/employees/stats/dashboard",
            "/api/attendance",
        ] {
            assert!(paths.contains(&expected), "missing {expected}");
        }

        let components = doc.components.unwrap();
        assert!(components.security_schemes.contains_key("bearer_auth"));
    }
}
