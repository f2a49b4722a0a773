use std::collections::BTreeMap;

use actix_web::{HttpResponse, web};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, info};
use utoipa::{IntoParams, ToSchema};

use crate::{
    AppService,
    auth::auth::AuthUser,
    error::PayrollError,
    model::employee::{Employee, EmployeeFilter, EmployeeStatus},
    store::RecordStore,
};

const RECENT_EMPLOYEES: usize = 5;

#[derive(Debug, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct EmployeeQuery {
    #[schema(example = "active")]
    pub status: Option<EmployeeStatus>,
    #[schema(example = "Engineering")]
    pub department: Option<String>,
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct EmployeeListResponse {
    pub employees: Vec<Employee>,
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct EmployeeResponse {
    pub employee: Employee,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct DepartmentCount {
    #[schema(example = "Engineering")]
    pub department: String,
    #[schema(example = 4)]
    pub count: usize,
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct DashboardStats {
    /// Active employees.
    #[schema(example = 12)]
    pub total: usize,
    pub departments: Vec<DepartmentCount>,
    /// Most recently added employees, newest first.
    pub recent: Vec<Employee>,
}

impl DashboardStats {
    pub fn from_employees(employees: Vec<Employee>) -> Self {
        let mut per_department: BTreeMap<&str, usize> = BTreeMap::new();
        for employee in employees.iter().filter(|e| e.is_active()) {
            *per_department.entry(employee.department.as_str()).or_default() += 1;
        }

        let total = per_department.values().sum();
        let departments = per_department
            .into_iter()
            .map(|(department, count)| DepartmentCount {
                department: department.to_string(),
                count,
            })
            .collect();

        let recent = employees.iter().rev().take(RECENT_EMPLOYEES).cloned().collect();

        Self {
            total,
            departments,
            recent,
        }
    }
}

#[utoipa::path(
    post,
    path = "/api/employees",
    request_body = Employee,
    responses(
        (status = 201, description = "Employee created", body = EmployeeResponse),
        (status = 400, description = "Invalid employee"),
        (status = 403, description = "Forbidden"),
        (status = 409, description = "Employee ID already exists")
    ),
    security(("bearer_auth" = [])),
    tag = "Employee"
)]
pub async fn create_employee(
    auth: AuthUser,
    service: web::Data<AppService>,
    body: web::Json<Employee>,
) -> Result<HttpResponse, PayrollError> {
    auth.require_payroll_manager()?;

    let employee = body.into_inner();
    employee.validate()?;

    service.store().insert_employee(&employee).await?;
    info!(employee_id = %employee.employee_id, "Employee created");

    Ok(HttpResponse::Created().json(json!({
        "message": "Employee created successfully",
        "employee": employee
    })))
}

#[utoipa::path(
    get,
    path = "/api/employees",
    params(EmployeeQuery),
    responses((status = 200, body = EmployeeListResponse)),
    security(("bearer_auth" = [])),
    tag = "Employee"
)]
pub async fn list_employees(
    _auth: AuthUser,
    service: web::Data<AppService>,
    query: web::Query<EmployeeQuery>,
) -> Result<HttpResponse, PayrollError> {
    debug!(?query, "Listing employees");

    let EmployeeQuery { status, department } = query.into_inner();
    let filter = EmployeeFilter { status, department };
    let employees = service.store().list_employees(&filter).await?;

    Ok(HttpResponse::Ok().json(EmployeeListResponse { employees }))
}

#[utoipa::path(
    get,
    path = "/api/employees/{employee_id}",
    params(
        ("employee_id", description = "Employee ID", example = "EMP-001")
    ),
    responses(
        (status = 200, body = EmployeeResponse),
        (status = 404, description = "Employee not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Employee"
)]
pub async fn get_employee(
    _auth: AuthUser,
    service: web::Data<AppService>,
    path: web::Path<String>,
) -> Result<HttpResponse, PayrollError> {
    let employee_id = path.into_inner();

    let employee = service
        .store()
        .get_employee(&employee_id)
        .await?
        .ok_or_else(|| PayrollError::NotFound(format!("employee {employee_id}")))?;

    Ok(HttpResponse::Ok().json(EmployeeResponse { employee }))
}

/// Replaces an employee record. Deactivating an employee is an update with
/// `status: inactive`; records are never deleted.
#[utoipa::path(
    put,
    path = "/api/employees/{employee_id}",
    request_body = Employee,
    params(
        ("employee_id", description = "Employee ID", example = "EMP-001")
    ),
    responses(
        (status = 200, description = "Employee updated", body = EmployeeResponse),
        (status = 400, description = "Invalid employee or mismatched ID"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Employee not found"),
        (status = 409, description = "Email already in use")
    ),
    security(("bearer_auth" = [])),
    tag = "Employee"
)]
pub async fn update_employee(
    auth: AuthUser,
    service: web::Data<AppService>,
    path: web::Path<String>,
    body: web::Json<Employee>,
) -> Result<HttpResponse, PayrollError> {
    auth.require_payroll_manager()?;

    let employee_id = path.into_inner();
    let employee = body.into_inner();
    if employee.employee_id != employee_id {
        return Err(PayrollError::InvalidInput(format!(
            "employee_id {} does not match path {employee_id}",
            employee.employee_id
        )));
    }
    employee.validate()?;

    if !service.store().update_employee(&employee).await? {
        return Err(PayrollError::NotFound(format!("employee {employee_id}")));
    }
    info!(
        user = %auth.username,
        employee_id = %employee_id,
        status = %employee.status,
        "Employee updated"
    );

    Ok(HttpResponse::Ok().json(json!({
        "message": "Employee updated successfully",
        "employee": employee
    })))
}

#[utoipa::path(
    get,
    path = "/api/employees/stats/dashboard",
    responses((status = 200, body = DashboardStats)),
    security(("bearer_auth" = [])),
    tag = "Employee"
)]
pub async fn dashboard_stats(
    _auth: AuthUser,
    service: web::Data<AppService>,
) -> Result<HttpResponse, PayrollError> {
    let employees = service
        .store()
        .list_employees(&EmployeeFilter::default())
        .await?;

    Ok(HttpResponse::Ok().json(DashboardStats::from_employees(employees)))
}
