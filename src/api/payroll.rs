use actix_web::{HttpResponse, web};
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::info;
use utoipa::{IntoParams, ToSchema};

use crate::{
    AppService,
    auth::auth::AuthUser,
    error::PayrollError,
    model::{
        payroll::{PayrollEntry, PayrollFilter, PayrollLineItem, PayrollStatus},
        period::Period,
    },
};

#[derive(Deserialize, ToSchema)]
pub struct GeneratePayroll {
    #[schema(example = "03")]
    pub month: String,

    #[schema(example = 2024)]
    pub year: i32,
}

#[derive(Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct PayrollQuery {
    /// Two-digit month; must be given together with `year`.
    #[schema(example = "03")]
    pub month: Option<String>,

    #[schema(example = 2024)]
    pub year: Option<i32>,

    #[schema(example = "EMP-001")]
    pub employee_id: Option<String>,
}

impl PayrollQuery {
    fn into_filter(self) -> Result<PayrollFilter, PayrollError> {
        let period = match (self.month, self.year) {
            (Some(month), Some(year)) => Some(Period::parse(&month, year)?),
            (None, None) => None,
            _ => {
                return Err(PayrollError::InvalidInput(
                    "month and year must be given together".into(),
                ));
            }
        };

        Ok(PayrollFilter {
            period,
            employee_id: self.employee_id.filter(|id| !id.is_empty()),
            status: None,
        })
    }
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct PayrollListResponse {
    pub payroll: Vec<PayrollEntry>,
}

#[derive(Deserialize, ToSchema)]
pub struct UpdatePayrollStatus {
    #[schema(example = "paid")]
    pub status: PayrollStatus,

    /// Defaults to today.
    #[schema(example = "2024-04-05", value_type = String, format = "date", nullable = true)]
    pub payment_date: Option<NaiveDate>,
}

#[utoipa::path(
    post,
    path = "/api/payroll/generate",
    request_body = GeneratePayroll,
    responses(
        (status = 201, description = "Payroll generated", body = crate::payroll::service::GenerationReport),
        (status = 400, description = "Invalid month, year or salary"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 409, description = "Every active employee already has payroll for the period")
    ),
    security(("bearer_auth" = [])),
    tag = "Payroll"
)]
pub async fn generate_payroll(
    auth: AuthUser,
    service: web::Data<AppService>,
    body: web::Json<GeneratePayroll>,
) -> Result<HttpResponse, PayrollError> {
    auth.require_payroll_manager()?;

    let report = service.generate_payroll(&body.month, body.year).await?;
    info!(
        user = %auth.username,
        period = %report.period,
        created = report.created,
        skipped = report.skipped.len(),
        "Payroll run finished"
    );

    Ok(HttpResponse::Created().json(report))
}

#[utoipa::path(
    get,
    path = "/api/payroll",
    params(PayrollQuery),
    responses(
        (status = 200, body = PayrollListResponse),
        (status = 400, description = "Invalid period filter"),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Payroll"
)]
pub async fn list_payroll(
    _auth: AuthUser,
    service: web::Data<AppService>,
    query: web::Query<PayrollQuery>,
) -> Result<HttpResponse, PayrollError> {
    let filter = query.into_inner().into_filter()?;
    let payroll = service.list_payroll_entries(&filter).await?;

    Ok(HttpResponse::Ok().json(PayrollListResponse { payroll }))
}

#[utoipa::path(
    get,
    path = "/api/payroll/{payroll_id}",
    params(
        ("payroll_id", description = "Payroll line item ID")
    ),
    responses(
        (status = 200, body = PayrollLineItem),
        (status = 404, description = "Payroll not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Payroll"
)]
pub async fn get_payroll(
    _auth: AuthUser,
    service: web::Data<AppService>,
    path: web::Path<u64>,
) -> Result<HttpResponse, PayrollError> {
    let item = service.get_payroll(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(item))
}

#[utoipa::path(
    put,
    path = "/api/payroll/{payroll_id}/status",
    request_body = UpdatePayrollStatus,
    params(
        ("payroll_id", description = "Payroll line item ID")
    ),
    responses(
        (status = 200, description = "Payroll marked paid", body = PayrollLineItem),
        (status = 400, description = "Unsupported status"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Payroll not found"),
        (status = 409, description = "Payroll already paid")
    ),
    security(("bearer_auth" = [])),
    tag = "Payroll"
)]
pub async fn update_payroll_status(
    auth: AuthUser,
    service: web::Data<AppService>,
    path: web::Path<u64>,
    body: web::Json<UpdatePayrollStatus>,
) -> Result<HttpResponse, PayrollError> {
    auth.require_payroll_manager()?;

    if body.status != PayrollStatus::Paid {
        return Err(PayrollError::InvalidInput(format!(
            "status can only be set to paid, got {}",
            body.status
        )));
    }

    let payment_date = body
        .payment_date
        .unwrap_or_else(|| Local::now().date_naive());

    let item = service.mark_paid(path.into_inner(), payment_date).await?;
    Ok(HttpResponse::Ok().json(item))
}

#[utoipa::path(
    get,
    path = "/api/payroll/summary/{month}/{year}",
    params(
        ("month", description = "Two-digit month", example = "03"),
        ("year", description = "Four-digit year", example = "2024")
    ),
    responses(
        (status = 200, body = crate::payroll::summary::PayrollSummary),
        (status = 400, description = "Invalid month or year")
    ),
    security(("bearer_auth" = [])),
    tag = "Payroll"
)]
pub async fn payroll_summary(
    _auth: AuthUser,
    service: web::Data<AppService>,
    path: web::Path<(String, String)>,
) -> Result<HttpResponse, PayrollError> {
    let (month, year) = path.into_inner();
    let period = Period::parse_parts(&month, &year)?;

    let summary = service.summarize(period).await?;
    Ok(HttpResponse::Ok().json(summary))
}

#[utoipa::path(
    get,
    path = "/api/payroll/summary",
    responses(
        (status = 200, description = "Totals over every line item", body = crate::payroll::summary::PayrollSummary)
    ),
    security(("bearer_auth" = [])),
    tag = "Payroll"
)]
pub async fn payroll_summary_all(
    _auth: AuthUser,
    service: web::Data<AppService>,
) -> Result<HttpResponse, PayrollError> {
    let summary = service.get_summary_all().await?;
    Ok(HttpResponse::Ok().json(summary))
}
