use actix_web::{HttpResponse, web};
use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;
use utoipa::ToSchema;

use crate::{
    AppService,
    auth::auth::AuthUser,
    error::PayrollError,
    model::attendance::{Attendance, AttendanceStatus, NewAttendance},
    store::RecordStore,
};

#[derive(Deserialize, ToSchema)]
pub struct RecordAttendance {
    #[schema(example = "EMP-001")]
    pub employee_id: String,

    #[schema(example = "2024-03-01", value_type = String, format = "date")]
    pub date: NaiveDate,

    #[schema(example = "09:00:00", value_type = String, nullable = true)]
    pub check_in: Option<NaiveTime>,

    #[schema(example = "17:30:00", value_type = String, nullable = true)]
    pub check_out: Option<NaiveTime>,

    #[serde(default)]
    pub status: AttendanceStatus,
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct AttendanceListResponse {
    pub attendance: Vec<Attendance>,
}

/// Records one day of attendance; `hours_worked` is derived from the times.
#[utoipa::path(
    post,
    path = "/api/attendance",
    request_body = RecordAttendance,
    responses(
        (status = 201, description = "Attendance marked", body = Object, example = json!({
            "message": "Attendance marked successfully"
        })),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Unknown employee")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn record_attendance(
    auth: AuthUser,
    service: web::Data<AppService>,
    body: web::Json<RecordAttendance>,
) -> Result<HttpResponse, PayrollError> {
    let body = body.into_inner();

    if service.store().get_employee(&body.employee_id).await?.is_none() {
        return Err(PayrollError::NotFound(format!(
            "employee {}",
            body.employee_id
        )));
    }

    let record = NewAttendance {
        employee_id: body.employee_id,
        date: body.date,
        check_in: body.check_in,
        check_out: body.check_out,
        status: body.status,
    };

    let attendance = service.store().insert_attendance(&record).await?;
    info!(
        user = %auth.username,
        employee_id = %attendance.employee_id,
        date = %attendance.date,
        hours = attendance.hours_worked,
        "Attendance marked"
    );

    Ok(HttpResponse::Created().json(json!({
        "message": "Attendance marked successfully",
        "attendance": attendance
    })))
}

#[utoipa::path(
    get,
    path = "/api/attendance",
    responses((status = 200, body = AttendanceListResponse)),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn list_attendance(
    _auth: AuthUser,
    service: web::Data<AppService>,
) -> Result<HttpResponse, PayrollError> {
    let attendance = service.store().list_all_attendance().await?;
    Ok(HttpResponse::Ok().json(AttendanceListResponse { attendance }))
}
