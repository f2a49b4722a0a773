use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};
use utoipa::ToSchema;

#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
    ToSchema,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum AttendanceStatus {
    #[default]
    Present,
    Absent,
    Leave,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Attendance {
    pub id: u64,
    pub employee_id: String,
    #[schema(example = "2024-03-01", value_type = String, format = "date")]
    pub date: NaiveDate,
    #[schema(example = "09:00:00", value_type = String, nullable = true)]
    pub check_in: Option<NaiveTime>,
    #[schema(example = "17:30:00", value_type = String, nullable = true)]
    pub check_out: Option<NaiveTime>,
    /// Derived when the record is written, never recomputed.
    pub hours_worked: f64,
    pub status: AttendanceStatus,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewAttendance {
    pub employee_id: String,
    pub date: NaiveDate,
    pub check_in: Option<NaiveTime>,
    pub check_out: Option<NaiveTime>,
    pub status: AttendanceStatus,
}

impl NewAttendance {
    pub fn hours_worked(&self) -> f64 {
        hours_between(self.check_in, self.check_out)
    }

    pub fn into_record(self, id: u64) -> Attendance {
        let hours_worked = self.hours_worked();
        Attendance {
            id,
            employee_id: self.employee_id,
            date: self.date,
            check_in: self.check_in,
            check_out: self.check_out,
            hours_worked,
            status: self.status,
        }
    }
}

/// Hours between check-in and check-out. Missing times or a check-out that is
/// not after the check-in count as zero.
pub fn hours_between(check_in: Option<NaiveTime>, check_out: Option<NaiveTime>) -> f64 {
    match (check_in, check_out) {
        (Some(check_in), Some(check_out)) if check_out > check_in => {
            check_out.signed_duration_since(check_in).num_seconds() as f64 / 3600.0
        }
        _ => 0.0,
    }
}
