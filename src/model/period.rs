use std::fmt;

use chrono::{Datelike, NaiveDate};
use serde::{Serialize, Serializer};

use crate::error::PayrollError;

pub const MIN_YEAR: i32 = 1900;
pub const MAX_YEAR: i32 = 9999;

/// A payroll period. Month is always 1..=12, rendered zero-padded ("03").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Period {
    year: i32,
    month: u32,
}

impl Period {
    pub fn new(month: u32, year: i32) -> Result<Self, PayrollError> {
        if !(1..=12).contains(&month) {
            return Err(PayrollError::InvalidInput(format!(
                "month must be between 01 and 12, got {month}"
            )));
        }
        if !(MIN_YEAR..=MAX_YEAR).contains(&year) {
            return Err(PayrollError::InvalidInput(format!(
                "year must be between {MIN_YEAR} and {MAX_YEAR}, got {year}"
            )));
        }

        Ok(Self { year, month })
    }

    /// Accepts only the two-character months "01".."12".
    pub fn parse(month: &str, year: i32) -> Result<Self, PayrollError> {
        if month.len() != 2 || !month.bytes().all(|b| b.is_ascii_digit()) {
            return Err(PayrollError::InvalidInput(format!(
                "month must be a two-digit string \"01\"..\"12\", got {month:?}"
            )));
        }

        let month = month
            .parse::<u32>()
            .map_err(|e| PayrollError::InvalidInput(format!("invalid month: {e}")))?;

        Self::new(month, year)
    }

    /// Same as [`Period::parse`] but also rejects a non-numeric year.
    pub fn parse_parts(month: &str, year: &str) -> Result<Self, PayrollError> {
        let year = year
            .trim()
            .parse::<i32>()
            .map_err(|_| PayrollError::InvalidInput(format!("year must be numeric, got {year:?}")))?;

        Self::parse(month, year)
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month_str(&self) -> String {
        format!("{:02}", self.month)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month() == self.month
    }

    pub fn first_day(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
    }

    pub fn last_day(&self) -> Option<NaiveDate> {
        let (year, month) = if self.month == 12 {
            (self.year + 1, 1)
        } else {
            (self.year, self.month + 1)
        };

        NaiveDate::from_ymd_opt(year, month, 1)?.pred_opt()
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}/{}", self.month, self.year)
    }
}

#[derive(Serialize)]
struct PeriodRepr {
    month: String,
    year: i32,
}

impl Serialize for Period {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        PeriodRepr {
            month: self.month_str(),
            year: self.year,
        }
        .serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_two_digit_months() {
        let period = Period::parse("03", 2024).unwrap();
        assert_eq!(period.month(), 3);
        assert_eq!(period.year(), 2024);
        assert_eq!(period.month_str(), "03");
        assert_eq!(period.to_string(), "03/2024");

        assert!(Period::parse("12", 2024).is_ok());
        assert!(Period::parse("01", 2024).is_ok());
    }

    #[test]
    fn rejects_malformed_months() {
        for month in ["3", "003", "00", "13", "ab", "", " 3", "-1"] {
            let err = Period::parse(month, 2024).unwrap_err();
            assert!(
                matches!(err, PayrollError::InvalidInput(_)),
                "month {month:?} should be rejected"
            );
        }
    }

    #[test]
    fn rejects_bad_years() {
        assert!(matches!(
            Period::parse_parts("03", "20x4"),
            Err(PayrollError::InvalidInput(_))
        ));
        assert!(matches!(
            Period::parse("03", 0),
            Err(PayrollError::InvalidInput(_))
        ));
        assert_eq!(Period::parse_parts("03", "2024").unwrap(), Period::parse("03", 2024).unwrap());
    }

    #[test]
    fn contains_only_dates_in_the_month() {
        let period = Period::parse("02", 2024).unwrap();

        assert!(period.contains(NaiveDate::from_ymd_opt(2024, 2, 1).unwrap()));
        assert!(period.contains(NaiveDate::from_ymd_opt(2024, 2, 29).unwrap()));
        assert!(!period.contains(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()));
        assert!(!period.contains(NaiveDate::from_ymd_opt(2023, 2, 15).unwrap()));
    }

    #[test]
    fn bounds_cover_the_whole_month() {
        let feb = Period::parse("02", 2024).unwrap();
        assert_eq!(feb.first_day(), NaiveDate::from_ymd_opt(2024, 2, 1));
        assert_eq!(feb.last_day(), NaiveDate::from_ymd_opt(2024, 2, 29));

        let dec = Period::parse("12", 2023).unwrap();
        assert_eq!(dec.last_day(), NaiveDate::from_ymd_opt(2023, 12, 31));
    }

    #[test]
    fn serializes_with_padded_month() {
        let period = Period::parse("07", 2025).unwrap();
        let json = serde_json::to_value(period).unwrap();
        assert_eq!(json, serde_json::json!({ "month": "07", "year": 2025 }));
    }
}
