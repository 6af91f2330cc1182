//! Relative ages such as "1 day" or "6 months"
//!
//! Used by the retention operations of a store to compute the cutoff
//! instant `now - age`. Calendar units (months, years) follow calendar
//! arithmetic, clamping to the end of shorter months.

use crate::error::{Result, ThreadlineError};
use chrono::{DateTime, Duration, Months, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Unit of a relative age
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AgeUnit {
    Seconds,
    Minutes,
    Hours,
    Days,
    Weeks,
    Months,
    Years,
}

impl AgeUnit {
    fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "s" | "sec" | "secs" | "second" | "seconds" => Some(AgeUnit::Seconds),
            "min" | "mins" | "minute" | "minutes" => Some(AgeUnit::Minutes),
            "h" | "hour" | "hours" => Some(AgeUnit::Hours),
            "d" | "day" | "days" => Some(AgeUnit::Days),
            "w" | "week" | "weeks" => Some(AgeUnit::Weeks),
            "month" | "months" => Some(AgeUnit::Months),
            "y" | "year" | "years" => Some(AgeUnit::Years),
            _ => None,
        }
    }

    fn name(&self, amount: u32) -> &'static str {
        let plural = amount != 1;
        match (self, plural) {
            (AgeUnit::Seconds, false) => "second",
            (AgeUnit::Seconds, true) => "seconds",
            (AgeUnit::Minutes, false) => "minute",
            (AgeUnit::Minutes, true) => "minutes",
            (AgeUnit::Hours, false) => "hour",
            (AgeUnit::Hours, true) => "hours",
            (AgeUnit::Days, false) => "day",
            (AgeUnit::Days, true) => "days",
            (AgeUnit::Weeks, false) => "week",
            (AgeUnit::Weeks, true) => "weeks",
            (AgeUnit::Months, false) => "month",
            (AgeUnit::Months, true) => "months",
            (AgeUnit::Years, false) => "year",
            (AgeUnit::Years, true) => "years",
        }
    }
}

/// A count of time units measured back from "now"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RelativeAge {
    amount: u32,
    unit: AgeUnit,
}

impl RelativeAge {
    /// Create a relative age
    pub fn new(amount: u32, unit: AgeUnit) -> Self {
        Self { amount, unit }
    }

    /// Zero-length age, i.e. "now"
    pub fn zero() -> Self {
        Self::new(0, AgeUnit::Seconds)
    }

    /// Default window for removing recent comments ("1 day")
    pub fn default_newer() -> Self {
        Self::new(1, AgeUnit::Days)
    }

    /// Default window for removing old comments ("6 months")
    pub fn default_older() -> Self {
        Self::new(6, AgeUnit::Months)
    }

    pub fn amount(&self) -> u32 {
        self.amount
    }

    pub fn unit(&self) -> AgeUnit {
        self.unit
    }

    /// Instant `now - self`
    pub fn cutoff_from(&self, now: DateTime<Utc>) -> Result<DateTime<Utc>> {
        let amount = i64::from(self.amount);
        let cutoff = match self.unit {
            AgeUnit::Seconds => now.checked_sub_signed(Duration::seconds(amount)),
            AgeUnit::Minutes => now.checked_sub_signed(Duration::minutes(amount)),
            AgeUnit::Hours => now.checked_sub_signed(Duration::hours(amount)),
            AgeUnit::Days => now.checked_sub_signed(Duration::days(amount)),
            AgeUnit::Weeks => now.checked_sub_signed(Duration::weeks(amount)),
            AgeUnit::Months => now.checked_sub_months(Months::new(self.amount)),
            AgeUnit::Years => self
                .amount
                .checked_mul(12)
                .and_then(|months| now.checked_sub_months(Months::new(months))),
        };

        cutoff.ok_or_else(|| ThreadlineError::InvalidAge(format!("{} is out of range", self)))
    }
}

impl FromStr for RelativeAge {
    type Err = ThreadlineError;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || ThreadlineError::InvalidAge(format!("'{}' (expected e.g. \"1 day\")", s));

        let mut parts = s.split_whitespace();
        let (amount, unit) = match (parts.next(), parts.next(), parts.next()) {
            (Some(amount), Some(unit), None) => (amount, unit),
            _ => return Err(invalid()),
        };

        let amount = amount
            .strip_prefix('+')
            .unwrap_or(amount)
            .parse::<u32>()
            .map_err(|_| invalid())?;
        let unit = AgeUnit::parse(unit).ok_or_else(invalid)?;

        Ok(Self::new(amount, unit))
    }
}

impl TryFrom<String> for RelativeAge {
    type Error = ThreadlineError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<RelativeAge> for String {
    fn from(age: RelativeAge) -> Self {
        age.to_string()
    }
}

impl fmt::Display for RelativeAge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.amount, self.unit.name(self.amount))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_parse() {
        assert_eq!(
            "1 day".parse::<RelativeAge>().unwrap(),
            RelativeAge::new(1, AgeUnit::Days)
        );
        assert_eq!(
            "6 Months".parse::<RelativeAge>().unwrap(),
            RelativeAge::new(6, AgeUnit::Months)
        );
        assert_eq!(
            "  20   minutes ".parse::<RelativeAge>().unwrap(),
            RelativeAge::new(20, AgeUnit::Minutes)
        );
        assert_eq!(
            "+3 years".parse::<RelativeAge>().unwrap(),
            RelativeAge::new(3, AgeUnit::Years)
        );
    }

    #[test]
    fn test_parse_rejects_garbage() {
        for input in ["", "day", "1", "-1 day", "1 fortnight", "1 day ago", "1.5 days"] {
            assert!(input.parse::<RelativeAge>().is_err(), "accepted {:?}", input);
        }
    }

    #[test]
    fn test_display() {
        assert_eq!(RelativeAge::default_newer().to_string(), "1 day");
        assert_eq!(RelativeAge::default_older().to_string(), "6 months");
        assert_eq!(RelativeAge::zero().to_string(), "0 seconds");
    }

    #[test]
    fn test_cutoff() {
        let now = Utc.with_ymd_and_hms(2024, 8, 31, 10, 0, 0).unwrap();

        assert_eq!(RelativeAge::zero().cutoff_from(now).unwrap(), now);
        assert_eq!(
            "1 day".parse::<RelativeAge>().unwrap().cutoff_from(now).unwrap(),
            Utc.with_ymd_and_hms(2024, 8, 30, 10, 0, 0).unwrap()
        );
        // February has no 31st
        assert_eq!(
            "6 months".parse::<RelativeAge>().unwrap().cutoff_from(now).unwrap(),
            Utc.with_ymd_and_hms(2024, 2, 29, 10, 0, 0).unwrap()
        );
        assert_eq!(
            "1 year".parse::<RelativeAge>().unwrap().cutoff_from(now).unwrap(),
            Utc.with_ymd_and_hms(2023, 8, 31, 10, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_serde_as_string() {
        let age: RelativeAge = serde_json::from_str("\"2 weeks\"").unwrap();
        assert_eq!(age, RelativeAge::new(2, AgeUnit::Weeks));
        assert_eq!(serde_json::to_string(&age).unwrap(), "\"2 weeks\"");
        assert!(serde_json::from_str::<RelativeAge>("\"soon\"").is_err());
    }
}
