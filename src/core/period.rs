//! Lookback periods and the date window sent to the ranking endpoint

use super::error::FundError;
use chrono::{Duration, Local, NaiveDateTime};
use std::fmt::Display;
use std::str::FromStr;

const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PeriodUnit {
    Hours,
    Days,
    Months,
    Years,
}

impl PeriodUnit {
    fn from_char(c: char) -> Option<Self> {
        match c {
            'h' => Some(PeriodUnit::Hours),
            'd' => Some(PeriodUnit::Days),
            'm' => Some(PeriodUnit::Months),
            'y' => Some(PeriodUnit::Years),
            _ => None,
        }
    }

    fn as_char(&self) -> char {
        match self {
            PeriodUnit::Hours => 'h',
            PeriodUnit::Days => 'd',
            PeriodUnit::Months => 'm',
            PeriodUnit::Years => 'y',
        }
    }
}

/// A lookback such as `1y` or `6m`. Months are 30 days and years are 365
/// days, with no calendar correction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Period {
    pub magnitude: u32,
    pub unit: PeriodUnit,
}

impl Period {
    /// Returns `None` when the duration does not fit in a `chrono::Duration`.
    pub fn to_duration(&self) -> Option<Duration> {
        let n = i64::from(self.magnitude);
        match self.unit {
            PeriodUnit::Hours => Duration::try_hours(n),
            PeriodUnit::Days => Duration::try_days(n),
            PeriodUnit::Months => Duration::try_days(n * 30),
            PeriodUnit::Years => Duration::try_days(n * 365),
        }
    }
}

impl Display for Period {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.magnitude, self.unit.as_char())
    }
}

impl FromStr for Period {
    type Err = FundError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || FundError::InvalidPeriodFormat(s.to_string());

        let mut chars = s.chars();
        let unit = chars
            .next_back()
            .and_then(PeriodUnit::from_char)
            .ok_or_else(invalid)?;
        let magnitude = chars.as_str();
        if magnitude.is_empty() || !magnitude.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        let magnitude = magnitude.parse::<u32>().map_err(|_| invalid())?;

        Ok(Period { magnitude, unit })
    }
}

/// Computes date strings relative to a fixed "now".
///
/// The instant is captured once so every date derived from a window agrees,
/// and tests can pin it with [`DateWindow::at`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindow {
    now: NaiveDateTime,
}

impl DateWindow {
    pub fn now() -> Self {
        Self::at(Local::now().naive_local())
    }

    pub fn at(now: NaiveDateTime) -> Self {
        DateWindow { now }
    }

    pub fn today(&self) -> String {
        self.now.format(DATE_FORMAT).to_string()
    }

    /// The instant `period` before now.
    pub fn shifted(&self, period: &str) -> Result<NaiveDateTime, FundError> {
        let parsed: Period = period.parse()?;
        parsed
            .to_duration()
            .and_then(|duration| self.now.checked_sub_signed(duration))
            .ok_or_else(|| FundError::InvalidPeriodFormat(period.to_string()))
    }

    pub fn shifted_by(&self, period: &str) -> Result<String, FundError> {
        Ok(self.shifted(period)?.format(DATE_FORMAT).to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn fixed_now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 15)
            .unwrap()
            .and_hms_opt(0, 30, 0)
            .unwrap()
    }

    #[test]
    fn test_today_formats_as_iso_date() {
        let window = DateWindow::at(fixed_now());
        assert_eq!(window.today(), "2024-03-15");
    }

    #[test]
    fn test_shift_uses_fixed_unit_lengths() {
        let now = fixed_now();
        let window = DateWindow::at(now);

        let cases = [
            ("1h", Duration::hours(1), "2024-03-14"),
            ("7d", Duration::days(7), "2024-03-08"),
            ("3m", Duration::days(90), "2023-12-16"),
            ("2y", Duration::days(730), "2022-03-16"),
        ];

        for (period, duration, expected) in cases {
            let shifted = window.shifted(period).unwrap();
            assert_eq!(now - shifted, duration, "period {period}");
            assert!(shifted < now);
            assert_eq!(window.shifted_by(period).unwrap(), expected, "period {period}");
            assert!(window.shifted_by(period).unwrap() < window.today());
        }
    }

    #[test]
    fn test_malformed_periods_are_rejected() {
        let window = DateWindow::at(fixed_now());
        for period in ["", "y", "1", "12", "1w", "1Y", "ay", "1.5y", "-1d", " 1d", "1yy", "1年"] {
            let result = window.shifted_by(period);
            assert!(
                matches!(result, Err(FundError::InvalidPeriodFormat(ref p)) if p == period),
                "period {period:?} gave {result:?}"
            );
        }
    }

    #[test]
    fn test_period_round_trips_through_display() {
        let period: Period = "18m".parse().unwrap();
        assert_eq!(period.magnitude, 18);
        assert_eq!(period.unit, PeriodUnit::Months);
        assert_eq!(period.to_string(), "18m");
    }

    #[test]
    fn test_oversized_period_is_invalid() {
        let window = DateWindow::at(fixed_now());
        assert!(matches!(
            window.shifted_by("4000000000y"),
            Err(FundError::InvalidPeriodFormat(_))
        ));
    }
}
