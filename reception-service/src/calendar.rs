// Solar Hijri (Jalali) calendar and the clinic's local day
use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveDateTime, Utc, Weekday};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Iran Standard Time, UTC+03:30, without daylight saving
pub const TEHRAN_OFFSET_MINUTES: i64 = 210;

const GREGORIAN_DAYS_BEFORE_MONTH: [i32; 12] =
    [0, 31, 59, 90, 120, 151, 181, 212, 243, 273, 304, 334];

/// Wall-clock time at the clinic for an instant
pub fn clinic_local(at: DateTime<Utc>) -> NaiveDateTime {
    at.naive_utc() + Duration::minutes(TEHRAN_OFFSET_MINUTES)
}

/// Calendar day at the clinic for an instant
pub fn clinic_day(at: DateTime<Utc>) -> NaiveDate {
    clinic_local(at).date()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct JalaliDate {
    pub year: i32,
    /// 1 = Farvardin
    pub month: u32,
    pub day: u32,
}

impl JalaliDate {
    /// Convert a Gregorian date
    ///
    /// Uses the arithmetic 33-year leap cycle, which agrees with the
    /// astronomical calendar for present-day dates.
    pub fn from_gregorian(date: NaiveDate) -> Self {
        let (gy, gm) = (date.year(), date.month());
        let gd = i32::try_from(date.day()).unwrap_or(1);
        let gy2 = if gm > 2 { gy + 1 } else { gy };
        let before_month = GREGORIAN_DAYS_BEFORE_MONTH
            .get(gm.saturating_sub(1) as usize)
            .copied()
            .unwrap_or(0);

        let mut days = 355_666 + 365 * gy + (gy2 + 3) / 4 - (gy2 + 99) / 100
            + (gy2 + 399) / 400
            + gd
            + before_month;
        let mut year = -1595 + 33 * (days / 12053);
        days %= 12053;
        year += 4 * (days / 1461);
        days %= 1461;
        if days > 365 {
            year += (days - 1) / 365;
            days = (days - 1) % 365;
        }
        let (month, day) = if days < 186 {
            (1 + days / 31, 1 + days % 31)
        } else {
            (7 + (days - 186) / 30, 1 + (days - 186) % 30)
        };

        Self {
            year,
            month: month.unsigned_abs(),
            day: day.unsigned_abs(),
        }
    }

    /// Gregorian date of this Jalali date, `None` when it does not exist
    pub fn to_gregorian(&self) -> Option<NaiveDate> {
        if !(1..=12).contains(&self.month) || self.day < 1 || self.day > self.days_in_month() {
            return None;
        }
        let day_of_year = if self.month <= 6 {
            (self.month - 1) * 31 + self.day - 1
        } else {
            186 + (self.month - 7) * 30 + self.day - 1
        };
        Some(Self::nowruz(self.year)? + Duration::days(i64::from(day_of_year)))
    }

    /// Gregorian date of 1 Farvardin of `year`
    fn nowruz(year: i32) -> Option<NaiveDate> {
        (19..=22)
            .filter_map(|day| NaiveDate::from_ymd_opt(year + 621, 3, day))
            .find(|date| {
                let jalali = Self::from_gregorian(*date);
                jalali.year == year && jalali.month == 1 && jalali.day == 1
            })
    }

    pub fn is_leap_year(&self) -> bool {
        match (Self::nowruz(self.year), Self::nowruz(self.year + 1)) {
            (Some(start), Some(end)) => (end - start).num_days() == 366,
            _ => false,
        }
    }

    pub fn days_in_month(&self) -> u32 {
        match self.month {
            1..=6 => 31,
            7..=11 => 30,
            12 if self.is_leap_year() => 30,
            12 => 29,
            _ => 0,
        }
    }

    /// `yyyymmdd` without separators, as used in reception numbers
    pub fn compact(&self) -> String {
        format!("{:04}{:02}{:02}", self.year, self.month, self.day)
    }

    /// Weekday of the underlying day
    pub fn weekday(&self) -> Option<Weekday> {
        self.to_gregorian().map(|date| date.weekday())
    }
}

impl From<NaiveDate> for JalaliDate {
    fn from(date: NaiveDate) -> Self {
        Self::from_gregorian(date)
    }
}

/// `1403/01/15`
impl fmt::Display for JalaliDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}/{:02}/{:02}", self.year, self.month, self.day)
    }
}
