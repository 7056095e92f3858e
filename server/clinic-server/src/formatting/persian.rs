//! Persian locale display strings: digits, grouped amounts, Jalali dates

use chrono::{DateTime, Datelike, NaiveDate, Utc, Weekday};
use config_engine::CurrencyDisplay;
use reception_service::{clinic_local, JalaliDate};
use rust_decimal::Decimal;

/// Arabic thousands separator (U+066C)
pub const THOUSANDS_SEPARATOR: char = '\u{066C}';
/// Arabic decimal separator (U+066B)
pub const DECIMAL_SEPARATOR: char = '\u{066B}';

pub const RIAL: &str = "ریال";
pub const TOMAN: &str = "تومان";

const MONTH_NAMES: [&str; 12] = [
    "فروردین",
    "اردیبهشت",
    "خرداد",
    "تیر",
    "مرداد",
    "شهریور",
    "مهر",
    "آبان",
    "آذر",
    "دی",
    "بهمن",
    "اسفند",
];

/// Replace ASCII digits with Persian digits (U+06F0..U+06F9)
pub fn to_persian_digits(input: &str) -> String {
    input
        .chars()
        .map(|c| match c.to_digit(10) {
            Some(d) if c.is_ascii_digit() => char::from_u32(0x06F0 + d).unwrap_or(c),
            _ => c,
        })
        .collect()
}

fn group_thousands(digits: &str) -> String {
    let len = digits.chars().count();
    let mut grouped = String::with_capacity(digits.len() + len / 3 * 2);
    for (index, ch) in digits.chars().enumerate() {
        if index > 0 && (len - index) % 3 == 0 {
            grouped.push(THOUSANDS_SEPARATOR);
        }
        grouped.push(ch);
    }
    grouped
}

/// Whole amount with grouped Persian digits, e.g. `۱٬۲۵۰٬۰۰۰`
///
/// Fractions are truncated; negatives keep a leading `-`.
pub fn format_number(amount: Decimal) -> String {
    let whole = amount.trunc();
    let digits = whole.abs().normalize().to_string();
    let sign = if whole.is_sign_negative() && !whole.is_zero() {
        "-"
    } else {
        ""
    };
    format!("{sign}{}", to_persian_digits(&group_thousands(&digits)))
}

/// `۱٬۲۵۰٬۰۰۰ ریال`
pub fn format_rial(amount: Decimal) -> String {
    format!("{} {RIAL}", format_number(amount))
}

/// Rial amount shown in toman (one tenth, truncated)
pub fn format_toman(amount: Decimal) -> String {
    format!("{} {TOMAN}", format_number(amount / Decimal::TEN))
}

/// Amount in the clinic's configured display currency
pub fn format_amount(amount: Decimal, display: CurrencyDisplay) -> String {
    match display {
        CurrencyDisplay::Rial => format_rial(amount),
        CurrencyDisplay::Toman => format_toman(amount),
    }
}

/// `۷۰٪`, or `۱۲٫۵٪` for fractional percents
pub fn format_percent(percent: Decimal) -> String {
    let text = percent.normalize().to_string().replace('.', &DECIMAL_SEPARATOR.to_string());
    format!("{}٪", to_persian_digits(&text))
}

pub fn month_name(month: u32) -> Option<&'static str> {
    let index = usize::try_from(month).ok()?.checked_sub(1)?;
    MONTH_NAMES.get(index).copied()
}

/// Persian weekday name; the Persian week starts on Saturday
pub fn weekday_name(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Sat => "شنبه",
        Weekday::Sun => "یکشنبه",
        Weekday::Mon => "دوشنبه",
        Weekday::Tue => "سه‌شنبه",
        Weekday::Wed => "چهارشنبه",
        Weekday::Thu => "پنجشنبه",
        Weekday::Fri => "جمعه",
    }
}

/// `۱۴۰۳/۰۱/۱۵`
pub fn format_jalali_date(date: NaiveDate) -> String {
    to_persian_digits(&JalaliDate::from_gregorian(date).to_string())
}

/// `چهارشنبه ۱۵ فروردین ۱۴۰۳`
pub fn format_jalali_long(date: NaiveDate) -> String {
    let jalali = JalaliDate::from_gregorian(date);
    let month = month_name(jalali.month).unwrap_or_default();
    to_persian_digits(&format!(
        "{} {} {} {}",
        weekday_name(date.weekday()),
        jalali.day,
        month,
        jalali.year
    ))
}

/// Clinic-local time of day, `۰۹:۳۰`
pub fn format_clinic_time(at: DateTime<Utc>) -> String {
    to_persian_digits(&clinic_local(at).format("%H:%M").to_string())
}

/// `۱۴۰۳/۰۱/۱۵ - ۰۹:۳۰` in clinic-local time
pub fn format_jalali_datetime(at: DateTime<Utc>) -> String {
    let local = clinic_local(at);
    format!(
        "{} - {}",
        format_jalali_date(local.date()),
        format_clinic_time(at)
    )
}
