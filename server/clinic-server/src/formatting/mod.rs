pub mod persian;

pub use persian::{
    format_amount, format_clinic_time, format_jalali_date, format_jalali_datetime,
    format_jalali_long, format_number, format_percent, format_rial, format_toman, month_name,
    to_persian_digits, weekday_name,
};
