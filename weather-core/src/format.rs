use chrono::{DateTime, Local, TimeZone};

/// `"Sun, 18 Oct"`: abbreviated weekday, unpadded day of month, abbreviated month.
pub fn format_date<Tz: TimeZone>(date: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    date.format("%a, %-d %b").to_string()
}

pub fn today() -> String {
    format_date(&Local::now())
}
