use chrono::{Datelike, NaiveDate};

/// Fixed 3-letter month table. Document dates must not vary with host
/// locale, so chrono's locale-aware formatting is not used here.
pub const MONTH_ABBREV: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// `dd-Mon-yy`, e.g. `06-Aug-26`.
pub fn short_date(date: NaiveDate) -> String {
    format!(
        "{:02}-{}-{:02}",
        date.day(),
        MONTH_ABBREV[date.month0() as usize],
        date.year() % 100
    )
}

/// Render a user-entered ISO date (`YYYY-MM-DD`) as `dd-Mon-yy`; anything
/// unparseable is written through as typed.
pub fn format_date_field(raw: &str) -> String {
    match NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d") {
        Ok(date) => short_date(date),
        Err(_) => raw.to_string(),
    }
}
