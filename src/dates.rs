use chrono::{Duration, Local, NaiveDate};

/// Days shown in the habit table.
pub const WINDOW_DAYS: usize = 7;

/// The `n` calendar days ending today (local time), oldest first.
pub fn last_n_days(n: usize) -> Vec<String> {
    last_n_days_at(Local::now().date_naive(), n)
}

pub fn last_n_days_at(today: NaiveDate, n: usize) -> Vec<String> {
    (0..n)
        .rev()
        .map(|offset| date_key(today - Duration::days(offset as i64)))
        .collect()
}

pub fn date_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

pub fn parse_date_key(key: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(key, "%Y-%m-%d").ok()
}

/// Short column label such as `Mon Jul 27`. Unparseable keys are returned as-is.
pub fn display_label(key: &str) -> String {
    match parse_date_key(key) {
        Some(date) => date.format("%a %b %-d").to_string(),
        None => key.to_string(),
    }
}
