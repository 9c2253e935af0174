use chrono::{DateTime, Local};

pub fn mean(data: &[f64]) -> Option<f64> {
    let sum = data.iter().sum::<f64>();
    let count = data.len();

    match count {
        positive if positive > 0 => Some(sum / count as f64),
        _ => None,
    }
}

const UNKNOWN_DATE: &str = "Unknown Date";

/// History group heading, e.g. `Monday, 01/05`.
pub fn format_title(date: Option<&DateTime<Local>>) -> String {
    date.map_or_else(|| UNKNOWN_DATE.to_string(), |d| d.format("%A, %d/%m").to_string())
}

/// `DD/MM/YYYY`
pub fn format_date(date: Option<&DateTime<Local>>) -> String {
    date.map_or_else(|| UNKNOWN_DATE.to_string(), |d| d.format("%d/%m/%Y").to_string())
}

/// `DD/MM/YYYY HH:MM`
pub fn format_date_time(date: Option<&DateTime<Local>>) -> String {
    date.map_or_else(
        || UNKNOWN_DATE.to_string(),
        |d| d.format("%d/%m/%Y %H:%M").to_string(),
    )
}

/// Whole seconds as `HH:MM:SS`.
pub fn format_hms(seconds: u64) -> String {
    format!(
        "{:02}:{:02}:{:02}",
        seconds / 3600,
        (seconds % 3600) / 60,
        seconds % 60
    )
}
