use crate::config::CSV_EXTENSION;

/// Seconds with millisecond precision, e.g. `91.500s`.
pub fn format_seconds(secs: f64) -> String {
    format!("{:.3}s", secs)
}

/// Gap column text: the leader and non-finishers show a dash.
pub fn format_gap(gap: f64) -> String {
    if gap > 0.0 {
        format!("+{:.3}s", gap)
    } else {
        "-".to_string()
    }
}

/// `1` → `P1`.
pub fn format_position(position: u32) -> String {
    format!("P{}", position)
}

pub fn medal(position: u32) -> &'static str {
    match position {
        1 => "🥇",
        2 => "🥈",
        3 => "🥉",
        _ => "",
    }
}

/// Whether an uploaded file name looks like a CSV file.
pub fn is_csv_file(name: &str, mime: &str) -> bool {
    mime == "text/csv" || name.to_ascii_lowercase().ends_with(CSV_EXTENSION)
}

/// Generic numeric input validation
pub fn validate_numeric_input<T>(
    input: &str,
    min: Option<T>,
    max: Option<T>,
    field_name: &str,
) -> Result<T, String>
where
    T: std::str::FromStr + std::fmt::Display + PartialOrd,
{
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(format!("{} cannot be empty", field_name));
    }

    match trimmed.parse::<T>() {
        Ok(val) => {
            if let Some(min_val) = min {
                if val < min_val {
                    return Err(format!("{} must be at least {}", field_name, min_val));
                }
            }
            if let Some(max_val) = max {
                if val > max_val {
                    return Err(format!("{} cannot exceed {}", field_name, max_val));
                }
            }
            Ok(val)
        }
        Err(_) => Err(format!("{} must be a valid number", field_name)),
    }
}

/// Validate a track-condition slider value against its range.
pub fn validate_condition(input: &str, (min, max): (f64, f64), field_name: &str) -> Result<f64, String> {
    validate_numeric_input(input, Some(min), Some(max), field_name)
}
