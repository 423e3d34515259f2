//! Time readouts for host UIs

/// Format a position in seconds as `mm:ss`.
///
/// Fractions are truncated; negative input reads as `00:00`. Minutes are not
/// wrapped at an hour.
///
/// # Example
/// ```
/// use keybard::format::format_duration;
///
/// assert_eq!(format_duration(0.0), "00:00");
/// assert_eq!(format_duration(75.9), "01:15");
/// assert_eq!(format_duration(3725.0), "62:05");
/// ```
pub fn format_duration(seconds: f64) -> String {
    let total = if seconds.is_finite() && seconds > 0.0 {
        seconds as u64
    } else {
        0
    };
    format!("{:02}:{:02}", total / 60, total % 60)
}
