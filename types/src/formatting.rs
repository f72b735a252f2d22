//! Number and duration formatting for report output.
//!
//! Everything the CLI prints goes through this module so DPS figures,
//! percentages and fight timestamps look the same in every report, and so
//! European-style separators (swapping `.` and `,`) can be switched on in one place.

/// Swap `.` and `,` in an already formatted number.
fn europeanize(s: &str) -> String {
    s.chars()
        .map(|c| match c {
            '.' => ',',
            ',' => '.',
            c => c,
        })
        .collect()
}

#[inline]
fn maybe_eu(s: String, european: bool) -> String {
    if european { europeanize(&s) } else { s }
}

/// Format a DPS or damage figure with a K/M suffix.
///
/// - Values >= 1,000,000 are formatted as `X.XXM`
/// - Values >= 1,000 are formatted as `X.XK`
/// - Values below 1,000 are rounded to a whole number
///
/// # Examples
/// ```
/// use wipecall_types::formatting::format_dps;
/// assert_eq!(format_dps(850.4, false), "850");
/// assert_eq!(format_dps(152_340.0, false), "152.3K");
/// assert_eq!(format_dps(2_450_000.0, false), "2.45M");
/// assert_eq!(format_dps(152_340.0, true), "152,3K");
/// ```
pub fn format_dps(n: f64, european: bool) -> String {
    let n_abs = n.abs();
    let s = if n_abs >= 1_000_000.0 {
        format!("{:.2}M", n / 1_000_000.0)
    } else if n_abs >= 1_000.0 {
        format!("{:.1}K", n / 1_000.0)
    } else {
        format!("{:.0}", n)
    };
    maybe_eu(s, european)
}

/// Format a percentage value with 1 decimal place.
///
/// # Examples
/// ```
/// use wipecall_types::formatting::format_pct;
/// assert_eq!(format_pct(42.7, false), "42.7%");
/// assert_eq!(format_pct(42.7, true), "42,7%");
/// ```
pub fn format_pct(n: f64, european: bool) -> String {
    maybe_eu(format!("{:.1}%", n), european)
}

/// Format a ratio expressed in percent of a reference (100 = on par) as a signed delta.
///
/// # Examples
/// ```
/// use wipecall_types::formatting::format_vs_reference;
/// assert_eq!(format_vs_reference(112.5, false), "+12.5%");
/// assert_eq!(format_vs_reference(91.0, false), "-9.0%");
/// assert_eq!(format_vs_reference(100.0, false), "+0.0%");
/// ```
pub fn format_vs_reference(ratio_pct: f64, european: bool) -> String {
    let delta = ratio_pct - 100.0;
    let sign = if delta >= 0.0 { "+" } else { "" };
    maybe_eu(format!("{}{:.1}%", sign, delta), european)
}

/// Format fight time in seconds as `M:SS`, truncating partial seconds.
///
/// Negative input (deaths logged before the pull) clamps to `0:00`.
///
/// # Examples
/// ```
/// use wipecall_types::formatting::format_fight_time;
/// assert_eq!(format_fight_time(125.9), "2:05");
/// assert_eq!(format_fight_time(59.4), "0:59");
/// assert_eq!(format_fight_time(-3.0), "0:00");
/// ```
pub fn format_fight_time(secs: f64) -> String {
    let total = secs.max(0.0).floor() as u64;
    format!("{}:{:02}", total / 60, total % 60)
}

/// Format a signed time difference as `+M:SS` / `-M:SS`.
///
/// Used to show a player's average survival against the raid average.
///
/// # Examples
/// ```
/// use wipecall_types::formatting::format_time_delta;
/// assert_eq!(format_time_delta(65.0), "+1:05");
/// assert_eq!(format_time_delta(-12.5), "-0:12");
/// ```
pub fn format_time_delta(secs: f64) -> String {
    let sign = if secs >= 0.0 { "+" } else { "-" };
    format!("{}{}", sign, format_fight_time(secs.abs()))
}

/// Human-readable name for an upstream difficulty id.
///
/// # Examples
/// ```
/// use wipecall_types::formatting::difficulty_name;
/// assert_eq!(difficulty_name(4), "Heroic");
/// assert_eq!(difficulty_name(9), "Difficulty 9");
/// ```
pub fn difficulty_name(difficulty: u32) -> String {
    match difficulty {
        1 => "LFR".to_string(),
        2 => "Flex".to_string(),
        3 => "Normal".to_string(),
        4 => "Heroic".to_string(),
        5 => "Mythic".to_string(),
        other => format!("Difficulty {}", other),
    }
}
