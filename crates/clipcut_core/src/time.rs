//! Display formatting and clamping for times expressed in seconds.

/// Format seconds as `MM:SS`, truncating to whole seconds.
///
/// Anything that is not a finite, non-negative number renders as `00:00`.
/// Minutes do not wrap at the hour.
pub fn format_coarse(seconds: f64) -> String {
    match split(seconds) {
        Some((minutes, secs, _)) => format!("{minutes:02}:{secs:02}"),
        None => "00:00".to_string(),
    }
}

/// Format seconds as `MM:SS:CC` where `CC` is hundredths of a second, truncated.
pub fn format_precise(seconds: f64) -> String {
    match split(seconds) {
        Some((minutes, secs, centis)) => format!("{minutes:02}:{secs:02}:{centis:02}"),
        None => "00:00:00".to_string(),
    }
}

/// Clamp `t` into `[0, duration]`, treating NaN as 0 and an unusable
/// duration as 0.
pub fn clamp_time(t: f64, duration: f64) -> f64 {
    let upper = if duration.is_finite() && duration > 0.0 {
        duration
    } else {
        0.0
    };
    if t.is_nan() {
        0.0
    } else {
        t.clamp(0.0, upper)
    }
}

fn split(seconds: f64) -> Option<(u64, u64, u64)> {
    if !seconds.is_finite() || seconds < 0.0 {
        return None;
    }
    let whole = seconds.floor();
    let minutes = (whole / 60.0).floor() as u64;
    let secs = (whole % 60.0) as u64;
    let centis = ((seconds.fract() * 100.0).floor() as u64).min(99);
    Some((minutes, secs, centis))
}
