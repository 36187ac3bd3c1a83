//! Transit time handling.
//!
//! The engine works in integer seconds since midnight of the service date.
//! Values above 24h are valid and represent trips crossing midnight; the
//! timetable of a service day routinely extends past 86 400.

use std::fmt::Write as _;

/// An instant, in seconds since midnight of the service date.
///
/// Plain integers keep the search's inner loops branch-predictable and the
/// per-stop arrival arrays dense. Values above `24 * 60 * 60` are legal and
/// denote the following calendar day.
pub type Time = i32;

/// Sentinel marking a stop or target that has not been reached.
///
/// Chosen so that any real arrival time compares as better (smaller). Never
/// add a duration to `UNREACHED`; check for it first.
pub const UNREACHED: Time = Time::MAX;

/// Build a time from hours, minutes and seconds. Hours may exceed 23 for
/// times on the following service day.
pub const fn hms(hours: i32, minutes: i32, seconds: i32) -> Time {
    hours * 3600 + minutes * 60 + seconds
}

/// Build a time from hours and minutes.
pub const fn hm(hours: i32, minutes: i32) -> Time {
    hms(hours, minutes, 0)
}

/// Render a time as `HH:MM:SS` (or a sentinel marker), mainly for logging
/// and assertion messages. Hours are not wrapped at 24.
pub fn time_to_string(time: Time) -> String {
    if time == UNREACHED {
        return "unreached".to_string();
    }
    let (sign, t) = if time < 0 { ("-", -time) } else { ("", time) };
    let mut out = String::with_capacity(9);
    let _ = write!(
        out,
        "{sign}{:02}:{:02}:{:02}",
        t / 3600,
        (t / 60) % 60,
        t % 60
    );
    out
}
