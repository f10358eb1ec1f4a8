//! Time arithmetic shared by the sensors.
//!
//! All rounding is half-to-even: 90 seconds is 2 minutes, 150 seconds is
//! also 2 minutes.

use chrono::{DateTime, Utc};

fn round_minutes(seconds: f64) -> i64 {
    (seconds / 60.0).round_ties_even() as i64
}

fn seconds_between(from: DateTime<Utc>, to: DateTime<Utc>) -> f64 {
    (to - from).num_milliseconds() as f64 / 1000.0
}

/// Whole minutes from `now` until `time`; 0 when there is no time.
///
/// Negative for times in the past.
pub fn minutes_until(time: Option<DateTime<Utc>>, now: DateTime<Utc>) -> i64 {
    match time {
        Some(time) => round_minutes(seconds_between(now, time)),
        None => 0,
    }
}

/// Delay in whole minutes from a delay in seconds.
pub fn delay_minutes(delay_seconds: i64) -> i64 {
    round_minutes(delay_seconds as f64)
}

/// Total travel time in minutes, including the departure delay.
pub fn ride_duration_minutes(
    departure_time: DateTime<Utc>,
    arrival_time: DateTime<Utc>,
    delay_seconds: i64,
) -> i64 {
    round_minutes(seconds_between(departure_time, arrival_time)) + delay_minutes(delay_seconds)
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone};

    use super::*;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 12, 11, 10, 30, 0).unwrap()
    }

    #[test]
    fn minutes_until_none_is_zero() {
        assert_eq!(minutes_until(None, t0()), 0);
    }

    #[test]
    fn minutes_until_future_and_past() {
        assert_eq!(minutes_until(Some(t0() + Duration::minutes(10)), t0()), 10);
        assert_eq!(minutes_until(Some(t0() + Duration::seconds(620)), t0()), 10);
        assert_eq!(minutes_until(Some(t0() - Duration::minutes(3)), t0()), -3);
    }

    #[test]
    fn delay_in_minutes() {
        assert_eq!(delay_minutes(0), 0);
        assert_eq!(delay_minutes(60), 1);
        assert_eq!(delay_minutes(120), 2);
        assert_eq!(delay_minutes(90), 2);
        assert_eq!(delay_minutes(30), 0);
        assert_eq!(delay_minutes(150), 2);
    }

    #[test]
    fn ride_duration() {
        let dep = t0();
        let arr = dep + Duration::minutes(30);
        assert_eq!(ride_duration_minutes(dep, arr, 0), 30);
        assert_eq!(ride_duration_minutes(dep, arr, 120), 32);
    }
}
