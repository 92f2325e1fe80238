//! Continuous-work limit for interviewers.
//!
//! An interviewer may accumulate at most `max_continuous_work` of interview
//! time in any stretch of interviews not separated by a gap of at least
//! `break_length`.

use chrono::{DateTime, Duration, Utc};

use crate::interval::TimeInterval;

/// Decides whether `candidate` can join an interviewer's recorded interview
/// intervals without breaking the continuous-work rule.
///
/// Only intervals within `max_continuous_work` of the candidate can interact
/// with it through the sliding window, so everything further away is dropped
/// before the walk.
pub(crate) fn sufficient_breaks(
    recorded: impl Iterator<Item = TimeInterval>,
    candidate: TimeInterval,
    max_continuous_work: Duration,
    break_length: Duration,
) -> bool {
    let lower = candidate.start() - max_continuous_work;
    let upper = candidate.end() + max_continuous_work;
    let mut work: Vec<TimeInterval> = recorded
        .filter(|interval| interval.end() > lower && interval.start() < upper)
        .collect();
    work.push(candidate);
    work.sort_unstable();
    stretches_within_limit(&work, max_continuous_work, break_length)
}

/// Walks intervals sorted by start, carrying the current stretch of
/// continuous work. An interval closer than `break_length` to the previous
/// end extends the stretch by `end - prev_end`, so overlapping or touching
/// work is not counted twice.
pub(crate) fn stretches_within_limit(
    work_sorted: &[TimeInterval],
    max_continuous_work: Duration,
    break_length: Duration,
) -> bool {
    let mut prev_end: Option<DateTime<Utc>> = None;
    let mut stretch = Duration::zero();
    for interval in work_sorted {
        stretch = match prev_end {
            Some(prev) if interval.start() < prev + break_length => {
                stretch + (interval.end() - prev)
            }
            _ => interval.duration(),
        };
        if stretch > max_continuous_work {
            return false;
        }
        prev_end = Some(interval.end());
    }
    true
}
