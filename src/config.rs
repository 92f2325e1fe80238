//! Tunable limits for a scheduling run.

use chrono::Duration;

/// Knobs recognized by the scheduling engine.
///
/// The defaults match how admission rounds are actually run: half an hour
/// to move between rooms, at most four hours of interviewing between breaks
/// of at least twenty minutes.
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// Seed for the engine-scoped RNG that balances interviewer load.
    /// Identical seed and snapshot reproduce the assignment list exactly.
    pub seed: u64,
    /// Minimum buffer between two interviews in different rooms.
    pub travel_time: Duration,
    /// Longest stretch of interview work allowed between breaks.
    pub max_continuous_work: Duration,
    /// Minimum gap that counts as a break.
    pub break_length: Duration,
    /// Suppress per-applicant progress reporting.
    pub silent: bool,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            travel_time: Duration::minutes(30),
            max_continuous_work: Duration::hours(4),
            break_length: Duration::minutes(20),
            silent: true,
        }
    }
}
