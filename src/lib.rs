//! bips - Automated interview scheduling for an admission round.
//!
//! A constraint-satisfying assignment engine: applicants with one or more
//! job applications are placed into pre-generated room/time slots together
//! with a set of interviewers per interview, honoring busy intervals,
//! priority tiers, travel time between rooms and the continuous-work limit.

pub mod config;
pub mod engine;
pub mod interval;
pub mod model;
pub mod snapshot;
pub mod validate;

// Re-export what a caller needs to run a round end to end
pub use config::SchedulerConfig;
pub use engine::{RunReport, Scheduler};
pub use snapshot::Snapshot;

/// Identifier of an applicant.
pub type ApplicantId = u64;

/// Identifier of an interviewer.
pub type InterviewerId = u64;

/// Identifier of a room.
pub type RoomId = u64;

/// Identifier of a job.
pub type JobId = u64;

/// Identifier of an interview slot.
pub type SlotId = u64;

/// Identifier of an application.
pub type ApplicationId = u64;
