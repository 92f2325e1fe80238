use thiserror::Error;

use crate::{ApplicationId, InterviewerId, JobId, RoomId, SlotId};

/// Input-side failures: the snapshot cannot be scheduled against.
///
/// All of these abort the run before any scheduling work happens.
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("could not read snapshot: {0}")]
    Io(#[from] std::io::Error),

    #[error("could not parse snapshot: {0}")]
    Parse(#[from] serde_json::Error),

    /// Someone added overlapping interview slots for the same room; this
    /// has to be cleaned up by hand before the scheduler can run.
    #[error("room {room} has overlapping slots {first} and {second}")]
    OverlappingSlots {
        room: RoomId,
        first: SlotId,
        second: SlotId,
    },

    #[error("duplicate {kind} id {id}")]
    DuplicateId { kind: &'static str, id: u64 },

    #[error("slot {slot} ends before it starts")]
    InvalidSlotTimes { slot: SlotId },

    #[error("busy interval {index} ends before it begins")]
    InvalidBusyTimes { index: usize },

    #[error("busy interval {index} names neither an applicant nor an interviewer")]
    BusyWithoutOwner { index: usize },

    #[error("busy interval {index} names both an applicant and an interviewer")]
    BusyWithTwoOwners { index: usize },

    #[error("application {application} references unknown {kind} {id}")]
    DanglingApplication {
        application: ApplicationId,
        kind: &'static str,
        id: u64,
    },

    #[error("slot {slot} references unknown room {room}")]
    UnknownRoom { slot: SlotId, room: RoomId },

    #[error("slot {slot} lists unknown interviewer {interviewer}")]
    UnknownSlotInterviewer {
        slot: SlotId,
        interviewer: InterviewerId,
    },

    #[error("job {job} lists unknown interviewer {interviewer}")]
    UnknownJobInterviewer {
        job: JobId,
        interviewer: InterviewerId,
    },

    #[error("busy interval {index} belongs to unknown {kind} {id}")]
    UnknownBusyOwner {
        index: usize,
        kind: &'static str,
        id: u64,
    },
}

/// A persistence failure while writing the schedule back. The in-memory
/// assignment list survives, so the operator may retry the save.
#[derive(Debug, Error)]
#[error("could not persist schedule: {0}")]
pub struct CommitError(pub String);

impl From<std::io::Error> for CommitError {
    fn from(err: std::io::Error) -> Self {
        CommitError(err.to_string())
    }
}

impl From<serde_json::Error> for CommitError {
    fn from(err: serde_json::Error) -> Self {
        CommitError(err.to_string())
    }
}
