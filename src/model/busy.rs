use crate::interval::TimeInterval;
use crate::{ApplicantId, InterviewerId, RoomId};

/// Who a declared busy interval belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusyOwner {
    Applicant(ApplicantId),
    Interviewer(InterviewerId),
}

/// A declared unavailability window for an applicant or an interviewer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BusyInterval {
    pub owner: BusyOwner,
    pub interval: TimeInterval,
}

/// One entry of an interviewer's busy view: when, and where if the entry is
/// an interview. `room == None` marks opaque unavailability that conflicts
/// regardless of where the competing slot is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct BusyEntry {
    pub interval: TimeInterval,
    pub room: Option<RoomId>,
}
