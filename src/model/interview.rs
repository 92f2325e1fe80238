use std::collections::BTreeSet;

use crate::{ApplicantId, InterviewerId, SlotId};

/// The engine's output tuple: one applicant meeting a set of interviewers
/// in one slot.
///
/// The interviewer set is ordered so two runs with the same seed and input
/// produce byte-identical lists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Interview {
    pub applicant: ApplicantId,
    pub interviewers: BTreeSet<InterviewerId>,
    pub slot: SlotId,
}
