use thiserror::Error;

use crate::{ApplicantId, InterviewerId, JobId, SlotId};

/// A global invariant the produced assignment list violates.
///
/// Any of these means an engine bug or an input anomaly the pre-run checks
/// did not cover, never a benign scheduling miss.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("interview for applicant {applicant} has {count} interviewers, want 2 or 3")]
    InterviewerCount { applicant: ApplicantId, count: usize },

    #[error("no interviewer on applicant {applicant}'s interview can cover job {job}")]
    JobNotCovered { applicant: ApplicantId, job: JobId },

    #[error("job {job} requires a priority-1 interviewer and applicant {applicant}'s interview has none")]
    MissingPriority1 { applicant: ApplicantId, job: JobId },

    #[error("applicant {applicant} has a busy interval overlapping slot {slot}")]
    ApplicantBusy { applicant: ApplicantId, slot: SlotId },

    #[error("interviewer {interviewer} has a conflicting busy interval for slot {slot}")]
    InterviewerBusy {
        interviewer: InterviewerId,
        slot: SlotId,
    },

    #[error("slot {slot} backs more than one interview")]
    SlotReused { slot: SlotId },

    #[error("applicant {applicant} is scheduled more than once")]
    ApplicantReused { applicant: ApplicantId },

    #[error("interviewer {interviewer} has overlapping interviews")]
    OverlappingInterviews { interviewer: InterviewerId },

    #[error("interviewer {interviewer} has consecutive interviews in different rooms closer than the travel buffer")]
    InsufficientTravelTime { interviewer: InterviewerId },

    #[error("interviewer {interviewer} would work past the continuous-work limit")]
    InsufficientBreaks { interviewer: InterviewerId },
}
