use crate::{InterviewerId, JobId};

/// Highest priority tier ordinal; tiers run `1..=TIER_COUNT`.
pub(crate) const TIER_COUNT: u8 = 3;

/// A role applicants apply for, with its eligible interviewers partitioned
/// into three priority tiers (lower ordinal is preferred).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    pub id: JobId,
    pub title: String,
    /// Priority-1 interviewers, the most preferred pool.
    pub interviewers_1: Vec<InterviewerId>,
    pub interviewers_2: Vec<InterviewerId>,
    pub interviewers_3: Vec<InterviewerId>,
    /// At least one priority-1 interviewer must sit on every interview
    /// covering this job.
    pub require_priority_1: bool,
    /// Excluded from automatic scheduling, e.g. because the group runs its
    /// own interviews.
    pub ignore: bool,
}

impl Job {
    /// The eligible interviewers at `tier`.
    ///
    /// # Panics
    ///
    /// Panics if `tier` is not in `1..=3`.
    pub fn tier(&self, tier: u8) -> &[InterviewerId] {
        match tier {
            1 => &self.interviewers_1,
            2 => &self.interviewers_2,
            3 => &self.interviewers_3,
            _ => panic!("priority tier out of range: {tier}"),
        }
    }

    /// True if `interviewer` appears in any tier.
    pub fn is_eligible(&self, interviewer: InterviewerId) -> bool {
        (1..=TIER_COUNT).any(|tier| self.tier(tier).contains(&interviewer))
    }

    /// True if `interviewer` is in the priority-1 pool.
    pub fn is_priority_1(&self, interviewer: InterviewerId) -> bool {
        self.interviewers_1.contains(&interviewer)
    }

    /// Sorts and dedups every tier so downstream seeded shuffles start from
    /// a canonical order and runs reproduce.
    pub(crate) fn canonicalize(&mut self) {
        for tier in [
            &mut self.interviewers_1,
            &mut self.interviewers_2,
            &mut self.interviewers_3,
        ] {
            tier.sort_unstable();
            tier.dedup();
        }
    }
}
