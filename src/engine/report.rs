//! Run summary for the operator.

use std::cmp::Reverse;
use std::collections::HashMap;

use crate::InterviewerId;

use super::Scheduler;

/// What one run produced, aggregated for the operator printout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    /// Interviews in the final assignment list.
    pub interviews_scheduled: usize,
    /// Applicants that got an interview.
    pub applicants_allocated: usize,
    /// Applicants that were up for allocation.
    pub applicants_total: usize,
    /// Interviews where some applied job had no priority-1 interviewer
    /// present. Jobs that require one always have one, so this counts the
    /// optional misses.
    pub interviews_missing_priority_1: usize,
    /// Interviewers above the load threshold, heaviest first.
    pub busiest_interviewers: Vec<(InterviewerId, usize)>,
}

impl Scheduler {
    /// Aggregates the run, listing every interviewer with more than
    /// `load_threshold` interviews.
    pub fn report(&self, load_threshold: usize) -> RunReport {
        let interviews_missing_priority_1 = self
            .interviews
            .iter()
            .filter(|interview| {
                self.applied_jobs[&interview.applicant].iter().any(|job| {
                    let job = &self.snapshot.jobs[job];
                    !interview
                        .interviewers
                        .iter()
                        .any(|interviewer| job.is_priority_1(*interviewer))
                })
            })
            .count();

        let mut load: HashMap<InterviewerId, usize> = HashMap::new();
        for interview in &self.interviews {
            for interviewer in &interview.interviewers {
                *load.entry(*interviewer).or_default() += 1;
            }
        }
        let mut busiest_interviewers: Vec<(InterviewerId, usize)> = load
            .into_iter()
            .filter(|(_, count)| *count > load_threshold)
            .collect();
        busiest_interviewers.sort_by_key(|(id, count)| (Reverse(*count), *id));

        RunReport {
            interviews_scheduled: self.interviews.len(),
            applicants_allocated: self.applied_jobs.len() - self.unallocated.len(),
            applicants_total: self.applied_jobs.len(),
            interviews_missing_priority_1,
            busiest_interviewers,
        }
    }
}
