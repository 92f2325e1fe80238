//! Interviewer selection honoring priority tiers.

use std::collections::BTreeSet;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;

use crate::config::SchedulerConfig;
use crate::model::{Job, Slot};
use crate::InterviewerId;

use super::busy_index::BusyIndex;

/// Loosest tier cap: the selector may descend through all three tiers.
pub(crate) const TIER_ANY: u8 = 3;

/// Picks one available interviewer for `job` on `slot`, trying tiers
/// `1..=tier_cap` in order. Inside each tier the pool is walked in a seeded
/// random permutation to even out interview load.
///
/// The cap is explicit: a job that must field a priority-1 interviewer is
/// expressed as `tier_cap == 1`, never by aborting a tier scan early.
pub(crate) fn pick_interviewer(
    rng: &mut StdRng,
    busy: &BusyIndex,
    config: &SchedulerConfig,
    job: &Job,
    slot: &Slot,
    taken: &BTreeSet<InterviewerId>,
    tier_cap: u8,
) -> Option<InterviewerId> {
    for tier in 1..=tier_cap {
        let mut pool: Vec<InterviewerId> = job.tier(tier).to_vec();
        pool.shuffle(rng);
        for interviewer in pool {
            if !taken.contains(&interviewer)
                && busy.interviewer_is_available(interviewer, slot, config)
            {
                return Some(interviewer);
            }
        }
    }
    None
}

/// Assembles the interviewer set for one slot: one pick per job, priority-1
/// jobs capped to tier 1, at least two distinct people overall.
///
/// A lone job still gets a second pair of eyes: when the per-job picks
/// leave fewer than two interviewers, one more distinct interviewer is
/// recruited, trying the jobs in random order with the same per-job caps.
pub(crate) fn pick_interviewers(
    rng: &mut StdRng,
    busy: &BusyIndex,
    config: &SchedulerConfig,
    jobs: &[&Job],
    slot: &Slot,
    tier_cap: u8,
) -> Option<BTreeSet<InterviewerId>> {
    let mut interviewers = BTreeSet::new();
    for job in jobs {
        let cap = if job.require_priority_1 { 1 } else { tier_cap };
        let picked = pick_interviewer(rng, busy, config, job, slot, &interviewers, cap)?;
        interviewers.insert(picked);
    }
    if interviewers.len() >= 2 {
        return Some(interviewers);
    }
    let mut shuffled: Vec<&Job> = jobs.to_vec();
    shuffled.shuffle(rng);
    for job in shuffled {
        let cap = if job.require_priority_1 { 1 } else { tier_cap };
        if let Some(extra) = pick_interviewer(rng, busy, config, job, slot, &interviewers, cap) {
            interviewers.insert(extra);
            return Some(interviewers);
        }
    }
    None
}
