//! Two-pass interview scheduling engine.
//!
//! Pass 1 fills slots greedily, trying each applicant at tightening
//! priority-tier caps. Pass 2 retries the still-unallocated applicants by
//! taking over an existing interview when its previous holder can be
//! re-homed elsewhere; the displacement is strictly one level deep.

mod busy_index;
pub(crate) mod breaks;
mod report;
mod selector;

pub use busy_index::BusyIndex;
pub use report::RunReport;


use std::collections::{BTreeSet, HashMap};

use log::info;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::config::SchedulerConfig;
use crate::model::{Interview, Job};
use crate::snapshot::{CommitError, ScheduleStore, Snapshot, SnapshotError};
use crate::validate::{self, ValidationError};
use crate::{ApplicantId, ApplicationId, InterviewerId, JobId, SlotId};

/// The scheduling engine: owns the busy views, the pool of free slots and
/// the assignment list for the duration of one single-threaded run.
#[derive(Debug)]
pub struct Scheduler {
    config: SchedulerConfig,
    snapshot: Snapshot,
    busy: BusyIndex,
    available_slots: BTreeSet<SlotId>,
    applications: HashMap<ApplicantId, Vec<ApplicationId>>,
    applied_jobs: HashMap<ApplicantId, Vec<JobId>>,
    unallocated: BTreeSet<ApplicantId>,
    interviews: Vec<Interview>,
    rng: StdRng,
}

impl Scheduler {
    /// Builds the engine from a snapshot: checks the input, materializes
    /// the busy views and the free-slot pool, and seeds the RNG.
    ///
    /// Fails on corrupted input (overlapping slots in one room, broken
    /// references) before any scheduling work happens.
    pub fn new(snapshot: Snapshot, config: SchedulerConfig) -> Result<Self, SnapshotError> {
        snapshot.check_references()?;
        snapshot.check_no_room_overlap()?;

        let (applicant_busy, interviewer_busy) = snapshot.busy_times();
        let busy = BusyIndex::new(applicant_busy, interviewer_busy);
        let available_slots = snapshot.available_slots();

        let mut applications: HashMap<ApplicantId, Vec<ApplicationId>> = HashMap::new();
        let mut applied_jobs: HashMap<ApplicantId, Vec<JobId>> = HashMap::new();
        for (applicant, apps) in snapshot.applications_to_allocate() {
            applications.insert(applicant, apps.iter().map(|a| a.id).collect());
            applied_jobs.insert(applicant, apps.iter().map(|a| a.job).collect());
        }
        let unallocated = applications.keys().copied().collect();

        let rng = StdRng::seed_from_u64(config.seed);
        Ok(Self {
            config,
            snapshot,
            busy,
            available_slots,
            applications,
            applied_jobs,
            unallocated,
            interviews: Vec::new(),
            rng,
        })
    }

    /// The assignment list, in the order interviews were booked.
    pub fn interviews(&self) -> &[Interview] {
        &self.interviews
    }

    /// Applicants that have not been placed (yet).
    pub fn unallocated_applicants(&self) -> &BTreeSet<ApplicantId> {
        &self.unallocated
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    /// Runs both passes, then re-checks every global invariant against a
    /// fresh derivation from the snapshot.
    ///
    /// Failing to place an applicant is a reported outcome, not an error;
    /// the `Err` case means the produced list violates an invariant, which
    /// is an engine bug or an input anomaly the pre-run checks missed.
    pub fn schedule(&mut self) -> Result<(), ValidationError> {
        // Pass 1: prefer an all-priority-1 panel and loosen the cap only
        // when the applicant cannot be placed at all.
        let to_allocate: Vec<ApplicantId> = self.unallocated.iter().copied().collect();
        let total = to_allocate.len();
        for (done, applicant) in to_allocate.into_iter().enumerate() {
            for tier_cap in 1..=selector::TIER_ANY {
                if self.create_interview(applicant, tier_cap) {
                    break;
                }
            }
            if !self.config.silent {
                info!("pass 1/2: {} of {total} applicants", done + 1);
            }
        }

        // Pass 2: one-step swaps for whoever is left.
        let to_allocate: Vec<ApplicantId> = self.unallocated.iter().copied().collect();
        let total = to_allocate.len();
        for (done, applicant) in to_allocate.into_iter().enumerate() {
            self.take_interview_and_reschedule(applicant);
            if !self.config.silent {
                info!("pass 2/2: {} of {total} applicants", done + 1);
            }
        }

        validate::check_interviews(&self.interviews, &self.snapshot, &self.config)
    }

    /// Books `slot` for `applicant` with `interviewers`, appending to the
    /// assignment list, or inserting at `index` when a swap restores a
    /// previously removed interview at its original position.
    ///
    /// # Panics
    ///
    /// Panics if the applicant was not awaiting allocation, the slot was
    /// not free, or an interviewer is already booked for the slot. All of
    /// these are engine bugs, not input conditions.
    fn add_interview(
        &mut self,
        applicant: ApplicantId,
        interviewers: BTreeSet<InterviewerId>,
        slot_id: SlotId,
        index: Option<usize>,
    ) {
        let slot = &self.snapshot.slots[&slot_id];
        for interviewer in &interviewers {
            self.busy.occupy(*interviewer, slot);
        }
        let was_unallocated = self.unallocated.remove(&applicant);
        assert!(
            was_unallocated,
            "applicant {applicant} was not awaiting allocation"
        );
        let was_free = self.available_slots.remove(&slot_id);
        assert!(was_free, "slot {slot_id} was not in the available pool");

        let interview = Interview {
            applicant,
            interviewers,
            slot: slot_id,
        };
        match index {
            Some(index) => self.interviews.insert(index, interview),
            None => self.interviews.push(interview),
        }
    }

    /// Reverses [`add_interview`](Self::add_interview) for the entry at
    /// `index`, returning it so a swap can restore it later.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds or the bookkeeping disagrees with
    /// the entry, both engine bugs.
    fn remove_interview(&mut self, index: usize) -> Interview {
        let interview = self.interviews.remove(index);
        let slot = &self.snapshot.slots[&interview.slot];
        for interviewer in &interview.interviewers {
            self.busy.release(*interviewer, slot);
        }
        let newly_unallocated = self.unallocated.insert(interview.applicant);
        assert!(
            newly_unallocated,
            "applicant {} was not allocated",
            interview.applicant
        );
        let newly_free = self.available_slots.insert(interview.slot);
        assert!(newly_free, "slot {} was already free", interview.slot);
        interview
    }

    /// Tries to place `applicant` in the first workable slot, walking the
    /// pool ordered by `(room, start)` so early slots in each room fill up
    /// first. The pool mutates between calls, so the order is rebuilt on
    /// every call.
    fn create_interview(&mut self, applicant: ApplicantId, tier_cap: u8) -> bool {
        let mut pool: Vec<SlotId> = self.available_slots.iter().copied().collect();
        pool.sort_by_key(|id| {
            let slot = &self.snapshot.slots[id];
            (slot.room, slot.interval.start(), *id)
        });

        for slot_id in pool {
            let slot = &self.snapshot.slots[&slot_id];
            if !self.busy.applicant_is_available(applicant, slot) {
                continue;
            }
            let jobs: Vec<&Job> = self.applied_jobs[&applicant]
                .iter()
                .map(|job| &self.snapshot.jobs[job])
                .collect();
            let picked = selector::pick_interviewers(
                &mut self.rng,
                &self.busy,
                &self.config,
                &jobs,
                slot,
                tier_cap,
            );
            if let Some(interviewers) = picked {
                self.add_interview(applicant, interviewers, slot_id, None);
                return true;
            }
        }
        false
    }

    /// One-step swap: lets `applicant` take over an existing interview if a
    /// fresh interviewer set can be found for it and the displaced
    /// applicant can be re-homed through [`create_interview`]. The
    /// displaced applicant never displaces anyone in turn.
    ///
    /// On any failure the original interview is restored at its original
    /// index, so subsequent indexed operations see the pre-swap state.
    fn take_interview_and_reschedule(&mut self, applicant: ApplicantId) -> bool {
        for index in 0..self.interviews.len() {
            let slot_id = self.interviews[index].slot;
            if !self
                .busy
                .applicant_is_available(applicant, &self.snapshot.slots[&slot_id])
            {
                continue;
            }

            let displaced = self.remove_interview(index);
            let jobs: Vec<&Job> = self.applied_jobs[&applicant]
                .iter()
                .map(|job| &self.snapshot.jobs[job])
                .collect();
            let picked = selector::pick_interviewers(
                &mut self.rng,
                &self.busy,
                &self.config,
                &jobs,
                &self.snapshot.slots[&slot_id],
                selector::TIER_ANY,
            );
            if let Some(interviewers) = picked {
                self.add_interview(applicant, interviewers, slot_id, None);
                if self.create_interview(displaced.applicant, selector::TIER_ANY) {
                    return true;
                }
                let last = self.interviews.len() - 1;
                self.remove_interview(last);
            }
            self.add_interview(
                displaced.applicant,
                displaced.interviewers,
                displaced.slot,
                Some(index),
            );
        }
        false
    }

    /// Writes the assignment list through `store`.
    ///
    /// For each interview, every surviving application of the applicant is
    /// linked to the slot before the slot itself is committed with its
    /// interviewer set, so a consumer reacting to the slot write observes
    /// fully linked applications.
    pub fn save_scheduled_interviews<S: ScheduleStore>(
        &self,
        store: &mut S,
    ) -> Result<(), CommitError> {
        for interview in &self.interviews {
            for application in &self.applications[&interview.applicant] {
                store.link_application(*application, interview.slot)?;
            }
            let interviewers: Vec<InterviewerId> = interview.interviewers.iter().copied().collect();
            store.commit_slot(interview.slot, &interviewers)?;
        }
        Ok(())
    }
}
