//! Materialized input state for one scheduling run.
//!
//! The engine never reaches into storage mid-run: it is constructed from a
//! [`Snapshot`] loaded up front, and the post-run validator re-derives its
//! own view from a snapshot so the cross-check stays independent of the
//! engine's incrementally mutated indices.

mod errors;
mod json;

pub use errors::{CommitError, SnapshotError};
pub use json::JsonScheduleStore;

use std::collections::{BTreeSet, HashMap, HashSet};

use crate::interval::TimeInterval;
use crate::model::{
    Applicant, Application, BusyEntry, BusyInterval, BusyOwner, Interviewer, Job, Room, Slot,
};
use crate::{ApplicantId, ApplicationId, InterviewerId, JobId, RoomId, SlotId};

/// Everything a scheduling run reads, loaded up front.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    pub rooms: HashMap<RoomId, Room>,
    pub applicants: HashMap<ApplicantId, Applicant>,
    pub interviewers: HashMap<InterviewerId, Interviewer>,
    pub jobs: HashMap<JobId, Job>,
    pub slots: HashMap<SlotId, Slot>,
    pub applications: Vec<Application>,
    pub busy_intervals: Vec<BusyInterval>,
}

impl Snapshot {
    /// Applications still in play, grouped by applicant: not withdrawn, not
    /// confirmed, no slot assigned yet, and the job not excluded from
    /// scheduling.
    pub fn applications_to_allocate(&self) -> HashMap<ApplicantId, Vec<&Application>> {
        let mut by_applicant: HashMap<ApplicantId, Vec<&Application>> = HashMap::new();
        for application in &self.applications {
            if !application.awaiting_slot() {
                continue;
            }
            let ignored = self.jobs.get(&application.job).map_or(true, |job| job.ignore);
            if ignored {
                continue;
            }
            by_applicant
                .entry(application.applicant)
                .or_default()
                .push(application);
        }
        by_applicant
    }

    /// Slots no application references yet; the pool the engine draws from.
    pub fn available_slots(&self) -> BTreeSet<SlotId> {
        let taken: HashSet<SlotId> = self.applications.iter().filter_map(|a| a.slot).collect();
        self.slots
            .keys()
            .copied()
            .filter(|id| !taken.contains(id))
            .collect()
    }

    /// Busy views keyed by person id.
    ///
    /// Applicants contribute plain intervals. Interviewers contribute their
    /// declared busy blocks as opaque entries (`room == None`) plus, for
    /// every slot some application already links to, an entry in that slot's
    /// room for each of its interviewers: interviewers are busy while they
    /// are interviewing.
    #[allow(clippy::type_complexity)]
    pub fn busy_times(
        &self,
    ) -> (
        HashMap<ApplicantId, BTreeSet<TimeInterval>>,
        HashMap<InterviewerId, BTreeSet<BusyEntry>>,
    ) {
        let mut applicant_busy: HashMap<ApplicantId, BTreeSet<TimeInterval>> = HashMap::new();
        let mut interviewer_busy: HashMap<InterviewerId, BTreeSet<BusyEntry>> = HashMap::new();

        for busy in &self.busy_intervals {
            match busy.owner {
                BusyOwner::Applicant(id) => {
                    applicant_busy.entry(id).or_default().insert(busy.interval);
                }
                BusyOwner::Interviewer(id) => {
                    interviewer_busy.entry(id).or_default().insert(BusyEntry {
                        interval: busy.interval,
                        room: None,
                    });
                }
            }
        }

        let assigned: HashSet<SlotId> = self.applications.iter().filter_map(|a| a.slot).collect();
        for slot_id in assigned {
            let Some(slot) = self.slots.get(&slot_id) else {
                continue;
            };
            for interviewer in &slot.interviewers {
                interviewer_busy
                    .entry(*interviewer)
                    .or_default()
                    .insert(BusyEntry {
                        interval: slot.interval,
                        room: Some(slot.room),
                    });
            }
        }

        (applicant_busy, interviewer_busy)
    }

    /// Rejects snapshots where two slots in one room overlap. Such input is
    /// corrupted and has to be cleaned up before scheduling.
    pub fn check_no_room_overlap(&self) -> Result<(), SnapshotError> {
        let mut by_room: HashMap<RoomId, Vec<&Slot>> = HashMap::new();
        for slot in self.slots.values() {
            by_room.entry(slot.room).or_default().push(slot);
        }
        for (room, mut slots) in by_room {
            slots.sort_by_key(|slot| (slot.interval, slot.id));
            for pair in slots.windows(2) {
                if pair[1].interval.start() < pair[0].interval.end() {
                    return Err(SnapshotError::OverlappingSlots {
                        room,
                        first: pair[0].id,
                        second: pair[1].id,
                    });
                }
            }
        }
        Ok(())
    }

    /// Verifies that every cross-entity reference resolves, so the engine
    /// and validator can index entity tables directly.
    pub fn check_references(&self) -> Result<(), SnapshotError> {
        for application in &self.applications {
            if !self.applicants.contains_key(&application.applicant) {
                return Err(SnapshotError::DanglingApplication {
                    application: application.id,
                    kind: "applicant",
                    id: application.applicant,
                });
            }
            if !self.jobs.contains_key(&application.job) {
                return Err(SnapshotError::DanglingApplication {
                    application: application.id,
                    kind: "job",
                    id: application.job,
                });
            }
            if let Some(slot) = application.slot {
                if !self.slots.contains_key(&slot) {
                    return Err(SnapshotError::DanglingApplication {
                        application: application.id,
                        kind: "slot",
                        id: slot,
                    });
                }
            }
        }
        for slot in self.slots.values() {
            if !self.rooms.contains_key(&slot.room) {
                return Err(SnapshotError::UnknownRoom {
                    slot: slot.id,
                    room: slot.room,
                });
            }
            for interviewer in &slot.interviewers {
                if !self.interviewers.contains_key(interviewer) {
                    return Err(SnapshotError::UnknownSlotInterviewer {
                        slot: slot.id,
                        interviewer: *interviewer,
                    });
                }
            }
        }
        for job in self.jobs.values() {
            for tier in 1..=3 {
                for interviewer in job.tier(tier) {
                    if !self.interviewers.contains_key(interviewer) {
                        return Err(SnapshotError::UnknownJobInterviewer {
                            job: job.id,
                            interviewer: *interviewer,
                        });
                    }
                }
            }
        }
        for (index, busy) in self.busy_intervals.iter().enumerate() {
            match busy.owner {
                BusyOwner::Applicant(id) if !self.applicants.contains_key(&id) => {
                    return Err(SnapshotError::UnknownBusyOwner {
                        index,
                        kind: "applicant",
                        id,
                    });
                }
                BusyOwner::Interviewer(id) if !self.interviewers.contains_key(&id) => {
                    return Err(SnapshotError::UnknownBusyOwner {
                        index,
                        kind: "interviewer",
                        id,
                    });
                }
                _ => {}
            }
        }
        Ok(())
    }
}

/// Write side of the persistence boundary.
///
/// [`Scheduler::save_scheduled_interviews`](crate::engine::Scheduler::save_scheduled_interviews)
/// drives this in a fixed order: every application of an interview is linked
/// to its slot before the slot itself is committed, so a consumer reacting
/// to the slot write observes fully linked applications.
pub trait ScheduleStore {
    /// Links one application to the slot its applicant will interview in.
    fn link_application(
        &mut self,
        application: ApplicationId,
        slot: SlotId,
    ) -> Result<(), CommitError>;

    /// Finalizes a slot with its interviewer set.
    fn commit_slot(
        &mut self,
        slot: SlotId,
        interviewers: &[InterviewerId],
    ) -> Result<(), CommitError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone, Utc};

    fn at(hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2020, 7, 12, hour, minute, 0).unwrap()
    }

    fn iv(start: (u32, u32), end: (u32, u32)) -> TimeInterval {
        TimeInterval::new(at(start.0, start.1), at(end.0, end.1))
    }

    fn base_snapshot() -> Snapshot {
        let mut snapshot = Snapshot::default();
        snapshot.rooms.insert(
            1,
            Room {
                id: 1,
                name: "storsalen".to_string(),
            },
        );
        snapshot.applicants.insert(
            1,
            Applicant {
                id: 1,
                name: "a1".to_string(),
            },
        );
        snapshot.interviewers.insert(
            10,
            Interviewer {
                id: 10,
                name: "i10".to_string(),
            },
        );
        snapshot.jobs.insert(
            1,
            Job {
                id: 1,
                title: "job 1".to_string(),
                interviewers_1: vec![10],
                interviewers_2: vec![],
                interviewers_3: vec![],
                require_priority_1: false,
                ignore: false,
            },
        );
        snapshot.slots.insert(
            1,
            Slot {
                id: 1,
                room: 1,
                interval: iv((10, 0), (10, 30)),
                interviewers: vec![],
            },
        );
        snapshot
    }

    fn application(id: ApplicationId, applicant: ApplicantId, job: JobId) -> Application {
        Application {
            id,
            applicant,
            job,
            withdrawn: false,
            confirmed: false,
            slot: None,
        }
    }

    #[test]
    fn filter_drops_settled_and_ignored_applications() {
        let mut snapshot = base_snapshot();
        snapshot.jobs.insert(
            2,
            Job {
                id: 2,
                title: "job 2".to_string(),
                interviewers_1: vec![10],
                interviewers_2: vec![],
                interviewers_3: vec![],
                require_priority_1: false,
                ignore: true,
            },
        );
        snapshot.applications = vec![
            application(1, 1, 1),
            Application {
                withdrawn: true,
                ..application(2, 1, 1)
            },
            Application {
                confirmed: true,
                ..application(3, 1, 1)
            },
            Application {
                slot: Some(1),
                ..application(4, 1, 1)
            },
            application(5, 1, 2), // ignored job
        ];

        let to_allocate = snapshot.applications_to_allocate();
        let apps = &to_allocate[&1];
        assert_eq!(apps.len(), 1);
        assert_eq!(apps[0].id, 1);
    }

    #[test]
    fn available_slots_excludes_linked_ones() {
        let mut snapshot = base_snapshot();
        snapshot.slots.insert(
            2,
            Slot {
                id: 2,
                room: 1,
                interval: iv((11, 0), (11, 30)),
                interviewers: vec![],
            },
        );
        snapshot.applications = vec![Application {
            slot: Some(1),
            ..application(1, 1, 1)
        }];

        let available = snapshot.available_slots();
        assert_eq!(available.into_iter().collect::<Vec<_>>(), vec![2]);
    }

    #[test]
    fn busy_times_split_by_owner_kind() {
        let mut snapshot = base_snapshot();
        snapshot.busy_intervals = vec![
            BusyInterval {
                owner: BusyOwner::Applicant(1),
                interval: iv((9, 0), (10, 0)),
            },
            BusyInterval {
                owner: BusyOwner::Interviewer(10),
                interval: iv((12, 0), (13, 0)),
            },
        ];

        let (applicant_busy, interviewer_busy) = snapshot.busy_times();
        assert!(applicant_busy[&1].contains(&iv((9, 0), (10, 0))));
        let entry = interviewer_busy[&10].iter().next().unwrap();
        assert_eq!(entry.room, None);
    }

    #[test]
    fn assigned_slots_make_their_interviewers_busy() {
        let mut snapshot = base_snapshot();
        snapshot.slots.get_mut(&1).unwrap().interviewers = vec![10];
        snapshot.applications = vec![Application {
            slot: Some(1),
            ..application(1, 1, 1)
        }];

        let (_, interviewer_busy) = snapshot.busy_times();
        let entry = interviewer_busy[&10].iter().next().unwrap();
        assert_eq!(entry.room, Some(1));
        assert_eq!(entry.interval, iv((10, 0), (10, 30)));
    }

    #[test]
    fn unassigned_slots_do_not_make_interviewers_busy() {
        let mut snapshot = base_snapshot();
        snapshot.slots.get_mut(&1).unwrap().interviewers = vec![10];

        let (_, interviewer_busy) = snapshot.busy_times();
        assert!(interviewer_busy.is_empty());
    }

    #[test]
    fn overlapping_slots_in_one_room_rejected() {
        let mut snapshot = base_snapshot();
        snapshot.slots.insert(
            2,
            Slot {
                id: 2,
                room: 1,
                interval: iv((10, 15), (10, 45)),
                interviewers: vec![],
            },
        );

        let err = snapshot.check_no_room_overlap().unwrap_err();
        assert!(matches!(
            err,
            SnapshotError::OverlappingSlots {
                room: 1,
                first: 1,
                second: 2
            }
        ));
    }

    #[test]
    fn overlapping_slots_in_different_rooms_accepted() {
        let mut snapshot = base_snapshot();
        snapshot.rooms.insert(
            2,
            Room {
                id: 2,
                name: "selskapssiden".to_string(),
            },
        );
        snapshot.slots.insert(
            2,
            Slot {
                id: 2,
                room: 2,
                interval: iv((10, 15), (10, 45)),
                interviewers: vec![],
            },
        );

        assert!(snapshot.check_no_room_overlap().is_ok());
    }

    #[test]
    fn dangling_application_reference_rejected() {
        let mut snapshot = base_snapshot();
        snapshot.applications = vec![application(1, 99, 1)];

        let err = snapshot.check_references().unwrap_err();
        assert!(matches!(
            err,
            SnapshotError::DanglingApplication {
                application: 1,
                kind: "applicant",
                id: 99
            }
        ));
    }

    #[test]
    fn job_with_unknown_interviewer_rejected() {
        let mut snapshot = base_snapshot();
        snapshot.jobs.get_mut(&1).unwrap().interviewers_2 = vec![77];

        let err = snapshot.check_references().unwrap_err();
        assert!(matches!(
            err,
            SnapshotError::UnknownJobInterviewer {
                job: 1,
                interviewer: 77
            }
        ));
    }
}
