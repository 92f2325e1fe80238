//! Post-run invariant checks.
//!
//! The validator re-derives the busy views from a snapshot instead of
//! trusting the engine's incrementally mutated copy; a disagreement between
//! the two is exactly what it exists to catch. It can run on the engine's
//! own snapshot or on an independently re-loaded one.

mod errors;

pub use errors::ValidationError;

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use crate::config::SchedulerConfig;
use crate::engine::breaks;
use crate::interval::TimeInterval;
use crate::model::{Application, BusyEntry, Interview};
use crate::snapshot::Snapshot;
use crate::{ApplicantId, InterviewerId, RoomId, SlotId};

/// Checks every global invariant on `interviews` against `snapshot`,
/// reporting the first violation found.
pub fn check_interviews(
    interviews: &[Interview],
    snapshot: &Snapshot,
    config: &SchedulerConfig,
) -> Result<(), ValidationError> {
    let (applicant_busy, interviewer_busy) = snapshot.busy_times();
    let applications = snapshot.applications_to_allocate();

    check_interviewer_count(interviews)?;
    check_applied_jobs_covered(interviews, &applications, snapshot)?;
    check_priority_1_present(interviews, &applications, snapshot)?;
    check_applicants_free(interviews, &applicant_busy, snapshot)?;
    check_interviewers_free(interviews, &interviewer_busy, snapshot, config)?;
    check_slots_unique(interviews)?;
    check_applicants_unique(interviews)?;
    check_interviewer_non_overlap(interviews, snapshot)?;
    check_travel_and_breaks(interviews, &interviewer_busy, snapshot, config)?;
    Ok(())
}

fn applications_of<'a>(
    applications: &'a HashMap<ApplicantId, Vec<&'a Application>>,
    applicant: ApplicantId,
) -> &'a [&'a Application] {
    applications
        .get(&applicant)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

fn check_interviewer_count(interviews: &[Interview]) -> Result<(), ValidationError> {
    for interview in interviews {
        let count = interview.interviewers.len();
        if !(2..=3).contains(&count) {
            return Err(ValidationError::InterviewerCount {
                applicant: interview.applicant,
                count,
            });
        }
    }
    Ok(())
}

fn check_applied_jobs_covered(
    interviews: &[Interview],
    applications: &HashMap<ApplicantId, Vec<&Application>>,
    snapshot: &Snapshot,
) -> Result<(), ValidationError> {
    for interview in interviews {
        for application in applications_of(applications, interview.applicant) {
            let job = &snapshot.jobs[&application.job];
            let covered = interview
                .interviewers
                .iter()
                .any(|interviewer| job.is_eligible(*interviewer));
            if !covered {
                return Err(ValidationError::JobNotCovered {
                    applicant: interview.applicant,
                    job: job.id,
                });
            }
        }
    }
    Ok(())
}

fn check_priority_1_present(
    interviews: &[Interview],
    applications: &HashMap<ApplicantId, Vec<&Application>>,
    snapshot: &Snapshot,
) -> Result<(), ValidationError> {
    for interview in interviews {
        for application in applications_of(applications, interview.applicant) {
            let job = &snapshot.jobs[&application.job];
            if !job.require_priority_1 {
                continue;
            }
            let present = interview
                .interviewers
                .iter()
                .any(|interviewer| job.is_priority_1(*interviewer));
            if !present {
                return Err(ValidationError::MissingPriority1 {
                    applicant: interview.applicant,
                    job: job.id,
                });
            }
        }
    }
    Ok(())
}

fn check_applicants_free(
    interviews: &[Interview],
    applicant_busy: &HashMap<ApplicantId, BTreeSet<TimeInterval>>,
    snapshot: &Snapshot,
) -> Result<(), ValidationError> {
    for interview in interviews {
        let slot = &snapshot.slots[&interview.slot];
        let busy = applicant_busy.get(&interview.applicant);
        for interval in busy.into_iter().flatten() {
            if interval.overlaps(&slot.interval) {
                return Err(ValidationError::ApplicantBusy {
                    applicant: interview.applicant,
                    slot: slot.id,
                });
            }
        }
    }
    Ok(())
}

/// Room-aware freedom: a busy entry in the slot's room, or with no room at
/// all, conflicts on plain overlap; an entry in a different room conflicts
/// inside the travel buffer as well.
fn check_interviewers_free(
    interviews: &[Interview],
    interviewer_busy: &HashMap<InterviewerId, BTreeSet<BusyEntry>>,
    snapshot: &Snapshot,
    config: &SchedulerConfig,
) -> Result<(), ValidationError> {
    for interview in interviews {
        let slot = &snapshot.slots[&interview.slot];
        for interviewer in &interview.interviewers {
            let entries = interviewer_busy.get(interviewer);
            for entry in entries.into_iter().flatten() {
                let conflict = match entry.room {
                    Some(room) if room != slot.room => entry
                        .interval
                        .overlaps_with_buffer(&slot.interval, config.travel_time),
                    _ => entry.interval.overlaps(&slot.interval),
                };
                if conflict {
                    return Err(ValidationError::InterviewerBusy {
                        interviewer: *interviewer,
                        slot: slot.id,
                    });
                }
            }
        }
    }
    Ok(())
}

fn check_slots_unique(interviews: &[Interview]) -> Result<(), ValidationError> {
    let mut seen: HashSet<SlotId> = HashSet::new();
    for interview in interviews {
        if !seen.insert(interview.slot) {
            return Err(ValidationError::SlotReused {
                slot: interview.slot,
            });
        }
    }
    Ok(())
}

fn check_applicants_unique(interviews: &[Interview]) -> Result<(), ValidationError> {
    let mut seen: HashSet<ApplicantId> = HashSet::new();
    for interview in interviews {
        if !seen.insert(interview.applicant) {
            return Err(ValidationError::ApplicantReused {
                applicant: interview.applicant,
            });
        }
    }
    Ok(())
}

fn check_interviewer_non_overlap(
    interviews: &[Interview],
    snapshot: &Snapshot,
) -> Result<(), ValidationError> {
    let mut by_interviewer: HashMap<InterviewerId, Vec<TimeInterval>> = HashMap::new();
    for interview in interviews {
        let slot = &snapshot.slots[&interview.slot];
        for interviewer in &interview.interviewers {
            by_interviewer
                .entry(*interviewer)
                .or_default()
                .push(slot.interval);
        }
    }
    for (interviewer, mut intervals) in by_interviewer {
        intervals.sort_unstable();
        for pair in intervals.windows(2) {
            if pair[1].start() < pair[0].end() {
                return Err(ValidationError::OverlappingInterviews { interviewer });
            }
        }
    }
    Ok(())
}

/// Per-interviewer timeline entry: the interview's interval and room, and
/// whether it pre-existed the run (came from the snapshot's busy view
/// rather than the produced list).
type TimelineEntry = (TimeInterval, RoomId, bool);

fn check_travel_and_breaks(
    interviews: &[Interview],
    interviewer_busy: &HashMap<InterviewerId, BTreeSet<BusyEntry>>,
    snapshot: &Snapshot,
    config: &SchedulerConfig,
) -> Result<(), ValidationError> {
    let mut timelines: BTreeMap<InterviewerId, Vec<TimelineEntry>> = BTreeMap::new();
    for interview in interviews {
        let slot = &snapshot.slots[&interview.slot];
        for interviewer in &interview.interviewers {
            timelines
                .entry(*interviewer)
                .or_default()
                .push((slot.interval, slot.room, false));
        }
    }
    // Opaque busy blocks are not interviews and stay out of the timeline;
    // previously assigned slots join it as pre-existing interviews.
    for (interviewer, entries) in interviewer_busy {
        for entry in entries {
            if let Some(room) = entry.room {
                timelines
                    .entry(*interviewer)
                    .or_default()
                    .push((entry.interval, room, true));
            }
        }
    }

    for (interviewer, mut timeline) in timelines {
        timeline.sort_unstable();

        for pair in timeline.windows(2) {
            let (first, second) = (pair[0], pair[1]);
            if first.2 && second.2 {
                // Both pre-existing; whoever booked them by hand vouched
                // for the travel.
                continue;
            }
            if first.1 == second.1 {
                continue;
            }
            if first.0.end() + config.travel_time > second.0.start() {
                return Err(ValidationError::InsufficientTravelTime { interviewer });
            }
        }

        let work: Vec<TimeInterval> = timeline.iter().map(|entry| entry.0).collect();
        if !breaks::stretches_within_limit(&work, config.max_continuous_work, config.break_length)
        {
            return Err(ValidationError::InsufficientBreaks { interviewer });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone, Utc};

    use crate::model::{Applicant, Interviewer, Job, Room, Slot};
    use crate::{ApplicationId, JobId};

    fn at(hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2020, 7, 12, hour, minute, 0).unwrap()
    }

    fn iv(start: (u32, u32), end: (u32, u32)) -> TimeInterval {
        TimeInterval::new(at(start.0, start.1), at(end.0, end.1))
    }

    fn interview(applicant: ApplicantId, interviewers: &[InterviewerId], slot: SlotId) -> Interview {
        Interview {
            applicant,
            interviewers: interviewers.iter().copied().collect(),
            slot,
        }
    }

    /// A snapshot with rooms 1..=2, interviewers 10..=19, applicants
    /// 1..=9 and one job (id 1) with every interviewer at priority 1.
    fn base_snapshot() -> Snapshot {
        let mut snapshot = Snapshot::default();
        for id in 1..=2 {
            snapshot.rooms.insert(
                id,
                Room {
                    id,
                    name: format!("room {id}"),
                },
            );
        }
        for id in 10..=19 {
            snapshot.interviewers.insert(
                id,
                Interviewer {
                    id,
                    name: format!("interviewer {id}"),
                },
            );
        }
        for id in 1..=9 {
            snapshot.applicants.insert(
                id,
                Applicant {
                    id,
                    name: format!("applicant {id}"),
                },
            );
        }
        snapshot.jobs.insert(
            1,
            Job {
                id: 1,
                title: "job 1".to_string(),
                interviewers_1: (10..=19).collect(),
                interviewers_2: vec![],
                interviewers_3: vec![],
                require_priority_1: false,
                ignore: false,
            },
        );
        snapshot
    }

    fn add_slot(snapshot: &mut Snapshot, id: SlotId, room: u64, start: (u32, u32), end: (u32, u32)) {
        snapshot.slots.insert(
            id,
            Slot {
                id,
                room,
                interval: iv(start, end),
                interviewers: vec![],
            },
        );
    }

    fn add_application(snapshot: &mut Snapshot, applicant: ApplicantId, job: JobId) {
        let id = snapshot.applications.len() as ApplicationId + 1;
        snapshot.applications.push(Application {
            id,
            applicant,
            job,
            withdrawn: false,
            confirmed: false,
            slot: None,
        });
    }

    fn check(interviews: &[Interview], snapshot: &Snapshot) -> Result<(), ValidationError> {
        check_interviews(interviews, snapshot, &SchedulerConfig::default())
    }

    #[test]
    fn valid_list_passes() {
        let mut snapshot = base_snapshot();
        add_slot(&mut snapshot, 1, 1, (10, 0), (10, 30));
        add_application(&mut snapshot, 1, 1);

        assert!(check(&[interview(1, &[10, 11], 1)], &snapshot).is_ok());
    }

    #[test]
    fn empty_list_passes() {
        assert!(check(&[], &base_snapshot()).is_ok());
    }

    #[test]
    fn one_interviewer_is_too_few() {
        let mut snapshot = base_snapshot();
        add_slot(&mut snapshot, 1, 1, (10, 0), (10, 30));
        add_application(&mut snapshot, 1, 1);

        let err = check(&[interview(1, &[10], 1)], &snapshot).unwrap_err();
        assert_eq!(
            err,
            ValidationError::InterviewerCount {
                applicant: 1,
                count: 1
            }
        );
    }

    #[test]
    fn panel_must_cover_every_applied_job() {
        let mut snapshot = base_snapshot();
        add_slot(&mut snapshot, 1, 1, (10, 0), (10, 30));
        add_application(&mut snapshot, 1, 1);
        snapshot.jobs.insert(
            2,
            Job {
                id: 2,
                title: "job 2".to_string(),
                interviewers_1: vec![19],
                interviewers_2: vec![],
                interviewers_3: vec![],
                require_priority_1: false,
                ignore: false,
            },
        );
        add_application(&mut snapshot, 1, 2);

        let err = check(&[interview(1, &[10, 11], 1)], &snapshot).unwrap_err();
        assert_eq!(
            err,
            ValidationError::JobNotCovered {
                applicant: 1,
                job: 2
            }
        );
    }

    #[test]
    fn required_priority_1_must_be_present() {
        let mut snapshot = base_snapshot();
        add_slot(&mut snapshot, 1, 1, (10, 0), (10, 30));
        let job = snapshot.jobs.get_mut(&1).unwrap();
        job.require_priority_1 = true;
        job.interviewers_1 = vec![19];
        job.interviewers_2 = (10..=18).collect();
        add_application(&mut snapshot, 1, 1);

        let err = check(&[interview(1, &[10, 11], 1)], &snapshot).unwrap_err();
        assert_eq!(
            err,
            ValidationError::MissingPriority1 {
                applicant: 1,
                job: 1
            }
        );
    }

    #[test]
    fn applicant_must_be_free() {
        let mut snapshot = base_snapshot();
        add_slot(&mut snapshot, 1, 1, (10, 0), (10, 30));
        add_application(&mut snapshot, 1, 1);
        snapshot.busy_intervals.push(crate::model::BusyInterval {
            owner: crate::model::BusyOwner::Applicant(1),
            interval: iv((10, 0), (11, 0)),
        });

        let err = check(&[interview(1, &[10, 11], 1)], &snapshot).unwrap_err();
        assert_eq!(err, ValidationError::ApplicantBusy { applicant: 1, slot: 1 });
    }

    #[test]
    fn interviewer_must_be_free() {
        let mut snapshot = base_snapshot();
        add_slot(&mut snapshot, 1, 1, (10, 0), (10, 30));
        add_application(&mut snapshot, 1, 1);
        snapshot.busy_intervals.push(crate::model::BusyInterval {
            owner: crate::model::BusyOwner::Interviewer(10),
            interval: iv((10, 15), (10, 45)),
        });

        let err = check(&[interview(1, &[10, 11], 1)], &snapshot).unwrap_err();
        assert_eq!(
            err,
            ValidationError::InterviewerBusy {
                interviewer: 10,
                slot: 1
            }
        );
    }

    #[test]
    fn interviewer_freedom_is_room_aware() {
        // A pre-existing interview in another room 15 minutes before the
        // slot conflicts through the travel buffer.
        let mut snapshot = base_snapshot();
        add_slot(&mut snapshot, 1, 1, (11, 0), (11, 30));
        add_slot(&mut snapshot, 2, 2, (10, 15), (10, 45));
        snapshot.slots.get_mut(&2).unwrap().interviewers = vec![10];
        add_application(&mut snapshot, 1, 1);
        add_application(&mut snapshot, 2, 1);
        snapshot.applications[1].slot = Some(2);

        let err = check(&[interview(1, &[10, 11], 1)], &snapshot).unwrap_err();
        assert_eq!(
            err,
            ValidationError::InterviewerBusy {
                interviewer: 10,
                slot: 1
            }
        );
    }

    #[test]
    fn slots_back_at_most_one_interview() {
        let mut snapshot = base_snapshot();
        add_slot(&mut snapshot, 1, 1, (10, 0), (10, 30));
        add_application(&mut snapshot, 1, 1);
        add_application(&mut snapshot, 2, 1);

        let list = [interview(1, &[10, 11], 1), interview(2, &[12, 13], 1)];
        let err = check(&list, &snapshot).unwrap_err();
        assert_eq!(err, ValidationError::SlotReused { slot: 1 });
    }

    #[test]
    fn applicants_are_scheduled_at_most_once() {
        let mut snapshot = base_snapshot();
        add_slot(&mut snapshot, 1, 1, (10, 0), (10, 30));
        add_slot(&mut snapshot, 2, 1, (11, 0), (11, 30));
        add_application(&mut snapshot, 1, 1);

        let list = [interview(1, &[10, 11], 1), interview(1, &[12, 13], 2)];
        let err = check(&list, &snapshot).unwrap_err();
        assert_eq!(err, ValidationError::ApplicantReused { applicant: 1 });
    }

    #[test]
    fn interviewer_interviews_must_not_overlap() {
        let mut snapshot = base_snapshot();
        add_slot(&mut snapshot, 1, 1, (10, 0), (10, 30));
        add_slot(&mut snapshot, 2, 1, (10, 15), (10, 45));
        add_application(&mut snapshot, 1, 1);
        add_application(&mut snapshot, 2, 1);

        let list = [interview(1, &[10, 11], 1), interview(2, &[10, 12], 2)];
        let err = check(&list, &snapshot).unwrap_err();
        assert_eq!(err, ValidationError::OverlappingInterviews { interviewer: 10 });
    }

    #[test]
    fn travel_time_enforced_between_rooms() {
        let mut snapshot = base_snapshot();
        add_slot(&mut snapshot, 1, 1, (10, 0), (10, 30));
        add_slot(&mut snapshot, 2, 2, (10, 45), (11, 15));
        add_application(&mut snapshot, 1, 1);
        add_application(&mut snapshot, 2, 1);

        let list = [interview(1, &[10, 11], 1), interview(2, &[10, 12], 2)];
        let err = check(&list, &snapshot).unwrap_err();
        assert_eq!(
            err,
            ValidationError::InsufficientTravelTime { interviewer: 10 }
        );
    }

    #[test]
    fn same_room_needs_no_travel_time() {
        let mut snapshot = base_snapshot();
        add_slot(&mut snapshot, 1, 1, (10, 0), (10, 30));
        add_slot(&mut snapshot, 2, 1, (10, 30), (11, 0));
        add_application(&mut snapshot, 1, 1);
        add_application(&mut snapshot, 2, 1);

        let list = [interview(1, &[10, 11], 1), interview(2, &[10, 12], 2)];
        assert!(check(&list, &snapshot).is_ok());
    }

    #[test]
    fn long_chains_without_breaks_rejected() {
        // Nine back-to-back half-hour interviews in one room: 4.5 hours of
        // continuous work for the shared interviewer.
        let mut snapshot = base_snapshot();
        let mut list = Vec::new();
        for i in 0..9u32 {
            let id = u64::from(i) + 1;
            let start = (10 + i / 2, (i % 2) * 30);
            let end = (10 + (i + 1) / 2, ((i + 1) % 2) * 30);
            add_slot(&mut snapshot, id, 1, start, end);
            add_application(&mut snapshot, id, 1);
            let second = 10 + id; // distinct second interviewer per panel
            list.push(interview(id, &[10, second], id));
        }

        let err = check(&list, &snapshot).unwrap_err();
        assert_eq!(err, ValidationError::InsufficientBreaks { interviewer: 10 });
    }

    #[test]
    fn pre_existing_interviews_count_toward_breaks() {
        let mut snapshot = base_snapshot();
        // Applicant 2 already holds a four-hour booking with interviewer 10.
        add_slot(&mut snapshot, 2, 1, (8, 0), (12, 0));
        snapshot.slots.get_mut(&2).unwrap().interviewers = vec![10];
        add_application(&mut snapshot, 2, 1);
        snapshot.applications[0].slot = Some(2);

        add_slot(&mut snapshot, 1, 1, (12, 0), (12, 30));
        add_application(&mut snapshot, 1, 1);

        let err = check(&[interview(1, &[10, 11], 1)], &snapshot).unwrap_err();
        assert_eq!(err, ValidationError::InsufficientBreaks { interviewer: 10 });
    }
}
