//! JSON transport for snapshots and the schedule write-back.
//!
//! The snapshot document is one object with `rooms`, `applicants`,
//! `interviewers`, `jobs`, `slots`, `applications` and `busy_times` arrays;
//! all sections are optional and unknown fields are ignored, so exports
//! from the admission system can carry extra columns.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{CommitError, ScheduleStore, Snapshot, SnapshotError};
use crate::interval::TimeInterval;
use crate::model::{Applicant, Application, BusyInterval, BusyOwner, Interviewer, Job, Room, Slot};
use crate::{ApplicantId, ApplicationId, InterviewerId, JobId, RoomId, SlotId};

#[derive(Debug, Default, Deserialize)]
struct SnapshotFile {
    #[serde(default)]
    rooms: Vec<RoomRecord>,
    #[serde(default)]
    applicants: Vec<PersonRecord>,
    #[serde(default)]
    interviewers: Vec<PersonRecord>,
    #[serde(default)]
    jobs: Vec<JobRecord>,
    #[serde(default)]
    slots: Vec<SlotRecord>,
    #[serde(default)]
    applications: Vec<ApplicationRecord>,
    #[serde(default)]
    busy_times: Vec<BusyRecord>,
}

#[derive(Debug, Deserialize)]
struct RoomRecord {
    id: RoomId,
    #[serde(default)]
    name: String,
}

#[derive(Debug, Deserialize)]
struct PersonRecord {
    id: u64,
    #[serde(default)]
    name: String,
}

#[derive(Debug, Deserialize)]
struct JobRecord {
    id: JobId,
    #[serde(default)]
    title: String,
    #[serde(default)]
    interviewers_1: Vec<InterviewerId>,
    #[serde(default)]
    interviewers_2: Vec<InterviewerId>,
    #[serde(default)]
    interviewers_3: Vec<InterviewerId>,
    #[serde(default)]
    require_priority_1: bool,
    #[serde(default)]
    ignore: bool,
}

#[derive(Debug, Deserialize)]
struct SlotRecord {
    id: SlotId,
    room: RoomId,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    #[serde(default)]
    interviewers: Vec<InterviewerId>,
}

#[derive(Debug, Deserialize)]
struct ApplicationRecord {
    id: ApplicationId,
    applicant: ApplicantId,
    job: JobId,
    #[serde(default)]
    withdrawn: bool,
    #[serde(default)]
    confirmed: bool,
    #[serde(default)]
    slot: Option<SlotId>,
}

/// A busy time names exactly one of `applicant` or `interviewer`.
#[derive(Debug, Deserialize)]
struct BusyRecord {
    #[serde(default)]
    applicant: Option<ApplicantId>,
    #[serde(default)]
    interviewer: Option<InterviewerId>,
    begin: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl Snapshot {
    /// Loads a snapshot from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self, SnapshotError> {
        let file = File::open(path)?;
        Self::from_reader(BufReader::new(file))
    }

    /// Loads a snapshot from any JSON reader and verifies its internal
    /// consistency (unique ids, resolvable references, sane slot times).
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, SnapshotError> {
        let file: SnapshotFile = serde_json::from_reader(reader)?;
        let mut snapshot = Snapshot::default();

        for record in file.rooms {
            let room = Room {
                id: record.id,
                name: record.name,
            };
            if snapshot.rooms.insert(room.id, room).is_some() {
                return Err(SnapshotError::DuplicateId {
                    kind: "room",
                    id: record.id,
                });
            }
        }
        for record in file.applicants {
            let applicant = Applicant {
                id: record.id,
                name: record.name,
            };
            if snapshot.applicants.insert(applicant.id, applicant).is_some() {
                return Err(SnapshotError::DuplicateId {
                    kind: "applicant",
                    id: record.id,
                });
            }
        }
        for record in file.interviewers {
            let interviewer = Interviewer {
                id: record.id,
                name: record.name,
            };
            if snapshot
                .interviewers
                .insert(interviewer.id, interviewer)
                .is_some()
            {
                return Err(SnapshotError::DuplicateId {
                    kind: "interviewer",
                    id: record.id,
                });
            }
        }
        for record in file.jobs {
            let mut job = Job {
                id: record.id,
                title: record.title,
                interviewers_1: record.interviewers_1,
                interviewers_2: record.interviewers_2,
                interviewers_3: record.interviewers_3,
                require_priority_1: record.require_priority_1,
                ignore: record.ignore,
            };
            job.canonicalize();
            if snapshot.jobs.insert(job.id, job).is_some() {
                return Err(SnapshotError::DuplicateId {
                    kind: "job",
                    id: record.id,
                });
            }
        }
        for record in file.slots {
            if record.end < record.start {
                return Err(SnapshotError::InvalidSlotTimes { slot: record.id });
            }
            let slot = Slot {
                id: record.id,
                room: record.room,
                interval: TimeInterval::new(record.start, record.end),
                interviewers: record.interviewers,
            };
            if snapshot.slots.insert(slot.id, slot).is_some() {
                return Err(SnapshotError::DuplicateId {
                    kind: "slot",
                    id: record.id,
                });
            }
        }
        for record in file.applications {
            snapshot.applications.push(Application {
                id: record.id,
                applicant: record.applicant,
                job: record.job,
                withdrawn: record.withdrawn,
                confirmed: record.confirmed,
                slot: record.slot,
            });
        }
        for (index, record) in file.busy_times.into_iter().enumerate() {
            let owner = match (record.applicant, record.interviewer) {
                (Some(applicant), None) => BusyOwner::Applicant(applicant),
                (None, Some(interviewer)) => BusyOwner::Interviewer(interviewer),
                (None, None) => return Err(SnapshotError::BusyWithoutOwner { index }),
                (Some(_), Some(_)) => return Err(SnapshotError::BusyWithTwoOwners { index }),
            };
            if record.end < record.begin {
                return Err(SnapshotError::InvalidBusyTimes { index });
            }
            snapshot.busy_intervals.push(BusyInterval {
                owner,
                interval: TimeInterval::new(record.begin, record.end),
            });
        }

        snapshot.check_references()?;
        Ok(snapshot)
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
struct SlotAssignment {
    slot: SlotId,
    interviewers: Vec<InterviewerId>,
    applications: Vec<ApplicationId>,
}

/// Collects the committed schedule and writes it out as one JSON document
/// on [`flush`](JsonScheduleStore::flush).
#[derive(Debug)]
pub struct JsonScheduleStore {
    path: PathBuf,
    assignments: BTreeMap<SlotId, SlotAssignment>,
}

impl JsonScheduleStore {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            assignments: BTreeMap::new(),
        }
    }

    /// Writes everything collected so far to the configured path.
    pub fn flush(&self) -> Result<(), CommitError> {
        let assignments: Vec<&SlotAssignment> = self.assignments.values().collect();
        let file = File::create(&self.path)?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, &assignments)?;
        writer.flush()?;
        Ok(())
    }

    fn entry(&mut self, slot: SlotId) -> &mut SlotAssignment {
        self.assignments.entry(slot).or_insert_with(|| SlotAssignment {
            slot,
            ..SlotAssignment::default()
        })
    }
}

impl ScheduleStore for JsonScheduleStore {
    fn link_application(
        &mut self,
        application: ApplicationId,
        slot: SlotId,
    ) -> Result<(), CommitError> {
        self.entry(slot).applications.push(application);
        Ok(())
    }

    fn commit_slot(
        &mut self,
        slot: SlotId,
        interviewers: &[InterviewerId],
    ) -> Result<(), CommitError> {
        self.entry(slot).interviewers = interviewers.to_vec();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "rooms": [{"id": 1, "name": "storsalen"}],
        "applicants": [{"id": 1, "name": "Kari"}],
        "interviewers": [{"id": 10, "name": "Ola"}, {"id": 11, "name": "Per"}],
        "jobs": [{
            "id": 1,
            "title": "gatekeeper",
            "interviewers_1": [11, 10],
            "require_priority_1": true
        }],
        "slots": [{
            "id": 1,
            "room": 1,
            "start": "2020-07-12T10:00:00Z",
            "end": "2020-07-12T10:30:00Z"
        }],
        "applications": [{"id": 1, "applicant": 1, "job": 1}],
        "busy_times": [
            {"applicant": 1, "begin": "2020-07-12T12:00:00Z", "end": "2020-07-12T13:00:00Z"}
        ]
    }"#;

    #[test]
    fn sample_snapshot_parses() {
        let snapshot = Snapshot::from_reader(SAMPLE.as_bytes()).unwrap();
        assert_eq!(snapshot.rooms.len(), 1);
        assert_eq!(snapshot.applications.len(), 1);
        assert_eq!(snapshot.busy_intervals.len(), 1);
        assert!(snapshot.jobs[&1].require_priority_1);
        // Tiers come out canonicalized regardless of file order.
        assert_eq!(snapshot.jobs[&1].interviewers_1, vec![10, 11]);
    }

    #[test]
    fn defaults_fill_missing_sections_and_flags() {
        let snapshot = Snapshot::from_reader("{}".as_bytes()).unwrap();
        assert!(snapshot.slots.is_empty());
        assert!(snapshot.applications.is_empty());
    }

    #[test]
    fn busy_time_without_owner_rejected() {
        let doc = r#"{"busy_times": [
            {"begin": "2020-07-12T10:00:00Z", "end": "2020-07-12T11:00:00Z"}
        ]}"#;
        let err = Snapshot::from_reader(doc.as_bytes()).unwrap_err();
        assert!(matches!(err, SnapshotError::BusyWithoutOwner { index: 0 }));
    }

    #[test]
    fn broken_references_rejected_at_load() {
        let doc = r#"{
            "applicants": [{"id": 1}],
            "jobs": [{"id": 1}],
            "applications": [{"id": 1, "applicant": 1, "job": 2}]
        }"#;
        let err = Snapshot::from_reader(doc.as_bytes()).unwrap_err();
        assert!(matches!(
            err,
            SnapshotError::DanglingApplication {
                kind: "job",
                id: 2,
                ..
            }
        ));
    }

    #[test]
    fn store_keeps_one_assignment_per_slot() {
        let mut store = JsonScheduleStore::new(PathBuf::from("unused.json"));
        store.link_application(1, 7).unwrap();
        store.link_application(2, 7).unwrap();
        store.commit_slot(7, &[10, 11]).unwrap();

        let assignment = &store.assignments[&7];
        assert_eq!(assignment.applications, vec![1, 2]);
        assert_eq!(assignment.interviewers, vec![10, 11]);
    }

    #[test]
    fn flush_writes_the_collected_schedule() {
        let path = std::env::temp_dir().join(format!("bips-store-{}.json", std::process::id()));
        let mut store = JsonScheduleStore::new(path.clone());
        store.link_application(1, 7).unwrap();
        store.commit_slot(7, &[10, 11]).unwrap();
        store.flush().unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert!(written.contains("\"slot\": 7"));
        assert!(written.contains("\"interviewers\""));
    }
}
