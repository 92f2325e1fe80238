//! Mutable busy views consulted and updated while scheduling.

use std::collections::{BTreeSet, HashMap};

use crate::config::SchedulerConfig;
use crate::interval::TimeInterval;
use crate::model::{BusyEntry, Slot};
use crate::{ApplicantId, InterviewerId};

use super::breaks;

/// Busy views the engine mutates as interviews come and go.
///
/// Applicant entries are plain intervals. Interviewer entries carry the room
/// when the busy time is an interview and `None` when it is an opaque block
/// that conflicts regardless of location.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BusyIndex {
    applicant_busy: HashMap<ApplicantId, BTreeSet<TimeInterval>>,
    interviewer_busy: HashMap<InterviewerId, BTreeSet<BusyEntry>>,
}

impl BusyIndex {
    pub fn new(
        applicant_busy: HashMap<ApplicantId, BTreeSet<TimeInterval>>,
        interviewer_busy: HashMap<InterviewerId, BTreeSet<BusyEntry>>,
    ) -> Self {
        Self {
            applicant_busy,
            interviewer_busy,
        }
    }

    /// Records `slot` as interview work for `interviewer`.
    ///
    /// # Panics
    ///
    /// Panics if the entry is already recorded; the engine books an
    /// interviewer at most once per slot.
    pub fn occupy(&mut self, interviewer: InterviewerId, slot: &Slot) {
        let inserted = self
            .interviewer_busy
            .entry(interviewer)
            .or_default()
            .insert(BusyEntry {
                interval: slot.interval,
                room: Some(slot.room),
            });
        assert!(
            inserted,
            "interviewer {interviewer} already occupied for slot {}",
            slot.id
        );
    }

    /// Reverses [`occupy`](Self::occupy).
    ///
    /// # Panics
    ///
    /// Panics if the entry is not recorded.
    pub fn release(&mut self, interviewer: InterviewerId, slot: &Slot) {
        let removed = match self.interviewer_busy.get_mut(&interviewer) {
            Some(entries) => {
                let removed = entries.remove(&BusyEntry {
                    interval: slot.interval,
                    room: Some(slot.room),
                });
                // Drop emptied sets so add followed by remove restores the
                // index bit for bit.
                if entries.is_empty() {
                    self.interviewer_busy.remove(&interviewer);
                }
                removed
            }
            None => false,
        };
        assert!(
            removed,
            "interviewer {interviewer} was not occupied for slot {}",
            slot.id
        );
    }

    /// True iff no busy interval of `applicant` overlaps the slot.
    pub fn applicant_is_available(&self, applicant: ApplicantId, slot: &Slot) -> bool {
        self.applicant_busy.get(&applicant).map_or(true, |busy| {
            !busy.iter().any(|interval| interval.overlaps(&slot.interval))
        })
    }

    /// True iff `interviewer` can sit on `slot`.
    ///
    /// A busy entry in the same room, or with no room at all, conflicts on
    /// plain overlap; an entry in a different room additionally needs the
    /// travel buffer of clearance on each side. The continuous-work rule is
    /// then checked with the slot added to the recorded interview work.
    pub fn interviewer_is_available(
        &self,
        interviewer: InterviewerId,
        slot: &Slot,
        config: &SchedulerConfig,
    ) -> bool {
        let Some(entries) = self.interviewer_busy.get(&interviewer) else {
            return true;
        };
        for entry in entries {
            let conflict = match entry.room {
                Some(room) if room != slot.room => entry
                    .interval
                    .overlaps_with_buffer(&slot.interval, config.travel_time),
                _ => entry.interval.overlaps(&slot.interval),
            };
            if conflict {
                return false;
            }
        }
        breaks::sufficient_breaks(
            entries
                .iter()
                .filter(|entry| entry.room.is_some())
                .map(|entry| entry.interval),
            slot.interval,
            config.max_continuous_work,
            config.break_length,
        )
    }
}
