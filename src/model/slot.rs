use chrono::{DateTime, Utc};

use crate::interval::TimeInterval;
use crate::{InterviewerId, RoomId, SlotId};

/// A bookable `(room, start, end)` tuple, the unit of interview assignment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Slot {
    pub id: SlotId,
    pub room: RoomId,
    pub interval: TimeInterval,
    /// Interviewers already attached by an earlier run or by hand.
    pub interviewers: Vec<InterviewerId>,
}

impl Slot {
    pub fn start(&self) -> DateTime<Utc> {
        self.interval.start()
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.interval.end()
    }
}
