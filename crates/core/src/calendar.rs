//! # Clinic Opening Calendar
//!
//! Pure lookup of the time intervals each clinic offers on a given day
//! of the week. The table below is a user-facing commitment and must be
//! reproduced exactly; changing it changes what patients can book.
//!
//! Week semantics: Sunday is the distinguished weekly special day. On
//! Sunday only the Hillside clinic is open, with a single afternoon
//! block; on all other days Hillside is closed and the remaining
//! clinics follow their own block lists.
//!
//! Every block is subdivided into fixed 30-minute intervals. No
//! interval crosses midnight, and the intervals returned for one
//! (clinic, weekday) pair are disjoint and sorted ascending by start.

use chrono::{NaiveTime, Weekday};
use serde::{Deserialize, Serialize};

use crate::models::clinic::Clinic;
use crate::models::slot::format_hhmm;

/// Subdivision step applied to every opening block.
pub const INTERVAL_MINUTES: u32 = 30;

/// An ephemeral bookable interval within one calendar day.
///
/// Output of the calendar only; slots persist their own copies of the
/// start and end times.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeInterval {
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl std::fmt::Display for TimeInterval {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", format_hhmm(self.start), format_hhmm(self.end))
    }
}

/// Opening blocks, as (start hour, start minute, end hour, end minute).
type Block = (u32, u32, u32, u32);

/// Downtown weekday blocks: early morning, late morning, short
/// afternoon, night.
const DOWNTOWN_BLOCKS: [Block; 4] = [
    (7, 0, 9, 0),
    (10, 0, 12, 0),
    (14, 0, 15, 0),
    (20, 0, 23, 0),
];

/// Riverside weekday blocks: a single afternoon block.
const RIVERSIDE_BLOCKS: [Block; 1] = [(15, 0, 18, 0)];

/// Hillside special-day blocks: one contiguous afternoon block.
const HILLSIDE_SUNDAY_BLOCKS: [Block; 1] = [(14, 0, 19, 0)];

/// Returns the ordered intervals `clinic` offers on `weekday`.
///
/// Pure and total: a clinic that is closed on `weekday` yields an empty
/// vector, never an error.
pub fn slots_for(clinic: Clinic, weekday: Weekday) -> Vec<TimeInterval> {
    let blocks: &[Block] = match (clinic, weekday) {
        (Clinic::Hillside, Weekday::Sun) => &HILLSIDE_SUNDAY_BLOCKS,
        (Clinic::Hillside, _) => &[],
        (_, Weekday::Sun) => &[],
        (Clinic::Downtown, _) => &DOWNTOWN_BLOCKS,
        (Clinic::Riverside, _) => &RIVERSIDE_BLOCKS,
    };

    blocks
        .iter()
        .flat_map(|&(sh, sm, eh, em)| {
            let start = NaiveTime::from_hms_opt(sh, sm, 0).unwrap_or_default();
            let end = NaiveTime::from_hms_opt(eh, em, 0).unwrap_or_default();
            subdivide(start, end)
        })
        .collect()
}

/// Total number of intervals offered across all clinics on `weekday`.
pub fn total_slots_for(weekday: Weekday) -> usize {
    Clinic::ALL
        .iter()
        .map(|&clinic| slots_for(clinic, weekday).len())
        .sum()
}

/// Splits a block into consecutive [`INTERVAL_MINUTES`] intervals.
///
/// A trailing remainder shorter than one step is dropped; blocks in the
/// committed table are always exact multiples.
fn subdivide(start: NaiveTime, end: NaiveTime) -> Vec<TimeInterval> {
    let step = chrono::Duration::minutes(i64::from(INTERVAL_MINUTES));
    let mut intervals = Vec::new();
    let mut cursor = start;

    loop {
        let next = cursor + step;
        // `next` wraps past midnight once cursor reaches the end of day;
        // the committed table never gets there, but stay total anyway.
        if next > end || next <= cursor {
            break;
        }
        intervals.push(TimeInterval {
            start: cursor,
            end: next,
        });
        cursor = next;
    }

    intervals
}
