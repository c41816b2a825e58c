use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::{SlotError, SlotResult};
use crate::models::clinic::Clinic;

/// Shortest bookable slot, in minutes.
pub const MIN_SLOT_MINUTES: i64 = 15;
/// Longest bookable slot, in minutes.
pub const MAX_SLOT_MINUTES: i64 = 240;

/// Parses a strict zero-padded 24-hour `HH:MM` time-of-day string.
pub fn parse_hhmm(value: &str) -> SlotResult<NaiveTime> {
    let bytes = value.as_bytes();
    if bytes.len() != 5 || bytes[2] != b':' {
        return Err(SlotError::Validation(format!(
            "Time must be zero-padded HH:MM, got '{value}'"
        )));
    }
    NaiveTime::parse_from_str(value, "%H:%M")
        .map_err(|_| SlotError::Validation(format!("Time must be zero-padded HH:MM, got '{value}'")))
}

/// Renders a time-of-day as zero-padded `HH:MM`.
pub fn format_hhmm(time: NaiveTime) -> String {
    time.format("%H:%M").to_string()
}

/// One bookable interval at one clinic on one civil calendar date.
///
/// `date` is a zone-less civil date; day-of-week and all window math are
/// derived from it directly, never from an instant-with-offset value.
/// Two slots are on the same calendar day iff their `date` values are
/// equal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Slot {
    pub id: Uuid,
    pub clinic: Clinic,
    /// Responsible staff member (opaque external reference)
    pub staff_id: Uuid,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    /// Operator-level kill switch, independent of booking state
    pub is_available: bool,
    pub is_booked: bool,
    /// Booking party; set iff `is_booked`
    pub booked_by: Option<Uuid>,
    /// Linked appointment; set iff `is_booked`
    pub appointment_id: Option<Uuid>,
    pub note: String,
    pub created_at: DateTime<Utc>,
}

/// Payload for slots to be created by materialization.
///
/// Construction validates the interval, so a malformed record can never
/// reach the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewSlot {
    pub clinic: Clinic,
    pub staff_id: Uuid,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub note: String,
}

impl NewSlot {
    /// Builds a validated slot payload.
    ///
    /// # Errors
    ///
    /// Returns `SlotError::Validation` when `end_time` is not strictly
    /// after `start_time` or the duration falls outside
    /// [`MIN_SLOT_MINUTES`, `MAX_SLOT_MINUTES`].
    pub fn new(
        clinic: Clinic,
        staff_id: Uuid,
        date: NaiveDate,
        start_time: NaiveTime,
        end_time: NaiveTime,
        note: String,
    ) -> SlotResult<Self> {
        validate_interval(start_time, end_time)?;
        Ok(Self {
            clinic,
            staff_id,
            date,
            start_time,
            end_time,
            note,
        })
    }

    /// Builds a validated slot payload from `HH:MM` time strings.
    pub fn from_hhmm(
        clinic: Clinic,
        staff_id: Uuid,
        date: NaiveDate,
        start: &str,
        end: &str,
        note: String,
    ) -> SlotResult<Self> {
        Self::new(
            clinic,
            staff_id,
            date,
            parse_hhmm(start)?,
            parse_hhmm(end)?,
            note,
        )
    }
}

/// Checks that an interval is well-formed for a single calendar day.
pub fn validate_interval(start: NaiveTime, end: NaiveTime) -> SlotResult<()> {
    if end <= start {
        return Err(SlotError::Validation(format!(
            "Slot end {} must be after start {}",
            format_hhmm(end),
            format_hhmm(start)
        )));
    }
    let minutes = (end - start).num_minutes();
    if !(MIN_SLOT_MINUTES..=MAX_SLOT_MINUTES).contains(&minutes) {
        return Err(SlotError::Validation(format!(
            "Slot duration {minutes} minutes outside [{MIN_SLOT_MINUTES}, {MAX_SLOT_MINUTES}]"
        )));
    }
    Ok(())
}
