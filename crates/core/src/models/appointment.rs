use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Appointment entity as consumed by slot maintenance.
///
/// The booking workflow owns this record; maintenance only reads its
/// civil date to find past appointments and deletes it after the linked
/// slot has been released.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Appointment {
    pub id: Uuid,
    pub date: NaiveDate,
    pub booked_by: Uuid,
    pub created_at: DateTime<Utc>,
}
