//! # Persistence Boundary
//!
//! The slot maintenance engine talks to storage only through these
//! traits. The Postgres implementations delegate to the repository
//! functions in `clinislot-db`; tests substitute in-memory stores.

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime};
use tracing::warn;
use uuid::Uuid;

use clinislot_core::errors::SlotResult;
use clinislot_core::models::{Appointment, Clinic, NewSlot, Slot};
use clinislot_db::models::{DbAppointment, DbSlot};
use clinislot_db::{repositories, DbPool};

/// Slot persistence as seen by the engine.
///
/// `insert_missing` must absorb per-record duplicate-key rejections:
/// under concurrent materialization the store keeps exactly one row per
/// (staff, date, start, clinic) identity and reports only the rows it
/// actually wrote.
#[async_trait]
pub trait SlotStore: Send + Sync {
    /// Start times already stored for one clinic on one civil day.
    async fn existing_start_times(
        &self,
        clinic: Clinic,
        date: NaiveDate,
    ) -> SlotResult<Vec<NaiveTime>>;

    /// Bulk-inserts a batch, dropping duplicates per record; returns the
    /// count actually inserted.
    async fn insert_missing(&self, slots: Vec<NewSlot>) -> SlotResult<u64>;

    /// Deletes unbooked slots dated strictly before `cutoff`.
    async fn delete_stale_unbooked(&self, cutoff: NaiveDate) -> SlotResult<u64>;

    /// The booked slot linked to an appointment, if any.
    async fn find_booked_by_appointment(&self, appointment_id: Uuid)
        -> SlotResult<Option<Slot>>;

    /// Returns a slot to the unbooked state, clearing booking links.
    ///
    /// Yields `false` when no row was updated because the slot vanished
    /// between lookup and release.
    async fn release(&self, slot_id: Uuid) -> SlotResult<bool>;
}

/// Appointment collaborator as seen by the engine.
#[async_trait]
pub trait AppointmentStore: Send + Sync {
    /// Appointments dated strictly before `date`.
    async fn find_before(&self, date: NaiveDate) -> SlotResult<Vec<Appointment>>;

    /// Removes one appointment entity.
    async fn delete(&self, id: Uuid) -> SlotResult<()>;
}

/// Staff directory collaborator.
#[async_trait]
pub trait StaffDirectory: Send + Sync {
    /// The staff member responsible for newly materialized slots, or
    /// `None` when the directory has no eligible member.
    async fn find_responsible(&self) -> SlotResult<Option<Uuid>>;
}

/// [`SlotStore`] over the shared Postgres pool.
#[derive(Clone)]
pub struct PgSlotStore {
    pool: DbPool,
}

impl PgSlotStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SlotStore for PgSlotStore {
    async fn existing_start_times(
        &self,
        clinic: Clinic,
        date: NaiveDate,
    ) -> SlotResult<Vec<NaiveTime>> {
        Ok(repositories::slot::find_start_times(&self.pool, clinic.code(), date).await?)
    }

    async fn insert_missing(&self, slots: Vec<NewSlot>) -> SlotResult<u64> {
        Ok(repositories::slot::insert_missing(&self.pool, &slots).await?)
    }

    async fn delete_stale_unbooked(&self, cutoff: NaiveDate) -> SlotResult<u64> {
        Ok(repositories::slot::delete_stale_unbooked(&self.pool, cutoff).await?)
    }

    async fn find_booked_by_appointment(
        &self,
        appointment_id: Uuid,
    ) -> SlotResult<Option<Slot>> {
        let row = repositories::slot::find_booked_by_appointment(&self.pool, appointment_id)
            .await?;
        Ok(row.and_then(slot_from_row))
    }

    async fn release(&self, slot_id: Uuid) -> SlotResult<bool> {
        let updated = repositories::slot::release(&self.pool, slot_id).await?;
        Ok(updated > 0)
    }
}

/// [`AppointmentStore`] over the shared Postgres pool.
#[derive(Clone)]
pub struct PgAppointmentStore {
    pool: DbPool,
}

impl PgAppointmentStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AppointmentStore for PgAppointmentStore {
    async fn find_before(&self, date: NaiveDate) -> SlotResult<Vec<Appointment>> {
        let rows = repositories::appointment::find_before(&self.pool, date).await?;
        Ok(rows.into_iter().map(appointment_from_row).collect())
    }

    async fn delete(&self, id: Uuid) -> SlotResult<()> {
        repositories::appointment::delete_by_id(&self.pool, id).await?;
        Ok(())
    }
}

/// [`StaffDirectory`] over the shared Postgres pool.
#[derive(Clone)]
pub struct PgStaffDirectory {
    pool: DbPool,
}

impl PgStaffDirectory {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl StaffDirectory for PgStaffDirectory {
    async fn find_responsible(&self) -> SlotResult<Option<Uuid>> {
        let staff = repositories::staff::find_responsible(&self.pool).await?;
        Ok(staff.map(|s| s.id))
    }
}

/// Maps a slot row to the domain model.
///
/// Rows carrying a clinic code that is no longer configured are skipped
/// with a warning rather than failing the surrounding operation.
fn slot_from_row(row: DbSlot) -> Option<Slot> {
    let Some(clinic) = Clinic::from_code(&row.clinic) else {
        warn!(slot_id = %row.id, clinic = %row.clinic, "Skipping slot with unknown clinic code");
        return None;
    };

    Some(Slot {
        id: row.id,
        clinic,
        staff_id: row.staff_id,
        date: row.date,
        start_time: row.start_time,
        end_time: row.end_time,
        is_available: row.is_available,
        is_booked: row.is_booked,
        booked_by: row.booked_by,
        appointment_id: row.appointment_id,
        note: row.note,
        created_at: row.created_at,
    })
}

fn appointment_from_row(row: DbAppointment) -> Appointment {
    Appointment {
        id: row.id,
        date: row.date,
        booked_by: row.booked_by,
        created_at: row.created_at,
    }
}
