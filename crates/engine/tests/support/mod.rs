#![allow(dead_code)] // each test binary uses a different subset of helpers

//! In-memory store implementations for engine tests.
//!
//! `InMemorySlotStore` reproduces the store semantics the engine relies
//! on, including per-record duplicate absorption keyed on
//! (staff, date, start, clinic).

use std::collections::HashSet;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime, Utc};
use uuid::Uuid;

use clinislot_core::errors::{SlotError, SlotResult};
use clinislot_core::models::{Appointment, Clinic, NewSlot, Slot};
use clinislot_engine::store::{AppointmentStore, SlotStore, StaffDirectory};

#[derive(Default)]
pub struct InMemorySlotStore {
    slots: Mutex<Vec<Slot>>,
    /// Dates whose reads fail, to exercise per-day error absorption
    pub fail_dates: Mutex<HashSet<NaiveDate>>,
    /// Slot ids whose release updates nothing, as if deleted concurrently
    pub release_misses: Mutex<HashSet<Uuid>>,
    /// Artificial latency on reads, to widen race windows
    pub read_delay: Option<Duration>,
}

impl InMemorySlotStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_read_delay(delay: Duration) -> Self {
        Self {
            read_delay: Some(delay),
            ..Self::default()
        }
    }

    pub fn fail_date(&self, date: NaiveDate) {
        self.fail_dates.lock().unwrap().insert(date);
    }

    pub fn miss_release(&self, slot_id: Uuid) {
        self.release_misses.lock().unwrap().insert(slot_id);
    }

    pub fn len(&self) -> usize {
        self.slots.lock().unwrap().len()
    }

    pub fn all(&self) -> Vec<Slot> {
        self.slots.lock().unwrap().clone()
    }

    pub fn count_for_date(&self, date: NaiveDate) -> usize {
        self.slots
            .lock()
            .unwrap()
            .iter()
            .filter(|s| s.date == date)
            .count()
    }

    /// Seeds a booked slot linked to `appointment_id`.
    pub fn insert_booked(
        &self,
        clinic: Clinic,
        staff_id: Uuid,
        date: NaiveDate,
        start: NaiveTime,
        end: NaiveTime,
        booked_by: Uuid,
        appointment_id: Uuid,
    ) -> Uuid {
        let id = Uuid::new_v4();
        self.slots.lock().unwrap().push(Slot {
            id,
            clinic,
            staff_id,
            date,
            start_time: start,
            end_time: end,
            is_available: true,
            is_booked: true,
            booked_by: Some(booked_by),
            appointment_id: Some(appointment_id),
            note: clinic.label(),
            created_at: Utc::now(),
        });
        id
    }

    /// Seeds an unbooked slot.
    pub fn insert_unbooked(
        &self,
        clinic: Clinic,
        staff_id: Uuid,
        date: NaiveDate,
        start: NaiveTime,
        end: NaiveTime,
    ) -> Uuid {
        let id = Uuid::new_v4();
        self.slots.lock().unwrap().push(Slot {
            id,
            clinic,
            staff_id,
            date,
            start_time: start,
            end_time: end,
            is_available: true,
            is_booked: false,
            booked_by: None,
            appointment_id: None,
            note: clinic.label(),
            created_at: Utc::now(),
        });
        id
    }

    async fn maybe_delay(&self) {
        if let Some(delay) = self.read_delay {
            tokio::time::sleep(delay).await;
        }
    }
}

#[async_trait]
impl SlotStore for InMemorySlotStore {
    async fn existing_start_times(
        &self,
        clinic: Clinic,
        date: NaiveDate,
    ) -> SlotResult<Vec<NaiveTime>> {
        self.maybe_delay().await;
        if self.fail_dates.lock().unwrap().contains(&date) {
            return Err(SlotError::Database(eyre::eyre!("injected read failure")));
        }
        Ok(self
            .slots
            .lock()
            .unwrap()
            .iter()
            .filter(|s| s.clinic == clinic && s.date == date)
            .map(|s| s.start_time)
            .collect())
    }

    async fn insert_missing(&self, new_slots: Vec<NewSlot>) -> SlotResult<u64> {
        let mut slots = self.slots.lock().unwrap();
        let mut inserted = 0u64;

        for new in new_slots {
            let duplicate = slots.iter().any(|s| {
                s.staff_id == new.staff_id
                    && s.date == new.date
                    && s.start_time == new.start_time
                    && s.clinic == new.clinic
            });
            if duplicate {
                continue;
            }
            slots.push(Slot {
                id: Uuid::new_v4(),
                clinic: new.clinic,
                staff_id: new.staff_id,
                date: new.date,
                start_time: new.start_time,
                end_time: new.end_time,
                is_available: true,
                is_booked: false,
                booked_by: None,
                appointment_id: None,
                note: new.note,
                created_at: Utc::now(),
            });
            inserted += 1;
        }

        Ok(inserted)
    }

    async fn delete_stale_unbooked(&self, cutoff: NaiveDate) -> SlotResult<u64> {
        let mut slots = self.slots.lock().unwrap();
        let before = slots.len();
        slots.retain(|s| s.is_booked || s.date >= cutoff);
        Ok((before - slots.len()) as u64)
    }

    async fn find_booked_by_appointment(
        &self,
        appointment_id: Uuid,
    ) -> SlotResult<Option<Slot>> {
        Ok(self
            .slots
            .lock()
            .unwrap()
            .iter()
            .find(|s| s.appointment_id == Some(appointment_id) && s.is_booked)
            .cloned())
    }

    async fn release(&self, slot_id: Uuid) -> SlotResult<bool> {
        if self.release_misses.lock().unwrap().contains(&slot_id) {
            return Ok(false);
        }
        let mut slots = self.slots.lock().unwrap();
        let Some(slot) = slots.iter_mut().find(|s| s.id == slot_id) else {
            return Ok(false);
        };
        slot.is_booked = false;
        slot.booked_by = None;
        slot.appointment_id = None;
        Ok(true)
    }
}

#[derive(Default)]
pub struct InMemoryAppointmentStore {
    appointments: Mutex<Vec<Appointment>>,
    /// Ids whose deletion fails, to exercise per-item continuation
    pub fail_deletes: Mutex<HashSet<Uuid>>,
}

impl InMemoryAppointmentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, date: NaiveDate, booked_by: Uuid) -> Uuid {
        let id = Uuid::new_v4();
        self.appointments.lock().unwrap().push(Appointment {
            id,
            date,
            booked_by,
            created_at: Utc::now(),
        });
        id
    }

    pub fn fail_delete(&self, id: Uuid) {
        self.fail_deletes.lock().unwrap().insert(id);
    }

    pub fn len(&self) -> usize {
        self.appointments.lock().unwrap().len()
    }
}

#[async_trait]
impl AppointmentStore for InMemoryAppointmentStore {
    async fn find_before(&self, date: NaiveDate) -> SlotResult<Vec<Appointment>> {
        Ok(self
            .appointments
            .lock()
            .unwrap()
            .iter()
            .filter(|a| a.date < date)
            .cloned()
            .collect())
    }

    async fn delete(&self, id: Uuid) -> SlotResult<()> {
        if self.fail_deletes.lock().unwrap().contains(&id) {
            return Err(SlotError::Database(eyre::eyre!("injected delete failure")));
        }
        self.appointments.lock().unwrap().retain(|a| a.id != id);
        Ok(())
    }
}

pub struct FixedStaffDirectory(pub Option<Uuid>);

#[async_trait]
impl StaffDirectory for FixedStaffDirectory {
    async fn find_responsible(&self) -> SlotResult<Option<Uuid>> {
        Ok(self.0)
    }
}
