//! # Slot Materialization
//!
//! Derives the canonical slot set for one civil day from the clinic
//! calendar, diffs it against what the store already holds, and inserts
//! only the missing records in a single batch.
//!
//! The day-of-week is taken from the civil date itself, never from an
//! instant-with-offset value, so a process running in a different zone
//! than the configured clinic zone cannot shift the calendar by a day.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{Datelike, NaiveDate};
use tracing::{debug, info};
use uuid::Uuid;

use clinislot_core::calendar;
use clinislot_core::errors::SlotResult;
use clinislot_core::models::{Clinic, NewSlot};

use crate::store::SlotStore;

pub struct SlotMaterializer {
    store: Arc<dyn SlotStore>,
}

impl SlotMaterializer {
    pub fn new(store: Arc<dyn SlotStore>) -> Self {
        Self { store }
    }

    /// Creates every slot the calendar offers on `date` that the store
    /// does not already hold, owned by `staff_id`.
    ///
    /// Idempotent: a second call for the same day inserts nothing and
    /// returns 0. The existence checks for all clinics resolve before
    /// the single batch insert is issued; concurrent callers racing
    /// past the check are resolved by the store's per-record duplicate
    /// absorption.
    ///
    /// # Errors
    ///
    /// Returns a database error if any store call fails; the whole
    /// day's batch is then skipped and safely retried on the next
    /// cycle. A closed clinic or an empty calendar day is not an error.
    pub async fn materialize_day(&self, date: NaiveDate, staff_id: Uuid) -> SlotResult<u64> {
        let weekday = date.weekday();
        let mut missing: Vec<NewSlot> = Vec::new();

        for clinic in Clinic::ALL {
            let intervals = calendar::slots_for(clinic, weekday);
            if intervals.is_empty() {
                continue;
            }

            let existing: HashSet<_> = self
                .store
                .existing_start_times(clinic, date)
                .await?
                .into_iter()
                .collect();

            for interval in intervals {
                if existing.contains(&interval.start) {
                    continue;
                }
                missing.push(NewSlot::new(
                    clinic,
                    staff_id,
                    date,
                    interval.start,
                    interval.end,
                    clinic.label(),
                )?);
            }
        }

        if missing.is_empty() {
            debug!(%date, "Day already fully materialized");
            return Ok(0);
        }

        let created = self.store.insert_missing(missing).await?;
        info!(%date, created, "Materialized missing slots");
        Ok(created)
    }
}
