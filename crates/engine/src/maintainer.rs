//! # Window Maintenance
//!
//! Orchestrates the three steady-state operations over the slot store:
//! keeping the forward window materialized, retiring stale unbooked
//! slots, and reclaiming slots from past appointments.
//!
//! All civil "today" math happens in the configured clinic zone; the
//! zone of the host process is irrelevant.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::{Duration, NaiveDate, Utc};
use chrono_tz::Tz;
use tracing::{error, info, warn};
use uuid::Uuid;

use clinislot_core::errors::{SlotError, SlotResult};

use crate::materializer::SlotMaterializer;
use crate::store::{AppointmentStore, SlotStore, StaffDirectory};

/// Counts produced by one reclamation pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReclaimOutcome {
    pub slots_freed: u64,
    pub appointments_removed: u64,
}

/// Counts produced by one composed refresh cycle.
#[derive(Debug, Clone, Copy, Default)]
pub struct RefreshSummary {
    pub slots_created: u64,
    pub slots_retired: u64,
    pub reclaimed: ReclaimOutcome,
}

/// Orchestrator for the rolling slot window.
///
/// Constructed once by the process and shared via `Arc`; the
/// re-entrancy guard is instance state, not module state, so a second
/// maintainer (or a test) is never entangled with the first.
pub struct WindowMaintainer {
    slots: Arc<dyn SlotStore>,
    appointments: Arc<dyn AppointmentStore>,
    staff: Arc<dyn StaffDirectory>,
    materializer: SlotMaterializer,
    timezone: Tz,
    window_days: u32,
    retention_days: u32,
    ensure_running: AtomicBool,
}

impl WindowMaintainer {
    pub fn new(
        slots: Arc<dyn SlotStore>,
        appointments: Arc<dyn AppointmentStore>,
        staff: Arc<dyn StaffDirectory>,
        timezone: Tz,
        window_days: u32,
        retention_days: u32,
    ) -> Self {
        let materializer = SlotMaterializer::new(slots.clone());
        Self {
            slots,
            appointments,
            staff,
            materializer,
            timezone,
            window_days,
            retention_days,
            ensure_running: AtomicBool::new(false),
        }
    }

    /// Civil today in the clinic zone.
    pub fn today(&self) -> NaiveDate {
        Utc::now().with_timezone(&self.timezone).date_naive()
    }

    pub fn window_days(&self) -> u32 {
        self.window_days
    }

    pub fn retention_days(&self) -> u32 {
        self.retention_days
    }

    /// Materializes slots for every day in `[today, today + days_ahead)`.
    ///
    /// Overlapping invocations short-circuit to `Ok(0)`: the guard is a
    /// weak in-process exclusion that avoids wasted double work, while
    /// true correctness under concurrency rests on the store's
    /// duplicate absorption. A day that fails is logged and skipped so
    /// one bad day cannot abort the rest of the window.
    ///
    /// # Errors
    ///
    /// Returns `SlotError::Configuration` when the staff directory has
    /// no eligible member; this cycle is abandoned and the next trigger
    /// retries from scratch.
    pub async fn ensure_window(&self, days_ahead: u32) -> SlotResult<u64> {
        if self
            .ensure_running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            warn!("ensure_window already running, skipping overlapping invocation");
            return Ok(0);
        }
        let _guard = RunGuard(&self.ensure_running);

        let staff_id = self.responsible_staff().await?;
        let total = self
            .ensure_window_from(self.today(), days_ahead, staff_id)
            .await;
        Ok(total)
    }

    /// Unguarded inner loop over an explicit start date; used by
    /// [`ensure_window`] and directly by manual repair runs.
    pub async fn ensure_window_from(
        &self,
        start: NaiveDate,
        days_ahead: u32,
        staff_id: Uuid,
    ) -> u64 {
        let mut total = 0u64;

        for offset in 0..days_ahead {
            let date = start + Duration::days(i64::from(offset));
            match self.materializer.materialize_day(date, staff_id).await {
                Ok(created) => total += created,
                Err(err) => {
                    warn!(%date, error = %err, "Materialization failed for day, continuing window");
                }
            }
        }

        info!(%start, days_ahead, total, "Window ensured");
        total
    }

    /// Deletes unbooked slots dated strictly before
    /// `today - retention_days`.
    ///
    /// The boundary is exclusive: a slot dated exactly at the cutoff is
    /// preserved. Booked slots are never deleted here, whatever their
    /// age.
    pub async fn retire_stale_unbooked(&self, retention_days: u32) -> SlotResult<u64> {
        let cutoff = self.today() - Duration::days(i64::from(retention_days));
        let deleted = self.slots.delete_stale_unbooked(cutoff).await?;
        if deleted > 0 {
            info!(%cutoff, deleted, "Retired stale unbooked slots");
        }
        Ok(deleted)
    }

    /// Frees slots still booked to appointments whose date has passed,
    /// then removes those appointments.
    ///
    /// Each appointment is processed independently; a failure on one is
    /// logged and does not stop the rest. The slot is released before
    /// its appointment is deleted, so a crash in between leaves a
    /// re-processable appointment rather than a permanently booked
    /// slot.
    pub async fn reclaim_orphaned_appointments(&self) -> SlotResult<ReclaimOutcome> {
        let today = self.today();
        let past = self.appointments.find_before(today).await?;
        let mut outcome = ReclaimOutcome::default();

        for appointment in past {
            match self.slots.find_booked_by_appointment(appointment.id).await {
                Ok(Some(slot)) => match self.slots.release(slot.id).await {
                    Ok(true) => outcome.slots_freed += 1,
                    Ok(false) => {
                        // Concurrent deletion between lookup and release;
                        // nothing was freed, the appointment still goes.
                        warn!(
                            appointment_id = %appointment.id,
                            slot_id = %slot.id,
                            "Slot vanished before release, not counting it as freed"
                        );
                    }
                    Err(err) => {
                        warn!(
                            appointment_id = %appointment.id,
                            slot_id = %slot.id,
                            error = %err,
                            "Failed to release slot, leaving appointment for next cycle"
                        );
                        continue;
                    }
                },
                Ok(None) => {}
                Err(err) => {
                    warn!(
                        appointment_id = %appointment.id,
                        error = %err,
                        "Failed to look up slot for appointment, skipping"
                    );
                    continue;
                }
            }

            match self.appointments.delete(appointment.id).await {
                Ok(()) => outcome.appointments_removed += 1,
                Err(err) => {
                    warn!(
                        appointment_id = %appointment.id,
                        error = %err,
                        "Failed to delete past appointment, will retry next cycle"
                    );
                }
            }
        }

        if outcome != ReclaimOutcome::default() {
            info!(
                slots_freed = outcome.slots_freed,
                appointments_removed = outcome.appointments_removed,
                "Reclaimed orphaned appointments"
            );
        }
        Ok(outcome)
    }

    /// The composed daily cycle: ensure the window, retire stale
    /// unbooked slots, reclaim past appointments. Every error is
    /// absorbed and logged here; the scheduler's trigger never sees a
    /// failure.
    pub async fn refresh(&self) -> RefreshSummary {
        let mut summary = RefreshSummary::default();

        match self.ensure_window(self.window_days).await {
            Ok(created) => summary.slots_created = created,
            Err(err) => error!(error = %err, "ensure_window failed in refresh cycle"),
        }

        match self.retire_stale_unbooked(self.retention_days).await {
            Ok(retired) => summary.slots_retired = retired,
            Err(err) => error!(error = %err, "retire_stale_unbooked failed in refresh cycle"),
        }

        match self.reclaim_orphaned_appointments().await {
            Ok(outcome) => summary.reclaimed = outcome,
            Err(err) => error!(error = %err, "reclaim_orphaned_appointments failed in refresh cycle"),
        }

        summary
    }

    async fn responsible_staff(&self) -> SlotResult<Uuid> {
        self.staff.find_responsible().await?.ok_or_else(|| {
            SlotError::Configuration(
                "No active admin or doctor found to own materialized slots".to_string(),
            )
        })
    }
}

/// Clears the re-entrancy flag on every exit path.
struct RunGuard<'a>(&'a AtomicBool);

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}
