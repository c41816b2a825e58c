mod support;

use std::sync::Arc;

use clinislot_core::models::Clinic;
use clinislot_engine::config::JobTime;
use clinislot_engine::maintainer::WindowMaintainer;
use clinislot_engine::scheduler::{MaintenanceScheduler, ScheduleConfig};
use chrono::NaiveTime;
use pretty_assertions::assert_eq;
use uuid::Uuid;

use support::{FixedStaffDirectory, InMemoryAppointmentStore, InMemorySlotStore};

const TZ: chrono_tz::Tz = chrono_tz::America::New_York;

fn schedule_config() -> ScheduleConfig {
    ScheduleConfig {
        timezone: TZ,
        refresh_at: JobTime::new(0, 1),
        retire_at: JobTime::new(1, 0),
        reclaim_at: JobTime::new(2, 0),
    }
}

struct Harness {
    slots: Arc<InMemorySlotStore>,
    appointments: Arc<InMemoryAppointmentStore>,
    maintainer: Arc<WindowMaintainer>,
    staff_id: Uuid,
}

fn harness(staff: Option<Uuid>) -> Harness {
    let slots = Arc::new(InMemorySlotStore::new());
    let appointments = Arc::new(InMemoryAppointmentStore::new());
    let maintainer = Arc::new(WindowMaintainer::new(
        slots.clone(),
        appointments.clone(),
        Arc::new(FixedStaffDirectory(staff)),
        TZ,
        7,
        3,
    ));
    Harness {
        slots,
        appointments,
        maintainer,
        staff_id: staff.unwrap_or_else(Uuid::new_v4),
    }
}

fn time(hour: u32, minute: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, minute, 0).unwrap()
}

#[tokio::test(flavor = "multi_thread")]
async fn initialize_repairs_drift_then_ensures_the_window() {
    let h = harness(Some(Uuid::new_v4()));
    let today = h.maintainer.today();
    let yesterday = today - chrono::Duration::days(1);

    // Drift accumulated while the process was down: a stale unbooked
    // slot past retention, and a booked slot whose appointment has
    // already happened
    let stale = h.slots.insert_unbooked(
        Clinic::Riverside,
        h.staff_id,
        today - chrono::Duration::days(5),
        time(15, 0),
        time(15, 30),
    );
    let patient = Uuid::new_v4();
    let appointment_id = h.appointments.insert(yesterday, patient);
    let released = h.slots.insert_booked(
        Clinic::Downtown,
        h.staff_id,
        yesterday,
        time(7, 0),
        time(7, 30),
        patient,
        appointment_id,
    );

    let mut scheduler = MaintenanceScheduler::new(h.maintainer.clone(), schedule_config());
    assert!(!scheduler.is_running());

    scheduler.initialize().await.expect("initialize succeeds");
    assert!(scheduler.is_running());

    // Reclamation freed the booked slot and removed its appointment
    let freed = h
        .slots
        .all()
        .into_iter()
        .find(|s| s.id == released)
        .expect("released slot still exists");
    assert!(!freed.is_booked);
    assert!(freed.appointment_id.is_none());
    assert_eq!(h.appointments.len(), 0);

    // Retirement removed the stale unbooked slot but not the freed one
    assert!(h.slots.all().iter().all(|s| s.id != stale));

    // The forward window is fully materialized: 142 for any 7
    // consecutive days, plus the freed slot from yesterday
    assert_eq!(h.slots.len(), 143);

    scheduler.shutdown().await.expect("shutdown succeeds");
    assert!(!scheduler.is_running());
}

#[tokio::test(flavor = "multi_thread")]
async fn double_initialize_is_rejected() {
    let h = harness(Some(Uuid::new_v4()));
    let mut scheduler = MaintenanceScheduler::new(h.maintainer.clone(), schedule_config());

    scheduler.initialize().await.expect("first initialize");
    let err = scheduler
        .initialize()
        .await
        .expect_err("second initialize fails while running");
    assert!(err.to_string().contains("already running"));
    assert!(scheduler.is_running());

    scheduler.shutdown().await.expect("shutdown succeeds");
}

#[tokio::test(flavor = "multi_thread")]
async fn shutdown_is_idempotent() {
    let h = harness(Some(Uuid::new_v4()));
    let mut scheduler = MaintenanceScheduler::new(h.maintainer.clone(), schedule_config());

    // Stopping before starting is a no-op
    scheduler.shutdown().await.expect("shutdown when never started");

    scheduler.initialize().await.expect("initialize succeeds");
    scheduler.shutdown().await.expect("first shutdown");
    scheduler.shutdown().await.expect("second shutdown is a no-op");
    assert!(!scheduler.is_running());
}

#[tokio::test(flavor = "multi_thread")]
async fn initialize_survives_a_missing_staff_configuration() {
    let h = harness(None);
    let mut scheduler = MaintenanceScheduler::new(h.maintainer.clone(), schedule_config());

    // The startup window pass fails for lack of staff; the failure is
    // absorbed and the recurring triggers still come up
    scheduler.initialize().await.expect("initialize succeeds");
    assert!(scheduler.is_running());
    assert_eq!(h.slots.len(), 0);

    scheduler.shutdown().await.expect("shutdown succeeds");
}
