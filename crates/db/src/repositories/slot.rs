use crate::models::DbSlot;
use chrono::{NaiveDate, NaiveTime};
use clinislot_core::models::NewSlot;
use eyre::Result;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

/// Start times of the slots already stored for one clinic on one day.
pub async fn find_start_times(
    pool: &Pool<Postgres>,
    clinic_code: &str,
    date: NaiveDate,
) -> Result<Vec<NaiveTime>> {
    let rows: Vec<(NaiveTime,)> = sqlx::query_as(
        r#"
        SELECT start_time
        FROM slots
        WHERE clinic = $1 AND date = $2
        ORDER BY start_time ASC
        "#,
    )
    .bind(clinic_code)
    .bind(date)
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(|(t,)| t).collect())
}

/// Inserts a batch of new slots in one statement.
///
/// Duplicates of the (staff, date, start, clinic) identity are dropped
/// per row by `ON CONFLICT DO NOTHING`, so a concurrent materializer
/// inserting the same day never fails the batch. Returns the number of
/// rows actually written.
pub async fn insert_missing(pool: &Pool<Postgres>, slots: &[NewSlot]) -> Result<u64> {
    if slots.is_empty() {
        return Ok(0);
    }

    let mut clinics: Vec<String> = Vec::with_capacity(slots.len());
    let mut staff_ids: Vec<Uuid> = Vec::with_capacity(slots.len());
    let mut dates: Vec<NaiveDate> = Vec::with_capacity(slots.len());
    let mut starts: Vec<NaiveTime> = Vec::with_capacity(slots.len());
    let mut ends: Vec<NaiveTime> = Vec::with_capacity(slots.len());
    let mut notes: Vec<String> = Vec::with_capacity(slots.len());

    for slot in slots {
        clinics.push(slot.clinic.code().to_string());
        staff_ids.push(slot.staff_id);
        dates.push(slot.date);
        starts.push(slot.start_time);
        ends.push(slot.end_time);
        notes.push(slot.note.clone());
    }

    let result = sqlx::query(
        r#"
        INSERT INTO slots (clinic, staff_id, date, start_time, end_time, note)
        SELECT * FROM UNNEST(
            $1::varchar[], $2::uuid[], $3::date[], $4::time[], $5::time[], $6::text[]
        )
        ON CONFLICT (staff_id, date, start_time, clinic) DO NOTHING
        "#,
    )
    .bind(&clinics)
    .bind(&staff_ids)
    .bind(&dates)
    .bind(&starts)
    .bind(&ends)
    .bind(&notes)
    .execute(pool)
    .await?;

    Ok(result.rows_affected())
}

/// Deletes unbooked slots dated strictly before `cutoff`.
///
/// Booked rows are excluded unconditionally; this is the only steady
/// state deletion path for slot records.
pub async fn delete_stale_unbooked(pool: &Pool<Postgres>, cutoff: NaiveDate) -> Result<u64> {
    let result = sqlx::query(
        r#"
        DELETE FROM slots
        WHERE date < $1 AND is_booked = FALSE
        "#,
    )
    .bind(cutoff)
    .execute(pool)
    .await?;

    Ok(result.rows_affected())
}

/// Finds the booked slot linked to an appointment, if any.
pub async fn find_booked_by_appointment(
    pool: &Pool<Postgres>,
    appointment_id: Uuid,
) -> Result<Option<DbSlot>> {
    let slot = sqlx::query_as::<_, DbSlot>(
        r#"
        SELECT id, clinic, staff_id, date, start_time, end_time,
               is_available, is_booked, booked_by, appointment_id, note, created_at
        FROM slots
        WHERE appointment_id = $1 AND is_booked = TRUE
        "#,
    )
    .bind(appointment_id)
    .fetch_optional(pool)
    .await?;

    Ok(slot)
}

/// Returns a slot to the unbooked state, clearing its booking links.
pub async fn release(pool: &Pool<Postgres>, slot_id: Uuid) -> Result<u64> {
    let result = sqlx::query(
        r#"
        UPDATE slots
        SET is_booked = FALSE, booked_by = NULL, appointment_id = NULL
        WHERE id = $1
        "#,
    )
    .bind(slot_id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected())
}
