use crate::models::DbAppointment;
use chrono::NaiveDate;
use eyre::Result;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

/// Appointments dated strictly before `date`, oldest first.
pub async fn find_before(pool: &Pool<Postgres>, date: NaiveDate) -> Result<Vec<DbAppointment>> {
    let appointments = sqlx::query_as::<_, DbAppointment>(
        r#"
        SELECT id, date, booked_by, created_at
        FROM appointments
        WHERE date < $1
        ORDER BY date ASC
        "#,
    )
    .bind(date)
    .fetch_all(pool)
    .await?;

    Ok(appointments)
}

pub async fn delete_by_id(pool: &Pool<Postgres>, id: Uuid) -> Result<u64> {
    let result = sqlx::query(
        r#"
        DELETE FROM appointments
        WHERE id = $1
        "#,
    )
    .bind(id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected())
}
