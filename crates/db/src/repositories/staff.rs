use crate::models::DbStaff;
use eyre::Result;
use sqlx::{Pool, Postgres};

/// Picks the staff member responsible for materialized slots.
///
/// Active admins are preferred over active doctors; `None` means the
/// directory has no eligible member and the caller must treat the cycle
/// as unconfigured.
pub async fn find_responsible(pool: &Pool<Postgres>) -> Result<Option<DbStaff>> {
    let staff = sqlx::query_as::<_, DbStaff>(
        r#"
        SELECT id, name, role, active, created_at
        FROM staff
        WHERE role IN ('admin', 'doctor') AND active = TRUE
        ORDER BY CASE role WHEN 'admin' THEN 0 ELSE 1 END, created_at ASC
        LIMIT 1
        "#,
    )
    .fetch_optional(pool)
    .await?;

    Ok(staff)
}
