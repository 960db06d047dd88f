use sqlx::mysql::MySqlConnection;
use sqlx::Connection;
use tracing::{debug, info, instrument, warn};

use crate::config::MySqlParams;
use crate::db;
use crate::error::DbError;
use crate::users::repo_types::{RenameOutcome, UserRecord};

/// Find users matching both `user_name` and `email`. No match is `Ok(vec![])`.
#[instrument(skip(params), fields(database = %params.database))]
pub async fn find_user(
    params: &MySqlParams,
    user_name: &str,
    email: &str,
) -> Result<Vec<UserRecord>, DbError> {
    let mut conn = db::connect(params).await?;
    let rows = sqlx::query_as::<_, UserRecord>(
        r#"
        SELECT *
        FROM users
        WHERE user_name = ? AND email = ?
        "#,
    )
    .bind(user_name)
    .bind(email)
    .fetch_all(&mut conn)
    .await
    .map_err(DbError::Statement);
    close(conn).await;

    let rows = rows?;
    debug!(rows = rows.len(), "users matched");
    for row in &rows {
        debug!(id = ?row.id(), user_name = ?row.user_name(), email = ?row.email(), "user");
    }
    Ok(rows)
}

/// Set `user_name` for `user_id` and commit straight away.
#[instrument(skip(params), fields(database = %params.database))]
pub async fn rename_user(
    params: &MySqlParams,
    user_id: i64,
    new_name: &str,
) -> Result<RenameOutcome, DbError> {
    let mut conn = db::connect(params).await?;
    let rows = update_user_name(&mut conn, user_id, new_name).await;
    close(conn).await;

    let outcome = RenameOutcome::from_rows_affected(rows?);
    info!(user_id, rows = outcome.rows_affected(), "user_name updated");
    Ok(outcome)
}

async fn update_user_name(
    conn: &mut MySqlConnection,
    user_id: i64,
    new_name: &str,
) -> Result<u64, DbError> {
    // An early return drops `tx`, which rolls it back.
    let mut tx = conn.begin().await.map_err(DbError::Statement)?;
    let done = sqlx::query(
        r#"
        UPDATE users
        SET user_name = ?
        WHERE id = ?
        "#,
    )
    .bind(new_name)
    .bind(user_id)
    .execute(&mut *tx)
    .await
    .map_err(DbError::Statement)?;
    tx.commit().await.map_err(DbError::Statement)?;
    Ok(done.rows_affected())
}

async fn close(conn: MySqlConnection) {
    if let Err(e) = conn.close().await {
        warn!(error = %e, "closing mysql connection failed");
    }
}
