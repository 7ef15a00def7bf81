use serde::Serialize;
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::jobs::repo::JobStatus;

/// One of the user's applications joined with its job. Applications
/// whose job has been deleted fall out of the join rather than erroring.
#[derive(Debug, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct AppDataRow {
    pub title: String,
    pub creator: String,
    #[serde(with = "time::serde::rfc3339")]
    pub date_applied: OffsetDateTime,
    pub status: JobStatus,
    pub message: String,
}

impl AppDataRow {
    pub async fn for_user(db: &PgPool, user_id: Uuid) -> anyhow::Result<Vec<AppDataRow>> {
        let rows = sqlx::query_as::<_, AppDataRow>(
            r#"
            SELECT j.title, j.creator, a.date_applied, j.status, a.message
            FROM applications a
            JOIN jobs j ON j.id = a.job_id
            WHERE a.user_id = $1
            ORDER BY a.date_applied ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(db)
        .await?;
        Ok(rows)
    }
}

/// One of the user's created jobs with its applicant count.
#[derive(Debug, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct JobsDataRow {
    pub title: String,
    pub description: String,
    pub status: JobStatus,
    #[serde(with = "time::serde::rfc3339")]
    pub date_created: OffsetDateTime,
    pub applicants: i32,
    pub id: Uuid,
}

impl JobsDataRow {
    pub async fn for_user(db: &PgPool, user_id: Uuid) -> anyhow::Result<Vec<JobsDataRow>> {
        let rows = sqlx::query_as::<_, JobsDataRow>(
            r#"
            SELECT j.title, j.description, j.status, j.date_created,
                   cardinality(j.applicants) AS applicants, j.id
            FROM jobs j
            WHERE j.created_by = $1
            ORDER BY j.date_created DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(db)
        .await?;
        Ok(rows)
    }
}
