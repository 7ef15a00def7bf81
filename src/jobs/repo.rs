use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use std::fmt;
use std::str::FromStr;
use time::OffsetDateTime;
use uuid::Uuid;

/// Job lifecycle status. Any value may be set at any time; the lifecycle
/// order Open -> In Progress -> Completed is not enforced as a state
/// machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "job_status")]
pub enum JobStatus {
    Open,
    #[serde(rename = "In Progress")]
    #[sqlx(rename = "In Progress")]
    InProgress,
    Completed,
}

impl FromStr for JobStatus {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Open" => Ok(JobStatus::Open),
            "In Progress" => Ok(JobStatus::InProgress),
            "Completed" => Ok(JobStatus::Completed),
            _ => Err(()),
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            JobStatus::Open => "Open",
            JobStatus::InProgress => "In Progress",
            JobStatus::Completed => "Completed",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub id: Uuid,
    pub title: String,
    pub creator: String,
    pub description: String,
    pub description_images: Vec<String>,
    pub created_by: Uuid,
    /// Zip code the job is located in.
    pub location: String,
    pub payment: f64,
    pub status: JobStatus,
    pub applicants: Vec<Uuid>,
    pub accepted_applicant: Option<Uuid>,
    #[serde(with = "time::serde::rfc3339")]
    pub date_created: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339::option")]
    pub date_completed: Option<OffsetDateTime>,
}

pub struct NewJob<'a> {
    pub title: &'a str,
    pub creator: &'a str,
    pub description: &'a str,
    pub description_images: &'a [String],
    pub location: &'a str,
    pub payment: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Application {
    pub id: Uuid,
    pub user_id: Uuid,
    pub job_id: Uuid,
    pub message: String,
    #[serde(with = "time::serde::rfc3339")]
    pub date_applied: OffsetDateTime,
}

const JOB_COLUMNS: &str = "id, title, creator, description, description_images, created_by, \
     location, payment, status, applicants, accepted_applicant, date_created, date_completed";

const APPLICATION_COLUMNS: &str = "id, user_id, job_id, message, date_applied";

impl Job {
    /// Insert the job and append its id to the owner's created-jobs list.
    /// Both writes commit or neither does.
    pub async fn create(db: &PgPool, owner_id: Uuid, new: NewJob<'_>) -> anyhow::Result<Job> {
        let mut tx = db.begin().await?;

        let job = sqlx::query_as::<_, Job>(&format!(
            r#"
            INSERT INTO jobs (title, creator, description, description_images, created_by, location, payment)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {JOB_COLUMNS}
            "#
        ))
        .bind(new.title)
        .bind(new.creator)
        .bind(new.description)
        .bind(new.description_images)
        .bind(owner_id)
        .bind(new.location)
        .bind(new.payment)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query("UPDATE users SET jobs_created = array_append(jobs_created, $1) WHERE id = $2")
            .bind(job.id)
            .bind(owner_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(job)
    }

    pub async fn find_by_id(db: &PgPool, id: Uuid) -> anyhow::Result<Option<Job>> {
        let job =
            sqlx::query_as::<_, Job>(&format!("SELECT {JOB_COLUMNS} FROM jobs WHERE id = $1"))
                .bind(id)
                .fetch_optional(db)
                .await?;
        Ok(job)
    }

    pub async fn find_all(db: &PgPool) -> anyhow::Result<Vec<Job>> {
        let jobs = sqlx::query_as::<_, Job>(&format!(
            "SELECT {JOB_COLUMNS} FROM jobs ORDER BY date_created DESC"
        ))
        .fetch_all(db)
        .await?;
        Ok(jobs)
    }

    pub async fn find_by_zip(db: &PgPool, zipcode: &str) -> anyhow::Result<Vec<Job>> {
        let jobs = sqlx::query_as::<_, Job>(&format!(
            "SELECT {JOB_COLUMNS} FROM jobs WHERE location = $1 ORDER BY date_created DESC"
        ))
        .bind(zipcode)
        .fetch_all(db)
        .await?;
        Ok(jobs)
    }

    /// Intersection filter; a `None` for either criterion means "any".
    pub async fn filter(
        db: &PgPool,
        zipcode: Option<&str>,
        status: Option<JobStatus>,
    ) -> anyhow::Result<Vec<Job>> {
        let jobs = sqlx::query_as::<_, Job>(&format!(
            r#"
            SELECT {JOB_COLUMNS} FROM jobs
            WHERE ($1::text IS NULL OR location = $1)
              AND ($2::job_status IS NULL OR status = $2)
            ORDER BY date_created DESC
            "#
        ))
        .bind(zipcode)
        .bind(status)
        .fetch_all(db)
        .await?;
        Ok(jobs)
    }

    /// No transition-order guard; moving to Completed stamps the
    /// completion time, moving away clears it.
    pub async fn update_status(
        db: &PgPool,
        id: Uuid,
        status: JobStatus,
    ) -> anyhow::Result<Option<Job>> {
        let job = sqlx::query_as::<_, Job>(&format!(
            r#"
            UPDATE jobs
            SET status = $2,
                date_completed = CASE WHEN $2 = 'Completed'::job_status THEN now() END
            WHERE id = $1
            RETURNING {JOB_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(status)
        .fetch_optional(db)
        .await?;
        Ok(job)
    }

    pub async fn edit(db: &PgPool, id: Uuid, new: NewJob<'_>) -> anyhow::Result<Option<Job>> {
        let job = sqlx::query_as::<_, Job>(&format!(
            r#"
            UPDATE jobs
            SET title = $2, description = $3, description_images = $4, location = $5, payment = $6
            WHERE id = $1
            RETURNING {JOB_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(new.title)
        .bind(new.description)
        .bind(new.description_images)
        .bind(new.location)
        .bind(new.payment)
        .fetch_optional(db)
        .await?;
        Ok(job)
    }

    /// Remove the job and pull its id from the creator's created-jobs
    /// list in one transaction. Applications that referenced the job are
    /// left in place; the profile joins skip them.
    pub async fn delete(db: &PgPool, id: Uuid) -> anyhow::Result<bool> {
        let mut tx = db.begin().await?;

        let deleted: Option<(Uuid,)> =
            sqlx::query_as("DELETE FROM jobs WHERE id = $1 RETURNING created_by")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;

        let Some((owner_id,)) = deleted else {
            tx.rollback().await?;
            return Ok(false);
        };

        sqlx::query("UPDATE users SET jobs_created = array_remove(jobs_created, $1) WHERE id = $2")
            .bind(id)
            .bind(owner_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(true)
    }
}

impl Application {
    pub async fn find_by_user_and_job(
        db: &PgPool,
        user_id: Uuid,
        job_id: Uuid,
    ) -> anyhow::Result<Option<Application>> {
        let app = sqlx::query_as::<_, Application>(&format!(
            "SELECT {APPLICATION_COLUMNS} FROM applications WHERE user_id = $1 AND job_id = $2"
        ))
        .bind(user_id)
        .bind(job_id)
        .fetch_optional(db)
        .await?;
        Ok(app)
    }

    pub async fn list_for_job(db: &PgPool, job_id: Uuid) -> anyhow::Result<Vec<Application>> {
        let apps = sqlx::query_as::<_, Application>(&format!(
            "SELECT {APPLICATION_COLUMNS} FROM applications WHERE job_id = $1 ORDER BY date_applied ASC"
        ))
        .bind(job_id)
        .fetch_all(db)
        .await?;
        Ok(apps)
    }

    pub async fn list_for_user(db: &PgPool, user_id: Uuid) -> anyhow::Result<Vec<Application>> {
        let apps = sqlx::query_as::<_, Application>(&format!(
            "SELECT {APPLICATION_COLUMNS} FROM applications WHERE user_id = $1 ORDER BY date_applied ASC"
        ))
        .bind(user_id)
        .fetch_all(db)
        .await?;
        Ok(apps)
    }

    /// Create the application and append its id to the job's applicant
    /// list and the user's applied list, all in one transaction. The
    /// unique (user_id, job_id) index backstops the caller's duplicate
    /// pre-check under concurrent applies.
    pub async fn apply(
        db: &PgPool,
        user_id: Uuid,
        job_id: Uuid,
        message: &str,
    ) -> anyhow::Result<Application> {
        let mut tx = db.begin().await?;

        let app = sqlx::query_as::<_, Application>(&format!(
            r#"
            INSERT INTO applications (user_id, job_id, message)
            VALUES ($1, $2, $3)
            RETURNING {APPLICATION_COLUMNS}
            "#
        ))
        .bind(user_id)
        .bind(job_id)
        .bind(message)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query("UPDATE jobs SET applicants = array_append(applicants, $1) WHERE id = $2")
            .bind(app.id)
            .bind(job_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("UPDATE users SET jobs_applied = array_append(jobs_applied, $1) WHERE id = $2")
            .bind(app.id)
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(app)
    }
}

/// Applicant row joined with the applying user, for the per-job
/// applicants listing. Applications whose user record is gone drop out
/// of the join.
#[derive(Debug, FromRow)]
pub struct ApplicantRow {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub date_applied: OffsetDateTime,
    pub message: String,
}

impl ApplicantRow {
    pub async fn for_job(db: &PgPool, job_id: Uuid) -> anyhow::Result<Vec<ApplicantRow>> {
        let rows = sqlx::query_as::<_, ApplicantRow>(
            r#"
            SELECT u.first_name, u.last_name, u.email, u.phone, a.date_applied, a.message
            FROM applications a
            JOIN users u ON u.id = a.user_id
            WHERE a.job_id = $1
            ORDER BY a.date_applied ASC
            "#,
        )
        .bind(job_id)
        .fetch_all(db)
        .await?;
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_parses_the_three_values() {
        assert_eq!("Open".parse::<JobStatus>().unwrap(), JobStatus::Open);
        assert_eq!(
            "In Progress".parse::<JobStatus>().unwrap(),
            JobStatus::InProgress
        );
        assert_eq!(
            "Completed".parse::<JobStatus>().unwrap(),
            JobStatus::Completed
        );
        assert!("open".parse::<JobStatus>().is_err());
        assert!("Done".parse::<JobStatus>().is_err());
        assert!("".parse::<JobStatus>().is_err());
    }

    #[test]
    fn status_display_matches_wire_form() {
        assert_eq!(JobStatus::InProgress.to_string(), "In Progress");
        assert_eq!(
            serde_json::to_string(&JobStatus::InProgress).unwrap(),
            r#""In Progress""#
        );
        let parsed: JobStatus = serde_json::from_str(r#""In Progress""#).unwrap();
        assert_eq!(parsed, JobStatus::InProgress);
    }
}

#[cfg(test)]
mod db_tests {
    use super::*;
    use crate::auth::repo::{NewUser, User};
    use crate::error::ApiError;
    use axum::http::StatusCode;
    use time::macros::date;

    async fn seed_user(db: &PgPool, email: &str, phone: &str) -> User {
        User::create(
            db,
            NewUser {
                first_name: "Test",
                last_name: "User",
                email,
                phone,
                zipcode: "90210",
                birthdate: date!(1990 - 01 - 01),
                password_hash: "$argon2id$v=19$not-a-real-hash",
            },
        )
        .await
        .expect("seed user")
    }

    async fn seed_job(db: &PgPool, owner: &User) -> Job {
        Job::create(
            db,
            owner.id,
            NewJob {
                title: "Mow lawn",
                creator: "Test User",
                description: "Front and back yard",
                description_images: &[],
                location: "90210",
                payment: 100.0,
            },
        )
        .await
        .expect("create job")
    }

    #[sqlx::test]
    async fn create_inserts_job_and_appends_owner_list(pool: PgPool) {
        let owner = seed_user(&pool, "owner@example.com", "5550000001").await;
        let job = seed_job(&pool, &owner).await;

        let fetched = Job::find_by_id(&pool, job.id)
            .await
            .unwrap()
            .expect("job row exists");
        assert_eq!(fetched.status, JobStatus::Open);
        assert_eq!(fetched.created_by, owner.id);

        let owner = User::find_by_id(&pool, owner.id).await.unwrap().unwrap();
        assert!(
            owner.jobs_created.contains(&job.id),
            "owner list and job row commit together"
        );
    }

    #[sqlx::test]
    async fn apply_links_application_to_job_and_user(pool: PgPool) {
        let owner = seed_user(&pool, "owner@example.com", "5550000001").await;
        let applicant = seed_user(&pool, "applicant@example.com", "5550000002").await;
        let job = seed_job(&pool, &owner).await;

        let app = Application::apply(&pool, applicant.id, job.id, "I have a mower")
            .await
            .expect("first apply");

        let job = Job::find_by_id(&pool, job.id).await.unwrap().unwrap();
        assert!(job.applicants.contains(&app.id));
        let applicant = User::find_by_id(&pool, applicant.id).await.unwrap().unwrap();
        assert!(applicant.jobs_applied.contains(&app.id));
    }

    #[sqlx::test]
    async fn second_apply_for_same_pair_is_conflict(pool: PgPool) {
        let owner = seed_user(&pool, "owner@example.com", "5550000001").await;
        let applicant = seed_user(&pool, "applicant@example.com", "5550000002").await;
        let job = seed_job(&pool, &owner).await;

        Application::apply(&pool, applicant.id, job.id, "first")
            .await
            .expect("first apply");
        let err = Application::apply(&pool, applicant.id, job.id, "second")
            .await
            .unwrap_err();

        let api = ApiError::from(err);
        assert_eq!(api.status_code(), StatusCode::CONFLICT);
        assert_eq!(api.to_string(), "User has already applied to this job");

        let apps = Application::list_for_job(&pool, job.id).await.unwrap();
        assert_eq!(apps.len(), 1, "pair count stays at one after a retry");
        let applicant = User::find_by_id(&pool, applicant.id).await.unwrap().unwrap();
        assert_eq!(
            applicant.jobs_applied.len(),
            1,
            "failed apply must not leave a dangling list entry"
        );
    }
}
