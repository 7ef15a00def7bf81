use axum::{extract::State, routing::get, Json, Router};
use tracing::instrument;

use crate::{
    auth::{extractors::AuthUser, repo::User},
    error::{ApiError, ApiResult},
    jobs::repo::Application,
    profile::repo::{AppDataRow, JobsDataRow},
    state::AppState,
};

pub fn profile_routes() -> Router<AppState> {
    Router::new()
        .route("/appdata", get(app_data))
        .route("/jobsdata", get(jobs_data))
}

/// The user's submitted applications, each resolved to its job.
#[instrument(skip(state, auth))]
pub async fn app_data(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<Vec<AppDataRow>>> {
    let user = User::find_by_id(&state.db, auth.0.sub)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    let applications = Application::list_for_user(&state.db, user.id).await?;
    if applications.is_empty() {
        return Err(ApiError::not_found("No applications found"));
    }

    // Applications whose job has since been deleted are dropped by the
    // join, so this can be shorter than the list above.
    let rows = AppDataRow::for_user(&state.db, user.id).await?;
    Ok(Json(rows))
}

/// The user's created jobs with applicant counts.
#[instrument(skip(state, auth))]
pub async fn jobs_data(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<Vec<JobsDataRow>>> {
    let user = User::find_by_id(&state.db, auth.0.sub)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    if user.jobs_created.is_empty() {
        return Err(ApiError::not_found("No jobs found"));
    }

    let rows = JobsDataRow::for_user(&state.db, user.id).await?;
    Ok(Json(rows))
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn app_data_row_serializes_camel_case() {
        let row = AppDataRow {
            title: "Mow lawn".into(),
            creator: "Ada".into(),
            date_applied: datetime!(2024-06-01 12:00:00 UTC),
            status: crate::jobs::repo::JobStatus::Open,
            message: "I have a mower".into(),
        };
        let json = serde_json::to_string(&row).unwrap();
        assert!(json.contains("\"dateApplied\""));
        assert!(json.contains("\"status\":\"Open\""));
    }

    #[test]
    fn jobs_data_row_serializes_applicant_count() {
        let row = JobsDataRow {
            title: "Paint fence".into(),
            description: "White, two coats".into(),
            status: crate::jobs::repo::JobStatus::InProgress,
            date_created: datetime!(2024-06-01 12:00:00 UTC),
            applicants: 3,
            id: uuid::Uuid::new_v4(),
        };
        let json = serde_json::to_string(&row).unwrap();
        assert!(json.contains("\"applicants\":3"));
        assert!(json.contains("\"status\":\"In Progress\""));
    }
}
