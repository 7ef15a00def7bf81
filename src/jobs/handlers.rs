use axum::{
    extract::{Path, Query, State},
    routing::{delete, get, patch, post},
    Json, Router,
};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::{
    auth::{extractors::AuthUser, repo::User},
    error::{ApiError, ApiResult},
    jobs::{
        dto::{
            ApplicantData, ApplyRequest, DeletedResponse, FilterQuery, JobFields,
            UpdateStatusRequest,
        },
        repo::{ApplicantRow, Application, Job, JobStatus, NewJob},
    },
    state::AppState,
    validate::is_valid_zipcode,
};

pub fn job_routes() -> Router<AppState> {
    Router::new()
        .route("/create", post(create_job))
        .route("/all", get(list_jobs))
        .route("/filter", get(filter_jobs))
        .route("/:id", get(get_job))
        .route("/update/:id", patch(edit_job))
        .route("/:id/status", patch(update_job_status))
        .route("/apply/:id", post(apply_to_job))
        .route("/:id/applicants", get(job_applicants))
        .route("/delete/:id", delete(delete_job))
}

/// Field checks shared by create and edit. One catch-all message,
/// matching the client contract.
fn validated_fields<'a>(
    body: &'a JobFields,
    fallback_creator: &'a str,
) -> ApiResult<NewJob<'a>> {
    let (Some(title), Some(description), Some(payment), Some(zipcode)) = (
        body.title.as_deref(),
        body.description.as_deref(),
        body.payment,
        body.zipcode.as_deref(),
    ) else {
        return Err(ApiError::validation("Please fill all fields correctly"));
    };
    if title.is_empty() || description.is_empty() || zipcode.len() < 5 || payment < 0.0 {
        return Err(ApiError::validation("Please fill all fields correctly"));
    }
    Ok(NewJob {
        title,
        creator: body.creator.as_deref().unwrap_or(fallback_creator),
        description,
        description_images: &body.description_images,
        location: zipcode,
        payment,
    })
}

#[instrument(skip(state, auth, body))]
pub async fn create_job(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(body): Json<JobFields>,
) -> ApiResult<Json<Job>> {
    let fields = validated_fields(&body, &auth.0.name)?;

    let user = User::find_by_id(&state.db, auth.0.sub)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    let job = Job::create(&state.db, user.id, fields).await?;
    info!(job_id = %job.id, user_id = %user.id, "job created");
    Ok(Json(job))
}

#[instrument(skip(state, _auth))]
pub async fn list_jobs(State(state): State<AppState>, _auth: AuthUser) -> ApiResult<Json<Vec<Job>>> {
    let jobs = Job::find_all(&state.db).await?;
    Ok(Json(jobs))
}

#[instrument(skip(state, _auth))]
pub async fn filter_jobs(
    State(state): State<AppState>,
    _auth: AuthUser,
    Query(q): Query<FilterQuery>,
) -> ApiResult<Json<Vec<Job>>> {
    if let Some(zip) = q.zipcode.as_deref() {
        if !is_valid_zipcode(zip) {
            return Err(ApiError::validation("Invalid zipcode format"));
        }
    }
    let status = match q.status.as_deref() {
        Some(s) => Some(
            s.parse::<JobStatus>()
                .map_err(|_| ApiError::validation("Invalid status value"))?,
        ),
        None => None,
    };

    let jobs = match (q.zipcode.as_deref(), status) {
        (Some(zip), None) => Job::find_by_zip(&state.db, zip).await?,
        (zip, status) => Job::filter(&state.db, zip, status).await?,
    };
    Ok(Json(jobs))
}

#[instrument(skip(state, _auth))]
pub async fn get_job(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Job>> {
    let job = Job::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::not_found("Job not found"))?;
    Ok(Json(job))
}

#[instrument(skip(state, auth, body))]
pub async fn edit_job(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(body): Json<JobFields>,
) -> ApiResult<Json<Job>> {
    let fields = validated_fields(&body, &auth.0.name)?;
    let job = Job::edit(&state.db, id, fields)
        .await?
        .ok_or_else(|| ApiError::not_found("Job not found"))?;
    info!(job_id = %job.id, user_id = %auth.0.sub, "job listing edited");
    Ok(Json(job))
}

#[instrument(skip(state, _auth, body))]
pub async fn update_job_status(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateStatusRequest>,
) -> ApiResult<Json<Job>> {
    let status = body
        .status
        .as_deref()
        .ok_or_else(|| ApiError::validation("Please provide a job ID and status"))?
        .parse::<JobStatus>()
        .map_err(|_| ApiError::validation("Invalid status value"))?;

    let job = Job::update_status(&state.db, id, status)
        .await?
        .ok_or_else(|| ApiError::not_found("Job not found"))?;
    info!(job_id = %job.id, status = %status, "job status updated");
    Ok(Json(job))
}

#[instrument(skip(state, auth, body))]
pub async fn apply_to_job(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(body): Json<ApplyRequest>,
) -> ApiResult<Json<Application>> {
    let message = body
        .message
        .as_deref()
        .filter(|m| !m.trim().is_empty())
        .ok_or_else(|| ApiError::validation("Message is required"))?;

    let job = Job::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::not_found("Job not found"))?;
    let user = User::find_by_id(&state.db, auth.0.sub)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    if Application::find_by_user_and_job(&state.db, user.id, job.id)
        .await?
        .is_some()
    {
        warn!(user_id = %user.id, job_id = %job.id, "duplicate application");
        return Err(ApiError::conflict("User has already applied to this job"));
    }

    let app = Application::apply(&state.db, user.id, job.id, message).await?;
    info!(application_id = %app.id, user_id = %user.id, job_id = %job.id, "application created");
    Ok(Json(app))
}

#[instrument(skip(state, _auth))]
pub async fn job_applicants(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Vec<ApplicantData>>> {
    Job::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::not_found("Job not found"))?;

    let applications = Application::list_for_job(&state.db, id).await?;
    if applications.is_empty() {
        return Err(ApiError::not_found("No applications found"));
    }

    let rows = ApplicantRow::for_job(&state.db, id).await?;
    let data = rows
        .into_iter()
        .map(|r| ApplicantData {
            name: format!("{} {}", r.first_name, r.last_name),
            email: r.email,
            phone: r.phone,
            date_applied: r.date_applied,
            message: r.message,
        })
        .collect();
    Ok(Json(data))
}

#[instrument(skip(state, auth))]
pub async fn delete_job(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<DeletedResponse>> {
    if !Job::delete(&state.db, id).await? {
        return Err(ApiError::not_found("Job not found"));
    }
    info!(job_id = %id, user_id = %auth.0.sub, "job deleted");
    Ok(Json(DeletedResponse {
        message: "Job deleted".into(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_fields() -> JobFields {
        JobFields {
            title: Some("Mow lawn".into()),
            description: Some("Front and back yard".into()),
            description_images: vec![],
            payment: Some(100.0),
            zipcode: Some("90210".into()),
            creator: None,
        }
    }

    #[test]
    fn validated_fields_accepts_complete_body() {
        let body = base_fields();
        let new = validated_fields(&body, "Ada").expect("valid");
        assert_eq!(new.title, "Mow lawn");
        assert_eq!(new.location, "90210");
        assert_eq!(new.creator, "Ada", "creator falls back to the token name");
    }

    #[test]
    fn validated_fields_rejects_short_zipcode() {
        let mut body = base_fields();
        body.zipcode = Some("1234".into());
        assert!(validated_fields(&body, "Ada").is_err());
    }

    #[test]
    fn validated_fields_rejects_negative_payment() {
        let mut body = base_fields();
        body.payment = Some(-5.0);
        assert!(validated_fields(&body, "Ada").is_err());
    }

    #[test]
    fn validated_fields_rejects_missing_title() {
        let mut body = base_fields();
        body.title = None;
        assert!(validated_fields(&body, "Ada").is_err());
    }

    #[test]
    fn validated_fields_prefers_explicit_creator() {
        let mut body = base_fields();
        body.creator = Some("Grace H".into());
        let new = validated_fields(&body, "Ada").expect("valid");
        assert_eq!(new.creator, "Grace H");
    }
}
