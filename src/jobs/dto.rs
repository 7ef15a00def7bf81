use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Body for job create and edit. Single catch-all validation message on
/// the handler side, so the fields stay optional here.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobFields {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub description_images: Vec<String>,
    #[serde(default)]
    pub payment: Option<f64>,
    #[serde(default)]
    pub zipcode: Option<String>,
    #[serde(default)]
    pub creator: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct FilterQuery {
    #[serde(default)]
    pub zipcode: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

/// Status arrives as a free string and is parsed against the enum so a
/// bad value gets a 400, not a body-rejection.
#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ApplyRequest {
    #[serde(default)]
    pub message: Option<String>,
}

/// One row of `GET /api/jobs/:id/applicants`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicantData {
    pub name: String,
    pub email: String,
    pub phone: String,
    #[serde(with = "time::serde::rfc3339")]
    pub date_applied: OffsetDateTime,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct DeletedResponse {
    pub message: String,
}
