use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::auth::repo::User;
use crate::validate::DATE_FORMAT;

/// Request body for registration. Every field is optional at the serde
/// level so missing fields produce the per-field messages the client
/// expects instead of a deserialization rejection.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub password2: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub zipcode: Option<String>,
    #[serde(default)]
    pub birthdate: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub message: String,
    pub token: String,
}

/// The identity as returned to clients: everything except the hash.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicUser {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub zipcode: String,
    pub birthdate: String,
    pub jobs_created: Vec<Uuid>,
    pub jobs_applied: Vec<Uuid>,
    pub jobs_completed: Vec<Uuid>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl From<User> for PublicUser {
    fn from(u: User) -> Self {
        let birthdate = u
            .birthdate
            .format(DATE_FORMAT)
            .unwrap_or_else(|_| u.birthdate.to_string());
        Self {
            id: u.id,
            first_name: u.first_name,
            last_name: u.last_name,
            email: u.email,
            phone: u.phone,
            zipcode: u.zipcode,
            birthdate,
            jobs_created: u.jobs_created,
            jobs_applied: u.jobs_applied,
            jobs_completed: u.jobs_completed,
            created_at: u.created_at,
        }
    }
}

/// Compact identity for `GET /api/user`.
#[derive(Debug, Serialize)]
pub struct UserSummary {
    pub name: String,
    pub email: String,
    pub id: Uuid,
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::{date, datetime};

    #[test]
    fn public_user_never_exposes_password_hash() {
        let user = User {
            id: Uuid::new_v4(),
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            email: "ada@example.com".into(),
            phone: "5551234567".into(),
            zipcode: "90210".into(),
            birthdate: date!(1990 - 04 - 17),
            password_hash: "$argon2id$v=19$secret".into(),
            jobs_created: vec![],
            jobs_applied: vec![],
            jobs_completed: vec![],
            created_at: datetime!(2024-01-01 00:00:00 UTC),
        };
        let json = serde_json::to_string(&PublicUser::from(user)).unwrap();
        assert!(!json.contains("argon2"));
        assert!(!json.contains("password"));
        assert!(json.contains("ada@example.com"));
        assert!(json.contains("\"birthdate\":\"1990-04-17\""));
    }

    #[test]
    fn register_request_tolerates_missing_fields() {
        let req: RegisterRequest = serde_json::from_str(r#"{"email":"a@b.co"}"#).unwrap();
        assert_eq!(req.email.as_deref(), Some("a@b.co"));
        assert!(req.first_name.is_none());
        assert!(req.password.is_none());
    }
}
