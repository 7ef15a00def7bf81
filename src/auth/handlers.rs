use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use time::Date;
use tracing::{info, instrument, warn};

use crate::{
    auth::{
        dto::{LoginRequest, LoginResponse, PublicUser, RegisterRequest, UserSummary},
        extractors::{AuthUser, TOKEN_COOKIE},
        jwt::JwtKeys,
        password::{hash_password, verify_password},
        repo::{NewUser, User},
    },
    error::{ApiError, ApiResult},
    state::AppState,
    validate::{is_valid_email, parse_birthdate},
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/profile", get(profile))
        .route("/user", get(user))
}

/// Validated registration fields, ready to persist.
#[derive(Debug)]
struct Registration {
    first_name: String,
    last_name: String,
    email: String,
    password: String,
    phone: String,
    zipcode: String,
    birthdate: Date,
}

/// Field checks in the order clients rely on: password confirmation and
/// length are reported before the missing-phone/zipcode/birthdate
/// messages.
fn validate_registration(payload: RegisterRequest) -> ApiResult<Registration> {
    let first_name = require(payload.first_name, "First name is required")?;
    let last_name = require(payload.last_name, "Last name is required")?;
    let email = require(payload.email, "Email is required")?
        .trim()
        .to_lowercase();
    let password = require(payload.password, "Password is required")?;
    let password2 = require(payload.password2, "Please confirm password")?;
    if password != password2 {
        return Err(ApiError::validation("Passwords do not match"));
    }
    if password.len() < 6 {
        return Err(ApiError::validation(
            "Password must be at least 6 characters",
        ));
    }
    let phone = require(payload.phone, "Phone number is required")?;
    let zipcode = require(payload.zipcode, "Zip code is required")?;
    let birthdate = require(payload.birthdate, "Birthday is required")?;

    if !is_valid_email(&email) {
        return Err(ApiError::validation("Invalid email"));
    }
    let birthdate =
        parse_birthdate(&birthdate).ok_or_else(|| ApiError::validation("Invalid birthdate"))?;

    Ok(Registration {
        first_name,
        last_name,
        email,
        password,
        phone,
        zipcode,
        birthdate,
    })
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<PublicUser>)> {
    let reg = validate_registration(payload)?;

    if User::find_by_phone(&state.db, &reg.phone).await?.is_some() {
        warn!(phone = %reg.phone, "phone already in use");
        return Err(ApiError::conflict("Phone number already in use"));
    }
    if User::find_by_email(&state.db, &reg.email).await?.is_some() {
        warn!(email = %reg.email, "email already registered");
        return Err(ApiError::conflict("Email already exists"));
    }

    let hash = hash_password(&reg.password)?;
    let user = User::create(
        &state.db,
        NewUser {
            first_name: &reg.first_name,
            last_name: &reg.last_name,
            email: &reg.email,
            phone: &reg.phone,
            zipcode: &reg.zipcode,
            birthdate: reg.birthdate,
            password_hash: &hash,
        },
    )
    .await?;

    info!(user_id = %user.id, email = %user.email, "user registered");
    Ok((StatusCode::CREATED, Json(PublicUser::from(user))))
}

#[instrument(skip(state, jar, payload))]
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(payload): Json<LoginRequest>,
) -> ApiResult<(CookieJar, Json<LoginResponse>)> {
    let email = payload.email.trim().to_lowercase();

    let user = User::find_by_email(&state.db, &email)
        .await?
        .ok_or_else(|| {
            warn!(%email, "login unknown email");
            ApiError::not_found("User not found")
        })?;

    if !verify_password(&payload.password, &user.password_hash)? {
        warn!(%email, user_id = %user.id, "login invalid password");
        return Err(ApiError::unauthorized("Invalid credentials"));
    }

    let keys = JwtKeys::from_ref(&state);
    let token = keys
        .sign(user.id, &user.email, &user.first_name)
        .map_err(|e| ApiError::Internal(e.into()))?;

    let cookie = Cookie::build((TOKEN_COOKIE, token.clone()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::None)
        .build();

    info!(user_id = %user.id, email = %user.email, "user logged in");
    Ok((
        jar.add(cookie),
        Json(LoginResponse {
            message: "Logged in successfully".into(),
            token,
        }),
    ))
}

#[instrument(skip(state, auth))]
pub async fn profile(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<PublicUser>> {
    let user = User::find_by_id(&state.db, auth.0.sub)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;
    Ok(Json(PublicUser::from(user)))
}

#[instrument(skip(state, auth))]
pub async fn user(State(state): State<AppState>, auth: AuthUser) -> ApiResult<Json<UserSummary>> {
    let user = User::find_by_id(&state.db, auth.0.sub)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;
    Ok(Json(UserSummary {
        name: format!("{} {}", user.first_name, user.last_name),
        email: user.email,
        id: user.id,
    }))
}

fn require(field: Option<String>, msg: &'static str) -> ApiResult<String> {
    match field {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(ApiError::validation(msg)),
    }
}
