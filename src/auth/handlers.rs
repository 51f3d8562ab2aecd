//! Auth HTTP handlers: register, login, change password, logout, me.

use axum::{extract::State, http::StatusCode, Json};
use axum_extra::extract::WithRejection;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidateEmail, ValidationErrors};

use crate::error::{AppError, AppResult};
use crate::handlers::http::AppState;
use crate::middleware::auth::AuthUser;
use crate::models::{AccountSummary, AccountView, Profile};
use crate::services::{Registration, Session};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    #[serde(flatten)]
    pub profile: Profile,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub new_password: String,
    pub confirm_password: String,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub success: bool,
    pub token: String,
    pub account: AccountSummary,
}

impl From<Session> for AuthResponse {
    fn from(session: Session) -> Self {
        Self {
            success: true,
            account: AccountSummary::from(&session.account),
            token: session.token,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

impl MessageResponse {
    fn ok(message: &str) -> Json<Self> {
        Json(Self {
            success: true,
            message: message.to_string(),
        })
    }
}

#[derive(Debug, Serialize)]
pub struct AccountResponse {
    pub success: bool,
    pub data: AccountView,
}

/// First human-readable message out of a validator report.
fn validation_error(errors: ValidationErrors) -> AppError {
    let message = errors
        .field_errors()
        .values()
        .flat_map(|errs| errs.iter())
        .find_map(|e| e.message.as_ref().map(|m| m.to_string()))
        .unwrap_or_else(|| errors.to_string());
    AppError::Validation(message)
}

fn validate_email(email: &str) -> AppResult<()> {
    if !email.trim().validate_email() {
        return Err(AppError::Validation("Invalid email".to_string()));
    }
    Ok(())
}

/// POST /api/auth/register
pub async fn register(
    State(state): State<AppState>,
    WithRejection(Json(body), _): WithRejection<Json<RegisterRequest>, AppError>,
) -> AppResult<(StatusCode, Json<AuthResponse>)> {
    validate_email(&body.email)?;
    body.profile.validate().map_err(validation_error)?;

    let session = state
        .accounts()
        .register(Registration {
            email: body.email,
            password: body.password,
            profile: body.profile,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(session.into())))
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    WithRejection(Json(body), _): WithRejection<Json<LoginRequest>, AppError>,
) -> AppResult<Json<AuthResponse>> {
    if body.email.trim().is_empty() || body.password.is_empty() {
        return Err(AppError::Validation(
            "Email and password are required".to_string(),
        ));
    }
    let session = state.accounts().login(&body.email, &body.password).await?;
    Ok(Json(session.into()))
}

/// POST /api/auth/change-password
pub async fn change_password(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
    WithRejection(Json(body), _): WithRejection<Json<ChangePasswordRequest>, AppError>,
) -> AppResult<Json<MessageResponse>> {
    state
        .accounts()
        .change_password(identity.account_id, body.new_password, &body.confirm_password)
        .await?;
    Ok(MessageResponse::ok("Password changed successfully"))
}

/// POST /api/auth/logout
pub async fn logout(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
) -> AppResult<Json<MessageResponse>> {
    state.accounts().logout(identity.account_id).await?;
    Ok(MessageResponse::ok("Logged out successfully"))
}

/// GET /api/auth/me
pub async fn me(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
) -> AppResult<Json<AccountResponse>> {
    let account = state.accounts().me(identity.account_id).await?;
    Ok(Json(AccountResponse {
        success: true,
        data: account.into(),
    }))
}

/// PUT /api/auth/me (profile fields only)
pub async fn update_me(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
    WithRejection(Json(profile), _): WithRejection<Json<Profile>, AppError>,
) -> AppResult<Json<AccountResponse>> {
    profile.validate().map_err(validation_error)?;
    let account = state
        .accounts()
        .update_profile(identity.account_id, profile)
        .await?;
    Ok(Json(AccountResponse {
        success: true,
        data: account.into(),
    }))
}
