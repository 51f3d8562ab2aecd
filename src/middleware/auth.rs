//! Auth middleware: bearer token verification for protected routes.

use axum::{
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::Response,
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};
use tracing::debug;

use crate::auth::Identity;
use crate::error::AppError;
use crate::handlers::http::AppState;

const NO_TOKEN: &str = "No token provided";

/// Extractor: identity attached by [`require_auth`].
#[derive(Clone, Debug)]
pub struct AuthUser(pub Identity);

#[axum::async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Identity>()
            .cloned()
            .map(AuthUser)
            .ok_or_else(|| AppError::Unauthorized(NO_TOKEN.to_string()))
    }
}

/// Middleware: require `Authorization: Bearer <token>`, verify it and attach
/// the decoded [`Identity`] to the request.
pub async fn require_auth(
    State(state): State<AppState>,
    bearer: Option<TypedHeader<Authorization<Bearer>>>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let Some(TypedHeader(Authorization(bearer))) = bearer else {
        debug!("rejected request: missing bearer token");
        return Err(AppError::Unauthorized(NO_TOKEN.to_string()));
    };

    let identity = state.accounts().authenticate(bearer.token()).await?;
    request.extensions_mut().insert(identity);
    Ok(next.run(request).await)
}
