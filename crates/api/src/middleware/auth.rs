//! Authentication middleware for protected routes.

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::{IntoResponse, Response},
};
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{AppState, error::ApiError};
use invoicely_core::auth::AuthError;
use invoicely_core::invoice::Actor;
use invoicely_db::entities::users;
use invoicely_shared::{Claims, TokenType};

/// Extracts the bearer token from the Authorization header.
fn extract_bearer_token(header: &str) -> Option<&str> {
    header
        .strip_prefix("Bearer ")
        .or_else(|| header.strip_prefix("bearer "))
}

/// Authentication middleware that validates JWT access tokens.
///
/// This middleware:
/// 1. Extracts the Bearer token from the Authorization header
/// 2. Validates it as an access token
/// 3. Rejects tokens whose `jti` has been revoked
/// 4. Stores the claims in request extensions for handlers to access
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let auth_header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    let Some(token) = auth_header.and_then(extract_bearer_token) else {
        return ApiError::unauthorized(
            "MISSING_TOKEN",
            "Authorization header with Bearer token is required",
        )
        .into_response();
    };

    let claims = match state.jwt_service.validate_token_of(token, TokenType::Access) {
        Ok(claims) => claims,
        Err(e) => return ApiError::from(e).into_response(),
    };

    match state.revocations().is_revoked(claims.jti).await {
        Ok(false) => {}
        Ok(true) => {
            return ApiError::unauthorized("TOKEN_REVOKED", "Token has been revoked")
                .into_response();
        }
        Err(e) => return ApiError::from(e).into_response(),
    }

    request.extensions_mut().insert(AuthUser(claims));
    next.run(request).await
}

/// Extractor for the verified token claims.
///
/// Only available behind [`auth_middleware`].
#[derive(Debug, Clone)]
pub struct AuthUser(pub Claims);

impl AuthUser {
    /// Returns the user ID from the claims.
    #[must_use]
    pub const fn user_id(&self) -> Uuid {
        self.0.user_id()
    }

    /// Returns the token's unique id.
    #[must_use]
    pub const fn jti(&self) -> Uuid {
        self.0.jti
    }

    /// Returns when the token stops being valid.
    #[must_use]
    pub fn expires_at(&self) -> DateTime<Utc> {
        self.0.expires_at()
    }

    /// Returns the inner claims.
    #[must_use]
    pub const fn claims(&self) -> &Claims {
        &self.0
    }
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Self>()
            .cloned()
            .ok_or_else(|| ApiError::unauthorized("UNAUTHORIZED", "Authentication required"))
    }
}

/// The authenticated user as currently stored.
///
/// Claims are a snapshot from login time; permission checks use the live
/// row so that deactivation and admin changes apply immediately.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    /// The user row.
    pub user: users::Model,
    /// The token that authenticated the request.
    pub auth: AuthUser,
}

impl CurrentUser {
    /// Builds the permission actor for domain operations.
    #[must_use]
    pub const fn actor(&self) -> Actor {
        Actor::new(self.user.id, self.user.is_admin, self.user.is_active)
    }

    /// Fails unless the user is an administrator.
    ///
    /// # Errors
    ///
    /// Returns 403 for non-admins.
    pub fn require_admin(&self) -> Result<(), ApiError> {
        if self.user.is_admin {
            Ok(())
        } else {
            Err(AuthError::AdminRequired.into())
        }
    }
}

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth = AuthUser::from_request_parts(parts, state).await?;

        let user = state
            .users()
            .find_by_id(auth.user_id())
            .await?
            .ok_or(AuthError::UserNotFound)?;

        if !user.is_active {
            return Err(AuthError::AccountDisabled.into());
        }

        Ok(Self { user, auth })
    }
}
