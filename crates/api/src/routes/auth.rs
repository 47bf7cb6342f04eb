//! Authentication routes: login, refresh, logout, profile, registration and
//! user administration.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
};
use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;

use super::MessageResponse;
use crate::{
    AppState,
    error::{ApiError, ApiResult},
    middleware::auth::CurrentUser,
};
use invoicely_core::auth::{
    AuthError, hash_password, validate_password, validate_registration, validate_user_update,
    verify_password,
};
use invoicely_db::{CreateUserInput, UserUpdate, entities::users};
use invoicely_shared::TokenType;
use invoicely_shared::auth::{
    ChangePasswordRequest, LoginRequest, LoginResponse, RefreshRequest, RegisterRequest,
    TokenPair, UpdateProfileRequest, UpdateUserRequest, UserInfo, UsersResponse,
};

/// Routes reachable without a token.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/login", post(login))
        .route("/auth/refresh", post(refresh))
}

/// Routes behind the auth middleware.
pub fn protected_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/logout", post(logout))
        .route("/auth/me", get(me).put(update_me))
        .route("/auth/change-password", post(change_password))
        .route("/auth/register", post(register))
        .route("/auth/users", get(list_users))
        .route(
            "/auth/users/{id}",
            get(get_user).put(update_user).delete(deactivate_user),
        )
}

fn user_info(user: users::Model) -> UserInfo {
    UserInfo {
        id: user.id,
        username: user.username,
        email: user.email,
        first_name: user.first_name,
        last_name: user.last_name,
        phone: user.phone,
        is_admin: user.is_admin,
        is_active: user.is_active,
        last_login: user.last_login.map(|t| t.with_timezone(&Utc)),
    }
}

/// POST /auth/login - Authenticate user and return tokens.
async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    let users = state.users();

    let Some(user) = users.find_by_username(payload.username.trim()).await? else {
        info!(username = %payload.username, "Login attempt for non-existent user");
        return Err(AuthError::InvalidCredentials.into());
    };

    if !verify_password(&payload.password, &user.password_hash).map_err(AuthError::from)? {
        info!(user_id = %user.id, "Failed login attempt - invalid password");
        return Err(AuthError::InvalidCredentials.into());
    }

    if !user.is_active {
        return Err(AuthError::AccountDisabled.into());
    }

    let access_token = state
        .jwt_service
        .generate_access_token(user.id, &user.username, user.is_admin)?;
    let refresh_token = state
        .jwt_service
        .generate_refresh_token(user.id, &user.username, user.is_admin)?;

    users.touch_last_login(user.id).await?;
    let user = users.find_by_id(user.id).await?.ok_or(AuthError::UserNotFound)?;

    info!(user_id = %user.id, "User logged in successfully");

    Ok(Json(LoginResponse {
        user: user_info(user),
        access_token,
        refresh_token,
        expires_in: state.jwt_service.access_token_expires_in(),
    }))
}

/// POST /auth/refresh - Exchange a refresh token for a new access token.
async fn refresh(
    State(state): State<AppState>,
    Json(payload): Json<RefreshRequest>,
) -> ApiResult<Json<TokenPair>> {
    let claims = state
        .jwt_service
        .validate_token_of(&payload.refresh_token, TokenType::Refresh)?;

    if state.revocations().is_revoked(claims.jti).await? {
        return Err(ApiError::unauthorized("TOKEN_REVOKED", "Token has been revoked"));
    }

    let user = state
        .users()
        .find_by_id(claims.user_id())
        .await?
        .ok_or(AuthError::UserNotFound)?;
    if !user.is_active {
        return Err(AuthError::AccountDisabled.into());
    }

    let access_token = state
        .jwt_service
        .generate_access_token(user.id, &user.username, user.is_admin)?;

    Ok(Json(TokenPair {
        access_token,
        refresh_token: payload.refresh_token,
        expires_in: state.jwt_service.access_token_expires_in(),
    }))
}

/// POST /auth/logout - Revoke the presented access token.
async fn logout(
    State(state): State<AppState>,
    current: CurrentUser,
) -> ApiResult<Json<MessageResponse>> {
    state
        .revocations()
        .revoke(current.auth.jti(), current.user.id, current.auth.expires_at())
        .await?;

    info!(user_id = %current.user.id, "User logged out");
    Ok(Json(MessageResponse::new("Successfully logged out")))
}

/// GET /auth/me - The authenticated user.
async fn me(current: CurrentUser) -> Json<UserInfo> {
    Json(user_info(current.user))
}

/// PUT /auth/me - Update the authenticated user's profile.
async fn update_me(
    State(state): State<AppState>,
    current: CurrentUser,
    Json(payload): Json<UpdateProfileRequest>,
) -> ApiResult<Json<UserInfo>> {
    let user = state
        .users()
        .update_profile(
            current.user.id,
            payload.first_name,
            payload.last_name,
            payload.phone,
        )
        .await?;

    Ok(Json(user_info(user)))
}

/// POST /auth/change-password - Replace the caller's password.
async fn change_password(
    State(state): State<AppState>,
    current: CurrentUser,
    Json(payload): Json<ChangePasswordRequest>,
) -> ApiResult<Json<MessageResponse>> {
    if !verify_password(&payload.current_password, &current.user.password_hash)
        .map_err(AuthError::from)?
    {
        warn!(user_id = %current.user.id, "Password change with wrong current password");
        return Err(ApiError::unauthorized(
            "INVALID_CREDENTIALS",
            "Current password is incorrect",
        ));
    }

    let errors = validate_password(&payload.new_password);
    if !errors.is_empty() {
        return Err(AuthError::Validation(errors).into());
    }

    let password_hash = hash_password(&payload.new_password).map_err(AuthError::from)?;
    state
        .users()
        .update_password(current.user.id, &password_hash)
        .await?;

    Ok(Json(MessageResponse::new("Password changed successfully")))
}

/// POST /auth/register - Create a user. Admin only.
async fn register(
    State(state): State<AppState>,
    current: CurrentUser,
    Json(payload): Json<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<UserInfo>)> {
    current.require_admin()?;

    let errors = validate_registration(&payload.username, &payload.email, &payload.password);
    if !errors.is_empty() {
        return Err(AuthError::Validation(errors).into());
    }

    let username = payload.username.trim().to_string();
    let email = payload.email.trim().to_string();

    let users = state.users();
    if users.username_exists(&username).await? {
        return Err(AuthError::AlreadyExists("Username").into());
    }
    if users.email_exists(&email).await? {
        return Err(AuthError::AlreadyExists("Email").into());
    }

    let password_hash = hash_password(&payload.password).map_err(AuthError::from)?;
    let user = users
        .create(CreateUserInput {
            username,
            email,
            password_hash,
            first_name: payload.first_name,
            last_name: payload.last_name,
            phone: payload.phone,
            is_admin: payload.is_admin,
        })
        .await?;

    info!(user_id = %user.id, created_by = %current.user.id, "User registered");
    Ok((StatusCode::CREATED, Json(user_info(user))))
}

/// GET /auth/users - Active users. Admin only.
async fn list_users(
    State(state): State<AppState>,
    current: CurrentUser,
) -> ApiResult<Json<UsersResponse>> {
    current.require_admin()?;

    let users = state.users().list_active().await?;
    Ok(Json(UsersResponse {
        users: users.into_iter().map(user_info).collect(),
    }))
}

async fn find_user(state: &AppState, id: Uuid) -> ApiResult<users::Model> {
    Ok(state
        .users()
        .find_by_id(id)
        .await?
        .ok_or(AuthError::NoSuchUser(id))?)
}

/// GET /auth/users/{id} - Any user, active or not. Admin only.
async fn get_user(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<UserInfo>> {
    current.require_admin()?;
    Ok(Json(user_info(find_user(&state, id).await?)))
}

/// PUT /auth/users/{id} - Change another account. Admin only.
async fn update_user(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateUserRequest>,
) -> ApiResult<Json<UserInfo>> {
    current.require_admin()?;
    let existing = find_user(&state, id).await?;

    let username = payload.username.map(|u| u.trim().to_string());
    let email = payload.email.map(|e| e.trim().to_string());
    let password = payload.password.filter(|p| !p.is_empty());

    let errors = validate_user_update(username.as_deref(), email.as_deref(), password.as_deref());
    if !errors.is_empty() {
        return Err(AuthError::Validation(errors).into());
    }

    let users = state.users();
    if let Some(username) = username.as_deref()
        && username != existing.username
        && users.username_exists(username).await?
    {
        return Err(AuthError::AlreadyExists("Username").into());
    }
    if let Some(email) = email.as_deref()
        && email != existing.email
        && users.email_exists(email).await?
    {
        return Err(AuthError::AlreadyExists("Email").into());
    }

    let password_hash = password
        .map(|p| hash_password(&p))
        .transpose()
        .map_err(AuthError::from)?;

    let user = users
        .update(
            id,
            UserUpdate {
                username,
                email,
                first_name: payload.first_name,
                last_name: payload.last_name,
                phone: payload.phone,
                is_admin: payload.is_admin,
                is_active: payload.is_active,
                password_hash,
            },
        )
        .await?;

    info!(user_id = %id, updated_by = %current.user.id, "User updated by admin");
    Ok(Json(user_info(user)))
}

/// DELETE /auth/users/{id} - Deactivate an account; the row is kept.
/// Admin only, and never the caller's own account.
async fn deactivate_user(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<MessageResponse>> {
    current.require_admin()?;
    if id == current.user.id {
        return Err(AuthError::Validation(vec!["Cannot delete your own account".to_string()]).into());
    }
    find_user(&state, id).await?;

    state.users().set_active(id, false).await?;

    info!(user_id = %id, deactivated_by = %current.user.id, "User deactivated");
    Ok(Json(MessageResponse::new("User deleted successfully")))
}
