use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    routing::{post, put},
    Json, Router,
};
use tracing::{info, instrument};

use crate::{
    auth::{
        dto::{
            required_pair, ChangePasswordRequest, LoginRequest, LoginResponse, MessageResponse,
            RegisterRequest,
        },
        extractors::AuthUser,
        services,
    },
    error::ApiError,
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/change-password", put(change_password))
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<MessageResponse>), ApiError> {
    let Json(payload) = payload?;
    let (email, password) = required_pair(payload.email, payload.password)
        .ok_or_else(|| ApiError::validation("Email and password required"))?;

    services::register_user(
        state.users.as_ref(),
        email,
        &password,
        payload.name,
        payload.contact,
    )
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse {
            msg: "User registered",
        }),
    ))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>, ApiError> {
    let Json(payload) = payload?;
    let (email, password) = required_pair(payload.email, payload.password)
        .ok_or_else(|| ApiError::validation("Email and password required"))?;

    let user = services::authenticate(state.users.as_ref(), &email, &password).await?;
    let access_token = state.keys.issue(user.id)?;

    info!(user_id = user.id, email = %user.email, "user logged in");
    Ok(Json(LoginResponse { access_token }))
}

#[instrument(skip(state, payload))]
pub async fn change_password(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    payload: Result<Json<ChangePasswordRequest>, JsonRejection>,
) -> Result<Json<MessageResponse>, ApiError> {
    let Json(payload) = payload?;
    let (old_password, new_password) =
        required_pair(payload.old_password, payload.new_password)
            .ok_or_else(|| ApiError::validation("old_password and new_password required"))?;

    services::change_password(state.users.as_ref(), user_id, &old_password, &new_password)
        .await?;

    Ok(Json(MessageResponse {
        msg: "Password changed",
    }))
}
