use axum::{
    extract::{rejection::JsonRejection, State},
    routing::{get, put},
    Json, Router,
};
use tracing::{info, instrument};

use crate::{
    auth::AuthUser,
    error::ApiError,
    profile::dto::{HealthUpdateRequest, LanguageRequest, LanguageResponse, ProfileUpdateRequest},
    state::AppState,
    users::{User, UserPatch},
};

pub fn profile_routes() -> Router<AppState> {
    Router::new()
        .route("/profile", get(get_profile).put(update_profile))
        .route("/profile/health", put(update_health))
        .route("/profile/language", put(update_language))
}

async fn apply(state: &AppState, user_id: i64, patch: UserPatch) -> Result<User, ApiError> {
    state
        .users
        .update(user_id, patch)
        .await?
        .ok_or(ApiError::UserNotFound)
}

#[instrument(skip(state))]
pub async fn get_profile(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<User>, ApiError> {
    let user = state
        .users
        .find_by_id(user_id)
        .await?
        .ok_or(ApiError::UserNotFound)?;
    Ok(Json(user))
}

#[instrument(skip(state, payload))]
pub async fn update_profile(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    payload: Result<Json<ProfileUpdateRequest>, JsonRejection>,
) -> Result<Json<User>, ApiError> {
    let Json(payload) = payload?;
    let user = apply(&state, user_id, payload.into_patch()?).await?;
    info!(user_id, "profile updated");
    Ok(Json(user))
}

#[instrument(skip(state, payload))]
pub async fn update_health(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    payload: Result<Json<HealthUpdateRequest>, JsonRejection>,
) -> Result<Json<User>, ApiError> {
    let Json(payload) = payload?;
    let user = apply(&state, user_id, payload.into_patch()).await?;
    info!(user_id, "health info updated");
    Ok(Json(user))
}

#[instrument(skip(state, payload))]
pub async fn update_language(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    payload: Result<Json<LanguageRequest>, JsonRejection>,
) -> Result<Json<LanguageResponse>, ApiError> {
    let Json(payload) = payload?;
    let language = payload
        .language
        .filter(|l| !l.is_empty())
        .ok_or_else(|| ApiError::validation("language required"))?;

    let patch = UserPatch {
        language: Some(language),
        ..Default::default()
    };
    let user = apply(&state, user_id, patch).await?;

    info!(user_id, language = %user.language, "language updated");
    Ok(Json(LanguageResponse {
        msg: "Language updated",
        language: user.language,
    }))
}
