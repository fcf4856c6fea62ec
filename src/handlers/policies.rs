//! Policy handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::models::{
    validate_policy_input, CreatePolicy, Policy, PolicyResponse, UpdatePolicy,
};
use crate::{AppError, AppResult, AppState};

/// Create a new policy
pub async fn create(
    State(state): State<AppState>,
    Json(req): Json<CreatePolicy>,
) -> AppResult<(StatusCode, Json<PolicyResponse>)> {
    validate_policy_input(&req.policy_id, &req.conditions)?;

    let policy = state
        .policies
        .create(req.policy_id, req.conditions, req.action)?;

    Ok((
        StatusCode::CREATED,
        Json(PolicyResponse {
            policy_id: policy.policy_id,
            status: "created".to_string(),
            message: "Policy successfully created".to_string(),
        }),
    ))
}

/// List all policies in evaluation order
pub async fn list(State(state): State<AppState>) -> Json<Vec<Policy>> {
    Json(state.policies.snapshot())
}

/// Get single policy
pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<Policy>> {
    let policy = state
        .policies
        .get(&id)
        .ok_or_else(|| AppError::NotFound(format!("Policy with ID '{}' not found", id)))?;

    Ok(Json(policy))
}

/// Replace a policy's conditions and action
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<UpdatePolicy>,
) -> AppResult<Json<PolicyResponse>> {
    validate_policy_input(&id, &req.conditions)?;

    state.policies.update(&id, req.conditions, req.action)?;

    Ok(Json(PolicyResponse {
        policy_id: id,
        status: "updated".to_string(),
        message: "Policy successfully updated".to_string(),
    }))
}

/// Delete a policy
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<PolicyResponse>> {
    state.policies.delete(&id)?;

    Ok(Json(PolicyResponse {
        policy_id: id,
        status: "deleted".to_string(),
        message: "Policy successfully deleted".to_string(),
    }))
}
