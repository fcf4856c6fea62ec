//! Connection handlers

use axum::{
    extract::{Path, State},
    Json,
};
use chrono::Utc;
use std::time::Duration;
use uuid::Uuid;

use crate::engine::decision::{self, Thresholds};
use crate::models::{ConnectionInput, ConnectionResponse, EvaluationRecord};
use crate::{AppError, AppResult, AppState};

/// Submit a connection for evaluation
pub async fn submit(
    State(state): State<AppState>,
    Json(connection): Json<ConnectionInput>,
) -> AppResult<Json<ConnectionResponse>> {
    connection.validate()?;

    let policies = state.policies.snapshot();
    let thresholds = Thresholds::from_config(&state.config);
    let budget = Duration::from_millis(state.config.scorer_timeout_ms);

    // Fail-closed: a scorer error or timeout returns 503 here and nothing
    // is appended to the log.
    let verdict = decision::evaluate(
        &connection,
        &policies,
        state.scorer.as_ref(),
        thresholds,
        budget,
    )
    .await?;

    let connection_id = Uuid::new_v4();
    let record = EvaluationRecord {
        connection_id,
        source_ip: connection.source_ip,
        destination_ip: connection.destination_ip,
        destination_port: connection.destination_port,
        protocol: connection.protocol,
        timestamp: connection.timestamp,
        decision: verdict.decision,
        anomaly_score: verdict.anomaly_score,
        matched_policy: verdict.matched_policy.clone(),
        evaluated_at: Utc::now(),
    };
    state.connections.append(record);

    tracing::info!(
        "Connection {} evaluated: decision={}, score={:.2}",
        connection_id,
        verdict.decision,
        verdict.anomaly_score
    );

    Ok(Json(ConnectionResponse {
        connection_id,
        decision: verdict.decision,
        anomaly_score: verdict.anomaly_score,
        matched_policy: verdict.matched_policy,
    }))
}

/// Retrieve a previously evaluated connection
pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<EvaluationRecord>> {
    let record = state.connections.get(id).ok_or_else(|| {
        AppError::NotFound(format!("Connection with ID '{}' not found", id))
    })?;

    Ok(Json(record))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::scorer::{FailingScorer, StubScorer};
    use crate::models::connection::{Decision, Protocol};
    use crate::models::policy::{Action, Condition, Field, Operator};
    use std::sync::Arc;

    fn conn(port: u16) -> ConnectionInput {
        ConnectionInput {
            source_ip: "192.168.1.10".to_string(),
            destination_ip: "10.0.0.5".to_string(),
            destination_port: port,
            protocol: Protocol::Tcp,
            timestamp: Utc::now(),
        }
    }

    fn add_policy(state: &AppState, id: &str, port: &str, action: Action) {
        state
            .policies
            .create(
                id.to_string(),
                vec![Condition {
                    field: Field::DestinationPort,
                    operator: Operator::Eq,
                    value: port.to_string(),
                }],
                action,
            )
            .unwrap();
    }

    #[tokio::test]
    async fn test_block_policy_decides_with_zero_score() {
        let state = AppState::for_tests();
        add_policy(&state, "P-001", "22", Action::Block);

        let Json(resp) = submit(State(state.clone()), Json(conn(22))).await.unwrap();
        assert_eq!(resp.decision, Decision::Block);
        assert_eq!(resp.anomaly_score, 0.0);
        assert_eq!(resp.matched_policy.as_deref(), Some("P-001"));
    }

    #[tokio::test]
    async fn test_no_policies_uses_score_thresholds() {
        let state = AppState::for_tests_with_scorer(Arc::new(StubScorer(0.42)));

        let Json(resp) = submit(State(state), Json(conn(443))).await.unwrap();
        assert_eq!(resp.decision, Decision::Allow);
        assert_eq!(resp.anomaly_score, 0.42);
        assert_eq!(resp.matched_policy, None);
    }

    #[tokio::test]
    async fn test_alert_policy_not_upgraded_by_score() {
        let state = AppState::for_tests_with_scorer(Arc::new(StubScorer(0.9)));
        add_policy(&state, "P-003", "23", Action::Alert);

        let Json(resp) = submit(State(state), Json(conn(23))).await.unwrap();
        assert_eq!(resp.decision, Decision::Alert);
        assert_eq!(resp.anomaly_score, 0.9);
        assert_eq!(resp.matched_policy.as_deref(), Some("P-003"));
    }

    #[tokio::test]
    async fn test_submit_then_get_returns_full_record() {
        let state = AppState::for_tests();
        add_policy(&state, "P-001", "22", Action::Block);

        let Json(resp) = submit(State(state.clone()), Json(conn(22))).await.unwrap();
        let Json(record) = get(State(state), Path(resp.connection_id)).await.unwrap();

        assert_eq!(record.connection_id, resp.connection_id);
        assert_eq!(record.destination_port, 22);
        assert_eq!(record.decision, Decision::Block);
        assert_eq!(record.matched_policy.as_deref(), Some("P-001"));
    }

    #[tokio::test]
    async fn test_get_unknown_connection_not_found() {
        let state = AppState::for_tests();
        let err = get(State(state), Path(Uuid::new_v4())).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_record_survives_policy_deletion() {
        let state = AppState::for_tests();
        add_policy(&state, "P-001", "22", Action::Block);

        let Json(resp) = submit(State(state.clone()), Json(conn(22))).await.unwrap();
        state.policies.delete("P-001").unwrap();

        let Json(record) = get(State(state), Path(resp.connection_id)).await.unwrap();
        // The reference is now unresolvable but the record persists.
        assert_eq!(record.matched_policy.as_deref(), Some("P-001"));
    }

    #[tokio::test]
    async fn test_policy_update_changes_subsequent_decision() {
        let state = AppState::for_tests_with_scorer(Arc::new(StubScorer(0.6)));
        add_policy(&state, "P-003", "23", Action::Alert);

        let Json(first) = submit(State(state.clone()), Json(conn(23))).await.unwrap();
        assert_eq!(first.decision, Decision::Alert);

        state
            .policies
            .update(
                "P-003",
                vec![Condition {
                    field: Field::DestinationPort,
                    operator: Operator::Eq,
                    value: "23".to_string(),
                }],
                Action::Block,
            )
            .unwrap();

        let Json(second) = submit(State(state), Json(conn(23))).await.unwrap();
        assert_eq!(second.decision, Decision::Block);
        assert_eq!(second.anomaly_score, 0.0);
    }

    #[tokio::test]
    async fn test_scorer_failure_is_not_allow_and_appends_nothing() {
        let state = AppState::for_tests_with_scorer(Arc::new(FailingScorer));

        let err = submit(State(state.clone()), Json(conn(443)))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ScoringUnavailable(_)));
        assert!(state.connections.is_empty());
    }

    #[tokio::test]
    async fn test_malformed_ip_rejected_before_evaluation() {
        let state = AppState::for_tests();
        let mut bad = conn(443);
        bad.destination_ip = "10.0.0.300".to_string();

        let err = submit(State(state.clone()), Json(bad)).await.unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));
        assert!(state.connections.is_empty());
    }

    #[tokio::test]
    async fn test_first_match_wins_over_later_policy() {
        let state = AppState::for_tests_with_scorer(Arc::new(StubScorer(0.2)));
        add_policy(&state, "P-001", "22", Action::Alert);
        add_policy(&state, "P-002", "22", Action::Block);

        let Json(resp) = submit(State(state), Json(conn(22))).await.unwrap();
        assert_eq!(resp.matched_policy.as_deref(), Some("P-001"));
        assert_eq!(resp.decision, Decision::Alert);
    }
}
