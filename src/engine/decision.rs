//! Decision engine
//!
//! Orchestrates matcher and scorer into a final verdict:
//!
//! 1. First matching policy with a terminal action (allow/block) decides
//!    immediately; the scorer is not consulted and the recorded score is 0.0.
//! 2. A matching alert policy always yields alert; the score is computed and
//!    recorded but never upgrades the decision.
//! 3. With no match, fixed thresholds on the anomaly score decide.
//!
//! Scorer failure or timeout propagates as `ScorerError` (fail-closed: the
//! caller returns an error and appends no record, never a silent allow).

use std::time::Duration;

use crate::config::Config;
use crate::engine::matcher;
use crate::engine::scorer::{Scorer, ScorerError};
use crate::models::connection::{ConnectionInput, Decision};
use crate::models::policy::Policy;

/// Anomaly-score cutoffs for unmatched connections
#[derive(Debug, Clone, Copy)]
pub struct Thresholds {
    /// score > block => block
    pub block: f64,
    /// block >= score >= alert => alert
    pub alert: f64,
}

impl Thresholds {
    pub fn from_config(config: &Config) -> Self {
        Self {
            block: config.block_threshold,
            alert: config.alert_threshold,
        }
    }
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            block: 0.8,
            alert: 0.5,
        }
    }
}

/// Outcome of one evaluation, before it is assembled into a record
#[derive(Debug, Clone)]
pub struct Verdict {
    pub decision: Decision,
    pub anomaly_score: f64,
    pub matched_policy: Option<String>,
}

/// Evaluate one connection against a policy snapshot.
pub async fn evaluate(
    connection: &ConnectionInput,
    policies: &[Policy],
    scorer: &dyn Scorer,
    thresholds: Thresholds,
    scorer_budget: Duration,
) -> Result<Verdict, ScorerError> {
    tracing::info!(
        "Evaluating connection: {} -> {}:{}/{}",
        connection.source_ip,
        connection.destination_ip,
        connection.destination_port,
        connection.protocol
    );

    let matched = matcher::find_match(connection, policies);

    if let Some(policy) = matched {
        if policy.action.is_terminal() {
            tracing::info!(
                "Immediate decision from policy {}: {}",
                policy.policy_id,
                policy.action.as_str()
            );
            return Ok(Verdict {
                decision: policy.action.into(),
                anomaly_score: 0.0,
                matched_policy: Some(policy.policy_id.clone()),
            });
        }
        tracing::info!(
            "Policy {} requires anomaly scoring (alert action)",
            policy.policy_id
        );
    }

    let anomaly_score = tokio::time::timeout(scorer_budget, scorer.score(connection))
        .await
        .map_err(|_| ScorerError::Timeout)??;

    let verdict = match matched {
        // Alert policy: score is recorded but never upgrades the decision.
        Some(policy) => Verdict {
            decision: Decision::Alert,
            anomaly_score,
            matched_policy: Some(policy.policy_id.clone()),
        },
        None => Verdict {
            decision: apply_thresholds(anomaly_score, thresholds),
            anomaly_score,
            matched_policy: None,
        },
    };

    tracing::info!(
        "Final decision: {} (score {:.2})",
        verdict.decision,
        verdict.anomaly_score
    );
    Ok(verdict)
}

/// Map an anomaly score onto a decision for unmatched connections.
pub fn apply_thresholds(score: f64, thresholds: Thresholds) -> Decision {
    if score > thresholds.block {
        Decision::Block
    } else if score >= thresholds.alert {
        Decision::Alert
    } else {
        Decision::Allow
    }
}
