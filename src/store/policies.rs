//! Policy store
//!
//! Ordered, identifier-keyed set of policies. Insertion order is the
//! matcher's iteration order, so it is preserved across updates: an update
//! replaces conditions/action in place without moving the policy.

use chrono::Utc;
use parking_lot::RwLock;

use crate::error::AppError;
use crate::models::policy::{Action, Condition, Policy};

#[derive(Default)]
pub struct PolicyStore {
    // Vec keeps insertion order; policy counts are small enough that
    // id lookups stay linear.
    policies: RwLock<Vec<Policy>>,
}

impl PolicyStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new policy. Fails if the identifier is already taken.
    pub fn create(
        &self,
        policy_id: String,
        conditions: Vec<Condition>,
        action: Action,
    ) -> Result<Policy, AppError> {
        let mut policies = self.policies.write();

        if policies.iter().any(|p| p.policy_id == policy_id) {
            return Err(AppError::AlreadyExists(format!(
                "Policy with ID '{}' already exists",
                policy_id
            )));
        }

        let now = Utc::now();
        let policy = Policy {
            policy_id,
            conditions,
            action,
            created_at: now,
            updated_at: now,
        };
        policies.push(policy.clone());

        tracing::info!("Policy created: {}", policy.policy_id);
        Ok(policy)
    }

    /// Replace a policy's conditions and action. Fails if absent.
    pub fn update(
        &self,
        policy_id: &str,
        conditions: Vec<Condition>,
        action: Action,
    ) -> Result<Policy, AppError> {
        let mut policies = self.policies.write();

        let policy = policies
            .iter_mut()
            .find(|p| p.policy_id == policy_id)
            .ok_or_else(|| {
                AppError::NotFound(format!("Policy with ID '{}' not found", policy_id))
            })?;

        policy.conditions = conditions;
        policy.action = action;
        policy.updated_at = Utc::now();

        tracing::info!("Policy updated: {}", policy_id);
        Ok(policy.clone())
    }

    pub fn get(&self, policy_id: &str) -> Option<Policy> {
        self.policies
            .read()
            .iter()
            .find(|p| p.policy_id == policy_id)
            .cloned()
    }

    /// Delete a policy. Fails if absent.
    pub fn delete(&self, policy_id: &str) -> Result<(), AppError> {
        let mut policies = self.policies.write();

        let idx = policies
            .iter()
            .position(|p| p.policy_id == policy_id)
            .ok_or_else(|| {
                AppError::NotFound(format!("Policy with ID '{}' not found", policy_id))
            })?;

        policies.remove(idx);
        tracing::info!("Policy deleted: {}", policy_id);
        Ok(())
    }

    /// Consistent snapshot of all policies in insertion order.
    ///
    /// Taken under the read lock in one shot, so an evaluation never sees a
    /// half-applied update.
    pub fn snapshot(&self) -> Vec<Policy> {
        self.policies.read().clone()
    }
}
