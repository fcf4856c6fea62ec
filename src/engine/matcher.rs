//! Policy matcher
//!
//! First policy in insertion order with at least one satisfied condition
//! wins (OR across conditions within a policy). All stored conditions
//! passed validate-on-write, so coercion here cannot fail for well-formed
//! state; if it ever does, that is a programming error and is logged, not
//! propagated.

use crate::models::connection::ConnectionInput;
use crate::models::policy::{Condition, Field, Operator, Policy, TypedValue};

/// Find the first matching policy, if any. Iteration stops at the first hit.
pub fn find_match<'a>(connection: &ConnectionInput, policies: &'a [Policy]) -> Option<&'a Policy> {
    for policy in policies {
        if policy_matches(policy, connection) {
            tracing::info!("Connection matched policy: {}", policy.policy_id);
            return Some(policy);
        }
    }

    tracing::debug!("No matching policy found for connection");
    None
}

/// A policy matches when ANY of its conditions evaluates true.
pub fn policy_matches(policy: &Policy, connection: &ConnectionInput) -> bool {
    policy.conditions.iter().any(|condition| {
        let hit = condition_matches(condition, connection);
        if hit {
            tracing::debug!(
                "Policy {} matched on condition: {} {} {}",
                policy.policy_id,
                condition.field.as_str(),
                condition.operator.as_str(),
                condition.value
            );
        }
        hit
    })
}

/// Evaluate a single condition against a connection.
pub fn condition_matches(condition: &Condition, connection: &ConnectionInput) -> bool {
    let expected = match condition.typed_value() {
        Ok(value) => value,
        Err(err) => {
            // Unreachable for conditions that passed validate-on-write.
            tracing::error!(
                "Stored condition failed coercion ({} {} {}): {}",
                condition.field.as_str(),
                condition.operator.as_str(),
                condition.value,
                err
            );
            return false;
        }
    };

    match (condition.field, expected) {
        (Field::SourceIp, TypedValue::Ip(expected)) => {
            match connection.source_ip.parse() {
                Ok(actual) => compare_eq(condition.operator, actual, expected),
                Err(_) => false,
            }
        }
        (Field::DestinationIp, TypedValue::Ip(expected)) => {
            match connection.destination_ip.parse() {
                Ok(actual) => compare_eq(condition.operator, actual, expected),
                Err(_) => false,
            }
        }
        (Field::DestinationPort, TypedValue::Port(expected)) => {
            compare_ord(condition.operator, connection.destination_port, expected)
        }
        (Field::Protocol, TypedValue::Protocol(expected)) => {
            compare_eq(condition.operator, connection.protocol, expected)
        }
        // Field/value pairing is fixed by Condition::typed_value.
        _ => false,
    }
}

fn compare_eq<T: PartialEq>(operator: Operator, actual: T, expected: T) -> bool {
    match operator {
        Operator::Eq => actual == expected,
        Operator::Ne => actual != expected,
        // Rejected at write time for equality-only fields.
        _ => false,
    }
}

fn compare_ord<T: PartialOrd>(operator: Operator, actual: T, expected: T) -> bool {
    match operator {
        Operator::Eq => actual == expected,
        Operator::Ne => actual != expected,
        Operator::Gt => actual > expected,
        Operator::Lt => actual < expected,
        Operator::Ge => actual >= expected,
        Operator::Le => actual <= expected,
    }
}
