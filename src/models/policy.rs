//! Policy model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::net::IpAddr;

use crate::error::AppError;
use crate::models::connection::Protocol;

/// Connection field a condition tests against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    SourceIp,
    DestinationIp,
    DestinationPort,
    Protocol,
}

impl Field {
    pub fn as_str(&self) -> &'static str {
        match self {
            Field::SourceIp => "source_ip",
            Field::DestinationIp => "destination_ip",
            Field::DestinationPort => "destination_port",
            Field::Protocol => "protocol",
        }
    }
}

/// Comparison operator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operator {
    #[serde(rename = "=")]
    Eq,
    #[serde(rename = "!=")]
    Ne,
    #[serde(rename = ">")]
    Gt,
    #[serde(rename = "<")]
    Lt,
    #[serde(rename = ">=")]
    Ge,
    #[serde(rename = "<=")]
    Le,
}

impl Operator {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operator::Eq => "=",
            Operator::Ne => "!=",
            Operator::Gt => ">",
            Operator::Lt => "<",
            Operator::Ge => ">=",
            Operator::Le => "<=",
        }
    }

    /// Ordering operators only make sense for numeric fields
    pub fn is_ordering(&self) -> bool {
        matches!(
            self,
            Operator::Gt | Operator::Lt | Operator::Ge | Operator::Le
        )
    }
}

/// Security action taken when a policy matches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Allow,
    Block,
    Alert,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Allow => "allow",
            Action::Block => "block",
            Action::Alert => "alert",
        }
    }

    /// Allow and block end evaluation immediately; alert defers to scoring
    pub fn is_terminal(&self) -> bool {
        matches!(self, Action::Allow | Action::Block)
    }
}

/// A single field/operator/value test against a connection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Condition {
    pub field: Field,
    pub operator: Operator,
    pub value: String,
}

/// The condition value coerced to its field's native type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypedValue {
    Ip(IpAddr),
    Port(u16),
    Protocol(Protocol),
}

impl Condition {
    /// Coerce the stored text value to the field's native type.
    ///
    /// Called once at policy-write time (validation) and again at match
    /// time. After validation has passed this cannot fail.
    pub fn typed_value(&self) -> Result<TypedValue, String> {
        match self.field {
            Field::SourceIp | Field::DestinationIp => self
                .value
                .parse::<IpAddr>()
                .map(TypedValue::Ip)
                .map_err(|_| format!("'{}' is not a valid IP address", self.value)),
            Field::DestinationPort => self.value.parse::<u16>().map(TypedValue::Port).map_err(
                |_| format!("'{}' is not a valid port (expected 0-65535)", self.value),
            ),
            Field::Protocol => self
                .value
                .parse::<Protocol>()
                .map(TypedValue::Protocol)
                .map_err(|_| format!("'{}' is not a valid protocol (TCP or UDP)", self.value)),
        }
    }

    /// Validate the operator/value pair against the field's type.
    ///
    /// Write-time check: the matcher assumes every stored condition passed
    /// this.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.operator.is_ordering() && self.field != Field::DestinationPort {
            return Err(AppError::ValidationError(format!(
                "operator '{}' is not valid for field '{}'",
                self.operator.as_str(),
                self.field.as_str()
            )));
        }

        self.typed_value()
            .map(|_| ())
            .map_err(AppError::ValidationError)
    }
}

/// Security policy: a disjunction of conditions mapped to an action
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Policy {
    pub policy_id: String,
    pub conditions: Vec<Condition>,
    pub action: Action,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct CreatePolicy {
    pub policy_id: String,
    pub conditions: Vec<Condition>,
    pub action: Action,
}

#[derive(Debug, Deserialize)]
pub struct UpdatePolicy {
    pub conditions: Vec<Condition>,
    pub action: Action,
}

#[derive(Debug, Serialize)]
pub struct PolicyResponse {
    pub policy_id: String,
    pub status: String,
    pub message: String,
}

/// Validate a policy's identifier and condition list at write time
pub fn validate_policy_input(policy_id: &str, conditions: &[Condition]) -> Result<(), AppError> {
    if policy_id.trim().is_empty() {
        return Err(AppError::ValidationError(
            "policy_id must not be empty".to_string(),
        ));
    }

    if conditions.is_empty() {
        return Err(AppError::ValidationError(
            "policy must have at least one condition".to_string(),
        ));
    }

    for condition in conditions {
        condition.validate()?;
    }

    Ok(())
}
