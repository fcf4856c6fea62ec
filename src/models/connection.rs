//! Connection model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::policy::Action;

/// Network protocol of a connection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Protocol {
    Tcp,
    Udp,
}

impl Protocol {
    pub fn as_str(&self) -> &'static str {
        match self {
            Protocol::Tcp => "TCP",
            Protocol::Udp => "UDP",
        }
    }
}

impl FromStr for Protocol {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "TCP" => Ok(Protocol::Tcp),
            "UDP" => Ok(Protocol::Udp),
            _ => Err(()),
        }
    }
}

impl std::fmt::Display for Protocol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Final outcome of one connection evaluation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Decision {
    Allow,
    Block,
    Alert,
}

impl Decision {
    pub fn as_str(&self) -> &'static str {
        match self {
            Decision::Allow => "allow",
            Decision::Block => "block",
            Decision::Alert => "alert",
        }
    }
}

impl From<Action> for Decision {
    fn from(action: Action) -> Self {
        match action {
            Action::Allow => Decision::Allow,
            Action::Block => Decision::Block,
            Action::Alert => Decision::Alert,
        }
    }
}

impl std::fmt::Display for Decision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Incoming connection submitted for evaluation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionInput {
    pub source_ip: String,
    pub destination_ip: String,
    pub destination_port: u16,
    pub protocol: Protocol,
    pub timestamp: DateTime<Utc>,
}

impl ConnectionInput {
    /// Reject connections whose IP fields do not parse.
    ///
    /// Keeps the malformed-input path at the boundary so the matcher and
    /// scorer only ever see well-formed addresses.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.source_ip.parse::<IpAddr>().is_err() {
            return Err(AppError::ValidationError(format!(
                "source_ip '{}' is not a valid IP address",
                self.source_ip
            )));
        }
        if self.destination_ip.parse::<IpAddr>().is_err() {
            return Err(AppError::ValidationError(format!(
                "destination_ip '{}' is not a valid IP address",
                self.destination_ip
            )));
        }
        Ok(())
    }
}

/// Immutable record of one evaluated connection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationRecord {
    pub connection_id: Uuid,
    pub source_ip: String,
    pub destination_ip: String,
    pub destination_port: u16,
    pub protocol: Protocol,
    pub timestamp: DateTime<Utc>,
    pub decision: Decision,
    pub anomaly_score: f64,
    pub matched_policy: Option<String>,
    pub evaluated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct ConnectionResponse {
    pub connection_id: Uuid,
    pub decision: Decision,
    pub anomaly_score: f64,
    pub matched_policy: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn conn(source_ip: &str, destination_ip: &str) -> ConnectionInput {
        ConnectionInput {
            source_ip: source_ip.to_string(),
            destination_ip: destination_ip.to_string(),
            destination_port: 443,
            protocol: Protocol::Tcp,
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn test_valid_connection_accepted() {
        assert!(conn("192.168.1.10", "10.0.0.5").validate().is_ok());
    }

    #[test]
    fn test_ipv6_accepted() {
        assert!(conn("::1", "2001:db8::1").validate().is_ok());
    }

    #[test]
    fn test_malformed_source_ip_rejected() {
        assert!(conn("not-an-ip", "10.0.0.5").validate().is_err());
    }

    #[test]
    fn test_protocol_serde_uppercase() {
        let p: Protocol = serde_json::from_str("\"UDP\"").unwrap();
        assert_eq!(p, Protocol::Udp);
        assert_eq!(serde_json::to_string(&Protocol::Tcp).unwrap(), "\"TCP\"");
    }

    #[test]
    fn test_decision_serde_lowercase() {
        assert_eq!(serde_json::to_string(&Decision::Block).unwrap(), "\"block\"");
    }
}
