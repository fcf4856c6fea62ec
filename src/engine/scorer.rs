//! Anomaly scorer
//!
//! The engine depends only on the `Scorer` trait; the bundled
//! `HeuristicScorer` stands in for a real model. A production deployment
//! would plug in an implementation backed by an actual inference service.

use rand::Rng;
use std::collections::HashMap;

use crate::models::connection::{ConnectionInput, Protocol};

#[derive(Debug, thiserror::Error)]
pub enum ScorerError {
    #[error("anomaly scorer unavailable: {0}")]
    Unavailable(String),
    #[error("anomaly scorer timed out")]
    Timeout,
}

/// Produces an anomaly score in [0, 1] for a connection.
#[axum::async_trait]
pub trait Scorer: Send + Sync {
    async fn score(&self, connection: &ConnectionInput) -> Result<f64, ScorerError>;
}

/// Threat-intel-table heuristic.
///
/// Max-merges reputation hits for source IP, destination IP, and destination
/// port over a random baseline, nudges UDP to non-DNS/NTP ports upward, then
/// adds slight jitter to mimic model variance.
pub struct HeuristicScorer {
    suspicious_ips: HashMap<String, f64>,
    suspicious_ports: HashMap<u16, f64>,
}

impl HeuristicScorer {
    pub fn new() -> Self {
        let suspicious_ips = HashMap::from([
            ("192.168.1.100".to_string(), 0.85),
            ("10.0.0.99".to_string(), 0.75),
            ("172.16.0.50".to_string(), 0.65),
        ]);

        let suspicious_ports = HashMap::from([
            (22, 0.6),    // SSH - often targeted
            (23, 0.8),    // Telnet - insecure protocol
            (3389, 0.7),  // RDP - frequently attacked
            (445, 0.75),  // SMB - common attack vector
            (1433, 0.65), // MSSQL - database exposure
        ]);

        Self {
            suspicious_ips,
            suspicious_ports,
        }
    }

    pub fn add_suspicious_ip(&mut self, ip: String, score: f64) {
        self.suspicious_ips.insert(ip, score.clamp(0.0, 1.0));
    }

    pub fn add_suspicious_port(&mut self, port: u16, score: f64) {
        self.suspicious_ports.insert(port, score.clamp(0.0, 1.0));
    }
}

impl Default for HeuristicScorer {
    fn default() -> Self {
        Self::new()
    }
}

#[axum::async_trait]
impl Scorer for HeuristicScorer {
    async fn score(&self, connection: &ConnectionInput) -> Result<f64, ScorerError> {
        let mut rng = rand::thread_rng();
        let mut score: f64 = rng.gen_range(0.1..0.3);

        if let Some(&ip_score) = self.suspicious_ips.get(&connection.source_ip) {
            tracing::debug!(
                "Suspicious source IP: {} (score {})",
                connection.source_ip,
                ip_score
            );
            score = score.max(ip_score);
        }

        if let Some(&ip_score) = self.suspicious_ips.get(&connection.destination_ip) {
            tracing::debug!(
                "Suspicious destination IP: {} (score {})",
                connection.destination_ip,
                ip_score
            );
            score = score.max(ip_score);
        }

        if let Some(&port_score) = self.suspicious_ports.get(&connection.destination_port) {
            tracing::debug!(
                "Suspicious port: {} (score {})",
                connection.destination_port,
                port_score
            );
            score = score.max(port_score);
        }

        // UDP to anything but DNS/NTP is slightly more suspicious.
        if connection.protocol == Protocol::Udp
            && !matches!(connection.destination_port, 53 | 123)
        {
            score = (score + 0.1).min(1.0);
        }

        score += rng.gen_range(-0.05..0.05);
        score = score.clamp(0.0, 1.0);

        Ok((score * 100.0).round() / 100.0)
    }
}

/// Fixed-score scorer for deterministic tests.
#[cfg(test)]
pub struct StubScorer(pub f64);

#[cfg(test)]
#[axum::async_trait]
impl Scorer for StubScorer {
    async fn score(&self, _connection: &ConnectionInput) -> Result<f64, ScorerError> {
        Ok(self.0)
    }
}

/// Always-failing scorer for exercising the fail-closed path.
#[cfg(test)]
pub struct FailingScorer;

#[cfg(test)]
#[axum::async_trait]
impl Scorer for FailingScorer {
    async fn score(&self, _connection: &ConnectionInput) -> Result<f64, ScorerError> {
        Err(ScorerError::Unavailable("model offline".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn conn(source_ip: &str, port: u16, protocol: Protocol) -> ConnectionInput {
        ConnectionInput {
            source_ip: source_ip.to_string(),
            destination_ip: "10.0.0.5".to_string(),
            destination_port: port,
            protocol,
            timestamp: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_score_in_range() {
        let scorer = HeuristicScorer::new();
        for _ in 0..50 {
            let score = scorer
                .score(&conn("192.168.1.10", 443, Protocol::Tcp))
                .await
                .unwrap();
            assert!((0.0..=1.0).contains(&score));
        }
    }

    #[tokio::test]
    async fn test_suspicious_source_ip_raises_score() {
        let scorer = HeuristicScorer::new();
        let score = scorer
            .score(&conn("192.168.1.100", 443, Protocol::Tcp))
            .await
            .unwrap();
        // Table value 0.85 minus worst-case jitter.
        assert!(score >= 0.8);
    }

    #[tokio::test]
    async fn test_telnet_port_raises_score() {
        let scorer = HeuristicScorer::new();
        let score = scorer
            .score(&conn("192.168.1.10", 23, Protocol::Tcp))
            .await
            .unwrap();
        assert!(score >= 0.75);
    }

    #[tokio::test]
    async fn test_added_port_entry_used() {
        let mut scorer = HeuristicScorer::new();
        scorer.add_suspicious_port(8443, 0.9);
        let score = scorer
            .score(&conn("192.168.1.10", 8443, Protocol::Tcp))
            .await
            .unwrap();
        assert!(score >= 0.85);
    }

    #[tokio::test]
    async fn test_added_intel_entry_used() {
        let mut scorer = HeuristicScorer::new();
        scorer.add_suspicious_ip("203.0.113.7".to_string(), 0.95);
        let score = scorer
            .score(&conn("203.0.113.7", 443, Protocol::Tcp))
            .await
            .unwrap();
        assert!(score >= 0.9);
    }
}
