//! Decision engine
//!
//! Pure matching and decision logic plus the anomaly-scorer seam. Nothing
//! in here holds persistent state; stores are passed in by the handlers.

pub mod decision;
pub mod matcher;
pub mod scorer;

pub use decision::{Thresholds, Verdict};
pub use scorer::{HeuristicScorer, Scorer, ScorerError};
