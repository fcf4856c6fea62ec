//! In-memory stores
//!
//! The policy store owns the policy lifecycle; the connection log owns
//! evaluation records. Both are short-critical-section `parking_lot`
//! structures, never held across an await point.

pub mod connections;
pub mod policies;

pub use connections::ConnectionLog;
pub use policies::PolicyStore;
