//! Data models

pub mod connection;
pub mod policy;

pub use connection::*;
pub use policy::*;
