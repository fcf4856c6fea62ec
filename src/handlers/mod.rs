//! HTTP handlers

pub mod connections;
pub mod health;
pub mod policies;
