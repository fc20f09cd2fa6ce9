//! Plumber — rule-driven message router.

pub mod actions;
pub mod channels;
pub mod config;
pub mod error;
pub mod logging;
pub mod message;
pub mod rules;
