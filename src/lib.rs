//! hoslog: plan and audit hours-of-service driver logs.
//!
//! A trip is simulated minute by minute against the property-carrying
//! rules, normalized into contiguous 24-hour days, and audited. Logs
//! written elsewhere can be audited on their own.

pub mod cli;
pub mod clock;
pub mod compliance;
pub mod config;
pub mod grid;
pub mod model;
pub mod normalize;
pub mod plan;
pub mod route;
pub mod rules;
pub mod schedule;
pub mod storage;
