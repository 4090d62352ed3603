//! # taskflow
//!
//! A concurrent task pipeline on tokio. A generator produces synthetic
//! tasks, a runner executes each one in its own unit, a router fans the
//! completed tasks out by outcome, and two consumers drain and report them.

pub mod config;
pub mod engine;
pub mod error;
pub mod model;
pub mod report;
pub mod telemetry;
