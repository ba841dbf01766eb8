//! Weekly sustainability impact scoring for household food management.
//!
//! The crate turns a week of food-waste, consumption, and tracking metrics
//! into a 0-100 impact score with an auditable factor breakdown, narrates the
//! result as ranked insights, and derives prioritized recommendations. Metric
//! aggregation and snapshot persistence stay behind the collaborator traits in
//! [`scoring::provider`].

pub mod config;
pub mod error;
pub mod scoring;
pub mod telemetry;
