//! Visitor simulation library crate.
//!
//! Exposes the synthetic visitor generator, engagement scoring, navigation
//! prediction, the live population manager and the dashboard metrics used by the CLI.

pub mod core;
pub mod dashboard;
pub mod formats;
pub mod population;
pub mod visitors;

pub use crate::core::config;
pub use crate::core::scheduler;
pub use crate::core::traits;
pub use population::{EnvironmentSnapshot, PopulationManager, PopulationSettings};
pub use visitors::model;
