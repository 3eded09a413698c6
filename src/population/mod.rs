//! The live visitor population and its aggregate insights.

pub mod insights;
pub mod manager;

pub use insights::{aggregate_insights, VisitorInsights};
pub use manager::{
    EnvironmentSnapshot, PopulationManager, PopulationSettings, PopulationSnapshot, RosterEntry,
};
