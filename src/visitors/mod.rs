//! Synthetic visitors: reference tables, profile and session generation, engagement
//! scoring and next-page prediction.

pub mod catalog;
pub mod model;
pub mod prediction;
pub mod profile;
pub mod scoring;
pub mod session;

pub use prediction::predict_navigation;
pub use profile::ProfileGenerator;
pub use scoring::engagement_score;
pub use session::synthesize_session;
