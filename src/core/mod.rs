pub mod config;
pub mod scheduler;
pub mod traits;
pub mod weighted;
