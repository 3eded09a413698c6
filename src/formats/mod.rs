pub mod json;

pub use json::JsonlWriter;
