pub mod config;
pub mod error;
pub mod types;

pub use config::{AppConfig, SanitizeMode};
pub use error::ResearchError;
pub use types::*;
