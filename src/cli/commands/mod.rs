//! CLI command implementations.

mod config;
mod doctor;
mod mcp;
mod query;
mod serve;

pub use config::run_config;
pub use doctor::run_doctor;
pub use mcp::run_mcp;
pub use query::{run_batch, run_get, run_search, run_summary};
pub use serve::run_serve;
