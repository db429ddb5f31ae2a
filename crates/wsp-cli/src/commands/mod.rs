//! Command implementations for the CLI.

mod config;
mod dump;
mod history;
mod report;

pub use config::cmd_config;
pub use dump::cmd_dump;
pub use history::{HistoryRequest, cmd_history};
pub use report::{Report, cmd_report, cmd_summary};
