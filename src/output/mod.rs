//! Output module for run reports
//!
//! This module handles:
//! - The single-line JSON summary (or error) printed by every run
//! - The human-readable comparison printed by `--report`

mod report;
mod summary;

pub use report::{to_json_line, ErrorReport, SyncReport};
pub use summary::render_comparison;
