//! Output formatting for solver reports.
//!
//! - Terminal: human-readable output with colors and box drawing
//! - JSON: archival proof records

mod json;
mod terminal;

pub use json::{to_json, to_json_pretty};
pub use terminal::{format_falsification, format_gate, format_verification, format_wheels};
