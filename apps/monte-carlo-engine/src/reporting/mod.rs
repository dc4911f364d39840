//! Display-side adapters: status line state and value formatting.

pub mod format;
pub mod status;

pub use format::{format_money, format_pct, format_ratio};
pub use status::{StatusKind, StatusReporter, StatusSnapshot, summary_lines};
