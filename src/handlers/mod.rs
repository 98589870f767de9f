//! HTTP handlers for record CRUD and statistics.

pub mod records;
pub mod stats;
pub use records::*;
pub use stats::*;
