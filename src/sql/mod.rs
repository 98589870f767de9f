//! SQL for the records table: fixed identifiers, values always as parameters.

mod builder;
pub mod params;
pub use builder::*;
pub use params::*;
