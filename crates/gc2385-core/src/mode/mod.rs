//! Capture modes, output formats and their register tables

mod catalog;
pub mod tables;
mod types;

pub use catalog::*;
pub use types::*;
