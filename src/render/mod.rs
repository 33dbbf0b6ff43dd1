//! Rendering of finalized statistics.

pub mod number;

pub use number::{format_grouped, format_plain};
