//! Routing layer: which stage output goes to which of our own streams.
//!
//! This module is intentionally separate from process plumbing.
//! It owns:
//! - Functionality / Destination names accepted on the command line
//! - RoutingTable (validated `functionality:destination` tokens)

pub mod functionality;
pub mod table;

pub use functionality::{Destination, Functionality};
pub use table::RoutingTable;
