//! Process pipeline: spawn the three stages, capture the downstream stages'
//! output channels, and route the captured buffers.
//!
//! Topology:
//!
//! ```text
//!   our stdin ─▶ source ─┬─ stdout ─▶ performance ─┬─ stdout (primary)
//!                        │                          └─ stderr (secondary)
//!                        └─ stderr ─▶ rating ──────┬─ stdout (primary)
//!                                                   └─ stderr (secondary)
//! ```

pub mod capture;
pub mod orchestrate;
pub mod report;
pub mod spawn;

pub use orchestrate::run;
pub use spawn::{PipelinePlan, StageCommand};

use serde::Serialize;

/// One of the two output channels every stage has.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    /// The stage's stdout.
    Primary,
    /// The stage's stderr.
    Secondary,
}
