//! Names a caller can put on either side of a routing token.
//!
//! Example token: `entity_performance:stderr`
//!   => (Functionality::EntityPerformance, Destination::Stderr)

use crate::pipeline::Channel;
use crate::stage::StageKind;
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Functionality {
    EntityPerformance,
    RegionPerformance,
    EntityRating,
    RegionRating,
}

impl Functionality {
    /// Every functionality, in the order buffers are routed.
    pub const ALL: [Functionality; 4] = [
        Functionality::EntityPerformance,
        Functionality::RegionPerformance,
        Functionality::EntityRating,
        Functionality::RegionRating,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Functionality::EntityPerformance => "entity_performance",
            Functionality::RegionPerformance => "region_performance",
            Functionality::EntityRating => "entity_rating",
            Functionality::RegionRating => "region_rating",
        }
    }

    /// Accepts the canonical names plus the agent/state spellings older
    /// invocations use.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "entity_performance" | "agent_performance" => Some(Functionality::EntityPerformance),
            "region_performance" | "state_performance" => Some(Functionality::RegionPerformance),
            "entity_rating" | "agent_rating" => Some(Functionality::EntityRating),
            "region_rating" | "state_rating" => Some(Functionality::RegionRating),
            _ => None,
        }
    }

    /// The downstream stage whose output carries this functionality.
    pub fn stage(&self) -> StageKind {
        match self {
            Functionality::EntityPerformance | Functionality::RegionPerformance => {
                StageKind::Performance
            }
            Functionality::EntityRating | Functionality::RegionRating => StageKind::Rating,
        }
    }

    /// Entity summaries go out on a stage's primary channel, region summaries
    /// on its secondary channel.
    pub fn channel(&self) -> Channel {
        match self {
            Functionality::EntityPerformance | Functionality::EntityRating => Channel::Primary,
            Functionality::RegionPerformance | Functionality::RegionRating => Channel::Secondary,
        }
    }
}

impl fmt::Display for Functionality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One of the program's own output streams.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Destination {
    Stdout,
    Stderr,
}

impl Destination {
    pub fn as_str(&self) -> &'static str {
        match self {
            Destination::Stdout => "stdout",
            Destination::Stderr => "stderr",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "stdout" => Some(Destination::Stdout),
            "stderr" => Some(Destination::Stderr),
            _ => None,
        }
    }
}

impl fmt::Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
