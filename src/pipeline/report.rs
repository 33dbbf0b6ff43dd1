//! Run summary, optionally written as JSON after the pipeline finishes.

use crate::routing::{Destination, Functionality, RoutingTable};
use crate::Result;

use anyhow::Context;
use serde::Serialize;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub routes: RoutingTable,
    pub stages: Vec<StageReport>,
    pub channels: Vec<ChannelReport>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StageReport {
    pub stage: String,
    pub success: bool,
    /// None when the stage was killed by a signal.
    pub exit_code: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChannelReport {
    pub functionality: Functionality,
    pub bytes: usize,
    /// None when the buffer was discarded.
    pub routed_to: Option<Destination>,
}

impl RunReport {
    pub fn all_succeeded(&self) -> bool {
        self.stages.iter().all(|s| s.success)
    }

    pub fn failed_stages(&self) -> impl Iterator<Item = &StageReport> {
        self.stages.iter().filter(|s| !s.success)
    }

    pub fn write_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json).with_context(|| format!("write report {}", path.display()))?;
        Ok(())
    }
}
