//! Body of a downstream stage process: read records from stdin until it
//! closes, then write the entity summary to stdout and the region summary to
//! stderr.

use crate::model::{AggregationEngine, StatisticKind};
use crate::record::{NumericMode, RecordParser, decode_line};
use crate::Result;

use anyhow::Context;
use clap::ValueEnum;
use serde::Serialize;
use std::io::{BufRead, Write};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StageKind {
    /// Largest gain swing per entity and region (Stage II).
    Performance,
    /// Mean rating per entity and region (Stage III).
    Rating,
}

impl StageKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StageKind::Performance => "performance",
            StageKind::Rating => "rating",
        }
    }

    pub fn statistic(&self) -> StatisticKind {
        match self {
            StageKind::Performance => StatisticKind::MaxMagnitude,
            StageKind::Rating => StatisticKind::RunningMean,
        }
    }
}

/// Counts reported back to the caller once the stage has finalized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StageStats {
    pub records: u64,
    pub entities: usize,
    pub regions: usize,
}

/// Consume `input` to end-of-stream, then finalize into the two channels.
///
/// Lines are reassembled by the buffered reader, so a record split across
/// several underlying reads is seen whole. A trailing `\r` is dropped; every
/// line, blank or not, must be a valid record or the stage aborts.
pub fn run_stage<R, P, S>(
    kind: StageKind,
    mode: NumericMode,
    mut input: R,
    primary: &mut P,
    secondary: &mut S,
) -> Result<StageStats>
where
    R: BufRead,
    P: Write,
    S: Write,
{
    let mut engine = AggregationEngine::new(kind, RecordParser::new(mode)?);

    let mut buf = Vec::new();
    let mut lno = 0usize;
    loop {
        buf.clear();
        let n = input
            .read_until(b'\n', &mut buf)
            .with_context(|| format!("read {} input", kind.as_str()))?;
        if n == 0 {
            break;
        }
        lno += 1;

        decode_line(&buf)
            .and_then(|line| engine.ingest(line))
            .with_context(|| format!("{} record parse error at line {}", kind.as_str(), lno))?;
    }

    engine
        .finalize(primary, secondary)
        .with_context(|| format!("write {} summary", kind.as_str()))?;
    primary.flush()?;
    secondary.flush()?;

    Ok(StageStats {
        records: engine.records(),
        entities: engine.entities().len(),
        regions: engine.regions().len(),
    })
}
