//! Aggregation model: fold sub-stream records into per-entity and per-region
//! statistics, then render them once the stream ends.

pub mod statistic;
pub mod table;

pub use statistic::StatisticKind;
pub use table::StatTable;

use crate::record::{RecordError, RecordParser};
use crate::render::{format_grouped, format_plain};
use crate::stage::StageKind;
use std::io::{self, Write};

/// One downstream stage's state: an entity table and a region table, both
/// reduced with the statistic the stage kind selects.
#[derive(Debug, Clone)]
pub struct AggregationEngine {
    stage: StageKind,
    parser: RecordParser,
    entities: StatTable,
    regions: StatTable,
    records: u64,
}

impl AggregationEngine {
    pub fn new(stage: StageKind, parser: RecordParser) -> Self {
        let kind = stage.statistic();
        Self {
            stage,
            parser,
            entities: StatTable::new(kind),
            regions: StatTable::new(kind),
            records: 0,
        }
    }

    /// Parse one line (no trailing newline) and fold it into both tables.
    pub fn ingest(&mut self, line: &str) -> Result<(), RecordError> {
        match self.stage {
            StageKind::Performance => {
                let rec = self.parser.performance(line)?;
                self.entities.observe(rec.id, Some(rec.name), rec.gain);
                self.regions.observe(rec.region_id, None, rec.gain);
            }
            StageKind::Rating => {
                let rec = self.parser.rating(line)?;
                self.entities.observe(rec.id, None, rec.rating);
                self.regions.observe(rec.region_id, None, rec.rating);
            }
        }
        self.records += 1;
        Ok(())
    }

    /// Write one line per entity to `primary` and one per region to
    /// `secondary`, each in first-seen order.
    pub fn finalize<P: Write, S: Write>(&self, primary: &mut P, secondary: &mut S) -> io::Result<()> {
        for e in self.entities.iter() {
            match self.stage {
                StageKind::Performance => writeln!(
                    primary,
                    "{}, {}, {}",
                    e.name.as_deref().unwrap_or_default(),
                    e.key,
                    format_grouped(e.value())
                )?,
                StageKind::Rating => writeln!(primary, "{}, {}", e.key, format_plain(e.value()))?,
            }
        }

        for r in self.regions.iter() {
            writeln!(secondary, "{}, {}", r.key, self.render(r.value()))?;
        }
        Ok(())
    }

    fn render(&self, value: f64) -> String {
        match self.stage {
            StageKind::Performance => format_grouped(value),
            StageKind::Rating => format_plain(value),
        }
    }

    pub fn entities(&self) -> &StatTable {
        &self.entities
    }

    pub fn regions(&self) -> &StatTable {
        &self.regions
    }

    pub fn records(&self) -> u64 {
        self.records
    }
}
