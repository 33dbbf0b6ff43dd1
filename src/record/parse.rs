use crate::record::row::{PerformanceRecord, RatingRecord};
use regex::Regex;
use thiserror::Error;

/// Field delimiter used by both sub-streams.
pub const DELIMITER: &str = ", ";

const PERFORMANCE_FIELDS: usize = 6;
const RATING_FIELDS: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordError {
    #[error("expected {expected} fields separated by \", \", found {found}: {line:?}")]
    TooFewFields {
        expected: usize,
        found: usize,
        line: String,
    },

    #[error("field {field} is not a number: {value:?}")]
    BadNumber { field: &'static str, value: String },

    #[error("line is not valid UTF-8 (first bad byte at offset {offset})")]
    NotUtf8 { offset: usize },
}

/// How numeric fields that do not parse are treated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum NumericMode {
    /// Unparseable numbers become 0.0.
    #[default]
    Lenient,
    /// Unparseable or badly grouped numbers are a record error.
    Strict,
}

/// Splits sub-stream lines into typed records.
#[derive(Debug, Clone)]
pub struct RecordParser {
    // Only compiled in strict mode.
    strict_number: Option<Regex>,
}

impl RecordParser {
    pub fn new(mode: NumericMode) -> anyhow::Result<Self> {
        // Plain (1234.5) or thousands-grouped (1,234.50) decimal, optional sign.
        const NUMBER_RE: &str = r#"^[+-]?(?:(?:\d{1,3}(?:,\d{3})+|\d+)(?:\.\d*)?|\.\d+)$"#;

        let strict_number = match mode {
            NumericMode::Lenient => None,
            NumericMode::Strict => Some(Regex::new(NUMBER_RE)?),
        };
        Ok(Self { strict_number })
    }

    /// Parse `name, id, transactionId, regionId, price, gain`.
    pub fn performance<'a>(&self, line: &'a str) -> Result<PerformanceRecord<'a>, RecordError> {
        let f = split_fields(line, PERFORMANCE_FIELDS)?;
        Ok(PerformanceRecord {
            name: f[0],
            id: f[1],
            transaction_id: f[2],
            region_id: f[3],
            price: f[4],
            gain: self.number("gain", f[5])?,
        })
    }

    /// Parse `id, regionId, rating`.
    pub fn rating<'a>(&self, line: &'a str) -> Result<RatingRecord<'a>, RecordError> {
        let f = split_fields(line, RATING_FIELDS)?;
        Ok(RatingRecord {
            id: f[0],
            region_id: f[1],
            rating: self.number("rating", f[2])?,
        })
    }

    fn number(&self, field: &'static str, raw: &str) -> Result<f64, RecordError> {
        let raw = raw.trim();
        let bad = || RecordError::BadNumber {
            field,
            value: raw.to_string(),
        };

        match &self.strict_number {
            None => Ok(parse_amount(raw).unwrap_or(0.0)),
            Some(re) if re.is_match(raw) => parse_amount(raw).ok_or_else(bad),
            Some(_) => Err(bad()),
        }
    }
}

/// Decode one raw line and drop its line terminator (`\n` or `\r\n`).
///
/// Keys must stay byte-exact, so invalid UTF-8 is an error rather than
/// replacement characters.
pub fn decode_line(raw: &[u8]) -> Result<&str, RecordError> {
    let line = std::str::from_utf8(raw).map_err(|e| RecordError::NotUtf8 {
        offset: e.valid_up_to(),
    })?;
    let line = line.strip_suffix('\n').unwrap_or(line);
    Ok(line.strip_suffix('\r').unwrap_or(line))
}

/// Split `line` on ", " into exactly `expected` fields.
///
/// The last field takes the remainder of the line, delimiters included.
pub fn split_fields(line: &str, expected: usize) -> Result<Vec<&str>, RecordError> {
    let fields: Vec<&str> = line.splitn(expected, DELIMITER).collect();
    if fields.len() < expected {
        return Err(RecordError::TooFewFields {
            expected,
            found: fields.len(),
            line: line.to_string(),
        });
    }
    Ok(fields)
}

/// Drop grouping commas and parse what is left.
pub fn parse_amount(raw: &str) -> Option<f64> {
    let digits: String = raw.chars().filter(|c| *c != ',').collect();
    digits
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
}
