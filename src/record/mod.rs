//! Record parsing for the two sub-streams Stage I emits.

pub mod parse;
pub mod row;

pub use parse::{NumericMode, RecordError, RecordParser, decode_line};
