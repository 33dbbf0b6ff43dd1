/// Which reduction a table applies to the values it sees.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatisticKind {
    /// Keep the value with the largest absolute value; ties keep the older one.
    MaxMagnitude,
    /// Arithmetic mean of every value seen.
    RunningMean,
}

/// Running state for one key.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Accumulator {
    MaxMagnitude(f64),
    RunningMean { sum: f64, count: u64 },
}

impl Accumulator {
    pub fn start(kind: StatisticKind, value: f64) -> Self {
        match kind {
            StatisticKind::MaxMagnitude => Accumulator::MaxMagnitude(value),
            StatisticKind::RunningMean => Accumulator::RunningMean {
                sum: value,
                count: 1,
            },
        }
    }

    pub fn observe(&mut self, value: f64) {
        match self {
            Accumulator::MaxMagnitude(current) => *current = max_magnitude(*current, value),
            Accumulator::RunningMean { sum, count } => {
                *sum += value;
                *count += 1;
            }
        }
    }

    pub fn value(&self) -> f64 {
        match *self {
            Accumulator::MaxMagnitude(v) => v,
            Accumulator::RunningMean { sum, count } => sum / count as f64,
        }
    }
}

/// Compare by absolute value, keeping `current` unless `candidate` is strictly larger.
pub fn max_magnitude(current: f64, candidate: f64) -> f64 {
    if candidate.abs() > current.abs() {
        candidate
    } else {
        current
    }
}
