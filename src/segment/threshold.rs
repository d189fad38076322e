use super::frequency::FrequencyTable;

/// Share of the largest bucket a bucket must exceed to get its own rule.
pub const THRESHOLD_PERCENT: f64 = 0.05;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Threshold {
    pub largest: usize,
    pub value: usize,
}

pub fn compute(table: &FrequencyTable) -> Threshold {
    let largest = table.largest();
    Threshold {
        largest,
        value: (largest as f64 * THRESHOLD_PERCENT) as usize,
    }
}
