use crate::models::{ObservationRecord, RegionAccumulator};
use std::collections::HashMap;

/// Owns one [`RegionAccumulator`] per distinct region code.
///
/// Accumulators are kept in first-seen order, which is also the report order.
/// Region codes are matched exactly: `ca` and `CA` are different regions.
#[derive(Debug, Default, Clone)]
pub struct RegionAggregator {
    accumulators: Vec<RegionAccumulator>,
    index: HashMap<String, usize>,
}

impl RegionAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one record into its region's accumulator, creating it on first sight.
    pub fn ingest(&mut self, record: &ObservationRecord) {
        match self.index.get(record.region_code.as_str()) {
            Some(&slot) => self.accumulators[slot].fold(record),
            None => {
                self.index
                    .insert(record.region_code.clone(), self.accumulators.len());
                self.accumulators.push(RegionAccumulator::from_record(record));
            }
        }
    }

    /// Fold every record of `other` in, treating `other` as ingested after `self`.
    ///
    /// Sums and counts add; tied extremes keep this aggregator's timestamp.
    /// Regions new to `self` are appended in `other`'s order.
    pub fn merge(&mut self, other: RegionAggregator) {
        for accumulator in other.accumulators {
            match self.index.get(accumulator.region_code()) {
                Some(&slot) => self.accumulators[slot].merge(&accumulator),
                None => {
                    self.index
                        .insert(accumulator.region_code().to_string(), self.accumulators.len());
                    self.accumulators.push(accumulator);
                }
            }
        }
    }

    /// Read-only view of all accumulators in first-seen order.
    pub fn snapshot(&self) -> &[RegionAccumulator] {
        &self.accumulators
    }

    pub fn get(&self, region_code: &str) -> Option<&RegionAccumulator> {
        self.index
            .get(region_code)
            .map(|&slot| &self.accumulators[slot])
    }

    pub fn region_codes(&self) -> impl Iterator<Item = &str> {
        self.accumulators.iter().map(|a| a.region_code())
    }

    pub fn len(&self) -> usize {
        self.accumulators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accumulators.is_empty()
    }

    pub fn total_records(&self) -> u64 {
        self.accumulators.iter().map(|a| a.record_count()).sum()
    }
}
