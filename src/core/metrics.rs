use crate::utils::util::format_number_with_commas;
use std::fmt;

/// Run-wide counters, updated by the merge driver and the combiner in
/// encounter order and reported once at the end of a run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeMetrics {
    /// Combined records emitted.
    pub records_written: u64,
    /// Genotype contributions considered (excluding `.` no-data fields).
    pub all_genotypes: u64,
    /// Sample/variant slots with contributions from more than one source.
    pub overlap_tested: u64,
    pub two_source_overlaps: u64,
    pub multi_source_overlaps: u64,
    /// Contributions whose call disagreed with the running consensus.
    pub mismatches: u64,
    /// `.` fields, i.e. the sample was listed but carried no data.
    pub missing: u64,
    /// Contributions whose best posterior fell below the threshold.
    pub miss_tested: u64,
    /// Records dropped because their variant identity did not match the
    /// rest of the low-key set.
    pub rejected_records: u64,
    /// Data lines skipped because they could not be decoded.
    pub malformed_records: u64,
    /// Accepted records whose FORMAT differs from the one used for output.
    pub format_mismatches: u64,
}

impl MergeMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_overlap(&mut self, contributions: usize) {
        if contributions < 2 {
            return;
        }
        self.overlap_tested += 1;
        if contributions == 2 {
            self.two_source_overlaps += 1;
        } else {
            self.multi_source_overlaps += 1;
        }
    }

    pub fn summary(&self) -> Vec<(&'static str, u64)> {
        vec![
            ("records", self.records_written),
            ("genotypes", self.all_genotypes),
            ("overlap_tested", self.overlap_tested),
            ("two_overlap", self.two_source_overlaps),
            ("gt_two_overlap", self.multi_source_overlaps),
            ("mismatches", self.mismatches),
            ("missing", self.missing),
            ("miss_tested", self.miss_tested),
            ("rejected", self.rejected_records),
            ("malformed", self.malformed_records),
            ("format_mismatch", self.format_mismatches),
        ]
    }
}

impl fmt::Display for MergeMetrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .summary()
            .into_iter()
            .map(|(name, value)| format!("{name}={}", format_number_with_commas(value)))
            .collect();
        write!(f, "{}", parts.join(" "))
    }
}
