use crate::core::{
    consensus::CombinedRecord,
    genotype::{call_genotype, is_no_data},
    hwe::hwe_exact_p_value,
};

/// Genotype class counts over the sample columns of one combined record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GenotypeCounts {
    pub hom_ref: u64,
    pub het: u64,
    pub hom_alt: u64,
    /// Samples carrying a field other than `.`.
    pub tested: u64,
    /// Tested samples that resolved to `./.`.
    pub missing: u64,
    /// Samples with no field at all (`.`).
    pub no_data: u64,
}

impl GenotypeCounts {
    /// Re-calls every sample field at `threshold` using the record's own GP
    /// position and tallies the resulting genotypes.
    pub fn from_record(record: &CombinedRecord, threshold: f64) -> Self {
        let prob_index = record.prefix.probability_index();
        let mut counts = Self::default();
        for field in &record.genotypes {
            if is_no_data(field) {
                counts.no_data += 1;
                continue;
            }
            counts.tested += 1;
            match call_genotype(field, threshold, prob_index).call() {
                "0/0" => counts.hom_ref += 1,
                "0/1" | "1/0" => counts.het += 1,
                "1/1" => counts.hom_alt += 1,
                _ => counts.missing += 1,
            }
        }
        counts
    }

    pub fn called(&self) -> u64 {
        self.hom_ref + self.het + self.hom_alt
    }
}

/// Per-record QC summary: call rate, allele frequencies and HWE p-value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RecordQc {
    pub counts: GenotypeCounts,
    pub call_rate: f64,
    pub ref_allele_freq: f64,
    pub alt_allele_freq: f64,
    pub minor_allele_freq: f64,
    pub hwe_p: f64,
    pub hom_common: u64,
    pub hom_rare: u64,
}

impl RecordQc {
    pub fn from_record(record: &CombinedRecord, threshold: f64) -> Self {
        Self::from_counts(GenotypeCounts::from_record(record, threshold))
    }

    pub fn from_counts(counts: GenotypeCounts) -> Self {
        let (call_rate, ref_allele_freq, alt_allele_freq) = if counts.tested == 0 {
            (0.0, 0.0, 0.0)
        } else {
            let n = counts.tested as f64;
            (
                counts.called() as f64 / n,
                (2 * counts.hom_ref + counts.het) as f64 / (2.0 * n),
                (2 * counts.hom_alt + counts.het) as f64 / (2.0 * n),
            )
        };
        let (hom_common, hom_rare) = if counts.hom_alt > counts.hom_ref {
            (counts.hom_alt, counts.hom_ref)
        } else {
            (counts.hom_ref, counts.hom_alt)
        };

        Self {
            counts,
            call_rate,
            ref_allele_freq,
            alt_allele_freq,
            minor_allele_freq: ref_allele_freq.min(alt_allele_freq),
            hwe_p: hwe_exact_p_value(counts.het, counts.hom_ref, counts.hom_alt),
            hom_common,
            hom_rare,
        }
    }
}
