use crate::{
    constants::{ASSAY_TAG_FIELD, NO_DATA},
    core::{
        assay::AssayType,
        genotype::{call_genotype, is_no_data, ResolvedGenotype},
        metrics::MergeMetrics,
        record::{RecordPrefix, VcfRecord},
    },
};
use std::fmt;

/// One source's current record within a low-key set.
#[derive(Debug, Clone, Copy)]
pub struct LowKeyMember<'a> {
    pub source_name: &'a str,
    pub assay: &'a AssayType,
    pub record: &'a VcfRecord,
    /// Output column for each of the record's sample fields.
    pub local_to_global: &'a [usize],
}

/// One output row: shared prefix plus one field per output sample column.
#[derive(Debug, Clone, PartialEq)]
pub struct CombinedRecord {
    pub prefix: RecordPrefix,
    pub position: i64,
    pub genotypes: Vec<String>,
}

impl fmt::Display for CombinedRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.prefix.fields().join("\t"))?;
        for genotype in &self.genotypes {
            write!(f, "\t{genotype}")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct RecordCombiner {
    n_columns: usize,
    threshold: f64,
}

impl RecordCombiner {
    pub fn new(n_columns: usize, threshold: f64) -> Self {
        Self {
            n_columns,
            threshold,
        }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Builds the combined record for a low-key set. `members` must already be
    /// in their deterministic order; the first one defines the variant identity
    /// and the shared prefix. Returns `None` for an empty set.
    pub fn combine(
        &self,
        members: &[LowKeyMember<'_>],
        metrics: &mut MergeMetrics,
    ) -> Option<CombinedRecord> {
        let (reference, rest) = members.split_first()?;
        let reference_key = reference.record.variant_key();

        let mut accepted = Vec::with_capacity(members.len());
        accepted.push(reference);
        for member in rest {
            let key = member.record.variant_key();
            if key == reference_key {
                if member.record.prefix.format() != reference.record.prefix.format() {
                    log::warn!(
                        "{} record at {}:{} has FORMAT {} but output uses {} from {}",
                        member.source_name,
                        member.record.prefix.chrom(),
                        member.record.position,
                        member.record.prefix.format(),
                        reference.record.prefix.format(),
                        reference.source_name
                    );
                    metrics.format_mismatches += 1;
                }
                accepted.push(member);
            } else {
                log::warn!(
                    "Rejecting {} record at {}:{} ({}): does not match {} from {}",
                    member.source_name,
                    member.record.prefix.chrom(),
                    member.record.position,
                    key,
                    reference_key,
                    reference.source_name
                );
                metrics.rejected_records += 1;
            }
        }

        let mut columns: Vec<Vec<ResolvedGenotype>> = vec![Vec::new(); self.n_columns];
        for member in accepted {
            let prob_index = member.record.probability_index();
            for (field, &column) in member.record.samples.iter().zip(member.local_to_global) {
                if is_no_data(field) {
                    metrics.missing += 1;
                    continue;
                }
                let tagged = member.assay.tag_genotype(field);
                let resolved = call_genotype(&tagged, self.threshold, prob_index);
                if resolved.is_missing() {
                    metrics.miss_tested += 1;
                }
                columns[column].push(resolved);
            }
        }

        let mut genotypes = Vec::with_capacity(self.n_columns);
        for contributions in columns {
            metrics.all_genotypes += contributions.len() as u64;
            metrics.record_overlap(contributions.len());
            let genotype = match contributions.len() {
                0 => NO_DATA.to_string(),
                1 => contributions.into_iter().next().map(|g| g.field).unwrap_or_default(),
                _ => best_genotype(contributions, metrics),
            };
            genotypes.push(genotype);
        }

        let mut prefix = reference.record.prefix.clone();
        prefix.append_format_tag(ASSAY_TAG_FIELD);
        prefix.normalise_chromosome();

        Some(CombinedRecord {
            prefix,
            position: reference.record.position,
            genotypes,
        })
    }
}

/// Picks one call from several resolved contributions for the same sample.
/// A contribution whose call differs from the running candidate replaces it
/// only with a strictly higher posterior, so ties keep the earliest call.
/// Disagreements between two non-missing calls count as mismatches.
pub fn best_genotype(contributions: Vec<ResolvedGenotype>, metrics: &mut MergeMetrics) -> String {
    let mut contributions = contributions.into_iter();
    let Some(mut candidate) = contributions.next() else {
        return NO_DATA.to_string();
    };

    for contribution in contributions {
        if contribution.call() == candidate.call() {
            continue;
        }
        if !contribution.is_missing() && !candidate.is_missing() {
            metrics.mismatches += 1;
        }
        if contribution.probability > candidate.probability {
            candidate = contribution;
        }
    }
    candidate.field
}
