use crate::{
    constants::{PREFIX_FIELD_COUNT, PROBABILITY_FIELD},
    error::GtMergeError,
    utils::util::Result,
};
use std::fmt;

pub const CHROM_IDX: usize = 0;
pub const POS_IDX: usize = 1;
pub const ID_IDX: usize = 2;
pub const REF_IDX: usize = 3;
pub const ALT_IDX: usize = 4;
pub const FORMAT_IDX: usize = 8;

/// The fixed CHROM..FORMAT columns of a VCF data line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordPrefix {
    fields: [String; PREFIX_FIELD_COUNT],
}

/// Identity used to decide whether records from different sources describe
/// the same variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VariantKey<'a> {
    pub id: &'a str,
    pub ref_allele: &'a str,
    pub alt_allele: &'a str,
}

impl fmt::Display for VariantKey<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}>{}", self.id, self.ref_allele, self.alt_allele)
    }
}

impl RecordPrefix {
    pub fn new(fields: [String; PREFIX_FIELD_COUNT]) -> Self {
        Self { fields }
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    pub fn chrom(&self) -> &str {
        &self.fields[CHROM_IDX]
    }

    pub fn pos(&self) -> &str {
        &self.fields[POS_IDX]
    }

    pub fn id(&self) -> &str {
        &self.fields[ID_IDX]
    }

    pub fn alleles(&self) -> (&str, &str) {
        (&self.fields[REF_IDX], &self.fields[ALT_IDX])
    }

    pub fn format(&self) -> &str {
        &self.fields[FORMAT_IDX]
    }

    pub fn variant_key(&self) -> VariantKey<'_> {
        let (ref_allele, alt_allele) = self.alleles();
        VariantKey {
            id: self.id(),
            ref_allele,
            alt_allele,
        }
    }

    /// Parses POS as a 64-bit integer.
    pub fn try_position(&self) -> Result<i64> {
        Ok(self.pos().trim().parse::<i64>()?)
    }

    /// Lenient POS parse: an unparsable value sorts first as position 0.
    pub fn position(&self) -> i64 {
        self.try_position().unwrap_or_else(|e| {
            log::warn!(
                "Unparsable POS '{}' for {}:{} ({e}), treating as 0",
                self.pos(),
                self.chrom(),
                self.id()
            );
            0
        })
    }

    /// Index of the GP sub-field within FORMAT, if present.
    pub fn probability_index(&self) -> Option<usize> {
        probability_field_index(self.format())
    }

    pub fn append_format_tag(&mut self, tag: &str) {
        let format = &mut self.fields[FORMAT_IDX];
        format.push(':');
        format.push_str(tag);
    }

    /// Strips exactly one leading '0' from CHROM ("01" -> "1", "0" -> "").
    pub fn normalise_chromosome(&mut self) {
        let chrom = &mut self.fields[CHROM_IDX];
        if chrom.starts_with('0') {
            chrom.remove(0);
        }
    }
}

pub fn probability_field_index(format: &str) -> Option<usize> {
    format
        .split(':')
        .position(|field| field == PROBABILITY_FIELD)
}

/// One decoded data line: fixed prefix plus one raw field per sample.
#[derive(Debug, Clone, PartialEq)]
pub struct VcfRecord {
    pub prefix: RecordPrefix,
    pub samples: Vec<String>,
    pub position: i64,
}

impl VcfRecord {
    pub fn decode(line: &str) -> Result<Self> {
        let (prefix, samples) = split_prefix_suffix(line)?;
        let position = prefix.position();
        Ok(Self {
            prefix,
            samples,
            position,
        })
    }

    pub fn variant_key(&self) -> VariantKey<'_> {
        self.prefix.variant_key()
    }

    pub fn probability_index(&self) -> Option<usize> {
        self.prefix.probability_index()
    }
}

impl fmt::Display for VcfRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.prefix.fields.join("\t"))?;
        for sample in &self.samples {
            write!(f, "\t{sample}")?;
        }
        Ok(())
    }
}

/// Splits a tab-delimited line into the nine prefix fields and the remaining
/// per-sample fields.
pub fn split_prefix_suffix(line: &str) -> Result<(RecordPrefix, Vec<String>)> {
    let mut columns = line.split('\t');
    let mut prefix: [String; PREFIX_FIELD_COUNT] = Default::default();
    for (found, slot) in prefix.iter_mut().enumerate() {
        *slot = columns
            .next()
            .ok_or(GtMergeError::MalformedRecord {
                expected: PREFIX_FIELD_COUNT,
                found,
            })?
            .to_string();
    }
    let samples = columns.map(str::to_string).collect();
    Ok((RecordPrefix::new(prefix), samples))
}
