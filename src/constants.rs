pub const DEFAULT_THRESHOLD: f64 = 0.9;
pub const DEFAULT_VCF_PREFIX: &str = ".";
pub const DEFAULT_CHROMOSOME: &str = "22";
pub const DEFAULT_OUTPUT_QUEUE_CAPACITY: usize = 1024;

/// Number of fixed columns preceding the per-sample fields (CHROM..FORMAT).
pub const PREFIX_FIELD_COUNT: usize = 9;

/// FORMAT sub-field holding the comma-separated genotype posteriors.
pub const PROBABILITY_FIELD: &str = "GP";
/// FORMAT sub-field appended to every combined record to carry the assay tag.
pub const ASSAY_TAG_FIELD: &str = "AT";

/// Sample field marking a sample absent from a record.
pub const NO_DATA: &str = ".";
pub const MISSING_GENOTYPE: &str = "./.";
/// Called genotypes indexed by the position of their posterior in the GP list.
pub const GENOTYPE_CALLS: [&str; 3] = ["0/0", "0/1", "1/1"];

pub const COLUMN_HEADER_PREFIX: &str = "#CHROM\tPOS\tID\tREF\tALT\tQUAL\tFILTER\tINFO\tFORMAT";
