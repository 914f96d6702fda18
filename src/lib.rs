pub mod cli;
pub mod error;

pub mod commands {
    pub mod merge;
}

pub mod core {
    pub mod assay;
    pub mod consensus;
    pub mod genotype;
    pub mod hwe;
    pub mod metrics;
    pub mod qc;
    pub mod record;
    pub mod samples;
}

pub mod io {
    pub mod merge_reader;
    pub mod merge_writer;
    pub mod params;
    pub mod qc_writer;
    pub mod readers;
    pub mod source_reader;
    pub mod template;
    pub mod vcf_writer;
}

pub mod utils {
    pub mod util;
}

pub mod constants;

pub use constants::*;
