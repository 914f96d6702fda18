use crate::{
    core::{consensus::CombinedRecord, qc::RecordQc},
    utils::util::Result,
};
use std::{
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};

pub const QC_HEADER: &str = "CHROM\tPOS\tID\tCR\tRAF\tAAF\tMAF\tHWE_P\tHET\tHOM_C\tHOM_R\tN\tMISS\tDOT";

/// Per-record QC table, one row per combined record.
pub struct QcWriter {
    writer: BufWriter<File>,
    rows: u64,
}

impl QcWriter {
    pub fn from_path(path: &Path) -> Result<Self> {
        let file = File::create(path).map_err(|error| {
            crate::gtmerge_error!("Failed to create QC file at {}: {}", path.display(), error)
        })?;
        let mut writer = BufWriter::new(file);
        writeln!(writer, "{QC_HEADER}")
            .map_err(|error| crate::gtmerge_error!("Failed to write QC header: {error}"))?;
        Ok(Self { writer, rows: 0 })
    }

    pub fn write_row(&mut self, record: &CombinedRecord, qc: &RecordQc) -> Result<()> {
        let counts = &qc.counts;
        writeln!(
            self.writer,
            "{}\t{}\t{}\t{:.4}\t{:.4}\t{:.4}\t{:.4}\t{:.4e}\t{}\t{}\t{}\t{}\t{}\t{}",
            sanitize_tsv_field(record.prefix.chrom()),
            record.position,
            sanitize_tsv_field(record.prefix.id()),
            qc.call_rate,
            qc.ref_allele_freq,
            qc.alt_allele_freq,
            qc.minor_allele_freq,
            qc.hwe_p,
            counts.het,
            qc.hom_common,
            qc.hom_rare,
            counts.tested,
            counts.missing,
            counts.no_data,
        )
        .map_err(|error| crate::gtmerge_error!("Failed to write QC row: {error}"))?;
        self.rows += 1;
        Ok(())
    }

    pub fn finish(mut self) -> Result<u64> {
        self.writer
            .flush()
            .map_err(|error| crate::gtmerge_error!("Failed to flush QC rows: {error}"))?;
        Ok(self.rows)
    }
}

fn sanitize_tsv_field(input: &str) -> String {
    input
        .replace('\t', "\\t")
        .replace('\n', "\\n")
        .replace('\r', "\\r")
}
