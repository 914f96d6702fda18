use crate::{
    cli::FULL_VERSION,
    core::{consensus::CombinedRecord, qc::RecordQc},
    io::{qc_writer::QcWriter, vcf_writer::VcfWriter},
    utils::util::Result,
};
use crossbeam_channel::Receiver;
use std::{env, thread};

const FILEFORMAT_LINE: &str = "##fileformat=VCFv4.2";
const ASSAY_TAG_LINE: &str =
    r#"##FORMAT=<ID=AT,Number=1,Type=String,Description="Assay type that contributed the genotype">"#;

/// Header lines of the merged output, ending with the column label row.
pub fn create_output_header(column_header: String, no_version: bool) -> Vec<String> {
    let mut lines = vec![FILEFORMAT_LINE.to_string(), ASSAY_TAG_LINE.to_string()];
    if !no_version {
        add_version_info(&mut lines);
    }
    lines.push(column_header);
    lines
}

fn add_version_info(lines: &mut Vec<String>) {
    lines.push(format!(
        "##{}Version={}",
        env!("CARGO_PKG_NAME"),
        &**FULL_VERSION
    ));

    let command_line = env::args().collect::<Vec<String>>().join(" ");
    lines.push(format!("##{}Command={}", env!("CARGO_PKG_NAME"), command_line));
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriterSummary {
    pub records: u64,
    pub qc_rows: u64,
}

/// Serializes combined records in arrival order until the channel closes.
/// With a QC writer, each record also gets a QC row computed at `threshold`.
pub fn spawn_writer_thread(
    mut writer: VcfWriter,
    mut qc_writer: Option<QcWriter>,
    threshold: f64,
    receiver: Receiver<CombinedRecord>,
) -> thread::JoinHandle<Result<WriterSummary>> {
    thread::spawn(move || -> Result<WriterSummary> {
        log::debug!("Writer thread started.");
        for record in receiver {
            writer.write_record(&record)?;
            if let Some(qc_writer) = qc_writer.as_mut() {
                let qc = RecordQc::from_record(&record, threshold);
                qc_writer.write_row(&record, &qc)?;
            }
        }

        let records = writer.finish()?;
        let qc_rows = match qc_writer {
            Some(qc_writer) => qc_writer.finish()?,
            None => 0,
        };
        log::debug!("Writer thread finished.");
        Ok(WriterSummary { records, qc_rows })
    })
}
