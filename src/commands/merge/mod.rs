use crate::{
    cli::MergeArgs,
    core::metrics::MergeMetrics,
    io::{
        merge_reader::MergeReader,
        merge_writer::{create_output_header, spawn_writer_thread},
        params::QcParams,
        qc_writer::QcWriter,
        readers::{open_catalog_reader, LineReader},
        source_reader::SourceReader,
        template::SourceEntry,
        vcf_writer::VcfWriter,
    },
    utils::util::{format_number_with_commas, Result},
};
use crossbeam_channel::{bounded, Receiver, Sender};
use std::path::Path;

mod report;
mod shutdown;

use report::write_metrics_file;
use shutdown::finalize_writer_thread;

#[cfg(test)]
mod tests;

fn open_sources(entries: &[SourceEntry]) -> Result<Vec<SourceReader<LineReader>>> {
    entries
        .iter()
        .map(|entry| {
            log::debug!("Opening source {} from {}", entry.name, entry.path);
            let reader = open_catalog_reader(Path::new(&entry.path))?;
            SourceReader::new(entry.name.clone(), reader)
                .map_err(|e| crate::gtmerge_error!("Failed to open source {}: {}", entry.name, e))
        })
        .collect()
}

fn check_distinct_outputs(args: &MergeArgs) -> Result<()> {
    let outputs = [&args.output, &args.qc_output, &args.metrics];
    for (i, a) in outputs.iter().enumerate() {
        for b in &outputs[i + 1..] {
            if let (Some(a), Some(b)) = (a, b) {
                if Path::new(a) == Path::new(b) {
                    return Err(crate::gtmerge_error!(
                        "Output, QC and metrics paths must be different: {}",
                        a
                    ));
                }
            }
        }
    }
    Ok(())
}

pub fn merge(args: MergeArgs) -> Result<MergeMetrics> {
    let entries = args.process_sources()?;
    if entries.len() == 1 && !args.force_single {
        return Err(crate::gtmerge_error!(
            "Expected two or more sources to merge, got only one. Use --force-single to proceed anyway"
        ));
    }
    check_distinct_outputs(&args)?;

    if let Some(params_path) = &args.params {
        let params = QcParams::from_path(params_path)?;
        log::info!("QC parameters: {}", params);
    }

    let readers = open_sources(&entries)?;
    let mut merge_reader = MergeReader::new(readers, args.threshold)?;
    log::info!(
        "Merging {} sources ({}) over {} samples at threshold {}",
        entries.len(),
        merge_reader.source_names().collect::<Vec<_>>().join(","),
        format_number_with_commas(merge_reader.global().len()),
        merge_reader.threshold()
    );

    let header = create_output_header(merge_reader.header_line(), args.no_version);
    let mut writer = VcfWriter::new(args.output.as_deref().map(Path::new))?;
    writer.write_header(&header)?;
    let qc_writer = args
        .qc_output
        .as_deref()
        .map(|path| QcWriter::from_path(Path::new(path)))
        .transpose()?;

    let (record_sender, record_receiver): (Sender<_>, Receiver<_>) =
        bounded(args.output_queue_capacity);
    let writer_thread =
        spawn_writer_thread(writer, qc_writer, args.threshold, record_receiver);

    let mut metrics = MergeMetrics::new();
    let merge_result = merge_reader.run(&mut metrics, |record| {
        record_sender
            .send(record)
            .map_err(|_| crate::gtmerge_error!("Channel receiver closed unexpectedly in merge loop"))
    });
    drop(record_sender);

    let summary = finalize_writer_thread(merge_result, writer_thread)?;
    log::debug!(
        "Writer: {} records, {} QC rows",
        format_number_with_commas(summary.records),
        format_number_with_commas(summary.qc_rows)
    );

    if let Some(path) = &args.metrics {
        write_metrics_file(Path::new(path), &metrics)?;
    }
    Ok(metrics)
}
