use crate::{core::metrics::MergeMetrics, utils::util::Result};
use std::{
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};

const METRICS_HEADER: &str = "metric\tvalue";

/// Writes the end-of-run counters as a two-column TSV, raw integers.
pub(crate) fn write_metrics_file(path: &Path, metrics: &MergeMetrics) -> Result<()> {
    let file = File::create(path).map_err(|error| {
        crate::gtmerge_error!(
            "Failed to create metrics file at {}: {}",
            path.display(),
            error
        )
    })?;
    let mut writer = BufWriter::new(file);
    writeln!(writer, "{METRICS_HEADER}")?;
    for (name, value) in metrics.summary() {
        writeln!(writer, "{name}\t{value}")?;
    }
    writer
        .flush()
        .map_err(|error| crate::gtmerge_error!("Failed to flush metrics file: {error}"))?;
    Ok(())
}
