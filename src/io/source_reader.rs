use crate::{
    core::{
        assay::AssayType,
        record::{split_prefix_suffix, VcfRecord},
    },
    error::GtMergeError,
    utils::util::Result,
};
use std::io::BufRead;

/// Forward-only reader over one source's tab-delimited genotype stream.
pub struct SourceReader<R> {
    name: String,
    assay: AssayType,
    samples: Vec<String>,
    reader: R,
    line: Vec<u8>,
    line_number: usize,
    malformed: u64,
}

impl<R: BufRead> SourceReader<R> {
    /// Consumes the `##` meta lines and the `#CHROM` column header. Reaching
    /// EOF before the column header is fatal.
    pub fn new(name: impl Into<String>, mut reader: R) -> Result<Self> {
        let name = name.into();
        let mut line = String::new();
        let mut line_number = 0;
        let samples = loop {
            line.clear();
            if reader.read_line(&mut line)? == 0 {
                return Err(GtMergeError::MissingSampleHeader { source_name: name });
            }
            line_number += 1;
            let text = line.trim_end_matches(['\n', '\r']);
            if text.starts_with("##") {
                continue;
            }
            if text.starts_with('#') {
                let (_, samples) = split_prefix_suffix(text).map_err(|e| {
                    crate::gtmerge_error!("Malformed column header in source {name}: {e}")
                })?;
                break samples;
            }
        };
        log::debug!(
            "Source {}: {} samples, header ends at line {}",
            name,
            samples.len(),
            line_number
        );

        Ok(Self {
            assay: AssayType::from_name(&name),
            name,
            samples,
            reader,
            line: Vec::new(),
            line_number,
            malformed: 0,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn assay(&self) -> &AssayType {
        &self.assay
    }

    pub fn samples(&self) -> &[String] {
        &self.samples
    }

    /// Data lines skipped so far because they could not be decoded.
    pub fn malformed(&self) -> u64 {
        self.malformed
    }

    /// Reads the next decodable record. Blank lines are skipped; lines that
    /// are not valid UTF-8, have too few columns or a sample count that
    /// disagrees with the header are logged and skipped. Read failures of the
    /// underlying stream are fatal.
    pub fn next_record(&mut self) -> Result<Option<VcfRecord>> {
        loop {
            self.line.clear();
            let bytes_read = self.reader.read_until(b'\n', &mut self.line).map_err(|e| {
                crate::gtmerge_error!(
                    "Error reading source {} after line {}: {e}",
                    self.name,
                    self.line_number
                )
            })?;
            if bytes_read == 0 {
                return Ok(None);
            }
            self.line_number += 1;

            let text = match std::str::from_utf8(&self.line) {
                Ok(text) => text.trim_end_matches(['\n', '\r']),
                Err(e) => {
                    log::warn!(
                        "Source {} line {}: skipping record with invalid UTF-8: {e}",
                        self.name,
                        self.line_number
                    );
                    self.malformed += 1;
                    continue;
                }
            };
            if text.is_empty() {
                continue;
            }
            match self.decode(text) {
                Ok(record) => return Ok(Some(record)),
                Err(e) => {
                    log::warn!(
                        "Source {} line {}: skipping record: {e}",
                        self.name,
                        self.line_number
                    );
                    self.malformed += 1;
                }
            }
        }
    }

    fn decode(&self, text: &str) -> Result<VcfRecord> {
        let record = VcfRecord::decode(text)?;
        if record.samples.len() != self.samples.len() {
            return Err(GtMergeError::SampleCountMismatch {
                source_name: self.name.clone(),
                expected: self.samples.len(),
                found: record.samples.len(),
            });
        }
        Ok(record)
    }
}
