use crate::{core::consensus::CombinedRecord, utils::util::Result};
use flate2::{write::GzEncoder, Compression};
use std::{
    fs::File,
    io::{self, BufWriter, Write},
    path::Path,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputType {
    Vcf,
    VcfGz,
}

impl OutputType {
    pub fn infer_from_path(path: Option<&Path>) -> Self {
        match path {
            Some(path) if crate::io::readers::is_gzipped(path) => Self::VcfGz,
            _ => Self::Vcf,
        }
    }
}

enum OutputStream {
    Plain(BufWriter<Box<dyn Write + Send>>),
    Gzip(GzEncoder<BufWriter<File>>),
}

impl Write for OutputStream {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Self::Plain(w) => w.write(buf),
            Self::Gzip(w) => w.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Self::Plain(w) => w.flush(),
            Self::Gzip(w) => w.flush(),
        }
    }
}

/// Line-oriented writer for the merged output, to a file or stdout.
pub struct VcfWriter {
    stream: OutputStream,
    records_written: u64,
}

impl VcfWriter {
    pub fn new(output: Option<&Path>) -> Result<Self> {
        let output_type = OutputType::infer_from_path(output);
        log::trace!("{:?}", output_type);

        let stream = match output {
            Some(path) => {
                let file = File::create(path).map_err(|e| {
                    crate::gtmerge_error!("Failed to create output {}: {}", path.display(), e)
                })?;
                match output_type {
                    OutputType::VcfGz => OutputStream::Gzip(GzEncoder::new(
                        BufWriter::new(file),
                        Compression::default(),
                    )),
                    OutputType::Vcf => {
                        let inner: Box<dyn Write + Send> = Box::new(file);
                        OutputStream::Plain(BufWriter::new(inner))
                    }
                }
            }
            None => {
                let inner: Box<dyn Write + Send> = Box::new(io::stdout());
                OutputStream::Plain(BufWriter::new(inner))
            }
        };

        Ok(VcfWriter {
            stream,
            records_written: 0,
        })
    }

    pub fn write_header(&mut self, lines: &[String]) -> Result<()> {
        for line in lines {
            writeln!(self.stream, "{line}")
                .map_err(|e| crate::gtmerge_error!("Failed to write header: {e}"))?;
        }
        Ok(())
    }

    pub fn write_record(&mut self, record: &CombinedRecord) -> Result<()> {
        writeln!(self.stream, "{record}").map_err(|e| {
            crate::gtmerge_error!(
                "Failed to write record {}:{}: {}",
                record.prefix.chrom(),
                record.position,
                e
            )
        })?;
        self.records_written += 1;
        Ok(())
    }

    /// Flushes (and for gzip output, finalizes) the stream. Returns the number
    /// of records written.
    pub fn finish(self) -> Result<u64> {
        match self.stream {
            OutputStream::Plain(mut w) => w.flush()?,
            OutputStream::Gzip(w) => {
                w.finish()?.flush()?;
            }
        }
        Ok(self.records_written)
    }
}
