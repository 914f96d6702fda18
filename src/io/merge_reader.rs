use crate::{
    constants::COLUMN_HEADER_PREFIX,
    core::{
        consensus::{CombinedRecord, LowKeyMember, RecordCombiner},
        metrics::MergeMetrics,
        record::VcfRecord,
        samples::{name_position_maps, GlobalSampleMap},
    },
    io::source_reader::SourceReader,
    utils::util::{format_number_with_commas, Result},
};
use std::io::BufRead;

/// Read position of one source.
#[derive(Debug, Clone, PartialEq)]
pub enum Cursor {
    Active(VcfRecord),
    Exhausted,
}

impl Cursor {
    pub fn position(&self) -> Option<i64> {
        match self {
            Cursor::Active(record) => Some(record.position),
            Cursor::Exhausted => None,
        }
    }
}

struct MergeSource<R> {
    reader: SourceReader<R>,
    cursor: Cursor,
    local_to_global: Vec<usize>,
    records_read: u64,
}

impl<R: BufRead> MergeSource<R> {
    fn advance(&mut self) -> Result<()> {
        let previous = self.cursor.position();
        self.cursor = match self.reader.next_record()? {
            Some(record) => {
                self.records_read += 1;
                if let Some(previous) = previous.filter(|&p| record.position < p) {
                    log::warn!(
                        "Source {}: position {} follows {}, input is not sorted",
                        self.reader.name(),
                        record.position,
                        previous
                    );
                }
                Cursor::Active(record)
            }
            None => {
                log::debug!(
                    "Source {} exhausted after {} records",
                    self.reader.name(),
                    format_number_with_commas(self.records_read)
                );
                Cursor::Exhausted
            }
        };
        Ok(())
    }

    fn at(&self, low_key: i64) -> bool {
        self.cursor.position() == Some(low_key)
    }
}

/// K-way positional merge over position-sorted sources. Sources are visited
/// in ascending name order, which fixes the reference record and the
/// tie-breaking order for every low-key set.
pub struct MergeReader<R> {
    sources: Vec<MergeSource<R>>,
    global: GlobalSampleMap,
    combiner: RecordCombiner,
}

impl<R: BufRead> MergeReader<R> {
    pub fn new(mut readers: Vec<SourceReader<R>>, threshold: f64) -> Result<Self> {
        if readers.is_empty() {
            return Err(crate::gtmerge_error!("No sources to merge"));
        }
        readers.sort_by(|a, b| a.name().cmp(b.name()));

        let maps = name_position_maps(readers.iter().map(|r| (r.name(), r.samples())))?;
        let global = GlobalSampleMap::from_sources(maps.values());
        log::debug!(
            "Global sample map: {} samples from {} sources",
            format_number_with_commas(global.len()),
            readers.len()
        );

        let mut sources = Vec::with_capacity(readers.len());
        for reader in readers {
            let samples = maps.get(reader.name()).ok_or_else(|| {
                crate::gtmerge_error!("No sample map for source {}", reader.name())
            })?;
            let local_to_global = global.local_to_global(reader.name(), samples)?;
            let mut source = MergeSource {
                reader,
                cursor: Cursor::Exhausted,
                local_to_global,
                records_read: 0,
            };
            source.advance()?;
            sources.push(source);
        }

        Ok(Self {
            combiner: RecordCombiner::new(global.len(), threshold),
            sources,
            global,
        })
    }

    pub fn global(&self) -> &GlobalSampleMap {
        &self.global
    }

    pub fn threshold(&self) -> f64 {
        self.combiner.threshold()
    }

    pub fn source_names(&self) -> impl Iterator<Item = &str> {
        self.sources.iter().map(|s| s.reader.name())
    }

    /// The `#CHROM ... FORMAT` label row followed by the output sample names.
    pub fn header_line(&self) -> String {
        let mut line = COLUMN_HEADER_PREFIX.to_string();
        for name in self.global.names() {
            line.push('\t');
            line.push_str(name);
        }
        line
    }

    fn low_key(&self) -> Option<i64> {
        self.sources.iter().filter_map(|s| s.cursor.position()).min()
    }

    /// Emits the combined record for the current low-key set and advances
    /// exactly those sources. Returns `None` once every source is exhausted.
    pub fn step(&mut self, metrics: &mut MergeMetrics) -> Result<Option<CombinedRecord>> {
        let Some(low_key) = self.low_key() else {
            metrics.malformed_records = self.malformed();
            return Ok(None);
        };

        let members: Vec<LowKeyMember<'_>> = self
            .sources
            .iter()
            .filter_map(|source| match &source.cursor {
                Cursor::Active(record) if record.position == low_key => Some(LowKeyMember {
                    source_name: source.reader.name(),
                    assay: source.reader.assay(),
                    record,
                    local_to_global: &source.local_to_global,
                }),
                _ => None,
            })
            .collect();
        log::trace!("Low key {} shared by {} sources", low_key, members.len());
        let combined = self.combiner.combine(&members, metrics);

        for source in self.sources.iter_mut().filter(|s| s.at(low_key)) {
            source.advance()?;
        }

        if combined.is_some() {
            metrics.records_written += 1;
        }
        Ok(combined)
    }

    /// Drives the merge to completion, handing every combined record to `sink`.
    pub fn run<F>(&mut self, metrics: &mut MergeMetrics, mut sink: F) -> Result<()>
    where
        F: FnMut(CombinedRecord) -> Result<()>,
    {
        while let Some(record) = self.step(metrics)? {
            sink(record)?;
        }
        Ok(())
    }

    fn malformed(&self) -> u64 {
        self.sources.iter().map(|s| s.reader.malformed()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor as IoCursor;

    type TestReader = SourceReader<IoCursor<Vec<u8>>>;

    fn source(name: &str, samples: &[&str], rows: &[&str]) -> TestReader {
        let mut text = format!("##source={name}\n{COLUMN_HEADER_PREFIX}");
        for sample in samples {
            text.push('\t');
            text.push_str(sample);
        }
        text.push('\n');
        for row in rows {
            text.push_str(row);
            text.push('\n');
        }
        SourceReader::new(name, IoCursor::new(text.into_bytes())).unwrap()
    }

    fn row(chrom: &str, pos: i64, id: &str, alt: &str, genotypes: &[&str]) -> String {
        let mut line = format!("{chrom}\t{pos}\t{id}\tA\t{alt}\t.\tPASS\t.\tGT:GP");
        for genotype in genotypes {
            line.push('\t');
            line.push_str(genotype);
        }
        line
    }

    fn collect(reader: &mut MergeReader<IoCursor<Vec<u8>>>, metrics: &mut MergeMetrics) -> Vec<CombinedRecord> {
        let mut out = Vec::new();
        reader
            .run(metrics, |record| {
                out.push(record);
                Ok(())
            })
            .unwrap();
        out
    }

    #[test]
    fn merge_emits_each_position_once_in_order() {
        let affy = source(
            "affy",
            &["s1"],
            &[
                &row("1", 100, "rs1", "G", &["0/0:1,0,0"]),
                &row("1", 300, "rs3", "G", &["0/1:0,1,0"]),
                &row("1", 500, "rs5", "G", &["1/1:0,0,1"]),
            ],
        );
        let broad = source(
            "broad",
            &["s2"],
            &[
                &row("1", 200, "rs2", "G", &["0/0:1,0,0"]),
                &row("1", 300, "rs3", "G", &["0/0:1,0,0"]),
                &row("1", 600, "rs6", "G", &["0/1:0,1,0"]),
            ],
        );
        let mut reader = MergeReader::new(vec![broad, affy], 0.9).unwrap();
        let mut metrics = MergeMetrics::new();
        let records = collect(&mut reader, &mut metrics);

        let positions: Vec<i64> = records.iter().map(|r| r.position).collect();
        assert_eq!(positions, vec![100, 200, 300, 500, 600]);
        assert_eq!(metrics.records_written, 5);
        assert_eq!(records[2].genotypes, vec!["0/1:0,1,0:A", "0/0:1,0,0:B"]);
        assert_eq!(records[0].genotypes, vec!["0/0:1,0,0:A", "."]);
        assert_eq!(records[4].genotypes, vec![".", "0/1:0,1,0:B"]);
        assert!(reader.step(&mut metrics).unwrap().is_none());
    }

    #[test]
    fn header_line_lists_sorted_union_of_samples() {
        let affy = source("affy", &["s2", "s1"], &[]);
        let broad = source("broad", &["s3", "s2"], &[]);
        let reader = MergeReader::new(vec![affy, broad], 0.9).unwrap();
        assert_eq!(
            reader.header_line(),
            format!("{COLUMN_HEADER_PREFIX}\ts1\ts2\ts3")
        );
        assert_eq!(reader.global().names(), ["s1", "s2", "s3"]);
    }

    #[test]
    fn source_order_is_by_name_regardless_of_input_order() {
        let make = || {
            vec![
                source("illumina", &["s1"], &[&row("1", 10, "rs1", "G", &["0/1:0,0.8,0.2"])]),
                source("affy", &["s1"], &[&row("1", 10, "rs1", "G", &["0/0:0.8,0.1,0.1"])]),
            ]
        };
        let mut forward = MergeReader::new(make(), 0.5).unwrap();
        let mut reversed_input = make();
        reversed_input.reverse();
        let mut reversed = MergeReader::new(reversed_input, 0.5).unwrap();

        assert_eq!(forward.source_names().collect::<Vec<_>>(), ["affy", "illumina"]);
        let mut m1 = MergeMetrics::new();
        let mut m2 = MergeMetrics::new();
        let a = collect(&mut forward, &mut m1);
        let b = collect(&mut reversed, &mut m2);
        assert_eq!(a, b);
        // Equal probabilities: the affy call is seen first and kept.
        assert_eq!(a[0].genotypes, vec!["0/0:0.8,0.1,0.1:A"]);
        assert_eq!(m1.mismatches, 1);
    }

    #[test]
    fn single_source_passes_resolved_calls_through() {
        let affy = source(
            "affy",
            &["s1", "s2"],
            &[
                &row("01", 5, "rs1", "G", &["0/0:0.95,0.05,0", "0/0:0.5,0.3,0.2"]),
                &row("01", 7, "rs2", "G", &[".", "1/1:0,0,1"]),
            ],
        );
        let mut reader = MergeReader::new(vec![affy], 0.9).unwrap();
        let mut metrics = MergeMetrics::new();
        let records = collect(&mut reader, &mut metrics);

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].prefix.chrom(), "1");
        assert_eq!(records[0].prefix.format(), "GT:GP:AT");
        assert_eq!(records[0].genotypes, vec!["0/0:0.95,0.05,0:A", "./.:0.5,0.3,0.2:A"]);
        assert_eq!(records[1].genotypes, vec![".", "1/1:0,0,1:A"]);
        assert_eq!(metrics.mismatches, 0);
        assert_eq!(metrics.overlap_tested, 0);
        assert_eq!(metrics.missing, 1);
        assert_eq!(metrics.miss_tested, 1);
    }

    #[test]
    fn identity_mismatch_is_rejected_but_both_cursors_advance() {
        let affy = source(
            "affy",
            &["s1"],
            &[&row("1", 10, "rs1", "G", &["0/0:1,0,0"]), &row("1", 20, "rs2", "G", &["0/0:1,0,0"])],
        );
        let broad = source(
            "broad",
            &["s1"],
            &[&row("1", 10, "rs1", "T", &["1/1:0,0,1"]), &row("1", 20, "rs2", "G", &["0/0:1,0,0"])],
        );
        let mut reader = MergeReader::new(vec![affy, broad], 0.9).unwrap();
        let mut metrics = MergeMetrics::new();
        let records = collect(&mut reader, &mut metrics);

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].genotypes, vec!["0/0:1,0,0:A"]);
        assert_eq!(metrics.rejected_records, 1);
        assert_eq!(metrics.two_source_overlaps, 1);
    }

    #[test]
    fn malformed_lines_are_folded_into_metrics() {
        let affy = source(
            "affy",
            &["s1"],
            &["1\t10\trs1", &row("1", 20, "rs2", "G", &["0/0:1,0,0"])],
        );
        let mut reader = MergeReader::new(vec![affy], 0.9).unwrap();
        let mut metrics = MergeMetrics::new();
        let records = collect(&mut reader, &mut metrics);
        assert_eq!(records.len(), 1);
        assert_eq!(metrics.malformed_records, 1);
    }

    #[test]
    fn duplicate_source_names_are_fatal() {
        let a = source("affy", &["s1"], &[]);
        let b = source("affy", &["s2"], &[]);
        assert!(MergeReader::new(vec![a, b], 0.9).is_err());
    }
}
