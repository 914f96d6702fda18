use super::*;
use crate::{
    constants::{COLUMN_HEADER_PREFIX, DEFAULT_CHROMOSOME, DEFAULT_OUTPUT_QUEUE_CAPACITY},
    io::qc_writer::QC_HEADER,
    utils::util::init_logger,
};
use flate2::{write::GzEncoder, Compression};
use std::{
    fs::{self, File},
    io::{BufRead, Write},
    path::PathBuf,
};
use tempfile::{tempdir, TempDir};

fn vcf_text(samples: &[&str], rows: &[&str]) -> String {
    let mut text = String::from("##fileformat=VCFv4.2\n");
    text.push_str(COLUMN_HEADER_PREFIX);
    for sample in samples {
        text.push('\t');
        text.push_str(sample);
    }
    text.push('\n');
    for row in rows {
        text.push_str(row);
        text.push('\n');
    }
    text
}

fn write_plain(dir: &TempDir, name: &str, text: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, text).unwrap();
    path
}

fn write_gz(dir: &TempDir, name: &str, text: &str) -> PathBuf {
    let path = dir.path().join(name);
    let mut encoder = GzEncoder::new(File::create(&path).unwrap(), Compression::default());
    encoder.write_all(text.as_bytes()).unwrap();
    encoder.finish().unwrap();
    path
}

fn source_arg(name: &str, path: &Path) -> String {
    format!("{name}={}", path.display())
}

fn merge_args(sources: Vec<String>, output: &Path, threshold: f64) -> MergeArgs {
    MergeArgs {
        template: None,
        sources: Some(sources),
        vcf_prefix: ".".to_string(),
        chromosome: DEFAULT_CHROMOSOME.to_string(),
        threshold,
        output: Some(output.to_string_lossy().into_owned()),
        qc_output: None,
        metrics: None,
        params: None,
        force_single: false,
        no_version: true,
        output_queue_capacity: DEFAULT_OUTPUT_QUEUE_CAPACITY,
    }
}

fn read_lines(path: &Path) -> Vec<String> {
    open_catalog_reader(path)
        .unwrap()
        .lines()
        .map(|l| l.unwrap())
        .collect()
}

fn two_assay_fixture(dir: &TempDir) -> (PathBuf, PathBuf) {
    let affy = write_plain(
        dir,
        "affy.vcf",
        &vcf_text(
            &["s1", "s2"],
            &[
                "01\t1000\trs1\tA\tG\t.\tPASS\t.\tGT:GP\t0/0:0.1,0.8,0.1\t0/1:0.05,0.9,0.05",
                "01\t2000\trs2\tC\tT\t.\tPASS\t.\tGT:GP\t1/1:0,0.05,0.95\t.",
            ],
        ),
    );
    let broad = write_gz(
        dir,
        "broad.vcf.gz",
        &vcf_text(
            &["s2", "s3"],
            &[
                "01\t1000\trs1\tA\tG\t.\tPASS\t.\tGT:GP\t0/1:0.02,0.2,0.78\t0/0:0.9,0.05,0.05",
                "01\t1500\trs15\tG\tA\t.\tPASS\t.\tGT:GP\t0/0:0.99,0.01,0\t0/0:0.5,0.4,0.1",
            ],
        ),
    );
    (affy, broad)
}

#[test]
fn merge_two_assays_end_to_end() {
    init_logger();
    let dir = tempdir().unwrap();
    let (affy, broad) = two_assay_fixture(&dir);
    let output = dir.path().join("merged.vcf");

    let metrics = merge(merge_args(
        vec![source_arg("broad", &broad), source_arg("affy", &affy)],
        &output,
        0.7,
    ))
    .unwrap();

    let lines = read_lines(&output);
    assert_eq!(lines[0], "##fileformat=VCFv4.2");
    assert!(lines[1].starts_with("##FORMAT=<ID=AT"));
    assert_eq!(lines[2], format!("{COLUMN_HEADER_PREFIX}\ts1\ts2\ts3"));
    assert_eq!(
        &lines[3..],
        [
            "1\t1000\trs1\tA\tG\t.\tPASS\t.\tGT:GP:AT\t0/1:0.1,0.8,0.1:A\t0/1:0.05,0.9,0.05:A\t0/0:0.9,0.05,0.05:B",
            "1\t1500\trs15\tG\tA\t.\tPASS\t.\tGT:GP:AT\t.\t0/0:0.99,0.01,0:B\t./.:0.5,0.4,0.1:B",
            "1\t2000\trs2\tC\tT\t.\tPASS\t.\tGT:GP:AT\t1/1:0,0.05,0.95:A\t.\t.",
        ]
    );

    assert_eq!(metrics.records_written, 3);
    assert_eq!(metrics.mismatches, 1);
    assert_eq!(metrics.two_source_overlaps, 1);
    assert_eq!(metrics.multi_source_overlaps, 0);
    assert_eq!(metrics.all_genotypes, 7);
    assert_eq!(metrics.missing, 1);
    assert_eq!(metrics.miss_tested, 1);
    assert_eq!(metrics.rejected_records, 0);
}

#[test]
fn merge_from_template_writes_gzip_qc_and_metrics() {
    init_logger();
    let dir = tempdir().unwrap();
    two_assay_fixture(&dir);
    fs::rename(dir.path().join("affy.vcf"), dir.path().join("affy_chr1.vcf")).unwrap();
    fs::rename(
        dir.path().join("broad.vcf.gz"),
        dir.path().join("broad_chr1.vcf.gz"),
    )
    .unwrap();
    let template = write_plain(
        &dir,
        "template.txt",
        "# assay=pattern\naffy=%s/affy_chr%s.vcf\nbroad=%s/broad_chr%s.vcf.gz\n",
    );
    let params = write_plain(&dir, "params.txt", "TESTNUM=1\nCALLRATE=0.95\n");
    let output = dir.path().join("merged.vcf.gz");
    let qc_output = dir.path().join("qc.tsv");
    let metrics_output = dir.path().join("metrics.tsv");

    let mut args = merge_args(Vec::new(), &output, 0.7);
    args.sources = None;
    args.template = Some(template);
    args.vcf_prefix = dir.path().to_string_lossy().into_owned();
    args.chromosome = "1".to_string();
    args.params = Some(params);
    args.qc_output = Some(qc_output.to_string_lossy().into_owned());
    args.metrics = Some(metrics_output.to_string_lossy().into_owned());
    merge(args).unwrap();

    let lines = read_lines(&output);
    assert_eq!(lines.len(), 6);
    assert!(lines[3].starts_with("1\t1000\trs1"));

    let qc = fs::read_to_string(&qc_output).unwrap();
    let qc_lines: Vec<&str> = qc.lines().collect();
    assert_eq!(qc_lines[0], QC_HEADER);
    assert_eq!(qc_lines.len(), 4);
    assert!(qc_lines[1].starts_with("1\t1000\trs1\t1.0000\t"));

    let metrics = fs::read_to_string(&metrics_output).unwrap();
    assert!(metrics.lines().any(|l| l == "records\t3"));
    assert!(metrics.lines().any(|l| l == "mismatches\t1"));
}

#[test]
fn single_source_requires_force_single() {
    init_logger();
    let dir = tempdir().unwrap();
    let (affy, _) = two_assay_fixture(&dir);
    let output = dir.path().join("merged.vcf");

    let args = merge_args(vec![source_arg("affy", &affy)], &output, 0.9);
    let err = merge(args.clone()).unwrap_err();
    assert!(err.to_string().contains("--force-single"));

    let mut forced = args;
    forced.force_single = true;
    let metrics = merge(forced).unwrap();
    assert_eq!(metrics.records_written, 2);
    assert_eq!(metrics.mismatches, 0);
    assert_eq!(metrics.overlap_tested, 0);

    let lines = read_lines(&output);
    assert_eq!(lines[2], format!("{COLUMN_HEADER_PREFIX}\ts1\ts2"));
    assert_eq!(
        lines[3],
        "1\t1000\trs1\tA\tG\t.\tPASS\t.\tGT:GP:AT\t./.:0.1,0.8,0.1:A\t0/1:0.05,0.9,0.05:A"
    );
}

#[test]
fn missing_sample_header_is_fatal() {
    init_logger();
    let dir = tempdir().unwrap();
    let (affy, _) = two_assay_fixture(&dir);
    let broken = write_plain(&dir, "broken.vcf", "##fileformat=VCFv4.2\n");
    let output = dir.path().join("merged.vcf");

    let err = merge(merge_args(
        vec![source_arg("affy", &affy), source_arg("broad", &broken)],
        &output,
        0.9,
    ))
    .unwrap_err();
    assert!(err.to_string().contains("broad"));
}

#[test]
fn output_paths_must_differ() {
    let dir = tempdir().unwrap();
    let (affy, broad) = two_assay_fixture(&dir);
    let output = dir.path().join("merged.vcf");
    let mut args = merge_args(
        vec![source_arg("affy", &affy), source_arg("broad", &broad)],
        &output,
        0.9,
    );
    args.qc_output = args.output.clone();
    assert!(merge(args).is_err());
}

#[test]
fn malformed_and_mismatched_rows_do_not_abort_the_merge() {
    init_logger();
    let dir = tempdir().unwrap();
    let affy = write_plain(
        &dir,
        "affy.vcf",
        &vcf_text(
            &["s1"],
            &[
                "1\t10\trs1\tA\tG\t.\tPASS\t.\tGT:GP\t0/0:1,0,0",
                "1\t20\trs2",
                "1\t30\trs3\tA\tG\t.\tPASS\t.\tGT:GP\t0/0:1,0,0\textra",
            ],
        ),
    );
    let illumina = write_plain(
        &dir,
        "illumina.vcf",
        &vcf_text(
            &["s1"],
            &["1\t10\trs1\tA\tC\t.\tPASS\t.\tGT:GP\t1/1:0,0,1"],
        ),
    );
    let output = dir.path().join("merged.vcf");

    let metrics = merge(merge_args(
        vec![source_arg("illumina", &illumina), source_arg("affy", &affy)],
        &output,
        0.9,
    ))
    .unwrap();

    assert_eq!(metrics.records_written, 1);
    assert_eq!(metrics.rejected_records, 1);
    assert_eq!(metrics.malformed_records, 2);
    let lines = read_lines(&output);
    assert_eq!(lines.len(), 4);
    assert!(lines[3].ends_with("\t0/0:1,0,0:A"));
}
