use crate::{
    constants::*,
    io::template::{read_template, sources_from_pairs, SourceEntry},
    utils::util::{try_exists, Result},
};
use chrono::Datelike;
use clap::{ArgAction, ArgGroup, Parser, Subcommand};
use env_logger::{fmt::Color, Target, WriteStyle};
use log::{Level, LevelFilter};
use once_cell::sync::Lazy;
use std::{
    fs::OpenOptions,
    io::Write,
    path::{Path, PathBuf},
};

/// Full version string including the crate version and git description.
///
/// # Examples
/// * `0.1.0-1ba958a-dirty` - while on a dirty branch
/// * `0.1.0-1ba958a` - with a fresh commit
pub static FULL_VERSION: Lazy<String> = Lazy::new(|| {
    match option_env!("VERGEN_GIT_DESCRIBE") {
        Some(git_describe) if !git_describe.is_empty() => {
            format!("{}-{}", env!("CARGO_PKG_VERSION"), git_describe)
        }
        _ => env!("CARGO_PKG_VERSION").to_string(),
    }
});

#[derive(Parser, Debug)]
#[command(name="gtmerge",
          version=&**FULL_VERSION,
          about="Consensus merge of genotype calls from multiple assays",
          long_about = None,
          after_help = format!("Copyright (C) 2013-{}
          This program comes with ABSOLUTELY NO WARRANTY.", chrono::Utc::now().year()),
          help_template = "{name} {version}\n{about-section}\n{usage-heading}\n    {usage}\n\n{all-args}{after-help}",
          )]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Specify multiple times to increase verbosity level (e.g., -vv for more verbosity)
    #[arg(
        short = 'v',
        long = "verbose",
        action = ArgAction::Count,
        global = true
    )]
    pub verbosity: u8,

    /// Append log output to this file instead of standard error
    #[arg(
        long = "log-file",
        value_name = "FILE",
        value_parser = check_prefix_path,
        global = true
    )]
    pub log_file: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    Merge(MergeArgs),
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Command::Merge(_) => "merge",
        }
    }
}

#[derive(Parser, Debug, Clone)]
#[command(group(
    ArgGroup::new("input")
        .required(true)
        .args(["template", "sources"]),
))]
#[command(arg_required_else_help(true))]
pub struct MergeArgs {
    /// Assay template file, one `assay=path-pattern` per line
    #[arg(
        long = "template",
        value_name = "TEMPLATE",
        value_parser = check_file_exists
    )]
    pub template: Option<PathBuf>,

    /// Source to merge as assay=path (repeatable)
    #[arg(long = "source", value_name = "NAME=PATH")]
    pub sources: Option<Vec<String>>,

    /// Directory substituted for the first %s of template patterns
    #[arg(
        long = "vcf-prefix",
        value_name = "DIR",
        default_value = DEFAULT_VCF_PREFIX
    )]
    pub vcf_prefix: String,

    /// Chromosome substituted for the second %s of template patterns
    #[arg(long = "chr", value_name = "CHR", default_value = DEFAULT_CHROMOSOME)]
    pub chromosome: String,

    /// Minimum genotype posterior for a confident call
    #[arg(
        long = "threshold",
        value_name = "PROB",
        default_value_t = DEFAULT_THRESHOLD,
        value_parser = threshold_in_range
    )]
    pub threshold: f64,

    /// Write output to a file [default: standard output]
    #[arg(
        short = 'o',
        long = "output",
        value_name = "FILE",
        value_parser = check_prefix_path
    )]
    pub output: Option<String>,

    /// Write a per-record QC table (call rate, allele frequencies, HWE)
    #[arg(
        long = "qc-output",
        value_name = "FILE",
        value_parser = check_prefix_path
    )]
    pub qc_output: Option<String>,

    /// Write the end-of-run counters as name/value lines
    #[arg(
        long = "metrics",
        value_name = "FILE",
        value_parser = check_prefix_path
    )]
    pub metrics: Option<String>,

    /// QC parameter file (TESTNUM, MAFDELTA, CALLRATE, INFOSCORE)
    #[arg(
        long = "params",
        value_name = "FILE",
        value_parser = check_file_exists
    )]
    pub params: Option<PathBuf>,

    /// Run even if there is only one source on input
    #[arg(long = "force-single", help_heading = "Advanced")]
    pub force_single: bool,

    /// Do not append version and command line to the header
    #[arg(long = "no-version", help_heading = "Advanced")]
    pub no_version: bool,

    /// Number of combined records buffered between the merge and the writer
    #[arg(
        long = "output-queue-capacity",
        value_name = "N",
        default_value_t = DEFAULT_OUTPUT_QUEUE_CAPACITY,
        value_parser = capacity_in_range,
        help_heading = "Advanced"
    )]
    pub output_queue_capacity: usize,
}

/// Initializes the verbosity level for logging based on the command-line arguments.
///
/// With `--log-file`, records are appended to that file without colour.
pub fn init_verbose(args: &Cli) -> Result<()> {
    let filter_level: LevelFilter = match args.verbosity {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };

    let mut builder = env_logger::Builder::from_default_env();
    builder
        .format(|buf, record| {
            let level = record.level();
            let mut style = buf.style();
            match record.level() {
                Level::Error => style.set_color(Color::Red),
                Level::Warn => style.set_color(Color::Yellow),
                Level::Info => style.set_color(Color::Green),
                Level::Debug => style.set_color(Color::Blue),
                Level::Trace => style.set_color(Color::Cyan),
            };

            writeln!(
                buf,
                "{} [{}] {} - {}",
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
                style.value(level),
                record.module_path().unwrap_or("unknown_module"),
                record.args()
            )
        })
        .filter_level(filter_level);

    if let Some(path) = &args.log_file {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|e| crate::gtmerge_error!("Failed to open log file {}: {}", path, e))?;
        builder
            .target(Target::Pipe(Box::new(file)))
            .write_style(WriteStyle::Never);
    }

    builder.init();
    Ok(())
}

fn threshold_in_range(s: &str) -> Result<f64> {
    let threshold: f64 = s
        .parse::<f64>()
        .map_err(|_| crate::gtmerge_error!("`{}` is not a valid probability", s))?;
    if !(0.0..=1.0).contains(&threshold) {
        return Err(crate::gtmerge_error!(
            "Threshold must be within [0, 1], got {}",
            threshold
        ));
    }
    Ok(threshold)
}

fn capacity_in_range(s: &str) -> Result<usize> {
    let capacity: usize = s
        .parse::<usize>()
        .map_err(|_| crate::gtmerge_error!("`{}` is not a valid queue capacity", s))?;
    if capacity == 0 {
        return Err(crate::gtmerge_error!("Queue capacity must be >= 1"));
    }
    Ok(capacity)
}

/// Checks if the provided file path exists.
fn check_file_exists(s: &str) -> Result<PathBuf> {
    let path = Path::new(s);
    if !path.exists() {
        return Err(crate::gtmerge_error!(
            "File does not exist: {}",
            path.display()
        ));
    }
    Ok(path.to_path_buf())
}

fn check_prefix_path(s: &str) -> Result<String> {
    let path = Path::new(s);
    if let Some(parent_dir) = path.parent() {
        if !parent_dir.as_os_str().is_empty() && !parent_dir.exists() {
            return Err(crate::gtmerge_error!(
                "Path does not exist: {}",
                parent_dir.display()
            ));
        }
    }
    Ok(s.to_string())
}

impl MergeArgs {
    /// Resolves the input sources from `--template` or `--source` and checks
    /// that every resolved path exists.
    pub fn process_sources(&self) -> Result<Vec<SourceEntry>> {
        let entries = match (&self.template, &self.sources) {
            (Some(template), None) => read_template(template, &self.vcf_prefix, &self.chromosome)?,
            (None, Some(pairs)) => sources_from_pairs(pairs)?,
            _ => unreachable!("Either --template or --source is provided, never both"),
        };
        for entry in &entries {
            try_exists(Path::new(&entry.path))?;
        }
        Ok(entries)
    }
}
