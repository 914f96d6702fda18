use super::readers::open_catalog_reader;
use crate::utils::util::{log_warning, Result};
use std::{fmt, io::BufRead, path::Path};

/// QC run parameters read from a `KEY=VALUE` file. Unknown keys are ignored
/// and unparsable values fall back to 0.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct QcParams {
    pub test_num: i64,
    pub maf_delta: f64,
    pub call_rate: f64,
    pub info_score: f64,
}

impl fmt::Display for QcParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "TESTNUM={} MAFDELTA={} CALLRATE={} INFOSCORE={}",
            self.test_num, self.maf_delta, self.call_rate, self.info_score
        )
    }
}

impl QcParams {
    pub fn from_path(path: &Path) -> Result<Self> {
        let reader = open_catalog_reader(path)?;
        let mut params = Self::default();
        for (line_number, line) in reader.lines().enumerate() {
            let line = line.map_err(|e| {
                crate::gtmerge_error!("Error at params line {}: {}", line_number + 1, e)
            })?;
            params.apply_line(&line);
        }
        Ok(params)
    }

    fn apply_line(&mut self, line: &str) {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return;
        }
        let Some((key, value)) = line.split_once('=') else {
            log::debug!("Ignoring params line without '=': {line}");
            return;
        };
        let value = value.trim();
        match key.trim() {
            "TESTNUM" => self.test_num = parse_or_zero(key, value),
            "MAFDELTA" => self.maf_delta = parse_or_zero(key, value),
            "CALLRATE" => self.call_rate = parse_or_zero(key, value),
            "INFOSCORE" => self.info_score = parse_or_zero(key, value),
            other => log::debug!("Ignoring unknown params key {other}"),
        }
    }
}

fn parse_or_zero<T>(key: &str, value: &str) -> T
where
    T: std::str::FromStr + Default,
    T::Err: fmt::Display,
{
    value.parse::<T>().unwrap_or_else(|e| {
        log_warning(
            format!("Invalid value '{value}' for {key} ({e}), using 0"),
            T::default(),
        )
    })
}
