use super::readers::open_catalog_reader;
use crate::{error::GtMergeError, utils::util::Result};
use std::{collections::HashSet, io::BufRead, path::Path};

/// A named input stream, one per assay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceEntry {
    pub name: String,
    pub path: String,
}

/// Fills the `%s` placeholders of a path pattern, in order, with the VCF
/// prefix and then the chromosome. Patterns without placeholders are used
/// verbatim.
pub fn expand_path_pattern(pattern: &str, vcf_prefix: &str, chromosome: &str) -> String {
    let mut values = [vcf_prefix, chromosome].into_iter();
    let mut parts = pattern.split("%s");
    let mut expanded = parts.next().unwrap_or_default().to_string();
    for part in parts {
        match values.next() {
            Some(value) => expanded.push_str(value),
            None => expanded.push_str("%s"),
        }
        expanded.push_str(part);
    }
    expanded
}

/// Parses one `name=value` pair as used by template lines and `--source`.
pub fn parse_source_pair(text: &str) -> Result<(String, String)> {
    match text.split_once('=') {
        Some((name, value)) if !name.trim().is_empty() && !value.trim().is_empty() => {
            Ok((name.trim().to_string(), value.trim().to_string()))
        }
        _ => Err(crate::gtmerge_error!(
            "Expected 'assay=path', found '{}'",
            text
        )),
    }
}

/// Reads a template file of `assay=path-pattern` lines. Blank lines and lines
/// starting with `#` are ignored.
pub fn read_template(path: &Path, vcf_prefix: &str, chromosome: &str) -> Result<Vec<SourceEntry>> {
    let reader = open_catalog_reader(path)?;
    let mut entries = Vec::new();
    for (line_number, line) in reader.lines().enumerate() {
        let line = line
            .map_err(|e| crate::gtmerge_error!("Error at template line {}: {}", line_number + 1, e))?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let (name, pattern) = parse_source_pair(trimmed)
            .map_err(|e| crate::gtmerge_error!("Error at template line {}: {}", line_number + 1, e))?;
        entries.push(SourceEntry {
            name,
            path: expand_path_pattern(&pattern, vcf_prefix, chromosome),
        });
    }

    if entries.is_empty() {
        return Err(crate::gtmerge_error!(
            "No assay entries found in template {}",
            path.display()
        ));
    }
    ensure_unique_names(&entries)?;
    Ok(entries)
}

pub fn sources_from_pairs(pairs: &[String]) -> Result<Vec<SourceEntry>> {
    let entries = pairs
        .iter()
        .map(|pair| {
            parse_source_pair(pair).map(|(name, path)| SourceEntry { name, path })
        })
        .collect::<Result<Vec<_>>>()?;
    ensure_unique_names(&entries)?;
    Ok(entries)
}

fn ensure_unique_names(entries: &[SourceEntry]) -> Result<()> {
    let mut seen = HashSet::new();
    for entry in entries {
        if !seen.insert(entry.name.as_str()) {
            return Err(GtMergeError::DuplicateSource {
                name: entry.name.clone(),
            });
        }
    }
    Ok(())
}
