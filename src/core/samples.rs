use crate::{error::GtMergeError, utils::util::Result};
use std::collections::{BTreeSet, HashMap};

/// Sample columns of one source, in header order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceSamples {
    pub name_to_column: HashMap<String, usize>,
    pub column_to_name: Vec<String>,
}

impl SourceSamples {
    pub fn from_header(source_name: &str, header: &[String]) -> Result<Self> {
        let mut name_to_column = HashMap::with_capacity(header.len());
        for (column, sample) in header.iter().enumerate() {
            if name_to_column.insert(sample.clone(), column).is_some() {
                return Err(GtMergeError::DuplicateSample {
                    source_name: source_name.to_string(),
                    sample: sample.clone(),
                });
            }
        }
        Ok(Self {
            name_to_column,
            column_to_name: header.to_vec(),
        })
    }
}

/// Builds the per-source name/column maps for every source header.
pub fn name_position_maps<'a, I>(headers: I) -> Result<HashMap<String, SourceSamples>>
where
    I: IntoIterator<Item = (&'a str, &'a [String])>,
{
    let mut maps = HashMap::new();
    for (source_name, header) in headers {
        let samples = SourceSamples::from_header(source_name, header)?;
        if maps.insert(source_name.to_string(), samples).is_some() {
            return Err(GtMergeError::DuplicateSource {
                name: source_name.to_string(),
            });
        }
    }
    Ok(maps)
}

/// Output column assignment for the union of all sources' samples. Columns
/// follow the lexicographic order of sample names, so the map depends only on
/// the set of names and not on the order sources are visited.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GlobalSampleMap {
    names: Vec<String>,
    columns: HashMap<String, usize>,
}

impl GlobalSampleMap {
    pub fn from_sources<'a, I>(sources: I) -> Self
    where
        I: IntoIterator<Item = &'a SourceSamples>,
    {
        let distinct: BTreeSet<&str> = sources
            .into_iter()
            .flat_map(|source| source.column_to_name.iter().map(String::as_str))
            .collect();

        let names: Vec<String> = distinct.into_iter().map(str::to_string).collect();
        let columns = names
            .iter()
            .enumerate()
            .map(|(column, name)| (name.clone(), column))
            .collect();
        Self { names, columns }
    }

    pub fn column(&self, sample: &str) -> Option<usize> {
        self.columns.get(sample).copied()
    }

    pub fn name(&self, column: usize) -> Option<&str> {
        self.names.get(column).map(String::as_str)
    }

    /// Sample names in output column order.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Maps each column of `source` to its output column.
    pub fn local_to_global(&self, source_name: &str, source: &SourceSamples) -> Result<Vec<usize>> {
        source
            .column_to_name
            .iter()
            .enumerate()
            .map(|(local, sample)| {
                self.column(sample).ok_or_else(|| {
                    crate::gtmerge_error!(
                        "Missing output column for source {} sample {} ({})",
                        source_name,
                        local,
                        sample
                    )
                })
            })
            .collect()
    }
}
