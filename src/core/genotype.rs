use crate::constants::{GENOTYPE_CALLS, MISSING_GENOTYPE, NO_DATA};

/// Highest genotype posterior found in a sample field's GP sub-field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MaxProbability {
    pub probability: f64,
    /// Index into [`GENOTYPE_CALLS`]; `None` when no posterior exceeds 0 or
    /// the GP sub-field is absent.
    pub index: Option<usize>,
}

impl MaxProbability {
    const NONE: Self = Self {
        probability: 0.0,
        index: None,
    };
}

/// A sample field after thresholded calling.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedGenotype {
    pub field: String,
    pub probability: f64,
}

impl ResolvedGenotype {
    /// The GT sub-field of the resolved field.
    pub fn call(&self) -> &str {
        genotype_call(&self.field)
    }

    pub fn is_missing(&self) -> bool {
        self.call() == MISSING_GENOTYPE
    }
}

pub fn is_no_data(field: &str) -> bool {
    field == NO_DATA
}

pub fn genotype_call(field: &str) -> &str {
    field.split(':').next().unwrap_or(field)
}

/// Finds the largest of the first three posteriors (0/0, 0/1, 1/1) in the
/// sub-field at `prob_index`. Ties keep the earliest index. Unparsable values
/// count as 0.
pub fn max_probability(field: &str, prob_index: Option<usize>) -> MaxProbability {
    let Some(prob_field) = prob_index.and_then(|idx| field.split(':').nth(idx)) else {
        return MaxProbability::NONE;
    };

    let mut best = MaxProbability::NONE;
    for (index, value) in prob_field.split(',').take(GENOTYPE_CALLS.len()).enumerate() {
        let probability = match value.trim().parse::<f64>() {
            Ok(p) if !p.is_nan() => p,
            Ok(_) | Err(_) => {
                log::trace!("Unparsable genotype posterior '{value}' in '{field}'");
                0.0
            }
        };
        if probability > best.probability {
            best = MaxProbability {
                probability,
                index: Some(index),
            };
        }
    }
    best
}

/// Replaces the GT sub-field with the call implied by the posteriors, or with
/// `./.` when the best posterior is below `threshold`. Remaining sub-fields are
/// kept as they are.
pub fn call_genotype(field: &str, threshold: f64, prob_index: Option<usize>) -> ResolvedGenotype {
    let max = max_probability(field, prob_index);
    let call = match max.index {
        Some(index) if max.probability >= threshold => GENOTYPE_CALLS[index],
        _ => MISSING_GENOTYPE,
    };

    let rest = field.find(':').map_or("", |idx| &field[idx..]);
    let mut resolved = String::with_capacity(call.len() + rest.len());
    resolved.push_str(call);
    resolved.push_str(rest);

    ResolvedGenotype {
        field: resolved,
        probability: max.probability,
    }
}
