use std::{convert::Infallible, fmt, str::FromStr};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AssayType {
    Affy,
    Illumina,
    Affy1KG,
    Illumina1KG,
    Broad,
    Metabo,
    Exome,
    Other(String),
}

impl AssayType {
    pub fn from_name(name: &str) -> Self {
        match name {
            "affy" => AssayType::Affy,
            "illumina" => AssayType::Illumina,
            "affy1KG" => AssayType::Affy1KG,
            "illumina1KG" => AssayType::Illumina1KG,
            "broad" => AssayType::Broad,
            "metabo" => AssayType::Metabo,
            "exome" => AssayType::Exome,
            other => AssayType::Other(other.to_string()),
        }
    }

    /// Short tag appended to each genotype contributed by this assay.
    pub fn abbreviation(&self) -> Option<&'static str> {
        match self {
            AssayType::Affy => Some("A"),
            AssayType::Illumina => Some("I"),
            AssayType::Affy1KG => Some("A1"),
            AssayType::Illumina1KG => Some("I1"),
            AssayType::Broad => Some("B"),
            AssayType::Metabo => Some("M"),
            AssayType::Exome => Some("E"),
            AssayType::Other(_) => None,
        }
    }

    /// Appends `:<abbreviation>` to a raw sample field; unknown assays leave
    /// the field untouched.
    pub fn tag_genotype(&self, field: &str) -> String {
        match self.abbreviation() {
            Some(abbreviation) => format!("{field}:{abbreviation}"),
            None => field.to_string(),
        }
    }
}

impl FromStr for AssayType {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from_name(s))
    }
}

impl fmt::Display for AssayType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssayType::Affy => write!(f, "affy"),
            AssayType::Illumina => write!(f, "illumina"),
            AssayType::Affy1KG => write!(f, "affy1KG"),
            AssayType::Illumina1KG => write!(f, "illumina1KG"),
            AssayType::Broad => write!(f, "broad"),
            AssayType::Metabo => write!(f, "metabo"),
            AssayType::Exome => write!(f, "exome"),
            AssayType::Other(name) => write!(f, "{name}"),
        }
    }
}
