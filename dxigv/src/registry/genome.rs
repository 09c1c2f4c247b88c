//! Reference genome identifiers understood by IGV.

use std::fmt;
use std::str::FromStr;

use super::RegistryError;

/// A reference genome, named as IGV names it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ReferenceGenome {
    /// b37 / hs37d5, which IGV calls `1kg_v37`.
    #[default]
    Kg1V37,
    /// Mouse GRCm38.
    Mm10,
    /// UCSC hg19.
    Hg19,
}

impl ReferenceGenome {
    /// All supported genomes.
    pub const ALL: [ReferenceGenome; 3] = [Self::Kg1V37, Self::Mm10, Self::Hg19];

    /// IGV genome id, substituted for `$$` in the registry URL.
    pub fn id(self) -> &'static str {
        match self {
            Self::Kg1V37 => "1kg_v37",
            Self::Mm10 => "mm10",
            Self::Hg19 => "hg19",
        }
    }

    /// Other genome ids that should resolve to this genome's registry.
    pub fn aliases(self) -> &'static [&'static str] {
        match self {
            Self::Kg1V37 => &["hg19", "b37"],
            _ => &[],
        }
    }
}

impl fmt::Display for ReferenceGenome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for ReferenceGenome {
    type Err = RegistryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|g| g.id() == s)
            .ok_or_else(|| RegistryError::UnsupportedGenome(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_roundtrip() {
        for genome in ReferenceGenome::ALL {
            assert_eq!(genome.id().parse::<ReferenceGenome>().unwrap(), genome);
        }
    }

    #[test]
    fn test_parse_rejects_unknown() {
        assert!(matches!(
            "GRCh38".parse::<ReferenceGenome>(),
            Err(RegistryError::UnsupportedGenome(_))
        ));
    }

    #[test]
    fn test_only_1kg_v37_has_aliases() {
        assert_eq!(ReferenceGenome::Kg1V37.aliases(), &["hg19", "b37"]);
        assert!(ReferenceGenome::Hg19.aliases().is_empty());
        assert!(ReferenceGenome::Mm10.aliases().is_empty());
    }
}
