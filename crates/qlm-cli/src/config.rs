//! Run configuration.
//!
//! ```toml
//! [lattice]
//! extents = [4, 4]
//!
//! [basis]
//! sector = "neutral"
//! strategy = "auto"
//! winding = [0, 0]
//! keep_frozen = true
//!
//! [hamiltonian]
//! statistics = "fermionic"
//! coupling = 1.0
//! lambda = 0.0
//!
//! [output]
//! basis = "basis.txt"
//! spectrum = "spectrum.json"
//! n_lowest = 10
//! ```
//!
//! Every section except `[lattice]` is optional.

use std::fs;
use std::path::{Path, PathBuf};

use clap::ValueEnum;
use qlm_lattice::Lattice;
use qlm_quantum::{ChargeSector, EnumerationOptions, HamiltonianParams, Strategy, WindingFilter};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid TOML in {}: {source}", .path.display())]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Enumeration strategy as written in a config file or on the command line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum StrategyChoice {
    #[default]
    Auto,
    Checkerboard,
    SpanningTree,
    BruteForce,
}

impl StrategyChoice {
    pub fn strategy(self) -> Option<Strategy> {
        match self {
            StrategyChoice::Auto => None,
            StrategyChoice::Checkerboard => Some(Strategy::Checkerboard),
            StrategyChoice::SpanningTree => Some(Strategy::SpanningTree),
            StrategyChoice::BruteForce => Some(Strategy::BruteForce),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RunConfig {
    pub lattice: LatticeSection,
    #[serde(default)]
    pub basis: BasisSection,
    #[serde(default)]
    pub hamiltonian: HamiltonianParams,
    #[serde(default)]
    pub output: OutputSection,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LatticeSection {
    /// `[Lx, Ly]` or `[Lx, Ly, Lz]`.
    pub extents: Vec<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BasisSection {
    pub sector: ChargeSector,
    pub strategy: StrategyChoice,
    pub winding: Option<Vec<i32>>,
    pub keep_frozen: bool,
    pub parallel: bool,
}

impl Default for BasisSection {
    fn default() -> Self {
        Self {
            sector: ChargeSector::Neutral,
            strategy: StrategyChoice::Auto,
            winding: None,
            keep_frozen: true,
            parallel: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputSection {
    pub basis: Option<PathBuf>,
    pub spin: Option<PathBuf>,
    pub flux: Option<PathBuf>,
    pub spectrum: Option<PathBuf>,
    pub n_lowest: Option<usize>,
    pub diagonalize: bool,
}

impl Default for OutputSection {
    fn default() -> Self {
        Self {
            basis: None,
            spin: None,
            flux: None,
            spectrum: None,
            n_lowest: None,
            diagonalize: true,
        }
    }
}

impl RunConfig {
    /// Configuration for a lattice with every other setting at its default.
    pub fn for_extents(extents: Vec<usize>) -> Self {
        Self {
            lattice: LatticeSection { extents },
            basis: BasisSection::default(),
            hamiltonian: HamiltonianParams::default(),
            output: OutputSection::default(),
        }
    }

    /// Parse a run file. Values are checked by [`RunConfig::validate`], which
    /// the caller runs once command-line overrides are applied.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Toml {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        Lattice::new(&self.lattice.extents).map_err(|e| ConfigError::Invalid {
            field: "lattice.extents",
            reason: e.to_string(),
        })?;

        if let Some(w) = &self.basis.winding {
            if w.len() != self.lattice.extents.len() {
                return Err(ConfigError::Invalid {
                    field: "basis.winding",
                    reason: format!(
                        "{} entries for a {}D lattice",
                        w.len(),
                        self.lattice.extents.len()
                    ),
                });
            }
        }

        for (field, value) in [
            ("hamiltonian.coupling", self.hamiltonian.coupling),
            ("hamiltonian.lambda", self.hamiltonian.lambda),
        ] {
            if !value.is_finite() {
                return Err(ConfigError::Invalid {
                    field,
                    reason: format!("{value} is not finite"),
                });
            }
        }

        if self.output.n_lowest == Some(0) {
            return Err(ConfigError::Invalid {
                field: "output.n_lowest",
                reason: "must be at least 1".into(),
            });
        }
        Ok(())
    }

    pub fn enumeration_options(&self) -> EnumerationOptions {
        EnumerationOptions {
            strategy: self.basis.strategy.strategy(),
            sector: self.basis.sector,
            winding: self.basis.winding.clone().map(WindingFilter::new),
            keep_frozen: self.basis.keep_frozen,
            parallel: self.basis.parallel,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qlm_quantum::LinkStatistics;
    use std::io::Write;

    #[test]
    fn test_minimal_config_defaults() {
        let config: RunConfig = toml::from_str("[lattice]\nextents = [4, 4]\n").unwrap();
        assert_eq!(config, RunConfig::for_extents(vec![4, 4]));
        assert!(config.output.diagonalize);
        assert_eq!(config.enumeration_options(), EnumerationOptions::default());
    }

    #[test]
    fn test_full_config() {
        let text = r#"
            [lattice]
            extents = [2, 2, 2]

            [basis]
            sector = "neutral"
            strategy = "spanning-tree"
            winding = [0, 0, 0]
            keep_frozen = false

            [hamiltonian]
            statistics = "fermionic"
            lambda = 0.5

            [output]
            flux = "FLUXSTATES"
            n_lowest = 4
            diagonalize = false
        "#;
        let config: RunConfig = toml::from_str(text).unwrap();
        config.validate().unwrap();

        let opts = config.enumeration_options();
        assert_eq!(opts.strategy, Some(Strategy::SpanningTree));
        assert_eq!(opts.winding, Some(WindingFilter::new(vec![0, 0, 0])));
        assert!(!opts.keep_frozen);
        assert_eq!(config.hamiltonian.statistics, LinkStatistics::Fermionic);
        assert_eq!(config.hamiltonian.coupling, 1.0);
        assert_eq!(config.hamiltonian.lambda, 0.5);
        assert_eq!(config.output.flux, Some(PathBuf::from("FLUXSTATES")));
        assert!(!config.output.diagonalize);
    }

    #[test]
    fn test_unknown_field_rejected() {
        let text = "[lattice]\nextents = [4, 4]\n[basis]\nsectr = \"bounded\"\n";
        assert!(toml::from_str::<RunConfig>(text).is_err());
    }

    #[test]
    fn test_unknown_hamiltonian_field_rejected() {
        let text = "[lattice]\nextents = [4, 4]\n[hamiltonian]\nstatistcs = \"fermionic\"\n";
        assert!(toml::from_str::<RunConfig>(text).is_err());

        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{text}").unwrap();
        assert!(matches!(RunConfig::load(file.path()), Err(ConfigError::Toml { .. })));
    }

    #[test]
    fn test_validation() {
        let mut config = RunConfig::for_extents(vec![4]);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid { field: "lattice.extents", .. })
        ));

        config.lattice.extents = vec![4, 4];
        config.basis.winding = Some(vec![0, 0, 0]);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid { field: "basis.winding", .. })
        ));

        config.basis.winding = None;
        config.hamiltonian.coupling = f64::NAN;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid { field: "hamiltonian.coupling", .. })
        ));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[lattice]\nextents = [2, 4]\n[basis]\nsector = \"bounded\"").unwrap();
        let config = RunConfig::load(file.path()).unwrap();
        assert_eq!(config.lattice.extents, vec![2, 4]);
        assert_eq!(config.basis.sector, ChargeSector::Bounded);

        let missing = RunConfig::load(Path::new("/nonexistent/qlm.toml"));
        assert!(matches!(missing, Err(ConfigError::Read { .. })));

        // Out-of-range values load, and an override can fix them before validation.
        let mut fixable = tempfile::NamedTempFile::new().unwrap();
        writeln!(fixable, "[lattice]\nextents = [4]").unwrap();
        let mut config = RunConfig::load(fixable.path()).unwrap();
        assert!(config.validate().is_err());
        config.lattice.extents = vec![4, 4];
        config.validate().unwrap();

        let mut bad = tempfile::NamedTempFile::new().unwrap();
        writeln!(bad, "[lattice\nextents = ").unwrap();
        assert!(matches!(RunConfig::load(bad.path()), Err(ConfigError::Toml { .. })));
    }
}
