//! Simulation parameters and distribution selection.

use crate::error::{Result, SimError};
use crate::noise::NoiseConfig;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Count-generating distribution used by [`crate::simulate::simulate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CountModel {
    #[serde(rename = "pln", alias = "Poisson Log-Normal")]
    PoissonLogNormal,
    #[serde(rename = "nb", alias = "Negative Binomial")]
    NegativeBinomial,
    #[serde(rename = "dm", alias = "Dirichlet Multinomial")]
    DirichletMultinomial,
    #[serde(rename = "m", alias = "Multinomial")]
    Multinomial,
}

impl CountModel {
    /// Every accepted (name, alias) pair, matched case-sensitively.
    pub const NAMES: [(&'static str, &'static str, CountModel); 4] = [
        ("Poisson Log-Normal", "pln", CountModel::PoissonLogNormal),
        ("Negative Binomial", "nb", CountModel::NegativeBinomial),
        ("Dirichlet Multinomial", "dm", CountModel::DirichletMultinomial),
        ("Multinomial", "m", CountModel::Multinomial),
    ];

    /// Full display name.
    pub fn name(&self) -> &'static str {
        match self {
            CountModel::PoissonLogNormal => "Poisson Log-Normal",
            CountModel::NegativeBinomial => "Negative Binomial",
            CountModel::DirichletMultinomial => "Dirichlet Multinomial",
            CountModel::Multinomial => "Multinomial",
        }
    }

    /// Short alias.
    pub fn alias(&self) -> &'static str {
        match self {
            CountModel::PoissonLogNormal => "pln",
            CountModel::NegativeBinomial => "nb",
            CountModel::DirichletMultinomial => "dm",
            CountModel::Multinomial => "m",
        }
    }

    fn allowed() -> String {
        Self::NAMES
            .iter()
            .flat_map(|(name, alias, _)| [*name, *alias])
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl Default for CountModel {
    fn default() -> Self {
        CountModel::PoissonLogNormal
    }
}

impl FromStr for CountModel {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self> {
        Self::NAMES
            .iter()
            .find(|(name, alias, _)| s == *name || s == *alias)
            .map(|(_, _, model)| *model)
            .ok_or_else(|| SimError::UnknownDistribution {
                name: s.to_string(),
                allowed: Self::allowed(),
            })
    }
}

impl fmt::Display for CountModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Parameters for a table-to-table simulation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Distribution to resample counts from.
    pub distribution: CountModel,
    /// Over-dispersion parameter (Poisson Log-Normal and Negative Binomial).
    pub kappa: f64,
    /// Pseudocount for the ALR transform and the Dirichlet path.
    pub pseudocount: f64,
    /// Perturb the composition before resampling.
    pub impose_noise: bool,
    /// Noise parameters, used only when `impose_noise` is set.
    pub noise: NoiseConfig,
    /// Seed for [`crate::simulate::simulate_seeded`]; entropy when absent.
    pub seed: Option<u64>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            distribution: CountModel::PoissonLogNormal,
            kappa: 1.0,
            pseudocount: 1.0,
            impose_noise: false,
            noise: NoiseConfig::default(),
            seed: None,
        }
    }
}

impl SimulationConfig {
    /// Default parameters with the given distribution.
    pub fn new(distribution: CountModel) -> Self {
        Self {
            distribution,
            ..Default::default()
        }
    }

    /// Set the over-dispersion parameter.
    pub fn with_kappa(mut self, kappa: f64) -> Self {
        self.kappa = kappa;
        self
    }

    /// Set the pseudocount.
    pub fn with_pseudocount(mut self, pseudocount: f64) -> Self {
        self.pseudocount = pseudocount;
        self
    }

    /// Enable noise injection with the given parameters.
    pub fn with_noise(mut self, noise: NoiseConfig) -> Self {
        self.impose_noise = true;
        self.noise = noise;
        self
    }

    /// Set random seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Load from YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).map_err(SimError::from)
    }

    /// Save to YAML string.
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).map_err(SimError::from)
    }

    /// Load from a YAML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// A commented example configuration.
    pub fn example_yaml() -> Result<String> {
        let mut yaml = String::from(
            "# countsim simulation configuration\n\
             # distribution: pln, nb, dm or m\n",
        );
        let example = Self::new(CountModel::NegativeBinomial)
            .with_kappa(2.0)
            .with_noise(NoiseConfig::default())
            .with_seed(42);
        yaml.push_str(&example.to_yaml()?);
        Ok(yaml)
    }
}
