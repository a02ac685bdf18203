use crate::hamiltonian::ChainParameters;
use crate::spectral::{IntegrationRule, OccupationParameters};
use color_eyre::eyre::eyre;
use config::{Config, Environment, File};
use serde::Deserialize;
use std::env;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize)]
pub(crate) struct Configuration {
    pub(crate) chain: ChainParameters,
    pub(crate) spectral: SpectralConfiguration,
    pub(crate) occupation: OccupationParameters,
    #[serde(default)]
    pub(crate) field: Option<FieldConfiguration>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SpectralConfiguration {
    pub(crate) minimum_energy: f64,
    pub(crate) maximum_energy: f64,
    pub(crate) number_of_points: usize,
    /// Imaginary part added to every energy, in eV
    pub(crate) broadening: f64,
    pub(crate) integration_rule: IntegrationRule,
}

#[derive(Debug, Deserialize)]
pub(crate) struct FieldConfiguration {
    /// Path to a Gaussian cube file
    pub(crate) path: PathBuf,
    #[serde(default = "unit_scale")]
    pub(crate) scale: f64,
    /// Where the field origin sits in the device frame, in Ångström
    #[serde(default)]
    pub(crate) origin: [f64; 3],
}

fn unit_scale() -> f64 {
    1_f64
}

impl Configuration {
    pub(crate) fn build(structure: Option<&Path>) -> color_eyre::Result<Self> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let mut builder = Config::builder()
            // The default settings for the simulation which we use in the general case
            .add_source(File::with_name(".config/default"))
            // The override settings which may be set by the user, optional
            .add_source(File::with_name(&format!(".config/{}", run_mode)).required(false));
        if let Some(path) = structure {
            builder = builder.add_source(File::from(path));
        }
        let s = builder
            .add_source(Environment::with_prefix("TRANSPORTER").separator("__"))
            .build()?;

        s.try_deserialize()
            .map_err(|e| eyre!(format!("Failed to deserialize the config file: {:?}", e)))
    }
}
