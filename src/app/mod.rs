//! This module governs the high-level implementation of the simulation
mod configuration;
mod telemetry;

pub(crate) use configuration::Configuration;

use crate::field::Field;
use crate::hamiltonian::{BlockTridiagonal, HamiltonianBuilder};
use crate::spectral::{EnergySpaceBuilder, EnergySweep, SweepResult};
use clap::{ArgEnum, Parser};
use itertools::Itertools;
use nalgebra::Vector3;
use std::io::Write;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[clap(author, version, about, long_about = None)]
struct App {
    /// A structure file overriding the default configuration
    file_path: Option<PathBuf>,
    #[clap(arg_enum, short, long, default_value = "info")]
    log_level: LogLevel,
    /// Directory the spectra, densities and log are written to
    #[clap(short, long, default_value = "results")]
    output: PathBuf,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, ArgEnum)]
enum LogLevel {
    Trace,
    Info,
    Debug,
    Error,
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let level = match self {
            LogLevel::Trace => "trace",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Error => "error",
        };
        write!(f, "{}", level)
    }
}

/// Parses the command line, runs an energy sweep over the configured chain and writes the results
pub fn run() -> color_eyre::Result<()> {
    let cli = App::parse();

    std::fs::create_dir_all(&cli.output)?;
    let (subscriber, _guard) = telemetry::get_subscriber(cli.log_level, &cli.output);
    telemetry::init_subscriber(subscriber)?;

    let config = Configuration::build(cli.file_path.as_deref())?;
    tracing::info!("Loaded configuration: {:?}", config);

    let hamiltonian = build_hamiltonian(&config)?;
    let energy_space = EnergySpaceBuilder::new()
        .with_energy_range(config.spectral.minimum_energy..=config.spectral.maximum_energy)
        .with_number_of_points(config.spectral.number_of_points)
        .with_integration_rule(config.spectral.integration_rule)
        .build()?;

    let result = EnergySweep::new(
        &hamiltonian,
        &energy_space,
        &config.occupation,
        config.spectral.broadening,
    )
    .run()?;

    write_results(&result, &cli.output)?;
    let term = console::Term::stdout();
    term.write_line(&format!(
        "Wrote {} spectral points to {}",
        result.points.len(),
        console::style(cli.output.display()).bold()
    ))?;
    Ok(())
}

fn build_hamiltonian(config: &Configuration) -> color_eyre::Result<BlockTridiagonal> {
    let builder = HamiltonianBuilder::new().with_chain(&config.chain);
    Ok(match &config.field {
        Some(field_config) => {
            let mut field = Field::from_cube(&field_config.path)?.with_scale(field_config.scale);
            field.set_origin(Vector3::from(field_config.origin));
            builder.with_potential(&field).build()?
        }
        None => builder.build()?,
    })
}

/// Writes the per-slice spectra as `energy ldos_0 ldos_1 ...` rows and the integrated densities
/// as `slice electrons holes` rows
fn write_results(result: &SweepResult, directory: &Path) -> color_eyre::Result<()> {
    let mut spectrum = std::fs::File::create(directory.join("spectrum.dat"))?;
    for point in &result.points {
        writeln!(
            spectrum,
            "{}\t{}",
            point.energy,
            point.observables.local_density_of_states.iter().join("\t")
        )?;
    }

    let mut density = std::fs::File::create(directory.join("density.dat"))?;
    for (slice, (electrons, holes)) in result
        .electron_density
        .iter()
        .zip(result.hole_density.iter())
        .enumerate()
    {
        writeln!(density, "{}\t{}\t{}", slice, electrons, holes)?;
    }
    Ok(())
}
