//! `qlm`: gauge-invariant basis enumeration and Hamiltonian assembly for
//! U(1) quantum link models.

use std::io::BufWriter;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use qlm_quantum::{io, ChargeSector, LinkStatistics};
use tracing::info;

mod config;
mod pipeline;

use config::{RunConfig, StrategyChoice};

#[derive(Parser)]
#[command(name = "qlm")]
#[command(about = "U(1) quantum link model: basis enumeration and Hamiltonian assembly", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full pipeline from a TOML configuration
    Run {
        /// Configuration file
        #[arg(short, long)]
        config: PathBuf,

        /// Override the lattice extents, e.g. 4,4
        #[arg(long, value_delimiter = ',')]
        extents: Option<Vec<usize>>,

        /// Override the link statistics
        #[arg(long)]
        statistics: Option<StatisticsArg>,
    },

    /// Assemble and diagonalize on a basis read back from a spin stream
    Assemble {
        /// Lattice extents the stream was written for, e.g. 4,4
        #[arg(long, value_delimiter = ',', required = true)]
        extents: Vec<usize>,

        /// Spin stream (SPINSTATES) written by an earlier run
        #[arg(long)]
        spin: PathBuf,

        /// Flux stream (FLUXSTATES) to check against the loaded basis
        #[arg(long)]
        flux: Option<PathBuf>,

        #[arg(long, default_value = "neutral")]
        sector: SectorArg,

        #[arg(long, default_value = "bosonic")]
        statistics: StatisticsArg,

        /// Plaquette coupling J
        #[arg(long, default_value_t = 1.0)]
        coupling: f64,

        /// Potential term coefficient
        #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
        lambda: f64,

        /// Keep only the n lowest eigenvalues
        #[arg(long)]
        n_lowest: Option<usize>,

        /// Skip diagonalization
        #[arg(long)]
        no_diagonalize: bool,
    },

    /// Enumerate the basis only and report its size
    Enumerate {
        /// Lattice extents, e.g. 4,4 or 2,2,2
        #[arg(long, value_delimiter = ',', required = true)]
        extents: Vec<usize>,

        #[arg(long, default_value = "neutral")]
        sector: SectorArg,

        #[arg(long, default_value = "auto")]
        strategy: StrategyChoice,

        /// Keep only one winding sector, e.g. 0,0
        #[arg(long, value_delimiter = ',', allow_hyphen_values = true)]
        winding: Option<Vec<i32>>,

        /// Drop states without a flippable plaquette
        #[arg(long)]
        drop_frozen: bool,

        /// Shard the scan over the thread pool
        #[arg(long)]
        parallel: bool,

        /// Write the basis here, one state per line
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum SectorArg {
    Neutral,
    Bounded,
}

impl From<SectorArg> for ChargeSector {
    fn from(arg: SectorArg) -> Self {
        match arg {
            SectorArg::Neutral => ChargeSector::Neutral,
            SectorArg::Bounded => ChargeSector::Bounded,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum StatisticsArg {
    Bosonic,
    Fermionic,
}

impl From<StatisticsArg> for LinkStatistics {
    fn from(arg: StatisticsArg) -> Self {
        match arg {
            StatisticsArg::Bosonic => LinkStatistics::Bosonic,
            StatisticsArg::Fermionic => LinkStatistics::Fermionic,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Run {
            config,
            extents,
            statistics,
        } => {
            let mut run_config = RunConfig::load(&config)?;
            if let Some(extents) = extents {
                run_config.lattice.extents = extents;
            }
            if let Some(statistics) = statistics {
                run_config.hamiltonian.statistics = statistics.into();
            }
            run_config.validate()?;

            let summary = pipeline::run(&run_config)?;
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }

        Commands::Assemble {
            extents,
            spin,
            flux,
            sector,
            statistics,
            coupling,
            lambda,
            n_lowest,
            no_diagonalize,
        } => {
            let mut run_config = RunConfig::for_extents(extents);
            run_config.basis.sector = sector.into();
            run_config.hamiltonian.statistics = statistics.into();
            run_config.hamiltonian.coupling = coupling;
            run_config.hamiltonian.lambda = lambda;
            run_config.output.n_lowest = n_lowest;
            run_config.output.diagonalize = !no_diagonalize;
            run_config.validate()?;

            let summary = pipeline::assemble(&run_config, &spin, flux.as_deref())?;
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }

        Commands::Enumerate {
            extents,
            sector,
            strategy,
            winding,
            drop_frozen,
            parallel,
            out,
        } => {
            let mut run_config = RunConfig::for_extents(extents);
            run_config.basis.sector = sector.into();
            run_config.basis.strategy = strategy;
            run_config.basis.winding = winding;
            run_config.basis.keep_frozen = !drop_frozen;
            run_config.basis.parallel = parallel;
            run_config.validate()?;

            let (_, enumeration) = pipeline::enumerate_basis(&run_config)?;
            if let Some(path) = &out {
                let file = pipeline::create(path)?;
                io::write_basis(BufWriter::new(file), enumeration.basis.iter())
                    .with_context(|| format!("failed to write {}", path.display()))?;
                info!(path = %path.display(), "basis written");
            }
            println!("{}", enumeration.basis.len());
        }
    }

    Ok(())
}
