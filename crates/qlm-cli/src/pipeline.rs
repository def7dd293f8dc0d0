//! Configuration → basis → Hamiltonian → spectrum, with optional files.

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use anyhow::{bail, Context, Result};
use qlm_lattice::LatticeContext;
use qlm_quantum::{
    build_hamiltonian, diagonalize_sparse, enumerate, gauss_law, io, Basis, ChargeSector,
    Enumeration, EnumerationStats, LinkStatistics, Strategy,
};
use serde::Serialize;
use tracing::info;

use crate::config::RunConfig;

#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub extents: Vec<usize>,
    /// `None` when the basis was read from a spin stream.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strategy: Option<Strategy>,
    pub sector: ChargeSector,
    pub basis_size: usize,
    pub frozen_states: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enumeration: Option<EnumerationStats>,
    pub statistics: LinkStatistics,
    pub nnz: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spectrum: Option<SpectrumSummary>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SpectrumSummary {
    pub ground_energy: Option<f64>,
    pub gap: f64,
    pub energies: Vec<f64>,
}

/// Build the lattice tables and enumerate the basis.
pub fn enumerate_basis(config: &RunConfig) -> Result<(LatticeContext, Enumeration)> {
    let ctx = LatticeContext::from_extents(&config.lattice.extents)
        .context("failed to build lattice")?;
    let enumeration =
        enumerate(&ctx, &config.enumeration_options()).context("basis enumeration failed")?;
    Ok((ctx, enumeration))
}

pub fn run(config: &RunConfig) -> Result<RunSummary> {
    let (ctx, enumeration) = enumerate_basis(config)?;
    let strategy = enumeration.strategy;
    let stats = enumeration.stats;
    let basis = enumeration.freeze(&ctx).context("failed to index basis")?;

    write_outputs(config, &ctx, &basis)?;

    let mut summary = solve(config, &ctx, &basis)?;
    summary.strategy = Some(strategy);
    summary.enumeration = Some(stats);
    Ok(summary)
}

/// Assemble from a spin stream written by an earlier run, optionally
/// checking its flux stream on the way.
///
/// Every loaded state must satisfy Gauss law in the configured sector.
pub fn assemble(config: &RunConfig, spin: &Path, flux: Option<&Path>) -> Result<RunSummary> {
    let ctx = LatticeContext::from_extents(&config.lattice.extents)
        .context("failed to build lattice")?;

    let store = io::read_spin_states(BufReader::new(open(spin)?), ctx.n_links())
        .with_context(|| format!("failed to read {}", spin.display()))?;
    if let Some(i) = store
        .iter()
        .position(|s| !gauss_law::check_gauss_law(&ctx.lattice, s, config.basis.sector))
    {
        bail!(
            "state {i} of {} violates Gauss law in the {:?} sector",
            spin.display(),
            config.basis.sector
        );
    }
    let basis = store.freeze(&ctx).context("failed to index basis")?;

    if let Some(path) = flux {
        let rows = io::read_flux_states(BufReader::new(open(path)?), ctx.n_plaquettes())
            .with_context(|| format!("failed to read {}", path.display()))?;
        io::check_flux_states(&ctx, &basis, &rows)
            .with_context(|| format!("{} does not match {}", path.display(), spin.display()))?;
    }
    info!(path = %spin.display(), states = basis.dim(), "basis loaded");

    solve(config, &ctx, &basis)
}

/// Assembly and optional diagonalization on a frozen basis.
fn solve(config: &RunConfig, ctx: &LatticeContext, basis: &Basis) -> Result<RunSummary> {
    let h = build_hamiltonian(ctx, basis, &config.hamiltonian)
        .context("Hamiltonian assembly failed")?;

    let spectrum = if config.output.diagonalize && basis.dim() > 0 {
        let eig =
            diagonalize_sparse(&h, config.output.n_lowest).context("diagonalization failed")?;
        if let Some(e0) = eig.ground_energy() {
            info!(ground_energy = e0, gap = eig.gap(), "diagonalized");
        }
        if let Some(path) = &config.output.spectrum {
            let file = create(path)?;
            serde_json::to_writer_pretty(BufWriter::new(file), &eig)
                .with_context(|| format!("failed to write {}", path.display()))?;
        }
        Some(SpectrumSummary {
            ground_energy: eig.ground_energy(),
            gap: eig.gap(),
            energies: eig.energies,
        })
    } else {
        None
    };

    Ok(RunSummary {
        extents: config.lattice.extents.clone(),
        strategy: None,
        sector: config.basis.sector,
        basis_size: basis.dim(),
        frozen_states: basis.frozen_count(),
        enumeration: None,
        statistics: config.hamiltonian.statistics,
        nnz: h.nnz(),
        spectrum,
    })
}

fn write_outputs(config: &RunConfig, ctx: &LatticeContext, basis: &Basis) -> Result<()> {
    let out = &config.output;
    if let Some(path) = &out.basis {
        io::write_basis(BufWriter::new(create(path)?), basis.states())
            .with_context(|| format!("failed to write {}", path.display()))?;
        info!(path = %path.display(), "basis written");
    }
    if let Some(path) = &out.spin {
        io::write_spin_states(BufWriter::new(create(path)?), basis.states())
            .with_context(|| format!("failed to write {}", path.display()))?;
    }
    if let Some(path) = &out.flux {
        io::write_flux_states(BufWriter::new(create(path)?), ctx, basis.states())
            .with_context(|| format!("failed to write {}", path.display()))?;
    }
    Ok(())
}

pub fn create(path: &Path) -> Result<File> {
    File::create(path).with_context(|| format!("failed to create {}", path.display()))
}

fn open(path: &Path) -> Result<File> {
    File::open(path).with_context(|| format!("failed to open {}", path.display()))
}
