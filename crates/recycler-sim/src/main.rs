//! Headless recycler runner.
//!
//! Loads a recycler catalog, places one of every recycler on a single vessel
//! and steps it, optionally flipping the vessel between loaded and unloaded
//! every few ticks to exercise both simulation paths.

use std::collections::BTreeSet;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use recycler_core::catalog::Catalog;
use recycler_core::config::ENERGY_RESOURCE;
use recycler_core::format::human_readable_rate;
use recycler_core::id::EntityId;
use recycler_core::pool::ResourceCache;
use recycler_core::snapshot::encode_parts;
use recycler_core::world::{EntityState, LoadedPart, StepReport, World};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "recycler-sim")]
#[command(about = "Step recyclers from a data catalog")]
struct Cli {
    /// Directory holding recyclers.{ron,toml,json}
    #[arg(short, long, default_value = "crates/recycler-sim/data")]
    data: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the capability summary of every recycler
    Info,

    /// Step a vessel carrying one of each recycler
    Run {
        /// Number of ticks
        #[arg(short, long, default_value = "100")]
        ticks: u32,

        /// Seconds per tick
        #[arg(long, default_value = "0.02")]
        dt: f64,

        /// Starting amount of every consumed resource
        #[arg(short, long, default_value = "10.0")]
        stock: f64,

        /// Flip between loaded and unloaded every N ticks (0 = stay loaded)
        #[arg(short, long, default_value = "0")]
        unload_every: u32,

        /// Write the vessel's part snapshots here after the run
        #[arg(long)]
        snapshot_out: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("recycler_sim=info".parse()?),
        )
        .init();

    let cli = Cli::parse();
    let catalog = recycler_data::load_catalog_dir(&cli.data)
        .with_context(|| format!("loading catalog from {}", cli.data.display()))?;

    match cli.command {
        Commands::Info => {
            for name in catalog.part_names() {
                let Some(definition) = catalog.get(name) else {
                    continue;
                };
                println!("== {} ({name}) ==", definition.display_name);
                println!("{}\n", definition.config.info());
            }
        }
        Commands::Run {
            ticks,
            dt,
            stock,
            unload_every,
            snapshot_out,
        } => {
            if !(dt.is_finite() && dt > 0.0) {
                bail!("--dt must be a positive number, got {dt}");
            }
            run(&catalog, ticks, dt, stock, unload_every, snapshot_out)?;
        }
    }

    Ok(())
}

fn run(
    catalog: &Catalog,
    ticks: u32,
    dt: f64,
    stock: f64,
    unload_every: u32,
    snapshot_out: Option<PathBuf>,
) -> Result<()> {
    let mut world = World::new();
    let parts = catalog
        .part_names()
        .into_iter()
        .filter_map(|name| catalog.get(name))
        .map(|definition| LoadedPart::with_recycler(definition.clone()))
        .collect();
    let vessel = world.spawn_loaded("vessel", parts);

    let mut pool = ResourceCache::new();
    let resources = stock_vessel(&mut pool, catalog, vessel, stock);

    let mut totals = StepReport::default();
    for tick in 1..=ticks {
        let report = world.step(&mut pool, catalog, dt);
        totals.foreground += report.foreground;
        totals.background += report.background;
        totals.disabled += report.disabled;
        totals.missing_definitions += report.missing_definitions;

        if unload_every > 0 && tick % unload_every == 0 {
            let loaded = world.entity(vessel).is_some_and(|e| e.is_loaded());
            if loaded {
                world.unload(vessel)?;
            } else {
                world.load(vessel, catalog)?;
            }
        }
    }

    info!(
        ticks,
        foreground = totals.foreground,
        background = totals.background,
        disabled = totals.disabled,
        "run finished"
    );

    if let Some(EntityState::Loaded(parts)) = world.entity(vessel).map(|e| &e.state) {
        for recycler in parts.iter().flat_map(LoadedPart::recyclers) {
            println!(
                "{:<20} {}",
                recycler.definition().display_name,
                recycler.status_label()
            );
        }
    }
    for resource in &resources {
        let amount = pool.level(vessel, resource).map_or(0.0, |l| l.amount);
        println!("{resource:<20} {amount:.4}");
    }
    for name in catalog.part_names() {
        if let Some(definition) = catalog.get(name) {
            let config = &definition.config;
            let produced = config.input_rate * config.conversion_ratio;
            println!(
                "{:<20} max {} {}",
                definition.display_name,
                human_readable_rate(produced),
                config.output_resource
            );
        }
    }

    if let Some(path) = snapshot_out {
        if world.entity(vessel).is_some_and(|e| e.is_loaded()) {
            world.unload(vessel)?;
        }
        let Some(EntityState::Unloaded(parts)) = world.entity(vessel).map(|e| &e.state) else {
            bail!("vessel vanished before snapshotting");
        };
        let bytes = encode_parts(parts)?;
        std::fs::write(&path, &bytes)
            .with_context(|| format!("writing snapshot to {}", path.display()))?;
        info!(path = %path.display(), bytes = bytes.len(), "snapshot written");
    }

    Ok(())
}

/// Fill every consumed resource to `stock` and give outputs empty tanks.
/// Returns the set of resources touched, sorted.
fn stock_vessel(
    pool: &mut ResourceCache,
    catalog: &Catalog,
    vessel: EntityId,
    stock: f64,
) -> BTreeSet<String> {
    const CAPACITY: f64 = 1e9;
    let mut consumed = BTreeSet::from([ENERGY_RESOURCE.to_string()]);
    let mut produced = BTreeSet::new();
    for name in catalog.part_names() {
        let Some(definition) = catalog.get(name) else {
            continue;
        };
        let config = &definition.config;
        consumed.insert(config.input_resource.clone());
        if let Some(filter) = config.active_filter() {
            consumed.insert(filter.to_string());
        }
        produced.insert(config.output_resource.clone());
    }
    for resource in &consumed {
        pool.set(vessel, resource, stock, CAPACITY);
    }
    for resource in produced.difference(&consumed) {
        pool.set(vessel, resource, 0.0, CAPACITY);
    }
    consumed.extend(produced);
    consumed
}
