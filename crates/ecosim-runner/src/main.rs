//! Command-line driver for the predator-prey simulation.
//!
//! Usage: `ecosim [CONFIG.json] [STEPS]`

mod logging;

use anyhow::{Context, Result};
use ecosim_core::SimulationConfig;
use ecosim_world::{Palette, Simulation, TextView};
use std::path::Path;
use tracing::{info, warn};

// Fields larger than this are not printed at the end of a run
const MAX_PRINTED_CELLS: i64 = 100 * 100;

fn main() -> Result<()> {
    logging::init_logging()?;

    let mut args = std::env::args().skip(1);
    let config = match args.next() {
        Some(path) => load_config(Path::new(&path))?,
        None => SimulationConfig::default(),
    };
    let steps = match args.next() {
        Some(raw) => Some(
            raw.parse::<u64>()
                .with_context(|| format!("invalid step count {raw:?}"))?,
        ),
        None => None,
    };

    info!(seed = config.seed, depth = config.field.depth, width = config.field.width, "Starting ecosim");

    let mut sim = Simulation::new(config, TextView::new(Palette::default()))?;
    for problem in sim.diagnostics() {
        warn!("{problem}");
    }

    let summary = match steps {
        Some(steps) => sim.simulate(steps)?,
        None => sim.run_long_simulation()?,
    };

    let field = sim.field();
    if i64::from(field.depth()) * i64::from(field.width()) <= MAX_PRINTED_CELLS {
        print!("{}", sim.view().frame());
    }
    println!("{}", sim.view().status());
    println!("{}", serde_json::to_string_pretty(&summary)?);

    Ok(())
}

fn load_config(path: &Path) -> Result<SimulationConfig> {
    SimulationConfig::from_json_file(path)
        .with_context(|| format!("loading configuration from {}", path.display()))
}
