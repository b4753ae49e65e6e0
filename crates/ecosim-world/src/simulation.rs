//! Simulation engine: seeding, stepping and the viability-bounded run loop.

use crate::animal::Animal;
use crate::behavior::Habitat;
use crate::field::Field;
use crate::population::Population;
use crate::view::{NullView, SimulatorView};
use ecosim_core::{
    AnimalId, DeathCause, DeathTally, Error, Kind, Location, PopulationCounts, Result, SimulationConfig,
};
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

pub struct Simulation<V: SimulatorView = NullView> {
    config: SimulationConfig,
    field: Field,
    population: Population,
    rng: ChaCha8Rng,
    tick: u64,
    view: V,
    diagnostics: Vec<Error>,
    // Running totals since the last reset
    total_births: u64,
    total_deaths: DeathTally,
}

impl<V: SimulatorView> Simulation<V> {
    /// Build a simulation and seed its field.
    ///
    /// Invalid configuration sections are replaced by their defaults; the
    /// problems found are kept in [`Simulation::diagnostics`].
    pub fn new(config: SimulationConfig, view: V) -> Result<Self> {
        let (config, diagnostics) = config.sanitized();
        for problem in &diagnostics {
            warn!(error = %problem, "Invalid configuration replaced with defaults");
        }

        let rng = ChaCha8Rng::seed_from_u64(config.seed);
        let field = Field::from_config(&config.field);

        let mut sim = Self {
            config,
            field,
            population: Population::new(),
            rng,
            tick: 0,
            view,
            diagnostics,
            total_births: 0,
            total_deaths: DeathTally::default(),
        };
        sim.reset()?;

        Ok(sim)
    }

    /// Run for the configured number of steps
    pub fn run_long_simulation(&mut self) -> Result<SimulationSummary> {
        self.simulate(self.config.num_steps)
    }

    /// Run up to `num_steps` steps, stopping as soon as the view reports the
    /// population is no longer viable. Viability is checked before each step.
    #[instrument(skip(self), fields(start_tick = self.tick))]
    pub fn simulate(&mut self, num_steps: u64) -> Result<SimulationSummary> {
        info!("Starting simulation for up to {} steps", num_steps);

        let mut steps_run = 0;
        let mut stopped_early = false;

        while steps_run < num_steps {
            if !self.view.is_viable(&self.field) {
                stopped_early = true;
                info!(tick = self.tick, counts = %self.field.counts(), "Population no longer viable");
                break;
            }
            self.step()?;
            steps_run += 1;
        }

        let summary = self.summary(steps_run, stopped_early);
        info!(
            event = "simulation_summary",
            steps_run = summary.steps_run,
            final_tick = summary.final_tick,
            prey = summary.counts.prey,
            predators = summary.counts.predators,
            births = summary.total_births,
            deaths = summary.total_deaths.total(),
            stopped_early = summary.stopped_early,
            "Simulation finished"
        );

        Ok(summary)
    }

    /// Advance every living animal by one tick
    pub fn step(&mut self) -> Result<StepReport> {
        self.tick += 1;
        let mut report = StepReport::new(self.tick);

        let roster = self.population.roster();
        let mut habitat = Habitat {
            field: &mut self.field,
            population: &mut self.population,
            rng: &mut self.rng,
            config: &self.config,
            tick: self.tick,
        };

        for id in roster {
            // Animals eaten earlier in this tick must not act.
            if !habitat.population.is_alive(id) {
                continue;
            }
            let activity = habitat.act(id)?;

            report.births += activity.births.len() as u64;
            if activity.meal.is_some() {
                report.deaths.record(DeathCause::Eaten);
            }
            if let Some(cause) = activity.death {
                report.deaths.record(cause);
            }
        }

        self.population.merge_newborns();
        report.counts = self.field.counts();

        self.total_births += report.births;
        self.total_deaths.absorb(&report.deaths);

        if self.config.report_interval > 0 && self.tick % self.config.report_interval == 0 {
            info!(
                event = "population_metrics",
                tick = self.tick,
                prey = report.counts.prey,
                predators = report.counts.predators,
                births = report.births,
                deaths = report.deaths.total(),
                "Population metrics snapshot"
            );
        }

        self.view.show_status(self.tick, &self.field);
        Ok(report)
    }

    /// Return to tick 0 with a freshly seeded field.
    ///
    /// The random stream carries on from where it was; see [`Simulation::reseed`].
    pub fn reset(&mut self) -> Result<()> {
        self.tick = 0;
        self.total_births = 0;
        self.total_deaths = DeathTally::default();
        self.populate()?;

        self.view.show_status(self.tick, &self.field);
        Ok(())
    }

    /// Restart the random stream from `seed`
    pub fn reseed(&mut self, seed: u64) {
        self.config.seed = seed;
        self.rng = ChaCha8Rng::seed_from_u64(seed);
    }

    /// Empty the field and registry, then seed cells in row-major order.
    ///
    /// Each cell draws once against the predator probability; only when that
    /// fails does it draw again against the prey probability.
    pub fn populate(&mut self) -> Result<()> {
        self.population.clear();
        self.field.clear();

        let population = self.config.population;
        let locations: Vec<Location> = self.field.locations().collect();

        for location in locations {
            if self.rng.gen::<f64>() <= population.predator_creation_probability {
                let (age, hunger) = self.seeded_predator_state();
                self.add_predator(location, age, hunger)?;
            } else if self.rng.gen::<f64>() <= population.prey_creation_probability {
                let age = self.seeded_age(Kind::Prey);
                self.add_prey(location, age)?;
            }
        }

        info!(
            counts = %self.population.counts(),
            depth = self.field.depth(),
            width = self.field.width(),
            "Field populated"
        );
        Ok(())
    }

    fn seeded_age(&mut self, kind: Kind) -> u32 {
        if self.config.population.random_initial_age {
            self.rng.gen_range(0..self.config.life_cycle(kind).max_age)
        } else {
            0
        }
    }

    fn seeded_predator_state(&mut self) -> (u32, i32) {
        let age = self.seeded_age(Kind::Predator);
        let food_value = self.config.predator.food_value;
        let hunger = if self.config.population.random_initial_age {
            self.rng.gen_range(0..food_value)
        } else {
            food_value
        };
        (age, hunger)
    }

    /// Register a prey on a free cell
    pub fn add_prey(&mut self, location: Location, age: u32) -> Result<AnimalId> {
        let id = self.population.allocate_id();
        self.admit(Animal::prey(id, age), location)
    }

    /// Register a predator on a free cell
    pub fn add_predator(&mut self, location: Location, age: u32, hunger: i32) -> Result<AnimalId> {
        let id = self.population.allocate_id();
        self.admit(Animal::predator(id, age, hunger), location)
    }

    fn admit(&mut self, mut animal: Animal, location: Location) -> Result<AnimalId> {
        animal.settle(&mut self.field, location)?;
        let id = animal.id();
        self.population.register(animal);
        Ok(id)
    }

    pub fn is_viable(&self) -> bool {
        self.view.is_viable(&self.field)
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn field(&self) -> &Field {
        &self.field
    }

    pub fn population(&self) -> &Population {
        &self.population
    }

    pub fn animal(&self, id: AnimalId) -> Option<&Animal> {
        self.population.get(id)
    }

    pub fn counts(&self) -> PopulationCounts {
        self.field.counts()
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Configuration problems recovered from at construction
    pub fn diagnostics(&self) -> &[Error] {
        &self.diagnostics
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut V {
        &mut self.view
    }

    pub fn into_view(self) -> V {
        self.view
    }

    /// Field and registry agree with each other
    pub fn check_consistency(&self) -> Result<()> {
        self.population.check_consistency(&self.field)
    }

    fn summary(&self, steps_run: u64, stopped_early: bool) -> SimulationSummary {
        SimulationSummary {
            steps_run,
            final_tick: self.tick,
            counts: self.field.counts(),
            stopped_early,
            total_births: self.total_births,
            total_deaths: self.total_deaths,
        }
    }
}

/// Outcome of a single tick
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepReport {
    pub tick: u64,
    pub births: u64,
    pub deaths: DeathTally,
    pub counts: PopulationCounts,
}

impl StepReport {
    fn new(tick: u64) -> Self {
        Self {
            tick,
            ..Default::default()
        }
    }
}

/// Outcome of a [`Simulation::simulate`] call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationSummary {
    pub steps_run: u64,
    pub final_tick: u64,
    pub counts: PopulationCounts,
    /// The run ended because the view reported the population non-viable
    pub stopped_early: bool,
    pub total_births: u64,
    pub total_deaths: DeathTally,
}
