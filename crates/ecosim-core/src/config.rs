//! Configuration types for the simulation.

use crate::{Error, Kind, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Largest number of cells a field may hold
pub const MAX_FIELD_CELLS: i64 = 16_000_000;

/// Field extent
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FieldConfig {
    /// Number of rows
    pub depth: i32,
    /// Number of columns
    pub width: i32,
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self {
            depth: 50,
            width: 50,
        }
    }
}

impl FieldConfig {
    pub fn validate(&self) -> Result<()> {
        if self.depth <= 0 || self.width <= 0 {
            return Err(Error::Configuration(format!(
                "field dimensions must be greater than zero, got {}x{}",
                self.depth, self.width
            )));
        }
        let cells = i64::from(self.depth) * i64::from(self.width);
        if cells > MAX_FIELD_CELLS {
            return Err(Error::Configuration(format!(
                "field of {}x{} has {cells} cells, more than the maximum of {MAX_FIELD_CELLS}",
                self.depth, self.width
            )));
        }
        Ok(())
    }
}

/// Aging and breeding parameters shared by every kind
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LifeCycle {
    /// Age at which an animal may start to breed
    pub breeding_age: u32,
    /// An animal whose age exceeds this dies
    pub max_age: u32,
    /// Chance of a breeding attempt succeeding each tick
    pub breeding_probability: f64,
    /// Upper bound of a single litter
    pub max_litter_size: u32,
}

impl LifeCycle {
    pub fn validate(&self, kind: Kind) -> Result<()> {
        if !(0.0..=1.0).contains(&self.breeding_probability) {
            return Err(Error::Configuration(format!(
                "{kind} breeding probability must be within [0, 1], got {}",
                self.breeding_probability
            )));
        }
        if self.max_litter_size == 0 {
            return Err(Error::Configuration(format!(
                "{kind} max litter size must be at least 1"
            )));
        }
        if self.max_age == 0 {
            return Err(Error::Configuration(format!(
                "{kind} max age must be at least 1"
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PreyConfig {
    #[serde(flatten)]
    pub life_cycle: LifeCycle,
}

impl Default for PreyConfig {
    fn default() -> Self {
        Self {
            life_cycle: LifeCycle {
                breeding_age: 5,
                max_age: 40,
                breeding_probability: 0.12,
                max_litter_size: 4,
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PredatorConfig {
    #[serde(flatten)]
    pub life_cycle: LifeCycle,
    /// Hunger level restored by eating one prey
    pub food_value: i32,
    /// Hunger lost every tick
    pub hunger_per_step: i32,
}

impl Default for PredatorConfig {
    fn default() -> Self {
        Self {
            life_cycle: LifeCycle {
                breeding_age: 15,
                max_age: 150,
                breeding_probability: 0.08,
                max_litter_size: 2,
            },
            food_value: 9,
            hunger_per_step: 1,
        }
    }
}

impl PredatorConfig {
    pub fn validate(&self) -> Result<()> {
        self.life_cycle.validate(Kind::Predator)?;
        if self.food_value <= 0 {
            return Err(Error::Configuration(format!(
                "predator food value must be positive, got {}",
                self.food_value
            )));
        }
        if self.hunger_per_step < 0 {
            return Err(Error::Configuration(format!(
                "predator hunger per step must not be negative, got {}",
                self.hunger_per_step
            )));
        }
        Ok(())
    }
}

/// Initial seeding of the field
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PopulationConfig {
    /// Probability that a predator is created in any given cell
    pub predator_creation_probability: f64,
    /// Probability that a prey is created in a cell without a predator
    pub prey_creation_probability: f64,
    /// Seeded animals start with a random age (and predators a random hunger)
    pub random_initial_age: bool,
}

impl Default for PopulationConfig {
    fn default() -> Self {
        Self {
            predator_creation_probability: 0.02,
            prey_creation_probability: 0.08,
            random_initial_age: true,
        }
    }
}

impl PopulationConfig {
    pub fn validate(&self) -> Result<()> {
        for (name, p) in [
            ("predator", self.predator_creation_probability),
            ("prey", self.prey_creation_probability),
        ] {
            if !(0.0..=1.0).contains(&p) {
                return Err(Error::Configuration(format!(
                    "{name} creation probability must be within [0, 1], got {p}"
                )));
            }
        }
        Ok(())
    }
}

/// Full simulation configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Random seed for reproducibility
    pub seed: u64,
    /// Steps run by a long simulation
    pub num_steps: u64,
    /// Ticks between population log lines (0 disables them)
    pub report_interval: u64,
    pub field: FieldConfig,
    pub prey: PreyConfig,
    pub predator: PredatorConfig,
    pub population: PopulationConfig,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            seed: 1111,
            num_steps: 500,
            report_interval: 50,
            field: FieldConfig::default(),
            prey: PreyConfig::default(),
            predator: PredatorConfig::default(),
            population: PopulationConfig::default(),
        }
    }
}

impl SimulationConfig {
    /// Read a configuration from a JSON file. Missing keys take their defaults.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    pub fn life_cycle(&self, kind: Kind) -> &LifeCycle {
        match kind {
            Kind::Prey => &self.prey.life_cycle,
            Kind::Predator => &self.predator.life_cycle,
        }
    }

    /// Check every section, collecting all problems found
    pub fn validate(&self) -> Vec<Error> {
        [
            self.field.validate(),
            self.prey.life_cycle.validate(Kind::Prey),
            self.predator.validate(),
            self.population.validate(),
        ]
        .into_iter()
        .filter_map(|r| r.err())
        .collect()
    }

    /// Replace every invalid section with its default.
    ///
    /// Returns the repaired configuration together with one diagnostic per
    /// replaced section.
    pub fn sanitized(mut self) -> (Self, Vec<Error>) {
        let mut diagnostics = Vec::new();

        if let Err(e) = self.field.validate() {
            self.field = FieldConfig::default();
            diagnostics.push(e);
        }
        if let Err(e) = self.prey.life_cycle.validate(Kind::Prey) {
            self.prey = PreyConfig::default();
            diagnostics.push(e);
        }
        if let Err(e) = self.predator.validate() {
            self.predator = PredatorConfig::default();
            diagnostics.push(e);
        }
        if let Err(e) = self.population.validate() {
            self.population = PopulationConfig::default();
            diagnostics.push(e);
        }

        (self, diagnostics)
    }
}
