//! Per-tick behaviour shared by prey and predators.
//!
//! One call to [`Habitat::act`] advances a single animal through:
//!
//! 1. aging (death past the kind's max age),
//! 2. hunger (predators only; death at zero),
//! 3. feeding (predators only; eat the first prey found among shuffled neighbours),
//! 4. breeding (litter placed into free neighbouring cells),
//! 5. movement (onto the eaten prey's cell, else a free neighbour, else death by overcrowding).
//!
//! Random draws happen in a fixed order so a seeded run is reproducible:
//! the breeding draw is consumed by every animal that reaches step 4,
//! whether or not it breeds.

use crate::animal::{Animal, Species};
use crate::field::Field;
use crate::population::Population;
use ecosim_core::{AnimalId, DeathCause, Error, Kind, LifeCycle, Location, Result, SimulationConfig};
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, trace};

/// What one animal did during its turn
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Activity {
    /// Offspring placed on the field this turn
    pub births: Vec<AnimalId>,
    /// Prey eaten this turn
    pub meal: Option<AnimalId>,
    /// Set when the acting animal died this turn
    pub death: Option<DeathCause>,
}

/// Everything an animal may touch while acting
pub(crate) struct Habitat<'a> {
    pub field: &'a mut Field,
    pub population: &'a mut Population,
    pub rng: &'a mut ChaCha8Rng,
    pub config: &'a SimulationConfig,
    pub tick: u64,
}

impl Habitat<'_> {
    pub fn act(&mut self, id: AnimalId) -> Result<Activity> {
        let mut activity = Activity::default();

        let animal = self.population.expect_mut(id)?;
        if !animal.is_alive() {
            return Ok(activity);
        }
        let kind = animal.kind();
        let life = *self.config.life_cycle(kind);

        if animal.grow_older() > life.max_age {
            self.kill(id, DeathCause::OldAge)?;
            activity.death = Some(DeathCause::OldAge);
            return Ok(activity);
        }

        if let Some(hunger) = animal.burn_hunger(self.config.predator.hunger_per_step) {
            if hunger <= 0 {
                self.kill(id, DeathCause::Starvation)?;
                activity.death = Some(DeathCause::Starvation);
                return Ok(activity);
            }
        }

        let location = animal.location().ok_or_else(|| {
            Error::InvalidState(format!("living animal {id} has no location"))
        })?;

        let meal_site = match kind {
            Kind::Predator => self.hunt(id, location)?,
            Kind::Prey => None,
        };
        if let Some((prey, _)) = meal_site {
            activity.meal = Some(prey);
        }
        let reserved = meal_site.map(|(_, site)| site);

        activity.births = self.breed(id, kind, location, reserved, &life)?;

        let destination = match reserved {
            Some(site) => Some(site),
            None => self.field.free_adjacent_location(location, &mut *self.rng),
        };

        match destination {
            Some(to) => {
                self.population.expect_mut(id)?.relocate(self.field, to)?;
                trace!(tick = self.tick, animal_id = %id, from = %location, to = %to, "Animal moved");
            }
            None => {
                self.kill(id, DeathCause::Overcrowding)?;
                activity.death = Some(DeathCause::Overcrowding);
            }
        }

        Ok(activity)
    }

    /// Eat the first living prey among the shuffled neighbours.
    ///
    /// Returns the prey and the cell it vacated.
    fn hunt(&mut self, predator: AnimalId, location: Location) -> Result<Option<(AnimalId, Location)>> {
        let neighbours = self.field.shuffled_adjacent_locations(location, &mut *self.rng);

        for site in neighbours {
            let Some(occupant) = self.field.get(site)? else {
                continue;
            };
            if occupant.kind != Kind::Prey || !self.population.is_alive(occupant.id) {
                continue;
            }

            self.kill(occupant.id, DeathCause::Eaten)?;
            self.population
                .expect_mut(predator)?
                .feed(self.config.predator.food_value);
            debug!(
                tick = self.tick,
                predator_id = %predator,
                prey_id = %occupant.id,
                at = %site,
                "Predator fed"
            );
            return Ok(Some((occupant.id, site)));
        }

        Ok(None)
    }

    /// Place a litter into free neighbouring cells, never using `reserved`
    fn breed(
        &mut self,
        parent: AnimalId,
        kind: Kind,
        location: Location,
        reserved: Option<Location>,
        life: &LifeCycle,
    ) -> Result<Vec<AnimalId>> {
        let draw: f64 = self.rng.gen();
        let age = self.population.expect_mut(parent)?.age();
        if draw > life.breeding_probability || age < life.breeding_age {
            return Ok(Vec::new());
        }

        let mut free = self.field.free_adjacent_locations(location, &mut *self.rng);
        free.retain(|&site| Some(site) != reserved);
        if free.is_empty() {
            return Ok(Vec::new());
        }

        let litter_size = self.rng.gen_range(1..=life.max_litter_size) as usize;
        let mut born = Vec::with_capacity(litter_size.min(free.len()));

        for site in free.into_iter().take(litter_size) {
            let id = self.population.allocate_id();
            let mut young = self.newborn(id, kind);
            young.settle(self.field, site)?;
            self.population.enroll_newborn(young);
            born.push(id);
        }

        debug!(
            tick = self.tick,
            parent_id = %parent,
            kind = %kind,
            litter = born.len(),
            "Animal gave birth"
        );
        Ok(born)
    }

    fn newborn(&self, id: AnimalId, kind: Kind) -> Animal {
        let species = match kind {
            Kind::Prey => Species::Prey,
            Kind::Predator => Species::Predator {
                hunger: self.config.predator.food_value,
            },
        };
        Animal::new(id, species, 0)
    }

    fn kill(&mut self, id: AnimalId, cause: DeathCause) -> Result<()> {
        let animal = self.population.expect_mut(id)?;
        let kind = animal.kind();
        let age = animal.age();
        animal.die(self.field)?;
        debug!(
            tick = self.tick,
            animal_id = %id,
            kind = %kind,
            age = age,
            cause = %cause,
            "Animal died"
        );
        Ok(())
    }
}
