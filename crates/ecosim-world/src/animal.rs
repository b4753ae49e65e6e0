//! Animal state and field bookkeeping.

use crate::field::{Field, Occupant};
use ecosim_core::{AnimalId, Error, Kind, Location, Result};
use serde::{Deserialize, Serialize};

/// Kind-specific state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Species {
    Prey,
    Predator {
        /// Ticks of food left; the predator starves when this reaches zero
        hunger: i32,
    },
}

impl Species {
    pub fn kind(&self) -> Kind {
        match self {
            Species::Prey => Kind::Prey,
            Species::Predator { .. } => Kind::Predator,
        }
    }
}

/// An animal in the simulation.
///
/// `location` mirrors the field cell holding this animal. Every method that
/// moves the animal updates both sides together.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Animal {
    id: AnimalId,
    species: Species,
    age: u32,
    alive: bool,
    location: Option<Location>,
}

impl Animal {
    pub fn new(id: AnimalId, species: Species, age: u32) -> Self {
        Self {
            id,
            species,
            age,
            alive: true,
            location: None,
        }
    }

    pub fn prey(id: AnimalId, age: u32) -> Self {
        Self::new(id, Species::Prey, age)
    }

    pub fn predator(id: AnimalId, age: u32, hunger: i32) -> Self {
        Self::new(id, Species::Predator { hunger }, age)
    }

    pub fn id(&self) -> AnimalId {
        self.id
    }

    pub fn kind(&self) -> Kind {
        self.species.kind()
    }

    pub fn species(&self) -> Species {
        self.species
    }

    pub fn age(&self) -> u32 {
        self.age
    }

    pub fn is_alive(&self) -> bool {
        self.alive
    }

    pub fn location(&self) -> Option<Location> {
        self.location
    }

    /// Hunger level of a predator, `None` for prey
    pub fn hunger(&self) -> Option<i32> {
        match self.species {
            Species::Predator { hunger } => Some(hunger),
            Species::Prey => None,
        }
    }

    fn occupant(&self) -> Occupant {
        Occupant {
            id: self.id,
            kind: self.kind(),
        }
    }

    pub(crate) fn grow_older(&mut self) -> u32 {
        self.age += 1;
        self.age
    }

    /// Lower a predator's hunger, returning the new level
    pub(crate) fn burn_hunger(&mut self, amount: i32) -> Option<i32> {
        match &mut self.species {
            Species::Predator { hunger } => {
                *hunger -= amount;
                Some(*hunger)
            }
            Species::Prey => None,
        }
    }

    pub(crate) fn feed(&mut self, food_value: i32) {
        if let Species::Predator { hunger } = &mut self.species {
            *hunger = food_value;
        }
    }

    /// Put an unplaced animal onto a free cell
    pub(crate) fn settle(&mut self, field: &mut Field, loc: Location) -> Result<()> {
        if self.location.is_some() {
            return Err(Error::InvalidState(format!(
                "animal {} is already on the field",
                self.id
            )));
        }
        if !field.is_free(loc)? {
            return Err(Error::Occupied(loc));
        }
        field.place(self.occupant(), loc)?;
        self.location = Some(loc);
        Ok(())
    }

    /// Move to a free cell, vacating the current one
    pub(crate) fn relocate(&mut self, field: &mut Field, to: Location) -> Result<()> {
        let from = self.location.ok_or_else(|| {
            Error::InvalidState(format!("animal {} cannot move while off the field", self.id))
        })?;
        if from == to {
            return Ok(());
        }
        if !field.is_free(to)? {
            return Err(Error::Occupied(to));
        }
        self.vacate(field)?;
        field.place(self.occupant(), to)?;
        self.location = Some(to);
        Ok(())
    }

    /// Mark the animal dead and give up its cell
    pub(crate) fn die(&mut self, field: &mut Field) -> Result<()> {
        self.vacate(field)?;
        self.alive = false;
        Ok(())
    }

    fn vacate(&mut self, field: &mut Field) -> Result<()> {
        if let Some(loc) = self.location.take() {
            if field.get(loc)?.map(|o| o.id) == Some(self.id) {
                field.clear_location(loc)?;
            }
        }
        Ok(())
    }
}
