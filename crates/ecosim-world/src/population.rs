//! Registry of the living animals.

use crate::animal::Animal;
use crate::field::Field;
use ecosim_core::{AnimalId, Error, Location, PopulationCounts, Result};
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    Registry(usize),
    Nursery(usize),
}

/// Animals in acting order, plus the animals born during the current tick.
///
/// Newborns live in a separate nursery until [`Population::merge_newborns`]
/// so they never act in the tick they were born in, while still being
/// reachable by id (a predator may eat one before the tick ends).
#[derive(Debug, Default)]
pub struct Population {
    animals: Vec<Animal>,
    newborns: Vec<Animal>,
    slots: HashMap<AnimalId, Slot>,
    next_id: u64,
}

impl Population {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn allocate_id(&mut self) -> AnimalId {
        let id = AnimalId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Append an animal to the acting registry
    pub(crate) fn register(&mut self, animal: Animal) {
        self.slots.insert(animal.id(), Slot::Registry(self.animals.len()));
        self.animals.push(animal);
    }

    /// Buffer an animal born this tick
    pub(crate) fn enroll_newborn(&mut self, animal: Animal) {
        self.slots.insert(animal.id(), Slot::Nursery(self.newborns.len()));
        self.newborns.push(animal);
    }

    pub fn get(&self, id: AnimalId) -> Option<&Animal> {
        match *self.slots.get(&id)? {
            Slot::Registry(i) => self.animals.get(i),
            Slot::Nursery(i) => self.newborns.get(i),
        }
    }

    pub(crate) fn get_mut(&mut self, id: AnimalId) -> Option<&mut Animal> {
        match *self.slots.get(&id)? {
            Slot::Registry(i) => self.animals.get_mut(i),
            Slot::Nursery(i) => self.newborns.get_mut(i),
        }
    }

    pub(crate) fn expect_mut(&mut self, id: AnimalId) -> Result<&mut Animal> {
        self.get_mut(id)
            .ok_or_else(|| Error::InvalidState(format!("animal {id} is not registered")))
    }

    pub fn is_alive(&self, id: AnimalId) -> bool {
        self.get(id).is_some_and(Animal::is_alive)
    }

    /// Ids of the registered animals in acting order
    pub fn roster(&self) -> Vec<AnimalId> {
        self.animals.iter().map(Animal::id).collect()
    }

    /// Registered animals in acting order
    pub fn iter(&self) -> impl Iterator<Item = &Animal> + '_ {
        self.animals.iter()
    }

    /// Animals born during the current tick, not yet merged
    pub fn newborns(&self) -> &[Animal] {
        &self.newborns
    }

    pub fn len(&self) -> usize {
        self.animals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.animals.is_empty()
    }

    pub fn counts(&self) -> PopulationCounts {
        self.animals
            .iter()
            .filter(|a| a.is_alive())
            .map(Animal::kind)
            .collect()
    }

    /// Drop dead animals and append the surviving newborns in birth order.
    ///
    /// Returns the number of newborns admitted.
    pub(crate) fn merge_newborns(&mut self) -> usize {
        self.animals.retain(Animal::is_alive);
        let before = self.animals.len();
        self.animals
            .extend(self.newborns.drain(..).filter(Animal::is_alive));
        let admitted = self.animals.len() - before;

        self.slots = self
            .animals
            .iter()
            .enumerate()
            .map(|(i, a)| (a.id(), Slot::Registry(i)))
            .collect();

        admitted
    }

    pub fn clear(&mut self) {
        self.animals.clear();
        self.newborns.clear();
        self.slots.clear();
        self.next_id = 0;
    }

    /// Check that the registry and the field agree with each other.
    ///
    /// Holds at every tick boundary: each registered animal is alive and
    /// sits in the cell recorded for it, no two animals share a cell, and
    /// the field holds nobody else.
    pub fn check_consistency(&self, field: &Field) -> Result<()> {
        let mut seen: HashSet<Location> = HashSet::with_capacity(self.animals.len());

        for animal in self.animals.iter().chain(self.newborns.iter()) {
            match (animal.is_alive(), animal.location()) {
                (false, None) => continue,
                (false, Some(loc)) => {
                    return Err(Error::InvalidState(format!(
                        "dead animal {} still holds {loc}",
                        animal.id()
                    )))
                }
                (true, None) => {
                    return Err(Error::InvalidState(format!(
                        "living animal {} has no location",
                        animal.id()
                    )))
                }
                (true, Some(loc)) => {
                    if !seen.insert(loc) {
                        return Err(Error::InvalidState(format!(
                            "two animals claim {loc}"
                        )));
                    }
                    let occupant = field.get(loc)?;
                    if occupant.map(|o| (o.id, o.kind)) != Some((animal.id(), animal.kind())) {
                        return Err(Error::InvalidState(format!(
                            "animal {} believes it is at {loc} but the field disagrees",
                            animal.id()
                        )));
                    }
                }
            }
        }

        if field.occupied_count() != seen.len() {
            return Err(Error::InvalidState(format!(
                "field holds {} animals but the registry accounts for {}",
                field.occupied_count(),
                seen.len()
            )));
        }

        Ok(())
    }
}
