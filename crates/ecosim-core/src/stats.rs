//! Population statistics.

use crate::{DeathCause, Kind};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of living animals of each kind
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PopulationCounts {
    pub prey: usize,
    pub predators: usize,
}

impl PopulationCounts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment(&mut self, kind: Kind) {
        match kind {
            Kind::Prey => self.prey += 1,
            Kind::Predator => self.predators += 1,
        }
    }

    pub fn get(&self, kind: Kind) -> usize {
        match kind {
            Kind::Prey => self.prey,
            Kind::Predator => self.predators,
        }
    }

    pub fn total(&self) -> usize {
        self.prey + self.predators
    }

    /// More than one kind is still present
    pub fn is_viable(&self) -> bool {
        Kind::all().iter().filter(|&&k| self.get(k) > 0).count() > 1
    }

    /// One-line summary, e.g. `Prey: 210 Predator: 31`
    pub fn details(&self) -> String {
        Kind::all()
            .iter()
            .map(|&k| format!("{}: {}", k, self.get(k)))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl FromIterator<Kind> for PopulationCounts {
    fn from_iter<I: IntoIterator<Item = Kind>>(iter: I) -> Self {
        let mut counts = Self::new();
        for kind in iter {
            counts.increment(kind);
        }
        counts
    }
}

impl fmt::Display for PopulationCounts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.details())
    }
}

/// Deaths grouped by cause
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeathTally {
    pub old_age: u64,
    pub starvation: u64,
    pub eaten: u64,
    pub overcrowding: u64,
}

impl DeathTally {
    pub fn record(&mut self, cause: DeathCause) {
        *self.slot(cause) += 1;
    }

    pub fn get(&self, cause: DeathCause) -> u64 {
        match cause {
            DeathCause::OldAge => self.old_age,
            DeathCause::Starvation => self.starvation,
            DeathCause::Eaten => self.eaten,
            DeathCause::Overcrowding => self.overcrowding,
        }
    }

    pub fn total(&self) -> u64 {
        DeathCause::all().iter().map(|&c| self.get(c)).sum()
    }

    /// Accumulate another tally into this one
    pub fn absorb(&mut self, other: &DeathTally) {
        for cause in DeathCause::all() {
            *self.slot(cause) += other.get(cause);
        }
    }

    fn slot(&mut self, cause: DeathCause) -> &mut u64 {
        match cause {
            DeathCause::OldAge => &mut self.old_age,
            DeathCause::Starvation => &mut self.starvation,
            DeathCause::Eaten => &mut self.eaten,
            DeathCause::Overcrowding => &mut self.overcrowding,
        }
    }
}
