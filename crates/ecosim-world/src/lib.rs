//! World simulation engine.
//!
//! This module implements the bounded grid where prey and predators move,
//! breed, age and die, one tick at a time.

pub mod field;
pub mod animal;
pub mod population;
pub mod behavior;
pub mod simulation;
pub mod view;

pub use field::{Field, FieldSnapshot, Occupant};
pub use animal::{Animal, Species};
pub use population::Population;
pub use behavior::Activity;
pub use simulation::{Simulation, SimulationSummary, StepReport};
pub use view::{Glyph, NullView, Palette, RecordingView, SimulatorView, StatusRecord, TextView};
