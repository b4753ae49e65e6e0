//! Views receive the field once per tick and decide whether a run is still worth continuing.

use crate::field::{Field, FieldSnapshot};
use ecosim_core::{Kind, PopulationCounts};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

/// Observer of the simulation, told about every tick including tick 0
pub trait SimulatorView {
    fn show_status(&mut self, tick: u64, field: &Field);

    /// Whether the run should continue. Defaults to "both kinds still present".
    fn is_viable(&self, field: &Field) -> bool {
        field.counts().is_viable()
    }
}

/// Display attributes of one kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Glyph {
    pub symbol: char,
    pub rgb: [u8; 3],
}

/// Kind to display mapping, fixed when a view is built
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Palette {
    glyphs: BTreeMap<Kind, Glyph>,
    empty: char,
}

impl Default for Palette {
    fn default() -> Self {
        Self::new('.')
            .with(Kind::Prey, Glyph { symbol: 'o', rgb: [255, 165, 0] })
            .with(Kind::Predator, Glyph { symbol: 'X', rgb: [0, 0, 255] })
    }
}

impl Palette {
    pub fn new(empty: char) -> Self {
        Self {
            glyphs: BTreeMap::new(),
            empty,
        }
    }

    pub fn with(mut self, kind: Kind, glyph: Glyph) -> Self {
        self.glyphs.insert(kind, glyph);
        self
    }

    /// Kinds without a glyph are drawn as `?`
    pub fn symbol(&self, kind: Option<Kind>) -> char {
        match kind {
            None => self.empty,
            Some(kind) => self.glyphs.get(&kind).map_or('?', |g| g.symbol),
        }
    }

    pub fn glyph(&self, kind: Kind) -> Option<&Glyph> {
        self.glyphs.get(&kind)
    }

    pub fn render(&self, snapshot: &FieldSnapshot) -> String {
        let width = snapshot.width.max(1) as usize;
        let mut out = String::with_capacity(snapshot.cells.len() + snapshot.depth.max(0) as usize);
        for row in snapshot.cells.chunks(width) {
            out.extend(row.iter().map(|&cell| self.symbol(cell)));
            out.push('\n');
        }
        out
    }
}

/// Renders each tick as text
#[derive(Debug, Clone, Default)]
pub struct TextView {
    palette: Palette,
    frame: String,
    status: String,
}

impl TextView {
    pub fn new(palette: Palette) -> Self {
        Self {
            palette,
            frame: String::new(),
            status: String::new(),
        }
    }

    /// Latest rendered field
    pub fn frame(&self) -> &str {
        &self.frame
    }

    /// Latest status line, e.g. `Step: 3 Prey: 40 Predator: 7`
    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }
}

impl SimulatorView for TextView {
    fn show_status(&mut self, tick: u64, field: &Field) {
        let counts = field.counts();
        self.status = format!("Step: {tick} {counts}");
        self.frame = self.palette.render(&field.snapshot());
        debug!(tick, prey = counts.prey, predators = counts.predators, "{}", self.status);
    }
}

/// One reported tick
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusRecord {
    pub tick: u64,
    pub counts: PopulationCounts,
    pub snapshot: FieldSnapshot,
}

/// Keeps every reported tick
#[derive(Debug, Clone, Default)]
pub struct RecordingView {
    history: Vec<StatusRecord>,
}

impl RecordingView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn history(&self) -> &[StatusRecord] {
        &self.history
    }

    pub fn last(&self) -> Option<&StatusRecord> {
        self.history.last()
    }
}

impl SimulatorView for RecordingView {
    fn show_status(&mut self, tick: u64, field: &Field) {
        self.history.push(StatusRecord {
            tick,
            counts: field.counts(),
            snapshot: field.snapshot(),
        });
    }
}

/// Discards status reports
#[derive(Debug, Clone, Copy, Default)]
pub struct NullView;

impl SimulatorView for NullView {
    fn show_status(&mut self, _tick: u64, _field: &Field) {}
}
