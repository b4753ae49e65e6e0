//! Bounded 2D field holding at most one animal per cell.

use ecosim_core::{
    AnimalId, Error, FieldConfig, Kind, Location, PopulationCounts, Result, NEIGHBOUR_OFFSETS,
};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// The animal recorded in a cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Occupant {
    pub id: AnimalId,
    pub kind: Kind,
}

/// A rectangular, non-wrapping grid of `depth` rows by `width` columns
#[derive(Debug, Clone)]
pub struct Field {
    depth: i32,
    width: i32,
    cells: Vec<Option<Occupant>>,
}

impl Field {
    pub fn new(depth: i32, width: i32) -> Self {
        let size = (depth.max(0) as usize) * (width.max(0) as usize);
        Self {
            depth,
            width,
            cells: vec![None; size],
        }
    }

    pub fn from_config(config: &FieldConfig) -> Self {
        Self::new(config.depth, config.width)
    }

    pub fn depth(&self) -> i32 {
        self.depth
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn contains(&self, loc: Location) -> bool {
        (0..self.depth).contains(&loc.row) && (0..self.width).contains(&loc.col)
    }

    /// Occupant of a cell, if any
    pub fn get(&self, loc: Location) -> Result<Option<Occupant>> {
        let index = self.loc_to_index(loc)?;
        Ok(self.cells[index])
    }

    pub fn is_free(&self, loc: Location) -> Result<bool> {
        Ok(self.get(loc)?.is_none())
    }

    /// Record `occupant` at `loc`, returning whatever was there before.
    ///
    /// The displaced occupant is only forgotten by the field; marking it
    /// dead is the caller's business.
    pub fn place(&mut self, occupant: Occupant, loc: Location) -> Result<Option<Occupant>> {
        let index = self.loc_to_index(loc)?;
        Ok(self.cells[index].replace(occupant))
    }

    /// Empty a single cell. Clearing an empty cell is a no-op.
    pub fn clear_location(&mut self, loc: Location) -> Result<Option<Occupant>> {
        let index = self.loc_to_index(loc)?;
        Ok(self.cells[index].take())
    }

    /// Empty every cell
    pub fn clear(&mut self) {
        self.cells.iter_mut().for_each(|cell| *cell = None);
    }

    /// In-bounds Moore neighbours of `loc`, in a fixed row-major order
    pub fn adjacent_locations(&self, loc: Location) -> Vec<Location> {
        NEIGHBOUR_OFFSETS
            .iter()
            .map(|&(d_row, d_col)| loc.offset(d_row, d_col))
            .filter(|&neighbour| self.contains(neighbour))
            .collect()
    }

    /// In-bounds Moore neighbours of `loc`, shuffled with `rng`
    pub fn shuffled_adjacent_locations<R: Rng>(&self, loc: Location, rng: &mut R) -> Vec<Location> {
        let mut neighbours = self.adjacent_locations(loc);
        neighbours.shuffle(rng);
        neighbours
    }

    /// Unoccupied neighbours of `loc` in shuffled order
    pub fn free_adjacent_locations<R: Rng>(&self, loc: Location, rng: &mut R) -> Vec<Location> {
        let neighbours = self.shuffled_adjacent_locations(loc, rng);
        self.free_among(&neighbours)
    }

    /// First unoccupied neighbour of `loc` after shuffling, if any
    pub fn free_adjacent_location<R: Rng>(&self, loc: Location, rng: &mut R) -> Option<Location> {
        let neighbours = self.shuffled_adjacent_locations(loc, rng);
        self.first_free(&neighbours)
    }

    /// Scan `candidates` in order and return the first free in-bounds cell
    pub fn first_free(&self, candidates: &[Location]) -> Option<Location> {
        candidates
            .iter()
            .copied()
            .find(|&loc| matches!(self.get(loc), Ok(None)))
    }

    fn free_among(&self, candidates: &[Location]) -> Vec<Location> {
        candidates
            .iter()
            .copied()
            .filter(|&loc| matches!(self.get(loc), Ok(None)))
            .collect()
    }

    fn loc_to_index(&self, loc: Location) -> Result<usize> {
        if !self.contains(loc) {
            return Err(Error::OutOfBounds {
                location: loc,
                depth: self.depth,
                width: self.width,
            });
        }
        Ok(loc.row as usize * self.width as usize + loc.col as usize)
    }

    /// Get location from index
    pub fn index_to_loc(&self, index: usize) -> Location {
        let width = self.width as usize;
        Location::new((index / width) as i32, (index % width) as i32)
    }

    /// Iterator over all locations in row-major order
    pub fn locations(&self) -> impl Iterator<Item = Location> + '_ {
        (0..self.cells.len()).map(move |i| self.index_to_loc(i))
    }

    /// Iterator over occupied cells in row-major order
    pub fn iter(&self) -> impl Iterator<Item = (Location, Occupant)> + '_ {
        self.cells
            .iter()
            .enumerate()
            .filter_map(move |(i, cell)| cell.map(|occupant| (self.index_to_loc(i), occupant)))
    }

    pub fn occupied_count(&self) -> usize {
        self.cells.iter().filter(|cell| cell.is_some()).count()
    }

    /// Living animals per kind, counted from the cells
    pub fn counts(&self) -> PopulationCounts {
        self.iter().map(|(_, occupant)| occupant.kind).collect()
    }

    pub fn snapshot(&self) -> FieldSnapshot {
        FieldSnapshot {
            depth: self.depth,
            width: self.width,
            cells: self.cells.iter().map(|cell| cell.map(|o| o.kind)).collect(),
        }
    }
}

/// Kinds of the occupied cells at one point in time, row-major
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSnapshot {
    pub depth: i32,
    pub width: i32,
    pub cells: Vec<Option<Kind>>,
}

impl FieldSnapshot {
    pub fn kind_at(&self, loc: Location) -> Option<Kind> {
        if loc.row < 0 || loc.row >= self.depth || loc.col < 0 || loc.col >= self.width {
            return None;
        }
        self.cells[loc.row as usize * self.width as usize + loc.col as usize]
    }

    pub fn counts(&self) -> PopulationCounts {
        self.cells.iter().flatten().copied().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn occupant(id: u64, kind: Kind) -> Occupant {
        Occupant {
            id: AnimalId(id),
            kind,
        }
    }

    #[test]
    fn test_field_creation() {
        let field = Field::new(4, 6);
        assert_eq!(field.depth(), 4);
        assert_eq!(field.width(), 6);
        assert_eq!(field.cells.len(), 24);
        assert_eq!(field.occupied_count(), 0);
    }

    #[test]
    fn test_place_get_and_clear() {
        let mut field = Field::new(3, 3);
        let loc = Location::new(1, 2);

        assert_eq!(field.place(occupant(1, Kind::Prey), loc).unwrap(), None);
        assert_eq!(field.get(loc).unwrap(), Some(occupant(1, Kind::Prey)));
        assert!(!field.is_free(loc).unwrap());

        assert_eq!(field.clear_location(loc).unwrap(), Some(occupant(1, Kind::Prey)));
        assert_eq!(field.clear_location(loc).unwrap(), None);
        assert!(field.is_free(loc).unwrap());
    }

    #[test]
    fn test_place_overwrites_and_returns_previous() {
        let mut field = Field::new(2, 2);
        let loc = Location::new(0, 0);
        field.place(occupant(1, Kind::Prey), loc).unwrap();
        let displaced = field.place(occupant(2, Kind::Predator), loc).unwrap();
        assert_eq!(displaced, Some(occupant(1, Kind::Prey)));
        assert_eq!(field.get(loc).unwrap().map(|o| o.id), Some(AnimalId(2)));
    }

    #[test]
    fn test_out_of_bounds() {
        let mut field = Field::new(3, 4);
        for loc in [
            Location::new(-1, 0),
            Location::new(0, -1),
            Location::new(3, 0),
            Location::new(0, 4),
        ] {
            assert!(matches!(field.get(loc), Err(Error::OutOfBounds { .. })));
            assert!(field.place(occupant(1, Kind::Prey), loc).is_err());
            assert!(field.clear_location(loc).is_err());
        }
    }

    #[test]
    fn test_adjacent_locations() {
        let field = Field::new(5, 5);
        assert_eq!(field.adjacent_locations(Location::new(2, 2)).len(), 8);
        assert_eq!(field.adjacent_locations(Location::new(0, 0)).len(), 3);
        assert_eq!(field.adjacent_locations(Location::new(0, 2)).len(), 5);

        let corner = field.adjacent_locations(Location::new(4, 4));
        assert_eq!(
            corner,
            vec![Location::new(3, 3), Location::new(3, 4), Location::new(4, 3)]
        );
    }

    #[test]
    fn test_single_cell_field_has_no_neighbours() {
        let field = Field::new(1, 1);
        assert!(field.adjacent_locations(Location::new(0, 0)).is_empty());
    }

    #[test]
    fn test_shuffle_is_reproducible() {
        let field = Field::new(5, 5);
        let centre = Location::new(2, 2);
        let a = field.shuffled_adjacent_locations(centre, &mut ChaCha8Rng::seed_from_u64(9));
        let b = field.shuffled_adjacent_locations(centre, &mut ChaCha8Rng::seed_from_u64(9));
        assert_eq!(a, b);

        let mut sorted = a.clone();
        sorted.sort_by_key(|l| (l.row, l.col));
        assert_eq!(sorted, field.adjacent_locations(centre));
    }

    #[test]
    fn test_free_adjacent_location() {
        let mut field = Field::new(3, 3);
        let centre = Location::new(1, 1);
        let mut rng = ChaCha8Rng::seed_from_u64(1);

        let mut next_id = 0;
        for loc in field.adjacent_locations(centre) {
            if loc != Location::new(2, 0) {
                next_id += 1;
                field.place(occupant(next_id, Kind::Prey), loc).unwrap();
            }
        }

        assert_eq!(field.free_adjacent_location(centre, &mut rng), Some(Location::new(2, 0)));
        assert_eq!(field.free_adjacent_locations(centre, &mut rng), vec![Location::new(2, 0)]);

        field.place(occupant(99, Kind::Predator), Location::new(2, 0)).unwrap();
        assert_eq!(field.free_adjacent_location(centre, &mut rng), None);
        assert!(field.free_adjacent_locations(centre, &mut rng).is_empty());
    }

    #[test]
    fn test_first_free_respects_candidate_order() {
        let mut field = Field::new(3, 3);
        field.place(occupant(1, Kind::Prey), Location::new(0, 0)).unwrap();
        let candidates = [Location::new(0, 0), Location::new(2, 2), Location::new(0, 1)];
        assert_eq!(field.first_free(&candidates), Some(Location::new(2, 2)));
    }

    #[test]
    fn test_clear_empties_everything() {
        let mut field = Field::new(2, 3);
        for (i, loc) in field.locations().collect::<Vec<_>>().into_iter().enumerate() {
            field.place(occupant(i as u64, Kind::Prey), loc).unwrap();
        }
        assert_eq!(field.occupied_count(), 6);
        field.clear();
        assert_eq!(field.occupied_count(), 0);
    }

    #[test]
    fn test_locations_are_row_major() {
        let field = Field::new(2, 3);
        let locations: Vec<_> = field.locations().collect();
        assert_eq!(locations[0], Location::new(0, 0));
        assert_eq!(locations[2], Location::new(0, 2));
        assert_eq!(locations[3], Location::new(1, 0));
        assert_eq!(locations.len(), 6);
    }

    #[test]
    fn test_last_cell_of_a_narrow_field() {
        let mut field = Field::new(4_000, 2);
        let last = Location::new(3_999, 1);
        field.place(occupant(1, Kind::Prey), last).unwrap();
        assert_eq!(field.iter().next(), Some((last, occupant(1, Kind::Prey))));
        assert_eq!(field.snapshot().kind_at(last), Some(Kind::Prey));
    }

    #[test]
    fn test_counts_and_snapshot() {
        let mut field = Field::new(2, 2);
        field.place(occupant(1, Kind::Prey), Location::new(0, 0)).unwrap();
        field.place(occupant(2, Kind::Prey), Location::new(1, 0)).unwrap();
        field.place(occupant(3, Kind::Predator), Location::new(1, 1)).unwrap();

        let counts = field.counts();
        assert_eq!(counts.prey, 2);
        assert_eq!(counts.predators, 1);

        let snapshot = field.snapshot();
        assert_eq!(snapshot.kind_at(Location::new(0, 0)), Some(Kind::Prey));
        assert_eq!(snapshot.kind_at(Location::new(0, 1)), None);
        assert_eq!(snapshot.kind_at(Location::new(1, 1)), Some(Kind::Predator));
        assert_eq!(snapshot.kind_at(Location::new(5, 5)), None);
        assert_eq!(snapshot.counts(), counts);
    }
}
