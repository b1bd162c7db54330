//! Occupancy grid over the continuous plane.
//!
//! Every cell covers one unit square `[floor(x), floor(x) + 1) x [floor(y), floor(y) + 1)`.
//! A cell is empty, holds a single resident, or holds a [`Holder`] when two or
//! more residents share it. A holder never survives with fewer than two members.

use crate::error::BoundsError;
use oxyworld_data::EntityKind;
use serde::{Deserialize, Serialize};

/// Identity of something that can sit in a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Resident {
    Agent(u32),
    Food(u32),
}

impl Resident {
    #[must_use]
    pub fn kind(&self) -> EntityKind {
        match self {
            Resident::Agent(_) => EntityKind::Agent,
            Resident::Food(_) => EntityKind::Food,
        }
    }

    #[must_use]
    pub fn id(&self) -> u32 {
        match self {
            Resident::Agent(id) | Resident::Food(id) => *id,
        }
    }
}

/// Collision proxy for two or more residents sharing one cell.
#[derive(Debug, Clone, PartialEq)]
pub struct Holder {
    pub cell: (u32, u32),
    members: Vec<Resident>,
}

impl Holder {
    fn pair(cell: (u32, u32), first: Resident, second: Resident) -> Self {
        Self {
            cell,
            members: vec![first, second],
        }
    }

    #[must_use]
    pub fn members(&self) -> &[Resident] {
        &self.members
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    #[must_use]
    pub fn contains(&self, resident: Resident) -> bool {
        self.members.contains(&resident)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Occupant {
    Single(Resident),
    Holder(Holder),
}

impl Occupant {
    #[must_use]
    pub fn contains(&self, resident: Resident) -> bool {
        match self {
            Occupant::Single(r) => *r == resident,
            Occupant::Holder(h) => h.contains(resident),
        }
    }

    #[must_use]
    pub fn residents(&self) -> Vec<Resident> {
        match self {
            Occupant::Single(r) => vec![*r],
            Occupant::Holder(h) => h.members.clone(),
        }
    }
}

/// Result of a `move` or `copy` that succeeded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relocation {
    /// Source and destination share a cell; nothing changed.
    SameCell,
    Relocated,
    /// The resident was not found at its source cell and was only placed at the destination.
    Restored,
}

#[derive(Debug, Clone)]
pub struct Grid {
    width: u32,
    height: u32,
    cells: Vec<Option<Occupant>>,
}

impl Grid {
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            cells: vec![None; width as usize * height as usize],
        }
    }

    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Rejects coordinates outside the open interval `(0, width) x (0, height)`.
    pub fn validate(&self, x: f64, y: f64) -> Result<(), BoundsError> {
        let inside = x > 0.0
            && y > 0.0
            && x < f64::from(self.width)
            && y < f64::from(self.height);
        if inside {
            Ok(())
        } else {
            Err(BoundsError {
                x,
                y,
                width: self.width,
                height: self.height,
            })
        }
    }

    /// Cell coordinates of a validated position.
    #[must_use]
    pub fn cell_of(x: f64, y: f64) -> (u32, u32) {
        (x.floor() as u32, y.floor() as u32)
    }

    fn idx(&self, x: f64, y: f64) -> usize {
        let (cx, cy) = Self::cell_of(x, y);
        cy as usize * self.width as usize + cx as usize
    }

    #[must_use]
    pub fn cell(&self, x: f64, y: f64) -> Option<&Occupant> {
        self.validate(x, y).ok()?;
        self.cells[self.idx(x, y)].as_ref()
    }

    #[must_use]
    pub fn contains(&self, x: f64, y: f64, resident: Resident) -> bool {
        self.cell(x, y).is_some_and(|o| o.contains(resident))
    }

    /// Adds `resident` to the cell at `(x, y)`, growing or creating a holder on collision.
    pub fn place(&mut self, resident: Resident, x: f64, y: f64) -> Result<(), BoundsError> {
        self.validate(x, y)?;
        let idx = self.idx(x, y);
        self.insert_at(idx, resident);
        Ok(())
    }

    /// Removes `resident` from the cell at `(x, y)`. Returns whether it was present.
    pub fn clear(&mut self, resident: Resident, x: f64, y: f64) -> Result<bool, BoundsError> {
        self.validate(x, y)?;
        let idx = self.idx(x, y);
        Ok(self.remove_at(idx, resident))
    }

    /// Relocates `resident` between cells. No-op when both positions share a cell.
    pub fn move_resident(
        &mut self,
        resident: Resident,
        from: (f64, f64),
        to: (f64, f64),
    ) -> Result<Relocation, BoundsError> {
        self.validate(from.0, from.1)?;
        self.validate(to.0, to.1)?;
        let from_idx = self.idx(from.0, from.1);
        let to_idx = self.idx(to.0, to.1);
        if from_idx == to_idx {
            return Ok(Relocation::SameCell);
        }
        let found = self.remove_at(from_idx, resident);
        self.insert_at(to_idx, resident);
        if found {
            Ok(Relocation::Relocated)
        } else {
            tracing::warn!(?resident, from = ?from, "Resident missing from its source cell");
            Ok(Relocation::Restored)
        }
    }

    /// Like [`Grid::move_resident`] but leaves the origin occupant in place.
    pub fn copy_resident(
        &mut self,
        resident: Resident,
        from: (f64, f64),
        to: (f64, f64),
    ) -> Result<Relocation, BoundsError> {
        self.validate(from.0, from.1)?;
        self.validate(to.0, to.1)?;
        let from_idx = self.idx(from.0, from.1);
        let to_idx = self.idx(to.0, to.1);
        if from_idx == to_idx {
            return Ok(Relocation::SameCell);
        }
        let already_there = self.cells[to_idx]
            .as_ref()
            .is_some_and(|o| o.contains(resident));
        if !already_there {
            self.insert_at(to_idx, resident);
        }
        Ok(Relocation::Relocated)
    }

    fn insert_at(&mut self, idx: usize, resident: Resident) {
        let cell = (idx as u32 % self.width, idx as u32 / self.width);
        let slot = &mut self.cells[idx];
        *slot = match slot.take() {
            None => Some(Occupant::Single(resident)),
            Some(Occupant::Single(existing)) => {
                Some(Occupant::Holder(Holder::pair(cell, existing, resident)))
            }
            Some(Occupant::Holder(mut holder)) => {
                holder.members.push(resident);
                Some(Occupant::Holder(holder))
            }
        };
    }

    fn remove_at(&mut self, idx: usize, resident: Resident) -> bool {
        let slot = &mut self.cells[idx];
        match slot.take() {
            None => false,
            Some(Occupant::Single(existing)) if existing == resident => true,
            Some(Occupant::Single(existing)) => {
                *slot = Some(Occupant::Single(existing));
                false
            }
            Some(Occupant::Holder(mut holder)) => {
                let found = match holder.members.iter().position(|r| *r == resident) {
                    Some(pos) => {
                        holder.members.swap_remove(pos);
                        true
                    }
                    None => false,
                };
                *slot = match holder.members.len() {
                    0 => None,
                    1 => Some(Occupant::Single(holder.members[0])),
                    _ => Some(Occupant::Holder(holder)),
                };
                found
            }
        }
    }

    /// Iterates over all non-empty cells.
    pub fn occupied(&self) -> impl Iterator<Item = &Occupant> {
        self.cells.iter().flatten()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_open_interval() {
        let grid = Grid::new(99, 99);
        assert!(grid.validate(0.0, 5.0).is_err());
        assert!(grid.validate(99.0, 5.0).is_err());
        assert!(grid.validate(5.0, 99.0).is_err());
        assert!(grid.validate(98.999, 0.001).is_ok());
    }

    #[test]
    fn test_place_creates_and_grows_holder() {
        let mut grid = Grid::new(10, 10);
        grid.place(Resident::Agent(1), 5.2, 5.7).unwrap();
        assert_eq!(grid.cell(5.9, 5.0), Some(&Occupant::Single(Resident::Agent(1))));

        grid.place(Resident::Food(1), 5.5, 5.5).unwrap();
        grid.place(Resident::Agent(2), 5.1, 5.1).unwrap();
        match grid.cell(5.0, 5.0) {
            Some(Occupant::Holder(h)) => {
                assert_eq!(h.len(), 3);
                assert_eq!(h.cell, (5, 5));
            }
            other => panic!("expected holder, got {other:?}"),
        }
    }

    #[test]
    fn test_holder_dissolves_to_single() {
        let mut grid = Grid::new(10, 10);
        grid.place(Resident::Agent(1), 2.5, 2.5).unwrap();
        grid.place(Resident::Agent(2), 2.5, 2.5).unwrap();
        assert!(grid.clear(Resident::Agent(1), 2.1, 2.1).unwrap());
        assert_eq!(grid.cell(2.5, 2.5), Some(&Occupant::Single(Resident::Agent(2))));
        assert!(grid.clear(Resident::Agent(2), 2.1, 2.1).unwrap());
        assert_eq!(grid.cell(2.5, 2.5), None);
    }

    #[test]
    fn test_move_same_cell_is_noop() {
        let mut grid = Grid::new(10, 10);
        grid.place(Resident::Agent(3), 4.1, 4.1).unwrap();
        let before = grid.clone().cells;
        let outcome = grid
            .move_resident(Resident::Agent(3), (4.1, 4.1), (4.9, 4.9))
            .unwrap();
        assert_eq!(outcome, Relocation::SameCell);
        assert_eq!(grid.cells, before);
    }

    #[test]
    fn test_move_out_of_holder() {
        let mut grid = Grid::new(10, 10);
        grid.place(Resident::Agent(1), 4.5, 4.5).unwrap();
        grid.place(Resident::Agent(2), 4.5, 4.5).unwrap();
        grid.move_resident(Resident::Agent(2), (4.5, 4.5), (6.5, 4.5))
            .unwrap();
        assert_eq!(grid.cell(4.5, 4.5), Some(&Occupant::Single(Resident::Agent(1))));
        assert_eq!(grid.cell(6.5, 4.5), Some(&Occupant::Single(Resident::Agent(2))));
    }

    #[test]
    fn test_move_rejects_boundary() {
        let mut grid = Grid::new(99, 99);
        grid.place(Resident::Agent(1), 0.5, 5.0).unwrap();
        let err = grid
            .move_resident(Resident::Agent(1), (0.5, 5.0), (0.0, 5.0))
            .unwrap_err();
        assert_eq!(err.x, 0.0);
        assert!(grid.contains(0.5, 5.0, Resident::Agent(1)));
    }

    #[test]
    fn test_copy_keeps_origin() {
        let mut grid = Grid::new(10, 10);
        grid.place(Resident::Agent(1), 1.5, 1.5).unwrap();
        grid.copy_resident(Resident::Agent(1), (1.5, 1.5), (2.5, 1.5))
            .unwrap();
        assert!(grid.contains(1.5, 1.5, Resident::Agent(1)));
        assert!(grid.contains(2.5, 1.5, Resident::Agent(1)));
    }

    #[test]
    fn test_move_missing_resident_is_restored() {
        let mut grid = Grid::new(10, 10);
        let outcome = grid
            .move_resident(Resident::Agent(9), (1.5, 1.5), (3.5, 3.5))
            .unwrap();
        assert_eq!(outcome, Relocation::Restored);
        assert!(grid.contains(3.5, 3.5, Resident::Agent(9)));
    }
}
