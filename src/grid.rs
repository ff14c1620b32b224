//! The core grid.
//!
//! A [`CoreGrid`] is a rectangular bounding box of cells. Which cells exist is
//! fixed by the shape; existent cells are either empty or hold one assembly.
//! Nothing can make an absent cell existent or an existent cell absent.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::assembly::Assembly;
use crate::error::MoveError;
use crate::position::Position;
use crate::shape::{CellSpec, ShapeConfig};

/// Content of one grid cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "assembly", rename_all = "snake_case")]
pub enum Cell {
    /// Not part of the core.
    Absent,
    /// Part of the core, no fuel.
    Empty,
    /// Part of the core, holding an assembly.
    Loaded(Assembly),
}

impl Cell {
    /// Returns true if the cell exists in the core.
    #[must_use]
    pub const fn exists(&self) -> bool {
        !matches!(self, Self::Absent)
    }

    /// Returns the assembly held by the cell.
    #[must_use]
    pub const fn assembly(&self) -> Option<&Assembly> {
        match self {
            Self::Loaded(a) => Some(a),
            _ => None,
        }
    }

    /// Returns the assembly held by the cell, mutably.
    pub fn assembly_mut(&mut self) -> Option<&mut Assembly> {
        match self {
            Self::Loaded(a) => Some(a),
            _ => None,
        }
    }

    /// Returns true if the cell exists and holds nothing.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    fn label(&self) -> &str {
        match self {
            Self::Absent => "<absent>",
            Self::Empty => "<empty>",
            Self::Loaded(a) => &a.label,
        }
    }
}

impl From<&CellSpec> for Cell {
    fn from(spec: &CellSpec) -> Self {
        match spec {
            CellSpec::Absent => Self::Absent,
            CellSpec::Empty => Self::Empty,
            CellSpec::Fuel { label, enrichment } => Self::Loaded(Assembly::new(label.clone(), *enrichment)),
        }
    }
}

/// A core loading: one shape plus the content of every cell.
#[derive(Debug, Clone, PartialEq)]
pub struct CoreGrid {
    shape: Arc<ShapeConfig>,
    cells: Vec<Cell>,
}

impl CoreGrid {
    /// Creates a grid holding the shape's starting assemblies.
    #[must_use]
    pub fn with_shape(shape: Arc<ShapeConfig>) -> Self {
        let cells = shape.cells().iter().map(Cell::from).collect();
        Self { shape, cells }
    }

    /// The shape this grid was built from.
    #[must_use]
    pub fn shape(&self) -> &ShapeConfig {
        &self.shape
    }

    /// Shared handle to the shape.
    #[must_use]
    pub fn shape_handle(&self) -> Arc<ShapeConfig> {
        Arc::clone(&self.shape)
    }

    /// Bounding-box width.
    #[must_use]
    pub fn width(&self) -> usize {
        self.shape.width()
    }

    /// Bounding-box height.
    #[must_use]
    pub fn height(&self) -> usize {
        self.shape.height()
    }

    /// Returns true if `pos` lies in the bounding box.
    #[must_use]
    pub fn in_bounds(&self, pos: Position) -> bool {
        self.shape.in_bounds(pos)
    }

    /// Returns true if `pos` is an existent cell.
    #[must_use]
    pub fn exists(&self, pos: Position) -> bool {
        self.index(pos).is_some_and(|i| self.cells[i].exists())
    }

    /// Fails with `OutOfBounds` unless `pos` lies in the bounding box.
    pub fn check_bounds(&self, pos: Position) -> Result<(), MoveError> {
        if self.in_bounds(pos) {
            Ok(())
        } else {
            Err(MoveError::OutOfBounds {
                position: pos,
                width: self.width(),
                height: self.height(),
            })
        }
    }

    /// Fails unless `pos` is in bounds and existent.
    pub fn check_existent(&self, pos: Position) -> Result<(), MoveError> {
        self.check_bounds(pos)?;
        if self.exists(pos) {
            Ok(())
        } else {
            Err(MoveError::InvalidMove {
                position: pos,
                reason: format!("{} is not part of this core", self.coordinate(pos)),
            })
        }
    }

    /// Returns true if `pos` is in bounds, exists and holds an assembly.
    #[must_use]
    pub fn is_occupiable(&self, pos: Position) -> bool {
        self.assembly(pos).is_some()
    }

    /// Fails unless `pos` is in bounds, existent and loaded.
    pub fn check_occupiable(&self, pos: Position) -> Result<(), MoveError> {
        self.check_existent(pos)?;
        if self.is_occupiable(pos) {
            Ok(())
        } else {
            Err(MoveError::InvalidMove {
                position: pos,
                reason: format!("{} is empty", self.coordinate(pos)),
            })
        }
    }

    fn index(&self, pos: Position) -> Option<usize> {
        self.in_bounds(pos).then(|| pos.y * self.width() + pos.x)
    }

    /// Content of `pos`.
    pub fn get(&self, pos: Position) -> Result<&Cell, MoveError> {
        self.check_bounds(pos)?;
        self.index(pos)
            .and_then(|i| self.cells.get(i))
            .ok_or(MoveError::OutOfBounds {
                position: pos,
                width: self.width(),
                height: self.height(),
            })
    }

    /// Assembly at `pos`, if any.
    #[must_use]
    pub fn assembly(&self, pos: Position) -> Option<&Assembly> {
        self.index(pos).and_then(|i| self.cells[i].assembly())
    }

    /// Assembly at `pos`, mutably.
    pub fn assembly_mut(&mut self, pos: Position) -> Option<&mut Assembly> {
        let index = self.index(pos)?;
        self.cells[index].assembly_mut()
    }

    /// Replaces the content of an existent cell, returning the previous content.
    ///
    /// Writing `Absent`, or writing to an absent cell, is rejected.
    pub fn set(&mut self, pos: Position, cell: Cell) -> Result<Cell, MoveError> {
        self.check_existent(pos)?;
        if !cell.exists() {
            return Err(MoveError::InvalidMove {
                position: pos,
                reason: format!("cannot remove {} from the core", self.coordinate(pos)),
            });
        }
        let index = pos.y * self.width() + pos.x;
        Ok(std::mem::replace(&mut self.cells[index], cell))
    }

    /// Empties an existent cell, returning the assembly it held.
    pub fn take(&mut self, pos: Position) -> Result<Option<Assembly>, MoveError> {
        match self.set(pos, Cell::Empty)? {
            Cell::Loaded(a) => Ok(Some(a)),
            _ => Ok(None),
        }
    }

    /// Exchanges the content of two existent cells.
    pub(crate) fn swap_cells(&mut self, a: Position, b: Position) -> Result<(), MoveError> {
        self.check_existent(a)?;
        self.check_existent(b)?;
        let ia = a.y * self.width() + a.x;
        let ib = b.y * self.width() + b.x;
        self.cells.swap(ia, ib);
        Ok(())
    }

    /// Operator coordinate of `pos`.
    #[must_use]
    pub fn coordinate(&self, pos: Position) -> String {
        self.shape.coordinate(pos)
    }

    /// Label of the assembly at `pos`, or a placeholder for empty and absent cells.
    #[must_use]
    pub fn label_at(&self, pos: Position) -> String {
        self.index(pos)
            .map_or_else(|| "<out of bounds>".to_string(), |i| self.cells[i].label().to_string())
    }

    /// All positions, row-major.
    pub fn positions(&self) -> impl Iterator<Item = Position> + '_ {
        let width = self.width();
        (0..self.cells.len()).map(move |i| Position::new(i % width, i / width))
    }

    /// Cells with their positions, row-major.
    pub fn cells(&self) -> impl Iterator<Item = (Position, &Cell)> {
        self.positions().zip(self.cells.iter())
    }

    /// Existent cells that hold no assembly, row-major.
    #[must_use]
    pub fn empty_positions(&self) -> Vec<Position> {
        self.cells()
            .filter(|(_, cell)| cell.is_empty())
            .map(|(pos, _)| pos)
            .collect()
    }

    /// Returns true if every existent cell holds an assembly.
    #[must_use]
    pub fn is_fully_loaded(&self) -> bool {
        !self.cells.iter().any(Cell::is_empty)
    }

    /// Loaded assemblies with their positions.
    pub fn assemblies(&self) -> impl Iterator<Item = (Position, &Assembly)> {
        self.cells()
            .filter_map(|(pos, cell)| cell.assembly().map(|a| (pos, a)))
    }

    /// Loaded assemblies with their positions, mutably.
    pub fn assemblies_mut(&mut self) -> impl Iterator<Item = (Position, &mut Assembly)> {
        let width = self.width();
        self.cells
            .iter_mut()
            .enumerate()
            .filter_map(move |(i, cell)| {
                cell.assembly_mut()
                    .map(|a| (Position::new(i % width, i / width), a))
            })
    }

    /// Clears every `moved` flag.
    pub fn reset_moved(&mut self) {
        for (_, assembly) in self.assemblies_mut() {
            assembly.moved = false;
        }
    }

    /// Number of loaded assemblies.
    #[must_use]
    pub fn loaded_count(&self) -> usize {
        self.cells.iter().filter(|c| c.assembly().is_some()).count()
    }

    /// Compares two grids cell by cell, treating assemblies as equal when they
    /// are the same fuel. Returns the first mismatch.
    #[must_use]
    pub fn first_difference(&self, other: &Self) -> Option<(Position, String, String)> {
        if self.width() != other.width() || self.height() != other.height() {
            return Some((
                Position::new(0, 0),
                format!("{}x{}", other.width(), other.height()),
                format!("{}x{}", self.width(), self.height()),
            ));
        }
        self.cells().zip(other.cells.iter()).find_map(|((pos, mine), theirs)| {
            let actual = match (mine, theirs) {
                (Cell::Loaded(a), Cell::Loaded(b)) if a.is_same_fuel(b) => return None,
                (Cell::Loaded(a), Cell::Loaded(b)) if a.label == b.label => {
                    let fields: Vec<_> = a
                        .differences(b)
                        .into_iter()
                        .filter(|f| *f != "moved")
                        .collect();
                    format!("{} ({} differ)", a.label, fields.join(", "))
                }
                (a, b) if a == b => return None,
                _ => mine.label().to_string(),
            };
            Some((pos, theirs.label().to_string(), actual))
        })
    }

    /// Hex-encoded BLAKE3 digest of the loading pattern.
    ///
    /// Covers the shape name, cell kinds, labels, enrichment and burnup, but not
    /// `moved` flags.
    #[must_use]
    pub fn fingerprint(&self) -> String {
        let mut hasher = blake3::Hasher::new();
        hasher.update(self.shape.name().as_bytes());
        for cell in &self.cells {
            match cell {
                Cell::Absent => {
                    hasher.update(&[0]);
                }
                Cell::Empty => {
                    hasher.update(&[1]);
                }
                Cell::Loaded(a) => {
                    hasher.update(&[2]);
                    hasher.update(&(a.label.len() as u64).to_le_bytes());
                    hasher.update(a.label.as_bytes());
                    hasher.update(&a.enrichment.to_le_bytes());
                    for b in a.burnup {
                        hasher.update(&b.to_le_bytes());
                    }
                }
            }
        }
        hasher.finalize().to_hex().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::position::AxisLabels;

    fn square() -> CoreGrid {
        let shape = ShapeConfig::from_map("mini", "* *\n* _", AxisLabels::default(), None).unwrap();
        CoreGrid::with_shape(Arc::new(shape))
    }

    fn holed() -> CoreGrid {
        let shape = ShapeConfig::from_map("holed", "* .\n* *", AxisLabels::default(), None).unwrap();
        CoreGrid::with_shape(Arc::new(shape))
    }

    #[test]
    fn starts_from_shape() {
        let grid = square();
        assert_eq!(grid.loaded_count(), 3);
        assert_eq!(grid.empty_positions(), vec![Position::new(1, 1)]);
        assert_eq!(grid.label_at(Position::new(0, 0)), "B1");
        assert!(!grid.is_fully_loaded());
    }

    #[test]
    fn get_checks_bounds() {
        let grid = square();
        assert!(matches!(
            grid.get(Position::new(2, 0)),
            Err(MoveError::OutOfBounds { width: 2, height: 2, .. })
        ));
        assert!(grid.get(Position::new(1, 1)).unwrap().is_empty());
    }

    #[test]
    fn occupiable_needs_an_assembly() {
        let grid = holed();
        assert!(grid.is_occupiable(Position::new(0, 0)));
        assert!(!grid.is_occupiable(Position::new(1, 0)));
        assert!(!grid.is_occupiable(Position::new(5, 5)));
        assert!(matches!(
            grid.check_occupiable(Position::new(5, 5)),
            Err(MoveError::OutOfBounds { .. })
        ));
        assert!(matches!(
            grid.check_occupiable(Position::new(1, 0)),
            Err(MoveError::InvalidMove { .. })
        ));

        let grid = square();
        assert!(matches!(
            grid.check_occupiable(Position::new(1, 1)),
            Err(MoveError::InvalidMove { .. })
        ));
    }

    #[test]
    fn set_never_changes_existence() {
        let mut grid = holed();
        let absent = Position::new(1, 0);
        assert!(matches!(
            grid.set(absent, Cell::Empty),
            Err(MoveError::InvalidMove { .. })
        ));
        assert!(matches!(
            grid.set(Position::new(0, 0), Cell::Absent),
            Err(MoveError::InvalidMove { .. })
        ));
        assert!(!grid.exists(absent));

        let previous = grid
            .set(Position::new(0, 0), Cell::Loaded(Assembly::new("X", 1.6)))
            .unwrap();
        assert_eq!(previous.assembly().unwrap().label, "B1");
    }

    #[test]
    fn take_empties_cell() {
        let mut grid = square();
        let taken = grid.take(Position::new(1, 0)).unwrap().unwrap();
        assert_eq!(taken.label, "A1");
        assert!(grid.get(Position::new(1, 0)).unwrap().is_empty());
        assert_eq!(grid.take(Position::new(1, 0)).unwrap(), None);
    }

    #[test]
    fn swap_cells_exchanges_content() {
        let mut grid = square();
        grid.swap_cells(Position::new(0, 0), Position::new(1, 1)).unwrap();
        assert!(grid.get(Position::new(0, 0)).unwrap().is_empty());
        assert_eq!(grid.label_at(Position::new(1, 1)), "B1");
    }

    #[test]
    fn reset_moved_clears_flags() {
        let mut grid = square();
        for (_, a) in grid.assemblies_mut() {
            a.moved = true;
        }
        grid.reset_moved();
        assert!(grid.assemblies().all(|(_, a)| !a.moved));
    }

    #[test]
    fn fingerprint_ignores_moved_but_not_layout() {
        let grid = square();
        let mut flagged = grid.clone();
        for (_, a) in flagged.assemblies_mut() {
            a.moved = true;
        }
        assert_eq!(grid.fingerprint(), flagged.fingerprint());
        assert_eq!(grid.fingerprint().len(), 64);

        let mut swapped = grid.clone();
        swapped.swap_cells(Position::new(0, 0), Position::new(1, 0)).unwrap();
        assert_ne!(grid.fingerprint(), swapped.fingerprint());
    }

    #[test]
    fn first_difference_uses_same_fuel() {
        let grid = square();
        let mut flagged = grid.clone();
        for (_, a) in flagged.assemblies_mut() {
            a.moved = true;
        }
        assert_eq!(flagged.first_difference(&grid), None);

        let mut swapped = grid.clone();
        swapped.swap_cells(Position::new(0, 0), Position::new(1, 0)).unwrap();
        let (pos, expected, actual) = swapped.first_difference(&grid).unwrap();
        assert_eq!(pos, Position::new(0, 0));
        assert_eq!(expected, "B1");
        assert_eq!(actual, "A1");

        let mut leaking = grid.clone();
        leaking.assembly_mut(Position::new(0, 1)).unwrap().suspected_leaking = true;
        let (pos, expected, actual) = leaking.first_difference(&grid).unwrap();
        assert_eq!(pos, Position::new(0, 1));
        assert_eq!(actual, format!("{expected} (suspected_leaking differ)"));
    }
}
