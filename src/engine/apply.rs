//! Record-level mutation: apply a move record forwards or backwards.
//!
//! These functions trust that the public primitives validated the move, but still
//! refuse anything that would break a grid or inventory invariant.

use crate::error::{MoveError, ShuffleError, ShuffleResult};
use crate::grid::{Cell, CoreGrid};
use crate::history::MoveRecord;
use crate::inventory::{InventoryItem, InventoryStore};
use crate::position::{Direction, Position};

use super::{Endpoint, Transition};

/// Rotation orbit of `pivot`, rejecting shapes without a quarter turn and
/// degenerate (centre) orbits.
pub(super) fn orbit_of(grid: &CoreGrid, pivot: Position) -> Result<[Position; 4], MoveError> {
    grid.check_bounds(pivot)?;
    let shape = grid.shape();
    if !shape.supports_rotation() {
        return Err(MoveError::UnsupportedOperation {
            operation: "rotate".to_string(),
            reason: format!(
                "shape '{}' ({}x{}) has no quarter-turn symmetry",
                shape.name(),
                shape.width(),
                shape.height()
            ),
        });
    }
    grid.check_existent(pivot)?;
    let orbit = shape.orbit(pivot).ok_or_else(|| MoveError::UnsupportedOperation {
        operation: "rotate".to_string(),
        reason: format!("no rotation orbit through {}", grid.coordinate(pivot)),
    })?;
    if orbit[1] == pivot {
        return Err(MoveError::InvalidMove {
            position: pivot,
            reason: format!("{} is the centre of rotation", grid.coordinate(pivot)),
        });
    }
    for pos in orbit {
        grid.check_existent(pos)?;
    }
    Ok(orbit)
}

fn cycle(grid: &mut CoreGrid, orbit: &[Position; 4], direction: Direction) -> ShuffleResult<Vec<Transition>> {
    let mut old = Vec::with_capacity(4);
    for pos in orbit {
        old.push(grid.get(*pos)?.clone());
    }

    let mut transitions = Vec::new();
    for (i, cell) in old.into_iter().enumerate() {
        let from = orbit[i];
        let to = orbit[direction.advance(i, orbit.len())];
        let cell = match cell {
            Cell::Loaded(mut assembly) => {
                transitions.push(Transition {
                    label: assembly.label.clone(),
                    from: Endpoint::Core(from),
                    to: Endpoint::Core(to),
                });
                assembly.moved = true;
                Cell::Loaded(assembly)
            }
            other => other,
        };
        grid.set(to, cell)?;
    }
    Ok(transitions)
}

fn swap(grid: &mut CoreGrid, a: Position, b: Position) -> ShuffleResult<Vec<Transition>> {
    let mut transitions = Vec::with_capacity(2);
    for (from, to) in [(a, b), (b, a)] {
        if let Some(assembly) = grid.assembly(from) {
            transitions.push(Transition {
                label: assembly.label.clone(),
                from: Endpoint::Core(from),
                to: Endpoint::Core(to),
            });
        }
    }
    grid.swap_cells(a, b)?;
    for pos in [a, b] {
        if let Some(assembly) = grid.assembly_mut(pos) {
            assembly.moved = true;
        }
    }
    Ok(transitions)
}

/// Applies one record forwards.
pub(super) fn apply(
    grid: &mut CoreGrid,
    inventory: &mut InventoryStore,
    record: &MoveRecord,
) -> ShuffleResult<Vec<Transition>> {
    match record {
        MoveRecord::Swap { a, b } => {
            grid.check_occupiable(*a)?;
            grid.check_occupiable(*b)?;
            swap(grid, *a, *b)
        }
        MoveRecord::Rotate { pivot, direction } => {
            let orbit = orbit_of(grid, *pivot)?;
            cycle(grid, &orbit, *direction)
        }
        MoveRecord::Load { dest, slot } => {
            if !grid.get(*dest)?.is_empty() {
                return Err(MoveError::InvalidMove {
                    position: *dest,
                    reason: format!("{} is not empty", grid.coordinate(*dest)),
                }
                .into());
            }
            let mut assembly = inventory.take_one(*slot)?;
            assembly.moved = true;
            let transition = Transition {
                label: assembly.label.clone(),
                from: Endpoint::Inventory(*slot),
                to: Endpoint::Core(*dest),
            };
            grid.set(*dest, Cell::Loaded(assembly))?;
            Ok(vec![transition])
        }
        MoveRecord::Remove {
            src,
            slot,
            description,
        } => {
            grid.check_occupiable(*src)?;
            if inventory.contains(*slot) {
                return Err(MoveError::InvalidMove {
                    position: *src,
                    reason: format!("inventory slot {slot} already exists"),
                }
                .into());
            }
            let mut assembly = grid
                .take(*src)?
                .ok_or_else(|| ShuffleError::internal("occupied cell yielded no assembly"))?;
            assembly.moved = false;
            let transition = Transition {
                label: assembly.label.clone(),
                from: Endpoint::Core(*src),
                to: Endpoint::Inventory(*slot),
            };
            inventory.insert_with_id(*slot, InventoryItem::new(assembly, 1, description.clone()))?;
            Ok(vec![transition])
        }
    }
}

/// Applies the structural inverse of one record.
pub(super) fn revert(
    grid: &mut CoreGrid,
    inventory: &mut InventoryStore,
    record: &MoveRecord,
) -> ShuffleResult<()> {
    match record {
        MoveRecord::Swap { a, b } => {
            grid.swap_cells(*a, *b)?;
        }
        MoveRecord::Rotate { pivot, direction } => {
            let orbit = orbit_of(grid, *pivot)?;
            cycle(grid, &orbit, direction.inverse())?;
        }
        MoveRecord::Load { dest, slot } => {
            let assembly = grid.assembly(*dest).cloned().ok_or_else(|| {
                ShuffleError::internal(format!(
                    "cannot unload {}: cell is empty",
                    grid.coordinate(*dest)
                ))
            })?;
            inventory.restock(*slot, &assembly)?;
            grid.take(*dest)?;
        }
        MoveRecord::Remove { src, slot, .. } => {
            if !grid.get(*src)?.is_empty() {
                return Err(ShuffleError::internal(format!(
                    "cannot return slot {slot} to {}: cell is occupied",
                    grid.coordinate(*src)
                )));
            }
            let item = inventory
                .remove_slot(*slot)
                .ok_or_else(|| ShuffleError::internal(format!("unknown inventory slot {slot}")))?;
            grid.set(*src, Cell::Loaded(item.assembly))?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::position::AxisLabels;
    use crate::shape::{CellSpec, ShapeConfig};

    fn abcd() -> CoreGrid {
        let fuel = |l: &str| CellSpec::Fuel {
            label: l.to_string(),
            enrichment: 3.2,
        };
        let shape = ShapeConfig::from_rows(
            "abcd",
            vec![vec![fuel("A"), fuel("B")], vec![fuel("C"), fuel("D")]],
            AxisLabels::default(),
            None,
        )
        .unwrap();
        CoreGrid::with_shape(Arc::new(shape))
    }

    #[test]
    fn cycle_and_inverse_restore_layout() {
        let mut grid = abcd();
        let before = grid.clone();
        let orbit = orbit_of(&grid, Position::new(0, 0)).unwrap();
        let transitions = cycle(&mut grid, &orbit, Direction::Clockwise).unwrap();
        assert_eq!(transitions.len(), 4);
        assert_eq!(grid.label_at(Position::new(0, 0)), "C");
        cycle(&mut grid, &orbit, Direction::CounterClockwise).unwrap();
        assert_eq!(grid.first_difference(&before), None);
    }

    #[test]
    fn swap_marks_both_moved() {
        let mut grid = abcd();
        let record = MoveRecord::Swap {
            a: Position::new(0, 0),
            b: Position::new(1, 1),
        };
        let mut inventory = InventoryStore::new();
        apply(&mut grid, &mut inventory, &record).unwrap();
        assert!(grid.assembly(Position::new(0, 0)).unwrap().moved);
        assert!(grid.assembly(Position::new(1, 1)).unwrap().moved);
        assert!(!grid.assembly(Position::new(1, 0)).unwrap().moved);
    }

    #[test]
    fn remove_into_live_slot_is_rejected() {
        let mut grid = abcd();
        let mut inventory = InventoryStore::new();
        let slot = inventory
            .add_item(crate::assembly::Assembly::new("3.2", 3.2), 1, "spare")
            .unwrap();
        let before = grid.clone();
        let record = MoveRecord::Remove {
            src: Position::new(0, 0),
            slot,
            description: "out".to_string(),
        };

        let err = apply(&mut grid, &mut inventory, &record).unwrap_err();
        assert!(err.is_recoverable());
        assert!(matches!(err.as_move(), Some(MoveError::InvalidMove { .. })));
        assert_eq!(grid, before);
        assert_eq!(inventory.len(), 1);
    }
}
