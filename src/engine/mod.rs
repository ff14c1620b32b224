//! Move primitives over a grid, an inventory and a move history.
//!
//! [`ShuffleEngine`] borrows the three stores for the duration of a call. Each
//! primitive validates before touching state, applies the move, and appends one
//! [`CompoundMove`] to the history; a rejected move leaves all three unchanged.

mod apply;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{MoveError, ShuffleError, ShuffleResult};
use crate::grid::CoreGrid;
use crate::history::{CompoundMove, MoveHistory, MoveRecord, RedoBuffer};
use crate::inventory::{InventoryStore, SlotId};
use crate::position::{Direction, Position};

/// Description used for an assembly pushed out of a cell by a load.
#[must_use]
pub fn displacement_description(coordinate: &str) -> String {
    format!("extracted from pos. {coordinate}")
}

/// Where an assembly starts or ends a move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "at", content = "id", rename_all = "snake_case")]
pub enum Endpoint {
    /// A core cell.
    Core(Position),
    /// An inventory slot.
    Inventory(SlotId),
}

/// One assembly's journey during a move, enough to animate it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transition {
    /// Label of the assembly that moved.
    pub label: String,
    /// Start point.
    pub from: Endpoint,
    /// End point.
    pub to: Endpoint,
}

/// Result of a successful primitive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoveOutcome {
    /// The history entry that was appended.
    pub entry: CompoundMove,
    /// Assembly movements in the order they happened.
    pub transitions: Vec<Transition>,
}

impl MoveOutcome {
    /// Slot created by a removal, or by the displacement of a load.
    #[must_use]
    pub fn created_slot(&self) -> Option<SlotId> {
        self.entry.steps().find_map(|step| match step {
            MoveRecord::Remove { slot, .. } => Some(*slot),
            _ => None,
        })
    }

    /// The implicit removal performed by a load into an occupied cell.
    #[must_use]
    pub const fn displacement(&self) -> Option<&MoveRecord> {
        self.entry.displacement.as_ref()
    }
}

/// Applies every step of `entry` forwards, undoing completed steps if a later
/// one fails.
pub(crate) fn replay(
    grid: &mut CoreGrid,
    inventory: &mut InventoryStore,
    entry: &CompoundMove,
) -> ShuffleResult<Vec<Transition>> {
    let mut transitions = Vec::new();
    let mut done: Vec<&MoveRecord> = Vec::new();
    for step in entry.steps() {
        match apply::apply(grid, inventory, step) {
            Ok(t) => {
                transitions.extend(t);
                done.push(step);
            }
            Err(e) => {
                for step in done.into_iter().rev() {
                    apply::revert(grid, inventory, step)?;
                }
                return Err(e);
            }
        }
    }
    Ok(transitions)
}

/// Executes moves against one grid, inventory and history.
#[derive(Debug)]
pub struct ShuffleEngine<'a> {
    grid: &'a mut CoreGrid,
    inventory: &'a mut InventoryStore,
    history: &'a mut MoveHistory,
}

impl<'a> ShuffleEngine<'a> {
    /// Borrows the stores a move operates on.
    pub fn new(
        grid: &'a mut CoreGrid,
        inventory: &'a mut InventoryStore,
        history: &'a mut MoveHistory,
    ) -> Self {
        Self {
            grid,
            inventory,
            history,
        }
    }

    fn record(&mut self, entry: CompoundMove) -> ShuffleResult<MoveOutcome> {
        let transitions = replay(self.grid, self.inventory, &entry)?;
        self.history.push(entry.clone());
        Ok(MoveOutcome { entry, transitions })
    }

    /// Exchanges the assemblies at `a` and `b`.
    ///
    /// Both cells must hold an assembly.
    pub fn swap(&mut self, a: Position, b: Position) -> ShuffleResult<MoveOutcome> {
        self.grid.check_bounds(a)?;
        self.grid.check_bounds(b)?;
        if a == b {
            return Err(MoveError::InvalidMove {
                position: a,
                reason: format!("cannot swap {} with itself", self.grid.coordinate(a)),
            }
            .into());
        }
        self.grid.check_occupiable(a)?;
        self.grid.check_occupiable(b)?;

        debug!(
            a = %self.grid.coordinate(a),
            b = %self.grid.coordinate(b),
            "swap"
        );
        self.record(MoveRecord::Swap { a, b }.into())
    }

    /// Cycles the four cells of `pivot`'s rotation orbit one step.
    pub fn rotate(&mut self, pivot: Position, direction: Direction) -> ShuffleResult<MoveOutcome> {
        let orbit = apply::orbit_of(self.grid, pivot)?;
        debug!(
            pivot = %self.grid.coordinate(pivot),
            %direction,
            orbit = ?orbit,
            "rotate"
        );
        self.record(MoveRecord::Rotate { pivot, direction }.into())
    }

    /// Loads one assembly from `slot` into `dest`.
    ///
    /// If `dest` is occupied its assembly is first moved into a new inventory
    /// slot; the outcome's entry carries that removal as its displacement.
    pub fn load(&mut self, dest: Position, slot: SlotId) -> ShuffleResult<MoveOutcome> {
        self.grid.check_existent(dest)?;
        if self.inventory.get(slot).map_or(true, |item| item.quantity == 0) {
            return Err(MoveError::InsufficientInventory { slot }.into());
        }

        let primary = MoveRecord::Load { dest, slot };
        let entry = if self.grid.is_occupiable(dest) {
            let displaced = MoveRecord::Remove {
                src: dest,
                slot: SlotId::new(),
                description: displacement_description(&self.grid.coordinate(dest)),
            };
            CompoundMove::displacing(primary, displaced)
        } else {
            CompoundMove::single(primary)
        };

        debug!(
            dest = %self.grid.coordinate(dest),
            %slot,
            displacing = entry.displacement.is_some(),
            "load"
        );
        self.record(entry)
    }

    /// Moves the assembly at `src` into a new inventory slot.
    ///
    /// The new slot id is available from [`MoveOutcome::created_slot`].
    pub fn remove(&mut self, src: Position, description: &str) -> ShuffleResult<MoveOutcome> {
        self.grid.check_occupiable(src)?;
        let slot = SlotId::new();
        debug!(src = %self.grid.coordinate(src), %slot, description, "remove");
        self.record(
            MoveRecord::Remove {
                src,
                slot,
                description: description.to_string(),
            }
            .into(),
        )
    }

    /// Reverts every recorded move, newest first, and returns them as a redo
    /// buffer.
    ///
    /// Work happens on copies. The result replaces the live state only if it
    /// matches the baseline; otherwise the call fails with
    /// [`ShuffleError::Diverged`] and nothing changes.
    pub fn undo_all(
        &mut self,
        baseline_grid: &CoreGrid,
        baseline_inventory: &InventoryStore,
    ) -> ShuffleResult<RedoBuffer> {
        let mut grid = self.grid.clone();
        let mut inventory = self.inventory.clone();

        for entry in self.history.iter().rev() {
            for step in entry.steps().rev() {
                apply::revert(&mut grid, &mut inventory, step).map_err(|e| ShuffleError::Diverged {
                    position: grid.coordinate(step.anchor()),
                    expected: format!("a revertible {}", step.name()),
                    actual: e.to_string(),
                })?;
            }
        }
        grid.reset_moved();

        if let Some((pos, expected, actual)) = grid.first_difference(baseline_grid) {
            return Err(ShuffleError::Diverged {
                position: grid.coordinate(pos),
                expected,
                actual,
            });
        }
        if let Some((position, expected, actual)) = inventory.first_difference(baseline_inventory) {
            return Err(ShuffleError::Diverged {
                position,
                expected,
                actual,
            });
        }

        *self.grid = grid;
        *self.inventory = inventory;
        Ok(RedoBuffer::new(self.history.take()))
    }

    /// Re-applies `buffer` in its original order and appends it to the history.
    ///
    /// Applied to copies first; if any record fails, nothing changes.
    pub fn redo(&mut self, buffer: &RedoBuffer) -> ShuffleResult<Vec<MoveOutcome>> {
        let mut grid = self.grid.clone();
        let mut inventory = self.inventory.clone();
        let mut outcomes = Vec::with_capacity(buffer.len());

        for entry in buffer.iter() {
            let transitions = replay(&mut grid, &mut inventory, entry)?;
            outcomes.push(MoveOutcome {
                entry: entry.clone(),
                transitions,
            });
        }

        *self.grid = grid;
        *self.inventory = inventory;
        self.history.extend(outcomes.iter().map(|o| o.entry.clone()));
        Ok(outcomes)
    }
}
