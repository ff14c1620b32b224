//! Move records and the per-cycle move history.
//!
//! Records name positions and inventory slots, never assemblies: replaying a
//! record against the state it was recorded on reproduces the move exactly, and
//! every record has an exact inverse.

use serde::{Deserialize, Serialize};

use crate::error::{ShuffleError, ShuffleResult};
use crate::inventory::SlotId;
use crate::position::{Direction, Position};

/// One primitive move.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum MoveRecord {
    /// Exchange the contents of two existent cells.
    Swap {
        /// First cell.
        a: Position,
        /// Second cell.
        b: Position,
    },
    /// Cycle the four cells of `pivot`'s rotation orbit.
    Rotate {
        /// Any cell of the orbit; the orbit is listed starting here.
        pivot: Position,
        /// Direction the contents travel.
        direction: Direction,
    },
    /// Copy one assembly from an inventory slot into an empty cell.
    Load {
        /// Destination cell.
        dest: Position,
        /// Slot drawn from.
        slot: SlotId,
    },
    /// Move the assembly at `src` into a new inventory slot.
    Remove {
        /// Source cell.
        src: Position,
        /// Slot created for the assembly.
        slot: SlotId,
        /// Description given to the new slot.
        description: String,
    },
}

impl MoveRecord {
    /// Short operation name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Swap { .. } => "swap",
            Self::Rotate { .. } => "rotate",
            Self::Load { .. } => "load",
            Self::Remove { .. } => "remove",
        }
    }

    /// The first core position the record touches.
    #[must_use]
    pub const fn anchor(&self) -> Position {
        match self {
            Self::Swap { a, .. } => *a,
            Self::Rotate { pivot, .. } => *pivot,
            Self::Load { dest, .. } => *dest,
            Self::Remove { src, .. } => *src,
        }
    }

    /// Inventory slot the record draws from or creates.
    #[must_use]
    pub const fn slot(&self) -> Option<SlotId> {
        match self {
            Self::Load { slot, .. } | Self::Remove { slot, .. } => Some(*slot),
            Self::Swap { .. } | Self::Rotate { .. } => None,
        }
    }
}

/// One operator action: a primary move and, for loads into an occupied cell,
/// the removal that made room.
///
/// The displacement is applied before the primary move and undone after it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompoundMove {
    /// The move the operator asked for.
    pub primary: MoveRecord,
    /// Removal performed first to empty the destination.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub displacement: Option<MoveRecord>,
}

impl CompoundMove {
    /// A move with no displacement.
    #[must_use]
    pub const fn single(primary: MoveRecord) -> Self {
        Self {
            primary,
            displacement: None,
        }
    }

    /// A move preceded by a displacing removal.
    #[must_use]
    pub const fn displacing(primary: MoveRecord, displacement: MoveRecord) -> Self {
        Self {
            primary,
            displacement: Some(displacement),
        }
    }

    /// Records in application order.
    pub fn steps(&self) -> impl DoubleEndedIterator<Item = &MoveRecord> {
        self.displacement.iter().chain(std::iter::once(&self.primary))
    }
}

impl From<MoveRecord> for CompoundMove {
    fn from(primary: MoveRecord) -> Self {
        Self::single(primary)
    }
}

/// Moves applied since the last committed baseline, oldest first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MoveHistory {
    moves: Vec<CompoundMove>,
}

impl MoveHistory {
    /// Creates an empty history.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a move.
    pub fn push(&mut self, entry: CompoundMove) {
        self.moves.push(entry);
    }

    /// Number of recorded moves.
    #[must_use]
    pub fn len(&self) -> usize {
        self.moves.len()
    }

    /// Returns true if no move is recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }

    /// Recorded moves, oldest first.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &CompoundMove> {
        self.moves.iter()
    }

    /// Most recent move.
    #[must_use]
    pub fn last(&self) -> Option<&CompoundMove> {
        self.moves.last()
    }

    /// Empties the history and returns its moves.
    pub fn take(&mut self) -> Vec<CompoundMove> {
        std::mem::take(&mut self.moves)
    }

    /// Drops every recorded move.
    pub fn clear(&mut self) {
        self.moves.clear();
    }

    /// JSON array of the recorded moves.
    pub fn to_json(&self) -> ShuffleResult<String> {
        serde_json::to_string_pretty(&self.moves)
            .map_err(|e| ShuffleError::internal(format!("failed to encode move history: {e}")))
    }
}

impl Extend<CompoundMove> for MoveHistory {
    fn extend<T: IntoIterator<Item = CompoundMove>>(&mut self, iter: T) {
        self.moves.extend(iter);
    }
}

/// Moves undone by the last undo-all, oldest first, waiting to be redone.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RedoBuffer {
    moves: Vec<CompoundMove>,
}

impl RedoBuffer {
    /// Creates a buffer from moves in application order.
    #[must_use]
    pub fn new(moves: Vec<CompoundMove>) -> Self {
        Self { moves }
    }

    /// Number of buffered moves.
    #[must_use]
    pub fn len(&self) -> usize {
        self.moves.len()
    }

    /// Returns true if nothing can be redone.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }

    /// Buffered moves, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &CompoundMove> {
        self.moves.iter()
    }

    /// Drops the buffer.
    pub fn clear(&mut self) {
        self.moves.clear();
    }

    /// Empties the buffer and returns its moves.
    pub fn take(&mut self) -> Vec<CompoundMove> {
        std::mem::take(&mut self.moves)
    }
}
