//! Session commands.
//!
//! [`Command`] is the serializable form of everything a presentation layer can
//! ask a session to do. [`Command::parse_line`] reads the line-oriented script
//! syntax used by the command-line harness.

use serde::{Deserialize, Serialize};

use crate::engine::MoveOutcome;
use crate::error::ValidationError;
use crate::inventory::SlotId;
use crate::position::{Direction, Position};
use crate::session::CycleRecord;
use crate::shape::ShapeConfig;

/// How a command names an inventory slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotRef {
    /// Zero-based row of the current inventory listing.
    Index(usize),
    /// Stable slot id.
    Id(SlotId),
}

impl From<SlotId> for SlotRef {
    fn from(id: SlotId) -> Self {
        Self::Id(id)
    }
}

/// A request to a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", content = "payload", rename_all = "snake_case")]
pub enum Command {
    /// Exchange two assemblies.
    Swap {
        /// First cell.
        a: Position,
        /// Second cell.
        b: Position,
    },
    /// Rotate an orbit one quarter turn.
    Rotate {
        /// Any cell of the orbit.
        pivot: Position,
        /// Direction of travel.
        direction: Direction,
    },
    /// Load from inventory.
    Load {
        /// Destination cell.
        dest: Position,
        /// Source slot.
        slot: SlotRef,
    },
    /// Retire an assembly to inventory.
    Remove {
        /// Source cell.
        src: Position,
        /// Description of the new slot.
        description: String,
    },
    /// Revert every move since the last commit.
    UndoAll,
    /// Re-apply the moves reverted by the last undo.
    Redo,
    /// Deplete with the configured model and start a new cycle.
    Commit,
    /// Render the current move list.
    Export,
    /// Start over on another core shape.
    Reshape {
        /// Catalog name or alias.
        shape: String,
    },
    /// Render the core and inventory as text.
    Show,
}

/// Result of a [`Command`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "result", rename_all = "snake_case")]
pub enum CommandResponse {
    /// A move was applied.
    Moved(MoveOutcome),
    /// Moves were reverted.
    Undone {
        /// Moves reverted.
        moves: usize,
    },
    /// Moves were re-applied.
    Redone {
        /// Moves re-applied.
        moves: usize,
    },
    /// A cycle was committed.
    Committed(CycleRecord),
    /// Rendered move list.
    Exported {
        /// Move-list text.
        text: String,
    },
    /// The session now uses another shape.
    Reshaped {
        /// Name of the new shape.
        shape: String,
    },
    /// Rendered core and inventory.
    Shown {
        /// Text snapshot.
        text: String,
    },
}

fn parse_direction(token: &str) -> Option<Direction> {
    match token.to_ascii_lowercase().as_str() {
        "cw" | "clockwise" | "+1" | "1" => Some(Direction::Clockwise),
        "ccw" | "acw" | "counter-clockwise" | "counterclockwise" | "anticlockwise" | "-1" => {
            Some(Direction::CounterClockwise)
        }
        _ => None,
    }
}

impl Command {
    /// Parses one script line against `shape`'s coordinate notation.
    ///
    /// Blank lines and lines starting with `#` yield `Ok(None)`. Inventory rows
    /// are written one-based, as listed by `show`.
    pub fn parse_line(line: &str, shape: &ShapeConfig) -> Result<Option<Self>, ValidationError> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return Ok(None);
        }

        let invalid = |reason: &str| ValidationError::InvalidCommand {
            input: line.to_string(),
            reason: reason.to_string(),
        };
        let mut tokens = line.split_whitespace();
        let verb = tokens
            .next()
            .map(str::to_ascii_lowercase)
            .ok_or_else(|| invalid("empty command"))?;
        let rest: Vec<&str> = tokens.collect();
        let coordinate = |i: usize| -> Result<Position, ValidationError> {
            let token = rest.get(i).ok_or_else(|| invalid("missing coordinate"))?;
            shape.parse_coordinate(token)
        };
        let arity = |n: usize| -> Result<(), ValidationError> {
            if rest.len() == n {
                Ok(())
            } else {
                Err(invalid(&format!("expected {n} argument(s), got {}", rest.len())))
            }
        };

        let command = match verb.as_str() {
            "swap" => {
                arity(2)?;
                Self::Swap {
                    a: coordinate(0)?,
                    b: coordinate(1)?,
                }
            }
            "rotate" => {
                arity(2)?;
                let direction =
                    parse_direction(rest[1]).ok_or_else(|| invalid("direction must be cw or ccw"))?;
                Self::Rotate {
                    pivot: coordinate(0)?,
                    direction,
                }
            }
            "load" => {
                arity(2)?;
                let row: usize = rest[1]
                    .parse()
                    .ok()
                    .filter(|row| *row >= 1)
                    .ok_or_else(|| invalid("inventory row must be a number from 1"))?;
                Self::Load {
                    dest: coordinate(0)?,
                    slot: SlotRef::Index(row - 1),
                }
            }
            "remove" | "retire" => {
                if rest.is_empty() {
                    return Err(invalid("missing coordinate"));
                }
                let src = coordinate(0)?;
                let description = if rest.len() > 1 {
                    rest[1..].join(" ")
                } else {
                    format!("retired from pos. {}", shape.coordinate(src))
                };
                Self::Remove { src, description }
            }
            "undo" => {
                arity(0)?;
                Self::UndoAll
            }
            "redo" => {
                arity(0)?;
                Self::Redo
            }
            "commit" | "burnup" => {
                arity(0)?;
                Self::Commit
            }
            "export" => {
                arity(0)?;
                Self::Export
            }
            "show" => {
                arity(0)?;
                Self::Show
            }
            "shape" => {
                if rest.is_empty() {
                    return Err(invalid("missing shape name"));
                }
                Self::Reshape {
                    shape: rest.join(" "),
                }
            }
            _ => return Err(invalid("unknown command")),
        };
        Ok(Some(command))
    }

    /// Returns true for the four move primitives.
    #[must_use]
    pub const fn is_move(&self) -> bool {
        matches!(
            self,
            Self::Swap { .. } | Self::Rotate { .. } | Self::Load { .. } | Self::Remove { .. }
        )
    }
}
