//! Grid positions, rotation direction and letter/number coordinate notation.
//!
//! Positions are zero-based `(x, y)` pairs into a shape's bounding box: `x` is the
//! column, `y` the row. Operators never see those numbers; they read coordinates
//! such as `H8`, where the letter names the column and the number names the row.

use std::collections::HashMap;
use std::fmt;
use std::sync::{OnceLock, RwLock};

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Column letters used by PWR core maps. `I`, `O` and `Q` are never used.
pub const COLUMN_LETTERS: &[u8] = b"ABCDEFGHJKLMNPRSTUVWXYZ";

const COORDINATE_PATTERN: &str = r"^\s*([A-Za-z])\s*-?\s*(\d{1,3})\s*$";

static REGEX_CACHE: OnceLock<RwLock<HashMap<&'static str, regex::Regex>>> = OnceLock::new();

fn cached_regex(pattern: &'static str) -> Result<regex::Regex, ValidationError> {
    let cache = REGEX_CACHE.get_or_init(|| RwLock::new(HashMap::new()));

    if let Ok(guard) = cache.read() {
        if let Some(re) = guard.get(pattern) {
            return Ok(re.clone());
        }
    }

    let compiled = regex::Regex::new(pattern).map_err(|e| ValidationError::InvalidCoordinate {
        input: pattern.to_string(),
        reason: format!("invalid coordinate pattern: {e}"),
    })?;

    // A poisoned cache only costs a recompile next time.
    if let Ok(mut guard) = cache.write() {
        guard.entry(pattern).or_insert_with(|| compiled.clone());
    }
    Ok(compiled)
}

/// A cell of a core grid's bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    /// Column, counted from the left edge.
    pub x: usize,
    /// Row, counted from the top edge.
    pub y: usize,
}

impl Position {
    /// Creates a position.
    #[must_use]
    pub const fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }
}

impl From<(usize, usize)> for Position {
    fn from((x, y): (usize, usize)) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Direction of a quarter-turn rotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Values move forward around the orbit (+1).
    Clockwise,
    /// Values move backward around the orbit (-1).
    CounterClockwise,
}

impl Direction {
    /// Returns the opposite direction.
    #[must_use]
    pub const fn inverse(self) -> Self {
        match self {
            Self::Clockwise => Self::CounterClockwise,
            Self::CounterClockwise => Self::Clockwise,
        }
    }

    /// Returns `+1` for clockwise and `-1` for counter-clockwise.
    #[must_use]
    pub const fn sign(self) -> i8 {
        match self {
            Self::Clockwise => 1,
            Self::CounterClockwise => -1,
        }
    }

    /// Index reached from `index` after one step around a cycle of `len` members.
    #[must_use]
    pub const fn advance(self, index: usize, len: usize) -> usize {
        match self {
            Self::Clockwise => (index + 1) % len,
            Self::CounterClockwise => (index + len - 1) % len,
        }
    }

    /// Maps a signed step onto a direction. Zero has no direction.
    #[must_use]
    pub const fn from_sign(sign: i8) -> Option<Self> {
        if sign > 0 {
            Some(Self::Clockwise)
        } else if sign < 0 {
            Some(Self::CounterClockwise)
        } else {
            None
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Clockwise => write!(f, "clockwise"),
            Self::CounterClockwise => write!(f, "counter-clockwise"),
        }
    }
}

/// Maps grid positions to and from operator coordinates.
///
/// Letters run right-to-left: the rightmost column of the bounding box is
/// `COLUMN_LETTERS[column_offset]`. Numbers run top-to-bottom starting at
/// `row_offset`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AxisLabels {
    /// Index into [`COLUMN_LETTERS`] of the rightmost column.
    pub column_offset: usize,
    /// Number printed for the top row.
    pub row_offset: usize,
}

impl Default for AxisLabels {
    fn default() -> Self {
        Self {
            column_offset: 0,
            row_offset: 1,
        }
    }
}

impl AxisLabels {
    /// Creates axis labels.
    #[must_use]
    pub const fn new(column_offset: usize, row_offset: usize) -> Self {
        Self {
            column_offset,
            row_offset,
        }
    }

    /// Returns true if every column of a grid `width` wide has a letter.
    #[must_use]
    pub const fn fits(&self, width: usize) -> bool {
        self.column_offset + width <= COLUMN_LETTERS.len()
    }

    /// Column letter for `x` in a grid `width` wide.
    #[must_use]
    pub fn column_letter(&self, x: usize, width: usize) -> Option<char> {
        let index = self.column_offset + width.checked_sub(x + 1)?;
        COLUMN_LETTERS.get(index).map(|b| char::from(*b))
    }

    /// Formats a position as an operator coordinate such as `H8`.
    ///
    /// Positions outside the lettered range fall back to `(x, y)`.
    #[must_use]
    pub fn format(&self, position: Position, width: usize) -> String {
        match self.column_letter(position.x, width) {
            Some(letter) => format!("{letter}{}", self.row_offset + position.y),
            None => position.to_string(),
        }
    }

    /// Parses an operator coordinate into a position inside a `width` x `height` box.
    ///
    /// Letters are case-insensitive; `h8`, `H 8` and `H-8` are all accepted.
    pub fn parse(&self, input: &str, width: usize, height: usize) -> Result<Position, ValidationError> {
        let invalid = |reason: &str| ValidationError::InvalidCoordinate {
            input: input.to_string(),
            reason: reason.to_string(),
        };

        let re = cached_regex(COORDINATE_PATTERN)?;
        let caps = re
            .captures(input)
            .ok_or_else(|| invalid("expected a column letter followed by a row number"))?;

        let letter = caps
            .get(1)
            .and_then(|m| m.as_str().chars().next())
            .map(|c| c.to_ascii_uppercase())
            .ok_or_else(|| invalid("missing column letter"))?;
        let number: usize = caps
            .get(2)
            .and_then(|m| m.as_str().parse().ok())
            .ok_or_else(|| invalid("missing row number"))?;

        let letter_index = COLUMN_LETTERS
            .iter()
            .position(|b| char::from(*b) == letter)
            .ok_or_else(|| invalid("column letter is not used on core maps"))?;
        let column = letter_index
            .checked_sub(self.column_offset)
            .filter(|c| *c < width)
            .ok_or_else(|| invalid("column is outside this core shape"))?;
        let y = number
            .checked_sub(self.row_offset)
            .filter(|y| *y < height)
            .ok_or_else(|| invalid("row is outside this core shape"))?;

        Ok(Position::new(width - 1 - column, y))
    }
}
