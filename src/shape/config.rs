//! Shape configuration and symmetry.

use serde::{Deserialize, Serialize};

use crate::assembly::DEFAULT_ENRICHMENT;
use crate::error::ValidationError;
use crate::position::{AxisLabels, Position};

/// Rotational symmetry group declared by a shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Symmetry {
    /// No rotation moves.
    #[default]
    None,
    /// Four-fold rotation about the centre of a square bounding box.
    QuarterTurn,
}

impl Symmetry {
    /// Orbit of `pos` under the symmetry group, in clockwise order.
    ///
    /// For a quarter turn in a `w` x `h` box the orbit is
    /// `(x, y)`, `(w-y-1, x)`, `(w-x-1, h-y-1)`, `(y, h-x-1)`.
    /// Returns `None` when the group has no rotation, the box is not square, or
    /// `pos` lies outside it.
    #[must_use]
    pub fn orbit(self, pos: Position, width: usize, height: usize) -> Option<[Position; 4]> {
        match self {
            Self::None => None,
            Self::QuarterTurn => {
                if width != height || pos.x >= width || pos.y >= height {
                    return None;
                }
                let Position { x, y } = pos;
                Some([
                    Position::new(x, y),
                    Position::new(width - y - 1, x),
                    Position::new(width - x - 1, height - y - 1),
                    Position::new(y, height - x - 1),
                ])
            }
        }
    }
}

/// Starting content of one cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CellSpec {
    /// The cell does not exist in this core.
    Absent,
    /// The cell exists and starts without fuel.
    Empty,
    /// The cell starts with a fresh assembly.
    Fuel {
        /// Assembly label.
        label: String,
        /// Enrichment in w/o U-235.
        enrichment: f64,
    },
}

impl CellSpec {
    /// Returns true if the cell exists in the core.
    #[must_use]
    pub const fn exists(&self) -> bool {
        !matches!(self, Self::Absent)
    }
}

/// Immutable description of a core shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShapeConfig {
    name: String,
    width: usize,
    height: usize,
    axis: AxisLabels,
    symmetry: Symmetry,
    cells: Vec<CellSpec>,
}

impl ShapeConfig {
    /// Builds a shape from jagged rows; short rows are padded with absent cells.
    ///
    /// When `symmetry` is `None` the shape gets quarter-turn symmetry if it is
    /// square and its existence mask is invariant under a quarter turn.
    pub fn from_rows(
        name: impl Into<String>,
        rows: Vec<Vec<CellSpec>>,
        axis: AxisLabels,
        symmetry: Option<Symmetry>,
    ) -> Result<Self, ValidationError> {
        let name = name.into();
        let invalid = |reason: String| ValidationError::InvalidShape {
            name: name.clone(),
            reason,
        };

        if name.trim().is_empty() {
            return Err(invalid("shape name cannot be empty".to_string()));
        }
        let height = rows.len();
        let width = rows.iter().map(Vec::len).max().unwrap_or(0);
        if width == 0 || height == 0 {
            return Err(invalid("shape has no cells".to_string()));
        }
        if !axis.fits(width) {
            return Err(invalid(format!(
                "{width} columns from letter offset {} run past the coordinate alphabet",
                axis.column_offset
            )));
        }

        let mut cells = Vec::with_capacity(width * height);
        for row in rows {
            let pad = width - row.len();
            cells.extend(row);
            cells.extend(std::iter::repeat(CellSpec::Absent).take(pad));
        }

        for (i, cell) in cells.iter().enumerate() {
            if let CellSpec::Fuel { label, enrichment } = cell {
                if label.trim().is_empty() {
                    return Err(invalid(format!("cell {i} has an empty label")));
                }
                if !enrichment.is_finite() || *enrichment < 0.0 {
                    return Err(invalid(format!("cell {i} has enrichment {enrichment}")));
                }
            }
        }
        if !cells.iter().any(CellSpec::exists) {
            return Err(invalid("shape has no existent cells".to_string()));
        }

        let mut shape = Self {
            name: name.clone(),
            width,
            height,
            axis,
            symmetry: Symmetry::None,
            cells,
        };

        let invariant = shape.mask_is_quarter_turn_invariant();
        shape.symmetry = match symmetry {
            Some(Symmetry::QuarterTurn) if width != height => {
                return Err(invalid(format!(
                    "quarter-turn symmetry needs a square box, got {width}x{height}"
                )));
            }
            Some(Symmetry::QuarterTurn) if !invariant => {
                return Err(invalid(
                    "existent cells are not invariant under a quarter turn".to_string(),
                ));
            }
            Some(symmetry) => symmetry,
            None if width == height && invariant => Symmetry::QuarterTurn,
            None => Symmetry::None,
        };
        Ok(shape)
    }

    /// Builds a shape from a whitespace-separated text map.
    ///
    /// Tokens: `.` absent, `_` empty, `*` fuel at the default enrichment, or a
    /// number giving the enrichment. Fuel labels are the cells' coordinates.
    pub fn from_map(
        name: impl Into<String>,
        map: &str,
        axis: AxisLabels,
        symmetry: Option<Symmetry>,
    ) -> Result<Self, ValidationError> {
        let name = name.into();
        let token_rows: Vec<Vec<&str>> = map
            .lines()
            .map(|line| line.split_whitespace().collect::<Vec<_>>())
            .filter(|row| !row.is_empty())
            .collect();
        let width = token_rows.iter().map(Vec::len).max().unwrap_or(0);

        let mut rows = Vec::with_capacity(token_rows.len());
        for (y, tokens) in token_rows.iter().enumerate() {
            let mut row = Vec::with_capacity(tokens.len());
            for (x, token) in tokens.iter().enumerate() {
                let label = || axis.format(Position::new(x, y), width);
                let cell = match *token {
                    "." => CellSpec::Absent,
                    "_" => CellSpec::Empty,
                    "*" => CellSpec::Fuel {
                        label: label(),
                        enrichment: DEFAULT_ENRICHMENT,
                    },
                    other => {
                        let enrichment: f64 =
                            other.parse().map_err(|_| ValidationError::InvalidShape {
                                name: name.clone(),
                                reason: format!("unknown map token '{other}' at row {y}"),
                            })?;
                        CellSpec::Fuel {
                            label: label(),
                            enrichment,
                        }
                    }
                };
                row.push(cell);
            }
            rows.push(row);
        }

        Self::from_rows(name, rows, axis, symmetry)
    }

    /// Shape name as shown in the catalog.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Bounding-box width.
    #[must_use]
    pub const fn width(&self) -> usize {
        self.width
    }

    /// Bounding-box height.
    #[must_use]
    pub const fn height(&self) -> usize {
        self.height
    }

    /// Coordinate axes.
    #[must_use]
    pub const fn axis(&self) -> AxisLabels {
        self.axis
    }

    /// Declared symmetry group.
    #[must_use]
    pub const fn symmetry(&self) -> Symmetry {
        self.symmetry
    }

    /// Returns true if rotate moves are meaningful on this shape.
    #[must_use]
    pub fn supports_rotation(&self) -> bool {
        self.symmetry == Symmetry::QuarterTurn && self.width == self.height
    }

    /// Returns true if `pos` lies inside the bounding box.
    #[must_use]
    pub const fn in_bounds(&self, pos: Position) -> bool {
        pos.x < self.width && pos.y < self.height
    }

    /// Starting content of `pos`, or `None` outside the bounding box.
    #[must_use]
    pub fn cell(&self, pos: Position) -> Option<&CellSpec> {
        if self.in_bounds(pos) {
            self.cells.get(pos.y * self.width + pos.x)
        } else {
            None
        }
    }

    /// Returns true if `pos` is an existent cell.
    #[must_use]
    pub fn exists(&self, pos: Position) -> bool {
        self.cell(pos).is_some_and(CellSpec::exists)
    }

    /// Row-major starting cells.
    #[must_use]
    pub fn cells(&self) -> &[CellSpec] {
        &self.cells
    }

    /// Number of existent cells.
    #[must_use]
    pub fn existent_count(&self) -> usize {
        self.cells.iter().filter(|c| c.exists()).count()
    }

    /// Operator coordinate of `pos`, e.g. `H8`.
    #[must_use]
    pub fn coordinate(&self, pos: Position) -> String {
        self.axis.format(pos, self.width)
    }

    /// Parses an operator coordinate into a position of this shape.
    pub fn parse_coordinate(&self, input: &str) -> Result<Position, ValidationError> {
        self.axis.parse(input, self.width, self.height)
    }

    /// Rotation orbit of `pos` under this shape's symmetry.
    #[must_use]
    pub fn orbit(&self, pos: Position) -> Option<[Position; 4]> {
        self.symmetry.orbit(pos, self.width, self.height)
    }

    fn mask_is_quarter_turn_invariant(&self) -> bool {
        if self.width != self.height {
            return false;
        }
        (0..self.height).all(|y| {
            (0..self.width).all(|x| {
                let here = Position::new(x, y);
                let turned = Position::new(self.width - y - 1, x);
                self.exists(here) == self.exists(turned)
            })
        })
    }
}

fn default_row_offset() -> usize {
    1
}

/// Serializable description of a custom shape, as written in configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShapeSpec {
    /// Catalog name.
    pub name: String,
    /// Text map, see [`ShapeConfig::from_map`].
    pub map: String,
    /// Letter index of the rightmost column.
    #[serde(default)]
    pub column_offset: usize,
    /// Number of the top row.
    #[serde(default = "default_row_offset")]
    pub row_offset: usize,
    /// Declared symmetry; inferred when omitted.
    #[serde(default)]
    pub symmetry: Option<Symmetry>,
}

impl TryFrom<&ShapeSpec> for ShapeConfig {
    type Error = ValidationError;

    fn try_from(spec: &ShapeSpec) -> Result<Self, Self::Error> {
        Self::from_map(
            spec.name.clone(),
            &spec.map,
            AxisLabels::new(spec.column_offset, spec.row_offset),
            spec.symmetry,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fuel(label: &str) -> CellSpec {
        CellSpec::Fuel {
            label: label.to_string(),
            enrichment: 3.2,
        }
    }

    #[test]
    fn quarter_turn_orbit_formula() {
        let orbit = Symmetry::QuarterTurn.orbit(Position::new(0, 0), 2, 2).unwrap();
        assert_eq!(
            orbit,
            [
                Position::new(0, 0),
                Position::new(1, 0),
                Position::new(1, 1),
                Position::new(0, 1),
            ]
        );

        let orbit = Symmetry::QuarterTurn.orbit(Position::new(4, 0), 15, 15).unwrap();
        assert_eq!(orbit[1], Position::new(14, 4));
        assert_eq!(orbit[2], Position::new(10, 14));
        assert_eq!(orbit[3], Position::new(0, 10));
    }

    #[test]
    fn orbit_requires_square_rotation_group() {
        assert!(Symmetry::None.orbit(Position::new(0, 0), 2, 2).is_none());
        assert!(Symmetry::QuarterTurn.orbit(Position::new(0, 0), 2, 3).is_none());
        assert!(Symmetry::QuarterTurn.orbit(Position::new(2, 0), 2, 2).is_none());
    }

    #[test]
    fn jagged_rows_are_padded_with_absent_cells() {
        let shape = ShapeConfig::from_rows(
            "octant",
            vec![vec![fuel("A")], vec![fuel("B"), fuel("C")]],
            AxisLabels::default(),
            None,
        )
        .unwrap();
        assert_eq!(shape.width(), 2);
        assert_eq!(shape.height(), 2);
        assert!(!shape.exists(Position::new(1, 0)));
        assert!(shape.exists(Position::new(1, 1)));
        assert_eq!(shape.existent_count(), 3);
        // Square but the mask is not invariant under rotation.
        assert_eq!(shape.symmetry(), Symmetry::None);
    }

    #[test]
    fn square_full_mask_infers_quarter_turn() {
        let shape = ShapeConfig::from_rows(
            "mini",
            vec![vec![fuel("A"), fuel("B")], vec![fuel("C"), fuel("D")]],
            AxisLabels::default(),
            None,
        )
        .unwrap();
        assert_eq!(shape.symmetry(), Symmetry::QuarterTurn);
        assert!(shape.supports_rotation());
    }

    #[test]
    fn explicit_quarter_turn_is_validated() {
        let err = ShapeConfig::from_rows(
            "wide",
            vec![vec![fuel("A"), fuel("B")]],
            AxisLabels::default(),
            Some(Symmetry::QuarterTurn),
        )
        .unwrap_err();
        assert!(matches!(err, ValidationError::InvalidShape { .. }));

        let err = ShapeConfig::from_map(
            "lopsided",
            "* *\n* .",
            AxisLabels::default(),
            Some(Symmetry::QuarterTurn),
        )
        .unwrap_err();
        assert!(matches!(err, ValidationError::InvalidShape { .. }));
    }

    #[test]
    fn map_labels_cells_by_coordinate() {
        let shape = ShapeConfig::from_map(
            "tiny",
            "
            . 2.4 .
            * _ 1.6
            . * .
            ",
            AxisLabels::new(0, 1),
            None,
        )
        .unwrap();
        assert_eq!(shape.width(), 3);
        assert_eq!(shape.height(), 3);
        assert_eq!(
            shape.cell(Position::new(1, 0)),
            Some(&CellSpec::Fuel {
                label: "B1".to_string(),
                enrichment: 2.4
            })
        );
        assert_eq!(shape.cell(Position::new(1, 1)), Some(&CellSpec::Empty));
        assert_eq!(
            shape.cell(Position::new(0, 1)),
            Some(&CellSpec::Fuel {
                label: "C2".to_string(),
                enrichment: DEFAULT_ENRICHMENT
            })
        );
        assert_eq!(shape.symmetry(), Symmetry::QuarterTurn);
    }

    #[test]
    fn map_rejects_unknown_tokens_and_empty_maps() {
        assert!(ShapeConfig::from_map("bad", "* x", AxisLabels::default(), None).is_err());
        assert!(ShapeConfig::from_map("bad", "   \n  ", AxisLabels::default(), None).is_err());
        assert!(ShapeConfig::from_map("bad", ". .", AxisLabels::default(), None).is_err());
        assert!(ShapeConfig::from_map("", "*", AxisLabels::default(), None).is_err());
    }

    #[test]
    fn axis_must_cover_width() {
        let err = ShapeConfig::from_map("wide", "* * *", AxisLabels::new(21, 1), None);
        assert!(err.is_err());
    }

    #[test]
    fn spec_converts_with_defaults() {
        let spec: ShapeSpec = toml::from_str(
            r#"
            name = "Mini"
            map = "* *\n* *"
            "#,
        )
        .unwrap();
        assert_eq!(spec.row_offset, 1);
        let shape = ShapeConfig::try_from(&spec).unwrap();
        assert_eq!(shape.name(), "Mini");
        assert_eq!(shape.coordinate(Position::new(0, 0)), "B1");
    }
}
