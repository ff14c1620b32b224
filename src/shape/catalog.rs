//! Named core shapes.
//!
//! The built-in presets cover a full 193-assembly four-loop PWR core, its
//! quarter and eighth symmetric sections, and the BEAVRS benchmark loading
//! pattern in all three sizes. Sections share the full core's coordinates, so
//! the centre assembly is `H8` everywhere.

use std::collections::HashMap;
use std::sync::Arc;

use crate::error::ValidationError;
use crate::position::AxisLabels;

use super::config::{ShapeConfig, Symmetry};

/// Names of the built-in shapes, in menu order.
pub const BUILTIN_SHAPES: &[&str] = &[
    "Full",
    "Quarter",
    "Eighth",
    "BEAVRS",
    "1/4 BEAVRS",
    "1/8 BEAVRS",
];

/// Shape selected when nothing else is configured.
pub const DEFAULT_SHAPE: &str = "BEAVRS";

const BEAVRS_FULL: &str = "
    .   .   .   .   3.2 3.2 3.2 3.2 3.2 3.2 3.2 .   .   .   .
    .   .   3.2 3.2 3.2 1.6 3.2 1.6 3.2 1.6 3.2 3.2 3.2 .   .
    .   3.2 3.2 2.4 1.6 2.4 1.6 2.4 1.6 2.4 1.6 2.4 3.2 3.2 .
    .   3.2 2.4 2.4 2.4 1.6 2.4 1.6 2.4 1.6 2.4 2.4 2.4 3.2 .
    3.2 3.2 1.6 2.4 1.6 2.4 1.6 2.4 1.6 2.4 1.6 2.4 1.6 3.2 3.2
    3.2 1.6 2.4 1.6 2.4 1.6 2.4 1.6 2.4 1.6 2.4 1.6 2.4 1.6 3.2
    3.2 3.2 1.6 2.4 1.6 2.4 1.6 2.4 1.6 2.4 1.6 2.4 1.6 3.2 3.2
    3.2 1.6 2.4 1.6 2.4 1.6 2.4 1.6 2.4 1.6 2.4 1.6 2.4 1.6 3.2
    3.2 3.2 1.6 2.4 1.6 2.4 1.6 2.4 1.6 2.4 1.6 2.4 1.6 3.2 3.2
    3.2 1.6 2.4 1.6 2.4 1.6 2.4 1.6 2.4 1.6 2.4 1.6 2.4 1.6 3.2
    3.2 3.2 1.6 2.4 1.6 2.4 1.6 2.4 1.6 2.4 1.6 2.4 1.6 3.2 3.2
    .   3.2 2.4 2.4 2.4 1.6 2.4 1.6 2.4 1.6 2.4 2.4 2.4 3.2 .
    .   3.2 3.2 2.4 1.6 2.4 1.6 2.4 1.6 2.4 1.6 2.4 3.2 3.2 .
    .   .   3.2 3.2 3.2 1.6 3.2 1.6 3.2 1.6 3.2 3.2 3.2 .   .
    .   .   .   .   3.2 3.2 3.2 3.2 3.2 3.2 3.2 .   .   .   .
";

const BEAVRS_QUARTER: &str = "
    1.6 2.4 1.6 2.4 1.6 2.4 1.6 3.2
    .   1.6 2.4 1.6 2.4 1.6 3.2 3.2
    .   2.4 1.6 2.4 1.6 2.4 1.6 3.2
    .   1.6 2.4 1.6 2.4 1.6 3.2 3.2
    .   2.4 1.6 2.4 2.4 2.4 3.2 .
    .   1.6 2.4 1.6 2.4 3.2 3.2 .
    .   3.2 1.6 3.2 3.2 3.2 .   .
    .   3.2 3.2 3.2 .   .   .   .
";

const BEAVRS_EIGHTH: &str = "
    1.6
    2.4 1.6
    1.6 2.4 1.6
    2.4 1.6 2.4 1.6
    1.6 2.4 1.6 2.4 2.4
    2.4 1.6 2.4 1.6 2.4 3.2
    1.6 3.2 1.6 3.2 3.2 3.2
    3.2 3.2 3.2 3.2 .   .
";

const FULL_AXIS: AxisLabels = AxisLabels::new(0, 1);
const QUARTER_AXIS: AxisLabels = AxisLabels::new(0, 8);
const EIGHTH_AXIS: AxisLabels = AxisLabels::new(2, 8);

/// Replaces every fuel token of a map with the default-enrichment token.
fn uniform(map: &str) -> String {
    map.lines()
        .map(|line| {
            line.split_whitespace()
                .map(|token| if token == "." { "." } else { "*" })
                .collect::<Vec<_>>()
                .join(" ")
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Registry of named shapes with case-insensitive lookup and aliases.
#[derive(Debug, Clone, Default)]
pub struct ShapeCatalog {
    shapes: Vec<Arc<ShapeConfig>>,
    aliases: HashMap<String, String>,
}

impl ShapeCatalog {
    /// Creates an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a catalog holding the built-in presets.
    pub fn builtin() -> Result<Self, ValidationError> {
        let mut catalog = Self::new();
        let none = Some(Symmetry::None);
        let quarter_turn = Some(Symmetry::QuarterTurn);

        catalog.register(ShapeConfig::from_map(
            "Full",
            &uniform(BEAVRS_FULL),
            FULL_AXIS,
            quarter_turn,
        )?);
        catalog.register(ShapeConfig::from_map(
            "Quarter",
            &uniform(BEAVRS_QUARTER),
            QUARTER_AXIS,
            none,
        )?);
        catalog.register(ShapeConfig::from_map(
            "Eighth",
            &uniform(BEAVRS_EIGHTH),
            EIGHTH_AXIS,
            none,
        )?);
        catalog.register(ShapeConfig::from_map(
            "BEAVRS",
            BEAVRS_FULL,
            FULL_AXIS,
            quarter_turn,
        )?);
        catalog.register(ShapeConfig::from_map(
            "1/4 BEAVRS",
            BEAVRS_QUARTER,
            QUARTER_AXIS,
            none,
        )?);
        catalog.register(ShapeConfig::from_map(
            "1/8 BEAVRS",
            BEAVRS_EIGHTH,
            EIGHTH_AXIS,
            none,
        )?);

        catalog.alias("1/4-symmetric", "1/4 BEAVRS")?;
        catalog.alias("1/8-symmetric", "1/8 BEAVRS")?;
        Ok(catalog)
    }

    /// Adds a shape, replacing any shape with the same name.
    pub fn register(&mut self, shape: ShapeConfig) -> Arc<ShapeConfig> {
        let shape = Arc::new(shape);
        let key = shape.name().to_ascii_lowercase();
        if let Some(existing) = self
            .shapes
            .iter_mut()
            .find(|s| s.name().to_ascii_lowercase() == key)
        {
            *existing = Arc::clone(&shape);
        } else {
            self.shapes.push(Arc::clone(&shape));
        }
        shape
    }

    /// Adds an alternative name for a registered shape.
    pub fn alias(&mut self, alias: &str, target: &str) -> Result<(), ValidationError> {
        let target = self.get(target)?;
        self.aliases
            .insert(alias.trim().to_ascii_lowercase(), target.name().to_string());
        Ok(())
    }

    /// Looks up a shape by name or alias, ignoring case and surrounding spaces.
    pub fn get(&self, name: &str) -> Result<Arc<ShapeConfig>, ValidationError> {
        let key = name.trim().to_ascii_lowercase();
        let resolved = self
            .aliases
            .get(&key)
            .map_or(key.clone(), |target| target.to_ascii_lowercase());
        self.shapes
            .iter()
            .find(|s| s.name().to_ascii_lowercase() == resolved)
            .cloned()
            .ok_or_else(|| ValidationError::UnknownShape {
                name: name.to_string(),
            })
    }

    /// Registered shape names, in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.shapes.iter().map(|s| s.name())
    }

    /// Number of registered shapes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    /// Returns true if no shapes are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }
}
