//! Core shapes.
//!
//! A shape fixes a grid's bounding box, which cells exist, their starting
//! assemblies, the coordinate axes and the rotational symmetry used by rotate
//! moves. Shapes are immutable once built; grids share them behind an `Arc`.

pub mod catalog;
pub mod config;

pub use catalog::{ShapeCatalog, BUILTIN_SHAPES};
pub use config::{CellSpec, ShapeConfig, ShapeSpec, Symmetry};
