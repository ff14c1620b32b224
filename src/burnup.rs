//! Depletion hooks invoked on commit.
//!
//! The engine does no reactor physics. A commit hands the fully loaded core to a
//! [`DepletionHook`] through a [`CoreView`], which allows assemblies to be changed
//! but never allows a cell to be emptied. [`RadialBurnup`] is the built-in
//! stand-in: it ages each quadrant's appearance by its distance from the centre.

use serde::{Deserialize, Serialize};

use crate::assembly::{Assembly, QUADRANTS};
use crate::error::ShuffleResult;
use crate::grid::CoreGrid;
use crate::position::Position;
use crate::shape::ShapeConfig;

/// Restricted mutable access to a core during depletion.
#[derive(Debug)]
pub struct CoreView<'a> {
    grid: &'a mut CoreGrid,
}

impl<'a> CoreView<'a> {
    pub(crate) fn new(grid: &'a mut CoreGrid) -> Self {
        Self { grid }
    }

    /// The core's shape.
    #[must_use]
    pub fn shape(&self) -> &ShapeConfig {
        self.grid.shape()
    }

    /// Assembly at `pos`.
    #[must_use]
    pub fn assembly(&self, pos: Position) -> Option<&Assembly> {
        self.grid.assembly(pos)
    }

    /// Assembly at `pos`, mutably.
    pub fn assembly_mut(&mut self, pos: Position) -> Option<&mut Assembly> {
        self.grid.assembly_mut(pos)
    }

    /// Every loaded assembly with its position.
    pub fn assemblies(&self) -> impl Iterator<Item = (Position, &Assembly)> {
        self.grid.assemblies()
    }

    /// Every loaded assembly with its position, mutably.
    pub fn assemblies_mut(&mut self) -> impl Iterator<Item = (Position, &mut Assembly)> {
        self.grid.assemblies_mut()
    }
}

/// Transforms assembly depletion state at the end of a cycle.
pub trait DepletionHook {
    /// Short name recorded in the cycle log.
    fn name(&self) -> &str {
        "custom"
    }

    /// Depletes the core in place.
    fn deplete(&mut self, core: &mut CoreView<'_>) -> ShuffleResult<()>;
}

impl<F> DepletionHook for F
where
    F: FnMut(&mut CoreView<'_>) -> ShuffleResult<()>,
{
    fn deplete(&mut self, core: &mut CoreView<'_>) -> ShuffleResult<()> {
        self(core)
    }
}

/// A hook that leaves the core untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDepletion;

impl DepletionHook for NoDepletion {
    fn name(&self) -> &str {
        "none"
    }

    fn deplete(&mut self, _core: &mut CoreView<'_>) -> ShuffleResult<()> {
        Ok(())
    }
}

/// Cosmetic burnup: quadrants near the core centre redden, enrichment fades.
///
/// For a loaded cell at `(x, y)` in a `w` x `h` box the quadrant offsets are
/// measured from `(w + 0.5 - 2x, h + 0.5 - 2y)`, with quadrants 1 and 3 one step
/// further in x and quadrants 2 and 3 one step further in y. Each quadrant's red
/// channel gains `peak - distance_scale * d`, clamped to `0..=peak`; green is
/// multiplied by `green_decay`; blue is untouched.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RadialBurnup {
    /// Red gained at zero distance, and the red ceiling.
    pub peak: f64,
    /// Green multiplier per cycle.
    pub green_decay: f64,
    /// Red lost per unit of distance.
    pub distance_scale: f64,
}

impl Default for RadialBurnup {
    fn default() -> Self {
        Self {
            peak: 255.0,
            green_decay: 0.7,
            distance_scale: 10.0,
        }
    }
}

impl RadialBurnup {
    #[allow(clippy::cast_precision_loss)]
    fn quadrant_offsets(width: usize, height: usize, pos: Position) -> [(f64, f64); QUADRANTS] {
        let px = width as f64 + 0.5 - 2.0 * pos.x as f64;
        let py = height as f64 + 0.5 - 2.0 * pos.y as f64;
        [
            (px, py),
            (px + 1.0, py),
            (px, py + 1.0),
            (px + 1.0, py + 1.0),
        ]
    }
}

impl DepletionHook for RadialBurnup {
    fn name(&self) -> &str {
        "radial-burnup"
    }

    fn deplete(&mut self, core: &mut CoreView<'_>) -> ShuffleResult<()> {
        let width = core.shape().width();
        let height = core.shape().height();
        for (pos, assembly) in core.assemblies_mut() {
            let offsets = Self::quadrant_offsets(width, height, pos);
            for (quad, (dx, dy)) in assembly.quadrants.iter_mut().zip(offsets) {
                let dist = self.distance_scale * dx.hypot(dy);
                quad.r = (quad.r + self.peak - dist).clamp(0.0, self.peak);
                quad.g *= self.green_decay;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::grid::Cell;
    use crate::position::AxisLabels;

    fn grid(map: &str) -> CoreGrid {
        let shape = ShapeConfig::from_map("t", map, AxisLabels::default(), None).unwrap();
        CoreGrid::with_shape(Arc::new(shape))
    }

    #[test]
    fn radial_burnup_follows_distance() {
        let mut core = grid("* *\n* *");
        RadialBurnup::default()
            .deplete(&mut CoreView::new(&mut core))
            .unwrap();

        // (0, 0) in a 2x2 box: quadrant 0 is measured from (2.5, 2.5).
        let a = core.assembly(Position::new(0, 0)).unwrap();
        let expected = (255.0 - 10.0 * 2.5f64.hypot(2.5)).clamp(0.0, 255.0);
        assert!((a.quadrants[0].r - expected).abs() < 1e-9);
        assert!((a.quadrants[0].g - 3.2 * 51.0 * 0.7).abs() < 1e-9);
        assert_eq!(a.quadrants[0].b, 10.0);

        // Quadrant 3 is further away, so it reddens less.
        assert!(a.quadrants[3].r < a.quadrants[0].r);
    }

    #[test]
    fn far_quadrants_clamp_at_zero() {
        let mut core = grid("* * * * * * * * * * * * * * * * * * * * * * *");
        let mut hook = RadialBurnup {
            distance_scale: 100.0,
            ..RadialBurnup::default()
        };
        hook.deplete(&mut CoreView::new(&mut core)).unwrap();
        for (_, a) in core.assemblies() {
            for q in a.quadrants {
                assert!((0.0..=255.0).contains(&q.r));
            }
        }
    }

    #[test]
    fn empty_cells_are_skipped() {
        let mut core = grid("* _");
        RadialBurnup::default()
            .deplete(&mut CoreView::new(&mut core))
            .unwrap();
        assert_eq!(core.get(Position::new(1, 0)).unwrap(), &Cell::Empty);
    }

    #[test]
    fn closures_are_hooks() {
        let mut core = grid("* *");
        let mut calls = 0;
        let mut hook = |view: &mut CoreView<'_>| {
            calls += 1;
            for (_, a) in view.assemblies_mut() {
                a.burnup[0] += 1.0;
            }
            Ok::<(), crate::error::ShuffleError>(())
        };
        hook.deplete(&mut CoreView::new(&mut core)).unwrap();
        assert_eq!(calls, 1);
        assert!(core.assemblies().all(|(_, a)| a.burnup[0] == 1.0));
        assert_eq!(NoDepletion.name(), "none");
    }
}
