//! Plain-text move list.
//!
//! The move list is the one persisted artifact of a cycle: an ordered set of
//! blocks, one per operator action, written in the shape's coordinate notation.
//! It is rendered by replaying the history from the baseline, so each block can
//! name what the affected cells held just before the move.

use std::fmt::Write as _;

use chrono::{DateTime, SecondsFormat, Utc};

use crate::engine::replay;
use crate::error::{ShuffleError, ShuffleResult};
use crate::grid::CoreGrid;
use crate::history::{CompoundMove, MoveHistory, MoveRecord};
use crate::inventory::InventoryStore;

/// Default file name for an exported move list.
pub const DEFAULT_EXPORT_FILE: &str = "fuel_move_list.txt";

fn fmt_err(_: std::fmt::Error) -> ShuffleError {
    ShuffleError::internal("failed to format move list")
}

fn holds(out: &mut String, grid: &CoreGrid, pos: crate::position::Position) -> std::fmt::Result {
    writeln!(out, "    {} holds {}", grid.coordinate(pos), grid.label_at(pos))
}

fn describe(
    out: &mut String,
    grid: &CoreGrid,
    inventory: &InventoryStore,
    entry: &CompoundMove,
) -> std::fmt::Result {
    match &entry.primary {
        MoveRecord::Swap { a, b } => {
            writeln!(out, "swap: {} with {}", grid.coordinate(*a), grid.coordinate(*b))?;
            holds(out, grid, *a)?;
            holds(out, grid, *b)?;
        }
        MoveRecord::Rotate { pivot, direction } => {
            let Some(orbit) = grid.shape().orbit(*pivot) else {
                return writeln!(out, "rotate {direction}: {}", grid.coordinate(*pivot));
            };
            let steps: Vec<String> = (0..orbit.len())
                .map(|i| {
                    let to = orbit[direction.advance(i, orbit.len())];
                    format!("{} to {}", grid.coordinate(orbit[i]), grid.coordinate(to))
                })
                .collect();
            writeln!(out, "rotate {direction}: {}", steps.join(". "))?;
            for pos in orbit {
                holds(out, grid, pos)?;
            }
        }
        MoveRecord::Load { dest, slot } => {
            let (description, label) = inventory
                .get(*slot)
                .map_or(("<unknown slot>", "?"), |item| {
                    (item.description.as_str(), item.assembly.label.as_str())
                });
            writeln!(
                out,
                "load: {} from inventory \"{description}\" ({label})",
                grid.coordinate(*dest)
            )?;
            holds(out, grid, *dest)?;
            if let Some(MoveRecord::Remove { src, description, .. }) = &entry.displacement {
                writeln!(
                    out,
                    "    displaced {} to inventory as \"{description}\"",
                    grid.label_at(*src)
                )?;
            }
        }
        MoveRecord::Remove {
            src, description, ..
        } => {
            writeln!(
                out,
                "remove: {} to inventory as \"{description}\"",
                grid.coordinate(*src)
            )?;
            holds(out, grid, *src)?;
        }
    }
    Ok(())
}

/// Renders the move list for `history`, starting from the baseline state.
///
/// The baseline is not modified.
pub fn render_move_list(
    baseline_grid: &CoreGrid,
    baseline_inventory: &InventoryStore,
    history: &MoveHistory,
    generated_at: DateTime<Utc>,
) -> ShuffleResult<String> {
    let mut grid = baseline_grid.clone();
    let mut inventory = baseline_inventory.clone();
    let mut out = String::new();

    writeln!(
        out,
        "# To reload the core: {} ({} move{}) generated {}",
        grid.shape().name(),
        history.len(),
        if history.len() == 1 { "" } else { "s" },
        generated_at.to_rfc3339_opts(SecondsFormat::Secs, true)
    )
    .map_err(fmt_err)?;

    for entry in history.iter() {
        out.push('\n');
        describe(&mut out, &grid, &inventory, entry).map_err(fmt_err)?;
        replay(&mut grid, &mut inventory, entry)?;
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::TimeZone;

    use super::*;
    use crate::assembly::Assembly;
    use crate::engine::ShuffleEngine;
    use crate::position::{AxisLabels, Direction, Position};
    use crate::shape::ShapeConfig;

    fn at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn empty_history_has_only_header() {
        let shape = ShapeConfig::from_map("Mini", "* *\n* *", AxisLabels::default(), None).unwrap();
        let grid = CoreGrid::with_shape(Arc::new(shape));
        let text = render_move_list(&grid, &InventoryStore::new(), &MoveHistory::new(), at()).unwrap();
        assert_eq!(
            text,
            "# To reload the core: Mini (0 moves) generated 2024-05-01T12:00:00Z\n"
        );
    }

    #[test]
    fn blocks_describe_cells_before_each_move() {
        let shape = ShapeConfig::from_map("Mini", "* *\n* *", AxisLabels::default(), None).unwrap();
        let mut grid = CoreGrid::with_shape(Arc::new(shape));
        let mut inventory = InventoryStore::new();
        let slot = inventory
            .add_item(Assembly::new("3.2", 3.2), 5, "Fresh Uniform 3.2 wt/o U235")
            .unwrap();
        let baseline_grid = grid.clone();
        let baseline_inventory = inventory.clone();
        let mut history = MoveHistory::new();

        {
            let mut engine = ShuffleEngine::new(&mut grid, &mut inventory, &mut history);
            engine.swap(Position::new(0, 0), Position::new(1, 0)).unwrap();
            engine
                .rotate(Position::new(0, 0), Direction::Clockwise)
                .unwrap();
            engine.load(Position::new(1, 1), slot).unwrap();
            engine.remove(Position::new(0, 1), "spent").unwrap();
        }

        let text = render_move_list(&baseline_grid, &baseline_inventory, &history, at()).unwrap();
        let blocks: Vec<&str> = text.split("\n\n").collect();
        assert_eq!(blocks.len(), 5);
        assert!(blocks[0].contains("Mini (4 moves)"));
        assert_eq!(blocks[1], "swap: B1 with A1\n    B1 holds B1\n    A1 holds A1");
        assert!(blocks[2].starts_with("rotate clockwise: B1 to A1. A1 to A2. A2 to B2. B2 to B1\n"));
        assert!(blocks[2].contains("    B1 holds A1"));
        assert!(blocks[3].starts_with(
            "load: A2 from inventory \"Fresh Uniform 3.2 wt/o U235\" (3.2)\n"
        ));
        assert!(blocks[3].contains("displaced "));
        assert!(blocks[3].contains("as \"extracted from pos. A2\""));
        assert!(blocks[4].starts_with("remove: B2 to inventory as \"spent\""));

        // Rendering never touches the baseline.
        assert_eq!(baseline_inventory.quantities()[0].1, 5);
    }
}
