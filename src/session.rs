//! Editing sessions.
//!
//! A [`Session`] owns everything one operator edits: the current grid and
//! inventory, the moves made since the last commit, the committed baseline those
//! moves started from, the saved redo buffer and the log of committed cycles.
//! Nothing is global; two sessions never share state.
//!
//! After an undo fails its baseline check the session is poisoned: every later
//! call returns [`ShuffleError::SessionPoisoned`] and the session must be
//! discarded.

use std::fmt::Write as _;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::burnup::{CoreView, DepletionHook, RadialBurnup};
use crate::command::{Command, CommandResponse, SlotRef};
use crate::config::SessionConfig;
use crate::engine::{MoveOutcome, ShuffleEngine};
use crate::error::{MoveError, ShuffleError, ShuffleResult, ValidationError};
use crate::export::render_move_list;
use crate::grid::{Cell, CoreGrid};
use crate::history::{CompoundMove, MoveHistory, RedoBuffer};
use crate::inventory::{InventoryItem, InventoryStore, SlotId};
use crate::position::{Direction, Position};
use crate::shape::{ShapeCatalog, ShapeConfig};

/// One committed reload cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CycleRecord {
    /// Cycle number, starting at 1.
    pub cycle: u32,
    /// When the cycle was committed.
    pub committed_at: DateTime<Utc>,
    /// Shape name.
    pub shape: String,
    /// Moves that made up the reload.
    pub moves: Vec<CompoundMove>,
    /// Fingerprint of the depleted core, the next cycle's baseline.
    pub fingerprint: String,
    /// Name of the depletion hook that ran.
    pub depletion: String,
    /// Move list for the cycle.
    pub report: String,
}

/// Grid and inventory as committed at the end of the last cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct Baseline {
    /// Committed grid.
    pub grid: CoreGrid,
    /// Committed inventory.
    pub inventory: InventoryStore,
}

/// An editing session over one core.
#[derive(Debug, Clone)]
pub struct Session {
    catalog: ShapeCatalog,
    stock: Vec<InventoryItem>,
    burnup: RadialBurnup,
    grid: CoreGrid,
    inventory: InventoryStore,
    history: MoveHistory,
    baseline: Baseline,
    redo: RedoBuffer,
    cycles: Vec<CycleRecord>,
    poisoned: bool,
}

fn fresh_inventory(stock: &[InventoryItem]) -> Result<InventoryStore, ValidationError> {
    let mut inventory = InventoryStore::new();
    for item in stock {
        inventory.add_item(item.assembly.clone(), item.quantity, item.description.clone())?;
    }
    Ok(inventory)
}

impl Session {
    /// Creates a session on `shape` with `inventory` as its stock.
    ///
    /// Reshaping later restocks from the items of `inventory`.
    #[must_use]
    pub fn new(shape: ShapeConfig, inventory: InventoryStore) -> Self {
        let mut catalog = ShapeCatalog::new();
        let shape = catalog.register(shape);
        let stock = inventory.iter().map(|(_, item)| item.clone()).collect();
        Self::assemble(catalog, shape, stock, inventory, RadialBurnup::default())
    }

    /// Creates a session from configuration.
    pub fn from_config(config: &SessionConfig) -> ShuffleResult<Self> {
        config.validate()?;
        let catalog = config.catalog()?;
        let shape = catalog.get(&config.shape)?;
        let stock = config.stock_items()?;
        let inventory = fresh_inventory(&stock)?;
        info!(
            event = "session_start",
            shape = shape.name(),
            stock_slots = stock.len()
        );
        Ok(Self::assemble(catalog, shape, stock, inventory, config.burnup))
    }

    fn assemble(
        catalog: ShapeCatalog,
        shape: Arc<ShapeConfig>,
        stock: Vec<InventoryItem>,
        inventory: InventoryStore,
        burnup: RadialBurnup,
    ) -> Self {
        let grid = CoreGrid::with_shape(shape);
        Self {
            catalog,
            stock,
            burnup,
            baseline: Baseline {
                grid: grid.clone(),
                inventory: inventory.clone(),
            },
            grid,
            inventory,
            history: MoveHistory::new(),
            redo: RedoBuffer::default(),
            cycles: Vec::new(),
            poisoned: false,
        }
    }

    fn guard(&self) -> ShuffleResult<()> {
        if self.poisoned {
            Err(ShuffleError::SessionPoisoned)
        } else {
            Ok(())
        }
    }

    fn track<T>(&mut self, result: ShuffleResult<T>) -> ShuffleResult<T> {
        if let Err(e) = &result {
            if !e.is_recoverable() {
                error!(event = "session_poisoned", error = %e);
                self.poisoned = true;
            }
        }
        result
    }

    fn engine(&mut self) -> ShuffleEngine<'_> {
        ShuffleEngine::new(&mut self.grid, &mut self.inventory, &mut self.history)
    }

    fn forward<F>(&mut self, op: F) -> ShuffleResult<MoveOutcome>
    where
        F: FnOnce(&mut ShuffleEngine<'_>) -> ShuffleResult<MoveOutcome>,
    {
        self.guard()?;
        let result = op(&mut self.engine());
        let outcome = self.track(result)?;
        self.redo.clear();
        Ok(outcome)
    }

    /// Exchanges the assemblies at `a` and `b`.
    pub fn swap(&mut self, a: Position, b: Position) -> ShuffleResult<MoveOutcome> {
        self.forward(|engine| engine.swap(a, b))
    }

    /// Rotates `pivot`'s orbit one quarter turn.
    pub fn rotate(&mut self, pivot: Position, direction: Direction) -> ShuffleResult<MoveOutcome> {
        self.forward(|engine| engine.rotate(pivot, direction))
    }

    /// Loads one assembly from `slot` into `dest`, displacing any occupant.
    pub fn load(&mut self, dest: Position, slot: SlotId) -> ShuffleResult<MoveOutcome> {
        self.forward(|engine| engine.load(dest, slot))
    }

    /// Retires the assembly at `src` to a new inventory slot.
    pub fn remove(&mut self, src: Position, description: &str) -> ShuffleResult<MoveOutcome> {
        self.forward(|engine| engine.remove(src, description))
    }

    /// Resolves a slot reference against the current listing.
    pub fn resolve_slot(&self, slot: SlotRef) -> ShuffleResult<SlotId> {
        match slot {
            SlotRef::Id(id) => Ok(id),
            SlotRef::Index(index) => self.inventory.id_at(index).ok_or_else(|| {
                ValidationError::InvalidCommand {
                    input: format!("inventory row {}", index + 1),
                    reason: format!("the inventory lists {} row(s)", self.inventory.len()),
                }
                .into()
            }),
        }
    }

    /// Reverts every move since the last commit and saves them for redo.
    ///
    /// With an empty history this is a no-op that keeps the saved buffer.
    pub fn undo_all(&mut self) -> ShuffleResult<RedoBuffer> {
        self.guard()?;
        if self.history.is_empty() {
            return Ok(RedoBuffer::default());
        }
        let baseline = &self.baseline;
        let result = ShuffleEngine::new(&mut self.grid, &mut self.inventory, &mut self.history)
            .undo_all(&baseline.grid, &baseline.inventory);
        let buffer = self.track(result)?;
        info!(event = "undo_all", moves = buffer.len());
        self.redo = buffer.clone();
        Ok(buffer)
    }

    /// Re-applies `buffer` and appends it to the history.
    pub fn redo(&mut self, buffer: &RedoBuffer) -> ShuffleResult<Vec<MoveOutcome>> {
        self.guard()?;
        let result = self.engine().redo(buffer);
        let outcomes = self.track(result)?;
        info!(event = "redo", moves = outcomes.len());
        self.redo.clear();
        Ok(outcomes)
    }

    /// Re-applies the buffer saved by the last [`undo_all`](Self::undo_all).
    pub fn redo_saved(&mut self) -> ShuffleResult<Vec<MoveOutcome>> {
        let buffer = std::mem::take(&mut self.redo);
        match self.redo(&buffer) {
            Ok(outcomes) => Ok(outcomes),
            Err(e) => {
                if !self.poisoned {
                    self.redo = buffer;
                }
                Err(e)
            }
        }
    }

    /// Ends the cycle: depletes the core with `hook` and makes the result the
    /// new baseline.
    ///
    /// Fails with `IncompleteCore` without changing anything if any existent
    /// cell is empty. A failing hook also leaves the session unchanged.
    pub fn commit<H>(&mut self, hook: &mut H) -> ShuffleResult<CycleRecord>
    where
        H: DepletionHook + ?Sized,
    {
        self.guard()?;
        let empty = self.grid.empty_positions();
        if !empty.is_empty() {
            warn!(
                event = "commit_rejected",
                empty = empty.len(),
                first = %self.grid.coordinate(empty[0])
            );
            return Err(MoveError::IncompleteCore { empty }.into());
        }

        let committed_at = Utc::now();
        let report = render_move_list(
            &self.baseline.grid,
            &self.baseline.inventory,
            &self.history,
            committed_at,
        );
        let report = self.track(report)?;

        let mut depleted = self.grid.clone();
        hook.deplete(&mut CoreView::new(&mut depleted))?;
        if !depleted.is_fully_loaded() {
            return self.track(Err(ShuffleError::internal(
                "depletion hook emptied a core cell",
            )));
        }
        depleted.reset_moved();

        self.grid = depleted;
        self.inventory.clear_exhausted();
        self.baseline = Baseline {
            grid: self.grid.clone(),
            inventory: self.inventory.clone(),
        };
        let moves = self.history.take();
        self.redo.clear();

        let record = CycleRecord {
            cycle: self.cycle_number(),
            committed_at,
            shape: self.grid.shape().name().to_string(),
            moves,
            fingerprint: self.grid.fingerprint(),
            depletion: hook.name().to_string(),
            report,
        };
        info!(
            event = "commit",
            cycle = record.cycle,
            moves = record.moves.len(),
            fingerprint = %record.fingerprint,
            depletion = %record.depletion
        );
        self.cycles.push(record.clone());
        Ok(record)
    }

    /// Commits with the configured [`RadialBurnup`] model.
    pub fn commit_default(&mut self) -> ShuffleResult<CycleRecord> {
        let mut burnup = self.burnup;
        self.commit(&mut burnup)
    }

    /// Starts over on another shape from the catalog.
    ///
    /// Grid, inventory, history, redo buffer, baseline and cycle log are all
    /// replaced, as in a new session.
    pub fn reshape(&mut self, name: &str) -> ShuffleResult<()> {
        self.guard()?;
        let shape = self.catalog.get(name)?;
        let inventory = fresh_inventory(&self.stock)?;
        info!(event = "reshape", shape = shape.name());
        *self = Self::assemble(
            std::mem::take(&mut self.catalog),
            shape,
            std::mem::take(&mut self.stock),
            inventory,
            self.burnup,
        );
        Ok(())
    }

    /// Move list for the moves made so far this cycle.
    pub fn export_moves(&self) -> ShuffleResult<String> {
        self.guard()?;
        render_move_list(
            &self.baseline.grid,
            &self.baseline.inventory,
            &self.history,
            Utc::now(),
        )
    }

    /// JSON rendering of the moves made so far this cycle.
    pub fn history_json(&self) -> ShuffleResult<String> {
        self.guard()?;
        self.history.to_json()
    }

    /// Executes one command.
    pub fn execute(&mut self, command: Command) -> ShuffleResult<CommandResponse> {
        self.guard()?;
        let response = match command {
            Command::Swap { a, b } => CommandResponse::Moved(self.swap(a, b)?),
            Command::Rotate { pivot, direction } => {
                CommandResponse::Moved(self.rotate(pivot, direction)?)
            }
            Command::Load { dest, slot } => {
                let slot = self.resolve_slot(slot)?;
                CommandResponse::Moved(self.load(dest, slot)?)
            }
            Command::Remove { src, description } => {
                CommandResponse::Moved(self.remove(src, &description)?)
            }
            Command::UndoAll => CommandResponse::Undone {
                moves: self.undo_all()?.len(),
            },
            Command::Redo => CommandResponse::Redone {
                moves: self.redo_saved()?.len(),
            },
            Command::Commit => CommandResponse::Committed(self.commit_default()?),
            Command::Export => CommandResponse::Exported {
                text: self.export_moves()?,
            },
            Command::Reshape { shape } => {
                self.reshape(&shape)?;
                CommandResponse::Reshaped {
                    shape: self.grid.shape().name().to_string(),
                }
            }
            Command::Show => CommandResponse::Shown {
                text: self.render()?,
            },
        };
        Ok(response)
    }

    /// Text picture of the core and the inventory listing.
    ///
    /// Moved assemblies carry a trailing `*`; empty cells show `--`.
    pub fn render(&self) -> ShuffleResult<String> {
        let mut out = String::new();
        self.draw(&mut out)
            .map_err(|_| ShuffleError::internal("failed to format core picture"))?;
        Ok(out)
    }

    fn draw(&self, out: &mut String) -> std::fmt::Result {
        let grid = &self.grid;
        let axis = grid.shape().axis();
        let cell_width = grid
            .assemblies()
            .map(|(_, a)| a.label.len() + 1)
            .max()
            .unwrap_or(2)
            .max(4);

        writeln!(
            out,
            "{} | cycle {} | {} move(s) since baseline",
            grid.shape().name(),
            self.cycle_number(),
            self.history.len()
        )?;
        write!(out, "{:>4}", "")?;
        for x in 0..grid.width() {
            let letter = axis.column_letter(x, grid.width()).unwrap_or('?');
            write!(out, "{letter:>cell_width$}")?;
        }
        out.push('\n');
        for y in 0..grid.height() {
            write!(out, "{:>4}", axis.row_offset + y)?;
            for x in 0..grid.width() {
                let text = match grid.get(Position::new(x, y)) {
                    Ok(Cell::Loaded(a)) if a.moved => format!("{}*", a.label),
                    Ok(Cell::Loaded(a)) => a.label.clone(),
                    Ok(Cell::Empty) => "--".to_string(),
                    _ => ".".to_string(),
                };
                write!(out, "{text:>cell_width$}")?;
            }
            out.push('\n');
        }
        out.push_str("inventory:\n");
        for (row, (_, item)) in self.inventory.iter().enumerate() {
            writeln!(
                out,
                "{:>4}. {} x{}  {}",
                row + 1,
                item.assembly.label,
                item.quantity,
                item.description
            )?;
        }
        Ok(())
    }

    /// Number of the cycle being edited, starting at 1.
    #[must_use]
    pub fn cycle_number(&self) -> u32 {
        u32::try_from(self.cycles.len()).map_or(u32::MAX, |n| n.saturating_add(1))
    }

    /// Current grid.
    #[must_use]
    pub const fn grid(&self) -> &CoreGrid {
        &self.grid
    }

    /// Current inventory.
    #[must_use]
    pub const fn inventory(&self) -> &InventoryStore {
        &self.inventory
    }

    /// Moves since the last commit.
    #[must_use]
    pub const fn history(&self) -> &MoveHistory {
        &self.history
    }

    /// Last committed state.
    #[must_use]
    pub const fn baseline(&self) -> &Baseline {
        &self.baseline
    }

    /// Moves waiting to be redone.
    #[must_use]
    pub const fn redo_buffer(&self) -> &RedoBuffer {
        &self.redo
    }

    /// Committed cycles, oldest first.
    #[must_use]
    pub fn cycles(&self) -> &[CycleRecord] {
        &self.cycles
    }

    /// Shapes available to [`reshape`](Self::reshape).
    #[must_use]
    pub const fn catalog(&self) -> &ShapeCatalog {
        &self.catalog
    }

    /// Current shape.
    #[must_use]
    pub fn shape(&self) -> &ShapeConfig {
        self.grid.shape()
    }

    /// Depletion model used by [`commit_default`](Self::commit_default).
    #[must_use]
    pub const fn burnup(&self) -> RadialBurnup {
        self.burnup
    }

    /// Returns true once an undo has failed its baseline check.
    #[must_use]
    pub const fn is_poisoned(&self) -> bool {
        self.poisoned
    }
}
