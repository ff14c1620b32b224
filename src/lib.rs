//! # coreshuffle - reload planning for PWR cores
//!
//! coreshuffle is the engine behind a core-reload editor. An operator rearranges
//! fuel assemblies across a reload cycle with four primitives (swap, rotate,
//! load from inventory, retire to inventory); every move is recorded so the whole
//! cycle can be undone exactly, redone, exported as a move list and finally
//! committed through a depletion hook that starts the next cycle.
//!
//! ## Core Concepts
//!
//! - **Shape**: a named core layout fixing which cells exist and their starting fuel
//! - **Grid**: the live arrangement of assemblies for one shape
//! - **Inventory**: spare assemblies addressed by stable [`SlotId`] handles
//! - **History**: the [`CompoundMove`]s leading from the committed baseline to the grid
//! - **Session**: owns all of the above and is the only place state lives
//!
//! ## Usage
//!
//! ```
//! use coreshuffle::{Direction, Session, SessionConfig};
//!
//! let mut session = Session::from_config(&SessionConfig::default())?;
//! let h8 = session.shape().parse_coordinate("H8")?;
//! let g9 = session.shape().parse_coordinate("G9")?;
//! let l1 = session.shape().parse_coordinate("L1")?;
//!
//! session.swap(h8, g9)?;
//! session.rotate(l1, Direction::Clockwise)?;
//!
//! let redo = session.undo_all()?;
//! assert_eq!(redo.len(), 2);
//! session.redo(&redo)?;
//!
//! let cycle = session.commit_default()?;
//! assert!(cycle.report.contains("swap: H8 with G9"));
//! assert!(session.history().is_empty());
//! # Ok::<(), coreshuffle::ShuffleError>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

// Values and notation
pub mod assembly;
pub mod error;
pub mod position;

// Stores
pub mod grid;
pub mod history;
pub mod inventory;
pub mod shape;

// Engine and session
pub mod burnup;
pub mod command;
pub mod config;
pub mod engine;
pub mod export;
pub mod session;

// Re-export primary types at crate root for convenience
pub use assembly::{Assembly, QuadColor};
pub use burnup::{CoreView, DepletionHook, NoDepletion, RadialBurnup};
pub use command::{Command, CommandResponse, SlotRef};
pub use config::{SessionConfig, StockConfig};
pub use engine::{Endpoint, MoveOutcome, ShuffleEngine, Transition};
pub use error::{ConfigError, MoveError, ShuffleError, ShuffleResult, ValidationError};
pub use export::render_move_list;
pub use grid::{Cell, CoreGrid};
pub use history::{CompoundMove, MoveHistory, MoveRecord, RedoBuffer};
pub use inventory::{InventoryItem, InventoryStore, SlotId};
pub use position::{AxisLabels, Direction, Position};
pub use session::{Baseline, CycleRecord, Session};
pub use shape::{CellSpec, ShapeCatalog, ShapeConfig, ShapeSpec, Symmetry};
