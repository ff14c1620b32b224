//! Session configuration.
//!
//! Load the starting shape, fresh-fuel stock, custom core shapes and depletion
//! parameters from TOML. Every field has a default, so an empty file is a valid
//! configuration.
//!
//! # Examples
//!
//! ```
//! use coreshuffle::SessionConfig;
//!
//! let config = SessionConfig::from_toml_str(r#"
//!     shape = "Full"
//!
//!     [[stock]]
//!     label = "4.0"
//!     enrichment = 4.0
//!     quantity = 12
//! "#).unwrap();
//!
//! assert_eq!(config.shape, "Full");
//! assert_eq!(config.stock[0].description(), "Fresh Uniform 4.0 wt/o U235");
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::assembly::{Assembly, DEFAULT_BURNABLE_POISONS, QUADRANTS};
use crate::burnup::RadialBurnup;
use crate::error::{ConfigError, ValidationError};
use crate::export::DEFAULT_EXPORT_FILE;
use crate::inventory::{InventoryItem, InventoryStore};
use crate::shape::catalog::DEFAULT_SHAPE;
use crate::shape::{ShapeCatalog, ShapeConfig, ShapeSpec};

fn default_poisons() -> f64 {
    DEFAULT_BURNABLE_POISONS
}

/// One line of fresh-fuel stock.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockConfig {
    /// Label given to every assembly drawn from this stock.
    pub label: String,
    /// Enrichment in w/o U-235.
    pub enrichment: f64,
    /// Assemblies available.
    pub quantity: u32,
    /// Listing description; derived from the enrichment when omitted.
    #[serde(default)]
    pub description: Option<String>,
    /// Burnable-poison content.
    #[serde(default = "default_poisons")]
    pub burnable_poisons: f64,
    /// Mixed-oxide fuel.
    #[serde(default)]
    pub mixed_oxide: bool,
}

impl StockConfig {
    /// Fresh uniform stock at `enrichment`.
    #[must_use]
    pub fn fresh(enrichment: f64, quantity: u32) -> Self {
        Self {
            label: enrichment.to_string(),
            enrichment,
            quantity,
            description: None,
            burnable_poisons: DEFAULT_BURNABLE_POISONS,
            mixed_oxide: false,
        }
    }

    /// Listing description.
    #[must_use]
    pub fn description(&self) -> String {
        self.description
            .clone()
            .unwrap_or_else(|| format!("Fresh Uniform {:.1} wt/o U235", self.enrichment))
    }

    /// Template assembly for this stock.
    pub fn assembly(&self) -> Result<Assembly, ValidationError> {
        if self.label.trim().is_empty() {
            return Err(ValidationError::EmptyLabel);
        }
        if !self.enrichment.is_finite() || self.enrichment < 0.0 {
            return Err(ValidationError::InvalidStock {
                reason: format!("'{}' has enrichment {}", self.label, self.enrichment),
            });
        }
        Ok(Assembly::with_history(
            self.label.trim(),
            self.enrichment,
            [0.0; QUADRANTS],
            self.burnable_poisons,
        )
        .mixed_oxide(self.mixed_oxide))
    }

    /// Inventory item for this stock.
    pub fn item(&self) -> Result<InventoryItem, ValidationError> {
        if self.quantity == 0 {
            return Err(ValidationError::InvalidStock {
                reason: format!("quantity of '{}' must be at least 1", self.label),
            });
        }
        Ok(InventoryItem::new(self.assembly()?, self.quantity, self.description()))
    }
}

fn default_stock() -> Vec<StockConfig> {
    vec![
        StockConfig::fresh(3.2, 30),
        StockConfig::fresh(2.4, 45),
        StockConfig::fresh(1.6, 25),
    ]
}

/// Main session configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Shape selected at start-up.
    pub shape: String,
    /// Fresh-fuel stock, in listing order.
    pub stock: Vec<StockConfig>,
    /// Additional shapes registered next to the presets.
    pub shapes: Vec<ShapeSpec>,
    /// Parameters of the built-in depletion model.
    pub burnup: RadialBurnup,
    /// Where the command-line harness writes the move list.
    pub export_path: Option<PathBuf>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            shape: DEFAULT_SHAPE.to_string(),
            stock: default_stock(),
            shapes: Vec::new(),
            burnup: RadialBurnup::default(),
            export_path: None,
        }
    }
}

impl SessionConfig {
    /// Creates the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads and validates configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns error if the file is unreadable, is not valid TOML, or fails
    /// [`validate`](Self::validate).
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Parses and validates configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Sets the start-up shape.
    #[must_use]
    pub fn with_shape(mut self, shape: impl Into<String>) -> Self {
        self.shape = shape.into();
        self
    }

    /// Replaces the stock.
    #[must_use]
    pub fn with_stock(mut self, stock: Vec<StockConfig>) -> Self {
        self.stock = stock;
        self
    }

    /// Move-list path, falling back to the default file name.
    #[must_use]
    pub fn export_path(&self) -> PathBuf {
        self.export_path
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_EXPORT_FILE))
    }

    /// Checks stock entries, custom shapes and the start-up shape name.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |e: ValidationError| ConfigError::Invalid(e.to_string());
        for stock in &self.stock {
            stock.item().map_err(invalid)?;
        }
        let catalog = self.catalog().map_err(invalid)?;
        catalog.get(&self.shape).map_err(invalid)?;

        let burnup = &self.burnup;
        if ![burnup.peak, burnup.green_decay, burnup.distance_scale]
            .iter()
            .all(|v| v.is_finite() && *v >= 0.0)
        {
            return Err(ConfigError::Invalid(
                "burnup parameters must be finite and non-negative".to_string(),
            ));
        }
        Ok(())
    }

    /// Built-in presets plus the configured custom shapes.
    pub fn catalog(&self) -> Result<ShapeCatalog, ValidationError> {
        let mut catalog = ShapeCatalog::builtin()?;
        for spec in &self.shapes {
            catalog.register(ShapeConfig::try_from(spec)?);
        }
        Ok(catalog)
    }

    /// Stock as inventory items, in listing order.
    pub fn stock_items(&self) -> Result<Vec<InventoryItem>, ValidationError> {
        self.stock.iter().map(StockConfig::item).collect()
    }

    /// A fresh inventory holding the configured stock.
    pub fn build_inventory(&self) -> Result<InventoryStore, ValidationError> {
        let mut inventory = InventoryStore::new();
        for item in self.stock_items()? {
            inventory.add_item(item.assembly, item.quantity, item.description)?;
        }
        Ok(inventory)
    }
}
