//! Fuel assemblies.
//!
//! An [`Assembly`] is a value: moving it around the core moves a copy, retiring it
//! to inventory stores a copy. Two assemblies are the *same fuel* when every
//! physical attribute matches; the session-transient `moved` flag is not part of
//! that identity.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Enrichment (w/o U-235) of an assembly created without an explicit value.
pub const DEFAULT_ENRICHMENT: f64 = 3.2;

/// Burnable-poison content of an assembly created without an explicit value.
pub const DEFAULT_BURNABLE_POISONS: f64 = 10.0;

/// Scale from enrichment to the green channel of the quadrant appearance.
pub const ENRICHMENT_COLOR_SCALE: f64 = 51.0;

/// Number of quadrants tracked per assembly.
pub const QUADRANTS: usize = 4;

/// Appearance of one assembly quadrant.
///
/// Channels are kept as floats so repeated depletion steps do not accumulate
/// rounding; renderers clamp to `0..=255`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct QuadColor {
    /// Red channel (tracks burnup).
    pub r: f64,
    /// Green channel (tracks enrichment).
    pub g: f64,
    /// Blue channel (tracks burnable poisons).
    pub b: f64,
}

impl QuadColor {
    /// Creates a color.
    #[must_use]
    pub const fn new(r: f64, g: f64, b: f64) -> Self {
        Self { r, g, b }
    }

    /// Returns the channels clamped and rounded to 8-bit values.
    #[must_use]
    pub fn to_rgb8(self) -> [u8; 3] {
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let channel = |v: f64| v.round().clamp(0.0, 255.0) as u8;
        [channel(self.r), channel(self.g), channel(self.b)]
    }
}

/// One fuel assembly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assembly {
    /// Identity label, usually the coordinate it was first loaded at (`H8`) or
    /// the stock it came from (`3.2`).
    pub label: String,
    /// Enrichment in weight-percent U-235.
    pub enrichment: f64,
    /// Burnup history, one value per quadrant.
    pub burnup: [f64; QUADRANTS],
    /// Per-quadrant appearance, changed by depletion.
    pub quadrants: [QuadColor; QUADRANTS],
    /// Relocated since the last committed baseline.
    pub moved: bool,
    /// Burnable-poison content.
    pub burnable_poisons: f64,
    /// Mixed-oxide fuel.
    pub mixed_oxide: bool,
    /// Flagged as a suspected leaker.
    pub suspected_leaking: bool,
}

impl Assembly {
    /// Creates a fresh assembly with default burnup history and poisons.
    #[must_use]
    pub fn new(label: impl Into<String>, enrichment: f64) -> Self {
        Self::with_history(label, enrichment, [0.0; QUADRANTS], DEFAULT_BURNABLE_POISONS)
    }

    /// Creates an assembly with an explicit burnup history and poison content.
    ///
    /// The initial appearance of quadrant `q` is
    /// `(burnup[q], enrichment * 51, burnable_poisons)`.
    #[must_use]
    pub fn with_history(
        label: impl Into<String>,
        enrichment: f64,
        burnup: [f64; QUADRANTS],
        burnable_poisons: f64,
    ) -> Self {
        let quadrants = burnup.map(|b| {
            QuadColor::new(b, enrichment * ENRICHMENT_COLOR_SCALE, burnable_poisons)
        });
        Self {
            label: label.into(),
            enrichment,
            burnup,
            quadrants,
            moved: false,
            burnable_poisons,
            mixed_oxide: false,
            suspected_leaking: false,
        }
    }

    /// Creates an assembly, rejecting blank labels.
    pub fn try_new(label: impl Into<String>, enrichment: f64) -> Result<Self, ValidationError> {
        let label = label.into();
        if label.trim().is_empty() {
            return Err(ValidationError::EmptyLabel);
        }
        Ok(Self::new(label.trim(), enrichment))
    }

    /// Marks the assembly as mixed-oxide fuel.
    #[must_use]
    pub fn mixed_oxide(mut self, mixed_oxide: bool) -> Self {
        self.mixed_oxide = mixed_oxide;
        self
    }

    /// Flags the assembly as a suspected leaker.
    #[must_use]
    pub fn suspected_leaking(mut self, suspected: bool) -> Self {
        self.suspected_leaking = suspected;
        self
    }

    /// Returns true if `other` is the same physical fuel.
    ///
    /// Compares label, appearance, burnup history, enrichment, poisons, MOX and
    /// leak flags exactly. `moved` is ignored.
    #[must_use]
    pub fn is_same_fuel(&self, other: &Self) -> bool {
        self.label == other.label
            && self.quadrants == other.quadrants
            && self.burnup == other.burnup
            && self.enrichment == other.enrichment
            && self.burnable_poisons == other.burnable_poisons
            && self.mixed_oxide == other.mixed_oxide
            && self.suspected_leaking == other.suspected_leaking
    }

    /// Names of the attributes that differ from `other`, `moved` included.
    ///
    /// Used in diagnostics when two assemblies unexpectedly fail to match.
    #[must_use]
    pub fn differences(&self, other: &Self) -> Vec<&'static str> {
        let mut diff = Vec::new();
        if self.label != other.label {
            diff.push("label");
        }
        if self.moved != other.moved {
            diff.push("moved");
        }
        if self.quadrants != other.quadrants {
            diff.push("quadrants");
        }
        if self.burnup != other.burnup {
            diff.push("burnup");
        }
        if self.enrichment != other.enrichment {
            diff.push("enrichment");
        }
        if self.burnable_poisons != other.burnable_poisons {
            diff.push("burnable_poisons");
        }
        if self.mixed_oxide != other.mixed_oxide {
            diff.push("mixed_oxide");
        }
        if self.suspected_leaking != other.suspected_leaking {
            diff.push("suspected_leaking");
        }
        diff
    }
}

impl fmt::Display for Assembly {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({} w/o)", self.label, self.enrichment)
    }
}
