//! Tunable thresholds and layout constants
//!
//! The age thresholds were chosen empirically from real family groups, not
//! derived from anything principled, so they live here instead of inline.

use serde::{Deserialize, Serialize};
use std::path::Path;

use super::KindredError;

/// Thresholds used by the heuristic classifier and role suggestions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrganizerConfig {
    /// Largest age gap at which a two-person family is read as a couple
    pub couple_max_age_gap: u32,
    /// Gap the second-oldest of 3+ members needs over every younger member
    /// to count as a second parent
    pub second_parent_min_gap: u32,
    /// Age from which role suggestions propose a parent role
    pub suggestion_parent_min_age: u32,
}

impl Default for OrganizerConfig {
    fn default() -> Self {
        Self {
            couple_max_age_gap: 20,
            second_parent_min_gap: 12,
            suggestion_parent_min_age: 25,
        }
    }
}

/// Layout constants, in pixels
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub node_width: f64,
    pub node_height: f64,
    /// Horizontal gap between nodes in the same row
    pub node_spacing: f64,
    /// Vertical distance between the tops of consecutive tiers
    pub tier_spacing: f64,
    /// Vertical distance between packed rows inside the child tier
    pub child_row_spacing: f64,
    /// Top and bottom margin of the container
    pub padding: f64,
    /// Child count above which multi-row packing kicks in
    pub multi_row_threshold: usize,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            node_width: 140.0,
            node_height: 80.0,
            node_spacing: 40.0,
            tier_spacing: 160.0,
            child_row_spacing: 110.0,
            padding: 40.0,
            multi_row_threshold: 6,
        }
    }
}

/// Complete configuration, loadable from a JSON document
///
/// Missing sections and fields fall back to their defaults, so
/// `{"layout": {"node_width": 120}}` is a valid config.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KindredConfig {
    pub organizer: OrganizerConfig,
    pub layout: LayoutConfig,
}

impl KindredConfig {
    /// Parse a config document from JSON
    pub fn from_json(input: &str) -> Result<Self, KindredError> {
        let config: KindredConfig = serde_json::from_str(input)
            .map_err(|e| KindredError::config_error(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a config file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, KindredError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Reject values the layout engine cannot work with
    pub fn validate(&self) -> Result<(), KindredError> {
        let layout = &self.layout;
        let sizes = [
            ("node_width", layout.node_width),
            ("node_height", layout.node_height),
            ("tier_spacing", layout.tier_spacing),
            ("child_row_spacing", layout.child_row_spacing),
        ];
        for (name, value) in sizes {
            if !value.is_finite() || value <= 0.0 {
                return Err(KindredError::config_error(format!(
                    "layout.{} must be a positive number, got {}",
                    name, value
                )));
            }
        }
        for (name, value) in [("node_spacing", layout.node_spacing), ("padding", layout.padding)] {
            if !value.is_finite() || value < 0.0 {
                return Err(KindredError::config_error(format!(
                    "layout.{} must not be negative, got {}",
                    name, value
                )));
            }
        }
        Ok(())
    }
}
