// src/config.rs

use crate::error::{CrystalError, Result};
use serde::{Deserialize, Serialize};

// --- Resolver Config ---

/// Equality policy used when classifying raw lattice parameters.
///
/// Both tolerances default to zero, i.e. exact comparison. Raising them lets
/// measured values (e.g. `5.4301` vs `5.4302`) collapse into a higher
/// symmetry class, which changes classification outcomes.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(default)]
pub struct ResolverConfig {
  /// Largest difference (Angstroms) at which two lengths count as equal
  pub length_tolerance: f64,

  /// Largest difference (degrees) at which two angles count as equal
  pub angle_tolerance: f64,
}

impl Default for ResolverConfig {
  fn default() -> Self {
    Self {
      length_tolerance: 0.0,
      angle_tolerance: 0.0,
    }
  }
}

impl ResolverConfig {
  /// Exact comparison (the default)
  pub fn exact() -> Self {
    Self::default()
  }

  /// Tolerances suited to refined values quoted to ~4 decimal places
  pub fn measured() -> Self {
    Self {
      length_tolerance: 1e-4,
      angle_tolerance: 1e-3,
    }
  }

  pub fn lengths_equal(&self, x: f64, y: f64) -> bool {
    (x - y).abs() <= self.length_tolerance
  }

  pub fn angles_equal(&self, x: f64, y: f64) -> bool {
    (x - y).abs() <= self.angle_tolerance
  }

  pub fn validate(&self) -> Result<()> {
    if !self.length_tolerance.is_finite() || self.length_tolerance < 0.0 {
      return Err(CrystalError::InvalidConfig(format!(
        "length tolerance must be a non-negative number, got {}",
        self.length_tolerance
      )));
    }
    if !self.angle_tolerance.is_finite() || self.angle_tolerance < 0.0 {
      return Err(CrystalError::InvalidConfig(format!(
        "angle tolerance must be a non-negative number, got {}",
        self.angle_tolerance
      )));
    }
    Ok(())
  }

  /// Parse a JSON settings document. Missing keys fall back to defaults.
  pub fn from_json(json: &str) -> Result<Self> {
    let cfg: Self = serde_json::from_str(json)?;
    cfg.validate()?;
    log::debug!("Resolver config loaded: {:?}", cfg);
    Ok(cfg)
  }

  pub fn to_json(&self) -> Result<String> {
    Ok(serde_json::to_string_pretty(self)?)
  }
}
