//! Engine configuration

use crate::defaults;
use crate::types::{NumericError, positive};

/// Tolerances and unit conversion shared by the solvers and the validation
/// pipeline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineConfig {
    /// Closeness threshold for lengths (base units) and angles (radians)
    pub tolerance: f64,
    /// Base length units per document (station) unit
    pub unit_scale: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            tolerance: defaults::TOLERANCE,
            unit_scale: defaults::UNIT_SCALE,
        }
    }
}

impl EngineConfig {
    /// Create a config with validation (rejects NaN, infinite, zero, negative)
    pub fn try_new(tolerance: f64, unit_scale: f64) -> Result<Self, NumericError> {
        Ok(Self {
            tolerance: positive(tolerance)?,
            unit_scale: positive(unit_scale)?,
        })
    }

    /// Tolerance for coordinate comparisons, scaled to document units.
    #[inline]
    pub fn length_tolerance(&self) -> f64 {
        self.tolerance * self.unit_scale
    }

    /// Convert a nominal station delta into base length units.
    #[inline]
    pub fn station_to_length(&self, delta: f64) -> f64 {
        delta * self.unit_scale
    }

    /// Convert a base length into a nominal station delta.
    #[inline]
    pub fn length_to_station(&self, length: f64) -> f64 {
        length / self.unit_scale
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_uses_base_units() {
        let config = EngineConfig::default();
        assert_eq!(config.tolerance, 1e-4);
        assert_eq!(config.station_to_length(12.5), 12.5);
    }

    #[test]
    fn try_new_rejects_non_positive() {
        assert_eq!(EngineConfig::try_new(0.0, 1.0), Err(NumericError::Zero));
        assert_eq!(EngineConfig::try_new(1e-4, -3.0), Err(NumericError::Negative));
        assert_eq!(EngineConfig::try_new(f64::NAN, 1.0), Err(NumericError::NaN));
    }

    #[test]
    fn scale_converts_both_ways() {
        let config = EngineConfig::try_new(1e-3, 0.3048).unwrap();
        assert!((config.station_to_length(100.0) - 30.48).abs() < 1e-12);
        assert!((config.length_to_station(30.48) - 100.0).abs() < 1e-9);
        assert!((config.length_tolerance() - 3.048e-4).abs() < 1e-15);
    }
}
