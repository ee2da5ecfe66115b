//! Control policy: the hysteresis band and the per-zone cooldown.

use std::time::Duration;

use crate::error::ValidationError;

/// Where a moisture value falls relative to the hysteresis band.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoistureBand {
    /// Strictly below the dry threshold: the zone wants water.
    Dry,
    /// Between the thresholds, bounds included: nothing to do.
    DeadZone,
    /// Strictly above the wet threshold: the zone has had enough.
    Wet,
}

/// Thresholds and cooldown applied to every zone.
///
/// Invariant: both thresholds are finite and `dry_threshold < wet_threshold`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControlPolicy {
    dry_threshold: f64,
    wet_threshold: f64,
    cooldown: Duration,
}

impl ControlPolicy {
    /// Build a policy.
    ///
    /// A zero `cooldown` disables debouncing; it is accepted.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::NonFiniteThreshold`] if a threshold is NaN
    /// or infinite, and [`ValidationError::ThresholdOrder`] unless
    /// `dry_threshold < wet_threshold`.
    pub fn new(
        dry_threshold: f64,
        wet_threshold: f64,
        cooldown: Duration,
    ) -> Result<Self, ValidationError> {
        if !dry_threshold.is_finite() || !wet_threshold.is_finite() {
            return Err(ValidationError::NonFiniteThreshold);
        }
        if dry_threshold >= wet_threshold {
            return Err(ValidationError::ThresholdOrder {
                dry: dry_threshold,
                wet: wet_threshold,
            });
        }
        Ok(Self {
            dry_threshold,
            wet_threshold,
            cooldown,
        })
    }

    #[must_use]
    pub fn dry_threshold(&self) -> f64 {
        self.dry_threshold
    }

    #[must_use]
    pub fn wet_threshold(&self) -> f64 {
        self.wet_threshold
    }

    #[must_use]
    pub fn cooldown(&self) -> Duration {
        self.cooldown
    }

    /// Classify a moisture value. Comparisons are strict on both triggering
    /// sides, so a value equal to a threshold lands in the dead zone.
    #[must_use]
    pub fn classify(&self, value: f64) -> MoistureBand {
        if value < self.dry_threshold {
            MoistureBand::Dry
        } else if value > self.wet_threshold {
            MoistureBand::Wet
        } else {
            MoistureBand::DeadZone
        }
    }
}

impl Default for ControlPolicy {
    /// 40 % / 70 % with a 30 second cooldown.
    fn default() -> Self {
        Self {
            dry_threshold: 40.0,
            wet_threshold: 70.0,
            cooldown: Duration::from_secs(30),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy() -> ControlPolicy {
        ControlPolicy::new(40.0, 70.0, Duration::from_secs(30)).unwrap()
    }

    #[test]
    fn should_reject_inverted_thresholds() {
        let result = ControlPolicy::new(70.0, 40.0, Duration::ZERO);
        assert_eq!(
            result,
            Err(ValidationError::ThresholdOrder {
                dry: 70.0,
                wet: 40.0
            })
        );
    }

    #[test]
    fn should_reject_equal_thresholds() {
        assert!(ControlPolicy::new(50.0, 50.0, Duration::ZERO).is_err());
    }

    #[test]
    fn should_reject_nan_threshold() {
        let result = ControlPolicy::new(f64::NAN, 70.0, Duration::ZERO);
        assert_eq!(result, Err(ValidationError::NonFiniteThreshold));
    }

    #[test]
    fn should_accept_zero_cooldown() {
        let policy = ControlPolicy::new(10.0, 20.0, Duration::ZERO).unwrap();
        assert_eq!(policy.cooldown(), Duration::ZERO);
    }

    #[test]
    fn should_classify_dry_below_threshold() {
        assert_eq!(policy().classify(39.99), MoistureBand::Dry);
    }

    #[test]
    fn should_classify_wet_above_threshold() {
        assert_eq!(policy().classify(70.01), MoistureBand::Wet);
    }

    #[test]
    fn should_place_exact_thresholds_in_dead_zone() {
        assert_eq!(policy().classify(40.0), MoistureBand::DeadZone);
        assert_eq!(policy().classify(70.0), MoistureBand::DeadZone);
        assert_eq!(policy().classify(55.0), MoistureBand::DeadZone);
    }

    #[test]
    fn should_default_to_field_deployment_values() {
        let policy = ControlPolicy::default();
        assert!((policy.dry_threshold() - 40.0).abs() < f64::EPSILON);
        assert!((policy.wet_threshold() - 70.0).abs() < f64::EPSILON);
        assert_eq!(policy.cooldown(), Duration::from_secs(30));
    }
}
