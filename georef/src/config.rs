//! Settings shared by every file in a run.

use crate::{
    crs::Crs,
    errors::Error,
    matcher::{FuzzyMatcher, DEFAULT_THRESHOLD},
    similarity::SimilarityMetric,
    tolerance::{ToleranceValidator, DEFAULT_TOLERANCE_RATIO},
    Result,
};

/// How to match and validate detections.
#[derive(Clone, Debug, PartialEq)]
pub struct MatchConfig {
    /// Minimum similarity for a detection to match a place name, in `[0, 1]`.
    pub threshold: f64,
    /// How to measure similarity.
    pub metric: SimilarityMetric,
    /// How much slack to allow around each detection, in multiples of the
    /// detection's own width and height.
    pub tolerance_ratio: f64,
    /// The reference system of the coordinates in detection files.
    pub detection_crs: Crs,
    /// The reference system of the gazetteer.
    pub gazetteer_crs: Crs,
    /// The reference system to compare things in. If `None`, we use
    /// `gazetteer_crs`.
    pub working_crs: Option<Crs>,
    /// Lower-case gazetteer names before comparing them.
    pub fold_gazetteer_case: bool,
}

impl Default for MatchConfig {
    /// Detection files in Web Mercator, and a gazetteer in ETRS89 / UTM 32N.
    fn default() -> Self {
        MatchConfig {
            threshold: DEFAULT_THRESHOLD,
            metric: SimilarityMetric::default(),
            tolerance_ratio: DEFAULT_TOLERANCE_RATIO,
            detection_crs: Crs::WEB_MERCATOR,
            gazetteer_crs: Crs::UTM32N_ETRS89,
            working_crs: None,
            fold_gazetteer_case: false,
        }
    }
}

impl MatchConfig {
    /// The reference system we actually work in.
    pub fn working_crs(&self) -> Crs {
        self.working_crs.unwrap_or(self.gazetteer_crs)
    }

    /// Check that our values make sense.
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.threshold) {
            return Err(Error::invalid_config(format!(
                "threshold must be between 0 and 1, found {}",
                self.threshold
            )));
        }
        if !(self.tolerance_ratio >= 0.0 && self.tolerance_ratio.is_finite()) {
            return Err(Error::invalid_config(format!(
                "tolerance ratio must be a non-negative number, found {}",
                self.tolerance_ratio
            )));
        }
        Ok(())
    }

    /// Build a matcher using these settings.
    pub fn matcher(&self) -> FuzzyMatcher {
        FuzzyMatcher::new(self.metric, self.threshold).fold_case(self.fold_gazetteer_case)
    }

    /// Build a tolerance validator using these settings.
    pub fn validator(&self) -> ToleranceValidator {
        ToleranceValidator::new(self.tolerance_ratio)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = MatchConfig::default();
        config.validate().unwrap();
        assert_eq!(0.8, config.threshold);
        assert_eq!(1.0, config.tolerance_ratio);
        assert_eq!(Crs::UTM32N_ETRS89, config.working_crs());
    }

    #[test]
    fn working_crs_can_be_overridden() {
        let config = MatchConfig {
            working_crs: Some(Crs::WEB_MERCATOR),
            ..MatchConfig::default()
        };
        assert_eq!(Crs::WEB_MERCATOR, config.working_crs());
    }

    #[test]
    fn out_of_range_values_are_rejected() {
        for threshold in [-0.1, 1.01, f64::NAN] {
            let config = MatchConfig {
                threshold,
                ..MatchConfig::default()
            };
            assert!(
                matches!(config.validate(), Err(Error::InvalidConfig { .. })),
                "threshold {}",
                threshold
            );
        }
        for tolerance_ratio in [-1.0, f64::INFINITY, f64::NAN] {
            let config = MatchConfig {
                tolerance_ratio,
                ..MatchConfig::default()
            };
            assert!(config.validate().is_err(), "ratio {}", tolerance_ratio);
        }
    }
}
