//! Distances and thresholds used by the reconciliation passes.
//!
//! Defaults reproduce the established merge behavior. A TOML file may override
//! any subset of the fields; missing fields keep their defaults.
//!
//! ```toml
//! name_match_gap_m = 250.0
//! elevation_tolerance_m = 3.0
//! ```

use std::path::{Path, PathBuf};

use peak_model::SEARCH_BOX_RADIUS_M;
use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {source}")]
    Toml {
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid config: {field} {message}")]
    Invalid { field: &'static str, message: String },
}

/// Tunable parameters of the seven passes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MatchConfig {
    /// Pass 1: radius for close place names.
    pub close_name_radius_m: f64,
    /// Pass 2: radius for duplicate map peaks.
    pub duplicate_radius_m: f64,
    /// Pass 3: candidate radius for name matching.
    pub name_search_radius_m: f64,
    /// Pass 3: names are merged below this distance.
    pub name_match_gap_m: f64,
    /// Passes 2 and 3: minimum Jaro-Winkler score for equal names.
    pub name_similarity_threshold: f64,
    /// Pass 4: candidate radius for elevation matching.
    pub elevation_search_radius_m: f64,
    /// Pass 4: terrain points are merged below this distance.
    pub elevation_match_gap_m: f64,
    /// Pass 4: stricter distance for trigonometric survey points.
    pub survey_point_gap_m: f64,
    /// Pass 4: allowed elevation difference.
    pub elevation_tolerance_m: f64,
    /// Pass 6: candidate radius for leftover names and terrain points.
    pub residual_search_radius_m: f64,
    /// Pass 6: leftover names are merged below this distance.
    pub residual_match_gap_m: f64,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            close_name_radius_m: 50.0,
            duplicate_radius_m: 1000.0,
            name_search_radius_m: 1000.0,
            name_match_gap_m: 300.0,
            name_similarity_threshold: 0.9,
            elevation_search_radius_m: 300.0,
            elevation_match_gap_m: 50.0,
            survey_point_gap_m: 25.0,
            elevation_tolerance_m: 2.0,
            residual_search_radius_m: 300.0,
            residual_match_gap_m: 100.0,
        }
    }
}

impl MatchConfig {
    /// Parses and validates a TOML document.
    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        let config: Self =
            toml::from_str(contents).map_err(|source| ConfigError::Toml { source })?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&contents)
    }

    /// Checks that every distance is positive and every radius fits inside the
    /// precomputed search box.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let distances = [
            ("close_name_radius_m", self.close_name_radius_m),
            ("duplicate_radius_m", self.duplicate_radius_m),
            ("name_search_radius_m", self.name_search_radius_m),
            ("name_match_gap_m", self.name_match_gap_m),
            ("elevation_search_radius_m", self.elevation_search_radius_m),
            ("elevation_match_gap_m", self.elevation_match_gap_m),
            ("survey_point_gap_m", self.survey_point_gap_m),
            ("residual_search_radius_m", self.residual_search_radius_m),
            ("residual_match_gap_m", self.residual_match_gap_m),
        ];
        for (field, value) in distances {
            if !(value.is_finite() && value > 0.0) {
                return Err(invalid(field, format!("must be positive, got {value}")));
            }
        }
        if !(self.elevation_tolerance_m.is_finite() && self.elevation_tolerance_m >= 0.0) {
            return Err(invalid(
                "elevation_tolerance_m",
                format!("must not be negative, got {}", self.elevation_tolerance_m),
            ));
        }
        if !(self.name_similarity_threshold > 0.0 && self.name_similarity_threshold <= 1.0) {
            return Err(invalid(
                "name_similarity_threshold",
                format!("must be in (0, 1], got {}", self.name_similarity_threshold),
            ));
        }

        let radii = [
            ("close_name_radius_m", self.close_name_radius_m),
            ("duplicate_radius_m", self.duplicate_radius_m),
            ("name_search_radius_m", self.name_search_radius_m),
            ("elevation_search_radius_m", self.elevation_search_radius_m),
            ("residual_search_radius_m", self.residual_search_radius_m),
        ];
        for (field, value) in radii {
            if value > SEARCH_BOX_RADIUS_M {
                return Err(invalid(
                    field,
                    format!("exceeds the {SEARCH_BOX_RADIUS_M} m search box"),
                ));
            }
        }

        let gaps = [
            ("name_match_gap_m", self.name_match_gap_m, self.name_search_radius_m),
            (
                "elevation_match_gap_m",
                self.elevation_match_gap_m,
                self.elevation_search_radius_m,
            ),
            (
                "survey_point_gap_m",
                self.survey_point_gap_m,
                self.elevation_match_gap_m,
            ),
            (
                "residual_match_gap_m",
                self.residual_match_gap_m,
                self.residual_search_radius_m,
            ),
        ];
        for (field, gap, limit) in gaps {
            if gap > limit {
                return Err(invalid(field, format!("{gap} exceeds its limit of {limit}")));
            }
        }
        Ok(())
    }
}

fn invalid(field: &'static str, message: String) -> ConfigError {
    ConfigError::Invalid { field, message }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        MatchConfig::default().validate().unwrap();
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config = MatchConfig::from_toml("elevation_tolerance_m = 3.0\n").unwrap();
        assert_eq!(config.elevation_tolerance_m, 3.0);
        assert_eq!(config.name_match_gap_m, 300.0);
        assert_eq!(config.close_name_radius_m, 50.0);
    }

    #[test]
    fn unknown_field_is_rejected() {
        let err = MatchConfig::from_toml("max_gap = 10.0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Toml { .. }));
    }

    #[test]
    fn radius_beyond_search_box_is_rejected() {
        let err = MatchConfig::from_toml("duplicate_radius_m = 1500.0\n").unwrap_err();
        assert!(
            matches!(err, ConfigError::Invalid { field: "duplicate_radius_m", .. }),
            "{err}"
        );
    }

    #[test]
    fn gap_beyond_radius_is_rejected() {
        let err = MatchConfig::from_toml("residual_match_gap_m = 400.0\n").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                field: "residual_match_gap_m",
                ..
            }
        ));
    }

    #[test]
    fn threshold_must_be_a_similarity() {
        let config = MatchConfig {
            name_similarity_threshold: 1.5,
            ..MatchConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
