//! Run configuration: engine parameters plus the column layout of both input tables.
//!
//! Every field has a default, so an empty YAML document is a valid configuration.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8000";
pub const BIND_ENV: &str = "TRIBUNAL_BIND";
pub const CONFIG_ENV: &str = "TRIBUNAL_CONFIG";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// What to do with a trailing group of fewer than `committee_size` evaluators in a slot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PartialCommitteePolicy {
    /// Emit the undersized committee and record a warning.
    #[default]
    Keep,
    /// Discard the undersized committee and record a warning.
    Drop,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Evaluators per committee (K).
    pub committee_size: usize,
    pub slot_count: usize,
    /// Rebalancing target: committees below this are emptied and refilled.
    pub min_cases: usize,
    /// Capacity of a committee.
    pub max_cases: usize,
    pub seed: u64,
    /// Restrict the run to these organizational groups. `None` processes every group.
    pub groups: Option<Vec<String>>,
    pub partial_committees: PartialCommitteePolicy,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            committee_size: 3,
            slot_count: 6,
            min_cases: 4,
            max_cases: 6,
            seed: 42,
            groups: None,
            partial_committees: PartialCommitteePolicy::Keep,
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.committee_size == 0 {
            return Err(ConfigError::Invalid("committee_size must be at least 1".into()));
        }
        if self.slot_count == 0 {
            return Err(ConfigError::Invalid("slot_count must be at least 1".into()));
        }
        if self.min_cases == 0 || self.max_cases == 0 {
            return Err(ConfigError::Invalid("min_cases and max_cases must be at least 1".into()));
        }
        if self.min_cases > self.max_cases {
            return Err(ConfigError::Invalid(format!(
                "min_cases ({}) must not exceed max_cases ({})",
                self.min_cases, self.max_cases
            )));
        }
        Ok(())
    }

    pub fn includes_group(&self, group: &str) -> bool {
        self.groups
            .as_ref()
            .map_or(true, |groups| groups.iter().any(|g| g == group))
    }
}

/// Column layout of the availability workbook: one sheet per organizational group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AvailabilityLayout {
    /// Header rows above the data; their cells are joined into slot labels.
    pub header_rows: usize,
    pub id_column: usize,
    pub participation_column: usize,
    pub weight_column: Option<usize>,
    pub first_slot_column: usize,
    /// Trailing sheets that are not groups (summary sheets).
    pub skip_trailing_sheets: usize,
    /// Cell values meaning "available", compared case-insensitively after trimming.
    pub available_markers: Vec<String>,
}

impl Default for AvailabilityLayout {
    fn default() -> Self {
        Self {
            header_rows: 3,
            id_column: 1,
            participation_column: 2,
            weight_column: Some(3),
            first_slot_column: 4,
            skip_trailing_sheets: 1,
            available_markers: vec!["Sí".to_string(), "Si".to_string()],
        }
    }
}

/// Column layout of the flat case table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaseLayout {
    /// Sheet to read; the first sheet when unset.
    pub sheet: Option<String>,
    pub header_rows: usize,
    pub id_column: usize,
    pub name_column: usize,
    pub sponsor_column: usize,
    /// Category column; the last column of each row when unset.
    pub category_column: Option<usize>,
}

impl Default for CaseLayout {
    fn default() -> Self {
        Self {
            sheet: None,
            header_rows: 1,
            id_column: 1,
            name_column: 2,
            sponsor_column: 6,
            category_column: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    pub engine: EngineConfig,
    pub availability: AvailabilityLayout,
    pub cases: CaseLayout,
}

impl RunConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&raw)
    }

    pub fn from_yaml_str(raw: &str) -> Result<Self, ConfigError> {
        let config: RunConfig = if raw.trim().is_empty() {
            RunConfig::default()
        } else {
            serde_yaml::from_str(raw)?
        };
        config.validate()?;
        Ok(config)
    }

    /// Loads `path` when given, defaults otherwise.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.engine.validate()?;
        if self.availability.header_rows == 0 {
            return Err(ConfigError::Invalid(
                "availability.header_rows must be at least 1 (slot labels live there)".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_yaml_yields_defaults() {
        let config = RunConfig::from_yaml_str("").expect("empty config is valid");
        assert_eq!(config, RunConfig::default());
        assert_eq!(config.engine.committee_size, 3);
        assert_eq!(config.engine.seed, 42);
        assert_eq!(config.engine.partial_committees, PartialCommitteePolicy::Keep);
    }

    #[test]
    fn partial_yaml_overrides_only_named_fields() {
        let config = RunConfig::from_yaml_str(
            "engine:\n  seed: 7\n  partial_committees: drop\n  groups: [physics]\ncases:\n  sponsor_column: 4\n",
        )
        .expect("config should parse");
        assert_eq!(config.engine.seed, 7);
        assert_eq!(config.engine.max_cases, 6);
        assert_eq!(config.engine.partial_committees, PartialCommitteePolicy::Drop);
        assert!(config.engine.includes_group("physics"));
        assert!(!config.engine.includes_group("chemistry"));
        assert_eq!(config.cases.sponsor_column, 4);
        assert_eq!(config.cases.id_column, 1);
    }

    #[test]
    fn inverted_bounds_are_rejected() {
        let err = RunConfig::from_yaml_str("engine:\n  min_cases: 7\n  max_cases: 6\n")
            .expect_err("min above max must fail");
        assert!(err.to_string().contains("min_cases"));
    }

    #[test]
    fn yaml_round_trips_through_defaults() {
        let yaml = RunConfig::default().to_yaml().expect("serializes");
        assert!(yaml.contains("committee_size: 3"));
        let back = RunConfig::from_yaml_str(&yaml).expect("parses back");
        assert_eq!(back, RunConfig::default());
    }
}
