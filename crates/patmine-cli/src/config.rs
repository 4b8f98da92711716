//! Analysis configuration from a TOML file plus command line overrides.
//!
//! Keys use the same camelCase names as the JSON form of
//! [`AnalysisConfig`]; tables nest the cleaning, mining and field options:
//!
//! ```toml
//! maxPatterns = 5
//! minConfidence = 0.7
//!
//! [mining]
//! maxItemsetSize = 3
//!
//! [fields]
//! date = ["closed_on", "date"]
//! ```

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, ensure};
use tracing::debug;

use patmine_model::AnalysisConfig;

/// Values given explicitly on the command line. `None` keeps the file value.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ConfigOverrides {
    pub max_patterns: Option<usize>,
    pub min_confidence: Option<f64>,
    pub min_support: Option<f64>,
    pub max_itemset_size: Option<usize>,
}

impl ConfigOverrides {
    #[must_use]
    pub fn apply(self, mut config: AnalysisConfig) -> AnalysisConfig {
        if let Some(max_patterns) = self.max_patterns {
            config = config.with_max_patterns(max_patterns);
        }
        if let Some(min_confidence) = self.min_confidence {
            config = config.with_min_confidence(min_confidence);
        }
        if let Some(min_support) = self.min_support {
            config = config.with_min_support(min_support);
        }
        if let Some(size) = self.max_itemset_size {
            config = config.with_max_itemset_size(size);
        }
        config
    }
}

pub fn parse_config(text: &str) -> Result<AnalysisConfig> {
    toml::from_str(text).context("parse analysis config")
}

pub fn load_config(path: &Path) -> Result<AnalysisConfig> {
    let text = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    parse_config(&text).with_context(|| format!("load config {}", path.display()))
}

/// Defaults, then the optional file, then explicit overrides.
///
/// # Errors
///
/// Fails when the file cannot be read or parsed, or when a threshold of the
/// merged configuration lies outside `[0, 1]`.
pub fn resolve_config(path: Option<&Path>, overrides: ConfigOverrides) -> Result<AnalysisConfig> {
    let base = match path {
        Some(path) => load_config(path)?,
        None => AnalysisConfig::default(),
    };
    let config = overrides.apply(base);
    check_config(&config)?;
    debug!(
        max_patterns = config.max_patterns,
        min_confidence = config.min_confidence,
        min_support = config.min_support,
        max_itemset_size = config.mining.max_itemset_size,
        "resolved analysis config"
    );
    Ok(config)
}

fn check_config(config: &AnalysisConfig) -> Result<()> {
    ensure!(
        (0.0..=1.0).contains(&config.min_confidence),
        "minConfidence must lie in [0, 1], got {}",
        config.min_confidence
    );
    ensure!(
        (0.0..=1.0).contains(&config.min_support),
        "minSupport must lie in [0, 1], got {}",
        config.min_support
    );
    ensure!(
        config.mining.max_itemset_size >= 2,
        "maxItemsetSize must be at least 2, got {}",
        config.mining.max_itemset_size
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nested_tables_fill_defaults() {
        let config = parse_config(
            r#"
            maxPatterns = 4

            [mining]
            maxItemsetSize = 3

            [fields]
            date = ["closed_on"]
            "#,
        )
        .expect("parse");
        assert_eq!(config.max_patterns, 4);
        assert_eq!(config.mining.max_itemset_size, 3);
        assert_eq!(config.fields.date_fields(), vec!["closed_on"]);
        assert_eq!(config.fields.value_fields(), vec!["value", "amount", "revenue"]);
        assert!((config.min_support - 0.1).abs() < f64::EPSILON);
    }

    #[test]
    fn overrides_win_over_file_values() {
        let file = parse_config("maxPatterns = 4\nminConfidence = 0.9").expect("parse");
        let config = ConfigOverrides {
            max_patterns: Some(2),
            min_support: Some(0.25),
            ..ConfigOverrides::default()
        }
        .apply(file);
        assert_eq!(config.max_patterns, 2);
        assert!((config.min_confidence - 0.9).abs() < f64::EPSILON);
        assert!((config.min_support - 0.25).abs() < f64::EPSILON);
    }

    #[test]
    fn out_of_range_thresholds_are_rejected() {
        let overrides = ConfigOverrides {
            min_confidence: Some(1.5),
            ..ConfigOverrides::default()
        };
        let error = resolve_config(None, overrides).expect_err("must fail");
        assert!(error.to_string().contains("minConfidence"), "{error}");
    }

    #[test]
    fn unknown_value_types_fail_to_parse() {
        assert!(parse_config("maxPatterns = \"many\"").is_err());
    }
}
