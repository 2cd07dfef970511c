/// Engine configuration: limits, thresholds, vocabulary lists and
/// required-field rules, loadable from RON.
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::schema::record::ServicePeriod;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("RON deserialization error: {0}")]
    Ron(#[from] ron::error::SpannedError),
    #[error("invalid crowd keyword pattern: {0}")]
    Keyword(#[from] regex::Error),
    #[error("invalid setting: {0}")]
    Invalid(String),
}

/// Keyword fragments for crowd classification. Each entry is a regex
/// fragment; entries are alternated and matched case-insensitively.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrowdKeywords {
    pub busy: Vec<String>,
    pub quiet: Vec<String>,
}

impl Default for CrowdKeywords {
    fn default() -> Self {
        Self {
            busy: [
                "満席",
                "混み",
                "混ん",
                "行列",
                "並ん",
                "立て込",
                "ばたつ",
                "ぎゅうぎゅう",
                "詰ま",
                r"(?:^|\D)(?:[7-9]\d|100)\s*[%％]",
                r"(?:^|\D)(?:[7-9]|10)\s*割",
                "[七八九十]割",
                "full",
                "crowded",
                "packed",
                "queue",
                "busy",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            quiet: [
                "空席",
                "空いて",
                "ガラガラ",
                "がらがら",
                "落ち着",
                "暇",
                "ゆったり",
                r"(?:^|\D)[1-3]?\d\s*[%％]",
                r"(?:^|\D)[0-3]\s*割",
                "[一二三]割",
                "empty seats",
                "calm",
                "slow",
                "quiet",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        }
    }
}

/// Which fields must be filled before a record may be narrated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Requirements {
    pub weather_required_for: Vec<ServicePeriod>,
    pub customers: bool,
    pub peak: bool,
    pub best_sellers: bool,
}

impl Default for Requirements {
    fn default() -> Self {
        Self {
            weather_required_for: vec![ServicePeriod::Lunch],
            customers: true,
            peak: true,
            best_sellers: true,
        }
    }
}

/// Tunable engine settings. `Default` reproduces the stock behaviour.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Upper bound on core sentences; the one extra clause and the notice
    /// follow them.
    pub max_sentences: usize,
    /// Lunch peaks starting at or after this hour allow a calm opening.
    pub calm_start_from_hour: u32,
    /// Probability that dinner reports quote the raw crowd feel.
    pub feel_detail_chance: f64,
    /// Phrases that never reach the output.
    pub forbidden: Vec<String>,
    /// Closing-task vocabulary stripped from lunch reports.
    pub closing_vocabulary: Vec<String>,
    pub notice_label: String,
    pub crowd_keywords: CrowdKeywords,
    pub requirements: Requirements,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_sentences: 3,
            calm_start_from_hour: 12,
            feel_detail_chance: 0.5,
            forbidden: [
                "今日の流れを共有します",
                "本日の流れを共有します",
                "共有します",
                "着席率",
                "推移",
                "回転",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            closing_vocabulary: vec!["片づけ".to_string(), "片付け".to_string()],
            notice_label: "連絡事項：".to_string(),
            crowd_keywords: CrowdKeywords::default(),
            requirements: Requirements::default(),
        }
    }
}

impl EngineConfig {
    /// Load a config from a RON file. Missing fields take their defaults.
    pub fn load_from_ron(path: &Path) -> Result<EngineConfig, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse_ron(&contents)
    }

    /// Parse a config from a RON string.
    pub fn parse_ron(input: &str) -> Result<EngineConfig, ConfigError> {
        let config: EngineConfig = ron::from_str(input)?;
        config.check()?;
        Ok(config)
    }

    /// Reject settings the engine cannot honour.
    pub fn check(&self) -> Result<(), ConfigError> {
        if self.max_sentences == 0 {
            return Err(ConfigError::Invalid(
                "max_sentences must be at least 1".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.feel_detail_chance) {
            return Err(ConfigError::Invalid(format!(
                "feel_detail_chance must be within 0.0..=1.0, got {}",
                self.feel_detail_chance
            )));
        }
        if self.forbidden.iter().any(|w| w.is_empty()) {
            return Err(ConfigError::Invalid(
                "forbidden phrases must be non-empty".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_stock_behaviour() {
        let cfg = EngineConfig::default();
        assert_eq!(cfg.max_sentences, 3);
        assert_eq!(cfg.calm_start_from_hour, 12);
        assert!(cfg.forbidden.contains(&"着席率".to_string()));
        assert_eq!(
            cfg.requirements.weather_required_for,
            vec![ServicePeriod::Lunch]
        );
        assert!(cfg.check().is_ok());
    }

    #[test]
    fn partial_ron_keeps_defaults() {
        let cfg = EngineConfig::parse_ron("(max_sentences: 2, calm_start_from_hour: 13)").unwrap();
        assert_eq!(cfg.max_sentences, 2);
        assert_eq!(cfg.calm_start_from_hour, 13);
        assert_eq!(cfg.notice_label, "連絡事項：");
        assert_eq!(cfg.crowd_keywords, CrowdKeywords::default());
    }

    #[test]
    fn requirements_from_ron() {
        let cfg = EngineConfig::parse_ron(
            "(requirements: (weather_required_for: [Lunch, Dinner], best_sellers: false))",
        )
        .unwrap();
        assert_eq!(
            cfg.requirements.weather_required_for,
            vec![ServicePeriod::Lunch, ServicePeriod::Dinner]
        );
        assert!(!cfg.requirements.best_sellers);
        assert!(cfg.requirements.customers);
    }

    #[test]
    fn partial_requirements_keep_weather_rule() {
        let cfg = EngineConfig::parse_ron("(requirements: (peak: false))").unwrap();
        assert!(!cfg.requirements.peak);
        assert_eq!(
            cfg.requirements.weather_required_for,
            vec![ServicePeriod::Lunch]
        );
    }

    #[test]
    fn zero_sentences_rejected() {
        assert!(matches!(
            EngineConfig::parse_ron("(max_sentences: 0)"),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn out_of_range_chance_rejected() {
        assert!(EngineConfig::parse_ron("(feel_detail_chance: 1.5)").is_err());
    }

    #[test]
    fn malformed_ron_is_error() {
        assert!(matches!(
            EngineConfig::parse_ron("(max_sentences: )"),
            Err(ConfigError::Ron(_))
        ));
    }
}
