/// Crowd classification: maps free-text "how full did it feel" notes onto
/// a `CrowdLevel`. This is the only place busyness is inferred.
use regex::{Regex, RegexBuilder};

use crate::core::config::{ConfigError, CrowdKeywords};
use crate::core::normalize::normalize;
use crate::schema::crowd::CrowdLevel;

/// Compiled busy/quiet keyword sets. Busy is checked first; no match means
/// `Normal`.
#[derive(Debug, Clone)]
pub struct CrowdClassifier {
    busy: Option<Regex>,
    quiet: Option<Regex>,
}

impl CrowdClassifier {
    pub fn new(keywords: &CrowdKeywords) -> Result<Self, ConfigError> {
        Ok(Self {
            busy: compile(&keywords.busy)?,
            quiet: compile(&keywords.quiet)?,
        })
    }

    pub fn classify(&self, feel: &str) -> CrowdLevel {
        let feel = normalize(feel);
        if feel.is_empty() {
            return CrowdLevel::Normal;
        }
        if matches(&self.busy, &feel) {
            CrowdLevel::Busy
        } else if matches(&self.quiet, &feel) {
            CrowdLevel::Quiet
        } else {
            CrowdLevel::Normal
        }
    }
}

fn compile(fragments: &[String]) -> Result<Option<Regex>, ConfigError> {
    let alternatives: Vec<String> = fragments
        .iter()
        .filter(|f| !f.is_empty())
        .map(|f| format!("(?:{})", f))
        .collect();
    if alternatives.is_empty() {
        return Ok(None);
    }
    let regex = RegexBuilder::new(&alternatives.join("|"))
        .case_insensitive(true)
        .build()?;
    Ok(Some(regex))
}

fn matches(regex: &Option<Regex>, text: &str) -> bool {
    regex.as_ref().is_some_and(|r| r.is_match(text))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classifier() -> CrowdClassifier {
        CrowdClassifier::new(&CrowdKeywords::default()).unwrap()
    }

    #[test]
    fn busy_keywords() {
        let c = classifier();
        for feel in ["ほぼ満席", "行列ができた", "かなり混んでいた", "12時台は立て込んだ", "Packed at noon", "long QUEUE"] {
            assert_eq!(c.classify(feel), CrowdLevel::Busy, "{}", feel);
        }
    }

    #[test]
    fn quiet_keywords() {
        let c = classifier();
        for feel in ["空席が目立った", "落ち着いていた", "ガラガラ", "calm afternoon", "slow day"] {
            assert_eq!(c.classify(feel), CrowdLevel::Quiet, "{}", feel);
        }
    }

    #[test]
    fn unrelated_text_is_normal() {
        let c = classifier();
        assert_eq!(c.classify("いつも通り"), CrowdLevel::Normal);
        assert_eq!(c.classify(""), CrowdLevel::Normal);
        assert_eq!(c.classify("   "), CrowdLevel::Normal);
    }

    #[test]
    fn percentages_and_fractions() {
        let c = classifier();
        assert_eq!(c.classify("80%"), CrowdLevel::Busy);
        assert_eq!(c.classify("体感95％くらい"), CrowdLevel::Busy);
        assert_eq!(c.classify("9割"), CrowdLevel::Busy);
        assert_eq!(c.classify("八割ほど"), CrowdLevel::Busy);
        assert_eq!(c.classify("30%"), CrowdLevel::Quiet);
        assert_eq!(c.classify("3割くらい"), CrowdLevel::Quiet);
        assert_eq!(c.classify("50%"), CrowdLevel::Normal);
        assert_eq!(c.classify("5割"), CrowdLevel::Normal);
    }

    #[test]
    fn busy_wins_over_quiet() {
        let c = classifier();
        assert_eq!(c.classify("最初は落ち着いていたが後半は満席"), CrowdLevel::Busy);
    }

    #[test]
    fn custom_keywords() {
        let c = CrowdClassifier::new(&CrowdKeywords {
            busy: vec!["hectic".to_string()],
            quiet: Vec::new(),
        })
        .unwrap();
        assert_eq!(c.classify("HECTIC"), CrowdLevel::Busy);
        assert_eq!(c.classify("満席"), CrowdLevel::Normal);
    }

    #[test]
    fn invalid_pattern_is_config_error() {
        let result = CrowdClassifier::new(&CrowdKeywords {
            busy: vec!["(unclosed".to_string()],
            quiet: Vec::new(),
        });
        assert!(matches!(result, Err(ConfigError::Keyword(_))));
    }
}
