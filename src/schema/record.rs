use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::config::Requirements;
use crate::core::normalize::{is_blank, merge_tags, normalize};

/// Which service the report narrates. Lunch narrates the start of the day;
/// dinner narrates the later half and may mention closing work.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ServicePeriod {
    Lunch,
    Dinner,
}

impl ServicePeriod {
    /// Returns the tag string for this period (e.g., "service:lunch").
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Lunch => "service:lunch",
            Self::Dinner => "service:dinner",
        }
    }
}

/// Observations about one service period. Immutable input to a single
/// generation call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObservationRecord {
    pub service: ServicePeriod,
    #[serde(default)]
    pub weather: String,
    #[serde(default)]
    pub customer_tags: Vec<String>,
    #[serde(default)]
    pub customer_free_text: String,
    /// `"H[:MM]-H[:MM]"`, e.g. `"12-14"`.
    pub peak_range: String,
    /// Subjective fullness, free text.
    #[serde(default)]
    pub crowd_feel: String,
    #[serde(default)]
    pub best_seller_tags: Vec<String>,
    #[serde(default)]
    pub best_seller_free_text: String,
    #[serde(default)]
    pub event_present: bool,
    #[serde(default)]
    pub event_name: String,
    #[serde(default)]
    pub notice: String,
}

impl ObservationRecord {
    /// An empty record for the given period. Fill fields with struct
    /// update syntax or the `with_*` helpers.
    pub fn new(service: ServicePeriod, peak_range: &str) -> Self {
        Self {
            service,
            weather: String::new(),
            customer_tags: Vec::new(),
            customer_free_text: String::new(),
            peak_range: peak_range.to_string(),
            crowd_feel: String::new(),
            best_seller_tags: Vec::new(),
            best_seller_free_text: String::new(),
            event_present: false,
            event_name: String::new(),
            notice: String::new(),
        }
    }

    pub fn with_weather(mut self, weather: &str) -> Self {
        self.weather = weather.to_string();
        self
    }

    pub fn with_customers(mut self, tags: &[&str], free_text: &str) -> Self {
        self.customer_tags = tags.iter().map(|s| s.to_string()).collect();
        self.customer_free_text = free_text.to_string();
        self
    }

    pub fn with_best_sellers(mut self, tags: &[&str], free_text: &str) -> Self {
        self.best_seller_tags = tags.iter().map(|s| s.to_string()).collect();
        self.best_seller_free_text = free_text.to_string();
        self
    }

    pub fn with_crowd_feel(mut self, feel: &str) -> Self {
        self.crowd_feel = feel.to_string();
        self
    }

    pub fn with_event(mut self, name: &str) -> Self {
        self.event_present = true;
        self.event_name = name.to_string();
        self
    }

    pub fn with_notice(mut self, notice: &str) -> Self {
        self.notice = notice.to_string();
        self
    }

    /// Selected customer tags followed by free-text entries, deduplicated.
    pub fn customers(&self) -> Vec<String> {
        merge_tags(&self.customer_tags, &self.customer_free_text)
    }

    /// Selected best sellers followed by free-text entries, deduplicated.
    /// The first two survivors are the ones a report names.
    pub fn best_sellers(&self) -> Vec<String> {
        merge_tags(&self.best_seller_tags, &self.best_seller_free_text)
    }

    /// The event name, only when an event was flagged and named.
    pub fn event_name(&self) -> Option<String> {
        if !self.event_present {
            return None;
        }
        let name = normalize(&self.event_name);
        (!name.is_empty()).then_some(name)
    }

    /// Check the record against the configured required fields. Reports
    /// the first missing field.
    pub fn validate(&self, requirements: &Requirements) -> Result<(), ValidationError> {
        if requirements.weather_required_for.contains(&self.service) && is_blank(&self.weather) {
            return Err(ValidationError::MissingWeather(self.service));
        }
        if requirements.customers && self.customers().is_empty() {
            return Err(ValidationError::MissingCustomers);
        }
        if requirements.peak && is_blank(&self.peak_range) {
            return Err(ValidationError::MissingPeak);
        }
        if requirements.best_sellers && self.best_sellers().is_empty() {
            return Err(ValidationError::MissingBestSellers);
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("weather is required for {0:?} reports")]
    MissingWeather(ServicePeriod),
    #[error("at least one customer type is required")]
    MissingCustomers,
    #[error("peak time range is required")]
    MissingPeak,
    #[error("at least one best seller is required")]
    MissingBestSellers,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lunch() -> ObservationRecord {
        ObservationRecord::new(ServicePeriod::Lunch, "12-14")
            .with_weather("晴れ")
            .with_customers(&["家族連れ"], "")
            .with_best_sellers(&["親子丼"], "")
    }

    #[test]
    fn service_tags() {
        assert_eq!(ServicePeriod::Lunch.tag(), "service:lunch");
        assert_eq!(ServicePeriod::Dinner.tag(), "service:dinner");
    }

    #[test]
    fn merged_lists_preserve_selection_then_free_text_order() {
        let r = lunch()
            .with_customers(&["学生", "会社員"], "観光客, 学生、シニア")
            .with_best_sellers(&["から揚げ"], "親子丼，から揚げ");
        assert_eq!(r.customers(), vec!["学生", "会社員", "観光客", "シニア"]);
        assert_eq!(r.best_sellers(), vec!["から揚げ", "親子丼"]);
    }

    #[test]
    fn event_name_requires_flag_and_text() {
        let mut r = lunch();
        r.event_name = "縁日".to_string();
        assert_eq!(r.event_name(), None);
        r.event_present = true;
        assert_eq!(r.event_name(), Some("縁日".to_string()));
        r.event_name = "   ".to_string();
        assert_eq!(r.event_name(), None);
    }

    #[test]
    fn complete_lunch_record_validates() {
        assert_eq!(lunch().validate(&Requirements::default()), Ok(()));
    }

    #[test]
    fn lunch_requires_weather_dinner_does_not() {
        let mut r = lunch();
        r.weather = "  ".to_string();
        assert_eq!(
            r.validate(&Requirements::default()),
            Err(ValidationError::MissingWeather(ServicePeriod::Lunch))
        );
        r.service = ServicePeriod::Dinner;
        assert_eq!(r.validate(&Requirements::default()), Ok(()));
    }

    #[test]
    fn first_missing_field_is_reported() {
        let r = ObservationRecord::new(ServicePeriod::Dinner, " ");
        assert_eq!(
            r.validate(&Requirements::default()),
            Err(ValidationError::MissingCustomers)
        );
        let r = r.with_customers(&[], "学生");
        assert_eq!(
            r.validate(&Requirements::default()),
            Err(ValidationError::MissingPeak)
        );
        let mut r = r;
        r.peak_range = "19-20".to_string();
        assert_eq!(
            r.validate(&Requirements::default()),
            Err(ValidationError::MissingBestSellers)
        );
    }

    #[test]
    fn relaxed_requirements() {
        let req = Requirements {
            weather_required_for: Vec::new(),
            customers: false,
            peak: false,
            best_sellers: false,
        };
        let r = ObservationRecord::new(ServicePeriod::Lunch, "");
        assert_eq!(r.validate(&req), Ok(()));
    }

    #[test]
    fn record_from_ron_with_defaults() {
        let r: ObservationRecord = ron::from_str(
            r#"(service: Dinner, peak_range: "19-20", customer_tags: ["会社員"], best_seller_free_text: "から揚げ")"#,
        )
        .unwrap();
        assert_eq!(r.service, ServicePeriod::Dinner);
        assert!(r.weather.is_empty());
        assert_eq!(r.customers(), vec!["会社員"]);
        assert_eq!(r.best_sellers(), vec!["から揚げ"]);
        assert!(!r.event_present);
    }
}
