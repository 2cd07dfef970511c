/// The report pipeline: ObservationRecord → text.
///
/// Wires together normalization, time formatting, crowd classification,
/// guarded phrase selection, composition, and final cleanup.
use rustc_hash::FxHashSet;
use std::path::Path;
use thiserror::Error;

use crate::core::compose::{self, Clauses};
use crate::core::config::{ConfigError, EngineConfig};
use crate::core::crowd::CrowdClassifier;
use crate::core::draw::{choose, RandomSource};
use crate::core::guard;
use crate::core::normalize::{headline_pair, join_natural, normalize};
use crate::core::phrasebook::{Field, FieldValues, Phrasebook, PhrasebookError};
use crate::core::sanitize;
use crate::core::timefmt::{format_range, format_start};
use crate::schema::crowd::CrowdLevel;
use crate::schema::record::{ObservationRecord, ValidationError};

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("phrasebook error: {0}")]
    Phrasebook(#[from] PhrasebookError),
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("invalid record: {0}")]
    Validation(#[from] ValidationError),
}

/// The one optional closing clause a report may carry. Drawn once, so a
/// report never has more than one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtraKind {
    /// Lunch: a quote of the crowd feel. Dinner: tidying on a quiet night.
    Aside,
    Event,
    Nothing,
}

impl ExtraKind {
    pub const ALL: [ExtraKind; 3] = [ExtraKind::Aside, ExtraKind::Event, ExtraKind::Nothing];

    pub fn slot(&self) -> Option<&'static str> {
        match self {
            Self::Aside => Some("aside"),
            Self::Event => Some("event"),
            Self::Nothing => None,
        }
    }
}

/// The report engine. Built via `ReportEngine::builder()`.
///
/// Holds only read-only tables; every call to [`ReportEngine::generate`]
/// derives its state fresh, so one engine can serve concurrent callers.
#[derive(Debug, Clone)]
pub struct ReportEngine {
    phrasebook: Phrasebook,
    config: EngineConfig,
    classifier: CrowdClassifier,
}

/// Builder for constructing a `ReportEngine`.
pub struct ReportEngineBuilder {
    config_path: Option<String>,
    phrasebook_paths: Vec<String>,
    builtin_phrases: bool,
    /// Directly provided config (for testing without files).
    config: Option<EngineConfig>,
    /// Directly provided phrases, merged over the built-in pools.
    phrasebook: Option<Phrasebook>,
}

impl ReportEngine {
    pub fn builder() -> ReportEngineBuilder {
        ReportEngineBuilder {
            config_path: None,
            phrasebook_paths: Vec::new(),
            builtin_phrases: true,
            config: None,
            phrasebook: None,
        }
    }

    /// Default configuration with the built-in phrasebook.
    pub fn builtin() -> Result<ReportEngine, EngineError> {
        Self::builder().build()
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn phrasebook(&self) -> &Phrasebook {
        &self.phrasebook
    }

    pub fn classify(&self, feel: &str) -> CrowdLevel {
        self.classifier.classify(feel)
    }

    /// Generate a report for a record the caller has already validated.
    ///
    /// Never fails: malformed sub-fields degrade to their raw text and
    /// empty slots are left out.
    pub fn generate(&self, record: &ObservationRecord, rng: &mut dyn RandomSource) -> String {
        let crowd = self.classifier.classify(&record.crowd_feel);
        tracing::debug!(service = ?record.service, ?crowd, "generating report");

        let tags = guard::context_tags(record, crowd, &self.config);
        let values = field_values(record);
        let clauses = self.draw_clauses(record, &tags, &values, rng);

        // Only the core sentences are clamped. The single extra and the
        // notice follow the clamped body.
        let body = compose::compose(record.service, &clauses);
        let body = sanitize::clamp_sentences(&sanitize::polish(&body), self.config.max_sentences);
        let notice = compose::notice_sentence(&self.config.notice_label, &record.notice);
        let text = compose::join_sentences(&[body, clauses.extra, notice]);

        // Closing vocabulary joins the forbidden list for lunch so a removal
        // can never splice one back together.
        let mut banned: Vec<&str> = self.config.forbidden.iter().map(String::as_str).collect();
        if guard::bans_closing_vocabulary(record.service) {
            banned.extend(self.config.closing_vocabulary.iter().map(String::as_str));
        }
        sanitize::polish(&sanitize::strip_forbidden(&text, &banned))
    }

    /// Validate against the configured requirements, then generate.
    pub fn generate_checked(
        &self,
        record: &ObservationRecord,
        rng: &mut dyn RandomSource,
    ) -> Result<String, EngineError> {
        record.validate(&self.config.requirements)?;
        Ok(self.generate(record, rng))
    }

    /// Generate `count` candidate reports from successive draws.
    pub fn generate_variants(
        &self,
        record: &ObservationRecord,
        count: usize,
        rng: &mut dyn RandomSource,
    ) -> Vec<String> {
        (0..count).map(|_| self.generate(record, rng)).collect()
    }

    fn draw_clauses(
        &self,
        record: &ObservationRecord,
        tags: &FxHashSet<String>,
        values: &FieldValues,
        rng: &mut dyn RandomSource,
    ) -> Clauses {
        let book = &self.phrasebook;
        let opening = book.select("opening", tags, values, rng);

        let mut tags = tags.clone();
        if guard::opening_is_closed(&opening) {
            tags.insert(guard::TAG_CLOSED_OPENING.to_string());
        }
        let tags = &tags;

        let mut clauses = Clauses {
            opening,
            start: book.select("start", tags, values, rng),
            customers: book.select("customers", tags, values, rng),
            peak: book.select("peak", tags, values, rng),
            ..Clauses::default()
        };

        if guard::quotes_feel_inline(record.service)
            && tags.contains("has:feel")
            && rng.chance(self.config.feel_detail_chance)
        {
            clauses.feel_detail = book.select("feel_detail", tags, values, rng);
        }

        clauses.crowd_summary = book.select("crowd_summary", tags, values, rng);
        clauses.best_seller = book.select("best_seller", tags, values, rng);

        let extra = choose(&ExtraKind::ALL, rng)
            .copied()
            .unwrap_or(ExtraKind::Nothing);
        tracing::trace!(?extra, "extra clause kind");
        if let Some(slot) = extra.slot() {
            clauses.extra = book.select(slot, tags, values, rng);
        }

        clauses
    }
}

/// Render every template field from the record.
pub fn field_values(record: &ObservationRecord) -> FieldValues {
    let peak = normalize(&record.peak_range);
    let mut values = FieldValues::default();
    values.set(Field::Weather, normalize(&record.weather));
    values.set(Field::Customers, join_natural(&record.customers()));
    values.set(Field::Peak, format_range(&peak));
    values.set(Field::PeakStart, format_start(&peak));
    values.set(Field::BestSellers, headline_pair(&record.best_sellers()));
    values.set(Field::Feel, normalize(&record.crowd_feel));
    values.set(Field::Event, record.event_name().unwrap_or_default());
    values
}

impl ReportEngineBuilder {
    /// Load the config from a RON file.
    pub fn config_path(mut self, path: &str) -> Self {
        self.config_path = Some(path.to_string());
        self
    }

    /// Merge a phrasebook RON file over the pools loaded so far. Repeatable;
    /// later files win.
    pub fn phrasebook_path(mut self, path: &str) -> Self {
        self.phrasebook_paths.push(path.to_string());
        self
    }

    /// Start from an empty phrasebook instead of the built-in pools.
    pub fn without_builtin_phrases(mut self) -> Self {
        self.builtin_phrases = false;
        self
    }

    /// Provide config directly (for testing without files).
    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Provide phrases directly (for testing without files).
    pub fn with_phrasebook(mut self, phrasebook: Phrasebook) -> Self {
        self.phrasebook = Some(phrasebook);
        self
    }

    pub fn build(self) -> Result<ReportEngine, EngineError> {
        let config = match (self.config, self.config_path) {
            (Some(config), _) => config,
            (None, Some(path)) => EngineConfig::load_from_ron(Path::new(&path))?,
            (None, None) => EngineConfig::default(),
        };
        config.check()?;

        let mut phrasebook = if self.builtin_phrases {
            Phrasebook::builtin()?
        } else {
            Phrasebook::default()
        };
        if let Some(direct) = self.phrasebook {
            phrasebook.merge(direct);
        }
        for path in &self.phrasebook_paths {
            phrasebook.merge(Phrasebook::load_from_ron(Path::new(path))?);
        }

        let classifier = CrowdClassifier::new(&config.crowd_keywords)?;
        tracing::debug!(slots = phrasebook.slots.len(), "report engine built");

        Ok(ReportEngine {
            phrasebook,
            config,
            classifier,
        })
    }
}
