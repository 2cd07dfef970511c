/// Phrase pools: templates, tag-gated variants, RON loading, and slot
/// selection.
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

use crate::core::draw::RandomSource;

/// The phrase pools shipped with the crate.
const BUILTIN_PHRASEBOOK: &str = include_str!("../../data/phrasebook.ron");

#[derive(Debug, Error)]
pub enum PhrasebookError {
    #[error("template parse error: {0}")]
    TemplateParse(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("RON deserialization error: {0}")]
    Ron(#[from] ron::error::SpannedError),
}

/// A value a template can interpolate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Field {
    Weather,
    Customers,
    Peak,
    PeakStart,
    BestSellers,
    Feel,
    Event,
}

impl Field {
    pub const ALL: [Field; 7] = [
        Field::Weather,
        Field::Customers,
        Field::Peak,
        Field::PeakStart,
        Field::BestSellers,
        Field::Feel,
        Field::Event,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Weather => "weather",
            Self::Customers => "customers",
            Self::Peak => "peak",
            Self::PeakStart => "peak_start",
            Self::BestSellers => "best_sellers",
            Self::Feel => "feel",
            Self::Event => "event",
        }
    }

    pub fn from_name(name: &str) -> Option<Field> {
        Self::ALL.into_iter().find(|f| f.name() == name)
    }
}

/// A segment of a parsed template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TemplateSegment {
    /// Literal text, emitted as-is.
    Literal(String),
    /// Field interpolation: `{customers}`.
    Field(Field),
}

/// A parsed template: a sequence of segments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Template {
    pub segments: Vec<TemplateSegment>,
}

impl Template {
    /// Parse a template string into a sequence of segments.
    ///
    /// Syntax:
    /// - `{field}` → `Field` (see [`Field::name`])
    /// - `{{` / `}}` → literal brace
    /// - Everything else → `Literal`
    pub fn parse(input: &str) -> Result<Template, PhrasebookError> {
        let mut segments = Vec::new();
        let mut literal_buf = String::new();
        let chars: Vec<char> = input.chars().collect();
        let len = chars.len();
        let mut i = 0;

        while i < len {
            if chars[i] == '{' {
                if i + 1 < len && chars[i + 1] == '{' {
                    literal_buf.push('{');
                    i += 2;
                    continue;
                }

                if !literal_buf.is_empty() {
                    segments.push(TemplateSegment::Literal(std::mem::take(&mut literal_buf)));
                }

                let start = i + 1;
                let mut end = start;
                while end < len && chars[end] != '}' {
                    if chars[end] == '{' {
                        return Err(PhrasebookError::TemplateParse(
                            "nested braces are not allowed".to_string(),
                        ));
                    }
                    end += 1;
                }
                if end == len {
                    return Err(PhrasebookError::TemplateParse(
                        "unclosed brace".to_string(),
                    ));
                }

                let content: String = chars[start..end].iter().collect();
                if content.is_empty() {
                    return Err(PhrasebookError::TemplateParse(
                        "empty braces".to_string(),
                    ));
                }
                let field = Field::from_name(&content).ok_or_else(|| {
                    PhrasebookError::TemplateParse(format!("unknown field '{}'", content))
                })?;
                segments.push(TemplateSegment::Field(field));
                i = end + 1;
            } else if chars[i] == '}' {
                if i + 1 < len && chars[i + 1] == '}' {
                    literal_buf.push('}');
                    i += 2;
                    continue;
                }
                return Err(PhrasebookError::TemplateParse(
                    "unmatched closing brace".to_string(),
                ));
            } else {
                literal_buf.push(chars[i]);
                i += 1;
            }
        }

        if !literal_buf.is_empty() {
            segments.push(TemplateSegment::Literal(literal_buf));
        }

        Ok(Template { segments })
    }

    pub fn fields(&self) -> impl Iterator<Item = Field> + '_ {
        self.segments.iter().filter_map(|s| match s {
            TemplateSegment::Field(f) => Some(*f),
            TemplateSegment::Literal(_) => None,
        })
    }

    /// Literal text only, for vocabulary checks.
    pub fn literal_text(&self) -> String {
        self.segments
            .iter()
            .filter_map(|s| match s {
                TemplateSegment::Literal(text) => Some(text.as_str()),
                TemplateSegment::Field(_) => None,
            })
            .collect()
    }

    pub fn render(&self, values: &FieldValues) -> String {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                TemplateSegment::Literal(text) => out.push_str(text),
                TemplateSegment::Field(field) => out.push_str(values.get(*field)),
            }
        }
        out
    }
}

/// Rendered field values for one generation call.
#[derive(Debug, Clone, Default)]
pub struct FieldValues {
    values: HashMap<Field, String>,
}

impl FieldValues {
    pub fn set(&mut self, field: Field, value: String) {
        self.values.insert(field, value);
    }

    /// The value for `field`, or `""` if unset.
    pub fn get(&self, field: Field) -> &str {
        self.values.get(&field).map(String::as_str).unwrap_or("")
    }
}

/// A weighted phrasing within a variant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Alternative {
    pub weight: u32,
    pub template: Template,
}

/// A group of phrasings sharing one applicability rule: every `requires`
/// tag present and no `excludes` tag present.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Variant {
    pub requires: Vec<String>,
    pub excludes: Vec<String>,
    pub alternatives: Vec<Alternative>,
}

impl Variant {
    pub fn is_eligible(&self, tags: &FxHashSet<String>) -> bool {
        self.requires.iter().all(|t| tags.contains(t))
            && !self.excludes.iter().any(|t| tags.contains(t))
    }
}

/// Named narrative slots, each with its ordered variants.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Phrasebook {
    pub slots: HashMap<String, Vec<Variant>>,
}

// RON files use a flatter shape than the internal types.

#[derive(Debug, Deserialize)]
struct RonAlternative {
    #[serde(default = "default_weight")]
    weight: u32,
    text: String,
}

fn default_weight() -> u32 {
    1
}

#[derive(Debug, Deserialize)]
#[serde(rename = "Variant")]
struct RonVariant {
    #[serde(default)]
    requires: Vec<String>,
    #[serde(default)]
    excludes: Vec<String>,
    alternatives: Vec<RonAlternative>,
}

impl Phrasebook {
    /// The phrase pools compiled into the crate.
    pub fn builtin() -> Result<Phrasebook, PhrasebookError> {
        Self::parse_ron(BUILTIN_PHRASEBOOK)
    }

    /// Load a phrasebook from a RON file.
    pub fn load_from_ron(path: &Path) -> Result<Phrasebook, PhrasebookError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse_ron(&contents)
    }

    /// Parse a phrasebook from a RON string.
    pub fn parse_ron(input: &str) -> Result<Phrasebook, PhrasebookError> {
        let raw: HashMap<String, Vec<RonVariant>> = ron::from_str(input)?;
        let mut slots = HashMap::new();

        for (name, ron_variants) in raw {
            let mut variants = Vec::with_capacity(ron_variants.len());
            for v in ron_variants {
                let mut alternatives = Vec::with_capacity(v.alternatives.len());
                for alt in v.alternatives {
                    alternatives.push(Alternative {
                        weight: alt.weight,
                        template: Template::parse(&alt.text)?,
                    });
                }
                variants.push(Variant {
                    requires: v.requires,
                    excludes: v.excludes,
                    alternatives,
                });
            }
            slots.insert(name, variants);
        }

        Ok(Phrasebook { slots })
    }

    /// Merge another phrasebook into this one. Slots from `other` replace
    /// slots in `self` with the same name.
    pub fn merge(&mut self, other: Phrasebook) {
        for (name, variants) in other.slots {
            self.slots.insert(name, variants);
        }
    }

    /// Every alternative whose variant is eligible under `tags`, in file
    /// order.
    pub fn eligible<'a>(&'a self, slot: &str, tags: &FxHashSet<String>) -> Vec<&'a Alternative> {
        self.slots
            .get(slot)
            .map(|variants| {
                variants
                    .iter()
                    .filter(|v| v.is_eligible(tags))
                    .flat_map(|v| v.alternatives.iter())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Draw one phrasing for `slot` and render it. An unknown slot or an
    /// empty eligible pool renders as `""`.
    pub fn select(
        &self,
        slot: &str,
        tags: &FxHashSet<String>,
        values: &FieldValues,
        rng: &mut dyn RandomSource,
    ) -> String {
        let pool = self.eligible(slot, tags);
        let weights: Vec<u32> = pool.iter().map(|a| a.weight).collect();
        let text = match rng.pick_weighted(&weights) {
            Some(i) => pool[i].template.render(values),
            None => String::new(),
        };
        tracing::trace!(slot, eligible = pool.len(), text = %text, "slot drawn");
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::draw::ScriptedDraws;

    fn tags(list: &[&str]) -> FxHashSet<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    const SAMPLE: &str = r#"{
        "peak": [
            Variant(
                requires: ["has:peak"],
                alternatives: [
                    (weight: 2, text: "{peak}頃がピークでした。"),
                    (text: "{peak}にかけて注文が重なりました。"),
                ],
            ),
            Variant(
                excludes: ["has:peak"],
                alternatives: [(text: "ピークの波がありました。")],
            ),
        ],
        "start": [
            Variant(
                requires: ["service:lunch", "start:calm"],
                alternatives: [(text: "序盤は比較的穏やかでした。")],
            ),
        ],
    }"#;

    #[test]
    fn parse_literal_only() {
        let t = Template::parse("天気は晴れでした。").unwrap();
        assert_eq!(
            t.segments,
            vec![TemplateSegment::Literal("天気は晴れでした。".to_string())]
        );
    }

    #[test]
    fn parse_fields() {
        let t = Template::parse("{customers}の来店が目立ち、{peak}").unwrap();
        assert_eq!(
            t.segments,
            vec![
                TemplateSegment::Field(Field::Customers),
                TemplateSegment::Literal("の来店が目立ち、".to_string()),
                TemplateSegment::Field(Field::Peak),
            ]
        );
        assert_eq!(t.fields().collect::<Vec<_>>(), vec![Field::Customers, Field::Peak]);
    }

    #[test]
    fn parse_escaped_braces() {
        let t = Template::parse("{{note}}").unwrap();
        assert_eq!(t.segments, vec![TemplateSegment::Literal("{note}".to_string())]);
    }

    #[test]
    fn parse_errors() {
        assert!(Template::parse("bad {} here").is_err());
        assert!(Template::parse("bad {outer{inner}} here").is_err());
        assert!(Template::parse("bad {unclosed").is_err());
        assert!(Template::parse("bad } here").is_err());
        assert!(matches!(
            Template::parse("{mood}"),
            Err(PhrasebookError::TemplateParse(msg)) if msg.contains("mood")
        ));
    }

    #[test]
    fn field_names_round_trip() {
        for field in Field::ALL {
            assert_eq!(Field::from_name(field.name()), Some(field));
        }
        assert_eq!(Field::from_name("nope"), None);
    }

    #[test]
    fn render_fills_fields_and_blanks_missing() {
        let t = Template::parse("{best_sellers}が{event}よく動きました。").unwrap();
        let mut values = FieldValues::default();
        values.set(Field::BestSellers, "親子丼".to_string());
        assert_eq!(t.render(&values), "親子丼がよく動きました。");
    }

    #[test]
    fn literal_text_skips_fields() {
        let t = Template::parse("（{event}も入っていました）").unwrap();
        assert_eq!(t.literal_text(), "（も入っていました）");
    }

    #[test]
    fn ron_defaults_weight_and_tag_lists() {
        let book = Phrasebook::parse_ron(SAMPLE).unwrap();
        let peak = &book.slots["peak"];
        assert_eq!(peak.len(), 2);
        assert_eq!(peak[0].alternatives[0].weight, 2);
        assert_eq!(peak[0].alternatives[1].weight, 1);
        assert!(peak[0].excludes.is_empty());
        assert!(peak[1].requires.is_empty());
    }

    #[test]
    fn bad_template_in_ron_is_error() {
        let input = r#"{ "x": [Variant(alternatives: [(text: "{nope}")])] }"#;
        assert!(matches!(
            Phrasebook::parse_ron(input),
            Err(PhrasebookError::TemplateParse(_))
        ));
    }

    #[test]
    fn eligibility_requires_and_excludes() {
        let book = Phrasebook::parse_ron(SAMPLE).unwrap();
        assert_eq!(book.eligible("peak", &tags(&["has:peak"])).len(), 2);
        assert_eq!(book.eligible("peak", &tags(&[])).len(), 1);
        assert!(book.eligible("start", &tags(&["service:lunch"])).is_empty());
        assert_eq!(
            book.eligible("start", &tags(&["service:lunch", "start:calm"])).len(),
            1
        );
        assert!(book.eligible("missing", &tags(&[])).is_empty());
    }

    #[test]
    fn select_renders_scripted_choice() {
        let book = Phrasebook::parse_ron(SAMPLE).unwrap();
        let mut values = FieldValues::default();
        values.set(Field::Peak, "12時から14時".to_string());
        let mut draws = ScriptedDraws::new(vec![1]);
        assert_eq!(
            book.select("peak", &tags(&["has:peak"]), &values, &mut draws),
            "12時から14時にかけて注文が重なりました。"
        );
    }

    #[test]
    fn select_empty_pool_is_empty_string() {
        let book = Phrasebook::parse_ron(SAMPLE).unwrap();
        let mut draws = ScriptedDraws::first();
        let values = FieldValues::default();
        assert_eq!(book.select("start", &tags(&[]), &values, &mut draws), "");
        assert_eq!(book.select("nope", &tags(&[]), &values, &mut draws), "");
        assert_eq!(draws.picks_made(), 0);
    }

    #[test]
    fn merge_replaces_slots_by_name() {
        let mut base = Phrasebook::parse_ron(SAMPLE).unwrap();
        let other = Phrasebook::parse_ron(
            r#"{ "peak": [Variant(alternatives: [(text: "波がありました。")])] }"#,
        )
        .unwrap();
        base.merge(other);
        assert_eq!(base.slots["peak"].len(), 1);
        assert!(base.slots.contains_key("start"));
    }

    #[test]
    fn builtin_loads() {
        let book = Phrasebook::builtin().unwrap();
        assert!(!book.slots.is_empty());
    }
}
