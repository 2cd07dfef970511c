/// Composer: arranges drawn clauses into sentences.
use crate::core::normalize::normalize;
use crate::core::sanitize::FULL_STOP;
use crate::schema::record::ServicePeriod;

const CONTINUATION: &str = "、";

/// The drawn clause for every narrative slot. Empty strings are slots that
/// rendered nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Clauses {
    pub opening: String,
    pub start: String,
    pub customers: String,
    pub peak: String,
    pub feel_detail: String,
    pub crowd_summary: String,
    pub best_seller: String,
    pub extra: String,
}

/// Attach `right` to `left`. A clause that is still open (no closing `。`)
/// runs straight into the next one; a finished sentence is followed by a
/// space.
pub fn merge_clause(left: &str, right: &str) -> String {
    match (left.is_empty(), right.is_empty()) {
        (true, _) => right.to_string(),
        (_, true) => left.to_string(),
        _ if left.ends_with(FULL_STOP) => format!("{} {}", left, right),
        _ => format!("{}{}", left, right),
    }
}

/// Continue a finished sentence with another clause: `"A。"` + `"B。"` →
/// `"A、B。"`.
pub fn merge_continuation(summary: &str, follow: &str) -> String {
    match (summary.is_empty(), follow.is_empty()) {
        (true, _) => follow.to_string(),
        (_, true) => summary.to_string(),
        _ => format!(
            "{}{}{}",
            summary.strip_suffix(FULL_STOP).unwrap_or(summary),
            CONTINUATION,
            follow
        ),
    }
}

/// Join two clauses into a single sentence. An open left clause runs
/// straight on; a finished one gives up its `。` and continues with `、`.
pub fn merge_into_sentence(left: &str, right: &str) -> String {
    if left.ends_with(FULL_STOP) {
        merge_continuation(left, right)
    } else {
        merge_clause(left, right)
    }
}

/// Space-join the non-empty sentences.
pub fn join_sentences<S: AsRef<str>>(sentences: &[S]) -> String {
    sentences
        .iter()
        .map(|s| s.as_ref().trim())
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Arrange the core clauses into the body of a report, one sentence each.
///
/// Lunch: weather opening + start pace, customers + peak, summary + best
/// sellers. Dinner: crowd opening + customers, peak + feel detail, summary +
/// best sellers. The extra clause is not part of the body; the pipeline
/// appends it after the sentence clamp.
pub fn compose(service: ServicePeriod, c: &Clauses) -> String {
    let summary = merge_continuation(&c.crowd_summary, &c.best_seller);
    let sentences = match service {
        ServicePeriod::Lunch => [
            merge_into_sentence(&c.opening, &c.start),
            merge_into_sentence(&c.customers, &c.peak),
            summary,
        ],
        ServicePeriod::Dinner => [
            merge_into_sentence(&c.opening, &c.customers),
            merge_into_sentence(&c.peak, &c.feel_detail),
            summary,
        ],
    };
    join_sentences(&sentences)
}

/// The notice as its own labelled sentence, or `""` when blank.
pub fn notice_sentence(label: &str, notice: &str) -> String {
    let notice = normalize(notice);
    if notice.is_empty() {
        String::new()
    } else {
        format!("{}{}", label, notice)
    }
}
