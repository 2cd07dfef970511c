/// Text normalization helpers shared by the engine and its callers.
///
/// Every list-shaped narrative slot goes through these: free-text splitting,
/// order-preserving deduplication and natural-language enumeration.
use rustc_hash::FxHashSet;

/// Characters that separate items in a free-text list field.
pub const LIST_DELIMITERS: &[char] = &[',', '、', '，'];

/// Connective between exactly two enumerated items ("A や B").
const PAIR_CONNECTIVE: &str = "や";
/// Trailing connective for longer enumerations ("A、B など").
const OPEN_ENDED_CONNECTIVE: &str = "など";
/// Separator between enumerated items.
const LIST_SEPARATOR: &str = "、";
/// Joins the two foregrounded items of a ranked list ("A と B").
const HEADLINE_CONNECTIVE: &str = "と";

/// Collapse internal whitespace runs to a single space and trim both ends.
pub fn normalize(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// True iff the text is empty after normalization.
pub fn is_blank(text: &str) -> bool {
    text.split_whitespace().next().is_none()
}

/// Normalize each item, drop empties, and remove duplicates keeping the
/// first occurrence.
pub fn dedupe<S: AsRef<str>>(items: &[S]) -> Vec<String> {
    let mut seen = FxHashSet::default();
    let mut out = Vec::with_capacity(items.len());
    for item in items {
        let norm = normalize(item.as_ref());
        if norm.is_empty() {
            continue;
        }
        if seen.insert(norm.clone()) {
            out.push(norm);
        }
    }
    out
}

/// Split a free-text field on the list delimiters into normalized,
/// non-empty pieces.
pub fn split_delimited(text: &str) -> Vec<String> {
    let text = normalize(text);
    if text.is_empty() {
        return Vec::new();
    }
    text.split(LIST_DELIMITERS)
        .map(normalize)
        .filter(|piece| !piece.is_empty())
        .collect()
}

/// Selected tags first, then free-text items, deduplicated.
pub fn merge_tags<S: AsRef<str>>(tags: &[S], free_text: &str) -> Vec<String> {
    let mut all: Vec<String> = tags.iter().map(|t| t.as_ref().to_string()).collect();
    all.extend(split_delimited(free_text));
    dedupe(&all)
}

/// Render a list as a natural enumeration.
///
/// - `[]` → `""`
/// - `[A]` → `"A"`
/// - `[A, B]` → `"AやB"`
/// - `[A, B, C, ..]` → `"A、B、Cなど"`: every item comma-joined, followed by
///   the open-ended connective.
pub fn join_natural<S: AsRef<str>>(items: &[S]) -> String {
    let xs = dedupe(items);
    match xs.len() {
        0 => String::new(),
        1 => xs[0].clone(),
        2 => format!("{}{}{}", xs[0], PAIR_CONNECTIVE, xs[1]),
        _ => format!("{}{}", xs.join(LIST_SEPARATOR), OPEN_ENDED_CONNECTIVE),
    }
}

/// The first one or two items of a ranked list, joined: `"AとB"` or `"A"`.
pub fn headline_pair<S: AsRef<str>>(items: &[S]) -> String {
    let xs = dedupe(items);
    match xs.as_slice() {
        [] => String::new(),
        [a] => a.clone(),
        [a, b, ..] => format!("{}{}{}", a, HEADLINE_CONNECTIVE, b),
    }
}
