/// Final cleanup: forbidden-term stripping, punctuation polish, and the
/// sentence clamp.
use regex::Regex;
use std::sync::LazyLock;

use crate::core::normalize::normalize;

/// Sentence-terminal mark.
pub const FULL_STOP: char = '。';

static RE_REPEATED_COMMA: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new("、{2,}").ok());
static RE_REPEATED_STOP: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new("。{2,}").ok());

fn replace_all(re: &LazyLock<Option<Regex>>, text: &str, with: &str) -> String {
    match &**re {
        Some(re) => re.replace_all(text, with).into_owned(),
        None => text.to_string(),
    }
}

/// Remove every occurrence of each term, without any further cleanup.
pub fn strip_terms<S: AsRef<str>>(text: &str, terms: &[S]) -> String {
    let mut out = text.to_string();
    for term in terms {
        let term = term.as_ref();
        if !term.is_empty() {
            out = out.replace(term, "");
        }
    }
    out
}

/// Collapse doubled `、`/`。` runs and whitespace runs, then trim.
pub fn collapse_punctuation(text: &str) -> String {
    let t = replace_all(&RE_REPEATED_COMMA, text, "、");
    let t = replace_all(&RE_REPEATED_STOP, &t, "。");
    normalize(&t)
}

/// Strip all forbidden phrases, then tidy the punctuation they leave behind.
///
/// Removal repeats until nothing matches, so a phrase that only forms after
/// an inner removal is caught too.
pub fn strip_forbidden<S: AsRef<str>>(text: &str, forbidden: &[S]) -> String {
    let mut current = text.to_string();
    loop {
        let next = strip_terms(&current, forbidden);
        if next == current {
            break;
        }
        current = next;
    }
    collapse_punctuation(&current)
}

/// Join-seam fixes applied after every other step: `、で、` → `、`.
pub fn polish(text: &str) -> String {
    collapse_punctuation(&text.replace("、で、", "、"))
}

/// Keep at most `max` sentences.
///
/// Text with at most `max` non-empty fragments and at most `max` full stops
/// is returned unchanged. Otherwise the first `max` fragments are kept, each
/// closed with `。` and separated by a space. Re-applying to the result is a
/// no-op.
pub fn clamp_sentences(text: &str, max: usize) -> String {
    let parts: Vec<&str> = text
        .split(FULL_STOP)
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect();
    if parts.len() <= max && count_full_stops(text) <= max {
        return text.to_string();
    }
    let keep = parts.len().min(max);
    if keep == 0 {
        return String::new();
    }
    let separator = format!("{} ", FULL_STOP);
    format!("{}{}", parts[..keep].join(&separator), FULL_STOP)
}

/// Number of sentence-terminal marks in `text`.
pub fn count_full_stops(text: &str) -> usize {
    text.chars().filter(|&c| c == FULL_STOP).count()
}
