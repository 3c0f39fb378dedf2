use regex::Regex;
use std::sync::LazyLock;

static WHITESPACE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("invalid regex"));

static CONSTRAINT_MARKER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)enforce|constraint").expect("invalid regex"));

/// Appended by [`enforce_constraints`] when no constraints are supplied
pub const DEFAULT_CONSTRAINTS: &str =
    "Enforce realistic physics, natural gravity, clean reflections, no warped geometry";

/// Collapse whitespace runs to a single space and trim the ends
pub fn normalize_whitespace(text: &str) -> String {
    WHITESPACE_RE.replace_all(text.trim(), " ").into_owned()
}

/// End a fragment with exactly one sentence terminator
///
/// Fragments already ending in `.`, `!` or `?` are left as they are.
pub fn as_sentence(fragment: &str) -> String {
    let fragment = fragment.trim();
    if fragment.ends_with(&['.', '!', '?'][..]) {
        fragment.to_string()
    } else {
        format!("{fragment}.")
    }
}

/// Fit `text` into `budget` characters
///
/// Within budget the text is returned untouched. Otherwise the prefix of
/// `budget` chars is cut after its last sentence-ending period (one followed
/// by whitespace or the end of the text) when that period sits at or past
/// `cut_ratio * budget`; failing that, the text is hard-cut so that the
/// appended `ellipsis` still lands within the budget. An ellipsis longer than
/// the budget is itself shortened.
pub fn truncate_to_budget(text: &str, budget: usize, cut_ratio: f64, ellipsis: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let len = chars.len();
    if len <= budget {
        return text.to_string();
    }

    let threshold = (budget as f64 * cut_ratio).floor() as usize;
    let ends_sentence = |i: usize| chars[i] == '.' && chars.get(i + 1).map_or(true, |c| c.is_whitespace());

    if let Some(last_period) = (threshold..budget).rev().find(|&i| ends_sentence(i)) {
        tracing::warn!(
            original_len = len,
            truncated_len = last_period + 1,
            budget,
            "prompt over budget, cut at sentence boundary"
        );
        return chars[..=last_period].iter().collect();
    }

    let marker: Vec<char> = ellipsis.chars().take(budget).collect();
    let keep = budget - marker.len();
    let cut: String = chars[..keep].iter().chain(marker.iter()).collect();
    tracing::warn!(
        original_len = len,
        truncated_len = budget,
        budget,
        "prompt over budget, hard cut"
    );
    cut
}

/// Append a constraints clause unless the prompt already carries one
///
/// A prompt mentioning "enforce" or "constraint" (any case) is returned
/// unchanged, so applying this twice is the same as applying it once.
pub fn enforce_constraints(prompt: &str, constraints: Option<&str>) -> String {
    if CONSTRAINT_MARKER_RE.is_match(prompt) {
        return prompt.to_string();
    }

    let clause = match constraints.map(str::trim).filter(|c| !c.is_empty()) {
        Some(c) => as_sentence(&format!("Constraints: {c}")),
        None => as_sentence(DEFAULT_CONSTRAINTS),
    };

    let prompt = prompt.trim();
    if prompt.is_empty() {
        clause
    } else {
        format!("{} {}", as_sentence(prompt), clause)
    }
}
