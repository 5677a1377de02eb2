//! Display names derived from file and directory naming conventions
//!
//! `design-3-combat-hud.html` becomes `3 - Combat HUD`, `designs_rts` becomes
//! `RTS`. Every function here is total: unknown shapes fall back to plain
//! word normalization.

use once_cell::sync::Lazy;
use regex::Regex;
use std::path::Path;

/// Prefix marking a numbered document series (`design-<n>-<name>`)
pub const DOCUMENT_SERIES_PREFIX: &str = "design";

/// Prefix marking a group container directory in flat layouts (`designs-*`)
pub const GROUP_CONTAINER_PREFIX: &str = "designs";

/// Words whose capitalization is fixed regardless of position
const SPECIAL_WORDS: &[(&str, &str)] = &[
    ("gpt", "GPT"),
    ("claude", "Claude"),
    ("gemini", "Gemini"),
    ("rts", "RTS"),
    ("hud", "HUD"),
    ("hq", "HQ"),
];

static WORD_DELIMITERS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[-_\s]+").expect("word delimiter pattern is valid"));

static SERIES_NUMBER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"^{DOCUMENT_SERIES_PREFIX}-(\d+)-(.*)$"))
        .expect("series number pattern is valid")
});

static LEADING_NUMBER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d+)-(.*)$").expect("leading number pattern is valid"));

static GROUP_CONTAINER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"(?i)^{GROUP_CONTAINER_PREFIX}[-_ ]?(.*)$"))
        .expect("group container pattern is valid")
});

/// A naming rule yields a label, or `None` when it does not apply
type NamingRule = fn(&str) -> Option<String>;

/// Tried in order against a file stem; the first match wins
const FILE_TITLE_RULES: &[NamingRule] = &[series_number_title, leading_number_title];

/// Tried in order against a directory name; the first match wins
const GROUP_LABEL_RULES: &[NamingRule] = &[container_suffix_label];

/// Title-case a hyphen, underscore or whitespace delimited name
///
/// Numeric tokens pass through untouched, known acronyms use their fixed
/// spelling, everything else is capitalized. Tokens are joined with single
/// spaces. Blank input (or input made only of delimiters) is returned as-is.
///
/// Whitespace separates words too, so `main menu` becomes `Main Menu` rather
/// than `Main menu`. This keeps `normalize` idempotent on its own output.
pub fn normalize(raw: &str) -> String {
    if raw.trim().is_empty() {
        return raw.to_string();
    }

    let words: Vec<String> = WORD_DELIMITERS
        .split(raw)
        .filter(|part| !part.is_empty())
        .map(normalize_word)
        .collect();

    if words.is_empty() {
        return raw.to_string();
    }

    words.join(" ")
}

fn normalize_word(part: &str) -> String {
    if part.chars().all(|c| c.is_ascii_digit()) {
        return part.to_string();
    }

    let lower = part.to_lowercase();
    if let Some((_, special)) = SPECIAL_WORDS.iter().find(|(word, _)| *word == lower) {
        return (*special).to_string();
    }

    let mut chars = lower.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => lower,
    }
}

/// Display title for a document file name
pub fn file_title(file_name: &str) -> String {
    let stem = Path::new(file_name)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| file_name.to_string());

    FILE_TITLE_RULES
        .iter()
        .find_map(|rule| rule(&stem))
        .unwrap_or_else(|| normalize(&stem))
}

/// Display label for a group directory name
pub fn group_label(folder_name: &str) -> String {
    GROUP_LABEL_RULES
        .iter()
        .find_map(|rule| rule(folder_name))
        .unwrap_or_else(|| normalize(folder_name))
}

fn numbered_title(pattern: &Regex, stem: &str) -> Option<String> {
    let captures = pattern.captures(stem)?;
    Some(format!("{} - {}", &captures[1], normalize(&captures[2])))
}

fn series_number_title(stem: &str) -> Option<String> {
    numbered_title(&SERIES_NUMBER, stem)
}

fn leading_number_title(stem: &str) -> Option<String> {
    numbered_title(&LEADING_NUMBER, stem)
}

fn container_suffix_label(folder_name: &str) -> Option<String> {
    let captures = GROUP_CONTAINER.captures(folder_name)?;
    let suffix = captures[1].trim();

    if suffix.is_empty() {
        None
    } else {
        Some(normalize(suffix))
    }
}
