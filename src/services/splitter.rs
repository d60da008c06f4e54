use std::sync::LazyLock;

use regex::Regex;

use crate::model::text::BilingualText;

// Latin letters, digits, whitespace, '&', apostrophe and period.
static ENGLISH_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[a-zA-Z0-9\s&'\.]+").expect("english run pattern"));

static ARABIC_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\x{0600}-\x{06FF}\s]+").expect("arabic run pattern"));

const SEPARATOR: char = '|';

pub fn is_arabic_char(ch: char) -> bool {
    ('\u{0600}'..='\u{06FF}').contains(&ch)
}

pub fn contains_arabic(text: &str) -> bool {
    text.chars().any(is_arabic_char)
}

/// Best-effort split of a mixed English/Arabic string into its two halves.
///
/// With a `|` separator every part is classified on its own (Arabic if it holds
/// any U+0600..U+06FF codepoint) and the last part of each class wins. Without
/// one, the halves are rebuilt from independent character-run scans, so
/// interleaved scripts come back fragmented and space-joined.
pub fn split(text: Option<&str>) -> BilingualText {
    let text = match text {
        Some(t) => t.trim(),
        None => return BilingualText::default(),
    };

    if text.is_empty() {
        return BilingualText::default();
    }

    if text.contains(SEPARATOR) {
        return split_on_separator(text);
    }

    // No letters of any script: nothing to classify, keep it whole.
    // Arabic-Indic digits still go through the Arabic run scan.
    if !text.chars().any(|c| c.is_alphabetic() || is_arabic_char(c)) {
        return BilingualText::new(text, "");
    }

    BilingualText::new(join_runs(&ENGLISH_RUN, text), join_runs(&ARABIC_RUN, text))
}

pub fn split_str(text: &str) -> BilingualText {
    split(Some(text))
}

fn split_on_separator(text: &str) -> BilingualText {
    let mut out = BilingualText::default();

    for part in text.split(SEPARATOR).map(str::trim) {
        if contains_arabic(part) {
            out.arabic = part.to_string();
        } else {
            out.english = part.to_string();
        }
    }

    out
}

fn join_runs(re: &Regex, text: &str) -> String {
    re.find_iter(text)
        .map(|m| m.as_str().trim())
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
