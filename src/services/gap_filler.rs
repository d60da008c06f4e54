use crate::model::text::{BilingualText, Lang, TranslationOutcome};
use crate::services::translator::Translator;

/// Fills whichever half of `text` is empty by translating the other one.
///
/// At most one provider call is made. A failed call leaves the pair exactly as
/// it came in with no flag set; an empty output is an ordinary result here.
pub fn fill(text: BilingualText, translator: &dyn Translator) -> TranslationOutcome {
    let mut out = TranslationOutcome::untouched(text);

    if !out.text.arabic.is_empty() && out.text.english.is_empty() {
        if let Some(english) = attempt(translator, Lang::Arabic, Lang::English, &out.text.arabic) {
            out.text.english = english;
            out.english_generated = true;
        }
    } else if !out.text.english.is_empty() && out.text.arabic.is_empty() {
        if let Some(arabic) = attempt(translator, Lang::English, Lang::Arabic, &out.text.english) {
            out.text.arabic = arabic;
            out.arabic_generated = true;
        }
    }

    out
}

fn attempt(translator: &dyn Translator, source: Lang, target: Lang, text: &str) -> Option<String> {
    match translator.translate(source, target, text) {
        Ok(t) if !t.trim().is_empty() => Some(t),
        Ok(_) => {
            tracing::debug!(source = source.code(), target = target.code(), "empty translation left unfilled");
            None
        }
        Err(e) => {
            tracing::debug!(source = source.code(), target = target.code(), error = %e, "gap left unfilled");
            None
        }
    }
}
