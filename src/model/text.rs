use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Lang {
    English,
    Arabic,
}

impl Lang {
    pub fn code(self) -> &'static str {
        match self {
            Lang::English => "en",
            Lang::Arabic => "ar",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Lang::English => "English",
            Lang::Arabic => "Arabic",
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
pub struct BilingualText {
    #[serde(default)]
    pub english: String,

    #[serde(default)]
    pub arabic: String,
}

impl BilingualText {
    pub fn new(english: impl Into<String>, arabic: impl Into<String>) -> Self {
        Self {
            english: english.into(),
            arabic: arabic.into(),
        }
    }

    pub fn is_complete(&self) -> bool {
        !self.english.is_empty() && !self.arabic.is_empty()
    }
}

/// A bilingual value plus which half (if any) came from machine translation.
///
/// At most one of the two flags is ever set, and a set flag always points at a
/// non-empty half.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
pub struct TranslationOutcome {
    #[serde(flatten)]
    pub text: BilingualText,

    #[serde(default)]
    pub english_generated: bool,

    #[serde(default)]
    pub arabic_generated: bool,
}

impl TranslationOutcome {
    pub fn untouched(text: BilingualText) -> Self {
        Self {
            text,
            english_generated: false,
            arabic_generated: false,
        }
    }

    pub fn any_generated(&self) -> bool {
        self.english_generated || self.arabic_generated
    }
}
