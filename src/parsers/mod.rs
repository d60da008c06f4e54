pub mod booking;
pub mod embedded;

use serde_json::Value;
use thiserror::Error;

use crate::model::menu::MenuDocument;

#[derive(Debug, Error)]
pub enum MenuError {
    #[error("invalid json: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("no embedded JSON payload found in the page")]
    NoEmbeddedPayload,

    #[error("the JSON structure doesn't look like a salon booking menu")]
    NotFound,

    #[error("menu payload is missing `{0}`")]
    MissingField(&'static str),
}

/// Locates the menu in pasted JSON or in a saved booking page.
pub fn locate(source: &str) -> Result<MenuDocument, MenuError> {
    let json = if embedded::looks_like_html(source) {
        embedded::extract_payload(source).ok_or(MenuError::NoEmbeddedPayload)?
    } else {
        source
    };

    let root: Value = serde_json::from_str(json)?;
    let doc = booking::parse(&root)?;

    tracing::debug!(
        schema = doc.schema.as_str(),
        categories = doc.categories.len(),
        items = doc.item_count(),
        "menu located"
    );

    Ok(doc)
}
