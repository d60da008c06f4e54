use std::fs;
use std::path::Path;

use chardetng::EncodingDetector;
use encoding_rs::{Encoding, UTF_8};
use thiserror::Error;

const UTF8_BOM: [u8; 3] = [0xEF, 0xBB, 0xBF];

#[derive(Debug, Error)]
pub enum EncodingError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
}

/// Decodes a pasted or uploaded payload to text, BOM first, then a guess.
pub fn decode(bytes: &[u8]) -> String {
    if let Some(rest) = bytes.strip_prefix(&UTF8_BOM) {
        return String::from_utf8_lossy(rest).into_owned();
    }

    // Valid UTF-8 is by far the common case; skip the detector for it.
    if let Ok(s) = std::str::from_utf8(bytes) {
        return s.to_string();
    }

    let encoding = guess(bytes);
    let (text, _, had_errors) = encoding.decode(bytes);
    if had_errors {
        tracing::warn!(encoding = encoding.name(), "input decoded with replacement characters");
    }
    text.into_owned()
}

pub fn read_text(path: &Path) -> Result<String, EncodingError> {
    let bytes = fs::read(path).map_err(|source| EncodingError::Read {
        path: path.display().to_string(),
        source,
    })?;
    Ok(decode(&bytes))
}

fn guess(bytes: &[u8]) -> &'static Encoding {
    if bytes.is_empty() {
        return UTF_8;
    }

    let mut detector = EncodingDetector::new();
    detector.feed(bytes, true);
    detector.guess(None, true)
}
