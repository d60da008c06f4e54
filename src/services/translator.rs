use crate::config::{Provider, TranslatorConfig};
use crate::model::text::Lang;

use reqwest::blocking::Client;
use reqwest::{StatusCode, Url};
use serde_json::{json, Value};
use thiserror::Error;

use std::time::Duration;

const GOOGLE_ENDPOINT: &str = "https://translate.googleapis.com/translate_a/single";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TranslationError {
    /// The provider could not produce a translation. The reason is kept for
    /// diagnostics only; callers treat every failure the same way.
    #[error("translation unavailable: {0}")]
    Unavailable(String),
}

impl TranslationError {
    fn unavailable(reason: impl Into<String>) -> Self {
        TranslationError::Unavailable(reason.into())
    }
}

pub trait Translator {
    fn translate(&self, source: Lang, target: Lang, text: &str) -> Result<String, TranslationError>;
}

/// Builds the translator selected by `cfg`.
pub fn from_config(cfg: &TranslatorConfig) -> Result<Box<dyn Translator>, crate::config::ConfigError> {
    cfg.validate()?;

    match cfg.provider {
        Provider::None => Ok(Box::new(Disabled)),
        Provider::Google => Ok(Box::new(GoogleTranslator::new(http_client(cfg)?))),
        Provider::OpenAi | Provider::DeepSeek => Ok(Box::new(ChatTranslator {
            client: http_client(cfg)?,
            endpoint: chat_endpoint_for(cfg.provider),
            api_key: cfg.api_key.clone().unwrap_or_default(),
            model: cfg.model.clone().unwrap_or_default(),
        })),
    }
}

fn http_client(cfg: &TranslatorConfig) -> Result<Client, crate::config::ConfigError> {
    Client::builder()
        .timeout(Duration::from_secs(cfg.timeout_secs))
        .build()
        .map_err(|e| crate::config::ConfigError::HttpClient(e.to_string()))
}

/// Gap filling switched off: every request is unavailable.
pub struct Disabled;

impl Translator for Disabled {
    fn translate(&self, _source: Lang, _target: Lang, _text: &str) -> Result<String, TranslationError> {
        Err(TranslationError::unavailable("translation disabled"))
    }
}

/// The public `translate_a/single` endpoint (`client=gtx`).
pub struct GoogleTranslator {
    client: Client,
}

impl GoogleTranslator {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

impl Translator for GoogleTranslator {
    fn translate(&self, source: Lang, target: Lang, text: &str) -> Result<String, TranslationError> {
        let url = Url::parse_with_params(
            GOOGLE_ENDPOINT,
            &[
                ("client", "gtx"),
                ("dt", "t"),
                ("sl", source.code()),
                ("tl", target.code()),
                ("q", text),
            ],
        )
        .map_err(|e| TranslationError::unavailable(e.to_string()))?;

        let resp = self
            .client
            .get(url)
            .send()
            .map_err(|e| TranslationError::unavailable(e.to_string()))?;

        let status = resp.status();
        let body = resp
            .text()
            .map_err(|e| TranslationError::unavailable(e.to_string()))?;

        if !status.is_success() {
            return Err(TranslationError::unavailable(extract_error_message(status, &body)));
        }

        let v: Value = serde_json::from_str(&body)
            .map_err(|_| TranslationError::unavailable("invalid JSON from translation service"))?;

        parse_google_response(&v)
    }
}

// [[["translated", "source", ...], ["more", "source", ...]], ...]
fn parse_google_response(v: &Value) -> Result<String, TranslationError> {
    let segments = v
        .get(0)
        .and_then(|s| s.as_array())
        .ok_or_else(|| TranslationError::unavailable("missing translation segments"))?;

    let out: String = segments
        .iter()
        .filter_map(|seg| seg.get(0).and_then(|t| t.as_str()))
        .collect();

    let out = out.trim();
    if out.is_empty() {
        return Err(TranslationError::unavailable("empty translation"));
    }

    Ok(out.to_string())
}

/// Chat-completions providers (OpenAI, DeepSeek).
pub struct ChatTranslator {
    client: Client,
    endpoint: &'static str,
    api_key: String,
    model: String,
}

fn chat_endpoint_for(provider: Provider) -> &'static str {
    match provider {
        Provider::DeepSeek => "https://api.deepseek.com/v1/chat/completions",
        _ => "https://api.openai.com/v1/chat/completions",
    }
}

impl Translator for ChatTranslator {
    fn translate(&self, source: Lang, target: Lang, text: &str) -> Result<String, TranslationError> {
        let body = json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": "You are a professional translator for salon and beauty service menus. Reply with the translation only." },
                { "role": "user", "content": build_prompt(source, target, text) }
            ],
            "temperature": 0.3
        });

        let resp = self
            .client
            .post(self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .map_err(|e| TranslationError::unavailable(e.to_string()))?;

        let status = resp.status();

        // Read as text first so the error message survives a non-JSON body.
        let text = resp
            .text()
            .map_err(|e| TranslationError::unavailable(e.to_string()))?;

        if !status.is_success() {
            return Err(TranslationError::unavailable(extract_error_message(status, &text)));
        }

        let v: Value = serde_json::from_str(&text)
            .map_err(|_| TranslationError::unavailable("invalid JSON from AI"))?;

        parse_chat_response(&v)
    }
}

fn parse_chat_response(v: &Value) -> Result<String, TranslationError> {
    let content = v
        .get("choices")
        .and_then(|c| c.get(0))
        .and_then(|c| c.get("message"))
        .and_then(|m| m.get("content"))
        .and_then(|c| c.as_str())
        .ok_or_else(|| {
            TranslationError::unavailable("invalid AI response: missing choices[0].message.content")
        })?;

    let content = content.trim();
    if content.is_empty() {
        return Err(TranslationError::unavailable("empty translation"));
    }

    Ok(content.to_string())
}

fn build_prompt(source: Lang, target: Lang, text: &str) -> String {
    let mut p = String::new();

    p.push_str(&format!("Translate from {} to {}.\n", source.name(), target.name()));
    p.push_str("Text:\n");
    p.push_str(text.trim());

    p
}

fn extract_error_message(status: StatusCode, body_text: &str) -> String {
    // { "error": { "message": "..." } } or { "message": "..." }
    if let Ok(v) = serde_json::from_str::<Value>(body_text) {
        if let Some(msg) = v
            .get("error")
            .and_then(|e| e.get("message"))
            .and_then(|m| m.as_str())
        {
            return format!("HTTP {}: {}", status.as_u16(), msg);
        }
        if let Some(msg) = v.get("message").and_then(|m| m.as_str()) {
            return format!("HTTP {}: {}", status.as_u16(), msg);
        }
    }

    let trimmed = body_text.trim();
    let snippet: String = if trimmed.chars().count() > 400 {
        format!("{}...", trimmed.chars().take(400).collect::<String>())
    } else {
        trimmed.to_string()
    };

    format!("HTTP {}: {}", status.as_u16(), snippet)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn google_segments_are_concatenated() {
        let v = json!([[["Haircut. ", "قص شعر. ", null], ["Wash", "غسيل", null]], null, "ar"]);
        assert_eq!(parse_google_response(&v), Ok("Haircut. Wash".to_string()));
    }

    #[test]
    fn google_without_segments_is_unavailable() {
        let v = json!({ "error": "nope" });
        assert!(matches!(
            parse_google_response(&v),
            Err(TranslationError::Unavailable(_))
        ));
    }

    #[test]
    fn google_blank_translation_is_unavailable() {
        let v = json!([[["  ", "قص", null]]]);
        assert!(parse_google_response(&v).is_err());
    }

    #[test]
    fn chat_content_is_trimmed() {
        let v = json!({ "choices": [{ "message": { "content": "  قص شعر \n" } }] });
        assert_eq!(parse_chat_response(&v), Ok("قص شعر".to_string()));
    }

    #[test]
    fn chat_missing_content_is_unavailable() {
        let v = json!({ "choices": [] });
        assert!(parse_chat_response(&v).is_err());
    }

    #[test]
    fn error_message_prefers_json_message() {
        let msg = extract_error_message(
            StatusCode::TOO_MANY_REQUESTS,
            r#"{"error":{"message":"quota exceeded"}}"#,
        );
        assert_eq!(msg, "HTTP 429: quota exceeded");

        let msg = extract_error_message(StatusCode::BAD_GATEWAY, "upstream down");
        assert_eq!(msg, "HTTP 502: upstream down");
    }

    #[test]
    fn prompt_names_both_languages() {
        let p = build_prompt(Lang::English, Lang::Arabic, " Haircut ");
        assert_eq!(p, "Translate from English to Arabic.\nText:\nHaircut");
    }

    #[test]
    fn disabled_translator_always_fails() {
        assert!(Disabled
            .translate(Lang::Arabic, Lang::English, "قص")
            .is_err());
    }
}
