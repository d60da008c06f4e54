use std::path::PathBuf;

use serde_json::{json, Value};

use crate::config::TranslatorConfig;
use crate::model::text::BilingualText;
use crate::parsers;
use crate::services::{encoding, gap_filler, pipeline, splitter, translator, walker};

mod command;
use command::Command;

fn get_cmd(req: &Value) -> &str {
    req.get("cmd").and_then(|v| v.as_str()).unwrap_or("")
}

fn get_id(req: &Value) -> Value {
    req.get("id").cloned().unwrap_or(Value::Null)
}

fn get_payload(req: &Value) -> &Value {
    static EMPTY: Value = Value::Null;
    req.get("payload").unwrap_or(&EMPTY)
}

fn get_str<'a>(payload: &'a Value, key: &str) -> &'a str {
    payload.get(key).and_then(|v| v.as_str()).unwrap_or("")
}

pub fn ok(id: Value, payload: Value) -> String {
    json!({
        "id": id,
        "status": "ok",
        "payload": payload
    })
    .to_string()
}

pub fn err(id: Value, message: impl Into<String>) -> String {
    json!({
        "id": id,
        "status": "error",
        "message": message.into()
    })
    .to_string()
}

fn translator_config(payload: &Value) -> Result<TranslatorConfig, String> {
    match payload.get("translator") {
        None | Some(Value::Null) => Ok(TranslatorConfig::default()),
        Some(v) => serde_json::from_value(v.clone())
            .map_err(|e| format!("invalid payload.translator: {e}")),
    }
}

/// `payload.source` as text, or the decoded contents of `payload.path`.
fn source_text(payload: &Value) -> Result<String, String> {
    let source = get_str(payload, "source");
    if !source.trim().is_empty() {
        return Ok(source.to_string());
    }

    let path = get_str(payload, "path");
    if path.is_empty() {
        return Err("payload.source or payload.path is required".into());
    }

    encoding::read_text(&PathBuf::from(path)).map_err(|e| e.to_string())
}

pub fn handle(input: &str) -> String {
    let req: Value = match serde_json::from_str(input) {
        Ok(v) => v,
        Err(_) => {
            return json!({
                "status": "error",
                "message": "invalid json"
            })
            .to_string();
        }
    };

    let id = get_id(&req);
    let cmd_str = get_cmd(&req);
    let payload = get_payload(&req);

    tracing::debug!(cmd = cmd_str, "request");

    match Command::from(cmd_str) {
        Command::Ping => ok(id, json!({ "message": "salon-core alive" })),

        Command::SplitText => {
            let text = payload.get("text").and_then(|v| v.as_str());
            let split = splitter::split(text);
            ok(id, json!(split))
        }

        Command::FillGaps => {
            let text = BilingualText::new(get_str(payload, "english"), get_str(payload, "arabic"));

            let cfg = match translator_config(payload) {
                Ok(c) => c,
                Err(e) => return err(id, e),
            };

            // A complete or empty pair never reaches the provider, so skip
            // building a client for it.
            if text.is_complete() || (text.english.is_empty() && text.arabic.is_empty()) {
                return ok(id, json!(gap_filler::fill(text, &translator::Disabled)));
            }

            let t = match translator::from_config(&cfg) {
                Ok(t) => t,
                Err(e) => return err(id, e.to_string()),
            };
            ok(id, json!(gap_filler::fill(text, t.as_ref())))
        }

        Command::ExtractMenu => {
            let source = match source_text(payload) {
                Ok(s) => s,
                Err(e) => return err(id, e),
            };

            match parsers::locate(&source) {
                Ok(doc) => ok(
                    id,
                    json!({
                        "schema": doc.schema,
                        "salon": doc.salon,
                        "categories": doc.categories.len(),
                        "items": doc.item_count()
                    }),
                ),
                Err(e) => err(id, e.to_string()),
            }
        }

        Command::BuildRows => {
            let source = match source_text(payload) {
                Ok(s) => s,
                Err(e) => return err(id, e),
            };
            let cfg = match translator_config(payload) {
                Ok(c) => c,
                Err(e) => return err(id, e),
            };

            let doc = match parsers::locate(&source) {
                Ok(d) => d,
                Err(e) => return err(id, e.to_string()),
            };
            let t = match translator::from_config(&cfg) {
                Ok(t) => t,
                Err(e) => return err(id, e.to_string()),
            };

            let walked = walker::walk(&doc, t.as_ref());
            ok(id, json!({ "rows": walked.rows, "report": walked.report }))
        }

        Command::ExportMenu => {
            let source = match source_text(payload) {
                Ok(s) => s,
                Err(e) => return err(id, e),
            };
            let cfg = match translator_config(payload) {
                Ok(c) => c,
                Err(e) => return err(id, e),
            };

            let output_dir = match get_str(payload, "output_dir") {
                "" => PathBuf::from("."),
                dir => PathBuf::from(dir),
            };

            match pipeline::run(&source, &output_dir, &cfg) {
                Ok(report) => ok(
                    id,
                    json!({
                        "schema": report.schema,
                        "path": report.export.path,
                        "file_name": report.export.file_name,
                        "rows": report.export.rows,
                        "highlighted_cells": report.export.highlighted_cells,
                        "report": report.walk
                    }),
                ),
                Err(e) => err(id, e.to_string()),
            }
        }

        Command::Unknown => err(id, "unknown command"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn call(req: Value) -> Value {
        serde_json::from_str(&handle(&req.to_string())).unwrap()
    }

    const MENU: &str = r#"{"layout":{"cart":{"name":"Glow | جلو"}},"screenServices":{"categories":[{"name":"Hair | شعر","items":[{"name":"Haircut","price":{"formatted":"SAR 100"}}]}]}}"#;

    #[test]
    fn ping() {
        let resp = call(json!({ "id": 7, "cmd": "ping" }));
        assert_eq!(resp["id"], json!(7));
        assert_eq!(resp["status"], "ok");
        assert_eq!(resp["payload"]["message"], "salon-core alive");
    }

    #[test]
    fn invalid_line_and_unknown_command() {
        let resp: Value = serde_json::from_str(&handle("not json")).unwrap();
        assert_eq!(resp["message"], "invalid json");

        let resp = call(json!({ "id": "x", "cmd": "nope" }));
        assert_eq!(resp["status"], "error");
        assert_eq!(resp["message"], "unknown command");
    }

    #[test]
    fn split_text_command() {
        let resp = call(json!({ "cmd": "split_text", "payload": { "text": "Haircut | قص شعر" } }));
        assert_eq!(
            resp["payload"],
            json!({ "english": "Haircut", "arabic": "قص شعر" })
        );

        let resp = call(json!({ "cmd": "split_text", "payload": { "text": null } }));
        assert_eq!(resp["payload"], json!({ "english": "", "arabic": "" }));
    }

    #[test]
    fn fill_gaps_complete_pair_needs_no_provider() {
        let resp = call(json!({
            "cmd": "fill_gaps",
            "payload": {
                "english": "Haircut",
                "arabic": "قص شعر",
                "translator": { "provider": "openai" }
            }
        }));

        assert_eq!(resp["status"], "ok");
        assert_eq!(
            resp["payload"],
            json!({
                "english": "Haircut",
                "arabic": "قص شعر",
                "english_generated": false,
                "arabic_generated": false
            })
        );
    }

    #[test]
    fn fill_gaps_with_disabled_provider_leaves_gap() {
        let resp = call(json!({
            "cmd": "fill_gaps",
            "payload": { "arabic": "قص شعر", "translator": { "provider": "none" } }
        }));

        assert_eq!(resp["payload"]["english"], "");
        assert_eq!(resp["payload"]["english_generated"], false);
    }

    #[test]
    fn fill_gaps_reports_bad_config() {
        let resp = call(json!({
            "cmd": "fill_gaps",
            "payload": { "english": "Haircut", "translator": { "provider": "deepseek" } }
        }));

        assert_eq!(resp["status"], "error");
        assert_eq!(resp["message"], "deepseek requires an api key");
    }

    #[test]
    fn extract_menu_summary() {
        let resp = call(json!({ "cmd": "extract_menu", "payload": { "source": MENU } }));

        assert_eq!(resp["payload"]["schema"], "booking_flow_bare");
        assert_eq!(resp["payload"]["categories"], 1);
        assert_eq!(resp["payload"]["items"], 1);
        assert_eq!(resp["payload"]["salon"]["name"], "Glow | جلو");
    }

    #[test]
    fn extract_menu_requires_source() {
        let resp = call(json!({ "cmd": "extract_menu", "payload": {} }));
        assert_eq!(resp["message"], "payload.source or payload.path is required");
    }

    #[test]
    fn build_rows_marks_generated_columns() {
        let resp = call(json!({
            "cmd": "build_rows",
            "payload": { "source": MENU, "translator": { "provider": "none" } }
        }));

        let rows = resp["payload"]["rows"].as_array().unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["cells"][4], "Haircut");
        assert_eq!(rows[0]["cells"][8], "SAR 100");
        assert_eq!(rows[0]["highlights"], json!([]));
        assert_eq!(resp["payload"]["report"]["unfilled"], 1);
    }

    #[test]
    fn export_menu_writes_workbook() {
        let dir = tempfile::tempdir().unwrap();
        let menu_path = dir.path().join("menu.json");
        std::fs::write(&menu_path, MENU).unwrap();

        let resp = call(json!({
            "cmd": "export_menu",
            "payload": {
                "path": menu_path.to_string_lossy(),
                "output_dir": dir.path().to_string_lossy(),
                "translator": { "provider": "none" }
            }
        }));

        assert_eq!(resp["status"], "ok", "{resp}");
        assert_eq!(resp["payload"]["file_name"], "Glow.xlsx");
        assert_eq!(resp["payload"]["rows"], 1);
        assert!(dir.path().join("Glow.xlsx").exists());
    }

    #[test]
    fn export_menu_reports_unknown_structure() {
        let dir = tempfile::tempdir().unwrap();
        let resp = call(json!({
            "cmd": "export_menu",
            "payload": {
                "source": "{\"x\":1}",
                "output_dir": dir.path().to_string_lossy(),
                "translator": { "provider": "none" }
            }
        }));

        assert_eq!(resp["status"], "error");
        assert_eq!(
            resp["message"],
            "the JSON structure doesn't look like a salon booking menu"
        );
    }
}
