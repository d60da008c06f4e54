use std::path::Path;

use serde::Serialize;
use thiserror::Error;

use crate::config::{ConfigError, TranslatorConfig};
use crate::model::menu::SchemaVersion;
use crate::parsers::{self, MenuError};
use crate::services::export::{self, ExportError, ExportSummary};
use crate::services::translator::{self, Translator};
use crate::services::walker::{self, WalkReport};

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Menu(#[from] MenuError),

    #[error(transparent)]
    Export(#[from] ExportError),
}

#[derive(Debug, Serialize)]
pub struct PipelineReport {
    pub schema: SchemaVersion,
    pub export: ExportSummary,
    pub walk: WalkReport,
}

/// Source text (JSON or page HTML) to a workbook in `output_dir`.
pub fn run(source: &str, output_dir: &Path, cfg: &TranslatorConfig) -> Result<PipelineReport, PipelineError> {
    let translator = translator::from_config(cfg)?;
    run_with(source, output_dir, translator.as_ref())
}

pub fn run_with(
    source: &str,
    output_dir: &Path,
    translator: &dyn Translator,
) -> Result<PipelineReport, PipelineError> {
    let doc = parsers::locate(source)?;
    let walked = walker::walk(&doc, translator);
    let summary = export::export_to_dir(output_dir, &doc.salon, &walked.rows)?;

    Ok(PipelineReport {
        schema: doc.schema,
        export: summary,
        walk: walked.report,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::gap_filler::tests::FakeTranslator;
    use pretty_assertions::assert_eq;

    const MENU: &str = r#"{"data":{"bookingFlowInitialize":{
        "layout":{"cart":{"name":"Glow | جلو","address":"Riyadh"}},
        "screenServices":{"categories":[
            {"name":"Hair | شعر","items":[
                {"name":"Haircut","price":{"formatted":"SAR 100"}},
                {"name":"صبغة","description":"Full colour | صبغة كاملة","price":{"formatted":"SAR 300"}}
            ]}
        ]}
    }}}"#;

    #[test]
    fn json_to_workbook() {
        let dir = tempfile::tempdir().unwrap();
        let t = FakeTranslator::ok("generated");

        let report = run_with(MENU, dir.path(), &t).unwrap();

        assert_eq!(report.schema, SchemaVersion::BookingFlowV1);
        assert_eq!(report.export.file_name, "Glow.xlsx");
        assert_eq!(report.export.rows, 2);
        assert_eq!(report.export.highlighted_cells, 2);
        assert_eq!(report.walk.generated, 2);
        assert!(dir.path().join("Glow.xlsx").exists());
    }

    #[test]
    fn unrecognised_menu_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let t = FakeTranslator::ok("generated");

        let err = run_with(r#"{"hello":"world"}"#, dir.path(), &t).unwrap_err();

        assert!(matches!(err, PipelineError::Menu(MenuError::NotFound)));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn bad_provider_config_is_rejected_up_front() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = TranslatorConfig {
            provider: crate::config::Provider::OpenAi,
            ..TranslatorConfig::default()
        };

        let err = run(MENU, dir.path(), &cfg).unwrap_err();
        assert!(matches!(err, PipelineError::Config(ConfigError::MissingApiKey("openai"))));
    }
}
