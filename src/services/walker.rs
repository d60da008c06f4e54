use serde::Serialize;

use crate::model::menu::{Column, MenuDocument, MenuRow};
use crate::model::text::TranslationOutcome;
use crate::services::{gap_filler, splitter, translator::Translator};

#[derive(Debug, Default, Serialize, Clone, PartialEq, Eq)]
pub struct WalkReport {
    pub rows: usize,
    /// Halves produced by machine translation.
    pub generated: usize,
    /// Halves that stayed empty because the provider failed.
    pub unfilled: usize,
}

#[derive(Debug, Default, Serialize, Clone)]
pub struct WalkResult {
    pub rows: Vec<MenuRow>,
    pub report: WalkReport,
}

/// Splits and gap-fills every category and item field, one row per item.
pub fn walk(doc: &MenuDocument, translator: &dyn Translator) -> WalkResult {
    let mut result = WalkResult::default();

    for category in &doc.categories {
        // Shared by every item row of this category.
        let name = translate_field(&category.name, translator, &mut result.report);
        let desc = translate_field(&category.description, translator, &mut result.report);

        for item in &category.items {
            let item_name = translate_field(&item.name, translator, &mut result.report);
            let item_desc = translate_field(&item.description, translator, &mut result.report);

            let mut row = MenuRow::default();
            put(&mut row, &name, Column::CategoryNameEn, Column::CategoryNameAr);
            put(&mut row, &desc, Column::CategoryDescEn, Column::CategoryDescAr);
            put(&mut row, &item_name, Column::ItemNameEn, Column::ItemNameAr);
            put(&mut row, &item_desc, Column::ItemDescEn, Column::ItemDescAr);
            row.cells[Column::Price.index()] = item.price.clone();

            result.rows.push(row);
        }
    }

    result.report.rows = result.rows.len();
    tracing::info!(
        rows = result.report.rows,
        generated = result.report.generated,
        unfilled = result.report.unfilled,
        "menu rows built"
    );

    result
}

fn translate_field(raw: &str, translator: &dyn Translator, report: &mut WalkReport) -> TranslationOutcome {
    let split = splitter::split_str(raw);
    let had_gap = split.english.is_empty() != split.arabic.is_empty();

    let out = gap_filler::fill(split, translator);

    if out.any_generated() {
        report.generated += 1;
    } else if had_gap {
        report.unfilled += 1;
    }

    out
}

fn put(row: &mut MenuRow, out: &TranslationOutcome, en: Column, ar: Column) {
    row.cells[en.index()] = out.text.english.clone();
    row.cells[ar.index()] = out.text.arabic.clone();

    if out.english_generated {
        row.highlights.insert(en);
    }
    if out.arabic_generated {
        row.highlights.insert(ar);
    }
}
