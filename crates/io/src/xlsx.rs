// Excel import (xlsx, xlsm, xls, xlsb, ods via calamine) and xlsx export
// (rust_xlsxwriter). Values and formulas round-trip; styles and layout are dropped.

use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader, Sheets};
use pairmatch_core::cell::column_letters;
use pairmatch_core::{Cell, Table};
use rust_xlsxwriter::Workbook as XlsxWorkbook;

use crate::Workbook;

/// Excel limits
const MAX_ROWS: usize = 1_048_576;
const MAX_CELL_CHARS: usize = 32_767;
const MAX_SHEET_NAME_CHARS: usize = 31;

/// Import every sheet of an Excel/ODS file.
pub fn import(path: &Path) -> Result<Workbook, String> {
    let mut workbook: Sheets<_> = open_workbook_auto(path)
        .map_err(|e| format!("Failed to open Excel file {}: {}", path.display(), e))?;

    let sheet_names: Vec<String> = workbook.sheet_names().to_vec();
    if sheet_names.is_empty() {
        return Err("Excel file contains no sheets".to_string());
    }

    let mut sheets = Vec::with_capacity(sheet_names.len());
    for sheet_name in &sheet_names {
        let range = workbook
            .worksheet_range(sheet_name)
            .map_err(|e| format!("Failed to read sheet '{}': {}", sheet_name, e))?;

        let mut table = Table::new(sheet_name.as_str());

        // Range start offset (data may not begin at A1)
        let (start_row, start_col) = range.start().unwrap_or((0, 0));

        for (row_idx, row) in range.rows().enumerate() {
            let target_row = start_row as usize + row_idx;
            for (col_idx, data) in row.iter().enumerate() {
                let target_col = start_col as usize + col_idx;
                let cell = convert_cell(data);
                if !cell.is_empty() {
                    table.set(target_row, target_col, cell);
                }
            }
        }

        import_formulas(&mut workbook, sheet_name, &mut table);
        sheets.push(table);
    }

    Ok(Workbook::new(sheets))
}

/// Wrap cached values in their formulas. Formats calamine cannot read formulas
/// from keep values only.
fn import_formulas<RS>(workbook: &mut Sheets<RS>, sheet_name: &str, table: &mut Table)
where
    RS: std::io::Read + std::io::Seek,
{
    let formulas = match workbook.worksheet_formula(sheet_name) {
        Ok(range) => range,
        Err(e) => {
            log::debug!("no formulas read from sheet '{}': {}", sheet_name, e);
            return;
        }
    };

    // Formula range may start at a different offset than the value range
    let (start_row, start_col) = formulas.start().unwrap_or((0, 0));
    let mut count = 0usize;
    for (row_idx, row) in formulas.rows().enumerate() {
        for (col_idx, source) in row.iter().enumerate() {
            if source.is_empty() {
                continue;
            }
            let target_row = start_row as usize + row_idx;
            let target_col = start_col as usize + col_idx;
            let cached = table.get(target_row, target_col).clone();
            table.set(target_row, target_col, Cell::formula(source, cached));
            count += 1;
        }
    }
    if count > 0 {
        log::debug!("sheet '{}': {} formula cell(s)", sheet_name, count);
    }
}

fn convert_cell(data: &Data) -> Cell {
    match data {
        Data::Empty => Cell::Empty,
        Data::String(s) if s.is_empty() => Cell::Empty,
        Data::String(s) => Cell::Text(s.clone()),
        Data::Float(n) => Cell::Number(*n),
        Data::Int(n) => Cell::Number(*n as f64),
        Data::Bool(b) => Cell::Bool(*b),
        Data::Error(e) => Cell::Text(format!("#{:?}", e)),
        // Date serials stay numeric; nothing here interprets dates
        Data::DateTime(dt) => Cell::Number(dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => Cell::Text(s.clone()),
    }
}

/// Excel forbids `[]:*?/\` in sheet names and caps them at 31 characters.
fn xlsx_sheet_name(name: &str, index: usize) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| if matches!(c, '[' | ']' | ':' | '*' | '?' | '/' | '\\') { '_' } else { c })
        .take(MAX_SHEET_NAME_CHARS)
        .collect();
    let cleaned = cleaned.trim_matches('\'').to_string();
    if cleaned.trim().is_empty() {
        format!("Sheet{}", index + 1)
    } else {
        cleaned
    }
}

fn clamp_text(s: &str) -> &str {
    match s.char_indices().nth(MAX_CELL_CHARS) {
        Some((byte_idx, _)) => &s[..byte_idx],
        None => s,
    }
}

/// Export all sheets to an xlsx file; the processed sheet is marked active.
pub fn export(workbook: &Workbook, path: &Path) -> Result<(), String> {
    let mut xlsx_workbook = XlsxWorkbook::new();

    for (sheet_idx, table) in workbook.sheets.iter().enumerate() {
        let name = xlsx_sheet_name(&table.name, sheet_idx);
        let worksheet = xlsx_workbook
            .add_worksheet()
            .set_name(&name)
            .map_err(|e| format!("Failed to create sheet '{}': {}", name, e))?;

        for (row, cells) in table.rows().iter().enumerate() {
            if row >= MAX_ROWS {
                log::warn!("sheet '{}' truncated at {} rows", name, MAX_ROWS);
                break;
            }
            let row32 = row as u32;
            for (col, cell) in cells.iter().enumerate() {
                let col16 = col as u16;
                let written = match cell {
                    Cell::Empty => continue,
                    Cell::Text(s) => {
                        if s.chars().count() > MAX_CELL_CHARS {
                            log::warn!(
                                "cell {}{} truncated to {} characters",
                                column_letters(col),
                                row + 1,
                                MAX_CELL_CHARS
                            );
                        }
                        worksheet.write_string(row32, col16, clamp_text(s)).map(|_| ())
                    }
                    Cell::Number(n) => worksheet.write_number(row32, col16, *n).map(|_| ()),
                    Cell::Bool(b) => worksheet.write_boolean(row32, col16, *b).map(|_| ()),
                    Cell::Formula { source, cached } => {
                        worksheet.write_formula(row32, col16, source.as_str()).map(|ws| {
                            if let Some(result) = cached.as_text() {
                                ws.set_formula_result(row32, col16, result);
                            }
                        })
                    }
                };
                written.map_err(|e| format!("Failed to write cell ({}, {}): {}", row, col, e))?;
            }
        }
    }

    if let Ok(ws) = xlsx_workbook.worksheet_from_index(workbook.active_index()) {
        let _ = ws.set_active(true);
    }

    xlsx_workbook
        .save(path)
        .map_err(|e| format!("Failed to save XLSX file {}: {}", path.display(), e))
}
