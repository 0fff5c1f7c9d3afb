// File I/O operations
//
// A workbook is read once at startup and written once at the end of a run.
// Values and formulas survive the round trip; styles do not.

pub mod csv;
pub mod xlsx;

use std::path::Path;

use pairmatch_core::Table;

/// On-disk format, decided by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    /// .xlsx - read and write
    Xlsx,
    /// .xlsm, .xls, .xlsb, .ods - read only
    LegacySpreadsheet,
    Csv,
    Tsv,
}

impl FileFormat {
    pub fn from_path(path: &Path) -> Result<Self, String> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();

        match ext.as_str() {
            "xlsx" => Ok(FileFormat::Xlsx),
            "xlsm" | "xls" | "xlsb" | "ods" => Ok(FileFormat::LegacySpreadsheet),
            "csv" => Ok(FileFormat::Csv),
            "tsv" | "tab" => Ok(FileFormat::Tsv),
            "" => Err(format!("{}: missing file extension", path.display())),
            other => Err(format!("{}: unsupported file type '.{}'", path.display(), other)),
        }
    }

    pub fn is_writable(&self) -> bool {
        !matches!(self, FileFormat::LegacySpreadsheet)
    }
}

/// Every sheet of a file plus the one being processed.
#[derive(Debug, Clone, PartialEq)]
pub struct Workbook {
    pub sheets: Vec<Table>,
    active: usize,
}

impl Workbook {
    pub fn new(sheets: Vec<Table>) -> Self {
        Self { sheets, active: 0 }
    }

    pub fn single(table: Table) -> Self {
        Self::new(vec![table])
    }

    pub fn active_index(&self) -> usize {
        self.active
    }

    pub fn active(&self) -> &Table {
        &self.sheets[self.active]
    }

    pub fn active_mut(&mut self) -> &mut Table {
        &mut self.sheets[self.active]
    }

    pub fn sheet_names(&self) -> Vec<&str> {
        self.sheets.iter().map(|s| s.name.as_str()).collect()
    }

    /// Select the sheet to process by name (exact, then case-insensitive).
    /// `None` keeps the first sheet.
    pub fn select(&mut self, name: Option<&str>) -> Result<(), String> {
        let Some(name) = name else {
            return Ok(());
        };

        let found = self
            .sheets
            .iter()
            .position(|s| s.name == name)
            .or_else(|| self.sheets.iter().position(|s| s.name.eq_ignore_ascii_case(name)));

        match found {
            Some(idx) => {
                self.active = idx;
                Ok(())
            }
            None => Err(format!(
                "sheet '{}' not found (available: {})",
                name,
                self.sheet_names().join(", ")
            )),
        }
    }
}

/// Load a workbook and select the sheet to process.
pub fn load(path: &Path, sheet: Option<&str>) -> Result<Workbook, String> {
    let format = FileFormat::from_path(path)?;
    let mut workbook = match format {
        FileFormat::Xlsx | FileFormat::LegacySpreadsheet => xlsx::import(path)?,
        FileFormat::Csv => Workbook::single(csv::import(path)?),
        FileFormat::Tsv => Workbook::single(csv::import_with_delimiter(path, b'\t')?),
    };
    workbook.select(sheet)?;

    log::debug!(
        "loaded {} ({} sheet(s), processing '{}', {} rows)",
        path.display(),
        workbook.sheets.len(),
        workbook.active().name,
        workbook.active().height()
    );
    Ok(workbook)
}

/// Save a workbook. CSV/TSV only receive the processed sheet.
pub fn save(workbook: &Workbook, path: &Path) -> Result<(), String> {
    let format = FileFormat::from_path(path)?;
    match format {
        FileFormat::Xlsx => xlsx::export(workbook, path),
        FileFormat::LegacySpreadsheet => Err(format!(
            "{}: cannot write this format; save to an .xlsx path instead",
            path.display()
        )),
        FileFormat::Csv => csv::export(workbook.active(), path),
        FileFormat::Tsv => csv::export_with_delimiter(workbook.active(), path, b'\t'),
    }
}
