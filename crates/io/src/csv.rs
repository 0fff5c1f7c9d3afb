// CSV/TSV import/export

use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

use pairmatch_core::{Cell, Table};

pub fn import(path: &Path) -> Result<Table, String> {
    let content = read_file_as_utf8(path)?;
    let delimiter = sniff_delimiter(&content);
    import_from_string(&content, delimiter, &sheet_name(path))
}

pub fn import_with_delimiter(path: &Path, delimiter: u8) -> Result<Table, String> {
    let content = read_file_as_utf8(path)?;
    import_from_string(&content, delimiter, &sheet_name(path))
}

fn sheet_name(path: &Path) -> String {
    path.file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("Sheet1")
        .to_string()
}

/// Candidates in ascending preference; on a tie the later one wins.
const DELIMITERS: [u8; 4] = [b'|', b'\t', b';', b','];

/// Records sampled when guessing the delimiter.
const SNIFF_RECORDS: usize = 20;

/// Pick the delimiter that splits the most sampled records into the same
/// number (>1) of fields. Quoted fields may span lines; blank lines are ignored.
fn sniff_delimiter(content: &str) -> u8 {
    DELIMITERS
        .iter()
        .filter_map(|&delim| {
            let (width, records) = modal_width(content, delim)?;
            (width > 1).then_some((delim, width * records))
        })
        .max_by_key(|&(_, score)| score)
        .map_or(b',', |(delim, _)| delim)
}

/// Most common field count in the sample and how many records have it.
/// `None` when the sample does not parse with this delimiter.
fn modal_width(content: &str, delimiter: u8) -> Option<(usize, usize)> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(content.as_bytes());

    let mut widths: HashMap<usize, usize> = HashMap::new();
    for record in reader.records().take(SNIFF_RECORDS) {
        *widths.entry(record.ok()?.len()).or_default() += 1;
    }
    widths
        .into_iter()
        .max_by_key(|&(width, records)| (records, width))
}

/// Read file and convert to UTF-8 if needed (handles Windows-1252, Latin-1, etc.)
pub fn read_file_as_utf8(path: &Path) -> Result<String, String> {
    let mut file = std::fs::File::open(path)
        .map_err(|e| format!("cannot open {}: {}", path.display(), e))?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes)
        .map_err(|e| format!("cannot read {}: {}", path.display(), e))?;

    let bytes = match bytes.strip_prefix(b"\xEF\xBB\xBF") {
        Some(rest) => rest.to_vec(),
        None => bytes,
    };

    match String::from_utf8(bytes) {
        Ok(s) => Ok(s),
        Err(e) => {
            let bytes = e.into_bytes();
            // Excel on Windows exports Windows-1252
            let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(&bytes);
            Ok(decoded.into_owned())
        }
    }
}

/// Records land on the sheet row of the line they start on. The reader skips
/// empty lines, so the gap since the previous record becomes blank rows.
fn import_from_string(content: &str, delimiter: u8, name: &str) -> Result<Table, String> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(content.as_bytes());

    let mut table = Table::new(name);
    let mut row = 0usize;
    let mut next_line = 1u64;

    for result in reader.records() {
        let record = result.map_err(|e| format!("row {}: {}", row + 1, e))?;
        let line = record.position().map_or(next_line, |p| p.line());
        row += line.saturating_sub(next_line) as usize;

        for (col_idx, field) in record.iter().enumerate() {
            if !field.is_empty() {
                table.set(row, col_idx, Cell::text(field));
            }
        }
        // A record of empty fields still occupies its row
        if table.height() <= row {
            table.set(row, 0, Cell::Empty);
        }

        // Newlines inside quoted fields belong to this record
        let embedded = record.iter().map(|f| f.matches('\n').count()).sum::<usize>();
        next_line = line + 1 + embedded as u64;
        row += 1;
    }

    Ok(table)
}

pub fn export(table: &Table, path: &Path) -> Result<(), String> {
    export_with_delimiter(table, path, b',')
}

pub fn export_with_delimiter(table: &Table, path: &Path, delimiter: u8) -> Result<(), String> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .from_path(path)
        .map_err(|e| format!("cannot write {}: {}", path.display(), e))?;

    for row in table.rows() {
        let mut record: Vec<String> = row
            .iter()
            .map(|cell| cell.as_text().unwrap_or_default())
            .collect();

        // Trailing empties are dropped; a blank row is a single empty field
        let last_non_empty = record.iter().rposition(|v| !v.is_empty()).map_or(0, |i| i + 1);
        record.truncate(last_non_empty.max(1));
        if record.is_empty() {
            record.push(String::new());
        }

        writer.write_record(&record).map_err(|e| e.to_string())?;
    }

    writer.flush().map_err(|e| e.to_string())?;
    Ok(())
}
