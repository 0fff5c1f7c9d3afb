//! In-memory sheet and the column layout that maps it onto rows.

use crate::cell::{column_letters, Cell};
use crate::error::CoreError;
use crate::model::{ProductPair, Row, Status, Verdict};

static EMPTY_CELL: Cell = Cell::Empty;

// ---------------------------------------------------------------------------
// Column layout
// ---------------------------------------------------------------------------

/// 0-based column positions of each field. Positions are a contract with the
/// sheet; the header row is never consulted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnLayout {
    pub product_a: usize,
    pub product_b: usize,
    pub publisher_a: usize,
    pub publisher_b: usize,
    pub status: usize,
    pub instruction: usize,
    /// Audit column for the raw AI report; `None` disables it.
    pub report: Option<usize>,
}

impl Default for ColumnLayout {
    /// D, E, F, G, K, L, M
    fn default() -> Self {
        Self {
            product_a: 3,
            product_b: 4,
            publisher_a: 5,
            publisher_b: 6,
            status: 10,
            instruction: 11,
            report: Some(12),
        }
    }
}

impl ColumnLayout {
    fn roles(&self) -> Vec<(&'static str, usize)> {
        let mut roles = vec![
            ("product_a", self.product_a),
            ("product_b", self.product_b),
            ("publisher_a", self.publisher_a),
            ("publisher_b", self.publisher_b),
            ("status", self.status),
            ("instruction", self.instruction),
        ];
        if let Some(report) = self.report {
            roles.push(("report", report));
        }
        roles
    }

    /// Output columns must not overlap any other role.
    pub fn validate(&self) -> Result<(), CoreError> {
        let roles = self.roles();
        for (i, (first, a)) in roles.iter().enumerate() {
            for (second, b) in roles.iter().skip(i + 1) {
                let writes = matches!(*first, "status" | "report") || matches!(*second, "status" | "report");
                if a == b && writes {
                    return Err(CoreError::DuplicateColumn {
                        column: column_letters(*a),
                        first: *first,
                        second: *second,
                    });
                }
            }
        }
        Ok(())
    }

    pub fn describe(&self) -> String {
        self.roles()
            .iter()
            .map(|(role, col)| format!("{role}={}", column_letters(*col)))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

// ---------------------------------------------------------------------------
// Table
// ---------------------------------------------------------------------------

/// One sheet worth of cells, row-major, 0-based.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    pub name: String,
    rows: Vec<Vec<Cell>>,
}

impl Table {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), rows: Vec::new() }
    }

    /// Number of populated rows, header included.
    pub fn height(&self) -> usize {
        self.rows.len()
    }

    pub fn width(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    pub fn get(&self, row: usize, col: usize) -> &Cell {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .unwrap_or(&EMPTY_CELL)
    }

    pub fn text(&self, row: usize, col: usize) -> Option<String> {
        self.get(row, col).as_text()
    }

    /// Writing past the current extent grows the grid.
    pub fn set(&mut self, row: usize, col: usize, cell: Cell) {
        if self.rows.len() <= row {
            self.rows.resize_with(row + 1, Vec::new);
        }
        let r = &mut self.rows[row];
        if r.len() <= col {
            r.resize_with(col + 1, Cell::default);
        }
        r[col] = cell;
    }

    /// Read the data row at 0-based `index` through `layout`.
    pub fn read_row(&self, index: usize, layout: &ColumnLayout) -> Row {
        Row {
            number: index + 1,
            pair: ProductPair {
                product_a: self.text(index, layout.product_a),
                product_b: self.text(index, layout.product_b),
                publisher_a: self.text(index, layout.publisher_a),
                publisher_b: self.text(index, layout.publisher_b),
            },
            status: Status::from_cell_text(self.text(index, layout.status).as_deref()),
            instruction: self.text(index, layout.instruction),
        }
    }

    pub fn write_verdict(&mut self, index: usize, layout: &ColumnLayout, verdict: Verdict) {
        self.set(index, layout.status, Cell::text(verdict.as_str()));
    }

    /// No-op when the layout has no audit column.
    pub fn write_report(&mut self, index: usize, layout: &ColumnLayout, report: &str) {
        if let Some(col) = layout.report {
            self.set(index, col, Cell::text(report));
        }
    }
}
