//! Sequential pass over a table: skip finished rows, judge pending ones,
//! write verdicts back in place.
//!
//! Each row is its own failure domain. A judge error turns into an `Error`
//! verdict for that row and the pass moves on.

use std::thread;
use std::time::Duration;

use serde::Serialize;

use crate::error::CoreError;
use crate::judge::{Judge, Judgement};
use crate::model::{Row, Status, Verdict};
use crate::table::{ColumnLayout, Table};

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct BatchOptions {
    /// Pause between judged rows. Skipped rows do not pause.
    pub delay: Duration,
    /// Stop after this many judged rows.
    pub limit: Option<usize>,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self { delay: Duration::from_millis(500), limit: None }
    }
}

// ---------------------------------------------------------------------------
// Outcomes
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RowOutcome {
    /// Status already Match / Not Match; left untouched.
    AlreadyDone { row: usize, status: Status },
    /// Instruction cell empty; left untouched.
    NoInstruction { row: usize },
    Judged { row: usize, verdict: Verdict },
    Failed { row: usize, error: String },
}

impl RowOutcome {
    pub fn row(&self) -> usize {
        match self {
            Self::AlreadyDone { row, .. }
            | Self::NoInstruction { row }
            | Self::Judged { row, .. }
            | Self::Failed { row, .. } => *row,
        }
    }

    /// Verdict written to the status cell, if any.
    pub fn written(&self) -> Option<Verdict> {
        match self {
            Self::Judged { verdict, .. } => Some(*verdict),
            Self::Failed { .. } => Some(Verdict::Error),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BatchSummary {
    pub judge: String,
    pub run_at: String,
    pub rows_scanned: usize,
    pub matched: usize,
    pub not_matched: usize,
    pub errors: usize,
    pub already_done: usize,
    pub no_instruction: usize,
    /// Pass ended early because `limit` was reached.
    pub limited: bool,
    pub outcomes: Vec<RowOutcome>,
}

impl BatchSummary {
    fn new(judge: &str) -> Self {
        Self {
            judge: judge.to_string(),
            run_at: chrono::Utc::now().to_rfc3339(),
            rows_scanned: 0,
            matched: 0,
            not_matched: 0,
            errors: 0,
            already_done: 0,
            no_instruction: 0,
            limited: false,
            outcomes: Vec::new(),
        }
    }

    /// Rows whose status cell was written this pass.
    pub fn judged(&self) -> usize {
        self.matched + self.not_matched + self.errors
    }

    /// Any status cell changed, i.e. the table needs saving.
    pub fn modified(&self) -> bool {
        self.judged() > 0
    }

    fn record(&mut self, outcome: RowOutcome) {
        match &outcome {
            RowOutcome::AlreadyDone { .. } => self.already_done += 1,
            RowOutcome::NoInstruction { .. } => self.no_instruction += 1,
            RowOutcome::Judged { verdict: Verdict::Match, .. } => self.matched += 1,
            RowOutcome::Judged { verdict: Verdict::NotMatch, .. } => self.not_matched += 1,
            RowOutcome::Judged { verdict: Verdict::Error, .. } | RowOutcome::Failed { .. } => {
                self.errors += 1
            }
        }
        self.outcomes.push(outcome);
    }
}

// ---------------------------------------------------------------------------
// Runner
// ---------------------------------------------------------------------------

/// Why a row is not judged, or `None` when it should be.
fn skip_reason(row: &Row) -> Option<RowOutcome> {
    if row.status.is_final() {
        return Some(RowOutcome::AlreadyDone { row: row.number, status: row.status });
    }
    if row.instruction.is_none() {
        return Some(RowOutcome::NoInstruction { row: row.number });
    }
    None
}

fn process_row(judge: &mut dyn Judge, row: &Row) -> Result<Judgement, CoreError> {
    log::info!(
        "row {}: {} / {} | {} / {}",
        row.number,
        row.pair.product_a.as_deref().unwrap_or("-"),
        row.pair.product_b.as_deref().unwrap_or("-"),
        row.pair.publisher_a.as_deref().unwrap_or("-"),
        row.pair.publisher_b.as_deref().unwrap_or("-"),
    );
    judge.judge(&row.pair)
}

/// Judge every pending data row of `table` (row 1 is the header).
pub fn run_batch(
    table: &mut Table,
    layout: &ColumnLayout,
    judge: &mut dyn Judge,
    options: &BatchOptions,
) -> BatchSummary {
    let mut summary = BatchSummary::new(judge.name());
    let mut judged = 0usize;

    for index in 1..table.height() {
        let row = table.read_row(index, layout);

        if let Some(skip) = skip_reason(&row) {
            match &skip {
                RowOutcome::AlreadyDone { status, .. } => {
                    log::debug!("row {}: already processed ({:?})", row.number, status)
                }
                _ => log::debug!("row {}: no instruction, skipping", row.number),
            }
            summary.rows_scanned += 1;
            summary.record(skip);
            continue;
        }

        if options.limit.is_some_and(|limit| judged >= limit) {
            log::info!("limit of {} rows reached, stopping at row {}", judged, row.number);
            summary.limited = true;
            break;
        }
        summary.rows_scanned += 1;

        if judged > 0 && !options.delay.is_zero() {
            thread::sleep(options.delay);
        }
        judged += 1;

        match process_row(judge, &row) {
            Ok(judgement) => {
                table.write_verdict(index, layout, judgement.verdict);
                if let Some(report) = &judgement.report {
                    table.write_report(index, layout, report);
                }
                log::info!("row {}: {}", row.number, judgement.verdict);
                summary.record(RowOutcome::Judged { row: row.number, verdict: judgement.verdict });
            }
            Err(e) => {
                log::warn!("row {}: error - {}", row.number, e);
                table.write_verdict(index, layout, Verdict::Error);
                table.write_report(index, layout, &format!("Error: {e}"));
                summary.record(RowOutcome::Failed { row: row.number, error: e.to_string() });
            }
        }
    }

    summary
}
