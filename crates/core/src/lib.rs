//! Product/publisher pair matching.
//!
//! Pure crate: receives an in-memory table, judges each pending row, writes
//! verdicts back into the table. No file or network I/O.

pub mod batch;
pub mod cell;
pub mod error;
pub mod exact;
pub mod judge;
pub mod model;
pub mod prompt;
pub mod report;
pub mod table;

pub use batch::{run_batch, BatchOptions, BatchSummary, RowOutcome};
pub use cell::Cell;
pub use error::CoreError;
pub use exact::ExactJudge;
pub use judge::{Judge, Judgement};
pub use model::{ProductPair, Row, Status, Verdict};
pub use report::{parse_conclusion, Conclusion, Sameness};
pub use table::{ColumnLayout, Table};
