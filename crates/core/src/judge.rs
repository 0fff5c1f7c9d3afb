use crate::error::CoreError;
use crate::model::{ProductPair, Verdict};

/// A verdict plus whatever text the judge wants kept for audit.
#[derive(Debug, Clone, PartialEq)]
pub struct Judgement {
    pub verdict: Verdict,
    /// Raw report text (AI judges); `None` for judges that produce no report.
    pub report: Option<String>,
}

impl Judgement {
    pub fn verdict(verdict: Verdict) -> Self {
        Self { verdict, report: None }
    }
}

/// Decides whether the two sides of a pair are the same product from the same
/// publisher. Implementations are called once per pending row, in table order.
pub trait Judge {
    /// Short name used in logs and summaries ("exact", "ai").
    fn name(&self) -> &'static str;

    fn judge(&mut self, pair: &ProductPair) -> Result<Judgement, CoreError>;
}
