//! Direct textual equality: same product iff the trimmed, lower-cased names
//! are equal, same publisher likewise.

use crate::error::CoreError;
use crate::judge::{Judge, Judgement};
use crate::model::{ProductPair, Verdict};

/// Absent values normalize to the empty string, so absent == absent.
pub fn normalize(value: Option<&str>) -> String {
    value.unwrap_or("").trim().to_lowercase()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Comparison {
    pub product_same: bool,
    pub publisher_same: bool,
    /// At least one "same" flag rests on both sides being absent.
    pub absent_equal: bool,
}

impl Comparison {
    pub fn verdict(&self) -> Verdict {
        Verdict::from_flags(self.product_same, self.publisher_same)
    }
}

pub fn compare(pair: &ProductPair) -> Comparison {
    let product_a = normalize(pair.product_a.as_deref());
    let product_b = normalize(pair.product_b.as_deref());
    let publisher_a = normalize(pair.publisher_a.as_deref());
    let publisher_b = normalize(pair.publisher_b.as_deref());

    let product_same = product_a == product_b;
    let publisher_same = publisher_a == publisher_b;

    let absent_equal = (product_same && product_a.is_empty())
        || (publisher_same && publisher_a.is_empty());

    Comparison { product_same, publisher_same, absent_equal }
}

#[derive(Debug, Default)]
pub struct ExactJudge;

impl Judge for ExactJudge {
    fn name(&self) -> &'static str {
        "exact"
    }

    fn judge(&mut self, pair: &ProductPair) -> Result<Judgement, CoreError> {
        let cmp = compare(pair);
        log::debug!(
            "product same: {}, publisher same: {}",
            cmp.product_same,
            cmp.publisher_same
        );
        if cmp.absent_equal && cmp.verdict() == Verdict::Match {
            log::warn!("match relies on blank values on both sides");
        }
        Ok(Judgement::verdict(cmp.verdict()))
    }
}
