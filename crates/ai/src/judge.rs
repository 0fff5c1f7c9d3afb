use pairmatch_core::prompt::{comparison_prompt, SYSTEM_PROMPT};
use pairmatch_core::{parse_conclusion, CoreError, Judge, Judgement, ProductPair};

use crate::client::ChatClient;

/// Asks the chat model for a structured comparison report and reads the
/// Conclusion block. Missing labels fail closed to Not Match; transport and
/// API failures come back as `Err` so the batch records Error.
pub struct AiJudge {
    client: ChatClient,
}

impl AiJudge {
    pub fn new(client: ChatClient) -> Self {
        Self { client }
    }
}

impl Judge for AiJudge {
    fn name(&self) -> &'static str {
        "ai"
    }

    fn judge(&mut self, pair: &ProductPair) -> Result<Judgement, CoreError> {
        let prompt = comparison_prompt(pair);
        let report = self
            .client
            .complete(SYSTEM_PROMPT, &prompt)
            .map_err(|e| CoreError::Judge(e.to_string()))?;

        let conclusion = parse_conclusion(&report);
        log::debug!(
            "conclusion: brand={:?} product={:?} final={:?}",
            conclusion.brand,
            conclusion.product,
            conclusion.final_same
        );
        if !conclusion.is_complete() {
            log::warn!("report has no complete Conclusion block; treating as Not Match");
        }

        Ok(Judgement {
            verdict: conclusion.verdict(),
            report: Some(report),
        })
    }
}
