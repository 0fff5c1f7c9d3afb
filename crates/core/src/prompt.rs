// Comparison request sent to the text-generation service.
//
// The Conclusion and Final result wording is what `report::parse_conclusion`
// looks for; keep the two in step.

use crate::model::ProductPair;

/// Placeholder substituted for absent fields.
pub const UNKNOWN: &str = "Unknown";

pub const SYSTEM_PROMPT: &str = "You are a comparison assistant. You compare two software \
products or packages and decide whether they are the same product from the same publisher. \
Always answer in the exact section structure requested, in plain text.";

const COMPARISON_TEMPLATE: &str = r#"Compare two software products/packages.

Input pair:
- Item A: {item_a} by {publisher_a}
- Item B: {item_b} by {publisher_b}

Required output structure:

1) Brand (Publisher) Check
   - State the publisher of Item A and of Item B
   - Same or different?

2) Product Check
   - What is Item A? (purpose, features, use)
   - What is Item B? (purpose, features, use)
   - Same or different products?

3) Key Differences
   - 3-6 bullet points of main differences

4) Summary
   - 2-4 lines on how the two relate

5) Conclusion
   - Brand: Same / Different
   - Product: Same / Different

6) Final result: Same / Not same

Rule: if BOTH the products are the same AND the publishers are the same, the final result is Same. Otherwise it is Not same."#;

/// Build the user prompt for one pair. Absent fields become "Unknown".
pub fn comparison_prompt(pair: &ProductPair) -> String {
    fn field(value: &Option<String>) -> &str {
        match value.as_deref().map(str::trim) {
            Some(v) if !v.is_empty() => v,
            _ => UNKNOWN,
        }
    }

    COMPARISON_TEMPLATE
        .replace("{item_a}", field(&pair.product_a))
        .replace("{publisher_a}", field(&pair.publisher_a))
        .replace("{item_b}", field(&pair.product_b))
        .replace("{publisher_b}", field(&pair.publisher_b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fields_substituted() {
        let pair = ProductPair::new("Photoshop", "Lightroom", "Adobe Inc.", "Adobe");
        let prompt = comparison_prompt(&pair);
        assert!(prompt.contains("- Item A: Photoshop by Adobe Inc."));
        assert!(prompt.contains("- Item B: Lightroom by Adobe"));
        assert!(!prompt.contains('{'));
    }

    #[test]
    fn absent_fields_become_unknown() {
        let pair = ProductPair {
            product_a: Some("Zoom".into()),
            product_b: Some("   ".into()),
            publisher_a: None,
            publisher_b: None,
        };
        let prompt = comparison_prompt(&pair);
        assert!(prompt.contains("- Item A: Zoom by Unknown"));
        assert!(prompt.contains("- Item B: Unknown by Unknown"));
    }

    #[test]
    fn output_contract_present() {
        let prompt = comparison_prompt(&ProductPair::default());
        for heading in [
            "1) Brand (Publisher) Check",
            "2) Product Check",
            "3) Key Differences",
            "4) Summary",
            "5) Conclusion",
            "6) Final result: Same / Not same",
            "- Brand: Same / Different",
            "- Product: Same / Different",
        ] {
            assert!(prompt.contains(heading), "missing: {heading}");
        }
    }
}
