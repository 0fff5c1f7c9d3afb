//! Extraction of the Conclusion block from a free-text AI comparison report.
//!
//! Parsing never fails: a label that cannot be found comes back as `None`, and
//! the decision rule treats `None` as "not Same".

use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;

use crate::model::Verdict;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Sameness {
    Same,
    Different,
}

impl Sameness {
    /// Title-case the captured word ("SAME", "same" -> Same).
    fn from_word(word: &str) -> Option<Self> {
        match word.to_ascii_lowercase().as_str() {
            "same" => Some(Sameness::Same),
            "different" => Some(Sameness::Different),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Sameness::Same => "Same",
            Sameness::Different => "Different",
        }
    }
}

/// The labeled lines pulled out of a report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Conclusion {
    pub brand: Option<Sameness>,
    pub product: Option<Sameness>,
    /// `Final result: Same|Not same` line. Kept for audit; does not feed the verdict.
    pub final_same: Option<bool>,
}

impl Conclusion {
    /// Match iff Brand and Product are both Same. Missing fields fail closed.
    pub fn verdict(&self) -> Verdict {
        let brand_same = self.brand == Some(Sameness::Same);
        let product_same = self.product == Some(Sameness::Same);
        Verdict::from_flags(product_same, brand_same)
    }

    /// Both conclusion lines were found.
    pub fn is_complete(&self) -> bool {
        self.brand.is_some() && self.product.is_some()
    }
}

fn brand_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)\bbrand\b[\s*_]*:[\s*_]*(same|different)\b").expect("valid regex")
    })
}

fn product_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)\bproduct\b[\s*_]*:[\s*_]*(same|different)\b").expect("valid regex")
    })
}

fn final_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)\bfinal\s+result\b[\s*_]*:[\s*_]*(not\s+same|same)\b").expect("valid regex")
    })
}

fn conclusion_heading_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)\bconclusion\b").expect("valid regex"))
}

fn find_sameness(re: &Regex, text: &str) -> Option<Sameness> {
    re.captures(text)
        .and_then(|c| c.get(1))
        .and_then(|m| Sameness::from_word(m.as_str()))
}

/// Search after each "Conclusion" mention, last to first, then the whole
/// report. A closing "In conclusion, ..." sentence has nothing after it, so
/// the heading before it still wins.
fn find_label(re: &Regex, text: &str) -> Option<Sameness> {
    let headings: Vec<_> = conclusion_heading_re().find_iter(text).collect();
    headings
        .iter()
        .rev()
        .find_map(|heading| find_sameness(re, &text[heading.end()..]))
        .or_else(|| find_sameness(re, text))
}

pub fn parse_conclusion(text: &str) -> Conclusion {
    let final_same = final_re()
        .captures(text)
        .and_then(|c| c.get(1))
        .map(|m| !m.as_str().to_ascii_lowercase().starts_with("not"));

    Conclusion {
        brand: find_label(brand_re(), text),
        product: find_label(product_re(), text),
        final_same,
    }
}
