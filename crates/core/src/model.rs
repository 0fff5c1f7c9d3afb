use serde::Serialize;

// ---------------------------------------------------------------------------
// Status / Verdict
// ---------------------------------------------------------------------------

/// Status cell contents as found on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Unset,
    Match,
    NotMatch,
    Error,
}

impl Status {
    /// Exact match on the trimmed cell text. Anything unrecognized is `Unset`.
    pub fn from_cell_text(text: Option<&str>) -> Self {
        match text.map(str::trim) {
            Some("Match") => Status::Match,
            Some("Not Match") => Status::NotMatch,
            Some("Error") => Status::Error,
            _ => Status::Unset,
        }
    }

    /// Rows with a final verdict are never re-evaluated.
    pub fn is_final(&self) -> bool {
        matches!(self, Status::Match | Status::NotMatch)
    }
}

/// Outcome written into the status column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Match,
    NotMatch,
    Error,
}

impl Verdict {
    pub fn as_str(&self) -> &'static str {
        match self {
            Verdict::Match => "Match",
            Verdict::NotMatch => "Not Match",
            Verdict::Error => "Error",
        }
    }

    pub fn from_flags(product_same: bool, publisher_same: bool) -> Self {
        if product_same && publisher_same {
            Verdict::Match
        } else {
            Verdict::NotMatch
        }
    }
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Row
// ---------------------------------------------------------------------------

/// The two sides being compared. Absent cells are `None`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProductPair {
    pub product_a: Option<String>,
    pub product_b: Option<String>,
    pub publisher_a: Option<String>,
    pub publisher_b: Option<String>,
}

impl ProductPair {
    pub fn new(
        product_a: impl Into<String>,
        product_b: impl Into<String>,
        publisher_a: impl Into<String>,
        publisher_b: impl Into<String>,
    ) -> Self {
        Self {
            product_a: Some(product_a.into()),
            product_b: Some(product_b.into()),
            publisher_a: Some(publisher_a.into()),
            publisher_b: Some(publisher_b.into()),
        }
    }
}

/// One comparison unit read from the table.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    /// 1-based sheet row number (row 1 is the header).
    pub number: usize,
    pub pair: ProductPair,
    pub status: Status,
    pub instruction: Option<String>,
}
