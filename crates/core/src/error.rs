use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum CoreError {
    /// Column reference is not a valid spreadsheet column (e.g. "D", "AA").
    InvalidColumn(String),
    /// Two roles in a column layout point at the same column.
    DuplicateColumn { column: String, first: &'static str, second: &'static str },
    /// The judge could not produce a verdict for a row.
    Judge(String),
}

impl fmt::Display for CoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidColumn(col) => write!(f, "invalid column reference: '{col}'"),
            Self::DuplicateColumn { column, first, second } => {
                write!(f, "column {column} is assigned to both {first} and {second}")
            }
            Self::Judge(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for CoreError {}
