#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use std::fmt::Display;

use serde::{Deserialize, Serialize};

/// All averages are expressed on this scale, whatever the evaluation's
/// `out_of` maximum.
pub const NOTES_MAX: f64 = 20.0;

/// A single recorded grade for one student in one evaluation.
///
/// Only `Value` carries weight in averages; every other variant is excluded
/// from both the note sum and the coefficient sum.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Note {
    /// Numeric grade, on the owning evaluation's `out_of` scale.
    Value(f64),
    /// Student was absent.
    Absent,
    /// Excused absence: the grade is neutralized.
    Neutralized,
    /// Grade not yet entered; flags the module as pending.
    Pending,
}

impl Note {
    /// Returns the numeric value, if any.
    pub fn value(self) -> Option<f64> {
        match self {
            Note::Value(v) => Some(v),
            _ => None,
        }
    }

    /// Returns the grade rescaled to /20, if numeric. `out_of` must be
    /// positive for the evaluation to be considered at all.
    pub fn scaled(self, out_of: f64) -> Option<f64> {
        self.value().map(|v| v * NOTES_MAX / out_of)
    }

    /// True when this note carries weight in averages.
    pub fn is_numeric(self) -> bool {
        matches!(self, Note::Value(_))
    }
}

impl Display for Note {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Note::Value(v) => write!(f, "{}", fmt_value(*v)),
            Note::Absent => write!(f, "ABS"),
            Note::Neutralized => write!(f, "EXC"),
            Note::Pending => write!(f, "ATT"),
        }
    }
}

/// Formats a numeric grade for bulletins and recap tables: two decimals,
/// left-padded with zeros to a fixed width of five ("09.50", "12.00").
pub fn fmt_value(value: f64) -> String {
    let rounded = (value * 100.0).round() / 100.0;
    format!("{rounded:05.2}")
}

/// Formats an optional average: numeric values as [`fmt_value`], missing
/// averages as `"-"`.
pub fn fmt_average(average: Option<f64>) -> String {
    match average {
        Some(v) => fmt_value(v),
        None => "-".to_string(),
    }
}
