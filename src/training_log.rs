//! Workout log: athlete metadata plus an append-only list of sessions.
//!
//! The same records live either in `log.json` or in a spreadsheet; the
//! header mapping here ([`SHEET_HEADERS`], [`SessionRecord::to_row`],
//! [`SessionRecord::from_row`]) keeps the two field-equivalent.

use std::path::Path;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::error::CoachError;

/// Spreadsheet header row written on first use, in column order.
pub const SHEET_HEADERS: [&str; 8] = [
    "Date",
    "Type",
    "Details",
    "Avg_HR",
    "Avg_Split",
    "Meters",
    "RPE",
    "Notes",
];

/// Root of `log.json`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TrainingLog {
    /// The athlete being coached.
    pub athlete: Athlete,
    /// Logged sessions in insertion order.
    #[serde(default)]
    pub sessions: Vec<SessionRecord>,
}

/// Athlete identity, goal, and physiology.
///
/// Numeric fields are kept as text so they render exactly as written.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Athlete {
    /// Athlete name.
    pub name: String,
    /// Target 2k time, e.g. `6:30`.
    #[serde(deserialize_with = "text_or_number")]
    pub goal_2k_time: String,
    /// Date of the goal piece; parsed on demand.
    pub goal_date: String,
    /// Body weight in pounds.
    #[serde(deserialize_with = "text_or_number")]
    pub weight_lb: String,
    /// VO2max estimate.
    #[serde(deserialize_with = "text_or_number")]
    pub vo2max: String,
    /// Age in years.
    #[serde(deserialize_with = "text_or_number")]
    pub age: String,
}

/// One logged workout. Absent fields are empty strings, never missing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SessionRecord {
    /// Session date in any common textual format.
    #[serde(default, deserialize_with = "text_or_number")]
    pub date: String,
    /// Free-text category (erg, lift, ...).
    #[serde(default, rename = "type", deserialize_with = "text_or_number")]
    pub kind: String,
    /// Workout description.
    #[serde(default, deserialize_with = "text_or_number")]
    pub details: String,
    /// Average heart rate.
    #[serde(default, deserialize_with = "text_or_number")]
    pub avg_hr: String,
    /// Average split.
    #[serde(default, deserialize_with = "text_or_number")]
    pub avg_split: String,
    /// Distance in meters.
    #[serde(default, deserialize_with = "text_or_number")]
    pub meters: String,
    /// Rate of perceived exertion.
    #[serde(default, deserialize_with = "text_or_number")]
    pub rpe: String,
    /// Free-text notes.
    #[serde(default, deserialize_with = "text_or_number")]
    pub notes: String,
}

impl SessionRecord {
    fn field(&self, header: &str) -> Option<&str> {
        let value = match header.trim() {
            "Date" => &self.date,
            "Type" => &self.kind,
            "Details" => &self.details,
            "Avg_HR" => &self.avg_hr,
            "Avg_Split" => &self.avg_split,
            "Meters" => &self.meters,
            "RPE" => &self.rpe,
            "Notes" => &self.notes,
            _ => return None,
        };
        Some(value.as_str())
    }

    fn field_mut(&mut self, header: &str) -> Option<&mut String> {
        match header.trim() {
            "Date" => Some(&mut self.date),
            "Type" => Some(&mut self.kind),
            "Details" => Some(&mut self.details),
            "Avg_HR" => Some(&mut self.avg_hr),
            "Avg_Split" => Some(&mut self.avg_split),
            "Meters" => Some(&mut self.meters),
            "RPE" => Some(&mut self.rpe),
            "Notes" => Some(&mut self.notes),
            _ => None,
        }
    }

    /// Lay the record out along an existing header row.
    ///
    /// Headers that do not name a record field produce `""`.
    pub fn to_row<S: AsRef<str>>(&self, headers: &[S]) -> Vec<String> {
        headers
            .iter()
            .map(|h| self.field(h.as_ref()).unwrap_or_default().to_owned())
            .collect()
    }

    /// Build a record from a spreadsheet row, matching columns by header name.
    ///
    /// Short rows leave the trailing fields empty; unknown headers are ignored.
    pub fn from_row<S: AsRef<str>>(headers: &[S], row: &[String]) -> Self {
        let mut record = Self::default();
        for (header, value) in headers.iter().zip(row) {
            if let Some(slot) = record.field_mut(header.as_ref()) {
                value.clone_into(slot);
            }
        }
        record
    }
}

impl TrainingLog {
    /// Parse a log from JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`CoachError::Parse`] when the athlete block is missing or malformed.
    pub fn from_json(text: &str) -> Result<Self, CoachError> {
        serde_json::from_str(text).map_err(|e| CoachError::Parse(format!("invalid log: {e}")))
    }

    /// Load a log from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns [`CoachError::Io`] on read failure or [`CoachError::Parse`]
    /// on malformed content.
    pub fn load(path: &Path) -> Result<Self, CoachError> {
        let text = std::fs::read_to_string(path).map_err(|source| CoachError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&text)
    }
}

/// Accept a JSON string or number and keep its textual form; `null` becomes `""`.
fn text_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(String::new()),
        Some(Value::String(s)) => Ok(s),
        Some(Value::Number(n)) => Ok(n.to_string()),
        Some(Value::Bool(b)) => Ok(b.to_string()),
        Some(other) => Err(D::Error::custom(format!(
            "expected text or number, got {other}"
        ))),
    }
}
