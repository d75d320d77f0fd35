//! Content and settings load errors
//!
//! The simulation itself never fails; these only surface while loading and
//! validating static data before a session starts.

use std::fmt;

#[derive(Debug)]
pub enum ContentError {
    /// JSON could not be parsed into the schema
    Parse(serde_json::Error),
    /// A stage weight table or split rule names an undefined type
    UnknownType { referenced_by: String, type_id: String },
    /// A stage weight table sums to zero
    EmptyWeights { stage_id: u32 },
    /// Catalog defines no stages at all
    NoStages,
    /// A phase duration is negative or not finite
    InvalidDuration { type_id: String, phase: &'static str },
    /// A target type starts with no hit points
    InvalidHp { type_id: String },
    /// A settings field is out of its valid range
    InvalidSettings { field: &'static str, reason: String },
}

impl fmt::Display for ContentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parse(err) => write!(f, "content parse error: {err}"),
            Self::UnknownType {
                referenced_by,
                type_id,
            } => write!(f, "{referenced_by} references unknown target type '{type_id}'"),
            Self::EmptyWeights { stage_id } => {
                write!(f, "stage {stage_id} has a spawn weight table summing to zero")
            }
            Self::NoStages => write!(f, "catalog defines no stages"),
            Self::InvalidDuration { type_id, phase } => {
                write!(f, "target type '{type_id}' has an invalid {phase} duration")
            }
            Self::InvalidHp { type_id } => {
                write!(f, "target type '{type_id}' must have at least 1 hp")
            }
            Self::InvalidSettings { field, reason } => {
                write!(f, "invalid setting '{field}': {reason}")
            }
        }
    }
}

impl std::error::Error for ContentError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Parse(err) => Some(err),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for ContentError {
    fn from(err: serde_json::Error) -> Self {
        Self::Parse(err)
    }
}
