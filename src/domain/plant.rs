use std::error::Error;
use std::fmt;
use std::str::FromStr;

use serde::Serialize;

/// The two care actions a plant can fall due for. Both are evaluated
/// independently; a plant can need water and fertilizer on the same day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CareAction {
    Water,
    Fertilize,
}

impl CareAction {
    pub const ALL: [CareAction; 2] = [CareAction::Water, CareAction::Fertilize];

    pub fn as_str(self) -> &'static str {
        match self {
            CareAction::Water => "water",
            CareAction::Fertilize => "fertilize",
        }
    }
}

impl fmt::Display for CareAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CareAction {
    type Err = ParseCareActionError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "water" => Ok(CareAction::Water),
            "fertilize" => Ok(CareAction::Fertilize),
            other => Err(ParseCareActionError(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseCareActionError(pub String);

impl fmt::Display for ParseCareActionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown care action '{}', expected water|fertilize", self.0)
    }
}

impl Error for ParseCareActionError {}

/// A plant as held in the local cache. Date and frequency fields keep the
/// remote wire representation (non-padded `YYYY-M-D` strings, decimal-digit
/// strings); parsing happens at evaluation time and fails closed per field.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct PlantRecord {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub plant_type: String,
    pub planting_date: String,
    pub watering_frequency: String,
    pub fertilizing_frequency: String,
    pub last_watered_date: String,
    pub last_fertilized_date: String,
    #[serde(skip_serializing)]
    pub image: Option<Vec<u8>>,
}
