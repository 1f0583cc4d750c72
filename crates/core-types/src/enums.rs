use serde::{Deserialize, Serialize};

/// The position held by the crossover strategy on a given day.
///
/// Serialized as the numeric signal (`0` flat, `1` long) so the presentation
/// layer can plot it directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum Position {
    Flat,
    Long,
}

impl Position {
    /// Returns the exposure this position represents (0.0 or 1.0).
    pub fn exposure(&self) -> f64 {
        match self {
            Position::Flat => 0.0,
            Position::Long => 1.0,
        }
    }
}

impl From<Position> for u8 {
    fn from(position: Position) -> Self {
        match position {
            Position::Flat => 0,
            Position::Long => 1,
        }
    }
}

impl TryFrom<u8> for Position {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Position::Flat),
            1 => Ok(Position::Long),
            other => Err(format!("invalid position signal: {}", other)),
        }
    }
}
