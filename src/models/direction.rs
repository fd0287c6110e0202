use crate::error::Error;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

static VECTOR_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^-?\d+(\.\d+)?,-?\d+(\.\d+)?$").expect("valid vector pattern"));

/// Direction of movement counted as "entering", stored as an `"x,y"` vector.
///
/// Legacy `LTR`/`RTL` labels are accepted on input and rewritten to `"1,0"`
/// and `"-1,0"`. The vector is not required to be unit length; only its
/// angle is meaningful.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EntryDirection(String);

impl EntryDirection {
    pub fn parse(input: &str) -> Result<Self, Error> {
        let input = input.trim();
        match input {
            "LTR" => Ok(Self::left_to_right()),
            "RTL" => Ok(Self::right_to_left()),
            _ if VECTOR_PATTERN.is_match(input) => Ok(Self(input.to_string())),
            _ => Err(Error::Validation(format!(
                "Invalid entry direction vector format: {}",
                input
            ))),
        }
    }

    pub fn left_to_right() -> Self {
        Self("1,0".to_string())
    }

    pub fn right_to_left() -> Self {
        Self("-1,0".to_string())
    }

    /// Build the vector for a compass angle in degrees.
    pub fn from_angle(degrees: f64) -> Self {
        Self(encode(degrees))
    }

    pub fn components(&self) -> (f64, f64) {
        // The pattern guarantees exactly two numeric parts.
        let mut parts = self.0.split(',').map(|p| p.parse::<f64>().unwrap_or(0.0));
        let x = parts.next().unwrap_or(0.0);
        let y = parts.next().unwrap_or(0.0);
        (x, y)
    }

    /// Display angle in degrees, in `(-180, 180]`.
    pub fn angle(&self) -> f64 {
        let (x, y) = self.components();
        y.atan2(x).to_degrees()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for EntryDirection {
    fn default() -> Self {
        Self::left_to_right()
    }
}

impl TryFrom<String> for EntryDirection {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<EntryDirection> for String {
    fn from(direction: EntryDirection) -> Self {
        direction.0
    }
}

impl Display for EntryDirection {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// `angle -> "cos,sin"` with both components rounded to two decimals.
pub fn encode(degrees: f64) -> String {
    let radians = degrees.to_radians();
    format!("{},{}", two_decimals(radians.cos()), two_decimals(radians.sin()))
}

/// `"x,y" -> atan2(y, x)` in degrees.
pub fn decode(vector: &str) -> Result<f64, Error> {
    EntryDirection::parse(vector).map(|direction| direction.angle())
}

fn two_decimals(value: f64) -> String {
    let rounded = (value * 100.0).round() / 100.0;
    // -0.0 would print as "-0.00"
    let rounded = if rounded == 0.0 { 0.0 } else { rounded };
    format!("{:.2}", rounded)
}
