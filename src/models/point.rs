//! Point model for located air quality readings

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Geographic position of a point
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct Coordinates {
    /// Latitude in decimal degrees
    pub latitude: f64,
    /// Longitude in decimal degrees
    pub longitude: f64,
}

/// A located point of interest taken from the points API
#[derive(Debug, Clone, PartialEq)]
pub struct Point {
    pub location: Coordinates,
    /// Raw classification, `None` when the point has no current reading
    pub air_index_level: Option<String>,
}

impl Point {
    #[must_use]
    pub fn new(latitude: f64, longitude: f64, air_index_level: Option<&str>) -> Self {
        Self {
            location: Coordinates {
                latitude,
                longitude,
            },
            air_index_level: air_index_level.map(str::to_string),
        }
    }

    /// Whether the point carries a classification and belongs on the map
    #[must_use]
    pub fn is_classified(&self) -> bool {
        self.air_index_level.is_some()
    }
}

/// Air quality severity reported for a point
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AirIndexLevel {
    VeryGood,
    Good,
    Satisfactory,
    Moderate,
    Bad,
    VeryBad,
}

impl AirIndexLevel {
    pub const ALL: [AirIndexLevel; 6] = [
        AirIndexLevel::VeryGood,
        AirIndexLevel::Good,
        AirIndexLevel::Satisfactory,
        AirIndexLevel::Moderate,
        AirIndexLevel::Bad,
        AirIndexLevel::VeryBad,
    ];

    /// Wire name of the level
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            AirIndexLevel::VeryGood => "VERY_GOOD",
            AirIndexLevel::Good => "GOOD",
            AirIndexLevel::Satisfactory => "SATISFACTORY",
            AirIndexLevel::Moderate => "MODERATE",
            AirIndexLevel::Bad => "BAD",
            AirIndexLevel::VeryBad => "VERY_BAD",
        }
    }
}

impl fmt::Display for AirIndexLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AirIndexLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AirIndexLevel::ALL
            .into_iter()
            .find(|level| level.as_str() == s)
            .ok_or_else(|| format!("Unknown air index level '{s}'"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coordinates_deserialization() {
        let coordinates: Coordinates =
            serde_json::from_str(r#"{"latitude": 50.06, "longitude": 19.94}"#).unwrap();
        assert_eq!(coordinates.latitude, 50.06);
        assert_eq!(coordinates.longitude, 19.94);
    }

    #[test]
    fn test_classification() {
        assert!(Point::new(52.0, 21.0, Some("MODERATE")).is_classified());
        assert!(!Point::new(52.0, 21.0, None).is_classified());
    }

    #[test]
    fn test_unknown_level_still_classified() {
        let point = Point::new(52.0, 21.0, Some("EXTREME"));
        assert!(point.is_classified());
        assert!("EXTREME".parse::<AirIndexLevel>().is_err());
    }

    #[test]
    fn test_level_names() {
        for level in AirIndexLevel::ALL {
            assert_eq!(level.as_str().parse::<AirIndexLevel>(), Ok(level));
            assert_eq!(level.to_string(), level.as_str());
        }
        assert_eq!("VERY_BAD".parse::<AirIndexLevel>(), Ok(AirIndexLevel::VeryBad));
    }
}
