//! Parsing of `"lon,lat"` coordinate strings.
//!
//! Every coordinate accepted over the wire (the `loc` list, the vehicle
//! `start` and the optional vehicle `end`) goes through [`parse_coordinate`].
//! A [`Coordinate`] serializes as the two-element `[lon, lat]` array VROOM
//! expects for locations.

use serde::ser::SerializeTuple;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{Error, Result};

/// Where a coordinate came from, used to produce targeted error messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoordinateRole {
    /// One entry of the repeated `loc` parameter.
    Location,
    /// The vehicle start coordinate.
    Start,
    /// The vehicle end coordinate.
    End,
}

impl CoordinateRole {
    pub(crate) fn label(&self) -> &'static str {
        match self {
            CoordinateRole::Location => "coord",
            CoordinateRole::Start => "start coord",
            CoordinateRole::End => "end coord",
        }
    }
}

/// A longitude/latitude pair with finite components.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinate {
    pub lon: f64,
    pub lat: f64,
}

impl Coordinate {
    pub fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }
}

impl Serialize for Coordinate {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut tuple = serializer.serialize_tuple(2)?;
        tuple.serialize_element(&self.lon)?;
        tuple.serialize_element(&self.lat)?;
        tuple.end()
    }
}

impl<'de> Deserialize<'de> for Coordinate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let (lon, lat) = <(f64, f64)>::deserialize(deserializer)?;
        Ok(Self { lon, lat })
    }
}

/// Parse a `"lon,lat"` string.
///
/// Fails with [`Error::InvalidCoordinateFormat`] when the input does not split
/// into exactly two comma-separated parts, and with
/// [`Error::InvalidCoordinateValue`] when either part is not a finite number.
/// Whitespace around each component is ignored.
pub fn parse_coordinate(input: &str, role: CoordinateRole) -> Result<Coordinate> {
    let parts: Vec<&str> = input.split(',').collect();
    if parts.len() != 2 {
        return Err(Error::InvalidCoordinateFormat {
            role,
            input: input.to_string(),
        });
    }

    let invalid = || Error::InvalidCoordinateValue {
        role,
        input: input.to_string(),
    };

    let lon = parse_component(parts[0]).ok_or_else(invalid)?;
    let lat = parse_component(parts[1]).ok_or_else(invalid)?;

    Ok(Coordinate { lon, lat })
}

/// Parse every location in order, stopping at the first invalid entry.
pub fn parse_locations<S: AsRef<str>>(inputs: &[S]) -> Result<Vec<Coordinate>> {
    inputs
        .iter()
        .map(|input| parse_coordinate(input.as_ref(), CoordinateRole::Location))
        .collect()
}

fn parse_component(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|value| value.is_finite())
}
