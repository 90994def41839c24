//! The VROOM input document: one vehicle plus one job per location.

use serde::{Deserialize, Serialize};

use crate::coordinate::Coordinate;
use crate::error::{Error, Result};

/// Identifier of the single vehicle in every request.
pub const VEHICLE_ID: u32 = 0;

/// The routing agent. `end` is omitted from the JSON when absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vehicle {
    pub id: u32,
    pub start: Coordinate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<Coordinate>,
}

/// A location to visit. `id` is the position of the location in the query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub id: usize,
    pub location: Coordinate,
}

/// The exact document handed to the optimizer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComputeRequest {
    pub vehicles: Vec<Vehicle>,
    pub jobs: Vec<Job>,
}

impl ComputeRequest {
    /// Build the request for a single vehicle visiting `locations` in any order.
    ///
    /// Job ids are dense and follow the input order, so the optimizer's
    /// per-job output can be correlated back to the caller's `loc` list.
    pub fn build(start: Coordinate, end: Option<Coordinate>, locations: &[Coordinate]) -> Self {
        let vehicle = Vehicle {
            id: VEHICLE_ID,
            start,
            end,
        };

        let jobs = locations
            .iter()
            .enumerate()
            .map(|(id, &location)| Job { id, location })
            .collect();

        Self {
            vehicles: vec![vehicle],
            jobs,
        }
    }

    /// Serialize to compact JSON.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(Error::Serialize)
    }
}
