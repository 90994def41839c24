//! Query-string parsing for the `/route` endpoint.
//!
//! `loc` may repeat, so the query is taken as ordered key/value pairs rather
//! than a struct. Unknown keys are ignored.

use vroomapi_lib::{Error as LibError, RouteQuery};

use crate::config::parse_bool;

/// Repeated location parameter, one `"lon,lat"` per occurrence.
pub const PARAM_LOC: &str = "loc";
/// Vehicle start, required.
pub const PARAM_START: &str = "start";
/// Vehicle end, optional.
pub const PARAM_END: &str = "end";
/// Whether to request route geometry, defaults to `false`.
pub const PARAM_INCLUDE_GEOMETRY: &str = "includeGeometry";

/// Build a [`RouteQuery`] from decoded query pairs.
///
/// Location order is preserved. For the single-valued parameters the first
/// occurrence wins. Coordinates are not parsed here; that happens in
/// [`RouteQuery::validate`].
pub fn route_query_from_params(params: &[(String, String)]) -> Result<RouteQuery, LibError> {
    let first = |name: &str| {
        params
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.clone())
    };

    let locations = params
        .iter()
        .filter(|(key, _)| key == PARAM_LOC)
        .map(|(_, value)| value.clone())
        .collect();

    let start = first(PARAM_START).ok_or_else(|| LibError::MissingParameter {
        name: PARAM_START.to_string(),
    })?;

    let include_geometry = match first(PARAM_INCLUDE_GEOMETRY) {
        None => false,
        Some(raw) => parse_geometry_flag(&raw).ok_or(LibError::InvalidParameter {
            name: PARAM_INCLUDE_GEOMETRY.to_string(),
            value: raw,
        })?,
    };

    Ok(RouteQuery {
        locations,
        start,
        end: first(PARAM_END),
        include_geometry,
    })
}

fn parse_geometry_flag(raw: &str) -> Option<bool> {
    if raw.trim().is_empty() {
        return Some(false);
    }
    parse_bool(raw)
}
