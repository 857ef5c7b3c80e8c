//! Read-only projections over a [`RegionMap`].
//!
//! These are the lookups the HTTP API exposes. None of them touch the network
//! or the cache; callers hand in whichever snapshot they are serving.

pub mod error;

use civic_extract::models::RegionMap;

use self::error::{ErrorKind, Result, Subject};

/// Region names, sorted lexicographically.
pub fn regions(map: &RegionMap) -> Vec<&str> {
    let mut names: Vec<&str> = map.region_names().collect();
    names.sort_unstable();
    names
}

/// Every unit of every region, flattened and sorted lexicographically.
///
/// A unit listed under more than one region appears once per listing.
pub fn units(map: &RegionMap) -> Vec<&str> {
    let mut names: Vec<&str> = map.units().collect();
    names.sort_unstable();
    names
}

/// Units of `region` in document order. The region name must match exactly.
pub fn units_of<'a>(map: &'a RegionMap, region: &str) -> Result<&'a [String]> {
    if region.trim().is_empty() {
        exn::bail!(ErrorKind::InvalidInput(Subject::Region));
    }
    match map.get(region) {
        Some(units) => Ok(units),
        None => exn::bail!(ErrorKind::NotFound(Subject::Region)),
    }
}

/// The first region, in document order, that lists `unit`. Unit names are
/// compared case-insensitively.
pub fn region_of<'a>(map: &'a RegionMap, unit: &str) -> Result<&'a str> {
    if unit.trim().is_empty() {
        exn::bail!(ErrorKind::InvalidInput(Subject::Unit));
    }
    match map.region_of(unit) {
        Some(region) => Ok(region.name()),
        None => exn::bail!(ErrorKind::NotFound(Subject::Unit)),
    }
}
