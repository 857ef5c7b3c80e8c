use std::fmt::{Display, Formatter, Result as FmtResult};

/// One region (province) and the units (constituencies) listed under it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Region {
    name: String,
    units: Vec<String>,
}
impl Region {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Units in document order. Never empty.
    pub fn units(&self) -> &[String] {
        &self.units
    }

    /// Case-insensitive membership test, used for reverse lookups.
    pub fn contains_unit(&self, unit: &str) -> bool {
        let needle = unit.to_lowercase();
        self.units.iter().any(|u| u.to_lowercase() == needle)
    }
}
impl Display for Region {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{} ({} units)", self.name, self.units.len())
    }
}

/// Ordered, immutable mapping of region names to their unit names.
///
/// Regions keep the order they were inserted in (document order when built
/// by the extractor), and so do units within a region. There is no mutable
/// API: once built, a map is a snapshot that can be shared between readers.
///
/// Construction goes through [`FromIterator`], which enforces the invariants:
/// - region names are non-empty and unique (a repeated name replaces the
///   earlier units but keeps the earlier position),
/// - empty unit names are dropped,
/// - regions left without units are dropped.
///
/// ```rust
/// use civic_extract::models::RegionMap;
///
/// let map: RegionMap = [("Eastern", vec!["Chipata", "Petauke"]), ("Western", vec!["Mongu"])]
///     .into_iter()
///     .collect();
/// assert_eq!(map.len(), 2);
/// assert_eq!(map.get("Western"), Some(&["Mongu".to_string()][..]));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct RegionMap {
    regions: Vec<Region>,
}
impl RegionMap {
    /// Number of regions.
    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    /// Total number of units across every region (duplicates included).
    pub fn unit_count(&self) -> usize {
        self.regions.iter().map(|r| r.units.len()).sum()
    }

    /// Exact-match lookup of a region's units.
    pub fn get(&self, region: &str) -> Option<&[String]> {
        self.regions.iter().find(|r| r.name == region).map(Region::units)
    }

    pub fn contains_region(&self, region: &str) -> bool {
        self.get(region).is_some()
    }

    /// Finds the first region (in insertion order) listing `unit`, compared
    /// case-insensitively.
    pub fn region_of(&self, unit: &str) -> Option<&Region> {
        self.regions.iter().find(|r| r.contains_unit(unit))
    }

    pub fn regions(&self) -> impl Iterator<Item = &Region> {
        self.regions.iter()
    }

    pub fn region_names(&self) -> impl Iterator<Item = &str> {
        self.regions.iter().map(Region::name)
    }

    /// Every unit of every region, in insertion order.
    pub fn units(&self) -> impl Iterator<Item = &str> {
        self.regions.iter().flat_map(|r| r.units.iter().map(String::as_str))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.regions.iter().map(|r| (r.name(), r.units()))
    }
}

impl<N, I, U> FromIterator<(N, I)> for RegionMap
where
    N: Into<String>,
    I: IntoIterator<Item = U>,
    U: Into<String>,
{
    fn from_iter<T: IntoIterator<Item = (N, I)>>(iter: T) -> Self {
        let mut regions: Vec<Region> = Vec::new();
        for (name, units) in iter {
            let name = name.into();
            let units: Vec<String> = units.into_iter().map(Into::into).filter(|u| !u.is_empty()).collect();
            if name.is_empty() || units.is_empty() {
                continue;
            }
            match regions.iter_mut().find(|r| r.name == name) {
                Some(existing) => existing.units = units,
                None => regions.push(Region { name, units }),
            }
        }
        Self { regions }
    }
}

impl<'a> IntoIterator for &'a RegionMap {
    type Item = &'a Region;
    type IntoIter = std::slice::Iter<'a, Region>;
    fn into_iter(self) -> Self::IntoIter {
        self.regions.iter()
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for RegionMap {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.iter())
    }
}
