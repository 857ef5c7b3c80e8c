use super::RegionMap;
use time::UtcDateTime;

/// A [`RegionMap`] together with where it came from and when.
///
/// The hash and length describe the raw document the map was extracted from,
/// which makes it cheap to tell whether the upstream page actually changed
/// between two refreshes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    /// BLAKE3 hash of the source document
    pub hash: String,
    /// Source document length in bytes
    pub length: u64,
    pub regions: RegionMap,
    pub extracted_at: UtcDateTime,
}
impl AsRef<RegionMap> for Snapshot {
    fn as_ref(&self) -> &RegionMap {
        &self.regions
    }
}
impl Snapshot {
    /// Returns `true` if both snapshots were extracted from byte-identical documents.
    pub fn same_source(&self, other: &Snapshot) -> bool {
        self.length == other.length && self.hash == other.hash
    }
}
