mod region_map;
mod snapshot;

pub use self::region_map::{Region, RegionMap};
pub use self::snapshot::Snapshot;
