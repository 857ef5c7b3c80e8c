mod consts;
pub mod error;
mod extract;
pub mod models;

use exn::ResultExt;
use time::UtcDateTime;
use tracing::instrument;

use crate::error::{ErrorKind, Result};
pub use crate::extract::{Extractor, UnitTable, is_valid};
use crate::models::{RegionMap, Snapshot};

/// Extracts the region → units mapping from a raw HTML document.
///
/// See [`Extractor::regions`] for the failure conditions.
#[instrument(skip(html), fields(html_size = html.len()))]
pub fn extract(html: &str) -> Result<RegionMap> {
    Extractor::from_html(html).regions()
}

/// Easy, top-level entrypoint for the extraction of a [`Snapshot`] from raw
/// HTML: the region map plus a fingerprint of the document it came from.
#[instrument(skip(html), fields(html_size = html.len()))]
pub fn snapshot(html: &str) -> Result<Snapshot> {
    Ok(Snapshot {
        hash: blake3::hash(html.as_bytes()).to_string(),
        length: u64::try_from(html.len()).or_raise(|| ErrorKind::Unexpected("document length".to_string()))?,
        regions: extract(html)?,
        extracted_at: UtcDateTime::now(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const HTML: &str = r#"<div class="view-content"><h3>Eastern</h3><table><tr><td><a>Chipata</a></td></tr></table></div>"#;

    #[test]
    fn test_snapshot_fingerprints_document() {
        let first = snapshot(HTML).unwrap();
        let second = snapshot(HTML).unwrap();
        assert_eq!(first.length, HTML.len() as u64);
        assert_eq!(first.hash, blake3::hash(HTML.as_bytes()).to_string());
        assert!(first.same_source(&second));
        assert_eq!(first.regions, second.regions);
    }

    #[test]
    fn test_snapshot_differs_when_document_changes() {
        let changed = HTML.replace("Chipata", "Chipata Central");
        let first = snapshot(HTML).unwrap();
        let second = snapshot(&changed).unwrap();
        assert!(!first.same_source(&second));
    }

    #[test]
    fn test_snapshot_propagates_extraction_failure() {
        let err = snapshot("<p>gone</p>").unwrap_err();
        assert_eq!(*err, ErrorKind::NoHeadings);
    }
}
