//! Main extraction logic for the constituency listing page.

mod table;

use std::any::Any;
use std::panic::{AssertUnwindSafe, catch_unwind};

pub use self::table::UnitTable;
use crate::consts;
use crate::error::{ErrorKind, Result};
use crate::models::RegionMap;
use scraper::{ElementRef, Html};
use tracing::instrument;

#[derive(Debug)]
pub struct Extractor {
    document: Html,
}
impl Extractor {
    pub fn from_document(document: Html) -> Self {
        Self { document }
    }

    /// Parses `html` leniently; broken markup is repaired by the HTML5
    /// parser rather than rejected.
    pub fn from_html(html: &str) -> Self {
        let document = Html::parse_document(html);
        Self::from_document(document)
    }

    /// Returns `true` if the document has at least one region heading.
    ///
    /// Extracting the regions performs the same check, so this is only
    /// useful when the regions themselves aren't needed.
    pub fn is_valid(&self) -> bool {
        !self.headings().is_empty()
    }

    /// Region heading elements, in document order.
    pub fn headings(&self) -> Vec<ElementRef<'_>> {
        self.document.select(&consts::HEADING_SELECTOR).collect()
    }

    /// Extracts the region → units mapping.
    ///
    /// # Errors
    ///
    /// - [`ErrorKind::NoHeadings`] if the document has no region headings,
    /// - [`ErrorKind::NoData`] if no heading produced any units,
    /// - [`ErrorKind::Unexpected`] if walking the document failed otherwise.
    #[instrument(skip(self), fields(headings, regions, units))]
    pub fn regions(&self) -> Result<RegionMap> {
        let headings = self.headings();
        if headings.is_empty() {
            exn::bail!(ErrorKind::NoHeadings);
        }
        tracing::Span::current().record("headings", headings.len());
        let collected = match catch_unwind(AssertUnwindSafe(|| Self::collect(&headings))) {
            Ok(collected) => collected,
            Err(payload) => exn::bail!(ErrorKind::Unexpected(panic_message(payload.as_ref()))),
        };
        let map: RegionMap = collected.into_iter().collect();
        if map.is_empty() {
            exn::bail!(ErrorKind::NoData);
        }
        tracing::Span::current().record("regions", map.len()).record("units", map.unit_count());
        Ok(map)
    }

    fn collect(headings: &[ElementRef<'_>]) -> Vec<(String, Vec<String>)> {
        headings
            .iter()
            .filter_map(|heading| {
                let region = table::normalize_text(heading);
                if region.is_empty() {
                    tracing::debug!("Skipping region heading without text");
                    return None;
                }
                let Some(table) = UnitTable::following(*heading) else {
                    tracing::debug!(%region, "Skipping region heading without a unit table");
                    return None;
                };
                let units = table.units();
                if units.is_empty() {
                    tracing::debug!(%region, "Skipping region without named units");
                    return None;
                }
                Some((region, units))
            })
            .collect()
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "panic while walking the document".to_string()
    }
}

/// Returns `true` if the HTML content looks like the constituency listing.
///
/// # Examples
///
/// ```rust
/// use civic_extract::is_valid;
/// let valid_html = r#"
///     <div class="view-content">
///         <h3>Eastern</h3>
///     </div>
/// "#;
///
/// assert!(is_valid(valid_html));
/// assert!(!is_valid("<h3>Eastern</h3>"));
/// ```
#[instrument(skip(html), fields(html_size = html.len()))]
pub fn is_valid(html: &str) -> bool {
    Extractor::from_html(html).is_valid()
}
