use crate::consts;
use scraper::ElementRef;

/// The table of units listed directly after a region heading.
#[derive(Debug, Clone, Copy)]
pub struct UnitTable<'a> {
    element: ElementRef<'a>,
}

impl<'a> UnitTable<'a> {
    /// Finds the first `table` sibling after `heading`, however many other
    /// siblings (headings included) come in between.
    pub(crate) fn following(heading: ElementRef<'a>) -> Option<Self> {
        heading
            .next_siblings()
            .filter_map(ElementRef::wrap)
            .find(|sibling| sibling.value().name() == consts::TABLE_TAG)
            .map(|element| Self { element })
    }

    /// Text of every link in the table, in document order, skipping links
    /// that are empty once whitespace is stripped.
    pub fn units(&self) -> Vec<String> {
        self.element
            .select(&consts::ANCHOR_SELECTOR)
            .map(|anchor| normalize_text(&anchor))
            .filter(|text| !text.is_empty())
            .collect()
    }
}

/// Collects the text content of an element, trimmed of surrounding
/// whitespace. Interior whitespace is kept as written.
pub(crate) fn normalize_text(element: &ElementRef) -> String {
    element.text().collect::<String>().trim().to_string()
}
