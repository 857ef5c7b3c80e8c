use scraper::Selector;
use std::sync::LazyLock;

macro_rules! selector {
    ($name:ident, $css:expr) => {
        pub(crate) static $name: LazyLock<Selector> = LazyLock::new(|| Selector::parse($css).unwrap());
    };
}

// Province headings are the direct `h3` children of the main listing block.
selector!(HEADING_SELECTOR, "div.view-content > h3");
selector!(ANCHOR_SELECTOR, "a");

pub(crate) const TABLE_TAG: &str = "table";
