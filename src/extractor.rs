//! Menu extraction from a rendered document
//!
//! The extractor recovers a `category -> items` structure from a flat,
//! order-dependent walk of the rendered DOM. Menu sites render section
//! headings and item cards as structural siblings, so there is no
//! parent-child link between a category and "its" items; the only
//! generalizable recovery mechanism is a single document-order pass with a
//! "most recently seen heading" cursor.

use crate::{MenuRecord, ScrapeError, SelectorConfig, UNAVAILABLE, UNCATEGORIZED};
use scraper::{ElementRef, Html, Selector};

/// Headings longer than this are assumed to be captured card bodies or
/// boilerplate, not section names.
const MAX_HEADING_CHARS: usize = 100;

/// Extracts ordered menu records from a rendered document.
///
/// Pure function of the parsed DOM snapshot: no I/O, deterministic, and
/// total over malformed-but-present markup. Selector patterns are compiled
/// once at construction.
///
/// # Examples
///
/// ```rust
/// use menu_scraper::{MenuExtractor, SelectorConfig};
/// use scraper::Html;
///
/// let extractor = MenuExtractor::new(&SelectorConfig::default()).unwrap();
/// let document = Html::parse_document(
///     r#"<h2>Drinks</h2>
///        <div data-testid="card"><h3>Latte</h3></div>"#,
/// );
/// let records = extractor.extract(&document);
/// assert_eq!(records[0].category, "Drinks");
/// assert_eq!(records[0].item, "Latte");
/// ```
pub struct MenuExtractor {
    card: Selector,
    item_name: Vec<Selector>,
    price: Selector,
    description: Selector,
}

impl MenuExtractor {
    pub fn new(config: &SelectorConfig) -> Result<Self, ScrapeError> {
        Ok(Self {
            card: parse_selector(&config.card)?,
            item_name: config
                .item_name
                .iter()
                .map(|pattern| parse_selector(pattern))
                .collect::<Result<Vec<_>, _>>()?,
            price: parse_selector(&config.price)?,
            description: parse_selector(&config.description)?,
        })
    }

    /// Runs one linear pass over all elements in document order and returns
    /// the emitted records, order preserved.
    ///
    /// The category cursor lives for exactly one call: it is seeded with
    /// [`UNCATEGORIZED`], overwritten by every qualifying heading, and read
    /// by every card encountered until the next heading.
    pub fn extract(&self, document: &Html) -> Vec<MenuRecord> {
        let mut records = Vec::new();
        let mut current_category = UNCATEGORIZED.to_string();

        for element in document
            .root_element()
            .descendants()
            .filter_map(ElementRef::wrap)
        {
            if self.is_section_heading(&element) {
                let heading = trimmed_text(&element);
                if !heading.is_empty() && heading.chars().count() < MAX_HEADING_CHARS {
                    current_category = heading;
                }
            }

            if self.is_top_level_card(&element) {
                if let Some(record) = self.extract_card(&element, &current_category) {
                    records.push(record);
                }
            }
        }

        // extract_card already refuses empty names; this enforces the
        // emitted-record invariant regardless.
        records.retain(|record| !record.item.is_empty());
        records
    }

    /// A qualifying heading is an `h2` or `h3` outside any card. The exact
    /// two-level rule matches the reference site's markup; page titles
    /// (`h1`) and in-card names (`h3`/`h4`) never move the cursor.
    fn is_section_heading(&self, element: &ElementRef) -> bool {
        matches!(element.value().name(), "h2" | "h3") && !self.is_inside_card(element)
    }

    /// A card qualifies only when no enclosing ancestor is itself a card,
    /// so nested matches are never emitted twice.
    fn is_top_level_card(&self, element: &ElementRef) -> bool {
        self.card.matches(element) && !self.is_inside_card(element)
    }

    fn is_inside_card(&self, element: &ElementRef) -> bool {
        element
            .ancestors()
            .filter_map(ElementRef::wrap)
            .any(|ancestor| self.card.matches(&ancestor))
    }

    /// Pulls the three sub-fields out of one card subtree. The name shapes
    /// are tried in priority order and the first matching element wins;
    /// missing price or description sub-elements yield empty strings, never
    /// errors. Returns `None` when the card has no usable name.
    fn extract_card(&self, card: &ElementRef, category: &str) -> Option<MenuRecord> {
        let name = self
            .item_name
            .iter()
            .find_map(|selector| card.select(selector).next())
            .map(|element| trimmed_text(&element))
            .unwrap_or_default();

        if name.is_empty() {
            return None;
        }

        let price = card
            .select(&self.price)
            .next()
            .map(|element| trimmed_text(&element))
            .unwrap_or_default();

        let description = card
            .select(&self.description)
            .next()
            .map(|element| trimmed_text(&element))
            .unwrap_or_default();

        let comment = if card.text().collect::<String>().contains(UNAVAILABLE) {
            UNAVAILABLE.to_string()
        } else {
            String::new()
        };

        Some(MenuRecord {
            category: category.to_string(),
            item: name,
            description,
            price,
            comment,
        })
    }
}

fn parse_selector(pattern: &str) -> Result<Selector, ScrapeError> {
    Selector::parse(pattern).map_err(|e| ScrapeError::InvalidSelector(format!("{pattern}: {e}")))
}

fn trimmed_text(element: &ElementRef) -> String {
    element.text().collect::<String>().trim().to_string()
}
