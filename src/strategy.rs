use crate::fetch::PageFetcher;
use crate::model::{Party, Prosecutor, SubDistrictMap};
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::collections::BTreeMap;
use tracing::{debug, info};
use url::Url;

pub const US_LISTING_URL: &str = "https://www.justice.gov/usao/us-attorneys-listing";

pub const MA_INDEX_URL: &str = "http://www.mass.gov/mdaa/district-attorneys/by-city-or-town.html";
const MA_OFFICE_PATH_MARKER: &str = "district-attorneys/offices";
const MA_TITLE_PREFIX: &str = "District Attorney ";
const MA_SLUG_SUFFIX: &str = "-da";

pub const TX_DIRECTORY_URL: &str = "https://www.txdirectory.com/online/da/";
const TX_HONORIFIC: &str = "The Honorable ";
const TX_DEMOCRAT_MARKER: &str = "(D)";

/// One fetch-and-parse procedure per supported jurisdiction. Each knows its
/// own source pages and markup shape; all of them degrade by omission, so
/// `resolve` always succeeds even when every fetch misses.
pub trait JurisdictionStrategy: Send + Sync {
    fn code(&self) -> &'static str;
    fn resolve(&self, fetcher: &dyn PageFetcher) -> SubDistrictMap;
}

pub fn builtin_strategies() -> Vec<Box<dyn JurisdictionStrategy>> {
    vec![
        Box::new(FederalStrategy),
        Box::new(MassachusettsStrategy),
        Box::new(TexasStrategy),
    ]
}

/// Federal US Attorneys: one listing page, plain two-column table of
/// district and appointee.
pub struct FederalStrategy;

impl JurisdictionStrategy for FederalStrategy {
    fn code(&self) -> &'static str {
        "US"
    }

    fn resolve(&self, fetcher: &dyn PageFetcher) -> SubDistrictMap {
        let Some(body) = fetcher.fetch(US_LISTING_URL) else {
            return SubDistrictMap::new();
        };
        let roster = parse_federal_listing(&body);
        info!(districts = roster.len(), "parsed federal attorney listing");
        roster
    }
}

pub fn parse_federal_listing(html: &str) -> SubDistrictMap {
    let doc = Html::parse_document(html);
    let row_selector = Selector::parse("tr").expect("row selector must be valid");
    let cell_selector = Selector::parse("td").expect("cell selector must be valid");
    // Acting/interim appointees carry a trailing " *" annotation.
    let annotation = Regex::new(r"\s\*$").expect("annotation regex must be valid");

    let mut roster = SubDistrictMap::new();
    for row in doc.select(&row_selector) {
        let cells: Vec<ElementRef<'_>> = row.select(&cell_selector).collect();
        // Header, footer and malformed rows never have exactly two cells.
        if cells.len() != 2 {
            continue;
        }

        let district = element_text(cells[0]);
        let name = annotation.replace(&element_text(cells[1]), "").trim().to_string();
        if district.is_empty() || name.is_empty() {
            continue;
        }

        roster
            .entry(district.clone())
            .or_default()
            .push(Prosecutor::new("US", &district, &name));
    }

    roster
}

/// Massachusetts: an index page links every district office; each office
/// page names its District Attorney in a bare h2.
pub struct MassachusettsStrategy;

impl JurisdictionStrategy for MassachusettsStrategy {
    fn code(&self) -> &'static str {
        "MA"
    }

    fn resolve(&self, fetcher: &dyn PageFetcher) -> SubDistrictMap {
        let Some(index) = fetcher.fetch(MA_INDEX_URL) else {
            return SubDistrictMap::new();
        };

        let pages = discover_ma_district_pages(&index);
        info!(districts = pages.len(), "discovered district office pages");

        let mut roster = SubDistrictMap::new();
        for (district, url) in pages {
            let Some(body) = fetcher.fetch(&url) else {
                continue;
            };
            match parse_ma_district_page(&body) {
                Some(name) => {
                    roster
                        .entry(district.clone())
                        .or_default()
                        .push(Prosecutor::new("MA", &district, &name));
                }
                None => {
                    debug!(%district, %url, "no unambiguous attorney heading; skipping");
                }
            }
        }

        roster
    }
}

/// Map of district name to office page URL, from the MA index page. Only
/// `a.titlelink` anchors that resolve under the offices path qualify; the
/// district name is recovered from the URL slug.
pub fn discover_ma_district_pages(html: &str) -> BTreeMap<String, String> {
    let doc = Html::parse_document(html);
    let link_selector = Selector::parse("a.titlelink").expect("link selector must be valid");
    let base = Url::parse(MA_INDEX_URL).expect("index url must be valid");

    let mut pages = BTreeMap::new();
    for link in doc.select(&link_selector) {
        let Some(href) = link.value().attr("href") else {
            continue;
        };
        let Ok(url) = base.join(href) else {
            continue;
        };
        if !url.as_str().contains(MA_OFFICE_PATH_MARKER) {
            continue;
        }
        if let Some(district) = district_from_office_url(&url) {
            pages.insert(district, url.to_string());
        }
    }

    pages
}

// e.g. .../district-attorneys/offices/norfolk-da.html -> "Norfolk"
fn district_from_office_url(url: &Url) -> Option<String> {
    let segment = url.path_segments()?.filter(|s| !s.is_empty()).next_back()?;
    let slug = segment.strip_suffix(".html").unwrap_or(segment);
    let slug = slug.strip_suffix(MA_SLUG_SUFFIX).unwrap_or(slug);
    let name = title_case(&slug.replace('-', " "));
    (!name.is_empty()).then_some(name)
}

/// The attorney's name from one office page, when exactly one qualifying
/// heading is present. Qualifying means an `h2` with no class (the office
/// template styles every other heading). Zero or several matches is an
/// ambiguous page and yields `None`.
pub fn parse_ma_district_page(html: &str) -> Option<String> {
    let doc = Html::parse_document(html);
    let heading_selector = Selector::parse("h2").expect("heading selector must be valid");

    let mut headings = doc.select(&heading_selector).filter(|el| {
        el.value()
            .attr("class")
            .is_none_or(|class| class.trim().is_empty())
    });

    let first = headings.next()?;
    if headings.next().is_some() {
        return None;
    }

    let text = element_text(first);
    let name = text.strip_prefix(MA_TITLE_PREFIX).unwrap_or(&text).trim();
    (!name.is_empty()).then(|| name.to_string())
}

/// Texas: one directory page, wide table. The third column holds the
/// honorific-prefixed name with a parenthesized party-and-term suffix.
pub struct TexasStrategy;

impl JurisdictionStrategy for TexasStrategy {
    fn code(&self) -> &'static str {
        "TX"
    }

    fn resolve(&self, fetcher: &dyn PageFetcher) -> SubDistrictMap {
        let Some(body) = fetcher.fetch(TX_DIRECTORY_URL) else {
            return SubDistrictMap::new();
        };
        let roster = parse_texas_directory(&body);
        info!(districts = roster.len(), "parsed texas directory");
        roster
    }
}

pub fn parse_texas_directory(html: &str) -> SubDistrictMap {
    let doc = Html::parse_document(html);
    let row_selector = Selector::parse("tr").expect("row selector must be valid");
    let cell_selector = Selector::parse("td").expect("cell selector must be valid");

    let mut roster = SubDistrictMap::new();
    for row in doc.select(&row_selector) {
        let cells: Vec<ElementRef<'_>> = row.select(&cell_selector).collect();
        if cells.len() <= 2 {
            continue;
        }

        let district = element_text(cells[0]);
        let raw = element_text(cells[2]);
        let name = raw.replace(TX_HONORIFIC, "");
        let name = name.split(" (").next().unwrap_or(&name).trim();
        if district.is_empty() || name.is_empty() {
            continue;
        }

        // The directory only flags Democrats; everyone else is listed
        // unmarked and defaults to Republican.
        let party = if raw.contains(TX_DEMOCRAT_MARKER) {
            Party::Democratic
        } else {
            Party::Republican
        };

        let mut prosecutor = Prosecutor::new("TX", &district, name);
        prosecutor.party = Some(party);
        roster.entry(district.clone()).or_default().push(prosecutor);
    }

    roster
}

fn element_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .collect::<Vec<_>>()
        .join(" ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn title_case(value: &str) -> String {
    value
        .split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.flat_map(char::to_lowercase))
                    .collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}
