use anyhow::{Context, Result};
use prosroster::fetch::PageFetcher;
use prosroster::model::Party;
use prosroster::roster::RosterCache;
use prosroster::strategy::{
    MA_INDEX_URL, US_LISTING_URL, discover_ma_district_pages,
    parse_federal_listing, parse_ma_district_page, parse_texas_directory,
};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Serves canned fixture bodies and counts every fetch. URLs with no entry
/// behave like a network fault (fetch returns None).
struct FixtureFetcher {
    pages: BTreeMap<String, String>,
    calls: AtomicUsize,
}

impl FixtureFetcher {
    fn new(pages: Vec<(&str, &str)>) -> Result<Self> {
        let mut map = BTreeMap::new();
        for (url, fixture_name) in pages {
            map.insert(url.to_string(), fixture(fixture_name)?);
        }
        Ok(Self {
            pages: map,
            calls: AtomicUsize::new(0),
        })
    }

    fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl PageFetcher for FixtureFetcher {
    fn fetch(&self, url: &str) -> Option<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.pages.get(url).cloned()
    }
}

fn fixture(name: &str) -> Result<String> {
    let path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name);
    fs::read_to_string(&path).with_context(|| format!("failed to read fixture {}", path.display()))
}

#[test]
fn unknown_jurisdiction_yields_empty_roster_without_fetching() -> Result<()> {
    let fetcher = Arc::new(FixtureFetcher::new(vec![])?);
    let cache = RosterCache::with_builtin_strategies(fetcher.clone());

    let roster = cache.get_roster("zz");

    assert!(roster.is_empty());
    assert_eq!(fetcher.call_count(), 0);
    Ok(())
}

#[test]
fn rosters_are_memoized_after_first_resolution() -> Result<()> {
    let fetcher = Arc::new(FixtureFetcher::new(vec![(
        US_LISTING_URL,
        "us_listing.html",
    )])?);
    let cache = RosterCache::with_builtin_strategies(fetcher.clone());

    let first = cache.get_roster("us");
    assert_eq!(fetcher.call_count(), 1);

    let second = cache.get_roster("US");
    assert_eq!(fetcher.call_count(), 1);
    assert_eq!(
        first.keys().collect::<Vec<_>>(),
        second.keys().collect::<Vec<_>>()
    );
    Ok(())
}

#[test]
fn federal_listing_keeps_two_cell_rows_and_strips_annotations() -> Result<()> {
    let roster = parse_federal_listing(&fixture("us_listing.html")?);

    assert_eq!(roster.len(), 3);
    let northern = &roster["Northern District"];
    assert_eq!(northern.len(), 1);
    assert_eq!(northern[0].name, "Jane Doe");
    assert_eq!(northern[0].to_string(), "US - Northern District: Jane Doe");
    assert_eq!(roster["Eastern District"][0].name, "Alex Quinn");
    assert!(!roster.contains_key("Only one cell here"));
    Ok(())
}

#[test]
fn ma_discovery_derives_district_names_from_office_urls() -> Result<()> {
    let pages = discover_ma_district_pages(&fixture("ma_index.html")?);

    assert_eq!(
        pages.keys().collect::<Vec<_>>(),
        vec!["Cape And Islands", "Norfolk", "Suffolk"]
    );
    assert_eq!(
        pages["Norfolk"],
        "http://www.mass.gov/mdaa/district-attorneys/offices/norfolk-da.html"
    );
    Ok(())
}

#[test]
fn ma_detail_page_requires_exactly_one_bare_heading() -> Result<()> {
    let name = parse_ma_district_page(&fixture("ma_norfolk.html")?);
    assert_eq!(name.as_deref(), Some("John Smith"));

    let ambiguous = parse_ma_district_page(&fixture("ma_ambiguous.html")?);
    assert_eq!(ambiguous, None);
    Ok(())
}

#[test]
fn ma_resolve_skips_failed_and_ambiguous_pages() -> Result<()> {
    // Suffolk's page is absent, simulating a network fault; Cape and
    // Islands parses ambiguously. Only Norfolk should survive.
    let fetcher = Arc::new(FixtureFetcher::new(vec![
        (MA_INDEX_URL, "ma_index.html"),
        (
            "http://www.mass.gov/mdaa/district-attorneys/offices/norfolk-da.html",
            "ma_norfolk.html",
        ),
        (
            "http://www.mass.gov/mdaa/district-attorneys/offices/cape-and-islands-da.html",
            "ma_ambiguous.html",
        ),
    ])?);
    let cache = RosterCache::with_builtin_strategies(fetcher);

    let roster = cache.get_roster("ma");

    assert_eq!(roster.keys().collect::<Vec<_>>(), vec!["Norfolk"]);
    assert_eq!(roster["Norfolk"][0].name, "John Smith");
    assert_eq!(roster["Norfolk"][0].jurisdiction, "MA");
    Ok(())
}

#[test]
fn texas_directory_infers_party_from_democrat_marker() -> Result<()> {
    let roster = parse_texas_directory(&fixture("tx_directory.html")?);

    assert_eq!(roster.len(), 2);
    let harris = &roster["Harris"][0];
    assert_eq!(harris.name, "Jane Roe");
    assert_eq!(harris.party, Some(Party::Democratic));

    let travis = &roster["Travis"][0];
    assert_eq!(travis.name, "Sam Poe");
    assert_eq!(travis.party, Some(Party::Republican));
    Ok(())
}

#[test]
fn network_fault_leaves_roster_empty_rather_than_failing() -> Result<()> {
    // No page registered for the federal listing URL at all.
    let fetcher = Arc::new(FixtureFetcher::new(vec![])?);
    let cache = RosterCache::with_builtin_strategies(fetcher.clone());

    let roster = cache.get_roster("us");

    assert!(roster.is_empty());
    assert_eq!(fetcher.call_count(), 1);
    Ok(())
}

/// Fetcher that stalls long enough for competing threads to pile up on the
/// same unresolved jurisdiction.
struct SlowFetcher {
    body: String,
    calls: AtomicUsize,
}

impl PageFetcher for SlowFetcher {
    fn fetch(&self, _url: &str) -> Option<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        std::thread::sleep(Duration::from_millis(50));
        Some(self.body.clone())
    }
}

#[test]
fn concurrent_first_requests_resolve_once() -> Result<()> {
    let fetcher = Arc::new(SlowFetcher {
        body: fixture("us_listing.html")?,
        calls: AtomicUsize::new(0),
    });
    let cache = RosterCache::with_builtin_strategies(fetcher.clone());

    std::thread::scope(|scope| {
        for _ in 0..4 {
            scope.spawn(|| {
                let roster = cache.get_roster("us");
                assert_eq!(roster.len(), 3);
            });
        }
    });

    assert_eq!(fetcher.calls.load(Ordering::SeqCst), 1);
    Ok(())
}
