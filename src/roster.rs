use crate::fetch::PageFetcher;
use crate::model::SubDistrictMap;
use crate::strategy::{JurisdictionStrategy, builtin_strategies};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, OnceLock};
use tracing::{debug, info};

/// Session-scoped memoizer over the registered jurisdiction strategies.
///
/// Each jurisdiction's fetch-and-parse pipeline runs at most once per cache
/// lifetime; there is no TTL and no invalidation. Construction is cheap and
/// performs no network activity.
pub struct RosterCache {
    strategies: BTreeMap<&'static str, Box<dyn JurisdictionStrategy>>,
    fetcher: Arc<dyn PageFetcher + Send + Sync>,
    entries: Mutex<BTreeMap<String, Arc<OnceLock<Arc<SubDistrictMap>>>>>,
}

impl RosterCache {
    pub fn new(
        fetcher: Arc<dyn PageFetcher + Send + Sync>,
        strategies: Vec<Box<dyn JurisdictionStrategy>>,
    ) -> Self {
        let strategies = strategies
            .into_iter()
            .map(|strategy| (strategy.code(), strategy))
            .collect();
        Self {
            strategies,
            fetcher,
            entries: Mutex::new(BTreeMap::new()),
        }
    }

    pub fn with_builtin_strategies(fetcher: Arc<dyn PageFetcher + Send + Sync>) -> Self {
        Self::new(fetcher, builtin_strategies())
    }

    /// Roster for a jurisdiction code, resolving on first request and
    /// serving the memoized result afterwards. Codes are matched
    /// case-insensitively; an unregistered code yields an empty map
    /// without touching the network. Never fails: missing sources only
    /// thin out the result.
    pub fn get_roster(&self, code: &str) -> Arc<SubDistrictMap> {
        let code = code.to_ascii_uppercase();
        let Some(strategy) = self.strategies.get(code.as_str()) else {
            debug!(%code, "no strategy registered; returning empty roster");
            return Arc::new(SubDistrictMap::new());
        };

        let slot = {
            let mut entries = self.entries.lock().expect("roster cache lock poisoned");
            entries.entry(code.clone()).or_default().clone()
        };

        // The slot lock coalesces concurrent first requests: one caller
        // runs the strategy, the rest block until the value lands.
        slot.get_or_init(|| {
            info!(%code, "resolving roster");
            let roster = strategy.resolve(self.fetcher.as_ref());
            info!(%code, districts = roster.len(), "roster resolved");
            Arc::new(roster)
        })
        .clone()
    }
}
