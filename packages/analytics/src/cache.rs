//! Caller-owned memoization of built dashboards.

use std::collections::HashMap;
use std::sync::Arc;

use road_safety_analytics_models::Dashboard;
use road_safety_records::{DatasetVersion, RecordSet, normalize_uf};

use crate::dashboard;

/// Dashboards keyed by UF selection, valid for one dataset version.
///
/// Asking for a dashboard of a record set with a different version drops
/// every cached entry first, so a reload never serves stale tables.
#[derive(Debug, Default)]
pub struct DashboardCache {
    version: Option<DatasetVersion>,
    entries: HashMap<Option<String>, Arc<Dashboard>>,
    parallel: bool,
}

impl DashboardCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A cache that builds missing dashboards with
    /// [`dashboard::build_parallel`].
    #[must_use]
    pub fn parallel() -> Self {
        Self {
            parallel: true,
            ..Self::default()
        }
    }

    /// Returns the dashboard for `uf` over `records`, building it on a miss.
    pub fn get_or_build(&mut self, records: &RecordSet, uf: Option<&str>) -> Arc<Dashboard> {
        if self.version.as_ref() != Some(records.version()) {
            if !self.entries.is_empty() {
                log::info!(
                    "Dataset version changed to {}; dropping {} cached dashboards",
                    records.version(),
                    self.entries.len()
                );
            }
            self.entries.clear();
            self.version = Some(records.version().clone());
        }

        let key = uf.map(normalize_uf);
        if let Some(hit) = self.entries.get(&key) {
            log::debug!("Dashboard cache hit for {key:?}");
            return Arc::clone(hit);
        }

        let view = records.filter_uf(key.as_deref());
        let built = Arc::new(if self.parallel {
            dashboard::build_parallel(&view)
        } else {
            dashboard::build(&view)
        });
        self.entries.insert(key, Arc::clone(&built));
        built
    }

    /// Number of cached dashboards.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.version = None;
    }
}
