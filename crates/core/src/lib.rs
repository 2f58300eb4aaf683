pub mod api;
pub mod errors;
pub mod models;
pub mod services;

use api::traits::TradingApi;
use models::{
    filter::FilterCriteria,
    instance::Instance,
    metrics::PnlReport,
    operation::Operation,
    page::Page,
};
use services::{
    list_service::{contains_ignore_case, ListQuery},
    pnl_service::PnlService,
    query_cache::{QueryCache, QueryKey},
};
use tracing::debug;

use errors::CoreError;

/// Main entry point for the dashboard core library.
/// Holds the backend, the client-side query cache and the services working on it.
#[must_use]
pub struct TradingDashboard<A: TradingApi> {
    api: A,
    cache: QueryCache,
    pnl_service: PnlService,
}

impl<A: TradingApi> std::fmt::Debug for TradingDashboard<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TradingDashboard")
            .field("api", &self.api.name())
            .field("cached_operations", &self.cache.operations().map(<[_]>::len))
            .field("cached_instances", &self.cache.instances().map(<[_]>::len))
            .finish()
    }
}

impl<A: TradingApi> TradingDashboard<A> {
    pub fn new(api: A) -> Self {
        Self {
            api,
            cache: QueryCache::new(),
            pnl_service: PnlService::new(),
        }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn cache(&self) -> &QueryCache {
        &self.cache
    }

    // ── Read Queries ────────────────────────────────────────────────

    /// All operations of the user. Served from cache after the first fetch.
    pub async fn operations(&mut self) -> Result<&[Operation], CoreError> {
        if !self.cache.contains(QueryKey::Operations) {
            let fetched = self.api.fetch_operations().await?;
            debug!(count = fetched.len(), "fetched operations");
            self.cache.set_operations(fetched);
        }
        Ok(self.cache.operations().unwrap_or_default())
    }

    /// All strategy instances. Served from cache after the first fetch.
    pub async fn instances(&mut self) -> Result<&[Instance], CoreError> {
        if !self.cache.contains(QueryKey::Instances) {
            let fetched = self.api.fetch_instances().await?;
            debug!(count = fetched.len(), "fetched instances");
            self.cache.set_instances(fetched);
        }
        Ok(self.cache.instances().unwrap_or_default())
    }

    /// Drop every cached query; the next read refetches.
    pub fn refresh(&mut self) {
        self.cache.clear();
    }

    // ── P&L ─────────────────────────────────────────────────────────

    /// Per-symbol realized P&L, totals and chart bars for a filter selection.
    pub async fn pnl_report(&mut self, criteria: &FilterCriteria) -> Result<PnlReport, CoreError> {
        self.operations().await?;
        let operations = self.cache.operations().unwrap_or_default();
        Ok(self.pnl_service.build_report(operations, criteria))
    }

    /// Options of the symbol dropdown: distinct symbols seen in operations.
    pub async fn symbol_options(&mut self) -> Result<Vec<String>, CoreError> {
        self.operations().await?;
        let operations = self.cache.operations().unwrap_or_default();
        Ok(self.pnl_service.distinct_symbols(operations))
    }

    // ── Instances ───────────────────────────────────────────────────

    /// One page of instances, filtered and sorted by `query`.
    pub async fn instances_page(
        &mut self,
        query: &ListQuery<'_, Instance>,
    ) -> Result<Page<Instance>, CoreError> {
        let instances = self.instances().await?;
        Ok(query.apply(instances))
    }

    /// Instances whose name or symbol contains `search`, ordered by id.
    pub async fn search_instances(
        &mut self,
        search: &str,
        page: usize,
        page_size: usize,
    ) -> Result<Page<Instance>, CoreError> {
        let query = ListQuery::new(page_size)
            .filter(|i: &Instance| {
                contains_ignore_case(&i.name, search)
                    || i.symbol.as_deref().is_some_and(|s| contains_ignore_case(s, search))
            })
            .sort_by(|a, b| a.id.cmp(&b.id))
            .page(page);
        self.instances_page(&query).await
    }

    // ── Mutations ───────────────────────────────────────────────────
    //
    // On success the affected read queries are invalidated. On failure the
    // error is returned and the cache is left exactly as it was.

    pub async fn start_instance(&mut self, instance_id: i64) -> Result<(), CoreError> {
        self.api.start_instance(instance_id).await?;
        self.cache.invalidate(QueryKey::Instances);
        Ok(())
    }

    pub async fn stop_instance(&mut self, instance_id: i64) -> Result<(), CoreError> {
        self.api.stop_instance(instance_id).await?;
        self.cache.invalidate(QueryKey::Instances);
        Ok(())
    }

    /// Deleting an instance also drops its operations on the backend.
    pub async fn delete_instance(&mut self, instance_id: i64) -> Result<(), CoreError> {
        self.api.delete_instance(instance_id).await?;
        self.cache.invalidate(QueryKey::Instances);
        self.cache.invalidate(QueryKey::Operations);
        Ok(())
    }
}
