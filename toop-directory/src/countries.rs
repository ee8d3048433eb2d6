//! Country and participant reference data.

use std::sync::Arc;
use std::time::Duration;

use toop_cache::{ListFetcher, RefreshCoalescingCache, RefreshOutcome};
use toop_core::{CountryCode, DocumentType, QueryType};

/// Refresh-coalescing view over the directory's country/participant list.
///
/// Queries that need current data (`country_codes`, `by_participant_id`,
/// `participants_for`, ...) refresh first when the snapshot is stale.
/// [`CountryDirectory::lookup`] reads the snapshot as is.
#[derive(Debug)]
pub struct CountryDirectory {
    cache: RefreshCoalescingCache<CountryCode>,
}

impl CountryDirectory {
    pub fn new(fetcher: Arc<dyn ListFetcher<CountryCode>>, ttl: Duration) -> Self {
        Self {
            cache: RefreshCoalescingCache::new("country-codes", fetcher, ttl),
        }
    }

    pub async fn refresh(&self, force: bool) -> RefreshOutcome {
        self.cache.maybe_refresh(force).await
    }

    pub async fn country_codes(&self) -> Vec<CountryCode> {
        self.cache.get().await
    }

    /// First record for a country code, without refreshing.
    pub fn lookup(&self, country: &str) -> Option<CountryCode> {
        self.cache.lookup_by_key(&country.to_ascii_uppercase())
    }

    /// Record registered under a participant id (case-insensitive).
    pub async fn by_participant_id(&self, id: &str) -> Option<CountryCode> {
        self.cache.maybe_refresh(false).await;
        self.cache
            .snapshot()
            .records()
            .iter()
            .find(|c| c.id.eq_ignore_ascii_case(id))
            .cloned()
    }

    /// Participants in `country` that accept `doc_type`, in directory order.
    pub async fn participants_for(&self, country: &str, doc_type: &DocumentType) -> Vec<CountryCode> {
        self.cache.maybe_refresh(false).await;
        self.cache
            .snapshot()
            .records()
            .iter()
            .filter(|c| c.is_country(country) && c.supports(doc_type))
            .cloned()
            .collect()
    }

    /// One record per country able to answer `query_type`; the first
    /// participant seen for a country wins.
    pub async fn country_codes_for(&self, query_type: QueryType) -> Vec<CountryCode> {
        self.cache.maybe_refresh(false).await;
        let doc_type = query_type.request_document_type();
        let mut result: Vec<CountryCode> = Vec::new();
        for code in self.cache.snapshot().records() {
            if code.supports(&doc_type) && !result.iter().any(|c| c.is_country(&code.code)) {
                result.push(code.clone());
            }
        }
        result
    }

    /// Distinct document types accepted by any participant in `country`.
    pub async fn document_types(&self, country: &str) -> Vec<DocumentType> {
        self.cache.maybe_refresh(false).await;
        let mut result: Vec<DocumentType> = Vec::new();
        for code in self.cache.snapshot().records() {
            if !code.is_country(country) {
                continue;
            }
            for doc_type in &code.doc_types {
                if !result.contains(doc_type) {
                    result.push(doc_type.clone());
                }
            }
        }
        result
    }

    /// True once a non-empty snapshot has been loaded.
    pub fn is_ready(&self) -> bool {
        !self.cache.snapshot().is_empty()
    }

    pub fn cache(&self) -> &RefreshCoalescingCache<CountryCode> {
        &self.cache
    }
}
