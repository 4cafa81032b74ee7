use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use bytes::Bytes;
use dashmap::DashMap;
use prioritas_shared::alias;
use tracing::{debug, warn};

use crate::config::{upstream_connect_timeout, upstream_http_timeout};
use crate::dataset::RegionDataset;
use crate::render::render_map;

#[derive(Clone)]
pub struct AppState {
    /// Loaded once at startup; read-only afterwards.
    pub dataset: Arc<RegionDataset>,
    /// Field code -> pre-serialized `MapFigure`. Only retained codes are cached.
    pub figure_cache: Arc<DashMap<String, Arc<Bytes>>>,
    pub observability: Arc<ObservabilityCounters>,
}

#[derive(Debug, Default)]
pub struct ObservabilityCounters {
    map_requests_total: AtomicU64,
    map_cache_hits_total: AtomicU64,
    map_not_modified_total: AtomicU64,
    table_requests_total: AtomicU64,
    unknown_field_requests_total: AtomicU64,
}

#[derive(Debug, Clone, Copy)]
pub struct ObservabilitySnapshot {
    pub map_requests_total: u64,
    pub map_cache_hits_total: u64,
    pub map_not_modified_total: u64,
    pub table_requests_total: u64,
    pub unknown_field_requests_total: u64,
}

impl ObservabilityCounters {
    pub fn snapshot(&self) -> ObservabilitySnapshot {
        ObservabilitySnapshot {
            map_requests_total: self.map_requests_total.load(Ordering::Relaxed),
            map_cache_hits_total: self.map_cache_hits_total.load(Ordering::Relaxed),
            map_not_modified_total: self.map_not_modified_total.load(Ordering::Relaxed),
            table_requests_total: self.table_requests_total.load(Ordering::Relaxed),
            unknown_field_requests_total: self
                .unknown_field_requests_total
                .load(Ordering::Relaxed),
        }
    }

    pub fn record_map_request(&self) {
        self.map_requests_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_map_cache_hit(&self) {
        self.map_cache_hits_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_map_not_modified(&self) {
        self.map_not_modified_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_table_request(&self) {
        self.table_requests_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_unknown_field_request(&self) {
        self.unknown_field_requests_total
            .fetch_add(1, Ordering::Relaxed);
    }
}

impl AppState {
    pub fn new(dataset: RegionDataset) -> Self {
        Self {
            dataset: Arc::new(dataset),
            figure_cache: Arc::new(DashMap::new()),
            observability: Arc::new(ObservabilityCounters::default()),
        }
    }

    /// Serialized figure for `field`, memoized for fields the dataset actually carries.
    pub fn figure_json(&self, field: &str) -> Result<Arc<Bytes>, serde_json::Error> {
        if let Some(cached) = self.figure_cache.get(field) {
            self.observability.record_map_cache_hit();
            return Ok(Arc::clone(cached.value()));
        }

        let figure = render_map(&self.dataset, field);
        let json = Arc::new(Bytes::from(serde_json::to_vec(&figure)?));

        if self.dataset.indicator_index(field).is_some() {
            self.figure_cache
                .insert(field.to_string(), Arc::clone(&json));
        } else {
            self.observability.record_unknown_field_request();
            debug!(field, registered = alias::is_known(field), "served uncached figure");
        }
        Ok(json)
    }
}

/// Client for the one-time upstream fetch.
pub fn build_http_client() -> Result<reqwest::Client, reqwest::Error> {
    let request_timeout = upstream_http_timeout();
    let connect_timeout = upstream_connect_timeout();
    reqwest::Client::builder()
        .user_agent("prioritas-map/0.1")
        .timeout(request_timeout)
        .connect_timeout(connect_timeout)
        .build()
        .or_else(|e| {
            warn!(
                error = %e,
                "failed to build configured HTTP client, retrying without custom user-agent"
            );
            reqwest::Client::builder()
                .timeout(request_timeout)
                .connect_timeout(connect_timeout)
                .build()
        })
}
