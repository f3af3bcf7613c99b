// Prometheus Metrics for the Asset Registry
// Tracks: requests per route, asset lifecycle, missed lookups, store size

use once_cell::sync::Lazy;
use prometheus::{
    register_histogram_with_registry, register_int_counter_vec_with_registry,
    register_int_counter_with_registry, register_int_gauge_with_registry, Encoder, Histogram,
    HistogramOpts, IntCounter, IntCounterVec, IntGauge, Opts, Registry, TextEncoder,
};
use std::sync::Arc;

pub struct Metrics {
    pub registry: Registry,

    // Request metrics
    pub http_requests_total: IntCounterVec,
    pub http_request_duration_seconds: Histogram,

    // Asset lifecycle
    pub assets_created_total: IntCounter,
    pub assets_updated_total: IntCounter,
    pub assets_deleted_total: IntCounter,
    pub asset_lookups_missed_total: IntCounter,
    pub assets_stored: IntGauge,
}

impl Metrics {
    pub fn new() -> anyhow::Result<Self> {
        let registry = Registry::new();

        let http_requests_total = register_int_counter_vec_with_registry!(
            Opts::new("asset_registry_http_requests_total", "Total HTTP requests by route"),
            &["route"],
            registry
        )?;

        let http_request_duration_seconds = register_histogram_with_registry!(
            HistogramOpts::new(
                "asset_registry_http_request_duration_seconds",
                "HTTP request duration in seconds"
            )
            .buckets(vec![0.0001, 0.0005, 0.001, 0.005, 0.01, 0.05, 0.1, 0.5]),
            registry
        )?;

        let assets_created_total = register_int_counter_with_registry!(
            Opts::new("asset_registry_assets_created_total", "Assets created"),
            registry
        )?;

        let assets_updated_total = register_int_counter_with_registry!(
            Opts::new("asset_registry_assets_updated_total", "Assets updated"),
            registry
        )?;

        let assets_deleted_total = register_int_counter_with_registry!(
            Opts::new("asset_registry_assets_deleted_total", "Assets deleted"),
            registry
        )?;

        let asset_lookups_missed_total = register_int_counter_with_registry!(
            Opts::new(
                "asset_registry_asset_lookups_missed_total",
                "Id lookups that matched no asset"
            ),
            registry
        )?;

        let assets_stored = register_int_gauge_with_registry!(
            Opts::new("asset_registry_assets_stored", "Assets currently held in memory"),
            registry
        )?;

        Ok(Self {
            registry,
            http_requests_total,
            http_request_duration_seconds,
            assets_created_total,
            assets_updated_total,
            assets_deleted_total,
            asset_lookups_missed_total,
            assets_stored,
        })
    }

    /// Export all metrics in Prometheus text format
    pub fn export(&self) -> anyhow::Result<String> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }

    /// Count a request against its route template
    pub fn track_request(&self, route: &str) {
        self.http_requests_total.with_label_values(&[route]).inc();
    }
}

// Global metrics instance
pub static METRICS: Lazy<Arc<Metrics>> =
    Lazy::new(|| Arc::new(Metrics::new().expect("Failed to initialize metrics")));

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_export_contains_registered_metrics() {
        let metrics = Metrics::new().unwrap();
        metrics.track_request("GET /assets");
        metrics.assets_created_total.inc();

        let text = metrics.export().unwrap();
        assert!(text.contains("asset_registry_http_requests_total{route=\"GET /assets\"} 1"));
        assert!(text.contains("asset_registry_assets_created_total 1"));
    }
}
