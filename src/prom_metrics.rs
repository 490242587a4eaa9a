//! # Prometheus Metrics
//!
//! Exposes service metrics in the OpenMetrics text format for scraping.
//!
//! | Metric | Type | Labels | Description |
//! |--------|------|--------|-------------|
//! | `jornal_jobs_generated_total` | Counter | `crop` | Jobs produced by the generator |
//! | `jornal_contracts_created_total` | Counter | — | Contracts created through the API |
//! | `jornal_jobs_listed` | Gauge | — | Jobs currently on the board |
//! | `jornal_http_request_duration_seconds` | Histogram | `method`, `path` | Request latency |
//!
//! The `/metrics` endpoint renders the current registry state on each scrape.

use prometheus_client::encoding::text::encode;
use prometheus_client::metrics::counter::Counter;
use prometheus_client::metrics::family::Family;
use prometheus_client::metrics::gauge::Gauge;
use prometheus_client::metrics::histogram::{exponential_buckets, Histogram};
use prometheus_client::registry::Registry;

use crate::simulator::{CropType, JobSample};

#[derive(Clone, Debug, Hash, PartialEq, Eq, prometheus_client::encoding::EncodeLabelSet)]
pub struct CropLabel {
    pub crop: String,
}

/// Label set for HTTP request metrics. `path` is normalized so ids do not
/// create one series per resource.
#[derive(Clone, Debug, Hash, PartialEq, Eq, prometheus_client::encoding::EncodeLabelSet)]
pub struct HttpLabel {
    pub method: String,
    pub path: String,
}

fn request_histogram() -> Histogram {
    // 1 ms .. ~16 s
    Histogram::new(exponential_buckets(0.001, 2.0, 15))
}

/// Thread-safe metrics registry. All fields are atomic handles shared with
/// the registry.
pub struct Metrics {
    pub registry: Registry,
    pub jobs_generated: Family<CropLabel, Counter>,
    pub contracts_created: Counter,
    pub jobs_listed: Gauge,
    pub http_request_duration: Family<HttpLabel, Histogram, fn() -> Histogram>,
}

impl Metrics {
    pub fn new() -> Self {
        let mut registry = Registry::default();

        let jobs_generated = Family::<CropLabel, Counter>::default();
        registry.register(
            "jornal_jobs_generated",
            "Jobs produced by the generator, by crop",
            jobs_generated.clone(),
        );

        let contracts_created = Counter::default();
        registry.register(
            "jornal_contracts_created",
            "Contracts created through the API",
            contracts_created.clone(),
        );

        let jobs_listed = Gauge::default();
        registry.register(
            "jornal_jobs_listed",
            "Jobs currently on the board",
            jobs_listed.clone(),
        );

        let http_request_duration =
            Family::<HttpLabel, Histogram, fn() -> Histogram>::new_with_constructor(
                request_histogram,
            );
        registry.register(
            "jornal_http_request_duration_seconds",
            "HTTP request latency in seconds",
            http_request_duration.clone(),
        );

        Self {
            registry,
            jobs_generated,
            contracts_created,
            jobs_listed,
            http_request_duration,
        }
    }

    /// Count a generated batch per crop.
    pub fn record_generated(&self, samples: &[JobSample]) {
        for crop in CropType::ALL {
            let n = samples.iter().filter(|s| s.crop_type == crop).count() as u64;
            if n > 0 {
                self.jobs_generated
                    .get_or_create(&CropLabel {
                        crop: crop.as_str().to_string(),
                    })
                    .inc_by(n);
            }
        }
    }

    /// Render all metrics in OpenMetrics text format. Encoding into a
    /// `String` only fails on a broken label encoder; that yields an empty
    /// body.
    pub fn encode(&self) -> String {
        let mut buf = String::new();
        if let Err(e) = encode(&mut buf, &self.registry) {
            tracing::error!(error = %e, "failed to encode metrics");
            buf.clear();
        }
        buf
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}
