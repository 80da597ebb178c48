//! Request Counters and Prometheus Export

use std::sync::atomic::{AtomicU64, Ordering};

use dispatcher::ClassificationResult;
use fallback::FallbackReason;
use metrics::counter;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use serde::Serialize;

/// Install the global Prometheus recorder; call at most once per process
pub fn install_recorder() -> anyhow::Result<PrometheusHandle> {
    Ok(PrometheusBuilder::new().install_recorder()?)
}

/// Snapshot of request counts by outcome
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RequestCounts {
    pub model: u64,
    pub fallback: u64,
    pub rejected: u64,
}

/// Lock-free request counters shared by all handlers
#[derive(Debug, Default)]
pub struct RequestStats {
    model: AtomicU64,
    fallback: AtomicU64,
    rejected: AtomicU64,
}

impl RequestStats {
    /// Count a classification by the path that produced it
    pub fn record(&self, result: &ClassificationResult) {
        let path = match result.fallback {
            None => {
                self.model.fetch_add(1, Ordering::Relaxed);
                "model"
            }
            Some(FallbackReason::NoModel) => {
                self.fallback.fetch_add(1, Ordering::Relaxed);
                "fallback_no_model"
            }
            Some(FallbackReason::ModelError) => {
                self.fallback.fetch_add(1, Ordering::Relaxed);
                "fallback_model_error"
            }
        };

        counter!("plant_predictions_total", "path" => path).increment(1);
        counter!("plant_predictions_by_label_total", "label" => result.label.message())
            .increment(1);
    }

    /// Count a request rejected before classification
    pub fn record_rejected(&self) {
        self.rejected.fetch_add(1, Ordering::Relaxed);
        counter!("plant_requests_rejected_total").increment(1);
    }

    pub fn snapshot(&self) -> RequestCounts {
        RequestCounts {
            model: self.model.load(Ordering::Relaxed),
            fallback: self.fallback.load(Ordering::Relaxed),
            rejected: self.rejected.load(Ordering::Relaxed),
        }
    }
}
