// SPDX-License-Identifier: Apache-2.0

use axum::http::StatusCode;
use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::Mutex;

const METRIC_VERSION: &str = env!("CARGO_PKG_VERSION");
const LATENCY_BUCKETS_MS: [u64; 8] = [1, 5, 10, 25, 50, 100, 250, 1000];

#[derive(Default)]
struct RouteLatency {
    buckets: [u64; LATENCY_BUCKETS_MS.len()],
    sum_ns: u128,
    count: u64,
}

#[derive(Default)]
pub(crate) struct RequestMetrics {
    counts: Mutex<BTreeMap<(String, u16), u64>>,
    latency: Mutex<BTreeMap<String, RouteLatency>>,
    pub analyses_total: AtomicU64,
    pub redactions_total: AtomicU64,
    pub tokens_total: AtomicU64,
    pub entities_total: AtomicU64,
    pub pii_findings_total: AtomicU64,
    pub analysis_timeouts_total: AtomicU64,
    pub chat_upstream_failures_total: AtomicU64,
}

impl RequestMetrics {
    pub(crate) async fn observe_request(&self, route: &str, status: StatusCode, latency: Duration) {
        let mut counts = self.counts.lock().await;
        *counts
            .entry((route.to_string(), status.as_u16()))
            .or_insert(0) += 1;
        drop(counts);
        let mut latency_map = self.latency.lock().await;
        let entry = latency_map.entry(route.to_string()).or_default();
        let ms = latency.as_millis();
        for (slot, bound) in entry.buckets.iter_mut().zip(LATENCY_BUCKETS_MS) {
            if ms <= u128::from(bound) {
                *slot += 1;
            }
        }
        entry.sum_ns += latency.as_nanos();
        entry.count += 1;
    }

    pub(crate) fn record_analysis(&self, tokens: usize, entities: usize) {
        self.analyses_total.fetch_add(1, Ordering::Relaxed);
        self.tokens_total.fetch_add(tokens as u64, Ordering::Relaxed);
        self.entities_total
            .fetch_add(entities as u64, Ordering::Relaxed);
    }

    pub(crate) fn record_redaction(&self, findings: usize) {
        self.redactions_total.fetch_add(1, Ordering::Relaxed);
        self.pii_findings_total
            .fetch_add(findings as u64, Ordering::Relaxed);
    }

    /// Prometheus text exposition.
    pub(crate) async fn render(&self, ready: bool) -> String {
        let mut body = String::new();
        let _ = writeln!(
            body,
            "texto_build_info{{version=\"{METRIC_VERSION}\",variant=\"{}\"}} 1",
            texto_engine::MODEL_VARIANT
        );
        let _ = writeln!(body, "texto_ready {}", u8::from(ready));

        let counters = [
            ("texto_analyses_total", &self.analyses_total),
            ("texto_redactions_total", &self.redactions_total),
            ("texto_tokens_total", &self.tokens_total),
            ("texto_entities_total", &self.entities_total),
            ("texto_pii_findings_total", &self.pii_findings_total),
            ("texto_analysis_timeouts_total", &self.analysis_timeouts_total),
            (
                "texto_chat_upstream_failures_total",
                &self.chat_upstream_failures_total,
            ),
        ];
        for (name, value) in counters {
            let _ = writeln!(body, "{name} {}", value.load(Ordering::Relaxed));
        }

        let counts = self.counts.lock().await;
        for ((route, status), count) in counts.iter() {
            let _ = writeln!(
                body,
                "texto_http_requests_total{{route=\"{route}\",status=\"{status}\"}} {count}"
            );
        }
        drop(counts);

        let latency = self.latency.lock().await;
        for (route, l) in latency.iter() {
            for (bound, count) in LATENCY_BUCKETS_MS.iter().zip(l.buckets) {
                let le = *bound as f64 / 1000.0;
                let _ = writeln!(
                    body,
                    "texto_http_request_duration_seconds_bucket{{route=\"{route}\",le=\"{le}\"}} {count}"
                );
            }
            let _ = writeln!(
                body,
                "texto_http_request_duration_seconds_bucket{{route=\"{route}\",le=\"+Inf\"}} {}",
                l.count
            );
            let _ = writeln!(
                body,
                "texto_http_request_duration_seconds_sum{{route=\"{route}\"}} {:.6}",
                l.sum_ns as f64 / 1e9
            );
            let _ = writeln!(
                body,
                "texto_http_request_duration_seconds_count{{route=\"{route}\"}} {}",
                l.count
            );
        }
        body
    }
}
