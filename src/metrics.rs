//! In-process counters for `GET /metrics`.
//!
//! An explicit registry object passed by `Arc` into the request path —
//! no process-wide mutable globals. Counters are atomics; the per-level
//! breakdown sits behind a mutex since it is touched once per request.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use serde::Serialize;

use crate::models::RiskLevel;

#[derive(Debug, Default)]
pub struct MetricsRegistry {
    requests_total: AtomicU64,
    red_flag_hits_total: AtomicU64,
    lookup_retrievals_total: AtomicU64,
    model_tokens_est_total: AtomicU64,
    parse_failed_first_pass_total: AtomicU64,
    parse_repaired_total: AtomicU64,
    parse_failed_final_total: AtomicU64,
    by_risk_level: Mutex<BTreeMap<String, u64>>,
}

/// Point-in-time copy of all counters, JSON-serializable for `/metrics`.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct MetricsSnapshot {
    /// When the snapshot was taken (ISO 8601).
    pub generated_at: String,
    pub requests_total: u64,
    pub red_flag_hits_total: u64,
    pub by_risk_level: BTreeMap<String, u64>,
    pub lookup_retrievals_total: u64,
    pub model_tokens_est_total: u64,
    pub parse_failed_first_pass_total: u64,
    pub parse_repaired_total: u64,
    pub parse_failed_final_total: u64,
}

impl MetricsRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_request(
        &self,
        risk_level: Option<RiskLevel>,
        red_flag_hits: usize,
        model_tokens_est: usize,
    ) {
        self.requests_total.fetch_add(1, Ordering::Relaxed);
        self.red_flag_hits_total
            .fetch_add(red_flag_hits as u64, Ordering::Relaxed);
        self.model_tokens_est_total
            .fetch_add(model_tokens_est as u64, Ordering::Relaxed);
        if let Some(level) = risk_level {
            if let Ok(mut by_level) = self.by_risk_level.lock() {
                *by_level.entry(level.as_str().to_string()).or_insert(0) += 1;
            }
        }
    }

    pub fn record_lookup_retrieval(&self) {
        self.lookup_retrievals_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_parse_failed_first_pass(&self) {
        self.parse_failed_first_pass_total
            .fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_parse_repaired(&self) {
        self.parse_repaired_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_parse_failed_final(&self) {
        self.parse_failed_final_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            generated_at: chrono::Utc::now().to_rfc3339(),
            requests_total: self.requests_total.load(Ordering::Relaxed),
            red_flag_hits_total: self.red_flag_hits_total.load(Ordering::Relaxed),
            by_risk_level: self
                .by_risk_level
                .lock()
                .map(|m| m.clone())
                .unwrap_or_default(),
            lookup_retrievals_total: self.lookup_retrievals_total.load(Ordering::Relaxed),
            model_tokens_est_total: self.model_tokens_est_total.load(Ordering::Relaxed),
            parse_failed_first_pass_total: self
                .parse_failed_first_pass_total
                .load(Ordering::Relaxed),
            parse_repaired_total: self.parse_repaired_total.load(Ordering::Relaxed),
            parse_failed_final_total: self.parse_failed_final_total.load(Ordering::Relaxed),
        }
    }

    pub fn reset(&self) {
        self.requests_total.store(0, Ordering::Relaxed);
        self.red_flag_hits_total.store(0, Ordering::Relaxed);
        self.lookup_retrievals_total.store(0, Ordering::Relaxed);
        self.model_tokens_est_total.store(0, Ordering::Relaxed);
        self.parse_failed_first_pass_total.store(0, Ordering::Relaxed);
        self.parse_repaired_total.store(0, Ordering::Relaxed);
        self.parse_failed_final_total.store(0, Ordering::Relaxed);
        if let Ok(mut by_level) = self.by_risk_level.lock() {
            by_level.clear();
        }
    }
}
