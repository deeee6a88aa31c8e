//! Request metrics for the risk scoring service.
//!
//! Counters live outside the scoring pipeline and never influence a score.

use crate::types::result::{RiskResult, RiskStatus};
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};
use tracing::info;

/// Processing-time samples kept for percentile estimates
const MAX_TIME_SAMPLES: usize = 10_000;

/// Metrics collector for scoring requests
pub struct ScoringMetrics {
    /// Requests that reached the classifier path
    pub requests_scored: AtomicU64,
    /// Requests answered with "Invalid Amount"
    pub invalid_amounts: AtomicU64,
    /// Requests rejected with an error response
    pub requests_rejected: AtomicU64,
    /// Scored requests flagged "High Risk"
    pub high_risk: AtomicU64,
    /// Processing times (in microseconds)
    processing_times: RwLock<Vec<u64>>,
    /// Fraud probability distribution buckets
    score_buckets: RwLock<[u64; 10]>,
    /// Start time for rate calculation
    start_time: Instant,
}

impl ScoringMetrics {
    pub fn new() -> Self {
        Self {
            requests_scored: AtomicU64::new(0),
            invalid_amounts: AtomicU64::new(0),
            requests_rejected: AtomicU64::new(0),
            high_risk: AtomicU64::new(0),
            processing_times: RwLock::new(Vec::with_capacity(1000)),
            score_buckets: RwLock::new([0; 10]),
            start_time: Instant::now(),
        }
    }

    /// Record a successful response
    pub fn record_result(&self, result: &RiskResult, processing_time: Duration) {
        match result.status {
            RiskStatus::InvalidAmount => {
                self.invalid_amounts.fetch_add(1, Ordering::Relaxed);
            }
            status => {
                self.requests_scored.fetch_add(1, Ordering::Relaxed);
                if status == RiskStatus::HighRisk {
                    self.high_risk.fetch_add(1, Ordering::Relaxed);
                }

                let bucket = (result.fraud_probability * 10.0).clamp(0.0, 9.0) as usize;
                if let Ok(mut buckets) = self.score_buckets.write() {
                    buckets[bucket] += 1;
                }
            }
        }

        self.record_time(processing_time);
    }

    /// Record an error response
    pub fn record_rejection(&self, processing_time: Duration) {
        self.requests_rejected.fetch_add(1, Ordering::Relaxed);
        self.record_time(processing_time);
    }

    fn record_time(&self, processing_time: Duration) {
        if let Ok(mut times) = self.processing_times.write() {
            times.push(processing_time.as_micros() as u64);
            if times.len() > MAX_TIME_SAMPLES {
                times.drain(0..MAX_TIME_SAMPLES / 2);
            }
        }
    }

    pub fn total_requests(&self) -> u64 {
        self.requests_scored.load(Ordering::Relaxed)
            + self.invalid_amounts.load(Ordering::Relaxed)
            + self.requests_rejected.load(Ordering::Relaxed)
    }

    /// Get processing time statistics
    pub fn get_processing_stats(&self) -> ProcessingStats {
        let sorted = match self.processing_times.read() {
            Ok(times) if !times.is_empty() => {
                let mut sorted = times.clone();
                sorted.sort_unstable();
                sorted
            }
            _ => return ProcessingStats::default(),
        };

        let count = sorted.len();
        let sum: u64 = sorted.iter().sum();
        let percentile = |p: f64| sorted[((count as f64 * p) as usize).min(count - 1)];

        ProcessingStats {
            count: count as u64,
            mean_us: sum / count as u64,
            p50_us: percentile(0.50),
            p95_us: percentile(0.95),
            p99_us: percentile(0.99),
            max_us: sorted[count - 1],
        }
    }

    /// Get current throughput (requests per second)
    pub fn get_throughput(&self) -> f64 {
        let elapsed = self.start_time.elapsed().as_secs_f64();
        if elapsed > 0.0 {
            self.total_requests() as f64 / elapsed
        } else {
            0.0
        }
    }

    /// Get score distribution
    pub fn get_score_distribution(&self) -> [u64; 10] {
        self.score_buckets.read().map(|b| *b).unwrap_or([0; 10])
    }

    /// Point-in-time view served on `/metrics`
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            requests_scored: self.requests_scored.load(Ordering::Relaxed),
            invalid_amounts: self.invalid_amounts.load(Ordering::Relaxed),
            requests_rejected: self.requests_rejected.load(Ordering::Relaxed),
            high_risk: self.high_risk.load(Ordering::Relaxed),
            throughput_per_sec: self.get_throughput(),
            uptime_secs: self.start_time.elapsed().as_secs(),
            processing: self.get_processing_stats(),
            score_distribution: self.get_score_distribution(),
        }
    }

    /// Log summary statistics
    pub fn print_summary(&self) {
        let snapshot = self.snapshot();
        let high_risk_rate = if snapshot.requests_scored > 0 {
            (snapshot.high_risk as f64 / snapshot.requests_scored as f64) * 100.0
        } else {
            0.0
        };

        info!(
            scored = snapshot.requests_scored,
            invalid_amounts = snapshot.invalid_amounts,
            rejected = snapshot.requests_rejected,
            high_risk = snapshot.high_risk,
            high_risk_rate = format!("{:.1}%", high_risk_rate),
            throughput = format!("{:.1} req/s", snapshot.throughput_per_sec),
            "Scoring summary"
        );
        info!(
            mean_us = snapshot.processing.mean_us,
            p50_us = snapshot.processing.p50_us,
            p95_us = snapshot.processing.p95_us,
            p99_us = snapshot.processing.p99_us,
            max_us = snapshot.processing.max_us,
            "Processing time"
        );

        let total: u64 = snapshot.score_distribution.iter().sum();
        for (i, &count) in snapshot.score_distribution.iter().enumerate() {
            if count == 0 {
                continue;
            }
            let pct = (count as f64 / total as f64) * 100.0;
            info!(
                "  p {:.1}-{:.1}: {:>6} ({:>5.1}%) {}",
                i as f64 / 10.0,
                (i + 1) as f64 / 10.0,
                count,
                pct,
                "█".repeat(((pct / 5.0) as usize).min(20))
            );
        }
    }
}

impl Default for ScoringMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Processing time statistics
#[derive(Debug, Default, Clone, Serialize)]
pub struct ProcessingStats {
    pub count: u64,
    pub mean_us: u64,
    pub p50_us: u64,
    pub p95_us: u64,
    pub p99_us: u64,
    pub max_us: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct MetricsSnapshot {
    pub requests_scored: u64,
    pub invalid_amounts: u64,
    pub requests_rejected: u64,
    pub high_risk: u64,
    pub throughput_per_sec: f64,
    pub uptime_secs: u64,
    pub processing: ProcessingStats,
    pub score_distribution: [u64; 10],
}

/// Periodically logs a metrics summary
pub struct MetricsReporter {
    metrics: Arc<ScoringMetrics>,
    interval_secs: u64,
}

impl MetricsReporter {
    pub fn new(metrics: Arc<ScoringMetrics>, interval_secs: u64) -> Self {
        Self {
            metrics,
            interval_secs,
        }
    }

    /// Start the periodic reporting task
    pub async fn start(self) {
        let mut interval = tokio::time::interval(Duration::from_secs(self.interval_secs.max(1)));
        // First tick completes immediately
        interval.tick().await;
        loop {
            interval.tick().await;
            self.metrics.print_summary();
        }
    }
}
