//! In-process statistics for the scoring service.

use crate::types::assessment::Verdict;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};
use tracing::info;

/// Counters and latency samples for handled requests
pub struct ScoringMetrics {
    /// Requests that produced an assessment
    pub assessments: AtomicU64,
    /// Assessments labelled fraudulent
    pub fraudulent: AtomicU64,
    /// Requests that ended in an error, by error kind
    failures: RwLock<HashMap<String, u64>>,
    /// Processing times (in microseconds)
    processing_times: RwLock<Vec<u64>>,
    /// Probability distribution buckets
    score_buckets: RwLock<[u64; 10]>,
    start_time: Instant,
}

impl ScoringMetrics {
    pub fn new() -> Self {
        Self {
            assessments: AtomicU64::new(0),
            fraudulent: AtomicU64::new(0),
            failures: RwLock::new(HashMap::new()),
            processing_times: RwLock::new(Vec::with_capacity(1000)),
            score_buckets: RwLock::new([0; 10]),
            start_time: Instant::now(),
        }
    }

    /// Record a completed assessment
    pub fn record_assessment(&self, processing_time: Duration, probability: f64, verdict: Verdict) {
        self.assessments.fetch_add(1, Ordering::Relaxed);
        if verdict == Verdict::Fraudulent {
            self.fraudulent.fetch_add(1, Ordering::Relaxed);
        }

        self.record_latency(processing_time);

        let bucket = ((probability * 10.0) as usize).min(9);
        if let Ok(mut buckets) = self.score_buckets.write() {
            buckets[bucket] += 1;
        }
    }

    /// Record a request that produced no assessment
    pub fn record_failure(&self, kind: &str, processing_time: Duration) {
        if let Ok(mut failures) = self.failures.write() {
            *failures.entry(kind.to_string()).or_insert(0) += 1;
        }
        self.record_latency(processing_time);
    }

    fn record_latency(&self, processing_time: Duration) {
        if let Ok(mut times) = self.processing_times.write() {
            times.push(processing_time.as_micros() as u64);
            // Keep only the most recent samples
            if times.len() > 10000 {
                times.drain(0..5000);
            }
        }
    }

    pub fn failures(&self) -> HashMap<String, u64> {
        self.failures
            .read()
            .map(|f| f.clone())
            .unwrap_or_default()
    }

    pub fn failure_count(&self) -> u64 {
        self.failures().values().sum()
    }

    /// Get processing time statistics
    pub fn get_processing_stats(&self) -> ProcessingStats {
        let mut sorted = match self.processing_times.read() {
            Ok(times) if !times.is_empty() => times.clone(),
            _ => return ProcessingStats::default(),
        };
        sorted.sort_unstable();

        let count = sorted.len();
        let sum: u64 = sorted.iter().sum();
        let percentile = |p: f64| sorted[((count as f64 * p) as usize).min(count - 1)];

        ProcessingStats {
            count: count as u64,
            mean_us: sum / count as u64,
            p50_us: sorted[count / 2],
            p95_us: percentile(0.95),
            p99_us: percentile(0.99),
            max_us: sorted[count - 1],
        }
    }

    /// Requests per second since startup
    pub fn get_throughput(&self) -> f64 {
        let elapsed = self.start_time.elapsed().as_secs_f64();
        let handled = self.assessments.load(Ordering::Relaxed) + self.failure_count();
        if elapsed > 0.0 {
            handled as f64 / elapsed
        } else {
            0.0
        }
    }

    pub fn get_score_distribution(&self) -> [u64; 10] {
        self.score_buckets.read().map(|b| *b).unwrap_or([0; 10])
    }

    /// Log summary statistics
    pub fn print_summary(&self) {
        let assessed = self.assessments.load(Ordering::Relaxed);
        let fraudulent = self.fraudulent.load(Ordering::Relaxed);
        let fraud_rate = if assessed > 0 {
            (fraudulent as f64 / assessed as f64) * 100.0
        } else {
            0.0
        };
        let processing = self.get_processing_stats();

        info!(
            assessed,
            fraudulent,
            fraud_rate = format!("{:.1}%", fraud_rate),
            failed = self.failure_count(),
            throughput = format!("{:.1} req/s", self.get_throughput()),
            mean_us = processing.mean_us,
            p50_us = processing.p50_us,
            p95_us = processing.p95_us,
            p99_us = processing.p99_us,
            "Scoring summary"
        );

        for (kind, count) in self.failures() {
            info!(kind = %kind, count, "Failures by kind");
        }

        let distribution = self.get_score_distribution();
        let total: u64 = distribution.iter().sum();
        for (i, &count) in distribution.iter().enumerate() {
            if count == 0 {
                continue;
            }
            let pct = (count as f64 / total as f64) * 100.0;
            info!(
                "  {:.1}-{:.1}: {:>6} ({:>5.1}%) {}",
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
#[derive(Debug, Default)]
pub struct ProcessingStats {
    pub count: u64,
    pub mean_us: u64,
    pub p50_us: u64,
    pub p95_us: u64,
    pub p99_us: u64,
    pub max_us: u64,
}

/// Periodic summary logger
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_recording() {
        let metrics = ScoringMetrics::new();

        metrics.record_assessment(Duration::from_micros(100), 0.2, Verdict::Legitimate);
        metrics.record_assessment(Duration::from_micros(200), 0.8, Verdict::Fraudulent);
        metrics.record_assessment(Duration::from_micros(300), 1.0, Verdict::Fraudulent);
        metrics.record_failure("shape_mismatch", Duration::from_micros(50));

        assert_eq!(metrics.assessments.load(Ordering::Relaxed), 3);
        assert_eq!(metrics.fraudulent.load(Ordering::Relaxed), 2);
        assert_eq!(metrics.failures().get("shape_mismatch"), Some(&1));
        assert_eq!(metrics.failure_count(), 1);

        let distribution = metrics.get_score_distribution();
        assert_eq!(distribution[2], 1);
        assert_eq!(distribution[8], 1);
        assert_eq!(distribution[9], 1);
    }

    #[test]
    fn test_processing_stats() {
        let metrics = ScoringMetrics::new();
        assert_eq!(metrics.get_processing_stats().count, 0);

        for us in [100, 200, 300, 400] {
            metrics.record_assessment(Duration::from_micros(us), 0.1, Verdict::Legitimate);
        }

        let stats = metrics.get_processing_stats();
        assert_eq!(stats.count, 4);
        assert_eq!(stats.mean_us, 250);
        assert_eq!(stats.p50_us, 300);
        assert_eq!(stats.max_us, 400);
        assert_eq!(stats.p99_us, 400);
    }
}
