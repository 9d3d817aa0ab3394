pub mod ring;
pub mod timer;

use self::ring::RingBuffer;
use self::timer::{PhaseTimers, QueryPhase};

/// Number of queries kept in the rolling window.
const QUERY_HISTORY_LEN: usize = 300;
/// Log a summary line every this many queries.
const LOG_EVERY: u64 = 100;

/// Rolling latency and result-size numbers over recent queries.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct QuerySummary {
    pub samples: usize,
    pub latency_avg_us: f64,
    pub latency_min_us: f64,
    pub latency_max_us: f64,
    pub bins_avg: f64,
    pub bins_max: usize,
}

/// Query statistics for a heat overlay session.
pub struct QueryStats {
    /// Rolling window of query latencies (microseconds).
    latencies_us: RingBuffer<f64>,
    /// Rolling window of result sizes.
    bin_counts: RingBuffer<usize>,

    /// Per-phase timers (updated by the caller around each phase).
    pub timers: PhaseTimers,

    pub query_count: u64,
    pub replace_count: u64,
}

impl QueryStats {
    pub fn new() -> Self {
        Self {
            latencies_us: RingBuffer::new(QUERY_HISTORY_LEN),
            bin_counts: RingBuffer::new(QUERY_HISTORY_LEN),
            timers: PhaseTimers::new(),
            query_count: 0,
            replace_count: 0,
        }
    }

    pub fn record_replace(&mut self, elapsed_us: f64) {
        self.replace_count += 1;
        self.timers.record(QueryPhase::Replace, elapsed_us);
    }

    /// Record one query and periodically log.
    pub fn record_query(&mut self, elapsed_us: f64, bins: usize) {
        self.query_count += 1;
        self.latencies_us.push(elapsed_us);
        self.bin_counts.push(bins);
        self.timers.record(QueryPhase::Query, elapsed_us);

        if self.query_count % LOG_EVERY == 0 {
            let s = self.summary();
            log::info!(
                "Queries: {} | avg: {:.1}us | min: {:.1}us | max: {:.1}us | bins avg: {:.1} max: {}",
                self.query_count,
                s.latency_avg_us,
                s.latency_min_us,
                s.latency_max_us,
                s.bins_avg,
                s.bins_max,
            );
        }
    }

    /// Stats over the rolling window.
    pub fn summary(&self) -> QuerySummary {
        let n = self.latencies_us.len();
        if n == 0 {
            return QuerySummary::default();
        }
        let mut sum = 0.0;
        let mut min = f64::MAX;
        let mut max = 0.0f64;
        for &t in self.latencies_us.iter() {
            sum += t;
            min = min.min(t);
            max = max.max(t);
        }
        let bins_sum: usize = self.bin_counts.iter().sum();
        QuerySummary {
            samples: n,
            latency_avg_us: sum / n as f64,
            latency_min_us: min,
            latency_max_us: max,
            bins_avg: bins_sum as f64 / n as f64,
            bins_max: self.bin_counts.iter().copied().max().unwrap_or(0),
        }
    }

    /// One line per timed phase.
    pub fn log_phases(&self) {
        for phase in QueryPhase::ALL {
            let t = self.timers.get(phase);
            log::info!(
                "  {:<10} x{:<6} ema {:>10.1}us  max {:>10.1}us",
                phase.label(),
                t.count,
                t.ema_us,
                t.max_us
            );
        }
    }
}

impl Default for QueryStats {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_over_window() {
        let mut stats = QueryStats::new();
        assert_eq!(stats.summary(), QuerySummary::default());

        stats.record_query(10.0, 4);
        stats.record_query(30.0, 8);
        let s = stats.summary();
        assert_eq!(s.samples, 2);
        assert_eq!(s.latency_avg_us, 20.0);
        assert_eq!(s.latency_min_us, 10.0);
        assert_eq!(s.latency_max_us, 30.0);
        assert_eq!(s.bins_avg, 6.0);
        assert_eq!(s.bins_max, 8);
        assert_eq!(stats.query_count, 2);
        assert_eq!(stats.timers.get(QueryPhase::Query).count, 2);
    }

    #[test]
    fn replace_is_timed_separately() {
        let mut stats = QueryStats::new();
        stats.record_replace(500.0);
        assert_eq!(stats.replace_count, 1);
        assert_eq!(stats.timers.get(QueryPhase::Replace).last_us, 500.0);
        assert_eq!(stats.timers.get(QueryPhase::Query).count, 0);
        assert_eq!(stats.summary().samples, 0);
    }

    #[test]
    fn window_is_bounded() {
        let mut stats = QueryStats::new();
        for i in 0..(QUERY_HISTORY_LEN as u64 + 50) {
            stats.record_query(i as f64, 1);
        }
        assert_eq!(stats.summary().samples, QUERY_HISTORY_LEN);
        assert_eq!(stats.summary().latency_min_us, 50.0);
    }
}
