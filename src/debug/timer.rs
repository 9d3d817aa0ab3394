use instant::Instant;

/// Which stage of an overlay session is being timed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum QueryPhase {
    Replace = 0,
    Query = 1,
    Normalize = 2,
}

impl QueryPhase {
    pub const ALL: [QueryPhase; 3] = [Self::Replace, Self::Query, Self::Normalize];

    pub fn label(self) -> &'static str {
        match self {
            Self::Replace => "Replace",
            Self::Query => "Query",
            Self::Normalize => "Normalize",
        }
    }
}

/// Smoothing factor for the moving average.
const EMA_ALPHA: f64 = 0.1;

/// Timing history for one phase, in microseconds.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PhaseStat {
    pub count: u64,
    pub last_us: f64,
    pub max_us: f64,
    /// Moving average; the first sample seeds it.
    pub ema_us: f64,
}

impl PhaseStat {
    fn push(&mut self, us: f64) {
        self.ema_us = if self.count == 0 {
            us
        } else {
            self.ema_us + (us - self.ema_us) * EMA_ALPHA
        };
        self.count += 1;
        self.last_us = us;
        self.max_us = self.max_us.max(us);
    }
}

/// Per-phase wall-clock timings.
#[derive(Debug, Default)]
pub struct PhaseTimers {
    phases: [PhaseStat; 3],
}

impl PhaseTimers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `f`, charging its wall time to `phase`.
    pub fn time<R>(&mut self, phase: QueryPhase, f: impl FnOnce() -> R) -> R {
        let start = Instant::now();
        let out = f();
        self.record(phase, start.elapsed().as_secs_f64() * 1_000_000.0);
        out
    }

    /// Record a duration measured elsewhere.
    pub fn record(&mut self, phase: QueryPhase, elapsed_us: f64) {
        self.phases[phase as usize].push(elapsed_us);
    }

    pub fn get(&self, phase: QueryPhase) -> &PhaseStat {
        &self.phases[phase as usize]
    }

    /// Sum of the smoothed phase durations.
    pub fn total_us(&self) -> f64 {
        self.phases.iter().map(|p| p.ema_us).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_sample_seeds_average() {
        let mut t = PhaseTimers::new();
        t.record(QueryPhase::Query, 100.0);
        assert_eq!(t.get(QueryPhase::Query).ema_us, 100.0);
        t.record(QueryPhase::Query, 200.0);
        let q = t.get(QueryPhase::Query);
        assert!((q.ema_us - 110.0).abs() < 1e-9);
        assert_eq!(q.count, 2);
        assert_eq!(q.last_us, 200.0);
        assert_eq!(q.max_us, 200.0);
        assert_eq!(*t.get(QueryPhase::Replace), PhaseStat::default());
        assert!((t.total_us() - 110.0).abs() < 1e-9);
    }

    #[test]
    fn time_returns_closure_result() {
        let mut t = PhaseTimers::new();
        let v = t.time(QueryPhase::Normalize, || 6 * 7);
        assert_eq!(v, 42);
        let n = t.get(QueryPhase::Normalize);
        assert_eq!(n.count, 1);
        assert!(n.last_us >= 0.0);
    }

    #[test]
    fn labels_cover_all_phases() {
        for (i, phase) in QueryPhase::ALL.iter().enumerate() {
            assert_eq!(*phase as usize, i);
            assert!(!phase.label().is_empty());
        }
    }
}
