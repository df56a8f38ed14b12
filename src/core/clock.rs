use std::time::Instant;

/// Wall-clock reference for a display session. Elapsed time is only defined
/// once `start` has run.
#[derive(Debug, Default, Clone, Copy)]
pub struct TimeSource {
    started_at: Option<Instant>,
}

impl TimeSource {
    pub const fn new() -> Self {
        Self { started_at: None }
    }

    #[allow(dead_code)]
    #[inline(always)]
    pub fn start(&mut self) {
        self.start_at(Instant::now());
    }

    #[inline(always)]
    pub fn start_at(&mut self, at: Instant) {
        self.started_at = Some(at);
    }

    #[allow(dead_code)]
    #[inline(always)]
    pub const fn is_started(&self) -> bool {
        self.started_at.is_some()
    }

    /// Seconds since `start`, or `None` before it.
    #[allow(dead_code)]
    #[inline(always)]
    pub fn elapsed(&self) -> Option<f32> {
        self.elapsed_at(Instant::now())
    }

    pub fn elapsed_at(&self, now: Instant) -> Option<f32> {
        self.started_at
            .map(|t| now.saturating_duration_since(t).as_secs_f32())
    }
}

#[cfg(test)]
mod tests {
    use super::TimeSource;
    use std::time::{Duration, Instant};

    #[test]
    fn elapsed_is_undefined_before_start() {
        let clock = TimeSource::new();
        assert!(!clock.is_started());
        assert_eq!(clock.elapsed(), None);
    }

    #[test]
    fn elapsed_counts_from_start() {
        let t0 = Instant::now();
        let mut clock = TimeSource::new();
        clock.start_at(t0);
        let t = clock.elapsed_at(t0 + Duration::from_millis(1500));
        assert!(t.is_some_and(|t| (t - 1.5).abs() <= 1e-4), "got {t:?}");
        // Instants before the reference clamp to zero rather than going negative.
        assert_eq!(clock.elapsed_at(t0), Some(0.0));
    }
}
