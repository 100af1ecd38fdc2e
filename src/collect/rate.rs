use std::time::Instant;

/// Turns a monotonically growing byte total into a per-second rate.
#[derive(Debug, Default)]
pub struct RateCounter {
    previous: Option<(Instant, u64)>,
}

impl RateCounter {
    /// Records `total` observed at `now` and returns the rate since the previous observation.
    ///
    /// The first observation, a zero elapsed time, and a total going backwards all yield `0.0`.
    pub fn update(&mut self, now: Instant, total: u64) -> f64 {
        let rate = match self.previous {
            Some((prev_ts, prev_total)) => {
                let elapsed = now.saturating_duration_since(prev_ts).as_secs_f64();
                if elapsed == 0.0 {
                    0.0
                } else {
                    total.saturating_sub(prev_total) as f64 / elapsed
                }
            }
            None => 0.0,
        };

        self.previous = Some((now, total));
        rate
    }
}
