use std::time::Instant;

/// Frame clock. `tick` advances the clock and returns the delta since the
/// previous tick in seconds.
pub struct Time {
    start: Instant,
    last: Instant,
    delta: f32,
}

impl Time {
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            start: now,
            last: now,
            delta: 0.0,
        }
    }

    pub fn tick(&mut self) -> f32 {
        let now = Instant::now();
        self.delta = now.duration_since(self.last).as_secs_f32();
        self.last = now;
        self.delta
    }

    pub fn delta(&self) -> f32 {
        self.delta
    }

    /// Seconds since the clock was created.
    pub fn elapsed(&self) -> f32 {
        self.start.elapsed().as_secs_f32()
    }
}

impl Default for Time {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tick_advances_monotonically() {
        let mut time = Time::new();
        let first = time.tick();
        let second = time.tick();
        assert!(first >= 0.0);
        assert!(second >= 0.0);
        assert!(time.elapsed() >= first + second);
    }
}
