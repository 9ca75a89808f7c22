/// Wall-clock schedule for work driven from the render loop.
///
/// The browser calls the draw closure on every animation frame; asking the
/// clock on each frame is enough to run something every `every_ms`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PollClock {
    every_ms: f64,
    last: Option<f64>,
}

impl PollClock {
    pub const fn new(every_ms: f64) -> Self {
        Self {
            every_ms,
            last: None,
        }
    }

    /// True on the first call and then once per period. Marks the poll as
    /// started when it returns true.
    pub fn due(&mut self, now_ms: f64) -> bool {
        let due = self
            .last
            // A clock that went backwards restarts the period.
            .map_or(true, |last| now_ms < last || now_ms - last >= self.every_ms);
        if due {
            self.last = Some(now_ms);
        }
        due
    }
}

#[cfg(test)]
mod tests {
    use super::PollClock;

    #[test]
    fn first_frame_polls_immediately() {
        let mut clock = PollClock::new(10_000.0);
        assert!(clock.due(500.0));
        assert!(!clock.due(600.0));
    }

    #[test]
    fn polls_once_per_period() {
        let mut clock = PollClock::new(10_000.0);
        assert!(clock.due(0.0));
        assert!(!clock.due(9_999.0));
        assert!(clock.due(10_000.0));
        assert!(!clock.due(15_000.0));
        assert!(clock.due(20_500.0));
    }

    #[test]
    fn clock_going_backwards_restarts() {
        let mut clock = PollClock::new(10_000.0);
        assert!(clock.due(50_000.0));
        assert!(clock.due(1_000.0));
        assert!(!clock.due(2_000.0));
    }
}
