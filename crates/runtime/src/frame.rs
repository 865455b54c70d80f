use foundation::time::Time;

/// Frame metadata handed to the paint step.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Frame {
    /// 0-based frame index.
    pub index: u64,
    /// Delta time since the previous painted frame (seconds).
    pub dt_s: f64,
    /// Time at the start of the frame (seconds).
    pub time: Time,
}

impl Frame {
    pub fn new(index: u64, dt_s: f64) -> Self {
        Self {
            index,
            dt_s,
            time: Time(index as f64 * dt_s),
        }
    }

    pub fn next(self) -> Self {
        Self::new(self.index + 1, self.dt_s)
    }
}

/// Slack for callbacks that land a hair before the interval boundary, so a
/// display running at exactly the target rate is not throttled to half.
const PACING_SLACK_S: f64 = 0.0005;

/// Fixed-rate frame gate driven by an elapsed-time accumulator.
///
/// The host calls [`FramePacer::poll`] from every display callback; a frame is
/// produced only when at least one interval has elapsed since the last one.
/// The remainder of the elapsed time is carried so the long-run rate does not
/// drift below the target on displays whose refresh is not a multiple of it.
#[derive(Debug, Clone)]
pub struct FramePacer {
    interval_s: f64,
    last: Option<Time>,
    next_index: u64,
}

impl FramePacer {
    pub fn new(rate_hz: f64) -> Self {
        let rate_hz = if rate_hz.is_finite() && rate_hz > 0.0 {
            rate_hz
        } else {
            60.0
        };
        Self {
            interval_s: 1.0 / rate_hz,
            last: None,
            next_index: 0,
        }
    }

    pub fn interval_s(&self) -> f64 {
        self.interval_s
    }

    /// Forget the last paint time; the next poll paints immediately.
    pub fn reset(&mut self) {
        self.last = None;
    }

    pub fn poll(&mut self, now: Time) -> Option<Frame> {
        let dt_s = match self.last {
            None => {
                self.last = Some(now);
                0.0
            }
            Some(last) => {
                let elapsed = now.since(last);
                if elapsed < self.interval_s - PACING_SLACK_S {
                    return None;
                }
                let carry = if elapsed >= self.interval_s {
                    elapsed % self.interval_s
                } else {
                    0.0
                };
                self.last = Some(Time(now.0 - carry));
                elapsed
            }
        };
        let frame = Frame {
            index: self.next_index,
            dt_s,
            time: now,
        };
        self.next_index += 1;
        Some(frame)
    }
}

#[cfg(test)]
mod tests {
    use super::{Frame, FramePacer};
    use foundation::time::Time;

    #[test]
    fn frame_time_is_deterministic() {
        let a = Frame::new(10, 1.0 / 60.0);
        let b = Frame::new(10, 1.0 / 60.0);
        assert_eq!(a, b);
        assert_eq!(a.time, Time(10.0 / 60.0));
    }

    #[test]
    fn next_advances_index_and_time() {
        let f0 = Frame::new(0, 0.5);
        let f1 = f0.next();
        assert_eq!(f1.index, 1);
        assert_eq!(f1.time, Time(0.5));
    }

    fn paints_over_one_second(callback_hz: f64) -> usize {
        let mut pacer = FramePacer::new(60.0);
        let ticks = callback_hz as usize;
        (0..=ticks)
            .filter(|k| pacer.poll(Time(*k as f64 / callback_hz)).is_some())
            .count()
    }

    #[test]
    fn high_refresh_display_is_throttled_to_target() {
        // 61 paints cover 60 intervals including the one at t=0.
        let n = paints_over_one_second(144.0);
        assert!((60..=61).contains(&n), "{n}");
        let n = paints_over_one_second(240.0);
        assert!((60..=61).contains(&n), "{n}");
    }

    #[test]
    fn matching_refresh_is_not_halved() {
        let n = paints_over_one_second(60.0);
        assert!((60..=61).contains(&n), "{n}");
    }

    #[test]
    fn never_paints_twice_within_an_interval() {
        let mut pacer = FramePacer::new(60.0);
        assert!(pacer.poll(Time(1.0)).is_some());
        assert!(pacer.poll(Time(1.005)).is_none());
        assert!(pacer.poll(Time(1.010)).is_none());
        let f = pacer.poll(Time(1.020)).unwrap();
        assert_eq!(f.index, 1);
        assert!((f.dt_s - 0.020).abs() < 1e-9);
    }
}
