use foundation::time::Time;

/// One-shot deadline that can be re-armed or cancelled before it fires.
///
/// `poll` reports `true` exactly once per arming, on the first poll at or after
/// the deadline.
#[derive(Debug, Clone)]
pub struct Cooldown {
    delay_s: f64,
    deadline: Option<Time>,
}

impl Cooldown {
    pub fn from_millis(delay_ms: f64) -> Self {
        Self {
            delay_s: delay_ms.max(0.0) / 1000.0,
            deadline: None,
        }
    }

    pub fn delay_ms(&self) -> f64 {
        self.delay_s * 1000.0
    }

    /// Starts (or restarts) the countdown from `now`.
    pub fn arm(&mut self, now: Time) {
        self.deadline = Some(Time(now.0 + self.delay_s));
    }

    /// Returns whether a pending deadline was dropped.
    pub fn cancel(&mut self) -> bool {
        self.deadline.take().is_some()
    }

    pub fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }

    pub fn poll(&mut self, now: Time) -> bool {
        match self.deadline {
            Some(deadline) if now.0 >= deadline.0 => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Cooldown;
    use foundation::time::Time;

    #[test]
    fn fires_once_after_delay() {
        let mut c = Cooldown::from_millis(2000.0);
        c.arm(Time(10.0));
        assert!(!c.poll(Time(11.999)));
        assert!(c.poll(Time(12.0)));
        assert!(!c.poll(Time(13.0)));
        assert!(!c.is_armed());
    }

    #[test]
    fn cancel_prevents_firing() {
        let mut c = Cooldown::from_millis(500.0);
        c.arm(Time(0.0));
        assert!(c.cancel());
        assert!(!c.poll(Time(5.0)));
        assert!(!c.cancel());
    }

    #[test]
    fn rearm_pushes_deadline() {
        let mut c = Cooldown::from_millis(1000.0);
        c.arm(Time(0.0));
        c.arm(Time(0.8));
        assert!(!c.poll(Time(1.2)));
        assert!(c.poll(Time(1.8)));
    }
}
