/// Time primitives
#[derive(Copy, Clone, Debug, PartialEq, PartialOrd, Default)]
pub struct Time(pub f64); // seconds

impl Time {
    pub fn from_millis(ms: f64) -> Self {
        Time(ms / 1000.0)
    }

    pub fn as_millis(self) -> f64 {
        self.0 * 1000.0
    }

    /// Seconds elapsed since `earlier`. Negative when `earlier` is in the future.
    pub fn since(self, earlier: Time) -> f64 {
        self.0 - earlier.0
    }

    pub fn after_millis(self, ms: f64) -> Self {
        Time(self.0 + ms / 1000.0)
    }
}
