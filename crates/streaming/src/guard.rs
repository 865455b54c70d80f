use crate::request::LoadToken;

/// Issues load tokens and recognises results from superseded loads.
///
/// Every `begin` supersedes all earlier tokens, so a load that completes
/// after a newer one was started is reported stale and can be dropped.
#[derive(Debug, Clone, Default)]
pub struct LoadGuard {
    latest: u64,
}

impl LoadGuard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin(&mut self) -> LoadToken {
        self.latest += 1;
        LoadToken(self.latest)
    }

    pub fn is_current(&self, token: LoadToken) -> bool {
        token.0 == self.latest && self.latest != 0
    }

    /// Invalidates every outstanding token, e.g. on teardown.
    pub fn cancel_all(&mut self) {
        self.latest += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::LoadGuard;
    use crate::request::LoadToken;

    #[test]
    fn only_the_latest_token_is_current() {
        let mut guard = LoadGuard::new();
        assert!(!guard.is_current(LoadToken(0)));
        let first = guard.begin();
        assert!(guard.is_current(first));
        let second = guard.begin();
        assert!(second > first);
        assert!(!guard.is_current(first));
        assert!(guard.is_current(second));
        guard.cancel_all();
        assert!(!guard.is_current(second));
    }
}
