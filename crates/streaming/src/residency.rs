/// Lifecycle of a view's boundary data.
///
/// `Pending -> Ready | Unavailable`; a new load returns to `Pending`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum LoadPhase {
    #[default]
    Idle,
    Pending,
    Ready,
    /// Terminal for the current generation: the load failed.
    Unavailable,
}

impl LoadPhase {
    pub fn is_settled(self) -> bool {
        matches!(self, LoadPhase::Ready | LoadPhase::Unavailable)
    }
}

#[cfg(test)]
mod tests {
    use super::LoadPhase;

    #[test]
    fn only_ready_and_unavailable_are_settled() {
        assert_eq!(LoadPhase::default(), LoadPhase::Idle);
        assert!(!LoadPhase::Idle.is_settled());
        assert!(!LoadPhase::Pending.is_settled());
        assert!(LoadPhase::Ready.is_settled());
        assert!(LoadPhase::Unavailable.is_settled());
    }
}
