/// Generation of a boundary load. Later loads carry larger tokens.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LoadToken(pub u64);
