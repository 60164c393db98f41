use crate::shared::resolution::Resolution;

/// Running per-axis maximum of every frame resolution observed during a run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ResolutionTracker {
    largest: Resolution,
}

impl ResolutionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn observe(&mut self, resolution: Resolution) {
        self.largest = self.largest.max(resolution);
    }

    pub fn largest(&self) -> Resolution {
        self.largest
    }
}
