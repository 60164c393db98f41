use std::collections::HashMap;

/// Per-identity count of frames already numbered in this run.
///
/// Lets several recordings of the same identity share one directory without
/// their `face_<n>` names colliding. Lives only as long as one extraction run.
#[derive(Debug, Default)]
pub struct FrameIndex {
    next: HashMap<String, usize>,
}

impl FrameIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// First output index for the next recording of `identity`.
    pub fn base(&self, identity: &str) -> usize {
        self.next.get(identity).copied().unwrap_or(0)
    }

    pub fn advance(&mut self, identity: &str, count: usize) {
        *self.next.entry(identity.to_string()).or_default() += count;
    }
}
