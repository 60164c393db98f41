use std::collections::HashSet;

use crate::shared::frame::Frame;

/// Domain interface for object classification of whole images.
///
/// Returns the set of labels detected in the frame. Implementations may
/// hold model state, hence `&mut self`.
pub trait Classifier: Send {
    fn detect(&mut self, frame: &Frame) -> Result<HashSet<String>, Box<dyn std::error::Error>>;
}
