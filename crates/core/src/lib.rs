//! Face corpus preparation: frame extraction from per-recording archives,
//! corpus metadata, and identity-disjoint train/test splits.

pub mod archive;
pub mod classification;
pub mod extraction;
pub mod metadata;
pub mod pipeline;
pub mod shared;
pub mod split;

#[cfg(test)]
mod test_support;
