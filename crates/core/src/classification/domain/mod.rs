pub mod classifier;
pub mod scene_filter_error;
