pub mod channel_order;
pub mod extraction_error;
pub mod frame_extractor;
pub mod frame_index;
pub mod frame_sampling;
pub mod image_writer;
pub mod resolution_tracker;
