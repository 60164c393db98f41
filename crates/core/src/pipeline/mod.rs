pub mod build_splits_use_case;
pub mod extract_faces_use_case;
pub mod face_dataset;
pub mod filter_scenes_use_case;
pub mod progress_reporter;
pub mod split_cache;
