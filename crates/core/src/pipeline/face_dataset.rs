use thiserror::Error;

use crate::extraction::domain::channel_order::ChannelOrder;
use crate::extraction::domain::extraction_error::ExtractionError;
use crate::extraction::domain::frame_sampling::FrameSampling;
use crate::pipeline::extract_faces_use_case::{ExtractFacesUseCase, ExtractionConfig};
use crate::pipeline::split_cache::{SplitCache, SplitPaths};
use crate::shared::layout::CorpusLayout;
use crate::split::domain::split_error::SplitError;

#[derive(Error, Debug)]
pub enum DatasetError {
    #[error(transparent)]
    Extraction(#[from] ExtractionError),
    #[error(transparent)]
    Split(#[from] SplitError),
    #[error("invalid load options: {0}")]
    InvalidOptions(&'static str),
}

#[derive(Clone, Debug)]
pub struct LoadOptions {
    /// Cap on frames taken from each recording; `None` or 0 means all.
    pub frames_per_recording: Option<usize>,
    pub stride: usize,
    pub channel_order: ChannelOrder,
    /// Delete and rebuild `train/` and `test/`.
    pub invalidate_split_cache: bool,
    /// Re-extract faces, rewriting existing files.
    pub invalidate_faces_cache: bool,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            frames_per_recording: None,
            stride: 1,
            channel_order: ChannelOrder::default(),
            invalidate_split_cache: false,
            invalidate_faces_cache: false,
        }
    }
}

impl LoadOptions {
    fn extraction_config(&self) -> Result<ExtractionConfig, DatasetError> {
        let cap = self.frames_per_recording.filter(|n| *n > 0);
        let sampling = FrameSampling::new(self.stride, cap).map_err(DatasetError::InvalidOptions)?;
        Ok(ExtractionConfig {
            overwrite: self.invalidate_faces_cache,
            sampling,
            channel_order: self.channel_order,
        })
    }
}

/// Ready-to-train view of the face corpus: extracted faces plus splits.
pub struct FaceDataset {
    layout: CorpusLayout,
    extraction: ExtractFacesUseCase,
    splits: SplitCache,
}

impl FaceDataset {
    pub fn new(layout: CorpusLayout, extraction: ExtractFacesUseCase, splits: SplitCache) -> Self {
        Self {
            layout,
            extraction,
            splits,
        }
    }

    /// Brings the corpus up to date and returns the split directories.
    ///
    /// Faces are extracted when `Faces/` is missing or face invalidation is
    /// requested; splits are built when missing or invalidated.
    pub fn load(&mut self, options: &LoadOptions) -> Result<SplitPaths, DatasetError> {
        let config = options.extraction_config()?;

        if options.invalidate_split_cache {
            self.splits.invalidate()?;
        }

        if !self.layout.faces_dir().exists() || options.invalidate_faces_cache {
            let report = self.extraction.execute(&config)?;
            log::info!(
                "Extracted {} faces ({} already present, {} failed) from {} recordings; largest {}",
                report.frames_written,
                report.frames_skipped,
                report.frames_failed,
                report.archives_found,
                report.largest_resolution
            );
        }

        Ok(self.splits.splits()?)
    }

    pub fn split_cache(&mut self) -> &mut SplitCache {
        &mut self.splits
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archive::infrastructure::npz_archive_reader::NpzArchiveReader;
    use crate::extraction::infrastructure::png_image_writer::PngImageWriter;
    use crate::metadata::domain::metadata_store::MetadataStore;
    use crate::metadata::infrastructure::json_metadata_store::JsonMetadataStore;
    use crate::pipeline::build_splits_use_case::{BuildSplitsUseCase, SplitConfig};
    use crate::pipeline::progress_reporter::NullProgressReporter;
    use crate::shared::layout::Split;
    use crate::shared::resolution::Resolution;
    use crate::test_support::write_recording;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::BTreeSet;
    use std::fs;
    use std::path::Path;
    use zip::CompressionMethod;

    fn dataset(layout: &CorpusLayout) -> FaceDataset {
        let extraction = ExtractFacesUseCase::new(
            layout.clone(),
            Box::new(NpzArchiveReader::new()),
            Box::new(PngImageWriter::new()),
            Box::new(JsonMetadataStore::new(layout.metadata_path())),
            Box::new(NullProgressReporter),
        );
        let splits = SplitCache::new(
            BuildSplitsUseCase::new(layout.clone(), SplitConfig::default()),
            layout.clone(),
            Box::new(JsonMetadataStore::new(layout.metadata_path())),
            Box::new(StdRng::seed_from_u64(2024)),
            Box::new(NullProgressReporter),
        );
        FaceDataset::new(layout.clone(), extraction, splits)
    }

    fn files_in(dir: &Path) -> BTreeSet<String> {
        fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect()
    }

    /// alice: 2 frames at 100x80 then 1 at 120x80; bob: 2 frames at 90x90.
    fn example_corpus() -> (tempfile::TempDir, CorpusLayout) {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        write_recording(&root.join("alice_001.npz"), 100, 80, 2, CompressionMethod::Stored, false);
        write_recording(&root.join("alice_002.npz"), 120, 80, 1, CompressionMethod::Deflated, false);
        write_recording(&root.join("bob_001.npz"), 90, 90, 2, CompressionMethod::Stored, false);
        let layout = CorpusLayout::new(root);
        (dir, layout)
    }

    #[test]
    fn test_end_to_end_extraction_and_split() {
        let (_dir, layout) = example_corpus();

        let paths = dataset(&layout).load(&LoadOptions::default()).unwrap();

        assert_eq!(
            files_in(&layout.identity_dir("alice")),
            BTreeSet::from(["face_0.png", "face_1.png", "face_2.png"].map(String::from))
        );
        assert_eq!(
            files_in(&layout.identity_dir("bob")),
            BTreeSet::from(["face_0.png", "face_1.png"].map(String::from))
        );
        let metadata = JsonMetadataStore::new(layout.metadata_path()).load().unwrap();
        assert_eq!(metadata.largest_resolution(), Resolution::new(120, 90));

        // floor(0.2 * 2) = 0 test identities
        assert!(files_in(&paths.test).is_empty());
        let train = files_in(&paths.train);
        assert_eq!(train.len(), 5);
        assert!(train.contains("alice_face_2.png"));
        assert!(train.contains("bob_face_1.png"));
        for name in &train {
            let img = image::open(paths.train.join(name)).unwrap();
            assert_eq!((img.height(), img.width()), (128, 96), "{name}");
        }
    }

    #[test]
    fn test_existing_faces_are_not_re_extracted() {
        let (_dir, layout) = example_corpus();
        dataset(&layout).load(&LoadOptions::default()).unwrap();
        fs::remove_file(layout.metadata_path()).unwrap();

        // Faces/ exists and splits exist, so nothing is recomputed.
        let paths = dataset(&layout).load(&LoadOptions::default()).unwrap();
        assert!(paths.train.is_dir());
        assert!(!layout.metadata_path().exists());
    }

    #[test]
    fn test_invalidate_faces_re_extracts_with_cap() {
        let (_dir, layout) = example_corpus();
        dataset(&layout).load(&LoadOptions::default()).unwrap();

        let options = LoadOptions {
            frames_per_recording: Some(1),
            invalidate_faces_cache: true,
            invalidate_split_cache: true,
            ..Default::default()
        };
        let paths = dataset(&layout).load(&options).unwrap();

        // Existing face files beyond the cap are left in place; the split is
        // rebuilt from whatever Faces/ holds.
        assert_eq!(files_in(&paths.train).len(), 5);
        assert!(layout.metadata_path().exists());
    }

    #[test]
    fn test_invalidate_splits_rebuilds_them() {
        let (_dir, layout) = example_corpus();
        let paths = dataset(&layout).load(&LoadOptions::default()).unwrap();
        fs::write(paths.train.join("stale.png"), b"x").unwrap();

        let options = LoadOptions {
            invalidate_split_cache: true,
            ..Default::default()
        };
        let paths = dataset(&layout).load(&options).unwrap();
        assert!(!paths.train.join("stale.png").exists());
        assert_eq!(files_in(&paths.train).len(), 5);
    }

    #[test]
    fn test_zero_stride_is_rejected() {
        let (_dir, layout) = example_corpus();
        let options = LoadOptions {
            stride: 0,
            ..Default::default()
        };
        assert!(matches!(
            dataset(&layout).load(&options),
            Err(DatasetError::InvalidOptions(_))
        ));
        assert!(!layout.faces_dir().exists());
    }

    #[test]
    fn test_split_cache_is_exposed_for_queries() {
        let (_dir, layout) = example_corpus();
        let mut ds = dataset(&layout);
        ds.load(&LoadOptions::default()).unwrap();
        assert!(ds.split_cache().exists(Split::Train));
        assert!(ds.split_cache().exists(Split::Test));
    }
}
