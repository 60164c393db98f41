use std::fs;
use std::path::PathBuf;

use rand::RngCore;

use crate::metadata::domain::metadata_store::MetadataStore;
use crate::pipeline::build_splits_use_case::{BuildSplitsUseCase, SplitReport};
use crate::pipeline::progress_reporter::ProgressReporter;
use crate::shared::layout::{CorpusLayout, Split};
use crate::shared::resolution::Resolution;
use crate::split::domain::split_error::SplitError;

/// Paths of the built split directories.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SplitPaths {
    pub train: PathBuf,
    pub test: PathBuf,
}

/// Owns the `train/` and `test/` directories as derived, cacheable state.
///
/// Queries build the splits on demand. A failed build is rolled back so the
/// next query starts from scratch rather than from a half-populated split.
pub struct SplitCache {
    layout: CorpusLayout,
    builder: BuildSplitsUseCase,
    store: Box<dyn MetadataStore>,
    rng: Box<dyn RngCore + Send>,
    reporter: Box<dyn ProgressReporter>,
    target: Option<Resolution>,
    last_report: Option<SplitReport>,
}

impl SplitCache {
    pub fn new(
        builder: BuildSplitsUseCase,
        layout: CorpusLayout,
        store: Box<dyn MetadataStore>,
        rng: Box<dyn RngCore + Send>,
        reporter: Box<dyn ProgressReporter>,
    ) -> Self {
        Self {
            layout,
            builder,
            store,
            rng,
            reporter,
            target: None,
            last_report: None,
        }
    }

    /// Largest extracted resolution rounded up to the tile size, read from
    /// the corpus metadata on first use.
    pub fn target_resolution(&mut self) -> Result<Resolution, SplitError> {
        if let Some(target) = self.target {
            return Ok(target);
        }
        let largest = self.store.load()?.largest_resolution();
        let target = largest.tile_aligned(self.builder.config().tile);
        log::info!("Split resolution {target} (largest extracted {largest})");
        self.target = Some(target);
        Ok(target)
    }

    pub fn exists(&self, split: Split) -> bool {
        self.layout.split_dir(split).is_dir()
    }

    /// Removes both split directories and forgets the cached resolution,
    /// which may have changed if faces were re-extracted.
    pub fn invalidate(&mut self) -> Result<(), SplitError> {
        self.target = None;
        self.last_report = None;
        for split in Split::ALL {
            let dir = self.layout.split_dir(split);
            if dir.exists() {
                fs::remove_dir_all(&dir).map_err(|e| SplitError::io(&dir, e))?;
                log::info!("Removed {}", dir.display());
            }
        }
        Ok(())
    }

    /// Path of `split`, building both splits first if it does not exist yet.
    pub fn split_dir(&mut self, split: Split) -> Result<PathBuf, SplitError> {
        if !self.exists(split) {
            self.rebuild()?;
        }
        Ok(self.layout.split_dir(split))
    }

    pub fn splits(&mut self) -> Result<SplitPaths, SplitError> {
        Ok(SplitPaths {
            train: self.split_dir(Split::Train)?,
            test: self.split_dir(Split::Test)?,
        })
    }

    /// Report of the build performed by this instance, if any.
    pub fn last_report(&self) -> Option<&SplitReport> {
        self.last_report.as_ref()
    }

    fn rebuild(&mut self) -> Result<(), SplitError> {
        let target = self.target_resolution()?;

        // A lone surviving split belongs to an older assignment; mixing it with
        // a fresh one could leak identities across splits.
        self.remove_split_dirs()?;

        match self
            .builder
            .execute(target, self.rng.as_mut(), self.reporter.as_mut())
        {
            Ok(report) => {
                log::info!(
                    "Built splits: {} train / {} test identities, {} images ({} skipped)",
                    report.train_identities,
                    report.test_identities,
                    report.images_copied,
                    report.images_skipped
                );
                self.reporter.summary();
                self.last_report = Some(report);
                Ok(())
            }
            Err(e) => {
                log::error!("Error creating splits, cleaning up: {e}");
                if let Err(cleanup) = self.invalidate() {
                    log::error!("Failed to remove partial splits: {cleanup}");
                }
                Err(SplitError::RolledBack(Box::new(e)))
            }
        }
    }

    fn remove_split_dirs(&self) -> Result<(), SplitError> {
        for split in Split::ALL {
            let dir = self.layout.split_dir(split);
            if dir.exists() {
                fs::remove_dir_all(&dir).map_err(|e| SplitError::io(&dir, e))?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::domain::corpus_metadata::CorpusMetadata;
    use crate::metadata::domain::metadata_error::MetadataError;
    use crate::metadata::infrastructure::json_metadata_store::JsonMetadataStore;
    use crate::pipeline::build_splits_use_case::SplitConfig;
    use crate::pipeline::progress_reporter::NullProgressReporter;
    use crate::test_support::write_png;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn cache(layout: &CorpusLayout) -> SplitCache {
        SplitCache::new(
            BuildSplitsUseCase::new(layout.clone(), SplitConfig::default()),
            layout.clone(),
            Box::new(JsonMetadataStore::new(layout.metadata_path())),
            Box::new(StdRng::seed_from_u64(11)),
            Box::new(NullProgressReporter),
        )
    }

    fn extracted_corpus(largest: Resolution) -> (tempfile::TempDir, CorpusLayout) {
        let dir = tempfile::tempdir().unwrap();
        let layout = CorpusLayout::new(dir.path());
        for identity in ["ann", "ben"] {
            write_png(&layout.face_path(identity, 0), 10, 12, [5, 5, 5]);
        }
        JsonMetadataStore::new(layout.metadata_path())
            .save(&CorpusMetadata::new(largest))
            .unwrap();
        (dir, layout)
    }

    #[test]
    fn test_query_builds_missing_splits() {
        let (_dir, layout) = extracted_corpus(Resolution::new(12, 10));
        let mut cache = cache(&layout);
        assert!(!cache.exists(Split::Train));

        let paths = cache.splits().unwrap();

        assert_eq!(paths.train, layout.split_dir(Split::Train));
        assert_eq!(paths.test, layout.split_dir(Split::Test));
        assert!(paths.train.is_dir() && paths.test.is_dir());
        assert_eq!(cache.last_report().unwrap().images_copied, 2);
    }

    #[test]
    fn test_existing_splits_are_not_rebuilt() {
        let (_dir, layout) = extracted_corpus(Resolution::new(12, 10));
        cache(&layout).splits().unwrap();
        let marker = layout.split_dir(Split::Train).join("marker");
        fs::write(&marker, b"keep").unwrap();

        let mut second = cache(&layout);
        second.splits().unwrap();

        assert!(marker.exists());
        assert!(second.last_report().is_none());
    }

    #[test]
    fn test_target_resolution_is_tile_aligned_and_cached() {
        let (_dir, layout) = extracted_corpus(Resolution::new(120, 90));
        let mut cache = cache(&layout);
        assert_eq!(cache.target_resolution().unwrap(), Resolution::new(128, 96));

        JsonMetadataStore::new(layout.metadata_path())
            .save(&CorpusMetadata::new(Resolution::new(300, 300)))
            .unwrap();
        assert_eq!(cache.target_resolution().unwrap(), Resolution::new(128, 96));

        cache.invalidate().unwrap();
        assert_eq!(cache.target_resolution().unwrap(), Resolution::new(304, 304));
    }

    #[test]
    fn test_invalidate_removes_split_dirs() {
        let (_dir, layout) = extracted_corpus(Resolution::new(12, 10));
        let mut cache = cache(&layout);
        cache.splits().unwrap();

        cache.invalidate().unwrap();

        assert!(!cache.exists(Split::Train));
        assert!(!cache.exists(Split::Test));
        assert!(layout.face_path("ann", 0).exists());
    }

    #[test]
    fn test_invalidate_without_splits_is_noop() {
        let (_dir, layout) = extracted_corpus(Resolution::new(12, 10));
        assert!(cache(&layout).invalidate().is_ok());
    }

    #[test]
    fn test_missing_metadata_means_run_extraction_first() {
        let dir = tempfile::tempdir().unwrap();
        let layout = CorpusLayout::new(dir.path());
        write_png(&layout.face_path("ann", 0), 4, 4, [0, 0, 0]);

        let err = cache(&layout).splits().unwrap_err();

        assert!(matches!(err, SplitError::Metadata(MetadataError::Missing(_))));
        assert!(!layout.split_dir(Split::Train).exists());
        assert!(!layout.split_dir(Split::Test).exists());
    }

    /// Squats a directory on `train/<identity>_face_0.png` the first time
    /// that identity starts copying, making the build fail partway through.
    struct SabotagingReporter {
        blocker: Option<PathBuf>,
        identity: &'static str,
    }

    impl ProgressReporter for SabotagingReporter {
        fn begin_stage(&mut self, _name: &str, _total: usize) {}
        fn stage_progress(&mut self, _current: usize, _total: usize) {}
        fn begin_item(&mut self, label: &str, _total: usize) {
            if label == self.identity {
                if let Some(blocker) = self.blocker.take() {
                    fs::create_dir_all(blocker).unwrap();
                }
            }
        }
        fn item_progress(&mut self, _current: usize, _total: usize) {}
        fn end_item(&mut self) {}
        fn timing(&mut self, _step: &str, _duration_ms: f64) {}
        fn info(&mut self, _message: &str) {}
    }

    #[test]
    fn test_failed_build_is_rolled_back_and_retried() {
        let (_dir, layout) = extracted_corpus(Resolution::new(12, 10));
        let reporter = SabotagingReporter {
            blocker: Some(layout.split_dir(Split::Train).join("ben_face_0.png")),
            identity: "ben",
        };
        let mut cache = SplitCache::new(
            BuildSplitsUseCase::new(layout.clone(), SplitConfig::default()),
            layout.clone(),
            Box::new(JsonMetadataStore::new(layout.metadata_path())),
            Box::new(StdRng::seed_from_u64(11)),
            Box::new(reporter),
        );

        let err = cache.split_dir(Split::Test).unwrap_err();

        assert!(matches!(match_rolled_back(&err), SplitError::WriteImage { .. }));
        assert!(!cache.exists(Split::Train));
        assert!(!cache.exists(Split::Test));

        let paths = cache.splits().unwrap();
        assert!(paths.train.is_dir() && paths.test.is_dir());
        assert_eq!(cache.last_report().unwrap().images_copied, 2);
    }

    fn match_rolled_back(err: &SplitError) -> &SplitError {
        match err {
            SplitError::RolledBack(cause) => cause,
            other => panic!("expected a rolled back build, got {other}"),
        }
    }
}
