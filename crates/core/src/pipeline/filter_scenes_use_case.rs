use std::error::Error;
use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use walkdir::WalkDir;

use crate::classification::domain::classifier::Classifier;
use crate::classification::domain::scene_filter_error::SceneFilterError;
use crate::pipeline::progress_reporter::ProgressReporter;
use crate::shared::constants::{PERSON_LABEL, SCENE_IMAGE_EXTENSIONS, SCENE_OUTPUT_DIR_NAME};
use crate::shared::frame::Frame;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SceneFilterReport {
    pub examined: usize,
    /// Person-free images written to the output directory.
    pub copied: usize,
    pub with_person: usize,
    pub failed: usize,
}

/// Collects person-free scene images into `<root>/Other/`.
pub struct FilterScenesUseCase {
    root: PathBuf,
    classifier: Box<dyn Classifier>,
    reporter: Box<dyn ProgressReporter>,
}

impl FilterScenesUseCase {
    pub fn new(
        root: impl Into<PathBuf>,
        classifier: Box<dyn Classifier>,
        reporter: Box<dyn ProgressReporter>,
    ) -> Self {
        Self {
            root: root.into(),
            classifier,
            reporter,
        }
    }

    pub fn output_dir(&self) -> PathBuf {
        self.root.join(SCENE_OUTPUT_DIR_NAME)
    }

    pub fn execute(&mut self) -> Result<SceneFilterReport, SceneFilterError> {
        let images = discover_scene_images(&self.root)?;
        let output_dir = self.output_dir();
        fs::create_dir_all(&output_dir).map_err(|source| SceneFilterError::CreateDir {
            path: output_dir.clone(),
            source,
        })?;

        let mut report = SceneFilterReport::default();
        self.reporter.begin_stage("Filtering scenes", images.len());
        for (i, path) in images.iter().enumerate() {
            let started = Instant::now();
            report.examined += 1;
            match self.filter_image(path, &output_dir, i) {
                Ok(true) => report.copied += 1,
                Ok(false) => report.with_person += 1,
                Err(e) => {
                    log::warn!("Error filtering {}: {e}", path.display());
                    report.failed += 1;
                }
            }
            self.reporter
                .timing("classify", started.elapsed().as_secs_f64() * 1000.0);
            self.reporter.stage_progress(i + 1, images.len());
        }
        self.reporter.summary();

        Ok(report)
    }

    /// Returns whether the image was copied, i.e. no person was detected.
    fn filter_image(
        &mut self,
        path: &Path,
        output_dir: &Path,
        index: usize,
    ) -> Result<bool, Box<dyn Error>> {
        let image = image::open(path)?.to_rgb8();
        let (width, height) = image.dimensions();
        let frame = Frame::new(image.into_raw(), width, height, 3, index);

        let labels = self.classifier.detect(&frame)?;
        if labels.contains(PERSON_LABEL) {
            return Ok(false);
        }

        let file_name = path.file_name().ok_or("image path has no file name")?;
        let target = output_dir.join(file_name);
        let image = image::RgbImage::from_raw(width, height, frame.into_data())
            .ok_or("frame buffer does not match its dimensions")?;
        image.save(&target)?;
        log::debug!("Copied {} to {}", path.display(), target.display());
        Ok(true)
    }
}

/// Scene images below `root`, excluding the output directory itself.
pub fn discover_scene_images(root: &Path) -> Result<Vec<PathBuf>, SceneFilterError> {
    let mut images = Vec::new();
    let walker = WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| !(e.depth() == 1 && e.file_name() == OsStr::new(SCENE_OUTPUT_DIR_NAME)));
    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) if e.depth() == 0 => {
                return Err(SceneFilterError::Walk {
                    root: root.to_path_buf(),
                    source: e,
                })
            }
            Err(e) => {
                log::warn!("Skipping unreadable entry under {}: {e}", root.display());
                continue;
            }
        };
        let is_image = entry.file_type().is_file()
            && entry
                .path()
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| {
                    SCENE_IMAGE_EXTENSIONS
                        .iter()
                        .any(|known| ext.eq_ignore_ascii_case(known))
                });
        if is_image {
            images.push(entry.into_path());
        }
    }
    Ok(images)
}
