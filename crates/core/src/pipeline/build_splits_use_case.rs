use std::fs;
use std::path::Path;
use std::time::Instant;

use rand::RngCore;

use crate::pipeline::progress_reporter::ProgressReporter;
use crate::shared::constants::{TEST_FRACTION, TILE_SIZE};
use crate::shared::layout::{split_file_name, CorpusLayout, Split};
use crate::shared::resolution::Resolution;
use crate::split::domain::padding::pad_file;
use crate::split::domain::split_assignment::SplitAssignment;
use crate::split::domain::split_error::SplitError;

#[derive(Clone, Debug)]
pub struct SplitConfig {
    pub test_fraction: f64,
    /// Padded images are rounded up to a multiple of this on both axes.
    pub tile: u32,
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self {
            test_fraction: TEST_FRACTION,
            tile: TILE_SIZE,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SplitReport {
    pub train_identities: usize,
    pub test_identities: usize,
    pub images_copied: usize,
    pub images_skipped: usize,
}

/// Builds `train/` and `test/` from `Faces/`, padding every image to one size.
///
/// Identities, not images, are assigned to splits so no subject appears in
/// both. Test identities are processed before train identities.
pub struct BuildSplitsUseCase {
    layout: CorpusLayout,
    config: SplitConfig,
}

impl BuildSplitsUseCase {
    pub fn new(layout: CorpusLayout, config: SplitConfig) -> Self {
        Self { layout, config }
    }

    pub fn config(&self) -> &SplitConfig {
        &self.config
    }

    /// Images that cannot be read or do not fit `target` are skipped. Any
    /// other failure aborts the build and leaves partial output behind for the
    /// caller to clean up.
    pub fn execute(
        &self,
        target: Resolution,
        rng: &mut dyn RngCore,
        reporter: &mut dyn ProgressReporter,
    ) -> Result<SplitReport, SplitError> {
        for split in Split::ALL {
            let dir = self.layout.split_dir(split);
            fs::create_dir_all(&dir).map_err(|e| SplitError::io(&dir, e))?;
        }

        let identities = list_identities(&self.layout.faces_dir())?;
        let assignment = SplitAssignment::assign(identities, self.config.test_fraction, rng);
        let test = assignment.identities(Split::Test);
        let train = assignment.identities(Split::Train);

        let mut report = SplitReport {
            train_identities: train.len(),
            test_identities: test.len(),
            ..Default::default()
        };
        reporter.info(&format!(
            "Moving {} people to test and {} to train",
            test.len(),
            train.len()
        ));

        reporter.begin_stage("Building splits", test.len() + train.len());
        let mut done = 0;
        for split in [Split::Test, Split::Train] {
            for identity in assignment.identities(split) {
                let started = Instant::now();
                self.copy_identity(identity, split, target, reporter, &mut report)?;
                reporter.timing("identity", started.elapsed().as_secs_f64() * 1000.0);
                done += 1;
                reporter.stage_progress(done, test.len() + train.len());
            }
            reporter.info(&format!("{} split done", capitalised(split)));
        }

        Ok(report)
    }

    fn copy_identity(
        &self,
        identity: &str,
        split: Split,
        target: Resolution,
        reporter: &mut dyn ProgressReporter,
        report: &mut SplitReport,
    ) -> Result<(), SplitError> {
        let identity_dir = self.layout.identity_dir(identity);
        let mut files: Vec<_> = fs::read_dir(&identity_dir)
            .map_err(|e| SplitError::io(&identity_dir, e))?
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| SplitError::io(&identity_dir, e))?
            .into_iter()
            .filter(|entry| entry.file_type().is_ok_and(|t| t.is_file()))
            .map(|entry| entry.file_name())
            .collect();
        files.sort();

        let split_dir = self.layout.split_dir(split);
        reporter.begin_item(identity, files.len());
        for (i, file_name) in files.iter().enumerate() {
            let source = identity_dir.join(file_name);
            match pad_file(&source, target) {
                Ok(padded) => {
                    let name = split_file_name(identity, &file_name.to_string_lossy());
                    let dest = split_dir.join(name);
                    padded.save(&dest).map_err(|source| SplitError::WriteImage {
                        path: dest.clone(),
                        source,
                    })?;
                    report.images_copied += 1;
                }
                Err(e) => {
                    log::warn!("Skipping {}: {e}", source.display());
                    report.images_skipped += 1;
                }
            }
            reporter.item_progress(i + 1, files.len());
        }
        reporter.end_item();
        Ok(())
    }
}

/// Names of the identity directories under `faces_dir`; stray files are ignored.
pub fn list_identities(faces_dir: &Path) -> Result<Vec<String>, SplitError> {
    let mut identities = Vec::new();
    for entry in fs::read_dir(faces_dir).map_err(|e| SplitError::io(faces_dir, e))? {
        let entry = entry.map_err(|e| SplitError::io(faces_dir, e))?;
        if !entry.file_type().is_ok_and(|t| t.is_dir()) {
            continue;
        }
        match entry.file_name().into_string() {
            Ok(name) => identities.push(name),
            Err(name) => log::warn!("Ignoring identity with non-UTF-8 name {name:?}"),
        }
    }
    Ok(identities)
}

fn capitalised(split: Split) -> &'static str {
    match split {
        Split::Train => "Train",
        Split::Test => "Test",
    }
}
