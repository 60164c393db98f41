use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use walkdir::WalkDir;

use crate::archive::domain::archive_reader::ArchiveReader;
use crate::extraction::domain::channel_order::ChannelOrder;
use crate::extraction::domain::extraction_error::ExtractionError;
use crate::extraction::domain::frame_extractor::{FrameExtractor, FrameOutcome};
use crate::extraction::domain::frame_index::FrameIndex;
use crate::extraction::domain::frame_sampling::FrameSampling;
use crate::extraction::domain::image_writer::ImageWriter;
use crate::extraction::domain::resolution_tracker::ResolutionTracker;
use crate::metadata::domain::corpus_metadata::CorpusMetadata;
use crate::metadata::domain::metadata_store::MetadataStore;
use crate::pipeline::progress_reporter::ProgressReporter;
use crate::shared::constants::ARCHIVE_EXTENSION;
use crate::shared::layout::CorpusLayout;
use crate::shared::resolution::Resolution;

/// Width the identity is padded/truncated to in item labels.
const LABEL_WIDTH: usize = 25;

#[derive(Clone, Debug, Default)]
pub struct ExtractionConfig {
    /// Rewrite face files that already exist.
    pub overwrite: bool,
    pub sampling: FrameSampling,
    pub channel_order: ChannelOrder,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ExtractionReport {
    pub archives_found: usize,
    pub archives_failed: usize,
    pub frames_written: usize,
    pub frames_skipped: usize,
    pub frames_failed: usize,
    pub largest_resolution: Resolution,
}

/// Mutable state of one extraction run, owned by `execute` for its duration.
#[derive(Default)]
struct RunState {
    frame_index: FrameIndex,
    tracker: ResolutionTracker,
    report: ExtractionReport,
}

/// Extracts every recording under the corpus root into `Faces/<identity>/`.
///
/// A failing archive or frame is logged and skipped; the run carries on with
/// the rest. The corpus metadata is only written once the whole pass is done.
pub struct ExtractFacesUseCase {
    layout: CorpusLayout,
    reader: Box<dyn ArchiveReader>,
    writer: Box<dyn ImageWriter>,
    store: Box<dyn MetadataStore>,
    reporter: Box<dyn ProgressReporter>,
}

impl ExtractFacesUseCase {
    pub fn new(
        layout: CorpusLayout,
        reader: Box<dyn ArchiveReader>,
        writer: Box<dyn ImageWriter>,
        store: Box<dyn MetadataStore>,
        reporter: Box<dyn ProgressReporter>,
    ) -> Self {
        Self {
            layout,
            reader,
            writer,
            store,
            reporter,
        }
    }

    pub fn execute(&mut self, config: &ExtractionConfig) -> Result<ExtractionReport, ExtractionError> {
        let faces_dir = self.layout.faces_dir();
        fs::create_dir_all(&faces_dir).map_err(|source| ExtractionError::CreateDir {
            path: faces_dir.clone(),
            source,
        })?;

        let archives = discover_archives(self.layout.root())?;
        self.reporter
            .info(&format!("Found {} recordings. Processing...", archives.len()));

        let extractor =
            FrameExtractor::new(self.writer.as_ref(), config.channel_order, config.overwrite);
        let mut state = RunState::default();
        state.report.archives_found = archives.len();

        self.reporter.begin_stage("Processing files", archives.len());
        for (i, path) in archives.iter().enumerate() {
            let started = Instant::now();
            if let Err(e) = process_archive(
                self.reader.as_mut(),
                &extractor,
                self.reporter.as_mut(),
                &self.layout,
                &config.sampling,
                path,
                &mut state,
            ) {
                log::warn!("Error processing {}: {e}", path.display());
                state.report.archives_failed += 1;
            }
            self.reader.close();
            self.reporter
                .timing("archive", started.elapsed().as_secs_f64() * 1000.0);
            self.reporter.stage_progress(i + 1, archives.len());
        }

        let largest = state.tracker.largest();
        self.store.save(&CorpusMetadata::new(largest))?;
        state.report.largest_resolution = largest;
        self.reporter.summary();

        Ok(state.report)
    }
}

/// All archive files anywhere below `root`, in a stable order.
pub fn discover_archives(root: &Path) -> Result<Vec<PathBuf>, ExtractionError> {
    let mut archives = Vec::new();
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) if e.depth() == 0 => {
                return Err(ExtractionError::Walk {
                    root: root.to_path_buf(),
                    source: e,
                })
            }
            Err(e) => {
                log::warn!("Skipping unreadable entry under {}: {e}", root.display());
                continue;
            }
        };
        let is_archive = entry.file_type().is_file()
            && entry
                .path()
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| ext.eq_ignore_ascii_case(ARCHIVE_EXTENSION));
        if is_archive {
            archives.push(entry.into_path());
        }
    }
    Ok(archives)
}

fn process_archive(
    reader: &mut dyn ArchiveReader,
    extractor: &FrameExtractor<'_>,
    reporter: &mut dyn ProgressReporter,
    layout: &CorpusLayout,
    sampling: &FrameSampling,
    path: &Path,
    state: &mut RunState,
) -> Result<(), ExtractionError> {
    let info = reader.open(path)?;
    let identity_dir = layout.identity_dir(&info.identity);
    fs::create_dir_all(&identity_dir).map_err(|source| ExtractionError::CreateDir {
        path: identity_dir.clone(),
        source,
    })?;

    let selected = sampling.selected_count(info.frame_count);
    let base = state.frame_index.base(&info.identity);
    reporter.begin_item(&item_label(&info.identity), selected);

    for (offset, source_index) in sampling.select(info.frame_count) {
        let index = base + offset;
        let result = reader
            .frame(source_index)
            .map_err(ExtractionError::from)
            .and_then(|frame| extractor.extract(&identity_dir, frame, index, &mut state.tracker));
        match result {
            Ok(FrameOutcome::Written) => state.report.frames_written += 1,
            Ok(FrameOutcome::Skipped) => state.report.frames_skipped += 1,
            Err(e) => {
                log::warn!(
                    "Error extracting frame {source_index} of {}: {e}",
                    path.display()
                );
                state.report.frames_failed += 1;
            }
        }
        reporter.item_progress(offset + 1, selected);
    }

    // Numbering for this identity continues after every selected slot, failed
    // ones included, so a later archive never reuses an index.
    state.frame_index.advance(&info.identity, selected);
    reporter.end_item();
    Ok(())
}

fn item_label(identity: &str) -> String {
    let short: String = identity.chars().take(LABEL_WIDTH).collect();
    format!("Frames {short:<LABEL_WIDTH$}")
}
