use std::path::Path;

use crate::extraction::domain::channel_order::ChannelOrder;
use crate::extraction::domain::extraction_error::ExtractionError;
use crate::extraction::domain::image_writer::ImageWriter;
use crate::extraction::domain::resolution_tracker::ResolutionTracker;
use crate::shared::frame::Frame;
use crate::shared::layout::face_file_name;
use crate::shared::resolution::Resolution;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameOutcome {
    Written,
    /// The face file already existed and overwriting was not requested.
    Skipped,
}

/// Turns one decoded frame into `<identity_dir>/face_<index>.png`.
pub struct FrameExtractor<'a> {
    writer: &'a dyn ImageWriter,
    channel_order: ChannelOrder,
    overwrite: bool,
}

impl<'a> FrameExtractor<'a> {
    pub fn new(writer: &'a dyn ImageWriter, channel_order: ChannelOrder, overwrite: bool) -> Self {
        Self {
            writer,
            channel_order,
            overwrite,
        }
    }

    /// The frame's resolution is recorded in `tracker` even when the write is
    /// skipped, so corpus metadata always covers every frame seen.
    pub fn extract(
        &self,
        identity_dir: &Path,
        mut frame: Frame,
        index: usize,
        tracker: &mut ResolutionTracker,
    ) -> Result<FrameOutcome, ExtractionError> {
        tracker.observe(Resolution::new(frame.height(), frame.width()));

        let path = identity_dir.join(face_file_name(index));
        if path.exists() && !self.overwrite {
            return Ok(FrameOutcome::Skipped);
        }

        self.channel_order.to_rgb(&mut frame);
        if let Err(e) = self.writer.write(&path, &frame) {
            // Anything left at the destination would be skipped as done on the next run.
            if path.is_file() {
                if let Err(cleanup) = std::fs::remove_file(&path) {
                    log::warn!("Failed to remove partial {}: {cleanup}", path.display());
                }
            }
            return Err(ExtractionError::WriteFrame {
                path,
                message: e.to_string(),
            });
        }
        Ok(FrameOutcome::Written)
    }
}
