mod progress;

use std::io::IsTerminal;
use std::path::PathBuf;
use std::process;

use clap::{Args, Parser, Subcommand};
use rand::rngs::StdRng;
use rand::SeedableRng;

use facecorpus_core::archive::infrastructure::npz_archive_reader::NpzArchiveReader;
use facecorpus_core::extraction::domain::channel_order::ChannelOrder;
use facecorpus_core::extraction::domain::frame_sampling::FrameSampling;
use facecorpus_core::extraction::infrastructure::png_image_writer::PngImageWriter;
use facecorpus_core::metadata::infrastructure::json_metadata_store::JsonMetadataStore;
use facecorpus_core::pipeline::build_splits_use_case::{BuildSplitsUseCase, SplitConfig};
use facecorpus_core::pipeline::extract_faces_use_case::{ExtractFacesUseCase, ExtractionConfig};
use facecorpus_core::pipeline::face_dataset::{FaceDataset, LoadOptions};
use facecorpus_core::pipeline::progress_reporter::{LogProgressReporter, ProgressReporter};
use facecorpus_core::pipeline::split_cache::{SplitCache, SplitPaths};
use facecorpus_core::shared::layout::CorpusLayout;

use crate::progress::TerminalReporter;

/// Prepares a face corpus from per-recording frame archives.
#[derive(Parser)]
#[command(name = "facecorpus")]
struct Cli {
    /// Corpus root holding the `.npz` recordings.
    #[arg(long)]
    root: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Extract every recording into Faces/<identity>/face_<k>.png.
    Extract {
        #[command(flatten)]
        sampling: SamplingArgs,

        /// Rewrite face files that already exist.
        #[arg(long)]
        overwrite: bool,
    },
    /// Build train/ and test/ from extracted faces if they are missing.
    Split {
        #[command(flatten)]
        seed: SeedArgs,

        /// Delete existing splits and rebuild them.
        #[arg(long)]
        rebuild: bool,
    },
    /// Extract if needed, then build splits if needed.
    Load {
        #[command(flatten)]
        sampling: SamplingArgs,

        #[command(flatten)]
        seed: SeedArgs,

        /// Re-extract faces, rewriting existing files.
        #[arg(long)]
        invalidate_faces: bool,

        /// Delete existing splits and rebuild them.
        #[arg(long)]
        invalidate_splits: bool,
    },
    /// Delete train/ and test/.
    Invalidate,
}

#[derive(Args)]
struct SamplingArgs {
    /// Take every Nth frame of each recording.
    #[arg(long, default_value = "1")]
    stride: usize,

    /// Maximum frames taken per recording (default: all).
    #[arg(long)]
    max_frames: Option<usize>,

    /// Channel order of the archived frames: rgb or bgr.
    #[arg(long, default_value = "rgb")]
    archive_order: String,
}

#[derive(Args)]
struct SeedArgs {
    /// Seed for the identity shuffle (default: random).
    #[arg(long)]
    seed: Option<u64>,
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    validate(&cli)?;
    let layout = CorpusLayout::new(&cli.root);

    match cli.command {
        Command::Extract {
            sampling,
            overwrite,
        } => {
            let config = ExtractionConfig {
                overwrite,
                sampling: FrameSampling::new(sampling.stride, sampling.max_frames)?,
                channel_order: sampling.archive_order.parse()?,
            };
            let report = build_extraction(&layout)?.execute(&config)?;
            log::info!(
                "Wrote {} faces, skipped {} existing, {} failed; {} of {} recordings failed",
                report.frames_written,
                report.frames_skipped,
                report.frames_failed,
                report.archives_failed,
                report.archives_found
            );
            log::info!("Largest resolution {}", report.largest_resolution);
        }
        Command::Split { seed, rebuild } => {
            let mut cache = build_split_cache(&layout, seed.seed)?;
            if rebuild {
                cache.invalidate()?;
            }
            let paths = cache.splits()?;
            if let Some(report) = cache.last_report() {
                log::info!(
                    "{} train and {} test identities, {} images copied, {} skipped",
                    report.train_identities,
                    report.test_identities,
                    report.images_copied,
                    report.images_skipped
                );
            }
            print_paths(&paths);
        }
        Command::Load {
            sampling,
            seed,
            invalidate_faces,
            invalidate_splits,
        } => {
            let options = LoadOptions {
                frames_per_recording: sampling.max_frames,
                stride: sampling.stride,
                channel_order: sampling.archive_order.parse()?,
                invalidate_split_cache: invalidate_splits,
                invalidate_faces_cache: invalidate_faces,
            };
            let mut dataset = FaceDataset::new(
                layout.clone(),
                build_extraction(&layout)?,
                build_split_cache(&layout, seed.seed)?,
            );
            let paths = dataset.load(&options)?;
            print_paths(&paths);
        }
        Command::Invalidate => {
            build_split_cache(&layout, None)?.invalidate()?;
        }
    }

    Ok(())
}

fn build_extraction(
    layout: &CorpusLayout,
) -> Result<ExtractFacesUseCase, Box<dyn std::error::Error>> {
    Ok(ExtractFacesUseCase::new(
        layout.clone(),
        Box::new(NpzArchiveReader::new()),
        Box::new(PngImageWriter::new()),
        Box::new(JsonMetadataStore::new(layout.metadata_path())),
        reporter()?,
    ))
}

fn build_split_cache(
    layout: &CorpusLayout,
    seed: Option<u64>,
) -> Result<SplitCache, Box<dyn std::error::Error>> {
    let rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    Ok(SplitCache::new(
        BuildSplitsUseCase::new(layout.clone(), SplitConfig::default()),
        layout.clone(),
        Box::new(JsonMetadataStore::new(layout.metadata_path())),
        Box::new(rng),
        reporter()?,
    ))
}

/// Progress bars on an interactive terminal, plain log lines otherwise.
fn reporter() -> Result<Box<dyn ProgressReporter>, Box<dyn std::error::Error>> {
    if std::io::stderr().is_terminal() {
        Ok(Box::new(TerminalReporter::new()?))
    } else {
        Ok(Box::new(LogProgressReporter::default()))
    }
}

fn validate(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    if !cli.root.is_dir() {
        return Err(format!("Corpus root not found: {}", cli.root.display()).into());
    }
    let sampling = match &cli.command {
        Command::Extract { sampling, .. } | Command::Load { sampling, .. } => sampling,
        Command::Split { .. } | Command::Invalidate => return Ok(()),
    };
    if sampling.stride == 0 {
        return Err("Stride must be at least 1".into());
    }
    if sampling.max_frames == Some(0) {
        return Err("Max frames must be at least 1 when given".into());
    }
    sampling.archive_order.parse::<ChannelOrder>()?;
    Ok(())
}

fn print_paths(paths: &SplitPaths) {
    println!("train: {}", paths.train.display());
    println!("test: {}", paths.test.display());
}
