use std::{
    fs, io,
    path::{Path, PathBuf},
};

use log::{info, warn};
use thiserror::Error;
use walkdir::WalkDir;

use crate::{
    definitions::{MATCH_THRESHOLD, QUARANTINE_DIR_NAME, VIDEO_EXTENSIONS},
    DuplicateResolver, Event, EventSink, FrameSource, HashSampler, MatchDecision, Phase, ResolverCfg,
    SamplerCfg, ScoreCfg, SimilarityScorer,
};

const NOT_ENOUGH_VIDEOS: &str = "Not enough videos to compare.";

/// Errors that end a run early. Problems with individual files or moves are not fatal
/// and never show up here.
#[derive(Error, Debug)]
pub enum DedupError {
    #[error("Cannot create folder '{}': {source}", .path.display())]
    CreateQuarantine { path: PathBuf, source: io::Error },

    #[error("Cannot read directory {}: {source}", .path.display())]
    ReadDir { path: PathBuf, source: walkdir::Error },
}

/// Everything needed to deduplicate one directory.
#[derive(Debug, Clone, PartialEq)]
pub struct DedupCfg {
    pub target_dir: PathBuf,
    pub sampler: SamplerCfg,
    pub score: ScoreCfg,
    pub match_threshold: f64,
    /// Name of the quarantine subdirectory inside `target_dir`.
    pub quarantine_dir_name: String,
    /// Lowercase file extensions (without the dot) that are treated as videos.
    pub video_extensions: Vec<String>,
}

impl DedupCfg {
    pub fn new(target_dir: impl AsRef<Path>) -> Self {
        Self {
            target_dir: target_dir.as_ref().to_path_buf(),
            sampler: SamplerCfg::default(),
            score: ScoreCfg::default(),
            match_threshold: MATCH_THRESHOLD,
            quarantine_dir_name: QUARANTINE_DIR_NAME.to_string(),
            video_extensions: VIDEO_EXTENSIONS.iter().map(|ext| ext.to_string()).collect(),
        }
    }

    pub fn quarantine_dir(&self) -> PathBuf {
        self.target_dir.join(&self.quarantine_dir_name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// Fewer than two videos were found, or fewer than two could be hashed.
    NotEnoughVideos,
    Completed,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    /// Number of video files found in the directory.
    pub scanned: usize,
    /// Number of those that could be hashed.
    pub usable: usize,
    pub decisions: Vec<MatchDecision>,
    pub outcome: RunOutcome,
}

impl RunSummary {
    fn not_enough(scanned: usize, usable: usize) -> Self {
        Self {
            scanned,
            usable,
            decisions: vec![],
            outcome: RunOutcome::NotEnoughVideos,
        }
    }

    /// Number of files moved into quarantine.
    pub fn moved(&self) -> usize {
        self.decisions.len()
    }
}

/// The video files directly inside `dir`, sorted by file name. Subdirectories are not
/// searched, and anything called `quarantine_name` is skipped. Extensions are matched
/// case-insensitively. Symlinks are followed.
///
/// Only a failure to read `dir` itself is an error. Entries that cannot be inspected (such
/// as dangling symlinks) are logged and skipped.
pub fn find_candidates(
    dir: &Path,
    quarantine_name: &str,
    extensions: &[String],
) -> Result<Vec<PathBuf>, DedupError> {
    let mut candidates = vec![];

    let entries = WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .sort_by_file_name();
    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(source) if source.depth() == 0 => {
                return Err(DedupError::ReadDir {
                    path: dir.to_path_buf(),
                    source,
                })
            }
            Err(e) => {
                warn!("Skipping unreadable entry: {e}");
                continue;
            }
        };

        if entry.file_name() == quarantine_name || !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();

        let is_video = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| extensions.iter().any(|wanted| ext.eq_ignore_ascii_case(wanted)))
            .unwrap_or(false);

        if is_video {
            candidates.push(path.to_path_buf());
        }
    }

    Ok(candidates)
}

fn create_quarantine_dir(path: &Path) -> Result<(), DedupError> {
    match fs::create_dir(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists && path.is_dir() => Ok(()),
        Err(source) => Err(DedupError::CreateQuarantine {
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Deduplicate the videos in `cfg.target_dir`.
///
/// Progress and match events are sent to `sink` as the run goes. Whatever happens, the run
/// finishes with exactly one terminal event: `done` when it returns Ok, `error` when it
/// returns Err.
pub fn run<S: FrameSource>(cfg: &DedupCfg, source: S, sink: &mut dyn EventSink) -> Result<RunSummary, DedupError> {
    match run_inner(cfg, source, sink) {
        Ok(summary) => {
            let message = match summary.outcome {
                RunOutcome::NotEnoughVideos => NOT_ENOUGH_VIDEOS.to_string(),
                RunOutcome::Completed => format!(
                    "Completed. Moved {} duplicates to '{}'.",
                    summary.moved(),
                    cfg.quarantine_dir_name
                ),
            };
            info!("{message}");
            sink.emit(&Event::Done { message });
            Ok(summary)
        }
        Err(e) => {
            sink.emit(&Event::Error { message: e.to_string() });
            Err(e)
        }
    }
}

fn run_inner<S: FrameSource>(cfg: &DedupCfg, source: S, sink: &mut dyn EventSink) -> Result<RunSummary, DedupError> {
    let quarantine_dir = cfg.quarantine_dir();
    create_quarantine_dir(&quarantine_dir)?;

    // Collect
    let candidates = find_candidates(&cfg.target_dir, &cfg.quarantine_dir_name, &cfg.video_extensions)?;
    let total = candidates.len();
    if total < 2 {
        return Ok(RunSummary::not_enough(total, 0));
    }

    let sampler = HashSampler::new(source, cfg.sampler);
    let mut videos = Vec::with_capacity(total);
    for (i, path) in candidates.iter().enumerate() {
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        sink.emit(&Event::progress(Phase::Scanning, i + 1, total, format!("Analysing: {name}")));

        if let Some(video) = sampler.sample(path) {
            videos.push(video);
        }
    }

    let usable = videos.len();
    if usable < 2 {
        warn!("Only {usable} of {total} videos could be hashed");
        return Ok(RunSummary::not_enough(total, usable));
    }

    // Rank and resolve
    let resolver = DuplicateResolver::new(
        SimilarityScorer::new(cfg.score),
        ResolverCfg {
            match_threshold: cfg.match_threshold,
            quarantine_dir,
        },
    );
    let resolution = resolver.resolve(videos, sink);

    Ok(RunSummary {
        scanned: total,
        usable,
        decisions: resolution.decisions,
        outcome: RunOutcome::Completed,
    })
}
