use std::path::PathBuf;

use ffmpeg_cmdline_utils::FfmpegError;
use thiserror::Error;

/// Error type for the various reasons why a [`HashedVideo`][crate::HashedVideo] could not be created from a video file.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HashCreationError {
    /// The decoder could not be started for this file.
    #[error("Processing error at {}: {error}", .src_path.display())]
    Decode { src_path: PathBuf, error: FfmpegError },

    /// The decoder ran but did not produce a single complete frame. This happens for corrupt
    /// or unsupported files, and for files without a video stream.
    #[error("No frames decoded: {}", .0.display())]
    NoFrames(PathBuf),
}
