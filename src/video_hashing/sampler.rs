use std::path::{Path, PathBuf};

use ffmpeg_cmdline_utils::{FfmpegError, FfmpegFrameIterGray, FfmpegFrameReaderBuilder};
use image::GrayImage;
use log::{info, warn};

use crate::{
    definitions::{FRAME_SIZE, HASH_GRID, SAMPLE_FPS},
    dhash::dhash,
    HashCreationError, HashedVideo,
};

/// Something that can decode a video file into a stream of grayscale frames of the size and
/// rate given by a [`SamplerCfg`].
///
/// The returned iterator owns any decoder resources (for ffmpeg, the child process) and must
/// release them when dropped.
pub trait FrameSource {
    type Frames: Iterator<Item = GrayImage>;

    fn frames(&self, src_path: &Path, cfg: &SamplerCfg) -> Result<Self::Frames, FfmpegError>;
}

/// Decodes frames by piping them out of an ffmpeg process.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FfmpegDecoder {
    ffmpeg_path: PathBuf,
}

impl FfmpegDecoder {
    pub fn new(ffmpeg_path: impl AsRef<Path>) -> Self {
        Self {
            ffmpeg_path: ffmpeg_path.as_ref().to_path_buf(),
        }
    }

    pub fn ffmpeg_path(&self) -> &Path {
        &self.ffmpeg_path
    }
}

impl Default for FfmpegDecoder {
    fn default() -> Self {
        Self::new("ffmpeg")
    }
}

impl FrameSource for FfmpegDecoder {
    type Frames = FfmpegFrameIterGray;

    fn frames(&self, src_path: &Path, cfg: &SamplerCfg) -> Result<Self::Frames, FfmpegError> {
        FfmpegFrameReaderBuilder::new(src_path)
            .ffmpeg_path(&self.ffmpeg_path)
            .fps(cfg.fps().to_string())
            .scale(cfg.frame_size(), cfg.frame_size())
            .spawn_gray()
    }
}

/// Frame sampling and hashing parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SamplerCfg {
    fps: u32,
    frame_size: u32,
    hash_grid: u32,
}

impl SamplerCfg {
    /// Panics unless `fps` and `frame_size` are nonzero and `hash_grid` is in 1..=8, so that
    /// a frame hash always fits in 64 bits.
    pub fn new(fps: u32, frame_size: u32, hash_grid: u32) -> Self {
        assert!(fps > 0);
        assert!(frame_size > 0);
        assert!((1..=8).contains(&hash_grid));

        Self {
            fps,
            frame_size,
            hash_grid,
        }
    }
}

impl SamplerCfg {
    /// Frames per second requested from the decoder.
    pub fn fps(&self) -> u32 {
        self.fps
    }

    /// Width and height of the square frames requested from the decoder.
    pub fn frame_size(&self) -> u32 {
        self.frame_size
    }

    /// dHash grid size. Each frame hash has `hash_grid * hash_grid` bits.
    pub fn hash_grid(&self) -> u32 {
        self.hash_grid
    }
}

impl Default for SamplerCfg {
    fn default() -> Self {
        Self::new(SAMPLE_FPS, FRAME_SIZE, HASH_GRID)
    }
}

/// Turns video files into [`HashedVideo`] fingerprints.
#[derive(Debug, Clone)]
pub struct HashSampler<S> {
    source: S,
    cfg: SamplerCfg,
}

impl<S: FrameSource> HashSampler<S> {
    pub fn new(source: S, cfg: SamplerCfg) -> Self {
        Self { source, cfg }
    }

    pub fn cfg(&self) -> &SamplerCfg {
        &self.cfg
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Decode the video at src_path and hash every frame the decoder delivers, until the
    /// first incomplete frame.
    pub fn try_sample(&self, src_path: impl AsRef<Path>) -> Result<HashedVideo, HashCreationError> {
        let src_path = src_path.as_ref();

        let frames = self
            .source
            .frames(src_path, &self.cfg)
            .map_err(|error| HashCreationError::Decode {
                src_path: src_path.to_path_buf(),
                error,
            })?;

        // consuming the iterator also shuts the decoder down.
        let hashes = frames
            .map(|frame| dhash(&frame, self.cfg.hash_grid()))
            .collect::<Vec<_>>();

        HashedVideo::from_hashes(src_path, hashes, self.cfg.fps())
            .ok_or_else(|| HashCreationError::NoFrames(src_path.to_path_buf()))
    }

    /// Like [`Self::try_sample`], but failures are logged and reported as None so that a
    /// single bad file never aborts a scan.
    pub fn sample(&self, src_path: impl AsRef<Path>) -> Option<HashedVideo> {
        match self.try_sample(src_path) {
            Ok(video) => {
                info!(target: "hash_creation",
                    "Hashed {}: {} frames",
                    video.path().display(),
                    video.len()
                );
                Some(video)
            }
            Err(e) => {
                warn!(target: "hash_creation", "Hashing failed: {e}");
                None
            }
        }
    }
}
