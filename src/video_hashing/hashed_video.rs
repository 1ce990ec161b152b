use std::path::{Path, PathBuf};

/// The fingerprint of one video file: one frame hash per sampled frame, in time order.
///
/// A HashedVideo always contains at least one hash. Videos from which no frame could be
/// decoded are never turned into a HashedVideo.
#[derive(Clone, PartialEq, Debug)]
pub struct HashedVideo {
    path: PathBuf,
    filename: String,
    duration: f64,
    hashes: Vec<u64>,
}

impl HashedVideo {
    /// Build a HashedVideo from frame hashes sampled at `sample_fps` frames per second.
    /// Returns None if `hashes` is empty.
    pub fn from_hashes(path: impl AsRef<Path>, hashes: Vec<u64>, sample_fps: u32) -> Option<Self> {
        if hashes.is_empty() || sample_fps == 0 {
            return None;
        }

        let path = path.as_ref().to_path_buf();
        let filename = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let duration = hashes.len() as f64 / f64::from(sample_fps);

        Some(Self {
            path,
            filename,
            duration,
            hashes,
        })
    }

    /// The path to the video file from which this fingerprint was created.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Base name of the video file.
    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// Approximate duration in seconds (number of sampled frames divided by the sample rate).
    /// Only meaningful for ranking videos against each other.
    pub fn duration(&self) -> f64 {
        self.duration
    }

    pub fn hashes(&self) -> &[u64] {
        &self.hashes
    }

    /// Number of sampled frames.
    pub fn len(&self) -> usize {
        self.hashes.len()
    }
}
