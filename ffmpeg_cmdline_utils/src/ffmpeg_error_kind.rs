use thiserror::Error;

/// Various causes of failure when running ffmpeg.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FfmpegError {
    /// The ffmpeg executable was not found. Make sure ffmpeg is installed and can be found on the command line,
    /// or that the explicit path to the executable is correct.
    #[error("ffmpeg executable not found. Make sure ffmpeg is installed and visible on the command line")]
    FfmpegNotFound,

    /// Io error occurred while executing the ffmpeg command
    #[error("Ffmpeg IO error: {0}")]
    Io(String),

    /// Ffmpeg returned a nonzero exit code or did not finish in time.
    #[error("Internal Ffmpeg Failure: {0}")]
    FfmpegInternal(String),

    /// The requested output frame size had a zero dimension.
    #[error("Requested frame size has a zero dimension")]
    InvalidResolution,
}

impl From<std::io::Error> for FfmpegError {
    fn from(e: std::io::Error) -> Self {
        match e.kind() {
            //by far the most likely cause is that ffmpeg is not installed.
            std::io::ErrorKind::NotFound => FfmpegError::FfmpegNotFound,
            _ => FfmpegError::Io(format!("{:?}", e.kind())),
        }
    }
}
