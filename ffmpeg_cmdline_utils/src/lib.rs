//! Thin wrapper around the ffmpeg command line tool, used to stream decoded
//! video frames into rust.
//!
//! Frames are requested already downscaled and converted to 8-bit grayscale,
//! so each frame arrives on ffmpeg's stdout as exactly `width * height` bytes.
//! The spawned ffmpeg process is owned by the returned iterator and is killed
//! and reaped when the iterator finishes or is dropped.
//!
//! ```no_run
//! use ffmpeg_cmdline_utils::FfmpegFrameReaderBuilder;
//!
//! let frames = FfmpegFrameReaderBuilder::new("cat.mp4")
//!     .fps("8")
//!     .scale(64, 64)
//!     .spawn_gray()
//!     .unwrap();
//!
//! for frame in frames {
//!     assert_eq!(frame.dimensions(), (64, 64));
//! }
//! ```

mod ffmpeg_error_kind;
mod ffmpeg_ops;

pub use ffmpeg_error_kind::FfmpegError;
pub use ffmpeg_ops::*;
